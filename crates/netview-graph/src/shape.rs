use netview_core::{Rect, Vec2};

/// Hit-test and repaint shape of a node: the circular body plus the label box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeShape {
    pub center: Vec2,
    pub radius: f32,
    pub label: Rect,
}

impl NodeShape {
    pub fn body_rect(&self) -> Rect {
        Rect::from_center_size(self.center, Vec2::new(self.radius * 2.0, self.radius * 2.0))
    }

    pub fn contains(&self, point: Vec2) -> bool {
        (point - self.center).length() <= self.radius || self.label.contains(point)
    }

    pub fn bounding_rect(&self) -> Rect {
        self.body_rect().union(&self.label)
    }

    pub fn translate(&self, offset: Vec2) -> NodeShape {
        NodeShape {
            center: self.center + offset,
            radius: self.radius,
            label: self.label.translate(offset),
        }
    }
}
