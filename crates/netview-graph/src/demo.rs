//! Deterministic sample network used by the front-ends.

use netview_core::{EdgeId, NodeId, Vec2};

use crate::scene::{NetworkScene, NodeSpec, SceneError};

/// Segments per node in the sample pie charts.
pub const DEMO_PIE_SEGMENTS: usize = 3;

const GOLDEN_ANGLE: f32 = 2.399_963;

/// Simple pseudo-random number generator (deterministic for consistency).
fn rand_simple(seed: usize) -> f32 {
    let x = ((seed + 1) * 9301 + 49297) % 233_280;
    x as f32 / 233_280.0
}

/// Position of the `i`-th node on a sunflower spiral.
pub fn spiral_position(i: usize, spacing: f32) -> Vec2 {
    let r = spacing * (i as f32).sqrt();
    let theta = i as f32 * GOLDEN_ANGLE;
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Fill `scene` with a random tree of `n` nodes, each carrying a pie chart.
pub fn populate(scene: &mut NetworkScene, n: usize) -> Result<(), SceneError> {
    scene.clear();
    scene.add_nodes((0..n).map(|i| {
        let spec = NodeSpec::new(NodeId(i as i64)).radius(8.0 + 8.0 * rand_simple(i * 7));
        if i < 10 {
            spec.label(format!("Node {}", i))
        } else {
            spec
        }
    }))?;

    scene.add_edges((1..n).map(|i| {
        let target = (rand_simple(i) * i as f32) as usize;
        (
            EdgeId(i as i64 - 1),
            NodeId(i as i64),
            NodeId(target.min(i - 1) as i64),
            1.0,
        )
    }))?;

    scene.set_layout((0..n).map(|i| (NodeId(i as i64), spiral_position(i, 1.0))), Some(45.0), &[]);

    scene.set_pie_charts((0..n).map(|i| {
        let values = (0..DEMO_PIE_SEGMENTS)
            .map(|k| rand_simple(i * DEMO_PIE_SEGMENTS + k))
            .collect();
        (NodeId(i as i64), values)
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_is_a_tree() {
        let mut scene = NetworkScene::new();
        populate(&mut scene, 25).unwrap();
        assert_eq!(scene.node_count(), 25);
        assert_eq!(scene.edge_count(), 24);
        for edge in scene.edges() {
            assert!(edge.target() < edge.source());
        }
    }

    #[test]
    fn test_demo_is_deterministic() {
        let mut a = NetworkScene::new();
        let mut b = NetworkScene::new();
        populate(&mut a, 12).unwrap();
        populate(&mut b, 12).unwrap();
        let positions = |s: &NetworkScene| s.nodes().map(|n| n.pos()).collect::<Vec<_>>();
        assert_eq!(positions(&a), positions(&b));
        assert_eq!(a.node(NodeId(3)).unwrap().label(), "Node 3");
        assert_eq!(a.node(NodeId(11)).unwrap().label(), "12");
        assert_eq!(
            a.node(NodeId(4)).unwrap().segments().len(),
            DEMO_PIE_SEGMENTS
        );
    }

    #[test]
    fn test_repopulate_replaces_scene() {
        let mut scene = NetworkScene::new();
        populate(&mut scene, 10).unwrap();
        populate(&mut scene, 4).unwrap();
        assert_eq!(scene.node_count(), 4);
    }

    #[test]
    fn test_empty_demo() {
        let mut scene = NetworkScene::new();
        populate(&mut scene, 0).unwrap();
        assert_eq!(scene.node_count(), 0);
    }
}
