use std::collections::HashMap;
use std::collections::hash_map::Entry;

use netview_core::NodeId;

use crate::render::{DisplayList, LodGate};

/// Everything a cached node frame depends on besides position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameKey {
    pub selected: bool,
    pub gate: LodGate,
    pub revision: u64,
    /// Bumped by the scene when the theme, overlay palette or visibility changes.
    pub scene_generation: u64,
}

#[derive(Debug, Clone)]
struct CachedFrame {
    key: FrameKey,
    list: DisplayList,
}

impl CachedFrame {
    fn render(key: FrameKey, build: impl FnOnce(&mut DisplayList)) -> Self {
        let mut list = DisplayList::new();
        build(&mut list);
        Self { key, list }
    }
}

/// Per-node display lists in local coordinates.
#[derive(Debug, Default)]
pub struct RenderCache {
    frames: HashMap<NodeId, CachedFrame>,
    hits: u64,
    misses: u64,
}

impl RenderCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached list for `id`, rebuilt with `build` when the key no longer matches.
    pub fn get_or_render<F>(&mut self, id: NodeId, key: FrameKey, build: F) -> &DisplayList
    where
        F: FnOnce(&mut DisplayList),
    {
        match self.frames.entry(id) {
            Entry::Occupied(mut entry) => {
                if entry.get().key == key {
                    self.hits += 1;
                } else {
                    self.misses += 1;
                    entry.insert(CachedFrame::render(key, build));
                }
                &entry.into_mut().list
            }
            Entry::Vacant(entry) => {
                self.misses += 1;
                &entry.insert(CachedFrame::render(key, build)).list
            }
        }
    }

    pub fn invalidate(&mut self, id: NodeId) -> bool {
        self.frames.remove(&id).is_some()
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.frames.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::Painter;
    use netview_core::{Color, Rect};

    fn key(revision: u64) -> FrameKey {
        FrameKey {
            selected: false,
            gate: LodGate::default(),
            revision,
            scene_generation: 0,
        }
    }

    fn draw_one(list: &mut DisplayList) {
        list.ellipse(Rect::NOTHING, Color::WHITE, None);
    }

    #[test]
    fn test_reuses_frame_for_same_key() {
        let mut cache = RenderCache::new();
        cache.get_or_render(NodeId(1), key(3), draw_one);
        let list = cache.get_or_render(NodeId(1), key(3), |_| panic!("should be cached"));
        assert_eq!(list.len(), 1);
        assert_eq!((cache.hits(), cache.misses()), (1, 1));
    }

    #[test]
    fn test_rebuilds_on_key_change() {
        let mut cache = RenderCache::new();
        cache.get_or_render(NodeId(1), key(3), draw_one);
        let list = cache.get_or_render(NodeId(1), key(4), |list| {
            draw_one(list);
            draw_one(list);
        });
        assert_eq!(list.len(), 2);
        assert_eq!(cache.misses(), 2);
    }

    #[test]
    fn test_invalidate_drops_frame() {
        let mut cache = RenderCache::new();
        cache.get_or_render(NodeId(1), key(0), draw_one);
        assert!(cache.invalidate(NodeId(1)));
        assert!(!cache.invalidate(NodeId(1)));
        assert!(cache.is_empty());
    }
}
