use crossbeam_channel::{Receiver, Sender, unbounded};
use netview_core::{EdgeId, NodeId};
use serde::{Deserialize, Serialize};

/// Notifications published by a network scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    // Nodes
    NodeAdded {
        id: NodeId,
    },
    NodeRemoved {
        id: NodeId,
    },
    /// A node's committed position changed and its incident edges were adjusted.
    NodeMoved {
        id: NodeId,
        x: f32,
        y: f32,
        adjusted_edges: usize,
    },
    SelectionChanged {
        id: NodeId,
        selected: bool,
    },

    // Edges
    EdgeAdded {
        id: EdgeId,
        source: NodeId,
        target: NodeId,
    },
    EdgeRemoved {
        id: EdgeId,
    },
    EdgeSelectionChanged {
        id: EdgeId,
        selected: bool,
    },

    // Scene-wide
    StyleChanged {
        name: String,
    },
    PieChartsVisibilityChanged(bool),
    LayoutChanged,
    ScaleChanged(f32),
    /// Interactive dragging was disabled (`true`) or re-enabled.
    Locked(bool),
}

#[derive(Clone)]
pub struct EventBus {
    tx: Sender<Event>,
    rx: Receiver<Event>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    pub fn sender(&self) -> Sender<Event> {
        self.tx.clone()
    }

    pub fn receiver(&self) -> Receiver<Event> {
        self.rx.clone()
    }

    pub fn publish(&self, event: Event) {
        let _ = self.tx.send(event);
    }

    /// Drain everything published so far.
    pub fn drain(&self) -> Vec<Event> {
        self.rx.try_iter().collect()
    }

    /// Dispatch all pending events to a listener.
    /// This is useful for processing events in the UI loop.
    pub fn dispatch_to<L: EventListener>(&self, listener: &mut L) {
        while let Ok(event) = self.rx.try_recv() {
            listener.handle_event(&event);
        }
    }
}

/// Trait for components that respond to events.
/// Implement this to receive events from the EventBus.
pub trait EventListener {
    fn handle_event(&mut self, event: &Event);
}
