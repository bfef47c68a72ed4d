pub mod adjacency;
pub mod cache;
pub mod demo;
pub mod edge;
pub mod node;
pub mod overlay;
pub mod render;
pub mod scene;
pub mod shape;
pub mod style;

pub use adjacency::Adjacency;
pub use cache::{FrameKey, RenderCache};
pub use edge::Edge;
pub use node::{ChangeResponse, DEFAULT_RADIUS, Invalidation, ItemChange, Node, SharedMetrics, Sweep, default_label};
pub use overlay::Segments;
pub use render::{DisplayList, DrawCommand, LodGate, PaintOption, Painter, RenderContext, RenderSettings};
pub use scene::{NetworkScene, NodeSpec, SceneError, SceneItem};
pub use shape::NodeShape;
pub use style::{EdgeStyle, NetworkStyle, NodeStyle, StateStyle, StyleProvider};
