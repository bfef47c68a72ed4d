use serde::{Deserialize, Serialize};
use std::fmt;

pub mod color;
pub mod error;
pub mod font;
pub mod geometry;
pub mod metrics;

pub use color::{Color, Pen};
pub use error::StyleError;
pub use font::{Font, FontFamily};
pub use geometry::{Rect, Vec2};
pub use metrics::{HeuristicMetrics, TextMetrics};

/// Stable identity of a node, assigned by the owning scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub i64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque edge handle. Nodes only ever hold these, never the edge itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EdgeId(pub i64);

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Named visual state a style provider can be keyed by.
pub const STATE_SELECTED: &str = "selected";
