use serde::{Deserialize, Serialize};

use crate::types::SubsectionId;

/// A background layer to mount: one per subsection that declares an image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerSpec {
    pub id: SubsectionId,
    /// Image path as written in the section config (relative to the site root).
    pub image: String,
}

/// Relative compositing order of a layer. Resolved to a z-index by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StackLevel {
    Parked,
    InView,
}

impl StackLevel {
    pub fn z_index(self) -> i32 {
        match self {
            Self::Parked => 0,
            Self::InView => 1,
        }
    }
}

/// Visual state of one layer at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayerStyle {
    /// Vertical translation as a percentage of the layer height.
    /// `100` is parked below, `0` in place, `-100` parked above.
    pub y_percent: f64,
    pub opacity: f64,
    pub stack: StackLevel,
}

impl LayerStyle {
    pub fn new(y_percent: f64, opacity: f64) -> Self {
        let stack = if y_percent == 0.0 {
            StackLevel::InView
        } else {
            StackLevel::Parked
        };
        Self {
            y_percent,
            opacity,
            stack,
        }
    }

    /// The resting state a layer is mounted with before the first tick.
    pub fn parked_below() -> Self {
        Self::new(100.0, 0.0)
    }

    /// CSS `transform` value for this style.
    pub fn transform_css(&self) -> String {
        format!("translate3d(0, {}%, 0)", self.y_percent)
    }
}

/// A single, stateless instruction for a layer host.
///
/// The sequencer emits these on every tick. Hosts apply them in order; each
/// command carries all the data it needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LayerCommand {
    /// Create the layer container and one layer per spec, in order,
    /// replacing any layers already mounted.
    MountLayers { layers: Vec<LayerSpec> },

    /// Restyle one mounted layer. Ignored if the layer is not mounted.
    SetStyle { id: SubsectionId, style: LayerStyle },

    /// Remove the layer container and every layer in it.
    ClearLayers,

    /// Scroll the content container to an absolute offset.
    ScrollTo { top: f64 },
}
