use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One of the four fixed subsection slots of a section page, in page order.
///
/// `About` is the hero slot: its background is already in place when the
/// page loads and only animates out once scrolled past.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum SubsectionId {
    About,
    Posts,
    Gigs,
    Videos,
}

impl SubsectionId {
    /// Canonical page order.
    pub const ALL: [SubsectionId; 4] = [
        SubsectionId::About,
        SubsectionId::Posts,
        SubsectionId::Gigs,
        SubsectionId::Videos,
    ];

    /// The identifier as used in element ids, data attributes and config keys.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::About => "about",
            Self::Posts => "posts",
            Self::Gigs => "gigs",
            Self::Videos => "videos",
        }
    }

    pub fn is_hero(self) -> bool {
        self == Self::About
    }
}

impl fmt::Display for SubsectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown subsection: {0:?}")]
pub struct UnknownSubsection(pub String);

impl FromStr for SubsectionId {
    type Err = UnknownSubsection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| UnknownSubsection(s.to_owned()))
    }
}

/// Viewport-relative bounding box of one element, in CSS pixels.
///
/// Only the vertical extent matters to the sequencer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElementRect {
    pub top: f64,
    pub bottom: f64,
    pub height: f64,
}

impl ElementRect {
    /// Build a rect from its top and bottom edges.
    pub fn new(top: f64, bottom: f64) -> Self {
        Self {
            top,
            bottom,
            height: bottom - top,
        }
    }

    /// Build a rect from its top edge and height.
    pub fn from_top(top: f64, height: f64) -> Self {
        Self {
            top,
            bottom: top + height,
            height,
        }
    }
}
