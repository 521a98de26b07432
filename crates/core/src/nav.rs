//! Smooth "jump to subsection" scrolling of the content container.

use serde::{Deserialize, Serialize};

/// Gap left between the header and a subsection after a jump.
pub const NAV_OFFSET_PX: f64 = 80.0;

/// Duration of a jump.
pub const JUMP_DURATION_MS: f64 = 1200.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ease {
    Linear,
    InOutQuad,
}

impl Ease {
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::InOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(2) / 2.0)
                }
            }
        }
    }
}

/// Scroll offset that brings a subsection to `offset` pixels below the top
/// of the scroll container.
///
/// `section_top` and `container_top` are viewport-relative; `scroll_top` is
/// the container's current scroll offset.
pub fn jump_target(scroll_top: f64, container_top: f64, section_top: f64, offset: f64) -> f64 {
    (scroll_top + section_top - container_top - offset).max(0.0)
}

/// A time-based scroll animation between two offsets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollTween {
    pub from: f64,
    pub to: f64,
    pub start_ms: f64,
    pub duration_ms: f64,
    pub ease: Ease,
}

impl ScrollTween {
    /// A jump with the default duration and easing.
    pub fn jump(from: f64, to: f64, start_ms: f64) -> Self {
        Self {
            from,
            to,
            start_ms,
            duration_ms: JUMP_DURATION_MS,
            ease: Ease::InOutQuad,
        }
    }

    /// Scroll offset at `now_ms` and whether the tween has finished.
    pub fn sample(&self, now_ms: f64) -> (f64, bool) {
        if self.duration_ms <= 0.0 {
            return (self.to, true);
        }
        let t = (now_ms - self.start_ms) / self.duration_ms;
        if t >= 1.0 {
            return (self.to, true);
        }
        let k = self.ease.apply(t);
        (self.from + (self.to - self.from) * k, false)
    }
}
