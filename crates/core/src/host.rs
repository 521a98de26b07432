use backdrop_protocol::{ElementRect, LayerCommand, SubsectionId};

use crate::retry::FrameScheduler;

/// The page a [`LayerSequencer`](crate::sequencer::LayerSequencer) runs against.
///
/// Reads are answered from the live page on every call; a host must not
/// hand back measurements cached from an earlier tick. Every read may fail
/// with `None` when the element it needs is missing, and the sequencer
/// skips that unit of work.
pub trait Host: FrameScheduler {
    /// Viewport height in CSS pixels.
    fn viewport_height(&self) -> Option<f64>;

    /// Scroll offset of the content container.
    fn scroll_top(&self) -> Option<f64>;

    /// Viewport-relative top edge of the content container.
    fn container_top(&self) -> Option<f64>;

    /// Find the scroll container and the subsection wrapper. True once both exist.
    fn locate(&mut self) -> bool;

    /// Start delivering scroll and resize events to the sequencer.
    fn attach(&mut self);

    /// Stop delivering events and forget the located wrapper. Idempotent.
    fn detach(&mut self);

    /// Current rect of a subsection's foreground element inside the wrapper.
    fn subsection_rect(&self, id: SubsectionId) -> Option<ElementRect>;

    /// Monotonic clock in milliseconds.
    fn now_ms(&self) -> f64;

    fn apply(&mut self, command: &LayerCommand);
}
