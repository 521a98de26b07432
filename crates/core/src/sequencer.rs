//! Keeps one background layer per configured subsection in step with the
//! scroll position of that subsection's foreground block.

use backdrop_protocol::{ElementRect, LayerCommand, LayerSpec, LayerStyle, SubsectionId};
use tracing::{debug, trace};

use crate::config::{SectionConfig, layer_specs};
use crate::geometry::{self, OPACITY_MAX};
use crate::host::Host;
use crate::nav::{NAV_OFFSET_PX, ScrollTween, jump_target};
use crate::retry::{BoundedRetry, FrameHandle, RetryStep};

/// Frames after activation that reset scroll to the top again, to undo
/// scroll restoration that lands after the page mounted.
pub const SETTLE_FRAMES: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Not started yet.
    Idle,
    /// Started with no subsection backgrounds: nothing is rendered.
    Inert,
    /// Waiting for the subsection wrapper to mount.
    Locating,
    /// Tracking scroll; a few more settle frames are due.
    Settling { remaining: u8 },
    /// Tracking scroll.
    Active,
    /// The wrapper never appeared. Layers stay at rest.
    GaveUp,
    Stopped,
}

/// Every measurement one tick needs, taken together at the start of the tick.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollSnapshot {
    pub viewport_height: f64,
    /// The content container is scrolled to its topmost position.
    pub at_top: bool,
    /// One entry per layer, in layer order. `None` when the foreground
    /// element could not be found.
    pub rects: Vec<(SubsectionId, Option<ElementRect>)>,
}

impl ScrollSnapshot {
    pub fn capture<H: Host + ?Sized>(host: &H, layers: &[LayerSpec]) -> Option<Self> {
        let viewport_height = host.viewport_height()?;
        let at_top = host.scroll_top().is_some_and(|top| top <= 0.0);
        let rects = layers
            .iter()
            .map(|layer| (layer.id, host.subsection_rect(layer.id)))
            .collect();
        Some(Self {
            viewport_height,
            at_top,
            rects,
        })
    }
}

/// Styles for every layer whose foreground element was measured.
///
/// While scrolled to the top, the first layer is kept at least at
/// [`OPACITY_MAX`] so the opening frame never flashes an empty background.
pub fn compute_styles(snapshot: &ScrollSnapshot) -> Vec<LayerCommand> {
    let mut commands = Vec::with_capacity(snapshot.rects.len());
    for (index, (id, rect)) in snapshot.rects.iter().enumerate() {
        let Some(rect) = rect else {
            continue;
        };
        let mut style = geometry::layer_style(*id, rect, snapshot.viewport_height);
        if index == 0 && snapshot.at_top {
            style.opacity = style.opacity.max(OPACITY_MAX);
        }
        commands.push(LayerCommand::SetStyle { id: *id, style });
    }
    commands
}

/// Styles layers are mounted with: the first in place, the rest parked below.
pub fn resting_styles(layers: &[LayerSpec]) -> Vec<LayerCommand> {
    layers
        .iter()
        .enumerate()
        .map(|(index, layer)| {
            let style = if index == 0 {
                LayerStyle::new(0.0, OPACITY_MAX)
            } else {
                LayerStyle::parked_below()
            };
            LayerCommand::SetStyle {
                id: layer.id,
                style,
            }
        })
        .collect()
}

/// Owns a [`Host`] and drives its background layers.
///
/// Resources taken in [`start`](Self::start) (mounted layers, listeners,
/// scheduled frames) are released by [`stop`](Self::stop), which also runs on
/// drop.
pub struct LayerSequencer<H: Host> {
    host: H,
    layers: Vec<LayerSpec>,
    phase: Phase,
    retry: BoundedRetry,
    frame: Option<FrameHandle>,
    tween: Option<ScrollTween>,
}

impl<H: Host> LayerSequencer<H> {
    pub fn new(host: H, config: &SectionConfig) -> Self {
        Self::with_layers(host, layer_specs(config))
    }

    pub fn with_layers(host: H, layers: Vec<LayerSpec>) -> Self {
        Self {
            host,
            layers,
            phase: Phase::Idle,
            retry: BoundedRetry::default(),
            frame: None,
            tween: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn layers(&self) -> &[LayerSpec] {
        &self.layers
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Reset scroll, mount the layers at rest and start looking for the
    /// subsection wrapper.
    pub fn start(&mut self) {
        if !matches!(self.phase, Phase::Idle | Phase::Stopped) {
            return;
        }
        self.host.apply(&LayerCommand::ScrollTo { top: 0.0 });
        if self.layers.is_empty() {
            debug!("no subsection backgrounds configured");
            self.phase = Phase::Inert;
            return;
        }

        debug!(layers = self.layers.len(), "mounting subsection backgrounds");
        self.host.apply(&LayerCommand::MountLayers {
            layers: self.layers.clone(),
        });
        for command in resting_styles(&self.layers) {
            self.host.apply(&command);
        }

        self.retry.reset();
        self.phase = Phase::Locating;
        self.poll_locate();
    }

    /// Release everything taken by [`start`](Self::start). Safe to call repeatedly.
    pub fn stop(&mut self) {
        if self.phase == Phase::Stopped {
            return;
        }
        let previous = std::mem::replace(&mut self.phase, Phase::Stopped);

        self.retry.cancel(&mut self.host);
        if let Some(handle) = self.frame.take() {
            self.host.cancel_frame(handle);
        }
        self.tween = None;
        if previous == Phase::Idle {
            return;
        }

        self.host.apply(&LayerCommand::ScrollTo { top: 0.0 });
        self.host.detach();
        if previous != Phase::Inert {
            self.host.apply(&LayerCommand::ClearLayers);
        }
        debug!(?previous, "layer sequencer stopped");
    }

    /// Switch to another section's configuration.
    pub fn reconfigure(&mut self, config: &SectionConfig) {
        self.stop();
        self.layers = layer_specs(config);
        self.start();
    }

    pub fn on_scroll(&mut self) {
        if self.is_tracking() {
            self.update();
        }
    }

    pub fn on_resize(&mut self) {
        if self.is_tracking() {
            self.update();
        }
    }

    /// Animation-frame callback.
    pub fn on_frame(&mut self) {
        self.frame = None;
        match self.phase {
            Phase::Locating => self.poll_locate(),
            Phase::Settling { remaining } => {
                self.host.apply(&LayerCommand::ScrollTo { top: 0.0 });
                self.update();
                if remaining > 1 {
                    self.phase = Phase::Settling {
                        remaining: remaining - 1,
                    };
                    self.schedule_frame();
                } else {
                    self.phase = Phase::Active;
                }
            }
            Phase::Active | Phase::Inert => self.step_tween(),
            Phase::Idle | Phase::GaveUp | Phase::Stopped => {}
        }
    }

    /// Smoothly scroll the content container to a subsection.
    ///
    /// Returns `false` (and does nothing) while the sequencer is not settled
    /// or the subsection's element cannot be found.
    pub fn jump_to(&mut self, id: SubsectionId) -> bool {
        match self.phase {
            Phase::Active => {}
            // Nothing was located on start; navigation still needs the page.
            Phase::Inert => {
                if !self.host.locate() {
                    return false;
                }
            }
            _ => return false,
        }
        let (Some(scroll_top), Some(container_top), Some(rect)) = (
            self.host.scroll_top(),
            self.host.container_top(),
            self.host.subsection_rect(id),
        ) else {
            return false;
        };
        let to = jump_target(scroll_top, container_top, rect.top, NAV_OFFSET_PX);
        debug!(%id, from = scroll_top, to, "jumping to subsection");
        self.tween = Some(ScrollTween::jump(scroll_top, to, self.host.now_ms()));
        self.schedule_frame();
        true
    }

    fn is_tracking(&self) -> bool {
        matches!(self.phase, Phase::Settling { .. } | Phase::Active)
    }

    fn poll_locate(&mut self) {
        match self
            .retry
            .poll(&mut self.host, |host| host.locate().then_some(()))
        {
            RetryStep::Ready(()) => {
                debug!(attempts = self.retry.attempts(), "subsection wrapper located");
                self.host.attach();
                self.update();
                self.phase = Phase::Settling {
                    remaining: SETTLE_FRAMES,
                };
                self.schedule_frame();
            }
            RetryStep::Pending => {}
            RetryStep::Exhausted => {
                debug!(
                    attempts = self.retry.attempts(),
                    "subsection wrapper never appeared, leaving backgrounds at rest"
                );
                self.phase = Phase::GaveUp;
            }
        }
    }

    fn step_tween(&mut self) {
        let Some(tween) = self.tween else {
            return;
        };
        let (top, finished) = tween.sample(self.host.now_ms());
        self.host.apply(&LayerCommand::ScrollTo { top });
        self.update();
        if finished {
            self.tween = None;
        } else {
            self.schedule_frame();
        }
    }

    fn schedule_frame(&mut self) {
        if self.frame.is_none() {
            self.frame = self.host.request_frame();
        }
    }

    fn update(&mut self) {
        if self.layers.is_empty() {
            return;
        }
        let Some(snapshot) = ScrollSnapshot::capture(&self.host, &self.layers) else {
            trace!("viewport unavailable, skipping tick");
            return;
        };
        let commands = compute_styles(&snapshot);
        trace!(
            measured = commands.len(),
            layers = self.layers.len(),
            "layer tick"
        );
        for command in &commands {
            self.host.apply(command);
        }
    }
}

impl<H: Host> Drop for LayerSequencer<H> {
    fn drop(&mut self) {
        self.stop();
    }
}
