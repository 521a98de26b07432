//! Scroll-driven background layers for section pages.
//!
//! ```text
//!   host (DOM / headless) ──▶ ScrollSnapshot ──▶ geometry ──▶ LayerCommand[] ──▶ host
//!         ▲                                                                        │
//!         └──────────── scroll / resize / animation frame ◀── LayerSequencer ◀─────┘
//! ```

pub mod config;
pub mod geometry;
pub mod headless;
pub mod host;
pub mod nav;
pub mod retry;
pub mod sequencer;

pub use config::{ConfigError, SectionConfig, SectionsConfig, background_image, layer_specs};
pub use headless::HeadlessPage;
pub use host::Host;
pub use retry::{BoundedRetry, FrameHandle, FrameScheduler, RetryStep};
pub use sequencer::{LayerSequencer, Phase};
