pub mod commands;
pub mod types;

pub use commands::{LayerCommand, LayerSpec, LayerStyle, StackLevel};
pub use types::{ElementRect, SubsectionId, UnknownSubsection};
