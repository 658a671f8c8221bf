//! Recording system module
//!
//! One [`Recorder`] captures one participant's stream for one recording
//! episode (`active -> stopped`, terminal). Finalized artifacts are retained
//! after stop and exported on download.

pub mod recorder;
pub mod state;

pub use recorder::Recorder;
pub use state::{ArtifactLocator, RecordingKey, RecordingState};
