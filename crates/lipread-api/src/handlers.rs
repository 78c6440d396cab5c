//! Request handlers.

pub mod health;
pub mod status;
pub mod transcribe;

pub use health::{health, ready};
pub use status::{queue_status, render_metrics};
pub use transcribe::process_media;
