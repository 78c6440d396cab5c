//! Inference engine interface for the LipRead backend.
//!
//! The visual-speech model runs in a separate model server process; each
//! worker talks to it through its own [`TranscriptionEngine`] instance.
//! This crate provides the engine and factory ports plus the HTTP
//! implementation used in production.

pub mod client;
pub mod engine;
pub mod error;
pub mod types;

pub use client::{EngineConfig, HttpEngine, HttpEngineFactory};
pub use engine::{EngineFactory, TranscriptionEngine};
pub use error::{EngineError, EngineResult};
pub use types::{TranscribeRequest, TranscribeResponse};
