//! NELL Opinion Extraction Bridge (CGO)
//!
//! Adapter between managed hosts and the native NELL opinion extraction
//! engine. The extraction algorithm itself (tokenization, subjective
//! expression detection, polarity classification, word-vector lookup) lives
//! in an external native library exposing two C entry points; this crate
//! marshals strings across that boundary, owns the returned buffers, and
//! re-exposes the engine through a C ABI.
//!
//! ## Usage from Go via CGO
//!
//! ```go
//! engine := cgo.NewOpinionEngine(resPath, wordvecPath, adtModel, dseModel, polarityModel)
//! defer engine.Free()
//!
//! result := engine.Annotate(documentText)
//! ```
//!
//! ## Memory Ownership
//!
//! - `opinion_engine_new()` allocates on Rust heap, caller owns pointer
//! - `opinion_engine_free()` must be called to deallocate
//! - Result structs and their strings are owned by caller after return
//! - `opinion_result_free()` must be called to deallocate results
//! - Buffers allocated by the native engine are copied and freed internally;
//!   they never cross this crate's public boundary

// Import logging macros
#[macro_use]
extern crate log;

pub mod document;
pub mod engine;
pub mod error;
pub mod frame;
pub mod native;

// FFI module for C/CGO integration
pub mod ffi;

/// Initialize the logger for the opinion bridge.
/// This should be called once at startup, typically from FFI.
///
/// The log level can be controlled via the RUST_LOG environment variable:
/// - RUST_LOG=nell_opinion=debug
/// - RUST_LOG=nell_opinion=trace
pub fn init_logger() {
    use std::sync::Once;
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        env_logger::init();
        debug!("NELL opinion bridge logging enabled");
    });
}

// Re-export main types
pub use document::{Document, Sentence};
pub use engine::{EngineConfig, OpinionEngine};
pub use error::{OpinionError, Result};
pub use frame::{parse_frames, OpinionFrame, TokenSpan};

// Re-export FFI types for C consumers
pub use ffi::OpinionResultC;
