//! Raw FFI bindings to the native opinion extraction engine.
//! These are unsafe C functions; use the safe `OpinionEngine` wrapper in
//! `engine.rs` instead.
//!
//! The engine library is provided and linked by the embedding host, so no
//! `#[link]` attribute is emitted here. Under `cfg(test)` the symbols are
//! replaced by a scripted in-process stand-in so the marshalling paths can be
//! exercised without the real library.

#[cfg(not(test))]
use std::os::raw::c_char;

#[cfg(not(test))]
extern "C" {
    /// One-shot, process-wide load of models and lexical resources.
    /// Returns nothing; a failed load is not observable at this boundary.
    pub fn initialize(
        res: *const c_char,
        wordvec: *const c_char,
        adt_model: *const c_char,
        dse_model: *const c_char,
        polarity_model: *const c_char,
    );

    /// Parse one document and return a malloc'd NUL-terminated buffer holding
    /// the extracted opinion frames, or NULL when nothing was produced.
    /// Ownership of a non-NULL buffer transfers to the caller, who must
    /// release it with `free(3)`.
    pub fn opinion_parse(input: *const c_char) -> *mut c_char;
}

#[cfg(test)]
pub use stub::{initialize, opinion_parse};
