//! C-compatible FFI interface for OpinionEngine
//!
//! Exposes the opinion bridge through a C ABI for integration with managed
//! hosts (Go via CGO, JVM shims).
//!
//! # Memory Ownership Rules
//!
//! - `opinion_engine_new()` allocates on Rust heap, caller owns pointer
//! - `opinion_engine_free()` must be called to deallocate
//! - Result structs and their strings are owned by caller after return
//! - `opinion_result_free()` must be called to deallocate results
//! - Input strings are copied; the caller retains ownership

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::document::Document;
use crate::engine::{EngineConfig, OpinionEngine};
use crate::frame;

// Safety limits
const MAX_INPUT_LENGTH: usize = 10_000_000; // 10MB of serialized document text

/// C-compatible annotation result.
///
/// `output` is NULL when the engine produced no annotation; that is a
/// successful outcome (`success` stays true), distinct from an error.
#[repr(C)]
pub struct OpinionResultC {
    pub success: bool,
    pub error_msg: *mut c_char,
    pub output: *mut c_char,
}

impl OpinionResultC {
    fn ok(text: String) -> Self {
        Self {
            success: true,
            error_msg: ptr::null_mut(),
            output: CString::new(text).unwrap_or_default().into_raw(),
        }
    }

    fn absent() -> Self {
        Self {
            success: true,
            error_msg: ptr::null_mut(),
            output: ptr::null_mut(),
        }
    }

    fn error(msg: &str) -> Self {
        Self {
            success: false,
            error_msg: CString::new(msg)
                .unwrap_or_else(|_| CString::new(" ").expect("space is valid"))
                .into_raw(),
            output: ptr::null_mut(),
        }
    }
}

// ============================================================================
// Engine Lifecycle
// ============================================================================

#[no_mangle]
pub extern "C" fn opinion_init_logger() {
    crate::init_logger();
}

/// Initialize the opinion engine with its five configuration values.
///
/// Returns a pointer to the engine on success, or NULL on error. Caller owns
/// the pointer and must call `opinion_engine_free` to deallocate. The native
/// engine loads process-wide model state, so only one engine can be created
/// per process.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn opinion_engine_new(
    resources: *const c_char,
    word_vectors: *const c_char,
    adt_model: *const c_char,
    dse_model: *const c_char,
    polarity_model: *const c_char,
) -> *mut OpinionEngine {
    crate::init_logger();

    let config = match read_config(resources, word_vectors, adt_model, dse_model, polarity_model) {
        Ok(config) => config,
        Err((field, reason)) => {
            eprintln!("opinion_engine_new: unable to read '{}': {}", field, reason);
            return ptr::null_mut();
        }
    };

    match OpinionEngine::initialize(config) {
        Ok(engine) => Box::into_raw(Box::new(engine)),
        Err(e) => {
            eprintln!("Failed to initialize opinion engine: {}", e);
            ptr::null_mut()
        }
    }
}

#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn opinion_engine_free(engine: *mut OpinionEngine) {
    if !engine.is_null() {
        unsafe {
            let _ = Box::from_raw(engine);
        }
    }
}

// ============================================================================
// Annotation
// ============================================================================

/// Annotate one pre-formatted document.
///
/// The input must already be in the engine's wire format (see
/// `Document::to_engine_input`); it is forwarded unmodified.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn opinion_engine_annotate(
    engine: *const OpinionEngine,
    input: *const c_char,
) -> OpinionResultC {
    let (engine, input_str) = match annotate_args(engine, input) {
        Ok(args) => args,
        Err(result) => return result,
    };

    match engine.annotate(input_str) {
        Ok(Some(text)) => OpinionResultC::ok(text),
        Ok(None) => OpinionResultC::absent(),
        Err(e) => OpinionResultC::error(&e.to_string()),
    }
}

/// Annotate one pre-formatted document and return the extracted frames as a
/// JSON array.
///
/// Produces an empty array when the engine yields nothing.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn opinion_engine_annotate_frames(
    engine: *const OpinionEngine,
    input: *const c_char,
) -> OpinionResultC {
    let (engine, input_str) = match annotate_args(engine, input) {
        Ok(args) => args,
        Err(result) => return result,
    };

    let frames = match engine.annotate(input_str) {
        Ok(Some(text)) => match frame::parse_frames(&text) {
            Ok(frames) => frames,
            Err(e) => return OpinionResultC::error(&e.to_string()),
        },
        Ok(None) => Vec::new(),
        Err(e) => return OpinionResultC::error(&e.to_string()),
    };

    frames_to_json(&frames)
}

/// Annotate a structured document passed as JSON.
///
/// The document is serialized into the engine's wire format internally, so
/// hosts do not need to reimplement the input builder. Returns the frames as
/// a JSON array; absence of engine output produces an empty array.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn opinion_engine_annotate_document(
    engine: *const OpinionEngine,
    document_json: *const c_char,
) -> OpinionResultC {
    let (engine, doc_str) = match annotate_args(engine, document_json) {
        Ok(args) => args,
        Err(result) => return result,
    };

    let document: Document = match serde_json::from_str(doc_str) {
        Ok(document) => document,
        Err(e) => return OpinionResultC::error(&format!("invalid document JSON: {}", e)),
    };

    match engine.annotate_document(&document) {
        Ok(frames) => frames_to_json(&frames),
        Err(e) => OpinionResultC::error(&e.to_string()),
    }
}

#[no_mangle]
pub extern "C" fn opinion_result_free(result: OpinionResultC) {
    if !result.error_msg.is_null() {
        unsafe {
            let _ = CString::from_raw(result.error_msg);
        }
    }
    if !result.output.is_null() {
        unsafe {
            let _ = CString::from_raw(result.output);
        }
    }
}

// ============================================================================
// Utilities
// ============================================================================

#[no_mangle]
pub extern "C" fn opinion_engine_version() -> *const c_char {
    concat!(env!("CARGO_PKG_VERSION"), "\0").as_ptr() as *const c_char
}

// ============================================================================
// Helpers
// ============================================================================

fn read_config(
    resources: *const c_char,
    word_vectors: *const c_char,
    adt_model: *const c_char,
    dse_model: *const c_char,
    polarity_model: *const c_char,
) -> Result<EngineConfig, (&'static str, &'static str)> {
    let arg = |ptr: *const c_char, field: &'static str| {
        cstr_arg(ptr).map_err(|reason| (field, reason))
    };

    Ok(EngineConfig {
        resources: arg(resources, "resources")?,
        word_vectors: arg(word_vectors, "word_vectors")?,
        adt_model: arg(adt_model, "adt_model")?,
        dse_model: arg(dse_model, "dse_model")?,
        polarity_model: arg(polarity_model, "polarity_model")?,
    })
}

fn cstr_arg(ptr: *const c_char) -> Result<String, &'static str> {
    if ptr.is_null() {
        return Err("null pointer");
    }
    unsafe { CStr::from_ptr(ptr) }
        .to_str()
        .map(str::to_owned)
        .map_err(|_| "invalid UTF-8")
}

fn annotate_args<'a>(
    engine: *const OpinionEngine,
    input: *const c_char,
) -> Result<(&'a OpinionEngine, &'a str), OpinionResultC> {
    if engine.is_null() {
        return Err(OpinionResultC::error("null engine pointer"));
    }
    if input.is_null() {
        return Err(OpinionResultC::error("null input pointer"));
    }

    let engine = unsafe { &*engine };

    let input_str = match unsafe { CStr::from_ptr(input) }.to_str() {
        Ok(s) => s,
        Err(_) => return Err(OpinionResultC::error("invalid UTF-8 in input")),
    };

    if input_str.len() > MAX_INPUT_LENGTH {
        return Err(OpinionResultC::error("input exceeds maximum length"));
    }

    Ok((engine, input_str))
}

fn frames_to_json(frames: &[frame::OpinionFrame]) -> OpinionResultC {
    match serde_json::to_string(frames) {
        Ok(json) => OpinionResultC::ok(json),
        Err(e) => OpinionResultC::error(&e.to_string()),
    }
}
