//! Safe wrapper around the native opinion extraction engine.
//!
//! The engine keeps its models and word vectors in process-wide native state
//! loaded exactly once. [`OpinionEngine`] makes that contract explicit: the
//! handle can only be obtained through a successful
//! [`OpinionEngine::initialize`], and annotation requires the handle.

use std::ffi::{CStr, CString};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use crate::document::Document;
use crate::error::{OpinionError, Result};
use crate::frame::{self, OpinionFrame};
use crate::native;

/// Process-wide claim on the engine's one-shot initialization.
static INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Configuration bundle for the native engine.
///
/// Five opaque text values forwarded verbatim: a feature resource
/// dictionary, a word-vector table and three classifier models. No format
/// validation is performed on any of them; the engine interprets them.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub resources: String,
    pub word_vectors: String,
    pub adt_model: String,
    pub dse_model: String,
    pub polarity_model: String,
}

impl EngineConfig {
    /// Resolve the conventional resource layout under a root directory.
    ///
    /// Fails with [`OpinionError::MissingResource`] naming the first absent
    /// file. The resolved paths are still passed to the engine verbatim;
    /// their contents are not inspected.
    pub fn from_resource_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let resolve = |rel: &str| -> Result<String> {
            let path = dir.join(rel);
            if !path.is_file() {
                return Err(OpinionError::MissingResource(path));
            }
            Ok(path.to_string_lossy().into_owned())
        };

        Ok(Self {
            resources: resolve("opinion_resources/featuredict")?,
            word_vectors: resolve("opinion_resources/pretrained_mpqa_embeddings")?,
            adt_model: resolve("models/agent_dse_target_model")?,
            dse_model: resolve("models/dse_ese_model")?,
            polarity_model: resolve("models/polarity_model")?,
        })
    }
}

/// Handle to the initialized native engine.
///
/// Owning an `OpinionEngine` proves the one-shot native load has run.
/// Dropping the handle does not unload the native state; the engine defines
/// no teardown entry point.
#[derive(Debug)]
pub struct OpinionEngine {
    /// The engine's own thread-safety is unspecified, so parse calls are
    /// serialized through this lock.
    parse_lock: Mutex<()>,
}

impl OpinionEngine {
    /// Load the engine's process-wide model state and return the handle.
    ///
    /// The five configuration values are forwarded to the native
    /// `initialize` entry point in declaration order. An interior NUL byte
    /// in any value aborts before the native call; the views already
    /// acquired are released on that path, so a corrected retry can
    /// succeed. A second successful initialization is rejected with
    /// [`OpinionError::AlreadyInitialized`].
    ///
    /// The native entry point returns nothing, so a fault inside the model
    /// load itself is not observable here.
    pub fn initialize(config: EngineConfig) -> Result<Self> {
        let resources = cstring_field(config.resources, "resources")?;
        let word_vectors = cstring_field(config.word_vectors, "word_vectors")?;
        let adt_model = cstring_field(config.adt_model, "adt_model")?;
        let dse_model = cstring_field(config.dse_model, "dse_model")?;
        let polarity_model = cstring_field(config.polarity_model, "polarity_model")?;

        if INITIALIZED
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(OpinionError::AlreadyInitialized);
        }

        debug!("loading opinion models into native engine state");
        unsafe {
            native::initialize(
                resources.as_ptr(),
                word_vectors.as_ptr(),
                adt_model.as_ptr(),
                dse_model.as_ptr(),
                polarity_model.as_ptr(),
            );
        }
        info!("opinion engine initialized");

        Ok(Self {
            parse_lock: Mutex::new(()),
        })
    }

    /// Run the engine over one pre-formatted input document.
    ///
    /// Returns `Ok(None)` when the engine produces no annotation, a defined
    /// outcome distinct from failure. The input is borrowed for the full
    /// duration of the native call and never retained; empty input is
    /// forwarded unmodified.
    pub fn annotate(&self, input: &str) -> Result<Option<String>> {
        let input = cstring_field(input.to_owned(), "input")?;

        let raw = {
            let _guard = self.parse_lock.lock();
            unsafe { native::opinion_parse(input.as_ptr()) }
        };
        if raw.is_null() {
            return Ok(None);
        }

        // Copy out, then release the engine's buffer exactly once, also on
        // the invalid-UTF-8 path.
        let copied = unsafe { CStr::from_ptr(raw) }.to_str().map(str::to_owned);
        unsafe { libc::free(raw as *mut libc::c_void) };

        copied.map(Some).map_err(|_| OpinionError::OutputEncoding)
    }

    /// Annotate a structured document and parse the engine's output into
    /// opinion frames. Absence of output maps to an empty frame list.
    pub fn annotate_document(&self, document: &Document) -> Result<Vec<OpinionFrame>> {
        match self.annotate(&document.to_engine_input())? {
            Some(output) => frame::parse_frames(&output),
            None => Ok(Vec::new()),
        }
    }
}

fn cstring_field(value: String, field: &'static str) -> Result<CString> {
    CString::new(value).map_err(|_| {
        error!("unable to pass {} to the native engine: interior NUL byte", field);
        OpinionError::NulByte { field }
    })
}

#[cfg(test)]
pub(crate) fn reset_init_claim() {
    INITIALIZED.store(false, Ordering::SeqCst);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Sentence;
    use crate::frame::TokenSpan;
    use crate::native::stub;

    fn config() -> EngineConfig {
        EngineConfig {
            resources: "./res".into(),
            word_vectors: "./vecs.bin".into(),
            adt_model: "./adt.model".into(),
            dse_model: "./dse.model".into(),
            polarity_model: "./polarity.model".into(),
        }
    }

    #[test]
    fn initialize_forwards_all_five_values_once() {
        let _serial = stub::serial();
        stub::reset(None);
        reset_init_claim();

        let _engine = OpinionEngine::initialize(config()).unwrap();

        let st = stub::state();
        assert_eq!(st.init_calls, 1);
        assert_eq!(
            st.last_init.as_ref().unwrap(),
            &[
                "./res",
                "./vecs.bin",
                "./adt.model",
                "./dse.model",
                "./polarity.model"
            ]
        );
    }

    #[test]
    fn second_initialize_is_rejected() {
        let _serial = stub::serial();
        stub::reset(None);
        reset_init_claim();

        let _engine = OpinionEngine::initialize(config()).unwrap();
        let err = OpinionEngine::initialize(config()).unwrap_err();
        assert!(matches!(err, OpinionError::AlreadyInitialized));
        assert_eq!(stub::state().init_calls, 1);
    }

    #[test]
    fn nul_byte_in_config_aborts_before_native_call() {
        let _serial = stub::serial();
        stub::reset(None);
        reset_init_claim();

        let mut bad = config();
        bad.dse_model = "dse\0model".into();
        let err = OpinionEngine::initialize(bad).unwrap_err();
        assert!(matches!(err, OpinionError::NulByte { field: "dse_model" }));
        assert_eq!(stub::state().init_calls, 0);

        // The failed attempt consumed nothing; a corrected retry succeeds.
        let _engine = OpinionEngine::initialize(config()).unwrap();
        assert_eq!(stub::state().init_calls, 1);
    }

    #[test]
    fn annotate_copies_output_and_reports_absence() {
        let _serial = stub::serial();
        stub::reset(Some("0,1,2,DirectSubjective,0.85"));
        reset_init_claim();

        let engine = OpinionEngine::initialize(config()).unwrap();

        let out = engine.annotate("I love this product.").unwrap();
        assert_eq!(out.as_deref(), Some("0,1,2,DirectSubjective,0.85"));
        assert_eq!(
            stub::state().last_input.as_deref(),
            Some("I love this product.")
        );

        // Empty input is forwarded unmodified, not special-cased.
        let _ = engine.annotate("").unwrap();
        assert_eq!(stub::state().last_input.as_deref(), Some(""));

        stub::script(None);
        assert_eq!(engine.annotate("anything").unwrap(), None);
    }

    #[test]
    fn annotate_with_interior_nul_never_reaches_engine() {
        let _serial = stub::serial();
        stub::reset(Some("unused"));
        reset_init_claim();

        let engine = OpinionEngine::initialize(config()).unwrap();
        let err = engine.annotate("bad\0input").unwrap_err();
        assert!(matches!(err, OpinionError::NulByte { field: "input" }));
        assert_eq!(stub::state().parse_calls, 0);
    }

    #[test]
    fn annotate_document_parses_frames() {
        let _serial = stub::serial();
        stub::reset(Some(
            "0,1,2,DirectSubjective,0.85\t0,0,1,IsHolderOfOpinion,0.9\t0,3,5,IsTargetOfOpinion,0.8",
        ));
        reset_init_claim();

        let engine = OpinionEngine::initialize(config()).unwrap();

        let document = Document::new(vec![Sentence {
            tokens: vec!["I".into(), "love".into(), "this".into(), "product".into(), ".".into()],
            pos_tags: vec!["PRP".into(), "VBP".into(), "DT".into(), "NN".into(), ".".into()],
            lemmas: vec!["I".into(), "love".into(), "this".into(), "product".into(), ".".into()],
            parse_tree: "(ROOT (S (NP (PRP I)) (VP (VBP love) (NP (DT this) (NN product))) (. .)))".into(),
            dependency_graph: "nsubj(love-2, I-1)\n".into(),
        }]);

        let frames = engine.annotate_document(&document).unwrap();
        assert_eq!(frames.len(), 1);
        assert_eq!(
            frames[0].expression,
            TokenSpan {
                sentence: 0,
                start: 1,
                end: 2
            }
        );
        assert_eq!(frames[0].kind, "DirectSubjective");
        assert_eq!(frames[0].holders, vec![TokenSpan { sentence: 0, start: 0, end: 1 }]);
        assert_eq!(frames[0].targets, vec![TokenSpan { sentence: 0, start: 3, end: 5 }]);

        // The serialized document is what crossed the boundary.
        let st = stub::state();
        assert!(st.last_input.as_deref().unwrap().starts_with("#begin sentence\n"));

        // Absence maps to an empty frame list.
        drop(st);
        stub::script(None);
        assert!(engine.annotate_document(&document).unwrap().is_empty());
    }

    #[test]
    fn from_resource_dir_resolves_conventional_layout() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join("opinion_resources")).unwrap();
        std::fs::create_dir_all(root.join("models")).unwrap();
        for rel in [
            "opinion_resources/featuredict",
            "opinion_resources/pretrained_mpqa_embeddings",
            "models/agent_dse_target_model",
            "models/dse_ese_model",
        ] {
            std::fs::write(root.join(rel), "x").unwrap();
        }

        // One model absent: the error names it.
        let err = EngineConfig::from_resource_dir(root).unwrap_err();
        match err {
            OpinionError::MissingResource(path) => {
                assert!(path.ends_with("models/polarity_model"));
            }
            other => panic!("unexpected error: {other:?}"),
        }

        std::fs::write(root.join("models/polarity_model"), "x").unwrap();
        let config = EngineConfig::from_resource_dir(root).unwrap();
        assert!(config.resources.ends_with("featuredict"));
        assert!(config.word_vectors.ends_with("pretrained_mpqa_embeddings"));
    }
}
