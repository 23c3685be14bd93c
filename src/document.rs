//! Input-side adaptation: serializing an analyzed document into the
//! engine's line-oriented wire format.
//!
//! The engine consumes sentence blocks carrying the surface tokens,
//! part-of-speech tags, lemmas, a constituency parse and a dependency graph
//! produced by an upstream NLP pipeline. `pos_tags` and `lemmas` must run
//! parallel to `tokens`.

use serde::{Deserialize, Serialize};

/// One analyzed sentence, ready to be serialized for the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sentence {
    pub tokens: Vec<String>,
    pub pos_tags: Vec<String>,
    pub lemmas: Vec<String>,
    /// Bracketed constituency parse, single line.
    pub parse_tree: String,
    /// Dependency graph in the engine's notation. Emitted verbatim;
    /// conventionally carries its own trailing newline.
    pub dependency_graph: String,
}

/// A document as a sequence of analyzed sentences.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    pub sentences: Vec<Sentence>,
}

impl Document {
    pub fn new(sentences: Vec<Sentence>) -> Self {
        Self { sentences }
    }

    /// Serialize the document into the engine's input format.
    ///
    /// Each sentence becomes one block:
    ///
    /// ```text
    /// #begin sentence
    /// Sent: <tokens, space-joined>
    /// POS: <tags, space-joined>
    /// Lemma: <lemmas, space-joined>
    /// <parse_tree>
    /// <dependency_graph>#end sentence
    /// ```
    pub fn to_engine_input(&self) -> String {
        let mut input = String::new();
        for sentence in &self.sentences {
            input.push_str("#begin sentence\n");
            input.push_str("Sent: ");
            input.push_str(&sentence.tokens.join(" "));
            input.push('\n');
            input.push_str("POS: ");
            input.push_str(&sentence.pos_tags.join(" "));
            input.push('\n');
            input.push_str("Lemma: ");
            input.push_str(&sentence.lemmas.join(" "));
            input.push('\n');
            input.push_str(&sentence.parse_tree);
            input.push('\n');
            input.push_str(&sentence.dependency_graph);
            input.push_str("#end sentence\n");
        }
        input
    }
}
