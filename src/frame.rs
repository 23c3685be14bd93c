//! Output-side adaptation: parsing the engine's opinion frame records.
//!
//! The engine emits one record per extracted frame. Records are separated by
//! newlines, fields by tabs, and every field is a comma-separated 5-tuple
//! `sentence,start,end,label,score`. The first field locates the opinion
//! expression and names its type; the remaining fields attach argument spans
//! whose labels mark them as opinion holders or targets.

use serde::{Deserialize, Serialize};

use crate::error::{OpinionError, Result};

/// Token-indexed span within a document. `end` is exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSpan {
    pub sentence: usize,
    pub start: usize,
    pub end: usize,
}

/// One extracted opinion frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpinionFrame {
    /// Span of the opinion expression itself.
    pub expression: TokenSpan,
    /// Engine-assigned opinion type for the expression.
    pub kind: String,
    /// Engine confidence for the expression.
    pub score: f64,
    pub holders: Vec<TokenSpan>,
    pub targets: Vec<TokenSpan>,
}

/// Parse the engine's output text into opinion frames.
///
/// Records with a foreign structure (wrong field arity) are skipped; numeric
/// fields that fail to parse inside a well-formed record are an error.
/// Argument labels other than holder and target are ignored, and argument
/// confidences are present in the record but unused.
pub fn parse_frames(output: &str) -> Result<Vec<OpinionFrame>> {
    let mut frames = Vec::new();

    for record in output.split('\n') {
        let mut fields = record.split('\t');
        let head = match fields.next() {
            Some(head) => head,
            None => continue,
        };

        let head_parts: Vec<&str> = head.split(',').collect();
        if head_parts.len() != 5 {
            continue;
        }

        let mut frame = OpinionFrame {
            expression: parse_span(&head_parts)?,
            kind: head_parts[3].to_string(),
            score: parse_score(head_parts[4])?,
            holders: Vec::new(),
            targets: Vec::new(),
        };

        for field in fields {
            let parts: Vec<&str> = field.split(',').collect();
            if parts.len() != 5 {
                continue;
            }
            let span = parse_span(&parts)?;
            if parts[3].contains("HolderOf") {
                frame.holders.push(span);
            } else if parts[3].contains("TargetOf") {
                frame.targets.push(span);
            }
        }

        frames.push(frame);
    }

    Ok(frames)
}

fn parse_span(parts: &[&str]) -> Result<TokenSpan> {
    Ok(TokenSpan {
        sentence: parse_index(parts[0])?,
        start: parse_index(parts[1])?,
        end: parse_index(parts[2])?,
    })
}

fn parse_index(text: &str) -> Result<usize> {
    text.parse()
        .map_err(|_| OpinionError::Frame(format!("bad token index `{text}`")))
}

fn parse_score(text: &str) -> Result<f64> {
    text.parse()
        .map_err(|_| OpinionError::Frame(format!("bad confidence `{text}`")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(sentence: usize, start: usize, end: usize) -> TokenSpan {
        TokenSpan {
            sentence,
            start,
            end,
        }
    }

    #[test]
    fn parses_expression_with_holder_and_target() {
        let output =
            "2,4,6,DirectSubjective,0.91\t2,0,1,IsHolderOfOpinion,0.88\t2,7,9,IsTargetOfOpinion,0.75";
        let frames = parse_frames(output).unwrap();

        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].expression, span(2, 4, 6));
        assert_eq!(frames[0].kind, "DirectSubjective");
        assert_eq!(frames[0].score, 0.91);
        assert_eq!(frames[0].holders, vec![span(2, 0, 1)]);
        assert_eq!(frames[0].targets, vec![span(2, 7, 9)]);
    }

    #[test]
    fn parses_multiple_records_and_skips_blank_lines() {
        let output = "0,1,2,DirectSubjective,0.85\n\n1,0,3,ExpressiveSubjective,0.64\n";
        let frames = parse_frames(output).unwrap();

        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].expression, span(0, 1, 2));
        assert_eq!(frames[1].kind, "ExpressiveSubjective");
    }

    #[test]
    fn skips_records_with_foreign_structure() {
        let output = "garbage\n1,2,3\n0,1,2,DirectSubjective,0.85";
        let frames = parse_frames(output).unwrap();

        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].expression, span(0, 1, 2));
    }

    #[test]
    fn ignores_arguments_with_unknown_labels_and_wrong_arity() {
        let output = "0,1,2,DirectSubjective,0.85\t0,3,4,SomeOtherRole,0.5\t0,5";
        let frames = parse_frames(output).unwrap();

        assert_eq!(frames.len(), 1);
        assert!(frames[0].holders.is_empty());
        assert!(frames[0].targets.is_empty());
    }

    #[test]
    fn collects_repeated_arguments() {
        let output = "0,1,2,DirectSubjective,0.85\t0,0,1,IsHolderOfOpinion,0.9\t1,0,2,IsHolderOfOpinion,0.7";
        let frames = parse_frames(output).unwrap();

        assert_eq!(frames[0].holders, vec![span(0, 0, 1), span(1, 0, 2)]);
    }

    #[test]
    fn bad_numeric_field_in_well_formed_record_is_an_error() {
        let err = parse_frames("0,x,2,DirectSubjective,0.85").unwrap_err();
        assert!(matches!(err, OpinionError::Frame(_)));

        let err = parse_frames("0,1,2,DirectSubjective,high").unwrap_err();
        assert!(matches!(err, OpinionError::Frame(_)));
    }

    #[test]
    fn empty_output_yields_no_frames() {
        assert!(parse_frames("").unwrap().is_empty());
    }
}
