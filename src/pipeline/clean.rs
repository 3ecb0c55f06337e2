//! Text normalisation applied to every extracted decision.
//!
//! Two rules, in this order:
//! 1. Lowercase the whole string
//! 2. Drop every character that is neither a word character (Unicode letter,
//!    digit, underscore) nor whitespace
//!
//! Whitespace runs are kept as they are, so page and line breaks from the
//! extraction survive. Both rules are idempotent, hence so is the pipeline.

use once_cell::sync::Lazy;
use regex::Regex;

static RE_NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s]").unwrap());

/// Lowercase `input` and strip punctuation and symbols.
pub fn clean_text(input: &str) -> String {
    let lowered = input.to_lowercase();
    RE_NON_WORD.replace_all(&lowered, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_case_and_strips_punctuation() {
        assert_eq!(clean_text("ABC, def!"), "abc def");
    }

    #[test]
    fn keeps_digits_and_underscores() {
        assert_eq!(clean_text("Ref: DRN_1234567 (2023)"), "ref drn_1234567 2023");
    }

    #[test]
    fn keeps_whitespace_runs() {
        assert_eq!(clean_text("One.\n\nTwo  -  three"), "one\n\ntwo    three");
    }

    #[test]
    fn keeps_non_ascii_letters() {
        assert_eq!(clean_text("Café – Ärger £100"), "café  ärger 100");
    }

    #[test]
    fn is_idempotent() {
        let inputs = [
            "Hello, World! 123",
            "Mr A's complaint about XYZ Ltd.\nI uphold it.",
            "",
            "£ € $ % & *",
        ];
        for input in inputs {
            let once = clean_text(input);
            assert_eq!(clean_text(&once), once, "input: {input:?}");
        }
    }

    #[test]
    fn empty_stays_empty() {
        assert_eq!(clean_text(""), "");
    }
}
