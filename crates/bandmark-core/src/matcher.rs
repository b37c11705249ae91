//! Answer matching.
//!
//! Decides whether one raw answer satisfies one answer-key entry. Matching is
//! exact after [`normalize`]: alternatives are listed, never fuzzy-merged.

use crate::model::{AnswerKey, AnswerKind};
use crate::normalize::normalize;

/// The normalized, non-empty canonical options of an entry, deduplicated.
///
/// Blank options are dropped, so an entry authored with nothing but blanks
/// can never be satisfied.
pub fn canonical_options(kind: &AnswerKind) -> Vec<String> {
    let mut options: Vec<String> = Vec::new();
    for value in kind.values() {
        let option = normalize(value);
        if !option.is_empty() && !options.contains(&option) {
            options.push(option);
        }
    }
    options
}

/// Check one raw answer against an answer kind.
///
/// For pair and multi-select kinds `user_raw` is a single box or a single
/// selected option; it is correct when it is a member of the canonical set.
/// Blank answers are never correct.
pub fn is_correct(user_raw: &str, kind: &AnswerKind) -> bool {
    let answer = normalize(user_raw);
    if answer.is_empty() {
        return false;
    }
    canonical_options(kind).contains(&answer)
}

/// Check one raw answer against the key entry for `question_id`.
///
/// Unknown question ids never award credit.
pub fn check(key: &AnswerKey, question_id: &str, user_raw: &str) -> bool {
    match key.get(question_id) {
        Some(entry) => is_correct(user_raw, &entry.kind),
        None => {
            tracing::debug!("question '{question_id}' is not in the answer key");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AnswerKeyEntry;

    fn text(s: &str) -> AnswerKind {
        AnswerKind::from_text(s)
    }

    fn pair(values: &[&str]) -> AnswerKind {
        AnswerKind::UnorderedPair {
            partner: "11".into(),
            values: values.iter().map(|v| v.to_string()).collect(),
        }
    }

    fn select(values: &[&str]) -> AnswerKind {
        AnswerKind::MultiSelect {
            values: values.iter().map(|v| v.to_string()).collect(),
        }
    }

    #[test]
    fn plain_match_ignores_case_and_spacing() {
        let kind = text("NOT GIVEN");
        for input in ["not given", "Not Given", "  NOT   GIVEN  ", "not given.", "not given. ,"] {
            assert!(is_correct(input, &kind), "{input:?} should match");
        }
        assert!(!is_correct("given", &kind));
    }

    #[test]
    fn case_and_whitespace_invariance() {
        let kinds = [text("TRUE"), text("4/four sides"), pair(&["D", "E"])];
        for kind in &kinds {
            for s in ["true", "four sides", "d", "x", "4 sides"] {
                let base = is_correct(s, kind);
                assert_eq!(base, is_correct(&s.to_uppercase(), kind));
                assert_eq!(base, is_correct(&format!("  {s}  "), kind));
            }
        }
    }

    #[test]
    fn alternatives_are_exact_after_normalization() {
        let kind = text("4/four sides");
        assert!(is_correct("four sides", &kind));
        assert!(is_correct("4", &kind));
        assert!(!is_correct("4 sides", &kind));

        let spelling = text("verandas/verandahs");
        assert!(is_correct("Verandahs", &spelling));
        assert!(!is_correct("veranda", &spelling));
    }

    #[test]
    fn blank_is_wrong() {
        for kind in [text("TRUE"), text("a/b"), pair(&["D", "E"]), select(&["B"])] {
            assert!(!is_correct("", &kind));
            assert!(!is_correct("   ", &kind));
        }
    }

    #[test]
    fn malformed_canonical_is_unsatisfiable() {
        assert!(!is_correct("anything", &AnswerKind::Alternatives { values: vec![] }));
        assert!(!is_correct("", &text("")));
        assert!(!is_correct("/", &text("/")));
        assert!(!is_correct("x", &select(&[])));
        // Blank options are dropped, real ones still match.
        assert!(is_correct("b", &text("a//b")));
    }

    #[test]
    fn pair_box_accepts_either_member() {
        let kind = pair(&["D", "E"]);
        assert!(is_correct("D", &kind));
        assert!(is_correct("e", &kind));
        assert!(!is_correct("F", &kind));
    }

    #[test]
    fn multi_select_membership() {
        let kind = select(&["B", "D", "F"]);
        assert!(is_correct("F", &kind));
        assert!(is_correct("b", &kind));
        assert!(!is_correct("X", &kind));
    }

    #[test]
    fn canonical_options_dedupe() {
        assert_eq!(canonical_options(&text("Colour/colour/ color ")), vec!["colour", "color"]);
    }

    #[test]
    fn check_unknown_question_is_false() {
        let key = AnswerKey::new(vec![AnswerKeyEntry::new("1", text("TRUE"))]).unwrap();
        assert!(check(&key, "1", "true"));
        assert!(!check(&key, "2", "true"));
    }
}
