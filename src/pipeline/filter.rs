//! Validity filter for candidate pairs.

use crate::utils::char_len;

/// Shortest acceptable question, in characters.
pub const MIN_QUESTION_CHARS: usize = 10;

/// Shortest acceptable answer, in characters.
pub const MIN_ANSWER_CHARS: usize = 20;

/// Whether `(question, answer)` is a usable pair.
///
/// Rejects empty sides, questions under 10 characters, answers under 20,
/// identical sides (case-sensitive), and either side starting with `http`.
pub fn is_valid_pair(question: &str, answer: &str) -> bool {
    !question.is_empty()
        && !answer.is_empty()
        && char_len(question) >= MIN_QUESTION_CHARS
        && char_len(answer) >= MIN_ANSWER_CHARS
        && question != answer
        && !question.starts_with("http")
        && !answer.starts_with("http")
}
