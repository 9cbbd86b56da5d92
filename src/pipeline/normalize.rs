//! Text normalisation: repair missing inter-token spacing in extracted text.
//!
//! PDF text layers frequently lose the spaces between words, after
//! punctuation, or around numbers. Every extraction method's raw output goes
//! through [`normalize`] so that the methods can be compared like for like.
//!
//! ## Rule Order
//!
//! The rules run in a fixed order and each is applied to the whole text:
//!
//! 1. lowercase followed by uppercase gets a space (`wordTwo` → `word Two`)
//! 2. sentence punctuation followed by a letter gets a space (`end.Next`)
//! 3. a double quote touching a word character gets a space on that side
//! 4. `)` before a word character, and a word character before `(`
//! 5. a digit touching a letter, in either order (`a1b` → `a 1 b`)
//! 6. runs of spaces collapse to one
//! 7. runs of blank lines collapse to one blank line
//! 8. a space at the start of a line is dropped
//!
//! Rules 1–5 only ever insert spaces, and 6–8 never remove the last
//! whitespace between two characters, so a second pass finds nothing to do.

use once_cell::sync::Lazy;
use regex::Regex;

/// Normalise raw extracted text. Empty or whitespace-only input yields `""`.
pub fn normalize(raw: &str) -> String {
    if raw.trim().is_empty() {
        return String::new();
    }
    let s = split_case_boundary(raw);
    let s = space_after_punctuation(&s);
    let s = space_around_quotes(&s);
    let s = space_around_parentheses(&s);
    let s = space_between_digits_and_letters(&s);
    let s = collapse_spaces(&s);
    let s = collapse_blank_lines(&s);
    let s = strip_line_leading_space(&s);
    s.trim().to_string()
}

// ── Rule 1: camel-case boundary ──────────────────────────────────────────────

static RE_CASE_BOUNDARY: Lazy<Regex> = Lazy::new(|| Regex::new(r"([a-z])([A-Z])").unwrap());

fn split_case_boundary(input: &str) -> String {
    RE_CASE_BOUNDARY.replace_all(input, "$1 $2").into_owned()
}

// ── Rule 2: punctuation followed by a letter ─────────────────────────────────

static RE_PUNCT_LETTER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([.,!?;:])([a-zA-Z])").unwrap());

fn space_after_punctuation(input: &str) -> String {
    RE_PUNCT_LETTER.replace_all(input, "$1 $2").into_owned()
}

// ── Rule 3: double quotes ────────────────────────────────────────────────────

static RE_QUOTE_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r#"(")(\w)"#).unwrap());
static RE_WORD_QUOTE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"(\w)(")"#).unwrap());

fn space_around_quotes(input: &str) -> String {
    let s = RE_QUOTE_WORD.replace_all(input, "$1 $2");
    RE_WORD_QUOTE.replace_all(&s, "$1 $2").into_owned()
}

// ── Rule 4: parentheses ──────────────────────────────────────────────────────

static RE_CLOSE_PAREN_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\))(\w)").unwrap());
static RE_WORD_OPEN_PAREN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\w)(\()").unwrap());

fn space_around_parentheses(input: &str) -> String {
    let s = RE_CLOSE_PAREN_WORD.replace_all(input, "$1 $2");
    RE_WORD_OPEN_PAREN.replace_all(&s, "$1 $2").into_owned()
}

// ── Rule 5: digits and letters ───────────────────────────────────────────────

static RE_DIGIT_LETTER: Lazy<Regex> = Lazy::new(|| Regex::new(r"([0-9])([a-zA-Z])").unwrap());
static RE_LETTER_DIGIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"([a-zA-Z])([0-9])").unwrap());

fn space_between_digits_and_letters(input: &str) -> String {
    let s = RE_DIGIT_LETTER.replace_all(input, "$1 $2");
    RE_LETTER_DIGIT.replace_all(&s, "$1 $2").into_owned()
}

// ── Rule 6: repeated spaces ──────────────────────────────────────────────────

static RE_SPACES: Lazy<Regex> = Lazy::new(|| Regex::new(r" {2,}").unwrap());

fn collapse_spaces(input: &str) -> String {
    RE_SPACES.replace_all(input, " ").into_owned()
}

// ── Rule 7: blank-line runs ──────────────────────────────────────────────────

// Lines holding only spaces count as blank.
static RE_BLANK_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n( *\n)+").unwrap());

fn collapse_blank_lines(input: &str) -> String {
    RE_BLANK_RUN.replace_all(input, "\n\n").into_owned()
}

// ── Rule 8: leading space after a newline ────────────────────────────────────

fn strip_line_leading_space(input: &str) -> String {
    input.replace("\n ", "\n")
}
