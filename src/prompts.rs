//! Prompts for the LLM translator and vocabulary extractor, plus the parsing
//! of the sections the prompts ask the model to emit.
//!
//! Keeping prompts and their response markers side by side means a change to
//! one cannot silently break the other; the unit tests below pin both.

use once_cell::sync::Lazy;
use regex::Regex;

/// Opening marker of the translation section in a reply.
pub const TRANSLATION_BEGIN: &str = "===BEGIN TRANSLATION===";
/// Closing marker of the translation section in a reply.
pub const TRANSLATION_END: &str = "===END TRANSLATION===";
/// Heading that introduces the vocabulary list in a reply.
pub const VOCABULARY_MARKER: &str = "Key vocabulary:";
/// Returned when no chunk yielded any vocabulary.
pub const NO_VOCABULARY: &str = "No vocabulary section found.";

/// System prompt for translation requests.
pub fn translation_system_prompt(target_language: &str) -> String {
    format!(
        "You are a professional translator. Translate English text into fluent, natural \
{target_language}. Keep paragraph breaks. Reply strictly in the requested format."
    )
}

/// User message for one translation chunk.
pub fn translation_user_prompt(text: &str) -> String {
    format!(
        "Translate the following text. Reply in exactly this format:\n\n\
{TRANSLATION_BEGIN}\n<translation>\n{TRANSLATION_END}\n\n\
Text:\n\n{text}"
    )
}

/// System prompt for vocabulary requests.
pub fn vocabulary_system_prompt(target_language: &str) -> String {
    format!(
        "You are an English vocabulary specialist. From a given English text, pick out the \
difficult, academic and technical words in order of appearance, without repeats, and \
explain each in {target_language}."
    )
}

/// User message for one vocabulary chunk.
pub fn vocabulary_user_prompt(text: &str) -> String {
    format!(
        "Extract the important and technical vocabulary from the text below.\n\
1. Keep the order in which the words appear.\n\
2. List each word once.\n\
3. Do not translate the text itself.\n\n\
Reply in exactly this format:\n\n\
{VOCABULARY_MARKER}\n\
1. <word>: <meaning> - <example sentence>\n\
2. <word>: <meaning> - <example sentence>\n\n\
Text:\n\n{text}"
    )
}

/// The translation between the markers, or the whole reply when they are absent.
pub fn extract_translation_section(reply: &str) -> String {
    if let Some(start) = reply.find(TRANSLATION_BEGIN) {
        let body = &reply[start + TRANSLATION_BEGIN.len()..];
        if let Some(end) = body.find(TRANSLATION_END) {
            return body[..end].trim().to_string();
        }
    }
    reply.trim().to_string()
}

static RE_NUMBERED_ENTRY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*\d+\.\s+[^\n:：]+[：:]\s*\S").unwrap());

/// The vocabulary section of a reply, or `None` when it has none.
///
/// Accepts the section after [`VOCABULARY_MARKER`], or a bare numbered
/// `word: meaning` list.
pub fn extract_vocabulary_section(reply: &str) -> Option<String> {
    if let Some(start) = reply.find(VOCABULARY_MARKER) {
        let body = reply[start + VOCABULARY_MARKER.len()..].trim();
        return Some(format!("{VOCABULARY_MARKER}\n{body}"));
    }
    if RE_NUMBERED_ENTRY.is_match(reply) {
        return Some(format!("{VOCABULARY_MARKER}\n{}", reply.trim()));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translation_prompt_carries_markers_and_text() {
        let p = translation_user_prompt("Hello world");
        assert!(p.contains(TRANSLATION_BEGIN));
        assert!(p.contains(TRANSLATION_END));
        assert!(p.ends_with("Hello world"));
        assert!(translation_system_prompt("French").contains("French"));
    }

    #[test]
    fn vocabulary_prompt_asks_for_marker() {
        assert!(vocabulary_user_prompt("x").contains(VOCABULARY_MARKER));
    }

    #[test]
    fn translation_between_markers() {
        let reply = format!("preamble\n{TRANSLATION_BEGIN}\n  Bonjour  \n{TRANSLATION_END}\ntrailer");
        assert_eq!(extract_translation_section(&reply), "Bonjour");
    }

    #[test]
    fn translation_without_markers_is_whole_reply() {
        assert_eq!(extract_translation_section("  Hola \n"), "Hola");
        let unterminated = format!("{TRANSLATION_BEGIN} half");
        assert_eq!(extract_translation_section(&unterminated), unterminated);
    }

    #[test]
    fn vocabulary_after_marker() {
        let reply = "Sure!\nKey vocabulary:\n1. ubiquitous: everywhere";
        assert_eq!(
            extract_vocabulary_section(reply).unwrap(),
            "Key vocabulary:\n1. ubiquitous: everywhere"
        );
    }

    #[test]
    fn bare_numbered_list_is_vocabulary() {
        let reply = "1. ephemeral: short-lived - An ephemeral trend.\n2. arcane: obscure";
        let v = extract_vocabulary_section(reply).unwrap();
        assert!(v.starts_with(VOCABULARY_MARKER));
        assert!(v.contains("arcane"));
    }

    #[test]
    fn reply_without_vocabulary() {
        assert_eq!(extract_vocabulary_section("I cannot help with that."), None);
    }
}
