//! Model reply post-processing.

use serde::Serialize;

use super::acronyms::AcronymDictionary;
use super::header::{is_bypass_line, parse_header, ResponseStyle};

/// How a reply was interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplyMode {
    /// Header present, acronym style applied
    Compressed,
    /// No header, returned verbatim
    Normal,
    /// Model declined with the bypass sentinel
    Bypass,
}

/// Processed reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessedReply {
    /// Reply text with header or sentinel removed
    pub text: String,
    /// Interpretation
    pub mode: ReplyMode,
    /// A valid header was found
    pub header_ok: bool,
}

/// Interpret a raw model reply.
///
/// The first line decides: bypass sentinel, valid header, or neither.
pub fn process_reply(raw: &str, style: ResponseStyle, dict: &AcronymDictionary) -> ProcessedReply {
    let raw = raw.trim();
    let (first, rest) = match raw.split_once('\n') {
        Some((first, rest)) => (first.trim_end_matches('\r'), rest),
        None => (raw, ""),
    };

    if is_bypass_line(first) {
        return ProcessedReply {
            text: rest.to_string(),
            mode: ReplyMode::Bypass,
            header_ok: false,
        };
    }

    if parse_header(first).is_none() {
        return ProcessedReply {
            text: raw.to_string(),
            mode: ReplyMode::Normal,
            header_ok: false,
        };
    }

    let text = match style {
        ResponseStyle::Strict => dict.collapse_full_terms(rest),
        ResponseStyle::FirstMention => dict.expand_first_mentions(rest),
    };

    ProcessedReply {
        text,
        mode: ReplyMode::Compressed,
        header_ok: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "#PROTOCOL v1; model=gpt-4o; dict=default; tokens_target=short";

    #[test]
    fn test_first_mention() {
        let dict = AcronymDictionary::builtin();
        let reply = process_reply(
            &format!("{HEADER}\nAI improves UX. AI scales."),
            ResponseStyle::FirstMention,
            &dict,
        );
        assert_eq!(reply.mode, ReplyMode::Compressed);
        assert!(reply.header_ok);
        assert_eq!(
            reply.text,
            "artificial intelligence (AI) improves user experience (UX). AI scales."
        );
    }

    #[test]
    fn test_strict() {
        let dict = AcronymDictionary::builtin();
        let reply = process_reply(
            &format!("{HEADER}\r\nmachine learning (ML) beats NLP."),
            ResponseStyle::Strict,
            &dict,
        );
        assert_eq!(reply.text, "ML beats NLP.");
    }

    #[test]
    fn test_bypass() {
        let dict = AcronymDictionary::builtin();
        let reply = process_reply("#PROTOCOL BYPASS\nplain answer\nline two", ResponseStyle::Strict, &dict);
        assert_eq!(reply.mode, ReplyMode::Bypass);
        assert!(!reply.header_ok);
        assert_eq!(reply.text, "plain answer\nline two");
    }

    #[test]
    fn test_normal() {
        let dict = AcronymDictionary::builtin();
        let reply = process_reply("  Just AI text.  ", ResponseStyle::FirstMention, &dict);
        assert_eq!(reply.mode, ReplyMode::Normal);
        assert_eq!(reply.text, "Just AI text.");
    }

    #[test]
    fn test_header_only() {
        let dict = AcronymDictionary::builtin();
        let reply = process_reply(HEADER, ResponseStyle::FirstMention, &dict);
        assert_eq!(reply.mode, ReplyMode::Compressed);
        assert_eq!(reply.text, "");
    }
}
