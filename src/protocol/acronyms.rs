//! Acronym dictionary for response compaction.

use std::collections::{BTreeMap, HashSet};

use phf::phf_map;
use regex::{Captures, Regex};
use tracing::warn;

/// Built-in acronyms (ACRONYM → full term)
pub static BUILTIN_ACRONYMS: phf::Map<&'static str, &'static str> = phf_map! {
    "AI" => "artificial intelligence",
    "ML" => "machine learning",
    "NLP" => "natural language processing",
    "LLM" => "large language model",
    "UX" => "user experience",
};

/// Acronym dictionary with precompiled matchers
#[derive(Debug, Clone)]
pub struct AcronymDictionary {
    entries: BTreeMap<String, String>,
    /// `\b(AI|ML|...)\b`, case-sensitive
    mention: Option<Regex>,
    /// One `full term(s) (ACRONYM)` matcher per entry
    collapse: Vec<(Regex, String)>,
}

impl Default for AcronymDictionary {
    fn default() -> Self {
        Self::builtin()
    }
}

impl AcronymDictionary {
    /// Built-in entries only
    pub fn builtin() -> Self {
        Self::with_extra(&BTreeMap::new())
    }

    /// Built-in entries with `extra` merged over them
    pub fn with_extra(extra: &BTreeMap<String, String>) -> Self {
        let mut entries: BTreeMap<String, String> = BUILTIN_ACRONYMS
            .entries()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        for (acronym, term) in extra {
            let acronym = acronym.trim();
            let term = term.trim();
            if acronym.is_empty()
                || term.is_empty()
                || !acronym.chars().all(|c| c.is_ascii_alphanumeric())
            {
                warn!(acronym, "Ignoring invalid acronym entry");
                continue;
            }
            entries.insert(acronym.to_string(), term.to_string());
        }

        Self::compile(entries)
    }

    fn compile(entries: BTreeMap<String, String>) -> Self {
        // Longest first so `NLP` is tried before a hypothetical `NL`
        let mut keys: Vec<&String> = entries.keys().collect();
        keys.sort_by_key(|k| std::cmp::Reverse(k.len()));
        let alternation = keys
            .iter()
            .map(|k| regex::escape(k))
            .collect::<Vec<_>>()
            .join("|");

        let mention = if alternation.is_empty() {
            None
        } else {
            Regex::new(&format!(r"\b({alternation})\b"))
                .map_err(|e| warn!(error = %e, "Acronym matcher failed to compile"))
                .ok()
        };

        let collapse = entries
            .iter()
            .filter_map(|(acronym, term)| {
                let pattern = format!(
                    r"(?i:\b{}s?)\s*\({}\)",
                    regex::escape(term),
                    regex::escape(acronym)
                );
                Regex::new(&pattern)
                    .map_err(|e| warn!(acronym = %acronym, error = %e, "Collapse matcher failed to compile"))
                    .ok()
                    .map(|re| (re, acronym.clone()))
            })
            .collect();

        Self {
            entries,
            mention,
            collapse,
        }
    }

    /// Full term for an acronym
    pub fn get(&self, acronym: &str) -> Option<&str> {
        self.entries.get(acronym).map(String::as_str)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the dictionary is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in acronym order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Expand the first whole-word occurrence of each acronym to
    /// `full term (ACRONYM)`; later occurrences stay as they are.
    pub fn expand_first_mentions(&self, text: &str) -> String {
        let Some(mention) = &self.mention else {
            return text.to_string();
        };

        let mut seen: HashSet<String> = HashSet::new();
        mention
            .replace_all(text, |caps: &Captures| {
                let acronym = &caps[1];
                match self.get(acronym) {
                    Some(term) if seen.insert(acronym.to_string()) => {
                        format!("{term} ({acronym})")
                    },
                    _ => acronym.to_string(),
                }
            })
            .into_owned()
    }

    /// Collapse every `full term (ACRONYM)` to the bare acronym
    pub fn collapse_full_terms(&self, text: &str) -> String {
        self.collapse
            .iter()
            .fold(text.to_string(), |acc, (re, acronym)| {
                re.replace_all(&acc, acronym.as_str()).into_owned()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin() {
        let dict = AcronymDictionary::builtin();
        assert_eq!(dict.len(), 5);
        assert_eq!(dict.get("LLM"), Some("large language model"));
        assert_eq!(dict.get("llm"), None);
    }

    #[test]
    fn test_expand_first_mention_only() {
        let dict = AcronymDictionary::builtin();
        assert_eq!(
            dict.expand_first_mentions("AI helps ML. AI again, ML again."),
            "artificial intelligence (AI) helps machine learning (ML). AI again, ML again."
        );
    }

    #[test]
    fn test_expand_whole_word_case_sensitive() {
        let dict = AcronymDictionary::builtin();
        assert_eq!(dict.expand_first_mentions("MAIL ai UXD"), "MAIL ai UXD");
    }

    #[test]
    fn test_collapse() {
        let dict = AcronymDictionary::builtin();
        assert_eq!(
            dict.collapse_full_terms("Large Language Models (LLM) and user experience(UX)."),
            "LLM and UX."
        );
        assert_eq!(dict.collapse_full_terms("plain AI"), "plain AI");
    }

    #[test]
    fn test_extra_entries_merge() {
        let mut extra = BTreeMap::new();
        extra.insert("RAG".to_string(), "retrieval augmented generation".to_string());
        extra.insert("AI".to_string(), "applied intelligence".to_string());
        extra.insert("bad key".to_string(), "ignored".to_string());
        let dict = AcronymDictionary::with_extra(&extra);
        assert_eq!(dict.len(), 6);
        assert_eq!(dict.get("AI"), Some("applied intelligence"));
        assert_eq!(
            dict.expand_first_mentions("RAG"),
            "retrieval augmented generation (RAG)"
        );
    }
}
