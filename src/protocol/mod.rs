//! Response compaction protocol.
//!
//! The request side asks the model to answer tersely by prepending a
//! directive to the system prompt. The response side interprets what comes
//! back.
//!
//! # Directive
//!
//! ```text
//! #PROTOCOL v1; model=<m>; dict=<v>; tokens_target=short; response_style=<STRICT|FIRST_MENTION>
//! ```
//!
//! `#CRUXRC` is accepted in place of `#PROTOCOL` when parsing.
//!
//! # Reply handling
//!
//! | First line        | Mode         | Result                                        |
//! |-------------------|--------------|-----------------------------------------------|
//! | `#PROTOCOL BYPASS`| `bypass`     | remaining lines verbatim                      |
//! | valid directive   | `compressed` | STRICT collapses `full term (ACR)` to `ACR`;  |
//! |                   |              | FIRST_MENTION expands the first `ACR` of each |
//! | anything else     | `normal`     | reply verbatim                                |
//!
//! Acronym matching is whole-word and case-sensitive on the acronym.

mod acronyms;
mod header;
mod reply;

pub use acronyms::{AcronymDictionary, BUILTIN_ACRONYMS};
pub use header::{
    build_system_prompt, is_bypass_line, parse_header, ProtocolHeader, ResponseStyle,
    BYPASS_SENTINEL, PROTOCOL_TAG, PROTOCOL_VERSION,
};
pub use reply::{process_reply, ProcessedReply, ReplyMode};

use crate::config::ProtocolConfig;

/// Configured protocol: dictionary version, default style and acronyms
#[derive(Debug, Clone)]
pub struct ResponseProtocol {
    /// Dictionary version advertised in the directive
    pub dict_version: String,
    /// Default acronym style
    pub style: ResponseStyle,
    dictionary: AcronymDictionary,
}

impl Default for ResponseProtocol {
    fn default() -> Self {
        Self::from_config(&ProtocolConfig::default())
    }
}

impl ResponseProtocol {
    /// Build from configuration
    pub fn from_config(config: &ProtocolConfig) -> Self {
        Self {
            dict_version: config.dict_version.clone(),
            style: config.response_style,
            dictionary: AcronymDictionary::with_extra(&config.acronyms),
        }
    }

    /// Override the default style
    pub fn with_style(mut self, style: ResponseStyle) -> Self {
        self.style = style;
        self
    }

    /// Acronym dictionary
    pub fn dictionary(&self) -> &AcronymDictionary {
        &self.dictionary
    }

    /// System prompt for `model` in the default style
    pub fn system_prompt(&self, model: &str) -> String {
        build_system_prompt(model, &self.dict_version, self.style)
    }

    /// Interpret a reply in the default style
    pub fn process(&self, raw: &str) -> ProcessedReply {
        process_reply(raw, self.style, &self.dictionary)
    }
}
