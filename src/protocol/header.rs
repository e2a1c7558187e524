//! Protocol directive header and system prompt.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Directive tag emitted in prompts
pub const PROTOCOL_TAG: &str = "#PROTOCOL";

/// Sentinel line a model replies with when it cannot comply
pub const BYPASS_SENTINEL: &str = "#PROTOCOL BYPASS";

/// Protocol version
pub const PROTOCOL_VERSION: &str = "v1";

lazy_static! {
    // `#CRUXRC` is accepted as an alias tag
    static ref HEADER: Regex = Regex::new(
        r"(?i)^#(?:PROTOCOL|CRUXRC) v1;\s*model=([^;]+);\s*dict=([^;]+);\s*tokens_target=(\w+)\s*(?:;\s*response_style=(STRICT|FIRST_MENTION))?\s*$"
    )
    .expect("protocol header regex");
    static ref BYPASS: Regex =
        Regex::new(r"(?i)^#(?:PROTOCOL|CRUXRC)\s+BYPASS").expect("bypass sentinel regex");
}

/// How the model should use acronyms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResponseStyle {
    /// Acronyms only, never full terms
    Strict,
    /// Full term on first occurrence, acronym after
    #[default]
    FirstMention,
}

impl ResponseStyle {
    /// Style as it appears in the header
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseStyle::Strict => "STRICT",
            ResponseStyle::FirstMention => "FIRST_MENTION",
        }
    }

    fn instruction(&self) -> &'static str {
        match self {
            ResponseStyle::Strict => "Use ONLY approved acronyms. Do NOT write full terms.",
            ResponseStyle::FirstMention => {
                "On first occurrence, write 'full term (ACRONYM)'. Thereafter, use acronym only."
            },
        }
    }
}

impl std::fmt::Display for ResponseStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ResponseStyle {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_uppercase().replace('-', "_").as_str() {
            "STRICT" => Ok(Self::Strict),
            "FIRST_MENTION" => Ok(Self::FirstMention),
            _ => Err(format!("Unknown response style: {s}")),
        }
    }
}

/// Parsed directive header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolHeader {
    /// Target model
    pub model: String,
    /// Dictionary version
    pub dict: String,
    /// Length target (e.g. `short`)
    pub tokens_target: String,
    /// Acronym style (FIRST_MENTION when omitted)
    pub response_style: ResponseStyle,
}

impl ProtocolHeader {
    /// Header for a model with the default `short` target
    pub fn new(model: impl Into<String>, dict: impl Into<String>, style: ResponseStyle) -> Self {
        Self {
            model: model.into(),
            dict: dict.into(),
            tokens_target: "short".to_string(),
            response_style: style,
        }
    }
}

impl std::fmt::Display for ProtocolHeader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{PROTOCOL_TAG} {PROTOCOL_VERSION}; model={}; dict={}; tokens_target={}; response_style={}",
            self.model, self.dict, self.tokens_target, self.response_style
        )
    }
}

/// Parse a directive line. Non-matching lines yield `None`.
pub fn parse_header(line: &str) -> Option<ProtocolHeader> {
    let caps = HEADER.captures(line.trim())?;
    let response_style = caps
        .get(4)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or_default();

    Some(ProtocolHeader {
        model: caps[1].trim().to_string(),
        dict: caps[2].trim().to_string(),
        tokens_target: caps[3].to_string(),
        response_style,
    })
}

/// Whether a line is the bypass sentinel
pub fn is_bypass_line(line: &str) -> bool {
    BYPASS.is_match(line.trim_start())
}

/// System prompt asking the model to answer in protocol form
///
/// # Example
/// ```
/// use crux::protocol::{build_system_prompt, parse_header, ResponseStyle};
///
/// let prompt = build_system_prompt("gpt-4o", "default", ResponseStyle::Strict);
/// let first = prompt.lines().next().unwrap();
/// assert_eq!(parse_header(first).unwrap().response_style, ResponseStyle::Strict);
/// ```
pub fn build_system_prompt(model: &str, dict_version: &str, style: ResponseStyle) -> String {
    let header = ProtocolHeader::new(model, dict_version, style);
    [
        header.to_string(),
        "Emit compressed answers using these guidelines:".to_string(),
        style.instruction().to_string(),
        "No decorative symbols. No extra commentary.".to_string(),
        format!("If you cannot comply, reply exactly '{BYPASS_SENTINEL}'."),
    ]
    .join("\n")
}
