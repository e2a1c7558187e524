//! Content-shape patterns shared by the prequalifier, the codec engine and
//! the semantic guard.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// A fenced block: opening and closing triple backticks
    pub(crate) static ref FENCED_CODE: Regex = Regex::new(r"(?s)```.*?```").expect("fenced code regex");

    /// An http(s) URL
    pub(crate) static ref URL: Regex = Regex::new(r"(?i)https?://").expect("url regex");

    /// Command-array assignment, e.g. `cmd = ["ls", "-la"]`
    pub(crate) static ref COMMAND_ARRAY: Regex =
        Regex::new(r"\b(?:cmd|command|args|argv)\s*=\s*\[").expect("command array regex");

    /// Function declaration in common languages
    pub(crate) static ref FUNCTION_DECL: Regex =
        Regex::new(r"\b(?:function|def|fn|func)\s+[A-Za-z_][A-Za-z0-9_]*\s*\(")
            .expect("function decl regex");

    /// Digits or arithmetic operators
    pub(crate) static ref MATH: Regex = Regex::new(r"[0-9=+\-*/]").expect("math regex");

    /// Alphanumeric/underscore word
    pub(crate) static ref WORD: Regex = Regex::new(r"[A-Za-z0-9_]+").expect("word regex");
}
