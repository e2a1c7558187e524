//! Hex codec.
//!
//! Encodes the UTF-8 bytes as lowercase hex pairs separated by single
//! spaces. Lossless and reversible, but it always expands prose: every
//! byte becomes its own word. It is a best-of candidate, never a default.

use crate::error::{CruxError, Result};

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

/// Hex codec
#[derive(Debug, Clone, Copy, Default)]
pub struct HexCodec;

impl HexCodec {
    /// Create new hex codec
    pub fn new() -> Self {
        Self
    }

    /// Encode text as space-separated hex byte pairs
    ///
    /// # Example
    /// ```
    /// use crux::codec::HexCodec;
    ///
    /// assert_eq!(HexCodec::new().encode("Hi!"), "48 69 21");
    /// ```
    pub fn encode(&self, text: &str) -> String {
        let bytes = text.as_bytes();
        let mut out = String::with_capacity(bytes.len() * 3);
        for (i, byte) in bytes.iter().enumerate() {
            if i > 0 {
                out.push(' ');
            }
            out.push(HEX_DIGITS[(byte >> 4) as usize] as char);
            out.push(HEX_DIGITS[(byte & 0x0f) as usize] as char);
        }
        out
    }

    /// Decode hex pairs back to text
    pub fn decode(&self, encoded: &str) -> Result<String> {
        let bytes = encoded
            .split_whitespace()
            .map(|pair| {
                if pair.len() != 2 {
                    return Err(CruxError::Decode(format!("Invalid hex pair: {pair}")));
                }
                u8::from_str_radix(pair, 16)
                    .map_err(|e| CruxError::Decode(format!("Invalid hex pair {pair}: {e}")))
            })
            .collect::<Result<Vec<u8>>>()?;

        String::from_utf8(bytes).map_err(|e| CruxError::Decode(e.to_string()))
    }
}
