//! Identity codec: the passthrough baseline every other codec is measured against.

/// Passthrough codec
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityCodec;

impl IdentityCodec {
    /// Return the input unchanged
    pub fn encode(&self, text: &str) -> String {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity() {
        assert_eq!(IdentityCodec.encode("  as  is \n"), "  as  is \n");
        assert_eq!(IdentityCodec.encode(""), "");
    }
}
