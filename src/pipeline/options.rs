//! Per-call compression options.

use std::sync::Arc;

use crate::codec::{CancelToken, CodecName, TextTransformer};
use crate::error::{CruxError, Result};

/// Options for one [`Orchestrator::compress`](super::Orchestrator::compress) call
#[derive(Clone, Default)]
pub struct CompressOptions {
    /// Target model id (required, non-empty)
    pub model: String,
    /// Provider id; inferred from the model id when absent
    pub provider: Option<String>,
    /// Estimated request cost in USD
    pub estimated_cost_usd: Option<f64>,
    /// Force a codec instead of the class strategy
    pub codec: Option<CodecName>,
    /// External transformer for the dictionary codec
    pub transformer: Option<Arc<dyn TextTransformer>>,
    /// Cancellation for the external transformer
    pub cancel: Option<CancelToken>,
}

impl CompressOptions {
    /// Options for a target model
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }

    /// Set provider id
    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Set estimated cost
    pub fn with_cost(mut self, cost_usd: f64) -> Self {
        self.estimated_cost_usd = Some(cost_usd);
        self
    }

    /// Force a codec
    pub fn with_codec(mut self, codec: CodecName) -> Self {
        self.codec = Some(codec);
        self
    }

    /// Attach an external transformer
    pub fn with_transformer(mut self, transformer: Arc<dyn TextTransformer>) -> Self {
        self.transformer = Some(transformer);
        self
    }

    /// Attach a cancellation token
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Reject malformed options
    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(CruxError::InvalidOptions("model must be non-empty".to_string()));
        }
        if let Some(cost) = self.estimated_cost_usd {
            if !cost.is_finite() || cost < 0.0 {
                return Err(CruxError::InvalidOptions(format!(
                    "estimated_cost_usd must be a non-negative number, got {cost}"
                )));
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for CompressOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompressOptions")
            .field("model", &self.model)
            .field("provider", &self.provider)
            .field("estimated_cost_usd", &self.estimated_cost_usd)
            .field("codec", &self.codec)
            .field("transformer", &self.transformer.is_some())
            .field("cancel", &self.cancel)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate() {
        assert!(CompressOptions::new("gpt-4o").validate().is_ok());
        assert!(CompressOptions::new("gpt-4o").with_cost(0.01).validate().is_ok());
        assert!(matches!(
            CompressOptions::new("  ").validate(),
            Err(CruxError::InvalidOptions(_))
        ));
        assert!(CompressOptions::new("m").with_cost(-1.0).validate().is_err());
        assert!(CompressOptions::new("m").with_cost(f64::NAN).validate().is_err());
    }

    #[test]
    fn test_builder() {
        let opts = CompressOptions::new("gpt-4o")
            .with_provider("openai")
            .with_codec(CodecName::Bracket);
        assert_eq!(opts.provider.as_deref(), Some("openai"));
        assert_eq!(opts.codec, Some(CodecName::Bracket));
        assert!(format!("{opts:?}").contains("transformer: false"));
    }
}
