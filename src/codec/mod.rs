//! Text codecs for token-efficient prompts.
//!
//! Every codec maps text to text. The engine measures each output against
//! the original with the same token counter, so results are comparable.
//!
//! # Codecs
//!
//! | Codec        | Transform                                  | Reversible        |
//! |--------------|--------------------------------------------|-------------------|
//! | `identity`   | passthrough                                | yes               |
//! | `hex`        | UTF-8 bytes as `48 69 21`                  | yes               |
//! | `bracket`    | run markers `[s3]`, `[n2]`, `[p.3]`        | yes (markers mode)|
//! | `dictionary` | `⟦dict:…⟧` header + `⟦i⟧` word indices     | yes (built-in)    |
//! | `hybrid`     | fewest tokens of the above                 | via the winner    |
//!
//! The dictionary codec can delegate to an external [`TextTransformer`]
//! (e.g. a remote model). The call is bounded by a timeout, honours a
//! [`CancelToken`] and degrades to identity on any failure.
//!
//! # Usage
//!
//! ```
//! use crux::codec::{CodecEngine, CodecName, TransformContext};
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let engine = CodecEngine::new();
//! let text = "loud!!!   and   spaced";
//! let result = engine.run(CodecName::Bracket, text, &TransformContext::default()).await;
//! assert_eq!(result.text, "loud[p!3][s3]and[s3]spaced");
//! assert_eq!(engine.restore(result.codec, &result.text).unwrap(), text);
//! # });
//! ```

mod algorithm;
mod bracket;
mod dictionary;
mod engine;
mod hex;
mod hybrid;
mod identity;
mod transform;

pub use algorithm::{CodecName, CodecResult};
pub use bracket::{BracketCodec, BracketMode};
pub use dictionary::{DictionaryCodec, DICT_HEADER_PREFIX};
pub use engine::{CodecEngine, ContentAnalysis};
pub use hex::HexCodec;
pub use hybrid::select_best;
pub use identity::IdentityCodec;
pub use transform::{run_transform, CancelToken, TextTransformer, TransformContext, TransformFuture};
