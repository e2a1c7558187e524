//! Best-of selection over candidate codec outputs.

use super::CodecResult;

/// Pick the candidate with the fewest post-transform tokens.
///
/// Ties go to the earliest candidate, so registration order is the
/// tie-break. Returns `None` for an empty candidate list.
pub fn select_best(candidates: Vec<CodecResult>) -> Option<CodecResult> {
    let mut best: Option<CodecResult> = None;
    for candidate in candidates {
        match &best {
            Some(current) if candidate.post_tokens >= current.post_tokens => {},
            _ => best = Some(candidate),
        }
    }
    best
}
