//! Capability negotiation over supported-format lists
//!
//! Negotiation narrows a component's supported formats to the subset a
//! remote peer also advertised. The operation is a pure, order-preserving
//! filter over an immutable input: callers keep their original list, and
//! an empty intersection is a normal outcome for the negotiating layer to
//! judge, not an error.

use super::MediaFormat;
use tracing::debug;

/// Restrict a supported-format list to the entries accepted by `keep`
///
/// Produces a new list preserving the original relative order. Empty
/// sentinel descriptors are never negotiable and are dropped regardless of
/// the predicate. Idempotent: restricting an already-restricted list with
/// the same predicate changes nothing.
pub fn restrict_formats<F, P>(formats: &[F], keep: P) -> Vec<F>
where
    F: MediaFormat + Clone,
    P: Fn(&F) -> bool,
{
    let restricted: Vec<F> = formats
        .iter()
        .filter(|f| !f.is_empty() && keep(f))
        .cloned()
        .collect();

    if restricted.len() != formats.len() {
        debug!(
            "capability restriction narrowed {} formats to {}",
            formats.len(),
            restricted.len()
        );
    }
    restricted
}

/// Find the first entry of `ours` that the peer also supports
///
/// Uses the negotiation identity rules: well-known formats match on
/// payload id, dynamic formats on `(id, name)`. Returns `None` when the
/// intersection is empty.
pub fn first_common_format<F>(ours: &[F], theirs: &[F]) -> Option<F>
where
    F: MediaFormat + Clone,
{
    ours.iter()
        .filter(|f| !f.is_empty())
        .find(|ours_fmt| theirs.iter().any(|t| ours_fmt.negotiation_matches(t)))
        .cloned()
}
