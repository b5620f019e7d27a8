//! Livelock prevention: did the last iteration actually resolve anything?
//!
//! Progress requires that at least one question *text* disappear from the
//! outstanding set. Comparison runs on a normalized form so cosmetic
//! rewording (case, punctuation, spacing) does not count as progress;
//! genuine paraphrase past that floor can still slip through, which the
//! design accepts.

use scopehound_core::state::normalized_set;

/// True when the just-completed iteration left the outstanding question
/// set unchanged.
pub fn no_progress(missing_before: &[String], missing_after: &[String]) -> bool {
    normalized_set(missing_before) == normalized_set(missing_after)
}
