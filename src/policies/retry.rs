//! # Retry whitelist.
//!
//! [`RetrySet`] holds the failure categories a loop treats as transient.
//! A whitelisted failure is absorbed with a short backoff and the cycle is
//! retried without advancing the schedule; everything else is fatal.
//!
//! ## Defaults
//! I/O failures, timeouts, and transport failures are whitelisted out of
//! the box. Membership is mutable at runtime through the loop's
//! `add_exception` / `remove_exception` / `reset_exceptions` surface.
//!
//! ## Rules
//! - Only retry-eligible kinds may be added ([`FailureKind::Fatal`] and
//!   [`FailureKind::Canceled`] are not failure categories that can be
//!   retried); invalid additions are logged at warn level and skipped,
//!   never raised.
//! - `reset` restores exactly the default membership.

use std::collections::HashSet;

use tracing::warn;

use crate::error::FailureKind;

/// Default transient categories: i/o, timeout, transport.
const DEFAULT_RETRYABLE: [FailureKind; 3] = [
    FailureKind::Io,
    FailureKind::Timeout,
    FailureKind::Transport,
];

/// Mutable set of failure categories considered transient/retryable.
///
/// ## Example
/// ```
/// use tickvisor::{FailureKind, RetrySet};
///
/// let mut retry = RetrySet::default();
/// assert!(retry.contains(FailureKind::Io));
/// assert!(!retry.contains(FailureKind::Other));
///
/// retry.add(FailureKind::Other);
/// assert!(retry.contains(FailureKind::Other));
///
/// // Not a failure category: logged and skipped, never an error.
/// retry.add(FailureKind::Canceled);
/// assert!(!retry.contains(FailureKind::Canceled));
/// ```
#[derive(Debug, Clone)]
pub struct RetrySet {
    kinds: HashSet<FailureKind>,
}

impl Default for RetrySet {
    fn default() -> Self {
        Self {
            kinds: DEFAULT_RETRYABLE.into_iter().collect(),
        }
    }
}

impl RetrySet {
    /// Adds a failure category to the whitelist.
    ///
    /// Kinds that are not retry-eligible are skipped with a warning; the
    /// set is left unchanged.
    pub fn add(&mut self, kind: FailureKind) {
        if !kind.is_retry_eligible() {
            warn!(
                kind = kind.as_label(),
                "not a retryable failure category, skipping"
            );
            return;
        }
        self.kinds.insert(kind);
    }

    /// Removes a failure category from the whitelist (no-op if absent).
    pub fn remove(&mut self, kind: FailureKind) {
        self.kinds.remove(&kind);
    }

    /// Restores the default membership (i/o, timeout, transport).
    pub fn reset(&mut self) {
        self.kinds = DEFAULT_RETRYABLE.into_iter().collect();
    }

    /// Whether the given category is currently whitelisted.
    pub fn contains(&self, kind: FailureKind) -> bool {
        self.kinds.contains(&kind)
    }

    /// Number of whitelisted categories.
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    /// Whether the whitelist is empty (every failure becomes fatal).
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_membership() {
        let retry = RetrySet::default();
        assert!(retry.contains(FailureKind::Io));
        assert!(retry.contains(FailureKind::Timeout));
        assert!(retry.contains(FailureKind::Transport));
        assert!(!retry.contains(FailureKind::Other));
        assert!(!retry.contains(FailureKind::Fatal));
        assert_eq!(retry.len(), 3);
    }

    #[test]
    fn test_add_and_remove() {
        let mut retry = RetrySet::default();
        retry.add(FailureKind::Other);
        assert!(retry.contains(FailureKind::Other));

        retry.remove(FailureKind::Io);
        assert!(!retry.contains(FailureKind::Io));
        assert_eq!(retry.len(), 3);
    }

    #[test]
    fn test_invalid_add_is_a_logged_no_op() {
        let mut retry = RetrySet::default();
        retry.add(FailureKind::Fatal);
        retry.add(FailureKind::Canceled);
        assert!(!retry.contains(FailureKind::Fatal));
        assert!(!retry.contains(FailureKind::Canceled));
        assert_eq!(retry.len(), 3);
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut retry = RetrySet::default();
        retry.add(FailureKind::Other);
        retry.remove(FailureKind::Timeout);
        retry.reset();

        assert!(retry.contains(FailureKind::Timeout));
        assert!(!retry.contains(FailureKind::Other));
        assert_eq!(retry.len(), 3);
    }

    #[test]
    fn test_emptied_set_whitelists_nothing() {
        let mut retry = RetrySet::default();
        retry.remove(FailureKind::Io);
        retry.remove(FailureKind::Timeout);
        retry.remove(FailureKind::Transport);
        assert!(retry.is_empty());
        assert!(!retry.contains(FailureKind::Io));
    }
}
