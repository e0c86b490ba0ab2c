//! Version sequencing for append-only lineages.
//!
//! Estimations are keyed by `(project, version)` and quotations by
//! `(project, estimate_version, version)`. The next version is read from the
//! store and the insert relies on the store's unique key; a collision is
//! retried a bounded number of times.

/// Number of insert attempts before a version collision is surfaced.
pub const MAX_VERSION_ATTEMPTS: u32 = 3;

/// Returns the version that follows `latest` (1 when the lineage is empty).
#[must_use]
pub fn next_version(latest: Option<i32>) -> i32 {
    latest.map_or(1, |v| v + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_version_is_one() {
        assert_eq!(next_version(None), 1);
    }

    #[test]
    fn test_next_version_increments() {
        assert_eq!(next_version(Some(1)), 2);
        assert_eq!(next_version(Some(41)), 42);
    }
}
