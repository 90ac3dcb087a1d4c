//! Error types for the monitor layer.

use crate::fetch::FetchError;
use thiserror::Error;

/// Error type for a poll cycle.
///
/// A cycle error aborts only the cycle in which it occurred. Dedup state is
/// left exactly as it was before the cycle, and the worker retries on its
/// next scheduled cycle.
#[derive(Debug, Error)]
pub enum CycleError {
    /// A transport-level fetch failure, treated as systemic.
    #[error("Transport failure while fetching '{source_name}': {source}")]
    Transport {
        /// Name of the source whose fetch failed.
        source_name: String,
        /// The underlying fetch error.
        #[source]
        source: FetchError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn transport_displays_source_name_and_cause() {
        let error = CycleError::Transport {
            source_name: "MDX".to_string(),
            source: FetchError::Timeout,
        };

        assert_eq!(
            error.to_string(),
            "Transport failure while fetching 'MDX': Request timed out"
        );
    }

    #[test]
    fn transport_preserves_source_chain() {
        let error = CycleError::Transport {
            source_name: "MDX".to_string(),
            source: FetchError::Timeout,
        };

        let source = error.source();
        assert!(source.is_some());
        assert!(source.unwrap().to_string().contains("timed out"));
    }
}
