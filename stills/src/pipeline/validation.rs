//! Validation gate: runs every validator against an artifact and ANDs the results.

use std::path::Path;
use std::sync::Arc;

use futures::future::join_all;
use tracing::{info, warn};

use super::traits::Validator;

/// Check `artifact` against every validator.
///
/// All validators run concurrently and to completion, even after one has
/// failed. A validator that returns an error counts as a failed validation.
/// An empty validator list always passes.
pub async fn validate(artifact: &Path, validators: &[Arc<dyn Validator>]) -> bool {
    if validators.is_empty() {
        return true;
    }

    let checks = validators.iter().map(|validator| async move {
        info!(validator = %validator.name(), artifact = %artifact.display(), "Validating");
        match validator.validate(artifact).await {
            Ok(true) => true,
            Ok(false) => {
                info!(validator = %validator.name(), "Validation failed");
                false
            }
            Err(e) => {
                warn!(
                    validator = %validator.name(),
                    error = %e,
                    "Validator errored, treating as failed validation"
                );
                false
            }
        }
    });

    join_all(checks).await.into_iter().all(|passed| passed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Result;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Fixed {
        name: &'static str,
        outcome: Option<bool>,
        calls: AtomicUsize,
    }

    impl Fixed {
        fn new(name: &'static str, outcome: Option<bool>) -> Arc<Self> {
            Arc::new(Self {
                name,
                outcome,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl Validator for Fixed {
        fn name(&self) -> &str {
            self.name
        }

        async fn validate(&self, _artifact: &Path) -> Result<bool> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.outcome
                .ok_or_else(|| crate::Error::validator(self.name, "detector crashed"))
        }
    }

    #[tokio::test]
    async fn test_empty_validators_pass() {
        assert!(validate(Path::new("missing.png"), &[]).await);
    }

    #[tokio::test]
    async fn test_all_pass() {
        let validators: Vec<Arc<dyn Validator>> =
            vec![Fixed::new("a", Some(true)), Fixed::new("b", Some(true))];
        assert!(validate(Path::new("x.png"), &validators).await);
    }

    #[tokio::test]
    async fn test_one_failure_fails_but_all_run() {
        let a = Fixed::new("a", Some(false));
        let b = Fixed::new("b", Some(true));
        let c = Fixed::new("c", Some(true));
        let validators: Vec<Arc<dyn Validator>> = vec![a.clone(), b.clone(), c.clone()];

        assert!(!validate(Path::new("x.png"), &validators).await);
        assert_eq!(a.calls.load(Ordering::SeqCst), 1);
        assert_eq!(b.calls.load(Ordering::SeqCst), 1);
        assert_eq!(c.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_validator_error_counts_as_failure() {
        let validators: Vec<Arc<dyn Validator>> =
            vec![Fixed::new("ok", Some(true)), Fixed::new("broken", None)];
        assert!(!validate(Path::new("x.png"), &validators).await);
    }
}
