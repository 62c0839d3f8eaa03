use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::{AggregatedError, ProviderError};
use crate::provider::Provider;
use crate::types::Sourced;

/// Run `call` against each provider in order until one succeeds.
///
/// Each attempt is bounded by `timeout`; an attempt that exceeds it is
/// dropped, which aborts the in-flight request, and counts as a failure.
/// Providers after the first success are never invoked.
pub async fn try_in_order<P, T, F, Fut>(
    capability: &str,
    providers: &[Arc<P>],
    timeout: Duration,
    mut call: F,
) -> Result<Sourced<T>, AggregatedError>
where
    P: Provider + ?Sized,
    F: FnMut(Arc<P>) -> Fut,
    Fut: Future<Output = Result<T, ProviderError>>,
{
    let mut failures = AggregatedError::new(capability);

    for provider in providers {
        let name = provider.name().to_string();
        debug!(capability, provider = %name, "trying provider");

        let outcome = match tokio::time::timeout(timeout, call(Arc::clone(provider))).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::Timeout(timeout.as_millis() as u64)),
        };

        match outcome {
            Ok(value) => {
                debug!(capability, provider = %name, "provider succeeded");
                return Ok(Sourced {
                    value,
                    source: name,
                });
            }
            Err(err) => {
                warn!(capability, provider = %name, reason = %err, "provider failed");
                failures.push(name, err);
            }
        }
    }

    Err(failures)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Fake {
        name: &'static str,
        outcome: Result<u32, ProviderError>,
        delay: Duration,
        calls: AtomicUsize,
    }

    impl Fake {
        fn new(name: &'static str, outcome: Result<u32, ProviderError>) -> Arc<Self> {
            Self::slow(name, outcome, Duration::ZERO)
        }

        fn slow(name: &'static str, outcome: Result<u32, ProviderError>, delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                name,
                outcome,
                delay,
                calls: AtomicUsize::new(0),
            })
        }

        async fn call(&self) -> Result<u32, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.outcome.clone()
        }
    }

    impl Provider for Fake {
        fn name(&self) -> &str {
            self.name
        }
    }

    const TIMEOUT: Duration = Duration::from_secs(8);

    #[tokio::test]
    async fn first_success_wins_and_later_providers_are_skipped() {
        let a = Fake::new("A", Err(ProviderError::Http { status: 500 }));
        let b = Fake::new("B", Ok(7));
        let c = Fake::new("C", Ok(9));
        let providers = vec![a.clone(), b.clone(), c.clone()];

        let result = try_in_order("balance", &providers, TIMEOUT, |p| async move { p.call().await })
            .await
            .unwrap();

        assert_eq!(result.value, 7);
        assert_eq!(result.source, "B");
        assert_eq!(a.calls.load(Ordering::SeqCst), 1);
        assert_eq!(b.calls.load(Ordering::SeqCst), 1);
        assert_eq!(c.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn all_failures_are_aggregated_in_order() {
        let providers = vec![
            Fake::new("A", Err(ProviderError::Http { status: 503 })),
            Fake::new("B", Err(ProviderError::MissingField("data".into()))),
        ];

        let err = try_in_order("balance", &providers, TIMEOUT, |p| async move { p.call().await })
            .await
            .unwrap_err();

        assert_eq!(err.failures.len(), 2);
        assert_eq!(
            err.to_string(),
            "all balance providers failed: A: HTTP 503; B: missing field: data"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn slow_provider_times_out_and_next_is_tried() {
        let slow = Fake::slow("Slow", Ok(1), Duration::from_secs(30));
        let fast = Fake::new("Fast", Ok(2));
        let providers = vec![slow.clone(), fast.clone()];

        let result = try_in_order("fee", &providers, TIMEOUT, |p| async move { p.call().await })
            .await
            .unwrap();

        assert_eq!(result.value, 2);
        assert_eq!(result.source, "Fast");
        assert_eq!(slow.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_is_reported_as_failure() {
        let providers = vec![Fake::slow("Slow", Ok(1), Duration::from_secs(9))];
        let err = try_in_order("fee", &providers, TIMEOUT, |p| async move { p.call().await })
            .await
            .unwrap_err();
        assert_eq!(err.failures[0].1, ProviderError::Timeout(8_000));
    }

    #[tokio::test]
    async fn empty_provider_list_fails() {
        let providers: Vec<Arc<Fake>> = Vec::new();
        let err = try_in_order("price", &providers, TIMEOUT, |p| async move { p.call().await })
            .await
            .unwrap_err();
        assert!(err.failures.is_empty());
        assert!(err.to_string().contains("no providers configured"));
    }
}
