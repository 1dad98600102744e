use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;
use tracing::info;
use tracing::warn;

use super::client::DispatchOutcome;
use super::client::LightClient;
use super::light::encode;
use crate::config::LightTarget;

/// Applies one desired power state to a set of lights
#[async_trait]
pub trait Dispatch: Send + Sync {
    /// Switch every target on or off, returning one outcome per target in
    /// target order. Never fails as a whole; per-light failures are in the
    /// outcomes.
    async fn apply_all(&self, targets: &[LightTarget], on: bool) -> Vec<DispatchOutcome>;
}

/// Fan-out dispatcher backed by a [`LightClient`]
///
/// Each light is driven from its own task so a slow or unreachable light
/// neither delays nor affects the others. The same `(targets, on)` always
/// produces the same requests.
#[derive(Debug)]
pub struct Dispatcher<C> {
    client: Arc<C>,
}

impl<C: LightClient + 'static> Dispatcher<C> {
    pub fn new(client: Arc<C>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &Arc<C> {
        &self.client
    }
}

#[async_trait]
impl<C: LightClient + 'static> Dispatch for Dispatcher<C> {
    async fn apply_all(&self, targets: &[LightTarget], on: bool) -> Vec<DispatchOutcome> {
        let handles: Vec<_> = targets
            .iter()
            .map(|target| {
                let client = Arc::clone(&self.client);
                let address = target.address.clone();
                let payload = encode(target, on);
                tokio::spawn(async move { client.apply(&address, &payload).await })
            })
            .collect();

        let mut outcomes = Vec::with_capacity(targets.len());
        for (target, handle) in targets.iter().zip(handles) {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(e) => DispatchOutcome::failed(&target.address, on, format!("task failed: {}", e)),
            };
            log_outcome(target, &outcome);
            outcomes.push(outcome);
        }

        outcomes
    }
}

/// Logs what would be sent without contacting any light
///
/// Every outcome is reported as a success.
#[derive(Debug, Default, Clone, Copy)]
pub struct DryRun;

#[async_trait]
impl Dispatch for DryRun {
    async fn apply_all(&self, targets: &[LightTarget], on: bool) -> Vec<DispatchOutcome> {
        info!(
            "Would turn {} lights {}",
            targets.len(),
            if on { "ON" } else { "OFF" }
        );
        targets
            .iter()
            .map(|target| {
                debug!(
                    "[{}] {}",
                    target.address,
                    serde_json::to_string(&encode(target, on)).unwrap_or_default()
                );
                DispatchOutcome::ok(&target.address, on)
            })
            .collect()
    }
}

fn log_outcome(target: &LightTarget, outcome: &DispatchOutcome) {
    match (&outcome.error, outcome.on) {
        (None, true) => info!(
            "[{}] ON (brightness={}%, temp={}K) - OK",
            outcome.address,
            target.brightness,
            target.temperature_kelvin()
        ),
        (None, false) => info!("[{}] OFF - OK", outcome.address),
        (Some(error), on) => warn!(
            "[{}] {} FAILED - {}",
            outcome.address,
            if on { "ON" } else { "OFF" },
            error
        ),
    }
}

/// Count of failed outcomes
pub fn failures(outcomes: &[DispatchOutcome]) -> usize {
    outcomes.iter().filter(|o| !o.succeeded()).count()
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroU32;

    use super::*;
    use crate::integrations::elgato::client::MockLightClient;
    use crate::integrations::elgato::light::encode_off;
    use crate::integrations::elgato::light::encode_on;
    use crate::integrations::elgato::light::LightStatus;
    use crate::integrations::elgato::light::LightsPayload;

    fn targets() -> Vec<LightTarget> {
        vec![
            LightTarget::new("10.0.0.1", 50, NonZeroU32::new(4500).unwrap()),
            LightTarget::with_defaults("10.0.0.2"),
            LightTarget::new("10.0.0.3", 10, NonZeroU32::new(3200).unwrap()),
        ]
    }

    #[tokio::test]
    async fn test_failing_light_is_isolated() {
        let client = Arc::new(MockLightClient::failing_on(&["10.0.0.2"]));
        let dispatcher = Dispatcher::new(Arc::clone(&client));

        let outcomes = dispatcher.apply_all(&targets(), true).await;

        assert_eq!(outcomes.len(), 3);
        assert_eq!(
            outcomes,
            vec![
                DispatchOutcome::ok("10.0.0.1", true),
                DispatchOutcome::failed("10.0.0.2", true, "connection refused"),
                DispatchOutcome::ok("10.0.0.3", true),
            ]
        );
        assert_eq!(failures(&outcomes), 1);
        assert_eq!(client.requests().len(), 3);
    }

    #[tokio::test]
    async fn test_payloads_per_light() {
        let client = Arc::new(MockLightClient::new());
        let dispatcher = Dispatcher::new(Arc::clone(&client));
        let targets = targets();

        dispatcher.apply_all(&targets, true).await;
        dispatcher.apply_all(&targets, false).await;

        let mut requests = client.requests();
        let (on_requests, off_requests) = requests.split_at_mut(3);
        on_requests.sort_by(|a, b| a.0.cmp(&b.0));

        for ((address, payload), target) in on_requests.iter().zip(&targets) {
            assert_eq!(address, &target.address);
            assert_eq!(payload, &encode_on(target));
        }
        for (_, payload) in off_requests.iter() {
            assert_eq!(payload, &encode_off());
        }
    }

    #[tokio::test]
    async fn test_repeated_dispatch_is_idempotent() {
        let client = Arc::new(MockLightClient::new());
        let dispatcher = Dispatcher::new(Arc::clone(&client));
        let targets = targets();

        let first = dispatcher.apply_all(&targets, false).await;
        let second = dispatcher.apply_all(&targets, false).await;
        assert_eq!(first, second);

        let mut requests = client.requests();
        requests.sort_by(|a, b| a.0.cmp(&b.0));
        let payloads: Vec<&LightsPayload> = requests.iter().map(|(_, p)| p).collect();
        assert!(payloads.iter().all(|p| **p == encode_off()));
        assert_eq!(payloads.len(), 6);
    }

    #[tokio::test]
    async fn test_no_targets() {
        let dispatcher = Dispatcher::new(Arc::new(MockLightClient::new()));
        assert!(dispatcher.apply_all(&[], true).await.is_empty());
    }

    #[tokio::test]
    async fn test_dry_run_reports_success() {
        let outcomes = DryRun.apply_all(&targets(), true).await;

        assert_eq!(outcomes.len(), 3);
        assert_eq!(failures(&outcomes), 0);
        assert_eq!(outcomes[2], DispatchOutcome::ok("10.0.0.3", true));
    }

    #[tokio::test]
    async fn test_query_status_through_client() {
        let mut client = MockLightClient::new();
        client.statuses.insert(
            "10.0.0.1".to_string(),
            LightStatus {
                on: true,
                brightness: Some(50),
                temperature: Some(222),
            },
        );
        let dispatcher = Dispatcher::new(Arc::new(client));

        let status = dispatcher.client().query_status("10.0.0.1").await.unwrap();
        assert!(status.on);
        assert!(dispatcher.client().query_status("10.0.0.2").await.is_none());
    }
}
