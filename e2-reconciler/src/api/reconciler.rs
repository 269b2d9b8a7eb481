/********************************************************************************
 * Copyright (c) 2024 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

//! Outward [`E2Reconciler`] contract.

use crate::config::ReconcilerConfig;
use crate::control_plane::registry::SubscriptionRegistry;
use crate::control_plane::subscription_driver::SubscriptionDriver;
use crate::control_plane::subscription_key::SubscriptionKey;
use crate::data_plane::indication_forwarder::IndicationForwarder;
use crate::engine::{E2ProtocolEngine, IndicationSink};
use crate::error::StartupError;
use crate::health::ReconcilerHealth;
use crate::observability::fields;
use crate::runtime::reconciliation_loop::{DrainReport, ReconciliationLoop};
use crate::runtime::worker_runtime::spawn_reconciliation_task;
use crate::service_model::{ServiceModel, ServiceModelSpec};
use arc_swap::ArcSwap;
use std::collections::BTreeSet;
use std::sync::atomic::AtomicU64;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

const COMPONENT: &str = "e2_reconciler";

/// Keeps report subscriptions in step with the E2 nodes known to a protocol engine.
///
/// The reconciliation loop and the indication forwarder run as tokio tasks from
/// [`E2Reconciler::start`] until [`E2Reconciler::shutdown`].
pub struct E2Reconciler {
    name: String,
    registry: Arc<SubscriptionRegistry>,
    health: Arc<ArcSwap<ReconcilerHealth>>,
    shutdown: CancellationToken,
    task: JoinHandle<DrainReport>,
    forwarder: IndicationForwarder,
}

impl E2Reconciler {
    /// Validates the configuration and starts reconciling.
    ///
    /// Must be called from within a tokio runtime. `specs` are attempted in the given order
    /// for every node that joins.
    pub fn start(
        name: &str,
        config: ReconcilerConfig,
        specs: Vec<ServiceModelSpec>,
        engine: Arc<dyn E2ProtocolEngine>,
        sink: Arc<dyn IndicationSink>,
    ) -> Result<Self, StartupError> {
        config.validate()?;
        validate_specs(&specs)?;

        debug!(
            component = COMPONENT,
            reconciler = name,
            specs = specs.len(),
            queue_size = config.indication_queue_size,
            "starting reconciler"
        );

        let (indications, receiver) = tokio::sync::mpsc::channel(config.indication_queue_size);
        let forwarder = IndicationForwarder::start(sink, receiver);

        let registry = Arc::new(SubscriptionRegistry::new());
        let health = Arc::new(ArcSwap::from_pointee(ReconcilerHealth::default()));
        let dropped = Arc::new(AtomicU64::new(0));
        let driver = SubscriptionDriver::new(
            engine.clone(),
            registry.clone(),
            specs.into(),
            indications,
            dropped.clone(),
            config.engine_call_timeout,
        );
        let mut reconciliation_loop = ReconciliationLoop::new(
            name,
            &config,
            engine,
            driver,
            registry.clone(),
            health.clone(),
            dropped,
        );

        let shutdown = CancellationToken::new();
        let token = shutdown.clone();
        let task = spawn_reconciliation_task(name, async move {
            reconciliation_loop.run(token).await
        });

        Ok(Self {
            name: name.to_string(),
            registry,
            health,
            shutdown,
            task,
            forwarder,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Health as of the most recently completed tick.
    pub fn health(&self) -> Arc<ReconcilerHealth> {
        self.health.load_full()
    }

    /// Consistent copy of the keys currently holding a live subscription.
    pub async fn active_subscriptions(&self) -> Vec<SubscriptionKey> {
        self.registry.keys().await
    }

    /// Stops polling, drains every subscription and stops the forwarder.
    pub async fn shutdown(self) -> Result<DrainReport, StartupError> {
        info!(
            component = COMPONENT,
            reconciler = %self.name,
            connected_nodes = %fields::format_nodes(&self.health().connected_nodes),
            "shutdown requested"
        );
        self.shutdown.cancel();

        let report = self.task.await?;
        let forwarded = self.forwarder.stop().await?;

        info!(
            component = COMPONENT,
            reconciler = %self.name,
            unsubscribed = report.unsubscribed,
            failed = report.failed,
            abandoned = report.abandoned,
            forwarded,
            "reconciler stopped"
        );
        Ok(report)
    }
}

fn validate_specs(specs: &[ServiceModelSpec]) -> Result<(), StartupError> {
    if specs.is_empty() {
        return Err(StartupError::NoServiceModels);
    }

    let mut seen = BTreeSet::new();
    for (index, spec) in specs.iter().enumerate() {
        if spec.service_model == ServiceModel::Kpm && spec.ran_type.is_none() {
            return Err(StartupError::KpmWithoutRanType { index });
        }
        // KPM specs only ever match their own RAN type, so each RAN type may carry one.
        let kpm_ran_type = match spec.service_model {
            ServiceModel::Kpm => spec.ran_type,
            _ => None,
        };
        if !seen.insert((spec.service_model, kpm_ran_type)) {
            return Err(StartupError::InvalidConfig(match kpm_ran_type {
                Some(ran_type) => format!("KPM configured more than once for {ran_type}"),
                None => format!(
                    "service model {} configured more than once",
                    spec.service_model
                ),
            }));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::E2Reconciler;
    use crate::config::ReconcilerConfig;
    use crate::control_plane::subscription_key::SubscriptionKey;
    use crate::data_plane::indication_listener::Indication;
    use crate::error::StartupError;
    use crate::node_id::{NodeId, RanType};
    use crate::runtime::reconciliation_loop::ReconcilerState;
    use crate::service_model::{ReportInterval, ServiceModel, ServiceModelSpec};
    use crate::test_support::{CollectingSink, RecordingEngine};
    use std::sync::Arc;
    use std::time::Duration;

    fn mac_rlc() -> Vec<ServiceModelSpec> {
        vec![
            ServiceModelSpec::new(ServiceModel::Mac, ReportInterval::Ms10),
            ServiceModelSpec::new(ServiceModel::Rlc, ReportInterval::Ms10),
        ]
    }

    fn start(specs: Vec<ServiceModelSpec>) -> Result<E2Reconciler, StartupError> {
        E2Reconciler::start(
            "test",
            ReconcilerConfig::default(),
            specs,
            Arc::new(RecordingEngine::default()),
            Arc::new(CollectingSink::default()),
        )
    }

    #[tokio::test]
    async fn start_rejects_empty_spec_list() {
        assert!(matches!(start(Vec::new()), Err(StartupError::NoServiceModels)));
    }

    #[tokio::test]
    async fn start_rejects_kpm_without_ran_type() {
        let mut specs = mac_rlc();
        specs.push(ServiceModelSpec::new(ServiceModel::Kpm, ReportInterval::Ms1000));

        assert!(matches!(
            start(specs),
            Err(StartupError::KpmWithoutRanType { index: 2 })
        ));
    }

    #[tokio::test]
    async fn start_rejects_repeated_service_model() {
        let mut specs = mac_rlc();
        specs.push(ServiceModelSpec::new(ServiceModel::Mac, ReportInterval::Ms1));

        assert!(matches!(start(specs), Err(StartupError::InvalidConfig(_))));
    }

    #[tokio::test]
    async fn start_rejects_two_kpm_specs_for_one_ran_type() {
        let mut specs = mac_rlc();
        specs.push(ServiceModelSpec::kpm(ReportInterval::Ms1000, RanType::GnbDu, Vec::new()));
        specs.push(ServiceModelSpec::kpm(ReportInterval::Ms100, RanType::GnbDu, Vec::new()));

        assert!(matches!(start(specs), Err(StartupError::InvalidConfig(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn kpm_specs_for_different_ran_types_each_match_their_own_nodes() {
        let gnb = NodeId::new("001", "01", 3584, RanType::Gnb);
        let du = NodeId::new("001", "01", 3586, RanType::GnbDu);
        let engine = Arc::new(RecordingEngine::with_nodes(vec![gnb.clone(), du.clone()]));
        let specs = vec![
            ServiceModelSpec::new(ServiceModel::Mac, ReportInterval::Ms10),
            ServiceModelSpec::kpm(ReportInterval::Ms1000, RanType::Gnb, Vec::new()),
            ServiceModelSpec::kpm(ReportInterval::Ms100, RanType::GnbDu, Vec::new()),
        ];
        let reconciler = E2Reconciler::start(
            "split",
            ReconcilerConfig::default(),
            specs,
            engine.clone(),
            Arc::new(CollectingSink::default()),
        )
        .unwrap();

        tokio::time::sleep(Duration::from_millis(500)).await;

        let kpm_requests: Vec<_> = engine
            .subscribe_calls()
            .into_iter()
            .filter(|request| request.service_model == ServiceModel::Kpm)
            .collect();
        assert_eq!(kpm_requests.len(), 2);
        let gnb_kpm = kpm_requests
            .iter()
            .find(|request| request.node == gnb)
            .expect("gNB has a KPM subscription");
        let du_kpm = kpm_requests
            .iter()
            .find(|request| request.node == du)
            .expect("gNB-DU has a KPM subscription");
        assert_eq!(gnb_kpm.interval, ReportInterval::Ms1000);
        assert_eq!(du_kpm.interval, ReportInterval::Ms100);

        let active = reconciler.active_subscriptions().await;
        assert_eq!(active.len(), 4);
        assert!(active.contains(&SubscriptionKey::new(gnb, ServiceModel::Kpm)));
        assert!(active.contains(&SubscriptionKey::new(du, ServiceModel::Kpm)));

        reconciler.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn start_rejects_invalid_config() {
        let config = ReconcilerConfig {
            drain_timeout: Duration::ZERO,
            ..ReconcilerConfig::default()
        };
        let result = E2Reconciler::start(
            "test",
            config,
            mac_rlc(),
            Arc::new(RecordingEngine::default()),
            Arc::new(CollectingSink::default()),
        );

        assert!(matches!(result, Err(StartupError::InvalidConfig(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn indications_reach_the_sink_until_shutdown() {
        let node = NodeId::new("001", "01", 3584, RanType::Gnb);
        let engine = Arc::new(RecordingEngine::with_nodes(vec![node.clone()]));
        let sink = Arc::new(CollectingSink::default());
        let reconciler = E2Reconciler::start(
            "test",
            ReconcilerConfig::default(),
            mac_rlc(),
            engine.clone(),
            sink.clone(),
        )
        .unwrap();

        tokio::time::sleep(Duration::from_millis(1500)).await;

        let mac = SubscriptionKey::new(node.clone(), ServiceModel::Mac);
        assert_eq!(reconciler.active_subscriptions().await.len(), 2);
        assert_eq!(reconciler.health().state, ReconcilerState::Steady);
        assert_eq!(reconciler.health().connected_nodes, vec![node.clone()]);

        let listener = engine.listener(&mac).expect("engine holds MAC listener");
        assert!(listener.deliver(Indication {
            node,
            service_model: ServiceModel::Mac,
            timestamp_us: 1,
            payload: vec![0xAB],
        }));

        let report = reconciler.shutdown().await.unwrap();

        assert_eq!(report.unsubscribed, 2);
        assert!(engine.live_keys().is_empty());
        let events = sink.events().await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].key, mac);
        assert!(!listener.is_active());
    }
}
