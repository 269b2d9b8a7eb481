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

//! Subscribe/unsubscribe driver: translates node joins and leaves into engine calls.

use crate::control_plane::registry::{ActiveSubscription, SubscriptionRegistry};
use crate::control_plane::subscription_key::SubscriptionKey;
use crate::data_plane::indication_listener::{IndicationEvent, IndicationListener};
use crate::engine::{E2ProtocolEngine, SubscriptionRequest};
use crate::error::ReconcileError;
use crate::node_id::NodeId;
use crate::observability::{events, fields};
use crate::runtime::reconciliation_loop::DrainReport;
use crate::service_model::ServiceModelSpec;
use std::sync::atomic::AtomicU64;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::Sender;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

const COMPONENT: &str = "subscription_driver";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct SubscribeOutcome {
    pub(crate) subscribed: usize,
    pub(crate) not_applicable: usize,
    pub(crate) already_registered: usize,
    pub(crate) failed: usize,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct UnsubscribeOutcome {
    pub(crate) released: usize,
    pub(crate) failed: usize,
}

pub(crate) struct SubscriptionDriver {
    engine: Arc<dyn E2ProtocolEngine>,
    registry: Arc<SubscriptionRegistry>,
    specs: Arc<[ServiceModelSpec]>,
    indications: Sender<IndicationEvent>,
    dropped: Arc<AtomicU64>,
    call_timeout: Duration,
}

impl SubscriptionDriver {
    pub(crate) fn new(
        engine: Arc<dyn E2ProtocolEngine>,
        registry: Arc<SubscriptionRegistry>,
        specs: Arc<[ServiceModelSpec]>,
        indications: Sender<IndicationEvent>,
        dropped: Arc<AtomicU64>,
        call_timeout: Duration,
    ) -> Self {
        Self {
            engine,
            registry,
            specs,
            indications,
            dropped,
            call_timeout,
        }
    }

    /// Subscribes `node` to every applicable spec, in configuration order.
    ///
    /// A failure on one spec is logged and never prevents the remaining specs from being
    /// attempted.
    pub(crate) async fn subscribe_all(&self, node: &NodeId) -> SubscribeOutcome {
        let mut outcome = SubscribeOutcome::default();

        for spec in self.specs.iter() {
            let key = SubscriptionKey::new(node.clone(), spec.service_model);

            if !spec.applies_to(node.ran_type()) {
                debug!(
                    event = events::SUBSCRIBE_NOT_APPLICABLE,
                    component = COMPONENT,
                    subscription = %fields::format_key(&key),
                    ran_type = %node.ran_type(),
                    "service model does not apply to node"
                );
                outcome.not_applicable += 1;
                continue;
            }

            if self.registry.contains(&key).await {
                error!(
                    event = events::DUPLICATE_SUBSCRIPTION,
                    component = COMPONENT,
                    subscription = %fields::format_key(&key),
                    "subscription already live for joining node, skipping subscribe"
                );
                outcome.already_registered += 1;
                continue;
            }

            match self.subscribe_one(&key, spec).await {
                Ok(()) => outcome.subscribed += 1,
                Err(ReconcileError::DuplicateSubscription(duplicate)) => {
                    error!(
                        event = events::DUPLICATE_SUBSCRIPTION,
                        component = COMPONENT,
                        subscription = %fields::format_key(&duplicate.key),
                        "registry rejected second handle, releasing it"
                    );
                    let rejected = duplicate.rejected;
                    if let Err(err) = self
                        .release(&key, rejected, Instant::now() + self.call_timeout)
                        .await
                    {
                        warn!(
                            event = events::UNSUBSCRIBE_FAILED,
                            component = COMPONENT,
                            subscription = %fields::format_key(&key),
                            err = %err,
                            "failed to release rejected duplicate handle"
                        );
                    }
                    outcome.already_registered += 1;
                }
                Err(err) => {
                    warn!(
                        event = events::SUBSCRIBE_FAILED,
                        component = COMPONENT,
                        subscription = %fields::format_key(&key),
                        interval = %spec.interval,
                        err = %err,
                        "subscribe failed, continuing with remaining service models"
                    );
                    outcome.failed += 1;
                }
            }
        }

        outcome
    }

    async fn subscribe_one(
        &self,
        key: &SubscriptionKey,
        spec: &ServiceModelSpec,
    ) -> Result<(), ReconcileError> {
        let listener = Arc::new(IndicationListener::new(
            key.clone(),
            self.indications.clone(),
            self.dropped.clone(),
        ));
        let request = SubscriptionRequest {
            node: key.node.clone(),
            service_model: spec.service_model,
            interval: spec.interval,
            actions: spec.actions.clone(),
        };

        let handle = match tokio::time::timeout(
            self.call_timeout,
            self.engine.subscribe(request, listener.clone()),
        )
        .await
        {
            Ok(Ok(handle)) => handle,
            Ok(Err(source)) => {
                listener.close();
                return Err(ReconcileError::SubscribeFailure {
                    key: key.clone(),
                    source,
                });
            }
            Err(_) => {
                listener.close();
                return Err(ReconcileError::EngineTimeout {
                    operation: "subscribe",
                    timeout: self.call_timeout,
                });
            }
        };

        let handle_id = handle.id();
        self.registry
            .put(key.clone(), ActiveSubscription::new(handle, listener))
            .await?;

        info!(
            event = events::SUBSCRIBE_OK,
            component = COMPONENT,
            subscription = %fields::format_key(key),
            handle = handle_id,
            interval = %spec.interval,
            "subscribed"
        );
        Ok(())
    }

    /// Releases every subscription held for `node`.
    ///
    /// Each entry leaves the registry before the remote call is made, so the node has no
    /// entries afterwards whatever the engine answers.
    pub(crate) async fn unsubscribe_all(&self, node: &NodeId) -> UnsubscribeOutcome {
        let mut outcome = UnsubscribeOutcome::default();

        for key in self.registry.all_for_node(node).await {
            let Some(active) = self.registry.remove(&key).await else {
                continue;
            };

            match self
                .release(&key, active, Instant::now() + self.call_timeout)
                .await
            {
                Ok(()) => outcome.released += 1,
                Err(err) => {
                    warn!(
                        event = events::UNSUBSCRIBE_FAILED,
                        component = COMPONENT,
                        subscription = %fields::format_key(&key),
                        err = %err,
                        "unsubscribe failed, registry entry dropped anyway"
                    );
                    outcome.failed += 1;
                }
            }
        }

        outcome
    }

    /// Releases every registry entry, giving up on the engine once `deadline` passes.
    pub(crate) async fn drain(&self, deadline: Instant) -> DrainReport {
        let mut report = DrainReport::default();

        for key in self.registry.keys().await {
            let Some(active) = self.registry.remove(&key).await else {
                continue;
            };

            let now = Instant::now();
            if now >= deadline {
                let handle = active.retire();
                warn!(
                    event = events::DRAIN_TIMEOUT,
                    component = COMPONENT,
                    subscription = %fields::format_key(&key),
                    handle = handle.id(),
                    "drain deadline passed, abandoning subscription"
                );
                report.abandoned += 1;
                report.timed_out = true;
                continue;
            }

            let call_deadline = deadline.min(now + self.call_timeout);
            match self.release(&key, active, call_deadline).await {
                Ok(()) => report.unsubscribed += 1,
                Err(err) if Instant::now() >= deadline => {
                    warn!(
                        event = events::DRAIN_TIMEOUT,
                        component = COMPONENT,
                        subscription = %fields::format_key(&key),
                        err = %err,
                        "drain deadline passed during unsubscribe, abandoning subscription"
                    );
                    report.abandoned += 1;
                    report.timed_out = true;
                }
                Err(err) => {
                    warn!(
                        event = events::UNSUBSCRIBE_FAILED,
                        component = COMPONENT,
                        subscription = %fields::format_key(&key),
                        err = %err,
                        "unsubscribe failed during drain"
                    );
                    report.failed += 1;
                }
            }
        }

        if report.abandoned > 0 {
            let err = ReconcileError::DrainTimeout {
                abandoned: report.abandoned,
            };
            warn!(
                event = events::DRAIN_TIMEOUT,
                component = COMPONENT,
                err = %err,
                "drain finished past its deadline"
            );
        }
        info!(
            event = events::DRAIN_COMPLETE,
            component = COMPONENT,
            unsubscribed = report.unsubscribed,
            failed = report.failed,
            abandoned = report.abandoned,
            "subscription registry drained"
        );
        report
    }

    /// Closes the listener, then hands the handle back to the engine.
    async fn release(
        &self,
        key: &SubscriptionKey,
        active: ActiveSubscription,
        deadline: Instant,
    ) -> Result<(), ReconcileError> {
        let handle = active.retire();
        let handle_id = handle.id();
        let timeout = deadline.saturating_duration_since(Instant::now());

        match tokio::time::timeout_at(deadline, self.engine.unsubscribe(handle)).await {
            Ok(Ok(())) => {
                info!(
                    event = events::UNSUBSCRIBE_OK,
                    component = COMPONENT,
                    subscription = %fields::format_key(key),
                    handle = handle_id,
                    "unsubscribed"
                );
                Ok(())
            }
            Ok(Err(source)) => Err(ReconcileError::UnsubscribeFailure {
                key: key.clone(),
                source,
            }),
            Err(_) => Err(ReconcileError::EngineTimeout {
                operation: "unsubscribe",
                timeout,
            }),
        }
    }
}
