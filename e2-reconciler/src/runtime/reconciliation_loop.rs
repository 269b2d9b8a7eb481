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

//! Reconciliation loop state machine.

use crate::config::ReconcilerConfig;
use crate::control_plane::registry::SubscriptionRegistry;
use crate::control_plane::subscription_driver::SubscriptionDriver;
use crate::engine::E2ProtocolEngine;
use crate::health::ReconcilerHealth;
use crate::membership::node_directory::NodeDirectory;
use crate::membership::snapshot::{MembershipDelta, MembershipSnapshot};
use crate::node_id::NodeId;
use crate::observability::{events, fields};
use arc_swap::ArcSwap;
use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

const COMPONENT: &str = "reconciliation_loop";

/// Lifecycle state of the reconciliation loop.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ReconcilerState {
    /// Polling, no node has been seen yet.
    #[default]
    AwaitingFirstNode,
    /// Tracking membership and keeping subscriptions in step with it.
    Steady,
    /// Shutdown requested, releasing every subscription.
    Draining,
    /// Terminal.
    Stopped,
}

impl ReconcilerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReconcilerState::AwaitingFirstNode => "awaiting_first_node",
            ReconcilerState::Steady => "steady",
            ReconcilerState::Draining => "draining",
            ReconcilerState::Stopped => "stopped",
        }
    }
}

impl Display for ReconcilerState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of the shutdown drain.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DrainReport {
    /// Subscriptions the engine confirmed as released.
    pub unsubscribed: usize,
    /// Subscriptions whose release the engine refused or did not answer in time.
    pub failed: usize,
    /// Subscriptions dropped locally because the drain deadline had passed.
    pub abandoned: usize,
    pub timed_out: bool,
}

pub(crate) struct ReconciliationLoop {
    name: String,
    state: ReconcilerState,
    directory: NodeDirectory,
    driver: SubscriptionDriver,
    registry: Arc<SubscriptionRegistry>,
    last: MembershipSnapshot,
    poll_interval: Duration,
    drain_timeout: Duration,
    health: Arc<ArcSwap<ReconcilerHealth>>,
    dropped: Arc<AtomicU64>,
    ticks: u64,
    reported_empty: bool,
}

impl ReconciliationLoop {
    pub(crate) fn new(
        name: &str,
        config: &ReconcilerConfig,
        engine: Arc<dyn E2ProtocolEngine>,
        driver: SubscriptionDriver,
        registry: Arc<SubscriptionRegistry>,
        health: Arc<ArcSwap<ReconcilerHealth>>,
        dropped: Arc<AtomicU64>,
    ) -> Self {
        Self {
            name: name.to_string(),
            state: ReconcilerState::AwaitingFirstNode,
            directory: NodeDirectory::new(engine, config.poll_interval),
            driver,
            registry,
            last: MembershipSnapshot::default(),
            poll_interval: config.poll_interval,
            drain_timeout: config.drain_timeout,
            health,
            dropped,
            ticks: 0,
            reported_empty: false,
        }
    }

    #[cfg(test)]
    pub(crate) fn state(&self) -> ReconcilerState {
        self.state
    }

    /// Runs one reconciliation step and returns the membership change it acted on.
    ///
    /// Left nodes are released before joined nodes are subscribed. Once draining has
    /// started this is a no-op.
    pub(crate) async fn tick(&mut self) -> MembershipDelta {
        if matches!(
            self.state,
            ReconcilerState::Draining | ReconcilerState::Stopped
        ) {
            return MembershipDelta::default();
        }

        let current = self.directory.snapshot().await;
        self.ticks += 1;
        let delta = self.last.diff(&current);

        for node in &delta.left {
            self.node_left(node).await;
        }
        for node in &delta.joined {
            self.node_joined(node).await;
        }

        if current.is_empty() {
            self.report_no_nodes();
        } else {
            self.reported_empty = false;
            if self.state == ReconcilerState::AwaitingFirstNode {
                self.transition(ReconcilerState::Steady);
            }
        }

        self.last = current;
        self.publish_health(&delta).await;
        delta
    }

    /// Ticks every `poll_interval` until `shutdown` is cancelled, then drains.
    ///
    /// Cancellation is only observed between ticks; a tick in progress always completes.
    pub(crate) async fn run(&mut self, shutdown: CancellationToken) -> DrainReport {
        info!(
            component = COMPONENT,
            reconciler = %self.name,
            poll_interval_ms = self.poll_interval.as_millis() as u64,
            "reconciliation loop started"
        );

        let mut interval = tokio::time::interval(self.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                () = shutdown.cancelled() => break,
                _ = interval.tick() => {
                    self.tick().await;
                }
            }
        }

        self.drain().await
    }

    async fn drain(&mut self) -> DrainReport {
        self.transition(ReconcilerState::Draining);
        self.publish_health(&MembershipDelta::default()).await;

        let report = self
            .driver
            .drain(Instant::now() + self.drain_timeout)
            .await;

        self.transition(ReconcilerState::Stopped);
        self.publish_health(&MembershipDelta::default()).await;
        report
    }

    async fn node_joined(&self, node: &NodeId) {
        let outcome = self.driver.subscribe_all(node).await;
        info!(
            event = events::NODE_JOINED,
            component = COMPONENT,
            node = %fields::format_node(node),
            subscribed = outcome.subscribed,
            not_applicable = outcome.not_applicable,
            already_registered = outcome.already_registered,
            failed = outcome.failed,
            "E2 node joined"
        );
    }

    async fn node_left(&self, node: &NodeId) {
        let outcome = self.driver.unsubscribe_all(node).await;
        info!(
            event = events::NODE_LEFT,
            component = COMPONENT,
            node = %fields::format_node(node),
            released = outcome.released,
            failed = outcome.failed,
            "E2 node left"
        );
    }

    fn report_no_nodes(&mut self) {
        if self.reported_empty {
            debug!(
                event = events::NO_NODES_CONNECTED,
                component = COMPONENT,
                state = %self.state,
                tick = self.ticks,
                "no E2 nodes connected"
            );
            return;
        }
        self.reported_empty = true;
        info!(
            event = events::NO_NODES_CONNECTED,
            component = COMPONENT,
            reconciler = %self.name,
            state = %self.state,
            "no E2 nodes connected"
        );
    }

    fn transition(&mut self, next: ReconcilerState) {
        info!(
            event = events::STATE_TRANSITION,
            component = COMPONENT,
            reconciler = %self.name,
            from = %self.state,
            to = %next,
            "reconciler state changed"
        );
        self.state = next;
    }

    async fn publish_health(&self, delta: &MembershipDelta) {
        let health = ReconcilerHealth {
            state: self.state,
            connected_nodes: self.last.iter().cloned().collect(),
            active_subscriptions: self.registry.len().await,
            ticks: self.ticks,
            last_joined: delta.joined.clone(),
            last_left: delta.left.clone(),
            indications_dropped: self.dropped.load(Ordering::Relaxed),
        };
        self.health.store(Arc::new(health));
    }
}
