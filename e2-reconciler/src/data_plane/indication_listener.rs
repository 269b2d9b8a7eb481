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

//! Per-subscription callback binding handed to the protocol engine.

use crate::control_plane::subscription_key::SubscriptionKey;
use crate::node_id::NodeId;
use crate::observability::{events, fields};
use crate::service_model::ServiceModel;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::mpsc::Sender;
use tracing::{debug, warn};

const COMPONENT: &str = "indication_listener";

/// One indication as delivered by the protocol engine. The payload is left undecoded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Indication {
    pub node: NodeId,
    pub service_model: ServiceModel,
    /// Collection timestamp stamped by the E2 node, in microseconds since the Unix epoch.
    pub timestamp_us: i64,
    pub payload: Vec<u8>,
}

/// An accepted indication, labelled with the subscription it arrived on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndicationEvent {
    pub key: SubscriptionKey,
    pub indication: Indication,
    pub received_at_us: i64,
}

impl IndicationEvent {
    /// Delay between collection on the node and arrival here.
    pub fn latency_us(&self) -> i64 {
        self.received_at_us - self.indication.timestamp_us
    }
}

/// Routes indications of one subscription into the forwarder queue.
///
/// [`IndicationListener::deliver`] never waits: when the queue is full the indication is
/// dropped and counted, so the engine's delivery thread is never held up by slow sinks.
#[derive(Debug)]
pub struct IndicationListener {
    key: SubscriptionKey,
    sender: Sender<IndicationEvent>,
    active: AtomicBool,
    dropped: Arc<AtomicU64>,
}

impl IndicationListener {
    /// Listener for `key` feeding `sender`; drops are counted in `dropped`.
    pub fn new(
        key: SubscriptionKey,
        sender: Sender<IndicationEvent>,
        dropped: Arc<AtomicU64>,
    ) -> Self {
        Self {
            key,
            sender,
            active: AtomicBool::new(true),
            dropped,
        }
    }

    pub fn key(&self) -> &SubscriptionKey {
        &self.key
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Stops accepting indications. Called before the handle is released.
    pub(crate) fn close(&self) {
        self.active.store(false, Ordering::Release);
    }

    /// Hands `indication` to the forwarder. Returns whether it was accepted.
    pub fn deliver(&self, indication: Indication) -> bool {
        if !self.is_active() {
            self.record_drop(&indication, "subscription_released");
            return false;
        }

        if indication.node != self.key.node || indication.service_model != self.key.service_model
        {
            warn!(
                event = events::INDICATION_DROPPED,
                component = COMPONENT,
                subscription = %fields::format_key(&self.key),
                node = %fields::format_node(&indication.node),
                service_model = %indication.service_model,
                reason = "subscription_mismatch",
                "dropping indication delivered on the wrong subscription"
            );
            self.dropped.fetch_add(1, Ordering::Relaxed);
            return false;
        }

        let event = IndicationEvent {
            key: self.key.clone(),
            indication,
            received_at_us: chrono::Utc::now().timestamp_micros(),
        };

        match self.sender.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(event)) => {
                self.record_drop(&event.indication, "queue_full");
                false
            }
            Err(TrySendError::Closed(event)) => {
                self.record_drop(&event.indication, "forwarder_stopped");
                false
            }
        }
    }

    fn record_drop(&self, indication: &Indication, reason: &'static str) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
        debug!(
            event = events::INDICATION_DROPPED,
            component = COMPONENT,
            subscription = %fields::format_key(&self.key),
            timestamp_us = indication.timestamp_us,
            reason,
            "dropping indication"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::{Indication, IndicationListener};
    use crate::control_plane::subscription_key::SubscriptionKey;
    use crate::node_id::{NodeId, RanType};
    use crate::service_model::ServiceModel;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;

    fn key() -> SubscriptionKey {
        SubscriptionKey::new(NodeId::new("001", "01", 1, RanType::Gnb), ServiceModel::Mac)
    }

    fn indication(key: &SubscriptionKey, timestamp_us: i64) -> Indication {
        Indication {
            node: key.node.clone(),
            service_model: key.service_model,
            timestamp_us,
            payload: vec![1, 2, 3],
        }
    }

    #[tokio::test]
    async fn delivered_indication_is_labelled_with_its_key() {
        let (tx, mut rx) = tokio::sync::mpsc::channel(4);
        let dropped = Arc::new(AtomicU64::new(0));
        let listener = IndicationListener::new(key(), tx, dropped.clone());

        assert!(listener.deliver(indication(&key(), 42)));

        let event = rx.recv().await.expect("event queued");
        assert_eq!(event.key, key());
        assert_eq!(event.indication.timestamp_us, 42);
        assert!(event.received_at_us >= 42);
        assert_eq!(dropped.load(Ordering::Relaxed), 0);
    }

    #[tokio::test]
    async fn closed_listener_drops_late_indications() {
        let (tx, mut rx) = tokio::sync::mpsc::channel(4);
        let dropped = Arc::new(AtomicU64::new(0));
        let listener = IndicationListener::new(key(), tx, dropped.clone());

        listener.close();

        assert!(!listener.deliver(indication(&key(), 1)));
        assert!(rx.try_recv().is_err());
        assert_eq!(dropped.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn full_queue_drops_instead_of_blocking() {
        let (tx, _rx) = tokio::sync::mpsc::channel(1);
        let dropped = Arc::new(AtomicU64::new(0));
        let listener = IndicationListener::new(key(), tx, dropped.clone());

        assert!(listener.deliver(indication(&key(), 1)));
        assert!(!listener.deliver(indication(&key(), 2)));
        assert_eq!(dropped.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn indication_for_another_subscription_is_rejected() {
        let (tx, _rx) = tokio::sync::mpsc::channel(4);
        let dropped = Arc::new(AtomicU64::new(0));
        let listener = IndicationListener::new(key(), tx, dropped.clone());

        let mut foreign = indication(&key(), 1);
        foreign.service_model = ServiceModel::Rlc;

        assert!(!listener.deliver(foreign));
        assert_eq!(dropped.load(Ordering::Relaxed), 1);
    }
}
