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

//! Arrival and latency bookkeeping per subscription, handed to the metrics layer.

use crate::control_plane::subscription_key::SubscriptionKey;
use crate::data_plane::indication_listener::IndicationEvent;
use crate::engine::IndicationSink;
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::Mutex;

/// Running statistics for one subscription.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IndicationStats {
    /// Every indication that reached the sink.
    pub received: u64,
    /// Indications with a non-empty payload; only these contribute latency samples.
    pub latency_samples: u64,
    pub total_latency_us: i64,
    pub max_latency_us: i64,
    pub last_latency_us: Option<i64>,
    pub last_received_at_us: Option<i64>,
}

impl IndicationStats {
    pub fn mean_latency_us(&self) -> Option<i64> {
        (self.latency_samples > 0).then(|| self.total_latency_us / self.latency_samples as i64)
    }

    fn record(&mut self, event: &IndicationEvent) {
        self.received += 1;
        self.last_received_at_us = Some(event.received_at_us);

        if event.indication.payload.is_empty() {
            return;
        }

        let latency_us = event.latency_us();
        self.latency_samples += 1;
        self.total_latency_us += latency_us;
        self.max_latency_us = self.max_latency_us.max(latency_us);
        self.last_latency_us = Some(latency_us);
    }
}

/// [`IndicationSink`] that keeps [`IndicationStats`] per [`SubscriptionKey`].
#[derive(Debug, Default)]
pub struct LatencyTracker {
    stats: Mutex<BTreeMap<SubscriptionKey, IndicationStats>>,
}

impl LatencyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the statistics gathered so far.
    pub async fn snapshot(&self) -> BTreeMap<SubscriptionKey, IndicationStats> {
        self.stats.lock().await.clone()
    }
}

#[async_trait]
impl IndicationSink for LatencyTracker {
    async fn on_indication(&self, event: IndicationEvent) {
        self.stats
            .lock()
            .await
            .entry(event.key.clone())
            .or_default()
            .record(&event);
    }
}
