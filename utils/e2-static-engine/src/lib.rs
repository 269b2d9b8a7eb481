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

//! File-backed [`E2ProtocolEngine`] for local runs and integration tests.
//!
//! The connected-node list is a JSON array re-read on every query, so editing the file
//! while the reconciler runs simulates E2 nodes connecting and disconnecting:
//!
//! ```json
//! [
//!   { "mcc": "001", "mnc": "01", "nb_id": 3584, "ran_type": "ngran_gNB" },
//!   { "mcc": 505, "mnc": 1, "nb_id": 7, "ran_type": 0 }
//! ]
//! ```

use async_trait::async_trait;
use e2_reconciler::{
    E2ProtocolEngine, EngineError, Indication, IndicationListener, NodeId, RanType,
    SubscriptionHandle, SubscriptionRequest,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

#[derive(Deserialize)]
#[serde(untagged)]
enum PlmnDigits {
    Text(String),
    Number(u32),
}

impl PlmnDigits {
    fn into_string(self) -> String {
        match self {
            PlmnDigits::Text(text) => text,
            PlmnDigits::Number(number) => number.to_string(),
        }
    }
}

#[derive(Deserialize)]
struct NodeEntry {
    mcc: PlmnDigits,
    mnc: PlmnDigits,
    nb_id: u32,
    ran_type: RanType,
}

impl From<NodeEntry> for NodeId {
    fn from(entry: NodeEntry) -> Self {
        NodeId::new(
            &entry.mcc.into_string(),
            &entry.mnc.into_string(),
            entry.nb_id,
            entry.ran_type,
        )
    }
}

struct LiveSubscription {
    request: SubscriptionRequest,
    listener: Arc<IndicationListener>,
    synthetic: Option<CancellationToken>,
}

pub struct E2StaticFileEngine {
    nodes_file: PathBuf,
    synthetic_indications: bool,
    next_handle: AtomicU64,
    live: Mutex<HashMap<u64, LiveSubscription>>,
}

impl E2StaticFileEngine {
    pub fn new(nodes_file: impl Into<PathBuf>) -> Self {
        Self {
            nodes_file: nodes_file.into(),
            synthetic_indications: false,
            next_handle: AtomicU64::new(1),
            live: Mutex::new(HashMap::new()),
        }
    }

    /// Emits one generated indication per report interval for every live subscription.
    pub fn with_synthetic_indications(mut self, enabled: bool) -> Self {
        self.synthetic_indications = enabled;
        self
    }

    pub fn nodes_file(&self) -> &Path {
        &self.nodes_file
    }

    /// Requests of the subscriptions that have not been deleted yet.
    pub async fn live_subscriptions(&self) -> Vec<SubscriptionRequest> {
        self.live
            .lock()
            .await
            .values()
            .map(|live| live.request.clone())
            .collect()
    }

    async fn read_nodes(&self) -> Result<Vec<NodeId>, EngineError> {
        let data = tokio::fs::read_to_string(&self.nodes_file).await.map_err(|error| {
            EngineError::Unavailable(format!(
                "Unable to read node file {}: {error}",
                self.nodes_file.display()
            ))
        })?;

        let entries: Vec<NodeEntry> = serde_json::from_str(&data).map_err(|error| {
            EngineError::Unavailable(format!(
                "Unable to parse node file {}: {error}",
                self.nodes_file.display()
            ))
        })?;

        Ok(entries.into_iter().map(NodeId::from).collect())
    }

    fn spawn_synthetic_indications(
        request: &SubscriptionRequest,
        listener: Arc<IndicationListener>,
    ) -> CancellationToken {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let node = request.node.clone();
        let service_model = request.service_model;
        let period = request.interval.as_duration();

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            let mut sequence = 0u64;
            loop {
                tokio::select! {
                    biased;
                    () = token.cancelled() => break,
                    _ = ticker.tick() => {
                        sequence += 1;
                        listener.deliver(Indication {
                            node: node.clone(),
                            service_model,
                            timestamp_us: chrono::Utc::now().timestamp_micros(),
                            payload: sequence.to_be_bytes().to_vec(),
                        });
                    }
                }
            }
            debug!(
                node = %node,
                service_model = %service_model,
                sent = sequence,
                "synthetic indication task stopped"
            );
        });

        cancel
    }
}

#[async_trait]
impl E2ProtocolEngine for E2StaticFileEngine {
    async fn connected_nodes(&self) -> Result<Vec<NodeId>, EngineError> {
        let nodes = self.read_nodes().await?;
        debug!(
            nodes_file = %self.nodes_file.display(),
            count = nodes.len(),
            "read connected nodes"
        );
        Ok(nodes)
    }

    async fn subscribe(
        &self,
        request: SubscriptionRequest,
        listener: Arc<IndicationListener>,
    ) -> Result<SubscriptionHandle, EngineError> {
        if !self.read_nodes().await?.contains(&request.node) {
            return Err(EngineError::Rejected(format!(
                "E2 node {} is not connected",
                request.node
            )));
        }

        let id = self.next_handle.fetch_add(1, Ordering::Relaxed);
        let synthetic = self
            .synthetic_indications
            .then(|| Self::spawn_synthetic_indications(&request, listener.clone()));

        info!(
            handle = id,
            node = %request.node,
            service_model = %request.service_model,
            interval = %request.interval,
            actions = request.actions.len(),
            "subscription created"
        );
        self.live.lock().await.insert(
            id,
            LiveSubscription {
                request,
                listener,
                synthetic,
            },
        );
        Ok(SubscriptionHandle::new(id))
    }

    async fn unsubscribe(&self, handle: SubscriptionHandle) -> Result<(), EngineError> {
        let Some(live) = self.live.lock().await.remove(&handle.id()) else {
            warn!(handle = handle.id(), "unsubscribe for unknown handle");
            return Err(EngineError::UnknownHandle(handle.id()));
        };

        if let Some(cancel) = live.synthetic {
            cancel.cancel();
        }
        info!(
            handle = handle.id(),
            subscription = %live.listener.key(),
            "subscription deleted"
        );
        Ok(())
    }
}
