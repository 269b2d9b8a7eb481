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

//! Scripted collaborators shared by unit tests.

use crate::control_plane::subscription_key::{SubscriptionHandle, SubscriptionKey};
use crate::data_plane::indication_listener::{IndicationEvent, IndicationListener};
use crate::engine::{E2ProtocolEngine, IndicationSink, SubscriptionRequest};
use crate::error::EngineError;
use crate::node_id::NodeId;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::Mutex;

pub(crate) fn listener_for(key: &SubscriptionKey) -> Arc<IndicationListener> {
    let (tx, _rx) = tokio::sync::mpsc::channel(1);
    Arc::new(IndicationListener::new(
        key.clone(),
        tx,
        Arc::new(AtomicU64::new(0)),
    ))
}

/// Engine double that records every call and fails on demand.
#[derive(Default)]
pub(crate) struct RecordingEngine {
    nodes: StdMutex<Vec<NodeId>>,
    failing_listings: AtomicU64,
    hang_listings: AtomicBool,
    failing_subscribes: StdMutex<HashSet<SubscriptionKey>>,
    fail_unsubscribes: AtomicBool,
    hang_unsubscribes: AtomicBool,
    next_handle: AtomicU64,
    subscribe_calls: StdMutex<Vec<SubscriptionRequest>>,
    unsubscribe_calls: StdMutex<Vec<u64>>,
    live: StdMutex<HashMap<u64, (SubscriptionKey, Arc<IndicationListener>)>>,
}

impl RecordingEngine {
    pub(crate) fn with_nodes(nodes: Vec<NodeId>) -> Self {
        let engine = Self::default();
        engine.set_nodes(nodes);
        engine
    }

    pub(crate) fn set_nodes(&self, nodes: Vec<NodeId>) {
        *self.nodes.lock().expect("lock nodes") = nodes;
    }

    /// The next `count` directory queries fail.
    pub(crate) fn fail_next_listings(&self, count: u64) {
        self.failing_listings.store(count, Ordering::SeqCst);
    }

    pub(crate) fn hang_listings(&self, hang: bool) {
        self.hang_listings.store(hang, Ordering::SeqCst);
    }

    pub(crate) fn fail_subscribe(&self, key: SubscriptionKey) {
        self.failing_subscribes
            .lock()
            .expect("lock failing_subscribes")
            .insert(key);
    }

    pub(crate) fn fail_unsubscribes(&self, fail: bool) {
        self.fail_unsubscribes.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn hang_unsubscribes(&self, hang: bool) {
        self.hang_unsubscribes.store(hang, Ordering::SeqCst);
    }

    pub(crate) fn subscribe_calls(&self) -> Vec<SubscriptionRequest> {
        self.subscribe_calls
            .lock()
            .expect("lock subscribe_calls")
            .clone()
    }

    pub(crate) fn subscribe_count_for(&self, node: &NodeId) -> usize {
        self.subscribe_calls()
            .iter()
            .filter(|request| &request.node == node)
            .count()
    }

    pub(crate) fn unsubscribe_count(&self) -> usize {
        self.unsubscribe_calls
            .lock()
            .expect("lock unsubscribe_calls")
            .len()
    }

    /// Handles the engine still considers subscribed.
    pub(crate) fn live_keys(&self) -> Vec<SubscriptionKey> {
        let mut keys: Vec<SubscriptionKey> = self
            .live
            .lock()
            .expect("lock live")
            .values()
            .map(|(key, _)| key.clone())
            .collect();
        keys.sort();
        keys
    }

    pub(crate) fn listener(&self, key: &SubscriptionKey) -> Option<Arc<IndicationListener>> {
        self.live
            .lock()
            .expect("lock live")
            .values()
            .find(|(live_key, _)| live_key == key)
            .map(|(_, listener)| listener.clone())
    }
}

#[async_trait]
impl E2ProtocolEngine for RecordingEngine {
    async fn connected_nodes(&self) -> Result<Vec<NodeId>, EngineError> {
        if self.hang_listings.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        let remaining_failures = self.failing_listings.load(Ordering::SeqCst);
        if remaining_failures > 0 {
            self.failing_listings
                .store(remaining_failures - 1, Ordering::SeqCst);
            return Err(EngineError::Unavailable("scripted listing failure".into()));
        }
        Ok(self.nodes.lock().expect("lock nodes").clone())
    }

    async fn subscribe(
        &self,
        request: SubscriptionRequest,
        listener: Arc<IndicationListener>,
    ) -> Result<SubscriptionHandle, EngineError> {
        self.subscribe_calls
            .lock()
            .expect("lock subscribe_calls")
            .push(request.clone());

        let key = SubscriptionKey::new(request.node, request.service_model);
        if self
            .failing_subscribes
            .lock()
            .expect("lock failing_subscribes")
            .contains(&key)
        {
            return Err(EngineError::Rejected(format!("scripted failure for {key}")));
        }

        let id = self.next_handle.fetch_add(1, Ordering::SeqCst);
        self.live
            .lock()
            .expect("lock live")
            .insert(id, (key, listener));
        Ok(SubscriptionHandle::new(id))
    }

    async fn unsubscribe(&self, handle: SubscriptionHandle) -> Result<(), EngineError> {
        self.unsubscribe_calls
            .lock()
            .expect("lock unsubscribe_calls")
            .push(handle.id());
        if self.hang_unsubscribes.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        if self.fail_unsubscribes.load(Ordering::SeqCst) {
            return Err(EngineError::Unavailable("scripted unsubscribe failure".into()));
        }
        self.live
            .lock()
            .expect("lock live")
            .remove(&handle.id())
            .map(|_| ())
            .ok_or(EngineError::UnknownHandle(handle.id()))
    }
}

/// Sink that keeps every event it receives.
#[derive(Default)]
pub(crate) struct CollectingSink {
    events: Mutex<Vec<IndicationEvent>>,
}

impl CollectingSink {
    pub(crate) async fn events(&self) -> Vec<IndicationEvent> {
        self.events.lock().await.clone()
    }
}

#[async_trait]
impl IndicationSink for CollectingSink {
    async fn on_indication(&self, event: IndicationEvent) {
        self.events.lock().await.push(event);
    }
}
