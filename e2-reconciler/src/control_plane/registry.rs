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

//! Subscription registry: the single owner of live subscription handles.

use crate::control_plane::subscription_key::{SubscriptionHandle, SubscriptionKey};
use crate::data_plane::indication_listener::IndicationListener;
use crate::error::DuplicateSubscriptionError;
use crate::node_id::NodeId;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Registry value: the engine handle plus the listener bound to it.
#[derive(Debug)]
pub struct ActiveSubscription {
    handle: SubscriptionHandle,
    listener: Arc<IndicationListener>,
}

impl ActiveSubscription {
    pub fn new(handle: SubscriptionHandle, listener: Arc<IndicationListener>) -> Self {
        Self { handle, listener }
    }

    pub fn handle(&self) -> &SubscriptionHandle {
        &self.handle
    }

    pub fn listener(&self) -> &Arc<IndicationListener> {
        &self.listener
    }

    /// Closes the listener so late indications are dropped, and yields the handle for
    /// remote release.
    pub fn retire(self) -> SubscriptionHandle {
        self.listener.close();
        self.handle
    }
}

/// Mapping from [`SubscriptionKey`] to its single live [`ActiveSubscription`].
///
/// Mutations are issued only by the reconciliation task. Readers get copies taken under
/// the lock, never partial views.
#[derive(Debug, Default)]
pub struct SubscriptionRegistry {
    entries: Mutex<BTreeMap<SubscriptionKey, ActiveSubscription>>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `active` under `key`. Fails without replacing anything if `key` is live.
    pub async fn put(
        &self,
        key: SubscriptionKey,
        active: ActiveSubscription,
    ) -> Result<(), DuplicateSubscriptionError> {
        let mut entries = self.entries.lock().await;
        if entries.contains_key(&key) {
            return Err(DuplicateSubscriptionError {
                key,
                rejected: active,
            });
        }
        entries.insert(key, active);
        Ok(())
    }

    /// Removes and returns the entry for `key`, `None` if there is none.
    pub async fn remove(&self, key: &SubscriptionKey) -> Option<ActiveSubscription> {
        self.entries.lock().await.remove(key)
    }

    pub async fn contains(&self, key: &SubscriptionKey) -> bool {
        self.entries.lock().await.contains_key(key)
    }

    /// Every key currently registered for `node`.
    pub async fn all_for_node(&self, node: &NodeId) -> BTreeSet<SubscriptionKey> {
        self.entries
            .lock()
            .await
            .keys()
            .filter(|key| &key.node == node)
            .cloned()
            .collect()
    }

    /// Consistent copy of all registered keys.
    pub async fn keys(&self) -> Vec<SubscriptionKey> {
        self.entries.lock().await.keys().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{ActiveSubscription, SubscriptionRegistry};
    use crate::control_plane::subscription_key::{SubscriptionHandle, SubscriptionKey};
    use crate::node_id::{NodeId, RanType};
    use crate::service_model::ServiceModel;
    use crate::test_support::listener_for;

    fn node(nb_id: u32) -> NodeId {
        NodeId::new("001", "01", nb_id, RanType::Gnb)
    }

    fn active(key: &SubscriptionKey, handle: u64) -> ActiveSubscription {
        ActiveSubscription::new(SubscriptionHandle::new(handle), listener_for(key))
    }

    #[tokio::test]
    async fn put_rejects_second_handle_for_live_key() {
        let registry = SubscriptionRegistry::new();
        let key = SubscriptionKey::new(node(1), ServiceModel::Mac);

        registry.put(key.clone(), active(&key, 1)).await.unwrap();
        let err = registry
            .put(key.clone(), active(&key, 2))
            .await
            .expect_err("duplicate put must fail");

        assert_eq!(err.key, key);
        assert_eq!(err.rejected.handle().id(), 2);
        assert_eq!(registry.len().await, 1);
        let kept = registry.remove(&key).await.expect("original entry kept");
        assert_eq!(kept.handle().id(), 1);
    }

    #[tokio::test]
    async fn remove_is_idempotent() {
        let registry = SubscriptionRegistry::new();
        let key = SubscriptionKey::new(node(1), ServiceModel::Rlc);

        registry.put(key.clone(), active(&key, 7)).await.unwrap();
        assert!(registry.remove(&key).await.is_some());
        assert!(registry.remove(&key).await.is_none());
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn key_can_be_registered_again_after_removal() {
        let registry = SubscriptionRegistry::new();
        let key = SubscriptionKey::new(node(1), ServiceModel::Pdcp);

        registry.put(key.clone(), active(&key, 1)).await.unwrap();
        registry.remove(&key).await;
        registry.put(key.clone(), active(&key, 2)).await.unwrap();

        assert!(registry.contains(&key).await);
    }

    #[tokio::test]
    async fn all_for_node_only_returns_that_nodes_keys() {
        let registry = SubscriptionRegistry::new();
        let a_mac = SubscriptionKey::new(node(1), ServiceModel::Mac);
        let a_rlc = SubscriptionKey::new(node(1), ServiceModel::Rlc);
        let b_mac = SubscriptionKey::new(node(2), ServiceModel::Mac);

        for (handle, key) in [&a_mac, &a_rlc, &b_mac].into_iter().enumerate() {
            registry
                .put(key.clone(), active(key, handle as u64))
                .await
                .unwrap();
        }

        let for_a = registry.all_for_node(&node(1)).await;
        assert_eq!(for_a.len(), 2);
        assert!(for_a.contains(&a_mac));
        assert!(for_a.contains(&a_rlc));
        assert!(registry.all_for_node(&node(3)).await.is_empty());
    }

    #[tokio::test]
    async fn retire_closes_the_listener() {
        let key = SubscriptionKey::new(node(1), ServiceModel::Mac);
        let entry = active(&key, 9);
        let listener = entry.listener().clone();

        let handle = entry.retire();

        assert_eq!(handle.id(), 9);
        assert!(!listener.is_active());
    }
}
