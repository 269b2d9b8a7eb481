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

//! Subscription identity and handle types.

use crate::node_id::NodeId;
use crate::service_model::ServiceModel;
use std::fmt::{Display, Formatter};

/// Registry key: one (node, service model) pair.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionKey {
    pub node: NodeId,
    pub service_model: ServiceModel,
}

impl SubscriptionKey {
    pub fn new(node: NodeId, service_model: ServiceModel) -> Self {
        Self {
            node,
            service_model,
        }
    }
}

impl Display for SubscriptionKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.node, self.service_model)
    }
}

/// Opaque token returned by the protocol engine for one live subscription.
///
/// Deliberately not `Clone`: the registry entry owns it until it is handed back to
/// [`crate::E2ProtocolEngine::unsubscribe`].
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle(u64);

impl SubscriptionHandle {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::SubscriptionKey;
    use crate::node_id::{NodeId, RanType};
    use crate::service_model::ServiceModel;

    #[test]
    fn keys_for_the_same_node_differ_by_service_model() {
        let node = NodeId::new("001", "01", 1, RanType::Gnb);
        let mac = SubscriptionKey::new(node.clone(), ServiceModel::Mac);
        let rlc = SubscriptionKey::new(node.clone(), ServiceModel::Rlc);

        assert_ne!(mac, rlc);
        assert_eq!(mac, SubscriptionKey::new(node, ServiceModel::Mac));
        assert_eq!(mac.to_string(), "PLMN_00101-NBID_1-ngran_gNB/MAC");
    }
}
