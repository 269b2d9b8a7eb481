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

//! Field formatting helpers shared by log call sites.

use crate::control_plane::subscription_key::SubscriptionKey;
use crate::node_id::NodeId;

pub fn format_node(node: &NodeId) -> String {
    node.canonical_key()
}

pub fn format_key(key: &SubscriptionKey) -> String {
    key.to_string()
}

/// Compact list of canonical node keys, e.g. `[PLMN_00101-NBID_1-ngran_gNB]`.
pub fn format_nodes<'a>(nodes: impl IntoIterator<Item = &'a NodeId>) -> String {
    let keys: Vec<String> = nodes.into_iter().map(NodeId::canonical_key).collect();
    format!("[{}]", keys.join(", "))
}

#[cfg(test)]
mod tests {
    use super::format_nodes;
    use crate::node_id::{NodeId, RanType};

    #[test]
    fn format_nodes_joins_canonical_keys() {
        let nodes = [
            NodeId::new("001", "01", 1, RanType::Gnb),
            NodeId::new("001", "01", 2, RanType::Enb),
        ];
        assert_eq!(
            format_nodes(&nodes),
            "[PLMN_00101-NBID_1-ngran_gNB, PLMN_00101-NBID_2-ngran_eNB]"
        );
        assert_eq!(format_nodes(&Vec::<NodeId>::new()), "[]");
    }
}
