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

//! Membership snapshots and the joined/left delta between two of them.

use crate::node_id::NodeId;
use std::collections::BTreeSet;

/// Set of nodes observed by one directory query.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MembershipSnapshot {
    nodes: BTreeSet<NodeId>,
}

impl MembershipSnapshot {
    /// Builds a snapshot from a directory listing; duplicates collapse, order is dropped.
    pub fn from_nodes(nodes: impl IntoIterator<Item = NodeId>) -> Self {
        Self {
            nodes: nodes.into_iter().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn contains(&self, node: &NodeId) -> bool {
        self.nodes.contains(node)
    }

    pub fn iter(&self) -> impl Iterator<Item = &NodeId> {
        self.nodes.iter()
    }

    /// Changes from `self` (previous tick) to `current`.
    pub fn diff(&self, current: &MembershipSnapshot) -> MembershipDelta {
        MembershipDelta {
            joined: current.nodes.difference(&self.nodes).cloned().collect(),
            left: self.nodes.difference(&current.nodes).cloned().collect(),
        }
    }
}

/// Nodes that appeared and disappeared between two snapshots, in `NodeId` order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MembershipDelta {
    pub joined: Vec<NodeId>,
    pub left: Vec<NodeId>,
}

impl MembershipDelta {
    pub fn is_empty(&self) -> bool {
        self.joined.is_empty() && self.left.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::MembershipSnapshot;
    use crate::node_id::{NodeId, RanType};

    fn node(nb_id: u32, ran_type: RanType) -> NodeId {
        NodeId::new("001", "01", nb_id, ran_type)
    }

    #[test]
    fn diff_reports_joined_and_left_nodes() {
        let a = node(1, RanType::Gnb);
        let b = node(2, RanType::Enb);
        let c = node(3, RanType::GnbDu);

        let previous = MembershipSnapshot::from_nodes([a.clone(), b.clone()]);
        let current = MembershipSnapshot::from_nodes([b, c.clone()]);

        let delta = previous.diff(&current);
        assert_eq!(delta.joined, vec![c]);
        assert_eq!(delta.left, vec![a]);
    }

    #[test]
    fn identical_nodes_from_separate_listings_are_not_churn() {
        let previous = MembershipSnapshot::from_nodes([NodeId::new("1", "1", 9, RanType::Gnb)]);
        let current = MembershipSnapshot::from_nodes([NodeId::new("001", "01", 9, RanType::Gnb)]);

        assert!(previous.diff(&current).is_empty());
    }

    #[test]
    fn duplicate_listing_entries_collapse() {
        let a = node(1, RanType::Gnb);
        let snapshot = MembershipSnapshot::from_nodes([a.clone(), a.clone()]);

        assert_eq!(snapshot.len(), 1);
        assert!(snapshot.contains(&a));
    }

    #[test]
    fn everything_leaves_when_directory_empties() {
        let a = node(1, RanType::Gnb);
        let previous = MembershipSnapshot::from_nodes([a.clone()]);

        let delta = previous.diff(&MembershipSnapshot::default());
        assert_eq!(delta.left, vec![a]);
        assert!(delta.joined.is_empty());
    }
}
