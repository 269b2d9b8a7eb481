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

//! Point-in-time health snapshot published by the reconciliation loop.

use crate::node_id::NodeId;
use crate::runtime::reconciliation_loop::ReconcilerState;

/// Copy of the loop's observable state after its most recent tick.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReconcilerHealth {
    pub state: ReconcilerState,
    /// Nodes in the last membership snapshot.
    pub connected_nodes: Vec<NodeId>,
    pub active_subscriptions: usize,
    pub ticks: u64,
    pub last_joined: Vec<NodeId>,
    pub last_left: Vec<NodeId>,
    /// Indications dropped so far because a listener was closed or the queue was full.
    pub indications_dropped: u64,
}

impl ReconcilerHealth {
    pub fn is_stopped(&self) -> bool {
        self.state == ReconcilerState::Stopped
    }
}
