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

//! Node-directory adapter used by the reconciliation loop.

use crate::engine::E2ProtocolEngine;
use crate::error::{EngineError, ReconcileError};
use crate::membership::snapshot::MembershipSnapshot;
use crate::observability::events;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

const COMPONENT: &str = "node_directory";

/// Connected-node facade over the protocol engine.
pub(crate) struct NodeDirectory {
    engine: Arc<dyn E2ProtocolEngine>,
    query_timeout: Duration,
    last_known: MembershipSnapshot,
}

impl NodeDirectory {
    pub(crate) fn new(engine: Arc<dyn E2ProtocolEngine>, query_timeout: Duration) -> Self {
        Self {
            engine,
            query_timeout,
            last_known: MembershipSnapshot::default(),
        }
    }

    /// Nodes connected right now, taken from a single engine listing.
    ///
    /// A failed or timed-out listing yields the previous snapshot unchanged, so a transient
    /// engine error is never mistaken for every node leaving.
    pub(crate) async fn snapshot(&mut self) -> MembershipSnapshot {
        let listing = match tokio::time::timeout(self.query_timeout, self.engine.connected_nodes())
            .await
        {
            Ok(listing) => listing,
            Err(_) => Err(EngineError::Unavailable(format!(
                "node listing did not complete within {:?}",
                self.query_timeout
            ))),
        };

        match listing {
            Ok(nodes) => {
                self.last_known = MembershipSnapshot::from_nodes(nodes);
            }
            Err(err) => {
                let err = ReconcileError::TransientDirectory(err);
                warn!(
                    event = events::DIRECTORY_QUERY_FAILED,
                    component = COMPONENT,
                    known_nodes = self.last_known.len(),
                    err = %err,
                    "keeping previous membership snapshot"
                );
            }
        }

        self.last_known.clone()
    }
}
