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

//! Collaborator seams: the E2AP protocol engine below the reconciler and the indication
//! consumer above it.

use crate::control_plane::subscription_key::SubscriptionHandle;
use crate::data_plane::indication_listener::{IndicationEvent, IndicationListener};
use crate::error::EngineError;
use crate::node_id::NodeId;
use crate::service_model::{ReportInterval, ServiceModel};
use async_trait::async_trait;
use std::sync::Arc;

/// Parameters of one report subscription.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubscriptionRequest {
    pub node: NodeId,
    pub service_model: ServiceModel,
    pub interval: ReportInterval,
    /// KPM measurement names; empty for every other service model.
    pub actions: Vec<String>,
}

/// E2AP protocol engine owning node discovery and message exchange.
///
/// Calls may be slow, but implementations must eventually return; the reconciler bounds
/// every call with a timeout and treats an elapsed timeout as a failure of that call.
#[async_trait]
pub trait E2ProtocolEngine: Send + Sync {
    /// Nodes whose E2 setup has completed and that have not disconnected since.
    async fn connected_nodes(&self) -> Result<Vec<NodeId>, EngineError>;

    /// Creates a report subscription. Indications for it must be delivered through
    /// [`IndicationListener::deliver`] on `listener`, from any thread.
    async fn subscribe(
        &self,
        request: SubscriptionRequest,
        listener: Arc<IndicationListener>,
    ) -> Result<SubscriptionHandle, EngineError>;

    /// Deletes a subscription. The handle is consumed whatever the outcome.
    async fn unsubscribe(&self, handle: SubscriptionHandle) -> Result<(), EngineError>;
}

/// Downstream consumer of indications (decoders, metrics exporters).
#[async_trait]
pub trait IndicationSink: Send + Sync {
    async fn on_indication(&self, event: IndicationEvent);
}
