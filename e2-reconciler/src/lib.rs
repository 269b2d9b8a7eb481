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

//! # e2-reconciler
//!
//! `e2-reconciler` keeps per-node, per-service-model report subscriptions in step with the
//! set of E2 nodes currently connected to a RAN intelligent controller.
//!
//! Typical usage is API-first and remains centered on [`E2Reconciler`], an
//! [`E2ProtocolEngine`] implementation and an [`IndicationSink`].
//!
//! ## Quick start
//!
//! ```
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use e2_reconciler::{
//!     E2ProtocolEngine, E2Reconciler, EngineError, IndicationEvent, IndicationListener,
//!     IndicationSink, NodeId, RanType, ReconcilerConfig, ReportInterval, ServiceModel,
//!     ServiceModelSpec, SubscriptionHandle, SubscriptionRequest,
//! };
//!
//! struct SingleNodeEngine;
//!
//! #[async_trait]
//! impl E2ProtocolEngine for SingleNodeEngine {
//!     async fn connected_nodes(&self) -> Result<Vec<NodeId>, EngineError> {
//!         Ok(vec![NodeId::new("001", "01", 3584, RanType::Gnb)])
//!     }
//!
//!     async fn subscribe(
//!         &self,
//!         _request: SubscriptionRequest,
//!         _listener: Arc<IndicationListener>,
//!     ) -> Result<SubscriptionHandle, EngineError> {
//!         Ok(SubscriptionHandle::new(1))
//!     }
//!
//!     async fn unsubscribe(&self, _handle: SubscriptionHandle) -> Result<(), EngineError> {
//!         Ok(())
//!     }
//! }
//!
//! struct DiscardSink;
//!
//! #[async_trait]
//! impl IndicationSink for DiscardSink {
//!     async fn on_indication(&self, _event: IndicationEvent) {}
//! }
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let specs = vec![ServiceModelSpec::new(ServiceModel::Mac, ReportInterval::Ms10)];
//! let reconciler = E2Reconciler::start(
//!     "quick-start",
//!     ReconcilerConfig::default(),
//!     specs,
//!     Arc::new(SingleNodeEngine),
//!     Arc::new(DiscardSink),
//! )
//! .unwrap();
//!
//! let report = reconciler.shutdown().await.unwrap();
//! assert_eq!(report.abandoned, 0);
//! # });
//! ```
//!
//! ## Reconciliation contract
//!
//! - Membership is compared by [`NodeId`] equality only. Reordered directory listings are
//!   never churn, and a node that flaps within one polling interval is invisible.
//! - At most one live [`SubscriptionHandle`] exists per [`SubscriptionKey`].
//! - A node reported as left has no registry entries by the end of that tick, whether or not
//!   the remote unsubscribe succeeded.
//! - Shutdown drains the registry within a bounded deadline and never waits on the engine
//!   past it.
//!
//! ## Internal architecture map
//!
//! - API facade: outward `E2Reconciler` surface and health snapshots
//! - Control plane: subscription registry ownership and the subscribe/unsubscribe driver
//! - Membership: node directory access and snapshot diffing
//! - Data plane: indication listeners bound to subscriptions and the sink forwarder
//! - Runtime: reconciliation loop state machine and task boundaries
//!
//! ## Observability model
//!
//! The workspace uses `tracing` for logs/events.
//! Library code emits events/spans and does not unconditionally initialize a global
//! subscriber. Binaries and tests are responsible for one-time
//! `tracing_subscriber` initialization at process boundaries.

mod api;
pub use api::reconciler::E2Reconciler;

mod config;
pub use config::ReconcilerConfig;

mod control_plane;
pub use control_plane::registry::{ActiveSubscription, SubscriptionRegistry};
pub use control_plane::subscription_key::{SubscriptionHandle, SubscriptionKey};

mod data_plane;
pub use data_plane::indication_listener::{Indication, IndicationEvent, IndicationListener};
pub use data_plane::latency_tracker::{IndicationStats, LatencyTracker};

mod engine;
pub use engine::{E2ProtocolEngine, IndicationSink, SubscriptionRequest};

mod error;
pub use error::{DuplicateSubscriptionError, EngineError, ReconcileError, StartupError};

mod health;
pub use health::ReconcilerHealth;

mod membership;
pub use membership::snapshot::{MembershipDelta, MembershipSnapshot};

mod node_id;
pub use node_id::{NodeId, Plmn, RanType};

#[doc(hidden)]
pub mod observability;

mod runtime;
pub use runtime::reconciliation_loop::{DrainReport, ReconcilerState};

mod service_model;
pub use service_model::{ReportInterval, ServiceModel, ServiceModelParseError, ServiceModelSpec};

#[cfg(test)]
mod test_support;
