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

//! Data-plane layer.
//!
//! Owns the indication path: listeners bound to individual subscriptions, the bounded
//! queue between engine callback threads and the reconciler, and the forwarder worker
//! that hands events to the configured [`crate::IndicationSink`].
//!
//! ```
//! use e2_reconciler::{
//!     Indication, IndicationSink, LatencyTracker, NodeId, RanType, ServiceModel,
//!     SubscriptionKey,
//! };
//! # use e2_reconciler::IndicationEvent;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let node = NodeId::new("001", "01", 3584, RanType::Gnb);
//! let tracker = LatencyTracker::new();
//! tracker
//!     .on_indication(IndicationEvent {
//!         key: SubscriptionKey::new(node.clone(), ServiceModel::Mac),
//!         indication: Indication {
//!             node,
//!             service_model: ServiceModel::Mac,
//!             timestamp_us: 1_000,
//!             payload: vec![0x01],
//!         },
//!         received_at_us: 1_250,
//!     })
//!     .await;
//!
//! let stats = tracker.snapshot().await;
//! assert_eq!(stats.values().next().unwrap().last_latency_us, Some(250));
//! # });
//! ```

pub(crate) mod indication_forwarder;
pub(crate) mod indication_listener;
pub(crate) mod latency_tracker;
