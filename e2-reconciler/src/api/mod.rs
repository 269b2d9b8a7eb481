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

//! API facade layer.
//!
//! Keeps outward usage reconciler-centric while delegating internals to the
//! domain-focused modules.
//!
//! ```ignore
//! use std::sync::Arc;
//! use e2_reconciler::{E2Reconciler, LatencyTracker, ReconcilerConfig};
//!
//! # let engine: Arc<dyn e2_reconciler::E2ProtocolEngine> = todo!("inject implementation");
//! # let specs = Vec::new();
//! let reconciler = E2Reconciler::start(
//!     "xapp",
//!     ReconcilerConfig::default(),
//!     specs,
//!     engine,
//!     Arc::new(LatencyTracker::new()),
//! )?;
//! let report = reconciler.shutdown().await?;
//! # Ok::<(), e2_reconciler::StartupError>(())
//! ```

pub mod reconciler;
