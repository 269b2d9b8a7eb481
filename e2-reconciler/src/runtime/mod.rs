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

//! Runtime integration layer.
//!
//! Hosts the reconciliation loop state machine and the task boundaries of the crate, so
//! async scheduling concerns stay localized and predictable for the rest of the crate.
//!
//! ```ignore
//! use std::sync::Arc;
//! use e2_reconciler::{E2Reconciler, ReconcilerConfig};
//! use e2_static_engine::E2StaticFileEngine;
//!
//! // Runtime helpers are internal and carry no subscription policy.
//! let engine = Arc::new(E2StaticFileEngine::new("nodes.json"));
//! let _reconciler = E2Reconciler::start("runtime-doc", ReconcilerConfig::default(), specs, engine, sink)?;
//! ```

pub(crate) mod reconciliation_loop;
pub(crate) mod worker_runtime;
