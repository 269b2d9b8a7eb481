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

//! Runtime helpers for spawning the crate's long-lived tasks.

use crate::data_plane::indication_listener::IndicationEvent;
use crate::engine::IndicationSink;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::mpsc::Receiver;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info_span, Instrument};

pub(crate) fn spawn_forwarding_loop<F, Fut>(
    sink: Arc<dyn IndicationSink>,
    receiver: Receiver<IndicationEvent>,
    cancel: CancellationToken,
    run_loop: F,
) -> JoinHandle<u64>
where
    F: FnOnce(Arc<dyn IndicationSink>, Receiver<IndicationEvent>, CancellationToken) -> Fut,
    Fut: Future<Output = u64> + Send + 'static,
{
    tokio::spawn(run_loop(sink, receiver, cancel))
}

/// Spawns the reconciliation loop inside a span naming the reconciler, so every event it
/// emits (including from the driver and the node directory) carries that name.
pub(crate) fn spawn_reconciliation_task<Fut, T>(reconciler: &str, task: Fut) -> JoinHandle<T>
where
    Fut: Future<Output = T> + Send + 'static,
    T: Send + 'static,
{
    let span = info_span!("reconciliation_loop", reconciler = %reconciler);
    tokio::spawn(task.instrument(span))
}
