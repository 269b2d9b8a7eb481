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

//! Error taxonomy shared by the reconciler and protocol engine implementations.

use crate::control_plane::registry::ActiveSubscription;
use crate::control_plane::subscription_key::SubscriptionKey;
use std::time::Duration;
use thiserror::Error;

/// Failure reported by an [`crate::E2ProtocolEngine`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("protocol engine unavailable: {0}")]
    Unavailable(String),
    #[error("subscription rejected by E2 node: {0}")]
    Rejected(String),
    #[error("unknown subscription handle {0}")]
    UnknownHandle(u64),
    #[error("invalid E2 node description: {0}")]
    InvalidNode(String),
}

/// Attempt to register a second live handle for a key.
///
/// Carries the rejected entry so the caller can still release its remote handle.
#[derive(Debug, Error)]
#[error("subscription already registered for {key}")]
pub struct DuplicateSubscriptionError {
    pub key: SubscriptionKey,
    pub rejected: ActiveSubscription,
}

/// Per-tick failures. None of these abort the reconciliation loop; they are logged where
/// they occur.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("directory query failed, reusing previous snapshot: {0}")]
    TransientDirectory(#[source] EngineError),
    #[error(transparent)]
    DuplicateSubscription(#[from] DuplicateSubscriptionError),
    #[error("subscribe failed for {key}: {source}")]
    SubscribeFailure {
        key: SubscriptionKey,
        #[source]
        source: EngineError,
    },
    #[error("unsubscribe failed for {key}: {source}")]
    UnsubscribeFailure {
        key: SubscriptionKey,
        #[source]
        source: EngineError,
    },
    #[error("protocol engine did not answer {operation} within {timeout:?}")]
    EngineTimeout {
        operation: &'static str,
        timeout: Duration,
    },
    #[error("drain deadline elapsed with {abandoned} subscription(s) abandoned")]
    DrainTimeout { abandoned: usize },
}

/// Fatal errors raised while starting or stopping the reconciler.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid reconciler configuration: {0}")]
    InvalidConfig(String),
    #[error("no service model specs configured")]
    NoServiceModels,
    #[error("KPM spec #{index} has no applicable RAN type")]
    KpmWithoutRanType { index: usize },
    #[error("protocol engine initialization failed: {0}")]
    Engine(#[from] EngineError),
    #[error("reconciliation task failed: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}
