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

//! Stable event names used in the `event` field of lifecycle log lines.

pub const STATE_TRANSITION: &str = "state_transition";
pub const NODE_JOINED: &str = "node_joined";
pub const NODE_LEFT: &str = "node_left";
pub const NO_NODES_CONNECTED: &str = "no_nodes_connected";
pub const DIRECTORY_QUERY_FAILED: &str = "directory_query_failed";

pub const SUBSCRIBE_OK: &str = "subscribe_ok";
pub const SUBSCRIBE_FAILED: &str = "subscribe_failed";
pub const SUBSCRIBE_NOT_APPLICABLE: &str = "subscribe_not_applicable";
pub const DUPLICATE_SUBSCRIPTION: &str = "duplicate_subscription";
pub const UNSUBSCRIBE_OK: &str = "unsubscribe_ok";
pub const UNSUBSCRIBE_FAILED: &str = "unsubscribe_failed";

pub const DRAIN_TIMEOUT: &str = "drain_timeout";
pub const DRAIN_COMPLETE: &str = "drain_complete";

pub const INDICATION_DROPPED: &str = "indication_dropped";
pub const FORWARDER_STOPPED: &str = "forwarder_stopped";
