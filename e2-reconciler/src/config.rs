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

//! Runtime tuning knobs of the reconciler.

use crate::error::StartupError;
use std::time::Duration;

/// Timing and sizing parameters for one [`crate::E2Reconciler`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReconcilerConfig {
    /// Delay between two directory queries.
    pub poll_interval: Duration,
    /// Upper bound on the shutdown drain.
    pub drain_timeout: Duration,
    /// Upper bound on any single subscribe or unsubscribe call.
    pub engine_call_timeout: Duration,
    /// Capacity of the indication queue between listeners and the sink.
    pub indication_queue_size: usize,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            drain_timeout: Duration::from_secs(2),
            engine_call_timeout: Duration::from_secs(5),
            indication_queue_size: 1024,
        }
    }
}

impl ReconcilerConfig {
    pub fn validate(&self) -> Result<(), StartupError> {
        if self.poll_interval.is_zero() {
            return Err(StartupError::InvalidConfig(
                "poll_interval must be greater than zero".to_string(),
            ));
        }
        if self.drain_timeout.is_zero() {
            return Err(StartupError::InvalidConfig(
                "drain_timeout must be greater than zero".to_string(),
            ));
        }
        if self.engine_call_timeout.is_zero() {
            return Err(StartupError::InvalidConfig(
                "engine_call_timeout must be greater than zero".to_string(),
            ));
        }
        if self.indication_queue_size == 0 {
            return Err(StartupError::InvalidConfig(
                "indication_queue_size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
