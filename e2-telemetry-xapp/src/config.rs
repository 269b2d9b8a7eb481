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

use e2_reconciler::{
    RanType, ReconcilerConfig, ReportInterval, ServiceModel, ServiceModelParseError,
    ServiceModelSpec,
};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unable to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unable to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: json5::Error,
    },
    #[error("custom_sm entry #{index}: {source}")]
    CustomServiceModel {
        index: usize,
        #[source]
        source: ServiceModelParseError,
    },
    #[error("custom_sm entry #{index}: KPM must be configured under oran_sm")]
    KpmInCustomSection { index: usize },
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ReconcilerSection {
    pub poll_interval_ms: u64,
    pub drain_timeout_ms: u64,
    pub engine_call_timeout_ms: u64,
    pub indication_queue_size: usize,
}

impl Default for ReconcilerSection {
    fn default() -> Self {
        let defaults = ReconcilerConfig::default();
        Self {
            poll_interval_ms: defaults.poll_interval.as_millis() as u64,
            drain_timeout_ms: defaults.drain_timeout.as_millis() as u64,
            engine_call_timeout_ms: defaults.engine_call_timeout.as_millis() as u64,
            indication_queue_size: defaults.indication_queue_size,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct EngineSection {
    pub nodes_file: PathBuf,
    #[serde(default)]
    pub synthetic_indications: bool,
}

#[derive(Debug, Deserialize)]
pub struct CustomSmEntry {
    pub name: String,
    pub time: ReportInterval,
}

#[derive(Debug, Deserialize)]
pub struct ActionEntry {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct OranSmEntry {
    pub name: String,
    pub time: ReportInterval,
    #[serde(default)]
    pub format: Option<u32>,
    #[serde(default)]
    pub ran_type: Option<RanType>,
    #[serde(default)]
    pub actions: Vec<ActionEntry>,
}

#[derive(Debug, Deserialize)]
pub struct XappConfig {
    #[serde(default)]
    pub reconciler: ReconcilerSection,
    pub engine: EngineSection,
    #[serde(default)]
    pub custom_sm: Vec<CustomSmEntry>,
    #[serde(default)]
    pub oran_sm: Vec<OranSmEntry>,
}

impl XappConfig {
    /// Loads a JSON5 file. A relative `engine.nodes_file` is resolved against the
    /// directory holding `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let data = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: XappConfig =
            json5::from_str(&data).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        if config.engine.nodes_file.is_relative() {
            if let Some(dir) = path.parent() {
                config.engine.nodes_file = dir.join(&config.engine.nodes_file);
            }
        }
        Ok(config)
    }

    pub fn reconciler_config(&self) -> ReconcilerConfig {
        ReconcilerConfig {
            poll_interval: Duration::from_millis(self.reconciler.poll_interval_ms),
            drain_timeout: Duration::from_millis(self.reconciler.drain_timeout_ms),
            engine_call_timeout: Duration::from_millis(self.reconciler.engine_call_timeout_ms),
            indication_queue_size: self.reconciler.indication_queue_size,
        }
    }

    /// Custom service models first, then O-RAN ones, each in file order. O-RAN entries other
    /// than KPM are skipped.
    pub fn service_model_specs(&self) -> Result<Vec<ServiceModelSpec>, ConfigError> {
        let mut specs = Vec::with_capacity(self.custom_sm.len() + self.oran_sm.len());

        for (index, entry) in self.custom_sm.iter().enumerate() {
            let service_model: ServiceModel = entry
                .name
                .parse()
                .map_err(|source| ConfigError::CustomServiceModel { index, source })?;
            if service_model == ServiceModel::Kpm {
                return Err(ConfigError::KpmInCustomSection { index });
            }
            specs.push(ServiceModelSpec::new(service_model, entry.time));
        }

        for entry in &self.oran_sm {
            if !entry.name.eq_ignore_ascii_case("KPM") {
                warn!(service_model = %entry.name, "unsupported O-RAN service model, skipping");
                continue;
            }
            if let Some(format) = entry.format {
                debug!(format, "KPM action definition format");
            }
            specs.push(ServiceModelSpec {
                service_model: ServiceModel::Kpm,
                interval: entry.time,
                actions: entry.actions.iter().map(|action| action.name.clone()).collect(),
                ran_type: entry.ran_type,
            });
        }

        Ok(specs)
    }
}
