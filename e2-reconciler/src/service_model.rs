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

//! Service models, report intervals and per-node applicability.

use crate::node_id::RanType;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Reporting capability an E2 node can be subscribed to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ServiceModel {
    Mac,
    Rlc,
    Pdcp,
    Gtp,
    Kpm,
    Slice,
}

impl ServiceModel {
    pub fn name(&self) -> &'static str {
        match self {
            ServiceModel::Mac => "MAC",
            ServiceModel::Rlc => "RLC",
            ServiceModel::Pdcp => "PDCP",
            ServiceModel::Gtp => "GTP",
            ServiceModel::Kpm => "KPM",
            ServiceModel::Slice => "SLICE",
        }
    }

    /// Node types that expose this service model. KPM is further narrowed by the RAN type
    /// configured on its [`ServiceModelSpec`].
    pub fn supports(&self, ran_type: RanType) -> bool {
        match self {
            ServiceModel::Mac | ServiceModel::Rlc | ServiceModel::Slice => matches!(
                ran_type,
                RanType::Gnb | RanType::GnbDu | RanType::Enb
            ),
            ServiceModel::Pdcp | ServiceModel::Gtp => matches!(
                ran_type,
                RanType::Gnb | RanType::GnbCu | RanType::GnbCuUp
            ),
            ServiceModel::Kpm => ran_type != RanType::Enb,
        }
    }
}

impl Display for ServiceModel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ServiceModelParseError {
    #[error("unknown service model '{0}'")]
    UnknownServiceModel(String),
    #[error("unsupported report interval '{0}', expected one of 1, 2, 5, 10, 100, 1000 ms")]
    UnsupportedInterval(String),
}

impl FromStr for ServiceModel {
    type Err = ServiceModelParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "MAC" => Ok(ServiceModel::Mac),
            "RLC" => Ok(ServiceModel::Rlc),
            "PDCP" => Ok(ServiceModel::Pdcp),
            "GTP" => Ok(ServiceModel::Gtp),
            "KPM" => Ok(ServiceModel::Kpm),
            "SLICE" => Ok(ServiceModel::Slice),
            _ => Err(ServiceModelParseError::UnknownServiceModel(s.to_string())),
        }
    }
}

/// Report period requested in a subscription.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "IntervalRepr", into = "u64")]
pub enum ReportInterval {
    Ms1,
    Ms2,
    Ms5,
    Ms10,
    Ms100,
    Ms1000,
}

impl ReportInterval {
    pub fn as_millis(&self) -> u64 {
        match self {
            ReportInterval::Ms1 => 1,
            ReportInterval::Ms2 => 2,
            ReportInterval::Ms5 => 5,
            ReportInterval::Ms10 => 10,
            ReportInterval::Ms100 => 100,
            ReportInterval::Ms1000 => 1000,
        }
    }

    pub fn as_duration(&self) -> Duration {
        Duration::from_millis(self.as_millis())
    }

    pub fn from_millis(millis: u64) -> Result<Self, ServiceModelParseError> {
        match millis {
            1 => Ok(ReportInterval::Ms1),
            2 => Ok(ReportInterval::Ms2),
            5 => Ok(ReportInterval::Ms5),
            10 => Ok(ReportInterval::Ms10),
            100 => Ok(ReportInterval::Ms100),
            1000 => Ok(ReportInterval::Ms1000),
            other => Err(ServiceModelParseError::UnsupportedInterval(
                other.to_string(),
            )),
        }
    }
}

impl Display for ReportInterval {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}_ms", self.as_millis())
    }
}

impl FromStr for ReportInterval {
    type Err = ServiceModelParseError;

    /// Accepts `"10_ms"`, `"10ms"` and `"10"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_suffix("_ms")
            .or_else(|| trimmed.strip_suffix("ms"))
            .unwrap_or(trimmed);

        digits
            .parse::<u64>()
            .map_err(|_| ServiceModelParseError::UnsupportedInterval(s.to_string()))
            .and_then(Self::from_millis)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IntervalRepr {
    Millis(u64),
    Text(String),
}

impl TryFrom<IntervalRepr> for ReportInterval {
    type Error = ServiceModelParseError;

    fn try_from(repr: IntervalRepr) -> Result<Self, Self::Error> {
        match repr {
            IntervalRepr::Millis(millis) => Self::from_millis(millis),
            IntervalRepr::Text(text) => text.parse(),
        }
    }
}

impl From<ReportInterval> for u64 {
    fn from(interval: ReportInterval) -> Self {
        interval.as_millis()
    }
}

/// One configured subscription request, applied to every node it is applicable to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceModelSpec {
    pub service_model: ServiceModel,
    pub interval: ReportInterval,
    /// KPM measurement names, in configuration order.
    pub actions: Vec<String>,
    /// RAN type a KPM spec is restricted to.
    pub ran_type: Option<RanType>,
}

impl ServiceModelSpec {
    pub fn new(service_model: ServiceModel, interval: ReportInterval) -> Self {
        Self {
            service_model,
            interval,
            actions: Vec::new(),
            ran_type: None,
        }
    }

    pub fn kpm(interval: ReportInterval, ran_type: RanType, actions: Vec<String>) -> Self {
        Self {
            service_model: ServiceModel::Kpm,
            interval,
            actions,
            ran_type: Some(ran_type),
        }
    }

    /// Whether a node of `ran_type` should be subscribed with this spec.
    ///
    /// A KPM spec without a configured RAN type never matches.
    pub fn applies_to(&self, ran_type: RanType) -> bool {
        if !self.service_model.supports(ran_type) {
            return false;
        }
        match self.service_model {
            ServiceModel::Kpm => self.ran_type == Some(ran_type),
            _ => true,
        }
    }
}
