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

//! E2 node identity value types.

use crate::error::EngineError;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// NG-RAN node type reported by an E2 node during E2 setup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RanTypeRepr", into = "String")]
pub enum RanType {
    Enb,
    Gnb,
    GnbCu,
    GnbDu,
    GnbCuCp,
    GnbCuUp,
}

impl RanType {
    pub const ALL: [RanType; 6] = [
        RanType::Enb,
        RanType::Gnb,
        RanType::GnbCu,
        RanType::GnbDu,
        RanType::GnbCuCp,
        RanType::GnbCuUp,
    ];

    /// Name used by the E2 agent configuration files, e.g. `ngran_gNB_DU`.
    pub fn ngran_name(&self) -> &'static str {
        match self {
            RanType::Enb => "ngran_eNB",
            RanType::Gnb => "ngran_gNB",
            RanType::GnbCu => "ngran_gNB_CU",
            RanType::GnbDu => "ngran_gNB_DU",
            RanType::GnbCuCp => "ngran_gNB_CUCP",
            RanType::GnbCuUp => "ngran_gNB_CUUP",
        }
    }

    /// Numeric node type as carried by the E2 setup request.
    pub fn code(&self) -> u32 {
        match self {
            RanType::Enb => 0,
            RanType::Gnb => 2,
            RanType::GnbCu => 5,
            RanType::GnbDu => 7,
            RanType::GnbCuCp => 9,
            RanType::GnbCuUp => 10,
        }
    }

    pub fn from_code(code: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|ran_type| ran_type.code() == code)
    }
}

impl Display for RanType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.ngran_name())
    }
}

impl FromStr for RanType {
    type Err = EngineError;

    /// Accepts the ngran name with or without the `ngran_` prefix, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let unprefixed = trimmed
            .strip_prefix("ngran_")
            .or_else(|| trimmed.strip_prefix("NGRAN_"))
            .unwrap_or(trimmed);

        Self::ALL
            .into_iter()
            .find(|ran_type| {
                ran_type.ngran_name()["ngran_".len()..].eq_ignore_ascii_case(unprefixed)
            })
            .ok_or_else(|| EngineError::InvalidNode(format!("unknown RAN type '{s}'")))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RanTypeRepr {
    Code(u32),
    Name(String),
}

impl TryFrom<RanTypeRepr> for RanType {
    type Error = EngineError;

    fn try_from(repr: RanTypeRepr) -> Result<Self, Self::Error> {
        match repr {
            RanTypeRepr::Code(code) => Self::from_code(code)
                .ok_or_else(|| EngineError::InvalidNode(format!("unknown RAN type code {code}"))),
            RanTypeRepr::Name(name) => name.parse(),
        }
    }
}

impl From<RanType> for String {
    fn from(ran_type: RanType) -> Self {
        ran_type.ngran_name().to_string()
    }
}

/// Public land mobile network identity of an E2 node.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Plmn {
    mcc: String,
    mnc: String,
}

impl Plmn {
    /// Trims both fields and left-pads `mcc` to 3 and `mnc` to 2 digits so that the same
    /// PLMN reported with different formatting compares equal.
    pub fn new(mcc: &str, mnc: &str) -> Self {
        Self {
            mcc: format!("{:0>3}", mcc.trim()),
            mnc: format!("{:0>2}", mnc.trim()),
        }
    }

    pub fn mcc(&self) -> &str {
        &self.mcc
    }

    pub fn mnc(&self) -> &str {
        &self.mnc
    }
}

/// Identity of one E2 node. Two `NodeId`s with identical normalized fields are the same
/// logical node, regardless of which directory snapshot reported them.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    plmn: Plmn,
    nb_id: u32,
    ran_type: RanType,
}

impl NodeId {
    pub fn new(mcc: &str, mnc: &str, nb_id: u32, ran_type: RanType) -> Self {
        Self {
            plmn: Plmn::new(mcc, mnc),
            nb_id,
            ran_type,
        }
    }

    pub fn plmn(&self) -> &Plmn {
        &self.plmn
    }

    pub fn nb_id(&self) -> u32 {
        self.nb_id
    }

    pub fn ran_type(&self) -> RanType {
        self.ran_type
    }

    /// Canonical key used for log fields and metric labels,
    /// e.g. `PLMN_00101-NBID_3584-ngran_gNB`.
    pub fn canonical_key(&self) -> String {
        format!(
            "PLMN_{}{}-NBID_{}-{}",
            self.plmn.mcc,
            self.plmn.mnc,
            self.nb_id,
            self.ran_type.ngran_name()
        )
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.canonical_key())
    }
}
