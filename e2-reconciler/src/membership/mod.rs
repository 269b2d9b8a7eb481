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

//! Membership layer.
//!
//! Encapsulates node-directory access and the set-difference policy used to turn two
//! consecutive directory snapshots into joined/left node sets.
//!
//! ```
//! use e2_reconciler::{MembershipSnapshot, NodeId, RanType};
//!
//! let a = NodeId::new("001", "01", 1, RanType::Gnb);
//! let b = NodeId::new("001", "01", 2, RanType::Enb);
//!
//! let previous = MembershipSnapshot::from_nodes([a.clone(), b.clone()]);
//! // Listing order is irrelevant: a reordered listing is not churn.
//! let reordered = MembershipSnapshot::from_nodes([b.clone(), a.clone()]);
//! assert!(previous.diff(&reordered).is_empty());
//!
//! let current = MembershipSnapshot::from_nodes([b]);
//! let delta = previous.diff(&current);
//! assert_eq!(delta.left, vec![a]);
//! assert!(delta.joined.is_empty());
//! ```

pub(crate) mod node_directory;
pub(crate) mod snapshot;
