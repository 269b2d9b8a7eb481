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

//! Control-plane layer.
//!
//! Owns the subscription registry and the driver that turns membership changes into
//! subscribe/unsubscribe calls. This layer is responsible for the at-most-one handle per
//! key invariant and for releasing handles even when remote teardown fails.

pub(crate) mod registry;
pub(crate) mod subscription_driver;
pub(crate) mod subscription_key;
