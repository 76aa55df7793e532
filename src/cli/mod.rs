// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! CLI subsystem for the Boolean kernel

pub mod logger;
pub mod reporter;

pub use logger::init_logger;
pub use reporter::Reporter;
