// ABOUTME: Re-exports the unified error types from airlab-core
// ABOUTME: Keeps `crate::errors::*` paths stable for the server modules
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Air Lab

pub use airlab_core::errors::*;
