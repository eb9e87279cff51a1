// ABOUTME: Re-exports application constants from airlab-core
// ABOUTME: Limits, billing plans, defaults, and environment variable names
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Air Lab

pub use airlab_core::constants::*;
