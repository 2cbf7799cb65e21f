// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Test harness for the forms gateway.
//!
//! Builds the full router around a manual clock and an in-memory mailer,
//! and simulates abusive submission patterns against it.

#![allow(dead_code)]

pub mod app;
pub mod attacks;
pub mod generators;
pub mod metrics;
