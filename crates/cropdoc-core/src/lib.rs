// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Cropdoc — Core types, errors, and result mapping shared across all crates.

pub mod config;
pub mod error;
pub mod human_errors;
pub mod result;
pub mod types;

pub use config::AppConfig;
pub use error::CropdocError;
pub use result::DisplayResult;
pub use types::*;
