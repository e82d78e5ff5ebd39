// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Cropdoc Client — the single network collaborator of the scanner: the remote
// crop-disease prediction service. Every call is timeout-bounded and every
// failure is normalized before it leaves this crate.

pub mod api_client;

#[cfg(test)]
mod test_server;

pub use api_client::{PredictionClient, disease_names, disease_summary};
