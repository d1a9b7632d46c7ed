// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// CQ module — creative-question extraction and formatting.

pub mod extract;
pub mod format;

pub use extract::{CqRecord, extract_cqs};
pub use format::format_cqs;
