// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// MCQ module — extraction, option layout and worksheet formatting.

pub mod extract;
pub mod format;
pub mod layout;

pub use extract::{McqAnswer, McqOption, McqRecord, extract_mcqs};
pub use format::format_mcqs;
pub use layout::{classify, effective_length};
