// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module — lighter grayscale conversion of existing PDFs.

pub mod grayscale;

pub use grayscale::{DEFAULT_BRIGHTNESS, GrayscaleSummary, PdfGrayscale};
