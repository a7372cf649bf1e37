// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Xiaobaix-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Xiaobaix and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Structured-text parsers tuned for model output.
//!
//! Model output is frequently truncated mid-token by streaming, so each
//! format ships in two variants: a strict parse that either succeeds
//! completely or reports a miss, and a partial parse that salvages every
//! complete key/value pair from a broken prefix. Neither variant ever
//! returns an error; an unparseable input is simply an empty result.

pub mod detect;
pub mod json;
pub mod yaml;


pub use detect::{looks_like_json, looks_like_yaml};
pub use json::{parse_json, parse_json_partial};
pub use yaml::{parse_yaml, parse_yaml_partial};
