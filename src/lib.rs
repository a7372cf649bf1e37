// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Xiaobaix-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Xiaobaix and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Xiaobaix — template variable extraction and live rendering for chat hosts.
//!
//! The engine pulls structured variables out of raw model output (tag pairs,
//! fenced code blocks, bare or truncated JSON/YAML), renders per-character
//! `[[name]]` templates, and keeps embedded frame documents fed with fresh
//! values as messages stream, update, and swipe. Host and DOM concerns live
//! behind the `host::Host` and `embed::EmbedSurface` traits.

pub mod embed;
pub mod extract;
pub mod format;
pub mod host;
pub mod lifecycle;
pub mod model;
pub mod render;
pub mod store;
