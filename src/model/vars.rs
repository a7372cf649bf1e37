// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Xiaobaix-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Xiaobaix and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

/// Variables extracted from one message, in order of appearance.
///
/// `serde_json::Map` is insertion-ordered here (the crate is built with
/// `preserve_order`), which matters for repeated-name overwrite semantics:
/// later matches replace the value but keep the original position.
pub type Variables = serde_json::Map<String, serde_json::Value>;
