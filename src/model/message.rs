// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Xiaobaix-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Xiaobaix and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use serde::{Deserialize, Serialize};

/// Extra per-message data owned by the host record.
///
/// The pipeline only ever touches `display_text`; everything else the host
/// stores under `extra` is opaque to this crate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageExtra {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_text: Option<String>,
}

/// One message record in the host's conversation log.
///
/// Field names mirror the host's wire shape (`mes` is the raw model output).
/// The pipeline reads `mes` and writes `extra.display_text`; it never mutates
/// `mes` itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub mes: String,
    #[serde(default)]
    pub is_user: bool,
    #[serde(default)]
    pub is_system: bool,
    #[serde(default)]
    pub force_avatar: bool,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_avatar: Option<String>,
    #[serde(default)]
    pub extra: MessageExtra,
}

impl Message {
    pub fn assistant(mes: impl Into<String>) -> Self {
        Self {
            mes: mes.into(),
            ..Self::default()
        }
    }

    pub fn user(mes: impl Into<String>) -> Self {
        Self {
            mes: mes.into(),
            is_user: true,
            ..Self::default()
        }
    }

    pub fn system(mes: impl Into<String>) -> Self {
        Self {
            mes: mes.into(),
            is_system: true,
            ..Self::default()
        }
    }
}
