// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Xiaobaix-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Xiaobaix and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Core data model: message records, per-character configs, extracted
//! variables, and the per-message pipeline state.

pub mod config;
#[cfg(test)]
pub(crate) mod fixtures;
pub mod history;
pub mod ids;
pub mod message;
pub mod settings;
pub mod state;
pub mod vars;

pub use config::{CharacterTemplateConfig, DEFAULT_CUSTOM_REGEX};
pub use history::{VariableHistory, HISTORY_CAP};
pub use ids::{AvatarId, MessageId};
pub use message::{Message, MessageExtra};
pub use settings::ExtensionSettings;
pub use state::{FrameHandle, PipelineState};
pub use vars::Variables;
