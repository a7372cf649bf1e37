// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Xiaobaix-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Xiaobaix and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use serde_json::Value;
use smallvec::SmallVec;

/// Maximum retained values per variable.
pub const HISTORY_CAP: usize = 5;

/// Rolling window of the most recent distinct consecutive values one
/// variable took across extraction passes, oldest first.
///
/// Purely observational: nothing in the pipeline reads this back for
/// correctness. A value is appended only when it differs from the last
/// recorded one, so a streaming pass that re-extracts an unchanged variable
/// does not grow the window.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariableHistory {
    values: SmallVec<[Value; HISTORY_CAP]>,
}

impl VariableHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, value: &Value) {
        if self.values.last() == Some(value) {
            return;
        }
        self.values.push(value.clone());
        if self.values.len() > HISTORY_CAP {
            self.values.remove(0);
        }
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn latest(&self) -> Option<&Value> {
        self.values.last()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
