// SPDX-FileCopyrightText: 2026 Reclaim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Template renderer collaborator.

use std::collections::BTreeMap;

use crate::error::ReclaimError;

/// Named placeholder values supplied by the engine.
pub type TemplateVars = BTreeMap<String, String>;

/// Substitutes named placeholders into the content of a stored template.
pub trait TemplateRenderer: Send + Sync {
    /// Render the template identified by `template_id`.
    fn render(&self, template_id: &str, vars: &TemplateVars) -> Result<String, ReclaimError>;

    /// Render an ad-hoc content string (used for subjects).
    fn render_str(&self, content: &str, vars: &TemplateVars) -> String;
}
