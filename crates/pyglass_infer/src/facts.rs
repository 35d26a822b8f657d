//! Serializable view of a substitution map for host surfaces.
//!
//! Hosts that surface unification results (debug views, LSP hovers,
//! telemetry) consume the snapshot instead of the live map, so the engine's
//! internal representation stays private to this workspace.

use serde::Serialize;
use serde_json::Value;

use pyglass_types::ClassRegistry;

use crate::generics::Substitutions;
use crate::render::display_type;

/// One captured binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnapshotEntry {
    pub variable: String,
    pub binding: String,
}

/// Rendered, insertion-ordered view of a [`Substitutions`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubstitutionSnapshot {
    entries: Vec<SnapshotEntry>,
}

impl SubstitutionSnapshot {
    pub fn capture(substitutions: &Substitutions, registry: &dyn ClassRegistry) -> Self {
        let entries = substitutions
            .iter()
            .map(|(var, ty)| SnapshotEntry {
                variable: if var.definition {
                    format!("type[{}]", var.name)
                } else {
                    var.name.clone()
                },
                binding: display_type(ty, registry),
            })
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[SnapshotEntry] {
        &self.entries
    }

    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}
