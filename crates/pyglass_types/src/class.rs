//! Class registry contract and the bundled in-memory implementation.
//!
//! The compatibility engine never inspects class bodies itself; every
//! subclass, ABC-registration, and member question goes through
//! [`ClassRegistry`]. Hosts with a real symbol table implement the trait
//! directly. [`SimpleClassRegistry`] is the default table-backed
//! implementation: it seeds the canonical builtin classes and optionally
//! applies a TOML stub overlay named by `PYGLASS_STUB_OVERLAY_PATH`, so a
//! development environment can add classes without recompiling.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::env;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::names;
use crate::types::TypeKind;

const OVERLAY_ENV: &str = "PYGLASS_STUB_OVERLAY_PATH";

/// Identifier of a class descriptor. An identifier with no backing record is
/// treated as an unresolved descriptor by every query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ClassId(u32);

impl ClassId {
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub fn to_raw(self) -> u32 {
        self.0
    }
}

/// Subclass, ABC-subclass, and member queries the matcher depends on.
pub trait ClassRegistry {
    /// Name of the class; `None` when the descriptor is unresolved.
    fn class_name(&self, class: ClassId) -> Option<&str>;

    /// Nominal subclass test, reflexive and transitive over bases.
    fn is_subclass_of(&self, class: ClassId, ancestor: ClassId) -> bool;

    /// Whether `class` was registered as a virtual subclass of `abc`.
    fn is_abc_subclass_of(&self, class: ClassId, abc: ClassId) -> bool;

    /// Whether some ancestor of the class failed to resolve.
    fn has_unresolved_ancestors(&self, class: ClassId) -> bool;

    /// Member names declared on the class, optionally including inherited
    /// ones.
    fn member_names(&self, class: ClassId, inherited: bool) -> BTreeSet<String>;

    /// Whether the named member resolves to the builtin definition rather
    /// than a user override.
    fn is_builtin_member(&self, class: ClassId, member: &str) -> bool;

    /// Canonical builtin class lookup by name.
    fn builtin_class(&self, name: &str) -> Option<ClassId>;
}

/// Convenience view over a registry's canonical builtin types.
pub struct BuiltinTypes<'a> {
    registry: &'a dyn ClassRegistry,
}

impl<'a> BuiltinTypes<'a> {
    pub fn new(registry: &'a dyn ClassRegistry) -> Self {
        Self { registry }
    }

    /// The universal top: the instance type of `object`.
    pub fn object_type(&self) -> Option<TypeKind> {
        self.registry
            .builtin_class(names::OBJECT)
            .map(TypeKind::class_instance)
    }

    /// The universal metaclass: the instance type of `type`.
    pub fn type_type(&self) -> Option<TypeKind> {
        self.registry
            .builtin_class(names::TYPE)
            .map(TypeKind::class_instance)
    }

    /// The widened string type: `str | unicode` instances.
    pub fn str_or_unicode_type(&self) -> TypeKind {
        let members = [names::STR, names::UNICODE]
            .into_iter()
            .filter_map(|name| self.registry.builtin_class(name))
            .map(TypeKind::class_instance)
            .collect();
        TypeKind::union(members)
    }

    pub fn class_named(&self, name: &str) -> Option<ClassId> {
        self.registry.builtin_class(name)
    }
}

/// Failures encountered while applying a stub overlay.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("stub overlay not found: {path}")]
    MissingOverlay { path: String },
    #[error("failed to read stub overlay {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse stub overlay {path}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("unknown base class `{base}` for overlay class `{class}`")]
    UnknownBase { class: String, base: String },
    #[error("unknown class `{target}` in ABC registration for `{abc}`")]
    UnknownAbcTarget { abc: String, target: String },
}

#[derive(Debug, Clone, Default)]
struct ClassRecord {
    name: String,
    bases: Vec<ClassId>,
    members: BTreeSet<String>,
    builtin_members: BTreeSet<String>,
    unresolved_ancestors: bool,
}

/// Table-backed registry implementation.
#[derive(Debug, Default)]
pub struct SimpleClassRegistry {
    records: Vec<ClassRecord>,
    by_name: HashMap<String, ClassId>,
    builtins: HashMap<String, ClassId>,
    abc_links: BTreeSet<(ClassId, ClassId)>,
    load_errors: Vec<RegistryError>,
}

impl SimpleClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry seeded with the canonical builtin classes: `object`, `type`,
    /// the string family, the numeric tower, the container classes,
    /// `Callable`, `NoneType`, and the `numbers.*` ABC surfaces.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        let object = registry.define(names::OBJECT);
        registry.register_builtin(names::OBJECT, object);

        let builtin = |registry: &mut Self, name: &str, bases: &[ClassId]| {
            let class = registry.define_with_bases(name, bases);
            registry.register_builtin(name, class);
            class
        };

        builtin(&mut registry, names::TYPE, &[object]);

        let basestring = builtin(&mut registry, names::BASESTRING, &[object]);
        builtin(&mut registry, names::STR, &[basestring]);
        builtin(&mut registry, names::UNICODE, &[basestring]);

        let int = builtin(&mut registry, names::INT, &[object]);
        builtin(&mut registry, names::BOOL, &[int]);
        builtin(&mut registry, names::LONG, &[object]);
        builtin(&mut registry, names::FLOAT, &[object]);
        builtin(&mut registry, names::COMPLEX, &[object]);

        builtin(&mut registry, names::TUPLE, &[object]);
        builtin(&mut registry, names::LIST, &[object]);
        builtin(&mut registry, names::SET, &[object]);
        builtin(&mut registry, names::DICT, &[object]);

        builtin(&mut registry, names::CALLABLE, &[object]);
        builtin(&mut registry, names::NONE_TYPE, &[object]);

        builtin(&mut registry, names::ABC_NUMBER, &[object]);
        builtin(&mut registry, names::ABC_COMPLEX, &[object]);
        builtin(&mut registry, names::ABC_REAL, &[object]);
        builtin(&mut registry, names::ABC_INTEGRAL, &[object]);

        registry
    }

    /// Builds the builtin registry and applies the overlay named by
    /// `PYGLASS_STUB_OVERLAY_PATH`, when set. Overlay failures are recorded,
    /// never raised.
    pub fn load_from_env() -> Self {
        let mut registry = Self::with_builtins();
        if let Some(path) = env::var_os(OVERLAY_ENV) {
            registry.try_apply_overlay(Path::new(&path));
        }
        registry
    }

    /// Builds the builtin registry and applies an explicit overlay path.
    pub fn with_overlay(path: &Path) -> Self {
        let mut registry = Self::with_builtins();
        registry.try_apply_overlay(path);
        registry
    }

    /// Overlay failures recorded during loading.
    pub fn load_errors(&self) -> &[RegistryError] {
        &self.load_errors
    }

    pub fn define(&mut self, name: &str) -> ClassId {
        self.define_with_bases(name, &[])
    }

    pub fn define_with_bases(&mut self, name: &str, bases: &[ClassId]) -> ClassId {
        let id = ClassId::new(self.records.len() as u32);
        self.records.push(ClassRecord {
            name: name.to_string(),
            bases: bases.to_vec(),
            ..ClassRecord::default()
        });
        self.by_name.insert(name.to_string(), id);
        id
    }

    pub fn add_member(&mut self, class: ClassId, member: &str) {
        if let Some(record) = self.record_mut(class) {
            record.members.insert(member.to_string());
        }
    }

    /// Marks a member as resolving to its builtin definition.
    pub fn mark_builtin_member(&mut self, class: ClassId, member: &str) {
        if let Some(record) = self.record_mut(class) {
            record.members.insert(member.to_string());
            record.builtin_members.insert(member.to_string());
        }
    }

    pub fn mark_unresolved_ancestors(&mut self, class: ClassId) {
        if let Some(record) = self.record_mut(class) {
            record.unresolved_ancestors = true;
        }
    }

    /// Registers `subclass` as a virtual subclass of `abc`.
    pub fn register_abc(&mut self, abc: ClassId, subclass: ClassId) {
        self.abc_links.insert((abc, subclass));
    }

    pub fn register_builtin(&mut self, name: &str, class: ClassId) {
        self.builtins.insert(name.to_string(), class);
    }

    pub fn class_by_name(&self, name: &str) -> Option<ClassId> {
        self.by_name.get(name).copied()
    }

    fn record(&self, class: ClassId) -> Option<&ClassRecord> {
        self.records.get(class.to_raw() as usize)
    }

    fn record_mut(&mut self, class: ClassId) -> Option<&mut ClassRecord> {
        self.records.get_mut(class.to_raw() as usize)
    }

    fn try_apply_overlay(&mut self, path: &Path) {
        match self.read_overlay(path) {
            Ok(overlay) => self.apply_overlay(overlay),
            Err(error) => self.load_errors.push(error),
        }
    }

    fn read_overlay(&self, path: &Path) -> Result<OverlayFile, RegistryError> {
        let display = path.display().to_string();
        if !path.exists() {
            return Err(RegistryError::MissingOverlay { path: display });
        }
        let contents = fs::read_to_string(path).map_err(|source| RegistryError::Io {
            path: display.clone(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| RegistryError::Parse {
            path: display,
            source,
        })
    }

    fn apply_overlay(&mut self, overlay: OverlayFile) {
        for declared in overlay.classes {
            let mut bases = Vec::with_capacity(declared.bases.len());
            let mut failed = false;
            for base in &declared.bases {
                match self.class_by_name(base) {
                    Some(id) => bases.push(id),
                    None => {
                        self.load_errors.push(RegistryError::UnknownBase {
                            class: declared.name.clone(),
                            base: base.clone(),
                        });
                        failed = true;
                    }
                }
            }
            if failed {
                continue;
            }
            let class = self.define_with_bases(&declared.name, &bases);
            for member in declared.members {
                self.add_member(class, &member);
            }
            if declared.unresolved_ancestors {
                self.mark_unresolved_ancestors(class);
            }
        }

        for (abc_name, targets) in overlay.abc_registrations {
            let Some(abc) = self.class_by_name(&abc_name) else {
                self.load_errors.push(RegistryError::UnknownAbcTarget {
                    abc: abc_name.clone(),
                    target: abc_name.clone(),
                });
                continue;
            };
            for target in targets {
                match self.class_by_name(&target) {
                    Some(subclass) => self.register_abc(abc, subclass),
                    None => self.load_errors.push(RegistryError::UnknownAbcTarget {
                        abc: abc_name.clone(),
                        target,
                    }),
                }
            }
        }
    }
}

impl ClassRegistry for SimpleClassRegistry {
    fn class_name(&self, class: ClassId) -> Option<&str> {
        self.record(class).map(|record| record.name.as_str())
    }

    fn is_subclass_of(&self, class: ClassId, ancestor: ClassId) -> bool {
        if class == ancestor {
            return true;
        }
        let mut visited = HashSet::new();
        let mut stack = vec![class];
        while let Some(current) = stack.pop() {
            if !visited.insert(current) {
                continue;
            }
            if current == ancestor {
                return true;
            }
            if let Some(record) = self.record(current) {
                stack.extend(record.bases.iter().copied());
            }
        }
        false
    }

    fn is_abc_subclass_of(&self, class: ClassId, abc: ClassId) -> bool {
        self.abc_links.contains(&(abc, class))
    }

    fn has_unresolved_ancestors(&self, class: ClassId) -> bool {
        let mut visited = HashSet::new();
        let mut stack = vec![class];
        while let Some(current) = stack.pop() {
            if !visited.insert(current) {
                continue;
            }
            match self.record(current) {
                Some(record) => {
                    if record.unresolved_ancestors {
                        return true;
                    }
                    stack.extend(record.bases.iter().copied());
                }
                None => return true,
            }
        }
        false
    }

    fn member_names(&self, class: ClassId, inherited: bool) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        if !inherited {
            if let Some(record) = self.record(class) {
                names.extend(record.members.iter().cloned());
            }
            return names;
        }
        let mut visited = HashSet::new();
        let mut stack = vec![class];
        while let Some(current) = stack.pop() {
            if !visited.insert(current) {
                continue;
            }
            if let Some(record) = self.record(current) {
                names.extend(record.members.iter().cloned());
                stack.extend(record.bases.iter().copied());
            }
        }
        names
    }

    fn is_builtin_member(&self, class: ClassId, member: &str) -> bool {
        let mut visited = HashSet::new();
        let mut stack = vec![class];
        while let Some(current) = stack.pop() {
            if !visited.insert(current) {
                continue;
            }
            if let Some(record) = self.record(current) {
                if record.members.contains(member) {
                    return record.builtin_members.contains(member);
                }
                stack.extend(record.bases.iter().copied());
            }
        }
        false
    }

    fn builtin_class(&self, name: &str) -> Option<ClassId> {
        self.builtins.get(name).copied()
    }
}

#[derive(Debug, Clone, Deserialize)]
struct OverlayFile {
    #[serde(default)]
    classes: Vec<OverlayClass>,
    #[serde(default)]
    abc_registrations: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
struct OverlayClass {
    name: String,
    #[serde(default)]
    bases: Vec<String>,
    #[serde(default)]
    members: Vec<String>,
    #[serde(default)]
    unresolved_ancestors: bool,
}
