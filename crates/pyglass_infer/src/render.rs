//! Deterministic textual rendering of types for logs, snapshots, and the
//! matcher's name fallback.

use pyglass_types::{ClassRegistry, TypeKind};

/// Canonical one-line rendering of a type.
pub fn display_type(ty: &TypeKind, registry: &dyn ClassRegistry) -> String {
    match ty {
        TypeKind::Unknown => "_".to_string(),
        TypeKind::Class(class) => {
            let name = class_label(registry, class.class);
            if class.definition {
                format!("type[{name}]")
            } else {
                name
            }
        }
        TypeKind::TypeVar(var) => {
            if var.definition {
                format!("type[{}]", var.name)
            } else {
                var.name.clone()
            }
        }
        TypeKind::Union(union) => union
            .members()
            .iter()
            .map(|member| display_type(member, registry))
            .collect::<Vec<_>>()
            .join(" | "),
        TypeKind::Tuple(tuple) => {
            let body = if tuple.is_homogeneous() {
                let element = tuple.element(0).cloned().unwrap_or_default();
                format!("({}, ...)", display_type(&element, registry))
            } else {
                let elements = tuple
                    .fixed_elements()
                    .iter()
                    .map(|element| display_type(element, registry))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("({elements})")
            };
            if tuple.definition {
                format!("type[{body}]")
            } else {
                body
            }
        }
        TypeKind::Collection(collection) => {
            let name = class_label(registry, collection.class);
            let parameters = collection
                .element_types()
                .iter()
                .map(|element| display_type(element, registry))
                .collect::<Vec<_>>()
                .join(", ");
            let body = format!("{name}[{parameters}]");
            if collection.definition {
                format!("type[{body}]")
            } else {
                body
            }
        }
        TypeKind::Callable(callable) => {
            let parameters = match &callable.params {
                Some(params) => params
                    .iter()
                    .map(|param| display_type(&param.ty, registry))
                    .collect::<Vec<_>>()
                    .join(", "),
                None => "...".to_string(),
            };
            format!("({parameters}) -> {}", display_type(&callable.ret, registry))
        }
        TypeKind::Structural(structural) => {
            let attributes = structural
                .attribute_names()
                .iter()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(", ");
            format!("{{{attributes}}}")
        }
        TypeKind::Function(function) => format!("fn#{}", function.to_raw()),
    }
}

fn class_label(registry: &dyn ClassRegistry, class: pyglass_types::ClassId) -> String {
    registry
        .class_name(class)
        .map(str::to_string)
        .unwrap_or_else(|| "?".to_string())
}
