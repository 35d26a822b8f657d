//! The type universe of the pyglass compatibility engine.
//!
//! Types are immutable values forming a closed tagged sum. The matcher never
//! builds new types; only the substitution engine constructs fresh shapes.
//! `Unknown` stands for "no type information" and is absorbed optimistically
//! by every check, which is what makes the system gradual.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::class::ClassId;

/// Identifier of an expression node owned by the host AST.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ExprId(u32);

impl ExprId {
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub fn to_raw(self) -> u32 {
        self.0
    }
}

/// Identifier of a function or lambda whose signature the evaluation context
/// can produce on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FunctionId(u32);

impl FunctionId {
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub fn to_raw(self) -> u32 {
        self.0
    }
}

/// Identifier of a declared parameter node in the host AST. Substitution
/// preserves this backing so hosts can navigate from rewritten signatures to
/// source declarations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ParamId(u32);

impl ParamId {
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub fn to_raw(self) -> u32 {
        self.0
    }
}

/// Core variant selector for the type universe.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeKind {
    /// Absent type information. Matches anything; anything matches it.
    Unknown,
    /// A class, either as an instance type (`C`) or the class itself
    /// (`Type[C]`, definition flag set).
    Class(ClassType),
    /// A named generic variable, optionally bounded.
    TypeVar(TypeVarType),
    /// An ordered set of alternatives.
    Union(UnionType),
    /// The tuple specialization of a class type.
    Tuple(TupleType),
    /// A generic collection class carrying its element parameters.
    Collection(CollectionType),
    /// An explicit callable signature.
    Callable(CallableType),
    /// A set of required attribute names.
    Structural(StructuralType),
    /// A closure whose signature is deferred to the evaluation context.
    Function(FunctionId),
}

impl Default for TypeKind {
    fn default() -> Self {
        TypeKind::Unknown
    }
}

/// Borrowed class view of a class-backed type shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassView {
    pub class: ClassId,
    pub definition: bool,
}

impl TypeKind {
    /// Instance type of a class.
    pub fn class_instance(class: ClassId) -> Self {
        TypeKind::Class(ClassType {
            class,
            definition: false,
        })
    }

    /// The class itself, `Type[C]`.
    pub fn class_definition(class: ClassId) -> Self {
        TypeKind::Class(ClassType {
            class,
            definition: true,
        })
    }

    /// Builds a union from the given members.
    ///
    /// Nested unions are flattened, structural duplicates dropped, a single
    /// survivor is returned unwrapped, and an empty member list collapses to
    /// `Unknown`.
    pub fn union(members: Vec<TypeKind>) -> Self {
        Self::build_union(members, false)
    }

    /// Builds a weak union: one synthesized to admit absence and strippable
    /// via the non-weak conversion.
    pub fn weak_union(members: Vec<TypeKind>) -> Self {
        Self::build_union(members, true)
    }

    fn build_union(members: Vec<TypeKind>, weak: bool) -> Self {
        let mut flat: Vec<TypeKind> = Vec::with_capacity(members.len());
        for member in members {
            match member {
                TypeKind::Union(inner) => {
                    for m in inner.members {
                        if !flat.contains(&m) {
                            flat.push(m);
                        }
                    }
                }
                other => {
                    if !flat.contains(&other) {
                        flat.push(other);
                    }
                }
            }
        }
        match flat.len() {
            0 => TypeKind::Unknown,
            1 => flat.into_iter().next().unwrap_or_default(),
            _ => TypeKind::Union(UnionType {
                members: flat,
                weak,
            }),
        }
    }

    /// Class view of class-backed shapes (plain classes, tuples, collections).
    pub fn as_class(&self) -> Option<ClassView> {
        match self {
            TypeKind::Class(class) => Some(ClassView {
                class: class.class,
                definition: class.definition,
            }),
            TypeKind::Tuple(tuple) => Some(ClassView {
                class: tuple.class,
                definition: tuple.definition,
            }),
            TypeKind::Collection(collection) => Some(ClassView {
                class: collection.class,
                definition: collection.definition,
            }),
            _ => None,
        }
    }

    /// Definition flag of instantiable shapes: class-backed types and type
    /// variables. `None` for everything else.
    pub fn definition_flag(&self) -> Option<bool> {
        match self {
            TypeKind::Class(class) => Some(class.definition),
            TypeKind::Tuple(tuple) => Some(tuple.definition),
            TypeKind::Collection(collection) => Some(collection.definition),
            TypeKind::TypeVar(var) => Some(var.definition),
            _ => None,
        }
    }

    /// Class-form conversion of an instantiable shape; other shapes are
    /// returned unchanged.
    pub fn to_class_form(&self) -> TypeKind {
        self.with_definition(true)
    }

    /// Instance-form conversion of an instantiable shape; other shapes are
    /// returned unchanged.
    pub fn to_instance_form(&self) -> TypeKind {
        self.with_definition(false)
    }

    fn with_definition(&self, definition: bool) -> TypeKind {
        match self {
            TypeKind::Class(class) => TypeKind::Class(ClassType {
                definition,
                ..class.clone()
            }),
            TypeKind::Tuple(tuple) => TypeKind::Tuple(TupleType {
                definition,
                ..tuple.clone()
            }),
            TypeKind::Collection(collection) => TypeKind::Collection(CollectionType {
                definition,
                ..collection.clone()
            }),
            TypeKind::TypeVar(var) => TypeKind::TypeVar(TypeVarType {
                definition,
                ..var.clone()
            }),
            other => other.clone(),
        }
    }
}

/// A class reference plus the class-vs-instance distinction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClassType {
    pub class: ClassId,
    pub definition: bool,
}

/// A named generic variable with an optional upper bound.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeVarType {
    pub name: String,
    pub bound: Option<Box<TypeKind>>,
    pub definition: bool,
}

impl TypeVarType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bound: None,
            definition: false,
        }
    }

    pub fn bounded(name: impl Into<String>, bound: TypeKind) -> Self {
        Self {
            name: name.into(),
            bound: Some(Box::new(bound)),
            definition: false,
        }
    }

    pub fn to_class_form(&self) -> Self {
        Self {
            definition: true,
            ..self.clone()
        }
    }

    pub fn to_instance_form(&self) -> Self {
        Self {
            definition: false,
            ..self.clone()
        }
    }

    /// An instance-form variable without a bound stands for "any form": it
    /// accepts both classes and instances.
    pub fn accepts_both_forms(&self) -> bool {
        !self.definition && self.bound.is_none()
    }
}

/// An ordered set of alternative types.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnionType {
    members: Vec<TypeKind>,
    weak: bool,
}

impl UnionType {
    pub fn members(&self) -> &[TypeKind] {
        &self.members
    }

    pub fn is_weak(&self) -> bool {
        self.weak
    }

    /// Rebuilds the union keeping only members accepted by the predicate.
    pub fn retain(&self, keep: impl Fn(&TypeKind) -> bool) -> TypeKind {
        TypeKind::union(self.members.iter().filter(|m| keep(m)).cloned().collect())
    }
}

/// Element layout of a tuple type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TupleElements {
    /// Fixed arity, possibly empty.
    Fixed(Vec<TypeKind>),
    /// Unbounded arity with a single iterated element type.
    Homogeneous(Box<TypeKind>),
}

/// The tuple specialization of a class type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TupleType {
    pub class: ClassId,
    pub definition: bool,
    elements: TupleElements,
}

impl TupleType {
    pub fn fixed(class: ClassId, elements: Vec<TypeKind>) -> Self {
        Self {
            class,
            definition: false,
            elements: TupleElements::Fixed(elements),
        }
    }

    pub fn homogeneous(class: ClassId, element: TypeKind) -> Self {
        Self {
            class,
            definition: false,
            elements: TupleElements::Homogeneous(Box::new(element)),
        }
    }

    pub fn is_homogeneous(&self) -> bool {
        matches!(self.elements, TupleElements::Homogeneous(_))
    }

    /// Arity of a fixed tuple; `None` for homogeneous tuples.
    pub fn fixed_len(&self) -> Option<usize> {
        match &self.elements {
            TupleElements::Fixed(elements) => Some(elements.len()),
            TupleElements::Homogeneous(_) => None,
        }
    }

    /// Element at a position. A homogeneous tuple answers with its iterated
    /// element for every position.
    pub fn element(&self, index: usize) -> Option<&TypeKind> {
        match &self.elements {
            TupleElements::Fixed(elements) => elements.get(index),
            TupleElements::Homogeneous(element) => Some(element),
        }
    }

    /// Fixed elements slice; empty for homogeneous tuples.
    pub fn fixed_elements(&self) -> &[TypeKind] {
        match &self.elements {
            TupleElements::Fixed(elements) => elements,
            TupleElements::Homogeneous(_) => &[],
        }
    }

    /// The type produced by iterating the tuple: the element type itself for
    /// homogeneous tuples, the union of element types for fixed ones.
    pub fn iterated_item(&self) -> TypeKind {
        match &self.elements {
            TupleElements::Fixed(elements) => TypeKind::union(elements.clone()),
            TupleElements::Homogeneous(element) => (**element).clone(),
        }
    }
}

/// A generic collection class with its declared element parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CollectionType {
    pub class: ClassId,
    pub definition: bool,
    elements: Vec<TypeKind>,
}

impl CollectionType {
    pub fn new(class: ClassId, elements: Vec<TypeKind>) -> Self {
        Self {
            class,
            definition: false,
            elements,
        }
    }

    pub fn element_types(&self) -> &[TypeKind] {
        &self.elements
    }

    /// The type produced by iterating the collection: its first parameter.
    pub fn iterated_item(&self) -> TypeKind {
        self.elements.first().cloned().unwrap_or_default()
    }
}

/// A single callable parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallableParam {
    pub name: Option<String>,
    /// Declared type; `Unknown` when the parameter carries no annotation.
    pub ty: TypeKind,
    /// `*args` container flag.
    pub positional_container: bool,
    /// `**kwargs` container flag.
    pub keyword_container: bool,
    /// Backing declaration in the host AST, when one exists.
    pub source: Option<ParamId>,
}

impl CallableParam {
    pub fn new(name: impl Into<String>, ty: TypeKind) -> Self {
        Self {
            name: Some(name.into()),
            ty,
            positional_container: false,
            keyword_container: false,
            source: None,
        }
    }

    pub fn anonymous(ty: TypeKind) -> Self {
        Self {
            name: None,
            ty,
            positional_container: false,
            keyword_container: false,
            source: None,
        }
    }

    /// A `*args` parameter; `ty` is the declared element type.
    pub fn positional_container(name: impl Into<String>, ty: TypeKind) -> Self {
        Self {
            positional_container: true,
            ..Self::new(name, ty)
        }
    }

    /// A `**kwargs` parameter; `ty` is the declared value type.
    pub fn keyword_container(name: impl Into<String>, ty: TypeKind) -> Self {
        Self {
            keyword_container: true,
            ..Self::new(name, ty)
        }
    }

    pub fn with_source(mut self, source: ParamId) -> Self {
        self.source = Some(source);
        self
    }
}

/// Parameter list and return type of a callable, as the evaluation context
/// reports them for deferred function types.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallableSignature {
    /// `None` means "any signature".
    pub params: Option<Vec<CallableParam>>,
    pub ret: TypeKind,
}

impl CallableSignature {
    pub fn new(params: Option<Vec<CallableParam>>, ret: TypeKind) -> Self {
        Self { params, ret }
    }
}

/// An explicit callable signature.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallableType {
    /// `None` means "any signature".
    pub params: Option<Vec<CallableParam>>,
    pub ret: Box<TypeKind>,
    /// Cleared for wrappers that carry a signature but cannot be invoked.
    pub callable: bool,
}

impl CallableType {
    pub fn new(params: Option<Vec<CallableParam>>, ret: TypeKind) -> Self {
        Self {
            params,
            ret: Box::new(ret),
            callable: true,
        }
    }

    pub fn not_callable(mut self) -> Self {
        self.callable = false;
        self
    }

    pub fn signature(&self) -> CallableSignature {
        CallableSignature {
            params: self.params.clone(),
            ret: (*self.ret).clone(),
        }
    }
}

/// A set of attribute names a value must expose.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StructuralType {
    pub name: Option<String>,
    attributes: BTreeSet<String>,
    pub inferred_from_usages: bool,
}

impl StructuralType {
    /// A structural type coming from an explicit declaration.
    pub fn declared(name: impl Into<String>, attributes: impl IntoIterator<Item = String>) -> Self {
        Self {
            name: Some(name.into()),
            attributes: attributes.into_iter().collect(),
            inferred_from_usages: false,
        }
    }

    /// A structural type synthesized from observed usage sites.
    pub fn inferred(attributes: impl IntoIterator<Item = String>) -> Self {
        Self {
            name: None,
            attributes: attributes.into_iter().collect(),
            inferred_from_usages: true,
        }
    }

    pub fn attribute_names(&self) -> &BTreeSet<String> {
        &self.attributes
    }
}
