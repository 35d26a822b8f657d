//! pyglass_types - type universe and class registry for the pyglass engine.
//!
//! This crate hosts the data model shared by every stage of the pyglass
//! code-intelligence pipeline: the closed tagged sum of type shapes, the
//! identifier newtypes that tie types back to host-side AST nodes, and the
//! class registry contract (plus an in-memory default implementation) that
//! answers subclass and member queries during compatibility checks.

pub mod class;
pub mod names;
pub mod types;

pub use class::{
    BuiltinTypes, ClassId, ClassRegistry, RegistryError, SimpleClassRegistry,
};
pub use types::{
    CallableParam, CallableSignature, CallableType, ClassType, ClassView, CollectionType, ExprId,
    FunctionId, ParamId, StructuralType, TupleType, TypeKind, TypeVarType, UnionType,
};
