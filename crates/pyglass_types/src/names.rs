//! Canonical names of builtin classes consulted by the compatibility engine.

pub const OBJECT: &str = "object";
pub const TYPE: &str = "type";

pub const BASESTRING: &str = "basestring";
pub const STR: &str = "str";
pub const UNICODE: &str = "unicode";

pub const CALLABLE: &str = "Callable";
pub const NONE_TYPE: &str = "NoneType";

pub const GETATTR: &str = "__getattr__";
pub const GETATTRIBUTE: &str = "__getattribute__";

pub const BOOL: &str = "bool";
pub const INT: &str = "int";
pub const LONG: &str = "long";
pub const FLOAT: &str = "float";
pub const COMPLEX: &str = "complex";

pub const ABC_INTEGRAL: &str = "numbers.Integral";
pub const ABC_REAL: &str = "numbers.Real";
pub const ABC_COMPLEX: &str = "numbers.Complex";
pub const ABC_NUMBER: &str = "numbers.Number";

pub const TUPLE: &str = "tuple";
pub const LIST: &str = "list";
pub const SET: &str = "set";
pub const DICT: &str = "dict";
