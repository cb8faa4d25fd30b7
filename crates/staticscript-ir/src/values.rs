use crate::types::Type;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Value {
    Temp(TempId),
    Param(ParamId),
    Global(GlobalId),
    Data(DataId),
    Constant(Constant),
}

impl Value {
    pub fn bool(value: bool) -> Self {
        Value::Constant(Constant::Bool(value))
    }

    pub fn int(value: i64, bits: u16) -> Self {
        Value::Constant(Constant::Int { value, bits })
    }

    pub fn i64(value: i64) -> Self {
        Self::int(value, 64)
    }

    pub fn as_temp(&self) -> Option<TempId> {
        match self {
            Value::Temp(t) => Some(*t),
            _ => None,
        }
    }

    pub fn is_constant(&self) -> bool {
        matches!(self, Value::Constant(_))
    }

    pub fn as_constant(&self) -> Option<&Constant> {
        match self {
            Value::Constant(c) => Some(c),
            _ => None,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Temp(t) => write!(f, "{}", t),
            Value::Param(p) => write!(f, "{}", p),
            Value::Global(g) => write!(f, "{}", g),
            Value::Data(d) => write!(f, "{}", d),
            Value::Constant(c) => write!(f, "{}", c),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TempId(pub u32);

impl std::fmt::Display for TempId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "v{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParamId(pub u32);

impl std::fmt::Display for ParamId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "p{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GlobalId(pub u32);

impl std::fmt::Display for GlobalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "g{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DataId(pub u32);

impl std::fmt::Display for DataId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "d{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Constant {
    Bool(bool),
    Int { value: i64, bits: u16 },
    Null,
}

impl Constant {
    /// The zero/null value of `ty`; `None` for `void`.
    pub fn zero(ty: &Type) -> Option<Self> {
        match ty {
            Type::Bool => Some(Constant::Bool(false)),
            Type::Int(bits) => Some(Constant::Int {
                value: 0,
                bits: *bits,
            }),
            Type::Ptr | Type::Handle(_) => Some(Constant::Null),
            Type::Void => None,
        }
    }

    /// Type of the constant; `None` for `null`, which takes the pointer-like type of its context.
    pub fn ty(&self) -> Option<Type> {
        match self {
            Constant::Bool(_) => Some(Type::Bool),
            Constant::Int { bits, .. } => Some(Type::Int(*bits)),
            Constant::Null => None,
        }
    }

    pub fn is_zero(&self) -> bool {
        matches!(
            self,
            Constant::Bool(false) | Constant::Int { value: 0, .. } | Constant::Null
        )
    }

    pub fn fits(&self, ty: &Type) -> bool {
        match self.ty() {
            Some(own) => &own == ty,
            None => ty.is_pointer_like(),
        }
    }
}

impl std::fmt::Display for Constant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Constant::Bool(b) => write!(f, "{}", b),
            Constant::Int { value, .. } => write!(f, "{}", value),
            Constant::Null => write!(f, "null"),
        }
    }
}
