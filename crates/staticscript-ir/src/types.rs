use serde::{Deserialize, Serialize};
use std::fmt;

/// Backend value types.
///
/// `Bool` is a 1-bit integer. `Ptr` is a raw address (stack slots, globals, constant data);
/// `Handle` is an opaque runtime-managed object whose layout the IR never inspects.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Type {
    Void,
    Bool,
    Int(u16),
    Ptr,
    Handle(String),
}

impl Type {
    pub fn i64() -> Self {
        Type::Int(64)
    }

    pub fn i32() -> Self {
        Type::Int(32)
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Type::Void)
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, Type::Bool | Type::Int(_))
    }

    /// Pointer-like types accept the null constant.
    pub fn is_pointer_like(&self) -> bool {
        matches!(self, Type::Ptr | Type::Handle(_))
    }

    pub fn bits(&self) -> u16 {
        match self {
            Type::Void => 0,
            Type::Bool => 1,
            Type::Int(bits) => *bits,
            Type::Ptr | Type::Handle(_) => 64,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Void => write!(f, "void"),
            Type::Bool => write!(f, "i1"),
            Type::Int(bits) => write!(f, "i{}", bits),
            Type::Ptr => write!(f, "ptr"),
            Type::Handle(name) => write!(f, "handle<{}>", name),
        }
    }
}
