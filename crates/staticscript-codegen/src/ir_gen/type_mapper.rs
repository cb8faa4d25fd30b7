use crate::ast::BuiltinType;
use crate::builtins::BuiltinRuntime;
use staticscript_ir::Type;

pub struct TypeMapper;

impl TypeMapper {
    pub fn map(ty: BuiltinType, runtime: &BuiltinRuntime) -> Type {
        match ty {
            BuiltinType::Void => Type::Void,
            BuiltinType::Boolean => Type::Bool,
            BuiltinType::Integer => Type::i64(),
            BuiltinType::String => runtime.string_type().clone(),
        }
    }

    /// An absent return type lowers to `void`.
    pub fn map_return(ty: Option<BuiltinType>, runtime: &BuiltinRuntime) -> Type {
        Self::map(ty.unwrap_or(BuiltinType::Void), runtime)
    }

    /// Storage alignment in bytes: 1 for booleans, 8 for everything else.
    pub fn alignment(ty: BuiltinType) -> u32 {
        match ty {
            BuiltinType::Boolean => 1,
            _ => 8,
        }
    }
}
