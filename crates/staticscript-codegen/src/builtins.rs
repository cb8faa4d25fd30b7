use staticscript_ir::{FunctionSignature, IrError, Linkage, Module, Parameter, Type};

/// Opaque runtime type behind every `string` value.
pub const STRING_HANDLE: &str = "ss_string";

/// `ss_string_create(ptr) -> handle`: build a string from NUL-terminated constant bytes.
pub const STRING_CREATE: &str = "ss_string_create";
/// `ss_string_concat(handle, handle) -> handle`
pub const STRING_CONCAT: &str = "ss_string_concat";
/// `ss_string_equals(handle, handle) -> i32`: negative, zero or positive, zero when equal.
pub const STRING_EQUALS: &str = "ss_string_equals";

/// The runtime entry points the generator calls instead of emitting native code.
#[derive(Debug, Clone)]
pub struct BuiltinRuntime {
    string_type: Type,
}

impl BuiltinRuntime {
    pub fn new() -> Self {
        Self {
            string_type: Type::Handle(STRING_HANDLE.to_string()),
        }
    }

    pub fn string_type(&self) -> &Type {
        &self.string_type
    }

    /// Result type of [`STRING_EQUALS`].
    pub fn ordering_type(&self) -> Type {
        Type::i32()
    }

    /// Declare every entry point in `module`. Must run before lowering.
    pub fn declare(&self, module: &mut Module) -> Result<(), IrError> {
        let string = self.string_type.clone();
        let signatures = [
            FunctionSignature::new(
                STRING_CREATE,
                vec![Parameter::new("literal", Type::Ptr)],
                string.clone(),
            ),
            FunctionSignature::new(
                STRING_CONCAT,
                vec![
                    Parameter::new("lhs", string.clone()),
                    Parameter::new("rhs", string.clone()),
                ],
                string.clone(),
            ),
            FunctionSignature::new(
                STRING_EQUALS,
                vec![
                    Parameter::new("lhs", string.clone()),
                    Parameter::new("rhs", string),
                ],
                self.ordering_type(),
            ),
        ];

        for signature in signatures {
            module.declare_function(signature, Linkage::External)?;
        }
        Ok(())
    }
}

impl Default for BuiltinRuntime {
    fn default() -> Self {
        Self::new()
    }
}
