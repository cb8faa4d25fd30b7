use staticscript_ir::{
    Function, FunctionSignature, Instruction, Linkage, Module, Terminator, Value,
};

/// Renders single IR entities; globals print by name, everything else by its id.
pub struct IrFormatter<'m> {
    module: &'m Module,
    include_types: bool,
}

impl<'m> IrFormatter<'m> {
    pub fn new(module: &'m Module, include_types: bool) -> Self {
        Self {
            module,
            include_types,
        }
    }

    pub fn format_value(&self, value: &Value) -> String {
        match value {
            Value::Global(id) => match self.module.get_global(*id) {
                Some(global) => format!("@{}", global.name),
                None => format!("@{}", id),
            },
            other => other.to_string(),
        }
    }

    fn format_args(&self, values: &[Value]) -> String {
        values
            .iter()
            .map(|v| self.format_value(v))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn result(&self, result: &Value, function: &Function) -> String {
        match function.value_type(result) {
            Some(ty) if self.include_types => format!("{}: {} = ", result, ty),
            _ => format!("{} = ", result),
        }
    }

    pub fn format_instruction(&self, inst: &Instruction, function: &Function) -> String {
        match inst {
            Instruction::Alloca { result, ty, align } => {
                format!("{}alloca {}, align {}", self.result(result, function), ty, align)
            }
            Instruction::Load {
                result,
                ty,
                address,
            } => format!(
                "{}load {} {}",
                self.result(result, function),
                ty,
                self.format_value(address)
            ),
            Instruction::Store { address, value } => format!(
                "store {}, {}",
                self.format_value(value),
                self.format_value(address)
            ),
            Instruction::CheckedAdd {
                result,
                left,
                right,
                ty,
            } => self.binary("iadd.nsw", result, left, right, ty, function),
            Instruction::CheckedSub {
                result,
                left,
                right,
                ty,
            } => self.binary("isub.nsw", result, left, right, ty, function),
            Instruction::CheckedMul {
                result,
                left,
                right,
                ty,
            } => self.binary("imul.nsw", result, left, right, ty, function),
            Instruction::Div {
                result,
                left,
                right,
                ty,
            } => self.binary("sdiv", result, left, right, ty, function),
            Instruction::CheckedNeg {
                result,
                operand,
                ty,
            } => format!(
                "{}ineg.nsw {} {}",
                self.result(result, function),
                ty,
                self.format_value(operand)
            ),
            Instruction::Icmp {
                result,
                cond,
                left,
                right,
            } => format!(
                "{}icmp {} {}, {}",
                self.result(result, function),
                cond.mnemonic(),
                self.format_value(left),
                self.format_value(right)
            ),
            Instruction::Call {
                result,
                callee,
                args,
            } => {
                let prefix = result
                    .as_ref()
                    .map(|r| self.result(r, function))
                    .unwrap_or_default();
                format!("{}call @{}({})", prefix, callee, self.format_args(args))
            }
        }
    }

    fn binary(
        &self,
        mnemonic: &str,
        result: &Value,
        left: &Value,
        right: &Value,
        ty: &staticscript_ir::Type,
        function: &Function,
    ) -> String {
        format!(
            "{}{} {} {}, {}",
            self.result(result, function),
            mnemonic,
            ty,
            self.format_value(left),
            self.format_value(right)
        )
    }

    pub fn format_terminator(&self, terminator: &Terminator) -> String {
        match terminator {
            Terminator::Jump(target) => format!("jump {}", target),
            Terminator::Branch {
                condition,
                then_block,
                else_block,
            } => format!(
                "brif {}, {}, {}",
                self.format_value(condition),
                then_block,
                else_block
            ),
            Terminator::Return(None) => "return".to_string(),
            Terminator::Return(Some(value)) => format!("return {}", self.format_value(value)),
            Terminator::Invalid => "<unterminated>".to_string(),
        }
    }

    /// `@name(p0: i64, p1: i1) -> i64`, or with bare parameter types for declarations.
    pub fn format_signature(signature: &FunctionSignature, named_params: bool) -> String {
        let params = signature
            .params
            .iter()
            .enumerate()
            .map(|(i, p)| {
                if named_params {
                    format!("p{}: {}", i, p.param_type)
                } else {
                    p.param_type.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(", ");
        format!("@{}({}) -> {}", signature.name, params, signature.returns)
    }

    pub fn linkage_prefix(linkage: Linkage) -> &'static str {
        match linkage {
            Linkage::External => "",
            Linkage::Internal => "internal ",
        }
    }
}

/// Quote constant bytes; anything outside printable ASCII prints as `\XX`.
pub fn format_bytes(bytes: &[u8]) -> String {
    let mut out = String::from("\"");
    for &b in bytes {
        match b {
            b'"' | b'\\' => out.push_str(&format!("\\{:02X}", b)),
            0x20..=0x7e => out.push(b as char),
            _ => out.push_str(&format!("\\{:02X}", b)),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use staticscript_ir::{Parameter, Type};

    #[test]
    fn test_format_bytes_escapes_nul() {
        assert_eq!(format_bytes(b"hi\0"), "\"hi\\00\"");
        assert_eq!(format_bytes(b"a\"b"), "\"a\\22b\"");
    }

    #[test]
    fn test_format_signature() {
        let sig = FunctionSignature::new(
            "add",
            vec![Parameter::new("a", Type::i64()), Parameter::new("b", Type::Bool)],
            Type::i64(),
        );
        assert_eq!(
            IrFormatter::format_signature(&sig, true),
            "@add(p0: i64, p1: i1) -> i64"
        );
        assert_eq!(IrFormatter::format_signature(&sig, false), "@add(i64, i1) -> i64");
    }

    #[test]
    fn test_format_terminator() {
        let module = Module::new("t");
        let fmt = IrFormatter::new(&module, false);
        assert_eq!(fmt.format_terminator(&Terminator::Return(None)), "return");
        assert_eq!(
            fmt.format_terminator(&Terminator::Return(Some(Value::i64(0)))),
            "return 0"
        );
    }
}
