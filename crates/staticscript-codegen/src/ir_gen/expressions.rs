use super::context::Session;
use super::errors::{CodegenError, Result};
use crate::ast::{BinaryOp, BuiltinType, ExprId, ExprKind, UnaryOp};
use crate::builtins::{STRING_CONCAT, STRING_CREATE, STRING_EQUALS};
use staticscript_ir::{IntCC, Type, Value};

/// How a binary operator lowers once its operand type is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BinaryLowering {
    Add,
    Sub,
    Mul,
    Div,
    Compare(IntCC),
    StringConcat,
    StringCompare(IntCC),
}

fn classify(op: BinaryOp, lhs: BuiltinType) -> Result<BinaryLowering> {
    use BuiltinType::*;

    let lowering = match (op, lhs) {
        (BinaryOp::Plus, Integer) => BinaryLowering::Add,
        (BinaryOp::Plus, String) => BinaryLowering::StringConcat,
        (BinaryOp::Minus, Integer) => BinaryLowering::Sub,
        (BinaryOp::Multiply, Integer) => BinaryLowering::Mul,
        (BinaryOp::Divide, Integer) => BinaryLowering::Div,
        (BinaryOp::LessThan, Integer) => BinaryLowering::Compare(IntCC::SignedLessThan),
        (BinaryOp::GreaterThan, Integer) => BinaryLowering::Compare(IntCC::SignedGreaterThan),
        (BinaryOp::LessThanEquals, Integer) => {
            BinaryLowering::Compare(IntCC::SignedLessThanOrEqual)
        }
        (BinaryOp::GreaterThanEquals, Integer) => {
            BinaryLowering::Compare(IntCC::SignedGreaterThanOrEqual)
        }
        (BinaryOp::Equals, Integer | Boolean) => BinaryLowering::Compare(IntCC::Equal),
        (BinaryOp::NotEquals, Integer | Boolean) => BinaryLowering::Compare(IntCC::NotEqual),
        (BinaryOp::Equals, String) => BinaryLowering::StringCompare(IntCC::Equal),
        (BinaryOp::NotEquals, String) => BinaryLowering::StringCompare(IntCC::NotEqual),
        (op, ty) => return Err(CodegenError::UnsupportedBinaryOperator { op, ty }),
    };
    Ok(lowering)
}

impl Session<'_> {
    /// Lower an expression that must produce a value.
    pub fn lower_value(&mut self, id: ExprId) -> Result<Value> {
        self.lower_expr(id)?.ok_or_else(|| {
            CodegenError::Internal(format!("{} has no value but one is required", id))
        })
    }

    /// Lower an expression and record its value. Calls to void functions produce none.
    pub fn lower_expr(&mut self, id: ExprId) -> Result<Option<Value>> {
        let expr = self.expr_node(id)?;
        let value = match &expr.node {
            ExprKind::BooleanLiteral { value } => Some(Value::bool(*value)),
            ExprKind::IntegerLiteral { value } => Some(Value::i64(*value)),
            ExprKind::StringLiteral { value } => Some(self.lower_string_literal(value)?),
            ExprKind::Identifier { decl, .. } => {
                let ty = self.map_type(self.var_node(*decl)?.ty);
                let address = self.lowered.storage(*decl)?.clone();
                Some(self.builder.ins()?.load(ty, address)?)
            }
            ExprKind::Call { callee, args } => self.lower_call(callee, args)?,
            ExprKind::Unary { op, operand } => Some(self.lower_unary(*op, *operand)?),
            ExprKind::Binary { op, lhs, rhs } => Some(self.lower_binary(*op, *lhs, *rhs)?),
        };

        if let Some(value) = &value {
            self.lowered.set_expr(id, value.clone())?;
        }
        Ok(value)
    }

    fn lower_string_literal(&mut self, text: &str) -> Result<Value> {
        let data = self.builder.module_mut().add_string_data(text);
        let handle = self.runtime.string_type().clone();
        self.builder
            .ins()?
            .call(STRING_CREATE, &handle, vec![Value::Data(data)])?
            .ok_or_else(|| CodegenError::Internal("string constructor returned void".to_string()))
    }

    fn lower_call(&mut self, callee: &str, args: &[ExprId]) -> Result<Option<Value>> {
        let (expected, returns) = {
            let function = self
                .builder
                .module()
                .get_function(callee)
                .ok_or_else(|| CodegenError::UndefinedFunction(callee.to_string()))?;
            (function.param_count(), function.signature.returns.clone())
        };
        if expected != args.len() {
            return Err(CodegenError::ArityMismatch {
                callee: callee.to_string(),
                expected,
                found: args.len(),
            });
        }

        let mut values = Vec::with_capacity(args.len());
        for &arg in args {
            values.push(self.lower_value(arg)?);
        }
        Ok(self.builder.ins()?.call(callee, &returns, values)?)
    }

    fn lower_unary(&mut self, op: UnaryOp, operand: ExprId) -> Result<Value> {
        let operand_ty = self.expr_node(operand)?.ty;
        if op != UnaryOp::Minus || operand_ty != BuiltinType::Integer {
            return Err(CodegenError::UnsupportedUnaryOperator(op));
        }
        let value = self.lower_value(operand)?;
        Ok(self.builder.ins()?.checked_neg(value, Type::i64())?)
    }

    fn lower_binary(&mut self, op: BinaryOp, lhs: ExprId, rhs: ExprId) -> Result<Value> {
        if op == BinaryOp::Assign {
            return self.lower_assignment(lhs, rhs);
        }

        let lowering = classify(op, self.expr_node(lhs)?.ty)?;
        let left = self.lower_value(lhs)?;
        let right = self.lower_value(rhs)?;
        let string = self.runtime.string_type().clone();
        let ordering = self.runtime.ordering_type();

        let mut ins = self.builder.ins()?;
        let value = match lowering {
            BinaryLowering::Add => ins.checked_add(left, right, Type::i64())?,
            BinaryLowering::Sub => ins.checked_sub(left, right, Type::i64())?,
            BinaryLowering::Mul => ins.checked_mul(left, right, Type::i64())?,
            BinaryLowering::Div => ins.div(left, right, Type::i64())?,
            BinaryLowering::Compare(cond) => ins.icmp(cond, left, right)?,
            BinaryLowering::StringConcat => ins
                .call(STRING_CONCAT, &string, vec![left, right])?
                .ok_or_else(|| CodegenError::Internal("concat returned void".to_string()))?,
            BinaryLowering::StringCompare(cond) => {
                let order = ins
                    .call(STRING_EQUALS, &ordering, vec![left, right])?
                    .ok_or_else(|| CodegenError::Internal("equals returned void".to_string()))?;
                ins.icmp(cond, order, Value::int(0, ordering.bits()))?
            }
        };
        Ok(value)
    }

    /// Store the right-hand value into the left identifier's storage. The left side is an
    /// address, never loaded; the assignment's own value is the stored value.
    fn lower_assignment(&mut self, lhs: ExprId, rhs: ExprId) -> Result<Value> {
        let ExprKind::Identifier { decl, .. } = &self.expr_node(lhs)?.node else {
            return Err(CodegenError::Internal(format!(
                "assignment target {} is not an identifier",
                lhs
            )));
        };
        let value = self.lower_value(rhs)?;
        let address = self.lowered.storage(*decl)?.clone();
        self.builder.ins()?.store(address, value.clone())?;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_plus_is_concat() {
        assert_eq!(
            classify(BinaryOp::Plus, BuiltinType::String).unwrap(),
            BinaryLowering::StringConcat
        );
        assert_eq!(
            classify(BinaryOp::Plus, BuiltinType::Integer).unwrap(),
            BinaryLowering::Add
        );
    }

    #[test]
    fn test_boolean_equality_is_native() {
        assert_eq!(
            classify(BinaryOp::NotEquals, BuiltinType::Boolean).unwrap(),
            BinaryLowering::Compare(IntCC::NotEqual)
        );
    }

    #[test]
    fn test_unsupported_pairings() {
        for (op, ty) in [
            (BinaryOp::Modulus, BuiltinType::Integer),
            (BinaryOp::Minus, BuiltinType::String),
            (BinaryOp::LessThan, BuiltinType::Boolean),
            (BinaryOp::And, BuiltinType::Boolean),
            (BinaryOp::PlusAssign, BuiltinType::Integer),
        ] {
            assert!(matches!(
                classify(op, ty),
                Err(CodegenError::UnsupportedBinaryOperator { op: o, ty: t }) if o == op && t == ty
            ));
        }
    }
}
