use crate::types::Type;
use crate::values::{TempId, Value};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Instruction {
    /// Reserve a stack slot; `result` is its address.
    Alloca {
        result: Value,
        ty: Type,
        align: u32,
    },
    Load {
        result: Value,
        ty: Type,
        address: Value,
    },
    Store {
        address: Value,
        value: Value,
    },

    CheckedAdd {
        result: Value,
        left: Value,
        right: Value,
        ty: Type,
    },
    CheckedSub {
        result: Value,
        left: Value,
        right: Value,
        ty: Type,
    },
    CheckedMul {
        result: Value,
        left: Value,
        right: Value,
        ty: Type,
    },
    /// Signed division.
    Div {
        result: Value,
        left: Value,
        right: Value,
        ty: Type,
    },
    CheckedNeg {
        result: Value,
        operand: Value,
        ty: Type,
    },

    Icmp {
        result: Value,
        cond: IntCC,
        left: Value,
        right: Value,
    },

    Call {
        result: Option<Value>,
        callee: String,
        args: Vec<Value>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntCC {
    Equal,
    NotEqual,
    SignedLessThan,
    SignedGreaterThan,
    SignedLessThanOrEqual,
    SignedGreaterThanOrEqual,
}

impl IntCC {
    pub fn mnemonic(&self) -> &'static str {
        match self {
            IntCC::Equal => "eq",
            IntCC::NotEqual => "ne",
            IntCC::SignedLessThan => "slt",
            IntCC::SignedGreaterThan => "sgt",
            IntCC::SignedLessThanOrEqual => "sle",
            IntCC::SignedGreaterThanOrEqual => "sge",
        }
    }
}

impl Instruction {
    pub fn result(&self) -> Option<&Value> {
        match self {
            Instruction::Alloca { result, .. }
            | Instruction::Load { result, .. }
            | Instruction::CheckedAdd { result, .. }
            | Instruction::CheckedSub { result, .. }
            | Instruction::CheckedMul { result, .. }
            | Instruction::Div { result, .. }
            | Instruction::CheckedNeg { result, .. }
            | Instruction::Icmp { result, .. } => Some(result),
            Instruction::Call { result, .. } => result.as_ref(),
            Instruction::Store { .. } => None,
        }
    }

    pub fn defined_temp(&self) -> Option<TempId> {
        self.result().and_then(Value::as_temp)
    }

    pub fn operands(&self) -> Vec<&Value> {
        match self {
            Instruction::Alloca { .. } => Vec::new(),
            Instruction::Load { address, .. } => vec![address],
            Instruction::Store { address, value } => vec![address, value],
            Instruction::CheckedAdd { left, right, .. }
            | Instruction::CheckedSub { left, right, .. }
            | Instruction::CheckedMul { left, right, .. }
            | Instruction::Div { left, right, .. }
            | Instruction::Icmp { left, right, .. } => vec![left, right],
            Instruction::CheckedNeg { operand, .. } => vec![operand],
            Instruction::Call { args, .. } => args.iter().collect(),
        }
    }

    pub fn is_store(&self) -> bool {
        matches!(self, Instruction::Store { .. })
    }

    pub fn is_call(&self) -> bool {
        matches!(self, Instruction::Call { .. })
    }

    pub fn store_target(&self) -> Option<&Value> {
        match self {
            Instruction::Store { address, .. } => Some(address),
            _ => None,
        }
    }

    pub fn callee(&self) -> Option<&str> {
        match self {
            Instruction::Call { callee, .. } => Some(callee),
            _ => None,
        }
    }
}
