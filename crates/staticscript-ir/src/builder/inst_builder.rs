use crate::{
    block::{BlockId, Terminator},
    function::Function,
    instructions::{Instruction, IntCC},
    types::Type,
    values::Value,
    IrError, Result,
};

/// Appends instructions to one open block of one function.
pub struct InstBuilder<'a> {
    block_id: BlockId,
    function: &'a mut Function,
}

impl<'a> InstBuilder<'a> {
    pub(crate) fn new(function: &'a mut Function, block_id: BlockId) -> Self {
        Self { block_id, function }
    }

    pub fn block_id(&self) -> BlockId {
        self.block_id
    }

    pub fn alloca(&mut self, ty: Type, align: u32) -> Result<Value> {
        let result = self.next_value(Type::Ptr);
        self.insert_inst(Instruction::Alloca {
            result: result.clone(),
            ty,
            align,
        })?;
        Ok(result)
    }

    pub fn load(&mut self, ty: Type, address: Value) -> Result<Value> {
        let result = self.next_value(ty.clone());
        self.insert_inst(Instruction::Load {
            result: result.clone(),
            ty,
            address,
        })?;
        Ok(result)
    }

    pub fn store(&mut self, address: Value, value: Value) -> Result<()> {
        self.insert_inst(Instruction::Store { address, value })
    }

    pub fn checked_add(&mut self, left: Value, right: Value, ty: Type) -> Result<Value> {
        let result = self.next_value(ty.clone());
        self.insert_inst(Instruction::CheckedAdd {
            result: result.clone(),
            left,
            right,
            ty,
        })?;
        Ok(result)
    }

    pub fn checked_sub(&mut self, left: Value, right: Value, ty: Type) -> Result<Value> {
        let result = self.next_value(ty.clone());
        self.insert_inst(Instruction::CheckedSub {
            result: result.clone(),
            left,
            right,
            ty,
        })?;
        Ok(result)
    }

    pub fn checked_mul(&mut self, left: Value, right: Value, ty: Type) -> Result<Value> {
        let result = self.next_value(ty.clone());
        self.insert_inst(Instruction::CheckedMul {
            result: result.clone(),
            left,
            right,
            ty,
        })?;
        Ok(result)
    }

    pub fn div(&mut self, left: Value, right: Value, ty: Type) -> Result<Value> {
        let result = self.next_value(ty.clone());
        self.insert_inst(Instruction::Div {
            result: result.clone(),
            left,
            right,
            ty,
        })?;
        Ok(result)
    }

    pub fn checked_neg(&mut self, operand: Value, ty: Type) -> Result<Value> {
        let result = self.next_value(ty.clone());
        self.insert_inst(Instruction::CheckedNeg {
            result: result.clone(),
            operand,
            ty,
        })?;
        Ok(result)
    }

    pub fn icmp(&mut self, cond: IntCC, left: Value, right: Value) -> Result<Value> {
        let result = self.next_value(Type::Bool);
        self.insert_inst(Instruction::Icmp {
            result: result.clone(),
            cond,
            left,
            right,
        })?;
        Ok(result)
    }

    /// Emit a call; void callees produce no value.
    pub fn call(
        &mut self,
        callee: &str,
        returns: &Type,
        args: Vec<Value>,
    ) -> Result<Option<Value>> {
        let result = if returns.is_void() {
            None
        } else {
            Some(self.next_value(returns.clone()))
        };
        self.insert_inst(Instruction::Call {
            result: result.clone(),
            callee: callee.to_string(),
            args,
        })?;
        Ok(result)
    }

    pub fn jump(&mut self, target: BlockId) -> Result<()> {
        self.set_terminator(Terminator::Jump(target))
    }

    pub fn branch(
        &mut self,
        condition: Value,
        then_block: BlockId,
        else_block: BlockId,
    ) -> Result<()> {
        self.set_terminator(Terminator::Branch {
            condition,
            then_block,
            else_block,
        })
    }

    pub fn return_value(&mut self, value: Value) -> Result<()> {
        self.set_terminator(Terminator::Return(Some(value)))
    }

    pub fn return_void(&mut self) -> Result<()> {
        self.set_terminator(Terminator::Return(None))
    }

    fn insert_inst(&mut self, inst: Instruction) -> Result<()> {
        let block = self
            .function
            .body
            .get_block_mut(self.block_id)
            .ok_or_else(|| IrError::Builder(format!("Block {} not found", self.block_id)))?;
        if block.is_terminated() {
            return Err(IrError::Builder(format!(
                "Block {} already terminated",
                self.block_id
            )));
        }
        block.instructions.push(inst);
        Ok(())
    }

    fn set_terminator(&mut self, term: Terminator) -> Result<()> {
        let block = self
            .function
            .body
            .get_block_mut(self.block_id)
            .ok_or_else(|| IrError::Builder(format!("Block {} not found", self.block_id)))?;
        if block.is_terminated() {
            return Err(IrError::Builder(format!(
                "Block {} already terminated",
                self.block_id
            )));
        }
        block.terminator = term;
        Ok(())
    }

    fn next_value(&mut self, ty: Type) -> Value {
        Value::Temp(self.function.body.new_temp(ty))
    }
}
