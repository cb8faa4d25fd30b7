/*! Structural well-formedness checks for generated functions and modules.
 *
 * A function passes when its laid-out blocks form a closed CFG (every block terminated, every
 * target laid out, no orphans), every temp is defined once and dominates its uses, and operand
 * types agree with what each instruction expects.
 */

use crate::analysis::{ControlFlowGraph, DominatorTree};
use crate::block::{BlockId, Terminator};
use crate::function::Function;
use crate::instructions::Instruction;
use crate::module::Module;
use crate::types::Type;
use crate::values::{TempId, Value};
use crate::{IrError, Result};
use std::collections::HashMap;
use tracing::debug;

pub fn verify_module(module: &Module) -> Result<()> {
    for global in module.globals.values() {
        if !global.initializer.fits(&global.ty) {
            return Err(IrError::Verification {
                function: format!("@{}", global.name),
                reason: format!(
                    "initializer {} does not match global type {}",
                    global.initializer, global.ty
                ),
            });
        }
        if global.ty.is_void() {
            return Err(IrError::Verification {
                function: format!("@{}", global.name),
                reason: "global of void type".to_string(),
            });
        }
    }

    for function in module.defined_functions() {
        verify_function(module, function)?;
    }

    debug!(module = %module.name, "module verified");
    Ok(())
}

pub fn verify_function(module: &Module, function: &Function) -> Result<()> {
    Verifier::new(module, function).run()
}

struct Verifier<'a> {
    module: &'a Module,
    function: &'a Function,
    /// Where each temp is defined: block and instruction index.
    defs: HashMap<TempId, (BlockId, usize)>,
    /// Pointee types of stack slots.
    slots: HashMap<TempId, Type>,
}

impl<'a> Verifier<'a> {
    fn new(module: &'a Module, function: &'a Function) -> Self {
        Self {
            module,
            function,
            defs: HashMap::new(),
            slots: HashMap::new(),
        }
    }

    fn fail<T>(&self, reason: impl Into<String>) -> Result<T> {
        Err(IrError::Verification {
            function: self.function.name().to_string(),
            reason: reason.into(),
        })
    }

    fn run(mut self) -> Result<()> {
        let function = self.function;
        let body = &function.body;
        if body.layout.is_empty() {
            return self.fail("function has no blocks");
        }
        if body.blocks.len() != body.layout.len() {
            return self.fail(format!(
                "{} detached block(s) left in function",
                body.blocks.len().saturating_sub(body.layout.len())
            ));
        }

        for block in body.laid_out_blocks() {
            if !block.is_terminated() {
                return self.fail(format!("{} ({}) has no terminator", block.id, block.label));
            }
            for target in block.successors() {
                if !body.is_spliced(target) {
                    return self.fail(format!(
                        "{} branches to {} which is not laid out",
                        block.id, target
                    ));
                }
            }
        }

        let cfg = ControlFlowGraph::from_function(function);
        if let Some(orphan) = cfg.orphans().first() {
            return self.fail(format!("{} has no predecessors", orphan));
        }

        self.collect_definitions()?;

        let dom_tree = DominatorTree::from_cfg(&cfg);
        for block in body.laid_out_blocks() {
            for (index, inst) in block.instructions.iter().enumerate() {
                for operand in inst.operands() {
                    self.check_use(&dom_tree, operand, block.id, Some(index))?;
                }
                self.check_instruction(inst)?;
            }
            for operand in block.terminator.operands() {
                self.check_use(&dom_tree, operand, block.id, None)?;
            }
            self.check_terminator(&block.terminator)?;
        }

        debug!(function = function.name(), "function verified");
        Ok(())
    }

    fn collect_definitions(&mut self) -> Result<()> {
        let function = self.function;
        let body = &function.body;
        for block in body.laid_out_blocks() {
            for (index, inst) in block.instructions.iter().enumerate() {
                if let Some(temp) = inst.defined_temp() {
                    if self.defs.insert(temp, (block.id, index)).is_some() {
                        return self.fail(format!("{} defined more than once", temp));
                    }
                    if let Instruction::Alloca { ty, .. } = inst {
                        self.slots.insert(temp, ty.clone());
                    }
                }
            }
        }
        Ok(())
    }

    /// `index` is `None` for terminator operands, which follow every instruction of the block.
    fn check_use(
        &self,
        dom_tree: &DominatorTree,
        value: &Value,
        block: BlockId,
        index: Option<usize>,
    ) -> Result<()> {
        match value {
            Value::Temp(temp) => {
                let Some(&(def_block, def_index)) = self.defs.get(temp) else {
                    return self.fail(format!("{} used but never defined", temp));
                };
                let dominated = if def_block == block {
                    index.map_or(true, |i| def_index < i)
                } else {
                    dom_tree.dominates(def_block, block)
                };
                if !dominated {
                    return self.fail(format!(
                        "definition of {} does not dominate its use in {}",
                        temp, block
                    ));
                }
            }
            Value::Param(param) => {
                if param.0 as usize >= self.function.param_count() {
                    return self.fail(format!("{} out of range", param));
                }
            }
            Value::Global(global) => {
                if self.module.get_global(*global).is_none() {
                    return self.fail(format!("unknown global {}", global));
                }
            }
            Value::Data(data) => {
                if !self.module.data.contains_key(data) {
                    return self.fail(format!("unknown data object {}", data));
                }
            }
            Value::Constant(_) => {}
        }
        Ok(())
    }

    fn value_type(&self, value: &Value) -> Option<Type> {
        self.function.value_type(value)
    }

    fn fits(&self, value: &Value, expected: &Type) -> bool {
        match value {
            Value::Constant(c) => c.fits(expected),
            other => self.value_type(other).as_ref() == Some(expected),
        }
    }

    /// Type stored behind an address operand.
    fn pointee(&self, address: &Value) -> Option<Type> {
        match address {
            Value::Temp(temp) => self.slots.get(temp).cloned(),
            Value::Global(global) => self.module.get_global(*global).map(|g| g.ty.clone()),
            _ => None,
        }
    }

    fn check_instruction(&self, inst: &Instruction) -> Result<()> {
        match inst {
            Instruction::Alloca { ty, .. } => {
                if ty.is_void() {
                    return self.fail("stack slot of void type");
                }
            }
            Instruction::Load { ty, address, .. } => {
                let Some(pointee) = self.pointee(address) else {
                    return self.fail(format!("load from non-address {}", address));
                };
                if &pointee != ty {
                    return self.fail(format!(
                        "load of {} from a slot of type {}",
                        ty, pointee
                    ));
                }
            }
            Instruction::Store { address, value } => {
                let Some(pointee) = self.pointee(address) else {
                    return self.fail(format!("store to non-address {}", address));
                };
                if !self.fits(value, &pointee) {
                    return self.fail(format!(
                        "store of {} into a slot of type {}",
                        value, pointee
                    ));
                }
            }
            Instruction::CheckedAdd {
                left, right, ty, ..
            }
            | Instruction::CheckedSub {
                left, right, ty, ..
            }
            | Instruction::CheckedMul {
                left, right, ty, ..
            }
            | Instruction::Div {
                left, right, ty, ..
            } => {
                if !matches!(ty, Type::Int(_)) {
                    return self.fail(format!("arithmetic on non-integer type {}", ty));
                }
                if !self.fits(left, ty) || !self.fits(right, ty) {
                    return self.fail(format!(
                        "arithmetic operands {} and {} are not {}",
                        left, right, ty
                    ));
                }
            }
            Instruction::CheckedNeg { operand, ty, .. } => {
                if !matches!(ty, Type::Int(_)) || !self.fits(operand, ty) {
                    return self.fail(format!("negation of {} as {}", operand, ty));
                }
            }
            Instruction::Icmp { left, right, .. } => {
                let ty = match (left, right) {
                    (Value::Constant(_), other) | (other, _) => self.value_type(other),
                };
                match ty {
                    Some(ty) if ty.is_integer() => {
                        if !self.fits(left, &ty) || !self.fits(right, &ty) {
                            return self.fail(format!(
                                "comparison operands {} and {} disagree in type",
                                left, right
                            ));
                        }
                    }
                    _ => return self.fail("comparison of non-integer operands"),
                }
            }
            Instruction::Call {
                result,
                callee,
                args,
            } => {
                let Some(target) = self.module.get_function(callee) else {
                    return self.fail(format!("call to unknown function {}", callee));
                };
                let params = &target.signature.params;
                if params.len() != args.len() {
                    return self.fail(format!(
                        "call to {} with {} argument(s), expected {}",
                        callee,
                        args.len(),
                        params.len()
                    ));
                }
                for (arg, param) in args.iter().zip(params) {
                    if !self.fits(arg, &param.param_type) {
                        return self.fail(format!(
                            "argument {} to {} is not {}",
                            arg, callee, param.param_type
                        ));
                    }
                }
                let returns = &target.signature.returns;
                match result {
                    None if !returns.is_void() => {
                        return self.fail(format!("result of {} dropped", callee));
                    }
                    Some(value) if !self.fits(value, returns) => {
                        return self.fail(format!("result of {} is not {}", callee, returns));
                    }
                    _ => {}
                }
            }
        }
        Ok(())
    }

    fn check_terminator(&self, term: &Terminator) -> Result<()> {
        let returns = &self.function.signature.returns;
        match term {
            Terminator::Branch { condition, .. } => {
                if !self.fits(condition, &Type::Bool) {
                    return self.fail(format!("branch condition {} is not i1", condition));
                }
            }
            Terminator::Return(Some(value)) => {
                if returns.is_void() {
                    return self.fail("value returned from void function");
                }
                if !self.fits(value, returns) {
                    return self.fail(format!("returned {} is not {}", value, returns));
                }
            }
            Terminator::Return(None) => {
                if !returns.is_void() {
                    return self.fail(format!("missing return value of type {}", returns));
                }
            }
            Terminator::Jump(_) => {}
            Terminator::Invalid => return self.fail("open block"),
        }
        Ok(())
    }
}
