use super::errors::{CodegenError, Result};
use super::type_mapper::TypeMapper;
use crate::ast::{self, BuiltinType, ExprId, StmtId, VarId};
use crate::builtins::BuiltinRuntime;
use crate::config::GeneratorConfig;
use staticscript_ir::{BlockId, IrBuilder, Type, Value};
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// Blocks a loop owns; `break` and `continue` look them up by the loop's statement id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopBlocks {
    pub cond: BlockId,
    pub update: Option<BlockId>,
    pub end: BlockId,
}

impl LoopBlocks {
    pub fn continue_target(&self) -> BlockId {
        self.update.unwrap_or(self.cond)
    }
}

/// Lowering results keyed by AST node. Every key is written once.
#[derive(Debug, Default)]
pub struct Lowered {
    exprs: HashMap<ExprId, Value>,
    storage: HashMap<VarId, Value>,
    loops: HashMap<StmtId, LoopBlocks>,
}

impl Lowered {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_expr(&mut self, id: ExprId, value: Value) -> Result<()> {
        match self.exprs.entry(id) {
            Entry::Occupied(_) => Err(CodegenError::Internal(format!("{} lowered twice", id))),
            Entry::Vacant(slot) => {
                slot.insert(value);
                Ok(())
            }
        }
    }

    pub fn expr(&self, id: ExprId) -> Option<&Value> {
        self.exprs.get(&id)
    }

    pub fn set_storage(&mut self, id: VarId, address: Value) -> Result<()> {
        match self.storage.entry(id) {
            Entry::Occupied(_) => {
                Err(CodegenError::Internal(format!("{} given storage twice", id)))
            }
            Entry::Vacant(slot) => {
                slot.insert(address);
                Ok(())
            }
        }
    }

    pub fn storage(&self, id: VarId) -> Result<&Value> {
        self.storage
            .get(&id)
            .ok_or_else(|| CodegenError::Internal(format!("{} used before its declaration", id)))
    }

    pub fn set_loop(&mut self, id: StmtId, blocks: LoopBlocks) -> Result<()> {
        match self.loops.entry(id) {
            Entry::Occupied(_) => Err(CodegenError::Internal(format!("loop {} lowered twice", id))),
            Entry::Vacant(slot) => {
                slot.insert(blocks);
                Ok(())
            }
        }
    }

    pub fn loop_blocks(&self, id: StmtId) -> Result<LoopBlocks> {
        self.loops
            .get(&id)
            .copied()
            .ok_or_else(|| CodegenError::Internal(format!("{} is not an enclosing loop", id)))
    }
}

/// State of one generation run: the build cursor, the side table and the read-only AST.
pub(crate) struct Session<'a> {
    pub ast: &'a ast::Module,
    pub builder: IrBuilder,
    pub lowered: Lowered,
    pub runtime: BuiltinRuntime,
    pub config: &'a GeneratorConfig,
}

impl<'a> Session<'a> {
    pub fn map_type(&self, ty: BuiltinType) -> Type {
        TypeMapper::map(ty, &self.runtime)
    }

    pub fn expr_node(&self, id: ExprId) -> Result<&'a ast::Expr> {
        self.ast
            .expr(id)
            .ok_or_else(|| CodegenError::Internal(format!("{} not in module", id)))
    }

    pub fn stmt_node(&self, id: StmtId) -> Result<&'a ast::Stmt> {
        self.ast
            .stmt(id)
            .ok_or_else(|| CodegenError::Internal(format!("{} not in module", id)))
    }

    pub fn var_node(&self, id: VarId) -> Result<&'a ast::VarDecl> {
        self.ast
            .var(id)
            .ok_or_else(|| CodegenError::Internal(format!("{} not in module", id)))
    }

    pub fn function_node(&self, id: ast::FuncId) -> Result<&'a ast::FunctionDecl> {
        self.ast
            .function(id)
            .ok_or_else(|| CodegenError::Internal(format!("{} not in module", id)))
    }

    pub fn current_function_name(&self) -> Result<String> {
        Ok(self.builder.current_function_name()?.to_string())
    }
}
