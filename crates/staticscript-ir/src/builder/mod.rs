/*! The build cursor.
 *
 * `IrBuilder` owns the module under construction and a single insertion position. Blocks are
 * created detached and only enter a function's layout when spliced in, so a block that never gains
 * a live predecessor can be dropped instead of emitted.
 */

pub mod cursor;
pub mod inst_builder;

pub use cursor::Position;
pub use inst_builder::InstBuilder;

use crate::{
    block::BlockId,
    function::Function,
    module::Module,
    IrError, Result,
};
use tracing::trace;

/// Label given to the blocks that receive code following a terminator.
pub const UNREACHABLE_LABEL: &str = "unreachable";

pub struct IrBuilder {
    module: Module,
    position: Position,
}

impl IrBuilder {
    pub fn new(module: Module) -> Self {
        Self {
            module,
            position: Position::none(),
        }
    }

    pub fn module(&self) -> &Module {
        &self.module
    }

    pub fn module_mut(&mut self) -> &mut Module {
        &mut self.module
    }

    pub fn into_module(self) -> Module {
        self.module
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    pub fn position_at_end(&mut self, function: &str, block: BlockId) {
        self.position = Position::at_end(function, block);
    }

    /// Keep the function, drop the open block.
    pub fn clear_block(&mut self) {
        self.position.block = None;
    }

    pub fn clear_position(&mut self) {
        self.position = Position::none();
    }

    pub fn current_block(&self) -> Option<BlockId> {
        self.position.block
    }

    pub fn current_function_name(&self) -> Result<&str> {
        self.position
            .function
            .as_deref()
            .ok_or_else(|| IrError::Builder("Cursor not positioned".to_string()))
    }

    pub fn current_function(&self) -> Result<&Function> {
        let name = self.current_function_name()?;
        self.module
            .get_function(name)
            .ok_or_else(|| IrError::Builder(format!("Function {} not found", name)))
    }

    pub fn current_function_mut(&mut self) -> Result<&mut Function> {
        let name = self
            .position
            .function
            .clone()
            .ok_or_else(|| IrError::Builder("Cursor not positioned".to_string()))?;
        self.module
            .get_function_mut(&name)
            .ok_or_else(|| IrError::Builder(format!("Function {} not found", name)))
    }

    /// New block in the current function's arena, outside its layout.
    pub fn create_block(&mut self, label: &str) -> Result<BlockId> {
        let function = self.current_function_mut()?;
        Ok(function.body.create_block(label))
    }

    pub fn append_block(&mut self, block: BlockId) -> Result<()> {
        let body = &mut self.current_function_mut()?.body;
        Self::check_detached(body, block)?;
        body.layout.push(block);
        trace!(%block, "appended block");
        Ok(())
    }

    pub fn insert_block_after(&mut self, block: BlockId, after: BlockId) -> Result<()> {
        let body = &mut self.current_function_mut()?.body;
        Self::check_detached(body, block)?;
        let index = body
            .layout_position(after)
            .ok_or_else(|| IrError::Builder(format!("Block {} is not laid out", after)))?;
        body.layout.insert(index + 1, block);
        trace!(%block, %after, "inserted block");
        Ok(())
    }

    /// Remove a detached block from the arena. Clears the position if it pointed at it.
    pub fn discard_block(&mut self, block: BlockId) -> Result<()> {
        let body = &mut self.current_function_mut()?.body;
        if body.is_spliced(block) {
            return Err(IrError::Builder(format!(
                "Cannot discard laid-out block {}",
                block
            )));
        }
        body.blocks
            .shift_remove(&block)
            .ok_or_else(|| IrError::Builder(format!("Block {} not found", block)))?;
        if self.position.block == Some(block) {
            self.position.block = None;
        }
        trace!(%block, "discarded block");
        Ok(())
    }

    pub fn is_spliced(&self, block: BlockId) -> bool {
        self.current_function()
            .map(|f| f.body.is_spliced(block))
            .unwrap_or(false)
    }

    /// Incoming edges from laid-out blocks. Edges out of detached blocks are dead and not counted.
    pub fn predecessor_count(&self, block: BlockId) -> Result<usize> {
        let body = &self.current_function()?.body;
        Ok(body
            .laid_out_blocks()
            .flat_map(|b| b.successors())
            .filter(|succ| *succ == block)
            .count())
    }

    pub fn is_terminated(&self, block: BlockId) -> Result<bool> {
        let body = &self.current_function()?.body;
        body.get_block(block)
            .map(|b| b.is_terminated())
            .ok_or_else(|| IrError::Builder(format!("Block {} not found", block)))
    }

    /// The position names a block that still accepts instructions.
    pub fn has_open_block(&self) -> bool {
        match self.position.block {
            Some(block) => matches!(self.is_terminated(block), Ok(false)),
            None => false,
        }
    }

    /// Open, and part of the layout: code added here will run.
    pub fn is_live(&self) -> bool {
        match self.position.block {
            Some(block) => self.has_open_block() && self.is_spliced(block),
            None => false,
        }
    }

    /// Instruction builder over the open block. Parks the cursor in a detached
    /// `unreachable` block when there is nothing open to append to.
    pub fn ins(&mut self) -> Result<InstBuilder<'_>> {
        if !self.has_open_block() {
            let parked = self.create_block(UNREACHABLE_LABEL)?;
            trace!(block = %parked, "parked cursor in unreachable block");
            self.position.block = Some(parked);
        }
        let block = self
            .position
            .block
            .ok_or_else(|| IrError::Builder("Cursor not positioned".to_string()))?;
        let function = self.current_function_mut()?;
        Ok(InstBuilder::new(function, block))
    }

    /// Drop the detached blocks of `function`. Returns how many were removed.
    pub fn finalize_function(&mut self, function: &str) -> Result<usize> {
        let f = self
            .module
            .get_function_mut(function)
            .ok_or_else(|| IrError::Builder(format!("Function {} not found", function)))?;
        let pruned = f.body.prune_detached();
        if self.position.function.as_deref() == Some(function) {
            if let Some(block) = self.position.block {
                if !f.body.is_spliced(block) {
                    self.position.block = None;
                }
            }
        }
        if pruned > 0 {
            trace!(function, pruned, "pruned detached blocks");
        }
        Ok(pruned)
    }

    fn check_detached(body: &crate::function::FunctionBody, block: BlockId) -> Result<()> {
        if body.get_block(block).is_none() {
            return Err(IrError::Builder(format!("Block {} not found", block)));
        }
        if body.is_spliced(block) {
            return Err(IrError::Builder(format!("Block {} already laid out", block)));
        }
        Ok(())
    }
}
