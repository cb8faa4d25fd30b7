use super::context::{LoopBlocks, Session};
use super::errors::Result;
use crate::ast::{ExprId, ForInit, StmtId};
use staticscript_ir::BlockId;
use tracing::trace;

impl Session<'_> {
    /// Close the open block with a jump to `target`, if it is still open. Either way the cursor
    /// is left without an open block.
    pub fn emit_branch(&mut self, target: BlockId) -> Result<()> {
        if self.builder.has_open_block() {
            self.builder.ins()?.jump(target)?;
        }
        self.builder.clear_block();
        Ok(())
    }

    /// Fall through into `block` and make it the open block.
    ///
    /// The block is laid out right after the block just closed, or appended when nothing was
    /// open. A block nothing live branches to is not laid out: a sealable one is discarded, any
    /// other is kept detached so the code lowered into it is dropped with it.
    pub fn emit_block(&mut self, block: BlockId, sealable: bool) -> Result<()> {
        let previous = self.builder.current_block();
        self.emit_branch(block)?;
        let function = self.current_function_name()?;

        if self.builder.predecessor_count(block)? == 0 {
            if sealable {
                self.builder.discard_block(block)?;
            } else {
                trace!(%block, "block unreachable, lowering detached");
                self.builder.position_at_end(&function, block);
            }
            return Ok(());
        }

        match previous.filter(|p| self.builder.is_spliced(*p)) {
            Some(after) => self.builder.insert_block_after(block, after)?,
            None => self.builder.append_block(block)?,
        }
        self.builder.position_at_end(&function, block);
        trace!(%block, "activated block");
        Ok(())
    }

    pub fn lower_if(
        &mut self,
        condition: ExprId,
        then_body: StmtId,
        else_body: Option<StmtId>,
    ) -> Result<()> {
        let cond = self.lower_value(condition)?;
        let then_block = self.builder.create_block("if.then")?;
        let end_block = self.builder.create_block("if.end")?;
        let else_block = match else_body {
            Some(_) => self.builder.create_block("if.else")?,
            None => end_block,
        };

        self.builder.ins()?.branch(cond, then_block, else_block)?;

        self.emit_block(then_block, false)?;
        self.lower_stmt(then_body)?;
        self.emit_branch(end_block)?;

        if let Some(else_body) = else_body {
            self.emit_block(else_block, false)?;
            self.lower_stmt(else_body)?;
            self.emit_branch(end_block)?;
        }

        self.emit_block(end_block, true)
    }

    pub fn lower_while(&mut self, id: StmtId, condition: ExprId, body: StmtId) -> Result<()> {
        let cond_block = self.builder.create_block("while.cond")?;
        let body_block = self.builder.create_block("while.body")?;
        let end_block = self.builder.create_block("while.end")?;
        self.lowered.set_loop(
            id,
            LoopBlocks {
                cond: cond_block,
                update: None,
                end: end_block,
            },
        )?;

        self.emit_block(cond_block, false)?;
        let cond = self.lower_value(condition)?;
        self.builder.ins()?.branch(cond, body_block, end_block)?;

        self.emit_block(body_block, false)?;
        self.lower_stmt(body)?;
        self.emit_branch(cond_block)?;

        self.emit_block(end_block, true)
    }

    /// Without a condition the loop is unconditional and the condition block is the body's entry.
    pub fn lower_for(
        &mut self,
        id: StmtId,
        init: &ForInit,
        condition: Option<ExprId>,
        updates: &[ExprId],
        body: StmtId,
    ) -> Result<()> {
        match init {
            ForInit::Decl(stmt) => self.lower_stmt(*stmt)?,
            ForInit::Exprs(exprs) => {
                for &expr in exprs {
                    self.lower_expr(expr)?;
                }
            }
        }

        let cond_block = self.builder.create_block("for.cond")?;
        let end_block = self.builder.create_block("for.end")?;
        self.emit_block(cond_block, false)?;

        let update_block = if updates.is_empty() {
            None
        } else {
            Some(self.builder.create_block("for.update")?)
        };
        self.lowered.set_loop(
            id,
            LoopBlocks {
                cond: cond_block,
                update: update_block,
                end: end_block,
            },
        )?;

        if let Some(condition) = condition {
            let body_block = self.builder.create_block("for.body")?;
            let cond = self.lower_value(condition)?;
            self.builder.ins()?.branch(cond, body_block, end_block)?;
            self.emit_block(body_block, false)?;
        }

        self.lower_stmt(body)?;

        if let Some(update_block) = update_block {
            self.emit_block(update_block, false)?;
            for &update in updates {
                self.lower_expr(update)?;
            }
        }

        self.emit_branch(cond_block)?;
        self.emit_block(end_block, true)
    }

    pub fn lower_break(&mut self, target: StmtId) -> Result<()> {
        let blocks = self.lowered.loop_blocks(target)?;
        self.builder.ins()?.jump(blocks.end)?;
        Ok(())
    }

    pub fn lower_continue(&mut self, target: StmtId) -> Result<()> {
        let blocks = self.lowered.loop_blocks(target)?;
        self.builder.ins()?.jump(blocks.continue_target())?;
        Ok(())
    }

    pub fn lower_return(&mut self, value: Option<ExprId>) -> Result<()> {
        match value {
            Some(expr) => {
                let value = self.lower_value(expr)?;
                self.builder.ins()?.return_value(value)?;
            }
            None => self.builder.ins()?.return_void()?,
        }
        Ok(())
    }
}
