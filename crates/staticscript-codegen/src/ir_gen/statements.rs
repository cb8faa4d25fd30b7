use super::context::Session;
use super::errors::Result;
use crate::ast::{Stmt, StmtId};

impl Session<'_> {
    pub fn lower_stmt(&mut self, id: StmtId) -> Result<()> {
        match self.stmt_node(id)? {
            Stmt::Expr { expr } => {
                self.lower_expr(*expr)?;
            }
            Stmt::Compound { stmts } => {
                for &stmt in stmts {
                    self.lower_stmt(stmt)?;
                }
            }
            Stmt::VarDecl { vars } => {
                for &var in vars {
                    self.lower_var_decl(var)?;
                }
            }
            Stmt::FunctionDecl { func } => self.lower_function_decl(*func)?,
            Stmt::If {
                condition,
                then_body,
                else_body,
            } => self.lower_if(*condition, *then_body, *else_body)?,
            Stmt::While { condition, body } => self.lower_while(id, *condition, *body)?,
            Stmt::For {
                init,
                condition,
                updates,
                body,
            } => self.lower_for(id, init, *condition, updates, *body)?,
            Stmt::Continue { target } => self.lower_continue(*target)?,
            Stmt::Break { target } => self.lower_break(*target)?,
            Stmt::Return { value } => self.lower_return(*value)?,
        }
        Ok(())
    }
}
