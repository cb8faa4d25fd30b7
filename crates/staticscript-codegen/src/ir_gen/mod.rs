/*! Lower a resolved AST into backend IR.
 *
 * One `Session` walks the tree depth first and drives a single build cursor. Top-level statements
 * land in a synthesized entry function; each function declaration gets its own function and the
 * cursor returns to the entry function afterwards. Every function is verified once lowered, then
 * the module as a whole, then the caller's pass pipeline runs.
 */

mod context;
mod control_flow;
mod declarations;
mod errors;
mod expressions;
mod statements;
mod type_mapper;

#[cfg(test)]
mod tests;

pub use context::{LoopBlocks, Lowered};
pub use errors::{CodegenError, Result};
pub use type_mapper::TypeMapper;

use crate::ast;
use crate::builtins::BuiltinRuntime;
use crate::config::GeneratorConfig;
use context::Session;
use staticscript_ir::{
    verify_module, FunctionSignature, IrBuilder, Linkage, Module, PassManager, Type, Value,
};
use tracing::debug;

pub struct IrGenerator {
    config: GeneratorConfig,
    passes: PassManager,
}

impl IrGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self {
            config,
            passes: PassManager::new(),
        }
    }

    /// Passes to run on the verified module.
    pub fn with_passes(mut self, passes: PassManager) -> Self {
        self.passes = passes;
        self
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn passes(&self) -> &PassManager {
        &self.passes
    }

    /// Generate, verify and optimize the module for `ast`. Any error aborts the whole run.
    pub fn resolve(&mut self, ast: &ast::Module) -> Result<Module> {
        let runtime = BuiltinRuntime::new();
        let mut module = Module::new(ast.filename.clone());
        runtime.declare(&mut module)?;

        let entry_name = self.config.entry_function.clone();
        module.declare_function(
            FunctionSignature::new(entry_name.clone(), Vec::new(), Type::i64()),
            Linkage::External,
        )?;

        let mut session = Session {
            ast,
            builder: IrBuilder::new(module),
            lowered: Lowered::new(),
            runtime,
            config: &self.config,
        };
        session.predeclare_functions()?;

        session
            .builder
            .set_position(staticscript_ir::Position::in_function(entry_name.clone()));
        let entry = session.builder.create_block("entry")?;
        session.builder.append_block(entry)?;
        session.builder.position_at_end(&entry_name, entry);

        debug!(file = %ast.filename, items = ast.items.len(), "lowering module");
        for &item in &ast.items {
            session.lower_stmt(item)?;
        }

        if session.builder.is_live() {
            session.builder.ins()?.return_value(Value::i64(0))?;
        }
        session.finish_function(&entry_name)?;

        let mut module = session.builder.into_module();
        verify_module(&module)?;

        if !self.passes.is_empty() {
            debug!(passes = ?self.passes.pass_names(), "running pass pipeline");
        }
        self.passes.run_all(&mut module).map_err(CodegenError::Pass)?;
        Ok(module)
    }
}

impl Default for IrGenerator {
    fn default() -> Self {
        Self::new(GeneratorConfig::default())
    }
}

/// Generate a module with the default configuration and no passes.
pub fn generate_ir(ast: &ast::Module) -> Result<Module> {
    IrGenerator::default().resolve(ast)
}
