use super::context::Session;
use super::errors::{CodegenError, Result};
use super::type_mapper::TypeMapper;
use crate::ast::{BuiltinType, DeclScope, FuncId, VarId};
use staticscript_ir::{
    verify_function, Constant, FunctionSignature, Linkage, ParamId, Parameter, Position, Value,
};
use tracing::{debug, trace};

impl Session<'_> {
    /// Declare every user function up front so calls resolve regardless of source order.
    pub fn predeclare_functions(&mut self) -> Result<()> {
        let ast = self.ast;
        for decl in &ast.functions {
            if self.builder.module().get_function(&decl.name).is_some() {
                return Err(CodegenError::Internal(format!(
                    "function {} declared twice",
                    decl.name
                )));
            }

            let mut params = Vec::with_capacity(decl.params.len());
            for &param in &decl.params {
                let var = self.var_node(param)?;
                params.push(Parameter::new(var.name.clone(), self.map_type(var.ty)));
            }
            let returns = TypeMapper::map_return(decl.return_type, &self.runtime);

            self.builder.module_mut().declare_function(
                FunctionSignature::new(decl.name.clone(), params, returns),
                Linkage::External,
            )?;
        }
        Ok(())
    }

    pub fn lower_var_decl(&mut self, id: VarId) -> Result<()> {
        let decl = self.var_node(id)?;
        if decl.ty == BuiltinType::Void {
            return Err(CodegenError::Internal(format!(
                "variable {} declared with void type",
                decl.name
            )));
        }

        let ty = self.map_type(decl.ty);
        let align = TypeMapper::alignment(decl.ty);
        let init = match decl.init {
            Some(expr) => Some(self.lower_value(expr)?),
            None => None,
        };

        match decl.scope {
            DeclScope::TopLevel => {
                let is_string = decl.ty == BuiltinType::String;
                let is_literal = match decl.init {
                    Some(expr) => self.expr_node(expr)?.is_literal(),
                    None => false,
                };

                let initializer = if is_string {
                    Constant::Null
                } else if is_literal {
                    init.as_ref()
                        .and_then(Value::as_constant)
                        .cloned()
                        .ok_or_else(|| {
                            CodegenError::Internal(format!(
                                "literal initializer of {} is not a constant",
                                decl.name
                            ))
                        })?
                } else {
                    Constant::zero(&ty).ok_or_else(|| {
                        CodegenError::Internal(format!("no zero value for {}", ty))
                    })?
                };

                let global =
                    self.builder
                        .module_mut()
                        .add_global(decl.name.clone(), ty, initializer, align);

                // Strings are runtime handles and never baked.
                if let Some(value) = init {
                    if is_string || !is_literal {
                        self.builder.ins()?.store(Value::Global(global), value)?;
                    }
                }
                self.lowered.set_storage(id, Value::Global(global))?;
            }
            DeclScope::Local => {
                let mut ins = self.builder.ins()?;
                let slot = ins.alloca(ty, align)?;
                if let Some(value) = init {
                    ins.store(slot.clone(), value)?;
                }
                self.lowered.set_storage(id, slot)?;
            }
        }
        Ok(())
    }

    /// Lower a function body into its pre-declared signature, then put the cursor back where it
    /// was in the entry function.
    pub fn lower_function_decl(&mut self, id: FuncId) -> Result<()> {
        let decl = self.function_node(id)?;
        let saved = self.builder.position().clone();
        debug!(function = %decl.name, "lowering function");

        self.builder.set_position(Position::in_function(decl.name.clone()));
        let entry = self.builder.create_block("entry")?;
        self.builder.append_block(entry)?;
        self.builder.position_at_end(&decl.name, entry);

        for (index, &param) in decl.params.iter().enumerate() {
            let var = self.var_node(param)?;
            let ty = self.map_type(var.ty);
            let mut ins = self.builder.ins()?;
            let slot = ins.alloca(ty, TypeMapper::alignment(var.ty))?;
            ins.store(slot.clone(), Value::Param(ParamId(index as u32)))?;
            self.lowered.set_storage(param, slot)?;
        }

        self.lower_stmt(decl.body)?;

        let returns_void = matches!(decl.return_type, None | Some(BuiltinType::Void));
        if returns_void && self.builder.is_live() {
            trace!(function = %decl.name, "adding implicit void return");
            self.builder.ins()?.return_void()?;
        }

        self.finish_function(&decl.name)?;
        self.builder.set_position(saved);
        Ok(())
    }

    /// Drop the function's dead blocks and verify it if configured to.
    pub fn finish_function(&mut self, name: &str) -> Result<()> {
        self.builder.finalize_function(name)?;
        if self.config.verify_functions {
            let module = self.builder.module();
            let function = module.get_function(name).ok_or_else(|| {
                CodegenError::Internal(format!("function {} disappeared", name))
            })?;
            verify_function(module, function)?;
            debug!(function = name, "function verified");
        }
        Ok(())
    }
}
