/*! One import for the StaticScript back end.
 *
 * Lower a resolved AST with [`generate_ir`] (or an [`IrGenerator`] with custom config and passes),
 * then render the module with [`IrEmitter`]. [`compile_to_text`] does both.
 */

pub use staticscript_codegen as codegen;
pub use staticscript_emit as emit;
pub use staticscript_ir as ir;

pub use staticscript_ir::{
    verify_module, BasicBlock, BlockId, Function, Instruction, IrError, Module, Pass, PassManager,
    Terminator, Type, Value,
};

pub use staticscript_codegen::{
    ast, generate_ir, AstBuilder, CodegenError, GeneratorConfig, IrGenerator,
};

pub use staticscript_emit::{EmitterConfig, IrEmitter, OutputFormat};

/// Generate IR for `ast` with the default configuration and print it without colors.
pub fn compile_to_text(ast: &ast::Module) -> anyhow::Result<String> {
    let module = generate_ir(ast)?;
    Ok(IrEmitter::new(EmitterConfig::plain()).emit_to_string(&module))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::BuiltinType;

    #[test]
    fn test_compile_to_text() {
        let mut builder = AstBuilder::new("hello.ss");
        let greeting = builder.str_lit("hello");
        let (_, decl) = builder.global_var("greeting", BuiltinType::String, Some(greeting));
        builder.item(decl);

        let text = compile_to_text(&builder.finish()).unwrap();
        assert!(text.contains("data d0 = \"hello\\00\""));
        assert!(text.contains("call @ss_string_create(d0)"));
    }

    #[test]
    fn test_compile_error_propagates() {
        let mut builder = AstBuilder::new("bad.ss");
        let call = builder.call("nowhere", vec![]);
        let stmt = builder.expr_stmt(call);
        builder.item(stmt);

        let err = compile_to_text(&builder.finish()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CodegenError>(),
            Some(CodegenError::UndefinedFunction(_))
        ));
    }
}
