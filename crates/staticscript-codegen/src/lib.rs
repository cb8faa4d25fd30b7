/*! Code generation for StaticScript.
 *
 * Takes the AST after scope, reference and type resolution and lowers it into the backend IR:
 * globals and stack slots for variables, native instructions for integer arithmetic, runtime calls
 * for strings, and a block graph for structured control flow.
 */

pub mod ast;
pub mod builtins;
pub mod config;
pub mod ir_gen;

pub use ast::AstBuilder;
pub use builtins::BuiltinRuntime;
pub use config::GeneratorConfig;
pub use ir_gen::{generate_ir, CodegenError, IrGenerator, TypeMapper};
