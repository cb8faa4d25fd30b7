/*! Readable renderings of generated modules.
 *
 * The text form prints one module per file: globals, constant data, runtime declarations and
 * every function body block by block in layout order. The JSON form is the module's serde
 * representation, for tools that want to consume the IR directly.
 */

pub mod config;
pub mod emitter;
pub mod formatter;
pub mod ir_emitter;
pub mod output;

pub use config::{EmitterConfig, IndentStyle};
pub use emitter::{EmitContext, EmitHelper};
pub use formatter::{format_bytes, IrFormatter};
pub use ir_emitter::IrEmitter;
pub use output::{render, OutputFormat};
