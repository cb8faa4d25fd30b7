use crate::config::EmitterConfig;
use crate::emitter::{EmitContext, EmitHelper};
use crate::formatter::{format_bytes, IrFormatter};
use colored::{Color, Colorize};
use staticscript_ir::{BasicBlock, Function, Module};

/// Prints a whole module: header, globals, constant data, declarations, then every defined
/// function with its blocks in layout order.
pub struct IrEmitter {
    config: EmitterConfig,
}

impl IrEmitter {
    pub fn new(config: EmitterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EmitterConfig {
        &self.config
    }

    pub fn emit_to_string(&self, module: &Module) -> String {
        let mut output = String::new();
        let mut context = EmitContext::from_config(&self.config);
        let formatter = IrFormatter::new(module, self.config.include_types);

        EmitHelper::write_comment(&mut output, &context, &format!("module {}", module.name));
        self.print_globals(&mut output, &context, module);
        self.print_data(&mut output, &context, module);
        self.print_declarations(&mut output, &context, module);

        for function in module.defined_functions() {
            EmitHelper::write_blank(&mut output);
            self.print_function(&mut output, &mut context, &formatter, function);
        }

        output
    }

    pub fn emit_json(&self, module: &Module) -> serde_json::Result<String> {
        serde_json::to_string_pretty(module)
    }

    fn print_globals(&self, output: &mut String, context: &EmitContext, module: &Module) {
        if module.globals.is_empty() {
            return;
        }
        EmitHelper::write_blank(output);
        for global in module.globals.values() {
            EmitHelper::write_line(
                output,
                context,
                &format!(
                    "global {}@{}: {} = {}, align {}",
                    IrFormatter::linkage_prefix(global.linkage),
                    global.name,
                    global.ty,
                    global.initializer,
                    global.align
                ),
            );
        }
    }

    fn print_data(&self, output: &mut String, context: &EmitContext, module: &Module) {
        if module.data.is_empty() {
            return;
        }
        EmitHelper::write_blank(output);
        for data in module.data.values() {
            EmitHelper::write_line(
                output,
                context,
                &format!("data {} = {}", data.id, format_bytes(&data.bytes)),
            );
        }
    }

    fn print_declarations(&self, output: &mut String, context: &EmitContext, module: &Module) {
        let declarations: Vec<&Function> = module
            .functions
            .values()
            .filter(|f| f.is_declaration())
            .collect();
        if declarations.is_empty() {
            return;
        }
        EmitHelper::write_blank(output);
        for function in declarations {
            EmitHelper::write_line(
                output,
                context,
                &format!(
                    "declare {}{}",
                    IrFormatter::linkage_prefix(function.linkage),
                    IrFormatter::format_signature(&function.signature, false)
                ),
            );
        }
    }

    fn print_function(
        &self,
        output: &mut String,
        context: &mut EmitContext,
        formatter: &IrFormatter<'_>,
        function: &Function,
    ) {
        let header = format!(
            "function {}{}",
            IrFormatter::linkage_prefix(function.linkage),
            IrFormatter::format_signature(&function.signature, true)
        );
        let header = if context.use_colors {
            header.bold().to_string()
        } else {
            header
        };

        EmitHelper::write_block(output, context, &header, |out, ctx| {
            for block in function.body.laid_out_blocks() {
                self.print_block(out, ctx, formatter, function, block);
            }
        });
    }

    fn print_block(
        &self,
        output: &mut String,
        context: &EmitContext,
        formatter: &IrFormatter<'_>,
        function: &Function,
        block: &BasicBlock,
    ) {
        EmitHelper::write_colored_line(
            output,
            context,
            &format!("{}: ; {}", block.id, block.label),
            Color::Cyan,
        );
        let body = context.nested();
        for inst in &block.instructions {
            EmitHelper::write_line(output, &body, &formatter.format_instruction(inst, function));
        }
        EmitHelper::write_line(output, &body, &formatter.format_terminator(&block.terminator));
    }
}

impl Default for IrEmitter {
    fn default() -> Self {
        Self::new(EmitterConfig::default())
    }
}
