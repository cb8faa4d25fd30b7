use crate::config::EmitterConfig;
use colored::{Color, Colorize};

/// Indentation and color state threaded through one emission.
#[derive(Debug, Clone)]
pub struct EmitContext {
    pub indent_level: usize,
    pub indent_chars: String,
    pub use_colors: bool,
}

impl EmitContext {
    pub fn new() -> Self {
        Self {
            indent_level: 0,
            indent_chars: "    ".to_string(),
            use_colors: true,
        }
    }

    pub fn from_config(config: &EmitterConfig) -> Self {
        Self {
            indent_level: 0,
            indent_chars: config.indent_style.unit(),
            use_colors: config.use_colors,
        }
    }

    pub fn indent(&mut self) {
        self.indent_level += 1;
    }

    pub fn dedent(&mut self) {
        if self.indent_level > 0 {
            self.indent_level -= 1;
        }
    }

    pub fn get_indent(&self) -> String {
        self.indent_chars.repeat(self.indent_level)
    }

    pub fn nested(&self) -> Self {
        let mut ctx = self.clone();
        ctx.indent();
        ctx
    }
}

impl Default for EmitContext {
    fn default() -> Self {
        Self::new()
    }
}

pub struct EmitHelper;

impl EmitHelper {
    pub fn write_line(output: &mut String, context: &EmitContext, text: &str) {
        output.push_str(&context.get_indent());
        output.push_str(text);
        output.push('\n');
    }

    pub fn write_colored_line(
        output: &mut String,
        context: &EmitContext,
        text: &str,
        color: Color,
    ) {
        if context.use_colors {
            Self::write_line(output, context, &text.color(color).to_string());
        } else {
            Self::write_line(output, context, text);
        }
    }

    pub fn write_comment(output: &mut String, context: &EmitContext, comment: &str) {
        Self::write_colored_line(output, context, &format!("; {}", comment), Color::Green)
    }

    pub fn write_blank(output: &mut String) {
        output.push('\n');
    }

    pub fn write_block<F>(output: &mut String, context: &mut EmitContext, header: &str, body: F)
    where
        F: FnOnce(&mut String, &mut EmitContext),
    {
        Self::write_line(output, context, &format!("{} {{", header));
        context.indent();
        body(output, context);
        context.dedent();
        Self::write_line(output, context, "}");
    }
}
