use crate::config::EmitterConfig;
use crate::ir_emitter::IrEmitter;
use anyhow::{bail, Result};
use staticscript_ir::Module;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "ir" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => bail!("unknown output format '{}'", other),
        }
    }
}

/// Render `module` in the requested format. JSON output is never colored.
pub fn render(module: &Module, format: OutputFormat, config: &EmitterConfig) -> Result<String> {
    let emitter = IrEmitter::new(config.clone());
    match format {
        OutputFormat::Text => Ok(emitter.emit_to_string(module)),
        OutputFormat::Json => Ok(emitter.emit_json(module)?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_output_format() {
        assert_eq!("text".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!("yaml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_render_json_is_parseable() {
        let module = Module::new("empty");
        let json = render(&module, OutputFormat::Json, &EmitterConfig::plain()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["name"], "empty");
    }
}
