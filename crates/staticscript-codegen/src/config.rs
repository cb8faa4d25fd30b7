use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Name of the synthesized function that hosts top-level statements.
    pub entry_function: String,
    /// Verify each function as soon as it is lowered. The module is always verified at the end.
    pub verify_functions: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            entry_function: "main".to_string(),
            verify_functions: true,
        }
    }
}

impl GeneratorConfig {
    pub fn with_entry_function(mut self, name: impl Into<String>) -> Self {
        self.entry_function = name.into();
        self
    }

    pub fn with_function_verification(mut self, verify: bool) -> Self {
        self.verify_functions = verify;
        self
    }
}
