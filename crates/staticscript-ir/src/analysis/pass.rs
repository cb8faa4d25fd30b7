use crate::module::Module;
use crate::verifier::verify_module;
use anyhow::Result;
use std::time::{Duration, Instant};
use tracing::debug;

/// A module-level transformation or check run after generation.
pub trait Pass {
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str {
        "No description provided"
    }

    fn run_on_module(&mut self, module: &mut Module) -> Result<()>;

    fn modifies_ir(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone)]
pub struct PassStatistics {
    pub name: String,
    pub duration: Duration,
}

/// Runs passes in registration order and stops at the first failure.
///
/// With `verify_after_modification` set, the module is re-verified after every pass that reports
/// `modifies_ir`.
pub struct PassManager {
    passes: Vec<Box<dyn Pass>>,
    statistics: Vec<PassStatistics>,
    collect_stats: bool,
    verify_after_modification: bool,
}

impl PassManager {
    pub fn new() -> Self {
        Self {
            passes: Vec::new(),
            statistics: Vec::new(),
            collect_stats: false,
            verify_after_modification: true,
        }
    }

    pub fn enable_statistics(&mut self) {
        self.collect_stats = true;
    }

    pub fn set_verify_after_modification(&mut self, verify: bool) {
        self.verify_after_modification = verify;
    }

    pub fn register_pass<P: Pass + 'static>(&mut self, pass: P) {
        self.passes.push(Box::new(pass));
    }

    pub fn len(&self) -> usize {
        self.passes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }

    pub fn pass_names(&self) -> Vec<&'static str> {
        self.passes.iter().map(|p| p.name()).collect()
    }

    pub fn run_all(&mut self, module: &mut Module) -> Result<()> {
        for pass in self.passes.iter_mut() {
            let start = self.collect_stats.then(Instant::now);

            debug!(pass = pass.name(), "running pass");
            pass.run_on_module(module)
                .map_err(|e| e.context(format!("pass '{}' failed", pass.name())))?;

            if pass.modifies_ir() && self.verify_after_modification {
                verify_module(module)
                    .map_err(|e| anyhow::anyhow!(e).context(format!(
                        "module invalid after pass '{}'",
                        pass.name()
                    )))?;
            }

            if let Some(start) = start {
                self.statistics.push(PassStatistics {
                    name: pass.name().to_string(),
                    duration: start.elapsed(),
                });
            }
        }

        Ok(())
    }

    pub fn statistics(&self) -> &[PassStatistics] {
        &self.statistics
    }
}

impl Default for PassManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Verifies the whole module; never changes it.
pub struct VerifierPass;

impl Pass for VerifierPass {
    fn name(&self) -> &'static str {
        "verifier"
    }

    fn description(&self) -> &'static str {
        "Checks structural well-formedness of every function and global"
    }

    fn run_on_module(&mut self, module: &mut Module) -> Result<()> {
        verify_module(module)?;
        Ok(())
    }
}
