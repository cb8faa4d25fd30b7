use anyhow::{anyhow, Context, Result};
use clap::{Parser, ValueEnum};
use colored::*;
use staticscript_codegen::{ast, GeneratorConfig, IrGenerator};
use staticscript_emit::{render, EmitterConfig, OutputFormat};
use staticscript_ir::Module;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ssc")]
#[command(about = "StaticScript back end: lower a resolved AST to IR")]
#[command(version)]
struct Cli {
    /// Resolved AST as JSON
    input: PathBuf,

    #[arg(short, long)]
    output: Option<PathBuf>,

    #[arg(long, value_enum, default_value = "text")]
    format: Format,

    /// Name of the function that hosts top-level statements
    #[arg(long, default_value = "main")]
    entry: String,

    #[arg(long)]
    no_color: bool,

    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Text => OutputFormat::Text,
            Format::Json => OutputFormat::Json,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if cli.no_color {
        colored::control::set_override(false);
    }
    init_tracing(cli.verbose);

    match cmd_compile(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {:#}", "error:".bright_red().bold(), err);
            ExitCode::FAILURE
        }
    }
}

/// `RUST_LOG` wins; otherwise `-v` lowers the default level from `warn` to `debug`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_ast(input: &Path) -> Result<ast::Module> {
    let source = fs::read_to_string(input).map_err(|err| {
        debug!(path = %input.display(), %err, "read failed");
        anyhow!("cannot open {}", input.display())
    })?;
    ast::Module::from_json(&source)
        .with_context(|| format!("{} is not a resolved StaticScript AST", input.display()))
}

fn cmd_compile(cli: &Cli) -> Result<()> {
    let start = Instant::now();
    let ast = load_ast(&cli.input)?;
    info!(
        file = %ast.filename,
        items = ast.items.len(),
        functions = ast.functions.len(),
        "loaded AST"
    );

    let config = GeneratorConfig::default().with_entry_function(cli.entry.clone());
    let module = IrGenerator::new(config)
        .resolve(&ast)
        .with_context(|| format!("code generation failed for {}", ast.filename))?;
    log_summary(&module);

    // Files never get escape codes.
    let use_colors = !cli.no_color && cli.output.is_none();
    let emitter_config = EmitterConfig::default().with_colors(use_colors);
    let rendered = render(&module, cli.format.into(), &emitter_config)?;

    match &cli.output {
        Some(path) => {
            fs::write(path, &rendered)
                .with_context(|| format!("cannot write {}", path.display()))?;
            if cli.verbose {
                eprintln!(
                    "{} wrote {} in {:.3}s",
                    "SUCCESS:".bright_green().bold(),
                    path.display(),
                    start.elapsed().as_secs_f64()
                );
            }
        }
        None => print!("{}", rendered),
    }
    Ok(())
}

fn log_summary(module: &Module) {
    for function in module.defined_functions() {
        debug!(
            function = function.name(),
            blocks = function.body.layout.len(),
            temps = function.body.temps.len(),
            "generated"
        );
    }
    info!(
        globals = module.globals.len(),
        data = module.data.len(),
        functions = module.functions.len(),
        "module ready"
    );
}
