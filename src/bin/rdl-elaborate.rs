//! `rdl-elaborate` — reads a SystemRDL AST JSON document (spec §6), runs the
//! elaboration core over it, and prints diagnostics. With `-j`/`--json` it
//! additionally writes the elaborated-model JSON.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::rc::Rc;

use anyhow::{Context, Result};
use clap::Parser;

use rdl_elab::ast::json::parse_document;
use rdl_elab::ast::RuleKind;
use rdl_elab::{Elaborator, ElaboratorConfig};

/// Elaborate a SystemRDL AST JSON document into a resolved register model.
#[derive(Parser, Debug)]
#[command(name = "rdl-elaborate", version, about)]
struct Cli {
    /// Input file containing the AST JSON form (spec §6 "AST JSON").
    input: PathBuf,

    /// Write the elaborated-model JSON. Defaults to
    /// `<input-stem>_elaborated.json` when no filename is given.
    #[arg(short = 'j', long = "json", value_name = "FILE", num_args = 0..=1, default_missing_value = "\0")]
    json: Option<PathBuf>,

    /// Raise the tracing filter from `warn` to `debug`.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("rdl-elaborate: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose { "debug" } else { "warn" };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .without_time()
        .try_init();
}

/// Returns `Ok(true)` if elaboration succeeded with no errors.
fn run(cli: &Cli) -> Result<bool> {
    let source = std::fs::read_to_string(&cli.input)
        .with_context(|| format!("reading {}", cli.input.display()))?;
    let file: Rc<str> = Rc::from(cli.input.to_string_lossy().as_ref());
    let items = parse_document(&source, Some(file)).context("parsing AST JSON")?;
    let items: Vec<_> = items
        .iter()
        .flat_map(|item| {
            if item.is_rule(RuleKind::CompilationUnit) {
                item.children().to_vec()
            } else {
                vec![item.clone()]
            }
        })
        .collect();

    let elaborator = Elaborator::new(ElaboratorConfig::default());
    let (root, diagnostics) = elaborator.elaborate(&items);

    for diagnostic in &diagnostics {
        eprintln!("{}", diagnostic.render());
    }

    let Some(root) = root else {
        return Ok(false);
    };

    if let Some(json_arg) = &cli.json {
        let out_path = if json_arg.as_os_str() == "\0" {
            default_json_path(&cli.input)
        } else {
            json_arg.clone()
        };
        let document = rdl_elab::interchange::to_document(&root);
        let text = serde_json::to_string_pretty(&document).context("serializing elaborated model")?;
        std::fs::write(&out_path, text).with_context(|| format!("writing {}", out_path.display()))?;
    }

    Ok(true)
}

fn default_json_path(input: &Path) -> PathBuf {
    let stem = input.file_stem().and_then(|s| s.to_str()).unwrap_or("output");
    input.with_file_name(format!("{stem}_elaborated.json"))
}
