use std::path::{Path, PathBuf};

use {anyhow::Result, clap::Subcommand};

use tgrelay_config::{
    Severity, ValidationResult, apply_env_overrides, find_or_default_config_path,
    load_or_default, validate, write_template,
};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Validate the configuration file and report errors/warnings.
    Check {
        /// Show informational diagnostics in addition to errors and warnings.
        #[arg(long)]
        verbose: bool,
    },
    /// Print the effective configuration with the token masked.
    Show,
    /// Print the config file path that would be used.
    Path,
    /// Write a documented config template.
    Init {
        /// Destination file (defaults to the user config directory).
        path: Option<PathBuf>,
    },
}

pub fn handle_config(action: ConfigAction, config_path: Option<&Path>) -> Result<()> {
    match action {
        ConfigAction::Check { verbose } => check(config_path, verbose),
        ConfigAction::Show => show(config_path),
        ConfigAction::Path => {
            let path = config_path.map_or_else(find_or_default_config_path, Path::to_path_buf);
            println!("{}", path.display());
            Ok(())
        },
        ConfigAction::Init { path } => {
            let path = path
                .or_else(|| config_path.map(Path::to_path_buf))
                .unwrap_or_else(find_or_default_config_path);
            write_template(&path)?;
            eprintln!("Wrote {}", path.display());
            Ok(())
        },
    }
}

/// ANSI color codes.
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

fn check(config_path: Option<&Path>, verbose: bool) -> Result<()> {
    let result = validate::validate(config_path);

    if let Some(ref path) = result.config_path {
        eprintln!("Checking {}\n", path.display());
    } else {
        eprintln!("No config file found; checking defaults.\n");
    }

    let shown = print_diagnostics(&result, verbose);
    let errors = result.count(Severity::Error);
    let warnings = result.count(Severity::Warning);

    if shown > 0 {
        eprintln!();
    }

    if errors == 0 && warnings == 0 {
        eprintln!("No issues found.");
    } else {
        eprintln!("{errors} error(s), {warnings} warning(s)");
    }

    if errors > 0 {
        std::process::exit(1);
    }

    Ok(())
}

fn print_diagnostics(result: &ValidationResult, verbose: bool) -> usize {
    let mut shown = 0;
    for d in &result.diagnostics {
        if d.severity == Severity::Info && !verbose {
            continue;
        }

        let (color, label) = match d.severity {
            Severity::Error => (RED, "error"),
            Severity::Warning => (YELLOW, "warning"),
            Severity::Info => (CYAN, "info"),
        };

        if d.path.is_empty() {
            eprintln!("  {BOLD}{color}{label}{RESET} {}", d.message);
        } else {
            eprintln!("  {BOLD}{color}{label}{RESET} {}: {}", d.path, d.message);
        }
        shown += 1;
    }
    shown
}

fn show(config_path: Option<&Path>) -> Result<()> {
    let mut config = load_or_default(config_path)?;
    apply_env_overrides(&mut config);
    print!("{}", toml::to_string_pretty(&config.redacted())?);
    Ok(())
}
