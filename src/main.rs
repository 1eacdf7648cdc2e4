use anyhow::Context;
use clap::Parser;
use log::info;
use std::path::PathBuf;
use std::process;
use tauc_lorentz_gen::Utils::logger::init_logger;
use tauc_lorentz_gen::codegen::generator::{CodeGenerator, GeneratorConfig};

/// Fills a C++ template with the Tauc-Lorentz permittivity, its parameter
/// derivatives and the constrained-parameter Jacobian.
#[derive(Parser, Debug)]
#[command(disable_help_flag = true, disable_version_flag = true)]
struct Cli {
    /// template file with the `$name` placeholders
    template: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(_) => {
            let program = std::env::args()
                .next()
                .unwrap_or_else(|| "tauc_lorentz_gen".to_string());
            println!("Usage: {} <filename>", program);
            process::exit(1);
        }
    };

    let config = GeneratorConfig::default();
    init_logger(config.log_level, None);
    info!("rendering {}", cli.template.display());

    let generator = CodeGenerator::new(config);
    let document = generator
        .render_file(&cli.template)
        .with_context(|| format!("cannot generate code from {}", cli.template.display()))?;
    println!("{}", document);
    Ok(())
}
