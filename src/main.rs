mod engine;
mod error;
mod lang;
mod library;

use std::fs;
use std::path::Path;
use std::process::exit;

use clap::{Args, Parser, Subcommand};

use crate::engine::ScriptEngine;
use crate::error::ScriptError;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a script file, invoking its main function.
    Run(RunArgs),
    /// Parse a script file and report errors without running it.
    Check(CheckArgs),
}

#[derive(Args)]
struct RunArgs {
    path: String,
}

#[derive(Args)]
struct CheckArgs {
    path: String,
    /// Dump the parsed syntax tree.
    #[arg(long)]
    ast: bool,
}

fn read_source(path: &str) -> (String, String) {
    let script = match fs::read_to_string(path) {
        Ok(script) => script,
        Err(err) => {
            println!("\x1b[31m[Error]:can not read file {path}: {err}\x1b[0m");
            exit(1);
        }
    };
    // Diagnostics name the file, not the whole path.
    let name = Path::new(path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(path)
        .to_string();
    (name, script)
}

fn handle_script_err(e: ScriptError) -> ! {
    println!("\x1b[31m[Error]:{e}\x1b[0m");
    if let ScriptError::VariableUndefined(name, _) = &e {
        if name == "main" {
            println!("\x1b[31m[Error]:A runnable script must declare a main function, like 'fun main() = ...'.\x1b[0m");
        }
    }
    exit(1);
}

fn main() {
    let cli = Cli::parse();
    match &cli.command {
        Commands::Run(args) => {
            let (name, script) = read_source(&args.path);
            let mut engine = ScriptEngine::default();
            if let Err(e) = engine.run_script(&name, &script) {
                handle_script_err(e);
            }
        }
        Commands::Check(args) => {
            let (name, script) = read_source(&args.path);
            let mut engine = ScriptEngine::default();
            match engine.compile_script(&name, &script) {
                Ok(module) => {
                    if args.ast {
                        println!("{module:#?}");
                    } else {
                        println!("{name}: syntax OK, {} function(s)", module.functions.len());
                    }
                }
                Err(e) => handle_script_err(e),
            }
        }
    }
}
