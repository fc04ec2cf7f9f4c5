use std::fs;
use std::path::{Path, PathBuf};

use abi_descriptor::args::parse_arg;
use abi_descriptor::artifact;
use abi_descriptor::{Descriptor, Entry, Function, Param};
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use tracing::{debug, warn};
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "abi-descriptor")]
#[command(about = "Inspect and use Solidity contract interface descriptors")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the entries of a descriptor file, or of every descriptor under a directory
    Inspect {
        /// ABI file, compiler artifact, or directory of them
        path: PathBuf,

        /// Contract to pick from solc --combined-json output
        #[arg(short, long)]
        contract: Option<String>,

        /// Print the validated descriptor as JSON
        #[arg(long)]
        json: bool,
    },

    /// Encode call data for one function
    Encode {
        /// ABI file or compiler artifact
        path: PathBuf,

        /// Function name, or full signature when the name is overloaded
        function: String,

        /// Arguments in declaration order
        args: Vec<String>,

        /// Contract to pick from solc --combined-json output
        #[arg(short, long)]
        contract: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Inspect { path, contract, json } => {
            if path.is_dir() {
                inspect_directory(&path, json)
            } else if path.is_file() {
                let descriptor = load_descriptor(&path, contract.as_deref())?;
                print_descriptor(&path, &descriptor, json)
            } else {
                bail!("Input path does not exist: {}", path.display());
            }
        }
        Command::Encode {
            path,
            function,
            args,
            contract,
        } => {
            let descriptor = load_descriptor(&path, contract.as_deref())?;
            let call_data = encode_call(&descriptor, &function, &args)?;
            println!("0x{}", hex::encode(call_data));
            Ok(())
        }
    }
}

fn load_descriptor(path: &Path, contract: Option<&str>) -> Result<Descriptor> {
    let descriptor = match contract {
        Some(name) => {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let output: serde_json::Value = serde_json::from_str(&content)
                .context("Failed to parse solc JSON output")?;
            let abi = artifact::extract_contract_abi(output, name)
                .with_context(|| format!("Contract {} not found in {}", name, path.display()))?;
            Descriptor::from_value(abi)?
        }
        None => Descriptor::from_path(path)
            .with_context(|| format!("Failed to load descriptor {}", path.display()))?,
    };
    Ok(descriptor)
}

fn inspect_directory(dir_path: &Path, json: bool) -> Result<()> {
    let mut loaded = 0;
    let mut failed = 0;

    let files = WalkDir::new(dir_path)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            matches!(
                entry.path().extension().and_then(|ext| ext.to_str()),
                Some("json") | Some("abi")
            )
        });

    for entry in files {
        match Descriptor::from_path(entry.path()) {
            Ok(descriptor) => {
                print_descriptor(entry.path(), &descriptor, json)?;
                loaded += 1;
            }
            Err(e) => {
                warn!("Failed to load {}: {}", entry.path().display(), e);
                failed += 1;
            }
        }
    }

    debug!("Scanned {}: {} loaded, {} failed", dir_path.display(), loaded, failed);
    if failed > 0 {
        bail!("{} of {} descriptors failed to load", failed, loaded + failed);
    }
    Ok(())
}

fn print_descriptor(path: &Path, descriptor: &Descriptor, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(descriptor)?);
        return Ok(());
    }

    println!("{} {}", "➤".yellow(), path.display().to_string().bold());
    for entry in descriptor.entries() {
        match entry {
            Entry::Constructor(constructor) => {
                println!(
                    "  {} constructor({}) {}",
                    "ctor ".dimmed(),
                    format_params(&constructor.inputs),
                    constructor.state_mutability
                );
            }
            Entry::Function(function) => {
                let outputs = if function.outputs.is_empty() {
                    String::new()
                } else {
                    format!(" returns ({})", format_params(&function.outputs))
                };
                println!(
                    "  {} {}({}) {}{}",
                    function.selector_hex().cyan(),
                    function.name.bold(),
                    format_params(&function.inputs),
                    function.state_mutability,
                    outputs
                );
            }
            Entry::Event(event) => {
                let anonymous = if event.anonymous { " anonymous" } else { "" };
                println!(
                    "  {} {}({}){}",
                    "event".magenta(),
                    event.name.bold(),
                    format_params(&event.inputs),
                    anonymous
                );
                println!("        {} {}", "topic".dimmed(), event.topic_hex());
            }
        }
    }
    Ok(())
}

fn format_params(params: &[Param]) -> String {
    params
        .iter()
        .map(|param| {
            let indexed = if param.indexed { " indexed" } else { "" };
            if param.name.is_empty() {
                format!("{}{}", param.kind, indexed)
            } else {
                format!("{}{} {}", param.kind, indexed, param.name)
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn resolve_function<'a>(descriptor: &'a Descriptor, function: &str) -> Result<&'a Function> {
    if function.contains('(') {
        return descriptor
            .function_by_signature(function)
            .with_context(|| format!("No function with signature {}", function));
    }

    match descriptor.find_function(function).as_slice() {
        [] => bail!("No function named {}", function),
        [only] => Ok(*only),
        overloads => {
            let signatures: Vec<String> = overloads.iter().map(|f| f.signature()).collect();
            bail!(
                "{} is overloaded, pass one of: {}",
                function,
                signatures.join(", ")
            )
        }
    }
}

fn encode_call(descriptor: &Descriptor, function: &str, args: &[String]) -> Result<Vec<u8>> {
    let function = resolve_function(descriptor, function)?;

    if args.len() != function.inputs.len() {
        bail!(
            "{} takes {} argument(s), got {}",
            function.signature(),
            function.inputs.len(),
            args.len()
        );
    }

    let tokens = function
        .inputs
        .iter()
        .zip(args)
        .map(|(param, arg)| {
            parse_arg(&param.kind, arg)
                .with_context(|| format!("Invalid value for {} ({})", param.display_name(), param.kind))
        })
        .collect::<Result<Vec<_>>>()?;

    debug!("Encoding {} with {} argument(s)", function.signature(), tokens.len());
    Ok(function.encode_call(&tokens)?)
}
