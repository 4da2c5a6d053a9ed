//! # Picker Host Daemon
//!
//! Main entry point for the column picker host.

use pickerd::{HostConfig, PickerRuntime};
use std::env;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

fn main() {
    init_logging();

    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("pickerd");

    let config = parse_args(&args).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        print_usage(program);
        process::exit(1);
    });

    let mut runtime = PickerRuntime::new(config).unwrap_or_else(|e| {
        eprintln!("Failed to create runtime: {}", e);
        process::exit(1);
    });

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if let Err(e) = runtime.run(&mut out) {
        eprintln!("Runtime error: {}", e);
        process::exit(1);
    }
}

/// Logs go to stderr so stdout carries only frames
fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let console_layer = fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_writer(io::stderr);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .init();
}

fn parse_args(args: &[String]) -> Result<HostConfig, String> {
    let mut config = HostConfig::default();
    let mut i = 1;

    while i < args.len() {
        match args[i].as_str() {
            "--origin" | "-o" => {
                config.origin = value_for(args, &mut i, "--origin")?.to_string();
            }
            "--sandbox" => {
                config.sandbox = Some(PathBuf::from(value_for(args, &mut i, "--sandbox")?));
            }
            "--tree" | "-t" => {
                config.tree = Some(PathBuf::from(value_for(args, &mut i, "--tree")?));
            }
            "--settings" => {
                config.settings = Some(PathBuf::from(value_for(args, &mut i, "--settings")?));
            }
            "--script" | "-s" => {
                let script_path = value_for(args, &mut i, "--script")?;
                let script_text = fs::read_to_string(script_path)
                    .map_err(|e| format!("Failed to read script file: {}", e))?;
                config.script = Some(script_text);
            }
            "--json" => {
                config.json = true;
            }
            "--help" | "-h" => {
                print_usage(&args[0]);
                process::exit(0);
            }
            other => {
                return Err(format!("Unknown option: {}", other));
            }
        }
        i += 1;
    }

    Ok(config)
}

fn value_for<'a>(args: &'a [String], i: &mut usize, flag: &str) -> Result<&'a str, String> {
    *i += 1;
    args.get(*i)
        .map(String::as_str)
        .ok_or_else(|| format!("Missing value for {}", flag))
}

fn print_usage(program: &str) {
    eprintln!("Usage: {} [OPTIONS]", program);
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -o, --origin <ORIGIN>    Origin whose sandbox and settings are used (default: local)");
    eprintln!("  --sandbox <DIR>          Base directory holding one sandbox per origin");
    eprintln!("  -t, --tree <FILE>        Browse a JSON tree instead of a sandbox");
    eprintln!("  --settings <FILE>        Settings overrides document");
    eprintln!("  -s, --script <FILE>      Action script to replay");
    eprintln!("  --json                   Emit one JSON record per step");
    eprintln!("  -h, --help               Show this help message");
    eprintln!();
    eprintln!("Set RUST_LOG to change log verbosity (logs go to stderr).");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  {} --tree demos/project.json --script demos/drill_down.picker", program);
    eprintln!("  {} --sandbox /tmp/sandboxes --origin https://app.example --json", program);
}
