/// Script Compiler — parses a dialogue script and writes the program as RON.
///
/// Usage: script_compiler --input <script.txt> --output <program.ron> [--config <config.ron>]
use dialogue_engine::core::config::EngineConfig;
use dialogue_engine::core::parser::parse_script_with;
use std::env;
use std::path::Path;
use std::process;

const USAGE: &str =
    "Usage: script_compiler --input <script.txt> --output <program.ron> [--config <config.ron>]";

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    let mut input = None;
    let mut output = None;
    let mut config_path = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--input" if i + 1 < args.len() => {
                i += 1;
                input = Some(args[i].clone());
            }
            "--output" if i + 1 < args.len() => {
                i += 1;
                output = Some(args[i].clone());
            }
            "--config" if i + 1 < args.len() => {
                i += 1;
                config_path = Some(args[i].clone());
            }
            "--help" | "-h" => {
                println!("{}", USAGE);
                process::exit(0);
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                eprintln!("{}", USAGE);
                process::exit(1);
            }
        }
        i += 1;
    }

    let input_path = input.unwrap_or_else(|| {
        eprintln!("Error: --input is required");
        eprintln!("{}", USAGE);
        process::exit(1);
    });

    let output_path = output.unwrap_or_else(|| {
        eprintln!("Error: --output is required");
        eprintln!("{}", USAGE);
        process::exit(1);
    });

    let config = match config_path {
        Some(path) => EngineConfig::load_from_ron(Path::new(&path)).unwrap_or_else(|e| {
            eprintln!("Error loading config '{}': {}", path, e);
            process::exit(1);
        }),
        None => EngineConfig::default(),
    };

    let text = std::fs::read_to_string(&input_path).unwrap_or_else(|e| {
        eprintln!("Error reading input file '{}': {}", input_path, e);
        process::exit(1);
    });

    println!("Compiling '{}'...", input_path);
    let program = parse_script_with(&text, config.parse_options()).unwrap_or_else(|e| {
        eprintln!("{}: {}", input_path, e);
        process::exit(1);
    });

    println!(
        "Parsed {} blocks, {} lines",
        program.len(),
        program.line_count()
    );

    program
        .save_to_ron(Path::new(&output_path))
        .unwrap_or_else(|e| {
            eprintln!("Error saving program to '{}': {}", output_path, e);
            process::exit(1);
        });

    println!("Program saved to '{}'", output_path);
}
