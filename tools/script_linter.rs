/// Script Linter — checks a dialogue script for problems the engine would
/// only hit at runtime.
///
/// Usage: script_linter <script.txt> [--config <config.ron>]
use dialogue_engine::core::branch;
use dialogue_engine::core::command::CommandTable;
use dialogue_engine::core::config::EngineConfig;
use dialogue_engine::core::parser::parse_script_with;
use dialogue_engine::schema::branch::{BranchSpec, JumpTarget, MAX_MENU_OPTIONS};
use dialogue_engine::schema::line::Line;
use dialogue_engine::schema::program::Program;
use std::path::Path;
use std::process;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("error")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        println!("Usage: script_linter <script.txt> [--config <config.ron>]");
        process::exit(0);
    }

    let script_path = &args[1];
    let mut config_path = None;

    let mut i = 2;
    while i < args.len() {
        if args[i] == "--config" && i + 1 < args.len() {
            i += 1;
            config_path = Some(args[i].clone());
        }
        i += 1;
    }

    let config = match config_path {
        Some(ref path) => match EngineConfig::load_from_ron(Path::new(path)) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("ERROR: Failed to load config: {}", e);
                process::exit(1);
            }
        },
        None => EngineConfig::default(),
    };

    let commands = match CommandTable::with_aliases(&config.command_aliases) {
        Ok(commands) => commands,
        Err(e) => {
            eprintln!("ERROR: Bad alias table: {}", e);
            process::exit(1);
        }
    };

    let text = match std::fs::read_to_string(script_path) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("ERROR: Cannot read '{}': {}", script_path, e);
            process::exit(1);
        }
    };

    let program = match parse_script_with(&text, config.parse_options()) {
        Ok(program) => program,
        Err(e) => {
            println!("ERROR: {}", e);
            println!("\nSummary: 1 errors, 0 warnings");
            process::exit(1);
        }
    };

    println!(
        "Loaded {} blocks, {} lines",
        program.len(),
        program.line_count()
    );

    let (errors, warnings) = lint_program(&program, &commands);

    println!("\n=== Script Lint Report ===\n");

    if errors.is_empty() && warnings.is_empty() {
        println!("All checks passed!");
    }

    for warning in &warnings {
        println!("WARNING: {}", warning);
    }

    for error in &errors {
        println!("ERROR: {}", error);
    }

    println!(
        "\nSummary: {} errors, {} warnings",
        errors.len(),
        warnings.len()
    );

    if errors.is_empty() {
        process::exit(0);
    } else {
        process::exit(1);
    }
}

fn lint_program(program: &Program, commands: &CommandTable) -> (Vec<String>, Vec<String>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    // Block 0 is always reachable.
    let mut reachable = vec![false; program.len()];
    if let Some(first) = reachable.first_mut() {
        *first = true;
    }

    for (index, block) in program.blocks.iter().enumerate() {
        if block.is_empty() {
            warnings.push(format!("Block {} has no lines", index));
        }

        for (line_index, line) in block.lines.iter().enumerate() {
            if let Line::Command { name, argument } = line {
                if let Err(e) = commands.resolve(name, argument) {
                    errors.push(format!("Block {} line {}: {}", index, line_index, e));
                }
            }
        }

        let spec = match branch::resolve(&block.branch_spec) {
            Ok(spec) => spec,
            Err(e) => {
                errors.push(format!("Block {}: {}", index, e));
                continue;
            }
        };

        let targets: Vec<JumpTarget> = match spec {
            BranchSpec::Empty => Vec::new(),
            BranchSpec::DirectJump(target) => vec![target],
            BranchSpec::Menu(options) => {
                let written = block
                    .branch_spec
                    .split(';')
                    .filter(|s| !s.trim().is_empty())
                    .count();
                if written > MAX_MENU_OPTIONS {
                    warnings.push(format!(
                        "Block {} offers {} choices; only the first {} are shown",
                        index, written, MAX_MENU_OPTIONS
                    ));
                }
                options.into_iter().map(|option| option.target).collect()
            }
        };

        for target in targets {
            if let JumpTarget::Block(target) = target {
                match reachable.get_mut(target) {
                    Some(seen) => *seen = true,
                    None => errors.push(format!(
                        "Block {} jumps to block {}, but the script has {} blocks",
                        index,
                        target,
                        program.len()
                    )),
                }
            }
        }
    }

    for (index, seen) in reachable.iter().enumerate() {
        if !seen {
            warnings.push(format!("Block {} is never the target of a branch", index));
        }
    }

    (errors, warnings)
}
