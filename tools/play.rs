/// Play — runs a dialogue script in the terminal.
///
/// Usage: play <script.txt> [--config <config.ron>] [--program <program.ron>]
///             [--tick-ms <n>] [--auto] [--seed <n>] [--max-steps <n>]
///
/// Controls:
///   <enter>   — next line
///   s         — skip
///   1..3      — pick a menu choice
///   q         — quit
///
/// With --auto the script plays itself, picking menu choices at random
/// from the given seed and firing timers without sleeping.

use dialogue_engine::core::engine::{Engine, EngineState, Event};
use dialogue_engine::core::host::{
    EffectSink, MenuPrompt, Navigation, Presentation, TimerService, TimerToken, TransitionSink,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io::{self, BufRead, Write};
use std::time::Duration;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        print_usage();
        return;
    }

    let mut script_path = None;
    let mut program_path = None;
    let mut config_path = None;
    let mut tick_ms: u64 = 500;
    let mut auto = false;
    let mut seed: u64 = 42;
    let mut max_steps: usize = 1000;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" if i + 1 < args.len() => {
                i += 1;
                config_path = Some(args[i].clone());
            }
            "--program" if i + 1 < args.len() => {
                i += 1;
                program_path = Some(args[i].clone());
            }
            "--tick-ms" if i + 1 < args.len() => {
                i += 1;
                tick_ms = args[i].parse().unwrap_or(500);
            }
            "--seed" if i + 1 < args.len() => {
                i += 1;
                seed = args[i].parse().unwrap_or(42);
            }
            "--max-steps" if i + 1 < args.len() => {
                i += 1;
                max_steps = args[i].parse().unwrap_or(1000);
            }
            "--auto" => auto = true,
            other if !other.starts_with("--") && script_path.is_none() => {
                script_path = Some(other.to_string());
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let mut builder = Engine::builder();
    if let Some(ref path) = script_path {
        builder = builder.script_file(path);
    }
    if let Some(ref path) = program_path {
        builder = builder.program_file(path);
    }
    if let Some(ref path) = config_path {
        builder = builder.config_file(path);
    }

    let mut engine = match builder.build() {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            std::process::exit(1);
        }
    };

    println!(
        "Loaded {} blocks, {} lines",
        engine.program().len(),
        engine.program().line_count()
    );

    let mut host = TerminalHost::default();
    if auto {
        host.tick = Duration::ZERO;
        run_auto(&mut engine, &mut host, seed, max_steps);
    } else {
        host.tick = Duration::from_millis(tick_ms);
        run_interactive(&mut engine, &mut host);
    }
    engine.end_session(&mut host);
}

fn print_usage() {
    println!("Usage: play <script.txt> [--config <config.ron>] [--program <program.ron>]");
    println!("            [--tick-ms <n>] [--auto] [--seed <n>] [--max-steps <n>]");
}

fn run_interactive(engine: &mut Engine, host: &mut TerminalHost) {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    println!("<enter> next, s skip, 1-3 choose, q quit\n");

    loop {
        fire_timers(engine, host);
        if finished(engine.state()) {
            break;
        }

        print!("> ");
        let _ = stdout.flush();

        let mut input = String::new();
        match stdin.lock().read_line(&mut input) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                eprintln!("Read error: {}", e);
                break;
            }
        }

        let event = match input.trim() {
            "" => Event::Advance,
            "s" | "skip" => Event::Skip,
            "q" | "quit" | "exit" => break,
            other => match other.parse::<usize>() {
                Ok(n) if n >= 1 => Event::Choose(n - 1),
                _ => {
                    println!("Unknown input: {}", other);
                    continue;
                }
            },
        };

        if let Err(e) = engine.handle(event, host) {
            println!("ERROR: {}", e);
        }
    }

    println!("\n[session ended in state {:?}]", engine.state());
}

fn run_auto(engine: &mut Engine, host: &mut TerminalHost, seed: u64, max_steps: usize) {
    let mut rng = StdRng::seed_from_u64(seed);

    for _ in 0..max_steps {
        let before = engine.cursor();
        let event = match engine.state() {
            EngineState::Presenting => Event::Advance,
            EngineState::AwaitingChoice => {
                let slot = rng.gen_range(0..engine.menu().len());
                println!("> {}", slot + 1);
                Event::Choose(slot)
            }
            EngineState::AwaitingTimer => match host.pending.take() {
                Some((_, token)) => Event::TimerElapsed(token),
                None => break,
            },
            _ => break,
        };

        if let Err(e) = engine.handle(event, host) {
            println!("ERROR: {}", e);
            // A non-fatal error leaves the cursor in place; retrying repeats it.
            if e.is_fatal() || engine.cursor() == before {
                break;
            }
        }
    }

    println!("\n[session ended in state {:?}]", engine.state());
}

fn fire_timers(engine: &mut Engine, host: &mut TerminalHost) {
    while let Some((units, token)) = host.pending.take() {
        std::thread::sleep(host.tick.saturating_mul(u32::try_from(units).unwrap_or(u32::MAX)));
        if let Err(e) = engine.handle(Event::TimerElapsed(token), host) {
            println!("ERROR: {}", e);
        }
    }
}

fn finished(state: EngineState) -> bool {
    matches!(
        state,
        EngineState::Idle | EngineState::Exiting | EngineState::Halted
    )
}

/// Prints everything to stdout. Lines appear whole, so there is never a
/// reveal in progress to skip.
#[derive(Default)]
struct TerminalHost {
    tick: Duration,
    pending: Option<(u64, TimerToken)>,
}

impl Presentation for TerminalHost {
    fn show_line(&mut self, speaker: &str, content: &str, narrator: bool) {
        if narrator {
            println!("    {}", content);
        } else {
            println!("{}: {}", speaker, content);
        }
    }

    fn show_menu(&mut self, prompt: &MenuPrompt) {
        println!();
        for choice in &prompt.choices {
            println!("  [{}] {}", choice.slot + 1, choice.label);
        }
    }

    fn hide_menu(&mut self) {
        println!();
    }
}

impl EffectSink for TerminalHost {
    fn play_effect(&mut self, name: &str) {
        println!("  ~ sound: {}", name);
    }

    fn play_music(&mut self, name: Option<&str>) {
        match name {
            Some(name) => println!("  ~ music: {}", name),
            None => println!("  ~ music stops"),
        }
    }

    fn set_background(&mut self, name: &str) {
        println!("  ~ background: {}", name);
    }

    fn set_images(&mut self, spec: &str) {
        println!("  ~ images: {}", spec);
    }
}

impl TransitionSink for TerminalHost {
    fn fade_in(&mut self) {
        println!("  ~ fade in");
    }

    fn fade_out(&mut self) {
        println!("  ~ fade out");
    }

    fn blackout(&mut self) {
        println!("  ~ blackout");
    }

    fn clear_out(&mut self) {
        println!("  ~ clear");
    }

    fn set_hud_visible(&mut self, visible: bool) {
        println!("  ~ hud {}", if visible { "shown" } else { "hidden" });
    }
}

impl Navigation for TerminalHost {
    fn exit_to_menu(&mut self) {
        println!("\n[back to main menu]");
    }
}

impl TimerService for TerminalHost {
    fn schedule(&mut self, units: u64, token: TimerToken) {
        self.pending = Some((units, token));
    }

    fn cancel(&mut self, token: TimerToken) {
        if self.pending.map(|(_, t)| t) == Some(token) {
            self.pending = None;
        }
    }
}
