use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use rustyline::Editor;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use tracing_subscriber::EnvFilter;

use tapride_infrastructure::{ConfigService, open_key_value_store};

mod app;
mod commands;
mod helper;
mod terminal_map;

use app::{App, OUTING_PROMPT, Output};
use commands::Command;
use helper::CliHelper;

#[derive(Parser)]
#[command(name = "tapride")]
#[command(about = "tapride - tap the map to reserve a ride (demo, nothing is dispatched)", long_about = None)]
struct Cli {
    /// Config file (defaults to ~/.config/tapride/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory for persisted state, overriding the config file
    #[arg(long)]
    store_dir: Option<PathBuf>,

    /// Log filter, e.g. "debug" or "tapride=trace" (RUST_LOG wins when set)
    #[arg(long)]
    log_level: Option<String>,
}

fn init_tracing(log_level: Option<&str>) {
    let fallback = log_level.unwrap_or("tapride=info,tapride_core=info,tapride_infrastructure=info");
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn print_output(output: &Output) {
    match output {
        Output::Info(line) => println!("{}", line.bright_blue()),
        Output::Success(line) => println!("{}", line.green()),
        Output::Warning(line) => println!("{}", line.yellow()),
    }
}

fn print_outing_prompt() {
    println!();
    println!("{}", OUTING_PROMPT.bright_yellow());
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref());

    // ===== Backend Initialization =====
    let config_service = match cli.config {
        Some(path) => ConfigService::with_path(path),
        None => ConfigService::new(),
    };
    let mut config = config_service.get_config();
    if let Some(dir) = cli.store_dir {
        config.storage.dir = Some(dir);
    }

    let storage = open_key_value_store(&config.storage);
    let app = App::new(&config, storage).context("Failed to initialize the map")?;
    tracing::debug!(geolocation = config.geolocation.enabled, "Map ready");
    // Fire and forget: the view is usable before the location arrives.
    let _recenter = app.start();

    // ===== REPL Setup =====
    let mut rl: Editor<CliHelper, DefaultHistory> =
        Editor::new().context("Failed to start the line editor")?;
    rl.set_helper(Some(CliHelper::new()));

    println!("{}", "=== tapride ===".bright_magenta().bold());
    println!(
        "{}",
        "Tap the map with '/tap <lat> <lng>', then /pickup, /dropoff and /confirm. '/help' lists everything."
            .bright_black()
    );
    println!(
        "{}",
        "Demo only: no real vehicle is dispatched.".bright_black()
    );

    if app.is_outing_prompt_open() {
        print_outing_prompt();
    }

    // ===== Main REPL Loop =====
    loop {
        let prompt = if app.is_outing_prompt_open() {
            "[y/n] ".to_string()
        } else {
            format!("({}) >> ", app.tap_hint())
        };

        match rl.readline(&prompt) {
            Ok(line) => {
                let trimmed = line.trim();

                if app.is_outing_prompt_open() {
                    print_output(&app.answer_outing_prompt(trimmed));
                    continue;
                }

                if trimmed.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(trimmed);

                let command = match trimmed.parse::<Command>() {
                    Ok(command) => command,
                    Err(message) => {
                        println!("{}", message.red());
                        continue;
                    }
                };
                if matches!(command, Command::Quit) {
                    println!("{}", "Goodbye!".bright_green());
                    break;
                }

                for output in app.execute(command) {
                    print_output(&output);
                }
                if app.is_outing_prompt_open() {
                    print_outing_prompt();
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                println!("{}", "Goodbye!".bright_green());
                break;
            }
            Err(err) => {
                eprintln!("{}", format!("Error: {:?}", err).red());
                break;
            }
        }
    }

    Ok(())
}
