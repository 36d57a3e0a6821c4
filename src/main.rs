//! poppi_calc: keypad calculator and plain-English math assistant.
//!
//! Usage:
//!   poppi_calc                     interactive assistant (same as `chat`)
//!   poppi_calc ask what's 20% of 500
//!   poppi_calc calc "(2 + 3) × 4"
//!   poppi_calc keys "12+7="        replay keypad presses
//!   poppi_calc trick
//!   poppi_calc explain convert 45°F to celsius
//!   poppi_calc history [list|clear]

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Local, Utc};
use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};
use tracing::warn;

use poppi_calc::calculator::{Calculator, Key};
use poppi_calc::config::Config;
use poppi_calc::format::format_number;
use poppi_calc::history::{HistorySink, HistoryStore, NoHistory};
use poppi_calc::suggest::UsageTracker;
use poppi_calc::{evaluate_expression, explain_last_calculation, interpret_query, random_math_trick, Response};

const GREETING: &str = "👋 Hi! I'm your math assistant. Ask me anything like:\n\
                        • What's 20% of 4500?\n\
                        • Convert 45°F to Celsius\n\
                        • What's the square root of 289?\n\
                        Commands: /trick, /explain, /history, /quit";

#[derive(Parser)]
#[command(
    name = "poppi_calc",
    version,
    about = "Keypad calculator with a plain-English math assistant"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive assistant session
    Chat,

    /// Answer a single question
    Ask {
        #[arg(required = true, num_args = 1.., allow_hyphen_values = true, trailing_var_arg = true)]
        query: Vec<String>,
    },

    /// Evaluate a keypad expression (digits, + - × ÷ * /, parentheses)
    Calc {
        #[arg(required = true, num_args = 1.., allow_hyphen_values = true, trailing_var_arg = true)]
        expression: Vec<String>,
    },

    /// Replay keypad presses: digits, operators, `=`, `C`, `<`, `[sqrt]`
    Keys {
        sequence: String,
    },

    /// Teach me something cool
    Trick,

    /// Show how a question is answered
    Explain {
        #[arg(required = true, num_args = 1.., allow_hyphen_values = true, trailing_var_arg = true)]
        query: Vec<String>,
    },

    /// Show or clear the calculation history
    History {
        #[command(subcommand)]
        action: Option<HistoryCommands>,
    },
}

#[derive(Subcommand)]
enum HistoryCommands {
    /// List recorded calculations
    List,
    /// Delete all recorded calculations
    Clear,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .init();

    let config = Config::load().unwrap_or_else(|e| {
        warn!(error = %e, "Falling back to default configuration");
        Config::default()
    });

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Ask { query }) => cmd_ask(&config, &query.join(" "))?,
        Some(Commands::Calc { expression }) => cmd_calc(&config, &expression.join(" "))?,
        Some(Commands::Keys { sequence }) => cmd_keys(&config, &sequence)?,
        Some(Commands::Trick) => print_trick(),
        Some(Commands::Explain { query }) => cmd_explain(&query.join(" ")),
        Some(Commands::History { action }) => cmd_history(&config, action)?,
        Some(Commands::Chat) | None => cmd_chat(&config)?,
    }

    Ok(())
}

// ── Shared helpers ──────────────────────────────────────────────────

fn open_history(config: &Config) -> Option<HistoryStore> {
    config
        .history
        .enabled
        .then(|| HistoryStore::open(HistoryStore::default_path(), config.history.max_entries))
}

fn ensure_assistant(config: &Config) -> Result<()> {
    if !config.assistant.enabled {
        bail!("The assistant is disabled in {}", Config::config_path().display());
    }
    Ok(())
}

fn ensure_calculator(config: &Config) -> Result<()> {
    if !config.calculator.enabled {
        bail!("The calculator is disabled in {}", Config::config_path().display());
    }
    Ok(())
}

fn print_response(config: &Config, response: &Response) {
    if response.is_displayable() {
        println!("✅ {}", response.result);
        if config.assistant.show_explanations {
            if let Some(explanation) = &response.explanation {
                println!("\n📝 {}", explanation);
            }
            if let Some(formula) = &response.formula {
                println!("\n🧮 {}", formula);
            }
        }
    } else if response.success {
        println!("❌ Error: that calculation has no finite result");
    } else {
        println!(
            "❌ {}\n\nTry asking something like:\n• \"What's 15% of 200?\"\n• \"Convert 100°C to Fahrenheit\"\n• \"Square root of 144\"",
            response.result
        );
    }
}

fn print_trick() {
    let trick = random_math_trick();
    println!("💡 {}\n\n{}", trick.title, trick.content);
}

fn print_history(history: &HistoryStore) {
    if history.is_empty() {
        println!("No calculations yet");
        return;
    }

    for entry in history.entries().iter().rev() {
        let time = DateTime::<Utc>::from_timestamp_millis(entry.timestamp)
            .map(|t| t.with_timezone(&Local).format("%H:%M:%S").to_string())
            .unwrap_or_default();
        println!("{}\n  = {}    {}", entry.expression, entry.result, time);
    }

    let n = history.len();
    println!("\n{} calculation{}", n, if n == 1 { "" } else { "s" });
}

fn save_history(history: &HistoryStore) {
    if let Err(e) = history.save() {
        warn!(path = %history.path().display(), error = %e, "Could not save history");
    }
}

// ── Commands ────────────────────────────────────────────────────────

fn cmd_ask(config: &Config, query: &str) -> Result<()> {
    ensure_assistant(config)?;

    let response = interpret_query(query);
    print_response(config, &response);

    if let (Some(mut history), Some((expression, result))) = (open_history(config), response.history_record()) {
        history.record(&expression, &result);
        save_history(&history);
    }
    Ok(())
}

fn cmd_calc(config: &Config, expression: &str) -> Result<()> {
    ensure_calculator(config)?;

    let value = evaluate_expression(expression).with_context(|| format!("Cannot evaluate '{}'", expression))?;
    if !value.is_finite() {
        bail!("'{}' has no finite result", expression);
    }

    let result = format_number(value);
    println!("{}", result);

    if let Some(mut history) = open_history(config) {
        history.record(expression, &result);
        save_history(&history);
    }
    Ok(())
}

fn cmd_keys(config: &Config, sequence: &str) -> Result<()> {
    ensure_calculator(config)?;

    let keys = Key::parse_sequence(sequence).with_context(|| format!("Cannot read key sequence '{}'", sequence))?;
    if !config.calculator.scientific && keys.iter().any(|k| matches!(k, Key::Function(_))) {
        bail!("Scientific keys are disabled in {}", Config::config_path().display());
    }

    let mut calc = Calculator::new();
    match open_history(config) {
        Some(mut history) => {
            keys.into_iter().for_each(|key| calc.press(key, &mut history));
            save_history(&history);
        }
        None => keys.into_iter().for_each(|key| calc.press(key, &mut NoHistory)),
    }

    if !calc.expression().is_empty() {
        println!("{}", calc.expression());
    }
    println!("{}", calc.display());
    Ok(())
}

fn cmd_explain(query: &str) {
    let response = interpret_query(query);
    println!("{}", explain_last_calculation(query, &response.result.to_string()));
}

fn cmd_history(config: &Config, action: Option<HistoryCommands>) -> Result<()> {
    let Some(mut history) = open_history(config) else {
        println!("History is disabled in {}", Config::config_path().display());
        return Ok(());
    };

    match action.unwrap_or(HistoryCommands::List) {
        HistoryCommands::List => print_history(&history),
        HistoryCommands::Clear => {
            history.clear().context("Failed to clear history")?;
            println!("History cleared");
        }
    }
    Ok(())
}

fn cmd_chat(config: &Config) -> Result<()> {
    ensure_assistant(config)?;

    let mut history = open_history(config);
    let mut usage = UsageTracker::new();
    let mut last: Option<(String, String)> = None;
    let mut shown: Vec<&'static str> = Vec::new();

    println!("{}", GREETING);

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("\n> ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        match input {
            "/quit" | "/exit" => break,
            "/trick" => {
                print_trick();
                continue;
            }
            "/explain" => {
                match &last {
                    Some((query, result)) => println!("{}", explain_last_calculation(query, result)),
                    None => println!("Nothing calculated yet."),
                }
                continue;
            }
            "/history" => {
                match &history {
                    Some(h) => print_history(h),
                    None => println!("History is disabled."),
                }
                continue;
            }
            _ => {}
        }

        usage.record(input);
        let response = interpret_query(input);
        print_response(config, &response);

        if response.success {
            last = Some((input.to_string(), response.result.to_string()));
        }
        if let (Some(h), Some((expression, result))) = (history.as_mut(), response.history_record()) {
            h.record(&expression, &result);
            save_history(h);
        }

        if config.assistant.suggestions {
            for suggestion in usage.suggestions() {
                if !shown.contains(&suggestion) {
                    println!("\n💡 {}", suggestion);
                    shown.push(suggestion);
                }
            }
        }
    }

    Ok(())
}
