//! Stylist CLI - restyle the outfit in a photo

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use serde_json::json;
use stylist_core::config::Config;
use stylist_core::error::Error;
use stylist_core::session::{EXAMPLE_PROMPTS, Session};
use stylist_core::styling::{SourceImage, StyleClient, StyledImage, save_styled_image};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "stylist")]
#[command(author, version, about = "Restyle the outfit in a photo with AI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Clone, Copy, Default, PartialEq, Eq, Debug, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Redraw the person in a photo wearing a new outfit
    Style {
        /// Source photo (PNG, JPEG or WEBP)
        image: PathBuf,
        /// Outfit description
        #[arg(short, long)]
        prompt: String,
        /// Directory to save into (defaults to output.directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Print the result as a data URI instead of saving it
        #[arg(long)]
        data_uri: bool,
    },

    /// List example outfit prompts
    Prompts,

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Run health check
    Doctor,

    /// Open the interactive stylist
    Ui,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Get a configuration value
    Get { key: String },
    /// Set a configuration value
    Set { key: String, value: String },
    /// List all configuration values
    List,
    /// Reset configuration to defaults
    Reset,
    /// Show config file path
    Path,
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let format = cli.format;

    if let Err(e) = init_tracing(cli.quiet) {
        eprintln!("Failed to initialise logging: {}", e);
    }

    if let Err(err) = run(cli).await {
        report_error(&err, format);
        std::process::exit(1);
    }
}

fn init_tracing(quiet: bool) -> anyhow::Result<()> {
    let level = if quiet { "warn" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(format!("stylist={}", level).parse()?),
        )
        .init();
    Ok(())
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Style {
            image,
            prompt,
            output,
            data_uri,
        } => {
            cmd_style(
                &image,
                &prompt,
                output.as_deref(),
                data_uri,
                cli.format,
                cli.quiet,
            )
            .await
        }

        Commands::Prompts => cmd_prompts(cli.format),

        Commands::Config { action } => cmd_config(action, cli.format, cli.quiet),

        Commands::Doctor => cmd_doctor(cli.format, cli.quiet),

        Commands::Ui => cmd_ui(cli.quiet),
    }
}

/// Print an error with its code and suggestion, if it has one
fn report_error(err: &anyhow::Error, format: OutputFormat) {
    let core = err.downcast_ref::<Error>();

    if format == OutputFormat::Json {
        let body = match core {
            Some(e) => json!({
                "error": { "code": e.code(), "message": e.to_string(), "suggestion": e.suggestion() }
            }),
            None => json!({ "error": { "message": format!("{:#}", err) } }),
        };
        println!("{}", body);
        return;
    }

    match core {
        Some(e) => {
            eprintln!("Error [{}]: {}", e.code(), e);
            if let Some(suggestion) = e.suggestion() {
                eprintln!("  Suggestion: {}", suggestion);
            }
        }
        None => eprintln!("Error: {:#}", err),
    }
}

// ============================================================================
// Command Implementations
// ============================================================================

async fn cmd_style(
    image: &Path,
    prompt: &str,
    output: Option<&Path>,
    data_uri: bool,
    format: OutputFormat,
    quiet: bool,
) -> anyhow::Result<()> {
    let config = Config::load()?;
    let client = StyleClient::from_config(&config.api)?;

    let source = SourceImage::from_path(image, config.upload.max_bytes).await?;

    let mut session = Session::new();
    session.select_image(source)?;
    session.set_prompt(prompt)?;
    let attempt = session.begin_generation()?;

    if !quiet && format == OutputFormat::Text {
        println!("Styling {}...", image.display());
    }

    let styled = client
        .generate_styled_image(&attempt.image, &attempt.prompt)
        .await?;

    if data_uri {
        print_data_uri(&styled, format);
        return Ok(());
    }

    let dir = output.unwrap_or(config.output.directory.as_path());
    let path = save_styled_image(&styled, dir, &config.output.file_stem)?;
    info!(path = %path.display(), "Saved styled image");

    match format {
        OutputFormat::Json => println!(
            "{}",
            json!({ "path": path.display().to_string(), "mime_type": styled.mime_type })
        ),
        OutputFormat::Text => {
            if quiet {
                println!("{}", path.display());
            } else {
                println!("Saved styled image to {}", path.display());
            }
        }
    }
    Ok(())
}

fn print_data_uri(styled: &StyledImage, format: OutputFormat) {
    match format {
        OutputFormat::Json => println!(
            "{}",
            json!({ "mime_type": styled.mime_type, "data_uri": styled.to_data_uri() })
        ),
        OutputFormat::Text => println!("{}", styled.to_data_uri()),
    }
}

fn cmd_prompts(format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", json!(EXAMPLE_PROMPTS)),
        OutputFormat::Text => {
            for (i, prompt) in EXAMPLE_PROMPTS.iter().enumerate() {
                println!("{}. {}", i + 1, prompt);
            }
        }
    }
    Ok(())
}

fn cmd_config(action: ConfigAction, format: OutputFormat, quiet: bool) -> anyhow::Result<()> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            let value = config.get(&key)?;
            match format {
                OutputFormat::Json => println!("{}", json!({ "key": key, "value": value })),
                OutputFormat::Text => println!("{}", value),
            }
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            config.save()?;
            if !quiet {
                println!("Set {} = {}", key, value);
            }
        }
        ConfigAction::List => {
            let config = Config::load()?;
            let items = config.list()?;
            match format {
                OutputFormat::Json => {
                    let map: serde_json::Map<String, serde_json::Value> = items
                        .into_iter()
                        .map(|(key, value)| (key, serde_json::Value::String(value)))
                        .collect();
                    println!("{}", serde_json::Value::Object(map));
                }
                OutputFormat::Text => {
                    for (key, value) in items {
                        println!("{} = {}", key, value);
                    }
                }
            }
        }
        ConfigAction::Reset => {
            Config::reset()?;
            if !quiet {
                println!("Configuration reset to defaults.");
            }
        }
        ConfigAction::Path => {
            let path = Config::config_path()?;
            println!("{}", path.display());
        }
    }
    Ok(())
}

fn cmd_doctor(format: OutputFormat, quiet: bool) -> anyhow::Result<()> {
    let mut checks: Vec<(bool, String)> = Vec::new();

    match Config::load() {
        Ok(config) => {
            checks.push((true, "Configuration: Valid".to_string()));
            checks.push((true, format!("Model: {}", config.api.model)));

            match config.api.redacted_api_key() {
                Ok(Some(redacted)) => {
                    checks.push((true, format!("API Key: Configured ({})", redacted)));
                }
                Ok(None) => {
                    warn!("API Key: Not configured");
                    checks.push((
                        false,
                        "API Key: Not configured. Set STYLIST_API_KEY or GEMINI_API_KEY".to_string(),
                    ));
                }
                Err(e) => checks.push((false, format!("API Key: Error - {}", e))),
            }

            let dir = &config.output.directory;
            if dir.is_dir() || !dir.exists() {
                checks.push((true, format!("Output directory: {}", dir.display())));
            } else {
                checks.push((
                    false,
                    format!("Output directory: {} is not a directory", dir.display()),
                ));
            }
        }
        Err(e) => checks.push((false, format!("Configuration: Error - {:#}", e))),
    }

    match Config::config_path() {
        Ok(path) if path.exists() => {
            checks.push((true, format!("Config file: {}", path.display())));
        }
        Ok(path) => {
            checks.push((true, format!("Config file: {} (using defaults)", path.display())));
        }
        Err(e) => checks.push((false, format!("Config file: Error - {}", e))),
    }

    let all_ok = checks.iter().all(|(ok, _)| *ok);

    if format == OutputFormat::Json {
        let items: Vec<_> = checks
            .iter()
            .map(|(ok, message)| json!({ "ok": ok, "message": message }))
            .collect();
        println!("{}", json!({ "ok": all_ok, "checks": items }));
        return Ok(());
    }

    if quiet {
        return Ok(());
    }

    println!("Stylist Health Check");
    println!("====================");
    println!();
    for (ok, message) in &checks {
        println!("{} {}", if *ok { "[OK]" } else { "[!!]" }, message);
    }
    println!();
    if all_ok {
        println!("All checks passed!");
    } else {
        println!("Some checks failed. See above for details.");
    }

    Ok(())
}

fn cmd_ui(quiet: bool) -> anyhow::Result<()> {
    if !quiet {
        info!("Starting interactive stylist...");
    }

    let result = std::process::Command::new("stylist-tui").status();

    match result {
        Ok(status) if status.success() => Ok(()),
        Ok(_) => {
            if !quiet {
                println!("The interactive stylist exited with an error.");
            }
            Ok(())
        }
        Err(_) => {
            if !quiet {
                println!("Could not start the interactive stylist.");
                println!();
                println!("The binary 'stylist-tui' is not in your PATH.");
                println!("Either:");
                println!("  1. Add the target/debug or target/release directory to PATH");
                println!("  2. Run `cargo run --bin stylist-tui` from the project root");
                println!("  3. Install with `cargo install --path crates/stylist-tui`");
            }
            Ok(())
        }
    }
}
