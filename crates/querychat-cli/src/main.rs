//! querychat CLI: Ask questions about uploaded tabular data

use clap::{Parser, Subcommand};
use querychat_engine::config::CONFIG_DIR;
use querychat_engine::{execute, ApiClient, Config, Controller, Request};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

/// Chat client for a natural-language query backend
#[derive(Parser)]
#[command(name = "querychat")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Backend base URL (overrides the config file and QUERYCHAT_URL)
    #[arg(long, global = true)]
    url: Option<String>,

    /// Config file (default: .querychat/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Write logs to this file instead of the default
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the chat TUI (default when no command specified)
    Tui,

    /// Send one question and print the transcript
    Ask {
        /// The question to send
        question: String,
    },

    /// Upload one file and print the transcript
    Upload {
        /// CSV or Excel file to upload
        file: PathBuf,
    },

    /// Write a default config to .querychat/config.json
    Init,

    /// Print the effective configuration
    Config {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Log file used by the TUI when `--log-file` is not given.
const DEFAULT_LOG_FILE: &str = "querychat.log";

/// Default filter when `RUST_LOG` is unset.
const DEFAULT_LOG_LEVEL: &str = "info";

fn main() {
    let cli = Cli::parse();

    // The TUI owns the terminal, so its logs always go to a file
    let interactive = matches!(cli.command, None | Some(Commands::Tui));
    let log_file = match (&cli.log_file, interactive) {
        (Some(path), _) => Some(path.clone()),
        (None, true) => Some(Path::new(CONFIG_DIR).join(DEFAULT_LOG_FILE)),
        (None, false) => None,
    };
    if let Err(e) = init_tracing(log_file.as_deref()) {
        fail(format!("cannot open log file: {e}"));
    }

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| Config::default_path(Path::new(".")));

    match cli.command {
        None | Some(Commands::Tui) => {
            let config = load_config(&config_path, cli.url.as_deref());
            let rt = runtime();
            if let Err(e) = rt.block_on(querychat_tui::run_tui(&config)) {
                fail(e);
            }
        }
        Some(Commands::Ask { question }) => {
            let config = load_config(&config_path, cli.url.as_deref());
            cmd_ask(&config, question);
        }
        Some(Commands::Upload { file }) => {
            let config = load_config(&config_path, cli.url.as_deref());
            cmd_upload(&config, &file);
        }
        Some(Commands::Init) => {
            cmd_init(&config_path);
        }
        Some(Commands::Config { json }) => {
            let config = load_config(&config_path, cli.url.as_deref());
            cmd_config(&config, &config_path, json);
        }
    }
}

/// Install the fmt subscriber, writing to `log_file` or stderr.
fn init_tracing(log_file: Option<&Path>) -> std::io::Result<()> {
    let filter =
        EnvFilter::try_from_env("RUST_LOG").unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));

    match log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            fmt()
                .with_env_filter(filter)
                .with_target(true)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            fmt()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(std::io::stderr)
                .init();
        }
    }

    Ok(())
}

/// Resolve the effective configuration: flag > env > file > defaults.
fn load_config(path: &Path, url_flag: Option<&str>) -> Config {
    let mut config = match Config::load_or_default(path) {
        Ok(config) => config,
        Err(e) => fail(format!("{}: {e}", path.display())),
    };
    config.apply_env();
    if let Some(url) = url_flag {
        config.base_url = url.trim().to_string();
    }
    if let Err(e) = config.validate() {
        fail(e);
    }
    config
}

fn runtime() -> tokio::runtime::Runtime {
    match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => fail(format!("failed to create tokio runtime: {e}")),
    }
}

fn client(config: &Config) -> ApiClient {
    match ApiClient::new(config) {
        Ok(client) => client,
        Err(e) => fail(e),
    }
}

/// Run one request to completion and print the resulting transcript.
fn run_one_shot(config: &Config, mut controller: Controller, request: Option<Request>) {
    if let Some(request) = request {
        let client = client(config);
        info!(request = %request.id(), backend = %config.base_url, "sending");
        let completion = runtime().block_on(execute(&client, request));
        controller.complete(completion);
    }
    print!("{}", controller.transcript().render_plain());
}

fn cmd_ask(config: &Config, question: String) {
    let mut controller = Controller::new(config.reply_ordering);
    let mut input = question;
    let request = controller.send_question(&mut input);
    if request.is_none() {
        fail("question is empty");
    }
    run_one_shot(config, controller, request);
}

fn cmd_upload(config: &Config, file: &Path) {
    let mut controller = Controller::new(config.reply_ordering);
    let request = controller.upload_file(Some(file));
    run_one_shot(config, controller, request);
}

fn cmd_init(config_path: &Path) {
    if config_path.exists() {
        println!("Config already exists at {}", config_path.display());
        return;
    }

    if let Err(e) = Config::default().save(config_path) {
        fail(format!("failed to write {}: {e}", config_path.display()));
    }
    println!("Created config at {}", config_path.display());
}

fn cmd_config(config: &Config, config_path: &Path, json: bool) {
    if json {
        match serde_json::to_string_pretty(config) {
            Ok(text) => println!("{text}"),
            Err(e) => fail(e),
        }
        return;
    }

    let source = if config_path.exists() {
        config_path.display().to_string()
    } else {
        "defaults".to_string()
    };

    println!("Configuration ({source})\n");
    println!("  Base URL:        {}", config.base_url);
    println!("  Ask endpoint:    {}", config.ask_url());
    println!("  Upload endpoint: {}", config.upload_url());
    println!("  Reply ordering:  {:?}", config.reply_ordering);
}

/// Print `Error: …` and exit with status 1.
fn fail(error: impl std::fmt::Display) -> ! {
    eprintln!("Error: {error}");
    std::process::exit(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_default_command_is_tui() {
        let cli = Cli::try_parse_from(["querychat"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "querychat",
            "ask",
            "Top 5 products",
            "--url",
            "http://example.test",
        ])
        .unwrap();

        assert_eq!(cli.url.as_deref(), Some("http://example.test"));
        assert!(
            matches!(cli.command, Some(Commands::Ask { ref question }) if question == "Top 5 products")
        );
    }

    #[test]
    fn test_config_json_flag() {
        let cli = Cli::try_parse_from(["querychat", "config", "--json"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Config { json: true })));
    }

    #[test]
    fn test_upload_requires_file() {
        assert!(Cli::try_parse_from(["querychat", "upload"]).is_err());
    }

    #[test]
    fn test_load_config_flag_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        Config {
            base_url: "http://from-file:9000".into(),
            ..Config::default()
        }
        .save(&path)
        .unwrap();

        let config = load_config(&path, Some(" http://from-flag:1234 "));
        assert_eq!(config.base_url, "http://from-flag:1234");
    }
}
