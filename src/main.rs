// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, debug, error, info};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use livestock_client::alerts::DiseaseAlertsClient;
use livestock_client::app_config::{self, Config};
use livestock_client::connection::{ConnectionMonitor, ConnectionState, NetworkSignal};
use livestock_client::dom::MemoryDocument;
use livestock_client::language_utils::{get_language_name, validate_language_code};
use livestock_client::predict::{FormControl, PredictionClient, PredictionForm, PredictionKind, PredictionOutcome};
use livestock_client::render::alerts::{render_disease_info, render_outbreak};
use livestock_client::translation::TranslationClient;
use livestock_client::transport::HttpTransport;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

/// CLI Wrapper for PredictionKind to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliPredictionKind {
    Breed,
    Disease,
}

impl From<CliPredictionKind> for PredictionKind {
    fn from(kind: CliPredictionKind) -> Self {
        match kind {
            CliPredictionKind::Breed => PredictionKind::Breed,
            CliPredictionKind::Disease => PredictionKind::Disease,
        }
    }
}

#[derive(Subcommand, Debug)]
enum AlertsCommand {
    /// Show information about a disease
    Info {
        /// Disease name
        disease: String,
    },
    /// Show details of a reported outbreak
    Outbreak {
        /// Outbreak identifier
        id: String,
    },
    /// Show current weather-driven disease risks
    Risks,
    /// Show outbreaks near the farm
    Nearby,
    /// Ask the server to refresh its alert data
    Refresh,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Probe the server and report connection quality
    Monitor {
        /// Probe once and exit
        #[arg(long)]
        once: bool,

        /// Override the probe interval in milliseconds
        #[arg(short, long)]
        interval_ms: Option<u64>,
    },

    /// Translate a text through the server's translation endpoint
    Translate {
        /// Text to translate
        text: String,

        /// Target language code (e.g., 'hi', 'ta', 'te')
        #[arg(short, long)]
        target: String,

        /// Source language code
        #[arg(short, long, default_value = "en")]
        source: String,
    },

    /// Upload an image for breed or disease prediction
    Predict {
        /// Which predictor to use
        #[arg(value_enum)]
        kind: CliPredictionKind,

        /// Image file to upload
        #[arg(value_name = "IMAGE")]
        image: PathBuf,

        /// Animal type selected in the form (e.g., 'cattle', 'poultry')
        #[arg(short, long, default_value = "cattle")]
        animal_type: String,
    },

    /// Query the disease alert API
    Alerts {
        #[command(subcommand)]
        command: AlertsCommand,
    },

    /// Generate shell completions for livestock-client
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Livestock Client - command line companion of the livestock health web app
///
/// Runs the client-side behaviours of the web application (connection
/// monitoring, translation, predictions and disease alerts) against a server.
#[derive(Parser, Debug)]
#[command(name = "livestock-client")]
#[command(author = "Livestock Client Team")]
#[command(version)]
#[command(about = "Client for the livestock health web application")]
#[command(long_about = "livestock-client talks to a livestock health web application the way its pages do.

EXAMPLES:
    livestock-client monitor --once                       # Probe the server once
    livestock-client monitor -i 10000                     # Probe every 10 seconds
    livestock-client translate -t hi \"Disease alerts\"     # Translate a text to Hindi
    livestock-client predict disease cow.jpg -a cattle    # Disease prediction for an image
    livestock-client alerts info Anthrax                  # Disease information
    livestock-client completions bash > livestock.bash    # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json", global = true)]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum, global = true)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI colour and tag for log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("1;31", "ERROR"),
            Level::Warn => ("1;33", "WARN "),
            Level::Info => ("1;32", "INFO "),
            Level::Debug => ("1;36", "DEBUG"),
            Level::Trace => ("1;35", "TRACE"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (color, tag) = Self::style_for_level(record.level());
            let _ = writeln!(
                std::io::stderr(),
                "\x1B[{}m{} {} {}\x1B[0m",
                color,
                now,
                tag,
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // The logger accepts everything; the effective level is set once the
    // config is known
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    if let Commands::Completions { shell } = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "livestock-client", &mut std::io::stdout());
        return Ok(());
    }

    let config = load_config(&cli.config_path, cli.log_level)?;
    log::set_max_level(config.log_level.to_level_filter());
    debug!("Using server {}", config.base_url);

    let transport = HttpTransport::new(&config.base_url, config.request_timeout_secs)?;

    match cli.command {
        Commands::Monitor { once, interval_ms } => run_monitor(transport, config, once, interval_ms).await,
        Commands::Translate { text, target, source } => run_translate(transport, &config, &text, &target, &source).await,
        Commands::Predict { kind, image, animal_type } => run_predict(transport, kind.into(), &image, &animal_type).await,
        Commands::Alerts { command } => run_alerts(transport, command).await,
        Commands::Completions { .. } => Ok(()),
    }
}

fn load_config(config_path: &str, log_level: Option<CliLogLevel>) -> Result<Config> {
    let mut config = Config::load_or_default(Path::new(config_path))?;

    // Command line log level takes precedence over the file
    if let Some(level) = log_level {
        config.log_level = level.into();
    }

    config
        .validate()
        .context(format!("Invalid configuration in {}", config_path))?;
    Ok(config)
}

async fn run_monitor(transport: HttpTransport, mut config: Config, once: bool, interval_ms: Option<u64>) -> Result<()> {
    if let Some(interval_ms) = interval_ms {
        if interval_ms == 0 {
            return Err(anyhow!("Probe interval must be greater than zero"));
        }
        config.monitor.check_interval_ms = interval_ms;
    }

    let document = MemoryDocument::new().into_shared();
    let monitor = ConnectionMonitor::new(transport, document, config.monitor.clone(), NetworkSignal::default());

    if once {
        let state = monitor.probe().await;
        let status = monitor.status();
        println!("{:?}: {}", state, status.message);
        if state == ConnectionState::Offline {
            return Err(anyhow!("Server unreachable: {}", status.message));
        }
        return Ok(());
    }

    monitor.start();
    let mut last_message = String::new();
    let mut ticker = tokio::time::interval(Duration::from_millis(500));
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, stopping monitor");
                monitor.stop();
                return Ok(());
            }
            _ = ticker.tick() => {
                let status = monitor.status();
                if status.state.is_some() && status.message != last_message {
                    let latency = status
                        .latency
                        .map(|l| format!(" ({}ms)", l.as_millis()))
                        .unwrap_or_default();
                    println!("{:?}{}: {}", status.state, latency, status.message);
                    last_message = status.message;
                }
            }
        }
    }
}

async fn run_translate(transport: HttpTransport, config: &Config, text: &str, target: &str, source: &str) -> Result<()> {
    validate_language_code(target)?;
    validate_language_code(source)?;

    info!("Translating from {} to {}", get_language_name(source), get_language_name(target));
    let client = TranslationClient::new(transport, &config.translator);
    let translated = client
        .request_translation(text, target, source)
        .await
        .context("Translation request failed")?;
    println!("{}", translated);
    Ok(())
}

async fn run_predict(transport: HttpTransport, kind: PredictionKind, image: &Path, animal_type: &str) -> Result<()> {
    let bytes = std::fs::read(image).context(format!("Failed to read image: {}", image.display()))?;
    let file_name = image
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .ok_or_else(|| anyhow!("Image path has no file name: {}", image.display()))?;

    let client = PredictionClient::new(transport);
    let mut control = FormControl::new("Predict");
    let outcome = client
        .submit(kind, PredictionForm::new(animal_type, &file_name, bytes), &mut control)
        .await;

    let (_, html) = outcome.render();
    println!("{}", html);

    match outcome {
        PredictionOutcome::Failed(message) => {
            error!("Prediction failed: {}", message);
            Err(anyhow!(message))
        }
        PredictionOutcome::Mismatch { message, .. } => Err(anyhow!(message)),
        _ => Ok(()),
    }
}

async fn run_alerts(transport: HttpTransport, command: AlertsCommand) -> Result<()> {
    let client = DiseaseAlertsClient::new(transport);
    match command {
        AlertsCommand::Info { disease } => {
            let info = client.info(&disease).await?;
            println!("{}", render_disease_info(&info));
        }
        AlertsCommand::Outbreak { id } => {
            let outbreak = client.outbreak(&id).await?;
            println!("{}", outbreak.title());
            println!("{}", render_outbreak(&outbreak));
        }
        AlertsCommand::Risks => {
            let risks = client.risks().await?;
            println!("{}", serde_json::to_string_pretty(&risks)?);
        }
        AlertsCommand::Nearby => {
            let nearby = client.nearby().await?;
            println!("{}", serde_json::to_string_pretty(&nearby)?);
        }
        AlertsCommand::Refresh => {
            let ack = client.refresh().await?;
            println!("{}", ack.message.unwrap_or_else(|| "Disease alert data refreshed".to_string()));
        }
    }
    Ok(())
}
