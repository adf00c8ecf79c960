//! Command-line interface for Gridle
//!
//! Maps the Detect / Sort / Layer / Status triggers onto one-shot commands.
//! Detection always runs first in commands that need it, since the session
//! cache lives only for the lifetime of the process.

use crate::config::Settings;
use crate::models::layer::LayerCreateRequest;
use crate::platform::display::{DisplayProvider, MonitorInfo, SystemDisplayProvider};
use crate::platform::window::{SystemWindowProvider, WindowProvider};
use crate::services::session::{ApplyReport, SessionConfig, TilerSession};
use crate::{GridleError, Result};
use clap::{Args, Parser, Subcommand};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Gridle command-line interface
#[derive(Parser)]
#[command(name = "gridle")]
#[command(about = "Arrange matching application windows into a grid on a chosen monitor")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct GridleCli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Enable JSON output for machine-readable results
    #[arg(long, global = true)]
    pub json: bool,

    /// Subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Re-read monitors and window titles
    Detect,

    /// Tile every window whose title contains a query
    Sort {
        /// Title substring to match (case-insensitive)
        query: String,

        /// Monitor index in detection order (defaults to the configured one)
        #[arg(short, long)]
        monitor: Option<usize>,
    },

    /// Layer management commands
    Layer(LayerCommands),

    /// Show detection and match counts
    Status,
}

/// Layer management subcommands
#[derive(Args)]
pub struct LayerCommands {
    #[command(subcommand)]
    pub action: LayerActions,
}

#[derive(Subcommand)]
pub enum LayerActions {
    /// Define a layer and apply it
    Apply {
        /// Layer name
        name: String,

        /// Grid rows (1-5)
        #[arg(long, default_value_t = 2)]
        rows: u32,

        /// Grid columns (1-5)
        #[arg(long, default_value_t = 2)]
        cols: u32,

        /// Monitor index in detection order (defaults to the configured one)
        #[arg(short, long)]
        monitor: Option<usize>,

        /// Tile assignment as INDEX=QUERY, repeatable
        #[arg(short, long = "assign", value_name = "INDEX=QUERY")]
        assignments: Vec<String>,
    },
}

/// CLI command executor
pub struct GridleCliExecutor {
    session: Arc<TilerSession>,
    settings: Settings,
    json_output: bool,
}

impl GridleCliExecutor {
    pub fn new(session: Arc<TilerSession>, settings: Settings, json_output: bool) -> Self {
        Self {
            session,
            settings,
            json_output,
        }
    }

    /// Execute a CLI command
    pub async fn execute(&self, command: Commands) -> Result<()> {
        match command {
            Commands::Detect => self.execute_detect().await,
            Commands::Sort { query, monitor } => self.execute_sort(&query, monitor).await,
            Commands::Layer(layer_cmd) => self.execute_layer_command(layer_cmd).await,
            Commands::Status => self.execute_status().await,
        }
    }

    async fn execute_detect(&self) -> Result<()> {
        let report = self.session.detect().await?;
        let monitors = self.session.monitors().await;
        let titles = self.session.titles().await;

        if self.json_output {
            let json = serde_json::json!({
                "monitors": monitors.iter().map(monitor_json).collect::<Vec<_>>(),
                "titles": titles,
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        } else {
            println!("Monitors: {}", report.monitors);
            for (index, monitor) in monitors.iter().enumerate() {
                println!("  {}", describe_monitor(index, monitor));
            }
            println!("Titles: {}", report.titles);
            for title in &titles {
                println!("  {}", title);
            }
        }

        Ok(())
    }

    async fn execute_sort(&self, query: &str, monitor: Option<usize>) -> Result<()> {
        let monitor_index = monitor.unwrap_or(self.settings.default_monitor);
        info!("Sorting windows matching '{}' on monitor {}", query, monitor_index);

        self.session.detect().await?;
        let report = self.session.sort(monitor_index, query).await?;
        self.print_apply_report(&report, query)
    }

    async fn execute_layer_command(&self, cmd: LayerCommands) -> Result<()> {
        match cmd.action {
            LayerActions::Apply {
                name,
                rows,
                cols,
                monitor,
                assignments,
            } => {
                let monitor_index = monitor.unwrap_or(self.settings.default_monitor);

                let mut tile_assignments = BTreeMap::new();
                for raw in &assignments {
                    let (index, query) = parse_assignment(raw)?;
                    tile_assignments.insert(index, query);
                }

                info!(
                    "Applying layer '{}' ({}x{}, {} assignment(s)) on monitor {}",
                    name,
                    rows,
                    cols,
                    tile_assignments.len(),
                    monitor_index
                );

                self.session.detect().await?;
                let id = self
                    .session
                    .add_layer(LayerCreateRequest {
                        display_name: name.clone(),
                        rows,
                        cols,
                        monitor_index,
                        tile_assignments,
                    })
                    .await?;
                let report = self.session.apply_layer(id).await?;
                self.print_apply_report(&report, &name)
            }
        }
    }

    async fn execute_status(&self) -> Result<()> {
        self.session.detect().await?;
        let status = self.session.status().await;

        if self.json_output {
            println!("{}", serde_json::to_string_pretty(&status)?);
        } else {
            println!(
                "Monitors: {} | Title choices: {} | Windows matched: {} | Layers: {}",
                status.monitors, status.titles, status.matched_windows, status.layers
            );
        }

        Ok(())
    }

    fn print_apply_report(&self, report: &ApplyReport, subject: &str) -> Result<()> {
        if self.json_output {
            println!("{}", serde_json::to_string_pretty(report)?);
            return Ok(());
        }

        if report.nothing_to_do() {
            println!("Nothing to do: no matching windows for '{}'.", subject);
            return Ok(());
        }

        println!("Placed {} of {} window(s).", report.placed, report.matched);
        if report.unmatched_tiles > 0 {
            println!("{} assigned tile(s) had no matching window.", report.unmatched_tiles);
        }
        for failure in &report.failures {
            println!(
                "  Could not place window {} ('{}'): {}",
                failure.window_id, failure.title, failure.reason
            );
        }

        Ok(())
    }
}

/// Parse a `INDEX=QUERY` tile assignment argument
fn parse_assignment(raw: &str) -> Result<(usize, String)> {
    let (index, query) = raw.split_once('=').ok_or_else(|| {
        GridleError::ValidationError(format!(
            "Assignment '{}' must have the form INDEX=QUERY",
            raw
        ))
    })?;

    let index = index.trim().parse::<usize>().map_err(|_| {
        GridleError::ValidationError(format!("Assignment index '{}' is not a number", index))
    })?;

    Ok((index, query.trim().to_string()))
}

fn describe_monitor(index: usize, monitor: &MonitorInfo) -> String {
    format!(
        "Monitor {}: {}x{} @({},{}){}",
        index + 1,
        monitor.bounds.width,
        monitor.bounds.height,
        monitor.bounds.x,
        monitor.bounds.y,
        if monitor.is_primary { " [primary]" } else { "" }
    )
}

fn monitor_json(monitor: &MonitorInfo) -> serde_json::Value {
    serde_json::json!({
        "id": monitor.id,
        "name": monitor.name,
        "x": monitor.bounds.x,
        "y": monitor.bounds.y,
        "width": monitor.bounds.width,
        "height": monitor.bounds.height,
        "is_primary": monitor.is_primary,
    })
}

/// Parse arguments, build the session against the system providers and run
/// the selected command.
pub async fn run() -> Result<()> {
    let cli = GridleCli::parse();

    if cli.verbose {
        debug!("Verbose output enabled");
    }

    let settings = Settings::load_or_default(cli.config.as_deref().map(Path::new))
        .map_err(|err| GridleError::ConfigurationError(err.to_string()))?;

    let displays: Arc<dyn DisplayProvider> = Arc::new(SystemDisplayProvider::new());
    let windows: Arc<dyn WindowProvider> = Arc::new(SystemWindowProvider::new());
    let session = Arc::new(TilerSession::new(
        displays,
        windows,
        SessionConfig {
            activation_pause: settings.activation_pause(),
        },
    ));

    let executor = GridleCliExecutor::new(session, settings, cli.json);
    if let Err(err) = executor.execute(cli.command).await {
        if cli.json {
            let error_json = serde_json::json!({
                "error": true,
                "message": err.to_string(),
            });
            println!("{}", serde_json::to_string_pretty(&error_json)?);
        } else {
            error!("Command failed: {}", err);
        }
        std::process::exit(1);
    }

    Ok(())
}
