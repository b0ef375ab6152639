// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use fulfillment_client::probe::latency;
use fulfillment_client::{ApiClient, HttpTransport, LogFeed, Monitor};
use log::{error, info};

mod config;
mod report;

use config::{AppConfig, Environment, ENV_VAR};

/// Log entries printed each time the feed changes in watch mode.
const WATCH_LOG_LINES: usize = 10;

#[derive(Parser, Debug)]
#[command(name = "fulfillment-monitor")]
#[command(about = "Watch a fulfillment service: status, connectivity and logs")]
struct Cli {
    /// Service environment to target
    #[arg(long, value_enum, global = true)]
    env: Option<Environment>,

    /// Base API URL (e.g., "http://localhost:5001/api"); overrides --env
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the monitor and print changes until Ctrl-C (default)
    Watch,
    /// Fetch the log list once
    Logs,
    /// Measure one round trip to the service
    Ping,
    /// Upload an order spreadsheet (.xlsx or .xls)
    Upload {
        /// Spreadsheet to upload
        file: PathBuf,
    },
    /// Show the configuration file path and effective settings
    Config,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let config = AppConfig::load()?;
    let env_override = std::env::var(ENV_VAR).ok();
    let environment = cli
        .env
        .unwrap_or_else(|| config.effective_environment(env_override.as_deref()));
    let base_url = cli
        .base_url
        .unwrap_or_else(|| config.base_url(environment).to_string());

    match cli.command.unwrap_or(Command::Watch) {
        Command::Watch => watch(connect(&config, &base_url)?, &config).await,
        Command::Logs => print_logs(&connect(&config, &base_url)?).await,
        Command::Ping => ping(&connect(&config, &base_url)?).await,
        Command::Upload { file } => upload(&connect(&config, &base_url)?, &file).await,
        Command::Config => show_config(&config, environment, &base_url),
    }
}

fn connect(config: &AppConfig, base_url: &str) -> Result<ApiClient, Box<dyn Error>> {
    let transport = HttpTransport::builder()
        .base_url(base_url)
        .timeout(config.request_timeout())
        .build()?;
    Ok(ApiClient::new(transport))
}

async fn watch(client: ApiClient, config: &AppConfig) -> Result<(), Box<dyn Error>> {
    info!("Watching {}", client.transport().base_url());

    let monitor = Monitor::spawn(client, config.monitor_config());
    let mut status = monitor.subscribe_status();
    let mut connectivity = monitor.subscribe_connectivity();
    let mut logs = monitor.subscribe_logs();

    loop {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                result?;
                break;
            }
            Ok(()) = status.changed() => {
                println!("{}", report::status_line(&status.borrow_and_update()));
            }
            Ok(()) = connectivity.changed() => {
                println!("{}", report::connectivity_line(&connectivity.borrow_and_update()));
            }
            Ok(()) = logs.changed() => {
                for line in report::log_lines(&logs.borrow_and_update(), Some(WATCH_LOG_LINES)) {
                    println!("{line}");
                }
            }
        }
    }

    monitor.shutdown();

    let diagnostics = monitor.diagnostics();
    if !diagnostics.is_empty() {
        println!("Session diagnostics:");
        for diagnostic in &diagnostics {
            println!("  {}", report::diagnostic_line(diagnostic));
        }
    }
    Ok(())
}

async fn print_logs(client: &ApiClient) -> Result<(), Box<dyn Error>> {
    let feed = LogFeed::Loaded(client.logs().await?);
    for line in report::log_lines(&feed, None) {
        println!("{line}");
    }
    Ok(())
}

async fn ping(client: &ApiClient) -> Result<(), Box<dyn Error>> {
    let latency_ms = latency::measure(client).await?;
    println!(
        "pong from {} in {} ms",
        client.transport().base_url(),
        latency_ms
    );
    Ok(())
}

async fn upload(client: &ApiClient, file: &Path) -> Result<(), Box<dyn Error>> {
    let receipt = client.upload_file(file).await?;
    println!("{}", report::upload_line(&receipt));
    Ok(())
}

fn show_config(
    config: &AppConfig,
    environment: Environment,
    base_url: &str,
) -> Result<(), Box<dyn Error>> {
    println!("Config file: {}", AppConfig::get_config_path()?.display());
    println!("Environment: {environment}");
    println!("Base URL:    {base_url}");
    println!("Effective settings (JSON view of the TOML file):");
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}
