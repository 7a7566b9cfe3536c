use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
    sync::Arc,
    thread,
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    config::load_settings, Alert, ClientSettings, ControllerEvent, FormController, FormState,
    HttpPredictionService, PredictionService,
};
use crossbeam_channel::bounded;
use serde::Serialize;
use shared::error::ErrorReport;
use tracing_subscriber::EnvFilter;

mod backend_bridge;
mod controller;
mod ui;

use backend_bridge::commands::BackendCommand;
use controller::orchestration::dispatch_backend_command;
use ui::terminal::{parse_input_line, InputLine, HELP};

#[derive(Parser, Debug)]
#[command(name = "predictor", about = "House price prediction client")]
struct Cli {
    /// Base address of the prediction API; overrides config and environment.
    #[arg(long, global = true)]
    api_url: Option<String>,
    /// Settings file (defaults to ./predictor.toml when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Submit one prediction and print the result.
    Predict {
        #[arg(long)]
        size: String,
        #[arg(long)]
        bedrooms: String,
        #[arg(long)]
        age: String,
        #[arg(long)]
        json: bool,
    },
    /// Print the model and front end versions.
    Version,
    /// Check that the prediction API is up.
    Health,
    /// Read `size bedrooms age` lines from stdin (default).
    Interactive,
}

#[derive(Debug, Serialize)]
struct PredictOutput {
    predicted_price: Option<f64>,
    model_version: Option<String>,
    app_version: Option<String>,
    error: Option<ErrorReport>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();
    let cli = Cli::parse();

    let mut settings = load_settings(cli.config.as_deref())?;
    if let Some(api_url) = cli.api_url.as_deref() {
        settings = settings.with_api_url(api_url)?;
    }

    match cli.command.unwrap_or(Command::Interactive) {
        Command::Predict {
            size,
            bedrooms,
            age,
            json,
        } => block_on(predict_once(
            settings,
            FormState::new(size, bedrooms, age),
            json,
        )),
        Command::Version => block_on(print_versions(settings)),
        Command::Health => block_on(print_health(settings)),
        Command::Interactive => run_interactive(settings),
    }
}

fn block_on<F: std::future::Future<Output = Result<()>>>(future: F) -> Result<()> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to build runtime")?
        .block_on(future)
}

async fn predict_once(settings: ClientSettings, form: FormState, json: bool) -> Result<()> {
    let service = Arc::new(HttpPredictionService::new(&settings)?);
    let controller = FormController::new(service, &settings);
    let mut events = controller.subscribe_events();

    controller.load_model_version().await;
    controller.fill(form).await;
    let outcome = controller.submit().await;

    let mut alert: Option<Alert> = None;
    while let Ok(event) = events.try_recv() {
        if let ControllerEvent::Alert(raised) = event {
            alert = Some(raised);
        }
    }

    if json {
        let output = PredictOutput {
            predicted_price: controller.prediction().await,
            model_version: controller.model_version().await,
            app_version: controller.app_version().map(str::to_string),
            error: alert.as_ref().map(ErrorReport::from),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print!("{}", controller.view().await);
        if let Some(alert) = &alert {
            eprintln!("{}", alert.message());
        }
    }

    outcome?;
    Ok(())
}

async fn print_versions(settings: ClientSettings) -> Result<()> {
    let service = HttpPredictionService::new(&settings)?;
    match service.model_version().await {
        Ok(version) => println!("Model Version: {version}"),
        Err(err) => println!("Model Version: unavailable ({err})"),
    }
    if let Some(app_version) = &settings.app_version {
        println!("Frontend Version: {app_version}");
    }
    Ok(())
}

async fn print_health(settings: ClientSettings) -> Result<()> {
    let service = HttpPredictionService::new(&settings)?;
    let health = service
        .health()
        .await
        .with_context(|| format!("health check against {} failed", service.api_url()))?;
    println!("status: {}", health.status);
    match service.service_info().await {
        Ok(info) => {
            println!("message: {}", info.message);
            println!("model loaded: {}", info.model_loaded);
        }
        Err(err) => tracing::warn!("service info unavailable: {err}"),
    }
    Ok(())
}

fn run_interactive(settings: ClientSettings) -> Result<()> {
    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(64);
    let (ui_tx, ui_rx) = bounded(256);
    let backend = backend_bridge::runtime::launch(settings, cmd_rx, ui_tx);
    let printer = thread::spawn(move || ui::terminal::render_events(ui_rx));

    println!("{HELP}");
    let mut status = String::new();
    for line in io::stdin().lock().lines() {
        let line = line.context("failed to read stdin")?;
        let cmd = match parse_input_line(&line) {
            InputLine::Submit(form) => BackendCommand::Submit { form },
            InputLine::Show => BackendCommand::ShowForm,
            InputLine::Help => {
                println!("{HELP}");
                continue;
            }
            InputLine::Quit => break,
            InputLine::Empty => continue,
            InputLine::Invalid(reason) => {
                eprintln!("{reason}");
                continue;
            }
        };
        dispatch_backend_command(&cmd_tx, cmd, &mut status);
        if !status.is_empty() {
            eprintln!("{}", std::mem::take(&mut status));
        }
        io::stdout().flush().ok();
    }

    dispatch_backend_command(&cmd_tx, BackendCommand::Shutdown, &mut status);
    drop(cmd_tx);
    if backend.join().is_err() {
        tracing::error!("backend worker panicked");
    }
    if printer.join().is_err() {
        tracing::error!("event printer panicked");
    }
    Ok(())
}
