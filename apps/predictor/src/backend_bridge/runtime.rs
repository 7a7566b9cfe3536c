//! Backend worker: owns the tokio runtime and the form controller, drains the
//! command queue and forwards controller events to the terminal.

use std::{sync::Arc, thread};

use client_core::{
    ClientSettings, FormController, HttpPredictionService, PredictionService, SubmitError,
};
use crossbeam_channel::{Receiver, Sender, TrySendError};
use tokio::sync::broadcast::error::RecvError;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};

pub fn launch(
    settings: ClientSettings,
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
) -> thread::JoinHandle<()> {
    match HttpPredictionService::new(&settings) {
        Ok(service) => launch_with_service(Arc::new(service), settings, cmd_rx, ui_tx),
        Err(err) => {
            tracing::error!("failed to build prediction service: {err:#}");
            forward_to_ui(
                &ui_tx,
                UiEvent::Error(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    format!("backend worker startup failure: {err:#}"),
                )),
            );
            // Nothing drains the queue; the input loop sees it disconnect.
            thread::spawn(move || drop(cmd_rx))
        }
    }
}

pub fn launch_with_service(
    service: Arc<dyn PredictionService>,
    settings: ClientSettings,
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                forward_to_ui(
                    &ui_tx,
                    UiEvent::Error(UiError::from_message(
                        UiErrorContext::BackendStartup,
                        format!("backend worker startup failure: failed to build runtime: {err}"),
                    )),
                );
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        runtime.block_on(async move {
            let controller = FormController::new(service, &settings);

            let mut events = controller.subscribe_events();
            let ui_tx_clone = ui_tx.clone();
            let event_task = tokio::spawn(async move {
                loop {
                    let evt = match events.recv().await {
                        Ok(event) => UiEvent::from(event),
                        Err(RecvError::Lagged(missed)) => UiEvent::Error(UiError::from_message(
                            UiErrorContext::General,
                            format!("terminal fell behind; {missed} updates were dropped"),
                        )),
                        Err(RecvError::Closed) => break,
                    };
                    forward_to_ui(&ui_tx_clone, evt);
                }
            });

            // Fire-and-forget; the version shows up as an event when it lands.
            let _ = controller.initialize().await;
            forward_to_ui(
                &ui_tx,
                UiEvent::Info(format!("Using prediction API at {}", settings.api_url)),
            );

            while let Ok(cmd) = cmd_rx.recv() {
                match cmd {
                    BackendCommand::Submit { form } => {
                        if controller.status().await.is_loading() {
                            forward_to_ui(
                                &ui_tx,
                                UiEvent::Info("A prediction is already in progress".to_string()),
                            );
                            continue;
                        }
                        controller.fill(form).await;
                        // Outcomes, rejections included, arrive through the event stream.
                        match controller.spawn_submit().await {
                            Ok(handle) => drop(handle),
                            Err(SubmitError::Input(err)) => {
                                tracing::debug!("submission rejected: {err}")
                            }
                            Err(err) => tracing::warn!("submission not dispatched: {err}"),
                        }
                    }
                    BackendCommand::ShowForm => {
                        forward_to_ui(&ui_tx, UiEvent::View(controller.view().await));
                    }
                    BackendCommand::Shutdown => break,
                }
            }

            controller.close().await;
            event_task.abort();
        });
    })
}

/// Hands `event` to the terminal without blocking the backend. Returns whether
/// it was queued.
fn forward_to_ui(ui_tx: &Sender<UiEvent>, event: UiEvent) -> bool {
    let event_name = event.name();
    match ui_tx.try_send(event) {
        Ok(()) => true,
        Err(TrySendError::Full(_)) => {
            tracing::warn!(event = event_name, "backend->ui event queue is full; dropping event");
            false
        }
        Err(TrySendError::Disconnected(_)) => {
            tracing::debug!(event = event_name, "backend->ui event queue disconnected");
            false
        }
    }
}
