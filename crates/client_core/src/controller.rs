//! Form controller: field state, the Idle/Submitting state machine and the two
//! exchanges with the prediction service.

use std::sync::Arc;

use shared::{
    domain::{FormField, SubmissionStatus},
    protocol::PredictionRequest,
};
use tokio::{
    sync::{broadcast, Mutex},
    task::{AbortHandle, JoinHandle},
};
use tracing::{debug, error, info, warn};

use crate::{
    config::ClientSettings,
    error::{Alert, PredictionError, SubmitError},
    form::FormState,
    view::FormView,
    PredictionService,
};

#[derive(Debug, Clone, PartialEq)]
pub enum ControllerEvent {
    StatusChanged(SubmissionStatus),
    PredictionCleared,
    PredictionUpdated(f64),
    ModelVersionLoaded(String),
    Alert(Alert),
}

#[derive(Default)]
struct ControllerState {
    form: FormState,
    prediction: Option<f64>,
    model_version: Option<String>,
    status: SubmissionStatus,
    /// Ticket of the most recently dispatched submission. Only its
    /// settlement may touch the prediction or the loading flag.
    latest_ticket: u64,
    closed: bool,
}

pub struct FormController {
    service: Arc<dyn PredictionService>,
    app_version: Option<String>,
    inner: Mutex<ControllerState>,
    version_task: Mutex<Option<AbortHandle>>,
    version_requested: Mutex<bool>,
    inflight_submit: Mutex<Option<AbortHandle>>,
    events: broadcast::Sender<ControllerEvent>,
}

impl FormController {
    pub fn new(service: Arc<dyn PredictionService>, settings: &ClientSettings) -> Arc<Self> {
        let (events, _) = broadcast::channel(256);
        Arc::new(Self {
            service,
            app_version: settings.app_version.clone(),
            inner: Mutex::new(ControllerState::default()),
            version_task: Mutex::new(None),
            version_requested: Mutex::new(false),
            inflight_submit: Mutex::new(None),
            events,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ControllerEvent> {
        self.events.subscribe()
    }

    /// Starts the one-per-lifetime model version fetch in the background.
    ///
    /// Returns the task handle for callers that want to wait on it, or `None`
    /// when the fetch was already started or the controller is closed.
    pub async fn initialize(self: &Arc<Self>) -> Option<JoinHandle<()>> {
        if self.inner.lock().await.closed {
            return None;
        }
        let mut requested = self.version_requested.lock().await;
        if *requested {
            return None;
        }
        *requested = true;

        let controller = Arc::clone(self);
        let handle = tokio::spawn(async move {
            controller.load_model_version().await;
        });
        *self.version_task.lock().await = Some(handle.abort_handle());
        Some(handle)
    }

    /// Fetches and stores the model version. Failures are logged only.
    pub async fn load_model_version(&self) -> Option<String> {
        let version = match self.service.model_version().await {
            Ok(version) => version,
            Err(err) => {
                warn!(kind = ?err.kind(), "error fetching model version: {err}");
                return None;
            }
        };

        {
            let mut inner = self.inner.lock().await;
            if inner.closed {
                debug!("dropping model version for closed form");
                return None;
            }
            inner.model_version = Some(version.clone());
        }
        info!(model_version = %version, "model version loaded");
        self.emit(ControllerEvent::ModelVersionLoaded(version.clone()));
        Some(version)
    }

    pub async fn update_field(&self, field: FormField, value: impl Into<String>) {
        self.inner.lock().await.form.set(field, value);
    }

    /// Replaces all three fields at once.
    pub async fn fill(&self, form: FormState) {
        self.inner.lock().await.form = form;
    }

    pub async fn form(&self) -> FormState {
        self.inner.lock().await.form.clone()
    }

    pub async fn status(&self) -> SubmissionStatus {
        self.inner.lock().await.status
    }

    pub async fn prediction(&self) -> Option<f64> {
        self.inner.lock().await.prediction
    }

    pub async fn model_version(&self) -> Option<String> {
        self.inner.lock().await.model_version.clone()
    }

    pub fn app_version(&self) -> Option<&str> {
        self.app_version.as_deref()
    }

    /// Whether the submit control should be enabled.
    pub async fn can_submit(&self) -> bool {
        let inner = self.inner.lock().await;
        !inner.closed && !inner.status.is_loading() && inner.form.is_complete()
    }

    pub async fn view(&self) -> FormView {
        let inner = self.inner.lock().await;
        FormView::new(
            &inner.form,
            inner.model_version.as_deref(),
            self.app_version.as_deref(),
            inner.status,
            inner.prediction,
            !inner.closed && inner.form.is_complete(),
        )
    }

    /// Parses the form and sends one prediction request.
    ///
    /// Invalid input is rejected locally without touching the loading flag.
    /// A submission overlapped by a newer one settles as
    /// [`SubmitError::Superseded`] and leaves the state to the newer one.
    pub async fn submit(&self) -> Result<f64, SubmitError> {
        let (ticket, request) = self.dispatch().await?;
        let outcome = self.service.predict(&request).await;
        self.settle(ticket, outcome).await
    }

    /// Like [`Self::submit`], but only the request runs on a task that
    /// [`Self::close`] can abort.
    ///
    /// The form is parsed and the loading flag set before this returns, so
    /// rejected input comes back here and never displaces a running
    /// submission. Once the new one is dispatched, an earlier spawned
    /// submission is aborted; the new ticket owns the loading flag.
    pub async fn spawn_submit(
        self: &Arc<Self>,
    ) -> Result<JoinHandle<Result<f64, SubmitError>>, SubmitError> {
        let (ticket, request) = self.dispatch().await?;
        let controller = Arc::clone(self);
        let handle = tokio::spawn(async move {
            let outcome = controller.service.predict(&request).await;
            controller.settle(ticket, outcome).await
        });
        if let Some(previous) = self
            .inflight_submit
            .lock()
            .await
            .replace(handle.abort_handle())
        {
            previous.abort();
        }
        Ok(handle)
    }

    /// Tears the form down. Pending work is aborted and any response that
    /// still arrives is ignored.
    pub async fn close(&self) {
        let was_loading = {
            let mut inner = self.inner.lock().await;
            if inner.closed {
                return;
            }
            inner.closed = true;
            std::mem::replace(&mut inner.status, SubmissionStatus::Idle).is_loading()
        };
        if let Some(task) = self.version_task.lock().await.take() {
            task.abort();
        }
        if let Some(task) = self.inflight_submit.lock().await.take() {
            task.abort();
        }
        if was_loading {
            self.emit(ControllerEvent::StatusChanged(SubmissionStatus::Idle));
        }
        info!("form controller closed");
    }

    /// Validates the form, takes a ticket and enters `Submitting`.
    async fn dispatch(&self) -> Result<(u64, PredictionRequest), SubmitError> {
        let (ticket, request) = {
            let mut inner = self.inner.lock().await;
            if inner.closed {
                return Err(SubmitError::Closed);
            }
            let parsed = inner.form.to_request();
            let request = match parsed {
                Ok(request) => request,
                Err(err) => {
                    drop(inner);
                    warn!(field = %err.field(), "rejected form input: {err}");
                    self.emit(ControllerEvent::Alert(Alert::for_input_error(&err)));
                    return Err(err.into());
                }
            };
            inner.latest_ticket += 1;
            inner.status = SubmissionStatus::Submitting;
            inner.prediction = None;
            (inner.latest_ticket, request)
        };
        self.emit(ControllerEvent::StatusChanged(SubmissionStatus::Submitting));
        self.emit(ControllerEvent::PredictionCleared);
        info!(
            ticket,
            size = request.size,
            bedrooms = request.bedrooms,
            age = request.age,
            "submitting prediction request"
        );
        Ok((ticket, request))
    }

    async fn settle(
        &self,
        ticket: u64,
        outcome: Result<f64, PredictionError>,
    ) -> Result<f64, SubmitError> {
        let mut inner = self.inner.lock().await;
        if inner.closed {
            debug!(ticket, "dropping prediction response for closed form");
            return Err(SubmitError::Closed);
        }
        if inner.latest_ticket != ticket {
            debug!(
                ticket,
                latest = inner.latest_ticket,
                "dropping superseded prediction response"
            );
            return Err(SubmitError::Superseded { ticket });
        }
        inner.status = SubmissionStatus::Idle;

        match outcome {
            Ok(price) => {
                inner.prediction = Some(price);
                drop(inner);
                info!(ticket, predicted_price = price, "prediction received");
                self.emit(ControllerEvent::PredictionUpdated(price));
                self.emit(ControllerEvent::StatusChanged(SubmissionStatus::Idle));
                Ok(price)
            }
            Err(err) => {
                drop(inner);
                error!(
                    ticket,
                    status = err.status(),
                    kind = ?err.kind(),
                    "prediction request failed: {err}"
                );
                self.emit(ControllerEvent::Alert(Alert::for_prediction_error(&err)));
                self.emit(ControllerEvent::StatusChanged(SubmissionStatus::Idle));
                Err(err.into())
            }
        }
    }

    fn emit(&self, event: ControllerEvent) {
        // No subscribers is fine; the state is still queryable.
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
