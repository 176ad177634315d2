//! Per-action request lifecycle and the orchestrator that drives the services.
//!
//! Each user action (compose, play, probe) owns an [`ActionSlot`]. A slot only
//! admits one submission at a time: a second submit while the first is in
//! flight is rejected, not queued. Every admitted submission ends in a
//! terminal state, including when its future is dropped or panics, so the
//! action can always be submitted again.

use std::{
    fmt,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use reqwest::Client;
use shared::domain::{DeviceCommand, SequenceItem};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::{
    catalog::Catalog,
    composition::CompositionClient,
    config::ClientSettings,
    error::ClientError,
    playback::PlaybackClient,
    profile::ScentProfile,
    severity,
    translate::translate,
    ComposeService, Outcome, PlaybackService,
};

pub const NO_SEQUENCE_TO_PLAY: &str = "No sequence to play. Generate a scent sequence first!";
pub const NO_SEQUENCE_PRODUCED: &str =
    "The composition service produced no scent sequence; try rephrasing.";
const ABORTED: &str = "The action stopped unexpectedly; please try again.";
const EVENT_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestState {
    Idle,
    InFlight,
    Succeeded,
    Failed(String),
}

impl RequestState {
    /// Whether the action's trigger accepts a new submission.
    pub fn accepts_submit(&self) -> bool {
        !matches!(self, Self::InFlight)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Compose,
    Play,
    Probe,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Compose => "compose",
            Self::Play => "play",
            Self::Probe => "probe",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleEvent {
    pub action: ActionKind,
    pub state: RequestState,
}

pub struct ActionSlot {
    kind: ActionKind,
    state: Mutex<RequestState>,
    events: broadcast::Sender<LifecycleEvent>,
}

impl ActionSlot {
    pub fn new(kind: ActionKind, events: broadcast::Sender<LifecycleEvent>) -> Self {
        Self {
            kind,
            state: Mutex::new(RequestState::Idle),
            events,
        }
    }

    pub fn state(&self) -> RequestState {
        self.lock().clone()
    }

    pub fn accepts_submit(&self) -> bool {
        self.lock().accepts_submit()
    }

    /// Moves the slot to `InFlight`, or returns `None` if a submission is
    /// already running.
    pub fn begin(&self) -> Option<InFlight<'_>> {
        {
            let mut state = self.lock();
            if !state.accepts_submit() {
                return None;
            }
            *state = RequestState::InFlight;
        }
        self.publish(RequestState::InFlight);
        Some(InFlight {
            slot: self,
            settled: false,
        })
    }

    fn settle(&self, next: RequestState) {
        *self.lock() = next.clone();
        self.publish(next);
    }

    fn publish(&self, state: RequestState) {
        // No subscribers is fine; the state itself is authoritative.
        let _ = self.events.send(LifecycleEvent {
            action: self.kind,
            state,
        });
    }

    fn lock(&self) -> MutexGuard<'_, RequestState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Proof that a submission holds its slot. Settles to `Failed` if dropped
/// without an explicit outcome.
pub struct InFlight<'a> {
    slot: &'a ActionSlot,
    settled: bool,
}

impl InFlight<'_> {
    pub fn succeed(mut self) {
        self.settled = true;
        self.slot.settle(RequestState::Succeeded);
    }

    pub fn fail(mut self, reason: impl Into<String>) {
        self.settled = true;
        self.slot.settle(RequestState::Failed(reason.into()));
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.settled {
            warn!(action = %self.slot.kind, "in-flight action dropped without an outcome");
            self.slot.settle(RequestState::Failed(ABORTED.to_string()));
        }
    }
}

#[derive(Debug)]
pub enum Submission<T> {
    /// Rejected because the same action is already in flight.
    Busy,
    Finished(Result<T, ClientError>),
}

impl<T> Submission<T> {
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Busy)
    }

    pub fn into_result(self) -> Option<Result<T, ClientError>> {
        match self {
            Self::Busy => None,
            Self::Finished(result) => Some(result),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ComposeReport {
    Profile(ScentProfile),
    /// The service answered without a sequence; the score is still reported.
    NoSequence { score: f64 },
}

#[derive(Debug)]
pub struct HealthReport {
    pub composition: Result<Outcome, ClientError>,
    pub playback: Result<Outcome, ClientError>,
}

impl HealthReport {
    pub fn all_healthy(&self) -> bool {
        matches!(self.composition, Ok(Outcome::Ok(_)))
            && matches!(self.playback, Ok(Outcome::Ok(_)))
    }
}

pub struct Orchestrator {
    catalog: Arc<Catalog>,
    composer: Arc<dyn ComposeService>,
    playback: Arc<dyn PlaybackService>,
    compose_slot: ActionSlot,
    play_slot: ActionSlot,
    probe_slot: ActionSlot,
    current_sequence: Mutex<Option<Vec<SequenceItem>>>,
    events: broadcast::Sender<LifecycleEvent>,
}

impl Orchestrator {
    pub fn new(
        catalog: Arc<Catalog>,
        composer: Arc<dyn ComposeService>,
        playback: Arc<dyn PlaybackService>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            catalog,
            composer,
            playback,
            compose_slot: ActionSlot::new(ActionKind::Compose, events.clone()),
            play_slot: ActionSlot::new(ActionKind::Play, events.clone()),
            probe_slot: ActionSlot::new(ActionKind::Probe, events.clone()),
            current_sequence: Mutex::new(None),
            events,
        }
    }

    /// Loads the catalog, then wires HTTP clients for both services.
    pub async fn connect(settings: &ClientSettings) -> Self {
        let http = Client::new();
        let catalog = Catalog::load(&settings.catalog_source(), &http).await;
        let composer = CompositionClient::new(
            http.clone(),
            settings.composition_url.clone(),
            settings.compose_timeout(),
        );
        let playback = PlaybackClient::new(
            http,
            settings.playback_url.clone(),
            settings.playback_timeout(),
            settings.probe_timeout(),
        );
        Self::new(Arc::new(catalog), Arc::new(composer), Arc::new(playback))
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LifecycleEvent> {
        self.events.subscribe()
    }

    pub fn state(&self, action: ActionKind) -> RequestState {
        self.slot(action).state()
    }

    pub fn accepts_submit(&self, action: ActionKind) -> bool {
        self.slot(action).accepts_submit()
    }

    /// The last sequence a compose produced, which `play` sends to the device.
    pub fn current_sequence(&self) -> Option<Vec<SequenceItem>> {
        self.sequence_lock().clone()
    }

    pub async fn compose(&self, statement: &str) -> Submission<ComposeReport> {
        let Some(flight) = self.compose_slot.begin() else {
            debug!("compose rejected: already in flight");
            return Submission::Busy;
        };

        let result = self.run_compose(statement).await;
        match &result {
            Ok(ComposeReport::Profile(_)) => flight.succeed(),
            Ok(ComposeReport::NoSequence { .. }) => flight.fail(NO_SEQUENCE_PRODUCED),
            Err(error) => flight.fail(error.user_message()),
        }
        Submission::Finished(result)
    }

    pub async fn play(&self) -> Submission<Outcome> {
        let Some(flight) = self.play_slot.begin() else {
            debug!("play rejected: already in flight");
            return Submission::Busy;
        };

        let result = self.run_play().await;
        settle_outcome(flight, &result);
        Submission::Finished(result)
    }

    /// Plays one scent directly, sharing the play action's single-flight slot.
    pub async fn play_scent(&self, command: DeviceCommand) -> Submission<Outcome> {
        let Some(flight) = self.play_slot.begin() else {
            debug!("play_scent rejected: already in flight");
            return Submission::Busy;
        };

        let result = self.playback.play_scent(command).await;
        settle_outcome(flight, &result);
        Submission::Finished(result)
    }

    pub async fn probe(&self) -> Submission<Outcome> {
        let Some(flight) = self.probe_slot.begin() else {
            debug!("probe rejected: already in flight");
            return Submission::Busy;
        };

        let result = self.playback.probe().await;
        settle_outcome(flight, &result);
        Submission::Finished(result)
    }

    /// Checks both services concurrently under the probe slot.
    pub async fn health(&self) -> Submission<HealthReport> {
        let Some(flight) = self.probe_slot.begin() else {
            debug!("health check rejected: probe in flight");
            return Submission::Busy;
        };

        let (composition, playback) = tokio::join!(self.composer.health(), self.playback.health());
        let report = HealthReport {
            composition,
            playback,
        };
        if report.all_healthy() {
            flight.succeed();
        } else {
            flight.fail("One or more services are not healthy.");
        }
        Submission::Finished(Ok(report))
    }

    async fn run_compose(&self, statement: &str) -> Result<ComposeReport, ClientError> {
        let score = severity::score(statement);
        if self.catalog.is_empty() {
            warn!("scent catalog is empty; composing anyway");
        }

        let composition = self.composer.compose(statement).await?;
        let Some(sequence) = composition.sequence else {
            info!(score, "composition produced no sequence");
            return Ok(ComposeReport::NoSequence { score });
        };

        let profile =
            ScentProfile::build(score, &sequence, &self.catalog, composition.justification);
        *self.sequence_lock() = Some(sequence);
        info!(score, notes = profile.notes.len(), "composition ready");
        Ok(ComposeReport::Profile(profile))
    }

    async fn run_play(&self) -> Result<Outcome, ClientError> {
        let sequence = self
            .current_sequence()
            .filter(|sequence| !sequence.is_empty())
            .ok_or_else(|| ClientError::user_input(NO_SEQUENCE_TO_PLAY))?;
        let commands = translate(&self.catalog, &sequence)?;
        info!(commands = commands.len(), "sending sequence to playback service");
        self.playback.play(&commands).await
    }

    fn slot(&self, action: ActionKind) -> &ActionSlot {
        match action {
            ActionKind::Compose => &self.compose_slot,
            ActionKind::Play => &self.play_slot,
            ActionKind::Probe => &self.probe_slot,
        }
    }

    fn sequence_lock(&self) -> MutexGuard<'_, Option<Vec<SequenceItem>>> {
        self.current_sequence
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

fn settle_outcome(flight: InFlight<'_>, result: &Result<Outcome, ClientError>) {
    match result {
        Ok(Outcome::Ok(_)) => flight.succeed(),
        Ok(Outcome::Failed(message)) => flight.fail(message.clone()),
        Err(error) => flight.fail(error.user_message()),
    }
}

#[cfg(test)]
#[path = "tests/lifecycle_tests.rs"]
mod tests;
