//! Dashboard-tilstand: hentede slag, utledet statistikk, lasting og feilmelding.

use crate::api::PunchSource;
use crate::error::FetchError;
use crate::metrics;
use crate::telemetry;
use crate::types::{AggregateMetrics, AveragingPolicy, FetchOutcome, FetchedPunch, PunchMetrics};

#[derive(Debug, Clone, PartialEq)]
pub enum DashboardEvent {
    FetchStarted,
    FetchSucceeded(FetchOutcome),
    FetchFailed(FetchError),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DashboardState {
    pub records: Vec<FetchedPunch>,
    pub stats: AggregateMetrics,
    pub is_loading: bool,
    pub error: Option<String>,
    pub rejected: usize,
    pub policy: AveragingPolicy,
}

impl DashboardState {
    pub fn new(policy: AveragingPolicy) -> Self {
        Self { policy, ..Self::default() }
    }

    pub fn apply(&mut self, event: DashboardEvent) {
        match event {
            DashboardEvent::FetchStarted => {
                self.is_loading = true;
                self.error = None;
            }
            DashboardEvent::FetchSucceeded(outcome) => {
                self.rejected = outcome.rejected.len();
                self.records = outcome.records;
                // statistikken utledes på nytt ved hver lasting, også når lista er tom
                self.stats = metrics::aggregate_with(&self.records, self.policy);
                self.is_loading = false;
            }
            DashboardEvent::FetchFailed(err) => {
                self.error = Some(err.to_string());
                self.is_loading = false;
            }
        }
    }

    /// Full metrikk for kort/diagram.
    pub fn punch_metrics(&self) -> PunchMetrics {
        metrics::fetched_metrics(&self.records, self.policy)
    }
}

/// Kjører hentinger mot en `PunchSource` og fører dem inn i tilstanden.
pub struct Dashboard<S: PunchSource> {
    source: S,
    state: DashboardState,
}

impl<S: PunchSource> Dashboard<S> {
    pub fn new(source: S, policy: AveragingPolicy) -> Self {
        Self { source, state: DashboardState::new(policy) }
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Én henting; siste fullførte svar vinner.
    pub fn load(&mut self) -> &DashboardState {
        self.state.apply(DashboardEvent::FetchStarted);
        telemetry::fetch_started();

        match self.source.fetch_punches() {
            Ok(outcome) => {
                telemetry::records_rejected(outcome.rejected.len());
                log::info!(
                    "punch-analysis lastet: {} poster ({} avvist)",
                    outcome.records.len(),
                    outcome.rejected.len()
                );
                self.state.apply(DashboardEvent::FetchSucceeded(outcome));
            }
            Err(err) => {
                telemetry::fetch_failed(err.kind());
                log::warn!("henting av punch-analysis feilet: {err:?}");
                self.state.apply(DashboardEvent::FetchFailed(err));
            }
        }
        &self.state
    }

    /// Manuelt nytt forsøk: samme henting en gang til.
    pub fn retry(&mut self) -> &DashboardState {
        self.load()
    }
}
