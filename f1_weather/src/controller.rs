//! Orchestration of a single analyze request/response cycle.

use std::cell::Cell;

use async_trait::async_trait;

use crate::{
    current_year, AnalysisError, AnalysisRequest, AnalysisResponse, FormFields, RenderedAnalysis,
};

/// External analysis endpoint, abstracted so the controller can be driven
/// against a stub in tests. Futures are not `Send` on wasm32, hence `?Send`.
#[async_trait(?Send)]
pub trait AnalysisClient {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResponse, AnalysisError>;
}

/// Named UI slots the controller mutates. Bound once at startup; the
/// controller never reaches into page structure directly.
pub trait AnalysisView {
    /// Clear prior results and error text and hide the results panel.
    /// Idempotent.
    fn reset(&self);
    /// Disable or enable the submit control and toggle the busy indicator.
    fn set_busy(&self, busy: bool);
    fn show_error(&self, message: &str);
    fn show_results(&self, rendered: &RenderedAnalysis);
}

/// Generation counter for the transient error banner. Each shown error takes
/// a fresh ticket; a hide callback holding a stale ticket is a no-op, so an
/// older error's timer never blanks a newer error.
#[derive(Debug, Default)]
pub struct ErrorBanner {
    generation: Cell<u64>,
}

impl ErrorBanner {
    pub fn post(&self) -> u64 {
        let ticket = self.generation.get() + 1;
        self.generation.set(ticket);
        ticket
    }

    /// True when `ticket` still names the banner's current error.
    pub fn expire(&self, ticket: u64) -> bool {
        self.generation.get() == ticket
    }
}

#[derive(Debug)]
pub enum SubmitOutcome {
    Completed,
    /// A previous submission is still outstanding; this one was not started.
    InFlight,
    /// The error has already been routed to the view; callers may forward it
    /// to a diagnostic channel.
    Failed(AnalysisError),
}

/// Mediates one request/response cycle between the form and the external
/// analysis endpoint: validate, enter busy state, call, render, restore.
pub struct FormController<C, V> {
    client: C,
    view: V,
    in_flight: Cell<bool>,
}

impl<C: AnalysisClient, V: AnalysisView> FormController<C, V> {
    pub fn new(client: C, view: V) -> Self {
        Self {
            client,
            view,
            in_flight: Cell::new(false),
        }
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Run one submission cycle. At most one cycle is in flight at a time;
    /// the busy state is cleared on every exit path.
    pub async fn handle_submit(&self, fields: FormFields) -> SubmitOutcome {
        if self.in_flight.replace(true) {
            return SubmitOutcome::InFlight;
        }
        self.view.reset();
        self.view.set_busy(true);
        let _idle = IdleGuard {
            view: &self.view,
            in_flight: &self.in_flight,
        };

        match self.run(fields).await {
            Ok(()) => SubmitOutcome::Completed,
            Err(err) => {
                tracing::error!(error = %err, "analysis submission failed");
                self.view.show_error(&err.to_string());
                SubmitOutcome::Failed(err)
            }
        }
    }

    async fn run(&self, fields: FormFields) -> Result<(), AnalysisError> {
        let request = AnalysisRequest::from_fields(&fields, current_year())?;
        let response = self.client.analyze(&request).await?;
        self.view.show_results(&RenderedAnalysis::from(&response));
        Ok(())
    }
}

/// Restores the idle state when a submission cycle ends, whichever way it
/// ends.
struct IdleGuard<'a, V: AnalysisView> {
    view: &'a V,
    in_flight: &'a Cell<bool>,
}

impl<V: AnalysisView> Drop for IdleGuard<'_, V> {
    fn drop(&mut self) {
        self.view.set_busy(false);
        self.in_flight.set(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_banner_tickets_are_monotonic() {
        let banner = ErrorBanner::default();
        let first = banner.post();
        let second = banner.post();
        assert!(second > first);
    }

    #[test]
    fn test_stale_ticket_does_not_expire_newer_error() {
        let banner = ErrorBanner::default();
        let first = banner.post();
        let second = banner.post();
        assert!(!banner.expire(first));
        assert!(banner.expire(second));
    }
}
