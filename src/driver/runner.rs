//! Concurrent actor execution
//!
//! This module provides the `ActorDriver` struct, which runs many actor
//! requests against a shared [`LedgerEngine`] and waits for all of them.
//!
//! # Design
//!
//! Ledger operations block on account locks and store I/O, so each actor runs
//! on tokio's blocking pool via `spawn_blocking`. A semaphore bounds the number
//! of actors executing at once to `DriverConfig::workers`. All actors are
//! joined with `futures::future::join_all`, which also keeps reports in
//! request order.
//!
//! ```text
//! ActorDriver
//!     ├── Arc<LedgerEngine<S>>   (shared engine + lock registry)
//!     └── DriverConfig           (workers, auto_create)
//! ```

use super::config::DriverConfig;
use crate::core::{AccountStore, LedgerEngine};
use crate::types::{ActorRequest, LedgerError, Operation, Outcome};
use futures::future::join_all;
use rust_decimal::Decimal;
use std::fmt;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinError;
use tracing::{error, info};

/// Outcome of one actor
#[derive(Debug, Clone, PartialEq)]
pub struct ActorReport {
    /// The request the actor ran
    pub request: ActorRequest,

    /// Terminal outcome of its operation
    pub outcome: Outcome,
}

/// Runs actors concurrently against one engine
#[derive(Debug)]
pub struct ActorDriver<S> {
    engine: Arc<LedgerEngine<S>>,
    config: DriverConfig,
}

impl<S> Clone for ActorDriver<S> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            config: self.config.clone(),
        }
    }
}

impl<S: AccountStore + 'static> ActorDriver<S> {
    pub fn new(engine: Arc<LedgerEngine<S>>, config: DriverConfig) -> Self {
        Self { engine, config }
    }

    pub fn engine(&self) -> &Arc<LedgerEngine<S>> {
        &self.engine
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Run every request as an independent actor and wait for all of them
    ///
    /// # Returns
    ///
    /// One report per request, in request order. An actor that panics or is
    /// cancelled is reported as `StoreError(LockAcquisition)`; the others are
    /// unaffected.
    pub async fn run(&self, requests: Vec<ActorRequest>) -> Vec<ActorReport> {
        let limiter = Arc::new(Semaphore::new(self.config.workers));

        let actors = requests.into_iter().map(|request| {
            let engine = Arc::clone(&self.engine);
            let limiter = Arc::clone(&limiter);
            let auto_create = self.config.auto_create;

            async move {
                // The semaphore is never closed, so acquisition only waits.
                let permit = limiter.acquire_owned().await.ok();
                let fallback = request.clone();

                let joined = tokio::task::spawn_blocking(move || {
                    let _permit = permit;
                    let outcome = run_actor(&engine, &request, auto_create);
                    ActorReport { request, outcome }
                })
                .await;

                joined.unwrap_or_else(|e| unfinished_report(fallback, e))
            }
        });

        let reports = join_all(actors).await;
        info!(actors = reports.len(), "all actors finished");
        reports
    }

    /// Run all requests on a dedicated multi-threaded runtime
    ///
    /// # Errors
    ///
    /// Returns an error if the tokio runtime cannot be created.
    pub fn run_blocking(&self, requests: Vec<ActorRequest>) -> std::io::Result<Vec<ActorReport>> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .max_blocking_threads(self.config.workers)
            .build()?;

        Ok(runtime.block_on(self.run(requests)))
    }
}

/// Report for an actor whose task never returned
fn unfinished_report(request: ActorRequest, e: JoinError) -> ActorReport {
    let reason = if e.is_panic() {
        "actor panicked"
    } else {
        "actor cancelled"
    };
    error!(account = %request.account, "{}: {:?}", reason, e);
    ActorReport {
        request,
        outcome: Outcome::StoreError(LedgerError::lock_acquisition(format!("{}: {}", reason, e))),
    }
}

/// Execute one actor's request
///
/// With `auto_create`, the actor first makes sure its own account exists,
/// opening it with the request amount, then runs its operation. A store
/// failure while opening ends the actor there.
pub fn run_actor<S: AccountStore>(
    engine: &LedgerEngine<S>,
    request: &ActorRequest,
    auto_create: bool,
) -> Outcome {
    if auto_create && request.operation != Operation::Create {
        let opening = request.amount.max(Decimal::ZERO);
        let opened = engine.create(&request.account, opening);
        if matches!(opened, Outcome::StoreError(_)) {
            return opened;
        }
    }

    let outcome = engine.execute(request);
    tracing::debug!(
        account = %request.account,
        operation = request.operation.as_str(),
        outcome = outcome.label(),
        "actor finished"
    );
    outcome
}

/// Count of actor outcomes per variant
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutcomeSummary {
    pub committed: usize,
    pub rolled_back: usize,
    pub rejected: usize,
    pub store_errors: usize,
}

impl OutcomeSummary {
    pub fn total(&self) -> usize {
        self.committed + self.rolled_back + self.rejected + self.store_errors
    }
}

impl fmt::Display for OutcomeSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} actors: {} committed, {} rolled back, {} rejected, {} store errors",
            self.total(),
            self.committed,
            self.rolled_back,
            self.rejected,
            self.store_errors
        )
    }
}

/// Tally outcomes across reports
pub fn summarize(reports: &[ActorReport]) -> OutcomeSummary {
    reports
        .iter()
        .fold(OutcomeSummary::default(), |mut summary, report| {
            match report.outcome {
                Outcome::Committed(_) => summary.committed += 1,
                Outcome::RolledBack(_) => summary.rolled_back += 1,
                Outcome::Rejected(_) => summary.rejected += 1,
                Outcome::StoreError(_) => summary.store_errors += 1,
            }
            summary
        })
}
