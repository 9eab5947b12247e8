use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDate};
use futures_util::{StreamExt, stream};
use mongodb::bson::oid::ObjectId;
use thiserror::Error;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::models::Threshold;
use crate::services::mailer::{EmailMessage, Mailer};
use crate::services::threshold_service::ThresholdStore;
use crate::services::twelvedata::{ChartProvider, Interval};
use crate::services::user_service::UserDirectory;

/// Thresholds evaluated at once within a single pass. Each threshold's
/// fetch -> evaluate -> enqueue -> disable sequence is independent, so only
/// upstream rate limits bound this.
const CONCURRENT_EVALUATIONS: usize = 8;

/// Why one threshold's processing stopped early this pass. None of these
/// mutate the threshold; it stays enabled and is re-evaluated next pass.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("chart lookup for {ticker} failed: {reason}")]
    Chart { ticker: String, reason: String },

    #[error("directory lookup for user {0} failed: {1}")]
    Directory(ObjectId, String),

    #[error("user {0} has no notification address")]
    NoRecipient(ObjectId),

    #[error("mail enqueue failed: {0}")]
    Enqueue(String),

    /// The notification was already queued when the disable write failed,
    /// so the same breach may notify again next pass.
    #[error("disable after enqueue failed: {0}")]
    Disable(String),
}

/// What one pass did with one threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Provider had nothing for today; checked again next pass.
    NoData,
    /// Price available, threshold not breached.
    Holding,
    /// Breached: notification enqueued, threshold disabled.
    Fired,
}

/// Periodically evaluates every enabled threshold against the latest price
/// and fires each at most once.
pub struct AlertScheduler {
    store: Arc<dyn ThresholdStore>,
    charts: Arc<dyn ChartProvider>,
    directory: Arc<dyn UserDirectory>,
    mailer: Arc<dyn Mailer>,
    tick: Duration,
}

impl AlertScheduler {
    pub fn new(
        store: Arc<dyn ThresholdStore>,
        charts: Arc<dyn ChartProvider>,
        directory: Arc<dyn UserDirectory>,
        mailer: Arc<dyn Mailer>,
        tick: Duration,
    ) -> Self {
        Self {
            store,
            charts,
            directory,
            mailer,
            tick,
        }
    }

    /// Spawns the recurring evaluation loop. Passes never overlap: the loop
    /// awaits each pass, delays missed ticks, and abandons a pass that
    /// outlives its own interval (abandoned thresholds stay enabled and are
    /// picked up by the next snapshot).
    pub fn spawn(self) {
        tokio::spawn(async move {
            let mut interval = time::interval(self.tick);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                interval.tick().await;

                match time::timeout(self.tick, self.run_pass()).await {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => warn!("threshold pass aborted: {e}"),
                    Err(_) => warn!(
                        "threshold pass exceeded {:?}, abandoned until next tick",
                        self.tick
                    ),
                }
            }
        });
    }

    /// One full evaluation pass over a snapshot of the enabled thresholds.
    /// Only a failed snapshot aborts the pass; everything after that is
    /// contained per threshold.
    pub async fn run_pass(&self) -> Result<(), String> {
        let snapshot = self.store.list_enabled_grouped().await?;
        if snapshot.is_empty() {
            return Ok(());
        }

        // One calendar date for the whole pass, even across midnight.
        let date = Local::now().date_naive();

        let work: Vec<(ObjectId, Threshold)> = snapshot
            .into_iter()
            .flat_map(|(user_id, thresholds)| {
                thresholds.into_iter().map(move |th| (user_id, th))
            })
            .collect();

        debug!("evaluating {} enabled threshold(s)", work.len());

        stream::iter(work)
            .for_each_concurrent(CONCURRENT_EVALUATIONS, |(user_id, th)| async move {
                let id = th.id;
                let ticker = th.ticker.clone();

                match self.process_threshold(user_id, th, date).await {
                    Ok(TickOutcome::Fired) => {
                        info!(threshold = %id, ticker = %ticker, "price alert fired")
                    }
                    Ok(TickOutcome::NoData) => {
                        debug!(threshold = %id, ticker = %ticker, "no price data, deferred")
                    }
                    Ok(TickOutcome::Holding) => {}
                    Err(ProcessError::Disable(reason)) => {
                        // Already notified; a duplicate notification next
                        // pass is possible until the disable lands.
                        error!(
                            threshold = %id,
                            ticker = %ticker,
                            reason = %reason,
                            "notified but disable failed, may notify again next pass"
                        )
                    }
                    Err(e) => {
                        warn!(threshold = %id, ticker = %ticker, error = %e, "skipped this pass")
                    }
                }
            })
            .await;

        Ok(())
    }

    async fn process_threshold(
        &self,
        user_id: ObjectId,
        th: Threshold,
        date: NaiveDate,
    ) -> Result<TickOutcome, ProcessError> {
        // 1) Latest close for today
        let series = self
            .charts
            .chart(&th.ticker, date, Interval::Min1)
            .await
            .map_err(|reason| ProcessError::Chart {
                ticker: th.ticker.clone(),
                reason,
            })?;

        let Some(price) = series.latest_close() else {
            return Ok(TickOutcome::NoData);
        };
        if !price.is_finite() {
            return Ok(TickOutcome::NoData);
        }

        // 2) Breach check
        if !th.breached_by(price) {
            return Ok(TickOutcome::Holding);
        }

        // 3) Where to send it
        let address = self
            .directory
            .notification_address(user_id)
            .await
            .map_err(|e| ProcessError::Directory(user_id, e))?;
        let Some(to) = address else {
            return Err(ProcessError::NoRecipient(user_id));
        };

        // 4) Enqueue the notification
        let message = breach_message(&to, &th, price);
        self.mailer
            .enqueue(&message)
            .await
            .map_err(ProcessError::Enqueue)?;

        // 5) Disable, strictly after a successful enqueue: a failed enqueue
        // must leave the threshold armed for the next pass.
        self.store
            .disable(user_id, th.id)
            .await
            .map_err(ProcessError::Disable)?;

        Ok(TickOutcome::Fired)
    }
}

fn breach_message(to: &str, th: &Threshold, price: f64) -> EmailMessage {
    EmailMessage {
        to: to.to_string(),
        subject: format!("📈 Alert: {} is {} {}", th.ticker, th.condition, th.target),
        text: format!(
            "{} is now {}, which is {} your threshold of {}.",
            th.ticker, price, th.condition, th.target
        ),
        html: format!(
            "<p><strong>{}</strong> is now <strong>{}</strong>, which is <strong>{}</strong> \
             your threshold of <strong>{}</strong>.</p>",
            th.ticker, price, th.condition, th.target
        ),
    }
}
