//! Cron-driven report runs.
//!
//! Each configured schedule gets its own trigger loop. A firing resolves the
//! period (full reports only), aggregates stats, composes the message, and
//! attempts delivery, one manager at a time. Failures are contained at the
//! per-manager boundary so one bad record or one rejected delivery never
//! aborts the rest of the batch.

use crate::config::{ReportKind, ScheduleSpec, WindowPolicy, REPORT_TIMEZONE};
use crate::error::{ReportError, Result};
use crate::notify::Notifier;
use crate::period::{saturday_week, trailing_week, ReportingWindow};
use crate::report::{compose_balance_only, compose_full, ReportStyle};
use crate::schema::Manager;
use crate::stats::aggregate;
use crate::store::RecordStore;
use chrono::Utc;
use cron::Schedule;
use futures::FutureExt;
use log::{error, info, warn};
use std::panic::AssertUnwindSafe;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Outcome counters for one triggered run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub delivered: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// One run's work: fetch managers, then report per manager sequentially.
/// Stateless between invocations; everything is re-fetched each run.
pub struct ReportJob<S, N> {
    store: S,
    notifier: N,
    usdt_rate: f64,
}

impl<S: RecordStore, N: Notifier> ReportJob<S, N> {
    pub fn new(store: S, notifier: N, usdt_rate: f64) -> Self {
        Self {
            store,
            notifier,
            usdt_rate,
        }
    }

    pub async fn run(&self, spec: &ScheduleSpec) -> RunSummary {
        info!("Running schedule {}", spec.name);
        let mut summary = RunSummary::default();

        let managers = match self.store.fetch_managers().await {
            Ok(managers) => managers,
            Err(err) => {
                error!("Schedule {}: manager fetch failed: {}", spec.name, err);
                return summary;
            }
        };

        if managers.is_empty() {
            return summary;
        }

        let style = ReportStyle {
            usdt_rate: self.usdt_rate,
            negate_balance_display: spec.negate_balance_display,
            timezone: REPORT_TIMEZONE,
        };

        for manager in &managers {
            // The per-manager boundary contains everything, panics included:
            // a misbehaving store or notifier impl must not starve the
            // managers that come after it.
            let outcome = AssertUnwindSafe(self.process_manager(spec, &style, manager))
                .catch_unwind()
                .await
                .unwrap_or_else(|payload| {
                    let method = manager.payment.clone().unwrap_or_default();
                    error!(
                        "Schedule {}: processing for {} panicked ({}), continuing",
                        spec.name,
                        method,
                        panic_message(payload.as_ref())
                    );
                    Outcome::Failed(method)
                });

            match outcome {
                Outcome::Delivered(method) => {
                    info!("Schedule {}: report sent to {}", spec.name, method);
                    summary.delivered += 1;
                }
                Outcome::Failed(method) => {
                    warn!("Schedule {}: delivery failed for {}", spec.name, method);
                    summary.failed += 1;
                }
                Outcome::Skipped => summary.skipped += 1,
            }
        }

        summary
    }

    async fn process_manager(
        &self,
        spec: &ScheduleSpec,
        style: &ReportStyle,
        manager: &Manager,
    ) -> Outcome {
        // Incomplete routing means no aggregation and no delivery attempt.
        let Some((method, group_id)) = manager.routing() else {
            return Outcome::Skipped;
        };

        let text = match spec.kind {
            ReportKind::Full(policy) => {
                let window = resolve_window(policy);
                let stats = aggregate(&self.store, method, window).await;
                compose_full(style, method, &window, &stats, manager.balance)
            }
            ReportKind::BalanceOnly => compose_balance_only(style, method, manager.balance),
        };

        if self.notifier.deliver(group_id, &text).await {
            Outcome::Delivered(method.to_string())
        } else {
            Outcome::Failed(method.to_string())
        }
    }
}

enum Outcome {
    Delivered(String),
    Failed(String),
    Skipped,
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

fn resolve_window(policy: WindowPolicy) -> ReportingWindow {
    let now = Utc::now().with_timezone(&REPORT_TIMEZONE);
    match policy {
        WindowPolicy::TrailingWeek => trailing_week(now),
        WindowPolicy::SaturdayWeek => saturday_week(now),
    }
}

struct Trigger {
    spec: ScheduleSpec,
    schedule: Schedule,
}

/// Owns one trigger loop per schedule; resident until shutdown.
pub struct Scheduler<S, N> {
    job: Arc<ReportJob<S, N>>,
    triggers: Vec<Trigger>,
}

impl<S, N> Scheduler<S, N>
where
    S: RecordStore + 'static,
    N: Notifier + 'static,
{
    pub fn new(job: ReportJob<S, N>, schedules: Vec<ScheduleSpec>) -> Result<Self> {
        let triggers = schedules
            .into_iter()
            .map(|spec| {
                let schedule = Schedule::from_str(spec.cron_expr).map_err(|e| {
                    ReportError::InvalidSchedule {
                        expr: spec.cron_expr.to_string(),
                        details: e.to_string(),
                    }
                })?;
                Ok(Trigger { spec, schedule })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            job: Arc::new(job),
            triggers,
        })
    }

    /// Spawns every trigger loop, then waits for `shutdown`. New firings stop
    /// on shutdown; an in-flight run may finish or be abandoned with the
    /// process, no draining guarantee is made.
    pub async fn run_until_shutdown(self, shutdown: impl std::future::Future<Output = ()>) {
        let handles: Vec<_> = self
            .triggers
            .into_iter()
            .map(|trigger| {
                let job = self.job.clone();
                tokio::spawn(trigger_loop(job, trigger))
            })
            .collect();

        shutdown.await;
        info!("Shutdown signal received, stopping schedules");
        for handle in &handles {
            handle.abort();
        }
    }
}

async fn trigger_loop<S, N>(job: Arc<ReportJob<S, N>>, trigger: Trigger)
where
    S: RecordStore + 'static,
    N: Notifier + 'static,
{
    // Guards against a firing overlapping the previous run of this same
    // trigger; an overlapping firing is skipped, not queued.
    let in_flight = Arc::new(AtomicBool::new(false));

    loop {
        let now = Utc::now().with_timezone(&REPORT_TIMEZONE);
        let Some(next) = trigger.schedule.after(&now).next() else {
            warn!("Schedule {} has no future firings", trigger.spec.name);
            break;
        };

        let Ok(wait) = (next - now).to_std() else {
            continue;
        };
        tokio::time::sleep(wait).await;

        fire_guarded(&job, &trigger.spec, &in_flight);
    }
}

/// One firing: starts a run unless the previous run of this same trigger is
/// still in flight, in which case the firing is skipped, not queued.
/// Returns whether a run was started.
fn fire_guarded<S, N>(
    job: &Arc<ReportJob<S, N>>,
    spec: &ScheduleSpec,
    in_flight: &Arc<AtomicBool>,
) -> bool
where
    S: RecordStore + 'static,
    N: Notifier + 'static,
{
    if in_flight.swap(true, Ordering::SeqCst) {
        warn!(
            "Schedule {} fired while previous run still in flight, skipping",
            spec.name
        );
        return false;
    }

    let job = job.clone();
    let spec = spec.clone();
    let flag = in_flight.clone();
    tokio::spawn(async move {
        let summary = job.run(&spec).await;
        info!(
            "Schedule {} finished: {} delivered, {} failed, {} skipped",
            spec.name, summary.delivered, summary.failed, summary.skipped
        );
        flag.store(false, Ordering::SeqCst);
    });
    true
}
