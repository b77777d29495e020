//! In-process implementations of the platform contracts.
//!
//! [`TokioJobHost`] runs jobs as tokio tasks. It satisfies the scheduling
//! contract's idempotence-by-id rules: one-shot scheduling replaces a
//! pending job with the same id, recurring scheduling keeps an existing one.
//! Durability across process restarts comes from re-arming at startup, which
//! the keep-existing policy makes free.

use std::{
  collections::HashMap,
  sync::Mutex,
  time::Duration,
};

use chrono::{DateTime, FixedOffset, Local, Offset as _, Utc};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use daybook_core::{
  schedule::{Clock, JobFn, JobFuture, JobHost, Notifier},
  Result,
};

// ─── Job host ────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct TokioJobHost {
  jobs: Mutex<HashMap<String, JoinHandle<()>>>,
}

impl TokioJobHost {
  pub fn new() -> Self { Self::default() }

  #[cfg(test)]
  pub(crate) fn job_count(&self) -> usize {
    self.jobs.lock().expect("job table poisoned").len()
  }
}

impl JobHost for TokioJobHost {
  fn schedule_once(&self, job_id: &str, delay: Duration, job: JobFuture) {
    let mut jobs = self.jobs.lock().expect("job table poisoned");

    // Completed handles are dead weight; drop them before inserting so the
    // table stays bounded by the number of *live* jobs.
    jobs.retain(|_, handle| !handle.is_finished());

    // Replace-by-id: a pending one-shot with the same id is dropped.
    if let Some(existing) = jobs.remove(job_id) {
      existing.abort();
    }

    let handle = tokio::spawn(async move {
      tokio::time::sleep(delay).await;
      job.await;
    });
    jobs.insert(job_id.to_owned(), handle);
  }

  fn schedule_recurring(
    &self,
    job_id: &str,
    interval: Duration,
    initial_delay: Duration,
    job: JobFn,
  ) {
    let mut jobs = self.jobs.lock().expect("job table poisoned");

    // Keep-existing: an armed recurring job is left untouched.
    if let Some(existing) = jobs.get(job_id)
      && !existing.is_finished()
    {
      debug!(job_id, "recurring job already armed; keeping existing schedule");
      return;
    }

    let handle = tokio::spawn(async move {
      tokio::time::sleep(initial_delay).await;
      loop {
        job().await;
        tokio::time::sleep(interval).await;
      }
    });
    jobs.insert(job_id.to_owned(), handle);
  }

  fn shutdown(&self) {
    let mut jobs = self.jobs.lock().expect("job table poisoned");
    for (_, handle) in jobs.drain() {
      handle.abort();
    }
  }
}

// ─── Clock ───────────────────────────────────────────────────────────────────

/// Wall-clock time with the host's local UTC offset.
pub struct SystemClock;

impl Clock for SystemClock {
  fn now(&self) -> DateTime<Utc> { Utc::now() }

  fn local_offset(&self) -> FixedOffset { Local::now().offset().fix() }
}

// ─── Notifier ────────────────────────────────────────────────────────────────

/// Notification "delivery" via the log. Real delivery mechanics are an
/// external collaborator; this is the default stand-in.
pub struct LogNotifier;

impl Notifier for LogNotifier {
  fn notify(&self, title: &str, body: &str) -> Result<()> {
    info!(title, body, "reminder notification");
    Ok(())
  }
}
