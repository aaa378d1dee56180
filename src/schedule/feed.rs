//! Keeps the selected day's job list fresh.
//!
//! Fetches run on the tokio runtime and report back over a channel that the UI
//! drains once per frame. Every request carries a sequence number and only the
//! most recent one may update the view, so a slow response for a date the user
//! already swiped away from cannot overwrite the current day.

use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use tokio::runtime::Handle;
use tracing::{debug, info, warn};

use crate::api::{FetchError, Job, ScheduleSource};

#[derive(Debug, Clone, PartialEq)]
pub enum FeedStatus {
    Idle,
    Loading,
    Loaded(Vec<Job>),
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchReason {
    DateChange,
    Poll,
    Retry,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTicket {
    pub seq: u64,
    pub date: NaiveDate,
}

/// Request bookkeeping without any I/O
#[derive(Debug)]
pub struct FeedState {
    poll_interval: Duration,
    next_seq: u64,
    latest: Option<RequestTicket>,
    last_request: Option<Instant>,
    status: FeedStatus,
    revision: u64,
}

impl FeedState {
    pub fn new(poll_interval: Duration) -> Self {
        Self {
            poll_interval,
            next_seq: 1,
            latest: None,
            last_request: None,
            status: FeedStatus::Idle,
            revision: 0,
        }
    }

    pub fn status(&self) -> &FeedStatus {
        &self.status
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.latest.map(|t| t.date)
    }

    /// Bumped every time the status is replaced
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn set_status(&mut self, status: FeedStatus) {
        self.status = status;
        self.revision += 1;
    }

    /// Issue a ticket for a new request. A poll keeps whatever is on screen;
    /// a date change or retry shows the loading state.
    pub fn begin(&mut self, date: NaiveDate, reason: FetchReason, now: Instant) -> RequestTicket {
        let ticket = RequestTicket { seq: self.next_seq, date };
        self.next_seq += 1;
        self.latest = Some(ticket);
        self.last_request = Some(now);

        if reason != FetchReason::Poll || !matches!(self.status, FeedStatus::Loaded(_)) {
            self.set_status(FeedStatus::Loading);
        }
        ticket
    }

    /// Only the most recently issued ticket may update the status
    pub fn accept(&self, ticket: &RequestTicket) -> bool {
        self.latest == Some(*ticket)
    }

    /// Record a response. Returns false when it was stale and dropped.
    pub fn complete(&mut self, ticket: RequestTicket, result: Result<Vec<Job>, FetchError>) -> bool {
        if !self.accept(&ticket) {
            debug!(seq = ticket.seq, date = %ticket.date, "dropping stale schedule response");
            return false;
        }

        let status = match result {
            Ok(jobs) => {
                debug!(date = %ticket.date, count = jobs.len(), "schedule loaded");
                FeedStatus::Loaded(jobs)
            }
            Err(err) => {
                warn!(date = %ticket.date, error = %err, "schedule fetch failed");
                if err.is_offline() {
                    FeedStatus::Failed("Offline - can't reach the schedule server".to_string())
                } else {
                    FeedStatus::Failed(err.to_string())
                }
            }
        };
        self.set_status(status);
        true
    }

    pub fn poll_due(&self, now: Instant) -> bool {
        match (self.latest, self.last_request) {
            (Some(_), Some(last)) => now.saturating_duration_since(last) >= self.poll_interval,
            _ => false,
        }
    }

    /// Time until the next poll, for scheduling a repaint
    pub fn until_next_poll(&self, now: Instant) -> Option<Duration> {
        self.last_request
            .map(|last| self.poll_interval.saturating_sub(now.saturating_duration_since(last)))
    }
}

struct FeedMessage {
    ticket: RequestTicket,
    result: Result<Vec<Job>, FetchError>,
}

pub struct ScheduleFeed<S: ScheduleSource> {
    source: Arc<S>,
    runtime: Handle,
    state: FeedState,
    in_flight: usize,
    result_tx: Sender<FeedMessage>,
    result_rx: Receiver<FeedMessage>,
}

impl<S: ScheduleSource> ScheduleFeed<S> {
    pub fn new(source: S, runtime: Handle, poll_interval: Duration) -> Self {
        let (result_tx, result_rx) = channel();
        Self {
            source: Arc::new(source),
            runtime,
            state: FeedState::new(poll_interval),
            in_flight: 0,
            result_tx,
            result_rx,
        }
    }

    pub fn status(&self) -> &FeedStatus {
        &self.state.status
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.state.date()
    }

    pub fn revision(&self) -> u64 {
        self.state.revision()
    }

    /// Requests spawned whose result has not been drained yet
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Fetch `date` now, superseding anything in flight
    pub fn request(&mut self, date: NaiveDate) {
        info!(%date, "loading schedule");
        self.spawn(date, FetchReason::DateChange);
    }

    pub fn retry(&mut self) {
        if let Some(date) = self.state.date() {
            self.spawn(date, FetchReason::Retry);
        }
    }

    /// Re-fetch the current date when the poll interval has elapsed
    pub fn tick(&mut self, now: Instant) -> bool {
        if !self.state.poll_due(now) {
            return false;
        }
        match self.state.date() {
            Some(date) => {
                debug!(%date, "polling schedule");
                self.spawn(date, FetchReason::Poll);
                true
            }
            None => false,
        }
    }

    /// Apply finished requests. Returns true when the status changed.
    pub fn drain(&mut self) -> bool {
        let mut changed = false;
        while let Ok(message) = self.result_rx.try_recv() {
            self.in_flight = self.in_flight.saturating_sub(1);
            changed |= self.state.complete(message.ticket, message.result);
        }
        changed
    }

    pub fn until_next_poll(&self, now: Instant) -> Option<Duration> {
        self.state.until_next_poll(now)
    }

    fn spawn(&mut self, date: NaiveDate, reason: FetchReason) {
        let ticket = self.state.begin(date, reason, Instant::now());
        self.in_flight += 1;
        let source = Arc::clone(&self.source);
        let tx = self.result_tx.clone();

        self.runtime.spawn(async move {
            let result = source.fetch_day(ticket.date).await;
            // receiver is gone when the view closed
            let _ = tx.send(FeedMessage { ticket, result });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Datelike;
    use std::collections::HashMap;
    use std::sync::Mutex;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    fn jobs_for(day: NaiveDate) -> Vec<Job> {
        vec![Job::new(&format!("job-{}", day), Some("9:00 AM"), Some("10:00 AM"))]
    }

    /// Drain until `done` holds, giving up after a generous deadline
    fn drain_until<S: ScheduleSource>(
        feed: &mut ScheduleFeed<S>,
        done: impl Fn(&ScheduleFeed<S>) -> bool,
    ) -> bool {
        let deadline = Instant::now() + Duration::from_secs(10);
        loop {
            feed.drain();
            if done(feed) {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
    }

    #[derive(Default)]
    struct FakeSource {
        delays: HashMap<NaiveDate, Duration>,
        calls: Arc<Mutex<Vec<NaiveDate>>>,
    }

    #[async_trait]
    impl ScheduleSource for FakeSource {
        async fn fetch_day(&self, date: NaiveDate) -> Result<Vec<Job>, FetchError> {
            self.calls.lock().unwrap().push(date);
            if let Some(delay) = self.delays.get(&date) {
                tokio::time::sleep(*delay).await;
            }
            if date.day() == 13 {
                return Err(FetchError::Status { status: 502, message: "bad gateway".into() });
            }
            Ok(jobs_for(date))
        }
    }

    #[test]
    fn stale_ticket_is_dropped() {
        let now = Instant::now();
        let mut state = FeedState::new(Duration::from_secs(30));
        let old = state.begin(date(10), FetchReason::DateChange, now);
        let new = state.begin(date(11), FetchReason::DateChange, now);

        assert!(state.complete(new, Ok(jobs_for(date(11)))));
        assert!(!state.complete(old, Ok(jobs_for(date(10)))));
        assert_eq!(state.status(), &FeedStatus::Loaded(jobs_for(date(11))));
    }

    #[test]
    fn poll_keeps_loaded_jobs_visible() {
        let now = Instant::now();
        let mut state = FeedState::new(Duration::from_secs(30));
        let first = state.begin(date(10), FetchReason::DateChange, now);
        assert_eq!(state.status(), &FeedStatus::Loading);
        state.complete(first, Ok(jobs_for(date(10))));

        assert!(!state.poll_due(now + Duration::from_secs(29)));
        assert!(state.poll_due(now + Duration::from_secs(30)));

        let revision = state.revision();
        state.begin(date(10), FetchReason::Poll, now + Duration::from_secs(30));
        assert!(matches!(state.status(), FeedStatus::Loaded(_)));
        assert_eq!(state.revision(), revision);
    }

    #[test]
    fn failure_offers_retry_state() {
        let now = Instant::now();
        let mut state = FeedState::new(Duration::from_secs(30));
        let ticket = state.begin(date(10), FetchReason::DateChange, now);
        state.complete(ticket, Err(FetchError::Decode("eof".into())));
        assert!(matches!(state.status(), FeedStatus::Failed(msg) if msg.contains("eof")));

        state.begin(date(10), FetchReason::Retry, now);
        assert_eq!(state.status(), &FeedStatus::Loading);
    }

    #[test]
    fn nothing_polls_before_first_request() {
        let state = FeedState::new(Duration::from_secs(30));
        assert!(!state.poll_due(Instant::now() + Duration::from_secs(600)));
        assert_eq!(state.until_next_poll(Instant::now()), None);
    }

    #[test]
    fn slow_response_for_old_date_cannot_win() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let source = FakeSource {
            delays: HashMap::from([(date(10), Duration::from_millis(300))]),
            ..FakeSource::default()
        };
        let mut feed = ScheduleFeed::new(source, runtime.handle().clone(), Duration::from_secs(30));

        feed.request(date(10));
        feed.request(date(11));
        assert_eq!(feed.in_flight(), 2);

        assert!(drain_until(&mut feed, |f| f.status() == &FeedStatus::Loaded(jobs_for(date(11)))));
        let revision = feed.revision();

        // the slow response for the 10th still arrives, and is ignored
        assert!(drain_until(&mut feed, |f| f.in_flight() == 0));
        assert_eq!(feed.revision(), revision);
        assert_eq!(feed.status(), &FeedStatus::Loaded(jobs_for(date(11))));
        assert_eq!(feed.date(), Some(date(11)));
    }

    #[test]
    fn fetch_error_surfaces_and_retry_refetches() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let calls = Arc::new(Mutex::new(Vec::new()));
        let source = FakeSource {
            calls: Arc::clone(&calls),
            ..FakeSource::default()
        };
        let mut feed = ScheduleFeed::new(source, runtime.handle().clone(), Duration::from_secs(30));

        feed.request(date(13));
        assert!(drain_until(&mut feed, |f| matches!(f.status(), FeedStatus::Failed(_))));
        assert!(matches!(feed.status(), FeedStatus::Failed(msg) if msg.contains("502")));

        feed.retry();
        assert_eq!(feed.status(), &FeedStatus::Loading);
        assert!(drain_until(&mut feed, |f| f.in_flight() == 0));
        assert_eq!(*calls.lock().unwrap(), vec![date(13), date(13)]);
    }

    #[test]
    fn tick_refetches_after_interval() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let calls = Arc::new(Mutex::new(Vec::new()));
        let source = FakeSource {
            calls: Arc::clone(&calls),
            ..FakeSource::default()
        };
        let mut feed = ScheduleFeed::new(source, runtime.handle().clone(), Duration::from_secs(30));

        let start = Instant::now();
        assert!(!feed.tick(start));
        feed.request(date(10));
        assert!(!feed.tick(Instant::now()));
        assert!(feed.tick(Instant::now() + Duration::from_secs(31)));

        assert!(drain_until(&mut feed, |f| f.in_flight() == 0));
        assert_eq!(calls.lock().unwrap().len(), 2);
        assert_eq!(feed.status(), &FeedStatus::Loaded(jobs_for(date(10))));
    }
}
