//! HTTP delivery of events to a Sentry-compatible store endpoint.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc as std_mpsc;
use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;
use serde_json::{json, Map, Value};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::config::schema::ReporterConfig;
use crate::logger::Level;
use crate::reporter::backoff::Backoff;
use crate::reporter::{Dsn, Event, Reporter};

const CLIENT_NAME: &str = concat!("fieldlog/", env!("CARGO_PKG_VERSION"));

/// Errors starting the reporter.
#[derive(Debug, Error)]
pub enum ReporterError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("failed to start delivery runtime: {0}")]
    Runtime(#[source] std::io::Error),

    #[error("failed to spawn delivery thread: {0}")]
    Thread(#[source] std::io::Error),
}

enum Command {
    Deliver(Box<Event>),
    Flush(std_mpsc::SyncSender<()>),
}

/// Reporter posting events from a dedicated background thread.
///
/// The thread runs a current-thread tokio runtime so callers need no runtime
/// of their own. Deliveries run concurrently; `flush` waits for all of them.
pub struct HttpReporter {
    tx: mpsc::UnboundedSender<Command>,
    levels: Vec<Level>,
    pending: Arc<AtomicUsize>,
    capacity: usize,
    flush_timeout: Duration,
}

impl HttpReporter {
    pub fn new(dsn: Dsn, config: &ReporterConfig) -> Result<Self, ReporterError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(ReporterError::Runtime)?;

        let (tx, rx) = mpsc::unbounded_channel();
        let pending = Arc::new(AtomicUsize::new(0));

        let delivery = Arc::new(Delivery {
            client,
            dsn,
            max_retries: config.max_retries,
            backoff: Backoff::from_config(config),
        });

        tracing::debug!(
            endpoint = %delivery.dsn.store_url(),
            levels = ?config.levels,
            "Starting error reporter"
        );

        let worker_pending = pending.clone();
        std::thread::Builder::new()
            .name("fieldlog-reporter".to_string())
            .spawn(move || runtime.block_on(run_worker(rx, delivery, worker_pending)))
            .map_err(ReporterError::Thread)?;

        Ok(Self {
            tx,
            levels: config.levels.clone(),
            pending,
            capacity: config.queue_capacity,
            flush_timeout: Duration::from_millis(config.flush_timeout_ms),
        })
    }

    /// Events queued or in flight.
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }
}

impl Reporter for HttpReporter {
    fn accepts(&self, level: Level) -> bool {
        self.levels.contains(&level)
    }

    fn report(&self, event: Event) {
        if self.pending.fetch_add(1, Ordering::SeqCst) >= self.capacity {
            self.pending.fetch_sub(1, Ordering::SeqCst);
            tracing::warn!(
                event_id = %event.event_id,
                capacity = self.capacity,
                "Report queue full, dropping event"
            );
            return;
        }

        if self.tx.send(Command::Deliver(Box::new(event))).is_err() {
            self.pending.fetch_sub(1, Ordering::SeqCst);
            tracing::warn!("Reporter worker stopped, dropping event");
        }
    }

    fn flush(&self) {
        let (ack_tx, ack_rx) = std_mpsc::sync_channel(1);
        if self.tx.send(Command::Flush(ack_tx)).is_err() {
            return;
        }

        if ack_rx.recv_timeout(self.flush_timeout).is_err() {
            tracing::warn!(
                pending = self.pending(),
                timeout_ms = self.flush_timeout.as_millis() as u64,
                "Reporter flush timed out"
            );
        }
    }
}

async fn run_worker(
    mut rx: mpsc::UnboundedReceiver<Command>,
    delivery: Arc<Delivery>,
    pending: Arc<AtomicUsize>,
) {
    let mut in_flight = JoinSet::new();

    loop {
        tokio::select! {
            command = rx.recv() => match command {
                Some(Command::Deliver(event)) => {
                    let delivery = delivery.clone();
                    let pending = pending.clone();
                    in_flight.spawn(async move {
                        delivery.deliver(&event).await;
                        pending.fetch_sub(1, Ordering::SeqCst);
                    });
                }
                Some(Command::Flush(ack)) => {
                    while in_flight.join_next().await.is_some() {}
                    let _ = ack.send(());
                }
                None => break,
            },
            Some(_) = in_flight.join_next(), if !in_flight.is_empty() => {}
        }
    }

    while in_flight.join_next().await.is_some() {}
}

struct Delivery {
    client: reqwest::Client,
    dsn: Dsn,
    max_retries: u32,
    backoff: Backoff,
}

impl Delivery {
    async fn deliver(&self, event: &Event) {
        let body = payload(event);
        let auth = self.dsn.auth_header(CLIENT_NAME);

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                tokio::time::sleep(self.backoff.delay(attempt)).await;
            }

            let result = self
                .client
                .post(self.dsn.store_url().clone())
                .header("X-Sentry-Auth", auth.as_str())
                .json(&body)
                .send()
                .await;

            match result {
                Ok(response) if response.status().is_success() => return,
                Ok(response) if is_retryable(response.status()) => {
                    tracing::debug!(
                        event_id = %event.event_id,
                        status = %response.status(),
                        attempt,
                        "Report delivery failed, retrying"
                    );
                }
                Ok(response) => {
                    tracing::warn!(
                        event_id = %event.event_id,
                        status = %response.status(),
                        "Report rejected by collector"
                    );
                    return;
                }
                Err(e) => {
                    tracing::debug!(event_id = %event.event_id, error = %e, attempt, "Report delivery error, retrying");
                }
            }
        }

        tracing::warn!(
            event_id = %event.event_id,
            attempts = self.max_retries + 1,
            "Dropping report after exhausting retries"
        );
    }
}

fn is_retryable(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

/// Store-endpoint body for one event.
pub fn payload(event: &Event) -> Value {
    let tags: Map<String, Value> = event
        .tags
        .iter()
        .map(|(key, value)| (key.clone(), Value::String(value.clone())))
        .collect();

    json!({
        "event_id": event.event_id.simple().to_string(),
        "timestamp": event.timestamp.to_rfc3339(),
        "level": event.level.as_str(),
        "message": event.message,
        "logger": "fieldlog",
        "platform": "other",
        "tags": tags,
        "extra": event.fields,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Fields;
    use crate::fields;

    fn config(capacity: usize) -> ReporterConfig {
        ReporterConfig {
            queue_capacity: capacity,
            flush_timeout_ms: 200,
            max_retries: 0,
            ..ReporterConfig::default()
        }
    }

    #[test]
    fn test_payload_shape() {
        let event = Event::new(
            Level::Warn,
            "slow query",
            fields! { "elapsed_ms" => 950 },
            vec![("service".to_string(), "billing".to_string())],
        );
        let body = payload(&event);

        assert_eq!(body["level"], "warning");
        assert_eq!(body["message"], "slow query");
        assert_eq!(body["extra"]["elapsed_ms"], 950);
        assert_eq!(body["tags"]["service"], "billing");
        assert_eq!(body["event_id"].as_str().unwrap().len(), 32);
    }

    #[test]
    fn test_retryable_statuses() {
        assert!(is_retryable(StatusCode::TOO_MANY_REQUESTS));
        assert!(is_retryable(StatusCode::BAD_GATEWAY));
        assert!(!is_retryable(StatusCode::BAD_REQUEST));
    }

    #[test]
    fn test_accepts_configured_levels() {
        let dsn = Dsn::parse("http://key@127.0.0.1:9/1").unwrap();
        let reporter = HttpReporter::new(dsn, &config(4)).unwrap();

        assert!(reporter.accepts(Level::Error));
        assert!(reporter.accepts(Level::Warn));
        assert!(!reporter.accepts(Level::Info));
    }

    #[test]
    fn test_queue_capacity_drops_excess() {
        // Port 9 (discard) is closed on test hosts, deliveries fail fast.
        let dsn = Dsn::parse("http://key@127.0.0.1:9/1").unwrap();
        let reporter = HttpReporter::new(dsn, &config(0)).unwrap();

        reporter.report(Event::new(Level::Error, "dropped", Fields::new(), Vec::new()));
        assert_eq!(reporter.pending(), 0);
        reporter.flush();
    }
}
