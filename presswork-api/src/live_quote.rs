//! Latest-wins quoting for interactive product pages.
//!
//! A shopper changing size, material or quantity fires a quote per change,
//! and responses can arrive out of order. [`QuoteSequencer`] stamps each
//! request with a ticket and accepts only the newest one's result;
//! [`DebouncedQuoter`] adds the debounce window and cancels superseded work.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use presswork_catalog::{Quote, QuoteRequest};
use presswork_core::QuoteService;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::error::{AppError, ErrorBody};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

/// Issues monotonically increasing tickets and remembers the newest.
#[derive(Debug, Default)]
pub struct QuoteSequencer {
    latest: AtomicU64,
}

impl QuoteSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self) -> Ticket {
        Ticket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }

    /// Keep `result` only if no newer ticket has been issued.
    pub fn accept<T>(&self, ticket: Ticket, result: T) -> Option<T> {
        self.is_current(ticket).then_some(result)
    }
}

/// Where quotes come from: the in-process service, or a fake in tests.
#[async_trait]
pub trait QuoteSource: Send + Sync + 'static {
    async fn quote(&self, request: QuoteRequest) -> Result<Quote, ErrorBody>;
}

#[async_trait]
impl QuoteSource for QuoteService {
    async fn quote(&self, request: QuoteRequest) -> Result<Quote, ErrorBody> {
        QuoteService::quote(self, &request)
            .await
            .map_err(|err| AppError::from(err).body())
    }
}

/// What the product page should display.
#[derive(Debug, Clone, PartialEq)]
pub enum LiveQuote {
    Idle,
    Pending { ticket: Ticket },
    Ready { ticket: Ticket, quote: Box<Quote> },
    Failed { ticket: Ticket, error: ErrorBody },
}

impl LiveQuote {
    pub fn ticket(&self) -> Option<Ticket> {
        match self {
            LiveQuote::Idle => None,
            LiveQuote::Pending { ticket }
            | LiveQuote::Ready { ticket, .. }
            | LiveQuote::Failed { ticket, .. } => Some(*ticket),
        }
    }
}

/// Debounces quote requests and publishes only the newest result.
pub struct DebouncedQuoter {
    source: Arc<dyn QuoteSource>,
    sequencer: Arc<QuoteSequencer>,
    debounce: Duration,
    in_flight: Mutex<Option<JoinHandle<()>>>,
    state: Arc<watch::Sender<LiveQuote>>,
}

impl DebouncedQuoter {
    pub fn new(source: Arc<dyn QuoteSource>, debounce: Duration) -> Self {
        let (tx, _rx) = watch::channel(LiveQuote::Idle);
        Self {
            source,
            sequencer: Arc::new(QuoteSequencer::new()),
            debounce,
            in_flight: Mutex::new(None),
            state: Arc::new(tx),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<LiveQuote> {
        self.state.subscribe()
    }

    pub fn current(&self) -> LiveQuote {
        self.state.borrow().clone()
    }

    /// Supersede whatever is pending with `request`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn request(&self, request: QuoteRequest) -> Ticket {
        let mut ticket = Ticket(0);
        self.state.send_modify(|state| {
            ticket = self.sequencer.issue();
            *state = LiveQuote::Pending { ticket };
        });

        let source = self.source.clone();
        let sequencer = self.sequencer.clone();
        let state = self.state.clone();
        let debounce = self.debounce;
        let task = tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            if !sequencer.is_current(ticket) {
                return;
            }
            let outcome = match source.quote(request).await {
                Ok(quote) => LiveQuote::Ready { ticket, quote: Box::new(quote) },
                Err(error) => LiveQuote::Failed { ticket, error },
            };
            // Checked under the channel lock so a newer Pending is never overwritten.
            state.send_if_modified(|current| match sequencer.accept(ticket, outcome) {
                Some(outcome) => {
                    *current = outcome;
                    true
                }
                None => {
                    tracing::debug!(?ticket, "Dropped superseded quote");
                    false
                }
            });
        });

        let previous = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(task);
        if let Some(previous) = previous {
            previous.abort();
        }
        ticket
    }
}

impl Drop for DebouncedQuoter {
    fn drop(&mut self) {
        if let Some(task) = self.in_flight.get_mut().unwrap_or_else(PoisonError::into_inner).take() {
            task.abort();
        }
    }
}
