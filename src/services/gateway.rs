//! Completion gateway
//!
//! Owns the process-wide singleton client and serializes every
//! completion request through one FIFO queue with inter-request
//! throttling and bounded exponential backoff on rate limits.

use crate::config::credentials::CredentialResolver;
use crate::config::settings::GatewayConfig;
use crate::models::chat::{CompletionRequest, CompletionResponse};
use crate::services::client::ChatClient;
use crate::utils::error::{GatewayError, GatewayResult};
use async_trait::async_trait;
use once_cell::sync::{Lazy, OnceCell};
use std::future::Future;
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Upstream backend abstraction
///
/// Implemented by [`HttpBackend`] in production; tests substitute
/// scripted doubles to observe call ordering and outcomes.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Issue one upstream completion call
    async fn complete(&self, request: &CompletionRequest) -> GatewayResult<CompletionResponse>;
}

/// Production backend with a lazily initialized [`ChatClient`]
///
/// The client is constructed at most once per process. A failed
/// credential resolution is cached: every later call fails with the
/// same configuration error, there is no automatic re-resolution.
pub struct HttpBackend {
    config: GatewayConfig,
    resolver: CredentialResolver,
    client: OnceCell<Result<ChatClient, String>>,
}

impl HttpBackend {
    /// Backend resolving credentials from the process environment
    pub fn new(config: GatewayConfig) -> Self {
        Self::with_resolver(config, CredentialResolver::new())
    }

    /// Backend with an explicit resolver
    pub fn with_resolver(config: GatewayConfig, resolver: CredentialResolver) -> Self {
        Self {
            config,
            resolver,
            client: OnceCell::new(),
        }
    }

    /// Get the singleton client, initializing it on first use
    pub fn client(&self) -> GatewayResult<&ChatClient> {
        let slot = self.client.get_or_init(|| {
            let credential = self.resolver.resolve().map_err(|e| e.to_string())?;
            ChatClient::new(credential, &self.config).map_err(|e| e.to_string())
        });

        match slot {
            Ok(client) => Ok(client),
            Err(message) => Err(GatewayError::Configuration(message.clone())),
        }
    }
}

#[async_trait]
impl CompletionBackend for HttpBackend {
    async fn complete(&self, request: &CompletionRequest) -> GatewayResult<CompletionResponse> {
        let client = self.client()?;
        client.chat_completion(request).await
    }
}

/// Scheduling hint for a submission
///
/// Accepted for forward compatibility; the queue is strict FIFO and
/// the hint currently never reorders requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    High,
    Low,
}

/// Per-submission options
#[derive(Debug, Default)]
pub struct SubmitOptions {
    /// Scheduling hint, currently ignored
    pub priority: Option<Priority>,
    /// Cancellation signal: an explicit send while the request is
    /// still queued resolves the call with [`GatewayError::Cancelled`].
    /// A sender dropped without signalling never cancels, and a signal
    /// arriving once the upstream call is in flight is ignored.
    pub cancel: Option<oneshot::Receiver<()>>,
}

/// One position in the global FIFO queue
///
/// Holds the predecessor's completion receiver and the sender the
/// successor waits on. The successor is released only after both the
/// predecessor and this slot are done; dropping the slot while still
/// queued hands the predecessor's completion through instead of
/// releasing the successor early.
struct QueueSlot {
    prev: Option<oneshot::Receiver<()>>,
    done: Option<oneshot::Sender<()>>,
}

impl QueueSlot {
    /// Wait until the predecessor has finished
    ///
    /// The predecessor's outcome is deliberately discarded here: only
    /// ordering is inherited, never success or failure.
    async fn wait_turn(&mut self) {
        if let Some(prev) = self.prev.as_mut() {
            let _ = prev.await;
            self.prev = None;
        }
    }
}

impl Drop for QueueSlot {
    fn drop(&mut self) {
        if let (Some(prev), Some(done)) = (self.prev.take(), self.done.take()) {
            // Dropped before reaching the front of the queue: the
            // successor may only run once the predecessor has
            // finished, so forward that completion.
            if let Ok(handle) = tokio::runtime::Handle::try_current() {
                handle.spawn(async move {
                    let _ = prev.await;
                    drop(done);
                });
            }
        }
    }
}

/// Future resolving only when the caller explicitly signals
/// cancellation; absent or dropped senders park forever
async fn cancelled(signal: Option<oneshot::Receiver<()>>) {
    match signal {
        Some(rx) => {
            if rx.await.is_err() {
                std::future::pending::<()>().await;
            }
        }
        None => std::future::pending::<()>().await,
    }
}

/// Process-wide completion gateway
///
/// At most one upstream call is in flight at any instant, and
/// submission order equals upstream-call order.
pub struct CompletionGateway {
    backend: Arc<dyn CompletionBackend>,
    config: GatewayConfig,
    /// Completion receiver of the most recently submitted request;
    /// swapping it under the lock is the sole serialization point
    tail: Mutex<Option<oneshot::Receiver<()>>>,
}

impl CompletionGateway {
    /// Create a gateway over an explicit backend
    pub fn new(backend: Arc<dyn CompletionBackend>, config: GatewayConfig) -> Self {
        Self {
            backend,
            config,
            tail: Mutex::new(None),
        }
    }

    /// Submit a completion request
    ///
    /// The queue position is taken synchronously when this method is
    /// called; the returned future performs the wait, the throttle
    /// delay and the upstream call when polled. A prior request's
    /// failure never propagates to this one.
    pub fn submit(
        &self,
        request: CompletionRequest,
        options: SubmitOptions,
    ) -> impl Future<Output = GatewayResult<CompletionResponse>> + Send + '_ {
        let slot = self.enqueue();
        let SubmitOptions { priority, cancel } = options;
        if priority.is_some() {
            // Hint accepted but the queue stays strict FIFO
            debug!("Priority hint ignored, queue is strict FIFO");
        }
        async move { self.run(request, slot, cancel).await }
    }

    /// Atomically take the next queue position
    fn enqueue(&self) -> QueueSlot {
        let (done, next_prev) = oneshot::channel();
        let prev = {
            let mut tail = self.tail.lock().expect("gateway queue mutex poisoned");
            tail.replace(next_prev)
        };
        QueueSlot {
            prev,
            done: Some(done),
        }
    }

    async fn run(
        &self,
        request: CompletionRequest,
        mut slot: QueueSlot,
        cancel: Option<oneshot::Receiver<()>>,
    ) -> GatewayResult<CompletionResponse> {
        let cancel_signal = cancelled(cancel);
        tokio::pin!(cancel_signal);

        // Wait behind previously submitted work
        tokio::select! {
            _ = slot.wait_turn() => {}
            _ = &mut cancel_signal => {
                debug!("Completion request cancelled while queued");
                return Err(GatewayError::Cancelled);
            }
        }

        // Blanket throttle, measured from reaching the front of the
        // queue and independent of any per-attempt backoff
        tokio::select! {
            _ = sleep(self.config.throttle_delay) => {}
            _ = &mut cancel_signal => {
                debug!("Completion request cancelled during throttle wait");
                return Err(GatewayError::Cancelled);
            }
        }

        // In flight from here on; the retry loop keeps the queue slot,
        // a retry is a continuation rather than a new submission
        for attempt in 1..=self.config.max_retries {
            match self.backend.complete(&request).await {
                Ok(response) => return Ok(response),
                Err(err) if err.is_rate_limit() => {
                    if attempt == self.config.max_retries {
                        break;
                    }
                    let backoff = self.config.backoff_base * 2u32.saturating_pow(attempt);
                    warn!(
                        "⚠️ Rate limit hit (429), retrying in {:?} (attempt {}/{})",
                        backoff, attempt, self.config.max_retries
                    );
                    sleep(backoff).await;
                }
                // 401, 500 and transport failures: retrying will not help
                Err(err) => return Err(err),
            }
        }

        Err(GatewayError::RetriesExhausted {
            attempts: self.config.max_retries,
        })
    }
}

static GATEWAY: Lazy<CompletionGateway> = Lazy::new(|| {
    let config = match GatewayConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            warn!("Invalid gateway settings, using defaults: {}", e);
            GatewayConfig::default()
        }
    };
    let backend = Arc::new(HttpBackend::new(config.clone()));
    CompletionGateway::new(backend, config)
});

/// Process-wide gateway instance
pub fn global() -> &'static CompletionGateway {
    &GATEWAY
}

/// Submit a completion request through the process-wide gateway
///
/// Any number of callers may invoke this concurrently; their requests
/// execute strictly one at a time in submission order.
pub async fn submit_completion(
    request: CompletionRequest,
    options: SubmitOptions,
) -> GatewayResult<CompletionResponse> {
    GATEWAY.submit(request, options).await
}
