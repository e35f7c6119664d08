// Gateway - evaluates queries and submits transactions for one signing identity
//
// Submission is endorse-then-commit: the handler runs against the current
// world state and produces a read/write set; the world state validates that
// set at commit. A read conflict means another transaction got there first,
// so the gateway re-proposes (fresh tx id and timestamp) and tries again.

use crate::contract::{ContractError, ErrorKind, Invocation, RealEstateContract};
use crate::gateway::Proposal;
use crate::identity::{ClientIdentity, SigningIdentity};
use crate::ledger::{CommitReceipt, LedgerError, ReadWriteSet, TxContext, TxId, WorldState};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

// ============================================================================
// GATEWAY CONFIG
// ============================================================================

/// Configuration for the gateway
#[derive(Clone, Debug)]
pub struct GatewayConfig {
    /// Resubmissions after a read conflict before giving up
    pub max_commit_retries: u32,
    /// Delay between resubmissions in milliseconds
    pub retry_delay_ms: u64,
    /// How long to wait for a commit in seconds
    pub commit_timeout_secs: u64,
    /// Events kept until the next poll; the oldest are dropped first, 0 keeps none
    pub max_events: usize,
}

impl GatewayConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_commit_retries(mut self, retries: u32) -> Self {
        self.max_commit_retries = retries;
        self
    }

    pub fn with_retry_delay_ms(mut self, ms: u64) -> Self {
        self.retry_delay_ms = ms;
        self
    }

    pub fn with_commit_timeout_secs(mut self, secs: u64) -> Self {
        self.commit_timeout_secs = secs;
        self
    }

    pub fn with_max_events(mut self, max: usize) -> Self {
        self.max_events = max;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), GatewayError> {
        if self.commit_timeout_secs == 0 {
            return Err(GatewayError::InvalidConfig(
                "commit_timeout_secs must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            max_commit_retries: 3,
            retry_delay_ms: 50,
            commit_timeout_secs: 60,
            max_events: 1024,
        }
    }
}

// ============================================================================
// GATEWAY ERROR
// ============================================================================

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error(transparent)]
    Contract(#[from] ContractError),

    #[error("transaction {tx_id} aborted after {attempts} attempt(s): {source}")]
    ConflictAbort {
        tx_id: TxId,
        attempts: u32,
        source: LedgerError,
    },

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("invalid proposal signature for transaction {0}")]
    InvalidSignature(TxId),

    #[error("commit timed out for transaction {0}; its status is unknown")]
    Timeout(TxId),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Contract(e) => e.kind(),
            Self::ConflictAbort { .. } => ErrorKind::ConflictAbort,
            Self::Ledger(LedgerError::Conflict { .. }) => ErrorKind::ConflictAbort,
            Self::InvalidSignature(_) => ErrorKind::Unauthorized,
            Self::InvalidConfig(_) => ErrorKind::InvalidArgument,
            Self::Ledger(_) | Self::Timeout(_) | Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Resubmitting the same call may succeed once contention clears
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::ConflictAbort
    }
}

// ============================================================================
// EVENTS, STATS, RESULTS
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GatewayEvent {
    Evaluated {
        function: String,
        tx_id: TxId,
    },
    Committed {
        function: String,
        tx_id: TxId,
        height: u64,
        attempts: u32,
    },
    ConflictRetry {
        function: String,
        tx_id: TxId,
        attempt: u32,
    },
    Rejected {
        function: String,
        tx_id: TxId,
        reason: String,
    },
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GatewayStats {
    pub evaluations: u64,
    pub submissions: u64,
    pub commits: u64,
    pub conflicts: u64,
    pub failures: u64,
}

/// Simulation output for one proposal
#[derive(Clone, Debug)]
pub struct Endorsement {
    pub tx_id: TxId,
    pub payload: Vec<u8>,
    pub rwset: ReadWriteSet,
}

/// A committed submission
#[derive(Clone, Debug)]
pub struct SubmitResult {
    pub tx_id: TxId,
    pub height: u64,
    pub attempts: u32,
    pub payload: Vec<u8>,
}

// ============================================================================
// GATEWAY
// ============================================================================

pub struct Gateway {
    world: Arc<dyn WorldState>,
    contract: Arc<RealEstateContract>,
    signer: SigningIdentity,
    config: GatewayConfig,
    stats: Mutex<GatewayStats>,
    events: Mutex<VecDeque<GatewayEvent>>,
}

impl Gateway {
    pub fn connect(
        world: Arc<dyn WorldState>,
        contract: Arc<RealEstateContract>,
        signer: SigningIdentity,
        config: GatewayConfig,
    ) -> Result<Self, GatewayError> {
        config.validate()?;
        info!(identity = %signer.identity(), "gateway connected");
        Ok(Self {
            world,
            contract,
            signer,
            config,
            stats: Mutex::new(GatewayStats::default()),
            events: Mutex::new(VecDeque::new()),
        })
    }

    pub fn identity(&self) -> &ClientIdentity {
        self.signer.identity()
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn propose(&self, invocation: &Invocation) -> Proposal {
        Proposal::new(&self.signer, invocation)
    }

    /// Verify a proposal and simulate it against the current world state
    pub fn endorse(&self, proposal: &Proposal) -> Result<Endorsement, GatewayError> {
        if !proposal.verify() {
            return Err(GatewayError::InvalidSignature(proposal.tx_id().clone()));
        }
        let invocation = proposal.invocation()?;

        let mut ctx = TxContext::new(self.world.as_ref(), proposal.header());
        let payload = self.contract.invoke(&mut ctx, &invocation)?;
        let rwset = ctx.into_rwset();

        debug!(
            tx_id = %proposal.tx_id(),
            function = proposal.function(),
            reads = rwset.reads().len(),
            writes = rwset.writes().len(),
            "endorsed"
        );
        Ok(Endorsement {
            tx_id: proposal.tx_id().clone(),
            payload,
            rwset,
        })
    }

    /// Run a query without committing anything
    pub fn evaluate(&self, function: &str, args: &[String]) -> Result<Vec<u8>, GatewayError> {
        let invocation = Invocation::parse(function, args)?;
        let proposal = self.propose(&invocation);
        self.record(|s| s.evaluations += 1);

        match self.endorse(&proposal) {
            Ok(endorsement) => {
                self.emit(GatewayEvent::Evaluated {
                    function: proposal.function().to_string(),
                    tx_id: proposal.tx_id().clone(),
                });
                Ok(endorsement.payload)
            }
            Err(e) => {
                self.reject(&proposal, &e);
                Err(e)
            }
        }
    }

    /// Endorse and commit, resubmitting on read conflicts
    pub async fn submit(&self, function: &str, args: &[String]) -> Result<SubmitResult, GatewayError> {
        let invocation = Invocation::parse(function, args)?;
        self.record(|s| s.submissions += 1);

        let mut attempts = 0u32;
        loop {
            attempts += 1;
            let proposal = self.propose(&invocation);

            let endorsement = match self.endorse(&proposal) {
                Ok(endorsement) => endorsement,
                Err(e) => {
                    self.reject(&proposal, &e);
                    return Err(e);
                }
            };

            match self.commit(endorsement.tx_id.clone(), endorsement.rwset).await {
                Ok(receipt) => {
                    self.record(|s| s.commits += 1);
                    self.emit(GatewayEvent::Committed {
                        function: proposal.function().to_string(),
                        tx_id: receipt.tx_id.clone(),
                        height: receipt.height,
                        attempts,
                    });
                    info!(
                        tx_id = %receipt.tx_id,
                        function = proposal.function(),
                        height = receipt.height,
                        attempts,
                        "transaction committed"
                    );
                    return Ok(SubmitResult {
                        tx_id: receipt.tx_id,
                        height: receipt.height,
                        attempts,
                        payload: endorsement.payload,
                    });
                }
                Err(GatewayError::Ledger(e)) if e.is_conflict() => {
                    self.record(|s| s.conflicts += 1);
                    if attempts > self.config.max_commit_retries {
                        let err = GatewayError::ConflictAbort {
                            tx_id: proposal.tx_id().clone(),
                            attempts,
                            source: e,
                        };
                        self.reject(&proposal, &err);
                        return Err(err);
                    }

                    warn!(
                        tx_id = %proposal.tx_id(),
                        function = proposal.function(),
                        attempt = attempts,
                        error = %e,
                        "read conflict, resubmitting"
                    );
                    self.emit(GatewayEvent::ConflictRetry {
                        function: proposal.function().to_string(),
                        tx_id: proposal.tx_id().clone(),
                        attempt: attempts,
                    });
                    if self.config.retry_delay_ms > 0 {
                        tokio::time::sleep(Duration::from_millis(self.config.retry_delay_ms)).await;
                    }
                }
                Err(e) => {
                    self.reject(&proposal, &e);
                    return Err(e);
                }
            }
        }
    }

    /// Evaluate queries, submit everything else
    pub async fn invoke(&self, function: &str, args: &[String]) -> Result<Vec<u8>, GatewayError> {
        let invocation = Invocation::parse(function, args)?;
        if invocation.is_read_only() {
            self.evaluate(function, args)
        } else {
            Ok(self.submit(function, args).await?.payload)
        }
    }

    async fn commit(&self, tx_id: TxId, rwset: ReadWriteSet) -> Result<CommitReceipt, GatewayError> {
        let world = Arc::clone(&self.world);
        let commit_id = tx_id.clone();
        let handle = tokio::task::spawn_blocking(move || world.commit(&commit_id, &rwset));

        let timeout = Duration::from_secs(self.config.commit_timeout_secs);
        match tokio::time::timeout(timeout, handle).await {
            Ok(Ok(result)) => Ok(result?),
            Ok(Err(join_error)) => Err(GatewayError::Internal(join_error.to_string())),
            Err(_) => Err(GatewayError::Timeout(tx_id)),
        }
    }

    pub fn stats(&self) -> GatewayStats {
        self.stats.lock().map(|s| s.clone()).unwrap_or_default()
    }

    /// Poll for events (clears the event queue)
    pub fn poll_events(&self) -> Vec<GatewayEvent> {
        self.events
            .lock()
            .map(|mut events| events.drain(..).collect())
            .unwrap_or_default()
    }

    fn record(&self, update: impl FnOnce(&mut GatewayStats)) {
        if let Ok(mut stats) = self.stats.lock() {
            update(&mut stats);
        }
    }

    fn emit(&self, event: GatewayEvent) {
        let max = self.config.max_events;
        if max == 0 {
            return;
        }
        if let Ok(mut events) = self.events.lock() {
            while events.len() >= max {
                events.pop_front();
            }
            events.push_back(event);
        }
    }

    fn reject(&self, proposal: &Proposal, error: &GatewayError) {
        self.record(|s| s.failures += 1);
        self.emit(GatewayEvent::Rejected {
            function: proposal.function().to_string(),
            tx_id: proposal.tx_id().clone(),
            reason: error.to_string(),
        });
        debug!(tx_id = %proposal.tx_id(), error = %error, "proposal rejected");
    }
}
