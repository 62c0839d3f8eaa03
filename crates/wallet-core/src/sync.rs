//! Periodic refresh of price, balance and history for one address.
//!
//! A tick issues the three lookups together and waits for all of them; one
//! failing never cancels the others. Each field is replaced only when its own
//! lookup succeeded, so a provider outage leaves the last good value in place
//! and is reported through [`SyncState::last_error`].
//!
//! Ticks are numbered. Every field remembers the tick that last wrote it and
//! ignores results from older ticks, so a slow tick finishing after a newer
//! one cannot roll the state back.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chain_data::{
    AggregatedError, BalanceSnapshot, ChainDataClient, PriceQuote, Sourced, TransactionRecord,
    TransactionsSnapshot, SATS_PER_COIN,
};
use chrono::{DateTime, Utc};
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncPhase {
    #[default]
    Idle,
    Syncing,
    /// All three lookups succeeded.
    Synced,
    /// One or two lookups failed; their fields hold the previous values.
    PartiallySynced,
    /// Nothing could be refreshed.
    Failed,
}

impl std::fmt::Display for SyncPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SyncPhase::Idle => "idle",
            SyncPhase::Syncing => "syncing",
            SyncPhase::Synced => "synced",
            SyncPhase::PartiallySynced => "partially synced",
            SyncPhase::Failed => "failed",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncState {
    /// Completion time of the last tick that refreshed anything.
    pub last_updated_at: Option<DateTime<Utc>>,
    /// Fields that could not be refreshed by the last tick, with reasons.
    pub last_error: Option<String>,
    /// Provider that served the current balance.
    pub data_source_label: Option<String>,
}

/// Which tick last wrote each field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct TickStamps {
    price: u64,
    balance: u64,
    transactions: u64,
    status: u64,
}

impl TickStamps {
    fn all(tick: u64) -> Self {
        Self {
            price: tick,
            balance: tick,
            transactions: tick,
            status: tick,
        }
    }
}

/// Last known state of the wallet, stale fields included.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WalletSnapshot {
    pub phase: SyncPhase,
    pub balance: Option<BalanceSnapshot>,
    pub price: Option<Sourced<PriceQuote>>,
    pub transactions: Vec<TransactionRecord>,
    pub sync: SyncState,
    stamps: TickStamps,
}

/// Raw results of one tick, before merging.
#[derive(Debug)]
pub(crate) struct TickOutcome {
    pub price: Result<Sourced<PriceQuote>, AggregatedError>,
    pub balance: BalanceSnapshot,
    pub transactions: TransactionsSnapshot,
}

impl WalletSnapshot {
    /// Portfolio value in USD, when both balance and price are known.
    pub fn fiat_value(&self) -> Option<f64> {
        let sats = self.balance.as_ref()?.sats()?;
        let price = self.price.as_ref()?;
        Some(sats as f64 / SATS_PER_COIN as f64 * price.value.usd)
    }

    pub(crate) fn merge_tick(
        &mut self,
        tick: u64,
        outcome: TickOutcome,
        now: DateTime<Utc>,
    ) -> SyncPhase {
        let TickOutcome {
            price,
            balance,
            transactions,
        } = outcome;
        let mut failures: Vec<String> = Vec::new();

        match price {
            Ok(quote) => {
                if tick > self.stamps.price {
                    self.price = Some(quote);
                    self.stamps.price = tick;
                }
            }
            Err(err) => failures.push(format!("price ({})", err.reasons())),
        }

        let balance_source = if balance.is_available() {
            let source = balance.source.clone();
            if tick > self.stamps.balance {
                self.balance = Some(balance);
                self.stamps.balance = tick;
            }
            Some(source)
        } else {
            let reason = balance.error.unwrap_or_default();
            failures.push(format!("balance ({reason})"));
            None
        };

        if transactions.is_available() {
            // An empty list only replaces the cache when nothing else failed.
            let trusted = !transactions.transactions.is_empty() || failures.is_empty();
            if trusted && tick > self.stamps.transactions {
                self.transactions = transactions.transactions;
                self.stamps.transactions = tick;
            }
        } else {
            let reason = transactions.error.unwrap_or_default();
            failures.push(format!("transactions ({reason})"));
        }

        let phase = match failures.len() {
            0 => SyncPhase::Synced,
            3 => SyncPhase::Failed,
            _ => SyncPhase::PartiallySynced,
        };

        if tick > self.stamps.status {
            self.stamps.status = tick;
            self.phase = phase;
            self.sync.last_error = if failures.is_empty() {
                None
            } else {
                Some(format!("could not refresh {}", failures.join("; ")))
            };
            if phase != SyncPhase::Failed {
                self.sync.last_updated_at = Some(now);
            }
            if let Some(source) = balance_source {
                self.sync.data_source_label = Some(source);
            }
        }

        phase
    }
}

/// Keeps one address's [`WalletSnapshot`] fresh.
pub struct SyncOrchestrator {
    client: ChainDataClient,
    address: String,
    ticks: AtomicU64,
    state: watch::Sender<WalletSnapshot>,
}

impl SyncOrchestrator {
    pub fn new(client: ChainDataClient, address: impl Into<String>) -> Self {
        let (state, _) = watch::channel(WalletSnapshot::default());
        Self {
            client,
            address: address.into(),
            ticks: AtomicU64::new(0),
            state,
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn snapshot(&self) -> WalletSnapshot {
        self.state.borrow().clone()
    }

    /// Receives every merged snapshot.
    pub fn subscribe(&self) -> watch::Receiver<WalletSnapshot> {
        self.state.subscribe()
    }

    /// Run one tick now and return the phase it reached.
    pub async fn refresh(&self) -> SyncPhase {
        let tick = self.ticks.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_modify(|snapshot| {
            if tick > snapshot.stamps.status {
                snapshot.phase = SyncPhase::Syncing;
            }
        });
        debug!(tick, address = %self.address, "sync tick started");

        let (price, balance, transactions) = tokio::join!(
            self.client.get_price(),
            self.client.get_balance(&self.address),
            self.client.get_transactions(&self.address),
        );
        let outcome = TickOutcome {
            price,
            balance,
            transactions,
        };

        let mut phase = SyncPhase::Idle;
        let now = Utc::now();
        self.state.send_modify(|snapshot| {
            phase = snapshot.merge_tick(tick, outcome, now);
            if let Some(err) = snapshot.sync.last_error.as_deref().filter(|_| phase != SyncPhase::Synced) {
                warn!(tick, %phase, error = err, "sync degraded");
            }
        });
        info!(tick, %phase, "sync tick finished");
        phase
    }

    /// Forget everything. Ticks already in flight cannot write into the
    /// cleared state.
    pub fn reset(&self) {
        let current = self.ticks.load(Ordering::SeqCst);
        self.state.send_modify(|snapshot| {
            *snapshot = WalletSnapshot {
                stamps: TickStamps::all(current),
                ..WalletSnapshot::default()
            };
        });
    }

    /// Refresh immediately and then every `period` until the handle is
    /// stopped or dropped.
    pub fn spawn(self: &Arc<Self>, period: Duration) -> SyncHandle {
        let (shutdown, mut stopped) = oneshot::channel::<()>();
        let orchestrator = Arc::clone(self);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    _ = &mut stopped => break,
                    _ = ticker.tick() => {}
                }
                tokio::select! {
                    biased;
                    _ = &mut stopped => break,
                    _ = orchestrator.refresh() => {}
                }
            }
            debug!(address = %orchestrator.address, "sync loop stopped");
        });

        info!(address = %self.address, period_secs = period.as_secs(), "sync started");
        SyncHandle {
            shutdown: Some(shutdown),
            task: Some(task),
        }
    }
}

/// Owns the background refresh task. Dropping it aborts the task.
#[derive(Debug)]
pub struct SyncHandle {
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl SyncHandle {
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Signal the loop and wait for it to exit.
    pub async fn stop(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(task) = self.task.take() {
            if let Err(err) = task.await {
                if !err.is_cancelled() {
                    warn!(error = %err, "sync task ended abnormally");
                }
            }
        }
    }
}

impl Drop for SyncHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
