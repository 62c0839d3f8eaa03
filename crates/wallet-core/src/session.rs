use std::sync::Arc;

use chain_data::{ChainDataClient, ConfirmationStatus, FeeEstimate};
use chain_utxo::transaction::{plan_transaction, sign_and_assemble};
use chain_utxo::utxo::Utxo;
use chrono::Utc;
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use crate::address::{derive_all_addresses, validate_address};
use crate::config::WalletConfig;
use crate::error::WalletError;
use crate::hd_derivation::derive_key;
use crate::mnemonic::{generate_mnemonic, normalize_phrase, parse_mnemonic, WordCount};
use crate::store::WalletStore;
use crate::sync::{SyncHandle, SyncOrchestrator, SyncPhase, WalletSnapshot};
use crate::types::{Coin, WalletIdentity};

/// Outcome of a successful send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SendReceipt {
    pub txid: String,
    pub amount_sats: u64,
    /// Fee actually paid, including any change forfeited as dust.
    pub fee_sats: u64,
    pub change_sats: u64,
    pub fee_source: String,
    pub broadcast_source: String,
}

/// One wallet, its data client and its background refresh.
///
/// At most one identity is loaded; loading another requires [`logout`]
/// first. The refresh task is owned by the session and stops with it.
///
/// [`logout`]: WalletSession::logout
pub struct WalletSession {
    config: WalletConfig,
    coin: Coin,
    client: ChainDataClient,
    store: WalletStore,
    identity: Option<WalletIdentity>,
    sync: Option<Arc<SyncOrchestrator>>,
    sync_task: Option<SyncHandle>,
}

impl WalletSession {
    /// A session talking to the standard public providers for the configured coin.
    pub fn new(config: WalletConfig) -> Result<Self, WalletError> {
        let client = ChainDataClient::new(
            &config.primary_coin.endpoints(),
            config.chain_data_config(),
        )
        .map_err(|e| WalletError::Config(format!("http client: {e}")))?;
        Ok(Self::with_client(config, client))
    }

    pub fn with_client(config: WalletConfig, client: ChainDataClient) -> Self {
        Self {
            coin: config.primary_coin,
            store: WalletStore::new(config.store_path.clone()),
            config,
            client,
            identity: None,
            sync: None,
            sync_task: None,
        }
    }

    pub fn config(&self) -> &WalletConfig {
        &self.config
    }

    pub fn coin(&self) -> Coin {
        self.coin
    }

    pub fn client(&self) -> &ChainDataClient {
        &self.client
    }

    pub fn identity(&self) -> Option<&WalletIdentity> {
        self.identity.as_ref()
    }

    /// Receive address of the primary coin.
    pub fn primary_address(&self) -> Result<&str, WalletError> {
        self.require_identity()?.address(self.coin)
    }

    /// Generate a new phrase, derive its addresses and persist it.
    pub async fn create(&mut self, words: WordCount) -> Result<&WalletIdentity, WalletError> {
        self.ensure_empty()?;
        let phrase = generate_mnemonic(words)?;
        info!(words = words.words(), "wallet created");
        self.install(phrase, true).await
    }

    /// Load an existing phrase. Whitespace and case are normalised first.
    pub async fn import(&mut self, phrase: &str) -> Result<&WalletIdentity, WalletError> {
        self.ensure_empty()?;
        let phrase = normalize_phrase(phrase);
        parse_mnemonic(&phrase)?;
        info!("wallet imported");
        self.install(phrase, true).await
    }

    /// Load the persisted wallet, if any. Returns whether one was found.
    pub async fn restore(&mut self) -> Result<bool, WalletError> {
        self.ensure_empty()?;
        let Some(stored) = self.store.load().await? else {
            return Ok(false);
        };

        if stored.address(self.coin).is_ok() {
            self.attach(stored)?;
        } else {
            // Stored before this coin was supported: derive again.
            let phrase = Zeroizing::new(stored.seed_phrase().to_string());
            let addresses = derive_all_addresses(&phrase)?;
            let identity = WalletIdentity::new(phrase.to_string(), addresses, stored.created_at());
            self.store.save(&identity).await?;
            self.attach(identity)?;
        }
        info!(coin = %self.coin, "wallet restored");
        Ok(true)
    }

    async fn install(
        &mut self,
        phrase: Zeroizing<String>,
        persist: bool,
    ) -> Result<&WalletIdentity, WalletError> {
        let addresses = derive_all_addresses(&phrase)?;
        let identity = WalletIdentity::new(
            phrase.to_string(),
            addresses,
            Utc::now().timestamp_millis(),
        );
        if persist {
            self.store.save(&identity).await?;
        }
        self.attach(identity)?;
        self.require_identity()
    }

    fn attach(&mut self, identity: WalletIdentity) -> Result<(), WalletError> {
        let address = identity.address(self.coin)?.to_string();
        debug!(coin = %self.coin, %address, "session attached");
        self.sync = Some(Arc::new(SyncOrchestrator::new(self.client.clone(), address)));
        self.identity = Some(identity);
        Ok(())
    }

    /// Start the periodic refresh. Does nothing if it is already running.
    pub fn start_sync(&mut self) -> Result<(), WalletError> {
        let sync = self.sync.as_ref().ok_or(WalletError::NoWallet)?;
        if self.sync_task.as_ref().is_some_and(SyncHandle::is_running) {
            return Ok(());
        }
        self.sync_task = Some(sync.spawn(self.config.sync_interval));
        Ok(())
    }

    /// Stop the periodic refresh and wait for it to exit.
    pub async fn stop_sync(&mut self) {
        if let Some(task) = self.sync_task.take() {
            task.stop().await;
        }
    }

    pub fn is_syncing(&self) -> bool {
        self.sync_task.as_ref().is_some_and(SyncHandle::is_running)
    }

    /// Run one refresh now, outside the timer.
    pub async fn refresh(&self) -> Result<SyncPhase, WalletError> {
        let sync = self.sync.as_ref().ok_or(WalletError::NoWallet)?;
        Ok(sync.refresh().await)
    }

    /// Last known state; the default snapshot when no wallet is loaded.
    pub fn snapshot(&self) -> WalletSnapshot {
        self.sync
            .as_ref()
            .map(|sync| sync.snapshot())
            .unwrap_or_default()
    }

    pub fn subscribe(&self) -> Option<watch::Receiver<WalletSnapshot>> {
        self.sync.as_ref().map(|sync| sync.subscribe())
    }

    pub async fn estimate_fee(&self) -> FeeEstimate {
        self.client.estimate_fee().await
    }

    /// Pay `amount_sats` to `recipient` from the primary address.
    ///
    /// Fee comes from the fee providers (or the fallback fee), UTXOs are
    /// fetched fresh, and the signing key is derived for this call only.
    pub async fn send(&self, recipient: &str, amount_sats: u64) -> Result<SendReceipt, WalletError> {
        let identity = self.require_identity()?;
        let recipient = recipient.trim();
        if !validate_address(recipient, self.coin) {
            return Err(WalletError::InvalidAddress(format!(
                "{recipient} is not a {} address",
                self.coin.display_name()
            )));
        }
        let from = identity.address(self.coin)?;

        let fee = self.client.estimate_fee().await;
        if fee.is_fallback() {
            warn!(fee_sats = fee.fee_sats, "using fallback fee");
        }

        let unspent = self.client.get_utxos(from).await?;
        let utxos: Vec<Utxo> = unspent
            .value
            .into_iter()
            .map(|u| Utxo {
                txid: u.txid,
                vout: u.vout,
                value_sat: u.value_sat,
            })
            .collect();
        debug!(count = utxos.len(), source = %unspent.source, "fetched utxos");

        let plan = plan_transaction(
            &utxos,
            recipient,
            from,
            amount_sats,
            fee.fee_sats,
            self.coin.network(),
            self.config.tx_policy(),
        )?;

        let signed = {
            let key = derive_key(identity.seed_phrase(), self.coin.derivation_path())?;
            sign_and_assemble(&plan, &key.private_key)?
        };

        let receipt = self.client.broadcast(&signed.to_hex()).await?;
        if !receipt.txid.eq_ignore_ascii_case(signed.txid()) {
            warn!(
                local = %signed.txid(),
                reported = %receipt.txid,
                source = %receipt.source,
                "provider reported a different txid"
            );
        }

        info!(
            txid = %signed.txid(),
            amount_sats,
            fee_sats = plan.effective_fee(),
            inputs = plan.selected_utxos.len(),
            "payment sent"
        );
        Ok(SendReceipt {
            txid: signed.txid().to_string(),
            amount_sats,
            fee_sats: plan.effective_fee(),
            change_sats: plan.change_sat,
            fee_source: fee.source,
            broadcast_source: receipt.source,
        })
    }

    /// Poll until the transaction confirms or the poll budget runs out.
    /// Returns the last status seen.
    pub async fn wait_for_confirmation(&self, txid: &str) -> ConfirmationStatus {
        let max_polls = self.config.confirmation_max_polls.max(1);
        let mut status = self.client.check_confirmation(txid).await;
        let mut polls = 1;
        while !status.confirmed && polls < max_polls {
            debug!(txid, polls, source = %status.source, "not confirmed yet");
            tokio::time::sleep(self.config.confirmation_poll_interval).await;
            status = self.client.check_confirmation(txid).await;
            polls += 1;
        }
        if status.confirmed {
            info!(txid, polls, source = %status.source, "transaction confirmed");
        } else {
            warn!(txid, polls, "gave up waiting for confirmation");
        }
        status
    }

    /// End the session: stop the refresh, clear cached state and delete
    /// the persisted wallet.
    pub async fn logout(&mut self) -> Result<(), WalletError> {
        self.stop_sync().await;
        if let Some(sync) = self.sync.take() {
            sync.reset();
        }
        self.identity = None;
        self.store.delete().await?;
        info!("logged out");
        Ok(())
    }

    fn require_identity(&self) -> Result<&WalletIdentity, WalletError> {
        self.identity.as_ref().ok_or(WalletError::NoWallet)
    }

    fn ensure_empty(&self) -> Result<(), WalletError> {
        if self.identity.is_some() {
            return Err(WalletError::WalletAlreadyLoaded);
        }
        Ok(())
    }
}
