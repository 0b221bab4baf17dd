//! The economy engine: sole owner of the coin, spin and scratch-card
//! balances.
//!
//! Mutations are synchronous and happen in memory. Once the balances have
//! been loaded, every mutation publishes a snapshot to a background writer
//! task which persists it. Storage failures are logged and otherwise ignored;
//! the in-memory balances stay authoritative for the session.

use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use shared::balance::{BalanceState, Balances, Wallet};
use shared::constants::{COINS_KEY, SCRATCHES_KEY, SPINS_KEY};

use crate::storage::{KeyValueStore, StorageResult};

pub struct EconomyEngine {
    store: Arc<dyn KeyValueStore>,
    defaults: Balances,
    state: Mutex<BalanceState>,
    snapshots: watch::Sender<Balances>,
    // Handed to the writer task on the first successful `load`
    pending_writer: Mutex<Option<watch::Receiver<Balances>>>,
}

impl EconomyEngine {
    pub fn new(store: Arc<dyn KeyValueStore>, defaults: Balances) -> Self {
        let (snapshots, receiver) = watch::channel(defaults);
        Self {
            store,
            defaults,
            state: Mutex::new(BalanceState::new(defaults)),
            snapshots,
            pending_writer: Mutex::new(Some(receiver)),
        }
    }

    fn state(&self) -> MutexGuard<'_, BalanceState> {
        // Balances are plain integers, so a poisoned lock still holds a usable value
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn snapshot(&self) -> BalanceState {
        *self.state()
    }

    pub fn balances(&self) -> Balances {
        self.state().balances
    }

    pub fn is_loaded(&self) -> bool {
        self.state().loaded
    }

    /// Populates the balances from storage and starts write-through.
    ///
    /// Each key falls back to its default when missing, unparseable or when
    /// the read fails. Calling `load` again returns the current state.
    pub async fn load(&self) -> BalanceState {
        if self.is_loaded() {
            return self.snapshot();
        }

        let (coins, spins, scratches) = tokio::join!(
            self.load_value(COINS_KEY, self.defaults.coins),
            self.load_value(SPINS_KEY, self.defaults.spins),
            self.load_value(SCRATCHES_KEY, self.defaults.scratches),
        );

        let loaded = {
            let mut state = self.state();
            state.balances = Balances { coins, spins, scratches };
            state.loaded = true;
            *state
        };
        self.start_writer();

        info!(
            "balances loaded: {} coins, {} spins, {} scratch cards",
            coins, spins, scratches
        );
        loaded
    }

    async fn load_value(&self, key: &str, default: u64) -> u64 {
        match self.store.get(key).await {
            Ok(Some(raw)) => raw.trim().parse().unwrap_or_else(|_| {
                warn!("ignoring unparseable value {:?} for {}", raw, key);
                default
            }),
            Ok(None) => default,
            Err(e) => {
                warn!("failed to load {}: {}", key, e);
                default
            }
        }
    }

    fn start_writer(&self) {
        let receiver = self
            .pending_writer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        if let Some(receiver) = receiver {
            tokio::spawn(run_writer(self.store.clone(), receiver));
        }
    }

    /// Queues the current balances for persistence without waiting.
    ///
    /// Does nothing until `load` has completed, so defaults can never
    /// overwrite saved balances.
    pub fn save(&self) {
        let state = self.snapshot();
        if !state.loaded {
            debug!("skipping save before balances are loaded");
            return;
        }
        self.snapshots.send_replace(state.balances);
    }

    /// Writes the current balances and waits for the result.
    pub async fn flush(&self) -> StorageResult<()> {
        let state = self.snapshot();
        if !state.loaded {
            debug!("skipping flush before balances are loaded");
            return Ok(());
        }
        write_balances(self.store.as_ref(), state.balances).await
    }

    fn mutate<T>(&self, f: impl FnOnce(&mut Balances) -> T) -> T {
        let result = f(&mut self.state().balances);
        self.save();
        result
    }

    pub fn add_coins(&self, amount: u64) {
        self.mutate(|b| b.add_coins(amount));
    }

    pub fn add_spins(&self, amount: u64) {
        self.mutate(|b| b.add_spins(amount));
    }

    pub fn add_scratches(&self, amount: u64) {
        self.mutate(|b| b.add_scratches(amount));
    }

    /// Takes one spin; `false` when none are left.
    pub fn spend_spin(&self) -> bool {
        self.mutate(Balances::spend_spin)
    }

    pub fn spend_scratch(&self) -> bool {
        self.mutate(Balances::spend_scratch)
    }
}

impl Wallet for EconomyEngine {
    fn spend_spin(&self) -> bool {
        EconomyEngine::spend_spin(self)
    }

    fn spend_scratch(&self) -> bool {
        EconomyEngine::spend_scratch(self)
    }

    fn add_coins(&self, amount: u64) {
        EconomyEngine::add_coins(self, amount)
    }
}

async fn write_balances(store: &dyn KeyValueStore, balances: Balances) -> StorageResult<()> {
    let coins = balances.coins.to_string();
    let spins = balances.spins.to_string();
    let scratches = balances.scratches.to_string();
    let (a, b, c) = tokio::join!(
        store.set(COINS_KEY, &coins),
        store.set(SPINS_KEY, &spins),
        store.set(SCRATCHES_KEY, &scratches),
    );
    a.and(b).and(c)
}

// Persists the newest snapshot after each change; intermediate snapshots
// published while a write is in flight are skipped.
async fn run_writer(store: Arc<dyn KeyValueStore>, mut snapshots: watch::Receiver<Balances>) {
    while snapshots.changed().await.is_ok() {
        let balances = *snapshots.borrow_and_update();
        if let Err(e) = write_balances(store.as_ref(), balances).await {
            warn!("failed to save balances: {}", e);
        }
    }
    debug!("balance writer stopped");
}
