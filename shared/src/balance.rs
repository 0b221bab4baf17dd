use serde::{Deserialize, Serialize};

use crate::constants::{INITIAL_COINS, INITIAL_SCRATCHES, INITIAL_SPINS};

/// The three virtual-currency balances a player holds.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct Balances {
    pub coins: u64,
    pub spins: u64,
    pub scratches: u64,
}

impl Default for Balances {
    fn default() -> Self {
        Self {
            coins: INITIAL_COINS,
            spins: INITIAL_SPINS,
            scratches: INITIAL_SCRATCHES,
        }
    }
}

impl Balances {
    pub fn add_coins(&mut self, amount: u64) {
        self.coins = self.coins.saturating_add(amount);
    }

    pub fn add_spins(&mut self, amount: u64) {
        self.spins = self.spins.saturating_add(amount);
    }

    pub fn add_scratches(&mut self, amount: u64) {
        self.scratches = self.scratches.saturating_add(amount);
    }

    /// Takes one spin if any is left. Never goes below zero.
    pub fn spend_spin(&mut self) -> bool {
        match self.spins.checked_sub(1) {
            Some(left) => {
                self.spins = left;
                true
            }
            None => false,
        }
    }

    pub fn spend_scratch(&mut self) -> bool {
        match self.scratches.checked_sub(1) {
            Some(left) => {
                self.scratches = left;
                true
            }
            None => false,
        }
    }
}

/// Balances plus whether they have been populated from storage yet.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct BalanceState {
    #[serde(flatten)]
    pub balances: Balances,
    pub loaded: bool,
}

impl BalanceState {
    pub fn new(defaults: Balances) -> Self {
        Self {
            balances: defaults,
            loaded: false,
        }
    }
}

/// The credit operations the minigames need from the economy.
///
/// Implementors own the balances; games only ever consume a credit or pay out.
pub trait Wallet {
    fn spend_spin(&self) -> bool;
    fn spend_scratch(&self) -> bool;
    fn add_coins(&self, amount: u64);
}

// === API Types ===

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct BalanceResponse {
    pub coins: u64,
    pub spins: u64,
    pub scratches: u64,
    pub loaded: bool,
    /// Coin balance in the display currency, e.g. "1.50".
    pub currency: String,
}

impl From<BalanceState> for BalanceResponse {
    fn from(state: BalanceState) -> Self {
        Self {
            coins: state.balances.coins,
            spins: state.balances.spins,
            scratches: state.balances.scratches,
            loaded: state.loaded,
            currency: crate::currency::coins_to_currency(state.balances.coins),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct RefillResponse {
    pub message: String,
    pub balance: BalanceResponse,
}
