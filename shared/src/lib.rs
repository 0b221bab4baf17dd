pub mod balance;
pub mod constants;
pub mod currency;
pub mod shared_scratch_game;
pub mod shared_wheel_game;
pub mod validation;
pub mod withdrawal;

pub use balance::{BalanceState, Balances, Wallet};
pub use currency::{coins_to_currency, currency_to_coins, COINS_PER_DOLLAR};
