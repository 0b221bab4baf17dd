pub const COINS_KEY: &str = "@spin_win_coins";
pub const SPINS_KEY: &str = "@spin_win_spins";
pub const SCRATCHES_KEY: &str = "@spin_win_scratches";

pub const INITIAL_COINS: u64 = 0;
pub const INITIAL_SPINS: u64 = 10;
pub const INITIAL_SCRATCHES: u64 = 10;

// Credits granted by one rewarded ad
pub const AD_REFILL_SPINS: u64 = 5;
pub const AD_REFILL_SCRATCHES: u64 = 5;

pub const MIN_WITHDRAWAL_COINS: u64 = 1000;

pub const OUT_OF_SPINS_ERROR: &str = "Oops! Out of Spins. Watch an ad to get more spins!";
pub const OUT_OF_SCRATCHES_ERROR: &str = "Oops! Out of Scratch Cards. Watch an ad to refill!";
pub const ALREADY_SPINNING_ERROR: &str = "The wheel is already spinning";
pub const AD_UNAVAILABLE_ERROR: &str = "Ad unavailable. Please try again later.";
pub const SELECT_METHOD_ERROR: &str = "Please select a payment method.";
pub const MISSING_FIELDS_ERROR: &str = "Please fill";
pub const MINIMUM_WITHDRAWAL_ERROR: &str = "Minimum withdrawal is 1000 coins ($1).";
