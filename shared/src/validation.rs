use validator::ValidationError;

use crate::constants::MIN_WITHDRAWAL_COINS;

pub fn validate_required(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required"));
    }
    Ok(())
}

pub fn validate_withdrawal_balance(coins: u64) -> Result<(), ValidationError> {
    if coins < MIN_WITHDRAWAL_COINS {
        let mut err = ValidationError::new("below_minimum");
        err.add_param("minimum".into(), &MIN_WITHDRAWAL_COINS);
        err.add_param("balance".into(), &coins);
        return Err(err);
    }
    Ok(())
}
