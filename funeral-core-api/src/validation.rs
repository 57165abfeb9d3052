use rust_decimal::Decimal;
use validator::ValidationError;

/// Amounts carried by commands must be strictly positive.
pub fn validate_positive_amount(amount: &Decimal) -> Result<(), ValidationError> {
    if amount.is_sign_negative() || amount.is_zero() {
        let mut err = ValidationError::new("positive_amount");
        err.message = Some("amount must be greater than zero".into());
        return Err(err);
    }
    if amount.scale() > 2 {
        let mut err = ValidationError::new("currency_precision");
        err.message = Some("amount must have at most two decimal places".into());
        return Err(err);
    }
    Ok(())
}

pub fn validate_non_negative_amount(amount: &Decimal) -> Result<(), ValidationError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        let mut err = ValidationError::new("non_negative_amount");
        err.message = Some("amount must not be negative".into());
        return Err(err);
    }
    Ok(())
}

/// Tax rates are fractions, e.g. `0.0825` for 8.25%.
pub fn validate_rate(rate: &Decimal) -> Result<(), ValidationError> {
    if rate.is_sign_negative() && !rate.is_zero() || *rate >= Decimal::ONE {
        let mut err = ValidationError::new("rate");
        err.message = Some("rate must be within [0, 1)".into());
        return Err(err);
    }
    Ok(())
}

/// Business keys are printable ASCII without whitespace.
pub fn validate_business_key(key: &str) -> Result<(), ValidationError> {
    let valid = !key.is_empty()
        && key.len() <= 64
        && key.chars().all(|c| c.is_ascii_graphic());
    if !valid {
        let mut err = ValidationError::new("business_key");
        err.message = Some("business key must be 1-64 printable characters without spaces".into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_amount() {
        assert!(validate_positive_amount(&Decimal::new(50000, 2)).is_ok());
        assert!(validate_positive_amount(&Decimal::ZERO).is_err());
        assert!(validate_positive_amount(&Decimal::new(-1, 0)).is_err());
        assert!(validate_positive_amount(&Decimal::new(1001, 3)).is_err());
    }

    #[test]
    fn test_rate_bounds() {
        assert!(validate_rate(&Decimal::new(825, 4)).is_ok());
        assert!(validate_rate(&Decimal::ZERO).is_ok());
        assert!(validate_rate(&Decimal::ONE).is_err());
        assert!(validate_rate(&Decimal::new(-5, 2)).is_err());
    }

    #[test]
    fn test_business_key() {
        assert!(validate_business_key("bk-1").is_ok());
        assert!(validate_business_key("").is_err());
        assert!(validate_business_key("has space").is_err());
    }
}
