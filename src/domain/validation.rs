//! Custom field validators shared by the write models.

use rust_decimal::Decimal;
use validator::ValidationError;

/// Reject empty or whitespace-only strings.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Reject zero and negative amounts.
pub fn positive_amount(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() || value.is_zero() {
        return Err(ValidationError::new("not_positive"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_blank() {
        assert!(not_blank("x").is_ok());
        assert!(not_blank("").is_err());
        assert!(not_blank(" \t").is_err());
    }

    #[test]
    fn test_positive_amount() {
        assert!(positive_amount(&Decimal::new(1, 2)).is_ok());
        assert!(positive_amount(&Decimal::ZERO).is_err());
        assert!(positive_amount(&Decimal::new(-500, 2)).is_err());
    }
}
