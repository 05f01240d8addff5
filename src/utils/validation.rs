use rust_decimal::Decimal;
use validator::ValidationError;

/// Rejects ranges whose lower bound exceeds the upper bound; open ranges pass.
pub fn ordered_range(min: Option<Decimal>, max: Option<Decimal>) -> Result<(), ValidationError> {
    match (min, max) {
        (Some(lo), Some(hi)) if lo > hi => {
            let mut err = ValidationError::new("range_order");
            err.message = Some("minimum must not exceed maximum".into());
            Err(err)
        }
        _ => Ok(()),
    }
}

pub fn non_negative(value: Option<Decimal>) -> Result<(), ValidationError> {
    match value {
        Some(v) if v.is_sign_negative() && !v.is_zero() => {
            let mut err = ValidationError::new("non_negative");
            err.message = Some("value must not be negative".into());
            Err(err)
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_order() {
        assert!(ordered_range(Some(Decimal::new(1, 0)), Some(Decimal::new(3, 0))).is_ok());
        assert!(ordered_range(Some(Decimal::new(5, 0)), Some(Decimal::new(3, 0))).is_err());
        assert!(ordered_range(None, Some(Decimal::new(3, 0))).is_ok());
    }

    #[test]
    fn negatives_rejected() {
        assert!(non_negative(Some(Decimal::new(-5, 1))).is_err());
        assert!(non_negative(Some(Decimal::ZERO)).is_ok());
        assert!(non_negative(None).is_ok());
    }
}
