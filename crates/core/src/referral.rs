//! Influencer referral codes: normalization, validation and commission math.

use rand::Rng;

use crate::error::CoreError;
use crate::payment::MAX_AMOUNT;

pub const MIN_CODE_LEN: usize = 4;
pub const MAX_CODE_LEN: usize = 32;

/// Length of codes produced by [`generate_code`].
const GENERATED_CODE_LEN: usize = 8;

/// Unambiguous characters for generated codes (no 0/O, 1/I).
const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Canonical form of a code as typed at checkout.
pub fn normalize_code(raw: &str) -> String {
    raw.trim().to_ascii_uppercase()
}

/// Check an already-normalized code.
pub fn validate_code(code: &str) -> Result<(), CoreError> {
    if code.len() < MIN_CODE_LEN || code.len() > MAX_CODE_LEN {
        return Err(CoreError::Validation(format!(
            "Referral code must be {MIN_CODE_LEN}-{MAX_CODE_LEN} characters"
        )));
    }
    if !code
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(CoreError::Validation(
            "Referral code may only contain letters, digits and '-'".into(),
        ));
    }
    Ok(())
}

pub fn validate_terms(commission_rate_pct: i32, discount_amount: i64) -> Result<(), CoreError> {
    if !(0..=100).contains(&commission_rate_pct) {
        return Err(CoreError::Validation(
            "Commission rate must be between 0 and 100 percent".into(),
        ));
    }
    if !(0..=MAX_AMOUNT).contains(&discount_amount) {
        return Err(CoreError::Validation(format!(
            "Discount amount must be between 0 and {MAX_AMOUNT} taka"
        )));
    }
    Ok(())
}

/// Random code for influencers that did not pick one.
pub fn generate_code() -> String {
    let mut rng = rand::rng();
    (0..GENERATED_CODE_LEN)
        .map(|_| CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

/// Commission owed on `amount`, rounded down to whole taka.
pub fn commission_for(amount: i64, commission_rate_pct: i32) -> Result<i64, CoreError> {
    amount
        .checked_mul(i64::from(commission_rate_pct))
        .map(|scaled| scaled / 100)
        .ok_or_else(|| {
            CoreError::Validation(format!(
                "Commission on {amount} at {commission_rate_pct}% is out of range"
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_case_and_whitespace() {
        assert_eq!(normalize_code("  riya10 "), "RIYA10");
    }

    #[test]
    fn rejects_short_and_symbolic_codes() {
        assert!(validate_code("AB").is_err());
        assert!(validate_code("RIYA 10").is_err());
        assert!(validate_code("riya10").is_err());
        assert!(validate_code("RIYA-10").is_ok());
    }

    #[test]
    fn generated_codes_validate() {
        for _ in 0..20 {
            let code = generate_code();
            assert_eq!(code.len(), 8);
            assert!(validate_code(&code).is_ok(), "{code} should validate");
        }
    }

    #[test]
    fn commission_floors() {
        assert_eq!(commission_for(280, 10).unwrap(), 28);
        assert_eq!(commission_for(299, 15).unwrap(), 44);
        assert_eq!(commission_for(500, 0).unwrap(), 0);
    }

    #[test]
    fn commission_overflow_is_an_error() {
        assert!(matches!(
            commission_for(i64::MAX, 10),
            Err(CoreError::Validation(_))
        ));
        assert_eq!(commission_for(MAX_AMOUNT, 100).unwrap(), MAX_AMOUNT);
    }

    #[test]
    fn terms_bounds() {
        assert!(validate_terms(101, 0).is_err());
        assert!(validate_terms(-1, 0).is_err());
        assert!(validate_terms(20, -5).is_err());
        assert!(validate_terms(20, MAX_AMOUNT + 1).is_err());
        assert!(validate_terms(20, 30).is_ok());
    }
}
