//! Enumerated wire code sets, validated independently of decoding
//! "a well-formed frame may still fail validation").

use crate::error::DecodeError;

fn check(field: &'static str, byte: u8, allowed: &[u8]) -> Result<u8, DecodeError> {
    if allowed.contains(&byte) {
        Ok(byte)
    } else {
        Err(DecodeError::InvalidCode { field, byte })
    }
}

/// System event code: `O S Q M E C`.
pub fn validate_system_event(byte: u8) -> Result<u8, DecodeError> {
    check("system_event", byte, b"OSQMEC")
}

/// Market category: `N A P Q G S Z V` or space (unavailable).
pub fn validate_market_category(byte: u8) -> Result<u8, DecodeError> {
    check("market_category", byte, b"NAPQGSZV ")
}

/// Financial status indicator: `D E Q S G H J K C N` or space.
pub fn validate_financial_status(byte: u8) -> Result<u8, DecodeError> {
    check("financial_status", byte, b"DEQSGHJKCN ")
}

/// Round lots only indicator: `Y N`.
pub fn validate_round_lots_only(byte: u8) -> Result<u8, DecodeError> {
    check("round_lots_only", byte, b"YN")
}

/// Trading state (ITCH 5.0 stock trading action): `H P Q T`.
pub fn validate_trading_state(byte: u8) -> Result<u8, DecodeError> {
    check("trading_state", byte, b"HPQT")
}

/// Primary market maker indicator: `Y N`.
pub fn validate_primary_market_maker(byte: u8) -> Result<u8, DecodeError> {
    check("primary_market_maker", byte, b"YN")
}

/// Market maker mode: `N P S R L`.
pub fn validate_market_maker_mode(byte: u8) -> Result<u8, DecodeError> {
    check("market_maker_mode", byte, b"NPSRL")
}

/// Market participant state: `A E W S D`.
pub fn validate_market_participant_state(byte: u8) -> Result<u8, DecodeError> {
    check("market_participant_state", byte, b"AEWSD")
}

/// Cross type: `O C H I`.
pub fn validate_cross_type(byte: u8) -> Result<u8, DecodeError> {
    check("cross_type", byte, b"OCHI")
}

/// Interest flag (RPI): `B S A N`.
pub fn validate_interest(byte: u8) -> Result<u8, DecodeError> {
    check("interest", byte, b"BSAN")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_known_rejects_unknown() {
        assert!(validate_system_event(b'O').is_ok());
        assert!(validate_system_event(b'X').is_err());
        assert!(validate_trading_state(b'H').is_ok());
        assert!(validate_trading_state(b'Z').is_err());
    }
}
