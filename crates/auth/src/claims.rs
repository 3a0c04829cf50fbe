use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use quill_core::UserId;

/// Payload of a self-signed bearer token.
///
/// Times are Unix epoch seconds, as on the wire. Only `user_id` and `exp` are
/// required; tokens minted elsewhere may omit `iat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject.
    pub user_id: UserId,

    /// Issued-at. Always set on tokens this crate issues.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,

    /// Expiration.
    pub exp: i64,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (iat is in the future)")]
    NotYetValid,

    #[error("invalid token time window (exp <= iat)")]
    InvalidTimeWindow,
}

/// Deterministically validate the time claims against `now`.
///
/// A token is expired once `now >= exp + leeway`; with zero leeway the
/// expiry instant itself is already rejected. The window and not-yet-valid
/// checks apply only when `iat` is present. Signature checks happen before
/// this, in the validator.
pub fn validate_claims(claims: &TokenClaims, now: DateTime<Utc>, leeway_secs: i64) -> Result<(), TokenValidationError> {
    let now = now.timestamp();
    if let Some(iat) = claims.iat {
        if claims.exp <= iat {
            return Err(TokenValidationError::InvalidTimeWindow);
        }
        if now.saturating_add(leeway_secs) < iat {
            return Err(TokenValidationError::NotYetValid);
        }
    }
    if claims.exp.saturating_add(leeway_secs) <= now {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use proptest::prelude::*;

    fn claims_at(iat: DateTime<Utc>, ttl: i64) -> TokenClaims {
        TokenClaims {
            user_id: UserId::new(),
            iat: Some(iat.timestamp()),
            exp: iat.timestamp() + ttl,
        }
    }

    #[test]
    fn valid_inside_window() {
        let t0 = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let c = claims_at(t0, 3600);
        assert_eq!(validate_claims(&c, t0, 0), Ok(()));
        assert_eq!(validate_claims(&c, t0 + Duration::seconds(3599), 0), Ok(()));
    }

    #[test]
    fn rejected_exactly_at_expiry() {
        let t0 = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let c = claims_at(t0, 3600);
        assert_eq!(
            validate_claims(&c, t0 + Duration::seconds(3600), 0),
            Err(TokenValidationError::Expired)
        );
    }

    #[test]
    fn leeway_extends_the_window() {
        let t0 = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let c = claims_at(t0, 3600);
        assert_eq!(validate_claims(&c, t0 + Duration::seconds(3601), 30), Ok(()));
        assert_eq!(
            validate_claims(&c, t0 + Duration::seconds(3630), 30),
            Err(TokenValidationError::Expired)
        );
    }

    #[test]
    fn future_issued_at_is_rejected() {
        let t0 = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let c = claims_at(t0 + Duration::seconds(10), 3600);
        assert_eq!(validate_claims(&c, t0, 0), Err(TokenValidationError::NotYetValid));
    }

    #[test]
    fn inverted_window_is_rejected() {
        let t0 = Utc::now();
        let c = claims_at(t0, 0);
        assert_eq!(validate_claims(&c, t0, 0), Err(TokenValidationError::InvalidTimeWindow));
    }

    #[test]
    fn missing_issued_at_only_checks_expiry() {
        let t0 = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let c = TokenClaims {
            user_id: UserId::new(),
            iat: None,
            exp: t0.timestamp() + 600,
        };
        assert_eq!(validate_claims(&c, t0, 0), Ok(()));
        assert_eq!(
            validate_claims(&c, t0 + Duration::seconds(600), 0),
            Err(TokenValidationError::Expired)
        );
    }

    #[test]
    fn minimal_payload_deserializes_without_issued_at() {
        let id = UserId::new();
        let c: TokenClaims = serde_json::from_value(serde_json::json!({ "user_id": id, "exp": 1_767_229_200 })).unwrap();
        assert_eq!(c.user_id, id);
        assert_eq!(c.iat, None);

        let json = serde_json::to_value(&c).unwrap();
        assert!(json.get("iat").is_none());
    }

    #[test]
    fn wire_shape_uses_user_id_and_epoch_seconds() {
        let c = claims_at(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(), 3600);
        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(json["user_id"], c.user_id.to_string());
        assert_eq!(json["exp"], 1_767_229_200);
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: once now >= exp, validation fails regardless of window size.
        #[test]
        fn expired_claims_always_rejected(ttl in 1i64..100_000, overshoot in 0i64..1_000_000) {
            let t0 = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
            let c = claims_at(t0, ttl);
            let now = t0 + Duration::seconds(ttl + overshoot);
            prop_assert_eq!(validate_claims(&c, now, 0), Err(TokenValidationError::Expired));
        }
    }
}
