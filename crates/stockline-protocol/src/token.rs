//! Reading claims out of a bearer token.
//!
//! The backend issues a signed `header.payload.signature` token. The
//! console never verifies the signature (it holds no key); it only reads
//! the `exp` claim so it can tell when a persisted session has lapsed
//! without asking the server.

use serde::{Deserialize, Serialize};

use crate::ProtocolError;

/// Claims the console cares about. Anything else in the payload is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Expiry as a Unix timestamp (seconds).
    pub exp: u64,

    /// Subject, usually the user id.
    #[serde(default)]
    pub sub: Option<String>,

    /// Issued-at as a Unix timestamp (seconds).
    #[serde(default)]
    pub iat: Option<u64>,
}

impl TokenClaims {
    /// A token is expired once `now` reaches `exp`. Valid means strictly
    /// before expiry.
    pub fn is_expired_at(&self, now_unix: u64) -> bool {
        self.exp <= now_unix
    }
}

/// Decodes the payload segment of `token` into [`TokenClaims`].
///
/// # Errors
/// Returns [`ProtocolError::MalformedToken`] if the token isn't three
/// dot-separated segments or the payload isn't base64url; returns
/// [`ProtocolError::Decode`] if the payload isn't JSON with an `exp`.
///
/// # Example
///
/// ```rust
/// use base64::Engine;
/// use base64::engine::general_purpose::URL_SAFE_NO_PAD;
/// use stockline_protocol::decode_claims;
///
/// let payload = URL_SAFE_NO_PAD.encode(br#"{"exp":1700000000,"sub":"42"}"#);
/// let token = format!("e30.{payload}.sig");
///
/// let claims = decode_claims(&token).unwrap();
/// assert_eq!(claims.exp, 1_700_000_000);
/// assert_eq!(claims.sub.as_deref(), Some("42"));
/// ```
#[cfg(feature = "json")]
pub fn decode_claims(token: &str) -> Result<TokenClaims, ProtocolError> {
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;

    use crate::{Codec, JsonCodec};

    let mut segments = token.trim().split('.');
    let (Some(_header), Some(payload), Some(_signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(ProtocolError::MalformedToken(
            "expected three dot-separated segments".into(),
        ));
    };

    // Some issuers pad their segments; the URL-safe alphabet doesn't.
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| ProtocolError::MalformedToken(format!("payload is not base64url: {e}")))?;

    JsonCodec.decode(&bytes)
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;

    use super::*;

    fn token_with_payload(payload: &str) -> String {
        format!("eyJhbGciOiJIUzI1NiJ9.{}.c2ln", URL_SAFE_NO_PAD.encode(payload))
    }

    #[test]
    fn test_decode_claims_reads_exp() {
        let token = token_with_payload(r#"{"exp":2000000000,"iat":1999990000}"#);

        let claims = decode_claims(&token).expect("should decode");

        assert_eq!(claims.exp, 2_000_000_000);
        assert_eq!(claims.iat, Some(1_999_990_000));
        assert_eq!(claims.sub, None);
    }

    #[test]
    fn test_decode_claims_ignores_unknown_claims() {
        let token = token_with_payload(r#"{"exp":10,"role":"ADMIN","tenant":"x"}"#);
        assert_eq!(decode_claims(&token).unwrap().exp, 10);
    }

    #[test]
    fn test_decode_claims_accepts_padded_payload() {
        let padded = base64::engine::general_purpose::URL_SAFE.encode(br#"{"exp":5}"#);
        let token = format!("h.{padded}.s");
        assert_eq!(decode_claims(&token).unwrap().exp, 5);
    }

    #[test]
    fn test_decode_claims_two_segments_is_malformed() {
        let result = decode_claims("only.two");
        assert!(matches!(result, Err(ProtocolError::MalformedToken(_))));
    }

    #[test]
    fn test_decode_claims_four_segments_is_malformed() {
        let result = decode_claims("a.b.c.d");
        assert!(matches!(result, Err(ProtocolError::MalformedToken(_))));
    }

    #[test]
    fn test_decode_claims_bad_base64_is_malformed() {
        let result = decode_claims("h.!!!.s");
        assert!(matches!(result, Err(ProtocolError::MalformedToken(_))));
    }

    #[test]
    fn test_decode_claims_missing_exp_is_decode_error() {
        let token = token_with_payload(r#"{"sub":"1"}"#);
        assert!(matches!(decode_claims(&token), Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_is_expired_at_boundary() {
        let claims = TokenClaims { exp: 100, sub: None, iat: None };
        assert!(!claims.is_expired_at(99));
        assert!(claims.is_expired_at(100), "exp must be strictly in the future");
        assert!(claims.is_expired_at(101));
    }
}
