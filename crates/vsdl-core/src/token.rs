//! Signed delegation tokens: a JWT-shaped compact structure
//! (`base64url(header).base64url(claims).base64url(tag)`) authenticated with
//! HMAC-SHA256, built from the same `hmac`/`sha2`/`base64` toolkit the
//! commitment engine's sibling modules already lean on (see `crypto::mac` in
//! the teacher's `ghettobox` crate) rather than an external JWT dependency.

use base64::Engine;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::error::{Error, Result};

type HmacSha256 = Hmac<Sha256>;

const B64: base64::engine::general_purpose::GeneralPurpose = base64::engine::general_purpose::URL_SAFE_NO_PAD;

/// The claims bound into a delegation token (spec §4.4 step 6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Token id (`jti`).
    pub jti: String,
    /// First 16 hex chars of `hash(record_id)` (`sub`).
    pub sub: String,
    pub policy: String,
    #[serde(rename = "policyHash")]
    pub policy_hash: String,
    /// Hex-encoded `C_D`.
    pub commitment: String,
    pub actions: Vec<String>,
    /// Unix timestamp the token expires at.
    pub exp: u64,
    pub iss: String,
}

#[derive(Serialize, Deserialize)]
struct Header {
    alg: &'static str,
    typ: &'static str,
}

impl Default for Header {
    fn default() -> Self {
        Header { alg: "HS256", typ: "VSDLT" }
    }
}

fn sign(secret: &[u8], signing_input: &str) -> Result<[u8; 32]> {
    let mut mac = HmacSha256::new_from_slice(secret).map_err(|e| Error::Internal(e.to_string()))?;
    mac.update(signing_input.as_bytes());
    Ok(mac.finalize().into_bytes().into())
}

/// Issue a signed compact token for the given claims.
pub fn issue(claims: &Claims, secret: &[u8]) -> Result<String> {
    let header_b64 = B64.encode(serde_json::to_vec(&Header::default()).map_err(|e| Error::Internal(e.to_string()))?);
    let claims_b64 = B64.encode(serde_json::to_vec(claims).map_err(|e| Error::Internal(e.to_string()))?);
    let signing_input = format!("{header_b64}.{claims_b64}");
    let tag = sign(secret, &signing_input)?;
    let tag_b64 = B64.encode(tag);
    Ok(format!("{signing_input}.{tag_b64}"))
}

/// Verify a compact token's signature and expiry, returning its claims.
///
/// Detailed failure reasons are never distinguished in the returned error —
/// signature mismatch and expiry both surface as `Error::InvalidToken` — to
/// avoid giving a caller an oracle on which check failed (spec §7).
pub fn verify(token: &str, secret: &[u8], now_unix: u64) -> Result<Claims> {
    let mut parts = token.split('.');
    let (Some(header_b64), Some(claims_b64), Some(tag_b64), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(Error::InvalidToken);
    };

    let signing_input = format!("{header_b64}.{claims_b64}");
    let expected_tag = sign(secret, &signing_input)?;
    let given_tag = B64.decode(tag_b64).map_err(|_| Error::InvalidToken)?;

    if given_tag.len() != expected_tag.len() || !bool::from(given_tag.as_slice().ct_eq(&expected_tag)) {
        return Err(Error::InvalidToken);
    }

    let claims_bytes = B64.decode(claims_b64).map_err(|_| Error::InvalidToken)?;
    let claims: Claims = serde_json::from_slice(&claims_bytes).map_err(|_| Error::InvalidToken)?;

    if claims.exp <= now_unix {
        return Err(Error::InvalidToken);
    }

    Ok(claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_claims(exp: u64) -> Claims {
        Claims {
            jti: "tok1".into(),
            sub: "abcdef0123456789".into(),
            policy: "id-renewal".into(),
            policy_hash: "a".repeat(64),
            commitment: "b".repeat(64),
            actions: vec!["view".into()],
            exp,
            iss: "vsdl-gov-portal".into(),
        }
    }

    #[test]
    fn issued_token_verifies_before_expiry() {
        let secret = b"server-secret-key-material";
        let claims = sample_claims(1_000);
        let token = issue(&claims, secret).unwrap();
        let verified = verify(&token, secret, 500).unwrap();
        assert_eq!(verified.jti, claims.jti);
    }

    #[test]
    fn expired_token_is_rejected() {
        let secret = b"server-secret-key-material";
        let claims = sample_claims(1_000);
        let token = issue(&claims, secret).unwrap();
        let err = verify(&token, secret, 2_000).unwrap_err();
        assert!(matches!(err, Error::InvalidToken));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let claims = sample_claims(1_000);
        let token = issue(&claims, b"secret-a").unwrap();
        let err = verify(&token, b"secret-b", 500).unwrap_err();
        assert!(matches!(err, Error::InvalidToken));
    }

    #[test]
    fn tampered_claim_is_rejected() {
        let secret = b"server-secret-key-material";
        let claims = sample_claims(1_000);
        let token = issue(&claims, secret).unwrap();

        // substitute the claims segment for one encoding a different policy
        // without re-signing, simulating a cross-policy substitution attack
        // (spec §8 scenario 6).
        let mut forged_claims = claims.clone();
        forged_claims.policy = "medical-proxy".into();
        let forged_claims_b64 = B64.encode(serde_json::to_vec(&forged_claims).unwrap());

        let mut parts: Vec<&str> = token.split('.').collect();
        parts[1] = &forged_claims_b64;
        let forged_token = parts.join(".");

        let err = verify(&forged_token, secret, 500).unwrap_err();
        assert!(matches!(err, Error::InvalidToken));
    }

    #[test]
    fn malformed_token_is_rejected() {
        let secret = b"server-secret-key-material";
        assert!(verify("not-a-token", secret, 0).is_err());
        assert!(verify("a.b.c.d", secret, 0).is_err());
    }
}
