use core::fmt;

use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
use sha3::{Digest, Keccak256};

const SIGNATURE_BYTES: usize = 65;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SignatureError {
    InvalidHex,
    InvalidLength { actual: usize },
    InvalidRecoveryId { v: u8 },
    MalformedSignature,
    RecoveryFailed,
}

impl fmt::Display for SignatureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidHex => write!(f, "signature is not valid hex"),
            Self::InvalidLength { actual } => write!(
                f,
                "signature length mismatch: got {actual} bytes, need {SIGNATURE_BYTES}"
            ),
            Self::InvalidRecoveryId { v } => write!(f, "invalid recovery id byte: {v}"),
            Self::MalformedSignature => write!(f, "malformed r/s values"),
            Self::RecoveryFailed => write!(f, "public key recovery failed"),
        }
    }
}

impl std::error::Error for SignatureError {}

/// Returns true iff `s` is `0x` followed by exactly 40 hex characters.
pub fn is_wallet_address(s: &str) -> bool {
    let Some(body) = s.strip_prefix("0x") else {
        return false;
    };
    body.len() == 40 && body.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Keccak-256 over the personal-message envelope:
/// `"\x19Ethereum Signed Message:\n" || byte_len(message) || message`.
fn personal_message_hash(message: &str) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(format!("\x19Ethereum Signed Message:\n{}", message.len()));
    hasher.update(message.as_bytes());
    hasher.finalize().into()
}

fn address_of(key: &VerifyingKey) -> String {
    let point = key.to_encoded_point(false);
    // Skip the 0x04 uncompressed-point tag; address is the low 20 bytes.
    let digest = Keccak256::digest(&point.as_bytes()[1..]);
    format!("0x{}", hex::encode(&digest[12..]))
}

/// Recover the wallet address that produced `signature` over `message`.
///
/// The signature is the usual 65-byte `r || s || v` blob, hex encoded with an
/// optional `0x` prefix. `v` may be 0/1 or the legacy 27/28.
pub fn recover_signer(message: &str, signature: &str) -> Result<String, SignatureError> {
    let trimmed = signature.trim();
    let hex_body = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    let bytes = hex::decode(hex_body).map_err(|_| SignatureError::InvalidHex)?;
    if bytes.len() != SIGNATURE_BYTES {
        return Err(SignatureError::InvalidLength { actual: bytes.len() });
    }

    let v = bytes[64];
    let recovery_byte = match v {
        0 | 1 => v,
        27 | 28 => v - 27,
        _ => return Err(SignatureError::InvalidRecoveryId { v }),
    };
    let recovery_id =
        RecoveryId::from_byte(recovery_byte).ok_or(SignatureError::InvalidRecoveryId { v })?;

    let mut sig =
        Signature::from_slice(&bytes[..64]).map_err(|_| SignatureError::MalformedSignature)?;
    if let Some(normalized) = sig.normalize_s() {
        sig = normalized;
    }

    let digest = personal_message_hash(message);
    let key = VerifyingKey::recover_from_prehash(&digest, &sig, recovery_id)
        .map_err(|_| SignatureError::RecoveryFailed)?;

    Ok(address_of(&key))
}

/// Pure check: does `signature` over `message` recover to `claimed`?
///
/// Every failure mode (bad hex, wrong length, recovery error) resolves to
/// `false`; nothing propagates past this boundary.
pub fn verify_wallet_signature(claimed: &str, message: &str, signature: &str) -> bool {
    match recover_signer(message, signature) {
        Ok(recovered) => recovered.eq_ignore_ascii_case(claimed),
        Err(err) => {
            tracing::debug!("signature recovery failed: {err}");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k256::ecdsa::SigningKey;

    fn test_key() -> SigningKey {
        SigningKey::from_slice(&[0x42u8; 32]).unwrap()
    }

    fn sign_message(key: &SigningKey, message: &str) -> String {
        let digest = personal_message_hash(message);
        let (sig, recid) = key.sign_prehash_recoverable(&digest).unwrap();
        let mut bytes = sig.to_bytes().to_vec();
        bytes.push(27 + recid.to_byte());
        format!("0x{}", hex::encode(bytes))
    }

    fn wallet_of(key: &SigningKey) -> String {
        address_of(key.verifying_key())
    }

    #[test]
    fn valid_signature_verifies() {
        let key = test_key();
        let message = "Sign in to RollBounce\nTimestamp: 1700000000";
        let sig = sign_message(&key, message);
        assert!(verify_wallet_signature(&wallet_of(&key), message, &sig));
    }

    #[test]
    fn address_comparison_is_case_insensitive() {
        let key = test_key();
        let message = "hello";
        let sig = sign_message(&key, message);
        let upper = wallet_of(&key).to_uppercase().replace("0X", "0x");
        assert!(verify_wallet_signature(&upper, message, &sig));
    }

    #[test]
    fn mutated_message_fails() {
        let key = test_key();
        let sig = sign_message(&key, "hello");
        assert!(!verify_wallet_signature(&wallet_of(&key), "hellp", &sig));
    }

    #[test]
    fn mutated_signature_fails() {
        let key = test_key();
        let message = "hello";
        let sig = sign_message(&key, message);
        // Flip one nibble of r.
        let mut chars: Vec<char> = sig.chars().collect();
        chars[10] = if chars[10] == '0' { '1' } else { '0' };
        let tampered: String = chars.into_iter().collect();
        assert!(!verify_wallet_signature(&wallet_of(&key), message, &tampered));
    }

    #[test]
    fn wrong_wallet_fails() {
        let key = test_key();
        let message = "hello";
        let sig = sign_message(&key, message);
        let other = "0x0000000000000000000000000000000000000001";
        assert!(!verify_wallet_signature(other, message, &sig));
    }

    #[test]
    fn zero_based_recovery_id_accepted() {
        let key = test_key();
        let message = "hello";
        let digest = personal_message_hash(message);
        let (sig, recid) = key.sign_prehash_recoverable(&digest).unwrap();
        let mut bytes = sig.to_bytes().to_vec();
        bytes.push(recid.to_byte());
        let encoded = format!("0x{}", hex::encode(bytes));
        assert!(verify_wallet_signature(&wallet_of(&key), message, &encoded));
    }

    #[test]
    fn malformed_signatures_never_panic() {
        assert!(!verify_wallet_signature("0xabc", "hello", "not hex at all"));
        assert!(!verify_wallet_signature("0xabc", "hello", "0x1234"));
        assert_eq!(
            recover_signer("hello", &format!("0x{}", "00".repeat(64))),
            Err(SignatureError::InvalidLength { actual: 64 })
        );
        assert_eq!(
            recover_signer("hello", &format!("0x{}05", "00".repeat(64))),
            Err(SignatureError::InvalidRecoveryId { v: 5 })
        );
    }

    #[test]
    fn wallet_address_format() {
        assert!(is_wallet_address(
            "0x1234567890abcdefABCDEF1234567890abcdef12"
        ));
        assert!(!is_wallet_address(
            "1234567890abcdefABCDEF1234567890abcdef12"
        ));
        assert!(!is_wallet_address("0x1234"));
        assert!(!is_wallet_address(
            "0x1234567890abcdefABCDEF1234567890abcdefg2"
        ));
    }
}
