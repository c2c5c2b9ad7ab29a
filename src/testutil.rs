//! Shared fixtures for signing challenge messages in tests. Hashing and
//! address derivation are written out independently of `signature.rs` so the
//! handler tests exercise the real recovery path end to end.

use k256::ecdsa::SigningKey;
use sha3::{Digest, Keccak256};

use crate::challenge::now_unix_s;

pub(crate) fn signer(seed: u8) -> SigningKey {
    SigningKey::from_slice(&[seed; 32]).unwrap()
}

pub(crate) fn wallet_of(key: &SigningKey) -> String {
    let point = key.verifying_key().to_encoded_point(false);
    let digest = Keccak256::digest(&point.as_bytes()[1..]);
    format!("0x{}", hex::encode(&digest[12..]))
}

pub(crate) fn personal_sign(key: &SigningKey, message: &str) -> String {
    let mut hasher = Keccak256::new();
    hasher.update(format!("\x19Ethereum Signed Message:\n{}", message.len()));
    hasher.update(message.as_bytes());
    let digest: [u8; 32] = hasher.finalize().into();

    let (sig, recid) = key.sign_prehash_recoverable(&digest).unwrap();
    let mut bytes = sig.to_bytes().to_vec();
    bytes.push(27 + recid.to_byte());
    format!("0x{}", hex::encode(bytes))
}

pub(crate) fn challenge_message(action: &str) -> String {
    format!("{action}\nTimestamp: {}", now_unix_s())
}
