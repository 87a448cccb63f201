// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Webhook payload signatures: HMAC-SHA256, hex-encoded, compared in
//! constant time.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Hex-encoded HMAC-SHA256 of `payload` under `secret`.
pub fn sign_payload(secret: &str, payload: &[u8]) -> String {
    // HMAC accepts keys of any length, so construction cannot fail.
    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => unreachable!("HMAC accepts keys of any size"),
    };
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

/// Verify an incoming hex signature against the expected one.
///
/// The comparison is constant-time over the hex strings: rejection never
/// leaks which byte mismatched. Empty signatures always fail.
pub fn verify_signature(secret: &str, payload: &[u8], provided: &str) -> bool {
    if provided.is_empty() {
        return false;
    }
    let expected = sign_payload(secret, payload);
    expected.as_bytes().ct_eq(provided.as_bytes()).into()
}

#[cfg(test)]
#[path = "signature_tests.rs"]
mod tests;
