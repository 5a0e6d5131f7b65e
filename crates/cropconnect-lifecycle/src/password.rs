// SPDX-License-Identifier: Apache-2.0

//! Salted PBKDF2-HMAC-SHA256 password hashes.
//!
//! Encoded as `pbkdf2-sha256$<iterations>$<salt>$<hex digest>`.

use cropconnect_core::{constant_time_eq, hex_encode};
use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use uuid::Uuid;

use crate::error::LifecycleError;

pub const PASSWORD_MIN_LEN: usize = 8;
const SCHEME: &str = "pbkdf2-sha256";

fn derive(password: &[u8], salt: &str, iterations: u32) -> [u8; 32] {
    let mut key = [0_u8; 32];
    pbkdf2_hmac::<Sha256>(password, salt.as_bytes(), iterations, &mut key);
    key
}

pub fn hash_password(password: &str, iterations: u32) -> Result<String, LifecycleError> {
    if password.chars().count() < PASSWORD_MIN_LEN {
        return Err(LifecycleError::Validation(format!(
            "password must be at least {PASSWORD_MIN_LEN} characters"
        )));
    }
    let iterations = iterations.max(1);
    let salt = Uuid::new_v4().simple().to_string();
    let digest = derive(password.as_bytes(), &salt, iterations);
    Ok(format!("{SCHEME}${iterations}${salt}${}", hex_encode(&digest)))
}

/// False for malformed encodings as well as wrong passwords.
#[must_use]
pub fn verify_password(password: &str, encoded: &str) -> bool {
    let mut parts = encoded.split('$');
    let (Some(SCHEME), Some(iterations), Some(salt), Some(expected), None) = (
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
    ) else {
        return false;
    };
    let Ok(iterations) = iterations.parse::<u32>() else {
        return false;
    };
    if iterations == 0 {
        return false;
    }
    let digest = derive(password.as_bytes(), salt, iterations);
    constant_time_eq(hex_encode(&digest).as_bytes(), expected.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_verifies_only_the_original_password() {
        let encoded = hash_password("correct horse", 16).expect("hash");
        assert!(encoded.starts_with("pbkdf2-sha256$16$"));
        assert!(verify_password("correct horse", &encoded));
        assert!(!verify_password("correct horsf", &encoded));
    }

    #[test]
    fn derivation_matches_the_rfc_7914_vector() {
        assert_eq!(
            hex_encode(&derive(b"passwd", "salt", 1)),
            "55ac046e56e3089fec1691c22544b605f94185216dde0465e68b9d57c20dacbc"
        );
    }

    #[test]
    fn salts_differ_between_hashes() {
        let a = hash_password("same password", 4).expect("hash");
        let b = hash_password("same password", 4).expect("hash");
        assert_ne!(a, b);
    }

    #[test]
    fn short_passwords_and_garbage_encodings_are_rejected() {
        assert!(matches!(
            hash_password("short", 4),
            Err(LifecycleError::Validation(_))
        ));
        assert!(!verify_password("whatever1", "plaintext"));
        assert!(!verify_password("whatever1", "pbkdf2-sha256$0$salt$00"));
        assert!(!verify_password("whatever1", "md5$1$salt$00"));
    }
}
