//! Xbox save signature: HMAC-SHA1 over every byte before it.

use hmac::{Hmac, Mac};
use sha1::Sha1;

use crate::error::{Error, Result};
use crate::save::SIGNATURE_LEN;

type HmacSha1 = Hmac<Sha1>;

/// Key used when none is supplied.
///
/// This is an arbitrary local key, not the retail title key: files signed
/// with it only verify against it. Pass the real key through
/// `SaveOptions::signature_key` / `LoadOptions::signature_key` to produce or
/// check console-compatible signatures.
pub const PLACEHOLDER_SIGNATURE_KEY: [u8; 16] = [
    0x6F, 0x11, 0x2A, 0xE3, 0x95, 0x4D, 0x8C, 0x70, 0x1B, 0xD2, 0x64, 0x39, 0xAE, 0x07, 0xC5, 0x58,
];

pub fn sign(key: &[u8], data: &[u8]) -> Result<[u8; SIGNATURE_LEN]> {
    let mut mac = HmacSha1::new_from_slice(key)
        .map_err(|e| Error::EncodingError(format!("invalid signature key: {e}")))?;
    mac.update(data);
    let mut out = [0u8; SIGNATURE_LEN];
    out.copy_from_slice(&mac.finalize().into_bytes());
    Ok(out)
}

pub fn verify(key: &[u8], data: &[u8], signature: &[u8]) -> Result<bool> {
    let mut mac = HmacSha1::new_from_slice(key)
        .map_err(|e| Error::EncodingError(format!("invalid signature key: {e}")))?;
    mac.update(data);
    Ok(mac.verify_slice(signature).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_is_deterministic() {
        let a = sign(&PLACEHOLDER_SIGNATURE_KEY, b"liberty city").unwrap();
        let b = sign(&PLACEHOLDER_SIGNATURE_KEY, b"liberty city").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 20);
    }

    #[test]
    fn test_key_and_data_matter() {
        let base = sign(&PLACEHOLDER_SIGNATURE_KEY, b"portland").unwrap();
        assert_ne!(base, sign(&[0; 16], b"portland").unwrap());
        assert_ne!(base, sign(&PLACEHOLDER_SIGNATURE_KEY, b"staunton").unwrap());
    }

    #[test]
    fn test_verify() {
        let signature = sign(&PLACEHOLDER_SIGNATURE_KEY, b"shoreside").unwrap();
        assert!(verify(&PLACEHOLDER_SIGNATURE_KEY, b"shoreside", &signature).unwrap());
        assert!(!verify(&PLACEHOLDER_SIGNATURE_KEY, b"shoreside vale", &signature).unwrap());
        assert!(!verify(&PLACEHOLDER_SIGNATURE_KEY, b"shoreside", &signature[..19]).unwrap());
    }

    #[test]
    fn test_rfc2202_vector() {
        // HMAC-SHA1 test case 2
        let signature = sign(b"Jefe", b"what do ya want for nothing?").unwrap();
        assert_eq!(
            signature,
            [
                0xef, 0xfc, 0xdf, 0x6a, 0xe5, 0xeb, 0x2f, 0xa2, 0xd2, 0x74, 0x16, 0xd5, 0xf1, 0x84,
                0xdf, 0x9c, 0x25, 0x9a, 0x7c, 0x79
            ]
        );
    }
}
