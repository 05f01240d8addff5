use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Hex HMAC-SHA256 of `message` under `secret`.
pub fn sign(secret: &str, message: &[u8]) -> String {
    // HMAC accepts keys of any length, so construction cannot fail.
    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => unreachable!("hmac key of any length is valid"),
    };
    mac.update(message);
    hex::encode(mac.finalize().into_bytes())
}

/// Constant-time check of a hex signature produced by [`sign`].
pub fn verify(secret: &str, message: &[u8], signature_hex: &str) -> bool {
    let Ok(expected) = hex::decode(signature_hex) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(message);
    mac.verify_slice(&expected).is_ok()
}

pub fn download_message(key: &str, expires: i64) -> String {
    format!("{}:{}", key, expires)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_round_trips_and_rejects_tampering() {
        let sig = sign("secret", b"resumes/a/b.pdf:1700000000");
        assert_eq!(sig.len(), 64);
        assert!(verify("secret", b"resumes/a/b.pdf:1700000000", &sig));
        assert!(!verify("secret", b"resumes/a/b.pdf:1700000001", &sig));
        assert!(!verify("other", b"resumes/a/b.pdf:1700000000", &sig));
        assert!(!verify("secret", b"resumes/a/b.pdf:1700000000", "zz"));
    }
}
