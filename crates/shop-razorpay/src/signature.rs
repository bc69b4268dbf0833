//! # Razorpay Signature Verification
//!
//! Razorpay signs a completed checkout with
//! `hex(HMAC-SHA256(key_secret, "<razorpay_order_id>|<razorpay_payment_id>"))`.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Hex-encoded HMAC-SHA256 of `message` under `secret`
pub fn compute_hmac_sha256(secret: &str, message: &str) -> String {
    // HMAC accepts keys of any length, so construction cannot fail
    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => return String::new(),
    };
    mac.update(message.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Expected checkout signature for an order/payment pair
pub fn payment_signature(secret: &str, order_id: &str, payment_id: &str) -> String {
    compute_hmac_sha256(secret, &format!("{}|{}", order_id, payment_id))
}

/// Check a checkout signature
pub fn verify_payment_signature(
    secret: &str,
    order_id: &str,
    payment_id: &str,
    signature: &str,
) -> bool {
    let expected = payment_signature(secret, order_id, payment_id);
    !expected.is_empty() && constant_time_compare(&expected, signature)
}

fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes()
        .zip(b.bytes())
        .fold(0, |acc, (x, y)| acc | (x ^ y))
        == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hmac_sha256_known_vector() {
        // RFC 4231 test case 2
        let sig = compute_hmac_sha256("Jefe", "what do ya want for nothing?");
        assert_eq!(
            sig,
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn test_verify_payment_signature() {
        let secret = "rzp_secret";
        let sig = payment_signature(secret, "order_123", "pay_456");
        assert_eq!(sig.len(), 64);

        assert!(verify_payment_signature(secret, "order_123", "pay_456", &sig));
        assert!(!verify_payment_signature(secret, "order_123", "pay_999", &sig));
        assert!(!verify_payment_signature("other", "order_123", "pay_456", &sig));
        assert!(!verify_payment_signature(secret, "order_123", "pay_456", "deadbeef"));
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("abc123", "abc123"));
        assert!(!constant_time_compare("abc123", "abc124"));
        assert!(!constant_time_compare("abc", "abcd"));
    }
}
