//! Verification code challenges for the login form.
//!
//! [`SignedCodes`] keeps no server-side state. A challenge key embeds its
//! expiry and a random nonce (`"{expires}.{nonce}"`), and the 6-digit code is
//! derived from SHA-256 over the secret and the key. Verification recomputes
//! the code and checks the expiry. A key can be answered more than once
//! until it expires.
//!
//! The code itself never leaves the server as data. Clients get it drawn
//! into an SVG image, returned as a base64 data URL.

use std::fmt::Write as _;
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::Utc;
use labsys_config::CaptchaConfig;
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use utoipa::ToSchema;

/// A challenge handed to the login form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Challenge {
    /// Opaque key to send back with the answer
    pub key: String,
    /// `data:image/svg+xml;base64,...` picture of the code to type in
    pub image: String,
    /// Unix timestamp after which the challenge is rejected
    pub expires_at: i64,
}

pub trait VerificationCodes: Send + Sync {
    fn issue(&self) -> Challenge;
    fn verify(&self, key: &str, code: u32) -> bool;
}

const IMAGE_WIDTH: i32 = 160;
const IMAGE_HEIGHT: i32 = 56;

/// Segment endpoints of a 16x32 seven-segment cell, in `abcdefg` order.
const SEGMENTS: [(i32, i32, i32, i32); 7] = [
    (0, 0, 16, 0),
    (16, 0, 16, 16),
    (16, 16, 16, 32),
    (0, 32, 16, 32),
    (0, 16, 0, 32),
    (0, 0, 0, 16),
    (0, 16, 16, 16),
];

/// Lit segments per digit, bit 0 is segment `a`.
const DIGIT_SEGMENTS: [u8; 10] = [
    0b011_1111, 0b000_0110, 0b101_1011, 0b100_1111, 0b110_0110, 0b110_1101, 0b111_1101,
    0b000_0111, 0b111_1111, 0b110_1111,
];

/// Draws `code` as six jittered seven-segment digits over noise lines.
fn render_code(code: u32) -> String {
    let mut rng = rand::thread_rng();
    let mut svg = format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="{IMAGE_WIDTH}" height="{IMAGE_HEIGHT}" viewBox="0 0 {IMAGE_WIDTH} {IMAGE_HEIGHT}"><rect width="100%" height="100%" fill="#f4f4f4"/>"##
    );

    for _ in 0..6 {
        let _ = write!(
            svg,
            r##"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="#9a9a9a" stroke-width="1"/>"##,
            rng.gen_range(0..IMAGE_WIDTH),
            rng.gen_range(0..IMAGE_HEIGHT),
            rng.gen_range(0..IMAGE_WIDTH),
            rng.gen_range(0..IMAGE_HEIGHT),
        );
    }

    for (i, digit) in format!("{:06}", code % 1_000_000).bytes().enumerate() {
        let lit = DIGIT_SEGMENTS[usize::from(digit - b'0')];
        let origin_x = 10 + i as i32 * 24 + rng.gen_range(-2..=2);
        let origin_y = 12 + rng.gen_range(-3..=3);
        let slant = rng.gen_range(-3..=3);

        for (segment, (x1, y1, x2, y2)) in SEGMENTS.iter().enumerate() {
            if lit & (1 << segment) == 0 {
                continue;
            }
            // lean the digit: the top shifts by `slant`, the bottom does not
            let lean = |x: i32, y: i32| x + slant * (32 - y) / 32;
            let _ = write!(
                svg,
                r##"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="#2b2b2b" stroke-width="3" stroke-linecap="round"/>"##,
                origin_x + lean(*x1, *y1) + rng.gen_range(-1..=1),
                origin_y + y1 + rng.gen_range(-1..=1),
                origin_x + lean(*x2, *y2) + rng.gen_range(-1..=1),
                origin_y + y2 + rng.gen_range(-1..=1),
            );
        }
    }

    svg.push_str("</svg>");
    format!("data:image/svg+xml;base64,{}", STANDARD.encode(svg))
}

#[derive(Clone)]
pub struct SignedCodes {
    secret: String,
    ttl_seconds: i64,
}

impl SignedCodes {
    pub fn new(secret: impl Into<String>, ttl_seconds: i64) -> Self {
        Self {
            secret: secret.into(),
            ttl_seconds,
        }
    }

    /// Builds the configured implementation: signed codes, or [`Disabled`]
    /// when `CAPTCHA_ENABLED=false`.
    pub fn from_config(config: &CaptchaConfig) -> Arc<dyn VerificationCodes> {
        if config.enabled {
            Arc::new(Self::new(config.secret.clone(), config.ttl_seconds))
        } else {
            Arc::new(Disabled)
        }
    }

    /// The code that answers `key`, whatever its expiry. Only the holder of
    /// the secret can compute it.
    pub fn expected_code(&self, key: &str) -> u32 {
        let digest = Sha256::new()
            .chain_update(self.secret.as_bytes())
            .chain_update(key.as_bytes())
            .finalize();
        let head = u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]]);
        head % 1_000_000
    }

    fn issue_at(&self, now: i64) -> Challenge {
        let mut nonce = [0u8; 8];
        rand::thread_rng().fill_bytes(&mut nonce);

        let expires_at = now + self.ttl_seconds;
        let key = format!("{expires_at}.{}", hex::encode(nonce));
        let image = render_code(self.expected_code(&key));

        Challenge {
            key,
            image,
            expires_at,
        }
    }

    fn verify_at(&self, key: &str, code: u32, now: i64) -> bool {
        let Some((expires, _nonce)) = key.split_once('.') else {
            return false;
        };
        let Ok(expires_at) = expires.parse::<i64>() else {
            return false;
        };
        expires_at >= now && self.expected_code(key) == code
    }
}

impl VerificationCodes for SignedCodes {
    fn issue(&self) -> Challenge {
        self.issue_at(Utc::now().timestamp())
    }

    fn verify(&self, key: &str, code: u32) -> bool {
        self.verify_at(key, code, Utc::now().timestamp())
    }
}

impl std::fmt::Debug for SignedCodes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignedCodes")
            .field("ttl_seconds", &self.ttl_seconds)
            .finish_non_exhaustive()
    }
}

/// Accepts every code. Used when challenges are switched off.
#[derive(Debug, Clone, Copy, Default)]
pub struct Disabled;

impl VerificationCodes for Disabled {
    fn issue(&self) -> Challenge {
        Challenge {
            key: String::new(),
            image: String::new(),
            expires_at: 0,
        }
    }

    fn verify(&self, _key: &str, _code: u32) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codes() -> SignedCodes {
        SignedCodes::new("test-secret", 300)
    }

    fn decode_image(image: &str) -> String {
        let encoded = image
            .strip_prefix("data:image/svg+xml;base64,")
            .unwrap();
        String::from_utf8(STANDARD.decode(encoded).unwrap()).unwrap()
    }

    #[test]
    fn test_issued_challenge_verifies() {
        let codes = codes();
        let challenge = codes.issue();
        let code = codes.expected_code(&challenge.key);
        assert!(code < 1_000_000);
        assert!(codes.verify(&challenge.key, code));
    }

    #[test]
    fn test_challenge_does_not_carry_the_answer() {
        let codes = codes();
        let challenge = codes.issue();
        let json = serde_json::to_value(&challenge).unwrap();

        let fields: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(fields.len(), 3);
        assert!(json.get("code").is_none());

        let svg = decode_image(&challenge.image);
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(!svg.contains("<text"));
    }

    #[test]
    fn test_image_draws_every_lit_segment() {
        let svg = decode_image(&render_code(8));
        // "000008": five zeros with 6 segments each and an 8 with 7
        let strokes = svg.matches(r##"stroke="#2b2b2b""##).count();
        assert_eq!(strokes, 5 * 6 + 7);

        let svg = decode_image(&render_code(111_111));
        assert_eq!(svg.matches(r##"stroke="#2b2b2b""##).count(), 6 * 2);
    }

    #[test]
    fn test_wrong_code_rejected() {
        let codes = codes();
        let challenge = codes.issue();
        let wrong = (codes.expected_code(&challenge.key) + 1) % 1_000_000;
        assert!(!codes.verify(&challenge.key, wrong));
    }

    #[test]
    fn test_expired_challenge_rejected() {
        let codes = codes();
        let challenge = codes.issue_at(1_000);
        let code = codes.expected_code(&challenge.key);
        assert!(codes.verify_at(&challenge.key, code, 1_300));
        assert!(!codes.verify_at(&challenge.key, code, 1_301));
    }

    #[test]
    fn test_tampered_expiry_rejected() {
        let codes = codes();
        let challenge = codes.issue_at(1_000);
        let code = codes.expected_code(&challenge.key);
        let (_, nonce) = challenge.key.split_once('.').unwrap();
        let extended = format!("{}.{nonce}", challenge.expires_at + 10_000);
        assert!(!codes.verify_at(&extended, code, 2_000));
    }

    #[test]
    fn test_other_secret_rejects() {
        let other = SignedCodes::new("other-secret", 300);
        let key = "9999999999.0011223344556677";
        assert_ne!(codes().expected_code(key), other.expected_code(key));
        assert!(!other.verify(key, codes().expected_code(key)));
    }

    #[test]
    fn test_malformed_keys_rejected() {
        let codes = codes();
        assert!(!codes.verify("", 0));
        assert!(!codes.verify("no-dot", 0));
        assert!(!codes.verify("soon.abcd", 0));
    }

    #[test]
    fn test_disabled_accepts_everything() {
        assert!(Disabled.verify("", 0));
        assert!(Disabled.verify("whatever", 42));
    }

    #[test]
    fn test_from_config_switch() {
        let config = CaptchaConfig {
            enabled: false,
            secret: "s".to_string(),
            ttl_seconds: 60,
        };
        assert!(SignedCodes::from_config(&config).verify("x", 1));

        let config = CaptchaConfig {
            enabled: true,
            ..config
        };
        assert!(!SignedCodes::from_config(&config).verify("x", 1));
    }
}
