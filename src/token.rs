use chrono::{DateTime, Duration, Utc};
use hkdf::Hkdf;
use hmac::{Hmac, Mac};
use rand::Rng;
use rand::distr::Alphanumeric;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

const HKDF_SALT: &[u8] = b"reset-requests-v1";
const HKDF_INFO: &[u8] = b"verifier-hmac-sha256";

fn derive_key(secret: &str) -> [u8; 32] {
    let hk = Hkdf::<Sha256>::new(Some(HKDF_SALT), secret.as_bytes());
    let mut okm = [0u8; 32];
    hk.expand(HKDF_INFO, &mut okm)
        .expect("32 bytes is a valid HKDF-SHA256 output length");
    okm
}

/// Random alphanumeric string from the thread-local CSPRNG.
pub fn random_string(len: usize) -> String {
    rand::rng()
        .sample_iter(Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Keyed hashing of reset verifiers.
///
/// The MAC covers the verifier, the owning user and the expiry second, so a
/// stored hash only verifies for the row it was issued with.
#[derive(Clone)]
pub struct TokenHasher {
    key: [u8; 32],
}

impl TokenHasher {
    pub fn new(secret: &str) -> Self {
        Self {
            key: derive_key(secret),
        }
    }

    pub fn hash(&self, verifier: &str, user_id: Uuid, expires_at: DateTime<Utc>) -> String {
        let mut mac = HmacSha256::new_from_slice(&self.key)
            .expect("HMAC-SHA256 accepts keys of any length");
        mac.update(verifier.as_bytes());
        mac.update(user_id.as_bytes());
        mac.update(&expires_at.timestamp().to_be_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    /// Recompute the hash and compare it to `stored` in constant time.
    pub fn verify(
        &self,
        verifier: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
        stored: &str,
    ) -> bool {
        let computed = self.hash(verifier, user_id, expires_at);
        computed.as_bytes().ct_eq(stored.as_bytes()).into()
    }
}

impl std::fmt::Debug for TokenHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenHasher").finish_non_exhaustive()
    }
}

/// The public half of a reset request, handed to the user exactly once.
#[derive(Clone)]
pub struct ResetToken {
    pub selector: String,
    verifier: String,
    pub expires_at: DateTime<Utc>,
    pub generated_at: DateTime<Utc>,
}

impl ResetToken {
    pub fn new(
        selector: String,
        verifier: String,
        expires_at: DateTime<Utc>,
        generated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            selector,
            verifier,
            expires_at,
            generated_at,
        }
    }

    pub fn verifier(&self) -> &str {
        &self.verifier
    }

    /// Selector and verifier joined into the single string sent to the user.
    pub fn token(&self) -> String {
        format!("{}{}", self.selector, self.verifier)
    }

    pub fn lifetime(&self) -> Duration {
        self.expires_at - self.generated_at
    }
}

impl std::fmt::Debug for ResetToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResetToken")
            .field("selector", &self.selector)
            .field("verifier", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .field("generated_at", &self.generated_at)
            .finish()
    }
}

/// Split a combined token into `(selector, verifier)`.
pub fn split_token(token: &str, selector_length: usize) -> Option<(&str, &str)> {
    let selector = token.get(..selector_length)?;
    let verifier = token.get(selector_length..)?;
    if verifier.is_empty() {
        return None;
    }
    Some((selector, verifier))
}
