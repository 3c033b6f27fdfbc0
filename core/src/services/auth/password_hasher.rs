//! Deterministic password hashing keyed by the account's identity

use ag_shared::config::PasswordHashConfig;
use sha2::Sha512;

/// Derives the stored password hash
///
/// The output must be a pure function of its inputs so that a login attempt
/// can be checked by recomputing the hash.
pub trait PasswordHasher: Send + Sync {
    /// Hash `password` for the account identified by `username` and `member_since_iso`
    fn hash(&self, username: &str, member_since_iso: &str, password: &str) -> String;

    /// Compare a candidate password against a stored hash in constant time
    fn verify(&self, username: &str, member_since_iso: &str, password: &str, stored: &str) -> bool {
        let computed = self.hash(username, member_since_iso, password);
        constant_time_eq::constant_time_eq(computed.as_bytes(), stored.as_bytes())
    }
}

/// PBKDF2-HMAC-SHA512, salted with username, creation time and a server pepper
pub struct Pbkdf2Hasher {
    pepper: String,
    iterations: u32,
}

impl Pbkdf2Hasher {
    pub fn new(config: &PasswordHashConfig) -> Self {
        Self {
            pepper: config.pepper.clone(),
            iterations: config.iterations.max(1),
        }
    }
}

impl Default for Pbkdf2Hasher {
    fn default() -> Self {
        Self::new(&PasswordHashConfig::default())
    }
}

impl PasswordHasher for Pbkdf2Hasher {
    fn hash(&self, username: &str, member_since_iso: &str, password: &str) -> String {
        let salt = format!("{}{}{}", username, member_since_iso, self.pepper);
        let mut derived = [0u8; 64];
        pbkdf2::pbkdf2_hmac::<Sha512>(
            password.as_bytes(),
            salt.as_bytes(),
            self.iterations,
            &mut derived,
        );
        hex::encode(derived)
    }
}
