use std::fmt;

use argon2::{
    Algorithm, Argon2, Params, ParamsBuilder, Version,
    password_hash::{
        PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
    },
};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use password_hash::Error as PasswordHashError;
use rand::{TryRngCore, rngs::OsRng};
use sha2::Sha256;
use thiserror::Error;
use zeroize::Zeroizing;

type HmacSha256 = Hmac<Sha256>;

/// Password and bearer-token hashing for accounts.
///
/// Passwords go through Argon2id with a server-side pepper appended to the
/// input. Opaque session tokens are never stored; only their HMAC-SHA-256
/// digest (hex) is persisted.
pub struct AuthCrypto {
    argon2: Argon2<'static>,
    password_pepper: Zeroizing<Vec<u8>>,
    token_mac: HmacSha256,
}

impl fmt::Debug for AuthCrypto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthCrypto")
            .field("argon2_params", self.argon2.params())
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Error)]
pub enum AuthCryptoError {
    #[error("password pepper must not be empty")]
    EmptyPasswordPepper,
    #[error("token HMAC key must not be empty")]
    EmptyTokenKey,
    #[error("invalid Argon2 parameters: {0}")]
    InvalidArgon2Params(String),
    #[error("password hashing error: {0}")]
    PasswordHash(String),
    #[error("secure random generation failed: {0}")]
    Random(String),
}

impl From<PasswordHashError> for AuthCryptoError {
    fn from(err: PasswordHashError) -> Self {
        AuthCryptoError::PasswordHash(err.to_string())
    }
}

impl AuthCrypto {
    const DEFAULT_MEMORY_KIB: u32 = 64 * 1024; // 64 MiB
    const DEFAULT_ITERATIONS: u32 = 3;
    const DEFAULT_PARALLELISM: u32 = 1;
    const SALT_LENGTH: usize = password_hash::Salt::RECOMMENDED_LENGTH;
    const TOKEN_BYTES: usize = 32;

    /// Build a helper with default Argon2id parameters.
    pub fn new(
        password_pepper: impl AsRef<[u8]>,
        token_hmac_key: impl AsRef<[u8]>,
    ) -> Result<Self, AuthCryptoError> {
        Self::with_params(
            password_pepper,
            token_hmac_key,
            Self::params(
                Self::DEFAULT_MEMORY_KIB,
                Self::DEFAULT_ITERATIONS,
                Self::DEFAULT_PARALLELISM,
            )?,
        )
    }

    /// Minimal-cost parameters for tests, where hashing speed matters more
    /// than resistance to offline attacks.
    pub fn for_tests(
        password_pepper: impl AsRef<[u8]>,
        token_hmac_key: impl AsRef<[u8]>,
    ) -> Result<Self, AuthCryptoError> {
        Self::with_params(
            password_pepper,
            token_hmac_key,
            Self::params(Params::MIN_M_COST.max(8), 1, 1)?,
        )
    }

    pub fn with_params(
        password_pepper: impl AsRef<[u8]>,
        token_hmac_key: impl AsRef<[u8]>,
        params: Params,
    ) -> Result<Self, AuthCryptoError> {
        let pepper = password_pepper.as_ref();
        if pepper.is_empty() {
            return Err(AuthCryptoError::EmptyPasswordPepper);
        }

        let key = token_hmac_key.as_ref();
        if key.is_empty() {
            return Err(AuthCryptoError::EmptyTokenKey);
        }
        let token_mac = HmacSha256::new_from_slice(key)
            .map_err(|_| AuthCryptoError::EmptyTokenKey)?;

        let argon2 =
            Argon2::new(Algorithm::Argon2id, Version::default(), params);

        Ok(Self {
            argon2,
            password_pepper: Zeroizing::new(pepper.to_vec()),
            token_mac,
        })
    }

    fn params(
        memory_kib: u32,
        iterations: u32,
        parallelism: u32,
    ) -> Result<Params, AuthCryptoError> {
        ParamsBuilder::new()
            .m_cost(memory_kib)
            .t_cost(iterations)
            .p_cost(parallelism)
            .output_len(32)
            .build()
            .map_err(|err| AuthCryptoError::InvalidArgon2Params(err.to_string()))
    }

    fn peppered(&self, password: &str) -> Zeroizing<Vec<u8>> {
        let mut material = Zeroizing::new(Vec::with_capacity(
            password.len() + self.password_pepper.len(),
        ));
        material.extend_from_slice(password.as_bytes());
        material.extend_from_slice(&self.password_pepper);
        material
    }

    /// Hash a password with a random salt and the shared pepper. The result
    /// is a PHC string suitable for storage.
    pub fn hash_password(
        &self,
        password: &str,
    ) -> Result<String, AuthCryptoError> {
        let material = self.peppered(password);

        let mut salt_bytes = [0u8; Self::SALT_LENGTH];
        OsRng
            .try_fill_bytes(&mut salt_bytes)
            .map_err(|err| AuthCryptoError::Random(err.to_string()))?;
        let salt = SaltString::encode_b64(&salt_bytes)
            .map_err(AuthCryptoError::from)?;
        let hash = self.argon2.hash_password(&material, &salt)?.to_string();
        Ok(hash)
    }

    pub fn verify_password(
        &self,
        password: &str,
        password_hash: &str,
    ) -> Result<bool, AuthCryptoError> {
        let parsed = PasswordHash::new(password_hash)?;
        let material = self.peppered(password);
        Ok(self.argon2.verify_password(&material, &parsed).is_ok())
    }

    /// HMAC-SHA-256 of an opaque bearer token, hex encoded.
    pub fn hash_token(&self, token: &str) -> String {
        let mut mac = self.token_mac.clone();
        mac.update(token.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    /// Fresh 256-bit bearer token, base64 URL-safe without padding.
    pub fn generate_token(&self) -> Result<String, AuthCryptoError> {
        let mut token_bytes = Zeroizing::new([0u8; Self::TOKEN_BYTES]);
        OsRng
            .try_fill_bytes(&mut token_bytes[..])
            .map_err(|err| AuthCryptoError::Random(err.to_string()))?;
        Ok(URL_SAFE_NO_PAD.encode(&token_bytes[..]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn crypto() -> AuthCrypto {
        AuthCrypto::for_tests("pepper", "token-key").unwrap()
    }

    #[test]
    fn hashes_passwords_and_verifies() {
        let crypto = crypto();
        let hash = crypto.hash_password("correct horse").unwrap();
        assert!(crypto.verify_password("correct horse", &hash).unwrap());
        assert!(!crypto.verify_password("battery staple", &hash).unwrap());
    }

    #[test]
    fn pepper_is_part_of_the_hash_input() {
        let hash = crypto().hash_password("correct horse").unwrap();
        let other = AuthCrypto::for_tests("other-pepper", "token-key").unwrap();
        assert!(!other.verify_password("correct horse", &hash).unwrap());
    }

    #[test]
    fn hashes_tokens_to_stable_hex() {
        let crypto = crypto();
        let digest = crypto.hash_token("opaque-token");
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(digest, crypto.hash_token("opaque-token"));
        assert_ne!(digest, crypto.hash_token("other-token"));
    }

    #[test]
    fn generated_tokens_are_unique_and_url_safe() {
        let crypto = crypto();
        let a = crypto.generate_token().unwrap();
        let b = crypto.generate_token().unwrap();
        assert_ne!(a, b);
        assert_eq!(a.len(), 43);
        assert!(
            a.chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn rejects_empty_inputs() {
        assert!(matches!(
            AuthCrypto::new("", "token"),
            Err(AuthCryptoError::EmptyPasswordPepper)
        ));
        assert!(matches!(
            AuthCrypto::new("pepper", ""),
            Err(AuthCryptoError::EmptyTokenKey)
        ));
    }
}
