pub mod crypto;
pub mod service;

pub use crypto::{AuthCrypto, AuthCryptoError};
pub use service::{AuthError, AuthService, MIN_PASSWORD_LENGTH};
