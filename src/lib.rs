//! # evp-bytes-to-key
//!
//! Key and IV derivation compatible with OpenSSL's legacy `EVP_BytesToKey()`, as used by
//! `openssl enc` with MD5 and a single round.
//!
//! ```
//! use evp_bytes_to_key::Key;
//!
//! let key = Key::new("password", None, 128, 0).unwrap();
//! assert_eq!(key.key_hex(), "5f4dcc3b5aa765d61d8327deb882cf99");
//! assert_eq!(key.iv(), None);
//! ```
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

use core::fmt;

mod key;
pub use key::{DerivationRequest, Key};

mod evpkdf;
pub use evpkdf::evpkdf;

/// The version of this crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub type Result<T, E = Error> = core::result::Result<T, E>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Error {
    InvalidPassword,
    InvalidSalt,
    InvalidKeyBits,
    InvalidIvLength,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPassword => write!(f, "password must be provided"),
            Self::InvalidSalt => write!(f, "salt must be exactly {} bytes", Key::SALT_LEN),
            Self::InvalidKeyBits => {
                write!(f, "bits must be a non-negative integer evenly divisible by 8")
            }
            Self::InvalidIvLength => write!(f, "iv_length must be a non-negative integer"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
