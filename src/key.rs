use crate::{
    evpkdf::{self, DIGEST_LEN},
    Error, Result,
};
use alloc::{string::String, vec::Vec};
use core::fmt;

#[cfg(feature = "serde")]
use serde::{ser::SerializeStruct, Serialize};

/// A key, and optionally an IV, derived from a password and salt.
///
/// Byte-for-byte identical to what `EVP_BytesToKey()` with MD5 and a single round produces,
/// which is what the `openssl enc` command line utility uses by default for `-md md5`.
///
/// This scheme is weak and only exists for compatibility with legacy encrypted data. Do not use
/// it for new designs.
#[derive(Clone, PartialEq, Eq)]
pub struct Key {
    key: Vec<u8>,
    key_hex: String,
    iv: Option<Vec<u8>>,
    iv_hex: Option<String>,
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Key").field("key", &self.key_hex).field("iv", &self.iv_hex).finish()
    }
}

#[cfg(feature = "serde")]
impl Serialize for Key {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("Key", 2)?;
        state.serialize_field("key", &self.key_hex)?;
        state.serialize_field("iv", &self.iv_hex)?;
        state.end()
    }
}

impl Key {
    /// The only accepted salt length, in bytes.
    pub const SALT_LEN: usize = 8;
    /// The length of every block of the derived stream.
    pub const DIGEST_LEN: usize = DIGEST_LEN;

    /// Derives a key of `bits` bits and an IV of `iv_length` bytes.
    ///
    /// # Example
    ///
    /// ```
    /// use evp_bytes_to_key::Key;
    ///
    /// let key = Key::new("password", Some(&b"saltsalt"[..]), 256, 16).unwrap();
    /// assert_eq!(key.key_hex(), "fdbdf3419fff98bdb0241390f62a9db35f4aba29d77566377997314ebfc709f2");
    /// assert_eq!(key.iv_hex(), Some("0b5ca7b1081f94b1ac12e3c8ba87d05a"));
    /// ```
    pub fn new<P: AsRef<[u8]>>(
        password: P,
        salt: Option<&[u8]>,
        bits: usize,
        iv_length: usize,
    ) -> Result<Self> {
        DerivationRequest {
            password: Some(password.as_ref().into()),
            salt: salt.map(Into::into),
            key_bits: Some(bits),
            iv_length: Some(iv_length),
        }
        .derive()
    }

    /// The raw key bytes.
    pub fn key(&self) -> &[u8] {
        &self.key
    }

    /// The key as a lowercase hex string.
    pub fn key_hex(&self) -> &str {
        &self.key_hex
    }

    /// The raw IV bytes, if an IV was requested.
    pub fn iv(&self) -> Option<&[u8]> {
        self.iv.as_deref()
    }

    /// The IV as a lowercase hex string, if an IV was requested.
    pub fn iv_hex(&self) -> Option<&str> {
        self.iv_hex.as_deref()
    }

    /// The length of the key in bits.
    pub fn bits(&self) -> usize {
        self.key.len() * 8
    }

    /// The length of the IV in bytes, `0` if none was requested.
    pub fn iv_length(&self) -> usize {
        self.iv.as_ref().map_or(0, Vec::len)
    }

    fn from_stream(stream: &[u8], key_len: usize, iv_length: usize) -> Self {
        let key = stream[..key_len].to_vec();
        let key_hex = hex::encode(&key);
        let (iv, iv_hex) = if iv_length > 0 {
            let iv = stream[key_len..key_len + iv_length].to_vec();
            let iv_hex = hex::encode(&iv);
            (Some(iv), Some(iv_hex))
        } else {
            (None, None)
        };
        Self { key, key_hex, iv, iv_hex }
    }
}

/// Collects the inputs of a derivation one field at a time.
///
/// Fields are validated in order (password, salt, key bits, IV length) when calling
/// [`derive`][Self::derive], and the first invalid one is reported.
///
/// # Example
///
/// ```
/// use evp_bytes_to_key::{DerivationRequest, Error};
///
/// let key = DerivationRequest::new().password("password").key_bits(128).iv_length(0).derive();
/// assert_eq!(key.unwrap().key_hex(), "5f4dcc3b5aa765d61d8327deb882cf99");
///
/// let err = DerivationRequest::new().password("password").key_bits(-8).derive();
/// assert_eq!(err, Err(Error::InvalidKeyBits));
/// ```
#[derive(Clone, Default, PartialEq, Eq)]
pub struct DerivationRequest {
    password: Option<Vec<u8>>,
    salt: Option<Vec<u8>>,
    key_bits: Option<usize>,
    iv_length: Option<usize>,
}

impl fmt::Debug for DerivationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DerivationRequest")
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("salt", &self.salt.as_ref().map(hex::encode))
            .field("key_bits", &self.key_bits)
            .field("iv_length", &self.iv_length)
            .finish()
    }
}

impl DerivationRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the password. Any byte sequence is accepted, including an empty one.
    pub fn password<P: AsRef<[u8]>>(mut self, password: P) -> Self {
        self.password = Some(password.as_ref().into());
        self
    }

    /// Sets the salt, which must be exactly [`Key::SALT_LEN`] bytes long.
    pub fn salt<S: AsRef<[u8]>>(mut self, salt: S) -> Self {
        self.salt = Some(salt.as_ref().into());
        self
    }

    /// Sets the key length in bits. Values that don't fit a `usize` are rejected on derivation.
    pub fn key_bits<T: TryInto<usize>>(mut self, bits: T) -> Self {
        self.key_bits = bits.try_into().ok();
        self
    }

    /// Sets the IV length in bytes. Values that don't fit a `usize` are rejected on derivation.
    pub fn iv_length<T: TryInto<usize>>(mut self, iv_length: T) -> Self {
        self.iv_length = iv_length.try_into().ok();
        self
    }

    /// Validates the request and derives the key material.
    pub fn derive(self) -> Result<Key> {
        let password = validate_password(self.password)?;
        let salt = validate_salt(self.salt)?;
        let bits = validate_bits(self.key_bits)?;
        let iv_length = validate_iv_length(self.iv_length)?;

        let key_len = bits / 8;
        let total = key_len.checked_add(iv_length).ok_or_else(|| {
            log::debug!("rejected derivation: key and iv lengths overflow");
            Error::InvalidIvLength
        })?;
        log::trace!(
            "deriving {key_len} key bytes and {iv_length} iv bytes from {} md5 blocks",
            total.div_ceil(DIGEST_LEN)
        );

        let stream = evpkdf::stream(&password, salt.as_deref().unwrap_or_default(), total);
        Ok(Key::from_stream(&stream, key_len, iv_length))
    }
}

fn validate_password(password: Option<Vec<u8>>) -> Result<Vec<u8>> {
    password.ok_or_else(|| {
        log::debug!("rejected derivation: missing password");
        Error::InvalidPassword
    })
}

fn validate_salt(salt: Option<Vec<u8>>) -> Result<Option<Vec<u8>>> {
    match salt {
        Some(salt) if salt.len() != Key::SALT_LEN => {
            log::debug!("rejected derivation: salt is {} bytes", salt.len());
            Err(Error::InvalidSalt)
        }
        salt => Ok(salt),
    }
}

fn validate_bits(bits: Option<usize>) -> Result<usize> {
    match bits {
        Some(bits) if bits % 8 == 0 => Ok(bits),
        bits => {
            log::debug!("rejected derivation: invalid key bits {bits:?}");
            Err(Error::InvalidKeyBits)
        }
    }
}

fn validate_iv_length(iv_length: Option<usize>) -> Result<usize> {
    iv_length.ok_or_else(|| {
        log::debug!("rejected derivation: invalid iv length");
        Error::InvalidIvLength
    })
}
