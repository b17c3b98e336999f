use alloc::vec::Vec;
use md5::{digest::Digest, Md5};

/// Length in bytes of a single MD5 block in the derived stream.
pub const DIGEST_LEN: usize = 16;

/// The [OpenSSL EVP_BytesToKey key derivation function](https://www.openssl.org/docs/man3.0/man3/EVP_BytesToKey.html),
/// fixed to MD5 and a single round, as used by `openssl enc`.
///
/// Fills `output` with the first `output.len()` bytes of the stream
/// `D_1 || D_2 || ...` where `D_i = MD5(D_{i-1} || password || salt)` and `D_0` is empty.
///
/// # Example
///
/// ```
/// use evp_bytes_to_key::evpkdf;
///
/// let mut key = [0u8; 16];
/// evpkdf(b"password", b"", &mut key);
/// assert_eq!(hex::encode(key), "5f4dcc3b5aa765d61d8327deb882cf99");
/// ```
pub fn evpkdf(password: &[u8], salt: &[u8], output: &mut [u8]) {
    let stream = stream(password, salt, output.len());
    output.copy_from_slice(&stream[..output.len()]);
}

/// Generates whole digest blocks until at least `len` bytes are available.
///
/// The returned buffer is a multiple of [`DIGEST_LEN`] and is empty when `len == 0`.
pub(crate) fn stream(password: &[u8], salt: &[u8], len: usize) -> Vec<u8> {
    let mut hasher = Md5::new();
    let mut derived = Vec::with_capacity(len.div_ceil(DIGEST_LEN) * DIGEST_LEN);
    let mut block = Vec::new();

    while derived.len() < len {
        if !block.is_empty() {
            hasher.update(&block);
        }
        hasher.update(password);
        hasher.update(salt);
        block = hasher.finalize_reset().to_vec();

        derived.extend_from_slice(&block);
    }

    derived
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_block() {
        let mut out = [0u8; 16];
        evpkdf(b"password", b"", &mut out);
        assert_eq!(hex::encode(out), "5f4dcc3b5aa765d61d8327deb882cf99");
    }

    #[test]
    fn test_chained_blocks() {
        let mut out = [0u8; 48];
        evpkdf(b"password", b"saltsalt", &mut out);
        assert_eq!(
            hex::encode(out),
            "fdbdf3419fff98bdb0241390f62a9db35f4aba29d77566377997314ebfc709f2\
             0b5ca7b1081f94b1ac12e3c8ba87d05a"
        );
    }

    #[test]
    fn test_empty_password() {
        let mut out = [0u8; 13];
        evpkdf(b"", b"", &mut out);
        assert_eq!(hex::encode(out), "d41d8cd98f00b204e9800998ec");
    }

    #[test]
    fn test_stream_is_block_aligned() {
        assert!(stream(b"password", b"", 0).is_empty());
        assert_eq!(stream(b"password", b"", 1).len(), 16);
        assert_eq!(stream(b"password", b"", 16).len(), 16);
        assert_eq!(stream(b"password", b"", 17).len(), 32);
        assert_eq!(stream(b"password", b"", 48).len(), 48);
    }

    #[test]
    fn test_empty_output() {
        let mut out = [0u8; 0];
        evpkdf(b"password", b"saltsalt", &mut out);
    }
}
