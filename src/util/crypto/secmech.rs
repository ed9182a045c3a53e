use aes::Aes128;
use cmac::Cmac;
use digest::Digest;
use hmac::{Hmac, Mac};
use md5::Md5;
use sha2::{Sha256, Sha512};

use crate::error::{SMBSecurityError, SMBSecurityResult};
use crate::util::crypto::NT_HASH_SIZE;

/// One slot of the per-connection primitive cache. Allocation is performed
/// once and never re-done; the connection's single-writer contract makes the
/// check-then-set safe without a lock.
#[derive(Clone)]
pub enum PrimitiveSlot<T> {
    Uninitialized,
    Ready(T),
}

impl<T: Clone> PrimitiveSlot<T> {
    fn handle(&self, primitive: &'static str) -> SMBSecurityResult<T> {
        match self {
            Self::Ready(ctx) => Ok(ctx.clone()),
            Self::Uninitialized => Err(SMBSecurityError::crypto_unavailable(primitive)),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }
}

/// Per-connection cache of keyed-hash/MAC contexts, lazily populated.
///
/// Unkeyed digests (MD5, SHA-512) are allocated once and cloned per
/// operation. Keyed MACs hold the context built from the most recent
/// `set_*_key` call, mirroring an allocate-once / rekey-per-use shash;
/// requesting a handle from an unallocated slot fails with
/// `CryptoUnavailable`.
pub struct SecMech {
    md5: PrimitiveSlot<Md5>,
    hmacmd5: PrimitiveSlot<Hmac<Md5>>,
    hmacsha256: PrimitiveSlot<Hmac<Sha256>>,
    cmacaes: PrimitiveSlot<Cmac<Aes128>>,
    sha512: PrimitiveSlot<Sha512>,
}

impl Default for SecMech {
    fn default() -> Self {
        Self {
            md5: PrimitiveSlot::Uninitialized,
            hmacmd5: PrimitiveSlot::Uninitialized,
            hmacsha256: PrimitiveSlot::Uninitialized,
            cmacaes: PrimitiveSlot::Uninitialized,
            sha512: PrimitiveSlot::Uninitialized,
        }
    }
}

impl SecMech {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc_md5(&mut self) -> SMBSecurityResult<()> {
        if !self.md5.is_ready() {
            self.md5 = PrimitiveSlot::Ready(Md5::new());
        }
        Ok(())
    }

    pub fn md5(&self) -> SMBSecurityResult<Md5> {
        self.md5.handle("md5")
    }

    pub fn alloc_sha512(&mut self) -> SMBSecurityResult<()> {
        if !self.sha512.is_ready() {
            self.sha512 = PrimitiveSlot::Ready(Sha512::new());
        }
        Ok(())
    }

    pub fn sha512(&self) -> SMBSecurityResult<Sha512> {
        self.sha512.handle("sha512")
    }

    /// Allocates the HMAC-MD5 slot, primed with an all-zero key. Callers
    /// set a real key before any MAC computation.
    pub fn alloc_hmacmd5(&mut self) -> SMBSecurityResult<()> {
        if !self.hmacmd5.is_ready() {
            let mac = <Hmac<Md5>>::new_from_slice(&[0u8; NT_HASH_SIZE])
                .map_err(|_| SMBSecurityError::crypto_unavailable("hmac(md5)"))?;
            self.hmacmd5 = PrimitiveSlot::Ready(mac);
        }
        Ok(())
    }

    pub fn set_hmacmd5_key(&mut self, key: &[u8]) -> SMBSecurityResult<()> {
        if !self.hmacmd5.is_ready() {
            return Err(SMBSecurityError::crypto_unavailable("hmac(md5)"));
        }
        let mac = <Hmac<Md5>>::new_from_slice(key)
            .map_err(|_| SMBSecurityError::crypto_failed("hmac(md5) rejected key"))?;
        self.hmacmd5 = PrimitiveSlot::Ready(mac);
        Ok(())
    }

    pub fn hmacmd5(&self) -> SMBSecurityResult<Hmac<Md5>> {
        self.hmacmd5.handle("hmac(md5)")
    }

    pub fn alloc_hmacsha256(&mut self) -> SMBSecurityResult<()> {
        if !self.hmacsha256.is_ready() {
            let mac = <Hmac<Sha256>>::new_from_slice(&[0u8; NT_HASH_SIZE])
                .map_err(|_| SMBSecurityError::crypto_unavailable("hmac(sha256)"))?;
            self.hmacsha256 = PrimitiveSlot::Ready(mac);
        }
        Ok(())
    }

    pub fn set_hmacsha256_key(&mut self, key: &[u8]) -> SMBSecurityResult<()> {
        if !self.hmacsha256.is_ready() {
            return Err(SMBSecurityError::crypto_unavailable("hmac(sha256)"));
        }
        let mac = <Hmac<Sha256>>::new_from_slice(key)
            .map_err(|_| SMBSecurityError::crypto_failed("hmac(sha256) rejected key"))?;
        self.hmacsha256 = PrimitiveSlot::Ready(mac);
        Ok(())
    }

    pub fn hmacsha256(&self) -> SMBSecurityResult<Hmac<Sha256>> {
        self.hmacsha256.handle("hmac(sha256)")
    }

    /// CMAC-AES requires a full-length key even when only priming the slot.
    pub fn alloc_cmacaes(&mut self) -> SMBSecurityResult<()> {
        if !self.cmacaes.is_ready() {
            let mac = <Cmac<Aes128>>::new_from_slice(&[0u8; 16])
                .map_err(|_| SMBSecurityError::crypto_unavailable("cmac(aes)"))?;
            self.cmacaes = PrimitiveSlot::Ready(mac);
        }
        Ok(())
    }

    pub fn set_cmacaes_key(&mut self, key: &[u8]) -> SMBSecurityResult<()> {
        if !self.cmacaes.is_ready() {
            return Err(SMBSecurityError::crypto_unavailable("cmac(aes)"));
        }
        let mac = <Cmac<Aes128>>::new_from_slice(key)
            .map_err(|_| SMBSecurityError::crypto_failed("cmac(aes) rejected key"))?;
        self.cmacaes = PrimitiveSlot::Ready(mac);
        Ok(())
    }

    pub fn cmacaes(&self) -> SMBSecurityResult<Cmac<Aes128>> {
        self.cmacaes.handle("cmac(aes)")
    }

    pub fn hmacmd5_ready(&self) -> bool {
        self.hmacmd5.is_ready()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyed_slot_unavailable_before_allocation() {
        let secmech = SecMech::new();
        assert_eq!(
            secmech.hmacmd5().unwrap_err(),
            SMBSecurityError::CryptoUnavailable("hmac(md5)")
        );
    }

    #[test]
    fn set_key_requires_allocated_slot() {
        let mut secmech = SecMech::new();
        assert!(secmech.set_hmacmd5_key(&[1u8; 16]).is_err());
        secmech.alloc_hmacmd5().unwrap();
        assert!(secmech.set_hmacmd5_key(&[1u8; 16]).is_ok());
        assert!(secmech.hmacmd5().is_ok());
    }

    #[test]
    fn allocation_is_idempotent() {
        let mut secmech = SecMech::new();
        secmech.alloc_hmacmd5().unwrap();
        secmech.set_hmacmd5_key(&[7u8; 16]).unwrap();
        // a second alloc must not clobber the keyed context
        secmech.alloc_hmacmd5().unwrap();
        let mac = secmech.hmacmd5().unwrap().chain_update(b"data").finalize();
        let keyed = <Hmac<Md5>>::new_from_slice(&[7u8; 16])
            .unwrap()
            .chain_update(b"data")
            .finalize();
        assert_eq!(mac.into_bytes(), keyed.into_bytes());
    }

    #[test]
    fn digest_slots_clone_fresh_state() {
        let mut secmech = SecMech::new();
        secmech.alloc_md5().unwrap();
        let first = secmech.md5().unwrap().chain_update(b"abc").finalize();
        let second = secmech.md5().unwrap().chain_update(b"abc").finalize();
        assert_eq!(first, second);
    }
}
