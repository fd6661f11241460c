//! KDF, cipher, and MAC operations for keystore v3 containers.

use alloy::hex;
use alloy::primitives::keccak256;
use ctr::cipher::{KeyIvInit, StreamCipher};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::error::{Error, Result};
use crate::keystore::format::{
    CipherParams, CryptoSection, KdfParams, KeystoreFile, CIPHER_AES_128_CTR, KEYSTORE_VERSION,
};

type Aes128Ctr = ctr::Ctr128BE<aes::Aes128>;

/// Derived-key length; 16 bytes feed the cipher, 16 bytes the MAC.
const DKLEN: u32 = 32;

/// Fixed scrypt block size, per the standard format.
const SCRYPT_R: u32 = 8;

/// Scrypt cost parameters for newly written containers.
///
/// `n` is the CPU/memory cost (power of two), `p` the parallelization cost.
/// Higher values increase brute-force resistance at the cost of latency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScryptParams {
    pub n: u32,
    pub p: u32,
}

impl ScryptParams {
    /// geth's StandardScryptN/P.
    pub const STANDARD: Self = Self { n: 1 << 18, p: 1 };

    /// geth's LightScryptN/P, for interactive use.
    pub const LIGHT: Self = Self { n: 1 << 12, p: 6 };

    fn log_n(&self) -> Result<u8> {
        if self.n < 2 || !self.n.is_power_of_two() {
            return Err(Error::Format(format!(
                "scrypt n must be a power of two > 1, got {}",
                self.n
            )));
        }
        Ok(self.n.trailing_zeros() as u8)
    }
}

impl Default for ScryptParams {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Encrypt raw private-key bytes into a fresh v3 container.
///
/// Salt and IV come from the OS random source; failure there is
/// [`Error::Entropy`]. `address` is recorded as metadata only.
pub fn encrypt_key(
    plaintext: &[u8],
    passphrase: &str,
    params: ScryptParams,
    address: alloy::primitives::Address,
) -> Result<KeystoreFile> {
    let mut salt = [0u8; 32];
    let mut iv = [0u8; 16];
    OsRng
        .try_fill_bytes(&mut salt)
        .and_then(|_| OsRng.try_fill_bytes(&mut iv))
        .map_err(|e| Error::Entropy(e.to_string()))?;

    let mut derived = Zeroizing::new([0u8; DKLEN as usize]);
    let scrypt_params = scrypt::Params::new(params.log_n()?, SCRYPT_R, params.p, DKLEN as usize)
        .map_err(|e| Error::Format(format!("invalid scrypt parameters: {}", e)))?;
    scrypt::scrypt(passphrase.as_bytes(), &salt, &scrypt_params, derived.as_mut())
        .map_err(|e| Error::Format(format!("scrypt failed: {}", e)))?;

    let mut ciphertext = plaintext.to_vec();
    apply_ctr(&derived[..16], &iv, &mut ciphertext);
    let mac = mac_bytes(&derived[16..32], &ciphertext);

    Ok(KeystoreFile {
        address: Some(hex::encode(address)),
        crypto: CryptoSection {
            cipher: CIPHER_AES_128_CTR.to_string(),
            cipherparams: CipherParams {
                iv: hex::encode(iv),
            },
            ciphertext: hex::encode(&ciphertext),
            kdf: "scrypt".to_string(),
            kdfparams: KdfParams::Scrypt {
                dklen: DKLEN,
                n: params.n as u64,
                p: params.p,
                r: SCRYPT_R,
                salt: hex::encode(salt),
            },
            mac: hex::encode(mac),
        },
        id: Uuid::new_v4(),
        version: KEYSTORE_VERSION,
    })
}

/// Decrypt a v3 container, verifying the MAC before touching the payload.
///
/// A MAC mismatch means the passphrase is wrong ([`Error::Decryption`]);
/// structural problems are [`Error::Format`].
pub fn decrypt_key(file: &KeystoreFile, passphrase: &str) -> Result<Zeroizing<Vec<u8>>> {
    file.validate()?;

    let iv = decode_fixed::<16>(&file.crypto.cipherparams.iv, "iv")?;
    let mac = decode_fixed::<32>(&file.crypto.mac, "mac")?;
    let ciphertext = hex::decode(&file.crypto.ciphertext)
        .map_err(|e| Error::Format(format!("invalid ciphertext hex: {}", e)))?;

    let derived = derive_key(passphrase, &file.crypto.kdfparams)?;

    if mac_bytes(&derived[16..32], &ciphertext) != mac {
        return Err(Error::Decryption);
    }

    let mut plaintext = Zeroizing::new(ciphertext);
    apply_ctr(&derived[..16], &iv, plaintext.as_mut());
    Ok(plaintext)
}

fn derive_key(passphrase: &str, params: &KdfParams) -> Result<Zeroizing<[u8; 32]>> {
    let mut derived = Zeroizing::new([0u8; 32]);
    match params {
        KdfParams::Scrypt {
            dklen,
            n,
            p,
            r,
            salt,
        } => {
            if *dklen != DKLEN {
                return Err(Error::Format(format!("unsupported dklen {}", dklen)));
            }
            let salt = hex::decode(salt)
                .map_err(|e| Error::Format(format!("invalid salt hex: {}", e)))?;
            if *n < 2 || *n > u32::MAX as u64 || !n.is_power_of_two() {
                return Err(Error::Format(format!("invalid scrypt n {}", n)));
            }
            let log_n = n.trailing_zeros() as u8;
            let scrypt_params = scrypt::Params::new(log_n, *r, *p, DKLEN as usize)
                .map_err(|e| Error::Format(format!("invalid scrypt parameters: {}", e)))?;
            scrypt::scrypt(passphrase.as_bytes(), &salt, &scrypt_params, derived.as_mut())
                .map_err(|e| Error::Format(format!("scrypt failed: {}", e)))?;
        }
        KdfParams::Pbkdf2 {
            dklen,
            c,
            prf,
            salt,
        } => {
            if *dklen != DKLEN {
                return Err(Error::Format(format!("unsupported dklen {}", dklen)));
            }
            if prf != "hmac-sha256" {
                return Err(Error::Format(format!("unsupported prf {:?}", prf)));
            }
            let salt = hex::decode(salt)
                .map_err(|e| Error::Format(format!("invalid salt hex: {}", e)))?;
            pbkdf2::pbkdf2_hmac::<Sha256>(passphrase.as_bytes(), &salt, *c, derived.as_mut());
        }
    }
    Ok(derived)
}

/// AES-128-CTR is its own inverse; one function covers both directions.
fn apply_ctr(key: &[u8], iv: &[u8; 16], data: &mut [u8]) {
    let mut key16 = [0u8; 16];
    key16.copy_from_slice(key);
    let mut cipher = Aes128Ctr::new(&key16.into(), iv.into());
    cipher.apply_keystream(data);
}

/// `keccak256(derived[16..32] || ciphertext)`, per the v3 format.
fn mac_bytes(mac_key: &[u8], ciphertext: &[u8]) -> [u8; 32] {
    let mut input = Vec::with_capacity(mac_key.len() + ciphertext.len());
    input.extend_from_slice(mac_key);
    input.extend_from_slice(ciphertext);
    keccak256(&input).0
}

fn decode_fixed<const N: usize>(s: &str, field: &str) -> Result<[u8; N]> {
    let bytes =
        hex::decode(s).map_err(|e| Error::Format(format!("invalid {} hex: {}", field, e)))?;
    bytes
        .try_into()
        .map_err(|_| Error::Format(format!("{} has wrong length", field)))
}
