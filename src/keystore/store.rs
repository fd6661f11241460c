//! On-disk keystore directory management.

use alloy::hex;
use alloy::primitives::Address;
use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::keys::KeyPair;
use crate::keystore::crypto::{decrypt_key, encrypt_key, ScryptParams};
use crate::keystore::format::KeystoreFile;

/// A stored account: its address and the file backing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub address: Address,
    pub path: PathBuf,
}

/// A directory of encrypted key files.
///
/// Keys live encrypted at rest and are decrypted only transiently inside an
/// operation; nothing is ever persisted in plain form. Deletion is explicit,
/// the store never removes a file on its own. The store holds no mutable
/// state and is safe to share across threads for read operations.
#[derive(Debug, Clone)]
pub struct Keystore {
    dir: PathBuf,
    params: ScryptParams,
}

impl Keystore {
    /// Open (creating if absent) a keystore directory with the given scrypt
    /// cost parameters for newly written files.
    pub fn open(dir: impl Into<PathBuf>, params: ScryptParams) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir, params })
    }

    /// The backing directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Generate a new key pair and write it encrypted under `passphrase`.
    pub fn generate(&self, passphrase: &str) -> Result<Account> {
        let keypair = KeyPair::generate()?;
        let account = self.write_new(&keypair, passphrase)?;
        tracing::info!(address = %account.address, "keystore account created");
        Ok(account)
    }

    /// Import an encrypted container, decrypting with `passphrase` and
    /// re-encrypting at rest under `new_passphrase`.
    ///
    /// Fails with [`Error::Decryption`] on a wrong passphrase,
    /// [`Error::Format`] on a malformed container or an embedded address
    /// that does not match the key, and [`Error::AlreadyExists`] if the
    /// address is already stored.
    pub fn import(&self, json: &[u8], passphrase: &str, new_passphrase: &str) -> Result<Account> {
        let file = KeystoreFile::from_json(json)?;
        let plain = decrypt_key(&file, passphrase)?;
        let keypair = KeyPair::from_private_bytes(&plain)
            .map_err(|e| Error::Format(format!("container holds invalid key material: {}", e)))?;

        if let Some(meta) = &file.address {
            if parse_meta_address(meta) != Some(keypair.address()) {
                return Err(Error::Format(format!(
                    "embedded address {} does not match key {}",
                    meta,
                    keypair.address()
                )));
            }
        }

        let account = self.write_new(&keypair, new_passphrase)?;
        tracing::info!(address = %account.address, "keystore account imported");
        Ok(account)
    }

    /// Export an account as an encrypted container under `new_passphrase`,
    /// leaving the stored file untouched.
    pub fn export(
        &self,
        address: Address,
        passphrase: &str,
        new_passphrase: &str,
    ) -> Result<Vec<u8>> {
        let keypair = self.unlock(address, passphrase)?;
        let file = encrypt_key(
            keypair.private_bytes().as_ref(),
            new_passphrase,
            self.params,
            address,
        )?;
        file.to_json()
    }

    /// Decrypt an account's key in memory. Nothing on disk changes.
    pub fn unlock(&self, address: Address, passphrase: &str) -> Result<KeyPair> {
        let account = self.find(address)?;
        let json = fs::read(&account.path)?;
        let file = KeystoreFile::from_json(&json)?;
        let plain = decrypt_key(&file, passphrase)?;
        KeyPair::from_private_bytes(&plain)
            .map_err(|e| Error::Format(format!("stored key material invalid: {}", e)))
    }

    /// Remove an account's file. The passphrase is verified first so a typo
    /// cannot destroy key material.
    pub fn delete(&self, address: Address, passphrase: &str) -> Result<()> {
        let account = self.find(address)?;
        self.unlock(address, passphrase)?;
        fs::remove_file(&account.path)?;
        tracing::info!(address = %address, "keystore account deleted");
        Ok(())
    }

    /// Enumerate stored accounts, in directory order.
    pub fn accounts(&self) -> Result<Vec<Account>> {
        let mut accounts = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            let json = match fs::read(&path) {
                Ok(json) => json,
                Err(e) => {
                    tracing::debug!(path = %path.display(), error = %e, "skipping unreadable keystore file");
                    continue;
                }
            };
            let Ok(file) = KeystoreFile::from_json(&json) else {
                tracing::debug!(path = %path.display(), "skipping non-keystore file");
                continue;
            };
            if let Some(address) = file.address.as_deref().and_then(parse_meta_address) {
                accounts.push(Account { address, path });
            }
        }
        Ok(accounts)
    }

    fn find(&self, address: Address) -> Result<Account> {
        self.accounts()?
            .into_iter()
            .find(|a| a.address == address)
            .ok_or_else(|| Error::NotFound(format!("no keystore entry for {}", address)))
    }

    fn write_new(&self, keypair: &KeyPair, passphrase: &str) -> Result<Account> {
        let address = keypair.address();
        if self.find(address).is_ok() {
            return Err(Error::AlreadyExists(address));
        }

        let file = encrypt_key(
            keypair.private_bytes().as_ref(),
            passphrase,
            self.params,
            address,
        )?;
        let path = self.dir.join(file_name(address));
        fs::write(&path, file.to_json()?)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o600))?;
        }

        Ok(Account { address, path })
    }
}

/// geth-style file name: `UTC--<timestamp>--<hexaddress>`.
fn file_name(address: Address) -> String {
    format!(
        "UTC--{}--{}",
        Utc::now().format("%Y-%m-%dT%H-%M-%S%.9fZ"),
        hex::encode(address)
    )
}

fn parse_meta_address(s: &str) -> Option<Address> {
    let bytes = hex::decode(s).ok()?;
    (bytes.len() == 20).then(|| Address::from_slice(&bytes))
}
