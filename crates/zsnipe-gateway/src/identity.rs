//! Local signing identities for development.
//!
//! Production runs with [`NoIdentities`], so nothing in the gateway can sign.
//! A development deployment points `--wallets-dir` at a directory of
//! `ZSNIPE_wallet_<n>.json` keypair files (64-byte JSON arrays, seed followed
//! by public key), which enables the bulk routes.

use std::collections::BTreeMap;
use std::path::Path;

use chain_sol::{sign_raw_transaction, Pubkey};
use tokio::sync::{Mutex, MutexGuard};
use zeroize::Zeroizing;

use crate::error::GatewayError;

/// Wallet numbers looked up in a keypair directory.
pub const WALLET_NUMBERS: std::ops::RangeInclusive<usize> = 1..=10;

pub fn wallet_file_name(number: usize) -> String {
    format!("ZSNIPE_wallet_{number}.json")
}

/// One signing identity.
pub struct Identity {
    number: usize,
    public_key: Pubkey,
    seed: Zeroizing<[u8; 32]>,
    submit_lock: Mutex<()>,
}

impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Identity")
            .field("number", &self.number)
            .field("public_key", &self.public_key)
            .finish_non_exhaustive()
    }
}

impl Identity {
    pub fn from_seed(number: usize, seed: [u8; 32]) -> Self {
        let seed = Zeroizing::new(seed);
        let public_key = Pubkey::from_signing_seed(&seed);
        Self {
            number,
            public_key,
            seed,
            submit_lock: Mutex::new(()),
        }
    }

    /// Parse a 64-byte keypair array; the trailing 32 bytes must match the
    /// public key of the leading seed.
    pub fn from_keypair_bytes(number: usize, bytes: &[u8]) -> Result<Self, GatewayError> {
        if bytes.len() != 64 {
            return Err(GatewayError::InvalidInput(format!(
                "keypair for wallet {number} is {} bytes, expected 64",
                bytes.len()
            )));
        }
        let mut seed = Zeroizing::new([0u8; 32]);
        seed.copy_from_slice(&bytes[..32]);
        let identity = Self::from_seed(number, *seed);
        if identity.public_key.as_ref() != &bytes[32..] {
            return Err(GatewayError::InvalidInput(format!(
                "keypair for wallet {number} has a mismatched public key"
            )));
        }
        Ok(identity)
    }

    pub fn number(&self) -> usize {
        self.number
    }

    pub fn public_key(&self) -> &Pubkey {
        &self.public_key
    }

    /// Fill this identity's signature slot in an unsigned wire transaction.
    pub fn sign(&self, unsigned: &[u8]) -> Result<Vec<u8>, GatewayError> {
        Ok(sign_raw_transaction(&self.seed, unsigned)?)
    }

    /// Serializes submissions from this identity.
    pub async fn lock(&self) -> MutexGuard<'_, ()> {
        self.submit_lock.lock().await
    }
}

pub trait IdentityProvider: Send + Sync {
    fn count(&self) -> usize;

    /// Identity by wallet number (1-based).
    fn by_index(&self, number: usize) -> Option<&Identity>;

    /// Wallet numbers held, ascending.
    fn numbers(&self) -> Vec<usize>;

    /// Identity used for admin-signed bulk operations.
    fn admin(&self) -> Option<&Identity>;
}

/// The production provider: holds nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoIdentities;

impl IdentityProvider for NoIdentities {
    fn count(&self) -> usize {
        0
    }

    fn by_index(&self, _number: usize) -> Option<&Identity> {
        None
    }

    fn numbers(&self) -> Vec<usize> {
        Vec::new()
    }

    fn admin(&self) -> Option<&Identity> {
        None
    }
}

/// Identities loaded from keypair files.
#[derive(Debug, Default)]
pub struct KeypairDirectory {
    wallets: BTreeMap<usize, Identity>,
    admin: Option<Identity>,
}

impl KeypairDirectory {
    /// Load every `ZSNIPE_wallet_<n>.json` present in `dir`. Missing files
    /// are skipped; unreadable or malformed ones are errors.
    pub fn load(dir: &Path, admin_keypair: Option<&Path>) -> Result<Self, GatewayError> {
        let mut wallets = BTreeMap::new();
        for number in WALLET_NUMBERS {
            let path = dir.join(wallet_file_name(number));
            if !path.exists() {
                tracing::debug!(number, "wallet file absent");
                continue;
            }
            let identity = read_keypair_file(number, &path)?;
            tracing::info!(number, public_key = %identity.public_key, "loaded dev wallet");
            wallets.insert(number, identity);
        }

        let admin = admin_keypair
            .map(|path| read_keypair_file(0, path))
            .transpose()?;

        Ok(Self { wallets, admin })
    }

    /// Build from in-memory seeds.
    pub fn from_seeds(seeds: impl IntoIterator<Item = (usize, [u8; 32])>) -> Self {
        let wallets = seeds
            .into_iter()
            .map(|(number, seed)| (number, Identity::from_seed(number, seed)))
            .collect();
        Self {
            wallets,
            admin: None,
        }
    }

    pub fn with_admin(mut self, seed: [u8; 32]) -> Self {
        self.admin = Some(Identity::from_seed(0, seed));
        self
    }
}

fn read_keypair_file(number: usize, path: &Path) -> Result<Identity, GatewayError> {
    let text = Zeroizing::new(std::fs::read_to_string(path).map_err(|e| {
        GatewayError::Internal(format!("reading keypair for wallet {number}: {e}"))
    })?);
    let bytes: Zeroizing<Vec<u8>> = Zeroizing::new(serde_json::from_str(&text).map_err(|e| {
        GatewayError::InvalidInput(format!("keypair for wallet {number} is not a byte array: {e}"))
    })?);
    Identity::from_keypair_bytes(number, &bytes)
}

impl IdentityProvider for KeypairDirectory {
    fn count(&self) -> usize {
        self.wallets.len()
    }

    fn by_index(&self, number: usize) -> Option<&Identity> {
        self.wallets.get(&number)
    }

    fn numbers(&self) -> Vec<usize> {
        self.wallets.keys().copied().collect()
    }

    /// Falls back to the lowest-numbered wallet when no admin file is set.
    fn admin(&self) -> Option<&Identity> {
        self.admin.as_ref().or_else(|| self.wallets.values().next())
    }
}
