//! Accounts: a key pair bound to a network.

use crate::crypto::{Ed25519PrivateKey, Ed25519PublicKey, Ed25519Signature};
use crate::error::DscResult;
use crate::transaction::Signer;
use crate::types::{Address, NetworkType};
use std::fmt;

/// A signing account. Lives for one run and is never persisted.
#[derive(Clone)]
pub struct Account {
    private_key: Ed25519PrivateKey,
    public_key: Ed25519PublicKey,
    address: Address,
}

impl Account {
    /// Generates a fresh random account on `network`.
    pub fn generate(network: NetworkType) -> Self {
        Self::from_private_key(Ed25519PrivateKey::generate(), network)
    }

    /// Creates an account from an existing private key.
    pub fn from_private_key(private_key: Ed25519PrivateKey, network: NetworkType) -> Self {
        let public_key = private_key.public_key();
        let address = Address::from_public_key(&public_key.to_bytes(), network);
        Self {
            private_key,
            public_key,
            address,
        }
    }

    /// Creates an account from a hex-encoded private key.
    pub fn from_private_key_hex(hex_str: &str, network: NetworkType) -> DscResult<Self> {
        Ok(Self::from_private_key(
            Ed25519PrivateKey::from_hex(hex_str)?,
            network,
        ))
    }

    /// Returns the account address.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Returns the public key.
    pub fn public_key(&self) -> Ed25519PublicKey {
        self.public_key
    }

    /// Returns the public-only view of this account.
    pub fn public_account(&self) -> PublicAccount {
        PublicAccount {
            public_key: self.public_key,
            address: self.address,
        }
    }
}

impl Signer for Account {
    fn public_key(&self) -> Ed25519PublicKey {
        self.public_key
    }

    fn address(&self) -> Address {
        self.address
    }

    fn sign_message(&self, message: &[u8]) -> Ed25519Signature {
        self.private_key.sign(message)
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("address", &self.address)
            .field("public_key", &self.public_key)
            .finish_non_exhaustive()
    }
}

/// Another party's account, known only by its public key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublicAccount {
    /// The account's public key.
    pub public_key: Ed25519PublicKey,
    /// The account's address.
    pub address: Address,
}

impl PublicAccount {
    /// Derives the account for `public_key` on `network`.
    pub fn from_public_key(public_key: Ed25519PublicKey, network: NetworkType) -> Self {
        Self {
            public_key,
            address: Address::from_public_key(&public_key.to_bytes(), network),
        }
    }

    /// Parses a hex public key.
    pub fn from_hex(hex_str: &str, network: NetworkType) -> DscResult<Self> {
        Ok(Self::from_public_key(
            Ed25519PublicKey::from_hex(hex_str)?,
            network,
        ))
    }
}
