//! Anchor discriminators.
//!
//! Accounts start with `sha256("account:<StructName>")[..8]`; instruction
//! data starts with `sha256("global:<snake_case_name>")[..8]`.

use sha2::{Digest, Sha256};

pub fn account_discriminator(struct_name: &str) -> [u8; 8] {
    hash_prefix("account", struct_name)
}

pub fn instruction_discriminator(ix_name: &str) -> [u8; 8] {
    hash_prefix("global", ix_name)
}

fn hash_prefix(namespace: &str, name: &str) -> [u8; 8] {
    let digest = Sha256::new()
        .chain_update(namespace.as_bytes())
        .chain_update(b":")
        .chain_update(name.as_bytes())
        .finalize();
    let mut out = [0u8; 8];
    out.copy_from_slice(&digest[..8]);
    out
}
