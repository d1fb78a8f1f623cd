use crate::common::{Address, PublicHash};
use crate::crypto::KeyPair;
use crate::error::Result;
use crate::genesis::GenesisAccount;

/// Suggested account address for a fresh key: the leading bytes of its
/// public hash. Accounts may use any address; this is only a convention for
/// keys created here.
pub fn default_address(key_hash: &PublicHash) -> Address {
    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(&key_hash.as_bytes()[..20]);
    Address::new(bytes)
}

pub fn handle_keygen() -> Result<()> {
    let keypair = KeyPair::generate();
    let key_hash = keypair.public_hash();
    let address = default_address(&key_hash);

    println!("Secret key:  {}", keypair.secret_hex());
    println!("Public key:  {}", keypair.public_key_hex());
    println!("Public hash: {}", key_hash);
    println!("Address:     {}", address);
    println!();
    println!("Genesis entry:");
    let entry = GenesisAccount::Single { address, key_hash };
    println!("{}", serde_json::to_string_pretty(&entry)?);
    println!();
    println!("Keep the secret key safe; it is not stored anywhere.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_address_is_hash_prefix() {
        let key_hash = PublicHash::new([7; 32]);
        assert_eq!(default_address(&key_hash), Address::new([7; 20]));
    }
}
