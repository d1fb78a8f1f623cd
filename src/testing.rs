//! Shared fixtures for unit tests.

use std::sync::Arc;

use ed25519_dalek::SigningKey;

use crate::account::single::{SingleAccount, SINGLE_ACCOUNT_TYPE};
use crate::common::{Address, Coordinate};
use crate::crypto::KeyPair;
use crate::registry::Registry;
use crate::state::LedgerState;

/// Two single-key accounts: alice holds 5 coins and bob 1 coin, both on the
/// main chain coordinate.
pub(crate) struct TestLedger {
    pub state: LedgerState,
    pub alice: KeyPair,
    pub bob: KeyPair,
}

impl TestLedger {
    pub fn new() -> Self {
        Self::on_chain(Coordinate::main())
    }

    pub fn on_chain(chain_coord: Coordinate) -> Self {
        let registry = Arc::new(Registry::standard().unwrap());
        let mut state = LedgerState::new(chain_coord, registry);
        let alice = KeyPair {
            signing_key: SigningKey::from_bytes(&[0xA1; 32]),
        };
        let bob = KeyPair {
            signing_key: SigningKey::from_bytes(&[0xB0; 32]),
        };

        for (address, key, balance) in [
            (Self::ALICE, &alice, "5"),
            (Self::BOB, &bob, "1"),
        ] {
            let mut acc = SingleAccount::new(SINGLE_ACCOUNT_TYPE);
            acc.base.address = address;
            acc.key_hash = key.public_hash();
            state.create_account(Box::new(acc)).unwrap();
            state
                .balances
                .set_balance(&address, &Coordinate::main(), balance.parse().unwrap());
        }

        TestLedger { state, alice, bob }
    }

    const ALICE: Address = Address::new([0xA1; 20]);
    const BOB: Address = Address::new([0xB0; 20]);

    pub fn alice_address(&self) -> Address {
        Self::ALICE
    }

    pub fn bob_address(&self) -> Address {
        Self::BOB
    }
}
