//! Address Bridge External Contract Interface
//!
//! This module defines the external contract interface for the host's
//! address-association endpoint: given a compressed public key it returns the
//! chain-native account identifier and the derived address for the same
//! underlying account. Callers use it to prove control of both addressing
//! schemes before interacting with the staking contract.
//!
//! The bridge is consumed, never reimplemented: production binds the trait to
//! the host's association contract, tests bind it to [`stub::AddressBridgeStub`].

use odra::prelude::*;
use odra::ContractRef;

/// An associated pair of identifiers for one underlying account.
#[odra::odra_type]
pub struct Association {
    /// Chain-native identifier, formatted (e.g. an account-hash string)
    pub native_address: String,
    /// Derived address computed from the submitted public key
    pub derived_address: Address,
}

/// Address Bridge External Contract Interface
#[odra::external_contract]
pub trait AddressBridge {
    /// Resolve a compressed public key (hex) to its associated pair.
    fn associate_pub_key(&self, pub_key_hex: String) -> Association;
}

/// Helper to create an Address Bridge reference from a contract address
pub fn create_address_bridge_ref(env: Rc<ContractEnv>, bridge: Address) -> AddressBridgeContractRef {
    AddressBridgeContractRef::new(env, bridge)
}

/// Errors raised by the registry stub
#[odra::odra_error]
pub enum BridgeError {
    UnknownPublicKey = 1,
}

/// Registry stub standing in for the host association endpoint.
///
/// Tests and local demos register pairs up front; `associate_pub_key` then
/// behaves like the production endpoint for those keys.
pub mod stub {
    use super::{Association, BridgeError};
    use odra::prelude::*;

    #[odra::module(errors = BridgeError)]
    pub struct AddressBridgeStub {
        associations: Mapping<String, Association>,
    }

    #[odra::module]
    impl AddressBridgeStub {
        /// Register the pair returned for `pub_key_hex`.
        pub fn register(
            &mut self,
            pub_key_hex: String,
            native_address: String,
            derived_address: Address,
        ) {
            self.associations.set(
                &pub_key_hex,
                Association {
                    native_address,
                    derived_address,
                },
            );
        }

        /// Resolve a registered public key; unknown keys revert.
        pub fn associate_pub_key(&self, pub_key_hex: String) -> Association {
            match self.associations.get(&pub_key_hex) {
                Some(assoc) => assoc,
                None => self.env().revert(BridgeError::UnknownPublicKey),
            }
        }
    }
}
