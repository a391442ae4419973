//! Liquid Staking Contract
//!
//! Users deposit native CSPR and receive sCSPR receipt tokens priced at the
//! current exchange rate between total staked CSPR and the sCSPR supply.
//!
//! The contract can mint sCSPR only after the token's authority slot has been
//! handed to it through the two-phase transfer on the token: the token's
//! temporary authority proposes, this contract's owner accepts.
//!
//! ## Units
//! - CSPR: motes (U512), 1 CSPR = 1e9 motes
//! - sCSPR: 9 decimals (U256), denominated in motes

use odra::casper_types::{U256, U512};
use odra::prelude::*;
use odra::ContractRef;

use crate::address_bridge::create_address_bridge_ref;
use crate::tokens::{addresses_match, SCSPRTokenContractRef};

// ==========================================
// Events
// ==========================================

pub mod events {
    use odra::prelude::*;
    use odra::casper_types::{U256, U512};

    #[odra::event]
    pub struct Deposited {
        pub depositor: Address,
        pub amount_motes: U512,
        pub shares: U256,
    }

    #[odra::event]
    pub struct TokenOwnershipAccepted {
        pub token: Address,
    }

    #[odra::event]
    pub struct RewardsAccrued {
        pub amount_motes: U512,
        pub total_staked_motes: U512,
    }

    #[odra::event]
    pub struct AssociationVerified {
        pub caller: Address,
        pub native_address: String,
    }
}

// ==========================================
// Errors
// ==========================================

#[odra::odra_error]
pub enum StakingError {
    ZeroDeposit = 1,
    LedgerNotOwned = 2,
    Overflow = 3,
    Unauthorized = 4,
    NothingStaked = 5,
    BridgeNotConfigured = 6,
    AssociationMismatch = 7,
}

// ==========================================
// Contract
// ==========================================

#[odra::module(events = [
    events::Deposited,
    events::TokenOwnershipAccepted,
    events::RewardsAccrued,
    events::AssociationVerified
])]
pub struct LiquidStaking {
    // Receipt token reference, set at init and never reassigned
    token: Var<Address>,

    // Cumulative motes accepted via deposit plus accrued rewards
    total_staked: Var<U512>,

    // Admin
    owner: Var<Address>,
    bridge: Var<Option<Address>>,
}

#[odra::module]
impl LiquidStaking {
    // ==========================================
    // Initialization
    // ==========================================

    /// Initialize the staking contract with its receipt token and owner.
    pub fn init(&mut self, token: Address, owner: Address) {
        self.token.set(token);
        self.total_staked.set(U512::zero());
        self.owner.set(owner);
        self.bridge.set(None);
    }

    // ==========================================
    // User Functions
    // ==========================================

    /// Deposit CSPR and receive sCSPR at the current exchange rate.
    ///
    /// The first deposit bootstraps the rate at 1:1. Later deposits mint
    /// `v * total_supply / total_staked`, floor division - rounding always
    /// favors the pool, never the depositor.
    #[odra(payable)]
    pub fn deposit(&mut self) {
        let caller = self.env().caller();
        let amount = self.env().attached_value();

        if amount == U512::zero() {
            self.env().revert(StakingError::ZeroDeposit);
        }

        // Capability check at the call boundary, before any state change
        self.require_token_ownership();

        let mut token = self.token_ref();
        let supply = token.total_supply();

        let shares = if supply.is_zero() {
            self.total_staked.set(amount);
            self.motes_to_shares(amount)
        } else {
            let staked = self.total_staked.get_or_default();
            let shares = match self
                .motes_to_shares(amount)
                .checked_mul(supply)
                .and_then(|x| x.checked_div(self.motes_to_shares(staked)))
            {
                Some(s) => s,
                None => self.env().revert(StakingError::Overflow),
            };
            self.total_staked.set(staked + amount);
            shares
        };

        token.mint(caller, shares);

        self.env().emit_event(events::Deposited {
            depositor: caller,
            amount_motes: amount,
            shares,
        });
    }

    /// Deposit through the cross-addressing-scheme path.
    ///
    /// Resolves `pub_key_hex` via the configured address bridge and requires
    /// the derived address to be the caller, proving the caller controls both
    /// addressing schemes of the same account, then deposits as [`deposit`].
    #[odra(payable)]
    pub fn deposit_associated(&mut self, pub_key_hex: String) {
        let caller = self.env().caller();
        let bridge_addr = match self.bridge.get_or_default() {
            Some(b) => b,
            None => self.env().revert(StakingError::BridgeNotConfigured),
        };

        let bridge = create_address_bridge_ref(self.env().clone(), bridge_addr);
        let assoc = bridge.associate_pub_key(pub_key_hex);

        if !addresses_match(&assoc.derived_address, &caller) {
            self.env().revert(StakingError::AssociationMismatch);
        }

        self.env().emit_event(events::AssociationVerified {
            caller,
            native_address: assoc.native_address,
        });

        self.deposit();
    }

    // ==========================================
    // Admin Functions
    // ==========================================

    /// Accept the pending authority handoff on the receipt token (owner only).
    ///
    /// Fails, propagating the token's error, unless the token has a pending
    /// transfer naming this contract.
    pub fn accept_token_ownership(&mut self) {
        self.require_owner();
        let token_addr = self.token.get().expect("sCSPR token not set");
        let mut token = SCSPRTokenContractRef::new(self.env().clone(), token_addr);
        token.accept_authority();
        self.env()
            .emit_event(events::TokenOwnershipAccepted { token: token_addr });
    }

    /// Add staking rewards to the backing without minting (owner only).
    ///
    /// This is what moves the exchange rate off 1:1: total_staked grows while
    /// the sCSPR supply stays put. Accounting only - distribution of rewards
    /// to depositors happens implicitly through the rate.
    #[odra(payable)]
    pub fn accrue_rewards(&mut self) {
        self.require_owner();
        let amount = self.env().attached_value();

        if amount == U512::zero() {
            self.env().revert(StakingError::ZeroDeposit);
        }

        let staked = self.total_staked.get_or_default();
        if staked == U512::zero() {
            // A top-up before the first deposit would be erased by the
            // bootstrap branch of deposit()
            self.env().revert(StakingError::NothingStaked);
        }

        let new_total = match staked.checked_add(amount) {
            Some(t) => t,
            None => self.env().revert(StakingError::Overflow),
        };
        self.total_staked.set(new_total);

        self.env().emit_event(events::RewardsAccrued {
            amount_motes: amount,
            total_staked_motes: new_total,
        });
    }

    /// Set the address-bridge contract (owner only).
    pub fn set_address_bridge(&mut self, bridge: Address) {
        self.require_owner();
        self.bridge.set(Some(bridge));
    }

    // ==========================================
    // View Functions
    // ==========================================

    /// Total motes accepted via deposits plus accrued rewards
    pub fn total_staked(&self) -> U512 {
        self.total_staked.get_or_default()
    }

    /// Receipt token address
    pub fn token(&self) -> Option<Address> {
        self.token.get()
    }

    /// Contract owner
    pub fn owner(&self) -> Option<Address> {
        self.owner.get()
    }

    /// Configured address bridge, if any
    pub fn address_bridge(&self) -> Option<Address> {
        self.bridge.get_or_default()
    }

    /// Shares a deposit of `amount_motes` would mint right now (read-only).
    pub fn shares_for_deposit(&self, amount_motes: U512) -> U256 {
        if amount_motes == U512::zero() {
            return U256::zero();
        }
        let supply = self.token_ref().total_supply();
        if supply.is_zero() {
            return self.motes_to_shares(amount_motes);
        }
        let staked = self.total_staked.get_or_default();
        self.motes_to_shares(amount_motes)
            .checked_mul(supply)
            .and_then(|x| x.checked_div(self.motes_to_shares(staked)))
            .unwrap_or_default()
    }

    // ==========================================
    // Internal Functions
    // ==========================================

    fn require_owner(&self) {
        if self.owner.get() != Some(self.env().caller()) {
            self.env().revert(StakingError::Unauthorized);
        }
    }

    /// Revert unless the token's authority slot points at this contract.
    fn require_token_ownership(&self) {
        let self_addr = self.env().self_address();
        let owned = match self.token_ref().authority() {
            Some(a) => addresses_match(&a, &self_addr),
            None => false,
        };
        if !owned {
            self.env().revert(StakingError::LedgerNotOwned);
        }
    }

    fn token_ref(&self) -> SCSPRTokenContractRef {
        let token_addr = self.token.get().expect("sCSPR token not set");
        SCSPRTokenContractRef::new(self.env().clone(), token_addr)
    }

    /// Convert motes (U512) to sCSPR shares (U256, 9 decimals)
    fn motes_to_shares(&self, motes: U512) -> U256 {
        U256::from(motes.as_u128())
    }
}
