//! CEP-18 receipt token: sCSPR
//!
//! sCSPR is the receipt side of the liquid-staking pair. Minting is gated by a
//! single authority slot that changes hands through a two-phase handoff:
//! the current authority proposes a candidate, the candidate accepts.

use alloc::string::String;
use odra::casper_types::U256;
use odra::prelude::*;
use odra_modules::cep18::events::{
    DecreaseAllowance, IncreaseAllowance, Mint, SetAllowance, Transfer, TransferFrom,
};
use odra_modules::cep18_token::Cep18;

/// Extract 64-char hex hash from debug representation of Address
/// This helps compare addresses that may have different wrapper types in Casper 2.0
fn extract_hash_hex(debug_str: &str) -> Option<String> {
    let chars: Vec<char> = debug_str.chars().collect();
    for i in 0..chars.len().saturating_sub(63) {
        let slice: String = chars[i..i + 64].iter().collect();
        if slice.chars().all(|c| c.is_ascii_hexdigit()) {
            return Some(slice.to_lowercase());
        }
    }
    None
}

/// Compare two addresses across the wrapper types Casper 2.0 may hand us
/// (entity vs package) for the same underlying contract or account.
pub(crate) fn addresses_match(a: &Address, b: &Address) -> bool {
    if a == b {
        return true;
    }
    if let (Some(a_pkg), Some(b_pkg)) = (a.as_contract_package_hash(), b.as_contract_package_hash())
    {
        return a_pkg == b_pkg;
    }
    let a_str = format!("{:?}", a);
    let b_str = format!("{:?}", b);
    extract_hash_hex(&a_str) == extract_hash_hex(&b_str)
}

/// Authority handoff events
pub mod events {
    use odra::prelude::*;

    #[odra::event]
    pub struct AuthorityTransferStarted {
        pub from: Address,
        pub to: Address,
    }

    #[odra::event]
    pub struct AuthorityAccepted {
        pub new_authority: Address,
    }
}

/// Errors for token operations (codes continue the CEP-18 60000 space)
#[odra::odra_error]
pub enum TokenError {
    Unauthorized = 60004,
    NoPendingTransfer = 60005,
    Overflow = 60006,
}

/// sCSPR: Staked CSPR receipt token - only the current authority can mint.
///
/// There is no burn entry point; total supply only grows. The authority slot
/// starts at a deployer-designated temporary holder so the token can be
/// deployed before the staking contract that will ultimately own it.
#[odra::module(
    events = [
        Mint,
        SetAllowance,
        IncreaseAllowance,
        DecreaseAllowance,
        Transfer,
        TransferFrom,
        events::AuthorityTransferStarted,
        events::AuthorityAccepted
    ],
    errors = TokenError
)]
pub struct SCSPRToken {
    token: SubModule<Cep18>,
    authority: Var<Address>,
    pending_authority: Var<Option<Address>>,
}

#[odra::module]
impl SCSPRToken {
    /// Initialize the token with its initial (temporary) authority.
    ///
    /// 9 decimals: sCSPR is denominated in motes so the bootstrap exchange
    /// rate against deposited CSPR is 1:1.
    pub fn init(&mut self, authority: Address) {
        self.token
            .init("sCSPR".to_string(), "Staked CSPR".to_string(), 9u8, U256::zero());
        self.authority.set(authority);
        self.pending_authority.set(None);
    }

    // ==========================================
    // Authority handoff
    // ==========================================

    /// Current mint authority
    pub fn authority(&self) -> Option<Address> {
        self.authority.get()
    }

    /// Candidate of an in-flight handoff, if any
    pub fn pending_authority(&self) -> Option<Address> {
        self.pending_authority.get_or_default()
    }

    /// Propose handing the authority slot to `candidate`.
    ///
    /// Only the current authority may call this. A second proposal overwrites
    /// the first; nothing changes hands until the candidate accepts.
    pub fn propose_authority_transfer(&mut self, candidate: Address) {
        let caller = self.env().caller();
        let current = match self.authority.get() {
            Some(a) => a,
            None => self.env().revert(TokenError::Unauthorized),
        };
        if !addresses_match(&current, &caller) {
            self.env().revert(TokenError::Unauthorized);
        }
        self.pending_authority.set(Some(candidate));
        self.env().emit_event(events::AuthorityTransferStarted {
            from: current,
            to: candidate,
        });
    }

    /// Accept a proposed handoff. Callable only by the pending candidate.
    pub fn accept_authority(&mut self) {
        let caller = self.env().caller();
        let pending = match self.pending_authority.get_or_default() {
            Some(p) => p,
            None => self.env().revert(TokenError::NoPendingTransfer),
        };
        if !addresses_match(&pending, &caller) {
            self.env().revert(TokenError::Unauthorized);
        }
        self.authority.set(pending);
        self.pending_authority.set(None);
        self.env().emit_event(events::AuthorityAccepted {
            new_authority: pending,
        });
    }

    // ==========================================
    // Mint
    // ==========================================

    /// Mint tokens (only authority can call)
    pub fn mint(&mut self, to: Address, amount: U256) {
        let caller = self.env().caller();
        if !self.is_authority(&caller) {
            self.env().revert(TokenError::Unauthorized);
        }
        if self.token.total_supply().checked_add(amount).is_none() {
            self.env().revert(TokenError::Overflow);
        }
        self.token.raw_mint(&to, &amount);
    }

    // ==========================================
    // CEP-18 surface
    // ==========================================

    /// Token name
    pub fn name(&self) -> String {
        self.token.name()
    }

    /// Token symbol
    pub fn symbol(&self) -> String {
        self.token.symbol()
    }

    /// Token decimals
    pub fn decimals(&self) -> u8 {
        self.token.decimals()
    }

    /// Total supply
    pub fn total_supply(&self) -> U256 {
        self.token.total_supply()
    }

    /// Balance of an address
    pub fn balance_of(&self, owner: Address) -> U256 {
        self.token.balance_of(&owner)
    }

    /// Allowance from owner to spender
    pub fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.token.allowance(&owner, &spender)
    }

    /// Transfer tokens
    pub fn transfer(&mut self, recipient: Address, amount: U256) {
        self.token.transfer(&recipient, &amount);
    }

    /// Approve spender
    pub fn approve(&mut self, spender: Address, amount: U256) {
        self.token.approve(&spender, &amount);
    }

    /// Increase allowance
    pub fn increase_allowance(&mut self, spender: Address, amount: U256) {
        self.token.increase_allowance(&spender, &amount);
    }

    /// Decrease allowance
    pub fn decrease_allowance(&mut self, spender: Address, amount: U256) {
        self.token.decrease_allowance(&spender, &amount);
    }

    /// Transfer from (with allowance)
    pub fn transfer_from(&mut self, owner: Address, recipient: Address, amount: U256) {
        self.token.transfer_from(&owner, &recipient, &amount);
    }

    // Check if caller holds the authority slot
    fn is_authority(&self, caller: &Address) -> bool {
        match self.authority.get() {
            Some(a) => addresses_match(&a, caller),
            None => false,
        }
    }
}
