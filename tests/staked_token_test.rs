//! sCSPR Receipt Token Tests
//!
//! Tests for mint gating and the two-phase authority handoff.

use odra::casper_types::U256;
use odra::host::{Deployer, HostRef};
use odra::prelude::*;

use liquid_staking_casper::tokens::{SCSPRToken, SCSPRTokenHostRef, SCSPRTokenInitArgs};

fn deploy_token(env: &odra::host::HostEnv) -> SCSPRTokenHostRef {
    let temp = env.get_account(0);
    env.set_caller(temp);
    SCSPRToken::deploy(env, SCSPRTokenInitArgs { authority: temp })
}

fn token_as(env: &odra::host::HostEnv, token: &SCSPRTokenHostRef, caller: Address) -> SCSPRTokenHostRef {
    env.set_caller(caller);
    SCSPRTokenHostRef::new(token.address(), env.clone())
}

// ==========================================
// Init
// ==========================================

#[test]
fn test_init_sets_temporary_authority() {
    let env = odra_test::env();
    let token = deploy_token(&env);
    let temp = env.get_account(0);

    assert_eq!(token.authority(), Some(temp));
    assert_eq!(token.pending_authority(), None);
    assert_eq!(token.total_supply(), U256::zero());
    assert_eq!(token.name(), "Staked CSPR");
    assert_eq!(token.symbol(), "sCSPR");
    assert_eq!(token.decimals(), 9u8);
}

// ==========================================
// Two-phase handoff
// ==========================================

#[test]
fn test_propose_sets_pending_candidate() {
    let env = odra_test::env();
    let token = deploy_token(&env);
    let temp = env.get_account(0);
    let candidate = env.get_account(1);

    let mut token_mut = token_as(&env, &token, temp);
    token_mut.propose_authority_transfer(candidate);

    // Nothing changes hands until the candidate accepts
    assert_eq!(token_mut.authority(), Some(temp));
    assert_eq!(token_mut.pending_authority(), Some(candidate));
}

#[test]
#[should_panic(expected = "Unauthorized")]
fn test_propose_by_non_authority_reverts() {
    let env = odra_test::env();
    let token = deploy_token(&env);
    let outsider = env.get_account(1);

    let mut token_mut = token_as(&env, &token, outsider);
    token_mut.propose_authority_transfer(outsider);
}

#[test]
fn test_repropose_overwrites_pending() {
    let env = odra_test::env();
    let token = deploy_token(&env);
    let temp = env.get_account(0);
    let first = env.get_account(1);
    let second = env.get_account(2);

    let mut token_mut = token_as(&env, &token, temp);
    token_mut.propose_authority_transfer(first);
    token_mut.propose_authority_transfer(second);

    assert_eq!(token_mut.pending_authority(), Some(second));

    let mut token_second = token_as(&env, &token, second);
    token_second.accept_authority();
    assert_eq!(token_second.authority(), Some(second));
}

#[test]
#[should_panic(expected = "Unauthorized")]
fn test_accept_by_other_account_reverts() {
    let env = odra_test::env();
    let token = deploy_token(&env);
    let temp = env.get_account(0);
    let candidate = env.get_account(1);
    let outsider = env.get_account(2);

    let mut token_mut = token_as(&env, &token, temp);
    token_mut.propose_authority_transfer(candidate);

    let mut token_outsider = token_as(&env, &token, outsider);
    token_outsider.accept_authority();
}

#[test]
#[should_panic(expected = "NoPendingTransfer")]
fn test_accept_without_pending_reverts() {
    let env = odra_test::env();
    let token = deploy_token(&env);
    let temp = env.get_account(0);

    let mut token_mut = token_as(&env, &token, temp);
    token_mut.accept_authority();
}

#[test]
fn test_accept_transfers_authority_and_clears_pending() {
    let env = odra_test::env();
    let token = deploy_token(&env);
    let temp = env.get_account(0);
    let candidate = env.get_account(1);

    let mut token_mut = token_as(&env, &token, temp);
    token_mut.propose_authority_transfer(candidate);

    let mut token_candidate = token_as(&env, &token, candidate);
    token_candidate.accept_authority();

    assert_eq!(token_candidate.authority(), Some(candidate));
    assert_eq!(token_candidate.pending_authority(), None);
}

#[test]
#[should_panic(expected = "NoPendingTransfer")]
fn test_second_accept_reverts() {
    let env = odra_test::env();
    let token = deploy_token(&env);
    let temp = env.get_account(0);
    let candidate = env.get_account(1);

    let mut token_mut = token_as(&env, &token, temp);
    token_mut.propose_authority_transfer(candidate);

    let mut token_candidate = token_as(&env, &token, candidate);
    token_candidate.accept_authority();
    token_candidate.accept_authority();
}

#[test]
fn test_new_authority_can_start_fresh_handoff() {
    let env = odra_test::env();
    let token = deploy_token(&env);
    let temp = env.get_account(0);
    let first = env.get_account(1);
    let second = env.get_account(2);

    let mut token_mut = token_as(&env, &token, temp);
    token_mut.propose_authority_transfer(first);

    let mut token_first = token_as(&env, &token, first);
    token_first.accept_authority();

    // The accepted authority may run the same protocol again
    token_first.propose_authority_transfer(second);
    let mut token_second = token_as(&env, &token, second);
    token_second.accept_authority();

    assert_eq!(token_second.authority(), Some(second));
}

// ==========================================
// Mint gating
// ==========================================

#[test]
fn test_mint_by_authority_updates_balance_and_supply() {
    let env = odra_test::env();
    let token = deploy_token(&env);
    let temp = env.get_account(0);
    let user = env.get_account(1);

    let mut token_mut = token_as(&env, &token, temp);
    token_mut.mint(user, U256::from(1_000u64));

    assert_eq!(token_mut.balance_of(user), U256::from(1_000u64));
    assert_eq!(token_mut.total_supply(), U256::from(1_000u64));
}

#[test]
#[should_panic(expected = "Unauthorized")]
fn test_mint_by_non_authority_reverts() {
    let env = odra_test::env();
    let token = deploy_token(&env);
    let outsider = env.get_account(1);

    let mut token_mut = token_as(&env, &token, outsider);
    token_mut.mint(outsider, U256::from(1_000u64));
}

#[test]
fn test_failed_mint_changes_no_balances() {
    let env = odra_test::env();
    let token = deploy_token(&env);
    let outsider = env.get_account(1);

    let mut token_mut = token_as(&env, &token, outsider);
    let result = token_mut.try_mint(outsider, U256::from(1_000u64));

    assert!(result.is_err());
    assert_eq!(token_mut.balance_of(outsider), U256::zero());
    assert_eq!(token_mut.total_supply(), U256::zero());
}

#[test]
#[should_panic(expected = "Unauthorized")]
fn test_old_authority_cannot_mint_after_handoff() {
    let env = odra_test::env();
    let token = deploy_token(&env);
    let temp = env.get_account(0);
    let candidate = env.get_account(1);

    let mut token_mut = token_as(&env, &token, temp);
    token_mut.propose_authority_transfer(candidate);

    let mut token_candidate = token_as(&env, &token, candidate);
    token_candidate.accept_authority();

    let mut token_temp = token_as(&env, &token, temp);
    token_temp.mint(temp, U256::one());
}

#[test]
fn test_supply_equals_sum_of_balances() {
    let env = odra_test::env();
    let token = deploy_token(&env);
    let temp = env.get_account(0);
    let holders = [env.get_account(1), env.get_account(2), env.get_account(3)];
    let amounts = [100u64, 250u64, 7u64];

    let mut token_mut = token_as(&env, &token, temp);
    for (holder, amount) in holders.iter().zip(amounts.iter()) {
        token_mut.mint(*holder, U256::from(*amount));
    }

    let sum = holders
        .iter()
        .fold(U256::zero(), |acc, h| acc + token_mut.balance_of(*h));
    assert_eq!(token_mut.total_supply(), sum);
    assert_eq!(token_mut.total_supply(), U256::from(357u64));
}

// ==========================================
// CEP-18 surface
// ==========================================

#[test]
fn test_transfer_from_spends_allowance() {
    let env = odra_test::env();
    let token = deploy_token(&env);
    let temp = env.get_account(0);
    let holder = env.get_account(1);
    let spender = env.get_account(2);
    let recipient = env.get_account(3);

    let mut token_mut = token_as(&env, &token, temp);
    token_mut.mint(holder, U256::from(500u64));

    let mut token_holder = token_as(&env, &token, holder);
    token_holder.approve(spender, U256::from(300u64));
    assert_eq!(token_holder.allowance(holder, spender), U256::from(300u64));

    let mut token_spender = token_as(&env, &token, spender);
    token_spender.transfer_from(holder, recipient, U256::from(200u64));

    assert_eq!(token_spender.balance_of(holder), U256::from(300u64));
    assert_eq!(token_spender.balance_of(recipient), U256::from(200u64));
    assert_eq!(token_spender.allowance(holder, spender), U256::from(100u64));
}

#[test]
fn test_allowance_adjustments() {
    let env = odra_test::env();
    let token = deploy_token(&env);
    let holder = env.get_account(1);
    let spender = env.get_account(2);

    let mut token_holder = token_as(&env, &token, holder);
    token_holder.approve(spender, U256::from(100u64));
    token_holder.increase_allowance(spender, U256::from(50u64));
    assert_eq!(token_holder.allowance(holder, spender), U256::from(150u64));

    token_holder.decrease_allowance(spender, U256::from(30u64));
    assert_eq!(token_holder.allowance(holder, spender), U256::from(120u64));
}

#[test]
fn test_transfer_moves_receipt_tokens() {
    let env = odra_test::env();
    let token = deploy_token(&env);
    let temp = env.get_account(0);
    let sender = env.get_account(1);
    let recipient = env.get_account(2);

    let mut token_mut = token_as(&env, &token, temp);
    token_mut.mint(sender, U256::from(500u64));

    let mut token_sender = token_as(&env, &token, sender);
    token_sender.transfer(recipient, U256::from(200u64));

    assert_eq!(token_sender.balance_of(sender), U256::from(300u64));
    assert_eq!(token_sender.balance_of(recipient), U256::from(200u64));
    // Transfers redistribute, supply stays put
    assert_eq!(token_sender.total_supply(), U256::from(500u64));
}
