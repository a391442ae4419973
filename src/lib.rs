//! Liquid Staking for CSPR (Odra)
//!
//! This crate implements a liquid-staking accounting engine on Casper using
//! the Odra framework.
//! - sCSPR: Receipt token, mintable only by its current authority
//! - LiquidStaking: Deposit engine pricing sCSPR against total staked CSPR
//! - AddressBridge: External interface for public-key address association

#![cfg_attr(target_arch = "wasm32", no_std)]

extern crate alloc;

pub mod tokens;
pub mod address_bridge;
pub mod staking;
