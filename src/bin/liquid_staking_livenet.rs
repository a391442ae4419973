//! Livenet deploy and demo binary for the CSPR liquid-staking pair.
//!
//! Deploys sCSPR with the caller as temporary authority, deploys the
//! LiquidStaking contract, runs the two-phase authority handoff, and
//! optionally performs a demo deposit.
//!
//! Run with:
//! - Deploy + handoff:      LSTAKE_LIVENET_MODE=deploy cargo run --bin liquid_staking_livenet --features=livenet
//! - Deploy + demo deposit: LSTAKE_LIVENET_MODE=deploy_and_demo cargo run --bin liquid_staking_livenet --features=livenet
//! - Demo on existing:      LSTAKE_LIVENET_MODE=demo LSTAKE_EXISTING_STAKING=... LSTAKE_EXISTING_TOKEN=... cargo run ...
//! - Query state:           LSTAKE_LIVENET_MODE=query LSTAKE_EXISTING_STAKING=... LSTAKE_EXISTING_TOKEN=... cargo run ...
//!
//! Required environment variables (Odra livenet):
//! - ODRA_CASPER_LIVENET_SECRET_KEY_PATH
//! - ODRA_CASPER_LIVENET_NODE_ADDRESS        (base URL; Odra appends "/rpc")
//! - ODRA_CASPER_LIVENET_EVENTS_URL          (required by Odra; placeholder URL is OK here)
//! - ODRA_CASPER_LIVENET_CHAIN_NAME
//!
//! Optional:
//! - ODRA_CASPER_LIVENET_DEPLOY_GAS_TOKEN    (motes)
//! - ODRA_CASPER_LIVENET_DEPLOY_GAS_STAKING  (motes)
//! - ODRA_CASPER_LIVENET_CALL_GAS            (motes)
//! - ODRA_CASPER_LIVENET_GAS                 (legacy fallback; motes)
//! - LSTAKE_EXISTING_TOKEN                   (64-hex or formatted "hash-..."/"contract-package-...")
//! - LSTAKE_EXISTING_STAKING                 (64-hex or formatted "hash-..."/"contract-package-...")
//! - LSTAKE_DEMO_DEPOSIT_CSPR                (default: 100)

use odra::casper_types::U512;
use odra::host::{Deployer, HostRef, HostRefLoader};
use odra::prelude::*;

use liquid_staking_casper::staking::{LiquidStaking, LiquidStakingHostRef, LiquidStakingInitArgs};
use liquid_staking_casper::tokens::{SCSPRToken, SCSPRTokenHostRef, SCSPRTokenInitArgs};

const MOTES_PER_CSPR: u64 = 1_000_000_000;

const DEFAULT_DEPLOY_GAS_TOKEN_MOTES: u64 = 450_000_000_000; // 450 CSPR
const DEFAULT_DEPLOY_GAS_STAKING_MOTES: u64 = 600_000_000_000; // 600 CSPR
const DEFAULT_CALL_GAS_MOTES: u64 = 50_000_000_000; // 50 CSPR

fn main() {
    println!("============================================");
    println!("  CSPR Liquid Staking - Livenet");
    println!("============================================\n");

    let env = odra_casper_livenet_env::env();

    let mode = std::env::var("LSTAKE_LIVENET_MODE").unwrap_or_else(|_| "deploy".to_string());
    let should_deploy = mode == "deploy" || mode == "deploy_and_demo";
    let should_demo = mode == "demo" || mode == "deploy_and_demo";
    let should_query = mode == "query";

    let gas_fallback = read_u64_env("ODRA_CASPER_LIVENET_GAS", DEFAULT_DEPLOY_GAS_TOKEN_MOTES);
    let deploy_gas_token = read_u64_env("ODRA_CASPER_LIVENET_DEPLOY_GAS_TOKEN", gas_fallback);
    let deploy_gas_staking =
        read_u64_env("ODRA_CASPER_LIVENET_DEPLOY_GAS_STAKING", DEFAULT_DEPLOY_GAS_STAKING_MOTES);
    let call_gas = read_u64_env("ODRA_CASPER_LIVENET_CALL_GAS", DEFAULT_CALL_GAS_MOTES);

    let deposit_cspr = read_u64_env("LSTAKE_DEMO_DEPOSIT_CSPR", 100);
    let deposit_motes = U512::from(deposit_cspr) * U512::from(MOTES_PER_CSPR);

    println!("[INFO] Mode: {}", mode);
    println!("[INFO] Caller: {:?}", env.caller());
    println!(
        "[INFO] Gas (motes): deploy_token={} ({} CSPR), deploy_staking={} ({} CSPR), calls={} ({} CSPR)",
        deploy_gas_token,
        deploy_gas_token / MOTES_PER_CSPR,
        deploy_gas_staking,
        deploy_gas_staking / MOTES_PER_CSPR,
        call_gas,
        call_gas / MOTES_PER_CSPR
    );
    println!("[INFO] Demo params: deposit={} CSPR", deposit_cspr);
    println!();

    // ==========================================
    // Step 1: Deploy (or reuse) sCSPR
    // ==========================================
    let token = if should_deploy {
        println!("[STEP 1] Deploying sCSPR token (caller as temporary authority)...");
        env.set_gas(deploy_gas_token);
        let token = SCSPRToken::deploy(&env, SCSPRTokenInitArgs { authority: env.caller() });
        println!("[OK] sCSPR deployed at: {:?}", token.address());
        println!("     Name: {}", token.name());
        println!("     Symbol: {}", token.symbol());
        println!("     Authority: {:?}", token.authority());
        println!();
        token
    } else {
        println!("[STEP 1] Reusing existing sCSPR token...");
        let raw = std::env::var("LSTAKE_EXISTING_TOKEN")
            .unwrap_or_else(|_| panic!("LSTAKE_EXISTING_TOKEN must be set for mode={}", mode));
        let addr = parse_contract_address(&raw);
        println!("[OK] sCSPR: {:?}", addr);
        println!();
        SCSPRToken::load(&env, addr)
    };
    let token_addr = token.address();

    // ==========================================
    // Step 2: Deploy (or reuse) LiquidStaking
    // ==========================================
    let staking = if should_deploy {
        println!("[STEP 2] Deploying LiquidStaking contract...");
        env.set_gas(deploy_gas_staking);
        let staking = LiquidStaking::deploy(
            &env,
            LiquidStakingInitArgs {
                token: token_addr,
                owner: env.caller(),
            },
        );
        println!("[OK] LiquidStaking deployed at: {:?}", staking.address());
        println!("     Token: {:?}", staking.token());
        println!("     Owner: {:?}", staking.owner());
        println!();
        staking
    } else {
        println!("[STEP 2] Reusing existing LiquidStaking contract...");
        let raw = std::env::var("LSTAKE_EXISTING_STAKING")
            .unwrap_or_else(|_| panic!("LSTAKE_EXISTING_STAKING must be set for mode={}", mode));
        let addr = parse_contract_address(&raw);
        println!("[OK] LiquidStaking: {:?}", addr);
        println!();
        LiquidStaking::load(&env, addr)
    };
    let staking_addr = staking.address();

    // ==========================================
    // Step 3: Two-phase authority handoff (CRITICAL - deposits revert until done)
    // ==========================================
    if !should_query {
        println!("[STEP 3] Handing sCSPR authority to LiquidStaking...");
        env.set_gas(call_gas);
        let mut token = SCSPRTokenHostRef::new(token_addr, env.clone());
        let mut staking_mut = LiquidStakingHostRef::new(staking_addr, env.clone());

        let current_authority = token.authority();
        println!("     Current authority: {:?}", current_authority);
        println!("     LiquidStaking:     {:?}", staking_addr);

        let already_owned = match &current_authority {
            Some(a) => {
                *a == staking_addr
                    || a.as_contract_package_hash() == staking_addr.as_contract_package_hash()
            }
            None => false,
        };

        if already_owned {
            println!("[OK] sCSPR authority already held by LiquidStaking.");
        } else {
            println!("     Proposing authority transfer...");
            token.propose_authority_transfer(staking_addr);
            println!("     Pending authority: {:?}", token.pending_authority());

            println!("     Accepting via LiquidStaking...");
            staking_mut.accept_token_ownership();

            let new_authority = token.authority();
            println!("[OK] sCSPR authority now: {:?}", new_authority);
            if new_authority.is_none() {
                panic!("[FATAL] handoff completed but authority is None!");
            }
        }
        println!();
    }

    // ==========================================
    // Demo: deposit CSPR, receive sCSPR
    // ==========================================
    if should_demo {
        let mut staking_mut = LiquidStakingHostRef::new(staking_addr, env.clone());
        let caller = env.caller();

        println!("[DEMO] Depositing {} CSPR...", deposit_cspr);
        env.set_gas(call_gas);
        let preview = staking_mut.shares_for_deposit(deposit_motes);
        println!("     Previewed shares: {}", preview);
        staking_mut.with_tokens(deposit_motes).deposit();
        println!("[OK] Deposit complete.");
        print_staking_info(&staking_mut, caller, &token);
    }

    // ==========================================
    // Query mode: Output state as JSON
    // ==========================================
    if should_query {
        let staking = LiquidStakingHostRef::new(staking_addr, env.clone());
        let query_user = env.caller();
        let balance = token.balance_of(query_user);

        println!(
            "LSTAKE_STATE_JSON={{\"total_staked_motes\":\"{}\",\"total_supply\":\"{}\",\"authority\":\"{:?}\",\"scspr_balance\":\"{}\",\"user\":\"{:?}\"}}",
            staking.total_staked(),
            token.total_supply(),
            token.authority(),
            balance,
            query_user
        );
        return;
    }

    output_deploy_json(token_addr, staking_addr);
}

fn print_staking_info(staking: &LiquidStakingHostRef, user: Address, token: &SCSPRTokenHostRef) {
    println!("     total_staked: {} motes", staking.total_staked());
    println!("     sCSPR total supply: {}", token.total_supply());
    println!("     user sCSPR balance: {}", token.balance_of(user));
    println!();
}

fn read_u64_env(name: &str, default_value: u64) -> u64 {
    match std::env::var(name) {
        Ok(raw) => {
            let cleaned = raw.trim().replace('_', "");
            cleaned.parse::<u64>().unwrap_or(default_value)
        }
        Err(_) => default_value,
    }
}

fn output_deploy_json(token_addr: Address, staking_addr: Address) {
    let chain_name =
        std::env::var("ODRA_CASPER_LIVENET_CHAIN_NAME").unwrap_or_else(|_| "casper-test".to_string());
    let node_url = std::env::var("ODRA_CASPER_LIVENET_NODE_ADDRESS")
        .unwrap_or_else(|_| "https://node.testnet.casper.network".to_string());

    let token_hash = format_address_hash(&token_addr);
    let staking_hash = format_address_hash(&staking_addr);

    println!(
        r#"LSTAKE_DEPLOY_JSON={{"chain_name":"{}","node_url":"{}","token_contract_hash":"{}","staking_contract_hash":"{}","deployed_at":"{}"}}"#,
        chain_name,
        node_url,
        token_hash,
        staking_hash,
        chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ")
    );
}

fn format_address_hash(addr: &Address) -> String {
    let debug_str = format!("{:?}", addr);
    if let Some(start) = debug_str.find('[') {
        if let Some(end) = debug_str.rfind(']') {
            let bytes_str = &debug_str[start + 1..end];
            let hex_parts: Vec<&str> = bytes_str.split(", ").collect();
            let mut result = String::new();
            for part in hex_parts {
                if let Some(hex) = part.strip_prefix("0x") {
                    result.push_str(hex);
                } else if let Some(hex) = part.strip_prefix("0X") {
                    result.push_str(hex);
                }
            }
            return result;
        }
    }
    debug_str
}

fn parse_contract_address(raw: &str) -> Address {
    use odra::casper_types::account::AccountHash;
    use odra::casper_types::contracts::ContractPackageHash;

    fn decode_hex_32(s: &str) -> [u8; 32] {
        let mut out = [0u8; 32];
        if s.len() != 64 || !s.chars().all(|c| c.is_ascii_hexdigit()) {
            panic!("Invalid address hash (expected 64 hex): {}", s);
        }
        for i in 0..32 {
            let byte = u8::from_str_radix(&s[i * 2..i * 2 + 2], 16)
                .unwrap_or_else(|_| panic!("Invalid hex in address: {}", s));
            out[i] = byte;
        }
        out
    }

    let trimmed = raw.trim();
    if let Some(hex) = trimmed.strip_prefix("account-hash-") {
        let bytes = decode_hex_32(hex);
        return Address::Account(AccountHash::new(bytes));
    }
    if let Some(hex) = trimmed.strip_prefix("contract-package-") {
        let bytes = decode_hex_32(hex);
        return Address::Contract(ContractPackageHash::new(bytes));
    }
    if let Some(hex) = trimmed.strip_prefix("package-") {
        let bytes = decode_hex_32(hex);
        return Address::Contract(ContractPackageHash::new(bytes));
    }
    if let Some(hex) = trimmed.strip_prefix("hash-") {
        let bytes = decode_hex_32(hex);
        return Address::Contract(ContractPackageHash::new(bytes));
    }

    if trimmed.len() == 64 && trimmed.chars().all(|c| c.is_ascii_hexdigit()) {
        let bytes = decode_hex_32(trimmed);
        return Address::Contract(ContractPackageHash::new(bytes));
    }

    panic!("Invalid address format: {}", trimmed);
}
