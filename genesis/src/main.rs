// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// GENESIS-GEN
//
// A small offline tool that produces a genesis.toml with founder balances
// and bootstrap parameters. No key derivation, no BIP39/Dilithium seed
// phrases — this spec has no wallet or signature layer, so the generator
// only needs addresses as plain strings supplied on the command line.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use chainstate_core::Genesis;
use std::collections::BTreeMap;

struct GenArgs {
    out_path: String,
    founders: Vec<(String, u128)>,
    mining_reward: u128,
    gas_price: u128,
    difficulty: u32,
    trans_per_block: u32,
}

fn parse_args() -> GenArgs {
    let args: Vec<String> = std::env::args().collect();

    let mut out_path = "genesis.toml".to_string();
    let mut founders: Vec<(String, u128)> = Vec::new();
    let mut mining_reward: u128 = 100;
    let mut gas_price: u128 = 1;
    let mut difficulty: u32 = 2;
    let mut trans_per_block: u32 = 2;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--out" => {
                if let Some(v) = args.get(i + 1) {
                    out_path = v.clone();
                    i += 1;
                }
            }
            "--founder" => {
                if let Some(v) = args.get(i + 1) {
                    if let Some((addr, amount)) = v.split_once(':') {
                        match amount.parse::<u128>() {
                            Ok(amount) => founders.push((addr.to_string(), amount)),
                            Err(_) => eprintln!("⚠️  invalid founder amount in '{v}', skipping"),
                        }
                    } else {
                        eprintln!("⚠️  expected ADDRESS:AMOUNT for --founder, got '{v}'");
                    }
                    i += 1;
                }
            }
            "--mining-reward" => {
                if let Some(v) = args.get(i + 1) {
                    mining_reward = v.parse().unwrap_or(mining_reward);
                    i += 1;
                }
            }
            "--gas-price" => {
                if let Some(v) = args.get(i + 1) {
                    gas_price = v.parse().unwrap_or(gas_price);
                    i += 1;
                }
            }
            "--difficulty" => {
                if let Some(v) = args.get(i + 1) {
                    difficulty = v.parse().unwrap_or(difficulty);
                    i += 1;
                }
            }
            "--trans-per-block" => {
                if let Some(v) = args.get(i + 1) {
                    trans_per_block = v.parse().unwrap_or(trans_per_block);
                    i += 1;
                }
            }
            other => eprintln!("⚠️  unrecognized argument '{other}', ignoring"),
        }
        i += 1;
    }

    GenArgs { out_path, founders, mining_reward, gas_price, difficulty, trans_per_block }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = parse_args();
    if args.founders.is_empty() {
        eprintln!("no --founder ADDRESS:AMOUNT given, defaulting to a single founder 'genesis-founder':1000000");
        args.founders.push(("genesis-founder".to_string(), 1_000_000));
    }

    let founder_balances: BTreeMap<String, u128> = args.founders.into_iter().collect();

    let genesis = Genesis {
        founder_balances,
        mining_reward: args.mining_reward,
        gas_price: args.gas_price,
        difficulty: args.difficulty,
        trans_per_block: args.trans_per_block,
    };

    let toml_str = genesis.to_toml_string()?;
    std::fs::write(&args.out_path, toml_str)?;
    println!("wrote {}", args.out_path);
    Ok(())
}
