// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// CHAINSTATE-NODE
//
// Thin binary wiring: load genesis, open the block log, hand both to
// chainstate_core::State, spawn the Worker, drive a small stdin command
// loop. No gossip/HTTP/wallet layer lives here — those are out-of-scope
// collaborators the Worker talks to through GossipSink.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use chainstate_core::event::default_sink;
use chainstate_core::worker::{NullGossip, Worker};
use chainstate_core::{Genesis, State};
use std::io::BufRead;
use std::sync::Arc;

struct NodeConfig {
    genesis_path: String,
    log_path: String,
    self_host: String,
    beneficiary: String,
}

fn parse_args() -> NodeConfig {
    let args: Vec<String> = std::env::args().collect();

    let mut genesis_path = std::env::var("CHAINSTATE_GENESIS").unwrap_or_else(|_| "genesis.toml".to_string());
    let mut log_path = std::env::var("CHAINSTATE_LOG").unwrap_or_else(|_| "blocks.log".to_string());
    let mut self_host = std::env::var("CHAINSTATE_HOST").unwrap_or_else(|_| "localhost".to_string());
    let mut beneficiary = std::env::var("CHAINSTATE_BENEFICIARY").unwrap_or_else(|_| "node-operator".to_string());

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--genesis" => {
                if let Some(v) = args.get(i + 1) {
                    genesis_path = v.clone();
                    i += 1;
                }
            }
            "--log" => {
                if let Some(v) = args.get(i + 1) {
                    log_path = v.clone();
                    i += 1;
                }
            }
            "--host" => {
                if let Some(v) = args.get(i + 1) {
                    self_host = v.clone();
                    i += 1;
                }
            }
            "--beneficiary" => {
                if let Some(v) = args.get(i + 1) {
                    beneficiary = v.clone();
                    i += 1;
                }
            }
            other => {
                eprintln!("⚠️  unrecognized argument '{other}', ignoring");
            }
        }
        i += 1;
    }

    NodeConfig { genesis_path, log_path, self_host, beneficiary }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("❌ panic in spawned task: {panic_info}");
    }));

    let config = parse_args();
    let sink = default_sink();

    let genesis = Genesis::load(&config.genesis_path)?;
    println!("loaded genesis: {} founders, difficulty {}", genesis.founder_balances.len(), genesis.difficulty);

    let state = Arc::new(State::open(genesis, &config.log_path, config.self_host.clone(), sink.clone())?);
    println!("tip is block {}", state.latest_block().header.number);

    let mut worker = Worker::spawn(Arc::clone(&state), Arc::new(NullGossip), sink.clone());

    println!("chainstate-node ready. commands: send <from> <to> <value> <tip> [share] | mine | cancel | status | quit");
    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        let parts: Vec<&str> = line.trim().split_whitespace().collect();
        match parts.as_slice() {
            ["send", from, to, value, tip, rest @ ..] => {
                let value: u128 = value.parse().unwrap_or(0);
                let tip: u128 = tip.parse().unwrap_or(0);
                let share = rest.first().copied() == Some("share");
                let tx = state.new_tx(*from, *to, value, tip, "");
                let outcome = state.add_transactions(vec![tx], share);
                if let Some(batch) = outcome.share {
                    worker.share_txs(batch);
                }
                if outcome.should_mine {
                    worker.start_mining(config.beneficiary.clone());
                }
            }
            ["mine"] => worker.start_mining(config.beneficiary.clone()),
            ["cancel"] => worker.cancel_mining(),
            ["status"] => {
                let latest = state.latest_block();
                println!(
                    "tip={} mempool={} balance({})={}",
                    latest.header.number,
                    state.mempool_length(),
                    config.beneficiary,
                    state.balance_for(&config.beneficiary)
                );
            }
            ["quit"] | ["exit"] => break,
            [] => {}
            _ => eprintln!("⚠️  unrecognized command: {line}"),
        }
    }

    state.shutdown();
    worker.shutdown().await;
    Ok(())
}
