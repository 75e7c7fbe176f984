//! Rebound Admin: governance rehearsal CLI for the flow-mirroring relay.
//!
//! Every owner operation runs against a local, in-memory deployment so an
//! operator can rehearse a batch - allow-list updates, emergency sweeps,
//! rarity reconfiguration - and inspect the exact events it would emit before
//! submitting the real transactions.

use clap::{Parser, Subcommand};
use rebound_relay::prelude::*;
use tracing_subscriber::EnvFilter;

/// Local rehearsal deployment addresses.
const HOST: Address = Address::new([0x01; 20]);
const RELAY: Address = Address::new([0x02; 20]);
const OWNER: Address = Address::new([0x0A; 20]);
const DEMO_SENDER: Address = Address::new([0xA1; 20]);
const DEMO_TOKEN: Token = Token::new(Address::new([0xD1; 20]));

/// Rebound Admin: rehearse relay governance against a local deployment
#[derive(Parser, Debug)]
#[command(name = "rebound-admin")]
#[command(about = "Governance rehearsal CLI for the flow-mirroring relay")]
struct Args {
    /// Log filter (tracing env-filter syntax)
    #[arg(long, default_value = "info")]
    log: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Batch allow-list update for one or more token addresses
    Allow {
        /// Token addresses, 0x-prefixed hex
        tokens: Vec<String>,

        /// Disallow the tokens instead of allowing them
        #[arg(long)]
        deny: bool,
    },

    /// Engage the lock (blocks creation of new mirrors)
    Lock,

    /// Release the lock
    Unlock,

    /// Replace the rarity table with six parts-per-thousand weights
    Rarity {
        /// Exactly six weights summing to 1000
        weights: Vec<u16>,
    },

    /// Force-close both flow directions for counterparty:token pairs
    Sweep {
        /// Pairs formatted `<counterparty>:<token>`, 0x-prefixed hex
        pairs: Vec<String>,
    },

    /// Map a seed to its rarity tier on the current table
    Tier {
        /// Seed value
        seed: u64,
    },

    /// Run the scripted create / update / rogue-delete / sweep rehearsal
    Demo,
}

fn parse_address(input: &str) -> Result<Address, String> {
    let stripped = input.strip_prefix("0x").unwrap_or(input);
    let bytes = hex::decode(stripped).map_err(|e| format!("bad hex in {input}: {e}"))?;
    Address::from_slice(&bytes).ok_or_else(|| format!("{input}: addresses are 20 bytes"))
}

fn parse_pair(input: &str) -> Result<(Address, Token), String> {
    let (counterparty, token) = input
        .split_once(':')
        .ok_or_else(|| format!("{input}: expected <counterparty>:<token>"))?;
    Ok((
        parse_address(counterparty)?,
        Token::new(parse_address(token)?),
    ))
}

fn fresh_relay() -> RelayService<InMemoryLedger, InMemoryEventSink> {
    let config = ServiceConfig {
        host: HOST,
        relay: RELAY,
        beneficiary: None,
        owner: OWNER,
    };
    RelayService::new(
        InMemoryLedger::new(RELAY),
        InMemoryEventSink::new(),
        config,
    )
}

fn print_events(relay: &RelayService<InMemoryLedger, InMemoryEventSink>) {
    let events = relay.sink().events();
    match serde_json::to_string_pretty(&events) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("failed to render events: {e}"),
    }
}

async fn run(args: Args) -> Result<(), String> {
    let relay = fresh_relay();

    match args.command {
        Command::Allow { tokens, deny } => {
            let tokens: Vec<Token> = tokens
                .iter()
                .map(|t| parse_address(t).map(Token::new))
                .collect::<Result<_, _>>()?;
            let statuses = vec![!deny; tokens.len()];
            relay
                .set_allow_list_batch(OWNER, tokens, statuses)
                .await
                .map_err(|e| e.to_string())?;
            print_events(&relay);
        }

        Command::Lock => {
            relay.set_lock(OWNER, true).await.map_err(|e| e.to_string())?;
            print_events(&relay);
        }

        Command::Unlock => {
            relay
                .set_lock(OWNER, false)
                .await
                .map_err(|e| e.to_string())?;
            print_events(&relay);
        }

        Command::Rarity { weights } => {
            let weights: [u16; 6] = weights
                .try_into()
                .map_err(|w: Vec<u16>| format!("expected 6 weights, got {}", w.len()))?;
            relay
                .set_rarity(OWNER, weights)
                .await
                .map_err(|e| e.to_string())?;
            print_events(&relay);
        }

        Command::Sweep { pairs } => {
            let parsed: Vec<(Address, Token)> = pairs
                .iter()
                .map(|p| parse_pair(p))
                .collect::<Result<_, _>>()?;
            let (counterparties, tokens): (Vec<_>, Vec<_>) = parsed.into_iter().unzip();
            relay
                .emergency_close_stream(OWNER, counterparties, tokens)
                .await
                .map_err(|e| e.to_string())?;
            print_events(&relay);
        }

        Command::Tier { seed } => {
            let tier = relay.get_rarity_tier(U256::from(seed)).await;
            println!("seed {seed} -> tier {} ({tier})", tier.index());
        }

        Command::Demo => run_demo(&relay).await?,
    }

    Ok(())
}

/// Scripted rehearsal: open, raise, rogue-close, and sweep one flow pair,
/// printing the mirror state after each step.
async fn run_demo(relay: &RelayService<InMemoryLedger, InMemoryEventSink>) -> Result<(), String> {
    let ledger = relay.ledger();
    let report = |step: &str| {
        println!(
            "{step}: inbound {} / outbound {}",
            ledger.rate_between(DEMO_TOKEN, DEMO_SENDER, RELAY),
            ledger.rate_between(DEMO_TOKEN, RELAY, DEMO_SENDER),
        );
    };

    relay
        .set_allow_list_batch(OWNER, vec![DEMO_TOKEN], vec![true])
        .await
        .map_err(|e| e.to_string())?;

    // Sender opens a flow; the host would fire both phases around its write
    let ctx = relay
        .before_flow_created(HOST, DEMO_TOKEN, DEMO_SENDER, CallbackContext::empty())
        .await
        .map_err(|e| e.to_string())?;
    ledger.insert_flow(DEMO_TOKEN, DEMO_SENDER, RELAY, FlowRate::new(100_000));
    relay
        .after_flow_created(HOST, DEMO_TOKEN, DEMO_SENDER, FlowRate::new(100_000), ctx)
        .await
        .map_err(|e| e.to_string())?;
    report("create @100000");

    // Sender doubles the rate
    let ctx = relay
        .before_flow_updated(HOST, DEMO_TOKEN, DEMO_SENDER, CallbackContext::empty())
        .await
        .map_err(|e| e.to_string())?;
    ledger.insert_flow(DEMO_TOKEN, DEMO_SENDER, RELAY, FlowRate::new(200_000));
    relay
        .after_flow_updated(
            HOST,
            DEMO_TOKEN,
            DEMO_SENDER,
            FlowRate::new(100_000),
            FlowRate::new(200_000),
            ctx,
        )
        .await
        .map_err(|e| e.to_string())?;
    report("update @200000");

    // Rogue move: the sender deletes the outbound mirror and keeps streaming
    let termination = FlowTermination {
        token: DEMO_TOKEN,
        sender: RELAY,
        receiver: DEMO_SENDER,
    };
    let ctx = relay
        .before_flow_terminated(HOST, termination, CallbackContext::empty())
        .await
        .map_err(|e| e.to_string())?;
    ledger.remove_flow(DEMO_TOKEN, RELAY, DEMO_SENDER);
    relay
        .after_flow_terminated(HOST, termination, ctx)
        .await
        .map_err(|e| e.to_string())?;
    report("rogue delete");

    // Sweeping the already-closed pair is a no-op
    relay
        .emergency_close_stream(OWNER, vec![DEMO_SENDER], vec![DEMO_TOKEN])
        .await
        .map_err(|e| e.to_string())?;
    report("sweep");

    let stats = relay.stats().await;
    println!(
        "stats: mirrored={} unmirrored={} contained={} sweeps={}",
        stats.flows_mirrored,
        stats.flows_unmirrored,
        stats.contained_failures,
        stats.emergency_sweeps
    );
    print_events(relay);
    Ok(())
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&args.log).unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    tracing::debug!(command = ?args.command, "rehearsing against local deployment");

    if let Err(e) = run(args).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
