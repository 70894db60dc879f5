//! DSC Engine CLI
//!
//! Command-line interface for inspecting engine parameters, running price
//! conversions, and simulating a full deposit/mint/crash/liquidation cycle
//! against the in-memory engine.

use std::sync::Arc;

use clap::{Parser, Subcommand};

use dsc_engine::core::valuation::ValuationEngine;
use dsc_engine::prelude::*;
use dsc_engine::utils::constants::{
    ADDITIONAL_FEED_PRECISION, ENGINE_DECIMALS, FEED_PRECISION, LIQUIDATION_BONUS,
    LIQUIDATION_PRECISION, LIQUIDATION_THRESHOLD, MIN_HEALTH_FACTOR, PRECISION,
    PRICE_STALENESS_TIMEOUT_SECS,
};

/// DSC Engine CLI - collateralized debt engine for a USD-pegged token
#[derive(Parser)]
#[command(name = "dsc")]
#[command(author = "DSC Engine Team")]
#[command(version = dsc_engine::VERSION)]
#[command(about = "Command-line interface for the DSC engine", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the engine's fixed parameters
    Constants {
        /// Emit JSON instead of plain text
        #[arg(long)]
        json: bool,
    },

    /// Convert between token amounts and USD value at a given price
    Value {
        /// Price in whole USD per token
        #[arg(long)]
        price_usd: u64,

        /// Native decimals of the token
        #[arg(long, default_value_t = 18)]
        decimals: u8,

        /// Token amount in native units to value in USD
        #[arg(long)]
        amount: Option<u128>,

        /// USD value in whole dollars to convert to token units
        #[arg(long)]
        usd: Option<u128>,
    },

    /// Run a scripted two-account deposit, mint, crash and liquidation
    Simulate {
        /// Collateral price at the start, in whole USD
        #[arg(long, env = "DSC_INITIAL_PRICE", default_value_t = 2000)]
        initial_price: u64,

        /// Collateral price after the crash, in whole USD
        #[arg(long, env = "DSC_CRASH_PRICE", default_value_t = 900)]
        crash_price: u64,

        /// Emit the final state as JSON instead of plain text
        #[arg(long)]
        json: bool,
    },
}

// ═══════════════════════════════════════════════════════════════════════════════
// MAIN
// ═══════════════════════════════════════════════════════════════════════════════

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();

    if let Err(e) = run_command(&cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run_command(cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Constants { json } => cmd_constants(*json),
        Commands::Value { price_usd, decimals, amount, usd } => {
            cmd_value(*price_usd, *decimals, *amount, *usd)
        }
        Commands::Simulate { initial_price, crash_price, json } => {
            cmd_simulate(*initial_price, *crash_price, *json)
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// COMMAND HANDLERS
// ═══════════════════════════════════════════════════════════════════════════════

fn cmd_constants(json: bool) -> anyhow::Result<()> {
    if json {
        let value = serde_json::json!({
            "precision": PRECISION.to_string(),
            "feed_precision": FEED_PRECISION.to_string(),
            "additional_feed_precision": ADDITIONAL_FEED_PRECISION.to_string(),
            "engine_decimals": ENGINE_DECIMALS,
            "liquidation_threshold": LIQUIDATION_THRESHOLD.to_string(),
            "liquidation_precision": LIQUIDATION_PRECISION.to_string(),
            "liquidation_bonus": LIQUIDATION_BONUS.to_string(),
            "min_health_factor": MIN_HEALTH_FACTOR.to_string(),
            "price_staleness_timeout_secs": PRICE_STALENESS_TIMEOUT_SECS,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("{} v{}", dsc_engine::ENGINE_NAME, dsc_engine::VERSION);
    println!("precision:                    {}", PRECISION);
    println!("feed precision:               {}", FEED_PRECISION);
    println!("additional feed precision:    {}", ADDITIONAL_FEED_PRECISION);
    println!("engine decimals:              {}", ENGINE_DECIMALS);
    println!(
        "liquidation threshold:        {}/{} (200% overcollateralization)",
        LIQUIDATION_THRESHOLD, LIQUIDATION_PRECISION
    );
    println!(
        "liquidation bonus:            {}/{}",
        LIQUIDATION_BONUS, LIQUIDATION_PRECISION
    );
    println!("min health factor:            {}", MIN_HEALTH_FACTOR);
    println!("price staleness timeout:      {}s", PRICE_STALENESS_TIMEOUT_SECS);
    Ok(())
}

fn cmd_value(
    price_usd: u64,
    decimals: u8,
    amount: Option<u128>,
    usd: Option<u128>,
) -> anyhow::Result<()> {
    if amount.is_none() && usd.is_none() {
        anyhow::bail!("provide --amount and/or --usd");
    }

    let registry = CollateralRegistry::new(
        vec![CollateralAsset::new("TOKEN", decimals)],
        vec![Arc::new(InMemoryPriceSource::with_usd_price(price_usd, 0))],
    )?;
    let valuation = ValuationEngine::new(&registry);
    let asset = AssetId::from_symbol("TOKEN");

    println!("price: ${}.00 per token, {} decimals", price_usd, decimals);
    if let Some(raw) = amount {
        let value = valuation.usd_value(asset, CollateralAmount::from_raw(raw), 0)?;
        println!("{} native units = {}", raw, value);
    }
    if let Some(dollars) = usd {
        let tokens = valuation.token_amount_for_usd(asset, UsdValue::from_dollars(dollars), 0)?;
        println!("${}.00 = {} native units", dollars, tokens);
    }
    Ok(())
}

fn cmd_simulate(initial_price: u64, crash_price: u64, json: bool) -> anyhow::Result<()> {
    // The crash must leave alice liquidatable and bob healthy, and covering
    // half of alice's debt must still improve her position. Together that
    // bounds the crash between 27.5% and 50% of the initial price.
    if u128::from(crash_price) * 2 >= u128::from(initial_price) {
        anyhow::bail!(
            "crash price {} leaves the target healthy; it must be below half of {}",
            crash_price,
            initial_price
        );
    }
    if u128::from(crash_price) * 40 <= u128::from(initial_price) * 11 {
        anyhow::bail!(
            "crash price {} is too deep for the scripted liquidation to help the target; \
             it must be above 27.5% of {}",
            crash_price,
            initial_price
        );
    }

    let custody = AccountId::from_label("engine-custody");
    let alice = AccountId::from_label("alice");
    let bob = AccountId::from_label("bob");
    let weth = AssetId::from_symbol("WETH");

    let clock = Arc::new(ManualClock::new(0));
    let token = Arc::new(InMemoryCollateralToken::new("WETH", 18, custody));
    let feed = Arc::new(InMemoryPriceSource::with_usd_price(initial_price, 0));
    let dsc = Arc::new(InMemoryDebtToken::new(custody));

    let mut engine = DscEngine::new(
        custody,
        vec![token.clone()],
        vec![feed.clone()],
        dsc.clone(),
        clock.clone(),
    )?;

    println!("=== DSC engine simulation ===");
    println!("time: {}", chrono::Utc::now().to_rfc3339());
    println!();

    // Alice deposits 10 WETH and mints to a 2.0 health factor.
    let deposit = CollateralAmount::from_units(10, 18);
    let mint = DebtAmount::from_whole(initial_price as u128 * 10 / 4);
    token.fund(alice, deposit);
    engine.deposit_collateral_and_mint_dsc(alice, weth, deposit, mint)?;
    println!("1. alice deposits 10 WETH at ${}.00 and mints {} DSC", initial_price, mint);
    print_position(&engine, "alice", alice)?;

    // Bob takes the same debt against twice the collateral.
    let bob_deposit = CollateralAmount::from_units(20, 18);
    token.fund(bob, bob_deposit);
    engine.deposit_collateral_and_mint_dsc(bob, weth, bob_deposit, mint)?;
    println!("2. bob deposits 20 WETH and mints {} DSC", mint);
    print_position(&engine, "bob", bob)?;

    // The price crashes; alice goes underwater, bob stays healthy.
    clock.advance(60);
    feed.set_usd_price(crash_price, clock.now());
    println!("3. price crashes to ${}.00", crash_price);
    print_position(&engine, "alice", alice)?;
    print_position(&engine, "bob", bob)?;

    // Bob covers half of alice's debt and seizes collateral plus bonus.
    let cover = DebtAmount::from_raw(mint.raw() / 2);
    let receipt = engine.liquidate(bob, weth, alice, cover)?;
    println!("4. bob liquidates alice, covering {} DSC", cover);
    println!(
        "   seized {} native units ({} bonus), health {} -> {}",
        receipt.collateral_seized,
        receipt.bonus_paid,
        receipt.starting_health_factor,
        receipt.ending_health_factor
    );
    print_position(&engine, "alice", alice)?;
    print_position(&engine, "bob", bob)?;

    let total_collateral = engine.total_collateral_usd()?;
    let supply = dsc.total_supply();
    println!("5. final: total collateral {}, DSC supply {}", total_collateral, supply);

    if json {
        let value = serde_json::json!({
            "receipt": {
                "debt_covered": receipt.debt_covered.to_string(),
                "collateral_seized": receipt.collateral_seized.to_string(),
                "bonus_paid": receipt.bonus_paid.to_string(),
                "starting_health_factor": receipt.starting_health_factor.to_string(),
                "ending_health_factor": receipt.ending_health_factor.to_string(),
            },
            "alice": position_json(&engine, alice)?,
            "bob": position_json(&engine, bob)?,
            "total_collateral_usd": total_collateral.to_string(),
            "dsc_supply": supply.to_string(),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    }

    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════════════
// OUTPUT HELPERS
// ═══════════════════════════════════════════════════════════════════════════════

fn print_position(engine: &DscEngine, label: &str, account: AccountId) -> anyhow::Result<()> {
    let (debt, collateral_usd) = engine.account_information(account)?;
    let health = engine.health_factor_of(account)?;
    println!(
        "   {}: collateral {}, debt {} DSC, health factor {}",
        label, collateral_usd, debt, health
    );
    Ok(())
}

fn position_json(engine: &DscEngine, account: AccountId) -> anyhow::Result<serde_json::Value> {
    let (debt, collateral_usd) = engine.account_information(account)?;
    let health = engine.health_factor_of(account)?;
    Ok(serde_json::json!({
        "account": account.to_hex(),
        "collateral_usd": collateral_usd.to_string(),
        "debt": debt.to_string(),
        "health_factor": health.to_string(),
    }))
}
