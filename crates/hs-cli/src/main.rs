//! Hold & Win command line
//!
//! Usage:
//!   hs play durov --bet 1 --spins 20       - Play spins against a local ledger
//!   hs play themes/custom.yaml --trace     - Print each round's stage trace
//!   hs simulate flour --rounds 1000000     - Batch RTP simulation
//!   hs theme list                          - Built-in themes
//!   hs theme show coin_up                  - Print a theme as YAML
//!   hs theme validate themes/custom.json   - Load and check a theme file

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use hs_sim::{SimConfig, simulate};
use hs_slot::{
    Account, Currency, InMemoryLedger, Money, Presenter, RandomSource, SlotMachine, ThemeConfig,
    ThemeParser, TimingConfig, builtin_theme, builtin_theme_ids,
};

#[derive(Parser)]
#[command(name = "hs", about = "Hold & Win slot engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play spins against an in-memory ledger
    Play {
        /// Built-in theme id or theme file
        theme: String,
        #[arg(short, long, default_value_t = 1.0)]
        bet: f64,
        #[arg(short, long, default_value_t = 10)]
        spins: u32,
        /// Starting balance
        #[arg(long, default_value_t = 1000.0)]
        balance: f64,
        /// Fixed RNG seed
        #[arg(long)]
        seed: Option<u64>,
        /// Print each round's stage trace as JSON
        #[arg(long)]
        trace: bool,
        #[arg(long, value_enum, default_value_t = Pace::Normal)]
        pace: Pace,
    },
    /// Run a batch simulation
    Simulate {
        /// Built-in theme id or theme file
        theme: String,
        #[arg(short, long, default_value_t = 100_000)]
        rounds: u64,
        #[arg(short, long, default_value_t = 1.0)]
        bet: f64,
        #[arg(long, default_value_t = 0)]
        seed: u64,
        /// Start every round with a bonus buy
        #[arg(long)]
        buy: bool,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Inspect themes
    Theme {
        #[command(subcommand)]
        command: ThemeCommands,
    },
}

#[derive(Subcommand)]
enum ThemeCommands {
    /// List built-in themes
    List,
    /// Print a theme as YAML
    Show { theme: String },
    /// Load a theme file and run every check
    Validate { file: String },
}

/// Presentation pace
#[derive(Clone, Copy, ValueEnum)]
enum Pace {
    Normal,
    Turbo,
    Studio,
}

impl Pace {
    fn timing(self) -> TimingConfig {
        match self {
            Self::Normal => TimingConfig::normal(),
            Self::Turbo => TimingConfig::turbo(),
            Self::Studio => TimingConfig::studio(),
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Play {
            theme,
            bet,
            spins,
            balance,
            seed,
            trace,
            pace,
        } => play(&theme, bet, spins, balance, seed, trace.then(|| Presenter::new(pace.timing()))),
        Commands::Simulate {
            theme,
            rounds,
            bet,
            seed,
            buy,
            json,
        } => {
            let config = SimConfig::default()
                .with_rounds(rounds)
                .with_bet(Money::from_major(bet))
                .with_seed(seed)
                .with_buy_bonus(buy);
            run_simulation(&theme, &config, json)
        }
        Commands::Theme { command } => match command {
            ThemeCommands::List => list_themes(),
            ThemeCommands::Show { theme } => show_theme(&theme),
            ThemeCommands::Validate { file } => validate_theme(&file),
        },
    }
}

/// Built-in id first, then a theme file
fn load_theme(arg: &str) -> Result<ThemeConfig> {
    if builtin_theme_ids().iter().any(|&id| id == arg) {
        return Ok(builtin_theme(arg)?);
    }
    if !Path::new(arg).exists() {
        bail!(
            "'{}' is neither a built-in theme ({}) nor a file",
            arg,
            builtin_theme_ids().join(", ")
        );
    }
    ThemeParser::new()
        .from_file(arg)
        .with_context(|| format!("Failed to load theme {}", arg))
}

fn play(
    theme: &str,
    bet: f64,
    spins: u32,
    balance: f64,
    seed: Option<u64>,
    presenter: Option<Presenter>,
) -> Result<()> {
    let theme = Arc::new(load_theme(theme)?);
    let account = Account::new("cli", Currency::Stars);
    let ledger = Arc::new(InMemoryLedger::with_balance(&account, Money::from_major(balance)));
    let source = match seed {
        Some(seed) => RandomSource::seeded(seed),
        None => RandomSource::from_entropy(),
    };
    let mut machine = SlotMachine::with_source(theme.clone(), ledger, account, source);
    let bet = Money::from_major(bet);

    println!("{}: bet {}, balance {}\n", theme.name, bet, machine.balance()?);
    for n in 1..=spins {
        let outcome = machine
            .spin(bet)
            .with_context(|| format!("Spin {} failed", n))?;
        let bonus = if outcome.triggered {
            Some(machine.run_bonus()?)
        } else {
            None
        };

        let mut line = format!("#{:<4} win {:>10}", n, outcome.evaluation.amount);
        if let Some(summary) = &bonus {
            line.push_str(&format!(
                "  BONUS {} coins -> {} ({:?}, {} turns)",
                summary.start.locked_coins().len(),
                summary.settlement.payout,
                summary.settlement.reason,
                summary.settlement.turns_played
            ));
        }
        println!("{}", line);

        if let Some(presenter) = &presenter {
            let trace = presenter.spin_trace(&theme.id, &outcome, bonus.as_ref());
            println!("{}", serde_json::to_string_pretty(&trace)?);
        }
    }

    let stats = machine.stats();
    println!(
        "\nBalance {}  RTP {:.2}%  hit rate {:.2}%  bonuses {}  max win {}",
        machine.balance()?,
        stats.rtp(),
        stats.hit_rate(),
        stats.bonuses_triggered,
        stats.max_win
    );
    Ok(())
}

fn run_simulation(theme: &str, config: &SimConfig, json: bool) -> Result<()> {
    let theme = Arc::new(load_theme(theme)?);
    let report = simulate(theme, config)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report.summary());
    }
    if !report.is_conserved() {
        bail!("{} conservation violations", report.conservation_violations);
    }
    Ok(())
}

fn list_themes() -> Result<()> {
    for &id in builtin_theme_ids() {
        let theme = builtin_theme(id)?;
        println!(
            "{:<10} {:<10} {}x{} base, {}x{} bonus, buy: {}",
            theme.id,
            theme.name,
            theme.grid.rows,
            theme.grid.cols,
            theme.bonus_grid.rows,
            theme.bonus_grid.cols,
            if theme.buy_bonus.is_some() { "yes" } else { "no" }
        );
    }
    Ok(())
}

fn show_theme(theme: &str) -> Result<()> {
    let theme = load_theme(theme)?;
    print!("{}", serde_yml::to_string(&theme)?);
    Ok(())
}

fn validate_theme(file: &str) -> Result<()> {
    let theme = ThemeParser::new()
        .from_file(file)
        .with_context(|| format!("{} is not a valid theme", file))?;
    println!("{}: theme '{}' OK ({} symbols)", file, theme.id, theme.symbols.len());
    Ok(())
}
