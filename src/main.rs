use std::fs;
use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use postflop_advisor::advisor::{HandSetup, advise_streets};
use postflop_advisor::cards::parse_cards;
use postflop_advisor::config::AdvisorConfig;
use postflop_advisor::console::Console;
use postflop_advisor::fuzz::{self, FuzzConfig};
use postflop_advisor::game::{Position, VillainProfile};
use postflop_advisor::preflop::{Scenario, Seat, postflop_position, starting_hand};
use postflop_advisor::web;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "postflop-advisor",
    version,
    about = "Rule-driven postflop advice for single-raised NLHE pots",
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Hero hole cards, e.g. AhKh
    #[arg(long)]
    hero: Option<String>,

    /// Board cards (3 to 5), e.g. Qh7c2d9s
    #[arg(long)]
    board: Option<String>,

    /// Hero seat; enables preflop advice and derives the postflop position
    #[arg(long = "hero-seat")]
    hero_seat: Option<Seat>,

    /// Villain seat
    #[arg(long = "villain-seat")]
    villain_seat: Option<Seat>,

    /// Preflop scenario
    #[arg(long, default_value = "first-in")]
    scenario: ScenarioArg,

    /// Override the postflop position
    #[arg(long)]
    position: Option<PositionArg>,

    /// JSON config file; flags given on the command line win
    #[arg(long)]
    config: Option<PathBuf>,

    /// Rules document (embedded table if omitted)
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Preflop range chart (embedded chart if omitted)
    #[arg(long)]
    ranges: Option<PathBuf>,

    /// Refuse rules with malformed conditions
    #[arg(long = "strict-rules", default_value_t = false)]
    strict_rules: bool,

    /// Villain profile preset
    #[arg(long = "villain-profile")]
    villain_profile: Option<ProfileArg>,

    /// Disable ANSI colors in CLI output
    #[arg(long = "no-color", default_value_t = false)]
    no_color: bool,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the web server
    Serve {
        /// Address to bind (HOST:PORT)
        #[arg(long, default_value = "0.0.0.0:8080")]
        addr: String,
    },
    /// Run random spots through the rules and report invariant violations
    Fuzz {
        #[arg(long, default_value_t = 1000)]
        hands: u32,

        /// RNG seed (random if omitted)
        #[arg(long)]
        seed: Option<u64>,

        /// Print the full report as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

#[derive(Debug, Clone, ValueEnum)]
enum ProfileArg {
    Default,
    Bad,
    Good,
}

impl From<ProfileArg> for VillainProfile {
    fn from(arg: ProfileArg) -> Self {
        match arg {
            ProfileArg::Default => VillainProfile::Default,
            ProfileArg::Bad => VillainProfile::Bad,
            ProfileArg::Good => VillainProfile::Good,
        }
    }
}

#[derive(Debug, Clone, ValueEnum)]
enum PositionArg {
    Ip,
    Oop,
}

impl From<PositionArg> for Position {
    fn from(arg: PositionArg) -> Self {
        match arg {
            PositionArg::Ip => Position::InPosition,
            PositionArg::Oop => Position::OutOfPosition,
        }
    }
}

#[derive(Debug, Clone, ValueEnum)]
enum ScenarioArg {
    FirstIn,
    OverLimp,
    VsOpen,
    Vs3bet,
}

impl From<ScenarioArg> for Scenario {
    fn from(arg: ScenarioArg) -> Self {
        match arg {
            ScenarioArg::FirstIn => Scenario::FirstIn,
            ScenarioArg::OverLimp => Scenario::OverLimp,
            ScenarioArg::VsOpen => Scenario::VsOpen,
            ScenarioArg::Vs3bet => Scenario::Vs3Bet,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = color_eyre::install();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = build_config(&cli)?;

    match cli.command {
        Some(Commands::Serve { ref addr }) => run_server(addr, &config).await?,
        Some(Commands::Fuzz { hands, seed, json }) => run_fuzz(&config, hands, seed, json)?,
        None => run_advice(&cli, &config)?,
    }

    Ok(())
}

fn build_config(cli: &Cli) -> Result<AdvisorConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => AdvisorConfig::default(),
    };
    if cli.rules.is_some() {
        config.rules_path = cli.rules.clone();
    }
    if cli.ranges.is_some() {
        config.ranges_path = cli.ranges.clone();
    }
    if let Some(profile) = cli.villain_profile.clone() {
        config.villain_profile = profile.into();
    }
    config.strict_rules |= cli.strict_rules;
    config.no_color |= cli.no_color;
    Ok(config)
}

fn run_advice(cli: &Cli, config: &AdvisorConfig) -> Result<()> {
    let (Some(hero), Some(board)) = (&cli.hero, &cli.board) else {
        bail!("--hero and --board are required (or use the serve / fuzz subcommands)");
    };
    let hero = parse_cards(hero)?;
    let board = parse_cards(board)?;
    let &[a, b] = hero.as_slice() else {
        bail!("--hero needs exactly 2 cards, got {}", hero.len());
    };

    let console = Console::new(config.no_color);
    let mut position = Position::InPosition;
    if let Some(seat) = cli.hero_seat {
        let chart = config.load_ranges()?;
        let hand = starting_hand(a, b);
        let advice = chart.advise(seat, cli.scenario.clone().into(), cli.villain_seat, &hand);
        console.print_preflop(&hand, &advice);
        if !advice.continues() {
            return Ok(());
        }
        position = postflop_position(seat, cli.villain_seat);
    }
    if let Some(arg) = cli.position.clone() {
        position = arg.into();
    }

    let rules = config.load_rules()?;
    let setup = HandSetup {
        hero: [a, b],
        position,
        villain_profile: config.villain_profile,
    };
    for street in advise_streets(&rules, &setup, &board)? {
        console.print_street(&street);
    }
    Ok(())
}

fn run_fuzz(config: &AdvisorConfig, hands: u32, seed: Option<u64>, json: bool) -> Result<()> {
    let rules = config.load_rules()?;
    let report = fuzz::run(&rules, &FuzzConfig { hands, seed });

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Fuzzed {} hands", report.hands);
        for (board_type, count) in &report.board_types {
            println!("  {board_type}: {count}");
        }
        for (street, fallbacks) in &report.fallbacks {
            println!("  {street} fallbacks: {fallbacks}");
        }
        println!("Violations: {}", report.violations.len());
    }

    if !report.is_clean() {
        bail!("{} invariant violation(s)", report.violations.len());
    }
    Ok(())
}

async fn run_server(addr: &str, config: &AdvisorConfig) -> Result<()> {
    let addr: SocketAddr = addr.parse()?;
    web::serve(addr, config).await
}
