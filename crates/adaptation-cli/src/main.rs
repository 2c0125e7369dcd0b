use adaptation_core::environment::{find_environment_preset, ENVIRONMENT_PRESETS};
use adaptation_core::organism::{find_organism_preset, organism_presets};
use adaptation_core::{
    AdaptationModel, AdaptationResult, Biome, Environment, Era, ModelConfig, Organism, Terrain,
    Timeline,
};
use anyhow::{bail, Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use serde_json::json;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::Level;

const DEFAULT_ENVIRONMENT: &str = "Flat (standard)";
const DEFAULT_MANUAL_NAME: &str = "Custom organism";

#[derive(Parser)]
#[command(name = "biomech-sim")]
#[command(about = "Biomechanical adaptation of animals to simulated environments")]
struct Cli {
    /// Model configuration file (JSON). Missing fields take defaults.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate one organism in one environment
    Evaluate {
        #[command(flatten)]
        organism: OrganismArgs,
        #[command(flatten)]
        environment: EnvironmentArgs,
    },
    /// Evaluate several preset organisms side by side
    Compare {
        /// Organism preset name (repeatable)
        #[arg(long = "organism", required = true)]
        organisms: Vec<String>,
        #[command(flatten)]
        environment: EnvironmentArgs,
    },
    /// Evaluate an organism over a drifting environment
    Timeline {
        #[command(flatten)]
        organism: OrganismArgs,
        #[command(flatten)]
        environment: EnvironmentArgs,
        /// Number of steps, including the initial one
        #[arg(long, default_value_t = 100)]
        steps: usize,
        /// Seed for the environment random walk
        #[arg(long, default_value_t = 42)]
        seed: u64,
        /// Output directory for timeline.json and summary.json (optional)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// List built-in organism and environment presets
    ListPresets,
    /// Dump the default model configuration to stdout
    DumpDefaultConfig,
}

#[derive(Args, Debug, Default)]
struct OrganismArgs {
    /// Organism preset name, e.g. "Velociraptor"
    #[arg(long, conflicts_with_all = ["name", "mass", "leg_length"])]
    organism: Option<String>,
    /// Display name for a manually specified organism
    #[arg(long)]
    name: Option<String>,
    /// Body mass in kg (manual organism)
    #[arg(long)]
    mass: Option<f64>,
    /// Leg length in m (manual organism)
    #[arg(long)]
    leg_length: Option<f64>,
    /// Base speed in m/s (manual organism, 0 = derive from mass and leg length)
    #[arg(long, default_value_t = 0.0)]
    speed: f64,
}

#[derive(Args, Debug, Default)]
struct EnvironmentArgs {
    /// Environment preset the overrides below apply to
    #[arg(long, default_value = DEFAULT_ENVIRONMENT)]
    environment: String,
    /// Ambient pressure (kPa)
    #[arg(long)]
    pressure: Option<f64>,
    /// Temperature (°C)
    #[arg(long, allow_negative_numbers = true)]
    temperature: Option<f64>,
    /// Altitude (m)
    #[arg(long)]
    altitude: Option<f64>,
    /// Local gravity (m/s²)
    #[arg(long)]
    gravity: Option<f64>,
    /// Relative humidity (%)
    #[arg(long)]
    humidity: Option<f64>,
    /// Terrain: flat, rocky, soft, loose, aquatic (unknown names act as flat)
    #[arg(long)]
    terrain: Option<String>,
    /// Biome used for habitat mismatch checks
    #[arg(long)]
    biome: Option<String>,
}

fn resolve_organism(args: &OrganismArgs) -> Result<Organism> {
    if let Some(preset) = &args.organism {
        return Ok(find_organism_preset(preset)?);
    }
    match (args.mass, args.leg_length) {
        (Some(mass), Some(leg_length)) => {
            let name = args.name.as_deref().unwrap_or(DEFAULT_MANUAL_NAME);
            Organism::manual(name, mass, leg_length, args.speed)
                .context("invalid manual organism")
        }
        _ => bail!("specify --organism <preset> or both --mass and --leg-length"),
    }
}

fn resolve_environment(args: &EnvironmentArgs) -> Result<Environment> {
    let mut env = find_environment_preset(&args.environment)?;
    if let Some(v) = args.pressure {
        env.pressure_kpa = v;
    }
    if let Some(v) = args.temperature {
        env.temperature_c = v;
    }
    if let Some(v) = args.altitude {
        env.altitude_m = v;
    }
    if let Some(v) = args.gravity {
        env.gravity_m_s2 = v;
    }
    if let Some(v) = args.humidity {
        env.humidity_pct = v;
    }
    if let Some(name) = &args.terrain {
        env.terrain = Terrain::from_name_or_flat(name);
    }
    if let Some(name) = &args.biome {
        env.biome =
            Some(Biome::from_name(name).with_context(|| format!("unknown biome: {name}"))?);
    }
    env.validate().context("invalid environment")?;
    Ok(env)
}

fn load_model(path: Option<&Path>) -> Result<AdaptationModel> {
    let config = match path {
        Some(path) => {
            let file = File::open(path).context("failed to open config file")?;
            let config: ModelConfig = serde_json::from_reader(BufReader::new(file))
                .context("failed to parse config")?;
            tracing::info!(path = %path.display(), "loaded model config");
            config
        }
        None => ModelConfig::default(),
    };
    AdaptationModel::new(config).context("config validation error")
}

fn report(result: &AdaptationResult) -> serde_json::Value {
    let messages: Vec<&str> = result.recommendations.iter().map(|r| r.message()).collect();
    json!({
        "result": result,
        "recommendation_messages": messages,
    })
}

/// Write `timeline.json` and `summary.json` into `out_dir`, creating it.
fn write_timeline(out_dir: &Path, timeline: &Timeline) -> Result<()> {
    std::fs::create_dir_all(out_dir).context("failed to create output directory")?;
    let file = File::create(out_dir.join("timeline.json"))
        .context("failed to create timeline file")?;
    serde_json::to_writer_pretty(file, timeline).context("failed to write timeline")?;
    let file =
        File::create(out_dir.join("summary.json")).context("failed to create summary file")?;
    serde_json::to_writer_pretty(file, &timeline.summary()).context("failed to write summary")?;
    tracing::info!(dir = %out_dir.display(), "timeline written");
    Ok(())
}

fn list_presets() -> serde_json::Value {
    let names = |era: Era| organism_presets(era).map(|p| p.name).collect::<Vec<_>>();
    json!({
        "organisms": {
            "extinct": names(Era::Extinct),
            "living": names(Era::Living),
        },
        "environments": ENVIRONMENT_PRESETS.iter().map(|p| p.name).collect::<Vec<_>>(),
    })
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::DumpDefaultConfig => {
            println!("{}", serde_json::to_string_pretty(&ModelConfig::default())?);
        }
        Commands::ListPresets => {
            println!("{}", serde_json::to_string_pretty(&list_presets())?);
        }
        Commands::Evaluate {
            organism,
            environment,
        } => {
            let model = load_model(cli.config.as_deref())?;
            let organism = resolve_organism(&organism)?;
            let env = resolve_environment(&environment)?;
            let result = model.evaluate(&organism, &env);
            println!("{}", serde_json::to_string_pretty(&report(&result))?);
        }
        Commands::Compare {
            organisms,
            environment,
        } => {
            let model = load_model(cli.config.as_deref())?;
            let organisms = organisms
                .iter()
                .map(|name| find_organism_preset(name))
                .collect::<Result<Vec<_>, _>>()?;
            let env = resolve_environment(&environment)?;
            let reports: Vec<_> = model
                .evaluate_all(&organisms, &env)
                .iter()
                .map(report)
                .collect();
            println!("{}", serde_json::to_string_pretty(&reports)?);
        }
        Commands::Timeline {
            organism,
            environment,
            steps,
            seed,
            out,
        } => {
            let model = load_model(cli.config.as_deref())?;
            let organism = resolve_organism(&organism)?;
            let env = resolve_environment(&environment)?;
            tracing::info!(organism = organism.name(), steps, seed, "simulating timeline");
            let timeline = model.simulate_timeline(&organism, &env, steps, seed);
            if let Some(out_dir) = out {
                write_timeline(&out_dir, &timeline)?;
            }
            println!("{}", serde_json::to_string_pretty(&timeline.summary())?);
        }
    }
    Ok(())
}
