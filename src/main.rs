use std::fs;
use std::path::PathBuf;

use clap::Parser;
use model_rocket_simulation::*;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "model-rocket-sim")]
#[command(about = "Model rocket flight simulator")]
#[command(version)]
struct Args {
    /// Rocket parameters as JSON (defaults to the built-in sport model)
    #[arg(long)]
    params: Option<PathBuf>,

    /// Simulation options as JSON
    #[arg(long)]
    config: Option<PathBuf>,

    /// Motor identifier, e.g. C6-5
    #[arg(short, long)]
    motor: Option<Motor>,

    /// Parachute identifier, e.g. φ300
    #[arg(short, long)]
    parachute: Option<Parachute>,

    /// Launch angle in degrees from vertical
    #[arg(short, long, default_value_t = 0.0, allow_hyphen_values = true)]
    angle: f64,

    /// Base wind speed in m/s, signed
    #[arg(short, long, default_value_t = 0.0, allow_hyphen_values = true)]
    wind: f64,

    /// Wind profile (open_water, open_terrain, rural, suburban, urban, dense_urban)
    #[arg(long, default_value = "open_terrain")]
    profile: WindProfile,

    /// Disable weathercocking toward the velocity vector
    #[arg(long)]
    no_enhanced_attitude: bool,

    /// Keep the attitude within ±90° when drifting upwind
    #[arg(long)]
    wind_angle_limitation: bool,

    /// Run a seeded dispersion sweep with this many flights
    #[arg(long)]
    sweep: Option<usize>,

    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Print the full result as JSON instead of the text report
    #[arg(long)]
    json: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let mut params = match &args.params {
        Some(path) => serde_json::from_str::<RocketParameters>(&fs::read_to_string(path)?)?,
        None => RocketParameters::sport_model(),
    };
    if let Some(motor) = args.motor {
        params.motor = motor;
    }
    if let Some(parachute) = args.parachute {
        params.parachute = parachute;
    }

    let mut config = match &args.config {
        Some(path) => SimulationConfig::from_json(&fs::read_to_string(path)?)?,
        None => SimulationConfig::default(),
    };
    if args.no_enhanced_attitude {
        config.enhanced_attitude_control = false;
    }
    if args.wind_angle_limitation {
        config.wind_angle_limitation = true;
    }

    let conditions = LaunchConditions::new(args.angle, args.wind, args.profile);

    if let Some(runs) = args.sweep {
        let report = DispersionSweep::new(runs, args.seed).run(&params, conditions, config);
        if args.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            println!("Runs: {}", report.runs.len());
            println!("Mean Max Height: {:.2} m", report.mean_max_height);
            println!("Mean Landing X: {:.2} m", report.mean_landing_x);
            println!("Landing Spread: {:.2} m", report.landing_spread);
            println!("Stable Fraction: {:.0}%", report.stable_fraction * 100.0);
        }
        return Ok(());
    }

    let result = simulate(&params, conditions, config);
    info!("recorded {} samples", result.samples.len());

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        if !result.is_profile_valid {
            println!("Warning: rocket parameters are invalid, aerodynamics disabled");
        }
        print!("{}", result.summary.report());
    }

    Ok(())
}
