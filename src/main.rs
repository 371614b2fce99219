use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use ev_trip_sim::simulation::{
    self, find_route, leaderboard, GameState, SimState, SimulationSettings, Simulation, Terrain,
    Traffic, VehicleType, Weather,
};

#[derive(Parser)]
#[command(name = "ev_trip_sim")]
#[command(about = "Headless electric vehicle trip simulation")]
struct Cli {
    /// Preset route to drive
    #[arg(long, default_value = "Central Park to Union Square")]
    route: String,

    #[arg(long, value_enum, default_value_t = VehicleType::Scooter)]
    vehicle: VehicleType,

    #[arg(long, value_enum, default_value_t = Terrain::Flat)]
    terrain: Terrain,

    #[arg(long, value_enum, default_value_t = Weather::Sunny)]
    weather: Weather,

    #[arg(long, value_enum, default_value_t = Traffic::Low)]
    traffic: Traffic,

    /// Name shown on the summary
    #[arg(long, default_value = "User")]
    driver: String,

    /// Target speed for manual control in km/h
    #[arg(long, default_value = "25")]
    target_speed: f64,

    /// Let the auto-pilot choose the speed
    #[arg(long)]
    autopilot: bool,

    /// Seed for reproducible obstacles
    #[arg(long)]
    seed: Option<u64>,

    /// Simulated minutes after which the run is stopped
    #[arg(long, default_value = "120")]
    max_minutes: u64,

    /// Simulated seconds between readouts
    #[arg(long, default_value = "60")]
    report_every: u64,

    /// Print the trip summary as JSON
    #[arg(long)]
    json: bool,

    /// List the preset routes and exit
    #[arg(long)]
    list_routes: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("warn,ev_trip_sim=info"),
    )
    .init();

    let cli = Cli::parse();

    if cli.list_routes {
        for route in simulation::preset_routes() {
            println!(
                "{} ({:.1} km, ~{:.0} min, {} checkpoints)",
                simulation::route_name(&route),
                route.distance_km,
                route.estimated_minutes,
                route.checkpoints.len()
            );
        }
        return Ok(());
    }

    run_headless(&cli)
}

/// Drive one trip to completion in headless mode (no graphics)
fn run_headless(cli: &Cli) -> Result<()> {
    let route = find_route(&cli.route).context("Could not select route")?;

    let mut sim = match cli.seed {
        Some(seed) => Simulation::with_seed(seed),
        None => Simulation::new(),
    };

    sim.configure(SimulationSettings {
        vehicle_type: cli.vehicle,
        terrain: cli.terrain,
        weather: cli.weather,
        traffic: cli.traffic,
        driver_name: cli.driver.clone(),
        route: Some(route),
    })
    .context("Simulation setup failed")?;

    if cli.autopilot {
        sim.toggle_auto_pilot();
    }
    sim.set_target_speed(cli.target_speed);
    sim.start().context("Simulation failed to start")?;

    let limit_ms = cli.max_minutes * 60_000;
    let report_ms = cli.report_every.max(1) * 1_000;
    let mut next_report = report_ms;

    println!("Running trip simulation in headless mode...");
    while !sim.state().is_terminal() && sim.elapsed_ms() < limit_ms {
        sim.advance(simulation::TICK_INTERVAL_MS);
        sim.take_telemetry();

        for event in sim.take_events() {
            let (title, body) = event.message();
            println!("[{}] {}", title, body);
        }

        if sim.elapsed_ms() >= next_report {
            println!(
                "--- {:.1} min --- {}",
                sim.elapsed_ms() as f64 / 60_000.0,
                sim.metrics().summary()
            );
            next_report += report_ms;
        }
    }

    if sim.state() == SimState::Running || sim.state() == SimState::Paused {
        info!("Time limit of {} minutes reached", cli.max_minutes);
        sim.stop().context("Could not stop simulation")?;
        for event in sim.take_events() {
            let (title, body) = event.message();
            println!("[{}] {}", title, body);
        }
    }

    println!();
    println!("=== Final State ===");
    println!("{}", sim.metrics().summary());

    let trip = match sim.outcome() {
        Some(Ok(trip)) => trip.clone(),
        Some(Err(reason)) => {
            println!("Trip ended without a summary: {}", reason);
            return Ok(());
        }
        None => return Ok(()),
    };

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&trip).context("Could not serialize trip summary")?
        );
    } else {
        println!("=== Trip Summary ===");
        println!("Driver: {} ({:?})", trip.driver_name, trip.vehicle_type);
        println!("Route: {}", simulation::route_name(&trip.route));
        println!("Distance: {:.2} km", trip.distance());
        println!("Total time: {:.1} min", trip.total_minutes);
        println!("Average speed: {:.1} km/h", trip.average_speed);
        println!("Eco score: {}", trip.eco_score());
        println!("Carbon saved: {:.2} kg", trip.metrics.carbon_saved);
        println!("Badges: {:?}", trip.badges);
        println!("Points earned: {}", trip.points_earned);
    }

    let mut roster = simulation::demo_roster();
    let mut game = GameState::new(roster.remove(0));
    for award in game.apply_trip(&trip) {
        info!("Awarded {:?}", award);
    }
    println!("{}", game.summary());
    roster.push(game.user.clone());

    println!("=== Leaderboard ===");
    for entry in leaderboard(&roster) {
        println!(
            "  #{} {} - {} points, {} badges",
            entry.rank, entry.name, entry.points, entry.badges
        );
    }

    Ok(())
}
