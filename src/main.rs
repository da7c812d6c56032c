use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info, warn};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::time::Instant;

use crossroad_sim::control::{handle_line, ControlServer};
use crossroad_sim::simulation::{
    signal_heads_for, FixedCadence, IntersectionState, SimConfig, SimWorld,
};

/// Patterns alternated by `--cycle-secs`
const CYCLE_PATTERNS: [&str; 2] = ["north-south", "east-west"];

#[derive(Parser)]
#[command(name = "crossroad_sim")]
#[command(about = "Four-way intersection traffic simulation")]
struct Cli {
    /// Number of simulation ticks to run (0 runs until stopped, needs --serve)
    #[arg(long, default_value = "3600")]
    ticks: u64,

    /// Target ticks per second (0 runs unthrottled)
    #[arg(long)]
    fps: Option<u32>,

    /// Seed for reproducible lane choices
    #[arg(long)]
    seed: Option<u64>,

    /// Cap on live vehicles
    #[arg(long)]
    max_vehicles: Option<usize>,

    /// JSON config file; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Control state file, loaded at start if present and saved on exit
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Traffic pattern to apply before the first tick
    #[arg(long)]
    pattern: Option<String>,

    /// Alternate north-south / east-west every this many simulated seconds
    #[arg(long)]
    cycle_secs: Option<f32>,

    /// Accept JSON-lines control requests on stdin, answer on stdout
    #[arg(long)]
    serve: bool,

    /// Log a one-line summary every simulated second
    #[arg(long)]
    summary: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn build_config(cli: &Cli) -> Result<SimConfig> {
    let mut config = match &cli.config {
        Some(path) => SimConfig::load(path)?,
        None => SimConfig::default(),
    };
    if let Some(fps) = cli.fps {
        config.ticks_per_second = fps;
    }
    if let Some(max) = cli.max_vehicles {
        config.max_vehicles = max;
    }
    config.validate()?;
    Ok(config)
}

fn build_server(cli: &Cli, config: &SimConfig) -> Result<ControlServer> {
    if let Some(path) = cli.snapshot.as_ref().filter(|p| p.exists()) {
        info!("Restoring control state from {}", path.display());
        return ControlServer::load_snapshot(path, config.accident_policy);
    }
    let lights = signal_heads_for(config.viewport_width, config.viewport_height);
    Ok(ControlServer::with_state(
        IntersectionState::with_lights(lights),
        config.accident_policy,
    ))
}

/// Forward stdin lines to the tick loop; the channel closes on EOF
fn spawn_stdin_reader() -> Receiver<String> {
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!("stdin read error: {}", e);
                    break;
                }
            }
        }
    });
    rx
}

/// Answer every pending control request; returns true once the session should stop
fn drain_requests(commands: &Receiver<String>, server: &mut ControlServer) -> bool {
    let stdout = std::io::stdout();
    let mut stdout = stdout.lock();

    loop {
        match commands.try_recv() {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                let (response, shutdown) = handle_line(server, &line);
                match serde_json::to_string(&response) {
                    Ok(json) => {
                        if let Err(e) = writeln!(stdout, "{}", json).and_then(|_| stdout.flush()) {
                            warn!("Failed to write control response: {}", e);
                        }
                    }
                    Err(e) => warn!("Failed to encode control response: {}", e),
                }
                if shutdown {
                    return true;
                }
            }
            Err(TryRecvError::Empty) => return false,
            Err(TryRecvError::Disconnected) => return true,
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = build_config(&cli)?;
    if cli.ticks == 0 && !cli.serve {
        anyhow::bail!("--ticks 0 runs until stopped and needs --serve to receive a shutdown");
    }

    let mut server = build_server(&cli, &config)?;
    if let Some(name) = &cli.pattern {
        server
            .apply_pattern(name)
            .with_context(|| format!("Failed to apply pattern '{}'", name))?;
    }

    let mut world = match cli.seed {
        Some(seed) => SimWorld::new_with_seed(config.clone(), seed),
        None => SimWorld::new(config.clone()),
    };

    // Simulated seconds are measured at the nominal rate even when unthrottled
    let nominal_rate = if config.ticks_per_second > 0 {
        u64::from(config.ticks_per_second)
    } else {
        60
    };
    let cycle_ticks = cli
        .cycle_secs
        .map(|secs| ((secs * nominal_rate as f32).round() as u64).max(1));
    let mut cycle_phase = 0;

    let commands = cli.serve.then(spawn_stdin_reader);
    let cadence = FixedCadence::new(config.ticks_per_second);

    info!(
        "Running intersection simulation: ticks={}, rate={}/s, max_vehicles={}",
        cli.ticks, config.ticks_per_second, config.max_vehicles
    );
    let run_started = Instant::now();

    loop {
        let tick_started = Instant::now();

        if let Some(commands) = &commands {
            if drain_requests(commands, &mut server) {
                info!("Control session closed");
                break;
            }
        }

        if let Some(every) = cycle_ticks {
            if world.tick_count % every == 0 {
                let name = CYCLE_PATTERNS[cycle_phase % CYCLE_PATTERNS.len()];
                if let Err(e) = server.apply_pattern(name) {
                    warn!("Signal cycle could not apply '{}': {}", name, e);
                }
                cycle_phase += 1;
            }
        }

        world.tick(&mut server);

        if cli.summary && world.tick_count % nominal_rate == 0 {
            world.log_summary();
        }

        if cli.ticks > 0 && world.tick_count >= cli.ticks {
            break;
        }

        cadence.pace(tick_started);
    }

    world
        .stats
        .log_summary(world.live_count(), run_started.elapsed().as_secs_f32());

    if let Some(path) = &cli.snapshot {
        server.save_snapshot(path)?;
        info!("Saved control state to {}", path.display());
    }

    Ok(())
}
