use clap::{App, Arg, ArgMatches};
use colored::*;
use satlab::clock::{Clock, MonotonicClock, SimulatedClock};
use satlab::display::{self, OutputFormat};
use satlab::indicators::TracingIndicators;
use satlab::mission::{Mission, MissionEvent};
use satlab::{
    ControlFeedback, CsvTelemetryLog, GaussianNoise, SatelliteAgent, SimulationConfig,
};
use std::time::Duration;
use tokio::time;
use tracing::{error, info, Level};

// Interval between "waiting..." lines while deploying
const WAITING_NOTICE_PERIOD: Duration = Duration::from_secs(1);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let matches = build_cli().get_matches();

    let level = match matches.occurrences_of("verbose") {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(&matches)?;
    let format: OutputFormat = matches.value_of("format").unwrap_or("table").parse()?;

    if format == OutputFormat::Table {
        println!("{}", "🛰️  Small Satellite Lab Simulator".bright_blue().bold());
        println!("================================");
    }

    let noise = GaussianNoise::seeded_or_entropy(config.seed);
    if matches.is_present("simulated-time") {
        let agent = SatelliteAgent::with_parts(config, noise, SimulatedClock::new());
        run(build_mission(agent)?, format, false).await
    } else {
        let agent = SatelliteAgent::with_parts(config, noise, MonotonicClock::new());
        run(build_mission(agent)?, format, true).await
    }
}

fn build_cli() -> App<'static, 'static> {
    App::new("satlab-sim")
        .version("0.1.0")
        .author("Space Systems Engineering Team")
        .about("🛰️  Simulates one orbit of a small satellite's power, thermal and attitude subsystems")
        .arg(
            Arg::with_name("config")
                .short("c")
                .long("config")
                .value_name("FILE")
                .help("JSON simulation config")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("seed")
                .short("s")
                .long("seed")
                .value_name("SEED")
                .help("Seed for sensor noise (random when omitted)")
                .takes_value(true)
                .validator(|v| match v.parse::<u64>() {
                    Ok(_) => Ok(()),
                    Err(_) => Err("Seed must be a non-negative integer".into()),
                }),
        )
        .arg(
            Arg::with_name("tick-ms")
                .long("tick-ms")
                .value_name("MS")
                .help("Milliseconds between ticks")
                .takes_value(true)
                .validator(validate_millis),
        )
        .arg(
            Arg::with_name("deploy-ms")
                .long("deploy-ms")
                .value_name("MS")
                .help("Deployment wait before nominal operation")
                .takes_value(true)
                .validator(validate_millis),
        )
        .arg(
            Arg::with_name("log")
                .short("l")
                .long("log")
                .value_name("FILE")
                .help("CSV telemetry log path")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("format")
                .short("f")
                .long("format")
                .value_name("FORMAT")
                .help("Console output format")
                .takes_value(true)
                .possible_values(&["table", "json", "quiet"])
                .default_value("table"),
        )
        .arg(
            Arg::with_name("no-noise")
                .long("no-noise")
                .help("Disable sensor noise"),
        )
        .arg(
            Arg::with_name("measured-feedback")
                .long("measured-feedback")
                .help("Drive despin control from the noisy gyro reading"),
        )
        .arg(
            Arg::with_name("simulated-time")
                .long("simulated-time")
                .help("Run on simulated time without wall-clock pacing"),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .long("verbose")
                .multiple(true)
                .help("Increase log verbosity (-v info, -vv debug)"),
        )
}

fn validate_millis(v: String) -> Result<(), String> {
    match v.parse::<u64>() {
        Ok(_) => Ok(()),
        Err(_) => Err("Value must be a number of milliseconds".into()),
    }
}

fn load_config(matches: &ArgMatches) -> Result<SimulationConfig, Box<dyn std::error::Error>> {
    let mut config = match matches.value_of("config") {
        Some(path) => SimulationConfig::from_json_file(path)?,
        None => SimulationConfig::default(),
    };

    if let Some(seed) = matches.value_of("seed") {
        config.seed = Some(seed.parse()?);
    }
    if let Some(tick_ms) = matches.value_of("tick-ms") {
        config.tick_period_ms = tick_ms.parse()?;
    }
    if let Some(deploy_ms) = matches.value_of("deploy-ms") {
        config.deployment_delay_ms = deploy_ms.parse()?;
    }
    if let Some(log) = matches.value_of("log") {
        config.log_path = log.into();
    }
    if matches.is_present("no-noise") {
        config.noise_enabled = false;
    }
    if matches.is_present("measured-feedback") {
        config.control_feedback = ControlFeedback::Measured;
    }

    config.validate()?;
    Ok(config)
}

fn build_mission<C: Clock>(
    agent: SatelliteAgent<GaussianNoise, C>,
) -> Result<Mission<GaussianNoise, C>, Box<dyn std::error::Error>> {
    let log = CsvTelemetryLog::create(&agent.config().log_path)?;
    info!(path = %agent.config().log_path.display(), "telemetry log opened");

    let mut mission = Mission::new(agent, Box::new(TracingIndicators::new()));
    mission.add_sink(Box::new(log));
    Ok(mission)
}

async fn run<C: Clock>(
    mut mission: Mission<GaussianNoise, C>,
    format: OutputFormat,
    paced: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut interval = time::interval(mission.agent().config().tick_period());
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    announce(format, &"Released!".bright_green().bold());
    mission.release();

    let mut last_notice: Option<Duration> = None;
    loop {
        if paced {
            tokio::select! {
                _ = interval.tick() => {}
                _ = &mut ctrl_c => {
                    announce(format, &"Interrupted".bright_red());
                    mission.stop();
                    break;
                }
            }
        }

        let event = match mission.poll() {
            Ok(event) => event,
            Err(e) => {
                error!("❌ Mission error: {}", e);
                return Err(e.into());
            }
        };

        match event {
            MissionEvent::Waiting { .. } => {
                let elapsed = mission.agent().elapsed();
                let due = last_notice.map_or(true, |t| elapsed >= t + WAITING_NOTICE_PERIOD);
                if due {
                    announce(format, &"waiting...".white());
                    last_notice = Some(elapsed);
                }
            }
            MissionEvent::Started => announce(format, &"Start Operation".bright_green()),
            MissionEvent::Tick(_) => {
                if let Some(line) = display::render(&mission.agent().status(), format) {
                    println!("{}", line);
                }
            }
            MissionEvent::Complete => {
                announce(format, &"End Operation".bright_green().bold());
                break;
            }
        }
    }

    let stats = mission.stats();
    info!(
        ticks = stats.ticks,
        sink_failures = stats.sink_failures,
        indicator_failures = stats.indicator_failures,
        "🛰️  simulation stopped"
    );
    Ok(())
}

fn announce(format: OutputFormat, message: &ColoredString) {
    if format == OutputFormat::Table {
        println!("{}", message);
    }
}
