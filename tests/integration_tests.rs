use satlab::clock::SimulatedClock;
use satlab::environment::OrbitalEnvironment;
use satlab::subsystems::{compute_despin_control, AttitudeSystem, PowerSystem, Subsystem, ThermalSystem};
use satlab::*;

fn quiet_config() -> SimulationConfig {
    SimulationConfig {
        noise_enabled: false,
        ..SimulationConfig::default()
    }
}

fn deterministic_agent() -> SatelliteAgent<ZeroNoise, SimulatedClock> {
    SatelliteAgent::with_parts(quiet_config(), ZeroNoise, SimulatedClock::new())
}

fn seeded_agent(seed: u64) -> SatelliteAgent<GaussianNoise, SimulatedClock> {
    SatelliteAgent::with_parts(
        SimulationConfig::default(),
        GaussianNoise::with_seed(seed),
        SimulatedClock::new(),
    )
}

#[test]
fn test_environment_full_orbit() {
    let mut env = OrbitalEnvironment::new();
    let mut visible_runs: Vec<(u32, u32)> = Vec::new();
    let mut current_run: Option<(u32, u32)> = None;

    for tick in 1..=360u32 {
        assert!(!env.is_orbit_complete());
        env.advance();

        if env.is_visible() {
            current_run = Some(match current_run {
                Some((start, len)) => (start, len + 1),
                None => (tick, 1),
            });
        } else if let Some(run) = current_run.take() {
            visible_runs.push(run);
        }
    }
    if let Some(run) = current_run.take() {
        visible_runs.push(run);
    }

    assert_eq!(env.angle_deg(), 360.0);
    assert!(env.is_orbit_complete());
    assert_eq!(visible_runs, vec![(70, 41), (250, 41)]);
}

#[test]
fn test_agent_initialization() {
    let agent = deterministic_agent();
    let status = agent.status();

    assert_eq!(agent.tick_count(), 0);
    assert_eq!(status.angle_deg, 0.0);
    assert!(!status.is_connected);
    assert!(!status.is_sunlit);
    assert!(!status.is_power_saving_mode);
    assert!(status.record.is_none());
    assert_eq!(status.power.battery_voltage, 4.2);
    assert_eq!(status.thermal.outer_temp_c, 30.0);
    assert_eq!(status.attitude.angular_velocity, 3.0);
}

#[test]
fn test_first_tick_scenario() {
    let mut agent = deterministic_agent();
    let record = agent.step().unwrap();

    assert_eq!(agent.environment().angle_deg(), 1.0);
    assert!((record.battery_voltage - 4.195).abs() < 1e-5);
    assert!((record.temperature - 29.64).abs() < 1e-5);
    assert!((record.angular_velocity - 3.008).abs() < 1e-5);
    assert!((record.control_torque - -0.3008).abs() < 1e-5);
    assert!((record.time_s - 0.1).abs() < 1e-5);

    let power = agent.power().get_state();
    assert_eq!(power.charging_current, 0.0);
    assert_eq!(power.discharge_current, 0.005);

    // Torque computed on tick 1 is applied on tick 2
    let record = agent.step().unwrap();
    assert!((agent.attitude().applied_control_torque() - -0.3008).abs() < 1e-5);
    assert!((record.angular_velocity - (3.008 + 0.008 - 0.3008)).abs() < 1e-5);
}

#[test]
fn test_full_orbit_without_noise() {
    let mut agent = deterministic_agent();
    let mut min_voltage = f32::MAX;
    let mut min_temperature = f32::MAX;

    while !agent.is_orbit_complete() {
        let record = agent.step().unwrap();
        assert!(record.battery_voltage <= 4.2);
        min_voltage = min_voltage.min(record.battery_voltage);
        min_temperature = min_temperature.min(record.temperature);

        match agent.tick_count() {
            139 => assert!(!agent.is_power_saving_mode()),
            142 | 180 | 250 => assert!(agent.is_power_saving_mode()),
            300 | 360 => assert!(!agent.is_power_saving_mode()),
            _ => {}
        }
    }

    let state = agent.get_state();
    assert_eq!(state.tick_count, 360);
    assert_eq!(state.contact_passes, 2);
    assert_eq!(state.power_mode_changes, 2);

    // Eclipse drains to about 3.42 V, sunlight then refills to the ceiling
    assert!((min_voltage - 3.417).abs() < 0.01);
    assert_eq!(agent.power().battery_voltage(), 4.2);

    assert!((min_temperature - -34.8).abs() < 0.01);
    assert!((agent.thermal().outer_temp_c() - 30.0).abs() < 0.01);

    assert!((agent.attitude().angular_velocity() - 0.08).abs() < 1e-3);
}

#[test]
fn test_step_after_orbit_completes_fails_fast() {
    let mut agent = deterministic_agent();
    for _ in 0..360 {
        agent.step().unwrap();
    }
    let before = agent.status();

    let result = agent.step();
    assert_eq!(result, Err(AgentError::OrbitComplete { angle_deg: 360.0 }));
    assert_eq!(agent.status(), before);
}

#[test]
fn test_connection_flags_follow_visibility() {
    let mut agent = deterministic_agent();
    for _ in 0..69 {
        agent.step().unwrap();
    }
    assert!(!agent.is_connected());

    agent.step().unwrap();
    assert!(agent.is_connected());

    for _ in 70..111 {
        agent.step().unwrap();
    }
    assert_eq!(agent.environment().angle_deg(), 111.0);
    assert!(!agent.is_connected());
}

#[test]
fn test_sunlit_flag_exposed() {
    let mut agent = deterministic_agent();
    for _ in 0..180 {
        agent.step().unwrap();
    }
    assert!(!agent.is_sunlit());
    agent.step().unwrap();
    assert!(agent.is_sunlit());
}

#[test]
fn test_seeded_runs_are_reproducible() {
    let mut a = seeded_agent(11);
    let mut b = seeded_agent(11);
    for _ in 0..360 {
        assert_eq!(a.step().unwrap(), b.step().unwrap());
    }
}

#[test]
fn test_noise_perturbs_readings_only() {
    let mut noisy = seeded_agent(3);
    let mut clean = deterministic_agent();
    let mut differing = 0;

    for _ in 0..100 {
        let noisy_record = noisy.step().unwrap();
        let clean_record = clean.step().unwrap();

        assert_eq!(noisy_record.battery_voltage, clean_record.battery_voltage);
        assert_eq!(noisy.thermal().outer_temp_c(), clean.thermal().outer_temp_c());
        if noisy_record.temperature != clean_record.temperature {
            differing += 1;
        }
    }
    assert!(differing > 90);
}

#[test]
fn test_truth_feedback_uses_integrator_state() {
    let mut agent = seeded_agent(21);
    for _ in 0..50 {
        let record = agent.step().unwrap();
        let truth = agent.attitude().angular_velocity();
        assert_eq!(record.control_torque, compute_despin_control(truth));
        assert_eq!(record.control_torque, agent.attitude().commanded_control_torque());
    }
}

#[test]
fn test_measured_feedback_uses_gyro_reading() {
    let config = SimulationConfig {
        control_feedback: ControlFeedback::Measured,
        ..SimulationConfig::default()
    };
    let mut agent = SatelliteAgent::with_parts(config, GaussianNoise::with_seed(8), SimulatedClock::new());
    for _ in 0..50 {
        let record = agent.step().unwrap();
        assert_eq!(record.control_torque, compute_despin_control(record.angular_velocity));
    }
}

#[test]
fn test_depleted_battery_stays_in_saving_mode() {
    let mut agent = deterministic_agent().with_subsystems(
        PowerSystem::with_voltage(0.5),
        ThermalSystem::new(),
        AttitudeSystem::new(),
    );
    while !agent.is_orbit_complete() {
        agent.step().unwrap();
        assert!(agent.is_power_saving_mode());
    }
    // 180 ticks at -0.002 then 180 at +0.006
    assert!((agent.power().battery_voltage() - 1.22).abs() < 0.01);
}

#[test]
fn test_default_agent_runs_full_orbit() {
    let mut config = SimulationConfig::default();
    config.seed = Some(99);
    let mut agent = SatelliteAgent::new(config);

    let mut ticks = 0;
    while let Ok(record) = agent.step() {
        assert!(record.battery_voltage <= 4.2);
        assert!(record.temperature.is_finite());
        ticks += 1;
    }
    assert_eq!(ticks, 360);
    assert!(agent.last_record().is_some());
}
