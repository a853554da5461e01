use satlab::clock::SimulatedClock;
use satlab::indicators::{Indicator, IndicatorError, IndicatorLatch, IndicatorPanel};
use satlab::mission::{Mission, MissionError, MissionEvent, MissionPhase};
use satlab::telemetry::{
    CsvTelemetryLog, TelemetryError, TelemetryHistory, TelemetryRecord, TelemetrySink, CSV_HEADER,
};
use satlab::{SatelliteAgent, SimulationConfig, ZeroNoise};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

type TestMission = Mission<ZeroNoise, SimulatedClock>;

fn mission_with(indicators: Box<dyn IndicatorPanel>) -> TestMission {
    let config = SimulationConfig {
        noise_enabled: false,
        deployment_delay_ms: 500,
        ..SimulationConfig::default()
    };
    let agent = SatelliteAgent::with_parts(config, ZeroNoise, SimulatedClock::new());
    Mission::new(agent, indicators)
}

struct RejectingSink;

impl TelemetrySink for RejectingSink {
    fn record_telemetry(&mut self, _record: &TelemetryRecord) -> Result<(), TelemetryError> {
        Err(TelemetryError::RowOverflow { capacity: 0 })
    }
}

struct UnflushableSink;

impl TelemetrySink for UnflushableSink {
    fn record_telemetry(&mut self, _record: &TelemetryRecord) -> Result<(), TelemetryError> {
        Ok(())
    }

    fn flush(&mut self) -> Result<(), TelemetryError> {
        Err(TelemetryError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            "disk full",
        )))
    }
}

struct DeadPanel;

impl IndicatorPanel for DeadPanel {
    fn set_indicator(&mut self, indicator: Indicator, _on: bool) -> Result<(), IndicatorError> {
        Err(IndicatorError::Unavailable(indicator.name()))
    }
}

#[test]
fn test_poll_before_release_fails() {
    let mut mission = mission_with(Box::new(IndicatorLatch::new()));
    assert_eq!(mission.phase(), MissionPhase::Released);
    assert!(matches!(mission.poll(), Err(MissionError::NotReleased)));
}

#[test]
fn test_release_lights_power_indicator() {
    let latch = Rc::new(RefCell::new(IndicatorLatch::new()));
    let mut mission = mission_with(Box::new(Rc::clone(&latch)));

    mission.release();
    assert_eq!(mission.phase(), MissionPhase::Deploying);
    assert!(latch.borrow().is_on(Indicator::PoweredOn));

    // Releasing again changes nothing
    mission.release();
    assert_eq!(latch.borrow().transitions(Indicator::PoweredOn), 1);
}

#[test]
fn test_deployment_wait() {
    let mut mission = mission_with(Box::new(IndicatorLatch::new()));
    mission.release();

    for expected_ms in [400u64, 300, 200, 100] {
        match mission.poll().unwrap() {
            MissionEvent::Waiting { remaining } => {
                assert_eq!(remaining, Duration::from_millis(expected_ms));
            }
            other => panic!("expected waiting, got {:?}", other),
        }
    }

    assert_eq!(mission.poll().unwrap(), MissionEvent::Started);
    assert_eq!(mission.phase(), MissionPhase::Nominal);
    assert_eq!(mission.agent().tick_count(), 0);

    match mission.poll().unwrap() {
        MissionEvent::Tick(record) => assert!((record.time_s - 0.6).abs() < 1e-5),
        other => panic!("expected tick, got {:?}", other),
    }
}

#[test]
fn test_run_to_completion_fans_out_records() {
    let latch = Rc::new(RefCell::new(IndicatorLatch::new()));
    let history = Rc::new(RefCell::new(TelemetryHistory::new()));
    let log = Rc::new(RefCell::new(CsvTelemetryLog::new(Vec::new())));

    let mut mission = mission_with(Box::new(Rc::clone(&latch)));
    mission.add_sink(Box::new(Rc::clone(&history)));
    mission.add_sink(Box::new(Rc::clone(&log)));

    let ticks = mission.run_to_completion().unwrap();
    assert_eq!(ticks, 360);
    assert_eq!(mission.phase(), MissionPhase::Complete);
    assert_eq!(mission.poll().unwrap(), MissionEvent::Complete);

    let history = history.borrow();
    assert_eq!(history.len(), 360);
    assert!(history.records().iter().all(|r| r.battery_voltage <= 4.2));

    let log = log.borrow();
    assert_eq!(log.rows_written(), 360);
    let output = String::from_utf8(log.get_ref().clone()).unwrap();
    let mut lines = output.split("\r\n");
    assert_eq!(lines.next(), Some(CSV_HEADER));
    assert!(lines.next().unwrap().starts_with("0.60,"));
    assert_eq!(output.matches("\r\n").count(), 361);

    let latch = latch.borrow();
    assert!(latch.is_on(Indicator::PoweredOn));
    assert!(!latch.is_on(Indicator::GroundContact));
    // On at 70 and 250, off at 111 and 291
    assert_eq!(latch.transitions(Indicator::GroundContact), 4);

    let stats = mission.stats();
    assert_eq!(stats.ticks, 360);
    assert_eq!(stats.sink_failures, 0);
    assert_eq!(stats.indicator_failures, 0);
}

#[test]
fn test_collaborator_failures_do_not_stop_the_mission() {
    let history = Rc::new(RefCell::new(TelemetryHistory::new()));

    let mut mission = mission_with(Box::new(DeadPanel));
    mission.add_sink(Box::new(RejectingSink));
    mission.add_sink(Box::new(Rc::clone(&history)));

    let ticks = mission.run_to_completion().unwrap();
    assert_eq!(ticks, 360);
    assert_eq!(history.borrow().len(), 360);

    let stats = mission.stats();
    assert_eq!(stats.sink_failures, 360);
    // Power on at release plus ground contact every tick
    assert_eq!(stats.indicator_failures, 361);
}

#[test]
fn test_stop_flushes_sinks_mid_orbit() {
    let log = Rc::new(RefCell::new(CsvTelemetryLog::new(std::io::BufWriter::new(Vec::new()))));

    let mut mission = mission_with(Box::new(IndicatorLatch::new()));
    mission.add_sink(Box::new(Rc::clone(&log)));
    mission.add_sink(Box::new(UnflushableSink));
    mission.release();

    while mission.agent().tick_count() < 10 {
        mission.poll().unwrap();
    }
    assert!(log.borrow().get_ref().get_ref().is_empty());

    mission.stop();
    assert_eq!(mission.phase(), MissionPhase::Complete);
    assert_eq!(mission.poll().unwrap(), MissionEvent::Complete);
    assert_eq!(mission.stats().ticks, 10);
    assert_eq!(mission.stats().sink_failures, 1);

    let log = log.borrow();
    let output = String::from_utf8(log.get_ref().get_ref().clone()).unwrap();
    assert_eq!(output.matches("\r\n").count(), 11);

    // Stopping again does not flush twice
    drop(log);
    mission.stop();
    assert_eq!(mission.stats().sink_failures, 1);
}
