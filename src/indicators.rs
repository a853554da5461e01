//! Discrete status indicators (power and ground contact lights).

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;
use thiserror::Error;
use tracing::info;

pub const INDICATOR_COUNT: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Indicator {
    PoweredOn,
    GroundContact,
}

impl Indicator {
    pub const ALL: [Indicator; INDICATOR_COUNT] = [Indicator::PoweredOn, Indicator::GroundContact];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Indicator::PoweredOn => "power",
            Indicator::GroundContact => "ground_contact",
        }
    }

    fn index(self) -> usize {
        match self {
            Indicator::PoweredOn => 0,
            Indicator::GroundContact => 1,
        }
    }
}

#[derive(Debug, Error)]
pub enum IndicatorError {
    #[error("indicator {0} is unavailable")]
    Unavailable(&'static str),
}

pub trait IndicatorPanel {
    /// Drive `indicator` on or off.
    ///
    /// # Errors
    ///
    /// Returns [`IndicatorError::Unavailable`] when the indicator cannot be driven.
    fn set_indicator(&mut self, indicator: Indicator, on: bool) -> Result<(), IndicatorError>;
}

impl<P: IndicatorPanel + ?Sized> IndicatorPanel for Box<P> {
    fn set_indicator(&mut self, indicator: Indicator, on: bool) -> Result<(), IndicatorError> {
        (**self).set_indicator(indicator, on)
    }
}

impl<P: IndicatorPanel> IndicatorPanel for Rc<RefCell<P>> {
    fn set_indicator(&mut self, indicator: Indicator, on: bool) -> Result<(), IndicatorError> {
        self.borrow_mut().set_indicator(indicator, on)
    }
}

/// Remembers the last value written to each indicator.
#[derive(Debug, Clone, Default)]
pub struct IndicatorLatch {
    states: [bool; INDICATOR_COUNT],
    transitions: [u32; INDICATOR_COUNT],
}

impl IndicatorLatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_on(&self, indicator: Indicator) -> bool {
        self.states[indicator.index()]
    }

    /// Number of off/on changes seen on `indicator`.
    #[must_use]
    pub fn transitions(&self, indicator: Indicator) -> u32 {
        self.transitions[indicator.index()]
    }

    fn latch(&mut self, indicator: Indicator, on: bool) -> bool {
        let slot = indicator.index();
        let changed = self.states[slot] != on;
        if changed {
            self.states[slot] = on;
            self.transitions[slot] += 1;
        }
        changed
    }
}

impl IndicatorPanel for IndicatorLatch {
    fn set_indicator(&mut self, indicator: Indicator, on: bool) -> Result<(), IndicatorError> {
        self.latch(indicator, on);
        Ok(())
    }
}

/// Logs indicator changes through `tracing`; repeated writes are silent.
#[derive(Debug, Clone, Default)]
pub struct TracingIndicators {
    latch: IndicatorLatch,
}

impl TracingIndicators {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn latch(&self) -> &IndicatorLatch {
        &self.latch
    }
}

impl IndicatorPanel for TracingIndicators {
    fn set_indicator(&mut self, indicator: Indicator, on: bool) -> Result<(), IndicatorError> {
        if self.latch.latch(indicator, on) {
            info!(indicator = indicator.name(), on, "indicator changed");
        }
        Ok(())
    }
}
