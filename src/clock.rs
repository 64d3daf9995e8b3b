use std::fmt;
use std::time::Duration;

use enum_map::{EnumMap, enum_map};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use crate::force::Force;
use crate::timer::{CLOCK_TICK_PERIOD, TimerHandle, Timers};


#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct TimeControl {
    // Whole seconds: the clock counts down one second per tick.
    pub starting_time: Duration,
}

impl TimeControl {
    pub fn from_secs(secs: u32) -> Self {
        TimeControl { starting_time: Duration::from_secs(secs.into()) }
    }
    pub fn starting_secs(&self) -> u32 {
        self.starting_time.as_secs().try_into().unwrap_or(u32::MAX)
    }
}

impl fmt::Display for TimeControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&secs_to_mss(self.starting_time.as_secs()))
    }
}

pub fn secs_to_mss(s: u64) -> String { format!("{}:{:02}", s / 60, s % 60) }


#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct TickOutcome {
    // Side whose time went down during this tick.
    pub decremented: Option<Force>,
    // Side that ran out of time. Reported at most once per game.
    pub flagged: Option<Force>,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Clock {
    control: TimeControl,
    remaining: EnumMap<Force, u32>,
    // `Some` iff the clock is running. There is never more than one live interval.
    interval: Option<TimerHandle>,
    flag_fallen: bool,
}

impl Clock {
    pub fn new(control: TimeControl) -> Self {
        let secs = control.starting_secs();
        Clock {
            control,
            remaining: enum_map! { _ => secs },
            interval: None,
            flag_fallen: false,
        }
    }

    pub fn control(&self) -> &TimeControl { &self.control }
    pub fn is_running(&self) -> bool { self.interval.is_some() }
    pub fn is_flag_fallen(&self) -> bool { self.flag_fallen }
    pub fn interval(&self) -> Option<TimerHandle> { self.interval }
    pub fn remaining_secs(&self, force: Force) -> u32 { self.remaining[force] }
    pub fn showing_for(&self, force: Force) -> String { secs_to_mss(self.remaining[force].into()) }

    pub fn reset(&mut self, control: TimeControl, timers: &mut Timers) {
        self.pause(timers);
        *self = Clock::new(control);
    }

    // Returns whether the clock was actually started.
    pub fn start(&mut self, timers: &mut Timers) -> bool {
        if self.is_running() || self.flag_fallen {
            return false;
        }
        self.interval = Some(timers.start_interval(CLOCK_TICK_PERIOD));
        true
    }

    pub fn pause(&mut self, timers: &mut Timers) {
        if let Some(handle) = self.interval.take() {
            timers.cancel(handle);
        }
    }

    pub fn tick(&mut self, handle: TimerHandle, current_turn: Force, timers: &mut Timers)
        -> TickOutcome
    {
        let mut outcome = TickOutcome::default();
        if self.interval != Some(handle) || self.flag_fallen {
            // A callback that was already queued when the interval got cancelled.
            return outcome;
        }
        let remaining = &mut self.remaining[current_turn];
        if *remaining > 0 {
            *remaining -= 1;
            outcome.decremented = Some(current_turn);
        }
        if let Some(flagged) = Force::iter().find(|&force| self.remaining[force] == 0) {
            self.pause(timers);
            self.flag_fallen = true;
            outcome.flagged = Some(flagged);
        }
        outcome
    }
}
