//! Clock and random implementations.

use crate::infrastructure::ports::{ClockPort, RandomPort};
use chrono::{DateTime, Utc};

/// System clock - uses real time.
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ClockPort for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// System random - uses real randomness.
pub struct SystemRandom;

impl SystemRandom {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SystemRandom {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomPort for SystemRandom {
    fn gen_range(&self, min: i32, max: i32) -> i32 {
        use rand::Rng;
        if max <= min {
            return min;
        }
        rand::thread_rng().gen_range(min..=max)
    }

    fn gen_unit(&self) -> f64 {
        use rand::Rng;
        rand::thread_rng().gen::<f64>()
    }
}

/// Settable clock for testing.
#[cfg(test)]
pub struct FixedClock(std::sync::Mutex<DateTime<Utc>>);

#[cfg(test)]
impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(std::sync::Mutex::new(now))
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.0.lock().unwrap() = now;
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut guard = self.0.lock().unwrap();
        *guard += by;
    }
}

#[cfg(test)]
impl ClockPort for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap()
    }
}

/// Random source that replays scripted values, for testing.
///
/// Exhausted queues fall back to `min` for integers and `0.99` for unit
/// floats, which in combat means "no dodge, no crit, no block, lowest damage".
#[cfg(test)]
#[derive(Default)]
pub struct ScriptedRandom {
    ints: std::sync::Mutex<std::collections::VecDeque<i32>>,
    units: std::sync::Mutex<std::collections::VecDeque<f64>>,
}

#[cfg(test)]
impl ScriptedRandom {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ints(self, values: &[i32]) -> Self {
        self.ints.lock().unwrap().extend(values.iter().copied());
        self
    }

    pub fn with_units(self, values: &[f64]) -> Self {
        self.units.lock().unwrap().extend(values.iter().copied());
        self
    }

    pub fn push_ints(&self, values: &[i32]) {
        self.ints.lock().unwrap().extend(values.iter().copied());
    }

    pub fn push_units(&self, values: &[f64]) {
        self.units.lock().unwrap().extend(values.iter().copied());
    }
}

#[cfg(test)]
impl RandomPort for ScriptedRandom {
    fn gen_range(&self, min: i32, max: i32) -> i32 {
        self.ints
            .lock()
            .unwrap()
            .pop_front()
            .map_or(min, |v| v.clamp(min, max.max(min)))
    }

    fn gen_unit(&self) -> f64 {
        self.units.lock().unwrap().pop_front().unwrap_or(0.99)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_random_respects_inclusive_bounds() {
        let random = SystemRandom::new();
        for _ in 0..200 {
            let v = random.gen_range(3, 5);
            assert!((3..=5).contains(&v));
            let u = random.gen_unit();
            assert!((0.0..1.0).contains(&u));
        }
        assert_eq!(random.gen_range(7, 7), 7);
    }

    #[test]
    fn scripted_random_replays_then_falls_back() {
        let random = ScriptedRandom::new().with_ints(&[4, 100]).with_units(&[0.1]);
        assert_eq!(random.gen_range(0, 10), 4);
        assert_eq!(random.gen_range(0, 10), 10);
        assert_eq!(random.gen_range(2, 10), 2);
        assert_eq!(random.gen_unit(), 0.1);
        assert_eq!(random.gen_unit(), 0.99);
    }
}
