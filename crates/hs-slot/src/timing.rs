//! Timing profiles for the presentation timeline
//!
//! Timing only shapes the timestamps attached to stage events. Resolution
//! never waits on it.

use serde::{Deserialize, Serialize};

/// Timing profile for stage events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TimingProfile {
    /// Normal gameplay timing
    #[default]
    Normal,
    /// Fast/Turbo mode
    Turbo,
    /// Instant, for tests and batch runs
    Studio,
    /// Scaled from another profile
    Custom,
}

/// Detailed timing configuration (all values in ms)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingConfig {
    pub profile: TimingProfile,

    /// Minimum time the reels spin before the first stop
    pub min_spin_ms: f64,

    /// Delay between reel stops
    pub reel_stop_interval_ms: f64,

    /// Win presentation hold
    pub win_display_ms: f64,

    /// Pause on the base board once a bonus triggers
    pub trigger_pause_ms: f64,

    /// Base → bonus board transition
    pub bonus_transition_ms: f64,

    /// One bonus re-spin
    pub bonus_spin_ms: f64,

    /// Coin landing and transfer animations after a re-spin
    pub landing_ms: f64,

    /// Final payout presentation
    pub payout_ms: f64,

    /// Minimum gap between two stage events
    pub min_event_interval_ms: f64,
}

impl TimingConfig {
    /// Normal gameplay timing
    pub fn normal() -> Self {
        Self {
            profile: TimingProfile::Normal,
            min_spin_ms: 1500.0,
            reel_stop_interval_ms: 300.0,
            win_display_ms: 2500.0,
            trigger_pause_ms: 500.0,
            bonus_transition_ms: 1500.0,
            bonus_spin_ms: 2000.0,
            landing_ms: 1000.0,
            payout_ms: 3000.0,
            min_event_interval_ms: 50.0,
        }
    }

    /// Turbo mode
    pub fn turbo() -> Self {
        Self {
            profile: TimingProfile::Turbo,
            min_spin_ms: 600.0,
            reel_stop_interval_ms: 100.0,
            win_display_ms: 1000.0,
            trigger_pause_ms: 250.0,
            bonus_transition_ms: 600.0,
            bonus_spin_ms: 800.0,
            landing_ms: 400.0,
            payout_ms: 1200.0,
            min_event_interval_ms: 25.0,
        }
    }

    /// Studio mode: events keep their order with no display delays
    pub fn studio() -> Self {
        Self {
            profile: TimingProfile::Studio,
            min_spin_ms: 0.0,
            reel_stop_interval_ms: 0.0,
            win_display_ms: 0.0,
            trigger_pause_ms: 0.0,
            bonus_transition_ms: 0.0,
            bonus_spin_ms: 0.0,
            landing_ms: 0.0,
            payout_ms: 0.0,
            min_event_interval_ms: 1.0,
        }
    }

    /// Get config for profile
    pub fn from_profile(profile: TimingProfile) -> Self {
        match profile {
            TimingProfile::Normal | TimingProfile::Custom => Self::normal(),
            TimingProfile::Turbo => Self::turbo(),
            TimingProfile::Studio => Self::studio(),
        }
    }

    /// Scale timing by factor (< 1.0 = faster)
    pub fn scaled(&self, factor: f64) -> Self {
        let factor = factor.max(0.0);
        Self {
            profile: TimingProfile::Custom,
            min_spin_ms: self.min_spin_ms * factor,
            reel_stop_interval_ms: self.reel_stop_interval_ms * factor,
            win_display_ms: self.win_display_ms * factor,
            trigger_pause_ms: self.trigger_pause_ms * factor,
            bonus_transition_ms: self.bonus_transition_ms * factor,
            bonus_spin_ms: self.bonus_spin_ms * factor,
            landing_ms: self.landing_ms * factor,
            payout_ms: self.payout_ms * factor,
            min_event_interval_ms: self.min_event_interval_ms * factor,
        }
    }

    /// Time until every reel has stopped
    pub fn total_spin_duration(&self, reel_count: u8) -> f64 {
        self.min_spin_ms + (reel_count.max(1) as f64 - 1.0) * self.reel_stop_interval_ms
    }

    /// Estimated display time of a bonus round with `turns` re-spins
    pub fn bonus_duration(&self, turns: u32) -> f64 {
        self.trigger_pause_ms
            + self.bonus_transition_ms
            + turns as f64 * (self.bonus_spin_ms + self.landing_ms)
            + self.payout_ms
    }

    /// Shrink this timing so `estimated_ms` fits in `budget_ms`; unchanged
    /// when it already fits
    pub fn within_budget(&self, estimated_ms: f64, budget_ms: f64) -> Self {
        if estimated_ms <= budget_ms || estimated_ms <= 0.0 {
            return self.clone();
        }
        self.scaled(budget_ms.max(0.0) / estimated_ms)
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self::normal()
    }
}

/// Timestamp generator for sequential events
#[derive(Debug, Clone)]
pub struct TimestampGenerator {
    current_ms: f64,
    config: TimingConfig,
}

impl TimestampGenerator {
    pub fn new(config: TimingConfig) -> Self {
        Self {
            current_ms: 0.0,
            config,
        }
    }

    pub fn reset(&mut self) {
        self.current_ms = 0.0;
    }

    pub fn current(&self) -> f64 {
        self.current_ms
    }

    /// Advance by duration and return new timestamp
    pub fn advance(&mut self, duration_ms: f64) -> f64 {
        self.current_ms += duration_ms.max(self.config.min_event_interval_ms);
        self.current_ms
    }

    /// First reel waits out the minimum spin, the rest follow at the cadence
    pub fn reel_stop(&mut self, reel_index: u8) -> f64 {
        if reel_index == 0 {
            self.advance(self.config.min_spin_ms)
        } else {
            self.advance(self.config.reel_stop_interval_ms)
        }
    }

    pub fn win_present(&mut self) -> f64 {
        self.advance(self.config.win_display_ms)
    }

    pub fn bonus_trigger(&mut self) -> f64 {
        self.advance(self.config.trigger_pause_ms)
    }

    pub fn bonus_enter(&mut self) -> f64 {
        self.advance(self.config.bonus_transition_ms)
    }

    pub fn bonus_spin(&mut self) -> f64 {
        self.advance(self.config.bonus_spin_ms)
    }

    pub fn landing(&mut self) -> f64 {
        self.advance(self.config.landing_ms)
    }

    pub fn payout(&mut self) -> f64 {
        self.advance(self.config.payout_ms)
    }

    pub fn config(&self) -> &TimingConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_timing_profiles() {
        let normal = TimingConfig::normal();
        let turbo = TimingConfig::turbo();
        let studio = TimingConfig::studio();

        assert!(turbo.min_spin_ms < normal.min_spin_ms);
        assert!(turbo.bonus_spin_ms < normal.bonus_spin_ms);
        assert_eq!(studio.payout_ms, 0.0);
        assert_eq!(TimingConfig::from_profile(TimingProfile::Turbo), turbo);
    }

    #[test]
    fn test_total_spin_duration() {
        let normal = TimingConfig::normal();
        assert_relative_eq!(normal.total_spin_duration(5), 1500.0 + 4.0 * 300.0);
        assert_relative_eq!(normal.total_spin_duration(1), 1500.0);
    }

    #[test]
    fn test_budget_scales_down_only() {
        let normal = TimingConfig::normal();
        let estimate = normal.bonus_duration(4);
        assert_eq!(normal.within_budget(estimate, estimate * 2.0), normal);

        let squeezed = normal.within_budget(estimate, estimate / 2.0);
        assert_eq!(squeezed.profile, TimingProfile::Custom);
        assert_relative_eq!(squeezed.bonus_duration(4), estimate / 2.0, epsilon = 1e-6);
    }

    #[test]
    fn test_timestamp_generator() {
        let mut ts_gen = TimestampGenerator::new(TimingConfig::normal());
        assert_eq!(ts_gen.current(), 0.0);

        let t1 = ts_gen.reel_stop(0);
        assert_relative_eq!(t1, 1500.0);
        let t2 = ts_gen.reel_stop(1);
        assert_relative_eq!(t2, 1800.0);

        ts_gen.reset();
        assert_eq!(ts_gen.current(), 0.0);
    }

    #[test]
    fn test_studio_keeps_order() {
        let mut ts_gen = TimestampGenerator::new(TimingConfig::studio());
        let a = ts_gen.bonus_spin();
        let b = ts_gen.landing();
        assert!(b > a);
    }
}
