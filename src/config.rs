// Panel configuration and validation
// A panel is rejected up front if its layout or timing is unusable; once built,
// the simulation itself has no failure modes.

use bevy::prelude::*;
use chrono::NaiveDate;
use thiserror::Error;

use crate::constants::*;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("panel '{panel}' has {starts} start points but {ends} end points")]
    MismatchedPoints { panel: String, starts: usize, ends: usize },

    #[error("panel '{panel}' has no matches")]
    EmptyLayout { panel: String },

    #[error("panel '{panel}' per-match duration must be positive and finite, got {secs}")]
    InvalidDuration { panel: String, secs: f32 },

    #[error("panel '{panel}' match width must be positive, got {width}")]
    InvalidMatchWidth { panel: String, width: f32 },

    #[error("invalid target date '{input}': {reason}")]
    InvalidTargetDate { input: String, reason: String },
}

/// Which day range of a calendar countdown a panel covers
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DayWindow {
    /// Match `i` burns when `last_day - i` days remain
    CountingDown { last_day: i64 },
    /// Match `i` burns when `i` days remain
    DaysRemaining,
}

/// Fixed target date plus the window of days this panel displays
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CalendarSchedule {
    pub target_date: NaiveDate,
    pub window: DayWindow,
}

/// How a panel decides which match is burning
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BurnMode {
    /// Every match fully charred, no flame
    Burned,
    /// No match lit
    Unburned,
    /// Fixed seconds per match, looping once all matches are spent
    Timer { per_match_secs: f32 },
    /// One match per calendar day toward a target date
    Calendar(CalendarSchedule),
}

/// Shape parameters shared by every flame a panel draws
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlameStyle {
    pub segments: usize,
    pub growth_exponent: f32,     // progress^x -> growth factor
    pub taper_exponent: f32,      // half-width falls as 1 - t^x
    pub wind_x_exponent: f32,     // horizontal bend grows as t^x
    pub wind_y_exponent: f32,
    pub wind_coupling: f32,       // extra horizontal bend multiplier
    pub jitter: f32,              // horizontal noise as a fraction of width
    pub min_width: f32,
    pub width_growth: f32,
    pub min_height: f32,
    pub height_growth: f32,
}

impl Default for FlameStyle {
    fn default() -> Self {
        Self {
            segments: 20,
            growth_exponent: 0.5,
            taper_exponent: 0.8,
            wind_x_exponent: 1.2,
            wind_y_exponent: 1.0,
            wind_coupling: 1.5,
            jitter: 0.4,
            min_width: 4.0,
            width_growth: 8.0,
            min_height: 15.0,
            height_growth: 30.0,
        }
    }
}

/// Everything needed to build one matchstick panel
#[derive(Clone, Debug)]
pub struct PanelConfig {
    pub name: String,
    pub mode: BurnMode,
    pub start_points: Vec<Vec2>,
    pub end_points: Vec<Vec2>,
    pub match_width: f32,
    pub flicker_duration: f32,
    pub spark_duration: f32,
    pub flame: FlameStyle,
}

impl PanelConfig {
    pub fn new(name: impl Into<String>, mode: BurnMode) -> Self {
        Self {
            name: name.into(),
            mode,
            start_points: START_POINTS.to_vec(),
            end_points: END_POINTS.to_vec(),
            match_width: MATCH_WIDTH,
            flicker_duration: FLICKER_DURATION,
            spark_duration: SPARK_DURATION,
            flame: FlameStyle::default(),
        }
    }

    pub fn match_count(&self) -> usize {
        self.start_points.len()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.start_points.len() != self.end_points.len() {
            return Err(ConfigError::MismatchedPoints {
                panel: self.name.clone(),
                starts: self.start_points.len(),
                ends: self.end_points.len(),
            });
        }
        if self.start_points.is_empty() {
            return Err(ConfigError::EmptyLayout { panel: self.name.clone() });
        }
        if self.match_width.is_nan() || self.match_width <= 0.0 {
            return Err(ConfigError::InvalidMatchWidth {
                panel: self.name.clone(),
                width: self.match_width,
            });
        }
        if let BurnMode::Timer { per_match_secs } = self.mode {
            if !per_match_secs.is_finite() || per_match_secs <= 0.0 {
                return Err(ConfigError::InvalidDuration {
                    panel: self.name.clone(),
                    secs: per_match_secs,
                });
            }
        }
        Ok(())
    }
}

/// Parse a `YYYY-MM-DD` countdown target
pub fn parse_target_date(input: &str) -> Result<NaiveDate, ConfigError> {
    NaiveDate::parse_from_str(input, "%Y-%m-%d").map_err(|e| ConfigError::InvalidTargetDate {
        input: input.to_string(),
        reason: e.to_string(),
    })
}

/// The three panels of the countdown: one spent, one live, one waiting.
/// In calendar mode all three follow the same target date across their day windows.
pub fn default_panels(live_mode: BurnMode) -> Vec<PanelConfig> {
    match live_mode {
        BurnMode::Calendar(schedule) => vec![
            PanelConfig::new(
                "days 20-11",
                BurnMode::Calendar(CalendarSchedule {
                    window: DayWindow::CountingDown { last_day: 20 },
                    ..schedule
                }),
            ),
            PanelConfig::new(
                "days 10-1",
                BurnMode::Calendar(CalendarSchedule {
                    window: DayWindow::CountingDown { last_day: 10 },
                    ..schedule
                }),
            ),
            PanelConfig::new(
                "final days",
                BurnMode::Calendar(CalendarSchedule {
                    window: DayWindow::DaysRemaining,
                    ..schedule
                }),
            ),
        ],
        mode => vec![
            PanelConfig::new("spent", BurnMode::Burned),
            PanelConfig::new("burning", mode),
            PanelConfig::new("waiting", BurnMode::Unburned),
        ],
    }
}
