use bevy::prelude::*;
use clap::{Parser, ValueEnum};

mod canvas;
mod charred;
mod config;
mod constants;
mod curve;
mod flame;
mod input;
mod math_utils;
mod noise_field;
mod panel;
mod particles;
mod progression;
mod types;
mod wind;

use config::{default_panels, parse_target_date, BurnMode, CalendarSchedule, ConfigError, DayWindow};
use constants::PER_MATCH_DURATION;
use input::MotionPermission;
use panel::{window_size_for, MatchstickPlugin};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum CountdownMode {
    /// Fixed seconds per match, looping forever
    Timer,
    /// One match per day toward --target-date
    Calendar,
}

/// Burning matchstick countdown
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    #[arg(long, value_enum, default_value_t = CountdownMode::Timer)]
    mode: CountdownMode,

    /// Seconds each match burns in timer mode
    #[arg(long, default_value_t = PER_MATCH_DURATION)]
    per_match_secs: f32,

    /// Countdown target for calendar mode (YYYY-MM-DD)
    #[arg(long)]
    target_date: Option<String>,

    /// Ignore device tilt; wind comes from the pointer only
    #[arg(long)]
    no_motion: bool,
}

impl Cli {
    fn timer_mode(&self) -> BurnMode {
        BurnMode::Timer {
            per_match_secs: self.per_match_secs,
        }
    }

    fn live_mode(&self) -> Result<BurnMode, ConfigError> {
        match self.mode {
            CountdownMode::Timer => Ok(self.timer_mode()),
            CountdownMode::Calendar => {
                let input = self.target_date.as_deref().ok_or_else(|| ConfigError::InvalidTargetDate {
                    input: String::new(),
                    reason: "calendar mode needs --target-date".to_string(),
                })?;
                Ok(BurnMode::Calendar(CalendarSchedule {
                    target_date: parse_target_date(input)?,
                    window: DayWindow::DaysRemaining,
                }))
            }
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let (live_mode, fallback) = match cli.live_mode() {
        Ok(mode) => (mode, None),
        Err(err) => (cli.timer_mode(), Some(err)),
    };
    let panels = default_panels(live_mode);
    let window_size = window_size_for(panels.len());
    let permission = if cli.no_motion {
        MotionPermission::Denied
    } else {
        MotionPermission::Granted
    };

    let mut app = App::new();
    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "Matchstick Countdown".into(),
            resolution: (window_size.x, window_size.y).into(),
            ..default()
        }),
        ..default()
    }));

    // Logging is only live once DefaultPlugins is in
    if let Some(err) = fallback {
        warn!("{}; falling back to the timer countdown", err);
    }

    app.insert_resource(ClearColor(Color::srgb(0.08, 0.07, 0.06)))
        .insert_resource(permission)
        .add_plugins(MatchstickPlugin { panels })
        .add_systems(Startup, setup_camera)
        .run();
}

fn setup_camera(mut commands: Commands) {
    commands.spawn(Camera2d);
}
