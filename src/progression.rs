// Match progression state machine
// Maps elapsed time (timer mode) or the calendar (countdown mode) to the burning
// match and how far along it is.

use chrono::{NaiveDateTime, Timelike};

use crate::config::{BurnMode, CalendarSchedule, DayWindow};
use crate::constants::SECONDS_PER_DAY;
use crate::types::{BurnPhase, FrameClock, MatchSlot};

/// Derived burn state. `active_index` is -1 when nothing is lit and the match
/// count when everything is spent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BurnState {
    pub active_index: i32,
    pub cycle_start: f64,
}

/// Result of advancing the progression by one frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProgressionStep {
    pub phase: BurnPhase,
    /// A timer cycle just wrapped; all particles must be dropped
    pub restarted: bool,
    /// Seconds since the active match ignited (gates the spark burst)
    pub ignition_age: f32,
}

#[derive(Clone, Debug)]
pub struct MatchProgression {
    mode: BurnMode,
    match_count: usize,
    state: BurnState,
}

impl MatchProgression {
    pub fn new(mode: BurnMode, match_count: usize, now_secs: f64) -> Self {
        let active_index = match mode {
            BurnMode::Burned => match_count as i32,
            BurnMode::Unburned => -1,
            BurnMode::Timer { .. } | BurnMode::Calendar(_) => 0,
        };
        Self {
            mode,
            match_count,
            state: BurnState {
                active_index,
                cycle_start: now_secs,
            },
        }
    }

    pub fn mode(&self) -> BurnMode {
        self.mode
    }

    pub fn state(&self) -> BurnState {
        self.state
    }

    /// Total length of one timer cycle, if this is a timer panel
    pub fn cycle_duration(&self) -> Option<f64> {
        match self.mode {
            BurnMode::Timer { per_match_secs } => Some(per_match_secs as f64 * self.match_count as f64),
            _ => None,
        }
    }

    pub fn advance(&mut self, clock: &FrameClock) -> ProgressionStep {
        let step = match self.mode {
            BurnMode::Burned => ProgressionStep {
                phase: BurnPhase::Burned,
                restarted: false,
                ignition_age: f32::INFINITY,
            },
            BurnMode::Unburned => ProgressionStep {
                phase: BurnPhase::Unburned,
                restarted: false,
                ignition_age: 0.0,
            },
            BurnMode::Timer { per_match_secs } => self.advance_timer(per_match_secs, clock.now_secs),
            BurnMode::Calendar(schedule) => {
                calendar_step(&schedule, self.match_count, clock.local_time)
            }
        };

        self.state.active_index = match step.phase {
            BurnPhase::Unburned => -1,
            BurnPhase::Burned => self.match_count as i32,
            BurnPhase::Burning { active_index, .. } => active_index as i32,
        };
        step
    }

    fn advance_timer(&mut self, per_match_secs: f32, now_secs: f64) -> ProgressionStep {
        let per_match = per_match_secs as f64;
        let total = per_match * self.match_count as f64;

        let mut elapsed = (now_secs - self.state.cycle_start).max(0.0);
        let restarted = elapsed >= total;
        if restarted {
            self.state.cycle_start = now_secs;
            elapsed = 0.0;
        }

        let active_index = ((elapsed / per_match).floor() as usize).min(self.match_count - 1);
        let into_match = elapsed - active_index as f64 * per_match;
        let progress = (into_match / per_match).clamp(0.0, 1.0) as f32;

        ProgressionStep {
            phase: BurnPhase::Burning { active_index, progress },
            restarted,
            ignition_age: into_match as f32,
        }
    }
}

/// Whole days until local midnight of the target date, rounded up
pub fn days_left(target: &CalendarSchedule, now: NaiveDateTime) -> i64 {
    let Some(target_midnight) = target.target_date.and_hms_opt(0, 0, 0) else {
        return 0;
    };
    let secs = (target_midnight - now).num_seconds() as f64;
    (secs / SECONDS_PER_DAY).ceil() as i64
}

/// Seconds since local midnight
pub fn seconds_into_day(now: NaiveDateTime) -> f64 {
    now.num_seconds_from_midnight() as f64
}

fn calendar_step(schedule: &CalendarSchedule, match_count: usize, now: NaiveDateTime) -> ProgressionStep {
    let remaining = days_left(schedule, now);
    let last = match_count as i64 - 1;
    let raw_index = match schedule.window {
        DayWindow::CountingDown { last_day } => last_day - remaining,
        DayWindow::DaysRemaining => remaining,
    };
    let active_index = raw_index.clamp(0, last) as usize;

    let since_midnight = seconds_into_day(now);
    ProgressionStep {
        phase: BurnPhase::Burning {
            active_index,
            progress: (since_midnight / SECONDS_PER_DAY) as f32,
        },
        restarted: false,
        ignition_age: since_midnight as f32,
    }
}

/// Write each slot's burn progress for this phase
pub fn apply_phase(phase: &BurnPhase, slots: &mut [MatchSlot]) {
    for (i, slot) in slots.iter_mut().enumerate() {
        slot.burn_progress = phase.slot_progress(i);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn clock_at(now_secs: f64) -> FrameClock {
        FrameClock {
            now_secs,
            frame: 0,
            local_time: NaiveDate::from_ymd_opt(2025, 4, 20)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
        }
    }

    fn clock_on(date: (i32, u32, u32), time: (u32, u32, u32)) -> FrameClock {
        FrameClock {
            now_secs: 0.0,
            frame: 0,
            local_time: NaiveDate::from_ymd_opt(date.0, date.1, date.2)
                .unwrap()
                .and_hms_opt(time.0, time.1, time.2)
                .unwrap(),
        }
    }

    fn slots(n: usize) -> Vec<MatchSlot> {
        (0..n)
            .map(|i| MatchSlot::new(bevy::prelude::Vec2::new(i as f32, 10.0), bevy::prelude::Vec2::new(i as f32, 0.0)))
            .collect()
    }

    fn schedule(window: DayWindow) -> CalendarSchedule {
        CalendarSchedule {
            target_date: NaiveDate::from_ymd_opt(2025, 5, 5).unwrap(),
            window,
        }
    }

    #[test]
    fn timer_scenario_at_twenty_five_seconds() {
        let mut progression = MatchProgression::new(BurnMode::Timer { per_match_secs: 10.0 }, 10, 0.0);
        let step = progression.advance(&clock_at(25.0));
        assert_eq!(step.phase, BurnPhase::Burning { active_index: 2, progress: 0.5 });
        assert!(!step.restarted);
        assert!((step.ignition_age - 5.0).abs() < 1e-4);
        assert_eq!(progression.state().active_index, 2);

        let mut s = slots(10);
        apply_phase(&step.phase, &mut s);
        assert_eq!(s[0].burn_progress, 1.0);
        assert_eq!(s[1].burn_progress, 1.0);
        assert_eq!(s[2].burn_progress, 0.5);
        for slot in &s[3..] {
            assert_eq!(slot.burn_progress, 0.0);
        }
    }

    #[test]
    fn at_most_one_partial_slot_and_lower_slots_charred() {
        let mut progression = MatchProgression::new(BurnMode::Timer { per_match_secs: 10.0 }, 10, 0.0);
        let mut s = slots(10);
        let mut t = 0.0;
        while t < 100.0 {
            let step = progression.advance(&clock_at(t));
            apply_phase(&step.phase, &mut s);

            let partial: Vec<usize> = (0..10).filter(|&i| s[i].is_partially_burned()).collect();
            assert!(partial.len() <= 1, "t={} partial={:?}", t, partial);

            let active = step.phase.active_index().unwrap();
            assert!(s[..active].iter().all(|slot| slot.burn_progress == 1.0));
            assert!(s[active + 1..].iter().all(|slot| slot.burn_progress == 0.0));
            t += 0.37;
        }
    }

    #[test]
    fn exact_boundary_has_no_partial_slot() {
        let mut progression = MatchProgression::new(BurnMode::Timer { per_match_secs: 10.0 }, 10, 0.0);
        let step = progression.advance(&clock_at(30.0));
        assert_eq!(step.phase, BurnPhase::Burning { active_index: 3, progress: 0.0 });
        let mut s = slots(10);
        apply_phase(&step.phase, &mut s);
        assert!(s.iter().all(|slot| !slot.is_partially_burned()));
    }

    #[test]
    fn progress_is_monotonic_within_a_cycle() {
        let mut progression = MatchProgression::new(BurnMode::Timer { per_match_secs: 2.0 }, 5, 100.0);
        let mut s = slots(5);
        let mut previous = vec![0.0; 5];
        for frame in 0..600 {
            let step = progression.advance(&clock_at(100.0 + frame as f64 / 60.0));
            assert!(!step.restarted);
            apply_phase(&step.phase, &mut s);
            for (i, slot) in s.iter().enumerate() {
                assert!(slot.burn_progress >= previous[i]);
                previous[i] = slot.burn_progress;
            }
        }
    }

    #[test]
    fn cycle_restarts_at_total_duration() {
        let mut progression = MatchProgression::new(BurnMode::Timer { per_match_secs: 10.0 }, 10, 5.0);
        assert_eq!(progression.cycle_duration(), Some(100.0));

        progression.advance(&clock_at(104.9));
        let step = progression.advance(&clock_at(105.0));
        assert!(step.restarted);
        assert_eq!(step.phase, BurnPhase::Burning { active_index: 0, progress: 0.0 });
        assert_eq!(progression.state().cycle_start, 105.0);

        let mut s = slots(10);
        apply_phase(&step.phase, &mut s);
        assert!(s.iter().all(|slot| slot.burn_progress == 0.0));

        // Next frame continues the fresh cycle
        let step = progression.advance(&clock_at(110.0));
        assert!(!step.restarted);
        assert_eq!(step.phase, BurnPhase::Burning { active_index: 0, progress: 0.5 });
    }

    #[test]
    fn configured_terminal_panels_never_move() {
        let mut burned = MatchProgression::new(BurnMode::Burned, 10, 0.0);
        let mut unburned = MatchProgression::new(BurnMode::Unburned, 10, 0.0);
        for t in [0.0, 50.0, 1_000.0] {
            assert_eq!(burned.advance(&clock_at(t)).phase, BurnPhase::Burned);
            assert_eq!(unburned.advance(&clock_at(t)).phase, BurnPhase::Unburned);
        }
        assert_eq!(burned.state().active_index, 10);
        assert_eq!(unburned.state().active_index, -1);
    }

    #[test]
    fn days_left_rounds_partial_days_up() {
        let s = schedule(DayWindow::DaysRemaining);
        assert_eq!(days_left(&s, clock_on((2025, 5, 4), (0, 0, 0)).local_time), 1);
        assert_eq!(days_left(&s, clock_on((2025, 5, 4), (18, 0, 0)).local_time), 1);
        assert_eq!(days_left(&s, clock_on((2025, 5, 3), (23, 59, 59)).local_time), 2);
        assert_eq!(days_left(&s, clock_on((2025, 5, 5), (0, 0, 0)).local_time), 0);
        assert_eq!(days_left(&s, clock_on((2025, 5, 6), (12, 0, 0)).local_time), -1);
    }

    #[test]
    fn calendar_first_window_counts_days_twenty_to_eleven() {
        let mut progression = MatchProgression::new(
            BurnMode::Calendar(schedule(DayWindow::CountingDown { last_day: 20 })),
            10,
            0.0,
        );
        // 2025-04-20 06:00 -> 15 days left -> match 5, a quarter into the day
        let step = progression.advance(&clock_on((2025, 4, 20), (6, 0, 0)));
        assert_eq!(step.phase, BurnPhase::Burning { active_index: 5, progress: 0.25 });
        assert!((step.ignition_age - 21_600.0).abs() < 1e-2);

        // Far before the window, clamp to the first match
        let step = progression.advance(&clock_on((2025, 3, 1), (12, 0, 0)));
        assert_eq!(step.phase.active_index(), Some(0));

        // After the window, clamp to the last match
        let step = progression.advance(&clock_on((2025, 5, 1), (12, 0, 0)));
        assert_eq!(step.phase.active_index(), Some(9));
        assert!(!step.restarted);
    }

    #[test]
    fn calendar_second_window_counts_days_ten_to_one() {
        let mut progression = MatchProgression::new(
            BurnMode::Calendar(schedule(DayWindow::CountingDown { last_day: 10 })),
            10,
            0.0,
        );
        // 3 days left -> match 7
        let step = progression.advance(&clock_on((2025, 5, 2), (12, 0, 0)));
        assert_eq!(step.phase, BurnPhase::Burning { active_index: 7, progress: 0.5 });
    }

    #[test]
    fn calendar_final_window_indexes_by_days_remaining() {
        let mut progression =
            MatchProgression::new(BurnMode::Calendar(schedule(DayWindow::DaysRemaining)), 10, 0.0);
        let step = progression.advance(&clock_on((2025, 5, 2), (0, 0, 0)));
        assert_eq!(step.phase, BurnPhase::Burning { active_index: 3, progress: 0.0 });

        let step = progression.advance(&clock_on((2025, 1, 1), (0, 0, 0)));
        assert_eq!(step.phase.active_index(), Some(9));

        let step = progression.advance(&clock_on((2025, 6, 1), (0, 0, 0)));
        assert_eq!(step.phase.active_index(), Some(0));
    }
}
