// src/scheduler.rs
//! Periodic relight for flicker-capable light sources, generalizing the
//! repeating `Timer` from `time.rs` to a game-seconds-free design: there is
//! no frame clock here, just the main loop's bounded poll timeout standing
//! in for a tick (see DESIGN.md O2), so this tracks wall-clock `Instant`s
//! directly instead of accumulating a `dt`.

use std::sync::atomic::Ordering;
use std::time::{Duration, Instant};

use crate::entity::Capabilities;
use crate::lighting;
use crate::terminal::POLLING;
use crate::world::Floor;

/// Soft flicker cadence; see DESIGN.md O5 for why this isn't a hard
/// contract.
pub const FLICKER_INTERVAL: Duration = Duration::from_millis(100);

pub struct FlickerScheduler {
    last_tick: Instant,
    interval: Duration,
}

impl FlickerScheduler {
    pub fn new() -> Self {
        FlickerScheduler {
            last_tick: Instant::now(),
            interval: FLICKER_INTERVAL,
        }
    }

    /// Relights flicker-capable sources if the interval has elapsed and the
    /// terminal isn't mid-poll. Returns whether it fired (the caller should
    /// redraw if so).
    pub fn maybe_tick(&mut self, floor: &mut Floor) -> bool {
        if !POLLING.load(std::sync::atomic::Ordering::Acquire) {
            return false;
        }
        if self.last_tick.elapsed() < self.interval {
            return false;
        }
        self.last_tick = Instant::now();
        lighting::relight(floor, |caps| caps.contains(Capabilities::FLICKER));
        true
    }
}

impl Default for FlickerScheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::entity::{Entity, EntityKind};
    use crate::world::{FloorKind, Tile, MAP_COLS, MAP_ROWS};

    fn lit_floor() -> Floor {
        let mut floor = Floor::new(FloorKind::Cave);
        floor.tiles = vec![Tile::floor('.', Color::new(20, 20, 20), false); (MAP_ROWS * MAP_COLS) as usize];
        floor
    }

    fn flicker_torch() -> Entity {
        Entity {
            kind: EntityKind::Torch,
            capabilities: Capabilities::LIGHT_SOURCE | Capabilities::FLICKER,
            x: 50,
            y: 50,
            color: Color::new(255, 120, 0),
            glyph: 't',
            blocks_light: false,
            combat: None,
            charge: None,
            brightness: 1.0,
            light_color: Color::new(255, 120, 0),
            inventory: Vec::new(),
            alive: true,
        }
    }

    /// Runs `body` with `POLLING` forced to `polling` for the duration of
    /// the call, then restores whatever was there before. `POLLING` is a
    /// process-global flag so this only holds as a best effort against
    /// other threads in the same test binary touching it concurrently.
    fn with_polling<R>(polling: bool, body: impl FnOnce() -> R) -> R {
        let prior = POLLING.load(Ordering::Acquire);
        POLLING.store(polling, Ordering::Release);
        let result = body();
        POLLING.store(prior, Ordering::Release);
        result
    }

    #[test]
    fn does_not_tick_before_interval_elapses() {
        let mut floor = lit_floor();
        floor.add_entity(flicker_torch()).unwrap();

        let mut scheduler = FlickerScheduler {
            last_tick: Instant::now(),
            interval: Duration::from_secs(60),
        };
        with_polling(true, || {
            assert!(!scheduler.maybe_tick(&mut floor));
        });
        assert_eq!(floor.at(50, 50).light, 0.0);
    }

    #[test]
    fn ticks_once_interval_has_elapsed_and_polling_is_true() {
        let mut floor = lit_floor();
        floor.add_entity(flicker_torch()).unwrap();

        let mut scheduler = FlickerScheduler {
            last_tick: Instant::now() - Duration::from_secs(1),
            interval: Duration::from_millis(100),
        };
        with_polling(true, || {
            assert!(scheduler.maybe_tick(&mut floor));
        });
        assert!(floor.at(50, 50).light > 0.0);
    }

    #[test]
    fn is_a_no_op_when_polling_is_false_even_past_interval() {
        let mut floor = lit_floor();
        floor.add_entity(flicker_torch()).unwrap();

        let mut scheduler = FlickerScheduler {
            last_tick: Instant::now() - Duration::from_secs(1),
            interval: Duration::from_millis(100),
        };
        with_polling(false, || {
            assert!(!scheduler.maybe_tick(&mut floor));
        });
        assert_eq!(floor.at(50, 50).light, 0.0);
    }
}
