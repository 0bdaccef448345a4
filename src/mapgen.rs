// src/mapgen.rs
//! Cellular-automaton cave carving: seed a random grid, then apply
//! birth/survival rules for a fixed number of iterations until it reads as a
//! cave. Parameters (0.45 fill rate, birth=5, survive=4, 12 iterations) are
//! the ones the original cave generator used.
//!
//! Staircase placement itself has no counterpart in the original cave
//! generator (it only ever wired up one hardcoded link for the player's
//! starting floor) — the fixed (50,50) arrival convention and the
//! carve-open-on-arrival behaviour here are authored directly from the
//! stair contract, not ported from C.

use crate::color::Color;
use crate::entity::{Capabilities, Entity, EntityKind, Item};
use crate::rng::GameRng;
use crate::world::{Floor, FloorKind, StairLink, Tile, TileRole, MAP_COLS, MAP_ROWS};

const FILL_RATE: f32 = 0.45;
const ITERATIONS: u32 = 12;
const BIRTH: i32 = 5;
const SURVIVE: i32 = 4;
const SNAKE_COUNT: i32 = 10;
pub const ARRIVAL_X: i32 = 50;
pub const ARRIVAL_Y: i32 = 50;

fn populate_grid(rng: &mut GameRng, rows: i32, cols: i32) -> Vec<bool> {
    (0..rows * cols).map(|_| rng.gen_ratio(FILL_RATE)).collect()
}

fn cell_at(grid: &[bool], rows: i32, cols: i32, x: i32, y: i32) -> bool {
    if x < 0 || y < 0 || x >= cols || y >= rows {
        true
    } else {
        grid[(y * cols + x) as usize]
    }
}

fn alive_neighbours(grid: &[bool], rows: i32, cols: i32, x: i32, y: i32) -> i32 {
    let mut count = 0;
    for dy in -1..=1 {
        for dx in -1..=1 {
            if dx == 0 && dy == 0 {
                continue;
            }
            if cell_at(grid, rows, cols, x + dx, y + dy) {
                count += 1;
            }
        }
    }
    count
}

fn iterate(grid: &[bool], rows: i32, cols: i32) -> Vec<bool> {
    let mut next = vec![false; grid.len()];
    for y in 0..rows {
        for x in 0..cols {
            let alive = alive_neighbours(grid, rows, cols, x, y);
            let idx = (y * cols + x) as usize;
            next[idx] = if grid[idx] { alive >= SURVIVE } else { alive >= BIRTH };
        }
    }
    next
}

fn generate_grid(rng: &mut GameRng) -> Vec<bool> {
    let mut grid = populate_grid(rng, MAP_ROWS, MAP_COLS);
    for _ in 0..ITERATIONS {
        grid = iterate(&grid, MAP_ROWS, MAP_COLS);
    }
    grid
}

fn write_grid(floor: &mut Floor, grid: &[bool]) {
    floor.tiles = grid
        .iter()
        .map(|&blocked| {
            if blocked {
                Tile::floor('#', Color::new(0x55, 0x55, 0x55), true)
            } else {
                Tile::floor('.', Color::new(0x22, 0x22, 0x22), false)
            }
        })
        .collect();
}

fn snake() -> Entity {
    Entity {
        kind: EntityKind::Snake,
        capabilities: Capabilities::COMBAT,
        x: 0,
        y: 0,
        color: Color::new(0x19, 0x19, 0x8c),
        glyph: 'S',
        blocks_light: false,
        combat: Some(crate::entity::Combat { hp: 1, hp_max: 1 }),
        charge: None,
        brightness: 0.0,
        light_color: Color::BLACK,
        inventory: Vec::new(),
        alive: true,
    }
}

fn floater() -> Entity {
    Entity {
        kind: EntityKind::Floater,
        capabilities: Capabilities::COMBAT | Capabilities::CHARGE,
        x: 0,
        y: 0,
        color: Color::new(0x8c, 0x19, 0x8c),
        glyph: 'f',
        blocks_light: false,
        combat: Some(crate::entity::Combat { hp: 2, hp_max: 2 }),
        charge: Some(crate::entity::Charge::default()),
        brightness: 0.0,
        light_color: Color::BLACK,
        inventory: Vec::new(),
        alive: true,
    }
}

fn random_open_tile(floor: &Floor, rng: &mut GameRng) -> (i32, i32) {
    loop {
        let x = rng.gen_range(0..MAP_COLS);
        let y = rng.gen_range(0..MAP_ROWS);
        if !floor.at(x, y).blocks {
            return (x, y);
        }
    }
}

/// What the caller wants carved into a freshly generated floor, beyond the
/// cave itself.
pub struct GenOptions {
    pub place_sword: bool,
    /// If this floor should have a downstair, the index of the floor it
    /// leads to (always arriving at `(ARRIVAL_X, ARRIVAL_Y)` there).
    pub next_floor: Option<usize>,
    /// If the player is arriving from below, where they came from — used to
    /// wire up this floor's upstair link.
    pub upstair_from: Option<StairLink>,
}

/// Carves a fresh cave floor, populates it with wandering snakes, an
/// occasional floater, staircases, and (optionally) the sword that ends the
/// run.
pub fn generate(floor: &mut Floor, rng: &mut GameRng, opts: GenOptions) {
    let grid = generate_grid(rng);
    write_grid(floor, &grid);
    floor.generated = true;

    if let Some(link) = opts.upstair_from {
        if let Some(tile) = floor.at_mut(ARRIVAL_X, ARRIVAL_Y) {
            tile.blocks = false;
            tile.glyph = '<';
            tile.role = TileRole::Upstair;
        }
        floor.upstair = Some(link);
    }

    if let Some(next) = opts.next_floor {
        let (x, y) = loop {
            let (x, y) = random_open_tile(floor, rng);
            if (x, y) != (ARRIVAL_X, ARRIVAL_Y) {
                break (x, y);
            }
        };
        let tile = floor.at_mut(x, y).unwrap();
        tile.glyph = '>';
        tile.role = TileRole::Downstair;
        floor.downstair = Some(StairLink {
            floor: next,
            x: ARRIVAL_X,
            y: ARRIVAL_Y,
        });
    }

    for _ in 0..SNAKE_COUNT {
        let (x, y) = random_open_tile(floor, rng);
        let mut e = snake();
        e.x = x;
        e.y = y;
        let _ = floor.add_entity(e);
    }

    if rng.gen_ratio(0.3) {
        let (x, y) = random_open_tile(floor, rng);
        let mut e = floater();
        e.x = x;
        e.y = y;
        let _ = floor.add_entity(e);
    }

    if opts.place_sword {
        let (x, y) = random_open_tile(floor, rng);
        if let Some(tile) = floor.at_mut(x, y) {
            tile.items.push(Item {
                name: "Sword".to_string(),
                glyph: '/',
                color: Color::new(0x55, 0x66, 0x77),
            });
        }
    }
}

pub fn new_floor() -> Floor {
    Floor::new(FloorKind::Cave)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts() -> GenOptions {
        GenOptions {
            place_sword: false,
            next_floor: None,
            upstair_from: None,
        }
    }

    #[test]
    fn generated_floor_has_both_open_and_blocked_tiles() {
        let mut rng = GameRng::from_seed(7);
        let mut floor = new_floor();
        generate(&mut floor, &mut rng, opts());
        let open = floor.tiles.iter().filter(|t| !t.blocks).count();
        let blocked = floor.tiles.iter().filter(|t| t.blocks).count();
        assert!(open > 0 && blocked > 0);
    }

    #[test]
    fn same_seed_produces_same_cave() {
        let mut rng_a = GameRng::from_seed(99);
        let mut floor_a = new_floor();
        generate(&mut floor_a, &mut rng_a, opts());

        let mut rng_b = GameRng::from_seed(99);
        let mut floor_b = new_floor();
        generate(&mut floor_b, &mut rng_b, opts());

        let blocks_a: Vec<bool> = floor_a.tiles.iter().map(|t| t.blocks).collect();
        let blocks_b: Vec<bool> = floor_b.tiles.iter().map(|t| t.blocks).collect();
        assert_eq!(blocks_a, blocks_b);
    }

    #[test]
    fn sword_only_placed_when_requested() {
        let mut rng = GameRng::from_seed(3);
        let mut floor = new_floor();
        generate(
            &mut floor,
            &mut rng,
            GenOptions {
                place_sword: true,
                ..opts()
            },
        );
        let has_sword = floor.tiles.iter().any(|t| t.items.iter().any(|i| i.name == "Sword"));
        assert!(has_sword);
    }

    #[test]
    fn downstair_links_to_requested_floor_at_fixed_arrival() {
        let mut rng = GameRng::from_seed(11);
        let mut floor = new_floor();
        generate(
            &mut floor,
            &mut rng,
            GenOptions {
                place_sword: false,
                next_floor: Some(1),
                upstair_from: None,
            },
        );
        let link = floor.downstair.expect("downstair should be set");
        assert_eq!(link.floor, 1);
        assert_eq!((link.x, link.y), (ARRIVAL_X, ARRIVAL_Y));
    }

    #[test]
    fn upstair_arrival_tile_is_forced_open() {
        let mut rng = GameRng::from_seed(12);
        let mut floor = new_floor();
        generate(
            &mut floor,
            &mut rng,
            GenOptions {
                place_sword: false,
                next_floor: None,
                upstair_from: Some(StairLink { floor: 0, x: 1, y: 1 }),
            },
        );
        assert!(!floor.at(ARRIVAL_X, ARRIVAL_Y).blocks);
        assert_eq!(floor.at(ARRIVAL_X, ARRIVAL_Y).role, TileRole::Upstair);
    }
}
