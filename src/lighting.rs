// src/lighting.rs
//! The deposit pass: for every light-emitting entity, shadowcast around it
//! and accumulate brightness and color onto every tile it reaches.
//!
//! Formula ported from the canonical form (the "dead" `/(d+1)/(d+1)` variant
//! that shows up in one of the older demo update functions is intentionally
//! not used here — see DESIGN.md O1/O5 for the radius derivation and the
//! deposit formula itself).

use crate::color::Color;
use crate::entity::Capabilities;
use crate::shadowcast::{self, Occluder};
use crate::world::{Floor, MAP_COLS, MAP_ROWS};

const SENSITIVITY: f32 = 6.0;

impl Occluder for Floor {
    fn in_bounds(&self, x: i32, y: i32) -> bool {
        Floor::in_bounds(x, y)
    }

    fn blocks_light(&self, x: i32, y: i32) -> bool {
        self.tile_blocks_light(x, y)
    }
}

/// `r = floor((max(C.r, C.g, C.b) * B - S) / (2S))`
pub fn light_radius(color: Color, brightness: f32) -> i32 {
    let max_channel = color.max_channel() as f32;
    ((max_channel * brightness - SENSITIVITY) / (2.0 * SENSITIVITY)).floor() as i32
}

/// Deposits one light source's contribution onto `floor`, using a
/// `drawn_to` bitmap so a tile visited twice in the same octant-overlap
/// (axes/diagonals) isn't double-counted.
pub fn deposit(floor: &mut Floor, origin_x: i32, origin_y: i32, color: Color, brightness: f32) {
    let radius = light_radius(color, brightness);
    if radius <= 0 {
        return;
    }

    let mut drawn_to = vec![false; (MAP_ROWS * MAP_COLS) as usize];
    let mut hits = Vec::new();

    shadowcast::cast(
        floor,
        origin_x,
        origin_y,
        radius,
        MAP_COLS,
        MAP_ROWS,
        |x, y| {
            if !Floor::in_bounds(x, y) {
                return;
            }
            let idx = (y * MAP_COLS + x) as usize;
            if drawn_to[idx] {
                return;
            }
            drawn_to[idx] = true;
            hits.push((x, y));
        },
    );

    for (x, y) in hits {
        let Some(tile) = floor.at_mut(x, y) else { continue };
        if x == origin_x && y == origin_y {
            tile.light += brightness;
            tile.lighting = tile.lighting.add(color);
            tile.seen = true;
            continue;
        }
        let dx = (x - origin_x) as f32;
        let dy = (y - origin_y) as f32;
        let dist = (dx * dx + dy * dy).sqrt();
        let d = dist.round().max(1.0);
        let dlight = brightness / (2.0 * d + 1.0);
        tile.light += dlight;
        tile.lighting = tile.lighting.add(color.multiply_by(dlight));
        tile.seen = true;
    }
}

/// Runs the deposit pass for every entity matching `filter`. Used both by
/// the turn controller (`filter = |_| true`) and the flicker scheduler
/// (`filter = |caps| caps.contains(Capabilities::FLICKER)`); see DESIGN.md
/// O1 for why both share this one function instead of duplicating the loop.
pub fn relight(floor: &mut Floor, filter: impl Fn(Capabilities) -> bool) {
    let sources: Vec<(i32, i32, Color, f32)> = floor
        .entities
        .iter()
        .filter(|(_, e)| e.capabilities.contains(Capabilities::LIGHT_SOURCE) && filter(e.capabilities))
        .map(|(_, e)| (e.x, e.y, e.light_color, e.brightness))
        .collect();

    for (x, y, color, brightness) in sources {
        deposit(floor, x, y, color, brightness);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Entity, EntityKind};

    fn lit_floor() -> Floor {
        let mut floor = Floor::new(crate::world::FloorKind::Cave);
        floor.tiles =
            vec![crate::world::Tile::floor('.', Color::new(40, 40, 40), false); (MAP_ROWS * MAP_COLS) as usize];
        floor
    }

    #[test]
    fn origin_gets_full_brightness_no_falloff() {
        let mut floor = lit_floor();
        deposit(&mut floor, 50, 50, Color::new(255, 0, 0), 1.0);
        assert_eq!(floor.at(50, 50).light, 1.0);
    }

    #[test]
    fn brightness_falls_off_with_distance() {
        let mut floor = lit_floor();
        deposit(&mut floor, 50, 50, Color::new(255, 0, 0), 1.0);
        let near = floor.at(51, 50).light;
        let far = floor.at(54, 50).light;
        assert!(near > far, "closer tile should be brighter: {near} vs {far}");
    }

    #[test]
    fn wall_occludes_deposit() {
        let mut floor = lit_floor();
        floor.at_mut(55, 50).unwrap().blocks = true;
        deposit(&mut floor, 50, 50, Color::new(255, 255, 255), 1.0);
        assert_eq!(floor.at(58, 50).light, 0.0, "tile behind wall should stay dark");
    }

    #[test]
    fn relight_only_touches_filtered_sources() {
        let mut floor = lit_floor();
        let mut torch = Entity {
            kind: EntityKind::Torch,
            capabilities: Capabilities::LIGHT_SOURCE | Capabilities::FLICKER,
            x: 50,
            y: 50,
            color: Color::new(255, 140, 0),
            glyph: 't',
            blocks_light: false,
            combat: None,
            charge: None,
            brightness: 1.0,
            light_color: Color::new(255, 140, 0),
            inventory: Vec::new(),
            alive: true,
        };
        let mut lantern = torch.clone();
        lantern.kind = EntityKind::Player;
        lantern.capabilities = Capabilities::LIGHT_SOURCE;
        lantern.x = 10;
        lantern.y = 10;
        torch.x = 20;
        torch.y = 20;
        floor.add_entity(torch).unwrap();
        floor.add_entity(lantern).unwrap();

        relight(&mut floor, |caps| caps.contains(Capabilities::FLICKER));
        assert!(floor.at(20, 20).light > 0.0);
        assert_eq!(floor.at(10, 10).light, 0.0);
    }
}
