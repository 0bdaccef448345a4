// src/stairs.rs
//! Moving the player between floors, grounded on `floor_move_player`: clear
//! the old tile's occupant, lazily generate the destination if this is its
//! first visit, place the player on the arrival tile, and hand back the new
//! entity id (the player's handle is floor-scoped, so it changes on every
//! transition — see `game.rs` for how the caller tracks this).

use crate::entity::EntityId;
use crate::error::{Error, Result};
use crate::mapgen::{self, GenOptions};
use crate::rng::GameRng;
use crate::world::{Floor, StairLink, TileRole, TOTAL_FLOORS};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Direction {
    Up,
    Down,
}

/// Attempts to use the staircase under the player. Fails with `NoStair` if
/// the tile isn't the matching staircase kind, consuming no turn.
pub fn use_stair(
    floors: &mut Vec<Floor>,
    current_floor: &mut usize,
    player: &mut EntityId,
    rng: &mut GameRng,
    direction: Direction,
) -> Result<()> {
    let (x, y, link) = {
        let floor = &floors[*current_floor];
        let entity = floor.entities.get(*player).ok_or(Error::OutOfBounds)?;
        let (x, y) = (entity.x, entity.y);
        let tile = floor.at(x, y);
        let expected = match direction {
            Direction::Down => TileRole::Downstair,
            Direction::Up => TileRole::Upstair,
        };
        if tile.role != expected {
            return Err(Error::NoStair);
        }
        let link = match direction {
            Direction::Down => floor.downstair,
            Direction::Up => floor.upstair,
        }
        .ok_or(Error::NoStair)?;
        (x, y, link)
    };

    let mut entity = floors[*current_floor]
        .remove_entity(*player)
        .expect("player entity vanished mid-transition");

    if !floors[link.floor].generated {
        let mut fresh = mapgen::new_floor();
        let opts = GenOptions {
            place_sword: link.floor == 0,
            next_floor: if link.floor + 1 < TOTAL_FLOORS {
                Some(link.floor + 1)
            } else {
                None
            },
            upstair_from: Some(StairLink {
                floor: *current_floor,
                x,
                y,
            }),
        };
        mapgen::generate(&mut fresh, rng, opts);
        floors[link.floor] = fresh;
    }

    entity.x = link.x;
    entity.y = link.y;
    let new_id = floors[link.floor].add_entity(entity)?;

    *player = new_id;
    *current_floor = link.floor;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Capabilities, Entity, EntityKind};
    use crate::world::{Floor, FloorKind, StairLink, Tile};

    fn player_entity(x: i32, y: i32) -> Entity {
        Entity {
            kind: EntityKind::Player,
            capabilities: Capabilities::COMBAT,
            x,
            y,
            color: Default::default(),
            glyph: '@',
            blocks_light: true,
            combat: Some(crate::entity::Combat { hp: 10, hp_max: 10 }),
            charge: None,
            brightness: 0.0,
            light_color: Default::default(),
            inventory: Vec::new(),
            alive: true,
        }
    }

    fn blank_floor() -> Floor {
        let mut floor = Floor::new(FloorKind::Cave);
        floor.tiles = vec![Tile::floor('.', Default::default(), false); 100 * 100];
        floor.generated = true;
        floor
    }

    #[test]
    fn descend_fails_without_stair_tile() {
        let mut floor0 = blank_floor();
        let player = floor0.add_entity(player_entity(5, 5)).unwrap();
        let mut floors = vec![floor0, blank_floor()];
        let mut current = 0;
        let mut player = player;
        let mut rng = GameRng::from_seed(1);
        let err = use_stair(&mut floors, &mut current, &mut player, &mut rng, Direction::Down).unwrap_err();
        assert_eq!(err, Error::NoStair);
    }

    #[test]
    fn descend_moves_player_to_linked_floor() {
        let mut floor0 = blank_floor();
        floor0.downstair = Some(StairLink { floor: 1, x: 10, y: 10 });
        floor0.at_mut(5, 5).unwrap().role = TileRole::Downstair;
        let player_id = floor0.add_entity(player_entity(5, 5)).unwrap();

        let mut floors = vec![floor0, blank_floor()];
        let mut current = 0usize;
        let mut player = player_id;
        let mut rng = GameRng::from_seed(1);

        use_stair(&mut floors, &mut current, &mut player, &mut rng, Direction::Down).unwrap();
        assert_eq!(current, 1);
        let e = floors[1].entities.get(player).unwrap();
        assert_eq!((e.x, e.y), (10, 10));
        assert!(floors[0].entities.get(player_id).is_none() || player_id != player);
    }
}
