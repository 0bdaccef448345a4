// src/turn.rs
//! The turn controller: receive a key, look up its action, run it, and if it
//! consumed a turn, clear lights, update every entity, check for death or
//! victory, then redraw. Grounded on `event_loop`: an action that "didn't
//! consume" loops back to the key prompt without touching lights.

use crate::entity::{Capabilities, EntityId, EntityKind};
use crate::error::{Error, Result};
use crate::game::{Game, GameOutcome};
use crate::input::{self, Action};
use crate::lighting;
use crate::shadowcast::{self, Occluder};
use crate::stairs::{self, Direction};

const SNAKE_FLEE_LIGHT: f32 = 0.2;

/// Returns `true` if the action consumed a turn (the caller should relight
/// and redraw), `false` if it didn't (the caller should re-prompt).
pub fn handle_key(game: &mut Game, key: char) -> Result<bool> {
    let Some(action) = input::action_for_key(key) else {
        return Ok(false);
    };

    if action == Action::Quit {
        game.outcome = Some(GameOutcome::Quit);
        return Ok(true);
    }

    let acted = match action {
        Action::DebugRefuel => {
            game.fuel += 10;
            true
        }
        Action::ToggleLantern => {
            game.lantern_on = !game.lantern_on;
            true
        }
        Action::PickUp => pick_up(game)?,
        Action::Descend => stairs_result(game, Direction::Down)?,
        Action::Ascend => stairs_result(game, Direction::Up)?,
        Action::Attack => attack(game)?,
        Action::PlaceTorch => place_torch(game)?,
        _ => {
            if let Some((dx, dy)) = input::movement_delta(action) {
                move_player(game, dx, dy)?
            } else {
                false
            }
        }
    };

    if !acted {
        return Ok(false);
    }

    run_turn(game);
    Ok(true)
}

fn stairs_result(game: &mut Game, dir: Direction) -> Result<bool> {
    match stairs::use_stair(&mut game.floors, &mut game.current_floor, &mut game.player, &mut game.rng, dir) {
        Ok(()) => Ok(true),
        Err(Error::NoStair) => Ok(false),
        Err(e) => Err(e),
    }
}

/// Moves the player, or bumps into whatever occupies the destination tile.
/// Either way, `facing` is updated so `Attack`/`PlaceTorch` know which tile
/// to act on without a second keypress.
fn move_player(game: &mut Game, dx: i32, dy: i32) -> Result<bool> {
    game.facing = (dx, dy);
    let result = game.floors[game.current_floor].move_entity_rel(game.player, dx, dy);
    match result {
        Ok(()) => Ok(true),
        Err(Error::Occupied) => Ok(strike_facing(game)),
        Err(Error::Blocked) | Err(Error::OutOfBounds) => Ok(false),
        Err(e) => Err(e),
    }
}

fn pick_up(game: &mut Game) -> Result<bool> {
    let floor = &mut game.floors[game.current_floor];
    let (x, y) = {
        let p = floor.entities.get(game.player).ok_or(Error::OutOfBounds)?;
        (p.x, p.y)
    };
    let tile = floor.at_mut(x, y).ok_or(Error::OutOfBounds)?;
    if tile.items.is_empty() {
        return Ok(false);
    }
    let item = tile.items.remove(0);
    if item.name == "Sword" {
        game.outcome = Some(GameOutcome::Victory);
    } else {
        let player = floor.entities.get_mut(game.player).unwrap();
        player.inventory.push(item);
    }
    Ok(true)
}

/// Attacks whatever occupies the tile the player is facing. Returns `false`
/// (no turn consumed) if nothing is there to fight.
fn attack(game: &mut Game) -> Result<bool> {
    Ok(strike_facing(game))
}

/// Strikes the occupant of the tile the player is currently facing, if any.
/// Shared by explicit `Attack` presses and bump-to-attack movement.
fn strike_facing(game: &mut Game) -> bool {
    let floor = &mut game.floors[game.current_floor];
    let (dx, dy) = game.facing;
    let (x, y) = match floor.entities.get(game.player) {
        Some(p) => (p.x + dx, p.y + dy),
        None => return false,
    };
    let Some(target_id) = floor.at(x, y).occupant else {
        return false;
    };
    if target_id == game.player {
        return false;
    }
    if let Some(target) = floor.entities.get_mut(target_id) {
        if let Some(tc) = &mut target.combat {
            combat_do(tc);
            return true;
        }
    }
    false
}

fn combat_do(target: &mut crate::entity::Combat) {
    target.hp -= 1;
}

fn place_torch(game: &mut Game) -> Result<bool> {
    if game.torches <= 0 {
        return Ok(false);
    }
    let (dx, dy) = game.facing;
    let floor = &mut game.floors[game.current_floor];
    let (x, y) = {
        let p = floor.entities.get(game.player).ok_or(Error::OutOfBounds)?;
        (p.x + dx, p.y + dy)
    };

    let torch = crate::entity::Entity {
        kind: EntityKind::Torch,
        capabilities: Capabilities::LIGHT_SOURCE | Capabilities::FLICKER,
        x,
        y,
        color: crate::color::Color::new(0xe2, 0x58, 0x22),
        glyph: 't',
        blocks_light: false,
        combat: None,
        charge: None,
        brightness: 1.0,
        light_color: crate::color::Color::new(0xe2, 0x58, 0x22),
        inventory: Vec::new(),
        alive: true,
    };
    match floor.add_entity(torch) {
        Ok(_) => {
            game.torches -= 1;
            Ok(true)
        }
        Err(Error::Occupied) | Err(Error::OutOfBounds) | Err(Error::Blocked) => Ok(false),
        Err(e) => Err(e),
    }
}

/// The shared post-action sequence: clear lights, update every entity
/// (including the player's own lantern bookkeeping), relight, check for
/// death or victory.
fn run_turn(game: &mut Game) {
    let floor = &mut game.floors[game.current_floor];
    floor.clear_lights();

    update_player_light(game);
    update_entities(game);

    lighting::relight(&mut game.floors[game.current_floor], |_| true);

    let floor = &game.floors[game.current_floor];
    if let Some(e) = floor.entities.get(game.player) {
        if e.is_dead() {
            game.outcome = Some(GameOutcome::Death);
        }
    }
}

fn update_player_light(game: &mut Game) {
    if game.lantern_on {
        if game.fuel > 0 {
            game.fuel -= 1;
        } else {
            game.lantern_on = false;
        }
    }
    let brightness = if game.lantern_on && game.fuel > 0 { 0.5 } else { 0.1 };
    if let Some(p) = game.floors[game.current_floor].entities.get_mut(game.player) {
        p.brightness = brightness;
        p.light_color = p.color;
    }
}

fn update_entities(game: &mut Game) {
    let floor_idx = game.current_floor;
    let ids: Vec<EntityId> = game.floors[floor_idx].entities.ids();
    let player_pos = game
        .floors[floor_idx]
        .entities
        .get(game.player)
        .map(|e| (e.x, e.y))
        .unwrap_or((0, 0));

    for id in ids {
        if id == game.player {
            continue;
        }
        update_entity(&mut game.floors[floor_idx], id, player_pos, &mut game.rng);
    }

    // Mark-then-sweep: collect dead combat entities, then remove, so no
    // iteration is invalidated mid-update.
    let dead: Vec<EntityId> = game.floors[floor_idx]
        .entities
        .iter()
        .filter(|(id, e)| *id != game.player && e.is_dead())
        .map(|(id, _)| id)
        .collect();
    for id in dead {
        game.floors[floor_idx].remove_entity(id);
    }
}

fn update_entity(
    floor: &mut crate::world::Floor,
    id: EntityId,
    player_pos: (i32, i32),
    rng: &mut crate::rng::GameRng,
) {
    let kind = match floor.entities.get(id) {
        Some(e) => e.kind,
        None => return,
    };
    match kind {
        EntityKind::Player | EntityKind::Torch => {}
        EntityKind::Snake => update_snake(floor, id, player_pos, rng),
        EntityKind::Floater => update_floater(floor, id, player_pos, rng),
    }
}

/// Chance per idle axis (one already aligned with the player) that the snake
/// wanders off it instead of holding still, so a chase doesn't look like a
/// perfectly straight beeline.
const SNAKE_WANDER_CHANCE: f32 = 0.3;

fn update_snake(
    floor: &mut crate::world::Floor,
    id: EntityId,
    player_pos: (i32, i32),
    rng: &mut crate::rng::GameRng,
) {
    let (sx, sy) = match floor.entities.get(id) {
        Some(e) => (e.x, e.y),
        None => return,
    };
    let mut dx = (player_pos.0 - sx).signum();
    let mut dy = (player_pos.1 - sy).signum();
    if dx == 0 && dy == 0 {
        return;
    }
    if dx == 0 && rng.gen_ratio(SNAKE_WANDER_CHANCE) {
        dx = rng.gen_range(-1..2);
    }
    if dy == 0 && rng.gen_ratio(SNAKE_WANDER_CHANCE) {
        dy = rng.gen_range(-1..2);
    }

    let moved = floor.move_entity_rel(id, dx, dy).is_ok();
    if moved {
        if let Some(e) = floor.entities.get(id) {
            let (nx, ny) = (e.x, e.y);
            if floor.at(nx, ny).light > SNAKE_FLEE_LIGHT {
                let _ = floor.move_entity_rel(id, -dx, -dy);
            }
        }
    }

    maybe_bite_player(floor, id, player_pos);
}

/// Lock-on noise added to the floater's remembered sighting of the player,
/// so pursuit after losing line of sight isn't pixel-perfect.
const FLOATER_LOCKON_JITTER: std::ops::Range<i32> = -1..2;

fn update_floater(
    floor: &mut crate::world::Floor,
    id: EntityId,
    player_pos: (i32, i32),
    rng: &mut crate::rng::GameRng,
) {
    let (fx, fy) = match floor.entities.get(id) {
        Some(e) => (e.x, e.y),
        None => return,
    };

    let has_los = {
        let mut seen = false;
        shadowcast::cast(
            &*floor,
            fx,
            fy,
            20,
            crate::world::MAP_COLS,
            crate::world::MAP_ROWS,
            |x, y| {
                if (x, y) == player_pos {
                    seen = true;
                }
            },
        );
        seen
    };

    if has_los {
        let jx = rng.gen_range(FLOATER_LOCKON_JITTER);
        let jy = rng.gen_range(FLOATER_LOCKON_JITTER);
        if let Some(e) = floor.entities.get_mut(id) {
            if let Some(charge) = &mut e.charge {
                charge.last_seen = Some((player_pos.0 + jx, player_pos.1 + jy));
                charge.rounds_remaining = 5;
            }
        }
    }

    let target = floor
        .entities
        .get_mut(id)
        .and_then(|e| e.charge.as_mut())
        .and_then(|c| {
            if c.rounds_remaining > 0 {
                c.rounds_remaining -= 1;
                c.last_seen
            } else {
                None
            }
        });

    if let Some((tx, ty)) = target {
        let dx = (tx - fx).signum();
        let dy = (ty - fy).signum();
        if dx != 0 || dy != 0 {
            let _ = floor.move_entity_rel(id, dx, dy);
        }
    }

    maybe_bite_player(floor, id, player_pos);
}

/// Replaces the original's instant-death easter egg with an ordinary
/// combat hit, consistent with the hp-based combat model used everywhere
/// else (see DESIGN.md).
fn maybe_bite_player(floor: &mut crate::world::Floor, id: EntityId, player_pos: (i32, i32)) {
    let (x, y) = match floor.entities.get(id) {
        Some(e) => (e.x, e.y),
        None => return,
    };
    let adjacent = (x - player_pos.0).abs() <= 1 && (y - player_pos.1).abs() <= 1;
    if !adjacent {
        return;
    }
    if let Some(occupant_id) = floor.at(player_pos.0, player_pos.1).occupant {
        if let Some(player) = floor.entities.get_mut(occupant_id) {
            if let Some(combat) = &mut player.combat {
                combat.hp -= 1;
            }
        }
    }
}
