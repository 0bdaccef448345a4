// src/world.rs
//! The tile grid and the floor that owns it. One `Floor` owns its tiles and
//! its entity pool; entities hold no owning references back, only `EntityId`
//! handles (see `entity.rs`).

use crate::color::Color;
use crate::entity::{Entity, EntityId, EntityStore, Item};
use crate::error::{Error, Result};

pub const MAP_ROWS: i32 = 100;
pub const MAP_COLS: i32 = 100;
pub const TOTAL_FLOORS: usize = 5;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum TileRole {
    #[default]
    Floor,
    Upstair,
    Downstair,
    None,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SeenAs {
    pub glyph: char,
    pub color: Color,
    pub light: f32,
    /// True if this memory is of an occupant/item glyph rather than bare
    /// terrain. Only controls how the remembered tile is rendered (overlay
    /// glyph/color vs. dimmed ambient terrain); the update-gating rule for
    /// *whether* to overwrite a memory is separate and keys off the tile's
    /// own floor/non-floor kind, not this flag.
    pub is_actor: bool,
}

impl SeenAs {
    pub fn blank() -> Self {
        SeenAs {
            glyph: ' ',
            color: Color::BLACK,
            light: 0.0,
            is_actor: false,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Tile {
    pub glyph: char,
    pub ambient_color: Color,
    pub blocks: bool,
    pub role: TileRole,

    pub light: f32,
    pub lighting: Color,

    pub seen: bool,
    pub seen_as: SeenAs,

    pub occupant: Option<EntityId>,
    pub items: Vec<Item>,
}

impl Tile {
    fn sentinel() -> Self {
        Tile {
            glyph: ' ',
            ambient_color: Color::BLACK,
            blocks: false,
            role: TileRole::None,
            light: 0.0,
            lighting: Color::BLACK,
            seen: false,
            seen_as: SeenAs::blank(),
            occupant: None,
            items: Vec::new(),
        }
    }

    pub fn floor(glyph: char, ambient_color: Color, blocks: bool) -> Self {
        Tile {
            glyph,
            ambient_color,
            blocks,
            role: TileRole::Floor,
            light: 0.0,
            lighting: Color::BLACK,
            seen: false,
            seen_as: SeenAs::blank(),
            occupant: None,
            items: Vec::new(),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct StairLink {
    pub floor: usize,
    pub x: i32,
    pub y: i32,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FloorKind {
    Cave,
}

pub struct Floor {
    pub kind: FloorKind,
    pub generated: bool,
    pub tiles: Vec<Tile>,
    pub entities: EntityStore,
    pub upstair: Option<StairLink>,
    pub downstair: Option<StairLink>,
}

impl Floor {
    pub fn new(kind: FloorKind) -> Self {
        Floor {
            kind,
            generated: false,
            tiles: Vec::new(),
            entities: EntityStore::new(),
            upstair: None,
            downstair: None,
        }
    }

    pub fn in_bounds(x: i32, y: i32) -> bool {
        x >= 0 && x < MAP_COLS && y >= 0 && y < MAP_ROWS
    }

    fn idx(x: i32, y: i32) -> usize {
        (y * MAP_COLS + x) as usize
    }

    /// Matches `floor_map_at`: out-of-bounds reads return a blank sentinel
    /// tile rather than erroring.
    pub fn at(&self, x: i32, y: i32) -> Tile {
        if Self::in_bounds(x, y) {
            self.tiles[Self::idx(x, y)].clone()
        } else {
            Tile::sentinel()
        }
    }

    pub fn at_ref(&self, x: i32, y: i32) -> Option<&Tile> {
        if Self::in_bounds(x, y) {
            Some(&self.tiles[Self::idx(x, y)])
        } else {
            None
        }
    }

    pub fn at_mut(&mut self, x: i32, y: i32) -> Option<&mut Tile> {
        if Self::in_bounds(x, y) {
            Some(&mut self.tiles[Self::idx(x, y)])
        } else {
            None
        }
    }

    pub fn clear_lights(&mut self) {
        for tile in &mut self.tiles {
            tile.light = 0.0;
            tile.lighting = Color::BLACK;
        }
    }

    /// `tile_blocks_light`: a tile blocks light if it's a wall, or if it has
    /// an occupant that itself blocks light.
    pub fn tile_blocks_light(&self, x: i32, y: i32) -> bool {
        let Some(tile) = self.at_ref(x, y) else {
            return true;
        };
        if tile.blocks {
            return true;
        }
        match tile.occupant {
            Some(id) => self.entities.get(id).map(|e| e.blocks_light).unwrap_or(false),
            None => false,
        }
    }

    pub fn add_entity(&mut self, entity: Entity) -> Result<EntityId> {
        let (x, y) = (entity.x, entity.y);
        if !Self::in_bounds(x, y) {
            return Err(Error::OutOfBounds);
        }
        if self.at_ref(x, y).and_then(|t| t.occupant).is_some() {
            return Err(Error::Occupied);
        }
        let id = self.entities.spawn(entity);
        self.at_mut(x, y).unwrap().occupant = Some(id);
        Ok(id)
    }

    pub fn remove_entity(&mut self, id: EntityId) -> Option<Entity> {
        if let Some(e) = self.entities.get(id) {
            let (x, y) = (e.x, e.y);
            if let Some(tile) = self.at_mut(x, y) {
                if tile.occupant == Some(id) {
                    tile.occupant = None;
                }
            }
        }
        self.entities.despawn(id)
    }

    /// Moves the entity to an adjacent or arbitrary tile within the same
    /// floor, failing with `Blocked`/`Occupied`/`OutOfBounds` and leaving
    /// everything untouched on failure.
    pub fn move_entity(&mut self, id: EntityId, x: i32, y: i32) -> Result<()> {
        if !Self::in_bounds(x, y) {
            return Err(Error::OutOfBounds);
        }
        let dest = self.at_ref(x, y).ok_or(Error::OutOfBounds)?;
        if dest.blocks {
            return Err(Error::Blocked);
        }
        if dest.occupant.is_some() {
            return Err(Error::Occupied);
        }

        let (old_x, old_y) = {
            let e = self.entities.get(id).ok_or(Error::OutOfBounds)?;
            (e.x, e.y)
        };

        if let Some(old_tile) = self.at_mut(old_x, old_y) {
            old_tile.occupant = None;
        }
        self.at_mut(x, y).unwrap().occupant = Some(id);
        let e = self.entities.get_mut(id).unwrap();
        e.x = x;
        e.y = y;
        Ok(())
    }

    pub fn move_entity_rel(&mut self, id: EntityId, dx: i32, dy: i32) -> Result<()> {
        let (x, y) = {
            let e = self.entities.get(id).ok_or(Error::OutOfBounds)?;
            (e.x + dx, e.y + dy)
        };
        self.move_entity(id, x, y)
    }
}
