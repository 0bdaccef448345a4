// src/entity.rs
//! Entities as data: a stable `index + generation` handle into a per-floor
//! store, generalizing the `SparseSet` + `free_list` pool from the old
//! `Scene` type to reuse slots safely once an entity (not a GPU component) can
//! actually be despawned mid-update.

use std::collections::VecDeque;

use crate::color::Color;

bitflags::bitflags! {
    #[derive(Clone, Copy, PartialEq, Eq, Debug)]
    pub struct Capabilities: u32 {
        const COMBAT       = 1 << 0;
        const FLICKER      = 1 << 1;
        const LIGHT_SOURCE = 1 << 2;
        const CHARGE       = 1 << 3;
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct EntityId {
    index: u32,
    generation: u32,
}

impl EntityId {
    pub fn index(self) -> usize {
        self.index as usize
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum EntityKind {
    Player,
    Snake,
    Floater,
    Torch,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Combat {
    pub hp: i32,
    pub hp_max: i32,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Charge {
    pub last_seen: Option<(i32, i32)>,
    pub rounds_remaining: u32,
}

#[derive(Clone, Debug)]
pub struct Item {
    pub name: String,
    pub glyph: char,
    pub color: Color,
}

#[derive(Clone, Debug)]
pub struct Entity {
    pub kind: EntityKind,
    pub capabilities: Capabilities,
    pub x: i32,
    pub y: i32,
    pub color: Color,
    pub glyph: char,
    pub blocks_light: bool,
    pub combat: Option<Combat>,
    pub charge: Option<Charge>,
    /// Brightness this entity deposits if it has `LIGHT_SOURCE`.
    pub brightness: f32,
    pub light_color: Color,
    pub inventory: Vec<Item>,
    pub alive: bool,
}

impl Entity {
    pub fn is_dead(&self) -> bool {
        match self.combat {
            Some(c) => c.hp <= 0,
            None => false,
        }
    }
}

struct Slot {
    generation: u32,
    value: Option<Entity>,
}

/// Owned, generation-checked entity pool for one floor.
///
/// Slot index is reused via the free list and says nothing about when an
/// entity was spawned, so insertion order is tracked separately in `order`
/// and is what `iter`/`ids` walk.
pub struct EntityStore {
    slots: Vec<Slot>,
    free: VecDeque<u32>,
    order: Vec<EntityId>,
}

impl EntityStore {
    pub fn new() -> Self {
        EntityStore {
            slots: Vec::new(),
            free: VecDeque::new(),
            order: Vec::new(),
        }
    }

    pub fn spawn(&mut self, entity: Entity) -> EntityId {
        let id = if let Some(index) = self.free.pop_front() {
            let slot = &mut self.slots[index as usize];
            slot.generation += 1;
            slot.value = Some(entity);
            EntityId {
                index,
                generation: slot.generation,
            }
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                value: Some(entity),
            });
            EntityId {
                index,
                generation: 0,
            }
        };
        self.order.push(id);
        id
    }

    pub fn despawn(&mut self, id: EntityId) -> Option<Entity> {
        let slot = self.slots.get_mut(id.index())?;
        if slot.generation != id.generation {
            return None;
        }
        let taken = slot.value.take();
        if taken.is_some() {
            self.free.push_back(id.index);
            self.order.retain(|&o| o != id);
        }
        taken
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        let slot = self.slots.get(id.index())?;
        if slot.generation != id.generation {
            return None;
        }
        slot.value.as_ref()
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        let slot = self.slots.get_mut(id.index())?;
        if slot.generation != id.generation {
            return None;
        }
        slot.value.as_mut()
    }

    /// Walks entities in insertion order (oldest spawn first), not slot
    /// index order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &Entity)> {
        self.order.iter().filter_map(move |&id| self.get(id).map(|e| (id, e)))
    }

    pub fn ids(&self) -> Vec<EntityId> {
        self.order.clone()
    }
}

impl Default for EntityStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(kind: EntityKind) -> Entity {
        Entity {
            kind,
            capabilities: Capabilities::empty(),
            x: 0,
            y: 0,
            color: Color::default(),
            glyph: '@',
            blocks_light: false,
            combat: None,
            charge: None,
            brightness: 0.0,
            light_color: Color::default(),
            inventory: Vec::new(),
            alive: true,
        }
    }

    #[test]
    fn spawn_despawn_reuses_slot_with_new_generation() {
        let mut store = EntityStore::new();
        let a = store.spawn(sample(EntityKind::Snake));
        store.despawn(a);
        let b = store.spawn(sample(EntityKind::Snake));
        assert_eq!(a.index(), b.index());
        assert!(store.get(a).is_none(), "stale handle must not resolve");
        assert!(store.get(b).is_some());
    }

    #[test]
    fn despawn_is_idempotent_on_stale_handle() {
        let mut store = EntityStore::new();
        let a = store.spawn(sample(EntityKind::Player));
        store.despawn(a);
        assert!(store.despawn(a).is_none());
    }

    #[test]
    fn iteration_follows_insertion_order_across_a_despawn_respawn() {
        let mut store = EntityStore::new();
        let a = store.spawn(sample(EntityKind::Snake));
        let b = store.spawn(sample(EntityKind::Floater));
        store.despawn(a);
        let c = store.spawn(sample(EntityKind::Torch));
        // c reuses a's freed slot index, but was inserted after b.
        assert_eq!(c.index(), a.index());
        assert_eq!(store.ids(), vec![b, c]);
    }
}
