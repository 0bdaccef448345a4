// src/input.rs
//! Key → action binding table. Grounded on `input_keymap[]`: a flat
//! char-to-function table, generalized the way the teacher's
//! `InputManager` generalizes physical inputs to `ActionId`s — here the
//! "physical input" is just a terminal key char, so one match table is
//! enough; no axis/deadzone machinery is needed for a turn-based grid game.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Action {
    MoveW,
    MoveS,
    MoveN,
    MoveE,
    MoveNW,
    MoveNE,
    MoveSW,
    MoveSE,
    Attack,
    PlaceTorch,
    ToggleLantern,
    PickUp,
    Descend,
    Ascend,
    DebugRefuel,
    Quit,
}

pub fn action_for_key(key: char) -> Option<Action> {
    match key {
        'h' => Some(Action::MoveW),
        'j' => Some(Action::MoveS),
        'k' => Some(Action::MoveN),
        'l' => Some(Action::MoveE),
        'y' => Some(Action::MoveNW),
        'u' => Some(Action::MoveNE),
        'b' => Some(Action::MoveSW),
        'n' => Some(Action::MoveSE),
        'f' => Some(Action::Attack),
        't' => Some(Action::PlaceTorch),
        'e' => Some(Action::ToggleLantern),
        ',' => Some(Action::PickUp),
        '>' => Some(Action::Descend),
        '<' => Some(Action::Ascend),
        'E' => Some(Action::DebugRefuel),
        'Q' => Some(Action::Quit),
        _ => None,
    }
}

/// `(dx, dy)` for the eight movement actions; `None` for non-movement ones.
pub fn movement_delta(action: Action) -> Option<(i32, i32)> {
    match action {
        Action::MoveW => Some((-1, 0)),
        Action::MoveE => Some((1, 0)),
        Action::MoveN => Some((0, -1)),
        Action::MoveS => Some((0, 1)),
        Action::MoveNW => Some((-1, -1)),
        Action::MoveNE => Some((1, -1)),
        Action::MoveSW => Some((-1, 1)),
        Action::MoveSE => Some((1, 1)),
        _ => None,
    }
}
