//! Static deck geometry for the reference 11-slot layout.
//!
//! Slot numbering, center positions, the adjacency graph, and per-mount
//! pipette reach are fixed properties of the deck hardware; the solver and
//! validator both read them from here.

use serde::{Deserialize, Serialize};

use crate::capability::Mount;

/// Number of labware slots on the deck.
pub const SLOT_COUNT: u32 = 11;

/// Deck envelope in millimeters.
pub const DECK_SIZE: Dimensions = Dimensions {
    x_mm: 365.0,
    y_mm: 273.0,
    z_mm: 150.0,
};

/// Footprint of a single slot in millimeters (x, y).
pub const SLOT_SIZE_MM: (f64, f64) = (127.76, 85.48);

/// Physical dimensions in millimeters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub x_mm: f64,
    pub y_mm: f64,
    pub z_mm: f64,
}

impl Dimensions {
    pub fn new(x_mm: f64, y_mm: f64, z_mm: f64) -> Self {
        Self { x_mm, y_mm, z_mm }
    }
}

/// Whether `slot` is a valid deck slot number.
pub fn valid_slot(slot: u32) -> bool {
    (1..=SLOT_COUNT).contains(&slot)
}

/// Center position of a slot in deck coordinates (mm).
pub fn slot_position(slot: u32) -> Option<(f64, f64)> {
    let pos = match slot {
        1 => (13.3, 181.3),
        2 => (146.3, 181.3),
        3 => (279.3, 181.3),
        4 => (13.3, 90.3),
        5 => (146.3, 90.3),
        6 => (279.3, 90.3),
        7 => (13.3, -0.7),
        8 => (146.3, -0.7),
        9 => (279.3, -0.7),
        10 => (13.3, -91.7),
        11 => (146.3, -91.7),
        _ => return None,
    };
    Some(pos)
}

/// Slots sharing an edge with `slot` on the deck grid.
pub fn adjacent_slots(slot: u32) -> &'static [u32] {
    match slot {
        1 => &[2, 4],
        2 => &[1, 3, 5],
        3 => &[2, 6],
        4 => &[1, 5, 7],
        5 => &[2, 4, 6, 8],
        6 => &[3, 5, 9],
        7 => &[4, 8, 10],
        8 => &[5, 7, 9, 11],
        9 => &[6, 8],
        10 => &[7, 11],
        11 => &[8, 10],
        _ => &[],
    }
}

/// Slots a pipette on the given mount can reach.
pub fn reach_slots(mount: Mount) -> &'static [u32] {
    match mount {
        Mount::Left => &[1, 2, 3, 4, 5, 6],
        Mount::Right => &[5, 6, 7, 8, 9, 10, 11],
    }
}

/// Whether a pipette on `mount` can reach `slot`.
pub fn reachable(mount: Mount, slot: u32) -> bool {
    reach_slots(mount).contains(&slot)
}

/// Straight-line distance between two slot centers in millimeters.
pub fn slot_distance_mm(a: u32, b: u32) -> Option<f64> {
    let (ax, ay) = slot_position(a)?;
    let (bx, by) = slot_position(b)?;
    Some(((ax - bx).powi(2) + (ay - by).powi(2)).sqrt())
}
