//! Axis-aligned bounding boxes for collision checking.

use labdeck_core::deck::{SLOT_SIZE_MM, slot_position};

/// An axis-aligned box anchored at a slot, spanning the full stack height
/// (labware plus any module offset underneath).
#[derive(Debug, Clone, PartialEq)]
pub struct CollisionBox {
    pub slot: u32,
    pub role: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub width: f64,
    pub height: f64,
    pub depth: f64,
}

impl CollisionBox {
    /// Box for a stack of `stack_height_mm` sitting in `slot`. `None` for an
    /// invalid slot number.
    pub fn for_slot(
        slot: u32,
        role: &str,
        footprint_x_mm: f64,
        footprint_y_mm: f64,
        stack_height_mm: f64,
    ) -> Option<Self> {
        let (cx, cy) = slot_position(slot)?;
        Some(Self {
            slot,
            role: role.to_string(),
            x: cx - SLOT_SIZE_MM.0 / 2.0,
            y: cy - SLOT_SIZE_MM.1 / 2.0,
            z: 0.0,
            width: footprint_x_mm,
            height: footprint_y_mm,
            depth: stack_height_mm,
        })
    }

    pub fn top_mm(&self) -> f64 {
        self.z + self.depth
    }
}

/// Whether two boxes overlap in all three axes. Commutative.
pub fn box_collision(a: &CollisionBox, b: &CollisionBox) -> bool {
    !(a.x + a.width <= b.x
        || b.x + b.width <= a.x
        || a.y + a.height <= b.y
        || b.y + b.height <= a.y
        || a.z + a.depth <= b.z
        || b.z + b.depth <= a.z)
}

/// Shortest surface-to-surface distance between two boxes; zero when they
/// touch or overlap.
pub fn box_distance(a: &CollisionBox, b: &CollisionBox) -> f64 {
    let dx = (a.x - (b.x + b.width)).max(b.x - (a.x + a.width)).max(0.0);
    let dy = (a.y - (b.y + b.height)).max(b.y - (a.y + a.height)).max(0.0);
    let dz = (a.z - (b.z + b.depth)).max(b.z - (a.z + a.depth)).max(0.0);
    (dx * dx + dy * dy + dz * dz).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boxed(slot: u32, depth: f64) -> CollisionBox {
        CollisionBox::for_slot(slot, "role", SLOT_SIZE_MM.0, SLOT_SIZE_MM.1, depth).unwrap()
    }

    #[test]
    fn collision_is_commutative() {
        let slots: Vec<CollisionBox> = (1..=11).map(|s| boxed(s, 50.0)).collect();
        for a in &slots {
            for b in &slots {
                assert_eq!(box_collision(a, b), box_collision(b, a));
            }
        }
    }

    #[test]
    fn a_box_collides_with_itself() {
        let a = boxed(5, 20.0);
        assert!(box_collision(&a, &a));
    }

    #[test]
    fn separate_slots_do_not_collide() {
        // Slots 1 and 3 sit two columns apart.
        let a = boxed(1, 100.0);
        let b = boxed(3, 100.0);
        assert!(!box_collision(&a, &b));
        assert!(box_distance(&a, &b) > 0.0);
    }

    #[test]
    fn adjacent_slot_gap_matches_layout() {
        // Column pitch is 133 mm; slot footprint is 127.76 mm, leaving a
        // 5.24 mm gap between neighbors.
        let a = boxed(1, 20.0);
        let b = boxed(2, 20.0);
        assert!(!box_collision(&a, &b));
        let gap = box_distance(&a, &b);
        assert!((gap - 5.24).abs() < 0.01, "gap was {gap}");
    }

    #[test]
    fn oversized_footprint_overlaps_neighbor() {
        let a = CollisionBox::for_slot(1, "wide", 200.0, 85.48, 20.0).unwrap();
        let b = boxed(2, 20.0);
        assert!(box_collision(&a, &b));
        assert_eq!(box_distance(&a, &b), 0.0);
    }
}
