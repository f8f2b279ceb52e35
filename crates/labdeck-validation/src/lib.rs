//! labdeck-validation — post-hoc checks over a completed binding map.
//!
//! Seven independent, order-insensitive checks (collision, accessibility,
//! volume, temperature, contamination, capacity, compatibility) produce
//! severity-tagged findings. Findings are reported, never thrown; the only
//! mutation is the aggregate collision risk written onto the binding map's
//! execution plan.

pub mod conflict;
pub mod geometry;
pub mod validator;

pub use conflict::{conflict_zones, overall_risk};
pub use geometry::{CollisionBox, box_collision, box_distance};
pub use validator::DeckValidator;
