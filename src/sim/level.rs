//! Level layout and generation
//!
//! Each scene index maps to a deterministic layout derived from the run seed:
//! launch pad on the left, landing pad on the right, obstacles in between.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::outcome::Category;
use crate::consts::*;

/// Axis-aligned box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    pub fn from_center(center: Vec2, half_size: Vec2) -> Self {
        Self::new(center - half_size, center + half_size)
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    pub fn closest_point(&self, p: Vec2) -> Vec2 {
        p.clamp(self.min, self.max)
    }

    pub fn overlaps(&self, other: &Rect) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }
}

/// A collidable entity in the level
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collider {
    pub id: u32,
    /// Free-form category tag, resolved when a contact happens
    pub tag: String,
    pub rect: Rect,
    /// Solid colliders push the craft out; others are triggers
    pub solid: bool,
}

impl Collider {
    pub fn category(&self) -> Category {
        Category::from_tag(&self.tag)
    }
}

/// Layout of one scene
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Level {
    pub index: usize,
    pub size: Vec2,
    /// Where the craft starts (resting on the launch pad)
    pub spawn: Vec2,
    /// Colliders sorted by id
    pub colliders: Vec<Collider>,
    next_id: u32,
}

impl Level {
    /// Empty arena with walls, floor and ceiling
    pub fn empty(index: usize, size: Vec2) -> Self {
        let mut level = Self {
            index,
            size,
            spawn: Vec2::new(size.x * 0.5, CRAFT_RADIUS),
            colliders: Vec::new(),
            next_id: 1,
        };
        let t = 1.0;
        level.add("Untagged", Rect::new(Vec2::new(-t, -t), Vec2::new(size.x + t, 0.0)), true);
        level.add("Untagged", Rect::new(Vec2::new(-t, size.y), Vec2::new(size.x + t, size.y + t)), true);
        level.add("Untagged", Rect::new(Vec2::new(-t, 0.0), Vec2::new(0.0, size.y)), true);
        level.add("Untagged", Rect::new(Vec2::new(size.x, 0.0), Vec2::new(size.x + t, size.y)), true);
        level
    }

    /// Add a collider and return its id
    pub fn add(&mut self, tag: &str, rect: Rect, solid: bool) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        self.colliders.push(Collider {
            id,
            tag: tag.to_string(),
            rect,
            solid,
        });
        id
    }

    pub fn get(&self, id: u32) -> Option<&Collider> {
        self.colliders.iter().find(|c| c.id == id)
    }

    /// Remove a collider (collected pickups)
    pub fn remove(&mut self, id: u32) -> Option<Collider> {
        let pos = self.colliders.iter().position(|c| c.id == id)?;
        Some(self.colliders.remove(pos))
    }

    /// Colliders of a category
    pub fn with_category(&self, category: Category) -> impl Iterator<Item = &Collider> {
        self.colliders.iter().filter(move |c| c.category() == category)
    }

    /// Generate the level for a scene index
    pub fn generate(seed: u64, index: usize) -> Self {
        // Deterministic per run and per scene
        let level_seed = (index as u64)
            .wrapping_mul(2654435761)
            .wrapping_add(seed);
        let mut rng = Pcg32::seed_from_u64(level_seed);

        let size = Vec2::new(ARENA_WIDTH, ARENA_HEIGHT);
        let mut level = Self::empty(index, size);
        // Difficulty plateaus after a handful of levels
        let difficulty = index.min(6) as f32;

        // Launch pad
        let launch = Rect::new(Vec2::new(2.0, 0.0), Vec2::new(6.0, 0.5));
        level.add("Friendly", launch, true);
        level.spawn = Vec2::new(launch.center().x, launch.max.y + CRAFT_RADIUS);

        // Landing pad on a pillar, higher on later levels
        let pad_height = rng.random_range(0.0..=(1.0 + difficulty * 1.5).min(10.0));
        let pad_left = size.x - 7.0;
        if pad_height > 0.5 {
            level.add(
                "Untagged",
                Rect::new(Vec2::new(pad_left + 0.5, 0.0), Vec2::new(pad_left + 3.5, pad_height)),
                true,
            );
        }
        let landing = Rect::new(
            Vec2::new(pad_left, pad_height),
            Vec2::new(pad_left + 4.0, pad_height + 0.5),
        );
        level.add("Finish", landing, true);

        // Obstacles between the pads
        for _ in 0..1 + index.min(6) {
            let half = Vec2::new(
                rng.random_range(0.5..1.5 + difficulty * 0.2),
                rng.random_range(1.0..2.5 + difficulty * 0.4),
            );
            let center = Vec2::new(
                rng.random_range(9.0 + half.x..pad_left - 2.0 - half.x),
                rng.random_range(half.y..size.y - half.y - 3.0),
            );
            level.add("Obstacle", Rect::from_center(center, half), true);
        }

        // Fuel cells, kept out of solid geometry when possible
        for _ in 0..2 {
            let mut cell = Rect::from_center(Vec2::ZERO, Vec2::splat(0.4));
            for _ in 0..8 {
                let center = Vec2::new(
                    rng.random_range(8.0..pad_left - 1.0),
                    rng.random_range(4.0..size.y - 3.0),
                );
                cell = Rect::from_center(center, Vec2::splat(0.4));
                if !level.colliders.iter().any(|c| c.solid && c.rect.overlaps(&cell)) {
                    break;
                }
            }
            level.add("Fuel", cell, false);
        }

        log::debug!(
            "Level {} generated: {} colliders, pad at {:.1}",
            index,
            level.colliders.len(),
            pad_height
        );
        level
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_helpers() {
        let rect = Rect::new(Vec2::new(2.0, 2.0), Vec2::new(0.0, 0.0));
        assert_eq!(rect.min, Vec2::ZERO);
        assert_eq!(rect.closest_point(Vec2::new(5.0, 1.0)), Vec2::new(2.0, 1.0));
        assert!(rect.overlaps(&Rect::new(Vec2::ONE, Vec2::splat(3.0))));
        assert!(!rect.overlaps(&Rect::new(Vec2::splat(2.5), Vec2::splat(3.0))));
    }

    #[test]
    fn test_generation_is_deterministic() {
        let a = Level::generate(1234, 3);
        let b = Level::generate(1234, 3);
        assert_eq!(a.colliders.len(), b.colliders.len());
        for (ca, cb) in a.colliders.iter().zip(&b.colliders) {
            assert_eq!(ca.id, cb.id);
            assert_eq!(ca.tag, cb.tag);
            assert_eq!(ca.rect, cb.rect);
        }
    }

    #[test]
    fn test_generated_level_has_pads() {
        for index in 0..SCENE_COUNT {
            let level = Level::generate(99, index);
            assert_eq!(level.with_category(Category::Finish).count(), 1);
            assert_eq!(level.with_category(Category::Friendly).count(), 1);
            assert_eq!(level.with_category(Category::Pickup).count(), 2);
            assert!(level.with_category(Category::Hazard).count() >= 4);

            // Spawn sits clear of every solid collider
            let spawn = level.spawn;
            for c in level.colliders.iter().filter(|c| c.solid) {
                let d = (c.rect.closest_point(spawn) - spawn).length();
                assert!(d >= CRAFT_RADIUS, "spawn overlaps {} in level {}", c.tag, index);
            }
        }
    }

    #[test]
    fn test_remove_collider() {
        let mut level = Level::generate(5, 0);
        let fuel = level
            .with_category(Category::Pickup)
            .map(|c| c.id)
            .next()
            .expect("level has fuel");
        assert!(level.remove(fuel).is_some());
        assert!(level.get(fuel).is_none());
        assert!(level.remove(fuel).is_none());
    }
}
