//! Minimal rigid body step
//!
//! Integrates the craft under gravity and accumulated impulses, resolves
//! penetration against solid colliders and reports contact-enter events.
//! A collider that stays in contact does not report again until the craft
//! separates from it.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::craft::Craft;
use super::level::{Collider, Level};
use super::router::ContactEvent;
use crate::consts::*;

/// Extra distance at which a resting craft still counts as touching
pub const CONTACT_SKIN: f32 = 0.01;
/// Fraction of tangential speed removed per solid contact
pub const CONTACT_FRICTION: f32 = 0.2;

/// Physics world state for one craft
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Physics {
    pub gravity: f32,
    pub collisions_enabled: bool,
    /// Colliders in contact after the last step, sorted by id
    touching: Vec<u32>,
}

impl Default for Physics {
    fn default() -> Self {
        Self::new(GRAVITY)
    }
}

impl Physics {
    pub fn new(gravity: f32) -> Self {
        Self {
            gravity,
            collisions_enabled: true,
            touching: Vec::new(),
        }
    }

    pub fn touching(&self) -> &[u32] {
        &self.touching
    }

    /// Forget previous contacts, treating current overlaps as already entered
    pub fn reset(&mut self, craft: &Craft, level: &Level) {
        self.touching = level
            .colliders
            .iter()
            .filter(|c| penetration(craft, c).is_some())
            .map(|c| c.id)
            .collect();
    }

    /// Advance one fixed tick. Returns contacts that began this tick.
    pub fn step(&mut self, craft: &mut Craft, level: &Level, dt: f32) -> Vec<ContactEvent> {
        let impulse = std::mem::take(&mut craft.pending_impulse);
        if craft.kinematic {
            return Vec::new();
        }

        // Semi-implicit Euler
        craft.vel += impulse / craft.mass + Vec2::new(0.0, -self.gravity) * dt;
        craft.pos += craft.vel * dt;

        if craft.rotation_locked {
            craft.angular_vel = 0.0;
        } else {
            craft.rotate(craft.angular_vel * dt);
            craft.angular_vel *= (1.0 - ANGULAR_DAMPING * dt).max(0.0);
        }

        if !self.collisions_enabled {
            self.touching.clear();
            return Vec::new();
        }

        let mut contacts = Vec::new();
        let mut touching = Vec::with_capacity(self.touching.len());
        for collider in &level.colliders {
            let Some((normal, depth)) = penetration(craft, collider) else {
                continue;
            };
            if collider.solid && depth > 0.0 {
                resolve(craft, normal, depth);
            }
            if !self.touching.contains(&collider.id) {
                contacts.push(ContactEvent {
                    other: collider.id,
                    category: collider.category(),
                });
            }
            touching.push(collider.id);
        }
        self.touching = touching;
        contacts
    }
}

/// Contact normal (pointing at the craft) and penetration depth.
///
/// `None` when the craft is farther than the contact skin. Depth is negative
/// inside the skin.
fn penetration(craft: &Craft, collider: &Collider) -> Option<(Vec2, f32)> {
    let rect = &collider.rect;
    let closest = rect.closest_point(craft.pos);
    let delta = craft.pos - closest;
    let dist = delta.length();

    if dist > 1e-6 {
        if dist >= craft.radius + CONTACT_SKIN {
            return None;
        }
        return Some((delta / dist, craft.radius - dist));
    }

    // Center inside the box: push out through the nearest face
    let to_left = craft.pos.x - rect.min.x;
    let to_right = rect.max.x - craft.pos.x;
    let to_bottom = craft.pos.y - rect.min.y;
    let to_top = rect.max.y - craft.pos.y;
    let faces = [
        (to_left, Vec2::NEG_X),
        (to_right, Vec2::X),
        (to_bottom, Vec2::NEG_Y),
        (to_top, Vec2::Y),
    ];
    let (inside, normal) = faces
        .into_iter()
        .min_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal))
        .unwrap_or((0.0, Vec2::Y));
    Some((normal, craft.radius + inside))
}

/// Push the craft out of a solid collider and absorb the impact
fn resolve(craft: &mut Craft, normal: Vec2, depth: f32) {
    craft.pos += normal * depth;

    let vn = craft.vel.dot(normal);
    if vn < 0.0 {
        craft.vel -= normal * vn;
    }

    // Friction, with a little spin from the scrape
    let tangent = normal.perp();
    let vt = craft.vel.dot(tangent);
    craft.vel -= tangent * vt * CONTACT_FRICTION;
    if !craft.rotation_locked {
        craft.angular_vel -= vt * CONTACT_FRICTION / craft.radius;
    }
}
