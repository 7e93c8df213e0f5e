//! Live target collection
//!
//! Targets are kept sorted by ID so every pass over them is in a stable order.

use glam::Vec3;

use super::movement::MovementBehavior;
use super::target::{TargetBody, TargetEntity, TargetId, TargetKind};

/// Result of applying damage to a target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitOutcome {
    /// Target took damage and survived
    Damaged { remaining: u32 },
    /// Target reached zero health and was removed
    Destroyed,
    /// Target is unbreakable
    Ignored,
}

#[derive(Debug, Clone, Default)]
pub struct Arena {
    targets: Vec<TargetEntity>,
    next_id: u32,
}

impl Arena {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_target_id(&mut self) -> TargetId {
        let id = TargetId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Add a target; stats come from the kind profile
    pub fn spawn(&mut self, kind: TargetKind, body: TargetBody, behavior: MovementBehavior, now_ms: u64) -> TargetId {
        let id = self.next_target_id();
        let profile = kind.profile();
        log::debug!("Spawned {} target {:?} at {:?}", kind.as_str(), id, body.position);
        self.targets.push(TargetEntity {
            id,
            kind,
            body,
            behavior,
            health: profile.health,
            breakable: profile.breakable,
            spawn_time_ms: now_ms,
        });
        id
    }

    /// Remove a target; returns false if it was already gone
    pub fn despawn(&mut self, id: TargetId) -> bool {
        match self.targets.binary_search_by_key(&id, |t| t.id) {
            Ok(idx) => {
                self.targets.remove(idx);
                true
            }
            Err(_) => false,
        }
    }

    /// Despawn everything
    pub fn clear(&mut self) -> usize {
        let n = self.targets.len();
        self.targets.clear();
        n
    }

    pub fn live_count(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn targets(&self) -> &[TargetEntity] {
        &self.targets
    }

    pub fn get(&self, id: TargetId) -> Option<&TargetEntity> {
        self.targets
            .binary_search_by_key(&id, |t| t.id)
            .ok()
            .map(|idx| &self.targets[idx])
    }

    pub fn get_mut(&mut self, id: TargetId) -> Option<&mut TargetEntity> {
        match self.targets.binary_search_by_key(&id, |t| t.id) {
            Ok(idx) => Some(&mut self.targets[idx]),
            Err(_) => None,
        }
    }

    pub fn positions(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.targets.iter().map(|t| t.position())
    }

    /// Move every target one step, then drop the ones that asked to leave.
    /// Returns the removed IDs in ascending order.
    pub fn tick(&mut self, dt_ms: f32) -> Vec<TargetId> {
        for target in &mut self.targets {
            target.tick(dt_ms);
        }
        let mut removed = Vec::new();
        self.targets.retain(|t| {
            if t.should_despawn() {
                removed.push(t.id);
                false
            } else {
                true
            }
        });
        removed
    }

    /// Apply damage to a live target. `None` if the target no longer exists.
    pub fn apply_hit(&mut self, id: TargetId, damage: u32) -> Option<HitOutcome> {
        let target = self.get_mut(id)?;
        if !target.breakable {
            return Some(HitOutcome::Ignored);
        }
        if target.take_damage(damage) {
            self.despawn(id);
            Some(HitOutcome::Destroyed)
        } else {
            let remaining = target.health;
            Some(HitOutcome::Damaged { remaining })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::bounds::MovementBounds;
    use crate::sim::movement::Parabolic;

    fn body(x: f32) -> TargetBody {
        TargetBody::new(
            Vec3::new(x, 5.0, 0.0),
            Vec3::X,
            0.0,
            MovementBounds::new(Vec3::splat(-50.0), Vec3::splat(50.0)),
            false,
        )
    }

    #[test]
    fn test_ids_are_unique_and_ordered() {
        let mut arena = Arena::new();
        let a = arena.spawn(TargetKind::Static, body(0.0), MovementBehavior::Static, 0);
        let b = arena.spawn(TargetKind::Static, body(1.0), MovementBehavior::Static, 0);
        assert!(a < b);
        assert!(arena.despawn(a));
        assert!(!arena.despawn(a));
        let c = arena.spawn(TargetKind::Static, body(2.0), MovementBehavior::Static, 0);
        assert!(c > b);
        assert_eq!(arena.live_count(), 2);
    }

    #[test]
    fn test_tick_removes_finished_targets() {
        let mut arena = Arena::new();
        let arc = Parabolic::new(Vec3::new(0.0, 5.0, 0.0), Vec3::new(10.0, 5.0, 0.0), 2.0, 100.0);
        let flying = arena.spawn(TargetKind::Parabolic, body(0.0), MovementBehavior::Parabolic(arc), 0);
        let resting = arena.spawn(TargetKind::Static, body(3.0), MovementBehavior::Static, 0);

        assert!(arena.tick(50.0).is_empty());
        assert_eq!(arena.tick(60.0), vec![flying]);
        assert!(arena.get(flying).is_none());
        assert!(arena.get(resting).is_some());
    }

    #[test]
    fn test_hits_destroy_at_zero_health() {
        let mut arena = Arena::new();
        // Static targets take two hits
        let id = arena.spawn(TargetKind::Static, body(0.0), MovementBehavior::Static, 0);
        assert_eq!(arena.apply_hit(id, 1), Some(HitOutcome::Damaged { remaining: 1 }));
        assert_eq!(arena.apply_hit(id, 1), Some(HitOutcome::Destroyed));
        assert_eq!(arena.apply_hit(id, 1), None);
        assert!(arena.is_empty());
    }

    #[test]
    fn test_unbreakable_ignores_damage() {
        let mut arena = Arena::new();
        let id = arena.spawn(TargetKind::Static, body(0.0), MovementBehavior::Static, 0);
        if let Some(t) = arena.get_mut(id) {
            t.breakable = false;
        }
        assert_eq!(arena.apply_hit(id, 99), Some(HitOutcome::Ignored));
        assert_eq!(arena.live_count(), 1);
    }

    #[test]
    fn test_clear() {
        let mut arena = Arena::new();
        for i in 0..4 {
            arena.spawn(TargetKind::Static, body(i as f32), MovementBehavior::Static, 0);
        }
        assert_eq!(arena.clear(), 4);
        assert_eq!(arena.positions().count(), 0);
    }
}
