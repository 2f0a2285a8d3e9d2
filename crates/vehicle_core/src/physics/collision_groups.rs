//! # Collision Group Manager
//!
//! Owns the bounding volumes built from an object's collision groups and
//! sorts them into usage sets every tick:
//!
//! - **block**: collides with the world's blocks
//! - **entity**: collides with actors and other objects
//! - **interaction**: hit-tested for clicks, a superset of entity
//! - **bullet**: hit only by projectiles, disjoint from block and entity
//!
//! An encompassing bound around interaction and bullet volumes serves as a
//! cheap broad-phase check.
//!
//! Volumes are built once per definition load. If a hot reload leaves a
//! group without volumes, the manager flips to [`ResetState::PendingReinit`]
//! and stops recomputing until [`CollisionGroupManager::rebuild_from_definition`]
//! runs again.

use std::sync::Arc;

use crate::animation::{Switchbox, SwitchboxRequest};
use crate::definition::ObjectDefinition;
use crate::foundation::logging::warn;
use crate::foundation::math::{utils, Vec3};
use crate::foundation::pose::Pose;
use crate::variables::VariableSource;

use super::bounding_box::{BoundingVolume, VolumeFlags};

/// Whether the volumes still match the definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResetState {
    /// Volumes are in sync
    #[default]
    Normal,
    /// A reload desynchronized volumes; recompute is disabled until rebuilt
    PendingReinit,
}

/// Address of a volume inside the manager
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VolumeKey {
    /// Box `index` of collision group `group`
    Group {
        /// Group index in declared order
        group: usize,
        /// Box index in the group
        index: usize,
    },
    /// Extra interaction-only volume
    Extra(usize),
}

/// Inputs of one recompute
pub struct CollisionContext<'a> {
    /// Owner pose after this tick's movement
    pub pose: &'a Pose,
    /// Owner variables, read by switchboxes and health checks
    pub variables: &'a dyn VariableSource,
    /// Global no-clip switch, suppresses block collision
    pub noclip: bool,
}

/// Name of the damage variable of collision group `index` (0-based)
pub fn collision_damage_variable(index: usize) -> String {
    format!("collision_{}_damage", index + 1)
}

/// Builds, animates and partitions an object's collision volumes.
#[derive(Debug, Clone)]
pub struct CollisionGroupManager {
    definition: Arc<ObjectDefinition>,
    group_volumes: Vec<Vec<BoundingVolume>>,
    switchboxes: Vec<Option<Switchbox>>,
    extra_interaction: Vec<BoundingVolume>,
    block: Vec<VolumeKey>,
    entity: Vec<VolumeKey>,
    interaction: Vec<VolumeKey>,
    bullet: Vec<VolumeKey>,
    encompassing: BoundingVolume,
    reset_state: ResetState,
}

impl CollisionGroupManager {
    /// Create a manager and build volumes for `definition`
    pub fn new(definition: Arc<ObjectDefinition>) -> Self {
        let mut manager = Self {
            definition: Arc::clone(&definition),
            group_volumes: Vec::new(),
            switchboxes: Vec::new(),
            extra_interaction: Vec::new(),
            block: Vec::new(),
            entity: Vec::new(),
            interaction: Vec::new(),
            bullet: Vec::new(),
            encompassing: BoundingVolume::new(Vec3::zeros(), Vec3::zeros()),
            reset_state: ResetState::Normal,
        };
        manager.rebuild_from_definition(definition);
        manager
    }

    /// Allocate one volume set per group and clear any pending reset.
    ///
    /// Group-level interior and bullet flags are folded into every box.
    pub fn rebuild_from_definition(&mut self, definition: Arc<ObjectDefinition>) {
        self.group_volumes = definition
            .collision_groups
            .iter()
            .map(|group| {
                let mut group_flags = VolumeFlags::empty();
                group_flags.set(VolumeFlags::INTERIOR, group.is_interior);
                group_flags.set(VolumeFlags::BULLET_ONLY, group.is_for_bullets);
                group
                    .collisions
                    .iter()
                    .map(|b| {
                        let mut flags = group_flags;
                        if b.is_interior {
                            flags |= VolumeFlags::INTERIOR;
                        }
                        if b.is_for_bullets {
                            flags |= VolumeFlags::BULLET_ONLY;
                        }
                        if b.ground_excluded {
                            flags |= VolumeFlags::GROUND_EXCLUDED;
                        }
                        BoundingVolume::local(b.center, b.half_extents(), flags)
                    })
                    .collect()
            })
            .collect();
        self.definition = definition;
        self.rebuild_switchboxes();
        self.clear_partitions();
        self.reset_state = ResetState::Normal;
    }

    /// Swap the definition but keep the existing volumes.
    ///
    /// A definition with more groups than built volumes is detected on the
    /// next recompute.
    pub fn hot_reload(&mut self, definition: Arc<ObjectDefinition>) {
        self.definition = definition;
        self.rebuild_switchboxes();
    }

    fn rebuild_switchboxes(&mut self) {
        self.switchboxes = self
            .definition
            .collision_groups
            .iter()
            .map(|group| Switchbox::new(&group.animations, &group.apply_after))
            .collect();
    }

    fn clear_partitions(&mut self) {
        self.block.clear();
        self.entity.clear();
        self.interaction.clear();
        self.bullet.clear();
    }

    /// Add an interaction-only volume, positioned with the owner's pose
    pub fn push_interaction_box(&mut self, volume: BoundingVolume) {
        self.extra_interaction.push(volume);
    }

    /// Re-place and re-partition every volume for this tick.
    pub fn recompute_volumes(&mut self, ctx: &CollisionContext<'_>) {
        self.clear_partitions();
        if self.reset_state == ResetState::PendingReinit {
            return;
        }

        let pose = ctx.pose;
        for (group_index, group) in self.definition.collision_groups.iter().enumerate() {
            let Some(volumes) = self.group_volumes.get_mut(group_index) else {
                warn!(
                    "{}: collision group {} has no volumes after reload, waiting for reinit",
                    self.definition.name,
                    group_index + 1
                );
                self.reset_state = ResetState::PendingReinit;
                return;
            };

            if group.health != 0.0
                && ctx.variables.variable(&collision_damage_variable(group_index)) >= group.health
            {
                continue;
            }

            match self.switchboxes.get(group_index).and_then(Option::as_ref) {
                Some(switchbox) => {
                    let outcome = switchbox.run(ctx.variables, SwitchboxRequest::POSITIONING);
                    if !outcome.active {
                        continue;
                    }
                    for volume in volumes.iter_mut() {
                        let animated = utils::transform_point(&outcome.net, &volume.local_center);
                        volume.global_center = pose.to_world(&animated);
                    }
                }
                None => {
                    for volume in volumes.iter_mut() {
                        volume.update_to_pose(pose);
                    }
                }
            }

            for (index, volume) in volumes.iter().enumerate() {
                let key = VolumeKey::Group {
                    group: group_index,
                    index,
                };
                if volume.flags.contains(VolumeFlags::BULLET_ONLY) {
                    self.bullet.push(key);
                } else {
                    if !volume.flags.contains(VolumeFlags::INTERIOR) && !ctx.noclip {
                        self.block.push(key);
                    }
                    self.entity.push(key);
                }
            }
        }

        self.interaction.extend_from_slice(&self.entity);
        for (index, extra) in self.extra_interaction.iter_mut().enumerate() {
            extra.update_to_pose(pose);
            self.interaction.push(VolumeKey::Extra(index));
        }

        self.recompute_encompassing(pose);
    }

    fn recompute_encompassing(&mut self, pose: &Pose) {
        let mut half = Vec3::zeros();
        for key in self.interaction.iter().chain(&self.bullet) {
            if let Some(volume) = self.volume(*key) {
                let reach = (volume.global_center - pose.position).abs() + volume.half_extents;
                half = half.sup(&reach);
            }
        }
        self.encompassing = BoundingVolume::new(pose.position, half);
    }

    /// Look up a volume by key
    pub fn volume(&self, key: VolumeKey) -> Option<&BoundingVolume> {
        match key {
            VolumeKey::Group { group, index } => self.group_volumes.get(group)?.get(index),
            VolumeKey::Extra(index) => self.extra_interaction.get(index),
        }
    }

    fn resolve<'a>(&'a self, keys: &'a [VolumeKey]) -> impl Iterator<Item = &'a BoundingVolume> + 'a {
        keys.iter().filter_map(move |key| self.volume(*key))
    }

    /// Volumes colliding with blocks
    pub fn block_collision_boxes(&self) -> impl Iterator<Item = &BoundingVolume> {
        self.resolve(&self.block)
    }

    /// Block volumes usable for ground contact
    pub fn ground_contact_boxes(&self) -> impl Iterator<Item = &BoundingVolume> {
        self.block_collision_boxes()
            .filter(|v| !v.flags.contains(VolumeFlags::GROUND_EXCLUDED))
    }

    /// Volumes colliding with actors
    pub fn entity_collision_boxes(&self) -> impl Iterator<Item = &BoundingVolume> {
        self.resolve(&self.entity)
    }

    /// Volumes that can be clicked
    pub fn interaction_boxes(&self) -> impl Iterator<Item = &BoundingVolume> {
        self.resolve(&self.interaction)
    }

    /// Volumes hit only by projectiles
    pub fn bullet_boxes(&self) -> impl Iterator<Item = &BoundingVolume> {
        self.resolve(&self.bullet)
    }

    /// Keys of the block set
    pub fn block_keys(&self) -> &[VolumeKey] {
        &self.block
    }

    /// Keys of the entity set
    pub fn entity_keys(&self) -> &[VolumeKey] {
        &self.entity
    }

    /// Keys of the interaction set
    pub fn interaction_keys(&self) -> &[VolumeKey] {
        &self.interaction
    }

    /// Keys of the bullet set
    pub fn bullet_keys(&self) -> &[VolumeKey] {
        &self.bullet
    }

    /// Bound around every interaction and bullet volume, centered on the owner
    pub fn encompassing_box(&self) -> &BoundingVolume {
        &self.encompassing
    }

    /// Volumes of one group
    pub fn group_boxes(&self, group: usize) -> Option<&[BoundingVolume]> {
        self.group_volumes.get(group).map(Vec::as_slice)
    }

    /// Current reset state
    pub fn reset_state(&self) -> ResetState {
        self.reset_state
    }

    /// True when the owner must rebuild from its definition
    pub fn needs_reset(&self) -> bool {
        self.reset_state == ResetState::PendingReinit
    }

    /// Definition the volumes were built from
    pub fn definition(&self) -> &Arc<ObjectDefinition> {
        &self.definition
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::{AnimationStep, BoxDefinition, CollisionGroupDefinition};
    use crate::foundation::math::utils::quat_from_euler_deg;
    use crate::variables::VariableStore;
    use approx::assert_relative_eq;
    use std::collections::HashSet;

    const EPSILON: f64 = 1e-9;

    fn unit_box(center: Vec3) -> BoxDefinition {
        BoxDefinition::new(center, 1.0, 1.0, 1.0)
    }

    fn definition(groups: Vec<CollisionGroupDefinition>) -> Arc<ObjectDefinition> {
        let mut def = ObjectDefinition::new("test:object", 100.0);
        def.collision_groups = groups;
        Arc::new(def)
    }

    fn recompute(manager: &mut CollisionGroupManager, pose: &Pose, vars: &VariableStore, noclip: bool) {
        manager.recompute_volumes(&CollisionContext {
            pose,
            variables: vars,
            noclip,
        });
    }

    fn assert_partition_invariants(manager: &CollisionGroupManager) {
        let interaction: HashSet<_> = manager.interaction_keys().iter().collect();
        let bullet: HashSet<_> = manager.bullet_keys().iter().collect();
        for key in manager.entity_keys() {
            assert!(interaction.contains(key));
            assert!(!bullet.contains(key));
        }
        for key in manager.block_keys() {
            assert!(!bullet.contains(key));
        }
    }

    #[test]
    fn test_single_static_box_follows_owner() {
        let def = definition(vec![CollisionGroupDefinition::with_boxes(vec![unit_box(Vec3::zeros())])]);
        let mut manager = CollisionGroupManager::new(def);
        let pose = Pose::at(Vec3::new(4.0, 5.0, 6.0), quat_from_euler_deg(0.0, 30.0, 0.0));
        recompute(&mut manager, &pose, &VariableStore::new(), false);

        let volume = manager.entity_collision_boxes().next().unwrap();
        assert_relative_eq!(volume.global_center, pose.position, epsilon = EPSILON);
        assert_eq!(manager.block_keys().len(), 1);
        assert_eq!(manager.entity_keys().len(), 1);
        assert!(manager.bullet_keys().is_empty());
        assert_partition_invariants(&manager);
    }

    #[test]
    fn test_partition_flags_and_noclip() {
        let interior = CollisionGroupDefinition {
            is_interior: true,
            ..CollisionGroupDefinition::with_boxes(vec![unit_box(Vec3::new(0.0, 1.0, 0.0))])
        };
        let bullets = CollisionGroupDefinition {
            is_for_bullets: true,
            ..CollisionGroupDefinition::with_boxes(vec![unit_box(Vec3::new(0.0, 0.0, 3.0))])
        };
        let mut flagged_box = unit_box(Vec3::new(2.0, 0.0, 0.0));
        flagged_box.is_for_bullets = true;
        let mixed = CollisionGroupDefinition::with_boxes(vec![unit_box(Vec3::zeros()), flagged_box]);
        let def = definition(vec![interior, bullets, mixed]);

        let mut manager = CollisionGroupManager::new(def);
        let pose = Pose::default();
        recompute(&mut manager, &pose, &VariableStore::new(), false);
        assert_eq!(manager.block_keys().len(), 1);
        assert_eq!(manager.entity_keys().len(), 2);
        assert_eq!(manager.bullet_keys().len(), 2);
        assert_partition_invariants(&manager);

        recompute(&mut manager, &pose, &VariableStore::new(), true);
        assert!(manager.block_keys().is_empty());
        assert_eq!(manager.entity_keys().len(), 2);
        assert_partition_invariants(&manager);
    }

    #[test]
    fn test_destroyed_group_is_skipped() {
        let group = CollisionGroupDefinition {
            health: 10.0,
            ..CollisionGroupDefinition::with_boxes(vec![unit_box(Vec3::zeros())])
        };
        let mut manager = CollisionGroupManager::new(definition(vec![group]));
        let mut vars = VariableStore::new();
        vars.set(collision_damage_variable(0), 9.9);
        recompute(&mut manager, &Pose::default(), &vars, false);
        assert_eq!(manager.entity_keys().len(), 1);

        vars.set("collision_1_damage", 10.0);
        recompute(&mut manager, &Pose::default(), &vars, false);
        assert!(manager.entity_keys().is_empty());
        assert!(manager.interaction_keys().is_empty());
    }

    #[test]
    fn test_animated_group_uses_switchbox() {
        let group = CollisionGroupDefinition {
            animations: vec![AnimationStep::Translation {
                variable: "ramp".to_string(),
                axis: Vec3::y(),
                offset: 0.0,
                clamp_min: 0.0,
                clamp_max: 0.0,
                absolute: false,
            }],
            ..CollisionGroupDefinition::with_boxes(vec![unit_box(Vec3::new(0.0, 0.0, 2.0))])
        };
        let mut manager = CollisionGroupManager::new(definition(vec![group]));
        let mut vars = VariableStore::new();
        vars.set("ramp", 1.5);
        let pose = Pose::at(Vec3::new(1.0, 0.0, 0.0), quat_from_euler_deg(0.0, 90.0, 0.0));
        recompute(&mut manager, &pose, &vars, false);

        let volume = manager.entity_collision_boxes().next().unwrap();
        assert_relative_eq!(volume.global_center, Vec3::new(3.0, 1.5, 0.0), epsilon = EPSILON);
    }

    #[test]
    fn test_hidden_group_contributes_nothing() {
        let group = CollisionGroupDefinition {
            animations: vec![AnimationStep::Visibility {
                variable: "door".to_string(),
                offset: 0.0,
                clamp_min: 1.0,
                clamp_max: 1.0,
            }],
            ..CollisionGroupDefinition::with_boxes(vec![unit_box(Vec3::zeros())])
        };
        let mut manager = CollisionGroupManager::new(definition(vec![group]));
        recompute(&mut manager, &Pose::default(), &VariableStore::new(), false);
        assert!(manager.entity_keys().is_empty());
        assert_relative_eq!(manager.encompassing_box().half_extents, Vec3::zeros());
    }

    #[test]
    fn test_encompassing_bound_covers_every_volume() {
        let mut bullet_box = BoxDefinition::new(Vec3::new(0.0, 0.0, -4.0), 0.5, 0.5, 0.5);
        bullet_box.is_for_bullets = true;
        let group = CollisionGroupDefinition::with_boxes(vec![
            BoxDefinition::new(Vec3::new(-3.0, 1.0, 0.0), 1.0, 2.0, 1.0),
            bullet_box,
        ]);
        let mut manager = CollisionGroupManager::new(definition(vec![group]));
        manager.push_interaction_box(BoundingVolume::local(Vec3::zeros(), Vec3::new(0.5, 3.5, 0.5), VolumeFlags::empty()));
        let pose = Pose::at(Vec3::new(10.0, 20.0, 30.0), quat_from_euler_deg(0.0, 0.0, 0.0));
        recompute(&mut manager, &pose, &VariableStore::new(), false);

        let bound = manager.encompassing_box();
        assert_relative_eq!(bound.global_center, pose.position);
        for volume in manager.interaction_boxes().chain(manager.bullet_boxes()) {
            let reach = (volume.global_center - pose.position).abs() + volume.half_extents;
            assert!(bound.half_extents.x >= reach.x - EPSILON);
            assert!(bound.half_extents.y >= reach.y - EPSILON);
            assert!(bound.half_extents.z >= reach.z - EPSILON);
        }
        assert_relative_eq!(bound.half_extents, Vec3::new(4.0, 3.5, 4.5), epsilon = EPSILON);
        assert_eq!(manager.interaction_keys().len(), 2);
        assert_partition_invariants(&manager);
    }

    #[test]
    fn test_hot_reload_mismatch_is_sticky_until_rebuild() {
        let one = definition(vec![CollisionGroupDefinition::with_boxes(vec![unit_box(Vec3::zeros())])]);
        let two = definition(vec![
            CollisionGroupDefinition::with_boxes(vec![unit_box(Vec3::zeros())]),
            CollisionGroupDefinition::with_boxes(vec![unit_box(Vec3::x())]),
        ]);
        let mut manager = CollisionGroupManager::new(one);
        manager.hot_reload(Arc::clone(&two));

        let vars = VariableStore::new();
        recompute(&mut manager, &Pose::default(), &vars, false);
        assert!(manager.needs_reset());

        recompute(&mut manager, &Pose::default(), &vars, false);
        assert!(manager.needs_reset());
        assert!(manager.entity_keys().is_empty());

        manager.rebuild_from_definition(two);
        assert_eq!(manager.reset_state(), ResetState::Normal);
        recompute(&mut manager, &Pose::default(), &vars, false);
        assert_eq!(manager.entity_keys().len(), 2);
    }
}
