//! Collision groups and query filtering.

use rapier3d::prelude::*;

/// Collision groups for different collider roles.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionGroup {
    /// Static environment (ground, walls, props)
    Environment = 1 << 0,
}

impl CollisionGroup {
    /// Membership/filter pair for static environment colliders.
    pub fn environment() -> (Group, Group) {
        let membership = Group::from_bits_retain(Self::Environment as u32);
        let filter = Group::ALL;
        (membership, filter)
    }

    /// Interaction groups for scene queries that should only see the environment.
    pub fn environment_query() -> InteractionGroups {
        InteractionGroups::new(Group::ALL, Group::from_bits_retain(Self::Environment as u32))
    }
}
