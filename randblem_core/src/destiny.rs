//! Fixed identifiers defined by the provider.

use crate::ids::{ActivityHash, BucketHash};

/// Inventory bucket holding a character's emblems.
pub const EMBLEM_BUCKET_HASH: BucketHash = BucketHash(4_274_335_291);

/// Activity reported while a character sits in orbit.
pub const ORBIT_ACTIVITY_HASH: ActivityHash = ActivityHash(82_913_930);

/// Profile components: characters, character inventories, character activities.
pub const PROFILE_COMPONENTS: [u16; 3] = [200, 201, 204];

pub fn profile_components_query() -> String {
    PROFILE_COMPONENTS
        .iter()
        .map(u16::to_string)
        .collect::<Vec<_>>()
        .join(",")
}
