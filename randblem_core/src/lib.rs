pub mod destiny;
pub mod emblem;
pub mod events;
pub mod ids;
pub mod orbit;
pub mod profile;
pub mod time;

pub use destiny::{EMBLEM_BUCKET_HASH, ORBIT_ACTIVITY_HASH, PROFILE_COMPONENTS};
pub use emblem::{EmblemSelectionError, select_random_emblem};
pub use events::{EmblemEvent, EmblemEventSink, EquippedEmblem};
pub use ids::{
    ActivityHash, BucketHash, CharacterId, ItemInstanceId, MembershipId, MembershipType,
};
pub use orbit::{OrbitDecision, OrbitWatermark, is_new_orbit_entry};
pub use profile::{
    CharacterActivity, CharacterSnapshot, Identity, InventoryItem, ProfileSnapshot,
};
pub use time::Timestamp;
