use std::collections::HashMap;

use crate::{
    ids::{ActivityHash, BucketHash, CharacterId, ItemInstanceId, MembershipId, MembershipType},
    time::Timestamp,
};

/// Account platform binding used to address profile requests.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Identity {
    pub membership_type: MembershipType,
    pub membership_id: MembershipId,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CharacterSnapshot {
    pub character_id: CharacterId,
    pub date_last_played: Timestamp,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CharacterActivity {
    pub current_activity_hash: ActivityHash,
    pub date_activity_started: Timestamp,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InventoryItem {
    pub item_instance_id: Option<ItemInstanceId>,
    pub bucket_hash: BucketHash,
}

/// One profile fetch. Rebuilt every poll cycle and dropped after use.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProfileSnapshot {
    pub characters: Vec<CharacterSnapshot>,
    pub activities: HashMap<CharacterId, CharacterActivity>,
    pub inventories: HashMap<CharacterId, Vec<InventoryItem>>,
}

impl ProfileSnapshot {
    /// Character with the latest `date_last_played`; the first one wins a tie.
    pub fn most_recent_character(&self) -> Option<&CharacterSnapshot> {
        self.characters.iter().fold(None, |best, candidate| match best {
            Some(best) if best.date_last_played >= candidate.date_last_played => Some(best),
            _ => Some(candidate),
        })
    }

    pub fn activity_for(&self, character_id: CharacterId) -> Option<&CharacterActivity> {
        self.activities.get(&character_id)
    }

    pub fn inventory_for(&self, character_id: CharacterId) -> Option<&[InventoryItem]> {
        self.inventories.get(&character_id).map(Vec::as_slice)
    }
}
