use async_trait::async_trait;

use crate::{
    ids::{CharacterId, ItemInstanceId, MembershipType},
    time::Timestamp,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EquippedEmblem {
    pub character_id: CharacterId,
    pub item_instance_id: ItemInstanceId,
    pub membership_type: MembershipType,
    pub orbit_entered_at: Timestamp,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EmblemEvent {
    OrbitEntered {
        character_id: CharacterId,
        activity_started_at: Timestamp,
    },
    EmblemEquipped(EquippedEmblem),
}

#[async_trait]
pub trait EmblemEventSink {
    type Error: Send + Sync + 'static;

    async fn emit(&self, event: EmblemEvent) -> Result<(), Self::Error>;
}
