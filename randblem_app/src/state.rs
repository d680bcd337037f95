use randblem_core::{EmblemEvent, EquippedEmblem, time::Timestamp};

/// Live view of what the randomizer has done since startup.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RandomizerSnapshot {
    pub last_orbit_entry: Option<Timestamp>,
    pub last_equipped: Option<EquippedEmblem>,
    pub equips: u64,
}

impl RandomizerSnapshot {
    pub(crate) fn apply(&mut self, event: &EmblemEvent) {
        match event {
            EmblemEvent::OrbitEntered {
                activity_started_at,
                ..
            } => {
                self.last_orbit_entry = Some(*activity_started_at);
            }
            EmblemEvent::EmblemEquipped(equipped) => {
                self.last_equipped = Some(equipped.clone());
                self.equips = self.equips.saturating_add(1);
            }
        }
    }
}
