//! Edge-triggered orbit detection.
//!
//! A character counts as newly in orbit when its current activity is orbit and
//! that activity started strictly after the last orbit entry already acted on.
//! Staying in orbit across polls, or passing through other activities, never
//! moves the watermark.

use std::collections::HashMap;

use crate::{
    destiny::ORBIT_ACTIVITY_HASH,
    ids::CharacterId,
    profile::CharacterActivity,
    time::Timestamp,
};

/// Start time of the last orbit entry that triggered an equip.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct OrbitWatermark(Timestamp);

impl Default for OrbitWatermark {
    fn default() -> Self {
        Self(Timestamp::UNIX_EPOCH)
    }
}

impl OrbitWatermark {
    pub fn at(timestamp: Timestamp) -> Self {
        Self(timestamp)
    }

    pub fn timestamp(self) -> Timestamp {
        self.0
    }

    pub fn observe(self, activity: &CharacterActivity) -> OrbitDecision {
        if activity.current_activity_hash != ORBIT_ACTIVITY_HASH {
            return OrbitDecision::unchanged(self);
        }

        if activity.date_activity_started > self.0 {
            OrbitDecision {
                trigger: true,
                watermark: Self(activity.date_activity_started),
            }
        } else {
            OrbitDecision::unchanged(self)
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OrbitDecision {
    pub trigger: bool,
    pub watermark: OrbitWatermark,
}

impl OrbitDecision {
    fn unchanged(watermark: OrbitWatermark) -> Self {
        Self {
            trigger: false,
            watermark,
        }
    }
}

/// Characters without an activity entry never trigger.
pub fn is_new_orbit_entry(
    activities: &HashMap<CharacterId, CharacterActivity>,
    character_id: CharacterId,
    watermark: OrbitWatermark,
) -> OrbitDecision {
    match activities.get(&character_id) {
        Some(activity) => watermark.observe(activity),
        None => OrbitDecision::unchanged(watermark),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::{OrbitWatermark, is_new_orbit_entry};
    use crate::{
        destiny::ORBIT_ACTIVITY_HASH,
        ids::{ActivityHash, CharacterId},
        profile::CharacterActivity,
        time::Timestamp,
    };

    const CRUCIBLE: ActivityHash = ActivityHash(1_717_505_396);

    fn activity(hash: ActivityHash, started: i64) -> CharacterActivity {
        CharacterActivity {
            current_activity_hash: hash,
            date_activity_started: ts(started),
        }
    }

    fn ts(epoch_secs: i64) -> Timestamp {
        Timestamp::from_epoch_secs(epoch_secs).expect("valid epoch seconds")
    }

    #[test]
    fn non_orbit_activity_never_triggers_or_moves_watermark() {
        let watermarks = [OrbitWatermark::default(), OrbitWatermark::at(ts(500))];
        for watermark in watermarks {
            for started in [0, 499, 500, 501, 1_700_000_000] {
                let decision = watermark.observe(&activity(CRUCIBLE, started));
                assert!(!decision.trigger);
                assert_eq!(decision.watermark, watermark);
            }
        }
    }

    #[test]
    fn staying_in_orbit_fires_once() {
        let mut watermark = OrbitWatermark::default();
        let mut fired = 0;
        for _ in 0..6 {
            let decision = watermark.observe(&activity(ORBIT_ACTIVITY_HASH, 1_000));
            if decision.trigger {
                fired += 1;
            }
            watermark = decision.watermark;
        }

        assert_eq!(fired, 1);
        assert_eq!(watermark, OrbitWatermark::at(ts(1_000)));
    }

    #[test]
    fn leaving_and_reentering_orbit_fires_again() {
        let first = OrbitWatermark::default().observe(&activity(ORBIT_ACTIVITY_HASH, 1_000));
        assert!(first.trigger);

        let away = first.watermark.observe(&activity(CRUCIBLE, 1_200));
        assert!(!away.trigger);
        assert_eq!(away.watermark, first.watermark);

        let back = away.watermark.observe(&activity(ORBIT_ACTIVITY_HASH, 2_000));
        assert!(back.trigger);
        assert_eq!(back.watermark, OrbitWatermark::at(ts(2_000)));

        let still_back = back.watermark.observe(&activity(ORBIT_ACTIVITY_HASH, 2_000));
        assert!(!still_back.trigger);
    }

    #[test]
    fn older_orbit_start_does_not_rewind_watermark() {
        let watermark = OrbitWatermark::at(ts(5_000));
        let decision = watermark.observe(&activity(ORBIT_ACTIVITY_HASH, 4_000));

        assert!(!decision.trigger);
        assert_eq!(decision.watermark, watermark);
    }

    #[test]
    fn lookup_by_character_ignores_other_characters() {
        let activities = HashMap::from([
            (CharacterId(1), activity(ORBIT_ACTIVITY_HASH, 1_000)),
            (CharacterId(2), activity(CRUCIBLE, 1_000)),
        ]);

        assert!(is_new_orbit_entry(&activities, CharacterId(1), OrbitWatermark::default()).trigger);
        assert!(!is_new_orbit_entry(&activities, CharacterId(2), OrbitWatermark::default()).trigger);
        assert!(!is_new_orbit_entry(&activities, CharacterId(3), OrbitWatermark::default()).trigger);
    }
}
