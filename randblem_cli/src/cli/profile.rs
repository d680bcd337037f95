use clap::Args;
use randblem_bungie::DestinyClient;
use randblem_core::{EMBLEM_BUCKET_HASH, ORBIT_ACTIVITY_HASH};

use crate::cli::common::{CliContext, SessionArgs};

#[derive(Debug, Args)]
pub(crate) struct ProfileCommand {
    #[command(flatten)]
    session: SessionArgs,
}

impl ProfileCommand {
    pub(crate) async fn run(&self, ctx: &CliContext) -> anyhow::Result<()> {
        let app = ctx.open_app()?;
        let (mut client, _) = self.session.connect(&app).await?;

        let identity = client.resolve_identity().await?;
        println!(
            "Membership {} on platform {}",
            identity.membership_id, identity.membership_type
        );

        let profile = client.fetch_profile(identity).await?;
        let most_recent = profile
            .most_recent_character()
            .map(|character| character.character_id);

        for character in &profile.characters {
            let marker = if Some(character.character_id) == most_recent {
                "*"
            } else {
                " "
            };
            let activity = match profile.activity_for(character.character_id) {
                Some(activity) if activity.current_activity_hash == ORBIT_ACTIVITY_HASH => {
                    format!("in orbit since {}", activity.date_activity_started)
                }
                Some(activity) => format!(
                    "activity {} since {}",
                    activity.current_activity_hash, activity.date_activity_started
                ),
                None => "no activity data".to_owned(),
            };
            let emblems = profile
                .inventory_for(character.character_id)
                .unwrap_or_default()
                .iter()
                .filter(|item| {
                    item.bucket_hash == EMBLEM_BUCKET_HASH && item.item_instance_id.is_some()
                })
                .count();

            println!(
                "{marker} character {} (last played {}): {activity}; {emblems} emblems",
                character.character_id, character.date_last_played
            );
        }
        Ok(())
    }
}
