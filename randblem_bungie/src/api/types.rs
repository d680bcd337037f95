use std::collections::{BTreeMap, HashMap};

use randblem_core::{
    ActivityHash, BucketHash, CharacterActivity, CharacterId, CharacterSnapshot, Identity,
    InventoryItem, MembershipId, MembershipType, ProfileSnapshot, Timestamp,
};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{BungieError, BungieResult};

const ERROR_CODE_SUCCESS: i32 = 1;
const ERROR_CODE_WEB_AUTH_REQUIRED: i32 = 99;
const ERROR_CODE_ACCESS_TOKEN_HAS_EXPIRED: i32 = 2111;

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Envelope<T> {
    #[serde(default = "Option::default")]
    response: Option<T>,
    #[serde(default)]
    error_code: Option<i32>,
    #[serde(default)]
    error_status: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Unwraps `{Response, ErrorCode, ..}`, mapping auth failures to
/// [`BungieError::Unauthorized`] and everything else that is not a success to
/// [`BungieError::Upstream`].
pub(crate) async fn read_envelope<T>(
    operation: &'static str,
    response: reqwest::Response,
) -> BungieResult<T>
where
    T: DeserializeOwned,
{
    let status = response.status();
    if status == StatusCode::UNAUTHORIZED {
        return Err(BungieError::Unauthorized { operation });
    }

    let body = response
        .text()
        .await
        .map_err(|source| BungieError::Transport { operation, source })?;
    if !status.is_success() {
        return Err(BungieError::Upstream {
            operation,
            status: status.as_u16(),
            body,
        });
    }

    let envelope: Envelope<T> = serde_json::from_str(&body)
        .map_err(|err| BungieError::malformed(operation, err.to_string()))?;

    match envelope.error_code {
        None | Some(ERROR_CODE_SUCCESS) => {}
        Some(ERROR_CODE_WEB_AUTH_REQUIRED | ERROR_CODE_ACCESS_TOKEN_HAS_EXPIRED) => {
            return Err(BungieError::Unauthorized { operation });
        }
        Some(code) => {
            return Err(BungieError::Upstream {
                operation,
                status: status.as_u16(),
                body: format!(
                    "error code {code} ({}): {}",
                    envelope.error_status.as_deref().unwrap_or("unknown"),
                    envelope.message.as_deref().unwrap_or_default()
                ),
            });
        }
    }

    envelope
        .response
        .ok_or_else(|| BungieError::malformed(operation, "missing `Response`"))
}

#[derive(Deserialize)]
pub(crate) struct TokenResponse {
    #[serde(default)]
    pub(crate) access_token: Option<String>,
    #[serde(default)]
    pub(crate) refresh_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserMembershipData {
    #[serde(default)]
    destiny_memberships: Vec<DestinyMembership>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DestinyMembership {
    membership_id: String,
    #[serde(default)]
    membership_type: i32,
    #[serde(default)]
    cross_save_override: i32,
    #[serde(default)]
    applicable_membership_types: Vec<i32>,
}

/// Identity of the first Destiny membership on the account.
///
/// A cross-save override beats the applicable platform list; without either,
/// the membership's own platform is used.
pub fn identity_from_memberships(data: &UserMembershipData) -> BungieResult<Identity> {
    const OPERATION: &str = "membership lookup";

    let membership = data
        .destiny_memberships
        .first()
        .ok_or_else(|| BungieError::malformed(OPERATION, "account has no destiny memberships"))?;

    let membership_type = if membership.cross_save_override != 0 {
        membership.cross_save_override
    } else {
        membership
            .applicable_membership_types
            .first()
            .copied()
            .unwrap_or(membership.membership_type)
    };
    if MembershipType(membership_type).is_none() {
        return Err(BungieError::malformed(
            OPERATION,
            "membership has no usable membership type",
        ));
    }

    let membership_id: MembershipId = membership.membership_id.parse().map_err(|_| {
        BungieError::malformed(
            OPERATION,
            format!("invalid membership id `{}`", membership.membership_id),
        )
    })?;

    Ok(Identity {
        membership_type: MembershipType(membership_type),
        membership_id,
    })
}

#[derive(Deserialize)]
struct ComponentData<T> {
    #[serde(default = "Option::default")]
    data: Option<T>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CharacterComponent {
    character_id: String,
    date_last_played: Timestamp,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ActivityComponent {
    date_activity_started: Timestamp,
    current_activity_hash: u32,
}

#[derive(Deserialize)]
struct InventoryComponent {
    #[serde(default)]
    items: Vec<ItemComponent>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ItemComponent {
    #[serde(default)]
    item_instance_id: Option<String>,
    bucket_hash: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProfileResponse {
    #[serde(default = "Option::default")]
    characters: Option<ComponentData<BTreeMap<String, CharacterComponent>>>,
    #[serde(default = "Option::default")]
    character_activities: Option<ComponentData<BTreeMap<String, ActivityComponent>>>,
    #[serde(default = "Option::default")]
    character_inventories: Option<ComponentData<BTreeMap<String, InventoryComponent>>>,
}

impl ProfileResponse {
    pub(crate) fn into_snapshot(self) -> BungieResult<ProfileSnapshot> {
        let characters = component(self.characters, "characters")?
            .into_values()
            .map(|character| -> BungieResult<CharacterSnapshot> {
                Ok(CharacterSnapshot {
                    character_id: parse_id(&character.character_id, "character id")?,
                    date_last_played: character.date_last_played,
                })
            })
            .collect::<BungieResult<Vec<_>>>()?;

        let activities = component(self.character_activities, "characterActivities")?
            .into_iter()
            .map(|(character_id, activity)| -> BungieResult<(CharacterId, CharacterActivity)> {
                Ok((
                    parse_id(&character_id, "character id")?,
                    CharacterActivity {
                        current_activity_hash: ActivityHash(activity.current_activity_hash),
                        date_activity_started: activity.date_activity_started,
                    },
                ))
            })
            .collect::<BungieResult<HashMap<_, _>>>()?;

        let inventories = component(self.character_inventories, "characterInventories")?
            .into_iter()
            .map(|(character_id, inventory)| -> BungieResult<(CharacterId, Vec<InventoryItem>)> {
                let items = inventory
                    .items
                    .into_iter()
                    .map(|item| -> BungieResult<InventoryItem> {
                        Ok(InventoryItem {
                            item_instance_id: item
                                .item_instance_id
                                .as_deref()
                                .map(|raw| parse_id(raw, "item instance id"))
                                .transpose()?,
                            bucket_hash: BucketHash(item.bucket_hash),
                        })
                    })
                    .collect::<BungieResult<Vec<_>>>()?;
                Ok((parse_id(&character_id, "character id")?, items))
            })
            .collect::<BungieResult<HashMap<_, _>>>()?;

        Ok(ProfileSnapshot {
            characters,
            activities,
            inventories,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EquipItemBody {
    pub(crate) item_id: String,
    pub(crate) character_id: String,
    pub(crate) membership_type: i32,
}

fn component<T>(component: Option<ComponentData<T>>, name: &str) -> BungieResult<T> {
    component.and_then(|wrapper| wrapper.data).ok_or_else(|| {
        BungieError::malformed("profile", format!("missing `{name}` component data"))
    })
}

fn parse_id<T: std::str::FromStr>(raw: &str, what: &str) -> BungieResult<T> {
    raw.parse()
        .map_err(|_| BungieError::malformed("profile", format!("invalid {what} `{raw}`")))
}
