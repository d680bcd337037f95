mod types;

pub(crate) use types::{
    EquipItemBody, ProfileResponse, TokenResponse, UserMembershipData, read_envelope,
};
pub use types::identity_from_memberships;
