use rand::Rng;
use thiserror::Error;

use crate::{
    ids::{BucketHash, ItemInstanceId},
    profile::InventoryItem,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EmblemSelectionError {
    #[error("no equippable items found in bucket {0}")]
    NoEmblemsFound(BucketHash),
}

/// Picks one instanced item from `bucket` uniformly at random.
///
/// The currently equipped emblem stays in the candidate set, so the same
/// emblem can be chosen twice in a row.
pub fn select_random_emblem<R>(
    inventory: &[InventoryItem],
    bucket: BucketHash,
    rng: &mut R,
) -> Result<ItemInstanceId, EmblemSelectionError>
where
    R: Rng + ?Sized,
{
    let candidates: Vec<ItemInstanceId> = inventory
        .iter()
        .filter(|item| item.bucket_hash == bucket)
        .filter_map(|item| item.item_instance_id)
        .collect();

    if candidates.is_empty() {
        return Err(EmblemSelectionError::NoEmblemsFound(bucket));
    }

    Ok(candidates[rng.gen_range(0..candidates.len())])
}
