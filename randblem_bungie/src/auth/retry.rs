use std::future::Future;

use super::AuthService;
use crate::{BungieError, BungieResult, client::TokenEndpoint, token_store::TokenStore};

/// Runs `call` with the current access token, refreshing at most once.
///
/// Without an access token the session is refreshed before the first call.
/// A 401 from the first call then triggers one refresh and one retry, whether
/// or not that up-front refresh happened. A 401 from the retried call is
/// reported as [`BungieError::NotAuthenticated`] without refreshing again.
pub async fn with_reauth<C, S, F, Fut, T>(
    auth: &mut AuthService<C, S>,
    operation: &'static str,
    mut call: F,
) -> BungieResult<T>
where
    C: TokenEndpoint + Send + Sync,
    S: TokenStore + Send + Sync,
    F: FnMut(String) -> Fut + Send,
    Fut: Future<Output = BungieResult<T>> + Send,
    T: Send,
{
    if auth.access_token().is_none() {
        log::debug!("no access token for {operation}; refreshing session first");
        if let Err(err) = auth.refresh().await {
            return Err(BungieError::NotAuthenticated {
                reason: format!("no access token and refresh failed: {err}"),
            });
        }
    }

    let mut retried = false;
    loop {
        let access_token = auth
            .access_token()
            .map(str::to_owned)
            .ok_or_else(|| BungieError::NotAuthenticated {
                reason: "session has no access token".to_owned(),
            })?;

        match call(access_token).await {
            Err(BungieError::Unauthorized { .. }) if !retried => {
                log::info!("{operation} returned 401; refreshing access token and retrying once");
                auth.refresh().await?;
                retried = true;
            }
            Err(BungieError::Unauthorized { .. }) => {
                return Err(BungieError::NotAuthenticated {
                    reason: format!("{operation} rejected a freshly refreshed access token"),
                });
            }
            outcome => return outcome,
        }
    }
}
