//! Actor checks shared by the route modules

use gt_common::time;
use tracing::{info, warn};

use crate::db::Store;
use crate::{ApiError, ApiResult};

/// `admin_id` must name an admin account
pub async fn require_admin(store: &Store, admin_id: i64) -> ApiResult<()> {
    if store.check_admin(admin_id).await? {
        return Ok(());
    }
    warn!(admin_id, "Admin-only request from non-admin");
    Err(ApiError::unauthorized())
}

/// `user_id` must name an existing account without an active ban
pub async fn require_unbanned(store: &Store, user_id: i64) -> ApiResult<()> {
    let account = store
        .get_account(user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User"))?;

    if let Some(ban) = account.active_ban(time::now()) {
        info!(user_id, ban_id = ban.id, "Request from banned user rejected");
        return Err(ApiError::unauthorized());
    }
    Ok(())
}
