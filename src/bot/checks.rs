//! Permission gates for commands that change XP or settings.

use crate::bot::commands::reply_ephemeral;
use crate::bot::{Context, Error};

/// Administrators always pass; otherwise the configured moderator role is required.
pub fn grants_moderator(is_admin: bool, role_ids: &[u64], moderator_role_id: Option<u64>) -> bool {
    is_admin || moderator_role_id.is_some_and(|role| role_ids.contains(&role))
}

async fn author_access(ctx: Context<'_>) -> (bool, Vec<u64>) {
    match ctx.author_member().await {
        Some(member) => {
            let is_admin = member
                .permissions
                .is_some_and(|permissions| permissions.administrator());
            let roles = member.roles.iter().map(|role| role.get()).collect();
            (is_admin, roles)
        }
        None => (false, Vec::new()),
    }
}

pub async fn is_moderator(ctx: Context<'_>) -> Result<bool, Error> {
    let (is_admin, roles) = author_access(ctx).await;
    if grants_moderator(is_admin, &roles, ctx.data().config.moderator_role_id) {
        return Ok(true);
    }

    tracing::info!(user_id = ctx.author().id.get(), "Moderator check failed");
    reply_ephemeral(ctx, "You need moderator permissions to use this command.".to_string()).await?;
    Ok(false)
}

pub async fn is_admin(ctx: Context<'_>) -> Result<bool, Error> {
    let (is_admin, _) = author_access(ctx).await;
    if is_admin {
        return Ok(true);
    }

    reply_ephemeral(ctx, "You need Administrator permissions to use this command.".to_string()).await?;
    Ok(false)
}
