use std::collections::HashSet;

use midas_shared::Member;
use tracing::debug;

use crate::error::UpstreamError;
use crate::roblox::groups;
use crate::state::Endpoints;

/// Full deduplicated roster for a community: every role's member listing,
/// concatenated in role order, first occurrence of each user kept.
///
/// Any role fetch failure aborts the whole enumeration: a partial roster
/// would silently undercount downstream totals. An empty community yields an
/// empty roster, not an error.
pub async fn enumerate_members(
    client: &reqwest::Client,
    endpoints: &Endpoints,
    community_id: &str,
) -> Result<Vec<Member>, UpstreamError> {
    let roles = groups::fetch_roles(client, endpoints, community_id).await?;

    let mut members = Vec::new();
    for role in &roles {
        let role_members =
            groups::fetch_role_members(client, endpoints, community_id, role).await?;
        debug!(role = %role.name, count = role_members.len(), "fetched role members");
        members.extend(role_members);
    }

    let mut seen = HashSet::with_capacity(members.len());
    members.retain(|member| seen.insert(member.user_id));
    Ok(members)
}
