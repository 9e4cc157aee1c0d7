use midas_shared::Member;
use serde::Deserialize;

use crate::config::{MAX_PAGES_PER_ENDPOINT, PAGE_LIMIT};
use crate::error::UpstreamError;
use crate::state::Endpoints;

use super::paging::fetch_all_pages;
use super::{get_json, parse_url};

#[derive(Debug, Deserialize)]
struct GroupLookupResponse {
    #[serde(default)]
    data: Vec<GroupSummary>,
}

#[derive(Debug, Deserialize)]
struct GroupSummary {
    id: u64,
}

/// True iff the numeric id corresponds to an existing community.
pub async fn community_exists(
    client: &reqwest::Client,
    endpoints: &Endpoints,
    community_id: &str,
) -> Result<bool, UpstreamError> {
    let mut url = parse_url(&format!("{}/v2/groups", endpoints.groups))?;
    url.query_pairs_mut().append_pair("groupIds", community_id);
    let resp: GroupLookupResponse = get_json(client, url).await?;
    Ok(resp.data.iter().any(|g| g.id.to_string() == community_id))
}

/// One role (sub-group) definition within a community.
#[derive(Debug, Clone, Deserialize)]
pub struct Role {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub rank: u32,
}

#[derive(Debug, Deserialize)]
struct RolesResponse {
    #[serde(default)]
    roles: Vec<Role>,
}

pub async fn fetch_roles(
    client: &reqwest::Client,
    endpoints: &Endpoints,
    community_id: &str,
) -> Result<Vec<Role>, UpstreamError> {
    let url = parse_url(&format!(
        "{}/v1/groups/{}/roles",
        endpoints.groups, community_id
    ))?;
    let resp: RolesResponse = get_json(client, url).await?;
    Ok(resp.roles)
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawRoleMember {
    user: RawRoleUser,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRoleUser {
    user_id: u64,
    // Newer payloads say `username`, older ones `name`.
    #[serde(default, alias = "name")]
    username: String,
    #[serde(default)]
    display_name: Option<String>,
}

fn member_from_raw(raw: RawRoleMember, role: &Role) -> Member {
    let user = raw.user;
    Member {
        user_id: user.user_id,
        username: user.username,
        display_name: user.display_name.filter(|name| !name.is_empty()),
        rank: Some(role.rank),
    }
}

/// All members holding `role`, across every page of the role's listing.
pub async fn fetch_role_members(
    client: &reqwest::Client,
    endpoints: &Endpoints,
    community_id: &str,
    role: &Role,
) -> Result<Vec<Member>, UpstreamError> {
    let mut url = parse_url(&format!(
        "{}/v1/groups/{}/roles/{}/users",
        endpoints.groups, community_id, role.id
    ))?;
    url.query_pairs_mut()
        .append_pair("limit", &PAGE_LIMIT.to_string())
        .append_pair("sortOrder", "Asc");
    let raw = fetch_all_pages::<RawRoleMember>(client, url, MAX_PAGES_PER_ENDPOINT).await?;
    Ok(raw
        .into_iter()
        .map(|member| member_from_raw(member, role))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::{RawRoleMember, Role, member_from_raw};

    fn role() -> Role {
        Role {
            id: 10,
            name: "Member".to_string(),
            rank: 3,
        }
    }

    #[test]
    fn normalizes_modern_member_row() {
        let raw: RawRoleMember = serde_json::from_value(serde_json::json!({
            "user": {"userId": 42, "username": "builder", "displayName": "The Builder"}
        }))
        .expect("modern row should parse");

        let member = member_from_raw(raw, &role());
        assert_eq!(member.user_id, 42);
        assert_eq!(member.username, "builder");
        assert_eq!(member.display_name.as_deref(), Some("The Builder"));
        assert_eq!(member.rank, Some(3));
    }

    #[test]
    fn normalizes_legacy_name_field_and_empty_display_name() {
        let raw: RawRoleMember = serde_json::from_value(serde_json::json!({
            "user": {"userId": 7, "name": "oldtimer", "displayName": ""}
        }))
        .expect("legacy row should parse");

        let member = member_from_raw(raw, &role());
        assert_eq!(member.username, "oldtimer");
        assert_eq!(member.display_name, None);
    }
}
