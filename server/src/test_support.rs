//! In-process stand-in for the upstream platform APIs, serving the same
//! shapes the production endpoints do. Tests point every `Endpoints` base at
//! one spawned instance.

use std::collections::HashMap;
use std::sync::Arc;

use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Deserialize;

use crate::state::{AppState, Endpoints};

#[derive(Clone, Default)]
pub(crate) struct MockPlatform {
    pub group_id: u64,
    pub group_exists: bool,
    pub roles: Vec<MockRole>,
    pub collectibles: HashMap<u64, MockInventory>,
    pub creators: HashMap<u64, MockCreator>,
    pub creator_get_down: bool,
    pub creator_post_down: bool,
    pub aggregate_values: HashMap<u64, i64>,
    pub avatars: HashMap<u64, String>,
}

impl MockPlatform {
    pub fn with_group(group_id: u64) -> Self {
        Self {
            group_id,
            group_exists: true,
            ..Self::default()
        }
    }

    pub fn roles(mut self, roles: Vec<MockRole>) -> Self {
        self.roles = roles;
        self
    }

    pub fn collectibles(mut self, user_id: u64, items: Vec<MockCollectible>) -> Self {
        self.collectibles.insert(
            user_id,
            MockInventory {
                status: None,
                items,
            },
        );
        self
    }

    pub fn collectibles_status(mut self, user_id: u64, status: u16) -> Self {
        self.collectibles.insert(
            user_id,
            MockInventory {
                status: Some(status),
                items: Vec::new(),
            },
        );
        self
    }

    pub fn creator(mut self, asset_id: u64, creator: MockCreator) -> Self {
        self.creators.insert(asset_id, creator);
        self
    }

    pub fn fail_creator_get(mut self) -> Self {
        self.creator_get_down = true;
        self
    }

    pub fn fail_creator_post(mut self) -> Self {
        self.creator_post_down = true;
        self
    }

    pub fn aggregate_value(mut self, user_id: u64, value: i64) -> Self {
        self.aggregate_values.insert(user_id, value);
        self
    }

    pub fn avatar(mut self, user_id: u64, url: &str) -> Self {
        self.avatars.insert(user_id, url.to_string());
        self
    }
}

#[derive(Clone)]
pub(crate) struct MockRole {
    pub id: u64,
    pub rank: u32,
    pub pages: Vec<Vec<MockMember>>,
    pub status: Option<u16>,
}

impl MockRole {
    pub fn new(id: u64, rank: u32) -> Self {
        Self {
            id,
            rank,
            pages: Vec::new(),
            status: None,
        }
    }

    pub fn page(mut self, members: Vec<MockMember>) -> Self {
        self.pages.push(members);
        self
    }

    pub fn status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }
}

#[derive(Clone)]
pub(crate) struct MockMember {
    pub user_id: u64,
    pub username: String,
}

impl MockMember {
    pub fn new(user_id: u64, username: &str) -> Self {
        Self {
            user_id,
            username: username.to_string(),
        }
    }
}

#[derive(Clone, Default)]
pub(crate) struct MockInventory {
    pub status: Option<u16>,
    pub items: Vec<MockCollectible>,
}

#[derive(Clone)]
pub(crate) struct MockCollectible {
    pub asset_id: u64,
    pub name: String,
    pub recent_value: i64,
}

impl MockCollectible {
    pub fn new(asset_id: u64, name: &str, recent_value: i64) -> Self {
        Self {
            asset_id,
            name: name.to_string(),
            recent_value,
        }
    }
}

#[derive(Clone)]
pub(crate) struct MockCreator {
    pub id: u64,
    pub name: String,
    pub kind: String,
}

impl MockCreator {
    pub fn first_party() -> Self {
        Self {
            id: 1,
            name: "Roblox".to_string(),
            kind: "User".to_string(),
        }
    }

    pub fn user(id: u64, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            kind: "User".to_string(),
        }
    }
}

#[derive(Deserialize)]
struct CursorQuery {
    #[serde(default)]
    cursor: String,
}

fn page_index(cursor: &str) -> usize {
    if cursor.is_empty() {
        0
    } else {
        cursor
            .strip_prefix("cursor-")
            .and_then(|n| n.parse::<usize>().ok())
            .unwrap_or(0)
    }
}

fn next_cursor(index: usize, page_count: usize) -> Option<String> {
    (index + 1 < page_count).then(|| format!("cursor-{}", index + 1))
}

async fn group_lookup(State(mock): State<Arc<MockPlatform>>) -> impl IntoResponse {
    let data = if mock.group_exists {
        serde_json::json!([{"id": mock.group_id, "name": "Mock Community"}])
    } else {
        serde_json::json!([])
    };
    axum::Json(serde_json::json!({"data": data}))
}

async fn group_roles(State(mock): State<Arc<MockPlatform>>) -> impl IntoResponse {
    let roles: Vec<serde_json::Value> = mock
        .roles
        .iter()
        .map(|role| serde_json::json!({"id": role.id, "name": "Role", "rank": role.rank}))
        .collect();
    axum::Json(serde_json::json!({"roles": roles}))
}

async fn role_members(
    State(mock): State<Arc<MockPlatform>>,
    Path((_group_id, role_id)): Path<(u64, u64)>,
    Query(query): Query<CursorQuery>,
) -> axum::response::Response {
    let Some(role) = mock.roles.iter().find(|role| role.id == role_id) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    if let Some(status) = role.status {
        return StatusCode::from_u16(status)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            .into_response();
    }
    let index = page_index(&query.cursor);
    let members: Vec<serde_json::Value> = role
        .pages
        .get(index)
        .map(|page| {
            page.iter()
                .map(|member| {
                    serde_json::json!({
                        "user": {
                            "userId": member.user_id,
                            "username": member.username,
                            "displayName": member.username,
                        }
                    })
                })
                .collect()
        })
        .unwrap_or_default();
    axum::Json(serde_json::json!({
        "data": members,
        "nextPageCursor": next_cursor(index, role.pages.len()),
    }))
    .into_response()
}

async fn user_collectibles(
    State(mock): State<Arc<MockPlatform>>,
    Path(user_id): Path<u64>,
) -> axum::response::Response {
    let inventory = mock.collectibles.get(&user_id).cloned().unwrap_or_default();
    if let Some(status) = inventory.status {
        return StatusCode::from_u16(status)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            .into_response();
    }
    let items: Vec<serde_json::Value> = inventory
        .items
        .iter()
        .map(|item| {
            serde_json::json!({
                "assetId": item.asset_id,
                "name": item.name,
                "recentAveragePrice": item.recent_value,
            })
        })
        .collect();
    axum::Json(serde_json::json!({"data": items, "nextPageCursor": null})).into_response()
}

#[derive(Deserialize)]
struct AssetIdsQuery {
    #[serde(default, rename = "assetIds")]
    asset_ids: String,
}

async fn asset_batch(
    State(mock): State<Arc<MockPlatform>>,
    Query(query): Query<AssetIdsQuery>,
) -> axum::response::Response {
    if mock.creator_get_down {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    let data: Vec<serde_json::Value> = query
        .asset_ids
        .split(',')
        .filter_map(|id| id.trim().parse::<u64>().ok())
        .filter_map(|id| {
            mock.creators.get(&id).map(|creator| {
                serde_json::json!({
                    "id": id,
                    "creator": {
                        "creatorTargetId": creator.id,
                        "name": creator.name,
                        "creatorType": creator.kind,
                    }
                })
            })
        })
        .collect();
    axum::Json(serde_json::json!({"data": data})).into_response()
}

#[derive(Deserialize)]
struct DetailsBody {
    #[serde(default)]
    items: Vec<DetailsItem>,
}

#[derive(Deserialize)]
struct DetailsItem {
    id: u64,
}

async fn asset_details(
    State(mock): State<Arc<MockPlatform>>,
    axum::Json(body): axum::Json<DetailsBody>,
) -> axum::response::Response {
    if mock.creator_post_down {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    let data: Vec<serde_json::Value> = body
        .items
        .iter()
        .filter_map(|item| {
            mock.creators.get(&item.id).map(|creator| {
                serde_json::json!({
                    "id": item.id,
                    "creator": {
                        "id": creator.id,
                        "name": creator.name,
                        "type": creator.kind,
                    }
                })
            })
        })
        .collect();
    axum::Json(serde_json::json!({"data": data})).into_response()
}

#[derive(Deserialize)]
struct UserIdsQuery {
    #[serde(default, rename = "userIds")]
    user_ids: String,
}

async fn avatar_thumbs(
    State(mock): State<Arc<MockPlatform>>,
    Query(query): Query<UserIdsQuery>,
) -> impl IntoResponse {
    let data: Vec<serde_json::Value> = query
        .user_ids
        .split(',')
        .filter_map(|id| id.trim().parse::<u64>().ok())
        .filter_map(|id| {
            mock.avatars.get(&id).map(|url| {
                serde_json::json!({"targetId": id, "imageUrl": url})
            })
        })
        .collect();
    axum::Json(serde_json::json!({"data": data}))
}

async fn player_info(
    State(mock): State<Arc<MockPlatform>>,
    Path(user_id): Path<u64>,
) -> impl IntoResponse {
    let mut playerinfo = serde_json::Map::new();
    if let Some(value) = mock.aggregate_values.get(&user_id) {
        playerinfo.insert(user_id.to_string(), serde_json::json!({"value": value}));
    }
    let playerinfo = serde_json::Value::Object(playerinfo);
    axum::Json(serde_json::json!({"success": true, "playerinfo": playerinfo}))
}

fn mock_router(mock: Arc<MockPlatform>) -> Router {
    Router::new()
        .route("/v2/groups", axum::routing::get(group_lookup))
        .route("/v1/groups/{id}/roles", axum::routing::get(group_roles))
        .route(
            "/v1/groups/{id}/roles/{role_id}/users",
            axum::routing::get(role_members),
        )
        .route(
            "/v1/users/{id}/assets/collectibles",
            axum::routing::get(user_collectibles),
        )
        .route("/v1/assets", axum::routing::get(asset_batch))
        .route(
            "/v1/catalog/items/details",
            axum::routing::post(asset_details),
        )
        .route(
            "/v1/users/avatar-headshot",
            axum::routing::get(avatar_thumbs),
        )
        .route(
            "/players/v1/playerinfo/{id}",
            axum::routing::get(player_info),
        )
        .with_state(mock)
}

/// Spawn the mock platform and return an [`AppState`] whose endpoints all
/// point at it.
pub(crate) async fn spawn_mock_platform(
    mock: MockPlatform,
) -> (AppState, tokio::task::JoinHandle<()>) {
    let app = mock_router(Arc::new(mock));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock platform listener");
    let addr = listener.local_addr().expect("mock platform address");
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve mock platform");
    });

    let base = format!("http://{addr}");
    let endpoints = Endpoints {
        groups: base.clone(),
        inventory: base.clone(),
        catalog: base.clone(),
        thumbnails: base.clone(),
        aggregate: base,
    };
    (AppState::with_endpoints(endpoints), handle)
}
