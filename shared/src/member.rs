use serde::{Deserialize, Serialize};

/// One roster entry, unique by `user_id` within a roster. The canonical
/// identity is `user_id`; usernames can change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub user_id: u64,
    pub username: String,
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<u32>,
}

/// One owned limited/collectible item instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectibleItem {
    pub asset_id: String,
    pub name: String,
    pub recent_value: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CreatorType {
    User,
    Group,
    #[default]
    Unknown,
}

impl CreatorType {
    /// Normalize the spellings the catalog endpoints use ("User", "user",
    /// "Group", ...). Anything unrecognized maps to `Unknown`.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "user" => Self::User,
            "group" => Self::Group,
            _ => Self::Unknown,
        }
    }
}

/// Creator metadata resolved per distinct asset id, cached for the lifetime
/// of one enrichment run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatorInfo {
    pub creator_id: String,
    pub creator_name: String,
    #[serde(default)]
    pub creator_type: CreatorType,
}

impl CreatorInfo {
    pub fn is_first_party(&self, first_party_id: &str, first_party_name: &str) -> bool {
        self.creator_id == first_party_id || self.creator_name == first_party_name
    }
}

/// Which tier of the fallback chain produced a member's total.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueSource {
    /// Precomputed total from the external reputation aggregator.
    Aggregate,
    /// Computed from the member's collectible inventory.
    #[default]
    Inventory,
}

/// What the wealth estimator resolves one member to. Always produced, never
/// an error; failed lookups collapse to [`WealthBreakdown::zero`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WealthBreakdown {
    pub total_value: i64,
    pub qualifying_item_count: usize,
    #[serde(default)]
    pub qualifying_items: Vec<CollectibleItem>,
    #[serde(default)]
    pub source: ValueSource,
}

impl WealthBreakdown {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn from_aggregate(total_value: i64) -> Self {
        Self {
            total_value,
            source: ValueSource::Aggregate,
            ..Self::default()
        }
    }
}

/// A member joined with its wealth breakdown; immutable once published into
/// a search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedMember {
    pub user_id: u64,
    pub username: String,
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<u32>,
    pub total_value: i64,
    pub qualifying_item_count: usize,
    #[serde(default)]
    pub qualifying_items: Vec<CollectibleItem>,
    #[serde(default)]
    pub source: ValueSource,
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl EnrichedMember {
    pub fn new(member: Member, breakdown: WealthBreakdown) -> Self {
        Self {
            user_id: member.user_id,
            username: member.username,
            display_name: member.display_name,
            rank: member.rank,
            total_value: breakdown.total_value,
            qualifying_item_count: breakdown.qualifying_item_count,
            qualifying_items: breakdown.qualifying_items,
            source: breakdown.source,
            avatar_url: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CreatorInfo, CreatorType, EnrichedMember, ValueSource, WealthBreakdown};

    #[test]
    fn creator_type_parses_known_spellings() {
        assert_eq!(CreatorType::parse("User"), CreatorType::User);
        assert_eq!(CreatorType::parse("user"), CreatorType::User);
        assert_eq!(CreatorType::parse("GROUP"), CreatorType::Group);
        assert_eq!(CreatorType::parse("Studio"), CreatorType::Unknown);
        assert_eq!(CreatorType::parse(""), CreatorType::Unknown);
    }

    #[test]
    fn first_party_matches_by_id_or_name() {
        let by_id = CreatorInfo {
            creator_id: "1".to_string(),
            creator_name: "Someone Else".to_string(),
            creator_type: CreatorType::User,
        };
        let by_name = CreatorInfo {
            creator_id: "7777".to_string(),
            creator_name: "Roblox".to_string(),
            creator_type: CreatorType::User,
        };
        let neither = CreatorInfo {
            creator_id: "7777".to_string(),
            creator_name: "SomeTrader".to_string(),
            creator_type: CreatorType::User,
        };
        assert!(by_id.is_first_party("1", "Roblox"));
        assert!(by_name.is_first_party("1", "Roblox"));
        assert!(!neither.is_first_party("1", "Roblox"));
    }

    #[test]
    fn aggregate_breakdown_carries_no_items() {
        let breakdown = WealthBreakdown::from_aggregate(125_000);
        assert_eq!(breakdown.total_value, 125_000);
        assert_eq!(breakdown.qualifying_item_count, 0);
        assert!(breakdown.qualifying_items.is_empty());
        assert_eq!(breakdown.source, ValueSource::Aggregate);
    }

    #[test]
    fn enriched_member_tolerates_missing_optional_fields() {
        let member: EnrichedMember = serde_json::from_value(serde_json::json!({
            "user_id": 8,
            "username": "sparse",
            "total_value": 12_000,
            "qualifying_item_count": 0
        }))
        .expect("sparse row should parse");

        assert!(member.qualifying_items.is_empty());
        assert_eq!(member.source, ValueSource::Inventory);
        assert_eq!(member.display_name, None);
        assert_eq!(member.avatar_url, None);
    }
}
