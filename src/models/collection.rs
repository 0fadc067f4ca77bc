//! Names of the synchronized collections.

use serde::{Deserialize, Serialize};

/// One of the six collections mirrored to the remote store.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum CollectionName {
    #[serde(rename = "shifts")]
    Shifts,
    #[serde(rename = "leaves")]
    Leaves,
    #[serde(rename = "posts")]
    Posts,
    #[serde(rename = "workers")]
    Workers,
    #[serde(rename = "advanceRequests")]
    AdvanceRequests,
    #[serde(rename = "announcements")]
    Announcements,
}

impl CollectionName {
    pub const ALL: [CollectionName; 6] = [
        CollectionName::Shifts,
        CollectionName::Leaves,
        CollectionName::Posts,
        CollectionName::Workers,
        CollectionName::AdvanceRequests,
        CollectionName::Announcements,
    ];

    /// Name of the collection in the remote store.
    pub fn as_str(&self) -> &'static str {
        match self {
            CollectionName::Shifts => "shifts",
            CollectionName::Leaves => "leaves",
            CollectionName::Posts => "posts",
            CollectionName::Workers => "workers",
            CollectionName::AdvanceRequests => "advanceRequests",
            CollectionName::Announcements => "announcements",
        }
    }

    /// Parse a collection name. Accepts the remote name and the kebab-case form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "shifts" => Some(CollectionName::Shifts),
            "leaves" => Some(CollectionName::Leaves),
            "posts" => Some(CollectionName::Posts),
            "workers" => Some(CollectionName::Workers),
            "advanceRequests" | "advance-requests" => Some(CollectionName::AdvanceRequests),
            "announcements" => Some(CollectionName::Announcements),
            _ => None,
        }
    }
}

impl std::fmt::Display for CollectionName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
