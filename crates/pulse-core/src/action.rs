//! Engagement action vocabulary.

use serde::{Deserialize, Serialize};

/// Kind of engagement action a visitor performed.
///
/// The vocabulary is closed. Unknown kinds are rejected at the API boundary
/// before any write reaches the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Visitor copied a bonus code to the clipboard
    CodeCopy,
    /// Visitor followed an outbound offer link
    OfferClick,
    /// Visitor landed on a tracked page
    PageVisit,
    /// Visitor ran an on-site search
    Search,
    /// Synthetic smoke event exercising the ingest path
    Test,
}

impl ActionKind {
    /// All recognized kinds, in stats display order.
    pub const ALL: [ActionKind; 5] = [
        ActionKind::CodeCopy,
        ActionKind::OfferClick,
        ActionKind::PageVisit,
        ActionKind::Search,
        ActionKind::Test,
    ];

    /// Stable storage and wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::CodeCopy => "code_copy",
            ActionKind::OfferClick => "offer_click",
            ActionKind::PageVisit => "page_visit",
            ActionKind::Search => "search",
            ActionKind::Test => "test",
        }
    }

    /// True for kinds that announce a bonus claim on the live feed.
    pub fn is_claim(&self) -> bool {
        matches!(self, ActionKind::CodeCopy | ActionKind::OfferClick)
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ActionKind {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "code_copy" => Ok(Self::CodeCopy),
            "offer_click" => Ok(Self::OfferClick),
            "page_visit" => Ok(Self::PageVisit),
            "search" => Ok(Self::Search),
            "test" => Ok(Self::Test),
            _ => Err(format!("Invalid action kind: {}", s)),
        }
    }
}
