use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Direction of the price comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    Above,
    Below,
}

impl Condition {
    pub fn parse(s: &str) -> Option<Condition> {
        match s.trim().to_lowercase().as_str() {
            "above" => Some(Condition::Above),
            "below" => Some(Condition::Below),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::Above => "above",
            Condition::Below => "below",
        }
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Threshold {
    #[serde(rename = "_id")]
    pub id: ObjectId,

    pub user_id: ObjectId,
    pub ticker: String,

    pub target: f64,
    pub condition: Condition,

    // starts true; flips to false exactly once, when the alert fires
    // (or when the user deletes the record instead)
    pub enabled: bool,

    pub created_at: i64,
}

impl Threshold {
    /// Strict inequality on both sides: a price sitting exactly on the
    /// target is not a breach.
    pub fn breached_by(&self, price: f64) -> bool {
        match self.condition {
            Condition::Above => price > self.target,
            Condition::Below => price < self.target,
        }
    }
}
