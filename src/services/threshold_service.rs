use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use futures_util::StreamExt;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::options::FindOptions;
use mongodb::{Collection, Database};

use crate::models::{Condition, Threshold};

/// The slice of the store the alert scheduler depends on.
#[async_trait]
pub trait ThresholdStore: Send + Sync {
    /// Snapshot of every currently-enabled threshold, keyed by owner.
    async fn list_enabled_grouped(&self) -> Result<HashMap<ObjectId, Vec<Threshold>>, String>;

    /// One-way `enabled -> false`. Disabling a threshold that is already
    /// disabled (or gone) is a no-op success.
    async fn disable(&self, user_id: ObjectId, threshold_id: ObjectId) -> Result<(), String>;
}

#[derive(Clone)]
pub struct MongoThresholdStore {
    db: Database,
}

impl MongoThresholdStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn collection(&self) -> Collection<Threshold> {
        self.db.collection::<Threshold>("thresholds")
    }

    pub async fn create(
        &self,
        user_id: ObjectId,
        ticker: &str,
        target: f64,
        condition: Condition,
    ) -> Result<Threshold, String> {
        let threshold = Threshold {
            id: ObjectId::new(),
            user_id,
            ticker: ticker.to_uppercase(),
            target,
            condition,
            enabled: true,
            created_at: Utc::now().timestamp(),
        };

        self.collection()
            .insert_one(&threshold, None)
            .await
            .map_err(|e| e.to_string())?;

        Ok(threshold)
    }

    pub async fn list_for_user(&self, user_id: ObjectId) -> Result<Vec<Threshold>, String> {
        let find_opts = FindOptions::builder()
            .sort(doc! { "created_at": -1 })
            .build();

        let mut cursor = self
            .collection()
            .find(doc! { "user_id": user_id }, find_opts)
            .await
            .map_err(|e| e.to_string())?;

        let mut items: Vec<Threshold> = Vec::new();
        while let Some(res) = cursor.next().await {
            items.push(res.map_err(|e| e.to_string())?);
        }

        Ok(items)
    }

    pub async fn delete(&self, user_id: ObjectId, threshold_id: ObjectId) -> Result<bool, String> {
        let res = self
            .collection()
            .delete_one(doc! { "_id": threshold_id, "user_id": user_id }, None)
            .await
            .map_err(|e| e.to_string())?;

        Ok(res.deleted_count > 0)
    }
}

#[async_trait]
impl ThresholdStore for MongoThresholdStore {
    async fn list_enabled_grouped(&self) -> Result<HashMap<ObjectId, Vec<Threshold>>, String> {
        let mut cursor = self
            .collection()
            .find(doc! { "enabled": true }, None)
            .await
            .map_err(|e| e.to_string())?;

        let mut by_user: HashMap<ObjectId, Vec<Threshold>> = HashMap::new();
        while let Some(item) = cursor.next().await {
            match item {
                Ok(th) => by_user.entry(th.user_id).or_default().push(th),
                // one undecodable record must not sink the whole snapshot
                Err(e) => tracing::warn!("skipping unreadable threshold record: {e}"),
            }
        }

        Ok(by_user)
    }

    async fn disable(&self, user_id: ObjectId, threshold_id: ObjectId) -> Result<(), String> {
        // Unconditional $set keeps this idempotent: re-disabling matches the
        // document and changes nothing.
        self.collection()
            .update_one(
                doc! { "_id": threshold_id, "user_id": user_id },
                doc! { "$set": { "enabled": false } },
                None,
            )
            .await
            .map_err(|e| e.to_string())?;

        Ok(())
    }
}
