use async_trait::async_trait;
use mongodb::Database;
use mongodb::bson::{doc, oid::ObjectId};

use crate::models::User;

/// Resolves where a user's notifications should go.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// `Ok(None)` means the user exists but has no deliverable address, or
    /// does not exist at all; `Err` is a lookup failure.
    async fn notification_address(&self, user_id: ObjectId) -> Result<Option<String>, String>;
}

#[derive(Clone)]
pub struct MongoUserDirectory {
    db: Database,
}

impl MongoUserDirectory {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserDirectory for MongoUserDirectory {
    async fn notification_address(&self, user_id: ObjectId) -> Result<Option<String>, String> {
        let users = self.db.collection::<User>("users");

        let user = users
            .find_one(doc! { "_id": user_id }, None)
            .await
            .map_err(|e| e.to_string())?;

        Ok(user.map(|u| u.email).filter(|e| !e.trim().is_empty()))
    }
}
