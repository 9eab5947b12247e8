use async_trait::async_trait;
use chrono::Utc;
use mongodb::Database;
use mongodb::bson::doc;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub text: String,
    pub html: String,
}

/// Outbound notification boundary. Implementations only queue; delivery is a
/// separate worker's problem.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn enqueue(&self, message: &EmailMessage) -> Result<(), String>;
}

/// Queues messages into the `mail` collection, where the delivery worker
/// picks them up.
#[derive(Clone)]
pub struct MailQueue {
    db: Database,
}

impl MailQueue {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl Mailer for MailQueue {
    async fn enqueue(&self, message: &EmailMessage) -> Result<(), String> {
        let mail = self.db.collection::<mongodb::bson::Document>("mail");

        mail.insert_one(
            doc! {
                "to": &message.to,
                "message": {
                    "subject": &message.subject,
                    "text": &message.text,
                    "html": &message.html,
                },
                "queued_at": Utc::now().timestamp(),
            },
            None,
        )
        .await
        .map_err(|e| e.to_string())?;

        Ok(())
    }
}
