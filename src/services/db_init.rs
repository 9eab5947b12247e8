use mongodb::{
    Database, IndexModel,
    bson::doc,
    options::IndexOptions,
};

pub async fn ensure_indexes(db: &Database) -> Result<(), String> {
    // users: unique email
    {
        let col = db.collection::<mongodb::bson::Document>("users");
        let model = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        col.create_index(model, None)
            .await
            .map_err(|e| e.to_string())?;
    }

    // thresholds: per-user listing sorted by newest
    {
        let col = db.collection::<mongodb::bson::Document>("thresholds");
        let model = IndexModel::builder()
            .keys(doc! { "user_id": 1, "created_at": -1 })
            .build();

        col.create_index(model, None)
            .await
            .map_err(|e| e.to_string())?;
    }

    // thresholds: scheduler snapshot scan
    {
        let col = db.collection::<mongodb::bson::Document>("thresholds");
        let model = IndexModel::builder().keys(doc! { "enabled": 1 }).build();

        let _ = col.create_index(model, None).await;
    }

    Ok(())
}
