use async_trait::async_trait;
use mongodb::bson::doc;

use crate::{database::MongoDB, models::UserRecord};

/// Read-side seam over the user store.
///
/// The platform's authentication layer hands us a uid; everything this
/// service needs from persistence is resolving that uid to a record.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get_user_with_id(&self, user_id: &str) -> Result<Option<UserRecord>, String>;
}

pub struct MongoUserStore {
    db: MongoDB,
}

impl MongoUserStore {
    pub fn new(db: MongoDB) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for MongoUserStore {
    async fn get_user_with_id(&self, user_id: &str) -> Result<Option<UserRecord>, String> {
        let collection = self.db.collection::<UserRecord>("users");

        let filter = doc! {
            "uid": user_id,
        };

        collection
            .find_one(filter)
            .await
            .map_err(|e| format!("Database error: {}", e))
    }
}
