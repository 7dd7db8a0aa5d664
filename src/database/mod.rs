use mongodb::{Client, Collection, Database};
use std::error::Error;

#[derive(Clone)]
pub struct MongoDB {
    db: Database,
}

impl MongoDB {
    pub async fn new(uri: &str) -> Result<Self, Box<dyn Error>> {
        let mut client_options = mongodb::options::ClientOptions::parse(uri).await?;

        // Connection pool tuned for a small request-scoped workload
        client_options.max_pool_size = Some(20);
        client_options.min_pool_size = Some(5);
        client_options.max_idle_time = Some(std::time::Duration::from_secs(300));

        client_options.connect_timeout = Some(std::time::Duration::from_secs(5));
        client_options.server_selection_timeout = Some(std::time::Duration::from_secs(5));

        let client = Client::with_options(client_options)?;

        // Extract database name from URI or use default
        let db_name = uri
            .split('/')
            .last()
            .and_then(|s| s.split('?').next())
            .unwrap_or("UserPlatform");

        let db = client.database(db_name);

        // Test connection
        db.list_collection_names().await?;

        let mongodb = Self { db };
        mongodb.ensure_indexes().await?;

        Ok(mongodb)
    }

    /// Creates the indexes the profile and permission lookups depend on
    async fn ensure_indexes(&self) -> Result<(), Box<dyn Error>> {
        use mongodb::bson::doc;
        use mongodb::IndexModel;

        log::info!("🔧 Creating database indexes...");

        // Index for users: (uid) - every profile request resolves a uid
        let users = self.database().collection::<mongodb::bson::Document>("users");

        let users_index = IndexModel::builder()
            .keys(doc! { "uid": 1 })
            .build();

        match users.create_index(users_index).await {
            Ok(_) => log::info!("   ✅ Index created: users(uid)"),
            Err(e) => log::debug!("   ℹ️  Index already exists: {}", e),
        }

        // Index for project_memberships: (user_id, project_id) - permission checks
        let memberships = self
            .database()
            .collection::<mongodb::bson::Document>("project_memberships");

        let memberships_index = IndexModel::builder()
            .keys(doc! { "user_id": 1, "project_id": 1 })
            .build();

        match memberships.create_index(memberships_index).await {
            Ok(_) => log::info!("   ✅ Index created: project_memberships(user_id, project_id)"),
            Err(e) => log::debug!("   ℹ️  Index already exists: {}", e),
        }

        log::info!("✅ Database indexes ready");

        Ok(())
    }

    pub fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.db.collection(name)
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}
