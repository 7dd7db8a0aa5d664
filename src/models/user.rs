use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};

use crate::models::Presence;

/// User document as stored in MongoDB.
///
/// Materialized fresh per request and discarded after serialization; this
/// service never mutates it.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct UserRecord {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub uid: String,  // External UID - the identity carried in JWT claims
    pub email: String,
    pub username: String,
    pub created_at: Option<BsonDateTime>,
    pub updated_at: Option<BsonDateTime>,
}

/// Wire representation of a user profile.
///
/// Every field is coerced to text and wrapped in `Presence`: a field that was
/// never assigned is omitted from the JSON body, never emitted as null.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, utoipa::ToSchema)]
pub struct UserProfile {
    #[serde(default, skip_serializing_if = "Presence::is_unset")]
    #[schema(value_type = Option<String>)]
    pub id: Presence<String>,
    #[serde(default, skip_serializing_if = "Presence::is_unset")]
    #[schema(value_type = Option<String>)]
    pub uid: Presence<String>,
    #[serde(default, skip_serializing_if = "Presence::is_unset")]
    #[schema(value_type = Option<String>)]
    pub email: Presence<String>,
    #[serde(default, skip_serializing_if = "Presence::is_unset")]
    #[schema(value_type = Option<String>)]
    pub username: Presence<String>,
    #[serde(default, skip_serializing_if = "Presence::is_unset")]
    #[schema(value_type = Option<String>)]
    pub created_at: Presence<String>,
    #[serde(default, skip_serializing_if = "Presence::is_unset")]
    #[schema(value_type = Option<String>)]
    pub updated_at: Presence<String>,
}

impl UserProfile {
    /// Builds the partial representation, setting only the fields present on
    /// the stored record. Timestamps are stringified as RFC 3339.
    pub fn from_record(user: &UserRecord) -> Self {
        let mut profile = UserProfile::default();

        if let Some(id) = &user.id {
            profile.id = Presence::set(id.to_hex());
        }
        profile.uid = Presence::set(user.uid.clone());
        profile.email = Presence::set(user.email.clone());
        profile.username = Presence::set(user.username.clone());

        if let Some(created_at) = user.created_at {
            if let Ok(ts) = created_at.try_to_rfc3339_string() {
                profile.created_at = Presence::set(ts);
            }
        }
        if let Some(updated_at) = user.updated_at {
            if let Ok(ts) = updated_at.try_to_rfc3339_string() {
                profile.updated_at = Presence::set(ts);
            }
        }

        profile
    }
}
