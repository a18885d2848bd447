//! Tenant model.

use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Host name matching any request host.
pub const WILDCARD_HOST: &str = "*";

/// A tenant owning entries, groups and users.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    #[serde(rename = "_id")]
    pub id: ObjectId,

    /// Host name, or `*` for the fallback tenant
    pub host: String,

    /// Sender address for translation requests
    pub support_email_address: String,
}
