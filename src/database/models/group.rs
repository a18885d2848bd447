//! Groups, memberships and users.
//!
//! A locale's translators are the members of the group named after the
//! locale tag (`fi_FI`) within the tenant.

use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// A named group of users within a tenant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub owner: ObjectId,
    pub name: String,
}

/// Membership of a user in a group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupMember {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub group: ObjectId,
    pub user: ObjectId,
}

/// An account that can receive translation requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub owner: ObjectId,
    pub email_address: String,
}
