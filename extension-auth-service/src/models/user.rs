//! User model - the narrow view of the relational user store this service
//! consumes. The store itself lives behind the `UserStore` trait.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// User roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Member,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Member => "member",
            UserRole::Admin => "admin",
        }
    }
}

/// User entity as handed to us by the user store.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub password_hash: String,
    pub role: UserRole,
    pub plan_name: Option<String>,
    pub premium_requests_used: i32,
    pub premium_requests_limit: i32,
    pub fast_requests_used: i32,
    pub fast_requests_limit: i32,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(email: String, name: Option<String>, password_hash: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            email,
            name,
            password_hash,
            role: UserRole::Member,
            plan_name: None,
            premium_requests_used: 0,
            premium_requests_limit: 50,
            fast_requests_used: 0,
            fast_requests_limit: 150,
            created_at: Utc::now(),
        }
    }

    /// Public snapshot handed to the extension: identity, role, and usage
    /// counters at mint time. Never includes the password hash.
    pub fn sanitized(&self) -> SanitizedUser {
        SanitizedUser {
            id: self.id,
            email: self.email.clone(),
            name: self.name.clone(),
            role: self.role,
            premium_requests_used: self.premium_requests_used,
            premium_requests_limit: self.premium_requests_limit,
            fast_requests_used: self.fast_requests_used,
            fast_requests_limit: self.fast_requests_limit,
        }
    }
}

/// User snapshot safe to expose in API responses and the hand-off URL.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SanitizedUser {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub role: UserRole,
    #[serde(rename = "premiumRequestsUsed")]
    pub premium_requests_used: i32,
    #[serde(rename = "premiumRequestsLimit")]
    pub premium_requests_limit: i32,
    #[serde(rename = "fastRequestsUsed")]
    pub fast_requests_used: i32,
    #[serde(rename = "fastRequestsLimit")]
    pub fast_requests_limit: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitized_user_has_no_password_hash() {
        let user = User::new("a@b.com".into(), Some("A".into()), "$argon2id$...".into());
        let json = serde_json::to_string(&user.sanitized()).unwrap();
        assert!(!json.contains("argon2"));
        assert!(!json.contains("password"));
        assert!(json.contains("premiumRequestsLimit"));
    }
}
