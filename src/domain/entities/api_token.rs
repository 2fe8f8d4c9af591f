//! API credentials used by the management endpoints and the admin CLI.

use chrono::{DateTime, Utc};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Named permissions a token can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    /// Create, edit and delete redirect rules and rebuild the lookup table.
    ManageRedirects,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ManageRedirects => "MANAGE_REDIRECTS",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored token. Only the HMAC of the raw value is kept.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ApiToken {
    pub id: i64,
    pub name: String,
    pub token_hash: String,
    /// Permission names. Unknown names are kept so older binaries can read
    /// tokens issued by newer ones.
    pub permissions: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl ApiToken {
    pub fn has_permission(&self, permission: Permission) -> bool {
        self.permissions.iter().any(|p| p == permission.as_str())
    }

    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }
}

/// Input for issuing a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewToken {
    pub name: String,
    pub token_hash: String,
    pub permissions: Vec<String>,
}

/// How an operator refers to a token: by numeric id or by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKey {
    Id(i64),
    Name(String),
}

impl FromStr for TokenKey {
    type Err = Infallible;

    /// All-digit input is an id; anything else is a name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.parse() {
            Ok(id) => Self::Id(id),
            Err(_) => Self::Name(s.to_string()),
        })
    }
}

impl fmt::Display for TokenKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "#{id}"),
            Self::Name(name) => f.write_str(name),
        }
    }
}
