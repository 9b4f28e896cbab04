//! Viewer identity as supplied by the authentication layer

use crate::error::{CommentTreeError, Result};
use crate::types::UserId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// Site role held by a signed-in user
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    SuperAdmin,
    Admin,
    Moderator,
    TrustedUser,
}

impl Role {
    /// Parse a role name, returning `None` for anything unrecognized
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "super_admin" => Some(Role::SuperAdmin),
            "admin" => Some(Role::Admin),
            "moderator" | "tag_moderator" => Some(Role::Moderator),
            "trusted" | "trusted_user" => Some(Role::TrustedUser),
            _ => None,
        }
    }

    /// Whether the role may see moderated content
    pub fn is_moderator(&self) -> bool {
        matches!(self, Role::SuperAdmin | Role::Admin | Role::Moderator)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "super_admin",
            Role::Admin => "admin",
            Role::Moderator => "moderator",
            Role::TrustedUser => "trusted",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who is looking at the thread
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ViewerContext {
    #[default]
    Anonymous,
    SignedIn {
        user_id: UserId,
        #[serde(default)]
        roles: BTreeSet<Role>,
    },
}

impl ViewerContext {
    /// Signed-in viewer without any role
    pub fn user(user_id: u64) -> Self {
        ViewerContext::SignedIn {
            user_id: UserId(user_id),
            roles: BTreeSet::new(),
        }
    }

    /// Signed-in viewer with the given roles
    pub fn with_roles(user_id: u64, roles: impl IntoIterator<Item = Role>) -> Self {
        ViewerContext::SignedIn {
            user_id: UserId(user_id),
            roles: roles.into_iter().collect(),
        }
    }

    /// Build a viewer from raw role names.
    ///
    /// An unrecognized role fails closed: the viewer is treated as anonymous.
    pub fn from_raw_roles<I, S>(user_id: u64, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let user_id = UserId(user_id);
        let mut parsed = BTreeSet::new();
        for raw in roles {
            let raw = raw.as_ref();
            match Role::parse(raw) {
                Some(role) => {
                    parsed.insert(role);
                }
                None => {
                    warn!(
                        "Unrecognized role '{}' for user {}, treating viewer as anonymous",
                        raw, user_id
                    );
                    return ViewerContext::Anonymous;
                }
            }
        }
        ViewerContext::SignedIn {
            user_id,
            roles: parsed,
        }
    }

    pub fn is_signed_in(&self) -> bool {
        matches!(self, ViewerContext::SignedIn { .. })
    }

    /// Admins and moderators
    pub fn is_moderator(&self) -> bool {
        match self {
            ViewerContext::Anonymous => false,
            ViewerContext::SignedIn { roles, .. } => roles.iter().any(Role::is_moderator),
        }
    }

    pub fn user_id(&self) -> Option<UserId> {
        match self {
            ViewerContext::Anonymous => None,
            ViewerContext::SignedIn { user_id, .. } => Some(*user_id),
        }
    }
}

impl fmt::Display for ViewerContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewerContext::Anonymous => f.write_str("anonymous"),
            ViewerContext::SignedIn { user_id, roles } => {
                write!(f, "user:{}", user_id)?;
                if !roles.is_empty() {
                    let names: Vec<&str> = roles.iter().map(Role::as_str).collect();
                    write!(f, ":{}", names.join(","))?;
                }
                Ok(())
            }
        }
    }
}

/// Parses `anonymous`, `user:<id>` or `user:<id>:<role>,<role>`
impl FromStr for ViewerContext {
    type Err = CommentTreeError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() || s == "anonymous" {
            return Ok(ViewerContext::Anonymous);
        }

        let mut parts = s.splitn(3, ':');
        if parts.next() != Some("user") {
            return Err(CommentTreeError::InvalidArgument(format!(
                "Invalid viewer '{}', expected anonymous or user:<id>[:roles]",
                s
            )));
        }

        let user_id = parts
            .next()
            .and_then(|id| id.parse::<u64>().ok())
            .ok_or_else(|| {
                CommentTreeError::InvalidArgument(format!("Invalid viewer user id in '{}'", s))
            })?;

        let roles: Vec<&str> = parts
            .next()
            .map(|r| r.split(',').filter(|r| !r.trim().is_empty()).collect())
            .unwrap_or_default();

        Ok(ViewerContext::from_raw_roles(user_id, roles))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anonymous_default() {
        let viewer = ViewerContext::default();
        assert!(!viewer.is_signed_in());
        assert!(!viewer.is_moderator());
        assert_eq!(viewer.user_id(), None);
    }

    #[test]
    fn test_moderator_roles() {
        assert!(ViewerContext::with_roles(1, [Role::Admin]).is_moderator());
        assert!(ViewerContext::with_roles(1, [Role::SuperAdmin]).is_moderator());
        assert!(ViewerContext::with_roles(1, [Role::Moderator]).is_moderator());
        assert!(!ViewerContext::with_roles(1, [Role::TrustedUser]).is_moderator());
        assert!(!ViewerContext::user(1).is_moderator());
    }

    #[test]
    fn test_unrecognized_role_fails_closed() {
        let viewer = ViewerContext::from_raw_roles(5, ["admin", "wizard"]);
        assert_eq!(viewer, ViewerContext::Anonymous);

        let viewer = ViewerContext::from_raw_roles(5, ["admin"]);
        assert!(viewer.is_moderator());
    }

    #[test]
    fn test_parse_viewer() {
        assert_eq!(
            "anonymous".parse::<ViewerContext>().unwrap(),
            ViewerContext::Anonymous
        );
        assert_eq!(
            "user:12".parse::<ViewerContext>().unwrap(),
            ViewerContext::user(12)
        );
        assert_eq!(
            "user:12:admin,trusted".parse::<ViewerContext>().unwrap(),
            ViewerContext::with_roles(12, [Role::Admin, Role::TrustedUser])
        );
        assert_eq!(
            "user:12:pirate".parse::<ViewerContext>().unwrap(),
            ViewerContext::Anonymous
        );
        assert!("guest:1".parse::<ViewerContext>().is_err());
        assert!("user:abc".parse::<ViewerContext>().is_err());
    }

    #[test]
    fn test_display_roundtrip() {
        let viewer = ViewerContext::with_roles(3, [Role::Moderator]);
        assert_eq!(viewer.to_string(), "user:3:moderator");
        assert_eq!(viewer.to_string().parse::<ViewerContext>().unwrap(), viewer);
    }
}
