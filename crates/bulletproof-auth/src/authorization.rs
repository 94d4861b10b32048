//! Role- and policy-based access checks
//!
//! Two independent mechanisms:
//! - **RBAC**: is the user's role in an allowed-roles set?
//! - **PBAC**: does a named policy hold for `(user, resource)`?
//!
//! A [`Gate`] combines them. Everything here is a pure function over a few
//! fields; the only possible outcome besides "allowed" is `false`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Application role of a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    /// Team administrator
    Admin,
    /// Regular team member
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::User => "USER",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whoever is asking for access
pub trait Subject {
    fn id(&self) -> Uuid;
    fn role(&self) -> Role;
}

/// A resource that records who wrote it
pub trait Authored {
    fn author_id(&self) -> Uuid;
}

/// RBAC check. An empty allowed set is an open policy.
pub fn check_role(role: Role, allowed_roles: &[Role]) -> bool {
    allowed_roles.is_empty() || allowed_roles.contains(&role)
}

/// The named-policy table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Policy {
    /// Admins, or the comment's author
    CommentDelete,
    /// Admins only
    DiscussionUpdate,
    /// Admins only
    DiscussionDelete,
}

impl Policy {
    pub const ALL: [Policy; 3] = [
        Policy::CommentDelete,
        Policy::DiscussionUpdate,
        Policy::DiscussionDelete,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Policy::CommentDelete => "comment:delete",
            Policy::DiscussionUpdate => "discussion:update",
            Policy::DiscussionDelete => "discussion:delete",
        }
    }

    pub fn check<S, R>(&self, user: &S, resource: &R) -> bool
    where
        S: Subject + ?Sized,
        R: Authored + ?Sized,
    {
        let is_admin = user.role() == Role::Admin;
        match self {
            Policy::CommentDelete => is_admin || resource.author_id() == user.id(),
            Policy::DiscussionUpdate | Policy::DiscussionDelete => is_admin,
        }
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown policy '{0}'")]
pub struct UnknownPolicy(pub String);

impl FromStr for Policy {
    type Err = UnknownPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Policy::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| UnknownPolicy(s.to_string()))
    }
}

/// An authorization gate: an optional role requirement and an optional,
/// already evaluated policy result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Gate {
    pub allowed_roles: Option<Vec<Role>>,
    pub policy_check: Option<bool>,
}

impl Gate {
    pub fn roles(roles: &[Role]) -> Self {
        Self {
            allowed_roles: Some(roles.to_vec()),
            policy_check: None,
        }
    }

    pub fn policy(result: bool) -> Self {
        Self {
            allowed_roles: None,
            policy_check: Some(result),
        }
    }

    pub fn and_policy(mut self, result: bool) -> Self {
        self.policy_check = Some(result);
        self
    }
}

/// Evaluate a gate for a role.
///
/// Both parts supplied: both must pass. One part: it alone decides.
/// Neither: denied.
pub fn authorize(role: Role, gate: &Gate) -> bool {
    match (&gate.allowed_roles, gate.policy_check) {
        (Some(roles), Some(policy)) => check_role(role, roles) && policy,
        (Some(roles), None) => check_role(role, roles),
        (None, Some(policy)) => policy,
        (None, None) => false,
    }
}
