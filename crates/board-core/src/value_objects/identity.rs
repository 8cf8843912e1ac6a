//! Author and actor identities
//!
//! An [`Author`] is who wrote a post or comment. An [`ActorKey`] is who
//! performed a reaction: a signed-in user id, or the caller's IP address when
//! anonymous. Both are resolved server-side, never taken from a request body.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;

use super::Snowflake;

/// Display name used for authors without a profile
pub const ANONYMOUS_NAME: &str = "Anonymous";

/// Author identity attached to posts and comments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    /// Stable user id; `None` for anonymous authors
    pub id: Option<Snowflake>,
    pub name: String,
    pub avatar: Option<String>,
}

impl Author {
    pub fn user(id: Snowflake, name: impl Into<String>, avatar: Option<String>) -> Self {
        Self {
            id: Some(id),
            name: name.into(),
            avatar,
        }
    }

    /// Anonymous author, falling back to [`ANONYMOUS_NAME`] for blank names
    pub fn anonymous(name: Option<&str>) -> Self {
        let name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(ANONYMOUS_NAME);
        Self {
            id: None,
            name: name.to_string(),
            avatar: None,
        }
    }

    #[inline]
    pub fn is_user(&self, user_id: Snowflake) -> bool {
        self.id == Some(user_id)
    }

    /// The reply target that addresses this author
    pub fn as_reply_target(&self) -> ReplyTarget {
        ReplyTarget {
            id: self.id,
            name: self.name.clone(),
        }
    }

    /// Whether the given `author=` filter value names this author (id or display name)
    pub fn matches_filter(&self, filter: &str) -> bool {
        let filter = filter.trim();
        self.id.is_some_and(|id| id.to_string() == filter) || self.name == filter
    }
}

/// Who a comment is addressed to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyTarget {
    pub id: Option<Snowflake>,
    pub name: String,
}

impl ReplyTarget {
    /// Whether this target addresses the same identity as `author`
    ///
    /// Authors with a user id match by id; anonymous authors match by name.
    pub fn addresses(&self, author: &Author) -> bool {
        match (self.id, author.id) {
            (Some(a), Some(b)) => a == b,
            (None, None) => self.name == author.name,
            _ => false,
        }
    }
}

/// Identifier recorded in a reaction ledger
///
/// Users are stored as their decimal id, anonymous callers as `ip:<address>`,
/// so no address can ever read back as a user id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ActorKey {
    User(Snowflake),
    /// Canonical client address, or `unknown` when none could be read
    Anonymous(String),
}

const ANONYMOUS_PREFIX: &str = "ip:";

impl ActorKey {
    /// Resolve the actor: the signed-in user, else the caller's address
    pub fn resolve(user_id: Option<Snowflake>, client_ip: &str) -> Self {
        match user_id {
            Some(id) => Self::User(id),
            None => Self::Anonymous(canonical_ip(client_ip)),
        }
    }

    /// Parse a key read back from a ledger
    pub fn from_ledger(raw: &str) -> Self {
        if let Some(addr) = raw.strip_prefix(ANONYMOUS_PREFIX) {
            return Self::Anonymous(addr.to_string());
        }
        match raw.parse::<Snowflake>() {
            Ok(id) => Self::User(id),
            Err(_) => Self::Anonymous(raw.to_string()),
        }
    }

    pub fn user_id(&self) -> Option<Snowflake> {
        match self {
            Self::User(id) => Some(*id),
            Self::Anonymous(_) => None,
        }
    }
}

impl fmt::Display for ActorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User(id) => write!(f, "{id}"),
            Self::Anonymous(ip) => write!(f, "{ANONYMOUS_PREFIX}{ip}"),
        }
    }
}

/// Canonical text of a client address; IPv4-mapped IPv6 folds to IPv4
fn canonical_ip(ip: &str) -> String {
    match ip.trim().parse::<IpAddr>() {
        Ok(IpAddr::V6(v6)) => v6
            .to_ipv4_mapped()
            .map_or_else(|| v6.to_string(), |v4| v4.to_string()),
        Ok(addr) => addr.to_string(),
        Err(_) => "unknown".to_string(),
    }
}
