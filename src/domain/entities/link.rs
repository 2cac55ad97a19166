//! Link entity representing a stored short code mapping.

use serde::{Deserialize, Serialize};

/// A stored association between a short code, its target URL and an owner.
///
/// `code` and `target` are each unique across the store. `owner_id` is fixed
/// at creation and `deleted` only ever moves from `false` to `true`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub code: String,
    pub target: String,
    pub owner_id: u64,
    pub deleted: bool,
}

impl Link {
    /// Creates a live (not deleted) link.
    pub fn new(code: impl Into<String>, target: impl Into<String>, owner_id: u64) -> Self {
        Self {
            code: code.into(),
            target: target.into(),
            owner_id,
            deleted: false,
        }
    }

    /// Returns true if the link has been soft-deleted.
    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    /// Returns true if `owner_id` created this link.
    pub fn is_owned_by(&self, owner_id: u64) -> bool {
        self.owner_id == owner_id
    }
}

/// Input data for a create-or-fetch call.
///
/// The code is a freshly allocated candidate; storage ignores it when the
/// target is already known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLink {
    pub code: String,
    pub target: String,
    pub owner_id: u64,
}

impl NewLink {
    pub fn new(code: impl Into<String>, target: impl Into<String>, owner_id: u64) -> Self {
        Self {
            code: code.into(),
            target: target.into(),
            owner_id,
        }
    }
}

impl From<NewLink> for Link {
    fn from(new_link: NewLink) -> Self {
        Link::new(new_link.code, new_link.target, new_link.owner_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_creation() {
        let link = Link::new("abc12", "https://example.com", 7);

        assert_eq!(link.code, "abc12");
        assert_eq!(link.target, "https://example.com");
        assert_eq!(link.owner_id, 7);
        assert!(!link.is_deleted());
        assert!(link.is_owned_by(7));
        assert!(!link.is_owned_by(8));
    }

    #[test]
    fn test_new_link_into_link() {
        let link: Link = NewLink::new("xyz", "https://rust-lang.org", 3).into();

        assert_eq!(link.code, "xyz");
        assert_eq!(link.owner_id, 3);
        assert!(!link.deleted);
    }
}
