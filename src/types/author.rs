//! Author types

use serde::{Deserialize, Serialize};

/// Author record owned by the author store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    pub id: u64,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub bio: String,
}

impl Author {
    /// True when both names match exactly
    pub fn has_name(&self, first_name: &str, last_name: &str) -> bool {
        self.first_name == first_name && self.last_name == last_name
    }
}

/// Payload for creating an author (the store assigns the id)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewAuthor {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub bio: String,
}

impl NewAuthor {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            bio: String::new(),
        }
    }

    pub fn with_bio(mut self, bio: impl Into<String>) -> Self {
        self.bio = bio.into();
        self
    }
}

/// Partial update; `None` keeps the stored value, `Some("")` clears it
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthorPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

impl AuthorPatch {
    pub(crate) fn apply(self, author: &mut Author) {
        if let Some(first_name) = self.first_name {
            author.first_name = first_name;
        }
        if let Some(last_name) = self.last_name {
            author.last_name = last_name;
        }
        if let Some(bio) = self.bio {
            author.bio = bio;
        }
    }
}
