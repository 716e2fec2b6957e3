//! Book types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Author, EntityRef};

/// Book record with an embedded copy of its author
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: u64,
    pub title: String,
    pub author: Author,
    #[serde(default)]
    pub genres: Vec<String>,
    pub published_at: DateTime<Utc>,
    pub price: f64,
    pub stock: u32,
}

/// Payload for creating a book; `author.id` must name an existing author
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBook {
    pub title: String,
    pub author: EntityRef,
    #[serde(default)]
    pub genres: Vec<String>,
    pub published_at: DateTime<Utc>,
    pub price: f64,
    #[serde(default)]
    pub stock: u32,
}

impl NewBook {
    pub fn new(title: impl Into<String>, author_id: u64, price: f64, stock: u32) -> Self {
        Self {
            title: title.into(),
            author: EntityRef::new(author_id),
            genres: Vec::new(),
            published_at: Utc::now(),
            price,
            stock,
        }
    }

    pub fn with_genres<I, S>(mut self, genres: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.genres = genres.into_iter().map(Into::into).collect();
        self
    }

    pub fn published_at(mut self, at: DateTime<Utc>) -> Self {
        self.published_at = at;
        self
    }
}

/// How a book update names its author
///
/// Any object carrying `first_name` and `last_name` goes through
/// find-or-create by name, even when it also carries an `id` (a fetched book
/// sent back with edited names). Only a bare `{"id": 3}` resolves by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AuthorSelector {
    // Tried first: untagged variants match in declaration order
    Name { first_name: String, last_name: String },
    Id { id: u64 },
}

/// Partial update for a book
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<AuthorSelector>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genres: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock: Option<u32>,
}

/// Substring filters for book search; empty strings do not filter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchCriteria {
    #[serde(default, alias = "Title")]
    pub title: String,
    #[serde(default, alias = "Author")]
    pub author: String,
    #[serde(default, alias = "Genre")]
    pub genre: String,
}

impl SearchCriteria {
    pub fn is_empty(&self) -> bool {
        self.title.is_empty() && self.author.is_empty() && self.genre.is_empty()
    }

    /// A book matches if any non-empty criterion is a substring of its field
    pub fn matches(&self, book: &Book) -> bool {
        if self.is_empty() {
            return true;
        }

        (!self.title.is_empty() && book.title.contains(&self.title))
            || (!self.author.is_empty()
                && (book.author.first_name.contains(&self.author)
                    || book.author.last_name.contains(&self.author)))
            || (!self.genre.is_empty() && book.genres.join(",").contains(&self.genre))
    }
}
