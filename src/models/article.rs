use std::fmt;

use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Category;
use crate::{Error, Result};

pub const EXCERPT_LENGTH: usize = 150;
pub const WORDS_PER_MINUTE: usize = 200;
pub const DEFAULT_AUTHOR: &str = "Current User";

const DATE_FORMAT: &str = "%b %-d, %Y";

/// A published article. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: String,
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub author: String,
    pub date: String,
    pub category: Category,
    pub image_url: String,
    pub read_time: String,
}

impl Article {
    /// Checks a record rehydrated from storage.
    pub fn check(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(Error::validation("article id is empty"));
        }
        if self.title.trim().is_empty() {
            return Err(Error::validation(format!("article {} has no title", self.id)));
        }
        if self.content.trim().is_empty() {
            return Err(Error::validation(format!("article {} has no content", self.id)));
        }
        Ok(())
    }

    pub fn share_text(&self) -> String {
        format!("{}\n\n{}\n\nShared from Lumina Blog", self.title, self.excerpt)
    }
}

/// Compose-form input; everything else is derived on creation.
#[derive(Debug, Clone, Default)]
pub struct NewArticle {
    pub title: String,
    pub content: String,
    pub author: Option<String>,
    pub category: Option<Category>,
}

impl NewArticle {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            ..Self::default()
        }
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(Error::validation("title is required"));
        }
        if self.content.trim().is_empty() {
            return Err(Error::validation("content is required"));
        }
        Ok(())
    }

    /// Builds the article; the display date is taken in `now`'s time zone.
    pub fn into_article<Tz>(self, now: DateTime<Tz>) -> Result<Article>
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        self.validate()?;

        let author = self
            .author
            .map(|author| author.trim().to_string())
            .filter(|author| !author.is_empty())
            .unwrap_or_else(|| DEFAULT_AUTHOR.to_string());

        Ok(Article {
            id: Uuid::new_v4().to_string(),
            excerpt: excerpt(&self.content, EXCERPT_LENGTH),
            read_time: read_time(&self.content),
            date: now.format(DATE_FORMAT).to_string(),
            category: self.category.unwrap_or_default(),
            image_url: format!(
                "https://picsum.photos/seed/{}/800/450",
                now.timestamp_millis()
            ),
            title: self.title,
            content: self.content,
            author,
        })
    }
}

/// First `length` characters, with an ellipsis only when something was cut.
pub fn excerpt(content: &str, length: usize) -> String {
    let chars: String = content.chars().take(length).collect();
    if content.chars().count() > length {
        format!("{}...", chars)
    } else {
        chars
    }
}

pub fn read_time(content: &str) -> String {
    let words = content.split_whitespace().count();
    let minutes = words.div_ceil(WORDS_PER_MINUTE).max(1);
    format!("{} min read", minutes)
}
