//! Tags are name/value pairs sent along with the content to the storage network.
//!
//! The tag set is ordered, and the order is part of the payload seen by the remote. The builder
//! always emits the static tags first, in a fixed order:
//!
//! | name                 | value                                   |
//! |----------------------|-----------------------------------------|
//! | `App-Name`           | application name                        |
//! | `App-Version`        | application version                     |
//! | `Content-Type`       | declared MIME type of the content       |
//! | `Type`               | record type label                       |
//! | `Content-Identifier` | [ContentId](crate::cid::ContentId) text |
//! | `Author`             | only if an author was given             |
use std::str::FromStr;

use mime::Mime;
use serde::Serialize;
use thiserror::Error;

use log::debug;

use crate::cid::ContentId;

/// Longest name or value accepted by the storage network for a single tag, in bytes.
pub const MAX_TAG_LENGTH: usize = 1024;

pub const TAG_APP_NAME: &str = "App-Name";
pub const TAG_APP_VERSION: &str = "App-Version";
pub const TAG_CONTENT_TYPE: &str = "Content-Type";
pub const TAG_TYPE: &str = "Type";
pub const TAG_CONTENT_ID: &str = "Content-Identifier";
pub const TAG_AUTHOR: &str = "Author";

/// Record type label for archived markdown documents.
pub const RECORD_TYPE: &str = "markdown-archive";

/// Media type used when the caller does not declare one.
pub const DEFAULT_CONTENT_TYPE: &str = "text/markdown";

#[derive(Debug, Error, PartialEq)]
pub enum TagError {
    #[error("static tag {0} has no value")]
    MissingStatic(&'static str),
    #[error("tag {name} is {length} bytes, limit is {limit}")]
    TooLong {
        name: String,
        length: usize,
        limit: usize,
    },
    #[error("duplicate tag {0}")]
    Duplicate(String),
    #[error("invalid content type {0:?}")]
    ContentType(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tag {
    pub name: String,
    pub value: String,
}

/// Ordered tags with unique names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TagSet {
    tags: Vec<Tag>,
}

impl TagSet {

    pub fn new() -> TagSet {
        TagSet::default()
    }

    /// Append a tag to the end of the set.
    ///
    /// # Arguments
    ///
    /// * `name` - Tag name, must not already be in the set.
    /// * `value` - Tag value.
    pub fn push(&mut self, name: &str, value: &str) -> Result<(), TagError> {
        if name.len() > MAX_TAG_LENGTH {
            return Err(TagError::TooLong{
                name: name.to_string(),
                length: name.len(),
                limit: MAX_TAG_LENGTH,
            });
        }
        if value.len() > MAX_TAG_LENGTH {
            return Err(TagError::TooLong{
                name: name.to_string(),
                length: value.len(),
                limit: MAX_TAG_LENGTH,
            });
        }
        if self.get(name).is_some() {
            return Err(TagError::Duplicate(name.to_string()));
        }
        self.tags.push(Tag{
            name: name.to_string(),
            value: value.to_string(),
        });
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.tags.iter()
            .find(|t| t.name == name)
            .map(|t| t.value.as_str())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Tag> {
        self.tags.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.tags.iter().map(|t| t.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

impl<'a> IntoIterator for &'a TagSet {
    type Item = &'a Tag;
    type IntoIter = std::slice::Iter<'a, Tag>;

    fn into_iter(self) -> Self::IntoIter {
        self.tags.iter()
    }
}

/// Values that are the same for every upload made by an application build.
#[derive(Debug, Clone)]
pub struct TagSpec {
    pub app_name: String,
    pub app_version: String,
    pub record_type: String,
}

impl TagSpec {

    /// Values for this crate's own name and version, with the markdown record type.
    pub fn new() -> TagSpec {
        TagSpec {
            app_name: env!("CARGO_PKG_NAME").to_string(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            record_type: RECORD_TYPE.to_string(),
        }
    }

    /// Assemble the tag set for one upload.
    ///
    /// # Arguments
    ///
    /// * `content_id` - Identifier of the content being uploaded.
    /// * `content_type` - Declared MIME type of the content.
    /// * `author` - Author of the content, if known.
    pub fn build(&self, content_id: &ContentId, content_type: &str, author: Option<&str>) -> Result<TagSet, TagError> {
        let app_name = required(TAG_APP_NAME, &self.app_name)?;
        let app_version = required(TAG_APP_VERSION, &self.app_version)?;
        let record_type = required(TAG_TYPE, &self.record_type)?;
        let content_type = content_type.trim();
        if content_type.is_empty() {
            return Err(TagError::MissingStatic(TAG_CONTENT_TYPE));
        }
        if Mime::from_str(content_type).is_err() {
            return Err(TagError::ContentType(content_type.to_string()));
        }

        let mut tags = TagSet::new();
        tags.push(TAG_APP_NAME, app_name)?;
        tags.push(TAG_APP_VERSION, app_version)?;
        tags.push(TAG_CONTENT_TYPE, content_type)?;
        tags.push(TAG_TYPE, record_type)?;
        tags.push(TAG_CONTENT_ID, &content_id.to_string())?;
        match author {
            Some(v) if !v.trim().is_empty() => {
                tags.push(TAG_AUTHOR, v)?;
            },
            _ => {},
        }
        debug!("assembled {} tags for {}", tags.len(), content_id);
        Ok(tags)
    }
}

impl Default for TagSpec {
    fn default() -> TagSpec {
        TagSpec::new()
    }
}

fn required<'a>(name: &'static str, value: &'a str) -> Result<&'a str, TagError> {
    let v = value.trim();
    if v.is_empty() {
        return Err(TagError::MissingStatic(name));
    }
    Ok(v)
}
