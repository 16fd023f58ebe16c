use serde::{Deserialize, Serialize};

use crate::schema::{Document, Field, FieldType, Mapping};

use super::Writer;

/// A blog paragraph, stored in the `blog` index.
///
/// `writers` is mapped as a nested array so a query on a writer's name is
/// scoped to one writer of one paragraph. It is also included in the parent
/// document so plain `writers.name` matches work without a nested wrapper.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Para {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(default)]
    title: String,
    #[serde(default)]
    writers: Vec<Writer>,
    #[serde(default)]
    tags: Vec<String>,
}

impl Para {
    /// Creates an unsaved paragraph with the given title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// Returns the store-assigned id, if saved.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Title, analyzed as full text.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Sets the title.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// Writers of the paragraph.
    pub fn writers(&self) -> &[Writer] {
        &self.writers
    }

    /// Replaces the writers.
    pub fn set_writers(&mut self, writers: Vec<Writer>) {
        self.writers = writers;
    }

    /// Tags, unique and in insertion order.
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Replaces the tags. Duplicates are dropped, first occurrence wins.
    pub fn set_tags<I, S>(&mut self, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.clear();
        for tag in tags {
            let tag = tag.into();
            if !self.tags.contains(&tag) {
                self.tags.push(tag);
            }
        }
    }

    /// Builder-style variant of [`set_writers`](Self::set_writers).
    pub fn with_writers(mut self, writers: Vec<Writer>) -> Self {
        self.writers = writers;
        self
    }

    /// Builder-style variant of [`set_tags`](Self::set_tags).
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set_tags(tags);
        self
    }
}

impl Document for Para {
    const INDEX: &'static str = "blog";

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_id(&mut self, id: String) {
        self.id = Some(id);
    }

    fn mapping() -> Mapping {
        Mapping::new(vec![
            Field::text("title")
                .with_fielddata()
                .with_inner_field("verbatim", FieldType::Keyword),
            Field::nested("writers", vec![Field::text("name")]).with_include_in_parent(),
            Field::keyword("tags"),
        ])
    }
}
