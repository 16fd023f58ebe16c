//! Index addressing.

use crate::schema::Document;

/// The index (or indices) a search operation runs against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexCoordinates {
    names: Vec<String>,
}

impl IndexCoordinates {
    /// Addresses one or more indices by name.
    pub fn of<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Addresses the index of a document type.
    pub fn of_type<T: Document>() -> Self {
        Self::of([T::INDEX])
    }

    /// Index names.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Index names as the `elasticsearch` crate expects them.
    pub fn as_strs(&self) -> Vec<&str> {
        self.names.iter().map(String::as_str).collect()
    }

    /// Comma-separated form used in request paths.
    pub fn joined(&self) -> String {
        self.names.join(",")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Para;

    #[test]
    fn test_index_coordinates() {
        assert_eq!(IndexCoordinates::of_type::<Para>().names(), &["blog"]);
        let many = IndexCoordinates::of(["blog", "archive"]);
        assert_eq!(many.as_strs(), vec!["blog", "archive"]);
        assert_eq!(many.joined(), "blog,archive");
    }
}
