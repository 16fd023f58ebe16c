use std::fmt;

use serde::{Deserialize, Serialize};

/// The writer of a [`Para`](super::Para).
///
/// Stored as a nested sub-document; `name` is an analyzed text field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Writer {
    #[serde(default)]
    name: String,
}

impl Writer {
    /// Creates a writer with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Returns the writer's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Replaces the writer's name.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }
}

impl fmt::Display for Writer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Writer{{name='{}'}}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writer_equality_is_by_value() {
        assert_eq!(Writer::new("John Doe"), Writer::new("John Doe"));
        assert_ne!(Writer::new("John Doe"), Writer::new("John Smith"));
    }

    #[test]
    fn test_writer_display() {
        assert_eq!(Writer::new("John Smith").to_string(), "Writer{name='John Smith'}");
    }

    #[test]
    fn test_writer_json() {
        let json = serde_json::to_value(Writer::new("John Smith")).unwrap();
        assert_eq!(json, serde_json::json!({ "name": "John Smith" }));
    }
}
