//! Sample paragraphs.
//!
//! Four paragraphs by two writers with overlapping tags. Queries in the
//! tests and the CLI `seed` command are written against this set.

use super::{Para, Writer};

/// John Smith.
pub fn john_smith() -> Writer {
    Writer::new("John Smith")
}

/// John Doe.
pub fn john_doe() -> Writer {
    Writer::new("John Doe")
}

/// Returns the four sample paragraphs, unsaved.
pub fn sample_paras() -> Vec<Para> {
    vec![
        Para::new("Spring Data Elasticsearch")
            .with_writers(vec![john_smith(), john_doe()])
            .with_tags(["elasticsearch", "spring data"]),
        Para::new("Search engines")
            .with_writers(vec![john_doe()])
            .with_tags(["search engines", "tutorial"]),
        Para::new("Second Article About Elasticsearch")
            .with_writers(vec![john_smith()])
            .with_tags(["elasticsearch", "spring data"]),
        Para::new("Elasticsearch Tutorial")
            .with_writers(vec![john_doe()])
            .with_tags(["elasticsearch"]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_paras_tag_counts() {
        let paras = sample_paras();
        let count = |tag: &str| {
            paras
                .iter()
                .filter(|p| p.tags().iter().any(|t| t == tag))
                .count()
        };
        assert_eq!(paras.len(), 4);
        assert_eq!(count("elasticsearch"), 3);
        assert_eq!(count("spring data"), 2);
        assert_eq!(count("search engines"), 1);
        assert_eq!(count("tutorial"), 1);
    }

    #[test]
    fn test_sample_paras_writers() {
        let paras = sample_paras();
        let by = |writer: &Writer| paras.iter().filter(|p| p.writers().contains(writer)).count();
        assert_eq!(by(&john_smith()), 2);
        assert_eq!(by(&john_doe()), 3);
    }
}
