//! The known team roster.
//!
//! Used in two places: person-name detection inside free-text queries, and
//! resolution of raw source user identifiers into display names.

use std::collections::HashMap;

/// Known people and the source-identifier lookup table.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    people: Vec<String>,
    user_ids: HashMap<String, String>,
}

impl Roster {
    pub fn new(people: Vec<String>, user_ids: HashMap<String, String>) -> Self {
        Self { people, user_ids }
    }

    /// All known display names.
    pub fn people(&self) -> &[String] {
        &self.people
    }

    /// Find the first roster member mentioned in an already lower-cased
    /// query. Matches on the full name or on the first name alone, plain
    /// substring containment either way.
    pub fn find_in_query(&self, query_lower: &str) -> Option<String> {
        for person in &self.people {
            let full = person.to_lowercase();
            if query_lower.contains(&full) {
                return Some(person.clone());
            }
            if let Some(first) = full.split_whitespace().next() {
                if first.len() > 2 && query_lower.contains(first) {
                    return Some(person.clone());
                }
            }
        }
        None
    }

    /// Resolve a raw source user identifier to a display name, if known.
    pub fn display_name(&self, user_id: &str) -> Option<&str> {
        self.user_ids.get(user_id).map(String::as_str)
    }

    /// Synthesized stand-in name for an identifier the lookup table does not
    /// know, so the owning task is never silently dropped.
    pub fn placeholder_name(user_id: &str) -> String {
        let prefix: String = user_id.chars().take(8).collect();
        format!("User_{prefix}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster() -> Roster {
        Roster::new(
            vec!["Alice Johnson".to_string(), "Bob".to_string(), "Omar Diaz".to_string()],
            HashMap::from([("u-123".to_string(), "Alice Johnson".to_string())]),
        )
    }

    #[test]
    fn test_find_by_first_name() {
        let r = roster();
        assert_eq!(
            r.find_in_query("what is alice working on?"),
            Some("Alice Johnson".to_string())
        );
        assert_eq!(
            r.find_in_query("show me omar's tasks"),
            Some("Omar Diaz".to_string())
        );
    }

    #[test]
    fn test_short_first_names_require_full_match() {
        // "Bob" is only three characters; it still matches, but a two-letter
        // name would not, which keeps "is" from matching someone named "Is".
        let r = roster();
        assert_eq!(r.find_in_query("anything for bob today"), Some("Bob".to_string()));
        assert_eq!(r.find_in_query("what is the status"), None);
    }

    #[test]
    fn test_display_name_and_placeholder() {
        let r = roster();
        assert_eq!(r.display_name("u-123"), Some("Alice Johnson"));
        assert_eq!(r.display_name("u-999"), None);
        assert_eq!(Roster::placeholder_name("abcdef1234567890"), "User_abcdef12");
    }
}
