//! ID generation utilities.

use ulid::Ulid;
use uuid::Uuid;

/// Length of the opaque public link shared with voters and displays.
const LINK_LEN: usize = 8;

/// ID generator for entities.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    _private: (),
}

impl IdGenerator {
    /// Create a new ID generator.
    #[must_use]
    pub const fn new() -> Self {
        Self { _private: () }
    }

    /// Generate a new ULID-based ID.
    ///
    /// ULIDs are:
    /// - Lexicographically sortable
    /// - Monotonically increasing within the same millisecond
    /// - Shorter than UUIDs when represented as strings
    #[must_use]
    pub fn generate(&self) -> String {
        Ulid::new().to_string().to_lowercase()
    }

    /// Generate an opaque public link for an event.
    ///
    /// Links are short enough to type from a projected slide but random
    /// enough to not be guessable between concurrent events.
    #[must_use]
    pub fn generate_link(&self) -> String {
        let token = Uuid::new_v4().simple().to_string();
        token[..LINK_LEN].to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_ulid() {
        let id_gen = IdGenerator::new();
        let id1 = id_gen.generate();
        let id2 = id_gen.generate();

        assert_eq!(id1.len(), 26);
        assert_eq!(id2.len(), 26);
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_generate_link() {
        let id_gen = IdGenerator::new();
        let link = id_gen.generate_link();

        assert_eq!(link.len(), LINK_LEN);
        assert!(link.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(link, id_gen.generate_link());
    }
}
