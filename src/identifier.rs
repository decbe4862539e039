//! Resource identifier generation
//!
//! Every generated descriptor carries its own `uid://` identifier. Godot only
//! needs these to be unique in practice, so they are drawn from a random v4
//! UUID and truncated rather than tracked centrally.

use uuid::Uuid;

/// Length of a generated resource identifier, in hex characters
pub const RESOURCE_ID_LEN: usize = 12;

/// Source of fresh per-resource identifiers
pub trait IdentifierGenerator {
    /// Produce the identifier for the next descriptor
    fn next_id(&mut self) -> String;
}

/// Random identifiers taken from the first 12 hex digits of a v4 UUID
///
/// Collisions are improbable, not impossible.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl UuidGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl IdentifierGenerator for UuidGenerator {
    fn next_id(&mut self) -> String {
        let mut id = Uuid::new_v4().simple().to_string();
        id.truncate(RESOURCE_ID_LEN);
        id
    }
}

/// Deterministic identifiers (`000000000001`, `000000000002`, ...)
///
/// Useful for reproducible output and tests.
#[derive(Debug, Clone, Default)]
pub struct SequenceGenerator {
    next: u64,
}

impl SequenceGenerator {
    /// Start counting from 1
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    /// Start counting from `first`
    pub fn starting_at(first: u64) -> Self {
        Self { next: first }
    }
}

impl IdentifierGenerator for SequenceGenerator {
    fn next_id(&mut self) -> String {
        let id = format!("{:0width$x}", self.next, width = RESOURCE_ID_LEN);
        self.next = self.next.wrapping_add(1);
        id
    }
}
