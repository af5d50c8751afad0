//! Identifier generation for persisted entities.

use uuid::Uuid;

/// Length of generated ids
pub const ID_LEN: usize = 21;

/// Source of opaque unique ids.
pub trait IdSource: Send {
    fn next_id(&mut self) -> String;
}

/// Random ids: the first 21 hex digits of a v4 UUID.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIds;

impl IdSource for UuidIds {
    fn next_id(&mut self) -> String {
        let mut id = Uuid::new_v4().simple().to_string();
        id.truncate(ID_LEN);
        id
    }
}

/// Counter-based ids (`<prefix><n>`), for reproducible output.
#[derive(Debug, Clone)]
pub struct SequentialIds {
    prefix: String,
    next: u64,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 1,
        }
    }
}

impl IdSource for SequentialIds {
    fn next_id(&mut self) -> String {
        let id = format!("{}{}", self.prefix, self.next);
        self.next += 1;
        id
    }
}
