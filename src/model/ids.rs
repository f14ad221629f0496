//! Id generation for new sections, entries and details.

use uuid::Uuid;

/// Source of fresh unique ids.
pub trait IdGenerator {
    fn next_id(&mut self) -> String;
}

/// Random v4 UUIDs in simple (hyphen-free) form.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidIds;

impl IdGenerator for UuidIds {
    fn next_id(&mut self) -> String {
        Uuid::new_v4().simple().to_string()
    }
}

/// Deterministic ids `id-1`, `id-2`, ... for reproducible documents.
#[derive(Debug, Default, Clone)]
pub struct SequentialIds {
    next: u64,
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self) -> String {
        self.next += 1;
        format!("id-{}", self.next)
    }
}
