use uuid::Uuid;

/// Source of fresh identifiers for entries and photos.
///
/// Passed explicitly through the pipeline so tests can swap in a
/// deterministic sequence.
pub trait IdMinter {
    fn mint(&mut self) -> String;
}

/// Uppercase, hyphen-free random v4 UUIDs.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidMinter;

impl IdMinter for UuidMinter {
    fn mint(&mut self) -> String {
        Uuid::new_v4().simple().to_string().to_ascii_uppercase()
    }
}

/// Deterministic identifiers shaped like the real ones: 32 uppercase hex digits.
#[derive(Debug, Default, Clone)]
pub struct SequentialIds {
    next: u128,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    pub fn starting_at(first: u128) -> Self {
        Self { next: first }
    }
}

impl IdMinter for SequentialIds {
    fn mint(&mut self) -> String {
        let id = format!("{:032X}", self.next);
        self.next += 1;
        id
    }
}
