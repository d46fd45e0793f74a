//! Placeholder-name allocation for one statement.

/// Prefix of placeholders bound by condition compilation.
pub const CONDITION_PLACEHOLDER: &str = ":db_condition_placeholder_";

/// Prefix of placeholders bound by INSERT/UPSERT value rows.
pub const INSERT_PLACEHOLDER: &str = ":db_insert_placeholder_";

/// Monotonic counter handing out unique placeholder suffixes.
///
/// One allocator covers one statement's whole clause tree; share it (by
/// `&mut`) between every condition compiled into the same statement so no two
/// fragments bind the same name.
#[derive(Debug, Default)]
pub struct PlaceholderAllocator {
    next: usize,
}

impl PlaceholderAllocator {
    /// Start counting from zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the next unused suffix.
    pub fn next_placeholder(&mut self) -> usize {
        let n = self.next;
        self.next += 1;
        n
    }

    /// Allocate a full placeholder name under `prefix`.
    pub fn next_name(&mut self, prefix: &str) -> String {
        format!("{prefix}{}", self.next_placeholder())
    }
}
