#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InsertResult {
    pub affected: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateResult {
    pub affected: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeleteResult {
    pub affected: u64,
}

/// Outcome of a merge, classified by `merge_action()`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeResult {
    pub inserted: u64,
    pub updated: u64,

    /// Every row the merge touched, deletes included
    pub affected: u64,
}
