use uuid::Uuid;

/// How values for a table's generated identifier are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputIdMode {
    /// The engine assigns a time-ordered UUID to every record before staging.
    ClientGenerated,

    /// The database assigns the identifier and the engine reads it back.
    ServerGenerated,
}

/// The identifier column a table generates on insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputId {
    /// Property holding the identifier
    pub name: String,

    pub mode: OutputIdMode,
}

impl OutputId {
    pub fn new(name: impl Into<String>, mode: OutputIdMode) -> Self {
        Self {
            name: name.into(),
            mode,
        }
    }
}

/// Returns a new time-ordered (version 7) UUID.
pub fn sequential_id() -> Uuid {
    Uuid::now_v7()
}
