pub mod serializer;
pub use serializer::{Params, Placeholder, Serializer};

pub mod stmt;
pub use stmt::Statement;

/// Alias of the destination table in reconciliation statements.
pub const TARGET_ALIAS: &str = "t";

/// Alias of the staging relation in reconciliation statements.
pub const SOURCE_ALIAS: &str = "s";

/// Hidden column carrying each staged record's zero-based position.
pub const ORDINAL_COLUMN: &str = "__pgbulk_ordinal";
