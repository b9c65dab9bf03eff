use pgbulk_core::TableDescriptor;
use pgbulk_sql::stmt::{SetClauseContext, SetClauseFn};

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Options shared by every bulk operation.
#[derive(Debug, Clone)]
pub struct BulkOptions {
    /// Number of staged rows between progress log lines. `0` logs only the
    /// total.
    pub batch_size: usize,

    /// Upper bound for each statement. `None` waits forever.
    pub timeout: Option<Duration>,

    /// Receives one line before and after each phase of the operation.
    pub log_to: Option<LogSink>,

    /// Issue a single parameterized statement when given exactly one record.
    pub single_row_fast_path: bool,
}

impl Default for BulkOptions {
    fn default() -> Self {
        Self {
            batch_size: 0,
            timeout: Some(Duration::from_secs(30)),
            log_to: None,
            single_row_fast_path: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct InsertOptions {
    pub bulk: BulkOptions,

    /// Stage caller-supplied ids as an ordinary column instead of reading
    /// generated ones back.
    pub keep_identity: bool,

    /// Write generated ids back onto the records when the table has an
    /// output id.
    pub return_generated_id: bool,

    /// Stream records straight into the destination table when no ids are
    /// read back, skipping the staging relation.
    pub direct_copy: bool,
}

impl Default for InsertOptions {
    fn default() -> Self {
        Self {
            bulk: BulkOptions::default(),
            keep_identity: false,
            return_generated_id: true,
            direct_copy: false,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct UpdateOptions {
    pub bulk: BulkOptions,

    /// Collation applied to textual key columns in the join.
    pub collation: Option<String>,

    pub configure_set_clause: Option<SetClauseHook>,
}

#[derive(Debug, Clone, Default)]
pub struct DeleteOptions {
    pub bulk: BulkOptions,

    /// Collation applied to textual key columns in the join.
    pub collation: Option<String>,
}

#[derive(Debug, Clone)]
pub struct MergeOptions {
    pub bulk: BulkOptions,

    /// Collation applied to textual key columns in the join.
    pub collation: Option<String>,

    /// Write generated ids back onto inserted records when the table has a
    /// server-generated output id.
    pub return_generated_id: bool,

    pub configure_set_clause: Option<SetClauseHook>,

    /// Appends `WHEN NOT MATCHED BY SOURCE THEN <action>` to the merge.
    pub configure_when_not_matched_by_source: Option<NotMatchedBySourceHook>,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            bulk: BulkOptions::default(),
            collation: None,
            return_generated_id: true,
            configure_set_clause: None,
            configure_when_not_matched_by_source: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MatchOptions {
    pub bulk: BulkOptions,

    /// Collation applied to textual match columns in the join.
    pub collation: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct StagingTableOptions {
    pub bulk: BulkOptions,

    /// Exact name of the relation. Takes precedence over `prefix`.
    pub table_name: Option<String>,

    /// Prefix of a generated `<prefix>-<uuid>` name.
    pub prefix: Option<String>,
}

/// Destination of the human-readable operation log.
///
/// Each line reads `<yyyy-MM-dd HH:mm:ss.fff zzz> [<Operation>]: <message>`.
#[derive(Clone)]
pub struct LogSink(Arc<dyn Fn(&str) + Send + Sync>);

impl LogSink {
    pub fn new(sink: impl Fn(&str) + Send + Sync + 'static) -> Self {
        Self(Arc::new(sink))
    }

    pub(crate) fn write(&self, operation: &str, message: &str) {
        let now = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f %:z");
        (self.0)(&format!("{now} [{operation}]: {message}"));
    }
}

impl fmt::Debug for LogSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("LogSink(..)")
    }
}

/// Overrides the `SET` fragment of individual columns.
///
/// The callback sees the default `left` and `right` fragments and returns the
/// complete replacement, or `None` to keep `left = right`.
#[derive(Clone)]
pub struct SetClauseHook(pub(crate) Arc<SetClauseFn>);

impl SetClauseHook {
    pub fn new(
        hook: impl Fn(&SetClauseContext<'_>) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        Self(Arc::new(hook))
    }
}

impl fmt::Debug for SetClauseHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SetClauseHook(..)")
    }
}

/// What a "not matched by source" hook sees.
#[derive(Debug)]
pub struct NotMatchedBySourceContext<'a> {
    pub descriptor: &'a TableDescriptor,
    pub target_alias: &'a str,
    pub source_alias: &'a str,
}

/// Supplies the action of a `WHEN NOT MATCHED BY SOURCE` branch, e.g.
/// `DELETE`.
#[derive(Clone)]
pub struct NotMatchedBySourceHook(
    pub(crate) Arc<dyn Fn(&NotMatchedBySourceContext<'_>) -> String + Send + Sync>,
);

impl NotMatchedBySourceHook {
    pub fn new(
        hook: impl Fn(&NotMatchedBySourceContext<'_>) -> String + Send + Sync + 'static,
    ) -> Self {
        Self(Arc::new(hook))
    }
}

impl fmt::Debug for NotMatchedBySourceHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("NotMatchedBySourceHook(..)")
    }
}
