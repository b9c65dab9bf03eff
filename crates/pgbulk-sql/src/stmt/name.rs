use pgbulk_core::TableDescriptor;
use uuid::Uuid;

/// A possibly schema-qualified relation name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Name {
    pub schema: Option<String>,
    pub name: String,
}

/// A relation in a FROM, USING or MERGE INTO clause, with an optional alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRef {
    pub name: Name,
    pub alias: Option<String>,
}

impl Name {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            schema: None,
            name: name.into(),
        }
    }

    pub fn qualified(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: Some(schema.into()),
            name: name.into(),
        }
    }

    /// A fresh random name for a staging relation.
    pub fn staging() -> Self {
        Self::new(Uuid::new_v4().to_string())
    }

    /// A fresh random name starting with `prefix`.
    pub fn staging_with_prefix(prefix: &str) -> Self {
        Self::new(format!("{prefix}-{}", Uuid::new_v4()))
    }

    pub fn alias(self, alias: impl Into<String>) -> TableRef {
        TableRef {
            name: self,
            alias: Some(alias.into()),
        }
    }
}

impl From<&TableDescriptor> for Name {
    fn from(table: &TableDescriptor) -> Self {
        Self {
            schema: table.schema().map(str::to_string),
            name: table.name().to_string(),
        }
    }
}

impl From<&str> for Name {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<Name> for TableRef {
    fn from(name: Name) -> Self {
        Self { name, alias: None }
    }
}
