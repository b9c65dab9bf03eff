use super::{OutputId, OutputIdMode, ValueConverter};

use indexmap::IndexMap;
use std::borrow::Cow;

/// Describes the table a record type is stored in and how its properties map
/// onto columns.
///
/// Descriptors are immutable once built. Use [`TableDescriptor::builder`].
#[derive(Debug, Clone)]
pub struct TableDescriptor {
    schema: Option<String>,
    name: String,
    primary_keys: Vec<String>,
    output_id: Option<OutputId>,
    property_names: Option<Vec<String>>,
    insertable_property_names: Option<Vec<String>>,
    column_names: IndexMap<String, String>,
    column_types: IndexMap<String, String>,
    converters: IndexMap<String, ValueConverter>,
}

#[derive(Debug)]
pub struct TableDescriptorBuilder {
    descriptor: TableDescriptor,
}

impl TableDescriptor {
    pub fn builder(name: impl Into<String>) -> TableDescriptorBuilder {
        TableDescriptorBuilder {
            descriptor: TableDescriptor {
                schema: None,
                name: name.into(),
                primary_keys: vec![],
                output_id: None,
                property_names: None,
                insertable_property_names: None,
                column_names: IndexMap::new(),
                column_types: IndexMap::new(),
                converters: IndexMap::new(),
            },
        }
    }

    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Primary key properties, used as the default match columns.
    pub fn primary_keys(&self) -> &[String] {
        &self.primary_keys
    }

    pub fn output_id(&self) -> Option<&OutputId> {
        self.output_id.as_ref()
    }

    /// Returns `true` if the database generates the identifier.
    pub fn is_server_generated(&self) -> bool {
        matches!(
            self.output_id,
            Some(OutputId {
                mode: OutputIdMode::ServerGenerated,
                ..
            })
        )
    }

    /// All persisted properties, when narrower than the record's property list.
    pub fn property_names(&self) -> Option<&[String]> {
        self.property_names.as_deref()
    }

    /// Properties written by an insert when the caller gives no column list.
    pub fn insertable_property_names(&self) -> Option<&[String]> {
        self.insertable_property_names.as_deref()
    }

    /// The target column for `property`.
    ///
    /// Unmapped properties use their own name with nested paths flattened,
    /// so `Address.Street` becomes `Address_Street`.
    pub fn column_name<'a>(&'a self, property: &'a str) -> Cow<'a, str> {
        match self.column_names.get(property) {
            Some(column) => Cow::Borrowed(column),
            None => flatten(property),
        }
    }

    /// The explicit SQL type configured for `property`, if any.
    pub fn column_type(&self, property: &str) -> Option<&str> {
        self.column_types.get(property).map(String::as_str)
    }

    pub fn converter(&self, property: &str) -> Option<&ValueConverter> {
        self.converters.get(property)
    }
}

impl TableDescriptorBuilder {
    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.descriptor.schema = Some(schema.into());
        self
    }

    pub fn primary_key(mut self, property: impl Into<String>) -> Self {
        self.descriptor.primary_keys.push(property.into());
        self
    }

    pub fn output_id(mut self, property: impl Into<String>, mode: OutputIdMode) -> Self {
        self.descriptor.output_id = Some(OutputId::new(property, mode));
        self
    }

    pub fn property_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.descriptor.property_names = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn insertable_property_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.descriptor.insertable_property_names =
            Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn column_name(mut self, property: impl Into<String>, column: impl Into<String>) -> Self {
        self.descriptor
            .column_names
            .insert(property.into(), column.into());
        self
    }

    pub fn column_type(mut self, property: impl Into<String>, sql_type: impl Into<String>) -> Self {
        self.descriptor
            .column_types
            .insert(property.into(), sql_type.into());
        self
    }

    pub fn converter(mut self, property: impl Into<String>, converter: ValueConverter) -> Self {
        self.descriptor
            .converters
            .insert(property.into(), converter);
        self
    }

    pub fn build(self) -> TableDescriptor {
        self.descriptor
    }
}

/// Flattens a dotted property path into a column name.
pub(crate) fn flatten(property: &str) -> Cow<'_, str> {
    if property.contains('.') {
        Cow::Owned(property.replace('.', "_"))
    } else {
        Cow::Borrowed(property)
    }
}
