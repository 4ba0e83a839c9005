//! Table configuration types (Functional Core - pure data).

/// Table schema configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableConfig {
    pub table_name: String,
    pub partition_key: KeyAttribute,
    pub sort_key: KeyAttribute,
    pub billing_mode: BillingMode,
}

/// A key attribute definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyAttribute {
    pub name: String,
    pub attribute_type: AttributeType,
}

impl KeyAttribute {
    fn string(name: &str) -> Self {
        Self {
            name: name.to_string(),
            attribute_type: AttributeType::String,
        }
    }
}

/// DynamoDB attribute types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeType {
    String,
}

/// Billing mode for the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BillingMode {
    PayPerRequest,
}

impl TableConfig {
    /// Sets the table name.
    pub fn with_table_name(mut self, name: &str) -> Self {
        self.table_name = name.to_string();
        self
    }

    /// Key attribute names in key-schema order (hash, then range).
    pub fn key_names(&self) -> [&str; 2] {
        [&self.partition_key.name, &self.sort_key.name]
    }
}

/// The forum's single table: every entity lives under a `PK`/`SK` pair.
/// There are no secondary indexes; feeds and searches scan by `SK`.
pub fn campusboard_table_config() -> TableConfig {
    TableConfig {
        table_name: "campusboard".to_string(),
        partition_key: KeyAttribute::string("PK"),
        sort_key: KeyAttribute::string("SK"),
        billing_mode: BillingMode::PayPerRequest,
    }
}
