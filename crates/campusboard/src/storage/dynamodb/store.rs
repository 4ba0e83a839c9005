//! DynamoDB item store.
//!
//! Implements [`ItemStore`] over one DynamoDB table whose primary key is the
//! string pair `PK`/`SK`.

use async_trait::async_trait;
use aws_sdk_dynamodb::types::{AttributeValue, ReturnValue};
use aws_sdk_dynamodb::Client;
use chrono::{DateTime, Utc};

use campusboard_core::storage::conversions::{item_key, ATTR_PK, ATTR_SK, ATTR_UPDATED_AT};
use campusboard_core::storage::{
    Cursor, Item, ItemKey, ItemStore, Page, PutCondition, RepositoryError, Result,
};

use super::conversions::{
    attributes_to_cursor, attributes_to_item, item_to_attributes, key_to_attributes,
    to_attribute_value, Attributes,
};
use super::error::{
    map_delete_item_error, map_get_item_error, map_put_item_error, map_query_error,
    map_scan_error, map_update_item_error,
};

/// DynamoDB-backed single-table store.
pub struct DynamoDbStore {
    client: Client,
    table_name: String,
}

impl DynamoDbStore {
    /// Creates a new store with the given DynamoDB client and table name.
    pub fn new(client: Client, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }

    /// Get the table name.
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    fn page(
        &self,
        items: Option<Vec<Attributes>>,
        last_evaluated_key: Option<&Attributes>,
    ) -> Result<Page> {
        let items = items
            .unwrap_or_default()
            .iter()
            .map(attributes_to_item)
            .collect::<Result<Vec<_>>>()?;
        Ok(Page {
            items,
            cursor: attributes_to_cursor(last_evaluated_key),
        })
    }
}

/// Builds `SET #f0 = :v0, #f1 = :v1, ...` plus its name and value bindings.
fn set_expression(
    fields: Item,
) -> (String, Vec<(String, String)>, Vec<(String, AttributeValue)>) {
    let mut clauses = Vec::with_capacity(fields.len());
    let mut names = Vec::with_capacity(fields.len());
    let mut values = Vec::with_capacity(fields.len());
    for (i, (name, value)) in fields.into_iter().enumerate() {
        clauses.push(format!("#f{i} = :v{i}"));
        names.push((format!("#f{i}"), name));
        values.push((format!(":v{i}"), to_attribute_value(value)));
    }
    (format!("SET {}", clauses.join(", ")), names, values)
}

#[async_trait]
impl ItemStore for DynamoDbStore {
    async fn put(&self, item: Item, condition: PutCondition) -> Result<()> {
        let key = item_key(&item).map_err(|e| RepositoryError::InvalidData(e.to_string()))?;

        let request = self
            .client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item_to_attributes(item)));

        let request = match condition {
            PutCondition::Always => request,
            PutCondition::IfAbsent => request.condition_expression("attribute_not_exists(PK)"),
            PutCondition::IfAttributeEquals { name, value } => request
                .condition_expression("#cond = :cond")
                .expression_attribute_names("#cond", name)
                .expression_attribute_values(":cond", to_attribute_value(value)),
        };

        request
            .send()
            .await
            .map_err(|e| map_put_item_error(e, &key))?;

        Ok(())
    }

    async fn get(&self, key: &ItemKey) -> Result<Option<Item>> {
        let result = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .set_key(Some(key_to_attributes(key)))
            .consistent_read(true)
            .send()
            .await
            .map_err(map_get_item_error)?;

        result.item.as_ref().map(attributes_to_item).transpose()
    }

    async fn update(&self, key: &ItemKey, fields: Item) -> Result<Item> {
        if fields.is_empty() {
            return Err(RepositoryError::InvalidData(
                "update requires at least one field".to_string(),
            ));
        }
        if fields.contains_key(ATTR_PK) || fields.contains_key(ATTR_SK) {
            return Err(RepositoryError::InvalidData(
                "key attributes cannot be updated".to_string(),
            ));
        }

        let (expression, names, values) = set_expression(fields);
        let mut request = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .set_key(Some(key_to_attributes(key)))
            .update_expression(expression)
            .condition_expression("attribute_exists(PK)")
            .return_values(ReturnValue::AllNew);
        for (placeholder, name) in names {
            request = request.expression_attribute_names(placeholder, name);
        }
        for (placeholder, value) in values {
            request = request.expression_attribute_values(placeholder, value);
        }

        let result = request
            .send()
            .await
            .map_err(|e| map_update_item_error(e, key))?;

        attributes_to_item(&result.attributes.unwrap_or_default())
    }

    async fn delete(&self, key: &ItemKey) -> Result<Option<Item>> {
        let result = self
            .client
            .delete_item()
            .table_name(&self.table_name)
            .set_key(Some(key_to_attributes(key)))
            .return_values(ReturnValue::AllOld)
            .send()
            .await
            .map_err(|e| map_delete_item_error(e, key))?;

        result
            .attributes
            .as_ref()
            .filter(|old| !old.is_empty())
            .map(attributes_to_item)
            .transpose()
    }

    async fn query(&self, pk: &str, sk_prefix: &str, cursor: Option<Cursor>) -> Result<Page> {
        let mut request = self
            .client
            .query()
            .table_name(&self.table_name)
            .consistent_read(true)
            .expression_attribute_values(":pk", AttributeValue::S(pk.to_string()))
            .set_exclusive_start_key(cursor.as_ref().map(key_to_attributes));

        request = if sk_prefix.is_empty() {
            request.key_condition_expression("PK = :pk")
        } else {
            request
                .key_condition_expression("PK = :pk AND begins_with(SK, :prefix)")
                .expression_attribute_values(":prefix", AttributeValue::S(sk_prefix.to_string()))
        };

        let result = request.send().await.map_err(map_query_error)?;
        self.page(result.items, result.last_evaluated_key.as_ref())
    }

    async fn scan(&self, sort_key_equals: Option<&str>, cursor: Option<Cursor>) -> Result<Page> {
        let mut request = self
            .client
            .scan()
            .table_name(&self.table_name)
            .set_exclusive_start_key(cursor.as_ref().map(key_to_attributes));

        if let Some(sk) = sort_key_equals {
            request = request
                .filter_expression("SK = :sk")
                .expression_attribute_values(":sk", AttributeValue::S(sk.to_string()));
        }

        let result = request.send().await.map_err(map_scan_error)?;
        self.page(result.items, result.last_evaluated_key.as_ref())
    }

    async fn atomic_add(
        &self,
        key: &ItemKey,
        attribute: &str,
        delta: i64,
        touched_at: DateTime<Utc>,
    ) -> Result<i64> {
        let result = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .set_key(Some(key_to_attributes(key)))
            .update_expression("ADD #counter :delta SET #updated = :now")
            .condition_expression("attribute_exists(PK)")
            .expression_attribute_names("#counter", attribute)
            .expression_attribute_names("#updated", ATTR_UPDATED_AT)
            .expression_attribute_values(":delta", AttributeValue::N(delta.to_string()))
            .expression_attribute_values(":now", AttributeValue::S(touched_at.to_rfc3339()))
            .return_values(ReturnValue::UpdatedNew)
            .send()
            .await
            .map_err(|e| map_update_item_error(e, key))?;

        result
            .attributes
            .as_ref()
            .and_then(|attrs| attrs.get(attribute))
            .and_then(|value| value.as_n().ok())
            .and_then(|n| n.parse().ok())
            .ok_or_else(|| {
                RepositoryError::Serialization(format!("UpdateItem returned no {attribute}"))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campusboard_core::storage::AttrValue;

    #[test]
    fn test_set_expression_binds_every_field() {
        let mut fields = Item::new();
        fields.insert("content".to_string(), "new body".into());
        fields.insert("title".to_string(), "new title".into());

        let (expression, names, values) = set_expression(fields);
        assert_eq!(expression, "SET #f0 = :v0, #f1 = :v1");
        assert_eq!(
            names,
            vec![
                ("#f0".to_string(), "content".to_string()),
                ("#f1".to_string(), "title".to_string()),
            ]
        );
        assert_eq!(values[1].1, to_attribute_value(AttrValue::from("new title")));
    }
}
