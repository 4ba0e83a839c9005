//! DynamoDB attribute conversion functions.
//!
//! Pure functions mapping backend-neutral [`Item`]s onto DynamoDB
//! `AttributeValue` maps and back. Testable without DynamoDB access.

use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;
use campusboard_core::storage::conversions::{ATTR_PK, ATTR_SK};
use campusboard_core::storage::{AttrValue, Cursor, Item, ItemKey, RepositoryError};

pub type Attributes = HashMap<String, AttributeValue>;

/// Convert a single attribute value.
///
/// String lists are stored as `L` rather than `SS` because string sets cannot
/// be empty and do not keep order.
pub fn to_attribute_value(value: AttrValue) -> AttributeValue {
    match value {
        AttrValue::S(s) => AttributeValue::S(s),
        AttrValue::N(n) => AttributeValue::N(n.to_string()),
        AttrValue::Bool(b) => AttributeValue::Bool(b),
        AttrValue::StrList(list) => {
            AttributeValue::L(list.into_iter().map(AttributeValue::S).collect())
        }
        AttrValue::Null => AttributeValue::Null(true),
    }
}

/// Convert a DynamoDB attribute value back.
pub fn from_attribute_value(name: &str, value: &AttributeValue) -> Result<AttrValue, RepositoryError> {
    let unsupported =
        || RepositoryError::Serialization(format!("Unsupported attribute type for {name}"));

    match value {
        AttributeValue::S(s) => Ok(AttrValue::S(s.clone())),
        AttributeValue::N(n) => n
            .parse()
            .map(AttrValue::N)
            .map_err(|e| RepositoryError::Serialization(format!("Invalid number {name}: {e}"))),
        AttributeValue::Bool(b) => Ok(AttrValue::Bool(*b)),
        AttributeValue::Null(_) => Ok(AttrValue::Null),
        AttributeValue::Ss(list) => Ok(AttrValue::StrList(list.clone())),
        AttributeValue::L(list) => list
            .iter()
            .map(|v| v.as_s().map(|s| s.to_string()).map_err(|_| unsupported()))
            .collect::<Result<Vec<_>, _>>()
            .map(AttrValue::StrList),
        _ => Err(unsupported()),
    }
}

/// Convert an item to a DynamoDB attribute map.
pub fn item_to_attributes(item: Item) -> Attributes {
    item.into_iter()
        .map(|(name, value)| (name, to_attribute_value(value)))
        .collect()
}

/// Convert a DynamoDB attribute map to an item.
pub fn attributes_to_item(attributes: &Attributes) -> Result<Item, RepositoryError> {
    attributes
        .iter()
        .map(|(name, value)| Ok((name.clone(), from_attribute_value(name, value)?)))
        .collect()
}

/// The `PK`/`SK` attribute map for a key.
pub fn key_to_attributes(key: &ItemKey) -> Attributes {
    HashMap::from([
        (ATTR_PK.to_string(), AttributeValue::S(key.pk.clone())),
        (ATTR_SK.to_string(), AttributeValue::S(key.sk.clone())),
    ])
}

/// Reads a `LastEvaluatedKey` back into a cursor. Empty maps mean "no more pages".
pub fn attributes_to_cursor(attributes: Option<&Attributes>) -> Option<Cursor> {
    let attributes = attributes.filter(|a| !a.is_empty())?;
    let pk = attributes.get(ATTR_PK)?.as_s().ok()?;
    let sk = attributes.get(ATTR_SK)?.as_s().ok()?;
    Some(ItemKey::new(pk.as_str(), sk.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_str_list_is_stored_as_list() {
        let value = to_attribute_value(AttrValue::StrList(vec![]));
        assert_eq!(value, AttributeValue::L(vec![]));
        assert_eq!(
            from_attribute_value("tags", &value).unwrap(),
            AttrValue::StrList(vec![])
        );
    }

    #[test]
    fn test_numbers_are_decimal_strings() {
        assert_eq!(
            to_attribute_value(AttrValue::N(-3)),
            AttributeValue::N("-3".to_string())
        );
        assert!(from_attribute_value("upvotes", &AttributeValue::N("1.5".to_string())).is_err());
    }

    #[test]
    fn test_item_round_trip() {
        let mut item = Item::new();
        item.insert("PK".to_string(), "POST#p1".into());
        item.insert("SK".to_string(), "METADATA".into());
        item.insert("upvotes".to_string(), AttrValue::N(4));
        item.insert("is_anonymous".to_string(), AttrValue::Bool(false));
        item.insert("tags".to_string(), vec!["a".to_string()].into());

        let attributes = item_to_attributes(item.clone());
        assert_eq!(attributes_to_item(&attributes).unwrap(), item);
    }

    #[test]
    fn test_cursor_from_last_evaluated_key() {
        let key = ItemKey::new("POST#p1", "COMMENT#c9");
        let attributes = key_to_attributes(&key);
        assert_eq!(attributes_to_cursor(Some(&attributes)), Some(key));
        assert_eq!(attributes_to_cursor(Some(&HashMap::new())), None);
        assert_eq!(attributes_to_cursor(None), None);
    }

    #[test]
    fn test_unsupported_type_is_rejected() {
        let value = AttributeValue::Ns(vec!["1".to_string()]);
        assert!(matches!(
            from_attribute_value("odd", &value),
            Err(RepositoryError::Serialization(_))
        ));
    }
}
