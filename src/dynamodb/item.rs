use aws_sdk_dynamodb::types::AttributeValue;
use std::collections::{BTreeMap, HashMap};

/// Represents a DynamoDB item with various attribute types.
///
/// In DynamoDB, an item is a collection of attributes, each with a name and a value.
/// Items are similar to rows or records in other database systems.
///
/// # Item Structure
///
/// - Each item consists of one or more attributes, kept ordered by name.
/// - Supported value types here are String, Number and String Set.
/// - Setters consume and return the item, so an item cannot change once it
///   has been handed to a [`TableClient`](super::TableClient).
///
/// # Example
///
/// ```ignore
/// use dynamodb::Item;
///
/// let item = Item::new()
///     .set_string("semester", "fall2016")
///     .set_number("gpa", 4.0)
///     .set_string_set("subjects", ["Data Science", "Big Data"]);
/// ```
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Item {
    attributes: BTreeMap<String, AttributeValue>,
}

impl Item {
    /// Creates a new empty `Item`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a string attribute.
    pub fn set_string(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes
            .insert(key.into(), AttributeValue::S(value.into()));
        self
    }

    /// Sets a number attribute.
    ///
    /// DynamoDB transmits numbers as decimal strings.
    pub fn set_number(mut self, key: impl Into<String>, value: impl Into<f64>) -> Self {
        self.attributes
            .insert(key.into(), AttributeValue::N(value.into().to_string()));
        self
    }

    /// Sets a string set attribute.
    pub fn set_string_set<I, S>(mut self, key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.attributes
            .insert(key.into(), AttributeValue::Ss(values));
        self
    }

    /// Sets a raw attribute value.
    pub fn set(mut self, key: impl Into<String>, value: AttributeValue) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&AttributeValue> {
        self.attributes.get(key)
    }

    /// Gets the value of an attribute as a string.
    ///
    /// Returns `None` if the attribute doesn't exist or is not a string.
    pub fn get_string(&self, key: &str) -> Option<&String> {
        self.attributes.get(key).and_then(|av| av.as_s().ok())
    }

    /// Gets the value of an attribute as a number (f64).
    ///
    /// Returns `None` if the attribute doesn't exist, is not a number, or can't be parsed as f64.
    pub fn get_number(&self, key: &str) -> Option<f64> {
        self.attributes
            .get(key)
            .and_then(|av| av.as_n().ok())
            .and_then(|n| n.parse().ok())
    }

    /// Gets the value of an attribute as a string set.
    pub fn get_string_set(&self, key: &str) -> Option<&Vec<String>> {
        self.attributes.get(key).and_then(|av| av.as_ss().ok())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &AttributeValue)> {
        self.attributes.iter()
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// Returns a new item holding only `attribute`, if present.
    pub(crate) fn project(&self, attribute: &str) -> Option<Item> {
        self.attributes
            .get(attribute)
            .map(|value| Item::new().set(attribute, value.clone()))
    }

    /// Converts the item into the map shape the SDK sends on the wire.
    pub fn into_attributes(self) -> HashMap<String, AttributeValue> {
        self.attributes.into_iter().collect()
    }
}

impl From<HashMap<String, AttributeValue>> for Item {
    fn from(attributes: HashMap<String, AttributeValue>) -> Self {
        Self {
            attributes: attributes.into_iter().collect(),
        }
    }
}
