use aws_sdk_dynamodb::types::AttributeValue;
use std::cmp::Ordering;
use std::collections::HashMap;

use crate::dynamodb::Item;

const NAME_PLACEHOLDER: &str = "#attr";
const VALUE_PLACEHOLDER: &str = ":value";

/// Comparison operators supported in scan filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOperator {
    Eq,
    Lt,
    Le,
    Gt,
    Ge,
}

impl ComparisonOperator {
    fn symbol(self) -> &'static str {
        match self {
            ComparisonOperator::Eq => "=",
            ComparisonOperator::Lt => "<",
            ComparisonOperator::Le => "<=",
            ComparisonOperator::Gt => ">",
            ComparisonOperator::Ge => ">=",
        }
    }

    fn holds(self, ordering: Ordering) -> bool {
        match self {
            ComparisonOperator::Eq => ordering == Ordering::Equal,
            ComparisonOperator::Lt => ordering == Ordering::Less,
            ComparisonOperator::Le => ordering != Ordering::Greater,
            ComparisonOperator::Gt => ordering == Ordering::Greater,
            ComparisonOperator::Ge => ordering != Ordering::Less,
        }
    }
}

/// A scan filter over a single attribute.
///
/// `Always` matches every item and sends no filter expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Always,
    Compare {
        attribute: String,
        operator: ComparisonOperator,
        value: AttributeValue,
    },
}

/// A rendered filter expression with its placeholder maps.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterExpression {
    pub expression: String,
    pub names: HashMap<String, String>,
    pub values: HashMap<String, AttributeValue>,
}

impl Condition {
    pub fn always() -> Self {
        Condition::Always
    }

    pub fn compare(
        attribute: impl Into<String>,
        operator: ComparisonOperator,
        value: AttributeValue,
    ) -> Self {
        Condition::Compare {
            attribute: attribute.into(),
            operator,
            value,
        }
    }

    /// `attribute > threshold` on a number attribute.
    pub fn greater_than(attribute: impl Into<String>, threshold: f64) -> Self {
        Self::compare(
            attribute,
            ComparisonOperator::Gt,
            AttributeValue::N(threshold.to_string()),
        )
    }

    /// Renders the condition for a `Scan` request, or `None` for [`Condition::Always`].
    pub fn to_filter_expression(&self) -> Option<FilterExpression> {
        match self {
            Condition::Always => None,
            Condition::Compare {
                attribute,
                operator,
                value,
            } => Some(FilterExpression {
                expression: format!(
                    "{NAME_PLACEHOLDER} {} {VALUE_PLACEHOLDER}",
                    operator.symbol()
                ),
                names: HashMap::from([(NAME_PLACEHOLDER.to_string(), attribute.clone())]),
                values: HashMap::from([(VALUE_PLACEHOLDER.to_string(), value.clone())]),
            }),
        }
    }

    /// Evaluates the condition against an item the way DynamoDB would:
    /// a missing attribute or a type mismatch never matches.
    pub fn matches(&self, item: &Item) -> bool {
        match self {
            Condition::Always => true,
            Condition::Compare {
                attribute,
                operator,
                value,
            } => item
                .get(attribute)
                .and_then(|actual| compare_values(actual, value))
                .is_some_and(|ordering| operator.holds(ordering)),
        }
    }
}

fn compare_values(left: &AttributeValue, right: &AttributeValue) -> Option<Ordering> {
    match (left, right) {
        (AttributeValue::N(l), AttributeValue::N(r)) => {
            let l: f64 = l.parse().ok()?;
            let r: f64 = r.parse().ok()?;
            l.partial_cmp(&r)
        }
        (AttributeValue::S(l), AttributeValue::S(r)) => Some(l.cmp(r)),
        _ => None,
    }
}
