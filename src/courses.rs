use aws_sdk_dynamodb::types::AttributeValue;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::dynamodb::{Item, Result};

pub const SEMESTER_KEY: &str = "semester";
pub const GPA_ATTRIBUTE: &str = "gpa";
pub const SUBJECTS_ATTRIBUTE: &str = "subjects";

/// One semester's courses and the GPA earned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub semester: String,
    pub gpa: f64,
    #[serde(serialize_with = "serde_dynamo::string_set::serialize")]
    pub subjects: Vec<String>,
}

impl Course {
    pub fn new(semester: impl Into<String>, gpa: f64, subjects: &[&str]) -> Self {
        Self {
            semester: semester.into(),
            gpa,
            subjects: subjects.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn to_item(&self) -> Result<Item> {
        let attributes: HashMap<String, AttributeValue> = serde_dynamo::to_item(self)?;
        Ok(Item::from(attributes))
    }

    pub fn from_item(item: Item) -> Result<Self> {
        Ok(serde_dynamo::from_item(item.into_attributes())?)
    }
}

/// The records the demo inserts.
pub fn sample_courses() -> Vec<Course> {
    vec![
        Course::new(
            "spring2016",
            3.0,
            &["Data Mining", "AI", "Machine Learning"],
        ),
        Course::new(
            "fall2016",
            4.0,
            &["Data Science", "Web Services", "Big Data"],
        ),
        Course::new(
            "spring2017",
            3.9,
            &["NoSQL", "Web Design", "Cloud Computing"],
        ),
    ]
}
