use crate::dates::{parse_date_input, to_date_input_value};
use crate::json_field::{JsonField, optional_json_value};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Product form as the dashboard UI submits it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub launch_date: String,
    #[serde(default)]
    pub archived_at: String,
    #[serde(default)]
    pub attributes: Option<Value>,
    /// Store JSON `null` over whatever attributes the product had.
    #[serde(default)]
    pub clear_attributes: bool,
    /// Set the attributes column back to NULL. Wins over `clear_attributes`.
    #[serde(default)]
    pub remove_attributes: bool,
}

/// Product as handed to the persistence layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductInput {
    pub name: String,
    pub launch_date: Option<DateTime<Utc>>,
    pub archived_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "JsonField::is_omitted")]
    pub attributes: JsonField<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    MissingName,
}

impl fmt::Display for FormError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormError::MissingName => write!(f, "name is required"),
        }
    }
}

impl std::error::Error for FormError {}

impl ProductForm {
    /// Pre-fill the form from a stored product.
    pub fn from_input(input: &ProductInput) -> Self {
        Self {
            name: input.name.clone(),
            launch_date: to_date_input_value(input.launch_date),
            archived_at: to_date_input_value(input.archived_at),
            attributes: input.attributes.as_value().cloned(),
            clear_attributes: false,
            remove_attributes: false,
        }
    }
}

impl TryFrom<ProductForm> for ProductInput {
    type Error = FormError;

    fn try_from(form: ProductForm) -> Result<Self, FormError> {
        let name = form.name.trim();
        if name.is_empty() {
            return Err(FormError::MissingName);
        }

        Ok(Self {
            name: name.to_string(),
            launch_date: parse_date_input(Some(&form.launch_date)),
            archived_at: parse_date_input(Some(&form.archived_at)),
            attributes: if form.remove_attributes {
                JsonField::DbNull
            } else if form.clear_attributes {
                JsonField::JsonNull
            } else {
                optional_json_value(form.attributes)
            },
        })
    }
}
