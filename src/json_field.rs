use serde::{Serialize, Serializer};
use serde_json::Value;

/// Value for an optional JSON column on its way to the persistence layer.
///
/// Convention for optional JSON fields:
///   - no value: [`JsonField::Omit`], the field is left out of the write
///   - an explicit JSON `null` stored in the column: [`JsonField::JsonNull`]
///   - a database NULL, only where it must be told apart from JSON `null`:
///     [`JsonField::DbNull`]
///
/// A bare `null` coming from a request body is never written as-is; run it
/// through [`optional_json_value`] first.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum JsonField<T> {
    #[default]
    Omit,
    JsonNull,
    DbNull,
    Value(T),
}

/// What a [`JsonField`] writes into its column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Column {
    Null,
    Json(String),
}

impl<T> JsonField<T> {
    pub fn is_omitted(&self) -> bool {
        matches!(self, JsonField::Omit)
    }

    pub fn as_value(&self) -> Option<&T> {
        match self {
            JsonField::Value(v) => Some(v),
            _ => None,
        }
    }
}

impl<T: Serialize> JsonField<T> {
    /// Column contents for this field, or `None` when it should be omitted.
    pub fn to_column(&self) -> serde_json::Result<Option<Column>> {
        match self {
            JsonField::Omit => Ok(None),
            JsonField::DbNull => Ok(Some(Column::Null)),
            JsonField::JsonNull => Ok(Some(Column::Json("null".into()))),
            JsonField::Value(v) => serde_json::to_string(v).map(|json| Some(Column::Json(json))),
        }
    }
}

impl<T: Serialize> Serialize for JsonField<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            JsonField::Value(v) => v.serialize(serializer),
            // Omit is expected to be skipped by the container
            JsonField::Omit | JsonField::JsonNull | JsonField::DbNull => serializer.serialize_unit(),
        }
    }
}

/// Map an optional value onto a field, omitting it when absent.
pub fn optional_json<T>(value: Option<T>) -> JsonField<T> {
    match value {
        Some(v) => JsonField::Value(v),
        None => JsonField::Omit,
    }
}

/// Same as [`optional_json`], also treating a JSON `null` as absent.
pub fn optional_json_value(value: Option<Value>) -> JsonField<Value> {
    optional_json(value.filter(|v| !v.is_null()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Serialize)]
    struct Row {
        id: u32,
        #[serde(skip_serializing_if = "JsonField::is_omitted")]
        metadata: JsonField<Value>,
    }

    #[test]
    fn absent_value_is_omitted() {
        assert_eq!(optional_json::<u32>(None), JsonField::Omit);
        assert_eq!(optional_json(Some(3)), JsonField::Value(3));
    }

    #[test]
    fn json_null_input_is_omitted() {
        assert_eq!(optional_json_value(Some(Value::Null)), JsonField::Omit);
        assert_eq!(optional_json_value(None), JsonField::Omit);
        assert_eq!(
            optional_json_value(Some(json!({"a": 1}))),
            JsonField::Value(json!({"a": 1}))
        );
    }

    #[test]
    fn columns_distinguish_json_null_from_db_null() {
        assert_eq!(JsonField::<Value>::Omit.to_column().unwrap(), None);
        assert_eq!(JsonField::<Value>::DbNull.to_column().unwrap(), Some(Column::Null));
        assert_eq!(
            JsonField::<Value>::JsonNull.to_column().unwrap(),
            Some(Column::Json("null".into()))
        );
        assert_eq!(
            JsonField::Value(json!(["x"])).to_column().unwrap(),
            Some(Column::Json(r#"["x"]"#.into()))
        );
    }

    #[test]
    fn omitted_field_is_skipped_when_serialized() {
        let row = Row { id: 1, metadata: JsonField::Omit };
        assert_eq!(serde_json::to_value(&row).unwrap(), json!({"id": 1}));

        let row = Row { id: 2, metadata: JsonField::JsonNull };
        assert_eq!(serde_json::to_value(&row).unwrap(), json!({"id": 2, "metadata": null}));
    }
}
