use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

pub const BEANS: &str = "beans";
pub const ROASTERS: &str = "roasters";
pub const ROASTER_NAME: &str = "name";

/// A coffee bean catalog entry. Absent or `null` fields decode to their zero value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bean {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub flavors: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub roaster: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub shade: String,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl Bean {
    /// Field-by-field decode for stored records; values of the wrong type are left empty.
    pub fn from_fields_lossy(fields: &Map<String, Value>) -> Self {
        let text = |key: &str| {
            fields
                .get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };

        Self {
            flavors: fields
                .get("flavors")
                .and_then(Value::as_array)
                .map(|items| {
                    items
                        .iter()
                        .filter_map(|v| v.as_str().map(str::to_string))
                        .collect()
                })
                .unwrap_or_default(),
            name: text("name"),
            roaster: text("roaster"),
            shade: text("shade"),
        }
    }
}

/// Store-neutral record: an opaque id plus schemaless JSON fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub fields: serde_json::Map<String, serde_json::Value>,
}

impl Document {
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(|v| v.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BeansResponse {
    pub beans: Vec<Bean>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddBeanResponse {
    pub id: String,
}
