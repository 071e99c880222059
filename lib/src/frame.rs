/******************************************************************************
 * Copyright ContinuousC. Licensed under the "Elastic License 2.0".           *
 ******************************************************************************/

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A columnar data frame, handed to the dashboard host.
#[derive(Serialize, Deserialize, Clone, PartialEq, Default, Debug)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ref_id: Option<String>,
    pub name: String,
    pub fields: Vec<Field>,
    #[serde(default, skip_serializing_if = "Meta::is_empty")]
    pub meta: Meta,
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub values: Vec<Value>,
    #[serde(default, skip_serializing_if = "FieldConfig::is_empty")]
    pub config: FieldConfig,
}

#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Epoch milliseconds.
    Time,
    Number,
    String,
    Other,
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Default, Debug)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct FieldConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Default, Debug)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
pub struct Meta {
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub custom: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notices: Vec<Notice>,
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
pub struct Notice {
    pub severity: Severity,
    pub text: String,
}

#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Frame {
    pub fn new<N: Into<String>>(name: N) -> Self {
        Self {
            ref_id: None,
            name: name.into(),
            fields: Vec::new(),
            meta: Meta::default(),
        }
    }

    /// An empty frame carrying an error notice.
    pub fn error<T: Into<String>>(ref_id: Option<String>, text: T) -> Self {
        Self {
            ref_id,
            name: String::new(),
            fields: Vec::new(),
            meta: Meta {
                custom: Map::new(),
                notices: vec![Notice {
                    severity: Severity::Error,
                    text: text.into(),
                }],
            },
        }
    }

    pub fn with_ref_id(mut self, ref_id: Option<String>) -> Self {
        self.ref_id = ref_id;
        self
    }

    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_custom<K: Into<String>, V: Into<Value>>(mut self, key: K, value: V) -> Self {
        self.meta.custom.insert(key.into(), value.into());
        self
    }

    /// Flag the frame for map panels.
    pub fn geospatial(self) -> Self {
        self.with_custom("isGeospatialData", true)
    }

    pub fn is_geospatial(&self) -> bool {
        self.meta.custom.get("isGeospatialData") == Some(&Value::Bool(true))
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Number of rows (length of the longest column).
    pub fn len(&self) -> usize {
        self.fields.iter().map(|f| f.values.len()).max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Field {
    pub fn new<N: Into<String>>(name: N, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            values: Vec::new(),
            config: FieldConfig::default(),
        }
    }

    pub fn time<N: Into<String>>(name: N) -> Self {
        Self::new(name, FieldType::Time)
    }

    pub fn number<N: Into<String>>(name: N) -> Self {
        Self::new(name, FieldType::Number)
    }

    pub fn string<N: Into<String>>(name: N) -> Self {
        Self::new(name, FieldType::String)
    }

    pub fn with_display_name<D: Into<String>>(mut self, name: D) -> Self {
        self.config.display_name = Some(name.into());
        self
    }

    pub fn with_unit<U: Into<String>>(mut self, unit: U) -> Self {
        self.config.unit = Some(unit.into());
        self
    }

    pub fn with_values(mut self, values: Vec<Value>) -> Self {
        self.values = values;
        self
    }

    pub fn push<V: Into<Value>>(&mut self, value: V) {
        self.values.push(value.into());
    }
}

impl FieldConfig {
    pub fn is_empty(&self) -> bool {
        self.display_name.is_none() && self.unit.is_none()
    }
}

impl Meta {
    pub fn is_empty(&self) -> bool {
        self.custom.is_empty() && self.notices.is_empty()
    }
}
