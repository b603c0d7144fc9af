use std::collections::{BTreeMap, HashSet};

use serde_json::{json, Map};
use skydesk_core::{ToolSpec, Value};
use thiserror::Error;

pub const GET_FLIGHT_INFO: &str = "get_flight_info";
pub const SEARCH_FLIGHTS_BY_ROUTE: &str = "search_flights_by_route";
pub const GET_ALL_FLIGHTS: &str = "get_all_flights";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamType {
    String,
    Number,
    Boolean,
}

impl ParamType {
    pub fn json_type(self) -> &'static str {
        match self {
            ParamType::String => "string",
            ParamType::Number => "number",
            ParamType::Boolean => "boolean",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: String,
    pub kind: ParamType,
    pub required: bool,
    pub description: String,
}

/// A model-supplied argument after it has been checked against its declared type.
#[derive(Clone, Debug, PartialEq)]
pub enum ArgValue {
    String(String),
    Number(f64),
    Boolean(bool),
}

impl ArgValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ArgValue::String(value) => Some(value),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ToolArgs {
    values: BTreeMap<String, ArgValue>,
}

impl ToolArgs {
    pub fn get(&self, name: &str) -> Option<&ArgValue> {
        self.values.get(name)
    }

    pub fn str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(ArgValue::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ArgumentError {
    #[error("arguments must be a JSON object, got {found}")]
    NotAnObject { found: String },
    #[error("missing required parameter '{name}'")]
    Missing { name: String },
    #[error("parameter '{name}' must be a {expected}, got {found}")]
    WrongType {
        name: String,
        expected: &'static str,
        found: String,
    },
    #[error("parameter '{name}' must not be blank")]
    Blank { name: String },
    #[error("unexpected parameter '{name}'")]
    Unexpected { name: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub params: Vec<ParamSpec>,
}

impl ToolDefinition {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            params: Vec::new(),
        }
    }

    pub fn param(
        mut self,
        name: impl Into<String>,
        kind: ParamType,
        required: bool,
        description: impl Into<String>,
    ) -> Self {
        self.params.push(ParamSpec {
            name: name.into(),
            kind,
            required,
            description: description.into(),
        });
        self
    }

    /// JSON schema of the parameters, in the shape function-calling APIs expect.
    pub fn parameters_schema(&self) -> Value {
        let mut properties = Map::new();
        for param in &self.params {
            properties.insert(
                param.name.clone(),
                json!({
                    "type": param.kind.json_type(),
                    "description": param.description,
                }),
            );
        }
        let required: Vec<&str> = self
            .params
            .iter()
            .filter(|param| param.required)
            .map(|param| param.name.as_str())
            .collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    pub fn to_spec(&self) -> ToolSpec {
        ToolSpec {
            name: self.name.clone(),
            description: self.description.clone(),
            parameters: self.parameters_schema(),
        }
    }

    /// Checks untrusted arguments against the declared parameters.
    pub fn validate(&self, args: &Value) -> Result<ToolArgs, ArgumentError> {
        let empty = Map::new();
        let object = match args {
            Value::Object(object) => object,
            Value::Null => &empty,
            other => {
                return Err(ArgumentError::NotAnObject {
                    found: describe(other),
                })
            }
        };

        if let Some(name) = object
            .keys()
            .find(|key| !self.params.iter().any(|param| &param.name == *key))
        {
            return Err(ArgumentError::Unexpected { name: name.clone() });
        }

        let mut values = BTreeMap::new();
        for param in &self.params {
            let raw = match object.get(&param.name) {
                None | Some(Value::Null) if param.required => {
                    return Err(ArgumentError::Missing {
                        name: param.name.clone(),
                    })
                }
                None | Some(Value::Null) => continue,
                Some(raw) => raw,
            };

            let value = match (param.kind, raw) {
                (ParamType::String, Value::String(text)) => {
                    if param.required && text.trim().is_empty() {
                        return Err(ArgumentError::Blank {
                            name: param.name.clone(),
                        });
                    }
                    ArgValue::String(text.trim().to_string())
                }
                (ParamType::Number, Value::Number(number)) => match number.as_f64() {
                    Some(number) => ArgValue::Number(number),
                    None => return Err(wrong_type(param, raw)),
                },
                (ParamType::Boolean, Value::Bool(flag)) => ArgValue::Boolean(*flag),
                _ => return Err(wrong_type(param, raw)),
            };
            values.insert(param.name.clone(), value);
        }

        Ok(ToolArgs { values })
    }
}

fn wrong_type(param: &ParamSpec, raw: &Value) -> ArgumentError {
    ArgumentError::WrongType {
        name: param.name.clone(),
        expected: param.kind.json_type(),
        found: describe(raw),
    }
}

fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(_) => "a boolean".to_string(),
        Value::Number(_) => "a number".to_string(),
        Value::String(raw) => format!("the string {raw:?}"),
        Value::Array(_) => "an array".to_string(),
        Value::Object(_) => "an object".to_string(),
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("tool name must not be empty or whitespace: {name:?}")]
    InvalidName { name: String },
    #[error("duplicate tool name: {name}")]
    DuplicateName { name: String },
}

/// The fixed set of tools advertised to the model on every request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToolCatalog {
    definitions: Vec<ToolDefinition>,
}

impl ToolCatalog {
    pub fn new(definitions: Vec<ToolDefinition>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for definition in &definitions {
            if definition.name.trim().is_empty() {
                return Err(CatalogError::InvalidName {
                    name: definition.name.clone(),
                });
            }
            if !seen.insert(definition.name.as_str()) {
                return Err(CatalogError::DuplicateName {
                    name: definition.name.clone(),
                });
            }
        }
        Ok(Self { definitions })
    }

    pub fn flight_tools() -> Self {
        Self {
            definitions: vec![
                ToolDefinition::new(
                    GET_FLIGHT_INFO,
                    "Get detailed information about a specific flight by flight number",
                )
                .param(
                    "flight_number",
                    ParamType::String,
                    true,
                    "The flight number to look up (e.g., 'AA123', 'DL456')",
                ),
                ToolDefinition::new(
                    SEARCH_FLIGHTS_BY_ROUTE,
                    "Search for flights between specific cities or airports",
                )
                .param(
                    "departure_city",
                    ParamType::String,
                    true,
                    "The departure city or airport code",
                )
                .param(
                    "arrival_city",
                    ParamType::String,
                    true,
                    "The arrival city or airport code",
                ),
                ToolDefinition::new(
                    GET_ALL_FLIGHTS,
                    "Get a list of all available flights in the system",
                ),
            ],
        }
    }

    pub fn describe_tools(&self) -> &[ToolDefinition] {
        &self.definitions
    }

    pub fn get(&self, name: &str) -> Option<&ToolDefinition> {
        self.definitions
            .iter()
            .find(|definition| definition.name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.definitions
            .iter()
            .map(|definition| definition.name.as_str())
            .collect()
    }

    pub fn specs(&self) -> Vec<ToolSpec> {
        self.definitions.iter().map(ToolDefinition::to_spec).collect()
    }
}

impl Default for ToolCatalog {
    fn default() -> Self {
        Self::flight_tools()
    }
}
