use serde_json::{Map, Value};
use std::fmt;

/// Top-level fields every importable save must carry with a non-null value.
pub const REQUIRED_FIELDS: [&str; 7] = [
    "money",
    "experience",
    "knowledge",
    "day",
    "maxPlots",
    "farmTier",
    "veggies",
];

#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    NotAnObject,
    MissingField(&'static str),
    VeggiesNotArray,
    MalformedCanning(&'static str),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::NotAnObject => write!(f, "save is not a JSON object"),
            ValidationError::MissingField(field) => write!(f, "missing required field '{field}'"),
            ValidationError::VeggiesNotArray => write!(f, "'veggies' is not an array"),
            ValidationError::MalformedCanning(what) => write!(f, "malformed canning data: {what}"),
        }
    }
}

impl std::error::Error for ValidationError {}

/// A payload that passed [`validate`]. The import path only accepts this.
#[derive(Debug, Clone, Copy)]
pub struct ValidatedSave<'a> {
    raw: &'a Value,
}

impl<'a> ValidatedSave<'a> {
    pub fn as_value(&self) -> &'a Value {
        self.raw
    }
}

fn is_present(object: &Map<String, Value>, key: &str) -> bool {
    object.get(key).is_some_and(|v| !v.is_null())
}

fn array_field(object: &Map<String, Value>, key: &str) -> bool {
    object.get(key).is_some_and(Value::is_array)
}

/// Structural check of an untyped save, short-circuiting on the first
/// failure. Read-only.
pub fn validate(value: &Value) -> Result<ValidatedSave<'_>, ValidationError> {
    let object = value.as_object().ok_or(ValidationError::NotAnObject)?;

    if let Some(missing) = REQUIRED_FIELDS.iter().copied().find(|f| !is_present(object, f)) {
        return Err(ValidationError::MissingField(missing));
    }

    if !array_field(object, "veggies") {
        return Err(ValidationError::VeggiesNotArray);
    }

    if is_present(object, "canningState") {
        let canning = object["canningState"]
            .as_object()
            .ok_or(ValidationError::MalformedCanning("canningState is not an object"))?;
        let checks = [
            ("recipes", "canningState.recipes is not an array"),
            ("upgrades", "canningState.upgrades is not an array"),
            ("activeProcesses", "canningState.activeProcesses is not an array"),
        ];
        if let Some((_, what)) = checks.iter().find(|(key, _)| !array_field(canning, key)) {
            return Err(ValidationError::MalformedCanning(*what));
        }
    }

    if is_present(object, "canningProgress") {
        let progress = object["canningProgress"]
            .as_object()
            .ok_or(ValidationError::MalformedCanning("canningProgress is not an object"))?;
        if !array_field(progress, "activeProcesses") {
            return Err(ValidationError::MalformedCanning(
                "canningProgress.activeProcesses is not an array",
            ));
        }
    }

    Ok(ValidatedSave { raw: value })
}

pub fn is_valid_save(value: &Value) -> bool {
    validate(value).is_ok()
}
