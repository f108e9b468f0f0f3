//! Field declarations, submitted form data and per-field cleaning.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::Serialize;

use crate::admin::registry::Entity;
use crate::db::choices::Choice;
use crate::errors::{FitnessError, Result, ValidationErrors};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
const REQUIRED: &str = "This field is required.";

/// Raw submitted values keyed by field name. Inline fields are keyed
/// `"{inline}-{field}"`.
pub type FormData = BTreeMap<String, String>;

static USERNAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w.@+-]+$").expect("username pattern is valid"));
static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is valid"));

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "bmp"];
const IMAGE_UPLOAD_DIR: &str = "user_profile/";

#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    Char { max_length: usize },
    Text,
    Username,
    Email,
    Date,
    Float,
    Integer,
    PositiveInteger,
    Boolean,
    Choice(fn() -> Vec<(&'static str, &'static str)>),
    ForeignKey(Entity),
    ManyToMany(Entity),
    Image,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub default: Option<&'static str>,
    pub help_text: &'static str,
}

impl FieldSpec {
    pub const fn new(name: &'static str, label: &'static str, kind: FieldKind) -> Self {
        let required = !matches!(kind, FieldKind::Boolean | FieldKind::ManyToMany(_));
        Self {
            name,
            label,
            kind,
            required,
            default: None,
            help_text: "",
        }
    }

    pub const fn optional(self) -> Self {
        Self {
            required: false,
            ..self
        }
    }

    pub const fn default(self, value: &'static str) -> Self {
        Self {
            default: Some(value),
            required: false,
            ..self
        }
    }

    pub const fn help(self, text: &'static str) -> Self {
        Self {
            help_text: text,
            ..self
        }
    }

    /// Submitted key for this field, honouring an inline prefix.
    pub fn key(&self, prefix: Option<&str>) -> String {
        match prefix {
            Some(prefix) => format!("{}-{}", prefix, self.name),
            None => self.name.to_string(),
        }
    }

    /// Entity this field points at, for reference fields.
    pub fn target(&self) -> Option<Entity> {
        match self.kind {
            FieldKind::ForeignKey(entity) | FieldKind::ManyToMany(entity) => Some(entity),
            _ => None,
        }
    }
}

/// Initial form values: each field's default, or blank.
pub fn defaults(fields: &[FieldSpec], prefix: Option<&str>) -> FormData {
    fields
        .iter()
        .map(|f| {
            let value = match (f.default, f.kind) {
                (Some(default), _) => default.to_string(),
                (None, FieldKind::Boolean) => "false".to_string(),
                (None, _) => String::new(),
            };
            (f.key(prefix), value)
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Value {
    Null,
    Text(String),
    Date(NaiveDate),
    Float(f64),
    Int(i64),
    Bool(bool),
    Ref(i64),
    Refs(Vec<i64>),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CleanedData {
    values: BTreeMap<&'static str, Value>,
}

impl CleanedData {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn text(&self, name: &str) -> String {
        match self.values.get(name) {
            Some(Value::Text(s)) => s.clone(),
            _ => String::new(),
        }
    }

    /// Blank text becomes `None`.
    pub fn opt_text(&self, name: &str) -> Option<String> {
        Some(self.text(name)).filter(|s| !s.is_empty())
    }

    pub fn date(&self, name: &str) -> Option<NaiveDate> {
        match self.values.get(name) {
            Some(Value::Date(d)) => Some(*d),
            _ => None,
        }
    }

    pub fn float(&self, name: &str) -> Option<f64> {
        match self.values.get(name) {
            Some(Value::Float(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn int(&self, name: &str) -> Option<i64> {
        match self.values.get(name) {
            Some(Value::Int(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn boolean(&self, name: &str) -> bool {
        matches!(self.values.get(name), Some(Value::Bool(true)))
    }

    pub fn reference(&self, name: &str) -> Option<i64> {
        match self.values.get(name) {
            Some(Value::Ref(id)) => Some(*id),
            _ => None,
        }
    }

    pub fn references(&self, name: &str) -> Vec<i64> {
        match self.values.get(name) {
            Some(Value::Refs(ids)) => ids.clone(),
            _ => Vec::new(),
        }
    }

    pub fn choice<C: Choice>(&self, name: &str) -> Option<C> {
        match self.values.get(name) {
            Some(Value::Text(s)) => C::from_value(s),
            _ => None,
        }
    }

    pub fn require_date(&self, name: &str) -> Result<NaiveDate> {
        self.date(name).ok_or_else(|| FitnessError::field(name, REQUIRED))
    }

    pub fn require_float(&self, name: &str) -> Result<f64> {
        self.float(name).ok_or_else(|| FitnessError::field(name, REQUIRED))
    }

    pub fn require_int(&self, name: &str) -> Result<i64> {
        self.int(name).ok_or_else(|| FitnessError::field(name, REQUIRED))
    }

    pub fn require_reference(&self, name: &str) -> Result<i64> {
        self.reference(name)
            .ok_or_else(|| FitnessError::field(name, REQUIRED))
    }

    pub fn require_choice<C: Choice>(&self, name: &str) -> Result<C> {
        self.choice(name)
            .ok_or_else(|| FitnessError::field(name, REQUIRED))
    }
}

/// Clean every field, collecting all failures before giving up.
pub fn clean(
    fields: &'static [FieldSpec],
    data: &FormData,
    prefix: Option<&str>,
) -> std::result::Result<CleanedData, ValidationErrors> {
    let mut cleaned = CleanedData::default();
    let mut errors = ValidationErrors::default();

    for field in fields {
        let key = field.key(prefix);
        let raw = data.get(&key).map(|s| s.trim()).unwrap_or_default();
        match clean_field(field, raw) {
            Ok(value) => {
                cleaned.values.insert(field.name, value);
            }
            Err(message) => errors.add(&key, message),
        }
    }

    if errors.is_empty() {
        Ok(cleaned)
    } else {
        Err(errors)
    }
}

fn clean_field(field: &FieldSpec, raw: &str) -> std::result::Result<Value, String> {
    let raw = match (raw.is_empty(), field.default) {
        (true, Some(default)) => default,
        _ => raw,
    };
    if raw.is_empty() && !matches!(field.kind, FieldKind::Boolean) {
        if field.required {
            return Err(REQUIRED.to_string());
        }
        return Ok(match field.kind {
            FieldKind::Char { .. } | FieldKind::Text | FieldKind::Email => {
                Value::Text(String::new())
            }
            FieldKind::ManyToMany(_) => Value::Refs(Vec::new()),
            _ => Value::Null,
        });
    }

    match field.kind {
        FieldKind::Char { max_length } => {
            check_length(raw, max_length)?;
            Ok(Value::Text(raw.to_string()))
        }
        FieldKind::Text => Ok(Value::Text(raw.to_string())),
        FieldKind::Username => {
            check_length(raw, 150)?;
            if !USERNAME.is_match(raw) {
                return Err("Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.".to_string());
            }
            Ok(Value::Text(raw.to_string()))
        }
        FieldKind::Email => {
            check_length(raw, 254)?;
            if !EMAIL.is_match(raw) {
                return Err("Enter a valid email address.".to_string());
            }
            Ok(Value::Text(raw.to_string()))
        }
        FieldKind::Date => NaiveDate::parse_from_str(raw, DATE_FORMAT)
            .map(Value::Date)
            .map_err(|_| "Enter a valid date.".to_string()),
        FieldKind::Float => match raw.parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(Value::Float(v)),
            _ => Err("Enter a number.".to_string()),
        },
        FieldKind::Integer => raw
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|_| "Enter a whole number.".to_string()),
        FieldKind::PositiveInteger => match raw.parse::<i64>() {
            Ok(v) if v >= 0 => Ok(Value::Int(v)),
            Ok(_) => Err("Ensure this value is greater than or equal to 0.".to_string()),
            Err(_) => Err("Enter a whole number.".to_string()),
        },
        FieldKind::Choice(choices) => {
            if choices().iter().any(|(value, _)| *value == raw) {
                Ok(Value::Text(raw.to_string()))
            } else {
                Err(format!(
                    "Select a valid choice. {} is not one of the available choices.",
                    raw
                ))
            }
        }
        FieldKind::ForeignKey(_) => raw.parse::<i64>().map(Value::Ref).map_err(|_| {
            "Select a valid choice. That choice is not one of the available choices.".to_string()
        }),
        FieldKind::ManyToMany(_) => {
            let mut ids = Vec::new();
            for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
                let id = part
                    .parse::<i64>()
                    .map_err(|_| format!("\"{}\" is not a valid value.", part))?;
                if !ids.contains(&id) {
                    ids.push(id);
                }
            }
            Ok(Value::Refs(ids))
        }
        FieldKind::Image => {
            let extension = raw.rsplit_once('.').map(|(_, ext)| ext.to_lowercase());
            if !extension.is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str())) {
                return Err("Upload a valid image. The file you uploaded was either not an image or a corrupted image.".to_string());
            }
            let file_name = raw.rsplit('/').next().unwrap_or(raw);
            let path = format!("{}{}", IMAGE_UPLOAD_DIR, file_name);
            check_length(&path, 100)?;
            Ok(Value::Text(path))
        }
        FieldKind::Boolean => parse_bool(raw)
            .map(Value::Bool)
            .ok_or_else(|| format!("'{}' value must be either true or false.", raw)),
    }
}

fn check_length(raw: &str, max_length: usize) -> std::result::Result<(), String> {
    let length = raw.chars().count();
    if length > max_length {
        return Err(format!(
            "Ensure this value has at most {} characters (it has {}).",
            max_length, length
        ));
    }
    Ok(())
}

pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "" | "false" | "0" | "off" | "no" | "n" => Some(false),
        "true" | "1" | "on" | "yes" | "y" => Some(true),
        _ => None,
    }
}

pub fn format_bool(value: bool) -> String {
    let text = if value { "true" } else { "false" };
    text.to_string()
}

pub fn format_opt<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn format_refs(ids: &[i64]) -> String {
    ids.iter()
        .map(i64::to_string)
        .collect::<Vec<_>>()
        .join(",")
}
