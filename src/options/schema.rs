//! Per-template option schema.

use std::collections::BTreeSet;
use std::fmt;

use serde::Deserialize;

use super::OptionValue;

/// Declared type of an option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamKind {
    Bool,
    Int,
    Float,
    Str,
    #[default]
    Unspecified,
}

impl ParamKind {
    /// The kind a value of this shape would declare.
    pub fn of_value(value: &OptionValue) -> Self {
        match value {
            OptionValue::Bool(_) => Self::Bool,
            OptionValue::Int(_) => Self::Int,
            OptionValue::Float(_) => Self::Float,
            OptionValue::Str(_) => Self::Str,
        }
    }
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::Str => "str",
            Self::Unspecified => "any",
        };
        f.write_str(name)
    }
}

/// One named option a template accepts.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawParamDef")]
pub struct ParamDef {
    pub name: String,
    pub aliases: BTreeSet<String>,
    pub kind: ParamKind,
    pub default: Option<OptionValue>,
}

/// Catalog form of a `ParamDef`; `type` may be left out.
#[derive(Deserialize)]
struct RawParamDef {
    name: String,
    #[serde(default)]
    aliases: BTreeSet<String>,
    #[serde(default, rename = "type")]
    kind: Option<ParamKind>,
    #[serde(default)]
    default: Option<OptionValue>,
}

impl From<RawParamDef> for ParamDef {
    fn from(raw: RawParamDef) -> Self {
        // Derive the kind once here so parsing never has to look at defaults.
        let kind = match raw.kind {
            Some(kind) => kind,
            None => raw
                .default
                .as_ref()
                .map(ParamKind::of_value)
                .unwrap_or_default(),
        };

        Self {
            name: raw.name,
            aliases: raw.aliases,
            kind,
            default: raw.default,
        }
    }
}

impl ParamDef {
    #[allow(dead_code)]
    pub fn new(name: impl Into<String>, kind: ParamKind) -> Self {
        Self {
            name: name.into(),
            aliases: BTreeSet::new(),
            kind,
            default: None,
        }
    }

    #[must_use]
    #[allow(dead_code)]
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.insert(alias.into());
        self
    }

    #[must_use]
    #[allow(dead_code)]
    pub fn default_value(mut self, value: impl Into<OptionValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// The kind used for parsing: the declared one, or the default's shape
    /// when the declaration is `Unspecified`.
    pub fn effective_kind(&self) -> ParamKind {
        match (self.kind, &self.default) {
            (ParamKind::Unspecified, Some(default)) => ParamKind::of_value(default),
            (kind, _) => kind,
        }
    }

    /// Name with underscores turned into hyphens.
    pub fn hyphenated(&self) -> String {
        self.name.replace('_', "-")
    }

    /// Derived one-letter flag candidate.
    pub fn short_flag(&self) -> Option<String> {
        self.name
            .chars()
            .next()
            .map(|c| c.to_lowercase().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_derived_from_default() {
        let defs: Vec<ParamDef> = serde_json::from_str(
            r#"[
                {"name": "circle", "default": false},
                {"name": "size", "default": 12},
                {"name": "ratio", "default": 0.5},
                {"name": "text_color", "default": "red", "aliases": ["color"]},
                {"name": "anything"},
                {"name": "forced", "type": "str", "default": 3}
            ]"#,
        )
        .unwrap();

        let kinds: Vec<ParamKind> = defs.iter().map(|d| d.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ParamKind::Bool,
                ParamKind::Int,
                ParamKind::Float,
                ParamKind::Str,
                ParamKind::Unspecified,
                ParamKind::Str,
            ]
        );
        assert!(defs[3].aliases.contains("color"));
        assert_eq!(defs[3].hyphenated(), "text-color");
    }

    #[test]
    fn test_effective_kind_uses_default_when_unspecified() {
        let def = ParamDef::new("n", ParamKind::Unspecified).default_value(1i64);
        assert_eq!(def.effective_kind(), ParamKind::Int);
        assert_eq!(ParamDef::new("n", ParamKind::Unspecified).effective_kind(), ParamKind::Unspecified);
    }

    #[test]
    fn test_short_flag_lowercase() {
        assert_eq!(ParamDef::new("Bold", ParamKind::Bool).short_flag().as_deref(), Some("b"));
        assert_eq!(ParamDef::new("", ParamKind::Bool).short_flag(), None);
    }
}
