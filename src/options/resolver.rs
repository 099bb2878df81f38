//! Token stream → typed options.

use std::collections::HashMap;

use tracing::debug;

use super::value::infer;
use super::{OptionValue, ParamDef, ParamKind};

/// Options produced by [`resolve`], keyed by the parameter's full name.
pub type ParsedOptions = HashMap<String, OptionValue>;

/// Lookup from every accepted spelling to its parameter.
struct AliasTable<'a> {
    entries: HashMap<String, (&'a ParamDef, ParamKind)>,
}

impl<'a> AliasTable<'a> {
    fn build(schema: &'a [ParamDef]) -> Self {
        let mut entries = HashMap::new();

        for param in schema {
            let slot = (param, param.effective_kind());

            entries.insert(param.name.clone(), slot);
            entries.insert(param.hyphenated(), slot);

            // First parameter to reach a letter keeps it.
            if let Some(short) = param.short_flag() {
                if !entries.contains_key(&short) {
                    entries.insert(short, slot);
                } else {
                    debug!("Short flag -{} already taken, '{}' gets none", short, param.name);
                }
            }

            for alias in &param.aliases {
                entries.insert(alias.clone(), slot);
            }
        }

        Self { entries }
    }

    fn lookup(&self, name: &str) -> Option<(&'a ParamDef, ParamKind)> {
        self.entries.get(name).copied()
    }
}

/// The short flag each parameter answers to, in schema order.
///
/// A letter belongs to the first parameter that claims it, unless a later
/// full name or alias took the same spelling. Letters that only repeat the
/// parameter's own name or an alias are left out.
pub fn short_flags(schema: &[ParamDef]) -> Vec<Option<String>> {
    let table = AliasTable::build(schema);
    schema
        .iter()
        .map(|param| {
            param
                .short_flag()
                .filter(|short| {
                    *short != param.name
                        && *short != param.hyphenated()
                        && !param.aliases.contains(short)
                })
                .filter(|short| {
                    table
                        .lookup(short)
                        .is_some_and(|(owner, _)| std::ptr::eq(owner, param))
                })
        })
        .collect()
}

fn is_flag(token: &str) -> bool {
    token.starts_with('-')
}

/// Split tokens into free text and options according to a template schema.
///
/// Flag-shaped tokens (leading dashes) name an option; depending on the
/// option's kind the following token may be taken as its value. Anything
/// that cannot be parsed degrades to a `true` flag and the offending token
/// is kept as free text. Unknown flags are still accepted, with their value
/// type guessed from the next token.
pub fn resolve<S: AsRef<str>>(tokens: &[S], schema: &[ParamDef]) -> (Vec<String>, ParsedOptions) {
    let table = AliasTable::build(schema);
    let mut residual = Vec::new();
    let mut options = ParsedOptions::new();

    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i].as_ref();
        i += 1;

        if !is_flag(token) {
            residual.push(token.to_string());
            continue;
        }

        let name = token.trim_start_matches('-');
        let next = tokens
            .get(i)
            .map(|t| t.as_ref())
            .filter(|t| !is_flag(t));

        let Some((param, kind)) = table.lookup(name) else {
            let value = match next {
                Some(raw) => {
                    i += 1;
                    infer(raw)
                }
                None => OptionValue::Bool(true),
            };
            options.insert(name.to_string(), value);
            continue;
        };

        let value = match kind {
            ParamKind::Bool => OptionValue::Bool(true),
            ParamKind::Int | ParamKind::Float => match next.and_then(|raw| parse_number(raw, kind)) {
                Some(value) => {
                    i += 1;
                    value
                }
                None => {
                    if let Some(raw) = next {
                        debug!("Option '{}' expects {}, got '{}'", param.name, kind, raw);
                    }
                    OptionValue::Bool(true)
                }
            },
            ParamKind::Str => match next {
                Some(raw) => {
                    i += 1;
                    OptionValue::Str(raw.to_string())
                }
                None => OptionValue::Bool(true),
            },
            ParamKind::Unspecified => match next {
                Some(raw) => {
                    i += 1;
                    infer(raw)
                }
                None => OptionValue::Bool(true),
            },
        };

        options.insert(param.name.clone(), value);
    }

    (residual, options)
}

fn parse_number(raw: &str, kind: ParamKind) -> Option<OptionValue> {
    match kind {
        ParamKind::Int => raw.parse::<i64>().ok().map(OptionValue::Int),
        ParamKind::Float => raw.parse::<f64>().ok().map(OptionValue::Float),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(tokens: &[&str], schema: &[ParamDef]) -> (Vec<String>, ParsedOptions) {
        resolve(tokens, schema)
    }

    #[test]
    fn test_short_bool_flag() {
        let schema = [ParamDef::new("bold", ParamKind::Bool)];
        let (residual, options) = run(&["-b"], &schema);
        assert!(residual.is_empty());
        assert_eq!(options.get("bold"), Some(&OptionValue::Bool(true)));
    }

    #[test]
    fn test_int_consumes_value() {
        let schema = [ParamDef::new("size", ParamKind::Int).default_value(0i64)];
        let (residual, options) = run(&["--size", "12", "hello"], &schema);
        assert_eq!(residual, vec!["hello"]);
        assert_eq!(options.get("size"), Some(&OptionValue::Int(12)));
    }

    #[test]
    fn test_no_schema_infers_string() {
        let (residual, options) = run(&["-x", "foo"], &[]);
        assert!(residual.is_empty());
        assert_eq!(options.get("x"), Some(&OptionValue::from("foo")));
    }

    #[test]
    fn test_failed_number_falls_back_to_flag() {
        let schema = [ParamDef::new("size", ParamKind::Int)];
        let (residual, options) = run(&["--size", "abc"], &schema);
        assert_eq!(residual, vec!["abc"]);
        assert_eq!(options.get("size"), Some(&OptionValue::Bool(true)));
    }

    #[test]
    fn test_first_short_flag_wins() {
        let schema = [
            ParamDef::new("bold", ParamKind::Bool),
            ParamDef::new("brightness", ParamKind::Float),
        ];
        let (residual, options) = run(&["-b", "0.5"], &schema);
        assert_eq!(options.get("bold"), Some(&OptionValue::Bool(true)));
        assert!(!options.contains_key("brightness"));
        assert_eq!(residual, vec!["0.5"]);

        let (_, options) = run(&["--brightness", "0.5"], &schema);
        assert_eq!(options.get("brightness"), Some(&OptionValue::Float(0.5)));
    }

    #[test]
    fn test_aliases_and_hyphenated_names() {
        let schema = [ParamDef::new("text_color", ParamKind::Str).alias("color")];
        let (_, options) = run(&["--text-color", "red"], &schema);
        assert_eq!(options.get("text_color"), Some(&OptionValue::from("red")));

        let (_, options) = run(&["--color", "blue"], &schema);
        assert_eq!(options.get("text_color"), Some(&OptionValue::from("blue")));

        let (_, options) = run(&["-t", "green"], &schema);
        assert_eq!(options.get("text_color"), Some(&OptionValue::from("green")));
    }

    #[test]
    fn test_value_never_taken_from_flag() {
        let schema = [
            ParamDef::new("name", ParamKind::Str),
            ParamDef::new("circle", ParamKind::Bool),
        ];
        let (residual, options) = run(&["--name", "--circle", "hi"], &schema);
        assert_eq!(options.get("name"), Some(&OptionValue::Bool(true)));
        assert_eq!(options.get("circle"), Some(&OptionValue::Bool(true)));
        assert_eq!(residual, vec!["hi"]);
    }

    #[test]
    fn test_missing_value_sets_true() {
        let schema = [ParamDef::new("size", ParamKind::Int)];
        let (residual, options) = run(&["text", "--size"], &schema);
        assert_eq!(residual, vec!["text"]);
        assert_eq!(options.get("size"), Some(&OptionValue::Bool(true)));
    }

    #[test]
    fn test_negative_number_is_not_a_value() {
        let schema = [ParamDef::new("size", ParamKind::Int)];
        let (residual, options) = run(&["--size", "-5"], &schema);
        assert_eq!(options.get("size"), Some(&OptionValue::Bool(true)));
        // "-5" is itself flag-shaped and becomes an unknown flag "5"
        assert_eq!(options.get("5"), Some(&OptionValue::Bool(true)));
        assert!(residual.is_empty());
    }

    #[test]
    fn test_unspecified_kind_uses_default_shape() {
        let schema = [
            ParamDef::new("count", ParamKind::Unspecified).default_value(1i64),
            ParamDef::new("flip", ParamKind::Unspecified).default_value(false),
        ];
        let (residual, options) = run(&["--count", "x", "--flip", "y"], &schema);
        assert_eq!(options.get("count"), Some(&OptionValue::Bool(true)));
        assert_eq!(options.get("flip"), Some(&OptionValue::Bool(true)));
        assert_eq!(residual, vec!["x", "y"]);
    }

    #[test]
    fn test_unspecified_with_string_default_takes_raw_token() {
        let schema = [ParamDef::new("background", ParamKind::Unspecified).default_value("white")];
        let (residual, options) = run(&["--background", "red", "hi"], &schema);
        assert_eq!(options.get("background"), Some(&OptionValue::from("red")));
        assert_eq!(residual, vec!["hi"]);

        // a string default never reinterprets the value as a number
        let (_, options) = run(&["--background", "12"], &schema);
        assert_eq!(options.get("background"), Some(&OptionValue::from("12")));
    }

    #[test]
    fn test_short_flags_follow_resolution() {
        let schema = [
            ParamDef::new("size", ParamKind::Int),
            ParamDef::new("style", ParamKind::Str),
            ParamDef::new("circle", ParamKind::Bool),
            ParamDef::new("x", ParamKind::Bool),
            ParamDef::new("mode", ParamKind::Str),
            ParamDef::new("mirror", ParamKind::Bool).alias("m"),
        ];
        assert_eq!(
            short_flags(&schema),
            vec![
                Some("s".to_string()),
                None,
                Some("c".to_string()),
                None,
                // a later alias took "-m"
                None,
                None,
            ]
        );

        let (_, options) = run(&["-m"], &schema);
        assert_eq!(options.get("mirror"), Some(&OptionValue::Bool(true)));
    }

    #[test]
    fn test_unspecified_without_default_infers() {
        let schema = [ParamDef::new("level", ParamKind::Unspecified)];
        let (_, options) = run(&["--level", "2.5"], &schema);
        assert_eq!(options.get("level"), Some(&OptionValue::Float(2.5)));

        let (_, options) = run(&["--level", "FALSE"], &schema);
        assert_eq!(options.get("level"), Some(&OptionValue::Bool(false)));
    }

    #[test]
    fn test_float_accepts_integer_text() {
        let schema = [ParamDef::new("ratio", ParamKind::Float)];
        let (_, options) = run(&["--ratio", "2"], &schema);
        assert_eq!(options.get("ratio"), Some(&OptionValue::Float(2.0)));
    }

    #[test]
    fn test_bare_dashes_are_unknown_flags() {
        let (residual, options) = run(&["--", "x"], &[]);
        assert!(residual.is_empty());
        assert_eq!(options.get(""), Some(&OptionValue::from("x")));
    }

    #[test]
    fn test_residual_preserves_order() {
        let schema = [ParamDef::new("size", ParamKind::Int)];
        let (residual, _) = run(&["a", "--size", "3", "b", "--zzz", "c", "d"], &schema);
        assert_eq!(residual, vec!["a", "b", "d"]);
    }
}
