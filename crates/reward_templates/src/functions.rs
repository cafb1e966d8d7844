//! Template function table.
//!
//! Templates get a general string/math/list library plus a few helpers for
//! compose files:
//!
//! - `isEnabled(value)` coerces bools, integers and strings to a bool
//! - `parseKV("k1=v1,k2=v2")` turns a key/value string into a mapping
//! - `include`, `tpl`, `required` and `lookup` are inert stubs so helm-style
//!   directives in shared fragments render instead of failing
//!
//! Process environment access (`env`, `expandenv`) is never installed, even
//! when a caller registers it explicitly: rendered output must depend on the
//! settings context alone.

use std::collections::BTreeMap;

use minijinja::value::{Rest, Value, ValueKind};
use minijinja::{Environment, Error, ErrorKind};
use tracing::debug;

use reward_core::Settings;

/// Functions that are stripped from every registry.
pub const DISABLED_FUNCTIONS: &[&str] = &["env", "expandenv"];

/// Placeholder returned by the helm-style stubs.
pub const NOT_IMPLEMENTED: &str = "not implemented";

/// Immutable table of named template functions.
#[derive(Debug, Clone)]
pub struct FunctionRegistry {
    functions: BTreeMap<String, Value>,
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FunctionRegistry {
    /// The standard table: base library plus the domain helpers.
    pub fn new() -> Self {
        Self::builder().base_library().domain_functions().build()
    }

    pub fn builder() -> FunctionRegistryBuilder {
        FunctionRegistryBuilder::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.functions.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Register every function as a global of `env`.
    pub fn install(&self, env: &mut Environment<'_>) {
        for (name, function) in &self.functions {
            env.add_global(name.clone(), function.clone());
        }
    }
}

/// Collects functions before freezing them into a [`FunctionRegistry`].
#[derive(Debug, Default)]
pub struct FunctionRegistryBuilder {
    functions: BTreeMap<String, Value>,
}

impl FunctionRegistryBuilder {
    /// Add or replace a function. Use [`Value::from_function`] to wrap a
    /// Rust closure.
    pub fn function(mut self, name: impl Into<String>, function: Value) -> Self {
        self.functions.insert(name.into(), function);
        self
    }

    /// String, logic, conversion, math and list helpers.
    pub fn base_library(self) -> Self {
        self
            // strings
            .function("lower", Value::from_function(|s: String| s.to_lowercase()))
            .function("upper", Value::from_function(|s: String| s.to_uppercase()))
            .function("title", Value::from_function(|s: String| title(&s)))
            .function("trim", Value::from_function(|s: String| s.trim().to_string()))
            .function(
                "trimPrefix",
                Value::from_function(|prefix: String, s: String| {
                    s.strip_prefix(prefix.as_str()).unwrap_or(&s).to_string()
                }),
            )
            .function(
                "trimSuffix",
                Value::from_function(|suffix: String, s: String| {
                    s.strip_suffix(suffix.as_str()).unwrap_or(&s).to_string()
                }),
            )
            .function(
                "hasPrefix",
                Value::from_function(|prefix: String, s: String| s.starts_with(&prefix)),
            )
            .function(
                "hasSuffix",
                Value::from_function(|suffix: String, s: String| s.ends_with(&suffix)),
            )
            .function(
                "contains",
                Value::from_function(|needle: String, s: String| s.contains(&needle)),
            )
            .function(
                "replace",
                Value::from_function(|old: String, new: String, s: String| s.replace(&old, &new)),
            )
            .function("quote", Value::from_function(|v: Value| quote(&v, '"')))
            .function("squote", Value::from_function(|v: Value| quote(&v, '\'')))
            .function(
                "split",
                Value::from_function(|sep: String, s: String| -> Vec<String> {
                    s.split(sep.as_str()).map(String::from).collect()
                }),
            )
            .function(
                "join",
                Value::from_function(|sep: String, items: Vec<Value>| {
                    items
                        .iter()
                        .map(display)
                        .collect::<Vec<_>>()
                        .join(&sep)
                }),
            )
            .function(
                "indent",
                Value::from_function(|width: usize, s: String| indent(width, &s)),
            )
            .function(
                "nindent",
                Value::from_function(|width: usize, s: String| format!("\n{}", indent(width, &s))),
            )
            .function(
                "repeat",
                Value::from_function(|count: usize, s: String| s.repeat(count)),
            )
            // logic
            .function(
                "default",
                Value::from_function(|fallback: Value, given: Option<Value>| match given {
                    Some(value) if value.is_true() => value,
                    _ => fallback,
                }),
            )
            .function(
                "empty",
                Value::from_function(|given: Option<Value>| {
                    !given.map_or(false, |value| value.is_true())
                }),
            )
            .function(
                "coalesce",
                Value::from_function(|values: Rest<Value>| {
                    values
                        .iter()
                        .find(|value| value.is_true())
                        .cloned()
                        .unwrap_or(Value::from(()))
                }),
            )
            .function(
                "ternary",
                Value::from_function(|if_true: Value, if_false: Value, condition: Value| {
                    if condition.is_true() {
                        if_true
                    } else {
                        if_false
                    }
                }),
            )
            // conversion
            .function(
                "toString",
                Value::from_function(|v: Value| display(&v)),
            )
            .function(
                "atoi",
                Value::from_function(|s: String| s.trim().parse::<i64>().unwrap_or(0)),
            )
            // math
            .function("add", math(i64::checked_add, "add"))
            .function("sub", math(i64::checked_sub, "sub"))
            .function("mul", math(i64::checked_mul, "mul"))
            .function("div", math(i64::checked_div, "div"))
            .function("mod", math(i64::checked_rem, "mod"))
            .function("max", Value::from_function(|a: i64, b: i64| a.max(b)))
            .function("min", Value::from_function(|a: i64, b: i64| a.min(b)))
            // lists
            .function(
                "list",
                Value::from_function(|values: Rest<Value>| Value::from(values.0)),
            )
    }

    /// `isEnabled`, `parseKV` and the helm-style stubs.
    pub fn domain_functions(self) -> Self {
        self.function(
            "isEnabled",
            Value::from_function(|given: Option<Value>| {
                given.map_or(false, |value| is_enabled(&value))
            }),
        )
        .function(
            "parseKV",
            Value::from_function(|input: Option<String>| {
                Value::from_serialize(parse_kv(input.as_deref().unwrap_or_default()))
            }),
        )
        .function(
            "include",
            Value::from_function(|_args: Rest<Value>| NOT_IMPLEMENTED.to_string()),
        )
        .function(
            "tpl",
            Value::from_function(|_args: Rest<Value>| NOT_IMPLEMENTED.to_string()),
        )
        .function(
            "required",
            Value::from_function(|_args: Rest<Value>| NOT_IMPLEMENTED.to_string()),
        )
        .function(
            "lookup",
            Value::from_function(|_args: Rest<Value>| {
                Value::from_serialize(BTreeMap::<String, String>::new())
            }),
        )
    }

    /// Freeze the table, dropping [`DISABLED_FUNCTIONS`].
    pub fn build(mut self) -> FunctionRegistry {
        for name in DISABLED_FUNCTIONS {
            if self.functions.remove(*name).is_some() {
                debug!("Template function {} is disabled, removing it", name);
            }
        }

        FunctionRegistry {
            functions: self.functions,
        }
    }
}

/// Whether `given` is `true`, the integer `1`, or the string `"1"`/`"true"`
/// (any case). Every other value is false.
pub fn is_enabled(given: &Value) -> bool {
    match given.kind() {
        ValueKind::Bool => given.is_true(),
        ValueKind::Number if given.is_integer() => {
            i64::try_from(given.clone()).map_or(false, |n| n == 1)
        }
        ValueKind::String => given
            .as_str()
            .map_or(false, |s| s.eq_ignore_ascii_case("true") || s == "1"),
        _ => false,
    }
}

/// [`is_enabled`] applied to a settings key. Missing keys are `default`.
pub fn setting_enabled(settings: &Settings, key: &str, default: bool) -> bool {
    settings
        .get(key)
        .map_or(default, |value| is_enabled(&Value::from_serialize(value)))
}

/// Split `k1=v1,k2=v2` into a mapping. The last occurrence of a key wins;
/// segments without `=` or with an empty key are skipped.
pub fn parse_kv(input: &str) -> BTreeMap<String, String> {
    input
        .split(',')
        .filter_map(|segment| segment.split_once('='))
        .filter(|(key, _)| !key.is_empty())
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

fn math(op: fn(i64, i64) -> Option<i64>, name: &'static str) -> Value {
    Value::from_function(move |a: i64, b: i64| -> Result<i64, Error> {
        op(a, b).ok_or_else(|| {
            Error::new(
                ErrorKind::InvalidOperation,
                format!("{} of {} and {} is undefined", name, a, b),
            )
        })
    })
}

/// Text of a value as templates print it.
fn display(value: &Value) -> String {
    match value.kind() {
        ValueKind::Bool => value.is_true().to_string(),
        ValueKind::String => value.as_str().unwrap_or_default().to_string(),
        _ => value.to_string(),
    }
}

fn quote(value: &Value, mark: char) -> String {
    if value.is_undefined() || value.is_none() {
        return String::new();
    }
    let text = display(value);
    if mark == '"' {
        let escaped = text.replace('\\', "\\\\").replace('"', "\\\"");
        format!("\"{}\"", escaped)
    } else {
        format!("'{}'", text.replace('\'', "''"))
    }
}

fn title(s: &str) -> String {
    s.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn indent(width: usize, s: &str) -> String {
    let pad = " ".repeat(width);
    s.lines()
        .map(|line| format!("{}{}", pad, line))
        .collect::<Vec<_>>()
        .join("\n")
}
