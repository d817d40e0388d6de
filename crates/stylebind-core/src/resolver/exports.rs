//! package.json `exports` and `imports` evaluation.
//!
//! Supported shapes:
//! - root exports as a string, a `"."` key, or a root conditions object
//! - exact subpath keys (`"./button.module.css"`)
//! - pattern keys with one `*` (`"./*"`, `"#styles/*"`), most specific wins
//! - condition objects, nested one level

use serde_json::{Map, Value};

/// Conditions honoured when picking a target, in priority order.
pub const CONDITIONS: &[&str] = &["import", "default"];

/// Resolve an `exports` entry.
///
/// `subpath` is `None` for the package root, otherwise a `"./..."` subpath.
/// Returns the target relative to the package directory (starting with `./`).
#[must_use]
pub fn resolve_exports(pkg_json: &Value, subpath: Option<&str>) -> Option<String> {
    let exports = pkg_json.get("exports")?;

    match subpath {
        None => resolve_exports_root(exports),
        Some(sub) => {
            if !sub.starts_with("./") {
                return None;
            }
            let obj = exports.as_object()?;
            if !obj.keys().any(|k| k.starts_with("./")) {
                return None;
            }
            resolve_map_entry(obj, sub)
        }
    }
}

fn resolve_exports_root(exports: &Value) -> Option<String> {
    if let Some(s) = exports.as_str() {
        return validate_target(s);
    }

    let obj = exports.as_object()?;
    if let Some(dot) = obj.get(".") {
        return resolve_target(dot);
    }

    if CONDITIONS.iter().any(|c| obj.contains_key(*c)) {
        return resolve_conditions(obj);
    }

    None
}

/// Resolve a `#`-prefixed specifier through the `imports` field.
#[must_use]
pub fn resolve_imports(pkg_json: &Value, spec: &str) -> Option<String> {
    if !spec.starts_with('#') {
        return None;
    }
    let imports = pkg_json.get("imports")?.as_object()?;
    resolve_map_entry(imports, spec)
}

/// Exact key first, then the most specific pattern key.
fn resolve_map_entry(map: &Map<String, Value>, key: &str) -> Option<String> {
    if let Some(target) = map.get(key) {
        return resolve_target(target);
    }

    let mut best: Option<(&str, &Value, &str)> = None;
    for (pattern, value) in map {
        if pattern.matches('*').count() != 1 {
            continue;
        }
        let Some(star_value) = match_pattern(pattern, key) else {
            continue;
        };
        let better = match best {
            None => true,
            Some((current, _, _)) => {
                pattern.len() > current.len()
                    || (pattern.len() == current.len() && pattern.as_str() < current)
            }
        };
        if better {
            best = Some((pattern.as_str(), value, star_value));
        }
    }

    let (_, value, star_value) = best?;
    substitute_star(&resolve_target(value)?, star_value)
}

/// Returns the `*` substitution if `key` matches `pattern`.
fn match_pattern<'a>(pattern: &str, key: &'a str) -> Option<&'a str> {
    let (prefix, suffix) = pattern.split_once('*')?;

    if !key.starts_with(prefix) || !key.ends_with(suffix) {
        return None;
    }
    if prefix.len() + suffix.len() > key.len() {
        return None;
    }

    let star_value = &key[prefix.len()..key.len() - suffix.len()];
    if star_value.is_empty() {
        None
    } else {
        Some(star_value)
    }
}

fn substitute_star(target: &str, star_value: &str) -> Option<String> {
    if target.matches('*').count() != 1 {
        return None;
    }

    let result = target.replace('*', star_value);
    if result.split('/').any(|segment| segment == "..") {
        return None;
    }
    validate_target(&result)
}

fn resolve_target(target: &Value) -> Option<String> {
    match target {
        Value::String(s) => validate_target(s),
        Value::Object(obj) => resolve_conditions(obj),
        // Fallback arrays: first entry that resolves.
        Value::Array(items) => items.iter().find_map(resolve_target),
        _ => None,
    }
}

fn resolve_conditions(conditions: &Map<String, Value>) -> Option<String> {
    let target = CONDITIONS.iter().find_map(|c| conditions.get(*c))?;

    match target {
        Value::String(s) => validate_target(s),
        Value::Object(nested) => CONDITIONS
            .iter()
            .find_map(|c| nested.get(*c))
            .and_then(Value::as_str)
            .and_then(validate_target),
        _ => None,
    }
}

/// Targets must be package-relative.
fn validate_target(path: &str) -> Option<String> {
    path.starts_with("./").then(|| path.to_string())
}
