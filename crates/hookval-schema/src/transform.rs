//! Schema rewrites derived from engine options.

use serde_json::{Map, Value};

use crate::options::{EngineOptions, Presence};

/// Build the schema actually compiled for `options`.
pub(crate) fn prepare_schema(schema: &Value, options: &EngineOptions) -> Value {
    let mut prepared = schema.clone();

    if !options.allow_unknown {
        close_object_schemas(&mut prepared, false);
    }

    if options.presence == Presence::Required {
        visit_object_schemas(&mut prepared, &mut require_all_properties);
    }

    prepared
}

/// Reject undeclared keys on every object schema that declares keys.
///
/// Subschemas applied in place (`allOf` branches, `if`/`then`/`else`, ...)
/// are left open. The schema composing them is closed instead with
/// `unevaluatedProperties`, which sees the keys every applied branch declares.
fn close_object_schemas(value: &mut Value, in_place: bool) {
    match value {
        Value::Object(map) => {
            let open = !map.contains_key("additionalProperties")
                && !map.contains_key("unevaluatedProperties");
            if open && !in_place {
                if has_in_place_applicators(map) {
                    if composes_declared_keys(map) {
                        map.insert("unevaluatedProperties".to_string(), Value::Bool(false));
                    }
                } else if declares_keys(map) {
                    map.insert("additionalProperties".to_string(), Value::Bool(false));
                }
            }
            for_each_subschema(map, &mut |child, child_in_place| {
                close_object_schemas(child, child_in_place)
            });
        }
        Value::Array(items) => {
            for item in items {
                close_object_schemas(item, in_place);
            }
        }
        _ => {}
    }
}

fn require_all_properties(map: &mut Map<String, Value>) {
    let Some(Value::Object(properties)) = map.get("properties") else {
        return;
    };
    let declared: Vec<String> = properties.keys().cloned().collect();

    let required = map
        .entry("required")
        .or_insert_with(|| Value::Array(Vec::new()));
    if let Value::Array(items) = required {
        for key in declared {
            if !items.iter().any(|item| item.as_str() == Some(key.as_str())) {
                items.push(Value::String(key));
            }
        }
    }
}

/// Call `f` on every object schema reachable from `value`.
pub(crate) fn visit_object_schemas(
    value: &mut Value,
    f: &mut dyn FnMut(&mut Map<String, Value>),
) {
    match value {
        Value::Object(map) => {
            if is_object_schema(map) {
                f(map);
            }
            for_each_subschema(map, &mut |child, _| visit_object_schemas(child, &mut *f));
        }
        Value::Array(items) => {
            for item in items {
                visit_object_schemas(item, f);
            }
        }
        _ => {}
    }
}

const IN_PLACE_LISTS: [&str; 3] = ["allOf", "anyOf", "oneOf"];
const IN_PLACE_SINGLE: [&str; 4] = ["not", "if", "then", "else"];

/// Call `f` on each direct subschema of `map`. The flag is true for
/// subschemas applied to the same instance as `map`.
fn for_each_subschema(
    map: &mut Map<String, Value>,
    f: &mut dyn FnMut(&mut Value, bool),
) {
    for (key, in_place) in [
        ("properties", false),
        ("patternProperties", false),
        ("$defs", false),
        ("definitions", false),
        ("dependentSchemas", true),
    ] {
        if let Some(Value::Object(obj)) = map.get_mut(key) {
            for value in obj.values_mut() {
                f(value, in_place);
            }
        }
    }

    for key in ["additionalProperties", "items", "contains"] {
        if let Some(value) = map.get_mut(key) {
            f(value, false);
        }
    }
    for key in IN_PLACE_SINGLE {
        if let Some(value) = map.get_mut(key) {
            f(value, true);
        }
    }

    if let Some(Value::Array(items)) = map.get_mut("prefixItems") {
        for item in items {
            f(item, false);
        }
    }
    for key in IN_PLACE_LISTS {
        if let Some(Value::Array(items)) = map.get_mut(key) {
            for item in items {
                f(item, true);
            }
        }
    }
}

fn has_in_place_applicators(map: &Map<String, Value>) -> bool {
    IN_PLACE_LISTS
        .iter()
        .chain(IN_PLACE_SINGLE.iter())
        .any(|key| map.contains_key(*key))
        || map.contains_key("dependentSchemas")
}

fn declares_keys(map: &Map<String, Value>) -> bool {
    map.contains_key("properties") || map.contains_key("patternProperties")
}

/// True when `map` or any in-place branch under it declares keys.
fn composes_declared_keys(map: &Map<String, Value>) -> bool {
    if declares_keys(map) {
        return true;
    }
    let lists = IN_PLACE_LISTS
        .iter()
        .filter_map(|key| map.get(*key).and_then(Value::as_array))
        .flatten();
    let singles = IN_PLACE_SINGLE.iter().filter_map(|key| map.get(*key));
    let dependent = map
        .get("dependentSchemas")
        .and_then(Value::as_object)
        .into_iter()
        .flat_map(|schemas| schemas.values());

    lists
        .chain(singles)
        .chain(dependent)
        .filter_map(Value::as_object)
        .any(composes_declared_keys)
}

/// Keys declared by `schema` and the in-place branches under it.
pub(crate) fn composed_properties(schema: &Value) -> Vec<&str> {
    let mut keys = Vec::new();
    collect_composed_properties(schema, &mut keys);
    keys
}

fn collect_composed_properties<'a>(schema: &'a Value, keys: &mut Vec<&'a str>) {
    let Some(map) = schema.as_object() else {
        return;
    };
    if let Some(properties) = map.get("properties").and_then(Value::as_object) {
        keys.extend(properties.keys().map(String::as_str));
    }
    for key in IN_PLACE_LISTS {
        for branch in map.get(key).and_then(Value::as_array).into_iter().flatten() {
            collect_composed_properties(branch, keys);
        }
    }
    for key in ["if", "then", "else"] {
        if let Some(branch) = map.get(key) {
            collect_composed_properties(branch, keys);
        }
    }
    if let Some(schemas) = map.get("dependentSchemas").and_then(Value::as_object) {
        for branch in schemas.values() {
            collect_composed_properties(branch, keys);
        }
    }
}

pub(crate) fn is_object_schema(map: &Map<String, Value>) -> bool {
    match map.get("type") {
        Some(Value::String(kind)) => kind == "object",
        Some(Value::Array(items)) => items
            .iter()
            .any(|item| matches!(item, Value::String(kind) if kind == "object")),
        _ => is_object_keyword_schema(map),
    }
}

fn is_object_keyword_schema(map: &Map<String, Value>) -> bool {
    const OBJECT_KEYWORDS: [&str; 6] = [
        "properties",
        "patternProperties",
        "additionalProperties",
        "required",
        "dependentRequired",
        "propertyNames",
    ];

    OBJECT_KEYWORDS
        .iter()
        .any(|keyword| map.contains_key(*keyword))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn options(allow_unknown: bool, presence: Presence) -> EngineOptions {
        EngineOptions {
            allow_unknown,
            presence,
            ..EngineOptions::default()
        }
    }

    #[test]
    fn closes_nested_objects_when_unknown_disallowed() {
        let schema = json!({
            "type": "object",
            "properties": {
                "nested": {"properties": {"v": {"type": "integer"}}},
                "open": {"type": "object", "additionalProperties": true}
            }
        });

        let prepared = prepare_schema(&schema, &options(false, Presence::Optional));
        assert_eq!(prepared["additionalProperties"], json!(false));
        assert_eq!(
            prepared["properties"]["nested"]["additionalProperties"],
            json!(false)
        );
        assert_eq!(
            prepared["properties"]["open"]["additionalProperties"],
            json!(true)
        );
    }

    #[test]
    fn free_form_objects_stay_open() {
        let schema = json!({
            "type": "object",
            "properties": {"meta": {"type": "object"}}
        });

        let prepared = prepare_schema(&schema, &options(false, Presence::Optional));
        assert_eq!(prepared["additionalProperties"], json!(false));
        assert!(prepared["properties"]["meta"].get("additionalProperties").is_none());
    }

    #[test]
    fn compositions_close_at_the_composing_schema() {
        let schema = json!({
            "type": "object",
            "allOf": [
                {"properties": {"a": {"type": "string"}}},
                {"properties": {"b": {"type": "object", "properties": {"c": {}}}}}
            ]
        });

        let prepared = prepare_schema(&schema, &options(false, Presence::Optional));
        assert_eq!(prepared["unevaluatedProperties"], json!(false));
        assert!(prepared.get("additionalProperties").is_none());
        assert!(prepared["allOf"][0].get("additionalProperties").is_none());
        assert!(prepared["allOf"][1].get("additionalProperties").is_none());
        assert_eq!(
            prepared["allOf"][1]["properties"]["b"]["additionalProperties"],
            json!(false)
        );
        assert_eq!(composed_properties(&prepared), vec!["a", "b"]);
    }

    #[test]
    fn allow_unknown_leaves_schema_alone() {
        let schema = json!({"type": "object", "properties": {"a": {}}});
        assert_eq!(
            prepare_schema(&schema, &options(true, Presence::Optional)),
            schema
        );
    }

    #[test]
    fn required_presence_requires_every_declared_key() {
        let schema = json!({
            "type": "object",
            "properties": {"a": {}, "b": {}},
            "required": ["b"]
        });

        let prepared = prepare_schema(&schema, &options(true, Presence::Required));
        assert_eq!(prepared["required"], json!(["b", "a"]));
    }

    #[test]
    fn non_object_schemas_are_untouched() {
        let schema = json!({"type": "array", "items": {"type": "string"}});
        assert_eq!(
            prepare_schema(&schema, &options(false, Presence::Required)),
            schema
        );
    }
}
