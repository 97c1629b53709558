use crate::validation::RuleToken;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// OpenAPI primitive types a field can resolve to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpenApiType {
    #[default]
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
}

impl OpenApiType {
    /// The lowercase OpenAPI name of the type
    pub fn as_str(&self) -> &'static str {
        match self {
            OpenApiType::String => "string",
            OpenApiType::Integer => "integer",
            OpenApiType::Number => "number",
            OpenApiType::Boolean => "boolean",
            OpenApiType::Array => "array",
            OpenApiType::Object => "object",
        }
    }

    /// Whether bounds on this type are expressed as `minimum`/`maximum`
    pub fn is_numeric(&self) -> bool {
        matches!(self, OpenApiType::Integer | OpenApiType::Number)
    }
}

impl fmt::Display for OpenApiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const INTEGER_NAMES: &[&str] = &[
    "age", "year", "month", "day", "hour", "minute", "second", "order", "position", "priority",
    "level", "sort", "rank", "page", "per_page", "limit", "offset", "skip", "width", "height",
    "size", "duration",
];

const BOOLEAN_NAMES: &[&str] = &[
    "active",
    "enabled",
    "visible",
    "published",
    "verified",
    "mandatory",
    "filterable",
    "unique",
    "localizable",
    "is_multiple",
    "disabled",
    "hidden",
    "deleted",
    "blocked",
    "banned",
    "expired",
    "archived",
];

/// Field type resolver - maps field names, validation rules and declared
/// types onto OpenAPI primitive types.
///
/// Every method is total: anything unrecognised resolves to `string`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldTypeResolver;

impl FieldTypeResolver {
    pub fn new() -> Self {
        Self
    }

    /// Resolve a type with priority: validation rule > declared type > field name.
    ///
    /// A declared type only wins when it resolves to something more specific
    /// than the `string` fallback.
    pub fn resolve(
        &self,
        field: &str,
        validation_rule: Option<&str>,
        declared_type: Option<&str>,
    ) -> OpenApiType {
        if let Some(rule) = validation_rule.filter(|r| !r.is_empty()) {
            return self.from_validation_rule(rule);
        }

        if let Some(declared) = declared_type {
            let resolved = self.from_declared_type(declared);
            if resolved != OpenApiType::String {
                return resolved;
            }
        }

        self.from_field_name(field)
    }

    /// Resolve a type from naming conventions of the field.
    pub fn from_field_name(&self, name: &str) -> OpenApiType {
        let n = name.to_lowercase();
        let contains_any = |needles: &[&str]| needles.iter().any(|needle| n.contains(needle));

        if n == "id" || n.ends_with("_id") {
            return OpenApiType::Integer;
        }
        if n.ends_with("_at") {
            // ISO 8601 datetime
            return OpenApiType::String;
        }
        if n.ends_with("_count") || contains_any(&["count", "quantity", "stock"]) {
            return OpenApiType::Integer;
        }
        if contains_any(&[
            "price", "amount", "cost", "total", "sum", "balance", "tax", "discount", "rate",
        ]) {
            return OpenApiType::Number;
        }
        if contains_any(&["percent", "weight", "rating", "latitude", "longitude"]) {
            return OpenApiType::Number;
        }
        if n.starts_with("is_") || n.starts_with("has_") || n.starts_with("can_") {
            return OpenApiType::Boolean;
        }
        if INTEGER_NAMES.contains(&n.as_str()) {
            return OpenApiType::Integer;
        }
        if BOOLEAN_NAMES.contains(&n.as_str()) {
            return OpenApiType::Boolean;
        }

        OpenApiType::String
    }

    /// Resolve a type from a single validation rule token such as `integer` or `max:5`.
    pub fn from_validation_rule(&self, rule: &str) -> OpenApiType {
        let starts = |prefix: &str| rule.starts_with(prefix);

        if starts("integer") || starts("numeric") {
            OpenApiType::Integer
        } else if starts("bool") {
            OpenApiType::Boolean
        } else if starts("array") {
            OpenApiType::Array
        } else {
            // email, url, date, string and everything else
            OpenApiType::String
        }
    }

    /// Resolve a type from a host-language type declaration (`int`, `?float`, `bool|null`).
    pub fn from_declared_type(&self, declared: &str) -> OpenApiType {
        let name = declared
            .trim()
            .trim_start_matches('?')
            .split('|')
            .map(str::trim)
            .find(|part| !part.eq_ignore_ascii_case("null"))
            .unwrap_or("")
            .to_lowercase();

        match name.as_str() {
            "int" | "integer" => OpenApiType::Integer,
            "float" | "double" => OpenApiType::Number,
            "bool" | "boolean" => OpenApiType::Boolean,
            "array" => OpenApiType::Array,
            "object" => OpenApiType::Object,
            _ => OpenApiType::String,
        }
    }

    /// Scan a rule list against a rule-name to type map; the first rule whose
    /// name (the part before `:`) has a mapping wins.
    pub fn from_rule_list(
        &self,
        rules: &[RuleToken],
        type_map: &IndexMap<String, OpenApiType>,
    ) -> OpenApiType {
        rules
            .iter()
            .filter_map(RuleToken::as_token)
            .find_map(|rule| {
                let name = rule.split(':').next().unwrap_or(rule);
                type_map.get(name).copied()
            })
            .unwrap_or_default()
    }

    /// Normalize a free-text type name from documentation (`int`, `bool`, ...).
    pub fn normalize(&self, type_name: &str) -> OpenApiType {
        match type_name.to_lowercase().as_str() {
            "int" | "integer" | "numeric" => OpenApiType::Integer,
            "float" | "double" | "number" => OpenApiType::Number,
            "bool" | "boolean" => OpenApiType::Boolean,
            "array" => OpenApiType::Array,
            "object" => OpenApiType::Object,
            _ => OpenApiType::String,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_type_map;

    #[test]
    fn test_field_name_id_suffix() {
        let resolver = FieldTypeResolver::new();
        assert_eq!(resolver.from_field_name("id"), OpenApiType::Integer);
        assert_eq!(resolver.from_field_name("user_id"), OpenApiType::Integer);
        assert_eq!(resolver.from_field_name("Category_ID"), OpenApiType::Integer);
    }

    #[test]
    fn test_field_name_timestamp_beats_later_classes() {
        let resolver = FieldTypeResolver::new();
        // "discounted_at" would match the currency class, the suffix class wins
        assert_eq!(resolver.from_field_name("discounted_at"), OpenApiType::String);
        assert_eq!(resolver.from_field_name("created_at"), OpenApiType::String);
    }

    #[test]
    fn test_field_name_numeric_classes() {
        let resolver = FieldTypeResolver::new();
        assert_eq!(resolver.from_field_name("comments_count"), OpenApiType::Integer);
        assert_eq!(resolver.from_field_name("stock_level"), OpenApiType::Integer);
        assert_eq!(resolver.from_field_name("unit_price"), OpenApiType::Number);
        assert_eq!(resolver.from_field_name("rating"), OpenApiType::Number);
        assert_eq!(resolver.from_field_name("latitude"), OpenApiType::Number);
    }

    #[test]
    fn test_field_name_booleans_and_whitelists() {
        let resolver = FieldTypeResolver::new();
        assert_eq!(resolver.from_field_name("is_admin"), OpenApiType::Boolean);
        assert_eq!(resolver.from_field_name("has_children"), OpenApiType::Boolean);
        assert_eq!(resolver.from_field_name("can_edit"), OpenApiType::Boolean);
        assert_eq!(resolver.from_field_name("published"), OpenApiType::Boolean);
        assert_eq!(resolver.from_field_name("archived"), OpenApiType::Boolean);
        assert_eq!(resolver.from_field_name("per_page"), OpenApiType::Integer);
        assert_eq!(resolver.from_field_name("duration"), OpenApiType::Integer);
    }

    #[test]
    fn test_field_name_default_is_string() {
        let resolver = FieldTypeResolver::new();
        assert_eq!(resolver.from_field_name("title"), OpenApiType::String);
        assert_eq!(resolver.from_field_name(""), OpenApiType::String);
    }

    #[test]
    fn test_validation_rule_mapping() {
        let resolver = FieldTypeResolver::new();
        assert_eq!(resolver.from_validation_rule("integer"), OpenApiType::Integer);
        assert_eq!(resolver.from_validation_rule("numeric"), OpenApiType::Integer);
        assert_eq!(resolver.from_validation_rule("boolean"), OpenApiType::Boolean);
        assert_eq!(resolver.from_validation_rule("array"), OpenApiType::Array);
        assert_eq!(resolver.from_validation_rule("email"), OpenApiType::String);
        assert_eq!(resolver.from_validation_rule("date"), OpenApiType::String);
    }

    #[test]
    fn test_resolve_priority() {
        let resolver = FieldTypeResolver::new();

        // rule beats everything
        assert_eq!(
            resolver.resolve("user_id", Some("email"), Some("int")),
            OpenApiType::String
        );
        // declared type beats name when specific
        assert_eq!(resolver.resolve("title", None, Some("?float")), OpenApiType::Number);
        // declared string does not override the name heuristic
        assert_eq!(resolver.resolve("user_id", None, Some("string")), OpenApiType::Integer);
        // name heuristic last
        assert_eq!(resolver.resolve("is_active", None, None), OpenApiType::Boolean);
    }

    #[test]
    fn test_declared_type_unions() {
        let resolver = FieldTypeResolver::new();
        assert_eq!(resolver.from_declared_type("int|null"), OpenApiType::Integer);
        assert_eq!(resolver.from_declared_type("null|bool"), OpenApiType::Boolean);
        assert_eq!(resolver.from_declared_type("Carbon"), OpenApiType::String);
    }

    #[test]
    fn test_rule_list_first_mapped_rule_wins() {
        let resolver = FieldTypeResolver::new();
        let map = default_type_map();
        let rules = vec![
            RuleToken::from("required"),
            RuleToken::from("numeric"),
            RuleToken::from("array"),
        ];
        assert_eq!(resolver.from_rule_list(&rules, &map), OpenApiType::Integer);

        let rules = vec![RuleToken::from("required"), RuleToken::from("max:10")];
        assert_eq!(resolver.from_rule_list(&rules, &map), OpenApiType::String);
    }

    #[test]
    fn test_rule_list_ignores_rule_objects() {
        let resolver = FieldTypeResolver::new();
        let map = default_type_map();
        let rules = vec![RuleToken::Object("Rule::in(['a'])".to_string()), RuleToken::from("bool")];
        assert_eq!(resolver.from_rule_list(&rules, &map), OpenApiType::Boolean);
    }
}
