//! Validation rule sets and their extraction from controller actions.
//!
//! Rules come from three places, tried in order:
//!
//! 1. exact rules supplied by the metadata provider;
//! 2. a form-request class type-hinted on the action, whose `rules()` method
//!    returns an array literal;
//! 3. an inline `$request->validate([...])` call in the action body.
//!
//! The inline scan is a best-effort fallback: it only understands
//! `'field' => 'rule|rule'` string pairs and silently drops anything else.

use crate::metadata::source::{matching_delimiter, split_top_level};
use crate::metadata::MetadataProvider;
use indexmap::IndexMap;
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static RETURN_ARRAY_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"return\s*\[").unwrap());

static INLINE_VALIDATE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\$\w+->validate\(\s*\[(.*?)][\s,)]").unwrap());

static STRING_PAIR_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"['"]([^'"]+)['"]\s*=>\s*['"]([^'"]+)['"]"#).unwrap());

static ENTRY_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?s)^\s*['"]([^'"]+)['"]\s*=>\s*(.+?)\s*$"#).unwrap());

/// One validation rule: a string token like `max:255`, or an opaque rule
/// object (`Rule::unique(...)`, `new Uppercase`) kept as its source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleToken {
    Token(String),
    Object(String),
}

impl RuleToken {
    /// The string token, or `None` for rule objects
    pub fn as_token(&self) -> Option<&str> {
        match self {
            RuleToken::Token(token) => Some(token),
            RuleToken::Object(_) => None,
        }
    }

    /// Rule name without its argument (`max` for `max:255`)
    pub fn name(&self) -> Option<&str> {
        self.as_token()
            .map(|token| token.split(':').next().unwrap_or(token))
    }

    /// Rule argument (`255` for `max:255`)
    pub fn argument(&self) -> Option<&str> {
        self.as_token()
            .and_then(|token| token.split_once(':'))
            .map(|(_, arg)| arg)
    }
}

impl From<&str> for RuleToken {
    fn from(token: &str) -> Self {
        RuleToken::Token(token.to_string())
    }
}

impl From<String> for RuleToken {
    fn from(token: String) -> Self {
        RuleToken::Token(token)
    }
}

/// Rules for one field as written by the host: a pipe-joined string or a list
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RuleSpec {
    Pipe(String),
    List(Vec<String>),
}

/// Field path (dot notation, `items.*.sku`) to ordered rule tokens
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "IndexMap<String, RuleSpec>")]
pub struct ValidationRules(IndexMap<String, Vec<RuleToken>>);

impl From<IndexMap<String, RuleSpec>> for ValidationRules {
    fn from(raw: IndexMap<String, RuleSpec>) -> Self {
        let mut rules = ValidationRules::new();
        for (field, spec) in raw {
            match spec {
                RuleSpec::Pipe(pipe) => rules.insert_pipe(field, &pipe),
                RuleSpec::List(list) => {
                    rules.insert(field, list.into_iter().map(RuleToken::from).collect())
                }
            }
        }
        rules
    }
}

impl ValidationRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, rules: Vec<RuleToken>) {
        self.0.insert(field.into(), rules);
    }

    /// Insert rules written as `required|string|max:255`
    pub fn insert_pipe(&mut self, field: impl Into<String>, pipe: &str) {
        let tokens = pipe
            .split('|')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(RuleToken::from)
            .collect();
        self.0.insert(field.into(), tokens);
    }

    pub fn get(&self, field: &str) -> Option<&[RuleToken]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<RuleToken>)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: AsRef<str>> FromIterator<(K, V)> for ValidationRules {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut rules = ValidationRules::new();
        for (field, pipe) in iter {
            rules.insert_pipe(field, pipe.as_ref());
        }
        rules
    }
}

/// Extract the validation rules of a controller action.
///
/// Never fails: unknown classes, missing methods and unparseable sources
/// all yield an empty rule set.
pub fn extract(provider: &dyn MetadataProvider, class: &str, method: &str) -> ValidationRules {
    if !provider.method_exists(class, method) {
        return ValidationRules::new();
    }

    if let Some(rules) = provider.declared_rules(class, method) {
        return rules;
    }

    if let Some(rules) = from_form_request(provider, class, method) {
        return rules;
    }

    provider
        .method_source(class, method)
        .map(|source| from_inline_validate(&source))
        .unwrap_or_default()
}

fn from_form_request(
    provider: &dyn MetadataProvider,
    class: &str,
    method: &str,
) -> Option<ValidationRules> {
    provider
        .method_parameter_types(class, method)
        .iter()
        .map(|hint| hint.trim_start_matches('?'))
        .filter_map(|hint| provider.resolve_short_name(hint, class))
        .filter(|request| provider.method_exists(request, "rules"))
        .find_map(|request| {
            debug!("Reading validation rules from {}", request);
            provider.declared_rules(&request, "rules").or_else(|| {
                provider
                    .method_source(&request, "rules")
                    .and_then(|source| parse_rules_method(&source))
            })
        })
        .filter(|rules| !rules.is_empty())
}

/// Parse the array literal returned by a `rules()` method.
pub fn parse_rules_method(source: &str) -> Option<ValidationRules> {
    let m = RETURN_ARRAY_REGEX.find(source)?;
    let open = m.end() - 1;
    let close = matching_delimiter(source, open)?;

    let mut rules = ValidationRules::new();
    for entry in split_top_level(&source[open + 1..close]) {
        let Some(caps) = ENTRY_REGEX.captures(entry) else {
            continue;
        };
        let field = caps[1].to_string();
        let value = caps[2].trim();

        if let Some(literal) = string_literal(value) {
            rules.insert_pipe(field, literal);
        } else if value.starts_with('[') && value.ends_with(']') {
            let tokens = split_top_level(&value[1..value.len() - 1])
                .into_iter()
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(|item| match string_literal(item) {
                    Some(literal) => RuleToken::Token(literal.to_string()),
                    None => RuleToken::Object(item.to_string()),
                })
                .collect();
            rules.insert(field, tokens);
        } else {
            rules.insert(field, vec![RuleToken::Object(value.to_string())]);
        }
    }

    Some(rules)
}

/// Scan a method body for an inline `$x->validate([...])` call.
pub fn from_inline_validate(source: &str) -> ValidationRules {
    let Some(caps) = INLINE_VALIDATE_REGEX.captures(source) else {
        return ValidationRules::new();
    };

    let mut rules = ValidationRules::new();
    for pair in STRING_PAIR_REGEX.captures_iter(&caps[1]) {
        rules.insert_pipe(pair[1].to_string(), &pair[2]);
    }
    rules
}

/// Contents of a single quoted string literal, if `text` is exactly one
fn string_literal(text: &str) -> Option<&str> {
    let quote = text.chars().next().filter(|c| *c == '\'' || *c == '"')?;
    let inner = text.strip_prefix(quote)?.strip_suffix(quote)?;
    if inner.contains(quote) {
        return None;
    }
    Some(inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::ClassIndex;
    use pretty_assertions::assert_eq;

    fn tokens(rules: &ValidationRules, field: &str) -> Vec<String> {
        rules
            .get(field)
            .unwrap_or_default()
            .iter()
            .map(|rule| match rule {
                RuleToken::Token(t) => t.clone(),
                RuleToken::Object(o) => format!("<{}>", o),
            })
            .collect()
    }

    const SOURCES: &str = r#"<?php
namespace App\Http\Controllers;

use App\Http\Requests\StorePostRequest;
use Illuminate\Http\Request;

class PostController extends Controller
{
    public function store(StorePostRequest $request)
    {
        return new PostResource(Post::create($request->validated()));
    }

    public function update(Request $request, int $id)
    {
        $data = $request->validate([
            'title' => 'sometimes|string|max:120',
            "body" => "nullable",
            'tags' => ['array'],
        ]);
    }

    public function destroy(int $id)
    {
        return response()->noContent();
    }
}
"#;

    const REQUEST: &str = r#"<?php
namespace App\Http\Requests;

class StorePostRequest extends FormRequest
{
    public function rules(): array
    {
        return [
            'title' => 'required|string|max:120',
            'status' => ['required', Rule::in(['draft', 'live'])],
            'items.*.sku' => "required|string",
            'slug' => new Slug(),
        ];
    }
}
"#;

    fn index() -> ClassIndex {
        ClassIndex::from_sources(&[
            ("app/Http/Controllers/PostController.php", SOURCES),
            ("app/Http/Requests/StorePostRequest.php", REQUEST),
        ])
    }

    #[test]
    fn test_form_request_rules_win() {
        let rules = extract(&index(), "App\\Http\\Controllers\\PostController", "store");

        assert_eq!(
            rules.iter().map(|(k, _)| k.as_str()).collect::<Vec<_>>(),
            vec!["title", "status", "items.*.sku", "slug"]
        );
        assert_eq!(tokens(&rules, "title"), vec!["required", "string", "max:120"]);
        assert_eq!(
            tokens(&rules, "status"),
            vec!["required", "<Rule::in(['draft', 'live'])>"]
        );
        assert_eq!(tokens(&rules, "items.*.sku"), vec!["required", "string"]);
        assert_eq!(tokens(&rules, "slug"), vec!["<new Slug()>"]);
    }

    #[test]
    fn test_inline_validate_fallback_takes_string_pairs_only() {
        let rules = extract(&index(), "App\\Http\\Controllers\\PostController", "update");

        assert_eq!(tokens(&rules, "title"), vec!["sometimes", "string", "max:120"]);
        assert_eq!(tokens(&rules, "body"), vec!["nullable"]);
        // array rule lists are not understood by the inline scan
        assert!(rules.get("tags").is_none());
    }

    #[test]
    fn test_no_rules_yields_empty_set() {
        let index = index();
        assert!(extract(&index, "App\\Http\\Controllers\\PostController", "destroy").is_empty());
        assert!(extract(&index, "App\\Http\\Controllers\\PostController", "missing").is_empty());
        assert!(extract(&index, "App\\Missing", "store").is_empty());
    }

    #[test]
    fn test_declared_rules_bypass_source() {
        let yaml = r#"
classes:
  App\Http\Controllers\TagController:
    methods:
      store:
        rules:
          name: required|max:20
          colors: [array, min:1]
"#;
        let index: ClassIndex = serde_yaml::from_str(yaml).unwrap();
        let rules = extract(&index, "App\\Http\\Controllers\\TagController", "store");

        assert_eq!(tokens(&rules, "name"), vec!["required", "max:20"]);
        assert_eq!(tokens(&rules, "colors"), vec!["array", "min:1"]);
    }

    #[test]
    fn test_rule_token_parts() {
        let rule = RuleToken::from("max:255");
        assert_eq!(rule.name(), Some("max"));
        assert_eq!(rule.argument(), Some("255"));
        assert_eq!(RuleToken::from("in:a,b:c").argument(), Some("a,b:c"));
        assert_eq!(RuleToken::Object("new X".into()).name(), None);
    }

    #[test]
    fn test_from_iterator_pipe_splits() {
        let rules: ValidationRules = [("name", "required| string |")].into_iter().collect();
        assert_eq!(tokens(&rules, "name"), vec!["required", "string"]);
    }

    #[test]
    fn test_string_literal() {
        assert_eq!(string_literal("'abc'"), Some("abc"));
        assert_eq!(string_literal("\"a|b\""), Some("a|b"));
        assert_eq!(string_literal("'a' . 'b'"), None);
        assert_eq!(string_literal("Rule::in([])"), None);
    }
}
