//! Best-effort class metadata extraction from host source text.
//!
//! This is pattern matching, not parsing: it understands enough of the host
//! language's surface syntax (namespaces, imports, class headers, method
//! signatures, balanced braces) to index controllers, form requests and
//! resources. Anything it does not recognise is skipped.

use super::{ClassInfo, MethodInfo};
use indexmap::IndexMap;
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

static NAMESPACE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*namespace[ \t]+([\w\\]+)[ \t]*;").unwrap());

static USE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^[ \t]*use[ \t]+\\?([\w\\]+)(?:[ \t]+as[ \t]+(\w+))?[ \t]*;").unwrap()
});

static CLASS_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?m)^[ \t]*(?:(?:abstract|final|readonly)[ \t]+)*class[ \t]+(\w+)(?:[ \t]+extends[ \t]+(\\?[\w\\]+))?[^{;]*\{",
    )
    .unwrap()
});

static METHOD_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?m)^[ \t]*(?:(?:public|protected|private|static|final|abstract)[ \t]+)*function[ \t]+&?(\w+)[ \t]*\(",
    )
    .unwrap()
});

static RETURN_TYPE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*:\s*(\??\\?[\w\\|]+)").unwrap());

static PARAM_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*(?:#\[[^\]]*\]\s*)?(?:(?:public|protected|private|readonly)\s+)*(\??\\?[\w\\|]+)\s+&?(?:\.\.\.)?\$\w+",
    )
    .unwrap()
});

static PROPERTY_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"@property(?:-read|-write)?\s+(\S+)\s+\$(\w+)").unwrap());

static ATTRIBUTES_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:public|protected)\s+(?:array\s+)?\$attributes\s*=\s*\[").unwrap()
});

static ARRAY_KEY_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"['"](\w+)['"]\s*=>"#).unwrap());

static STRING_LITERAL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"['"]([^'"]+)['"]"#).unwrap());

/// Extracts [`ClassInfo`] records from source text
pub struct SourceParser;

impl SourceParser {
    /// Parse every class declared in `content`, keyed by fully qualified name.
    pub fn parse(content: &str, file: Option<&Path>) -> Vec<(String, ClassInfo)> {
        let namespace = NAMESPACE_REGEX
            .captures(content)
            .map(|caps| caps[1].to_string());

        let first_class = CLASS_REGEX.find(content).map(|m| m.start());
        let imports = parse_imports(&content[..first_class.unwrap_or(content.len())]);

        let mut classes = Vec::new();
        let mut pos = 0;

        while let Some(caps) = CLASS_REGEX.captures_at(content, pos) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                break;
            };
            let open = whole.end() - 1;
            let Some(close) = matching_delimiter(content, open) else {
                debug!("Unbalanced class body for {}", name.as_str());
                break;
            };

            let fqcn = match &namespace {
                Some(ns) => format!("{}\\{}", ns, name.as_str()),
                None => name.as_str().to_string(),
            };

            let parent = caps
                .get(2)
                .map(|p| qualify(p.as_str(), namespace.as_deref(), &imports));

            let class_doc = doc_block_before(content, whole.start()).unwrap_or_default();
            let body = &content[open + 1..close];

            let info = ClassInfo {
                parent,
                imports: imports.clone(),
                attributes: parse_attributes(body),
                property_types: PROPERTY_REGEX
                    .captures_iter(class_doc)
                    .map(|c| (c[2].to_string(), c[1].to_string()))
                    .collect(),
                methods: parse_methods(body),
                file: file.map(Path::to_path_buf),
            };

            classes.push((fqcn, info));
            pos = close + 1;
        }

        classes
    }
}

fn parse_imports(header: &str) -> IndexMap<String, String> {
    USE_REGEX
        .captures_iter(header)
        .map(|caps| {
            let fqcn = caps[1].to_string();
            let alias = caps
                .get(2)
                .map(|a| a.as_str().to_string())
                .unwrap_or_else(|| super::short_name(&fqcn).to_string());
            (alias, fqcn)
        })
        .collect()
}

/// Qualify a class reference written in a file with the given namespace and imports
fn qualify(name: &str, namespace: Option<&str>, imports: &IndexMap<String, String>) -> String {
    if let Some(absolute) = name.strip_prefix('\\') {
        return absolute.to_string();
    }

    let (head, rest) = match name.split_once('\\') {
        Some((head, rest)) => (head, Some(rest)),
        None => (name, None),
    };

    if let Some(imported) = imports.get(head) {
        return match rest {
            Some(rest) => format!("{}\\{}", imported, rest),
            None => imported.clone(),
        };
    }

    match namespace {
        Some(ns) => format!("{}\\{}", ns, name),
        None => name.to_string(),
    }
}

fn parse_attributes(body: &str) -> Option<Vec<String>> {
    let m = ATTRIBUTES_REGEX.find(body)?;
    let open = m.end() - 1;
    let close = matching_delimiter(body, open)?;
    let literal = &body[open + 1..close];

    // Keyed arrays list defaults; their keys are the attribute names
    let names: Vec<String> = if literal.contains("=>") {
        ARRAY_KEY_REGEX
            .captures_iter(literal)
            .map(|c| c[1].to_string())
            .collect()
    } else {
        STRING_LITERAL_REGEX
            .captures_iter(literal)
            .map(|c| c[1].to_string())
            .collect()
    };

    Some(names)
}

fn parse_methods(body: &str) -> IndexMap<String, MethodInfo> {
    let mut methods = IndexMap::new();
    let mut pos = 0;

    while let Some(caps) = METHOD_REGEX.captures_at(body, pos) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            break;
        };
        let paren = whole.end() - 1;
        let Some(paren_close) = matching_delimiter(body, paren) else {
            break;
        };

        let parameters = split_top_level(&body[paren + 1..paren_close])
            .into_iter()
            .filter_map(|param| {
                PARAM_REGEX
                    .captures(param)
                    .map(|c| c[1].trim_start_matches('\\').to_string())
            })
            .collect();

        let after_params = &body[paren_close + 1..];
        let return_type = RETURN_TYPE_REGEX
            .captures(after_params)
            .map(|c| c[1].to_string());

        let body_start = after_params.find(|c: char| c == '{' || c == ';').map(|i| paren_close + 1 + i);
        let (source_end, next_pos) = match body_start {
            Some(idx) if body.as_bytes()[idx] == b'{' => match matching_delimiter(body, idx) {
                Some(close) => (close + 1, close + 1),
                None => break,
            },
            // Abstract or interface method
            Some(idx) => (idx + 1, idx + 1),
            None => break,
        };

        let info = MethodInfo {
            doc: doc_block_before(body, whole.start()).map(str::to_string),
            parameters,
            return_type,
            source: body[whole.start()..source_end].trim().to_string(),
            rules: None,
        };
        methods.insert(name.as_str().to_string(), info);
        pos = next_pos;
    }

    methods
}

/// The `/** ... */` block that immediately precedes `idx`, if any
fn doc_block_before(text: &str, idx: usize) -> Option<&str> {
    let before = text[..idx].trim_end();
    if !before.ends_with("*/") {
        return None;
    }
    let start = before.rfind("/**")?;
    let block = &before[start..];
    // A plain comment closing between the opener and the end means the doc
    // block belongs to something else
    if block[..block.len() - 2].contains("*/") {
        return None;
    }
    Some(block)
}

/// Split a parameter list on commas that are not nested in brackets or strings
pub(crate) fn split_top_level(list: &str) -> Vec<&str> {
    let bytes = list.as_bytes();
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\'' | b'"' => {
                i = skip_string(bytes, i);
                continue;
            }
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' | b'}' => depth -= 1,
            b',' if depth == 0 => {
                parts.push(&list[start..i]);
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }
    if start < list.len() && !list[start..].trim().is_empty() {
        parts.push(&list[start..]);
    }

    parts
}

/// Index of the delimiter closing the one at `open_idx` (`{`, `(` or `[`).
///
/// String literals and comments are skipped so braces inside them do not
/// count.
pub(crate) fn matching_delimiter(text: &str, open_idx: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let open = *bytes.get(open_idx)?;
    let close = match open {
        b'{' => b'}',
        b'(' => b')',
        b'[' => b']',
        _ => return None,
    };

    let mut depth = 0usize;
    let mut i = open_idx;

    while i < bytes.len() {
        match bytes[i] {
            b'\'' | b'"' => {
                i = skip_string(bytes, i);
                continue;
            }
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                i = skip_line(bytes, i);
                continue;
            }
            b'#' if bytes.get(i + 1) != Some(&b'[') => {
                i = skip_line(bytes, i);
                continue;
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i = text[i + 2..]
                    .find("*/")
                    .map(|end| i + 2 + end + 2)
                    .unwrap_or(bytes.len());
                continue;
            }
            c if c == open => depth += 1,
            c if c == close => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
        i += 1;
    }

    None
}

/// Position just past the string literal opening at `start`
fn skip_string(bytes: &[u8], start: usize) -> usize {
    let quote = bytes[start];
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            c if c == quote => return i + 1,
            _ => i += 1,
        }
    }
    bytes.len()
}

fn skip_line(bytes: &[u8], start: usize) -> usize {
    bytes[start..]
        .iter()
        .position(|&b| b == b'\n')
        .map(|offset| start + offset)
        .unwrap_or(bytes.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const CONTROLLER: &str = r#"<?php

namespace App\Http\Controllers;

use App\Http\Requests\StoreUserRequest;
use App\Http\Resources\UserResource as Profile;
use Illuminate\Http\Request;

class UserController extends Controller
{
    use AuthorizesRequests;

    /**
     * List users.
     *
     * @queryParam page int Page number
     */
    public function index(Request $request)
    {
        $format = "{not a brace}"; // } neither is this
        return Profile::collection(User::paginate());
    }

    /**
     * Create a user.
     */
    public function store(StoreUserRequest $request, ?int $teamId = null): Profile
    {
        if ($request->has('x')) {
            return new Profile(User::create($request->validated()));
        }
    }

    /* not a doc block */
    protected function helper(array $items = [1, 2], ...$rest): void {}
}
"#;

    #[test]
    fn test_parse_controller_header() {
        let classes = SourceParser::parse(CONTROLLER, None);
        assert_eq!(classes.len(), 1);

        let (fqcn, info) = &classes[0];
        assert_eq!(fqcn, "App\\Http\\Controllers\\UserController");
        assert_eq!(
            info.parent.as_deref(),
            Some("App\\Http\\Controllers\\Controller")
        );
        assert_eq!(
            info.imports.get("Profile").map(String::as_str),
            Some("App\\Http\\Resources\\UserResource")
        );
        assert_eq!(
            info.imports.get("StoreUserRequest").map(String::as_str),
            Some("App\\Http\\Requests\\StoreUserRequest")
        );
        // trait use inside the class body is not an import
        assert!(!info.imports.contains_key("AuthorizesRequests"));
    }

    #[test]
    fn test_parse_methods() {
        let classes = SourceParser::parse(CONTROLLER, None);
        let info = &classes[0].1;

        assert_eq!(
            info.methods.keys().collect::<Vec<_>>(),
            vec!["index", "store", "helper"]
        );

        let index = &info.methods["index"];
        assert!(index.doc.as_deref().unwrap().contains("@queryParam page int"));
        assert_eq!(index.parameters, vec!["Request".to_string()]);
        assert!(index.source.contains("Profile::collection"));
        assert!(index.source.ends_with('}'));

        let store = &info.methods["store"];
        assert_eq!(
            store.parameters,
            vec!["StoreUserRequest".to_string(), "?int".to_string()]
        );
        assert_eq!(store.return_type.as_deref(), Some("Profile"));
        assert!(store.source.contains("new Profile("));

        let helper = &info.methods["helper"];
        assert_eq!(helper.doc, None);
        assert_eq!(helper.parameters, vec!["array".to_string()]);
        assert_eq!(helper.return_type.as_deref(), Some("void"));
    }

    #[test]
    fn test_parse_resource_attributes_and_properties() {
        let source = r#"<?php
namespace App\Http\Resources;

use Illuminate\Http\Resources\Json\JsonResource;

/**
 * @property int $id
 * @property-read ?float $price
 */
class ProductResource extends JsonResource
{
    public array $attributes = ['name', "price", 'sku'];

    public function toArray($request): array
    {
        return ['id' => $this->id];
    }
}

final class OtherResource extends \Vendor\BaseResource {}
"#;
        let classes = SourceParser::parse(source, None);
        assert_eq!(classes.len(), 2);

        let (fqcn, product) = &classes[0];
        assert_eq!(fqcn, "App\\Http\\Resources\\ProductResource");
        assert_eq!(
            product.parent.as_deref(),
            Some("Illuminate\\Http\\Resources\\Json\\JsonResource")
        );
        assert_eq!(
            product.attributes,
            Some(vec!["name".to_string(), "price".to_string(), "sku".to_string()])
        );
        assert_eq!(product.property_types.get("id").map(String::as_str), Some("int"));
        assert_eq!(
            product.property_types.get("price").map(String::as_str),
            Some("?float")
        );
        assert_eq!(product.methods["toArray"].return_type.as_deref(), Some("array"));

        assert_eq!(classes[1].1.parent.as_deref(), Some("Vendor\\BaseResource"));
    }

    #[test]
    fn test_keyed_attribute_defaults_use_keys() {
        let source = r#"<?php
class Post extends Model
{
    protected $attributes = ['status' => 'draft', 'views' => 0];
}
"#;
        let classes = SourceParser::parse(source, None);
        assert_eq!(
            classes[0].1.attributes,
            Some(vec!["status".to_string(), "views".to_string()])
        );
        assert_eq!(classes[0].1.parent.as_deref(), Some("Model"));
    }

    #[test]
    fn test_matching_delimiter_skips_strings_and_comments() {
        let text = r#"{ 'a}' /* } */ "b\"}" { } }"#;
        assert_eq!(matching_delimiter(text, 0), Some(text.len() - 1));
        assert_eq!(matching_delimiter("{ never closed", 0), None);
        assert_eq!(matching_delimiter("x", 0), None);
    }

    #[test]
    fn test_split_top_level() {
        assert_eq!(
            split_top_level("A $a, array $b = [1, 2], string $c = 'x,y'"),
            vec!["A $a", " array $b = [1, 2]", " string $c = 'x,y'"]
        );
        assert!(split_top_level("").is_empty());
    }

    #[test]
    fn test_garbage_input_yields_nothing() {
        assert!(SourceParser::parse("not source at all {{{", None).is_empty());
        assert!(SourceParser::parse("", None).is_empty());
    }
}
