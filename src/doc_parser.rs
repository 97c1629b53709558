//! Doc-comment parser.
//!
//! Controller actions are documented with a free-text block followed by
//! `@tag` lines:
//!
//! ```text
//! /**
//!  * List users
//!  *
//!  * Returns a paginated list.
//!  *
//!  * @group Accounts
//!  * @queryParam filter.name string Filter by name
//!  * @urlParam user integer required The user ID
//!  * @response 200 {"data": []}
//!  * @unauthenticated
//!  */
//! ```
//!
//! Text before the first tag becomes the summary (first line) and the
//! description (remaining lines). Unknown tags are ignored.

use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

static SUMMARY_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^@summary\s+(.+)$").unwrap());
static DESCRIPTION_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^@description\s*(.*)$").unwrap());
static GROUP_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^@group\s+(.+)$").unwrap());
static TAGS_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^@tags\s+(.+)$").unwrap());
static RESOURCE_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^@resource\s+(\S+)").unwrap());
static DEPRECATED_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^@deprecated\b").unwrap());
static AUTHENTICATED_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^@authenticated\b").unwrap());
static UNAUTHENTICATED_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^@unauthenticated\b").unwrap());
static RESPONSE_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^@response(?:\s+(\d+))?\s+(.+)$").unwrap());
static PARAM_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^@(queryParam|bodyParam|urlParam)\s+(.+)$").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// A documented parameter: `@bodyParam name type [required|optional] description`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedParam {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    /// `Some(true)` for `required`, `Some(false)` for `optional`, `None` if unmarked
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    pub description: String,
}

/// An explicit `@response` example
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocResponse {
    pub status: u16,
    /// Decoded JSON, or the raw text when it is not valid JSON
    pub content: Value,
}

/// Structured documentation of one controller action
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedDoc {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authenticated: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub responses: Vec<DocResponse>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub query_params: Vec<ParsedParam>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub body_params: Vec<ParsedParam>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub url_params: Vec<ParsedParam>,
}

impl ParsedDoc {
    /// The `@urlParam` entry documenting a path parameter
    pub fn url_param(&self, name: &str) -> Option<&ParsedParam> {
        self.url_params.iter().find(|p| p.name == name)
    }
}

/// Doc-comment parser
pub struct DocParser;

impl DocParser {
    /// Parse a raw doc-comment block.
    pub fn parse(raw: &str) -> ParsedDoc {
        let mut doc = ParsedDoc::default();
        let mut free_summary: Option<String> = None;
        let mut description_lines: Vec<String> = Vec::new();
        let mut in_text = true;

        for line in clean_lines(raw) {
            if line.starts_with('@') {
                in_text = false;
            }

            if in_text {
                if free_summary.is_none() {
                    free_summary = Some(line);
                } else {
                    description_lines.push(line);
                }
                continue;
            }

            if let Some(caps) = SUMMARY_TAG.captures(&line) {
                doc.summary = Some(caps[1].trim().to_string());
            } else if let Some(caps) = DESCRIPTION_TAG.captures(&line) {
                let text = caps[1].trim();
                if !text.is_empty() {
                    description_lines.push(text.to_string());
                }
            } else if let Some(caps) = GROUP_TAG.captures(&line) {
                doc.group = Some(caps[1].trim().to_string());
            } else if let Some(caps) = TAGS_TAG.captures(&line) {
                doc.tags.extend(
                    caps[1]
                        .split(',')
                        .map(str::trim)
                        .filter(|t| !t.is_empty())
                        .map(str::to_string),
                );
            } else if let Some(caps) = RESOURCE_TAG.captures(&line) {
                doc.resource = Some(caps[1].to_string());
            } else if DEPRECATED_TAG.is_match(&line) {
                doc.deprecated = Some(true);
            } else if AUTHENTICATED_TAG.is_match(&line) {
                doc.authenticated = Some(true);
            } else if UNAUTHENTICATED_TAG.is_match(&line) {
                doc.authenticated = Some(false);
            } else if let Some(caps) = RESPONSE_TAG.captures(&line) {
                let status = match caps.get(1) {
                    Some(m) => match m.as_str().parse::<u16>() {
                        Ok(status) => status,
                        Err(_) => {
                            warn!("Skipping @response with invalid status {}", m.as_str());
                            continue;
                        }
                    },
                    None => 200,
                };
                let content = caps[2].trim();
                let content = serde_json::from_str(content)
                    .unwrap_or_else(|_| Value::String(content.to_string()));
                doc.responses.push(DocResponse { status, content });
            } else if let Some(caps) = PARAM_TAG.captures(&line) {
                let Some(param) = parse_param(&caps[2]) else {
                    continue;
                };
                match caps[1].to_lowercase().as_str() {
                    "queryparam" => doc.query_params.push(param),
                    "bodyparam" => doc.body_params.push(param),
                    _ => doc.url_params.push(param),
                }
            }
        }

        if doc.summary.is_none() {
            doc.summary = free_summary;
        }
        if !description_lines.is_empty() {
            doc.description = Some(description_lines.join("\n").trim().to_string());
        }

        doc
    }
}

/// Strip comment delimiters and leading asterisks, dropping blank lines.
fn clean_lines(raw: &str) -> Vec<String> {
    raw.lines()
        .map(|line| {
            let line = line.trim();
            let line = line.strip_prefix("/**").unwrap_or(line);
            let line = line.strip_suffix("*/").unwrap_or(line);
            line.trim_start_matches(|c: char| c == '*' || c == ' ' || c == '\t')
                .trim_end()
                .to_string()
        })
        .filter(|line| !line.is_empty())
        .collect()
}

/// `name [type] [required|optional] [description]`
fn parse_param(text: &str) -> Option<ParsedParam> {
    let parts: Vec<&str> = WHITESPACE.splitn(text.trim(), 4).collect();
    let name = parts.first().filter(|n| !n.is_empty())?;

    let flag = parts.get(2).map(|p| p.to_lowercase());
    let required = match flag.as_deref() {
        Some("required") => Some(true),
        Some("optional") => Some(false),
        _ => None,
    };
    // Without a flag everything after the type is description
    let description = match required {
        Some(_) => parts.get(3).copied().unwrap_or("").to_string(),
        None => parts.get(2..).map(|rest| rest.join(" ")).unwrap_or_default(),
    };

    Some(ParsedParam {
        name: name.to_string(),
        type_name: parts.get(1).copied().unwrap_or("string").to_string(),
        required,
        description: description.trim().to_string(),
    })
}
