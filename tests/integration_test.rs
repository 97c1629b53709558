use openapi_from_routes::cli::{generate, GenerateArgs};
use openapi_from_routes::config::{Config, OutputFormat};
use openapi_from_routes::formats::FormatRegistry;
use openapi_from_routes::metadata::ClassIndex;
use openapi_from_routes::openapi_builder::{OpenApiBuilder, OpenApiDocument};
use openapi_from_routes::routes::RouteTable;
use openapi_from_routes::serializer::serialize_json;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn fixture(path: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(path)
}

/// Helper function to create a test project structure
fn create_test_project(files: Vec<(&str, &str)>) -> TempDir {
    let temp_dir = TempDir::new().unwrap();

    for (path, content) in files {
        let file_path = temp_dir.path().join(path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(file_path, content).unwrap();
    }

    temp_dir
}

/// Run the whole pipeline over the fixture application
fn build_fixture_document(format: &str) -> Value {
    let mut config = Config::load(&fixture("config.yaml")).unwrap();
    config.format = format.to_string();

    let table = RouteTable::load(&fixture("routes.yaml")).unwrap();
    let classes = ClassIndex::from_directory(&fixture("app"), &["php"]).unwrap();

    let mut builder =
        OpenApiBuilder::from_registry(&config, &classes, &FormatRegistry::new()).unwrap();
    let document: OpenApiDocument = builder.build(&table.routes);

    let json = serialize_json(&document, true).unwrap();
    serde_json::from_str(&json).unwrap()
}

#[test]
fn test_fixture_route_selection() {
    let doc = build_fixture_document("simple");

    // Step 1: Only api/* routes survive; the internal middleware and
    // the sanctum prefix are excluded
    let paths: Vec<&String> = doc["paths"].as_object().unwrap().keys().collect();
    assert_eq!(paths, vec!["/api/posts/{post}", "/api/users", "/api/users/{user}"]);

    // Step 2: HEAD and OPTIONS never become operations
    let users: Vec<&String> = doc["paths"]["/api/users"].as_object().unwrap().keys().collect();
    assert_eq!(users, vec!["get", "post"]);
    let post: Vec<&String> = doc["paths"]["/api/posts/{post}"]
        .as_object()
        .unwrap()
        .keys()
        .collect();
    assert_eq!(post, vec!["get", "put", "patch"]);

    // Step 3: Top-level sections come from the configuration file
    assert_eq!(doc["info"]["title"], json!("Fixture API"));
    assert_eq!(doc["info"]["version"], json!("2.1.0"));
    assert_eq!(
        doc["servers"],
        json!([{"url": "https://api.example.com", "description": "Production"}])
    );
    assert_eq!(doc["tags"], json!([{"name": "Blog"}, {"name": "Users"}]));
}

#[test]
fn test_fixture_collection_endpoint() {
    let doc = build_fixture_document("simple");
    let index = &doc["paths"]["/api/users"]["get"];

    assert_eq!(index["operationId"], json!("users_index"));
    assert_eq!(index["summary"], json!("List users"));
    assert_eq!(
        index["description"],
        json!("Returns every registered user, newest first.")
    );
    assert_eq!(index["tags"], json!(["Users"]));

    let names: Vec<&Value> = index["parameters"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| &p["name"])
        .collect();
    assert_eq!(names, vec!["filter[name]", "page"]);
    assert_eq!(index["parameters"][0]["in"], json!("query"));

    let media = &index["responses"]["200"]["content"]["application/json"];
    let data = &media["schema"]["properties"]["data"];
    assert_eq!(data["type"], json!("array"));
    assert_eq!(data["items"]["properties"]["is_admin"], json!({"type": "boolean"}));

    let items = media["example"]["data"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert!(items[0]["email"].as_str().unwrap().contains('@'));
    assert_eq!(media["example"]["meta"]["total"], json!(2));
}

#[test]
fn test_fixture_form_request_schema() {
    let doc = build_fixture_document("simple");
    let store = &doc["paths"]["/api/users"]["post"];

    assert_eq!(store["summary"], json!("Create User"));
    assert_eq!(
        store["requestBody"]["content"]["application/json"]["schema"]["$ref"],
        json!("#/components/schemas/UserPostApiUsersRequest")
    );
    assert!(store["responses"].get("201").is_some());
    assert!(store["responses"].get("200").is_none());

    let schema = &doc["components"]["schemas"]["UserPostApiUsersRequest"];
    assert_eq!(schema["required"], json!(["name", "email"]));
    assert_eq!(schema["properties"]["name"]["maxLength"], json!(50));
    assert_eq!(schema["properties"]["email"]["format"], json!("email"));
    assert_eq!(schema["properties"]["age"]["minimum"], json!(18));
    assert_eq!(schema["properties"]["roles"]["type"], json!("array"));
    // Bare `roles.*` rules describe scalar items and are not expanded
    assert!(schema["properties"].get("roles.*").is_none());
}

#[test]
fn test_fixture_single_resource_endpoints() {
    let doc = build_fixture_document("simple");

    let show = &doc["paths"]["/api/users/{user}"]["get"];
    assert_eq!(show["summary"], json!("Get User"));
    assert_eq!(show["parameters"][0]["in"], json!("path"));
    assert_eq!(show["parameters"][0]["required"], json!(true));
    assert_eq!(show["parameters"][0]["description"], json!("ID of User"));
    let data = &show["responses"]["200"]["content"]["application/json"]["example"]["data"];
    assert_eq!(data["id"], json!(1));
    assert!(data["is_admin"].is_boolean());

    let destroy = &doc["paths"]["/api/users/{user}"]["delete"];
    assert_eq!(destroy["parameters"][0]["description"], json!("The user to remove"));
    assert_eq!(destroy["responses"], json!({"204": {"description": "No Content"}}));

    // Doc-comment group and opt-out of the global security
    let post = &doc["paths"]["/api/posts/{post}"]["get"];
    assert_eq!(post["tags"], json!(["Blog"]));
    assert_eq!(post["security"], json!([]));
    assert!(doc["paths"]["/api/posts/{post}"]["put"].get("security").is_none());
}

#[test]
fn test_fixture_inline_validation() {
    let doc = build_fixture_document("simple");

    let update = &doc["paths"]["/api/posts/{post}"]["patch"];
    assert_eq!(update["summary"], json!("Publish a post"));
    assert_eq!(
        update["requestBody"]["content"]["application/json"]["schema"]["$ref"],
        json!("#/components/schemas/PostPatchApiPostsRequest")
    );

    let schema = &doc["components"]["schemas"]["PostPatchApiPostsRequest"];
    assert!(schema.get("required").is_none());
    assert_eq!(schema["properties"]["title"]["minLength"], json!(3));
    assert_eq!(schema["properties"]["status"]["enum"], json!(["draft", "published"]));
    assert_eq!(schema["properties"]["published_at"]["nullable"], json!(true));
    assert!(doc["components"]["schemas"].get("PostPutApiPostsRequest").is_some());
}

#[test]
fn test_fixture_json_api_relationships() {
    let doc = build_fixture_document("json-api");
    assert!(doc["components"]["schemas"].get("JsonApiDocument").is_some());
    assert!(doc["components"]["schemas"].get("SuccessResponse").is_none());

    let example = &doc["paths"]["/api/posts/{post}"]["get"]["responses"]["200"]["content"]
        ["application/json"]["example"];
    assert_eq!(example["data"]["type"], json!("posts"));
    assert!(example["data"]["attributes"]["title"].is_string());

    let author = &example["data"]["relationships"]["author"];
    assert_eq!(author["data"]["type"], json!("author"));
    assert_eq!(author["links"]["related"], json!("/posts/1/author"));

    let included = example["included"].as_array().unwrap();
    assert_eq!(included.len(), 1);
    assert!(included[0]["attributes"]["email"].is_string());

    let users = &doc["paths"]["/api/users"]["get"]["responses"]["200"]["content"]
        ["application/json"]["example"];
    assert_eq!(users["data"].as_array().unwrap().len(), 2);
    assert_eq!(users["links"]["first"], json!("/users?page[number]=1"));
}

#[test]
fn test_seeded_builds_are_reproducible() {
    assert_eq!(build_fixture_document("json-api"), build_fixture_document("json-api"));
}

#[test]
fn test_route_table_metadata_overrides_scanned_sources() {
    let temp_dir = create_test_project(vec![
        (
            "app/Http/Controllers/OrderController.php",
            r#"<?php
namespace App\Http\Controllers;

class OrderController extends Controller
{
    /**
     * Scanned summary
     */
    public function store(Request $request)
    {
        $request->validate(['sku' => 'required|string']);
    }
}
"#,
        ),
        (
            "routes.yaml",
            r#"
routes:
  - uri: api/orders
    methods: [POST]
    action: App\Http\Controllers\OrderController@store
classes:
  App\Http\Controllers\OrderController:
    methods:
      store:
        doc: "/** Place an order */"
        rules:
          quantity: required|integer|min:1
"#,
        ),
    ]);

    let args = GenerateArgs {
        routes: temp_dir.path().join("routes.yaml"),
        config: None,
        source: Some(temp_dir.path().join("app")),
        output: Some(temp_dir.path().join("docs").join("openapi.json")),
        format: None,
        output_format: None,
        seed: Some(3),
    };
    let summary = generate(&args).unwrap();
    assert_eq!(summary.endpoints, 1);

    let doc: Value = serde_json::from_str(&fs::read_to_string(&summary.path).unwrap()).unwrap();
    let store = &doc["paths"]["/api/orders"]["post"];
    assert_eq!(store["summary"], json!("Place an order"));

    let schema = &doc["components"]["schemas"]["OrderPostApiOrdersRequest"];
    assert_eq!(schema["required"], json!(["quantity"]));
    assert!(schema["properties"].get("sku").is_none());
}

#[test]
fn test_cli_generate_yaml_from_fixtures() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("openapi.yaml");

    let args = GenerateArgs {
        routes: fixture("routes.yaml"),
        config: Some(fixture("config.yaml")),
        source: Some(fixture("app")),
        output: Some(output.clone()),
        format: Some("json-api".to_string()),
        output_format: Some(OutputFormat::Yaml),
        seed: None,
    };

    let summary = generate(&args).unwrap();
    assert_eq!(summary.format, "json-api");
    assert_eq!(summary.routes, 6);
    assert_eq!(summary.endpoints, 7);
    assert_eq!(summary.tags, 2);
    assert_eq!(summary.path, output);

    let yaml = fs::read_to_string(&output).unwrap();
    assert!(yaml.starts_with("openapi:"));
    let doc: Value = serde_yaml::from_str(&yaml).unwrap();
    assert_eq!(doc["info"]["title"], json!("Fixture API"));
    assert!(doc["paths"]["/api/users/{user}"].get("delete").is_some());
}

#[test]
fn test_empty_route_table_writes_empty_paths() {
    let temp_dir = create_test_project(vec![("routes.json", r#"{"routes": []}"#)]);
    let output = temp_dir.path().join("openapi.json");

    let args = GenerateArgs {
        routes: temp_dir.path().join("routes.json"),
        config: None,
        source: None,
        output: Some(output.clone()),
        format: None,
        output_format: None,
        seed: None,
    };
    let summary = generate(&args).unwrap();
    assert_eq!(summary.endpoints, 0);

    let doc: Value = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(doc["paths"], json!({}));
    assert!(doc["components"]["schemas"].get("ErrorResponse").is_some());
}
