use crate::doc_parser::ParsedParam;
use crate::example_generator::ExampleGenerator;
use crate::inflector::headline;
use crate::messages::Messages;
use crate::resource_extractor::Attributes;
use crate::type_resolver::{FieldTypeResolver, OpenApiType};
use crate::validation::{RuleToken, ValidationRules};
use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// OpenAPI Schema definition
///
/// Absent keys are never serialized, so an emitted schema carries no `null`
/// or empty-collection leaves.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// Reference to a component schema
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<OpenApiType>,
    /// Format hint (`email`, `uri`, `uuid`, `date`, ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,
    #[serde(rename = "minLength", skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(rename = "maxLength", skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    #[serde(rename = "minItems", skip_serializing_if = "Option::is_none")]
    pub min_items: Option<u64>,
    #[serde(rename = "maxItems", skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<Number>,
    /// Item schema for arrays
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, Schema>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    /// `true` or a schema for free-form maps
    #[serde(rename = "additionalProperties", skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<Value>,
    #[serde(rename = "oneOf", default, skip_serializing_if = "Vec::is_empty")]
    pub one_of: Vec<Schema>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
}

impl Schema {
    pub fn of_type(schema_type: OpenApiType) -> Self {
        Self {
            schema_type: Some(schema_type),
            ..Self::default()
        }
    }

    pub fn object() -> Self {
        Self::of_type(OpenApiType::Object)
    }

    /// Free-form object (`additionalProperties: true`)
    pub fn map() -> Self {
        Self {
            additional_properties: Some(Value::Bool(true)),
            ..Self::object()
        }
    }

    pub fn array(items: Schema) -> Self {
        Self {
            items: Some(Box::new(items)),
            ..Self::of_type(OpenApiType::Array)
        }
    }

    /// `$ref` to a schema under `#/components/schemas`
    pub fn reference(name: &str) -> Self {
        Self {
            reference: Some(format!("#/components/schemas/{}", name)),
            ..Self::default()
        }
    }

    pub fn one_of(variants: Vec<Schema>) -> Self {
        Self {
            one_of: variants,
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_example(mut self, example: Value) -> Self {
        self.example = Some(example);
        self
    }

    pub fn with_format(mut self, format: &str) -> Self {
        self.format = Some(format.to_string());
        self
    }

    pub fn with_property(mut self, name: &str, schema: Schema) -> Self {
        self.properties.insert(name.to_string(), schema);
        self
    }

    pub fn with_required(mut self, names: &[&str]) -> Self {
        self.required = names.iter().map(|n| n.to_string()).collect();
        self
    }

    /// Add a name to `required` unless already present
    pub fn require(&mut self, name: &str) {
        if !self.required.iter().any(|r| r == name) {
            self.required.push(name.to_string());
        }
    }
}

/// Schema builder - turns validation rule sets and documented body
/// parameters into request-body schemas.
///
/// It also owns the run's [`ExampleGenerator`], so every example value in a
/// document comes from the same seeded source.
pub struct SchemaBuilder {
    type_map: IndexMap<String, OpenApiType>,
    resolver: FieldTypeResolver,
    messages: Messages,
    examples: ExampleGenerator,
}

impl SchemaBuilder {
    pub fn new(
        type_map: IndexMap<String, OpenApiType>,
        messages: Messages,
        examples: ExampleGenerator,
    ) -> Self {
        Self {
            type_map,
            resolver: FieldTypeResolver::new(),
            messages,
            examples,
        }
    }

    /// Build an object schema from validation rules and documented body params.
    ///
    /// Rules of the form `field.*.item` describe the properties of an
    /// array's items. Any other dotted rule path is skipped. Documented params
    /// are applied afterwards: they never replace a property built from rules,
    /// and `required` stays free of duplicates.
    pub fn build(&self, rules: &ValidationRules, doc_params: &[ParsedParam]) -> Schema {
        let mut schema = Schema::object();

        for (field, rule_list) in rules.iter() {
            let is_required = rule_list.iter().any(|r| r.as_token() == Some("required"));

            if let Some((array_field, item_field)) = split_array_item(field) {
                let items = Self::array_items(&mut schema, array_field);
                items
                    .properties
                    .insert(item_field.to_string(), self.field_schema(item_field, rule_list));
                if is_required {
                    items.require(item_field);
                }
                continue;
            }

            if field.contains('.') {
                debug!("Skipping nested validation field: {}", field);
                continue;
            }

            if is_required {
                schema.require(field);
            }

            let mut property = self.field_schema(field, rule_list);
            // Keep item properties collected from earlier `field.*.item` rules
            if let Some(existing) = schema.properties.get_mut(field) {
                if property.items.is_none() {
                    property.items = existing.items.take();
                }
            }
            schema.properties.insert(field.clone(), property);
        }

        for param in doc_params {
            let ty = self.resolver.normalize(&param.type_name);
            let description = Some(param.description.clone()).filter(|d| !d.is_empty());

            match param.name.split_once('.') {
                Some((array_field, item_field)) => {
                    let items = Self::array_items(&mut schema, array_field);
                    items.properties.insert(
                        item_field.to_string(),
                        Schema {
                            description,
                            ..Schema::of_type(ty)
                        },
                    );
                }
                None => {
                    schema
                        .properties
                        .entry(param.name.clone())
                        .or_insert_with(|| Schema {
                            description,
                            ..Schema::of_type(ty)
                        });
                    if param.required == Some(true) {
                        schema.require(&param.name);
                    }
                }
            }
        }

        schema
    }

    /// Get the item object schema of an array property, creating both as needed.
    fn array_items<'s>(schema: &'s mut Schema, array_field: &str) -> &'s mut Schema {
        let property = schema
            .properties
            .entry(array_field.to_string())
            .or_insert_with(|| {
                Schema::of_type(OpenApiType::Array).with_description(headline(array_field))
            });
        property.schema_type = Some(OpenApiType::Array);
        property
            .items
            .get_or_insert_with(|| Box::new(Schema::object()))
            .as_mut()
    }

    /// Build the schema of one field from its rule list.
    fn field_schema(&self, field: &str, rules: &[RuleToken]) -> Schema {
        let ty = self.resolver.from_rule_list(rules, &self.type_map);
        let mut schema = Schema::of_type(ty).with_description(self.describe(field, rules));

        for rule in rules {
            match (rule.name(), rule.argument()) {
                (Some("max"), Some(value)) => apply_bound(&mut schema, ty, value, Bound::Max),
                (Some("min"), Some(value)) => apply_bound(&mut schema, ty, value, Bound::Min),
                (Some("in"), Some(values)) => {
                    schema.enum_values = Some(
                        values
                            .split(',')
                            .map(|v| enum_value(v.trim(), ty))
                            .collect(),
                    );
                }
                (Some("email"), _) => schema.format = Some("email".to_string()),
                (Some("url"), _) => schema.format = Some("uri".to_string()),
                (Some("uuid"), _) => schema.format = Some("uuid".to_string()),
                (Some("date"), None) => schema.format = Some("date".to_string()),
                (Some("nullable"), None) => schema.nullable = Some(true),
                _ => {}
            }
        }

        schema
    }

    /// Headline of the field, followed by notes on recognised rules.
    fn describe(&self, field: &str, rules: &[RuleToken]) -> String {
        let mut notes: Vec<String> = Vec::new();

        for rule in rules {
            match rule {
                RuleToken::Token(_) => match (rule.name(), rule.argument()) {
                    (Some("max"), Some(value)) => notes.push(self.messages.max(value)),
                    (Some("min"), Some(value)) => notes.push(self.messages.min(value)),
                    (Some("email"), _) => notes.push("email".to_string()),
                    (Some("unique"), _) => notes.push(self.messages.unique().to_string()),
                    (Some("exists"), Some(_)) => notes.push(self.messages.exists().to_string()),
                    _ => {}
                },
                RuleToken::Object(source) => {
                    let lower = source.to_lowercase();
                    if lower.contains("rule::unique") || lower.contains("new unique") {
                        notes.push(self.messages.unique().to_string());
                    } else if lower.contains("rule::exists") || lower.contains("new exists") {
                        notes.push(self.messages.exists().to_string());
                    }
                }
            }
        }

        if notes.is_empty() {
            headline(field)
        } else {
            format!("{} ({})", headline(field), notes.join(", "))
        }
    }

    /// The shared example generator
    pub fn examples(&mut self) -> &mut ExampleGenerator {
        &mut self.examples
    }

    pub fn generate_value(&mut self, field: &str, ty: Option<OpenApiType>) -> Value {
        self.examples.generate(field, ty)
    }

    pub fn generate_object(&mut self, attributes: Option<&Attributes>, id: i64) -> Value {
        self.examples.generate_object(attributes, id)
    }

    pub fn generate_json_api_resource(
        &mut self,
        resource_type: &str,
        attributes: Option<&Attributes>,
        id: i64,
    ) -> Value {
        self.examples
            .generate_json_api_resource(resource_type, attributes, id)
    }

    pub fn random_int(&mut self, min: i64, max: i64) -> i64 {
        self.examples.random_int(min, max)
    }
}

fn apply_bound(schema: &mut Schema, ty: OpenApiType, value: &str, bound: Bound) {
    match ty {
        OpenApiType::String | OpenApiType::Array => {
            let Ok(n) = value.trim().parse::<u64>() else {
                return;
            };
            let slot = match (ty, bound) {
                (OpenApiType::String, Bound::Max) => &mut schema.max_length,
                (OpenApiType::String, Bound::Min) => &mut schema.min_length,
                (_, Bound::Max) => &mut schema.max_items,
                (_, Bound::Min) => &mut schema.min_items,
            };
            *slot = Some(n);
        }
        OpenApiType::Integer | OpenApiType::Number => {
            let Some(n) = parse_number(value.trim()) else {
                return;
            };
            match bound {
                Bound::Max => schema.maximum = Some(n),
                Bound::Min => schema.minimum = Some(n),
            }
        }
        OpenApiType::Boolean | OpenApiType::Object => {}
    }
}

#[derive(Clone, Copy)]
enum Bound {
    Min,
    Max,
}

/// Split `field.*.item` into `(field, item)`
fn split_array_item(path: &str) -> Option<(&str, &str)> {
    let mut parts = path.splitn(3, '.');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(array_field), Some("*"), Some(item_field))
            if !array_field.is_empty() && !item_field.is_empty() =>
        {
            Some((array_field, item_field))
        }
        _ => None,
    }
}

fn parse_number(value: &str) -> Option<Number> {
    if let Ok(n) = value.parse::<i64>() {
        return Some(Number::from(n));
    }
    value.parse::<f64>().ok().and_then(Number::from_f64)
}

fn enum_value(value: &str, ty: OpenApiType) -> Value {
    if ty.is_numeric() {
        if let Some(n) = parse_number(value) {
            return Value::Number(n);
        }
    }
    Value::String(value.to_string())
}
