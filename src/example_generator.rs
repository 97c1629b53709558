//! Example value generator.
//!
//! Example values are chosen by field name first: an ordered table maps name
//! fragments (`email`, `price`, `created`, ...) to fake-data generators, and the
//! first matching entry wins. When a type is known, only entries producing a
//! value of that type are eligible, so `is_deleted: boolean` never turns into
//! a timestamp. Names that match nothing fall back to a generator chosen by
//! type, which still looks at finer name hints (`age`, `per_page`, `latitude`).
//!
//! All randomness comes from one seedable [`Faker`] backed by the `fake`
//! generators; a fixed seed makes the whole document reproducible.

use crate::faker::Faker;
use crate::resource_extractor::Attributes;
use crate::type_resolver::OpenApiType;
use serde_json::{json, Map, Value};

/// Kind of value a pattern produces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    /// Custom patterns: eligible for every type
    Any,
}

impl ValueKind {
    fn accepts(&self, ty: OpenApiType) -> bool {
        match self {
            ValueKind::Any => true,
            ValueKind::String => ty == OpenApiType::String,
            ValueKind::Integer => ty == OpenApiType::Integer,
            ValueKind::Number => ty == OpenApiType::Number,
            ValueKind::Boolean => ty == OpenApiType::Boolean,
            ValueKind::Array => ty == OpenApiType::Array,
        }
    }
}

/// How a pattern's needle is compared with the lower-cased field name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Match {
    /// Anywhere in the name
    Contains,
    /// As a whole `_`-separated word (`age` matches `user_age`, not `page`)
    Word,
    Prefix,
    Suffix,
}

impl Match {
    fn matches(&self, name: &str, needle: &str) -> bool {
        match self {
            Match::Contains => name.contains(needle),
            Match::Word => name.split('_').any(|word| word == needle),
            Match::Prefix => name.starts_with(needle),
            Match::Suffix => name.ends_with(needle),
        }
    }
}

type GenerateFn = Box<dyn Fn(&mut Faker) -> Value>;

struct Pattern {
    needle: String,
    mode: Match,
    kind: ValueKind,
    generate: GenerateFn,
}

const NEGATIVE_FLAGS: &[&str] = &[
    "disabled", "hidden", "deleted", "blocked", "banned", "expired", "archived",
];

pub struct ExampleGenerator {
    faker: Faker,
    patterns: Vec<Pattern>,
}

impl ExampleGenerator {
    /// Create a generator; a fixed `seed` makes every value reproducible.
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            faker: Faker::new(seed),
            patterns: builtin_patterns(),
        }
    }

    /// Register a custom name pattern.
    ///
    /// Replaces an existing pattern with the same needle in place; new
    /// patterns are consulted before the built-in ones. Custom patterns are
    /// eligible whatever type is requested.
    pub fn add_pattern<F>(&mut self, needle: &str, generator: F) -> &mut Self
    where
        F: Fn(&mut Faker) -> Value + 'static,
    {
        let needle = needle.to_lowercase();
        let pattern = Pattern {
            needle: needle.clone(),
            mode: Match::Contains,
            kind: ValueKind::Any,
            generate: Box::new(generator),
        };

        match self.patterns.iter().position(|p| p.needle == needle) {
            Some(idx) => self.patterns[idx] = pattern,
            None => self.patterns.insert(0, pattern),
        }
        self
    }

    /// Generate an example for a field, optionally constrained to a type.
    pub fn generate(&mut self, field: &str, ty: Option<OpenApiType>) -> Value {
        let name = field.to_lowercase();

        if matches!(ty, None | Some(OpenApiType::Integer)) && is_id(&name) {
            return json!(self.faker.number_between(1, 1000));
        }
        if ty == Some(OpenApiType::Boolean) && is_negative_flag(&name) {
            return json!(false);
        }

        let matched = self.patterns.iter().find(|p| {
            p.mode.matches(&name, &p.needle) && ty.map(|t| p.kind.accepts(t)).unwrap_or(true)
        });
        if let Some(pattern) = matched {
            return (pattern.generate)(&mut self.faker);
        }

        match ty.unwrap_or_default() {
            OpenApiType::Integer => json!(self.integer(&name)),
            OpenApiType::Number => json!(self.number(&name)),
            OpenApiType::Boolean => json!(!is_negative_flag(&name)),
            OpenApiType::Array => json!([]),
            OpenApiType::Object => json!({}),
            OpenApiType::String => json!(self.faker.word()),
        }
    }

    /// Flat example record: `id` followed by one value per attribute.
    ///
    /// Without attribute metadata the record gets `created_at`/`updated_at`.
    pub fn generate_object(&mut self, attributes: Option<&Attributes>, id: i64) -> Value {
        let mut record = Map::new();
        record.insert("id".to_string(), json!(id));
        record.extend(self.attribute_values(attributes));
        Value::Object(record)
    }

    /// JSON:API resource object `{type, id, attributes, links}`.
    pub fn generate_json_api_resource(
        &mut self,
        resource_type: &str,
        attributes: Option<&Attributes>,
        id: i64,
    ) -> Value {
        json!({
            "type": resource_type,
            "id": id.to_string(),
            "attributes": Value::Object(self.attribute_values(attributes)),
            "links": {
                "self": format!("/{}/{}", resource_type, id),
            },
        })
    }

    pub fn random_int(&mut self, min: i64, max: i64) -> i64 {
        self.faker.number_between(min, max)
    }

    /// The underlying fake-data source
    pub fn faker(&mut self) -> &mut Faker {
        &mut self.faker
    }

    fn attribute_values(&mut self, attributes: Option<&Attributes>) -> Map<String, Value> {
        let mut values = Map::new();
        match attributes.filter(|attrs| !attrs.is_empty()) {
            Some(attrs) => {
                for (name, attribute) in attrs {
                    if name == "id" {
                        continue;
                    }
                    let value = self.generate(name, Some(attribute.ty));
                    values.insert(name.clone(), value);
                }
            }
            None => {
                values.insert("created_at".to_string(), json!(self.faker.iso8601()));
                values.insert("updated_at".to_string(), json!(self.faker.iso8601()));
            }
        }
        values
    }

    fn integer(&mut self, name: &str) -> i64 {
        let has = |needle: &str| name.contains(needle);
        let word = |needle: &str| Match::Word.matches(name, needle);
        let f = &mut self.faker;

        if has("per_page") || has("limit") {
            15
        } else if has("page") {
            1
        } else if has("offset") || has("skip") {
            0
        } else if word("age") {
            f.number_between(18, 80)
        } else if has("year") {
            f.year()
        } else if has("month") {
            f.number_between(1, 12)
        } else if has("day") {
            f.number_between(1, 28)
        } else if has("hour") {
            f.number_between(0, 23)
        } else if has("minute") {
            f.number_between(0, 59)
        } else if has("count") || has("quantity") {
            f.number_between(1, 100)
        } else if has("stock") {
            f.number_between(0, 1000)
        } else if has("total") {
            f.number_between(50, 500)
        } else if has("order") || has("position") || has("sort") {
            f.number_between(1, 10)
        } else if has("priority") || has("level") {
            f.number_between(1, 5)
        } else if has("percent") {
            f.number_between(0, 100)
        } else if has("rating") || has("score") {
            f.number_between(1, 5)
        } else if has("width") || has("height") {
            f.number_between(100, 1920)
        } else if has("size") {
            f.number_between(100, 10000)
        } else if has("duration") {
            f.number_between(60, 7200)
        } else if has("attempts") || has("retries") {
            f.number_between(1, 5)
        } else {
            f.number_between(1, 100)
        }
    }

    fn number(&mut self, name: &str) -> f64 {
        let has = |needle: &str| name.contains(needle);
        let word = |needle: &str| Match::Word.matches(name, needle);
        let f = &mut self.faker;

        if has("price") {
            f.random_float(2, 10.0, 1000.0)
        } else if has("amount") || has("sum") {
            f.random_float(2, 1.0, 10000.0)
        } else if has("cost") {
            f.random_float(2, 1.0, 500.0)
        } else if has("total") {
            f.random_float(2, 10.0, 5000.0)
        } else if has("balance") {
            f.random_float(2, 0.0, 10000.0)
        } else if has("tax") {
            f.random_float(2, 0.0, 100.0)
        } else if has("discount") {
            f.random_float(2, 0.0, 50.0)
        } else if has("percent") {
            f.random_float(1, 0.0, 100.0)
        } else if has("rate") {
            f.random_float(2, 0.0, 1.0)
        } else if has("latitude") || word("lat") {
            f.latitude()
        } else if has("longitude") || word("lng") || word("lon") {
            f.longitude()
        } else if has("weight") {
            f.random_float(2, 0.1, 100.0)
        } else if has("rating") || has("score") {
            f.random_float(1, 1.0, 5.0)
        } else {
            f.random_float(2, 0.0, 1000.0)
        }
    }
}

fn is_id(name: &str) -> bool {
    name == "id" || name.ends_with("_id")
}

fn is_negative_flag(name: &str) -> bool {
    NEGATIVE_FLAGS.iter().any(|flag| name.contains(flag))
}

fn pattern(needle: &str, mode: Match, kind: ValueKind, generate: fn(&mut Faker) -> Value) -> Pattern {
    Pattern {
        needle: needle.to_string(),
        mode,
        kind,
        generate: Box::new(generate),
    }
}

/// Built-in name patterns, most specific first.
///
/// Order matters: `username` must precede `name`, `mime` must precede `type`,
/// `job_title` must precede `title`, and short fragments that occur inside
/// unrelated words are matched as whole words only.
fn builtin_patterns() -> Vec<Pattern> {
    use Match::{Contains, Prefix, Suffix, Word};
    use ValueKind::{Array, Boolean, Integer, Number, String};

    vec![
        // Identification
        pattern("uuid", Contains, String, |f| json!(f.uuid())),
        pattern("slug", Contains, String, |f| json!(f.slug(3))),
        // Files & media (before names, types and titles)
        pattern("filename", Contains, String, |f| {
            json!(format!("{}.{}", f.word(), f.file_extension()))
        }),
        pattern("mime", Contains, String, |f| json!(f.mime_type())),
        pattern("extension", Contains, String, |f| json!(f.file_extension())),
        pattern("avatar", Contains, String, |f| json!(f.image_url(200, 200, Some("people")))),
        pattern("thumbnail", Contains, String, |f| json!(f.image_url(150, 150, None))),
        pattern("image", Contains, String, |f| json!(f.image_url(640, 480, None))),
        pattern("photo", Contains, String, |f| json!(f.image_url(640, 480, None))),
        pattern("picture", Contains, String, |f| json!(f.image_url(640, 480, None))),
        pattern("logo", Contains, String, |f| json!(f.image_url(200, 200, None))),
        pattern("icon", Contains, String, |f| json!(f.image_url(64, 64, None))),
        pattern("video", Contains, String, |f| {
            json!(format!("https://example.com/video/{}.mp4", f.uuid()))
        }),
        pattern("audio", Contains, String, |f| {
            json!(format!("https://example.com/audio/{}.mp3", f.uuid()))
        }),
        pattern("file", Contains, String, |f| json!(f.file_path())),
        pattern("path", Contains, String, |f| {
            json!(format!("/uploads/{}.{}", f.word(), f.file_extension()))
        }),
        // Company & business (before names and titles)
        pattern("company", Contains, String, |f| json!(f.company())),
        pattern("organization", Contains, String, |f| json!(f.company())),
        pattern("job_title", Contains, String, |f| json!(f.job_title())),
        pattern("job", Word, String, |f| json!(f.job_title())),
        pattern("department", Contains, String, |f| {
            json!(f.random_element(&["Engineering", "Marketing", "Sales", "HR"]))
        }),
        pattern("industry", Contains, String, |f| json!(f.industry())),
        // Personal
        pattern("first_name", Contains, String, |f| json!(f.first_name())),
        pattern("last_name", Contains, String, |f| json!(f.last_name())),
        pattern("full_name", Contains, String, |f| json!(f.name())),
        pattern("username", Contains, String, |f| json!(f.user_name())),
        pattern("name", Contains, String, |f| json!(f.name())),
        pattern("email", Contains, String, |f| json!(f.safe_email())),
        pattern("phone", Contains, String, |f| json!(f.e164_phone_number())),
        pattern("mobile", Contains, String, |f| json!(f.phone_number())),
        pattern("bio", Word, String, |f| json!(f.sentence(10))),
        pattern("gender", Contains, String, |f| {
            json!(f.random_element(&["male", "female", "other"]))
        }),
        pattern("birthday", Contains, String, |f| json!(f.date())),
        pattern("birth", Contains, String, |f| json!(f.date())),
        pattern("age", Word, Integer, |f| json!(f.number_between(18, 80))),
        // Internet (addresses before postal addresses)
        pattern("ip_address", Contains, String, |f| json!(f.ipv4())),
        pattern("mac_address", Contains, String, |f| json!(f.mac_address())),
        pattern("url", Contains, String, |f| json!(f.url())),
        pattern("link", Contains, String, |f| json!(f.url())),
        pattern("website", Contains, String, |f| json!(f.url())),
        pattern("domain", Contains, String, |f| json!(f.domain_name())),
        pattern("ipv6", Contains, String, |f| json!(f.ipv6())),
        pattern("ipv4", Contains, String, |f| json!(f.ipv4())),
        pattern("user_agent", Contains, String, |f| json!(f.user_agent())),
        // Postal
        pattern("address", Contains, String, |f| json!(f.street_address())),
        pattern("street", Contains, String, |f| json!(f.street_name())),
        pattern("city", Contains, String, |f| json!(f.city())),
        pattern("country", Contains, String, |f| json!(f.country_code())),
        pattern("zip", Contains, String, |f| json!(f.postcode())),
        pattern("postcode", Contains, String, |f| json!(f.postcode())),
        pattern("postal", Contains, String, |f| json!(f.postcode())),
        pattern("latitude", Contains, Number, |f| json!(f.latitude())),
        pattern("longitude", Contains, Number, |f| json!(f.longitude())),
        pattern("timezone", Contains, String, |f| json!(f.timezone())),
        // Content
        pattern("title", Contains, String, |f| json!(f.sentence(4))),
        pattern("headline", Contains, String, |f| json!(f.sentence(6))),
        pattern("subject", Contains, String, |f| json!(f.sentence(5))),
        pattern("description", Contains, String, |f| json!(f.paragraph(2))),
        pattern("summary", Contains, String, |f| json!(f.paragraph(1))),
        pattern("content", Contains, String, |f| json!(f.paragraphs(3))),
        pattern("body", Contains, String, |f| json!(f.paragraphs(3))),
        pattern("excerpt", Contains, String, |f| json!(f.sentence(15))),
        pattern("comment", Contains, String, |f| json!(f.sentence(10))),
        pattern("note", Contains, String, |f| json!(f.sentence(8))),
        pattern("message", Contains, String, |f| json!(f.sentence(12))),
        pattern("text", Contains, String, |f| json!(f.text(200))),
        // Dates & times
        pattern("datetime", Contains, String, |f| json!(f.iso8601())),
        pattern("timestamp", Contains, Integer, |f| json!(f.unix_time())),
        pattern("timestamp", Contains, String, |f| json!(f.unix_time().to_string())),
        pattern("created", Contains, String, |f| json!(f.iso8601())),
        pattern("updated", Contains, String, |f| json!(f.iso8601())),
        pattern("deleted", Contains, String, |f| json!(f.iso8601())),
        pattern("published", Contains, String, |f| json!(f.iso8601())),
        pattern("expired", Contains, String, |f| json!(f.iso8601())),
        pattern("expires", Contains, String, |f| json!(f.iso8601())),
        pattern("date", Contains, String, |f| json!(f.date())),
        pattern("time", Contains, String, |f| json!(f.time())),
        pattern("month", Contains, String, |f| json!(f.month_name())),
        // Financial
        pattern("price", Contains, Number, |f| json!(f.random_float(2, 10.0, 1000.0))),
        pattern("amount", Contains, Number, |f| json!(f.random_float(2, 1.0, 10000.0))),
        pattern("cost", Contains, Number, |f| json!(f.random_float(2, 1.0, 500.0))),
        pattern("total", Contains, Number, |f| json!(f.random_float(2, 10.0, 5000.0))),
        pattern("balance", Contains, Number, |f| json!(f.random_float(2, 0.0, 10000.0))),
        pattern("salary", Contains, Integer, |f| json!(f.number_between(30000, 150000))),
        pattern("currency", Contains, String, |f| json!(f.currency_code())),
        pattern("credit_card", Contains, String, |f| json!(f.credit_card_number())),
        pattern("card_number", Contains, String, |f| json!(f.credit_card_number())),
        pattern("iban", Contains, String, |f| json!(f.iban("GB"))),
        pattern("swift", Contains, String, |f| json!(f.swift_bic_number())),
        pattern("bic", Word, String, |f| json!(f.swift_bic_number())),
        // Quantities
        pattern("count", Word, Integer, |f| json!(f.number_between(1, 100))),
        pattern("quantity", Contains, Integer, |f| json!(f.number_between(1, 50))),
        pattern("stock", Contains, Integer, |f| json!(f.number_between(0, 1000))),
        pattern("number", Contains, Integer, |f| json!(f.number_between(1, 1000))),
        pattern("percentage", Contains, Integer, |f| json!(f.number_between(0, 100))),
        pattern("percent", Contains, Integer, |f| json!(f.number_between(0, 100))),
        pattern("rating", Contains, Number, |f| json!(f.random_float(1, 1.0, 5.0))),
        pattern("score", Contains, Integer, |f| json!(f.number_between(0, 100))),
        pattern("weight", Contains, Number, |f| json!(f.random_float(2, 0.1, 100.0))),
        pattern("height", Contains, Integer, |f| json!(f.number_between(100, 220))),
        pattern("width", Contains, Integer, |f| json!(f.number_between(1, 1000))),
        pattern("length", Contains, Integer, |f| json!(f.number_between(1, 1000))),
        pattern("size", Contains, String, |f| json!(f.random_element(&["S", "M", "L", "XL"]))),
        pattern("order", Word, Integer, |f| json!(f.number_between(0, 100))),
        pattern("position", Contains, Integer, |f| json!(f.number_between(1, 50))),
        pattern("priority", Contains, Integer, |f| json!(f.number_between(1, 10))),
        pattern("level", Contains, Integer, |f| json!(f.number_between(1, 10))),
        // Technical
        pattern("token", Contains, String, |f| json!(f.sha256())),
        pattern("hash", Contains, String, |f| json!(f.sha256())),
        pattern("secret", Contains, String, |f| json!(f.sha1())),
        pattern("password", Contains, String, |_| json!("********")),
        pattern("barcode", Contains, String, |f| json!(f.isbn13())),
        pattern("sku", Contains, String, |f| json!(f.bothify("???-####").to_uppercase())),
        pattern("serial", Contains, String, |f| json!(f.bothify("??##??##??").to_uppercase())),
        pattern("code", Contains, String, |f| json!(f.bothify("??###").to_uppercase())),
        pattern("version", Contains, String, |f| json!(f.semver())),
        pattern("locale", Contains, String, |f| {
            json!(f.random_element(&["en_US", "en_GB", "de_DE", "fr_FR", "es_ES", "ru_RU"]))
        }),
        pattern("language", Contains, String, |f| {
            json!(f.random_element(&["en", "de", "fr", "es", "ru", "ja"]))
        }),
        pattern("color", Contains, String, |f| json!(f.hex_color())),
        pattern("rgb", Word, Array, |f| json!(f.rgb_color_as_array())),
        // Status & flags
        pattern("status", Contains, String, |f| {
            json!(f.random_element(&["active", "inactive", "pending"]))
        }),
        pattern("state", Word, String, |f| {
            json!(f.random_element(&["draft", "published", "archived"]))
        }),
        pattern("type", Contains, String, |f| {
            json!(f.random_element(&["default", "premium", "basic"]))
        }),
        pattern("role", Word, String, |f| {
            json!(f.random_element(&["user", "admin", "moderator"]))
        }),
        pattern("format", Contains, String, |f| json!(f.random_element(&["json", "xml", "csv"]))),
        pattern("active", Contains, Boolean, |f| json!(f.boolean(80))),
        pattern("enabled", Contains, Boolean, |f| json!(f.boolean(80))),
        pattern("visible", Contains, Boolean, |f| json!(f.boolean(80))),
        pattern("verified", Contains, Boolean, |f| json!(f.boolean(70))),
        pattern("confirmed", Contains, Boolean, |f| json!(f.boolean(70))),
        pattern("approved", Contains, Boolean, |f| json!(f.boolean(60))),
        pattern("published", Contains, Boolean, |f| json!(f.boolean(50))),
        pattern("featured", Contains, Boolean, |f| json!(f.boolean(20))),
        pattern("is_", Prefix, Boolean, |f| json!(f.boolean(50))),
        pattern("has_", Prefix, Boolean, |f| json!(f.boolean(50))),
        pattern("can_", Prefix, Boolean, |f| json!(f.boolean(50))),
        // Short fragments, whole words only
        pattern("ip", Word, String, |f| json!(f.ipv4())),
        pattern("mac", Word, String, |f| json!(f.mac_address())),
        pattern("lat", Word, Number, |f| json!(f.latitude())),
        pattern("lng", Word, Number, |f| json!(f.longitude())),
        pattern("lon", Word, Number, |f| json!(f.longitude())),
        pattern("key", Word, String, |f| json!(format!("key_{}", f.bothify("??????????")))),
        pattern("hex", Word, String, |f| json!(f.hex_color())),
        pattern("tel", Word, String, |f| json!(f.phone_number())),
        pattern("_at", Suffix, String, |f| json!(f.iso8601())),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource_extractor::Attribute;
    use indexmap::IndexMap;
    use pretty_assertions::assert_eq;

    fn generator() -> ExampleGenerator {
        ExampleGenerator::new(Some(42))
    }

    #[test]
    fn test_seeded_generators_agree() {
        let mut a = generator();
        let mut b = generator();
        for field in ["email", "price", "created_at", "title", "whatever"] {
            assert_eq!(a.generate(field, None), b.generate(field, None));
        }
    }

    #[test]
    fn test_name_patterns() {
        let mut gen = generator();
        assert!(gen.generate("email", None).as_str().unwrap().contains('@'));
        assert!(gen.generate("uuid", None).as_str().unwrap().len() == 36);
        assert_eq!(gen.generate("password", None), json!("********"));
        assert!(gen.generate("avatar_url", None).as_str().unwrap().starts_with("https://"));
        assert!(gen.generate("price", None).is_f64());
    }

    #[test]
    fn test_specific_patterns_precede_generic_ones() {
        let mut gen = generator();
        // a full name has a space, a user name never does
        let username = gen.generate("username", Some(OpenApiType::String));
        assert!(!username.as_str().unwrap().contains(' '));

        let mime = gen.generate("mime_type", Some(OpenApiType::String));
        assert!(mime.as_str().unwrap().contains('/'));

        // "age" must not match inside "page" or "image"
        assert_eq!(gen.generate("page", Some(OpenApiType::Integer)), json!(1));
        let image = gen.generate("image", Some(OpenApiType::String));
        assert!(image.as_str().unwrap().starts_with("https://via.placeholder.com/640x480"));
    }

    #[test]
    fn test_type_filters_patterns() {
        let mut gen = generator();

        // the timestamp pattern is ineligible for a boolean, negative flags are false
        assert_eq!(gen.generate("is_deleted", Some(OpenApiType::Boolean)), json!(false));
        assert_eq!(gen.generate("hidden", Some(OpenApiType::Boolean)), json!(false));

        let deleted_at = gen.generate("deleted_at", Some(OpenApiType::String));
        assert!(chrono::DateTime::parse_from_rfc3339(deleted_at.as_str().unwrap()).is_ok());

        let ts = gen.generate("timestamp", Some(OpenApiType::String));
        assert!(ts.is_string());
        let ts = gen.generate("timestamp", Some(OpenApiType::Integer));
        assert!(ts.is_i64());

        // integer size falls through to the integer sub-generator
        let size = gen.generate("size", Some(OpenApiType::Integer)).as_i64().unwrap();
        assert!((100..=10000).contains(&size));
    }

    #[test]
    fn test_type_fallbacks() {
        let mut gen = generator();

        let id = gen.generate("author_id", Some(OpenApiType::Integer)).as_i64().unwrap();
        assert!((1..=1000).contains(&id));
        assert_eq!(gen.generate("per_page", Some(OpenApiType::Integer)), json!(15));
        assert_eq!(gen.generate("offset", Some(OpenApiType::Integer)), json!(0));

        let age = gen.generate("user_age", Some(OpenApiType::Integer)).as_i64().unwrap();
        assert!((18..=80).contains(&age));

        let tax = gen.generate("vat_tax", Some(OpenApiType::Number)).as_f64().unwrap();
        assert!((0.0..=100.0).contains(&tax));

        assert_eq!(gen.generate("flag", Some(OpenApiType::Boolean)), json!(true));
        assert_eq!(gen.generate("tags", Some(OpenApiType::Array)), json!([]));
        assert_eq!(gen.generate("meta", Some(OpenApiType::Object)), json!({}));
        assert!(gen.generate("qwerty", Some(OpenApiType::String)).is_string());
    }

    #[test]
    fn test_custom_pattern_wins_for_any_type() {
        let mut gen = generator();
        gen.add_pattern("nickname", |_| json!("neo"));
        assert_eq!(gen.generate("nickname", Some(OpenApiType::String)), json!("neo"));
        assert_eq!(gen.generate("nickname", Some(OpenApiType::Integer)), json!("neo"));

        // replacing a built-in keeps its position
        gen.add_pattern("email", |_| json!("fixed@example.com"));
        assert_eq!(gen.generate("email", None), json!("fixed@example.com"));
    }

    #[test]
    fn test_generate_object() {
        let mut gen = generator();

        let mut attrs: Attributes = IndexMap::new();
        attrs.insert("id".to_string(), Attribute::new(OpenApiType::Integer));
        attrs.insert("title".to_string(), Attribute::new(OpenApiType::String));
        attrs.insert("is_active".to_string(), Attribute::new(OpenApiType::Boolean));

        let object = gen.generate_object(Some(&attrs), 7);
        let keys: Vec<&String> = object.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["id", "title", "is_active"]);
        assert_eq!(object["id"], json!(7));
        assert!(object["is_active"].is_boolean());

        let generic = gen.generate_object(None, 1);
        let keys: Vec<&String> = generic.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["id", "created_at", "updated_at"]);
    }

    #[test]
    fn test_generate_json_api_resource() {
        let mut gen = generator();
        let resource = gen.generate_json_api_resource("users", None, 3);

        assert_eq!(resource["type"], json!("users"));
        assert_eq!(resource["id"], json!("3"));
        assert_eq!(resource["links"]["self"], json!("/users/3"));
        assert!(resource["attributes"]["created_at"].is_string());
    }
}
