//! Seedable fake-data source.
//!
//! Wraps the `fake` generators around one [`StdRng`], so a fixed seed
//! reproduces the exact same sequence of examples.

use chrono::{DateTime, Utc};
use fake::faker::address::en as address;
use fake::faker::barcode::en as barcode;
use fake::faker::boolean::en as boolean;
use fake::faker::chrono::en as dates;
use fake::faker::company::en as company;
use fake::faker::creditcard::en as creditcard;
use fake::faker::currency::en as currency;
use fake::faker::filesystem::en as filesystem;
use fake::faker::finance::en as finance;
use fake::faker::internet::en as internet;
use fake::faker::job::en as job;
use fake::faker::lorem::en as lorem;
use fake::faker::name::en as name;
use fake::faker::number::en as number;
use fake::faker::phone_number::en as phone;
use fake::uuid::UUIDv4;
use fake::Fake;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Upper bound for generated timestamps: 2026-01-01T00:00:00Z.
/// Seeded runs must not depend on the clock.
const MAX_TIMESTAMP: i64 = 1_767_225_600;

const HEX: &[u8] = b"0123456789abcdef";

pub struct Faker {
    rng: StdRng,
}

impl Faker {
    /// Create a generator; `None` seeds from system entropy.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }

    fn hex(&mut self, count: usize) -> String {
        (0..count)
            .map(|_| char::from(HEX[self.rng.gen_range(0..HEX.len())]))
            .collect()
    }

    // Numbers

    /// Random integer in `min..=max` (bounds are swapped if reversed)
    pub fn number_between(&mut self, min: i64, max: i64) -> i64 {
        let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
        self.rng.gen_range(lo..=hi)
    }

    /// Random float in `min..=max` rounded to `decimals` places
    pub fn random_float(&mut self, decimals: u32, min: f64, max: f64) -> f64 {
        let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
        let value = if lo == hi { lo } else { self.rng.gen_range(lo..=hi) };
        let factor = 10f64.powi(decimals as i32);
        (value * factor).round() / factor
    }

    /// `true` with the given percentage chance
    pub fn boolean(&mut self, chance_of_true: u8) -> bool {
        boolean::Boolean(chance_of_true.min(100)).fake_with_rng(&mut self.rng)
    }

    pub fn random_element(&mut self, items: &[&'static str]) -> &'static str {
        items.choose(&mut self.rng).copied().unwrap_or_default()
    }

    // Text

    pub fn word(&mut self) -> String {
        lorem::Word().fake_with_rng(&mut self.rng)
    }

    /// A sentence of roughly `words` words
    pub fn sentence(&mut self, words: usize) -> String {
        let words = words.max(1);
        lorem::Sentence(words..words + 1).fake_with_rng(&mut self.rng)
    }

    pub fn paragraph(&mut self, sentences: usize) -> String {
        let sentences = sentences.max(1);
        lorem::Paragraph(sentences..sentences + 1).fake_with_rng(&mut self.rng)
    }

    pub fn paragraphs(&mut self, count: usize) -> String {
        let count = count.max(1);
        let paragraphs: Vec<String> = lorem::Paragraphs(count..count + 1).fake_with_rng(&mut self.rng);
        paragraphs.join("\n\n")
    }

    /// Text of at most `max_chars` characters made of whole sentences
    pub fn text(&mut self, max_chars: usize) -> String {
        let mut text = String::new();
        loop {
            let sentence: String = lorem::Sentence(4..10).fake_with_rng(&mut self.rng);
            let separator = usize::from(!text.is_empty());
            if text.len() + separator + sentence.len() > max_chars {
                break;
            }
            if separator == 1 {
                text.push(' ');
            }
            text.push_str(&sentence);
        }
        if text.is_empty() {
            text = self.word();
        }
        text
    }

    pub fn slug(&mut self, words: usize) -> String {
        let words = words.max(1);
        let words: Vec<String> = lorem::Words(words..words + 1).fake_with_rng(&mut self.rng);
        words.join("-").to_lowercase()
    }

    // Identity

    pub fn uuid(&mut self) -> String {
        let uuid: uuid::Uuid = UUIDv4.fake_with_rng(&mut self.rng);
        uuid.to_string()
    }

    pub fn first_name(&mut self) -> String {
        name::FirstName().fake_with_rng(&mut self.rng)
    }

    pub fn last_name(&mut self) -> String {
        name::LastName().fake_with_rng(&mut self.rng)
    }

    pub fn name(&mut self) -> String {
        name::Name().fake_with_rng(&mut self.rng)
    }

    pub fn user_name(&mut self) -> String {
        internet::Username().fake_with_rng(&mut self.rng)
    }

    /// Email address on a reserved example domain
    pub fn safe_email(&mut self) -> String {
        internet::SafeEmail().fake_with_rng(&mut self.rng)
    }

    pub fn e164_phone_number(&mut self) -> String {
        let subscriber: String = number::NumberWithFormat("^#########").fake_with_rng(&mut self.rng);
        format!("+1{}", subscriber)
    }

    pub fn phone_number(&mut self) -> String {
        phone::PhoneNumber().fake_with_rng(&mut self.rng)
    }

    /// Placeholder image URL, the way Laravel factories render `imageUrl()`
    pub fn image_url(&mut self, width: u32, height: u32, category: Option<&str>) -> String {
        let color = self.hex(6);
        match category {
            Some(category) => format!(
                "https://via.placeholder.com/{}x{}.png/{}?text={}",
                width, height, color, category
            ),
            None => format!("https://via.placeholder.com/{}x{}.png/{}", width, height, color),
        }
    }

    // Dates

    fn datetime(&mut self) -> DateTime<Utc> {
        let end = DateTime::from_timestamp(MAX_TIMESTAMP, 0).unwrap_or_default();
        dates::DateTimeBetween(DateTime::<Utc>::UNIX_EPOCH, end).fake_with_rng(&mut self.rng)
    }

    /// `YYYY-MM-DD`
    pub fn date(&mut self) -> String {
        self.datetime().format("%Y-%m-%d").to_string()
    }

    /// `HH:MM:SS`
    pub fn time(&mut self) -> String {
        self.datetime().format("%H:%M:%S").to_string()
    }

    /// RFC 3339 date-time in UTC
    pub fn iso8601(&mut self) -> String {
        self.datetime().to_rfc3339_opts(chrono::SecondsFormat::Secs, false)
    }

    pub fn unix_time(&mut self) -> i64 {
        self.datetime().timestamp()
    }

    pub fn year(&mut self) -> i64 {
        self.number_between(1970, 2025)
    }

    pub fn month_name(&mut self) -> String {
        self.datetime().format("%B").to_string()
    }

    // Places

    pub fn street_name(&mut self) -> String {
        address::StreetName().fake_with_rng(&mut self.rng)
    }

    pub fn street_address(&mut self) -> String {
        let building: String = address::BuildingNumber().fake_with_rng(&mut self.rng);
        format!("{} {}", building, self.street_name())
    }

    pub fn city(&mut self) -> String {
        address::CityName().fake_with_rng(&mut self.rng)
    }

    pub fn country_code(&mut self) -> String {
        address::CountryCode().fake_with_rng(&mut self.rng)
    }

    pub fn postcode(&mut self) -> String {
        address::ZipCode().fake_with_rng(&mut self.rng)
    }

    pub fn latitude(&mut self) -> f64 {
        self.random_float(6, -90.0, 90.0)
    }

    pub fn longitude(&mut self) -> f64 {
        self.random_float(6, -180.0, 180.0)
    }

    pub fn timezone(&mut self) -> String {
        address::TimeZone().fake_with_rng(&mut self.rng)
    }

    // Internet

    pub fn domain_name(&mut self) -> String {
        let suffix: String = internet::DomainSuffix().fake_with_rng(&mut self.rng);
        format!("{}.{}", self.word().to_lowercase(), suffix)
    }

    pub fn url(&mut self) -> String {
        format!("https://www.{}/{}", self.domain_name(), self.slug(2))
    }

    pub fn ipv4(&mut self) -> String {
        internet::IPv4().fake_with_rng(&mut self.rng)
    }

    pub fn ipv6(&mut self) -> String {
        internet::IPv6().fake_with_rng(&mut self.rng)
    }

    pub fn mac_address(&mut self) -> String {
        internet::MACAddress().fake_with_rng(&mut self.rng)
    }

    pub fn user_agent(&mut self) -> String {
        internet::UserAgent().fake_with_rng(&mut self.rng)
    }

    // Finance

    pub fn currency_code(&mut self) -> String {
        currency::CurrencyCode().fake_with_rng(&mut self.rng)
    }

    pub fn credit_card_number(&mut self) -> String {
        creditcard::CreditCardNumber().fake_with_rng(&mut self.rng)
    }

    pub fn iban(&mut self, country: &str) -> String {
        let bank = self.bothify("????").to_uppercase();
        let account: String = number::NumberWithFormat("################").fake_with_rng(&mut self.rng);
        format!("{}{}{}{}", country, &account[..2], bank, &account[2..])
    }

    pub fn swift_bic_number(&mut self) -> String {
        finance::Bic().fake_with_rng(&mut self.rng)
    }

    // Files

    pub fn file_extension(&mut self) -> String {
        filesystem::FileExtension().fake_with_rng(&mut self.rng)
    }

    pub fn mime_type(&mut self) -> String {
        filesystem::MimeType().fake_with_rng(&mut self.rng)
    }

    pub fn file_path(&mut self) -> String {
        filesystem::FilePath().fake_with_rng(&mut self.rng)
    }

    // Business

    pub fn company(&mut self) -> String {
        company::CompanyName().fake_with_rng(&mut self.rng)
    }

    pub fn industry(&mut self) -> String {
        company::Industry().fake_with_rng(&mut self.rng)
    }

    pub fn job_title(&mut self) -> String {
        job::Title().fake_with_rng(&mut self.rng)
    }

    // Technical

    pub fn sha1(&mut self) -> String {
        self.hex(40)
    }

    pub fn sha256(&mut self) -> String {
        self.hex(64)
    }

    /// Replace `?` with random lowercase letters and `#` with random digits
    pub fn bothify(&mut self, pattern: &str) -> String {
        pattern
            .chars()
            .map(|c| match c {
                '?' => char::from(self.rng.gen_range(b'a'..=b'z')),
                '#' => char::from(self.rng.gen_range(b'0'..=b'9')),
                other => other,
            })
            .collect()
    }

    pub fn isbn13(&mut self) -> String {
        barcode::Isbn13().fake_with_rng(&mut self.rng)
    }

    pub fn semver(&mut self) -> String {
        filesystem::Semver().fake_with_rng(&mut self.rng)
    }

    pub fn hex_color(&mut self) -> String {
        format!("#{}", self.hex(6))
    }

    pub fn rgb_color_as_array(&mut self) -> Vec<u8> {
        (0..3).map(|_| self.rng.gen()).collect()
    }
}
