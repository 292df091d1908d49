//! Column-name heuristics.
//!
//! Names are split into lower-case tokens on `_`, `-`, spaces and camelCase
//! boundaries, so `account_id` never matches `count` and `page` never
//! matches `age`. Rules are tried in order; the first match wins.

use fake::Fake;
use fake::faker::address::en::{CityName, CountryName, StateAbbr, StreetName, ZipCode};
use fake::faker::company::en::CompanyName;
use fake::faker::internet::en::{DomainSuffix, SafeEmail, Username};
use fake::faker::job::en::Title;
use fake::faker::lorem::en::{Sentence, Word};
use fake::faker::name::en::{FirstName, LastName, Name};
use fake::faker::phone_number::en::PhoneNumber;
use rand::seq::IndexedRandom;
use rand::{Rng, RngCore};
use serde_json::json;

type Predicate = fn(&NameTokens) -> bool;
type TextGenerator = fn(&mut dyn RngCore) -> String;

const TEXT_RULES: &[(Predicate, TextGenerator)] = &[
    (is_email, email),
    (is_phone, phone),
    (is_first_name, first_name),
    (is_last_name, last_name),
    (is_username, username),
    (is_address, address),
    (is_city, city),
    (is_country, country),
    (is_company, company),
    (is_job_title, job_title),
    (is_description, description),
    (is_url, url),
    (is_full_name, full_name),
];

const INTEGER_RULES: &[(Predicate, (i64, i64))] = &[
    (is_age, (18, 98)),
    (is_year, (1995, 2025)),
    (is_money, (1, 10_000)),
    (is_quantity, (1, 1_000)),
];

const THEMES: &[&str] = &["light", "dark", "system"];
const LANGUAGES: &[&str] = &["en", "es", "fr", "de", "pt", "ja"];
const AUTHORS: &[&str] = &["system", "admin", "import", "api"];

/// Semantic text for a column name, when a rule matches.
pub fn text(column: &str, rng: &mut dyn RngCore) -> Option<String> {
    let tokens = NameTokens::new(column);
    TEXT_RULES
        .iter()
        .find(|(matches, _)| matches(&tokens))
        .map(|(_, generate)| generate(rng))
}

/// Name-derived default range for integer columns.
pub fn integer_range(column: &str) -> Option<(i64, i64)> {
    let tokens = NameTokens::new(column);
    INTEGER_RULES
        .iter()
        .find(|(matches, _)| matches(&tokens))
        .map(|(_, range)| *range)
}

/// JSON object text shaped after the column name.
pub fn json_document(column: &str, rng: &mut dyn RngCore) -> String {
    let tokens = NameTokens::new(column);
    let document = if tokens.any(&["config", "configuration", "settings", "preferences", "prefs"])
    {
        json!({
            "theme": pick(THEMES, rng),
            "notifications": rng.random_bool(0.5),
            "language": pick(LANGUAGES, rng),
        })
    } else if tokens.any(&["metadata", "meta"]) {
        let tags: Vec<String> = (0..rng.random_range(1..=3))
            .map(|_| Word().fake_with_rng(rng))
            .collect();
        json!({
            "created_by": pick(AUTHORS, rng),
            "version": rng.random_range(1..=10),
            "tags": tags,
        })
    } else {
        let data: String = Sentence(2..5).fake_with_rng(rng);
        json!({ "data": data })
    };
    document.to_string()
}

/// Lower-case word tokens of a column name plus their concatenation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameTokens {
    tokens: Vec<String>,
    compact: String,
}

impl NameTokens {
    pub fn new(name: &str) -> Self {
        let mut tokens = Vec::new();
        let mut current = String::new();
        let mut prev_lower = false;

        for ch in name.chars() {
            if !ch.is_alphanumeric() {
                flush(&mut tokens, &mut current);
                prev_lower = false;
                continue;
            }
            if ch.is_uppercase() && prev_lower {
                flush(&mut tokens, &mut current);
            }
            prev_lower = ch.is_lowercase() || ch.is_ascii_digit();
            current.extend(ch.to_lowercase());
        }
        flush(&mut tokens, &mut current);

        let compact = tokens.concat();
        Self { tokens, compact }
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    fn has(&self, token: &str) -> bool {
        self.tokens.iter().any(|candidate| candidate == token)
    }

    fn any(&self, tokens: &[&str]) -> bool {
        tokens.iter().any(|token| self.has(token))
    }

    fn compact_contains(&self, needle: &str) -> bool {
        self.compact.contains(needle)
    }
}

fn flush(tokens: &mut Vec<String>, current: &mut String) {
    if !current.is_empty() {
        tokens.push(std::mem::take(current));
    }
}

fn is_email(name: &NameTokens) -> bool {
    name.any(&["email", "mail"]) || name.compact_contains("email")
}

fn is_phone(name: &NameTokens) -> bool {
    name.any(&["phone", "mobile", "tel", "telephone", "cell", "fax"])
        || name.compact_contains("phone")
}

fn is_first_name(name: &NameTokens) -> bool {
    name.any(&["fname", "forename", "firstname"])
        || name.compact_contains("firstname")
        || name.compact_contains("givenname")
}

fn is_last_name(name: &NameTokens) -> bool {
    name.any(&["lname", "surname", "lastname"])
        || name.compact_contains("lastname")
        || name.compact_contains("familyname")
}

fn is_username(name: &NameTokens) -> bool {
    name.any(&["username", "login", "handle", "nickname"]) || name.compact_contains("username")
}

fn is_address(name: &NameTokens) -> bool {
    name.any(&["address", "addr", "street"])
}

fn is_city(name: &NameTokens) -> bool {
    name.any(&["city", "town"])
}

fn is_country(name: &NameTokens) -> bool {
    name.has("country")
}

fn is_company(name: &NameTokens) -> bool {
    name.any(&["company", "organization", "organisation", "employer", "business"])
}

fn is_job_title(name: &NameTokens) -> bool {
    name.any(&["title", "position", "job", "occupation"])
}

fn is_description(name: &NameTokens) -> bool {
    name.any(&[
        "description",
        "desc",
        "bio",
        "summary",
        "notes",
        "note",
        "comment",
        "comments",
        "content",
        "body",
        "about",
    ])
}

fn is_url(name: &NameTokens) -> bool {
    name.any(&["url", "website", "homepage", "link", "site", "uri"])
}

fn is_full_name(name: &NameTokens) -> bool {
    name.any(&["name", "fullname"]) || name.compact_contains("fullname")
}

fn is_age(name: &NameTokens) -> bool {
    name.has("age")
}

fn is_year(name: &NameTokens) -> bool {
    name.any(&["year", "yr"])
}

fn is_money(name: &NameTokens) -> bool {
    name.any(&["price", "amount", "cost", "total"])
}

fn is_quantity(name: &NameTokens) -> bool {
    name.any(&["quantity", "count", "qty", "stock"])
}

fn email(rng: &mut dyn RngCore) -> String {
    SafeEmail().fake_with_rng(rng)
}

fn phone(rng: &mut dyn RngCore) -> String {
    PhoneNumber().fake_with_rng(rng)
}

fn first_name(rng: &mut dyn RngCore) -> String {
    FirstName().fake_with_rng(rng)
}

fn last_name(rng: &mut dyn RngCore) -> String {
    LastName().fake_with_rng(rng)
}

fn username(rng: &mut dyn RngCore) -> String {
    Username().fake_with_rng(rng)
}

fn full_name(rng: &mut dyn RngCore) -> String {
    Name().fake_with_rng(rng)
}

fn address(rng: &mut dyn RngCore) -> String {
    let number = rng.random_range(1..=9999);
    let street: String = StreetName().fake_with_rng(rng);
    let city: String = CityName().fake_with_rng(rng);
    let state: String = StateAbbr().fake_with_rng(rng);
    let zip: String = ZipCode().fake_with_rng(rng);
    format!("{number} {street}, {city}, {state} {zip}")
}

fn city(rng: &mut dyn RngCore) -> String {
    CityName().fake_with_rng(rng)
}

fn country(rng: &mut dyn RngCore) -> String {
    CountryName().fake_with_rng(rng)
}

fn company(rng: &mut dyn RngCore) -> String {
    CompanyName().fake_with_rng(rng)
}

fn job_title(rng: &mut dyn RngCore) -> String {
    Title().fake_with_rng(rng)
}

fn description(rng: &mut dyn RngCore) -> String {
    Sentence(6..14).fake_with_rng(rng)
}

fn url(rng: &mut dyn RngCore) -> String {
    let word: String = Word().fake_with_rng(rng);
    let suffix: String = DomainSuffix().fake_with_rng(rng);
    format!("https://www.{}.{suffix}", word.to_lowercase())
}

fn pick(values: &[&'static str], rng: &mut dyn RngCore) -> &'static str {
    values.choose(rng).copied().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    fn tokens(name: &str) -> Vec<String> {
        NameTokens::new(name).tokens().to_vec()
    }

    #[test]
    fn splits_snake_and_camel_case() {
        assert_eq!(tokens("first_name"), vec!["first", "name"]);
        assert_eq!(tokens("createdAt"), vec!["created", "at"]);
        assert_eq!(tokens("HTTPStatus"), vec!["httpstatus"]);
        assert_eq!(tokens("address-line 2"), vec!["address", "line", "2"]);
    }

    #[test]
    fn integer_rules_match_whole_words() {
        assert_eq!(integer_range("age"), Some((18, 98)));
        assert_eq!(integer_range("customer_age"), Some((18, 98)));
        assert_eq!(integer_range("page"), None);
        assert_eq!(integer_range("account_id"), None);
        assert_eq!(integer_range("item_count"), Some((1, 1_000)));
        assert_eq!(integer_range("birthYear"), Some((1995, 2025)));
        assert_eq!(integer_range("total_amount"), Some((1, 10_000)));
    }

    #[test]
    fn text_rules_follow_priority() {
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        let email = text("contact_email", &mut rng).expect("email");
        assert!(email.contains('@'));

        let url = text("website", &mut rng).expect("url");
        assert!(url.starts_with("https://www."));

        assert!(text("company_name", &mut rng).is_some());
        assert!(text("sku", &mut rng).is_none());
        assert!(text("status", &mut rng).is_none());
    }

    #[test]
    fn first_and_last_name_beat_full_name() {
        let first = NameTokens::new("firstName");
        assert!(is_first_name(&first));
        let last = NameTokens::new("last_name");
        assert!(is_last_name(&last));
        assert!(is_full_name(&NameTokens::new("display_name")));
        assert!(!is_full_name(&NameTokens::new("renamed")));
    }

    #[test]
    fn json_shapes_follow_column_name() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);

        let settings: serde_json::Value =
            serde_json::from_str(&json_document("user_settings", &mut rng)).expect("json");
        assert!(settings.get("theme").is_some());
        assert!(settings.get("notifications").is_some_and(|v| v.is_boolean()));
        assert!(settings.get("language").is_some());

        let meta: serde_json::Value =
            serde_json::from_str(&json_document("metadata", &mut rng)).expect("json");
        assert!(meta.get("created_by").is_some());
        assert!(meta.get("version").is_some_and(|v| v.is_u64()));
        assert!(meta.get("tags").is_some_and(|v| v.is_array()));

        let other: serde_json::Value =
            serde_json::from_str(&json_document("payload", &mut rng)).expect("json");
        assert!(other.get("data").is_some_and(|v| v.is_string()));
    }
}
