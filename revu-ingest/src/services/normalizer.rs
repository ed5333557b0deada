//! Normalizer adapters: raw upstream JSON → canonical review drafts
//!
//! Upstream payloads are semi-structured and field names drift between
//! providers and response versions. Each logical field is therefore read
//! through an ordered list of named [`FieldRule`]s; the first rule that
//! yields a valid, typed value wins and absence falls back to an explicit
//! default.
//!
//! A payload without a recognizable review list is a [`ParseOutcome`], not an
//! error.

use crate::models::{clamp_rating, CanonicalReviewDraft, ProductRef, NEUTRAL_RATING};
use rand::Rng;
use serde_json::Value;

/// Reviews kept from one marketplace response
pub const MARKETPLACE_REVIEW_LIMIT: usize = 5;
/// Upper bound on drafts synthesized per catalog product
pub const MAX_DRAFTS_PER_PRODUCT: usize = 2;

const DEFAULT_COMMENT: &str = "Great product!";
const DEFAULT_PRODUCT_TITLE: &str = "this product";

/// A named JSON path checked for one logical field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule {
    pub name: &'static str,
    pub path: &'static [&'static str],
}

const fn rule(name: &'static str, path: &'static [&'static str]) -> FieldRule {
    FieldRule { name, path }
}

pub const MARKETPLACE_LIST_RULES: &[FieldRule] = &[
    rule("data.reviews", &["data", "reviews"]),
    rule("reviews", &["reviews"]),
    rule("data.data.reviews", &["data", "data", "reviews"]),
];

pub const REVIEWER_NAME_RULES: &[FieldRule] = &[
    rule("reviewer.name", &["reviewer", "name"]),
    rule("reviewer_name", &["reviewer_name"]),
    rule("name", &["name"]),
    rule("review_author", &["review_author"]),
];

pub const RATING_RULES: &[FieldRule] = &[
    rule("rating", &["rating"]),
    rule("star_rating", &["star_rating"]),
    rule("stars", &["stars"]),
    rule("review_star_rating", &["review_star_rating"]),
];

pub const COMMENT_RULES: &[FieldRule] = &[
    rule("review_comment", &["review_comment"]),
    rule("review_title", &["review_title"]),
    rule("title", &["title"]),
    rule("comment", &["comment"]),
];

pub const CATALOG_LIST_RULES: &[FieldRule] = &[
    rule("<root>", &[]),
    rule("products", &["products"]),
];

pub const PRODUCT_TITLE_RULES: &[FieldRule] = &[
    rule("title", &["title"]),
    rule("name", &["name"]),
];

pub const AGGREGATE_RATING_RULES: &[FieldRule] = &[
    rule("rating.rate", &["rating", "rate"]),
    rule("rating", &["rating"]),
];

/// Comment templates per rating band; `{title}` is replaced by the product title
const COMMENT_TEMPLATES: [[&str; 3]; 5] = [
    [
        "Poor quality. Would not recommend {title}.",
        "Very disappointed with this purchase.",
        "Not worth the money.",
    ],
    [
        "Not impressed with {title}. Quality could be better.",
        "Disappointed with the product.",
        "Below expectations.",
    ],
    [
        "Decent product. {title} is okay but could be better.",
        "Average quality, nothing special.",
        "It's fine, but expected more.",
    ],
    [
        "Very good product. {title} is worth the price.",
        "Great quality, would buy again.",
        "Good value for money.",
    ],
    [
        "Excellent product! Highly recommend {title}.",
        "Amazing quality! {title} exceeded my expectations.",
        "Perfect! Best purchase I've made.",
    ],
];

/// Result of running an adapter over one payload
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    /// A review list was found (it may still be empty)
    Parsed {
        drafts: Vec<CanonicalReviewDraft>,
        matched_rule: &'static str,
    },
    /// No rule matched a list; top-level keys kept for diagnostics
    NoReviewList { seen_keys: Vec<String> },
}

impl ParseOutcome {
    pub fn into_drafts(self) -> Vec<CanonicalReviewDraft> {
        match self {
            ParseOutcome::Parsed { drafts, .. } => drafts,
            ParseOutcome::NoReviewList { .. } => Vec::new(),
        }
    }

    pub fn draft_count(&self) -> usize {
        match self {
            ParseOutcome::Parsed { drafts, .. } => drafts.len(),
            ParseOutcome::NoReviewList { .. } => 0,
        }
    }
}

/// Follow `path` through nested objects
fn lookup<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(value, |current, key| current.get(*key))
}

/// First rule whose value is a non-blank string (numbers are stringified)
pub fn first_text(value: &Value, rules: &[FieldRule]) -> Option<String> {
    rules.iter().find_map(|r| match lookup(value, r.path)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// First rule whose value parses as a rating
pub fn first_number(value: &Value, rules: &[FieldRule]) -> Option<f64> {
    rules
        .iter()
        .find_map(|r| lookup(value, r.path).and_then(parse_rating_value))
}

/// First rule whose value is an array
pub fn first_array<'a>(value: &'a Value, rules: &[FieldRule]) -> Option<(&'static str, &'a Vec<Value>)> {
    rules
        .iter()
        .find_map(|r| lookup(value, r.path)?.as_array().map(|list| (r.name, list)))
}

/// Numbers pass through; strings contribute their leading numeric prefix
/// (`"4.0 out of 5 stars"` → 4.0)
pub fn parse_rating_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite()),
        Value::String(s) => parse_numeric_prefix(s),
        _ => None,
    }
}

/// Leading `[+-]digits[.digits]` of a string, ignoring surrounding whitespace
pub fn parse_numeric_prefix(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    let mut end = 0;
    let mut seen_digit = false;
    let mut seen_dot = false;

    for (idx, ch) in trimmed.char_indices() {
        match ch {
            '+' | '-' if idx == 0 => {}
            '0'..='9' => seen_digit = true,
            '.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end = idx + ch.len_utf8();
    }

    if !seen_digit {
        return None;
    }
    trimmed[..end]
        .trim_end_matches('.')
        .parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
}

/// Rating → template band index (1..=5 → 0..=4)
fn band(rating: u8) -> usize {
    (rating.clamp(1, 5) - 1) as usize
}

/// Reviews synthesized for one catalog product: `min(2, ceil(rating / 2.5))`
pub fn drafts_for_rating(rating: u8) -> usize {
    ((rating as f64) / 2.5).ceil().min(MAX_DRAFTS_PER_PRODUCT as f64) as usize
}

/// Pick a comment from the rating band's template pool
pub fn template_comment<R: Rng>(rating: u8, title: &str, rng: &mut R) -> String {
    let pool = &COMMENT_TEMPLATES[band(rating)];
    pool[rng.gen_range(0..pool.len())].replace("{title}", title)
}

/// Marketplace adapter
///
/// Finds the review list, keeps the first [`MARKETPLACE_REVIEW_LIMIT`]
/// entries, drops any that are not objects and maps the rest through the
/// field rules. Drafts come back
/// unresolved; the strategy attaches the catalog product.
pub fn normalize_marketplace_payload<R: Rng>(payload: &Value, rng: &mut R) -> ParseOutcome {
    let Some((matched_rule, reviews)) = first_array(payload, MARKETPLACE_LIST_RULES) else {
        return ParseOutcome::NoReviewList {
            seen_keys: top_level_keys(payload),
        };
    };

    let drafts = reviews
        .iter()
        .take(MARKETPLACE_REVIEW_LIMIT)
        .filter(|r| r.is_object())
        .map(|review| {
            let reviewer = first_text(review, REVIEWER_NAME_RULES)
                .unwrap_or_else(|| format!("Amazon User {}", rng.gen_range(1000..10000)));
            let rating = first_number(review, RATING_RULES)
                .map(clamp_rating)
                .unwrap_or(NEUTRAL_RATING);
            let comment =
                first_text(review, COMMENT_RULES).unwrap_or_else(|| DEFAULT_COMMENT.to_string());

            CanonicalReviewDraft::new(ProductRef::Unresolved, reviewer, rating as i64, comment)
        })
        .collect::<Vec<_>>();

    tracing::debug!(
        matched_rule,
        available = reviews.len(),
        kept = drafts.len(),
        "Parsed marketplace review list"
    );

    ParseOutcome::Parsed {
        drafts,
        matched_rule,
    }
}

/// Catalog-derived adapter
///
/// Each product with a positive aggregate rating yields
/// [`drafts_for_rating`] drafts whose rating is the rounded aggregate and
/// whose comment comes from the band's template pool.
pub fn normalize_catalog_products<R: Rng>(payload: &Value, rng: &mut R) -> ParseOutcome {
    let Some((matched_rule, products)) = first_array(payload, CATALOG_LIST_RULES) else {
        return ParseOutcome::NoReviewList {
            seen_keys: top_level_keys(payload),
        };
    };

    let mut drafts = Vec::new();
    for product in products {
        let Some(aggregate) = first_number(product, AGGREGATE_RATING_RULES).filter(|r| *r > 0.0)
        else {
            continue;
        };

        let rating = clamp_rating(aggregate);
        let title = first_text(product, PRODUCT_TITLE_RULES)
            .unwrap_or_else(|| DEFAULT_PRODUCT_TITLE.to_string());

        for _ in 0..drafts_for_rating(rating) {
            let reviewer = format!("FakeStore User {}", rng.gen_range(0..1000));
            let comment = template_comment(rating, &title, rng);
            drafts.push(CanonicalReviewDraft::new(
                ProductRef::Unresolved,
                reviewer,
                rating as i64,
                comment,
            ));
        }
    }

    ParseOutcome::Parsed {
        drafts,
        matched_rule,
    }
}

fn top_level_keys(payload: &Value) -> Vec<String> {
    payload
        .as_object()
        .map(|o| o.keys().cloned().collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MAX_COMMENT_CHARS;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn test_numeric_prefix() {
        assert_eq!(parse_numeric_prefix("4.0 out of 5 stars"), Some(4.0));
        assert_eq!(parse_numeric_prefix(" 3 "), Some(3.0));
        assert_eq!(parse_numeric_prefix("-2"), Some(-2.0));
        assert_eq!(parse_numeric_prefix("5."), Some(5.0));
        assert_eq!(parse_numeric_prefix("five"), None);
        assert_eq!(parse_numeric_prefix(""), None);
        assert_eq!(parse_numeric_prefix("."), None);
    }

    #[test]
    fn test_rating_clamping_is_total_over_inputs() {
        let inputs = vec![
            json!(0),
            json!(-7),
            json!(3.49),
            json!(99),
            json!("4.5 stars"),
            json!("abc"),
            json!(null),
            json!(true),
            json!({"nested": 1}),
            json!("1e400"),
        ];
        for input in inputs {
            let payload = json!({ "reviews": [{ "rating": input }] });
            let drafts = normalize_marketplace_payload(&payload, &mut rng()).into_drafts();
            assert_eq!(drafts.len(), 1);
            assert!((1..=5).contains(&drafts[0].rating), "{:?}", drafts[0]);
        }
    }

    #[test]
    fn test_list_rules_in_priority_order() {
        let payload = json!({
            "reviews": [{"comment": "top-level"}],
            "data": { "reviews": [{"comment": "nested"}] }
        });
        match normalize_marketplace_payload(&payload, &mut rng()) {
            ParseOutcome::Parsed { drafts, matched_rule } => {
                assert_eq!(matched_rule, "data.reviews");
                assert_eq!(drafts[0].comment, "nested");
            }
            other => panic!("unexpected {:?}", other),
        }

        let deep = json!({ "data": { "data": { "reviews": [{}] } } });
        match normalize_marketplace_payload(&deep, &mut rng()) {
            ParseOutcome::Parsed { matched_rule, .. } => assert_eq!(matched_rule, "data.data.reviews"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_field_rules_fall_through() {
        let payload = json!({ "data": { "reviews": [{
            "reviewer": { "name": "   " },
            "reviewer_name": "Dana",
            "rating": "n/a",
            "star_rating": 2,
            "review_comment": "",
            "review_title": "Solid"
        }]}});
        let drafts = normalize_marketplace_payload(&payload, &mut rng()).into_drafts();
        assert_eq!(drafts[0].reviewer_name, "Dana");
        assert_eq!(drafts[0].rating, 2);
        assert_eq!(drafts[0].comment, "Solid");
        assert_eq!(drafts[0].product_ref, ProductRef::Unresolved);
    }

    #[test]
    fn test_marketplace_defaults() {
        let payload = json!({ "reviews": [{}] });
        let drafts = normalize_marketplace_payload(&payload, &mut rng()).into_drafts();
        assert!(drafts[0].reviewer_name.starts_with("Amazon User "));
        assert_eq!(drafts[0].rating, NEUTRAL_RATING);
        assert_eq!(drafts[0].comment, "Great product!");
    }

    #[test]
    fn test_marketplace_keeps_first_five_and_truncates() {
        let reviews: Vec<Value> = (0..8)
            .map(|i| json!({ "name": format!("r{}", i), "rating": 4, "comment": "c".repeat(900) }))
            .collect();
        let payload = json!({ "data": { "reviews": reviews } });
        let drafts = normalize_marketplace_payload(&payload, &mut rng()).into_drafts();
        assert_eq!(drafts.len(), MARKETPLACE_REVIEW_LIMIT);
        assert_eq!(drafts[4].reviewer_name, "r4");
        assert!(drafts.iter().all(|d| d.comment.chars().count() == MAX_COMMENT_CHARS));
    }

    #[test]
    fn test_non_object_entries_count_toward_limit() {
        let payload = json!({ "reviews": [
            { "name": "r0" }, null, "junk", { "name": "r3" }, 7,
            { "name": "r5" }, { "name": "r6" }
        ]});
        let drafts = normalize_marketplace_payload(&payload, &mut rng()).into_drafts();
        let names: Vec<&str> = drafts.iter().map(|d| d.reviewer_name.as_str()).collect();
        assert_eq!(names, vec!["r0", "r3"]);
    }

    #[test]
    fn test_no_review_list_is_outcome() {
        let payload = json!({ "status": "OK", "data": { "items": [] } });
        match normalize_marketplace_payload(&payload, &mut rng()) {
            ParseOutcome::NoReviewList { seen_keys } => {
                assert!(seen_keys.contains(&"status".to_string()));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(normalize_marketplace_payload(&json!("oops"), &mut rng()).draft_count(), 0);
    }

    #[test]
    fn test_drafts_for_rating() {
        assert_eq!(drafts_for_rating(5), 2);
        assert_eq!(drafts_for_rating(4), 2);
        assert_eq!(drafts_for_rating(3), 2);
        assert_eq!(drafts_for_rating(2), 1);
        assert_eq!(drafts_for_rating(1), 1);
    }

    #[test]
    fn test_catalog_counts_follow_rating() {
        let payload = json!([
            { "title": "A", "rating": { "rate": 5, "count": 10 } },
            { "title": "B", "rating": { "rate": 4, "count": 10 } },
            { "title": "C", "rating": { "rate": 3, "count": 10 } },
            { "title": "D", "rating": { "rate": 4.6, "count": 10 } },
            { "title": "E", "rating": { "rate": 2, "count": 10 } },
        ]);
        let drafts = normalize_catalog_products(&payload, &mut rng()).into_drafts();
        let ratings: Vec<u8> = drafts.iter().map(|d| d.rating).collect();
        assert_eq!(ratings, vec![5, 5, 4, 4, 3, 3, 5, 5, 2]);
        assert!(drafts.iter().all(|d| d.reviewer_name.starts_with("FakeStore User ")));
    }

    #[test]
    fn test_catalog_skips_unrated_products() {
        let payload = json!({ "products": [
            { "title": "No rating" },
            { "title": "Zero", "rating": { "rate": 0 } },
            { "name": "Flat", "rating": 1.2 },
        ]});
        let drafts = normalize_catalog_products(&payload, &mut rng()).into_drafts();
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].rating, 1);
    }

    #[test]
    fn test_template_comment_mentions_band() {
        let mut r = rng();
        for _ in 0..20 {
            let comment = template_comment(5, "Widget", &mut r);
            assert!(COMMENT_TEMPLATES[4]
                .iter()
                .any(|t| t.replace("{title}", "Widget") == comment));
        }
    }

    #[test]
    fn test_same_seed_same_drafts() {
        let payload = json!([{ "title": "A", "rating": { "rate": 3.9 } }]);
        let a = normalize_catalog_products(&payload, &mut StdRng::seed_from_u64(11));
        let b = normalize_catalog_products(&payload, &mut StdRng::seed_from_u64(11));
        assert_eq!(a, b);
    }
}
