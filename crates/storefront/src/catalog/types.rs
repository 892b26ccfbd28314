//! Wire types for the catalog API.
//!
//! Every field the API may omit (or send with the wrong type) is optional
//! here; defaults are applied when converting into domain models, see
//! [`super::conversions`].

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use kv_market_core::Price;

/// An id that the API may send either as a number or as a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IdValue {
    Int(i64),
    Text(String),
}

impl IdValue {
    /// Wrap a domain id, sending it as a number when it looks like one.
    #[must_use]
    pub fn from_id(id: &str) -> Self {
        id.parse().map_or_else(|_| Self::Text(id.to_owned()), Self::Int)
    }

    /// Non-empty string form of the id.
    #[must_use]
    pub fn into_string(self) -> Option<String> {
        let s = match self {
            Self::Int(n) => n.to_string(),
            Self::Text(s) => s.trim().to_owned(),
        };
        (!s.is_empty()).then_some(s)
    }
}

impl std::fmt::Display for IdValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Accept numbers, numeric strings or garbage; garbage and negatives become `None`.
fn lenient_price<'de, D>(deserializer: D) -> Result<Option<Price>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n
            .as_i64()
            .map(Decimal::from)
            .or_else(|| n.as_f64().and_then(|f| Decimal::try_from(f).ok()))
            .and_then(|d| Price::new(d).ok()),
        Some(serde_json::Value::String(s)) => Price::parse(&s).ok(),
        _ => None,
    })
}

/// Accept an integer rating sent as a number or a string.
#[allow(clippy::cast_possible_truncation)]
fn lenient_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.round() as i64)),
        Some(serde_json::Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

const fn default_true() -> bool {
    true
}

// =============================================================================
// Responses
// =============================================================================

/// `GET /products/` element.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductDto {
    #[serde(default)]
    pub id: Option<IdValue>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_price")]
    pub price: Option<Price>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// `GET /listings/` element.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListingDto {
    #[serde(default)]
    pub id: Option<IdValue>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_price")]
    pub price: Option<Price>,
    #[serde(default)]
    pub game_topic: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub user_id: Option<IdValue>,
    #[serde(default)]
    pub status: Option<String>,
}

/// `GET /author-listings/` element.
///
/// The API spells the price field `prise`; both spellings are accepted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthorListingDto {
    #[serde(default)]
    pub id: Option<IdValue>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, alias = "prise", deserialize_with = "lenient_price")]
    pub price: Option<Price>,
    #[serde(default)]
    pub topics_games: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub user_id: Option<IdValue>,
    #[serde(default)]
    pub status: Option<String>,
}

/// `GET /reviews/` element.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewDto {
    #[serde(default)]
    pub id: Option<IdValue>,
    #[serde(default)]
    pub user_id: Option<IdValue>,
    #[serde(default)]
    pub products_id: Option<IdValue>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub rating: Option<i64>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

/// `POST /users/` response.
#[derive(Debug, Clone, Deserialize)]
pub struct UserDto {
    #[serde(default)]
    pub id: Option<IdValue>,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// `GET /users/authenticate` response.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponseDto {
    #[serde(default)]
    pub user_id: Option<IdValue>,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    /// Bearer token, when the API issues one.
    #[serde(default)]
    pub access_token: Option<String>,
}

// =============================================================================
// Requests
// =============================================================================

/// `POST /listings/` body.
#[derive(Debug, Clone, Serialize)]
pub struct NewListingBody<'a> {
    pub title: &'a str,
    pub price: Price,
    pub game_topic: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'a str>,
    pub user_id: Option<IdValue>,
    pub status: &'static str,
}

/// `POST /author-listings/` body.
#[derive(Debug, Clone, Serialize)]
pub struct NewAuthorListingBody<'a> {
    pub title: &'a str,
    pub prise: Price,
    pub topics_games: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'a str>,
    pub user_id: Option<IdValue>,
    pub status: &'static str,
}

/// `POST /users/` body.
#[derive(Serialize)]
pub struct NewUserBody<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub role_id: i64,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_product_price_accepts_strings_and_numbers() {
        let products: Vec<ProductDto> = serde_json::from_str(
            r#"[
                {"id": 1, "price": "499.00"},
                {"id": "2", "price": 399},
                {"id": 3, "price": "n/a"},
                {"id": 4, "price": -10},
                {"id": 5}
            ]"#,
        )
        .unwrap();

        assert_eq!(products[0].price, Some(Price::from_rubles(499)));
        assert_eq!(products[1].price, Some(Price::from_rubles(399)));
        assert_eq!(products[2].price, None);
        assert_eq!(products[3].price, None);
        assert_eq!(products[4].price, None);
    }

    #[test]
    fn test_ids_are_stringified() {
        let dto: ProductDto = serde_json::from_str(r#"{"id": 42}"#).unwrap();
        assert_eq!(dto.id.unwrap().into_string().as_deref(), Some("42"));

        let dto: ProductDto = serde_json::from_str(r#"{"id": "  "}"#).unwrap();
        assert_eq!(dto.id.unwrap().into_string(), None);
    }

    #[test]
    fn test_product_ignores_fields_it_does_not_use() {
        let dto: ProductDto = serde_json::from_str(
            r#"{"id": 9, "title": "Hades", "price": 499, "popularity": 87, "rank": "top"}"#,
        )
        .unwrap();
        assert_eq!(dto.title.as_deref(), Some("Hades"));
        assert_eq!(dto.price, Some(Price::from_rubles(499)));
    }

    #[test]
    fn test_author_listing_accepts_prise() {
        let dto: AuthorListingDto =
            serde_json::from_str(r#"{"id": 7, "prise": "249", "topics_games": "CS:GO"}"#).unwrap();
        assert_eq!(dto.price, Some(Price::from_rubles(249)));
        assert_eq!(dto.topics_games.as_deref(), Some("CS:GO"));
    }

    #[test]
    fn test_review_rating_as_string() {
        let dto: ReviewDto = serde_json::from_str(r#"{"id": 1, "rating": "4"}"#).unwrap();
        assert_eq!(dto.rating, Some(4));
    }

    #[test]
    fn test_new_author_listing_uses_api_spelling() {
        let body = NewAuthorListingBody {
            title: "Stories",
            prise: Price::from_rubles(249),
            topics_games: "CS:GO",
            image_url: None,
            description: None,
            user_id: Some(IdValue::from_id("12")),
            status: "active",
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["prise"], 249);
        assert_eq!(json["user_id"], 12);
        assert!(json.get("image_url").is_none());
    }
}
