//! DTO to domain conversions.
//!
//! Defaulting rules for fields the API omits:
//!
//! | Field       | Default                        |
//! |-------------|--------------------------------|
//! | category    | `"other"`                      |
//! | title       | `"Untitled"`                   |
//! | image       | [`PLACEHOLDER_IMAGE`]          |
//! | price       | `0` (also for invalid prices)  |
//! | tag         | the category                   |
//! | description | `"No description"`             |
//!
//! Items without an id cannot be keyed in the cart and are dropped.

use tracing::debug;

use kv_market_core::{ListingId, ListingKind, ListingStatus, Price, ProductId, ReviewId, UserId};

use super::types::{
    AuthResponseDto, AuthorListingDto, IdValue, ListingDto, ProductDto, ReviewDto, UserDto,
};
use crate::models::{Listing, Product, Review, User};

pub const DEFAULT_CATEGORY: &str = "other";
pub const DEFAULT_TITLE: &str = "Untitled";
pub const DEFAULT_DESCRIPTION: &str = "No description";
pub const DEFAULT_REVIEW_TEXT: &str = "No text";
pub const ANONYMOUS: &str = "Anonymous";

/// Inline "No Image" placeholder used when an item has no image URL.
pub const PLACEHOLDER_IMAGE: &str = "data:image/svg+xml;utf8,\
<svg xmlns='http://www.w3.org/2000/svg' width='400' height='200' viewBox='0 0 400 200'>\
<rect width='400' height='200' fill='%232d2d2d'/>\
<text x='200' y='100' font-family='Arial' font-size='20' fill='%23888' text-anchor='middle'>No Image</text>\
</svg>";

/// Trimmed, non-empty string or `None`.
fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
}

fn id_string(id: Option<IdValue>) -> Option<String> {
    id.and_then(IdValue::into_string)
}

fn is_listed(status: Option<&str>) -> bool {
    let Some(status) = status.map(str::trim).filter(|s| !s.is_empty()) else {
        return true;
    };
    let parsed =
        serde_json::from_value::<ListingStatus>(serde_json::Value::String(status.to_lowercase()));
    !matches!(parsed, Ok(ListingStatus::Inactive | ListingStatus::Sold))
}

// =============================================================================
// Products
// =============================================================================

/// Convert one product; `None` for items without an id or marked inactive.
#[must_use]
pub fn convert_product(dto: ProductDto) -> Option<Product> {
    if !dto.is_active {
        return None;
    }
    let id = id_string(dto.id)?;
    let category = non_empty(dto.category).unwrap_or_else(|| DEFAULT_CATEGORY.to_owned());

    Some(Product {
        id: ProductId::new(id),
        title: non_empty(dto.title).unwrap_or_else(|| DEFAULT_TITLE.to_owned()),
        tag: non_empty(dto.tag).unwrap_or_else(|| category.clone()),
        category,
        price: dto.price.unwrap_or(Price::ZERO),
        thumb: non_empty(dto.image_url).unwrap_or_else(|| PLACEHOLDER_IMAGE.to_owned()),
        desc: non_empty(dto.description).unwrap_or_else(|| DEFAULT_DESCRIPTION.to_owned()),
    })
}

#[must_use]
pub fn convert_products(dtos: Vec<ProductDto>) -> Vec<Product> {
    let received = dtos.len();
    let products: Vec<Product> = dtos.into_iter().filter_map(convert_product).collect();
    if products.len() < received {
        debug!(
            received,
            kept = products.len(),
            "Dropped products without id or inactive"
        );
    }
    products
}

// =============================================================================
// Listings
// =============================================================================

fn seller_name(prefix: &str, user_id: Option<IdValue>) -> String {
    id_string(user_id).map_or_else(|| ANONYMOUS.to_owned(), |id| format!("{prefix} {id}"))
}

/// Convert one market listing.
#[must_use]
pub fn convert_listing(dto: ListingDto) -> Option<Listing> {
    if !is_listed(dto.status.as_deref()) {
        return None;
    }
    let id = id_string(dto.id)?;
    let category = non_empty(dto.game_topic).unwrap_or_else(|| DEFAULT_CATEGORY.to_owned());

    Some(Listing {
        id: ListingId::new(id),
        kind: ListingKind::Market,
        title: non_empty(dto.title).unwrap_or_else(|| DEFAULT_TITLE.to_owned()),
        tag: category.clone(),
        category,
        price: dto.price.unwrap_or(Price::ZERO),
        thumb: non_empty(dto.image_url).unwrap_or_else(|| PLACEHOLDER_IMAGE.to_owned()),
        desc: non_empty(dto.description).unwrap_or_else(|| DEFAULT_DESCRIPTION.to_owned()),
        seller: seller_name("Seller", dto.user_id),
    })
}

/// Convert one author listing.
#[must_use]
pub fn convert_author_listing(dto: AuthorListingDto) -> Option<Listing> {
    if !is_listed(dto.status.as_deref()) {
        return None;
    }
    let id = id_string(dto.id)?;
    let category = non_empty(dto.topics_games)
        .or_else(|| non_empty(dto.category))
        .unwrap_or_else(|| DEFAULT_CATEGORY.to_owned());

    Some(Listing {
        id: ListingId::new(id),
        kind: ListingKind::Account,
        title: non_empty(dto.title).unwrap_or_else(|| DEFAULT_TITLE.to_owned()),
        tag: category.clone(),
        category,
        price: dto.price.unwrap_or(Price::ZERO),
        thumb: non_empty(dto.image_url).unwrap_or_else(|| PLACEHOLDER_IMAGE.to_owned()),
        desc: non_empty(dto.description).unwrap_or_else(|| DEFAULT_DESCRIPTION.to_owned()),
        seller: seller_name("Author", dto.user_id),
    })
}

#[must_use]
pub fn convert_listings(dtos: Vec<ListingDto>) -> Vec<Listing> {
    dtos.into_iter().filter_map(convert_listing).collect()
}

#[must_use]
pub fn convert_author_listings(dtos: Vec<AuthorListingDto>) -> Vec<Listing> {
    dtos.into_iter().filter_map(convert_author_listing).collect()
}

// =============================================================================
// Reviews
// =============================================================================

/// Convert one review; a missing rating counts as five stars.
#[must_use]
pub fn convert_review(dto: ReviewDto) -> Option<Review> {
    let id = id_string(dto.id)?;

    Some(Review {
        id: ReviewId::new(id),
        author: seller_name("User", dto.user_id),
        rating: dto
            .rating
            .map_or(Review::MAX_RATING, Review::clamp_rating),
        text: non_empty(dto.comment)
            .or_else(|| non_empty(dto.title))
            .unwrap_or_else(|| DEFAULT_REVIEW_TEXT.to_owned()),
        product: id_string(dto.products_id).map(ProductId::new),
    })
}

#[must_use]
pub fn convert_reviews(dtos: Vec<ReviewDto>) -> Vec<Review> {
    dtos.into_iter().filter_map(convert_review).collect()
}

// =============================================================================
// Users
// =============================================================================

#[must_use]
pub fn convert_user(dto: UserDto) -> User {
    User {
        id: id_string(dto.id).map(UserId::new),
        name: dto.name,
        email: non_empty(dto.email),
    }
}

#[must_use]
pub fn convert_auth_response(dto: AuthResponseDto) -> (User, Option<String>) {
    let user = User {
        id: id_string(dto.user_id).map(UserId::new),
        name: dto.name,
        email: non_empty(dto.email),
    };
    (user, non_empty(dto.access_token))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product_dto(json: &str) -> ProductDto {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_product_defaults() {
        let product = convert_product(product_dto(r#"{"id": 9}"#)).unwrap();

        assert_eq!(product.id.as_str(), "9");
        assert_eq!(product.title, DEFAULT_TITLE);
        assert_eq!(product.category, DEFAULT_CATEGORY);
        assert_eq!(product.tag, DEFAULT_CATEGORY);
        assert_eq!(product.price, Price::ZERO);
        assert_eq!(product.thumb, PLACEHOLDER_IMAGE);
        assert_eq!(product.desc, DEFAULT_DESCRIPTION);
    }

    #[test]
    fn test_product_tag_defaults_to_category() {
        let product = convert_product(product_dto(
            r#"{"id": 1, "title": "Dota 2 guide", "category": "guides", "price": "499"}"#,
        ))
        .unwrap();

        assert_eq!(product.tag, "guides");
        assert_eq!(product.price, Price::from_rubles(499));
    }

    #[test]
    fn test_blank_strings_use_defaults() {
        let product =
            convert_product(product_dto(r#"{"id": 1, "title": "  ", "category": ""}"#)).unwrap();
        assert_eq!(product.title, DEFAULT_TITLE);
        assert_eq!(product.category, DEFAULT_CATEGORY);
    }

    #[test]
    fn test_items_without_id_or_inactive_are_dropped() {
        let products = convert_products(vec![
            product_dto(r#"{"title": "no id"}"#),
            product_dto(r#"{"id": 2, "is_active": false}"#),
            product_dto(r#"{"id": 3}"#),
        ]);
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].id.as_str(), "3");
    }

    #[test]
    fn test_market_listing_conversion() {
        let dto: ListingDto = serde_json::from_str(
            r#"{"id": 5, "title": "AWP stories", "price": 399, "game_topic": "CS:GO", "user_id": 12}"#,
        )
        .unwrap();
        let listing = convert_listing(dto).unwrap();

        assert_eq!(listing.kind, ListingKind::Market);
        assert_eq!(listing.category, "CS:GO");
        assert_eq!(listing.seller, "Seller 12");
    }

    #[test]
    fn test_sold_listing_is_dropped() {
        let dto: ListingDto = serde_json::from_str(r#"{"id": 5, "status": "sold"}"#).unwrap();
        assert!(convert_listing(dto).is_none());
    }

    #[test]
    fn test_author_listing_conversion() {
        let dto: AuthorListingDto =
            serde_json::from_str(r#"{"id": "a1", "prise": 249, "category": "Dota 2"}"#).unwrap();
        let listing = convert_author_listing(dto).unwrap();

        assert_eq!(listing.kind, ListingKind::Account);
        assert_eq!(listing.category, "Dota 2");
        assert_eq!(listing.price, Price::from_rubles(249));
        assert_eq!(listing.seller, ANONYMOUS);
    }

    #[test]
    fn test_review_conversion() {
        let dto: ReviewDto =
            serde_json::from_str(r#"{"id": 1, "user_id": 3, "title": "Great", "rating": 9}"#)
                .unwrap();
        let review = convert_review(dto).unwrap();

        assert_eq!(review.author, "User 3");
        assert_eq!(review.text, "Great");
        assert_eq!(review.rating, 5);
    }

    #[test]
    fn test_auth_response_conversion() {
        let dto: AuthResponseDto = serde_json::from_str(
            r#"{"message": "ok", "user_id": 4, "name": "Ann", "email": "ann@example.com"}"#,
        )
        .unwrap();
        let (user, token) = convert_auth_response(dto);

        assert_eq!(user.id.unwrap().as_str(), "4");
        assert_eq!(user.email.as_deref(), Some("ann@example.com"));
        assert!(token.is_none());
    }
}
