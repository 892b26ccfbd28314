//! Built-in datasets used when the catalog API is unavailable.

use kv_market_core::{ListingId, ListingKind, Price, ProductId, ReviewId};

use crate::models::{Listing, Product, Review};

const DOTA_THUMB: &str = "https://cdn.cloudflare.steamstatic.com/steam/apps/570/header.jpg";
const CSGO_THUMB: &str = "https://cdn.cloudflare.steamstatic.com/steam/apps/730/header.jpg";
const WITCHER_THUMB: &str = "https://cdn.cloudflare.steamstatic.com/steam/apps/292030/header.jpg";
const ELDEN_RING_THUMB: &str =
    "https://cdn.cloudflare.steamstatic.com/steam/apps/1248130/header.jpg";

fn product(
    id: &str,
    title: &str,
    category: &str,
    price: u32,
    thumb: &str,
    tag: &str,
    desc: &str,
) -> Product {
    Product {
        id: ProductId::new(id),
        title: title.to_owned(),
        category: category.to_owned(),
        price: Price::from_rubles(price),
        thumb: thumb.to_owned(),
        tag: tag.to_owned(),
        desc: desc.to_owned(),
    }
}

/// Store products.
#[must_use]
pub fn products() -> Vec<Product> {
    vec![
        product(
            "1",
            "Dota 2: Complete guide and tactics (eBook)",
            "guides",
            499,
            DOTA_THUMB,
            "Guide",
            "Detailed tactics, builds and role breakdowns for players of every level.",
        ),
        product(
            "2",
            "CS:GO: Tactics, maps and economy (eBook)",
            "guides",
            399,
            CSGO_THUMB,
            "Guide",
            "Practical guides to maps, economy and aim.",
        ),
        product(
            "3",
            "The Witcher 3: Lore, quests and build guide (eBook)",
            "rpg",
            499,
            WITCHER_THUMB,
            "Lore",
            "A close look at the story, the quests and character building advice.",
        ),
        product(
            "4",
            "Elden Ring: Boss tactics and builds (eBook)",
            "rpg",
            399,
            ELDEN_RING_THUMB,
            "Guide",
            "Boss mechanics, optimal builds and routes through every region.",
        ),
    ]
}

fn listing(
    kind: ListingKind,
    id: &str,
    title: &str,
    game: &str,
    price: u32,
    thumb: &str,
    seller: &str,
) -> Listing {
    Listing {
        id: ListingId::new(id),
        kind,
        title: title.to_owned(),
        category: game.to_owned(),
        price: Price::from_rubles(price),
        thumb: thumb.to_owned(),
        tag: game.to_owned(),
        desc: String::new(),
        seller: seller.to_owned(),
    }
}

/// Listings of `kind`.
#[must_use]
pub fn listings(kind: ListingKind) -> Vec<Listing> {
    match kind {
        ListingKind::Market => vec![
            listing(
                kind,
                "lst-1",
                "AWP | Collector stories (eBook)",
                "CS:GO",
                399,
                CSGO_THUMB,
                "Player123",
            ),
            listing(
                kind,
                "lst-2",
                "Rare Courier: Item stories (eBook)",
                "Dota 2",
                349,
                DOTA_THUMB,
                "MarketPro",
            ),
        ],
        ListingKind::Account => vec![
            listing(
                kind,
                "acc-1",
                "Author edition: CS:GO stories",
                "CS:GO",
                249,
                CSGO_THUMB,
                "MarketUser",
            ),
            listing(
                kind,
                "acc-2",
                "Author edition: Dota 2 couriers",
                "Dota 2",
                299,
                DOTA_THUMB,
                "SellerPro",
            ),
        ],
    }
}

fn review(id: &str, author: &str, text: &str, rating: u8) -> Review {
    Review {
        id: ReviewId::new(id),
        author: author.to_owned(),
        rating,
        text: text.to_owned(),
        product: None,
    }
}

/// Home page reviews.
#[must_use]
pub fn reviews() -> Vec<Review> {
    vec![
        review("1", "Alexey", "Great service! Fast delivery.", 5),
        review("2", "Maria", "Quality material, lots of useful charts.", 5),
        review("3", "Ivan", "Convenient store interface.", 4),
        review("4", "Olga", "Good prices on themed collections.", 5),
        review("5", "Dmitry", "Got the download link right after paying.", 5),
    ]
}
