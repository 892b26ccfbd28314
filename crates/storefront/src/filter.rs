//! Product filtering and sorting.
//!
//! The visible product list is a pure projection of the product catalog:
//!
//! 1. keep products whose category equals the selected one (`"all"` keeps everything)
//! 2. keep products whose `title + desc + tag` contains the query, case-insensitively
//! 3. sort by the selected key; ties keep catalog order

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::models::Product;

/// Category selector value meaning "no category filter".
pub const ALL_CATEGORIES: &str = "all";

/// Selected category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(String),
}

impl CategoryFilter {
    #[must_use]
    pub fn matches(&self, category: &str) -> bool {
        match self {
            Self::All => true,
            Self::Only(selected) => selected == category,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::All => ALL_CATEGORIES,
            Self::Only(selected) => selected,
        }
    }
}

impl From<&str> for CategoryFilter {
    fn from(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value == ALL_CATEGORIES {
            Self::All
        } else {
            Self::Only(value.to_owned())
        }
    }
}

/// Sort order of the product grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    /// Title order.
    #[default]
    Popular,
    PriceAsc,
    PriceDesc,
}

impl SortKey {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Popular => "popular",
            Self::PriceAsc => "price-asc",
            Self::PriceDesc => "price-desc",
        }
    }

    fn compare(self, a: &Product, b: &Product) -> Ordering {
        match self {
            Self::Popular => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
            Self::PriceAsc => a.price.cmp(&b.price),
            Self::PriceDesc => b.price.cmp(&a.price),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "popular" | "" => Ok(Self::Popular),
            "price-asc" => Ok(Self::PriceAsc),
            "price-desc" => Ok(Self::PriceDesc),
            _ => Err(format!("invalid sort key: {s}")),
        }
    }
}

/// Current product grid filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    pub category: CategoryFilter,
    pub query: String,
    pub sort: SortKey,
}

impl ProductFilter {
    /// Whether `product` passes the category and text filters.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        if !self.category.matches(&product.category) {
            return false;
        }

        let needle = self.query.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }

        let haystack = format!("{} {} {}", product.title, product.desc, product.tag).to_lowercase();
        haystack.contains(&needle)
    }

    /// Filter and sort `products`.
    #[must_use]
    pub fn apply<'a>(&self, products: &'a [Product]) -> Vec<&'a Product> {
        let mut visible: Vec<&Product> = products.iter().filter(|p| self.matches(p)).collect();
        // `sort_by` is stable: ties keep catalog order
        visible.sort_by(|a, b| self.sort.compare(a, b));
        visible
    }
}

/// Distinct categories in catalog order, for the category selector.
#[must_use]
pub fn categories(products: &[Product]) -> Vec<&str> {
    let mut seen: Vec<&str> = Vec::new();
    for product in products {
        if !seen.contains(&product.category.as_str()) {
            seen.push(&product.category);
        }
    }
    seen
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use kv_market_core::{Price, ProductId};

    use super::*;
    use crate::catalog::fallback;

    fn product(id: &str, title: &str, category: &str, price: u32) -> Product {
        Product {
            id: ProductId::new(id),
            title: title.to_string(),
            category: category.to_string(),
            price: Price::from_rubles(price),
            thumb: String::new(),
            tag: String::new(),
            desc: String::new(),
        }
    }

    fn ids(products: &[&Product]) -> Vec<String> {
        products.iter().map(|p| p.id.to_string()).collect()
    }

    #[test]
    fn test_all_category_keeps_everything() {
        let products = fallback::products();
        let filter = ProductFilter::default();
        assert_eq!(filter.apply(&products).len(), products.len());
    }

    #[test]
    fn test_category_is_exact_match() {
        let products = vec![
            product("1", "A", "rpg", 100),
            product("2", "B", "rpg-classics", 100),
        ];
        let filter = ProductFilter {
            category: CategoryFilter::from("rpg"),
            ..ProductFilter::default()
        };
        assert_eq!(ids(&filter.apply(&products)), vec!["1"]);
    }

    #[test]
    fn test_query_matches_title_desc_and_tag_case_insensitively() {
        let mut tagged = product("3", "Plain", "rpg", 100);
        tagged.tag = "Lore".to_string();
        let mut described = product("2", "Other", "rpg", 100);
        described.desc = "Boss MECHANICS".to_string();
        let products = vec![product("1", "Dota Guide", "guides", 100), described, tagged];

        let by_title = ProductFilter {
            query: "dota".to_string(),
            ..ProductFilter::default()
        };
        let by_desc = ProductFilter {
            query: "mechanics".to_string(),
            ..ProductFilter::default()
        };
        let by_tag = ProductFilter {
            query: " LORE ".to_string(),
            ..ProductFilter::default()
        };

        assert_eq!(ids(&by_title.apply(&products)), vec!["1"]);
        assert_eq!(ids(&by_desc.apply(&products)), vec!["2"]);
        assert_eq!(ids(&by_tag.apply(&products)), vec!["3"]);
    }

    #[test]
    fn test_price_sorts_are_stable() {
        let products = vec![
            product("a", "Zeta", "x", 300),
            product("b", "Alpha", "x", 100),
            product("c", "Beta", "x", 300),
            product("d", "Gamma", "x", 100),
        ];

        let asc = ProductFilter {
            sort: SortKey::PriceAsc,
            ..ProductFilter::default()
        };
        let desc = ProductFilter {
            sort: SortKey::PriceDesc,
            ..ProductFilter::default()
        };

        assert_eq!(ids(&asc.apply(&products)), vec!["b", "d", "a", "c"]);
        assert_eq!(ids(&desc.apply(&products)), vec!["a", "c", "b", "d"]);
    }

    #[test]
    fn test_popular_sorts_by_title() {
        let products = vec![
            product("1", "beta", "x", 1),
            product("2", "Alpha", "x", 1),
            product("3", "gamma", "x", 1),
        ];
        let filter = ProductFilter::default();
        assert_eq!(ids(&filter.apply(&products)), vec!["2", "1", "3"]);
    }

    #[test]
    fn test_filter_is_idempotent() {
        let products = fallback::products();
        let filter = ProductFilter {
            category: CategoryFilter::from("guides"),
            query: "e".to_string(),
            sort: SortKey::PriceDesc,
        };

        let once: Vec<Product> = filter.apply(&products).into_iter().cloned().collect();
        let twice: Vec<Product> = filter.apply(&once).into_iter().cloned().collect();
        assert_eq!(once, twice);
        assert_eq!(filter.apply(&products), filter.apply(&products));
    }

    #[test]
    fn test_sort_key_parsing() {
        assert_eq!("price-asc".parse::<SortKey>().unwrap(), SortKey::PriceAsc);
        assert_eq!("".parse::<SortKey>().unwrap(), SortKey::Popular);
        assert!("cheapest".parse::<SortKey>().is_err());
    }

    #[test]
    fn test_categories_in_catalog_order() {
        let products = fallback::products();
        assert_eq!(categories(&products), vec!["guides", "rpg"]);
    }
}
