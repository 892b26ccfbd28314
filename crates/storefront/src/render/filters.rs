//! Custom Askama template filters.

use std::fmt::Display;

use crate::models::Review;

/// Renders a 1..=5 rating as five stars, e.g. `★★★★☆`.
///
/// Usage in templates: `{{ review.rating|stars }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn stars(rating: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(star_string(&rating.to_string()))
}

fn star_string(rating: &str) -> String {
    let filled = rating
        .trim()
        .parse::<i64>()
        .map_or(Review::MAX_RATING, Review::clamp_rating);
    (1..=Review::MAX_RATING)
        .map(|i| if i <= filled { '★' } else { '☆' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_star_string() {
        assert_eq!(star_string("4"), "★★★★☆");
        assert_eq!(star_string("0"), "★☆☆☆☆");
        assert_eq!(star_string("9"), "★★★★★");
        assert_eq!(star_string("n/a"), "★★★★★");
    }
}
