/// Number of reviews at which a rating is trusted as much as the prior.
pub const CONFIDENCE_REVIEWS: f64 = 15.0;

/// Neutral rating assumed for a venue nobody has reviewed.
pub const PRIOR_RATING: f64 = 3.5;

/// Bayesian average of a venue's rating and the neutral prior.
///
/// With few reviews the score is pulled towards [`PRIOR_RATING`]; with many
/// it approaches the venue's own rating.
#[must_use]
pub fn weighted_score(rating: f64, review_count: u32) -> f64 {
    let v = f64::from(review_count);
    (v * rating + CONFIDENCE_REVIEWS * PRIOR_RATING) / (v + CONFIDENCE_REVIEWS)
}

/// Turns a raw provider tag such as `fast_food` into `Fast Food`.
#[must_use]
pub fn format_type_label(raw: &str) -> String {
    raw.replace('_', " ")
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_reviews_is_prior() {
        for rating in [0.0, 1.0, 3.2, 5.0] {
            assert!((weighted_score(rating, 0) - PRIOR_RATING).abs() < 1e-12);
        }
    }

    #[test]
    fn test_many_reviews_beat_single_perfect_review() {
        assert!(weighted_score(5.0, 1) < weighted_score(4.8, 10_000));
    }

    #[test]
    fn test_monotonic() {
        assert!(weighted_score(4.0, 100) < weighted_score(4.5, 100));
        assert!(weighted_score(4.5, 10) < weighted_score(4.5, 100));
        // below the prior, more reviews pull the score down
        assert!(weighted_score(2.0, 100) < weighted_score(2.0, 10));
    }

    #[test]
    fn test_converges_to_rating() {
        assert!((weighted_score(4.2, u32::MAX) - 4.2).abs() < 1e-6);
    }

    #[test]
    fn test_format_type_label() {
        assert_eq!(format_type_label("fast_food"), "Fast Food");
        assert_eq!(format_type_label("meal_takeaway"), "Meal Takeaway");
        assert_eq!(format_type_label("ITALIAN"), "Italian");
        assert_eq!(format_type_label("pizza;burger"), "Pizza;burger");
        assert_eq!(format_type_label(""), "");
    }
}
