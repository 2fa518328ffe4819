use super::ApiError;
use crate::constants::limits::MAX_PAGE_SIZE;
use crate::models::FoodCategory;

pub fn parse_coordinate(name: &str, raw: Option<&str>, bound: f64) -> Result<f64, ApiError> {
    let raw = raw
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .ok_or_else(|| ApiError::validation(format!("Missing required parameter: {name}")))?;

    let value: f64 = raw
        .parse()
        .map_err(|_| ApiError::validation(format!("Invalid {name}: '{raw}' is not a number")))?;

    validate_coordinate(name, value, bound)
}

pub fn validate_coordinate(name: &str, value: f64, bound: f64) -> Result<f64, ApiError> {
    if !value.is_finite() || !(-bound..=bound).contains(&value) {
        return Err(ApiError::validation(format!(
            "Invalid {name}: {value}. Must be between -{bound} and {bound}"
        )));
    }
    Ok(value)
}

pub fn validate_limit(limit: usize) -> Result<usize, ApiError> {
    const MIN_LIMIT: usize = 1;

    if !(MIN_LIMIT..=MAX_PAGE_SIZE).contains(&limit) {
        return Err(ApiError::validation(format!(
            "Invalid limit: {limit}. Limit must be between {MIN_LIMIT} and {MAX_PAGE_SIZE}"
        )));
    }
    Ok(limit)
}

/// Merges the comma separated `categories` list with the legacy single
/// `category` parameter.
pub fn parse_categories(
    categories: Option<&str>,
    category: Option<&str>,
) -> Result<Vec<FoodCategory>, ApiError> {
    let mut parsed = Vec::new();

    for raw in [categories, category].into_iter().flatten() {
        for c in FoodCategory::parse_list(raw).map_err(|e| ApiError::validation(e.to_string()))? {
            if !parsed.contains(&c) {
                parsed.push(c);
            }
        }
    }

    Ok(parsed)
}
