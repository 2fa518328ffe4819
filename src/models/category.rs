use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of food establishment a caller can filter on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FoodCategory {
    All,
    Restaurant,
    Cafe,
    Bar,
    Takeaway,
    Bakery,
    Delivery,
    Nightclub,
}

/// Categories searched on the commercial provider when no filter is given.
pub const ALL_FOOD_CATEGORIES: &[FoodCategory] = &[
    FoodCategory::Restaurant,
    FoodCategory::Cafe,
    FoodCategory::Bar,
    FoodCategory::Takeaway,
    FoodCategory::Bakery,
    FoodCategory::Delivery,
];

const ALL_OSM_AMENITIES: &[&str] = &[
    "restaurant",
    "fast_food",
    "cafe",
    "bar",
    "pub",
    "biergarten",
    "food_court",
    "ice_cream",
    "bakery",
];

impl FoodCategory {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Restaurant => "restaurant",
            Self::Cafe => "cafe",
            Self::Bar => "bar",
            Self::Takeaway => "takeaway",
            Self::Bakery => "bakery",
            Self::Delivery => "delivery",
            Self::Nightclub => "nightclub",
        }
    }

    /// Google Places `type` parameter for this category.
    #[must_use]
    pub const fn google_type(self) -> &'static str {
        match self {
            Self::All | Self::Restaurant => "restaurant",
            Self::Cafe => "cafe",
            Self::Bar => "bar",
            Self::Takeaway => "meal_takeaway",
            Self::Bakery => "bakery",
            Self::Delivery => "meal_delivery",
            Self::Nightclub => "night_club",
        }
    }

    /// OSM `amenity` values covering this category.
    #[must_use]
    pub const fn osm_amenities(self) -> &'static [&'static str] {
        match self {
            Self::All => ALL_OSM_AMENITIES,
            Self::Restaurant => &["restaurant"],
            Self::Cafe => &["cafe"],
            Self::Bar => &["bar", "pub", "biergarten"],
            Self::Takeaway => &["fast_food"],
            Self::Bakery => &["bakery"],
            // OSM has no delivery tag
            Self::Delivery => &["restaurant", "fast_food"],
            Self::Nightclub => &["nightclub"],
        }
    }

    /// Parses a comma separated list such as `"restaurant, cafe"`.
    ///
    /// `all` (or an empty list) yields an empty vector, meaning no filter.
    pub fn parse_list(raw: &str) -> Result<Vec<Self>, UnknownCategory> {
        let mut categories = Vec::new();
        for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let category: Self = part.parse()?;
            if category != Self::All && !categories.contains(&category) {
                categories.push(category);
            }
        }
        Ok(categories)
    }
}

impl fmt::Display for FoodCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown food category '{0}'")]
pub struct UnknownCategory(pub String);

impl FromStr for FoodCategory {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "restaurant" | "restaurants" => Ok(Self::Restaurant),
            "cafe" | "cafes" => Ok(Self::Cafe),
            "bar" | "bars" => Ok(Self::Bar),
            "takeaway" => Ok(Self::Takeaway),
            "bakery" => Ok(Self::Bakery),
            "delivery" => Ok(Self::Delivery),
            "nightclub" => Ok(Self::Nightclub),
            other => Err(UnknownCategory(other.to_string())),
        }
    }
}

/// Which external providers a search consults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderMode {
    #[default]
    Google,
    Osm,
    Both,
}

impl ProviderMode {
    #[must_use]
    pub const fn uses_google(self) -> bool {
        matches!(self, Self::Google | Self::Both)
    }

    #[must_use]
    pub const fn uses_osm(self) -> bool {
        matches!(self, Self::Osm | Self::Both)
    }
}

impl fmt::Display for ProviderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Google => "google",
            Self::Osm => "osm",
            Self::Both => "both",
        })
    }
}

impl FromStr for ProviderMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "google" => Ok(Self::Google),
            "osm" => Ok(Self::Osm),
            "both" => Ok(Self::Both),
            other => anyhow::bail!("unknown provider mode '{other}' (expected google, osm or both)"),
        }
    }
}
