pub mod cache {
    pub const TTL_HOURS: u64 = 48;

    pub const MATCH_RADIUS_METERS: f64 = 20.0;

    pub const SWEEP_INTERVAL_MINUTES: u64 = 10;
}

pub mod intervals {
    use std::time::Duration;

    /// Delay before requesting the next Google results page; tokens are not
    /// usable immediately after they are issued.
    pub const PAGE_TOKEN_DELAY: Duration = Duration::from_secs(2);

    pub const PAGINATED_CALL_TIMEOUT: Duration = Duration::from_secs(30);

    pub const SIMPLE_CALL_TIMEOUT: Duration = Duration::from_secs(10);

    pub const SEARCH_DEADLINE: Duration = Duration::from_secs(60);
}

pub mod google {
    pub const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api/place";

    pub const SEARCH_RADIUS_METERS: u32 = 2000;

    pub const LANGUAGE: &str = "en";

    pub const MAX_PAGES: u32 = 3;

    pub const MIN_RATING_FOR_PHOTO: f64 = 4.0;

    pub const MIN_REVIEWS_FOR_PHOTO: u32 = 5;

    /// Text searches issued alongside a restaurant fan-out without keyword.
    pub const RESTAURANT_TEXT_QUERIES: &[&str] = &["restaurant", "food"];
}

pub mod overpass {
    pub const DEFAULT_BASE_URL: &str = "https://overpass-api.de/api/interpreter";

    pub const SEARCH_RADIUS_METERS: u32 = 2000;

    pub const QUERY_TIMEOUT_SECONDS: u32 = 15;

    pub const REQUEST_TIMEOUT_SECONDS: u64 = 10;

    /// Keywords that also match `diet:<keyword>=yes` tags.
    pub const DIET_KEYWORDS: &[&str] = &["vegan", "vegetarian", "halal", "kosher"];
}

pub mod search {
    /// Cuisines searched as `type=restaurant` + keyword during a restaurant
    /// fan-out. Nearby search ignores cuisine-specific place types.
    pub const CUISINE_KEYWORDS: &[&str] = &[
        "indian",
        "chinese",
        "thai",
        "japanese",
        "korean",
        "vietnamese",
        "italian",
        "mexican",
        "french",
        "greek",
        "mediterranean",
        "american",
        "seafood",
        "steak",
        "barbecue",
        "pizza",
        "burger",
        "sushi",
        "ramen",
        "vegetarian",
        "vegan",
        "breakfast",
        "brunch",
    ];

    /// Caller keywords rewritten before they reach the Google keyword parameter.
    pub const KEYWORD_ALIASES: &[(&str, &str)] = &[
        ("healthy", "healthy food"),
        ("organic", "organic food"),
        ("gluten-free", "gluten free"),
        ("bbq", "bbq barbecue"),
        ("steakhouse", "steakhouse steak"),
        ("breakfast", "breakfast brunch"),
        ("dessert", "dessert ice cream"),
    ];

    /// Exact Google place types accepted as food venues.
    pub const FOOD_TYPE_WHITELIST: &[&str] = &[
        "restaurant",
        "cafe",
        "bar",
        "bakery",
        "meal_delivery",
        "meal_takeaway",
        "night_club",
        "food",
        "fast_food",
        "pub",
        "biergarten",
        "food_court",
        "ice_cream",
        "indian_restaurant",
        "chinese_restaurant",
        "thai_restaurant",
        "japanese_restaurant",
        "korean_restaurant",
        "vietnamese_restaurant",
        "italian_restaurant",
        "mexican_restaurant",
        "french_restaurant",
        "greek_restaurant",
        "mediterranean_restaurant",
        "american_restaurant",
        "brazilian_restaurant",
        "spanish_restaurant",
        "middle_eastern_restaurant",
        "turkish_restaurant",
        "lebanese_restaurant",
        "indonesian_restaurant",
        "asian_restaurant",
        "african_restaurant",
        "seafood_restaurant",
        "steak_house",
        "barbecue_restaurant",
        "pizza_restaurant",
        "hamburger_restaurant",
        "sandwich_shop",
        "ramen_restaurant",
        "sushi_restaurant",
        "vegetarian_restaurant",
        "vegan_restaurant",
        "brunch_restaurant",
        "breakfast_restaurant",
        "buffet_restaurant",
        "fine_dining_restaurant",
        "fast_food_restaurant",
        "coffee_shop",
        "tea_house",
        "juice_shop",
        "ice_cream_shop",
        "dessert_shop",
        "donut_shop",
        "candy_store",
        "wine_bar",
        "cocktail_bar",
        "sports_bar",
        "beer_hall",
        "beer_garden",
    ];

    /// Substrings that mark an unknown place type as food related.
    pub const FOOD_TYPE_FRAGMENTS: &[&str] = &[
        "restaurant",
        "food",
        "cafe",
        "bar",
        "bakery",
        "dining",
        "eatery",
    ];

    pub const GOOGLE_NAME_PREFIX: &str = "[GOOGLE] ";

    pub const OSM_NAME_PREFIX: &str = "[OSM] ";
}

pub mod limits {
    pub const DEFAULT_PAGE_SIZE: usize = 20;

    pub const MAX_PAGE_SIZE: usize = 100;

    pub const DEFAULT_CLI_RESULTS: usize = 10;
}
