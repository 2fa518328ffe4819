pub mod category;
pub mod venue;

pub use category::{ALL_FOOD_CATEGORIES, FoodCategory, ProviderMode, UnknownCategory};
pub use venue::{GENERIC_PHOTO_REFERENCE, SearchOutcome, SearchQuery, SearchStats, VenueRecord};
