pub mod google_places;
pub mod overpass;

pub use google_places::{GooglePlacesClient, PlacesApi, PlacesError};
pub use overpass::{OverpassApi, OverpassClient, OverpassError};
