#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use nearby_eats::clients::google_places::{
    Geometry, LatLng, NearbySearchRequest, PlacePhoto, PlaceResult, PlacesPage, TextSearchRequest,
};
use nearby_eats::clients::overpass::{OverpassElement, OverpassQuery};
use nearby_eats::clients::{OverpassApi, OverpassError, PlacesApi, PlacesError};
use nearby_eats::config::Config;
use nearby_eats::models::ProviderMode;
use nearby_eats::state::SharedState;

pub enum Reply<T> {
    Data(T),
    Fail,
    Hang,
}

/// Answers every Places request with the same single page.
pub struct FakePlaces {
    reply: Reply<Vec<PlaceResult>>,
    pub calls: AtomicUsize,
}

impl FakePlaces {
    pub fn returning(results: Vec<PlaceResult>) -> Arc<Self> {
        Arc::new(Self {
            reply: Reply::Data(results),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            reply: Reply::Fail,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn hanging() -> Arc<Self> {
        Arc::new(Self {
            reply: Reply::Hang,
            calls: AtomicUsize::new(0),
        })
    }

    async fn answer(&self) -> Result<PlacesPage, PlacesError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.reply {
            Reply::Data(results) => Ok(PlacesPage {
                results: results.clone(),
                next_page_token: None,
            }),
            Reply::Fail => Err(PlacesError::Status {
                status: "REQUEST_DENIED".to_string(),
                message: "bad key".to_string(),
            }),
            Reply::Hang => std::future::pending().await,
        }
    }
}

#[async_trait]
impl PlacesApi for FakePlaces {
    async fn nearby_search(
        &self,
        _request: &NearbySearchRequest,
        _page_token: Option<&str>,
    ) -> Result<PlacesPage, PlacesError> {
        self.answer().await
    }

    async fn text_search(
        &self,
        _request: &TextSearchRequest,
        _page_token: Option<&str>,
    ) -> Result<PlacesPage, PlacesError> {
        self.answer().await
    }
}

pub struct FakeOverpass {
    reply: Reply<Vec<OverpassElement>>,
    pub calls: AtomicUsize,
}

impl FakeOverpass {
    pub fn returning(elements: Vec<OverpassElement>) -> Arc<Self> {
        Arc::new(Self {
            reply: Reply::Data(elements),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            reply: Reply::Fail,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl OverpassApi for FakeOverpass {
    async fn query(&self, _query: &OverpassQuery) -> Result<Vec<OverpassElement>, OverpassError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.reply {
            Reply::Data(elements) => Ok(elements.clone()),
            Reply::Fail => Err(OverpassError::Status(504)),
            Reply::Hang => std::future::pending().await,
        }
    }
}

pub fn place(name: &str, lat: f64, lng: f64, types: &[&str]) -> PlaceResult {
    PlaceResult {
        name: name.to_string(),
        place_id: format!("place-{name}"),
        rating: Some(4.4),
        user_ratings_total: Some(120),
        price_level: Some(2),
        types: types.iter().map(ToString::to_string).collect(),
        geometry: Geometry {
            location: LatLng { lat, lng },
        },
        vicinity: Some(format!("{name} street")),
        formatted_address: None,
        photos: vec![PlacePhoto {
            photo_reference: format!("photo-{name}"),
        }],
    }
}

pub fn osm_node(id: i64, name: &str, lat: f64, lon: f64, amenity: &str) -> OverpassElement {
    OverpassElement {
        kind: "node".to_string(),
        id,
        lat: Some(lat),
        lon: Some(lon),
        center: None,
        tags: HashMap::from([
            ("name".to_string(), name.to_string()),
            ("amenity".to_string(), amenity.to_string()),
        ]),
    }
}

pub fn config(mode: ProviderMode) -> Config {
    let mut config = Config::default();
    config.search.provider = mode;
    config.google.api_key = "test-key".to_string();
    config
}

pub fn shared_state(
    mode: ProviderMode,
    places: Option<Arc<FakePlaces>>,
    overpass: Arc<FakeOverpass>,
) -> SharedState {
    SharedState::with_clients(
        config(mode),
        places.map(|p| p as Arc<dyn PlacesApi>),
        overpass,
    )
}
