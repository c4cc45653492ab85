use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub const DETECTION_FAILED: &str = "Unable to detect location. Please enter manually.";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub city: String,
    pub pincode: String,
    pub full_address: String,
    pub coordinates: Option<Coordinates>,
}

impl Default for Location {
    fn default() -> Self {
        Self {
            city: "Bangalore".to_string(),
            pincode: "560001".to_string(),
            full_address: "Bangalore, Karnataka".to_string(),
            coordinates: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DetectedLocation {
    pub location: Location,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advisory: Option<String>,
}

#[async_trait]
pub trait Geolocator: Send + Sync {
    async fn locate(&self) -> anyhow::Result<Coordinates>;
}

/// Used when the device offers no position source.
pub struct UnavailableGeolocator;

#[async_trait]
impl Geolocator for UnavailableGeolocator {
    async fn locate(&self) -> anyhow::Result<Coordinates> {
        anyhow::bail!("geolocation is not supported")
    }
}

/// Never fails: a denied or missing position falls back to the default city
/// with an advisory for the user.
pub async fn detect(geolocator: &dyn Geolocator) -> DetectedLocation {
    match geolocator.locate().await {
        // No reverse geocoding yet; every fix resolves to the service hub.
        Ok(coordinates) => DetectedLocation {
            location: Location {
                city: "Bangalore".to_string(),
                pincode: "560001".to_string(),
                full_address: "Koramangala, Bangalore".to_string(),
                coordinates: Some(coordinates),
            },
            advisory: None,
        },
        Err(e) => {
            tracing::warn!(error = %e, "location detection failed, using default");
            DetectedLocation {
                location: Location::default(),
                advisory: Some(DETECTION_FAILED.to_string()),
            }
        }
    }
}
