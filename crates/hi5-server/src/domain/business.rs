use serde::{Deserialize, Serialize};

/// A business record from the search API. Fields the API leaves out fall back
/// to their defaults; fields this service does not use are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Business {
    pub name: String,
    pub image_url: String,
    pub url: String,
    pub review_count: u32,
    pub price: Option<String>,
    pub rating: f32,
    pub location: BusinessLocation,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusinessLocation {
    pub display_address: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SearchResponse {
    pub businesses: Vec<Business>,
}

impl Business {
    pub fn address(&self) -> String {
        self.location.display_address.join(" ")
    }
}
