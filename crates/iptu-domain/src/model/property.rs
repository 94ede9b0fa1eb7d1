//! Property model and built-in sample set

use serde::{Deserialize, Serialize};

use iptu_types::PropertyInput;

/// A property under analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Property {
    pub address: String,

    /// Registered (declared) area in m²
    pub registered_area: f64,

    #[serde(default)]
    pub owner: Option<String>,
}

impl Property {
    pub fn new(address: impl Into<String>, registered_area: f64) -> Self {
        Self {
            address: address.into(),
            registered_area,
            owner: None,
        }
    }

    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }
}

impl From<Property> for PropertyInput {
    fn from(p: Property) -> Self {
        PropertyInput {
            address: p.address,
            registered_area: p.registered_area,
            owner: p.owner,
        }
    }
}

/// Built-in sample set used when no CSV is supplied
pub fn sample_properties() -> Vec<Property> {
    vec![
        Property::new("Av. Paulista, 1578 - Bela Vista, São Paulo - SP, Brazil", 450.0),
        Property::new("Praça da Sé, s/n - Sé, São Paulo - SP, Brazil", 320.0),
        Property::new("Av. Atlântica, 1702 - Copacabana, Rio de Janeiro - RJ, Brazil", 280.0),
        Property::new("Esplanada dos Ministérios - Brasília, DF, Brazil", 900.0),
    ]
}
