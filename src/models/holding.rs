use serde::{Deserialize, Serialize};

/// How much of an asset the basket holds. A fresh holding has amount 0 and
/// adds nothing to portfolio value until the user sets it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    pub asset_id: String,
    #[serde(default)]
    pub amount: f64,
}

impl Holding {
    pub fn new(asset_id: impl Into<String>, amount: f64) -> Self {
        Self {
            asset_id: asset_id.into(),
            amount,
        }
    }
}
