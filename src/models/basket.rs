use serde::{Deserialize, Serialize};

use crate::models::{CoinCard, Holding, PortfolioSummary};

/// A coin card dropped into the basket, with the amount the user holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasketEntry {
    pub card: CoinCard,
    pub amount: f64,
    /// amount * last_price
    pub position: f64,
}

impl BasketEntry {
    pub fn new(card: CoinCard) -> Self {
        Self {
            card,
            amount: 0.0,
            position: 0.0,
        }
    }

    pub fn with_amount(&self, amount: f64) -> Self {
        Self {
            amount,
            position: amount * self.card.last_price,
            ..self.clone()
        }
    }

    pub fn holding(&self) -> Holding {
        Holding::new(self.card.id.clone(), self.amount)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BasketView {
    pub revision: u64,
    pub entries: Vec<BasketEntry>,
    pub summary: PortfolioSummary,
}

#[derive(Debug, Deserialize)]
pub struct SetAmountRequest {
    pub amount: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_amount_updates_position() {
        let card = CoinCard {
            id: "solana".to_string(),
            name: "Solana".to_string(),
            symbol: "sol".to_string(),
            sharpe: 1.2,
            days: 365,
            last_price: 150.0,
        };
        let entry = BasketEntry::new(card).with_amount(4.0);
        assert_eq!(entry.position, 600.0);
        assert_eq!(entry.holding(), Holding::new("solana", 4.0));
    }
}
