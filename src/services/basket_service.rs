use tracing::info;

use crate::errors::AppError;
use crate::models::{BasketEntry, CoinCard, Holding};

/// The user's basket of coin cards. Lives in memory for the life of the process.
///
/// Every successful mutation bumps `revision`, which tags the analytics run it
/// triggers.
#[derive(Debug, Clone, Default)]
pub struct Basket {
    entries: Vec<BasketEntry>,
    revision: u64,
}

impl Basket {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn entries(&self) -> &[BasketEntry] {
        &self.entries
    }

    pub fn holdings(&self) -> Vec<Holding> {
        self.entries.iter().map(BasketEntry::holding).collect()
    }

    pub fn contains(&self, asset_id: &str) -> bool {
        self.entries.iter().any(|e| e.card.id == asset_id)
    }

    /// Add a card with amount 0. A card already in the basket is left as is.
    pub fn add(&mut self, card: CoinCard) -> bool {
        if self.contains(&card.id) {
            return false;
        }
        info!("🧺 Adding {} to basket", card.id);
        self.entries.push(BasketEntry::new(card));
        self.revision += 1;
        true
    }

    pub fn remove(&mut self, asset_id: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.card.id != asset_id);
        let removed = self.entries.len() != before;
        if removed {
            info!("🧺 Removed {} from basket", asset_id);
            self.revision += 1;
        }
        removed
    }

    pub fn set_amount(&mut self, asset_id: &str, amount: f64) -> Result<&BasketEntry, AppError> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(AppError::Validation(format!(
                "Amount must be a non-negative number, got {}",
                amount
            )));
        }

        let idx = self
            .entries
            .iter()
            .position(|e| e.card.id == asset_id)
            .ok_or_else(|| AppError::NotFound(format!("{} is not in the basket", asset_id)))?;

        self.entries[idx] = self.entries[idx].with_amount(amount);
        self.revision += 1;
        info!("🧺 Set {} amount to {}", asset_id, amount);
        Ok(&self.entries[idx])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(id: &str, last_price: f64) -> CoinCard {
        CoinCard {
            id: id.to_string(),
            name: id.to_string(),
            symbol: id[..3].to_string(),
            sharpe: 0.5,
            days: 365,
            last_price,
        }
    }

    #[test]
    fn test_add_rejects_duplicates() {
        let mut basket = Basket::new();
        assert!(basket.add(card("bitcoin", 60000.0)));
        assert!(!basket.add(card("bitcoin", 60000.0)));
        assert_eq!(basket.entries().len(), 1);
        assert_eq!(basket.revision(), 1);
    }

    #[test]
    fn test_new_entries_hold_nothing() {
        let mut basket = Basket::new();
        basket.add(card("ethereum", 3000.0));
        assert_eq!(basket.holdings(), vec![Holding::new("ethereum", 0.0)]);
    }

    #[test]
    fn test_remove() {
        let mut basket = Basket::new();
        basket.add(card("bitcoin", 1.0));
        basket.add(card("ethereum", 1.0));
        assert!(basket.remove("bitcoin"));
        assert!(!basket.remove("bitcoin"));
        assert_eq!(basket.revision(), 3);
        assert_eq!(basket.entries()[0].card.id, "ethereum");
    }

    #[test]
    fn test_set_amount_updates_position() {
        let mut basket = Basket::new();
        basket.add(card("solana", 150.0));
        let entry = basket.set_amount("solana", 2.0).unwrap();
        assert_eq!(entry.position, 300.0);
        assert_eq!(basket.revision(), 2);
    }

    #[test]
    fn test_set_amount_validation() {
        let mut basket = Basket::new();
        basket.add(card("solana", 150.0));
        assert!(matches!(basket.set_amount("solana", -1.0), Err(AppError::Validation(_))));
        assert!(matches!(basket.set_amount("solana", f64::NAN), Err(AppError::Validation(_))));
        assert!(matches!(basket.set_amount("dogecoin", 1.0), Err(AppError::NotFound(_))));
        assert_eq!(basket.revision(), 1);
    }
}
