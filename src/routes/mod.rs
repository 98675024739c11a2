pub(crate) mod analytics;
pub(crate) mod basket;
pub(crate) mod coins;
pub(crate) mod health;
