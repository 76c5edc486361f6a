pub mod currencies;
pub mod rates;
pub mod schedule;
