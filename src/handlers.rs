pub mod auth;
pub mod crops;
pub mod diagnosis;
pub mod disease_treatments;
pub mod diseases;
pub mod health;
pub mod reports;
pub mod treatments;
pub mod users;
