pub mod edit;
pub mod health;
