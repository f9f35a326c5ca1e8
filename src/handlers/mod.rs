pub mod extract;
pub mod health;
pub mod tasks;
