pub mod health;
pub mod latency;
pub mod pages;
pub mod routes;
