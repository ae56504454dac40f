//! HTTP handlers, grouped by API area.

pub mod activity;
pub mod auth;
pub mod health;
pub mod products;
pub mod uploads;
pub mod users;
