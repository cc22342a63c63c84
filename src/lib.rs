pub mod auction;
pub mod auth;
pub mod bidding;
pub mod database;
pub mod error;
pub mod event_store;
pub mod feed;
pub mod handlers;
pub mod listing;
pub mod message_broker;
pub mod profile;
pub mod query;
pub mod scheduler;
pub mod settlement;
