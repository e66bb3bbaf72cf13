#![allow(clippy::collapsible_if)]
pub mod cards;
pub mod config;
pub mod details;
pub mod error;
pub mod favorites;
pub mod home;
pub mod routes;
pub mod state;
