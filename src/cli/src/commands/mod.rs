pub mod action;
pub mod auth;
pub mod config;
pub mod resource;
