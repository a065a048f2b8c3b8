pub mod api;
pub mod catalog;
pub mod client;
pub mod config;
pub mod data_models;
pub mod render;
pub mod view;
