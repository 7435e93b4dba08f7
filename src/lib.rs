pub mod action;
pub mod app;
pub mod command;
pub mod config;
pub mod error;
pub mod event;
pub mod format;
pub mod input;
pub mod listing;
pub mod logging;
pub mod menu;
pub mod system;
pub mod ui;
