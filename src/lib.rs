pub mod aws;
pub mod cli;
pub mod commands;
pub mod config;
pub mod constants;
pub mod event;
pub mod logging;
pub mod model;
pub mod resource;
pub mod thumbprint;
