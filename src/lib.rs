pub mod catalog;
pub mod config;
pub mod filters;
pub mod output;
pub mod pipeline;
pub mod ranking;
pub mod report;
pub mod scoring;
pub mod server;
