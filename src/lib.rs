pub mod batch;
pub mod catalog;
pub mod config;
pub mod observations;
pub mod output;
pub mod scoring;
