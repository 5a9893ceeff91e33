pub mod classifier;
pub mod cli;
pub mod config;
pub mod error;
pub mod harness;
pub mod report;
pub mod testset;
