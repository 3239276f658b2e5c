pub mod apis;
pub mod arguments;
pub mod config;
pub mod constants;
pub mod enrichment;
pub mod errors;
pub mod logger;
pub mod migrations;
pub mod monitor;
pub mod rpc;
pub mod run;
pub mod scoring;
pub mod sol_price;
pub mod tokens;
pub mod webserver;
