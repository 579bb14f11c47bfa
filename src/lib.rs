pub mod cli;
pub mod config;
pub mod fetcher;
pub mod models;
pub mod report;
pub mod scraper_logic;
pub mod server;

pub use config::ScraperConfig;
pub use fetcher::Fetcher;
pub use models::{Identifier, MetricLabel, MetricResult, MetricSpec, MetricValue, ScraperError};
pub use scraper_logic::{extract, extract_from_str};
