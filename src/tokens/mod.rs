//! Token data model: migration events and the fused token record.

pub mod types;

pub use types::{
    Confidence, CreatedToken, CreatorHistory, LaunchAnalysis, MigrationEvent, PriceData,
    SocialLinks, SecurityInfo, TokenMetadata, TokenRecord, TokenStatistics, TradingActivity,
    WalletFunding, LP_LOCK_FOREVER_DAYS,
};
