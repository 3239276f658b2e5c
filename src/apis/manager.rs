//! Holds one instance of every provider client.
//!
//! Constructed explicitly in `run::start()` and shared via `Arc` so that
//! rate limiting and credential rotation are process-wide while tests can
//! build fresh instances.

use std::sync::Arc;

use serde::Serialize;

use crate::config::ProviderSettings;
use crate::logger::{log, LogTag};

use super::client::KeyRing;
use super::graduated::GraduatedIndexClient;
use super::holders::HolderRegistryClient;
use super::pairs::PairIndexClient;
use super::stats::ApiStats;
use super::swaps::SwapsClient;

pub struct ApiManager {
    pub graduated: GraduatedIndexClient,
    pub pairs: PairIndexClient,
    pub holders: HolderRegistryClient,
    pub swaps: SwapsClient,
}

impl ApiManager {
    pub fn new(providers: &ProviderSettings) -> Self {
        log(LogTag::Api, "INIT", "Initializing provider clients");

        let keys = Arc::new(KeyRing::new(providers.market_data_keys.clone()));
        if keys.is_empty() {
            log(
                LogTag::Api,
                "WARN",
                "No market-data API keys configured; keyed providers will return sentinels",
            );
        }

        Self {
            graduated: GraduatedIndexClient::new(keys.clone()),
            pairs: PairIndexClient::new(),
            holders: HolderRegistryClient::new(keys.clone()),
            swaps: SwapsClient::new(keys),
        }
    }

    pub fn all_stats(&self) -> ApiManagerStats {
        ApiManagerStats {
            graduated: self.graduated.stats(),
            pairs: self.pairs.stats(),
            holders: self.holders.stats(),
            swaps: self.swaps.stats(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ApiManagerStats {
    pub graduated: ApiStats,
    pub pairs: ApiStats,
    pub holders: ApiStats,
    pub swaps: ApiStats,
}
