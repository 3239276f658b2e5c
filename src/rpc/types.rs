//! On-chain data shapes consumed by enrichment.

/// Parsed SPL mint account.
#[derive(Debug, Clone, Default)]
pub struct MintInfo {
    pub decimals: u8,
    /// None when the authority has been revoked.
    pub mint_authority: Option<String>,
    pub freeze_authority: Option<String>,
    /// Supply in base units, as a decimal string.
    pub supply: String,
}

/// One of the largest token accounts for a mint.
#[derive(Debug, Clone)]
pub struct TokenAccountBalance {
    pub token_account: String,
    pub ui_amount: f64,
}

/// Digital-asset metadata from the DAS interface.
#[derive(Debug, Clone, Default)]
pub struct AssetInfo {
    pub id: String,
    pub name: String,
    pub interface: String,
    /// Creator/update authority wallet, when present.
    pub creator: Option<String>,
    pub json_uri: Option<String>,
    /// Creation time, ms since epoch (0 when the provider omits it).
    pub created_at: i64,
    /// Token supply in base units, when reported.
    pub supply: Option<f64>,
}

/// Native SOL movement inside an enhanced transaction.
#[derive(Debug, Clone, Default)]
pub struct NativeTransfer {
    pub from_account: String,
    pub to_account: String,
    /// Lamports.
    pub amount: u64,
}

/// Token movement inside an enhanced transaction.
#[derive(Debug, Clone, Default)]
pub struct TokenTransfer {
    pub from_account: String,
    pub to_account: String,
    pub mint: String,
    pub amount: f64,
}

/// One transaction from the enhanced-history provider.
#[derive(Debug, Clone, Default)]
pub struct EnhancedTransaction {
    pub signature: String,
    pub slot: u64,
    /// Seconds since epoch.
    pub timestamp: i64,
    pub fee_payer: String,
    pub tx_type: String,
    pub native_transfers: Vec<NativeTransfer>,
    pub token_transfers: Vec<TokenTransfer>,
}

impl EnhancedTransaction {
    /// Total SOL sent by the fee payer in this transaction.
    pub fn sol_spent_by_fee_payer(&self) -> f64 {
        self.native_transfers
            .iter()
            .filter(|t| t.from_account == self.fee_payer)
            .map(|t| t.amount as f64 / 1_000_000_000.0)
            .sum()
    }
}
