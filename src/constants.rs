//! Shared domain constants.

/// Every pump.fun token mints exactly one billion units.
pub const PUMPFUN_TOTAL_SUPPLY: f64 = 1_000_000_000.0;

/// Wrapped SOL mint address.
pub const WSOL_MINT: &str = "So11111111111111111111111111111111111111112";

/// SPL Token program.
pub const TOKEN_PROGRAM_ID: &str = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";

/// Raydium AMM authority; its token accounts hold pooled liquidity.
pub const RAYDIUM_AUTHORITY: &str = "5Q544fKrFoe6tsEbD7S8EmxGTJYAKtTVhAW5Q5pge4j1";

/// pump.fun AMM program (pool accounts created at graduation).
pub const PUMPFUN_AMM_PROGRAM: &str = "pAMMBay6oceH9fJKBRHGP5D4bD4sWpmSwMn52FMfXEA";

/// Wallets that hold supply for infrastructure reasons and must be skipped
/// by holder-level analyses (funding, clustering, dev detection).
pub const INFRASTRUCTURE_WALLETS: &[&str] = &[
    RAYDIUM_AUTHORITY,
    PUMPFUN_AMM_PROGRAM,
    // pump.fun fee account
    "CebN5WGQ4jvEPvsVU4EoHEpgzq1VV7AbicfhtW4xC9iM",
    // Burn address
    "1nc1nerator11111111111111111111111111111111",
];

/// Maximum records kept in the in-memory history.
pub const MAX_HISTORY: usize = 100;

/// Number of recent graduated tokens loaded during backfill.
pub const BACKFILL_LIMIT: usize = 40;

/// Backfill batch sizing and pacing.
pub const BACKFILL_BATCH_SIZE: usize = 5;
pub const BACKFILL_BATCH_DELAY_MS: u64 = 500;

/// Hard per-token timeout during backfill, seconds.
pub const BACKFILL_TOKEN_TIMEOUT_SECS: u64 = 8;

/// Is this mint plausibly a base-58 Solana address?
pub fn is_valid_mint(mint: &str) -> bool {
    if mint.len() < 32 || mint.len() > 44 {
        return false;
    }
    bs58::decode(mint).into_vec().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mint_validation() {
        assert!(is_valid_mint(WSOL_MINT));
        assert!(!is_valid_mint("short"));
        assert!(!is_valid_mint("not-base58-0OIl!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!"));
    }
}
