//! On-chain probes: supply and concentration from the largest token
//! accounts, and the mint-authority security check.

use futures::future::join_all;

use crate::logger::{self, LogTag};
use crate::rpc::{types::MintInfo, ChainRpcClient, TokenAccountBalance};
use crate::tokens::types::SecurityInfo;

/// Result of the single-fan-out holder probe: ~2 RPC calls plus at most
/// five owner lookups.
#[derive(Debug, Clone, Default)]
pub struct OnchainProbe {
    /// Total supply in UI units.
    pub supply_ui: Option<f64>,
    /// Raw base-unit supply string, when the mint account was readable.
    pub supply_raw: String,
    pub decimals: u8,
    /// Owner wallets of the five largest token accounts, in order.
    pub top5_owners: Vec<String>,
    /// Fraction of supply in the ten largest accounts, 0..1.
    pub top10_concentration: f64,
    /// Fraction of supply in the single largest account, 0..1.
    pub largest_pct: f64,
    /// Fraction of supply owned by the creator wallet, 0..1.
    pub dev_holdings: f64,
}

/// Probe supply and the largest accounts, resolving owners for the top five
/// only (the creator-holdings check needs wallets, not token accounts).
pub async fn holder_probe(rpc: &ChainRpcClient, mint: &str, creator: Option<&str>) -> OnchainProbe {
    let (supply_ui, largest) = tokio::join!(
        rpc.get_token_supply(mint),
        rpc.get_largest_token_accounts(mint),
    );

    let mut probe = OnchainProbe {
        supply_ui,
        decimals: 6,
        ..OnchainProbe::default()
    };

    let Some(supply) = supply_ui.filter(|s| *s > 0.0) else {
        return probe;
    };

    probe.top10_concentration =
        (largest.iter().take(10).map(|a| a.ui_amount).sum::<f64>() / supply).clamp(0.0, 1.0);
    probe.largest_pct = largest
        .first()
        .map(|a| (a.ui_amount / supply).clamp(0.0, 1.0))
        .unwrap_or(0.0);

    let top5: Vec<&TokenAccountBalance> = largest.iter().take(5).collect();
    let owners = join_all(
        top5.iter()
            .map(|account| rpc.get_account_owner(&account.token_account)),
    )
    .await;

    let mut dev_amount = 0.0;
    for (account, owner) in top5.iter().zip(owners.into_iter()) {
        let Some(owner) = owner else { continue };
        if creator == Some(owner.as_str()) {
            dev_amount += account.ui_amount;
        }
        probe.top5_owners.push(owner);
    }
    if creator.is_some() {
        probe.dev_holdings = (dev_amount / supply).clamp(0.0, 1.0);
    }

    probe
}

/// Mint/freeze authority probe plus the contract-holder honeypot signal.
///
/// pump.fun graduation revokes both authorities and burns the LP, so a
/// failed mint read falls back to the platform convention rather than
/// reporting the token as unsafe. A successful read that still shows an
/// authority is the anomaly worth flagging.
pub async fn security_probe(
    rpc: &ChainRpcClient,
    mint: &str,
    mint_info: Option<&MintInfo>,
    top5_owners: &[String],
) -> SecurityInfo {
    let mut security = match mint_info {
        Some(info) => {
            let mint_revoked = info.mint_authority.is_none();
            let freeze_revoked = info.freeze_authority.is_none();
            if !mint_revoked || !freeze_revoked {
                logger::warning(
                    LogTag::Enrich,
                    &format!(
                        "Anomalous graduated mint {}: authorities still set (mint={}, freeze={})",
                        mint,
                        info.mint_authority.as_deref().unwrap_or("-"),
                        info.freeze_authority.as_deref().unwrap_or("-"),
                    ),
                );
            }
            SecurityInfo {
                mint_authority_revoked: mint_revoked,
                freeze_authority_revoked: freeze_revoked,
                is_rugpull_risk: !mint_revoked && !freeze_revoked,
                ..SecurityInfo::platform_default()
            }
        }
        None => SecurityInfo::platform_default(),
    };

    // Honeypot signal: two or more of the top five holder wallets being
    // executable accounts means the "holders" are programs.
    if top5_owners.len() >= 2 {
        let checks = join_all(
            top5_owners
                .iter()
                .take(5)
                .map(|owner| rpc.is_executable_account(owner)),
        )
        .await;
        let contracts = checks.into_iter().flatten().filter(|x| *x).count();
        security.top_holders_are_contracts = contracts >= 2;
    }

    security
}
