use bevy::prelude::*;
use std::fmt;

use super::formulas::max_simultaneous_processes;
use crate::shared::*;

/// Sent by the UI to buy one level of a canning upgrade.
#[derive(Event, Debug, Clone)]
pub struct PurchaseCanningUpgradeEvent {
    pub upgrade_id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PurchaseError {
    UnknownUpgrade(String),
    MaxLevel { id: String, max: u32 },
    InsufficientFunds { needed: f64, available: f64 },
}

impl fmt::Display for PurchaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PurchaseError::UnknownUpgrade(id) => write!(f, "unknown upgrade '{id}'"),
            PurchaseError::MaxLevel { id, max } => {
                write!(f, "upgrade '{id}' is already at its max level {max}")
            }
            PurchaseError::InsufficientFunds { needed, available } => {
                write!(f, "needs {needed} but only {available} available")
            }
        }
    }
}

impl std::error::Error for PurchaseError {}

/// Pay for and apply one level. Returns the new level.
///
/// Cost and effect are recomputed from the new level, and so is the process
/// cap, so nothing derived can drift from what was bought.
pub fn purchase_upgrade(progress: &mut GameProgress, upgrade_id: &str) -> Result<u32, PurchaseError> {
    let upgrade = progress
        .canning
        .upgrades
        .iter_mut()
        .find(|u| u.id == upgrade_id)
        .ok_or_else(|| PurchaseError::UnknownUpgrade(upgrade_id.to_string()))?;

    if upgrade.is_maxed() {
        return Err(PurchaseError::MaxLevel {
            id: upgrade.id.clone(),
            max: upgrade.max_level.unwrap_or(upgrade.level),
        });
    }

    let balance = match upgrade.currency {
        Currency::Money => &mut progress.farm.money,
        Currency::Knowledge => &mut progress.farm.knowledge,
    };
    if *balance < upgrade.cost {
        return Err(PurchaseError::InsufficientFunds {
            needed: upgrade.cost,
            available: *balance,
        });
    }

    *balance -= upgrade.cost;
    upgrade.set_level(upgrade.level + 1);
    let level = upgrade.level;

    progress.canning.max_simultaneous_processes =
        max_simultaneous_processes(&progress.canning.upgrades);
    Ok(level)
}

pub fn handle_purchase_upgrade(
    mut events: EventReader<PurchaseCanningUpgradeEvent>,
    mut progress: ResMut<GameProgress>,
) {
    for ev in events.read() {
        match purchase_upgrade(&mut progress, &ev.upgrade_id) {
            Ok(level) => info!("[Canning] Upgrade '{}' bought, now level {}", ev.upgrade_id, level),
            Err(e) => warn!("[Canning] Upgrade '{}' not bought: {}", ev.upgrade_id, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn progress_with_money(money: f64) -> GameProgress {
        let mut progress = GameProgress::new_game(&SchemaRegistry::current());
        progress.farm.money = money;
        progress
    }

    #[test]
    fn test_purchase_deducts_cost_and_raises_level() {
        let mut progress = progress_with_money(1_000.0);
        let cost = progress.canning.upgrade("speed").unwrap().cost;
        assert_eq!(purchase_upgrade(&mut progress, "speed"), Ok(1));
        assert_eq!(progress.farm.money, 1_000.0 - cost);
        let speed = progress.canning.upgrade("speed").unwrap();
        assert_eq!(speed.level, 1);
        assert_eq!(speed.cost, 150.0);
    }

    #[test]
    fn test_purchase_automation_raises_process_cap() {
        let mut progress = progress_with_money(10_000.0);
        assert_eq!(progress.canning.max_simultaneous_processes, 1);
        purchase_upgrade(&mut progress, "automation").unwrap();
        assert_eq!(progress.canning.max_simultaneous_processes, 2);
    }

    #[test]
    fn test_purchase_rejects_when_broke() {
        let mut progress = progress_with_money(10.0);
        let result = purchase_upgrade(&mut progress, "speed");
        assert!(matches!(result, Err(PurchaseError::InsufficientFunds { .. })));
        assert_eq!(progress.farm.money, 10.0);
        assert_eq!(progress.canning.upgrade("speed").unwrap().level, 0);
    }

    #[test]
    fn test_purchase_uses_the_upgrade_currency() {
        let mut progress = progress_with_money(0.0);
        progress.farm.knowledge = 60.0;
        assert_eq!(purchase_upgrade(&mut progress, "quality"), Ok(1));
        assert_eq!(progress.farm.knowledge, 10.0);
    }

    #[test]
    fn test_purchase_stops_at_max_level() {
        let mut progress = progress_with_money(100_000.0);
        assert_eq!(purchase_upgrade(&mut progress, "canner"), Ok(1));
        assert!(matches!(
            purchase_upgrade(&mut progress, "canner"),
            Err(PurchaseError::MaxLevel { max: 1, .. })
        ));
    }

    #[test]
    fn test_purchase_unknown_upgrade() {
        let mut progress = progress_with_money(100.0);
        assert_eq!(
            purchase_upgrade(&mut progress, "turbo"),
            Err(PurchaseError::UnknownUpgrade("turbo".into()))
        );
    }
}
