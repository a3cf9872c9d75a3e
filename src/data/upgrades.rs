use crate::shared::*;

/// Ids every current save must carry an upgrade entry for.
pub const CANONICAL_UPGRADE_IDS: [&str; 5] = ["speed", "efficiency", "quality", "automation", "canner"];

/// Upgrade id whose effect adds simultaneous canning slots.
pub const AUTOMATION_UPGRADE_ID: &str = "automation";

/// Upgrade id that unlocks hands-free auto-canning.
pub const CANNER_UPGRADE_ID: &str = "canner";

/// Populate the registry with the canning upgrades.
///
/// `cost = ceil(base_cost * cost_scaling ^ level)`; the effect curve is picked
/// by `kind` (see `canning::formulas`).
pub fn populate_upgrades(registry: &mut SchemaRegistry) {
    let upgrades: Vec<UpgradeDef> = vec![
        UpgradeDef {
            id: "speed".into(),
            name: "Pressure Canner".into(),
            description: "Cuts processing time by 5% per level.".into(),
            kind: UpgradeKind::Speed,
            base_cost: 100.0,
            cost_scaling: 1.5,
            currency: Currency::Money,
            // 18 levels reach the 0.1 floor
            max_level: Some(18),
        },
        UpgradeDef {
            id: "efficiency".into(),
            name: "Bigger Batches".into(),
            description: "Each process yields 10% more jars per level.".into(),
            kind: UpgradeKind::Efficiency,
            base_cost: 250.0,
            cost_scaling: 1.6,
            currency: Currency::Money,
            max_level: None,
        },
        UpgradeDef {
            id: "quality".into(),
            name: "Heirloom Spices".into(),
            description: "Adds 5% to the sale price of canned goods per level.".into(),
            kind: UpgradeKind::Quality,
            base_cost: 50.0,
            cost_scaling: 1.8,
            currency: Currency::Knowledge,
            max_level: None,
        },
        UpgradeDef {
            id: AUTOMATION_UPGRADE_ID.into(),
            name: "Extra Stove".into(),
            description: "Run one more canning process at the same time.".into(),
            kind: UpgradeKind::Automation,
            base_cost: 1_000.0,
            cost_scaling: 2.5,
            currency: Currency::Money,
            max_level: Some(4),
        },
        UpgradeDef {
            id: CANNER_UPGRADE_ID.into(),
            name: "Auto Canner".into(),
            description: "Starts selected recipes automatically.".into(),
            kind: UpgradeKind::Automation,
            base_cost: 5_000.0,
            cost_scaling: 1.0,
            currency: Currency::Money,
            max_level: Some(1),
        },
    ];

    registry.upgrades = upgrades;
}
