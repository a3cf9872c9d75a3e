use crate::shared::*;

/// Populate the per-veggie auto-purchaser definitions.
///
/// Every veggie gets one instance of each; the instance state (owned, active,
/// timer) is what gets saved.
pub fn populate_auto_purchasers(registry: &mut SchemaRegistry) {
    registry.auto_purchasers = vec![
        AutoPurchaserDef {
            id: "auto_fertilizer".into(),
            name: "Auto Fertilizer".into(),
            target: PurchaseTarget::Fertilizer,
            cost: 50.0,
            cycle_days: 7,
        },
        AutoPurchaserDef {
            id: "auto_harvester".into(),
            name: "Auto Harvester Upgrade".into(),
            target: PurchaseTarget::Harvester,
            cost: 75.0,
            cycle_days: 7,
        },
        AutoPurchaserDef {
            id: "auto_better_seeds".into(),
            name: "Auto Better Seeds".into(),
            target: PurchaseTarget::BetterSeeds,
            cost: 100.0,
            cycle_days: 14,
        },
        AutoPurchaserDef {
            id: "auto_plot".into(),
            name: "Auto Additional Plot".into(),
            target: PurchaseTarget::AdditionalPlot,
            cost: 150.0,
            cycle_days: 14,
        },
    ];
}
