use crate::data::AUTOMATION_UPGRADE_ID;
use crate::shared::*;

/// Lowest processing-time multiplier the speed upgrade can reach.
pub const SPEED_FLOOR: f64 = 0.1;

/// `ceil(base_cost * cost_scaling ^ level)`.
pub fn upgrade_cost(base_cost: f64, cost_scaling: f64, level: u32) -> f64 {
    let exponent = level.min(i32::MAX as u32) as i32;
    (base_cost * cost_scaling.powi(exponent)).ceil()
}

pub fn upgrade_effect(kind: UpgradeKind, level: u32) -> f64 {
    let level = level as f64;
    match kind {
        UpgradeKind::Speed => (1.0 - level * 0.05).max(SPEED_FLOOR),
        UpgradeKind::Efficiency => 1.0 + level * 0.10,
        UpgradeKind::Quality => level * 5.0,
        UpgradeKind::Automation => level,
    }
}

/// The unlock rule. The recipe at registry position 0 is gated by overall
/// farm experience; every other recipe by canning experience.
pub fn recipe_unlocked(
    position: usize,
    experience_required: f64,
    overall_experience: f64,
    canning_experience: f64,
) -> bool {
    if position == 0 {
        overall_experience >= experience_required
    } else {
        canning_experience >= experience_required
    }
}

/// `1 + effect` of the automation upgrade (1 when it is missing).
pub fn max_simultaneous_processes(upgrades: &[UpgradeInstance]) -> u32 {
    let extra = upgrades
        .iter()
        .find(|u| u.id == AUTOMATION_UPGRADE_ID)
        .map_or(0.0, |u| u.effect.max(0.0));
    1 + extra as u32
}

/// Seconds a recipe takes once the speed upgrade is applied. Never zero.
pub fn effective_processing_time(base_seconds: u32, upgrades: &[UpgradeInstance]) -> u32 {
    let multiplier = upgrades
        .iter()
        .find(|u| u.kind == UpgradeKind::Speed)
        .map_or(1.0, |u| u.effect);
    ((base_seconds as f64 * multiplier).round() as u32).max(1)
}

impl UpgradeInstance {
    /// Builds an instance from its current definition. `level` is clamped to
    /// `max_level` and the cached cost/effect are derived from it.
    pub fn from_def(def: &UpgradeDef, level: u32) -> Self {
        let mut upgrade = Self {
            id: def.id.clone(),
            name: def.name.clone(),
            description: def.description.clone(),
            kind: def.kind,
            level: 0,
            cost: 0.0,
            effect: 0.0,
            base_cost: def.base_cost,
            cost_scaling: def.cost_scaling,
            currency: def.currency,
            max_level: def.max_level,
        };
        upgrade.set_level(level);
        upgrade
    }

    pub fn set_level(&mut self, level: u32) {
        self.level = match self.max_level {
            Some(max) => level.min(max),
            None => level,
        };
        self.refresh();
    }

    /// Recompute the cached fields from `level`.
    pub fn refresh(&mut self) {
        self.cost = upgrade_cost(self.base_cost, self.cost_scaling, self.level);
        self.effect = upgrade_effect(self.kind, self.level);
    }

    pub fn is_maxed(&self) -> bool {
        self.max_level.is_some_and(|max| self.level >= max)
    }
}
