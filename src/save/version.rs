use std::fmt;

/// Version stamp written to every versioned save. Must stay stable.
pub const CURRENT_CANNING_VERSION: u32 = SchemaVersion::CURRENT.number();

/// Every schema the canning subsystem has shipped with, oldest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SchemaVersion {
    /// Farm only, no canning subsystem.
    Legacy,
    /// Canning state introduced.
    CanningState,
    /// Processes carry `totalTime`.
    ProcessTotals,
    /// Auto-canning config and per-veggie auto-purchasers.
    AutoConfig,
    /// The `canner` upgrade joins the canonical set.
    CannerUpgrade,
}

impl SchemaVersion {
    pub const CURRENT: SchemaVersion = SchemaVersion::CannerUpgrade;

    pub const ALL: [SchemaVersion; 5] = [
        SchemaVersion::Legacy,
        SchemaVersion::CanningState,
        SchemaVersion::ProcessTotals,
        SchemaVersion::AutoConfig,
        SchemaVersion::CannerUpgrade,
    ];

    pub const fn number(self) -> u32 {
        match self {
            SchemaVersion::Legacy => 0,
            SchemaVersion::CanningState => 1,
            SchemaVersion::ProcessTotals => 2,
            SchemaVersion::AutoConfig => 3,
            SchemaVersion::CannerUpgrade => 4,
        }
    }

    /// Maps a stored stamp onto a known version. Stamps from a newer build
    /// are clamped to `CURRENT`; the caller decides whether to log that.
    pub fn from_stamp(stamp: u32) -> SchemaVersion {
        Self::ALL
            .iter()
            .copied()
            .find(|v| v.number() == stamp)
            .unwrap_or(SchemaVersion::CURRENT)
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.number())
    }
}

/// Which persisted canning shape a record carried when it was loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveShape {
    /// `canningState` (verbose), usually stamped with `canningVersion`.
    Versioned,
    /// `canningProgress` (lean).
    Lean,
    /// No canning data at all.
    FarmOnly,
}

/// Outcome of running the migration ladder on one record.
#[derive(Debug, Clone, PartialEq)]
pub struct MigrationReport {
    /// Version the record claimed (or was inferred) before migration.
    pub original_version: u32,
    /// Version the record is at now; always `CURRENT_CANNING_VERSION`.
    pub final_version: u32,
    pub steps_applied: u32,
    pub step_descriptions: Vec<&'static str>,
    pub shape: SaveShape,
}

impl MigrationReport {
    pub fn was_migrated(&self) -> bool {
        self.steps_applied > 0
    }
}
