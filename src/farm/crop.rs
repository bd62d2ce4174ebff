//! Crops grown on the farm and the field conditions each one prefers.

use serde::{Deserialize, Serialize};

// ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CropKind {
    Rice,
    PalmOil,
    Rubber,
    Durian,
    Banana,
    Coconut,
}

/// Agronomic profile of a crop.
pub struct CropProfile {
    pub varieties: &'static [&'static str],
    /// Stages in growing order; each spans an equal share of the cycle.
    pub growth_stages: &'static [&'static str],
    pub cycle_days: i64,
    /// Kilograms per hectare.
    pub yield_range: (f64, f64),
    pub optimal_ph: (f64, f64),
    /// Soil moisture, percent.
    pub optimal_moisture: (f64, f64),
}

const RICE: CropProfile = CropProfile {
    varieties: &["MR220", "MR219", "MR297", "Bario", "Fragrant Rice"],
    growth_stages: &[
        "seedling",
        "tillering",
        "panicle_initiation",
        "flowering",
        "grain_filling",
        "maturity",
    ],
    cycle_days: 120,
    yield_range: (3000.0, 7000.0),
    optimal_ph: (5.5, 7.0),
    optimal_moisture: (80.0, 95.0),
};

const PALM_OIL: CropProfile = CropProfile {
    varieties: &["Dura", "Pisifera", "Tenera", "MPOB Yangambi", "FELDA"],
    growth_stages: &["nursery", "immature", "young_mature", "prime_mature", "old_mature"],
    cycle_days: 365,
    yield_range: (15000.0, 25000.0),
    optimal_ph: (4.5, 6.5),
    optimal_moisture: (60.0, 80.0),
};

const RUBBER: CropProfile = CropProfile {
    varieties: &["RRIM 600", "RRIM 2020", "RRIM 3001", "PB 260", "GT 1"],
    growth_stages: &["immature", "young_tapping", "peak_production", "declining"],
    cycle_days: 365,
    yield_range: (1200.0, 2500.0),
    optimal_ph: (4.5, 6.0),
    optimal_moisture: (70.0, 85.0),
};

const DURIAN: CropProfile = CropProfile {
    varieties: &["Musang King", "D24", "Red Prawn", "IOI", "Tekka"],
    growth_stages: &["flowering", "fruit_set", "fruit_development", "ripening", "harvest"],
    cycle_days: 150,
    yield_range: (8000.0, 15000.0),
    optimal_ph: (6.0, 7.5),
    optimal_moisture: (70.0, 90.0),
};

const BANANA: CropProfile = CropProfile {
    varieties: &["Cavendish", "Pisang Mas", "Pisang Raja", "Berangan", "Rastali"],
    growth_stages: &["sucker", "vegetative", "flowering", "bunch_development", "harvest"],
    cycle_days: 300,
    yield_range: (20000.0, 40000.0),
    optimal_ph: (5.5, 7.0),
    optimal_moisture: (75.0, 85.0),
};

const COCONUT: CropProfile = CropProfile {
    varieties: &["Malayan Dwarf", "Malayan Tall", "MATAG", "MAWA", "Hybrid"],
    growth_stages: &["seedling", "juvenile", "flowering", "bearing", "mature"],
    cycle_days: 365,
    yield_range: (6000.0, 12000.0),
    optimal_ph: (5.2, 8.0),
    optimal_moisture: (60.0, 80.0),
};

impl CropKind {
    // ---
    pub const ALL: [CropKind; 6] = [
        CropKind::Rice,
        CropKind::PalmOil,
        CropKind::Rubber,
        CropKind::Durian,
        CropKind::Banana,
        CropKind::Coconut,
    ];

    pub fn profile(self) -> &'static CropProfile {
        match self {
            CropKind::Rice => &RICE,
            CropKind::PalmOil => &PALM_OIL,
            CropKind::Rubber => &RUBBER,
            CropKind::Durian => &DURIAN,
            CropKind::Banana => &BANANA,
            CropKind::Coconut => &COCONUT,
        }
    }

    /// Display name used in plot names.
    pub fn label(self) -> &'static str {
        match self {
            CropKind::Rice => "Rice",
            CropKind::PalmOil => "Palm Oil",
            CropKind::Rubber => "Rubber",
            CropKind::Durian => "Durian",
            CropKind::Banana => "Banana",
            CropKind::Coconut => "Coconut",
        }
    }
}

/// Growth stages at which a plot is being harvested.
pub fn is_harvest_stage(stage: &str) -> bool {
    matches!(stage, "maturity" | "harvest" | "ripening")
}
