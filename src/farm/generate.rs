//! Randomized farm layout for a Malaysian smallholding or estate.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use uuid::Uuid;

use super::{
    is_harvest_stage, Coordinates, Crop, CropKind, Equipment, EquipmentKind, EquipmentStatus, Farm,
    Plot, PlotStatus,
};
use crate::conditions::round_half_away;

// ---

/// How many plots to lay out and how many sensors to install on each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FarmLayout {
    pub plots: u32,
    pub sensors_per_plot: u32,
}

struct Region {
    state: &'static str,
    name: &'static str,
    lat: f64,
    lng: f64,
    primary_crop: CropKind,
}

const REGIONS: [Region; 8] = [
    Region { state: "Kedah", name: "Kedah Rice Bowl", lat: 6.1254, lng: 100.3673, primary_crop: CropKind::Rice },
    Region { state: "Johor", name: "Johor Palm Estate", lat: 1.4927, lng: 103.7414, primary_crop: CropKind::PalmOil },
    Region { state: "Perak", name: "Perak Rubber Plantation", lat: 4.5921, lng: 101.0901, primary_crop: CropKind::Rubber },
    Region { state: "Pahang", name: "Pahang Durian Orchard", lat: 3.8126, lng: 103.3256, primary_crop: CropKind::Durian },
    Region { state: "Negeri Sembilan", name: "NS Mixed Farm", lat: 2.7297, lng: 101.9381, primary_crop: CropKind::Banana },
    Region { state: "Terengganu", name: "Terengganu Coconut Farm", lat: 5.3117, lng: 103.1324, primary_crop: CropKind::Coconut },
    Region { state: "Selangor", name: "Selangor Agro Park", lat: 3.0738, lng: 101.5183, primary_crop: CropKind::Rice },
    Region { state: "Melaka", name: "Melaka Heritage Farm", lat: 2.1896, lng: 102.2501, primary_crop: CropKind::Durian },
];

const OWNERS: [&str; 5] = [
    "Malaysian Agricultural Cooperative",
    "Federal Land Development Authority (FELDA)",
    "Sime Darby Plantation",
    "IOI Corporation",
    "Private Smallholder Cooperative",
];

/// Lay out a farm in a random region. Plots are `plot-1..=plot-N` and their
/// sensors `plot-N-sensor-M`.
pub fn generate_farm<R: Rng + ?Sized>(rng: &mut R, layout: FarmLayout, now: DateTime<Utc>) -> Farm {
    // ---
    let region = pick(rng, &REGIONS);

    let plots: Vec<Plot> = (1..=layout.plots)
        .map(|i| plot(&mut *rng, region, i, layout.sensors_per_plot, now))
        .collect();
    let total_area = round_half_away(plots.iter().map(|p| p.area).sum(), 2);

    Farm {
        id: Uuid::new_v4(),
        name: region.name.to_string(),
        location: format!("{}, Malaysia", region.state),
        coordinates: Coordinates {
            lat: region.lat,
            lng: region.lng,
        },
        owner: pick(rng, &OWNERS).to_string(),
        total_area,
        plots,
        established_date: now - Duration::days(365 * rng.gen_range(3..=25)),
    }
}

fn plot<R: Rng + ?Sized>(
    rng: &mut R,
    region: &Region,
    index: u32,
    sensor_count: u32,
    now: DateTime<Utc>,
) -> Plot {
    // ---
    let id = format!("plot-{index}");
    let area = round_half_away(rng.gen_range(0.5..=5.0), 2);
    // Most plots grow the region's staple.
    let kind = if rng.gen_bool(0.6) {
        region.primary_crop
    } else {
        *pick(rng, &CropKind::ALL)
    };
    let location = Coordinates {
        lat: region.lat + rng.gen_range(-0.01..=0.01),
        lng: region.lng + rng.gen_range(-0.01..=0.01),
    };

    let machine_count = rng.gen_range(1..=4);
    let equipment: Vec<Equipment> = (0..machine_count)
        .map(|_| machine(&mut *rng, location, now))
        .collect();
    let crop = crop(rng, kind, area, now);

    let status = if equipment.iter().any(|e| e.status == EquipmentStatus::Repair) {
        PlotStatus::Maintenance
    } else if is_harvest_stage(&crop.growth_stage) {
        PlotStatus::Harvesting
    } else if rng.gen_bool(0.8) {
        PlotStatus::Active
    } else {
        PlotStatus::Idle
    };

    Plot {
        name: format!("Plot {} - {}", index, kind.label()),
        sensors: (1..=sensor_count).map(|j| format!("{id}-sensor-{j}")).collect(),
        id,
        location,
        area,
        status,
        crop,
        equipment,
        irrigation_status: rng.gen_bool(0.5),
        last_updated: now,
    }
}

fn crop<R: Rng + ?Sized>(rng: &mut R, kind: CropKind, area: f64, now: DateTime<Utc>) -> Crop {
    // ---
    let profile = kind.profile();
    let days = rng.gen_range(10..=profile.cycle_days - 30);

    let stage_len = profile.cycle_days as f64 / profile.growth_stages.len() as f64;
    let stage = ((days as f64 / stage_len) as usize).min(profile.growth_stages.len() - 1);
    let growth_stage = profile.growth_stages[stage];

    let (low, high) = profile.yield_range;
    let maturity = if is_harvest_stage(growth_stage) {
        rng.gen_range(0.9..=1.1)
    } else {
        rng.gen_range(0.3..=0.8)
    };
    let yield_estimate = round_half_away(rng.gen_range(low..=high) * maturity * area, 0);

    let planted_date = now - Duration::days(days);
    Crop {
        kind,
        variety: pick(rng, profile.varieties).to_string(),
        planted_date,
        expected_harvest: planted_date + Duration::days(profile.cycle_days),
        growth_stage: growth_stage.to_string(),
        growth_progress: round_half_away(days as f64 / profile.cycle_days as f64 * 100.0, 1),
        yield_estimate,
    }
}

fn machine<R: Rng + ?Sized>(rng: &mut R, near: Coordinates, now: DateTime<Utc>) -> Equipment {
    // ---
    let kind = *pick(rng, &EquipmentKind::ALL);
    let status = match rng.gen::<f64>() {
        r if r < 0.70 => EquipmentStatus::Operational,
        r if r < 0.85 => EquipmentStatus::Maintenance,
        r if r < 0.95 => EquipmentStatus::Idle,
        _ => EquipmentStatus::Repair,
    };

    // Machines in for repair tend to be the older ones.
    let mut hours = rng.gen_range(100.0..=3000.0);
    if status == EquipmentStatus::Repair {
        hours += rng.gen_range(500.0..=1000.0);
    }

    let fuel_level = if kind.is_fuelled() {
        Some(rng.gen_range(20..=100))
    } else {
        None
    };

    Equipment {
        id: Uuid::new_v4(),
        name: pick(rng, kind.models()).to_string(),
        kind,
        status,
        location: Coordinates {
            lat: near.lat + rng.gen_range(-0.002..=0.002),
            lng: near.lng + rng.gen_range(-0.002..=0.002),
        },
        operational_hours: round_half_away(hours, 1),
        last_maintenance: now - Duration::days(rng.gen_range(1..=90)),
        fuel_level,
        efficiency: round_half_away(rng.gen_range(75.0..=98.0), 1),
    }
}

/// Uniform choice from a non-empty table.
fn pick<'a, R: Rng + ?Sized, T>(rng: &mut R, items: &'a [T]) -> &'a T {
    &items[rng.gen_range(0..items.len())]
}
