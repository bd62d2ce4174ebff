//! The farm being monitored: its plots, their crops, machines and sensors.
//!
//! Every simulated sensor belongs to exactly one plot. Plot status and
//! irrigation are the only fields changed after startup; the weather
//! forecast is regenerated periodically by the feed.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::ForecastDay;

mod crop;
mod equipment;
mod generate;

pub use crop::{is_harvest_stage, CropKind, CropProfile};
pub use equipment::equipment_alerts;
pub use generate::{generate_farm, FarmLayout};

// ---

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlotStatus {
    Active,
    Maintenance,
    Harvesting,
    Idle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EquipmentKind {
    Irrigation,
    Tractor,
    Harvester,
    Drone,
    Sensor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EquipmentStatus {
    Operational,
    Maintenance,
    Idle,
    Repair,
}

/// A status string that names none of the known states.
#[derive(Debug, thiserror::Error)]
#[error("invalid status '{given}', expected one of: {expected}")]
pub struct InvalidStatus {
    given: String,
    expected: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Crop {
    // ---
    pub kind: CropKind,
    pub variety: String,
    pub planted_date: DateTime<Utc>,
    pub expected_harvest: DateTime<Utc>,
    pub growth_stage: String,
    /// Percent of the growth cycle elapsed.
    pub growth_progress: f64,
    /// Kilograms expected from the whole plot.
    pub yield_estimate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Equipment {
    // ---
    pub id: Uuid,
    pub name: String,
    pub kind: EquipmentKind,
    pub status: EquipmentStatus,
    pub location: Coordinates,
    pub operational_hours: f64,
    pub last_maintenance: DateTime<Utc>,
    /// Percent; only fuelled machines report one.
    pub fuel_level: Option<u32>,
    /// Percent.
    pub efficiency: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plot {
    // ---
    pub id: String,
    pub name: String,
    pub location: Coordinates,
    /// Hectares.
    pub area: f64,
    pub status: PlotStatus,
    pub crop: Crop,
    pub equipment: Vec<Equipment>,
    /// Ids of the sensors installed on this plot.
    pub sensors: Vec<String>,
    pub irrigation_status: bool,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Farm {
    // ---
    pub id: Uuid,
    pub name: String,
    pub location: String,
    pub coordinates: Coordinates,
    pub owner: String,
    /// Hectares, sum of plot areas.
    pub total_area: f64,
    pub plots: Vec<Plot>,
    pub established_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FarmSummary {
    // ---
    pub farm_name: String,
    pub location: String,
    pub total_plots: usize,
    pub active_plots: usize,
    pub total_area: f64,
    pub total_equipment: usize,
    pub total_sensors: usize,
    pub last_updated: DateTime<Utc>,
}

/// A machine listed together with the plot it works on.
#[derive(Debug, Clone, Serialize)]
pub struct EquipmentEntry {
    // ---
    #[serde(flatten)]
    pub equipment: Equipment,
    pub plot_id: String,
    pub plot_name: String,
}

impl PlotStatus {
    // ---
    pub fn as_str(self) -> &'static str {
        match self {
            PlotStatus::Active => "active",
            PlotStatus::Maintenance => "maintenance",
            PlotStatus::Harvesting => "harvesting",
            PlotStatus::Idle => "idle",
        }
    }
}

impl FromStr for PlotStatus {
    type Err = InvalidStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(PlotStatus::Active),
            "maintenance" => Ok(PlotStatus::Maintenance),
            "harvesting" => Ok(PlotStatus::Harvesting),
            "idle" => Ok(PlotStatus::Idle),
            _ => Err(InvalidStatus {
                given: s.to_string(),
                expected: "active, maintenance, harvesting, idle",
            }),
        }
    }
}

impl fmt::Display for PlotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl EquipmentKind {
    // ---
    pub const ALL: [EquipmentKind; 5] = [
        EquipmentKind::Irrigation,
        EquipmentKind::Tractor,
        EquipmentKind::Harvester,
        EquipmentKind::Drone,
        EquipmentKind::Sensor,
    ];

    /// Makes and models in service on Malaysian farms.
    pub fn models(self) -> &'static [&'static str] {
        match self {
            EquipmentKind::Irrigation => &[
                "Drip System",
                "Sprinkler System",
                "Flood Irrigation",
                "Smart Irrigation",
            ],
            EquipmentKind::Tractor => &[
                "Kubota M7040",
                "John Deere 5E",
                "Massey Ferguson 385",
                "New Holland TD5",
            ],
            EquipmentKind::Harvester => &["Rice Harvester", "Palm Oil Harvester", "Multi-crop Harvester"],
            EquipmentKind::Drone => &[
                "DJI Agras",
                "Yamaha RMAX",
                "AgEagle RX60",
                "PrecisionHawk Lancaster",
            ],
            EquipmentKind::Sensor => &[
                "Weather Station",
                "Soil Sensor",
                "Crop Monitor",
                "Water Level Sensor",
            ],
        }
    }

    /// Whether the machine runs on fuel and reports a fuel level.
    pub fn is_fuelled(self) -> bool {
        matches!(self, EquipmentKind::Tractor | EquipmentKind::Harvester)
    }
}

impl FromStr for EquipmentStatus {
    type Err = InvalidStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "operational" => Ok(EquipmentStatus::Operational),
            "maintenance" => Ok(EquipmentStatus::Maintenance),
            "idle" => Ok(EquipmentStatus::Idle),
            "repair" => Ok(EquipmentStatus::Repair),
            _ => Err(InvalidStatus {
                given: s.to_string(),
                expected: "operational, maintenance, idle, repair",
            }),
        }
    }
}

impl Farm {
    // ---
    pub fn plot(&self, plot_id: &str) -> Option<&Plot> {
        self.plots.iter().find(|p| p.id == plot_id)
    }

    fn plot_mut(&mut self, plot_id: &str) -> Option<&mut Plot> {
        self.plots.iter_mut().find(|p| p.id == plot_id)
    }

    /// Every machine on the farm, in plot order.
    pub fn equipment(&self) -> impl Iterator<Item = &Equipment> {
        self.plots.iter().flat_map(|p| &p.equipment)
    }

    pub fn summary(&self, now: DateTime<Utc>) -> FarmSummary {
        // ---
        FarmSummary {
            farm_name: self.name.clone(),
            location: self.location.clone(),
            total_plots: self.plots.len(),
            active_plots: self
                .plots
                .iter()
                .filter(|p| p.status == PlotStatus::Active)
                .count(),
            total_area: self.total_area,
            total_equipment: self.equipment().count(),
            total_sensors: self.plots.iter().map(|p| p.sensors.len()).sum(),
            last_updated: now,
        }
    }
}

/// Shared, mutable view of the farm and its weather outlook.
pub struct FarmRegistry {
    farm: RwLock<Farm>,
    forecast: RwLock<Vec<ForecastDay>>,
}

impl FarmRegistry {
    // ---
    pub fn new(farm: Farm) -> Self {
        FarmRegistry {
            farm: RwLock::new(farm),
            forecast: RwLock::new(Vec::new()),
        }
    }

    pub async fn farm(&self) -> Farm {
        self.farm.read().await.clone()
    }

    pub async fn plots(&self) -> Vec<Plot> {
        self.farm.read().await.plots.clone()
    }

    pub async fn plot(&self, plot_id: &str) -> Option<Plot> {
        self.farm.read().await.plot(plot_id).cloned()
    }

    pub async fn summary(&self, now: DateTime<Utc>) -> FarmSummary {
        self.farm.read().await.summary(now)
    }

    /// Set a plot's status. Returns the updated plot, or `None` if unknown.
    pub async fn set_status(
        &self,
        plot_id: &str,
        status: PlotStatus,
        at: DateTime<Utc>,
    ) -> Option<Plot> {
        // ---
        let mut farm = self.farm.write().await;
        let plot = farm.plot_mut(plot_id)?;
        plot.status = status;
        plot.last_updated = at;
        tracing::info!(plot_id, %status, "Plot status updated");
        Some(plot.clone())
    }

    /// Flip a plot's irrigation. Returns the new state, or `None` if unknown.
    pub async fn toggle_irrigation(&self, plot_id: &str, at: DateTime<Utc>) -> Option<bool> {
        // ---
        let mut farm = self.farm.write().await;
        let plot = farm.plot_mut(plot_id)?;
        plot.irrigation_status = !plot.irrigation_status;
        plot.last_updated = at;
        tracing::info!(plot_id, irrigation = plot.irrigation_status, "Irrigation toggled");
        Some(plot.irrigation_status)
    }

    /// All machines with their plot, optionally narrowed to one status.
    pub async fn equipment(&self, status: Option<EquipmentStatus>) -> Vec<EquipmentEntry> {
        // ---
        let farm = self.farm.read().await;
        farm.plots
            .iter()
            .flat_map(|plot| {
                plot.equipment.iter().map(move |eq| EquipmentEntry {
                    equipment: eq.clone(),
                    plot_id: plot.id.clone(),
                    plot_name: plot.name.clone(),
                })
            })
            .filter(|entry| status.map_or(true, |s| entry.equipment.status == s))
            .collect()
    }

    pub async fn forecast(&self) -> Vec<ForecastDay> {
        self.forecast.read().await.clone()
    }

    pub async fn set_forecast(&self, forecast: Vec<ForecastDay>) {
        *self.forecast.write().await = forecast;
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use chrono::TimeZone;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap()
    }

    fn registry() -> FarmRegistry {
        // ---
        let mut rng = StdRng::seed_from_u64(11);
        let layout = FarmLayout {
            plots: 3,
            sensors_per_plot: 2,
        };
        FarmRegistry::new(generate_farm(&mut rng, layout, now()))
    }

    #[test]
    fn test_status_parsing() {
        // ---
        assert_eq!("harvesting".parse::<PlotStatus>().unwrap(), PlotStatus::Harvesting);
        assert_eq!("repair".parse::<EquipmentStatus>().unwrap(), EquipmentStatus::Repair);

        let err = "flying".parse::<PlotStatus>().unwrap_err();
        assert!(err.to_string().contains("active, maintenance, harvesting, idle"));
    }

    #[tokio::test]
    async fn test_set_status_and_toggle_irrigation() {
        // ---
        let registry = registry();
        let later = now() + chrono::Duration::minutes(5);
        let before = registry.plot("plot-2").await.unwrap();

        let updated = registry
            .set_status("plot-2", PlotStatus::Idle, later)
            .await
            .unwrap();
        assert_eq!(updated.status, PlotStatus::Idle);
        assert_eq!(updated.last_updated, later);

        let irrigating = registry.toggle_irrigation("plot-2", later).await.unwrap();
        assert_eq!(irrigating, !before.irrigation_status);
        assert_eq!(registry.plot("plot-2").await.unwrap().irrigation_status, irrigating);
    }

    #[tokio::test]
    async fn test_unknown_plot_is_none() {
        // ---
        let registry = registry();
        assert!(registry.plot("plot-99").await.is_none());
        assert!(registry
            .set_status("plot-99", PlotStatus::Active, now())
            .await
            .is_none());
        assert!(registry.toggle_irrigation("plot-99", now()).await.is_none());
    }

    #[tokio::test]
    async fn test_summary_and_equipment_listing() {
        // ---
        let registry = registry();
        let farm = registry.farm().await;

        let summary = registry.summary(now()).await;
        assert_eq!(summary.total_plots, 3);
        assert_eq!(summary.total_sensors, 6);
        assert_eq!(summary.total_equipment, farm.equipment().count());

        let all = registry.equipment(None).await;
        assert_eq!(all.len(), summary.total_equipment);
        assert!(all.iter().all(|e| farm.plot(&e.plot_id).is_some()));

        let operational = registry.equipment(Some(EquipmentStatus::Operational)).await;
        assert!(operational
            .iter()
            .all(|e| e.equipment.status == EquipmentStatus::Operational));
    }

    #[tokio::test]
    async fn test_forecast_starts_empty() {
        // ---
        let registry = registry();
        assert!(registry.forecast().await.is_empty());
    }
}
