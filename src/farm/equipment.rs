//! Equipment health checks: overdue maintenance, low fuel, poor efficiency.

use chrono::{DateTime, Utc};

use super::Equipment;
use crate::models::{EquipmentAlert, EquipmentAlertKind, Severity};

// ---

/// Days between services before maintenance counts as overdue.
pub const MAINTENANCE_DUE_DAYS: i64 = 60;
/// Overdue past this many days since service is urgent.
pub const MAINTENANCE_URGENT_DAYS: i64 = 90;
pub const LOW_FUEL_PCT: u32 = 25;
pub const CRITICAL_FUEL_PCT: u32 = 15;
pub const LOW_EFFICIENCY_PCT: f64 = 80.0;

/// Check each machine; a machine may raise several alerts, in the order
/// maintenance, fuel, efficiency.
pub fn equipment_alerts<'a>(
    equipment: impl IntoIterator<Item = &'a Equipment>,
    now: DateTime<Utc>,
) -> Vec<EquipmentAlert> {
    // ---
    let mut alerts = Vec::new();

    for eq in equipment {
        let alert = |kind, severity, message: String, action: &str| EquipmentAlert {
            kind,
            severity,
            equipment_id: eq.id,
            equipment_name: eq.name.clone(),
            message,
            action_required: action.to_string(),
        };

        let since_service = now.signed_duration_since(eq.last_maintenance).num_days();
        if since_service > MAINTENANCE_DUE_DAYS {
            let severity = if since_service > MAINTENANCE_URGENT_DAYS {
                Severity::High
            } else {
                Severity::Medium
            };
            alerts.push(alert(
                EquipmentAlertKind::Maintenance,
                severity,
                format!(
                    "Maintenance overdue by {} days",
                    since_service - MAINTENANCE_DUE_DAYS
                ),
                "Schedule maintenance",
            ));
        }

        if let Some(fuel) = eq.fuel_level.filter(|f| *f < LOW_FUEL_PCT) {
            let severity = if fuel > CRITICAL_FUEL_PCT {
                Severity::Medium
            } else {
                Severity::High
            };
            alerts.push(alert(
                EquipmentAlertKind::Fuel,
                severity,
                format!("Low fuel level: {}%", fuel),
                "Refuel equipment",
            ));
        }

        if eq.efficiency < LOW_EFFICIENCY_PCT {
            alerts.push(alert(
                EquipmentAlertKind::Efficiency,
                Severity::Medium,
                format!("Low efficiency: {}%", eq.efficiency),
                "Check equipment performance",
            ));
        }
    }

    alerts
}
