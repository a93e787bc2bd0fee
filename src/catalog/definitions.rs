//! Building, vehicle and deposit definitions loaded from `definitions.toml`.
use std::sync::Arc;

use serde::Deserialize;

use super::{errors::CatalogError, handle::RowHandle, rows::TransportType};

/// Shared behaviour for definitions looked up by display name.
pub trait Definition {
    const KIND: &'static str;

    fn display_name(&self) -> &str;

    /// Upgrades that must be researched before the definition is buildable.
    fn required_technologies(&self) -> &[RowHandle];
}

macro_rules! impl_definition {
    ($ty:ty, $kind:literal, $name:ident) => {
        impl Definition for $ty {
            const KIND: &'static str = $kind;

            fn display_name(&self) -> &str {
                &self.$name
            }

            fn required_technologies(&self) -> &[RowHandle] {
                &self.required_technologies
            }
        }
    };
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FactoryLevel {
    pub level: u32,
    pub production_speed_multiplier: f32,
    pub energy_consumption_multiplier: f32,
    pub max_input_storage: u32,
    pub max_output_storage: u32,
    pub upgrade_cost: f32,
    pub level_mesh: Option<String>,
}

impl Default for FactoryLevel {
    fn default() -> Self {
        Self {
            level: 1,
            production_speed_multiplier: 1.0,
            energy_consumption_multiplier: 1.0,
            max_input_storage: 100,
            max_output_storage: 100,
            upgrade_cost: 1000.0,
            level_mesh: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FactoryDefinition {
    pub factory_name: String,
    pub description: String,
    pub base_mesh: Option<String>,
    pub icon: Option<String>,
    pub supported_recipes: Vec<RowHandle>,
    pub factory_levels: Vec<FactoryLevel>,
    pub max_level: u32,
    pub build_cost: f32,
    pub base_energy_consumption: f32,
    pub requires_hub: bool,
    pub required_technologies: Vec<RowHandle>,
}

impl Default for FactoryDefinition {
    fn default() -> Self {
        Self {
            factory_name: "Default Factory".to_string(),
            description: String::new(),
            base_mesh: None,
            icon: None,
            supported_recipes: Vec::new(),
            factory_levels: Vec::new(),
            max_level: 5,
            build_cost: 1000.0,
            base_energy_consumption: 10.0,
            requires_hub: true,
            required_technologies: Vec::new(),
        }
    }
}

impl_definition!(FactoryDefinition, "factory", factory_name);

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HubLevel {
    pub level: u32,
    pub max_connections: u32,
    pub throughput_multiplier: f32,
    pub storage_capacity: u32,
    pub processing_speed: f32,
    pub upgrade_cost: f32,
    pub level_mesh: Option<String>,
}

impl Default for HubLevel {
    fn default() -> Self {
        Self {
            level: 1,
            max_connections: 2,
            throughput_multiplier: 1.0,
            storage_capacity: 500,
            processing_speed: 1.0,
            upgrade_cost: 500.0,
            level_mesh: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HubDefinition {
    pub hub_name: String,
    pub description: String,
    pub base_mesh: Option<String>,
    pub icon: Option<String>,
    pub hub_levels: Vec<HubLevel>,
    pub max_level: u32,
    pub build_cost: f32,
    pub base_storage_capacity: u32,
    pub base_processing_speed: f32,
    pub supported_transport_types: Vec<TransportType>,
    pub required_technologies: Vec<RowHandle>,
}

impl Default for HubDefinition {
    fn default() -> Self {
        Self {
            hub_name: "Basic Hub".to_string(),
            description: String::new(),
            base_mesh: None,
            icon: None,
            hub_levels: Vec::new(),
            max_level: 3,
            build_cost: 500.0,
            base_storage_capacity: 200,
            base_processing_speed: 1.0,
            supported_transport_types: Vec::new(),
            required_technologies: Vec::new(),
        }
    }
}

impl_definition!(HubDefinition, "hub", hub_name);

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VehicleDefinition {
    pub vehicle_name: String,
    pub description: String,
    pub transport_type: TransportType,
    pub vehicle_mesh: Option<String>,
    pub icon: Option<String>,
    pub max_speed: f32,
    pub cargo_capacity: u32,
    pub fuel_consumption: f32,
    pub loading_time: f32,
    pub unloading_time: f32,
    pub purchase_cost: f32,
    pub maintenance_cost: f32,
    /// Road definitions by display name.
    pub supported_road_types: Vec<String>,
    pub required_technologies: Vec<RowHandle>,
}

impl Default for VehicleDefinition {
    fn default() -> Self {
        Self {
            vehicle_name: "Basic Truck".to_string(),
            description: String::new(),
            transport_type: TransportType::Road,
            vehicle_mesh: None,
            icon: None,
            max_speed: 50.0,
            cargo_capacity: 20,
            fuel_consumption: 1.0,
            loading_time: 5.0,
            unloading_time: 5.0,
            purchase_cost: 2000.0,
            maintenance_cost: 10.0,
            supported_road_types: Vec::new(),
            required_technologies: Vec::new(),
        }
    }
}

impl_definition!(VehicleDefinition, "vehicle", vehicle_name);

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RoadDefinition {
    pub road_name: String,
    pub description: String,
    pub transport_type: TransportType,
    pub road_mesh: Option<String>,
    pub road_material: Option<String>,
    pub icon: Option<String>,
    pub max_speed: f32,
    pub speed_multiplier: f32,
    pub build_cost_per_unit: f32,
    pub maintenance_cost_per_unit: f32,
    pub durability: f32,
    pub weather_resistance: f32,
    pub required_technologies: Vec<RowHandle>,
}

impl Default for RoadDefinition {
    fn default() -> Self {
        Self {
            road_name: "Dirt Road".to_string(),
            description: String::new(),
            transport_type: TransportType::Road,
            road_mesh: None,
            road_material: None,
            icon: None,
            max_speed: 30.0,
            speed_multiplier: 1.0,
            build_cost_per_unit: 10.0,
            maintenance_cost_per_unit: 0.1,
            durability: 100.0,
            weather_resistance: 0.5,
            required_technologies: Vec::new(),
        }
    }
}

impl_definition!(RoadDefinition, "road", road_name);

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DepositLevel {
    pub level: u32,
    pub extraction_rate: f32,
    pub max_storage: u32,
    pub energy_consumption: f32,
    pub upgrade_cost: f32,
    pub level_mesh: Option<String>,
}

/// Used when a deposit sits on a level its definition does not describe.
pub static FALLBACK_DEPOSIT_LEVEL: DepositLevel = DepositLevel {
    level: 1,
    extraction_rate: 1.0,
    max_storage: 100,
    energy_consumption: 1.0,
    upgrade_cost: 1000.0,
    level_mesh: None,
};

impl Default for DepositLevel {
    fn default() -> Self {
        Self {
            level: 1,
            extraction_rate: 1.0,
            max_storage: 100,
            energy_consumption: 5.0,
            upgrade_cost: 500.0,
            level_mesh: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DepositDefinition {
    pub deposit_name: String,
    pub description: String,
    pub resource: RowHandle,
    pub base_mesh: Option<String>,
    pub icon: Option<String>,
    pub deposit_levels: Vec<DepositLevel>,
    pub max_level: u32,
    pub is_renewable: bool,
    pub base_extraction_rate: f32,
    pub total_reserves: u32,
    pub regeneration_rate: f32,
    pub build_cost: f32,
    pub requires_hub: bool,
    pub required_technologies: Vec<RowHandle>,
}

impl DepositDefinition {
    /// Level data for a 1-based level.
    pub fn level(&self, level: u32) -> Option<&DepositLevel> {
        let index = usize::try_from(level.checked_sub(1)?).ok()?;
        self.deposit_levels.get(index)
    }
}

impl Default for DepositDefinition {
    fn default() -> Self {
        Self {
            deposit_name: "Iron Ore Deposit".to_string(),
            description: String::new(),
            resource: RowHandle::default(),
            base_mesh: None,
            icon: None,
            deposit_levels: Vec::new(),
            max_level: 5,
            is_renewable: false,
            base_extraction_rate: 1.0,
            total_reserves: 10_000,
            regeneration_rate: 0.0,
            build_cost: 1000.0,
            requires_hub: true,
            required_technologies: Vec::new(),
        }
    }
}

impl_definition!(DepositDefinition, "deposit", deposit_name);

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ResourceDemand {
    pub resource: RowHandle,
    pub base_quantity: u32,
    pub price_per_unit: f32,
    pub priority: f32,
    pub seasonal_multiplier: f32,
}

impl Default for ResourceDemand {
    fn default() -> Self {
        Self {
            resource: RowHandle::default(),
            base_quantity: 10,
            price_per_unit: 100.0,
            priority: 1.0,
            seasonal_multiplier: 1.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DemandLevel {
    pub level: u32,
    pub demand_multiplier: f32,
    pub max_storage: u32,
    pub processing_speed: f32,
    pub upgrade_cost: f32,
    pub level_mesh: Option<String>,
}

impl Default for DemandLevel {
    fn default() -> Self {
        Self {
            level: 1,
            demand_multiplier: 1.0,
            max_storage: 500,
            processing_speed: 1.0,
            upgrade_cost: 1000.0,
            level_mesh: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DemandDefinition {
    pub demand_point_name: String,
    pub description: String,
    pub base_mesh: Option<String>,
    pub icon: Option<String>,
    pub resource_demands: Vec<ResourceDemand>,
    pub demand_levels: Vec<DemandLevel>,
    pub max_level: u32,
    pub build_cost: f32,
    pub base_processing_speed: f32,
    pub requires_hub: bool,
    pub demand_cycle_time: f32,
    pub base_payment_multiplier: f32,
    pub late_delivery_penalty: f32,
    pub required_technologies: Vec<RowHandle>,
}

impl Default for DemandDefinition {
    fn default() -> Self {
        Self {
            demand_point_name: "City".to_string(),
            description: String::new(),
            base_mesh: None,
            icon: None,
            resource_demands: Vec::new(),
            demand_levels: Vec::new(),
            max_level: 3,
            build_cost: 5000.0,
            base_processing_speed: 1.0,
            requires_hub: true,
            demand_cycle_time: 60.0,
            base_payment_multiplier: 1.0,
            late_delivery_penalty: 0.5,
            required_technologies: Vec::new(),
        }
    }
}

impl_definition!(DemandDefinition, "demand", demand_point_name);

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawDefinitions {
    factories: Vec<FactoryDefinition>,
    hubs: Vec<HubDefinition>,
    vehicles: Vec<VehicleDefinition>,
    roads: Vec<RoadDefinition>,
    deposits: Vec<DepositDefinition>,
    demands: Vec<DemandDefinition>,
}

/// Every definition kind, shared behind `Arc` so spawned entities can hold one.
#[derive(Debug, Clone, Default)]
pub struct DefinitionSet {
    pub factories: Vec<Arc<FactoryDefinition>>,
    pub hubs: Vec<Arc<HubDefinition>>,
    pub vehicles: Vec<Arc<VehicleDefinition>>,
    pub roads: Vec<Arc<RoadDefinition>>,
    pub deposits: Vec<Arc<DepositDefinition>>,
    pub demands: Vec<Arc<DemandDefinition>>,
}

impl DefinitionSet {
    pub fn from_toml(text: &str) -> Result<Self, CatalogError> {
        let raw: RawDefinitions = toml::from_str(text).map_err(|err| CatalogError::Parse {
            origin: "definitions".to_string(),
            message: err.to_string(),
        })?;

        Ok(Self {
            factories: share_unique(raw.factories)?,
            hubs: share_unique(raw.hubs)?,
            vehicles: share_unique(raw.vehicles)?,
            roads: share_unique(raw.roads)?,
            deposits: share_unique(raw.deposits)?,
            demands: share_unique(raw.demands)?,
        })
    }

    pub fn total(&self) -> usize {
        self.factories.len()
            + self.hubs.len()
            + self.vehicles.len()
            + self.roads.len()
            + self.deposits.len()
            + self.demands.len()
    }
}

fn share_unique<T: Definition>(items: Vec<T>) -> Result<Vec<Arc<T>>, CatalogError> {
    let mut shared: Vec<Arc<T>> = Vec::with_capacity(items.len());
    for item in items {
        if shared
            .iter()
            .any(|existing| existing.display_name() == item.display_name())
        {
            return Err(CatalogError::DuplicateDefinition {
                kind: T::KIND,
                name: item.display_name().to_string(),
            });
        }
        shared.push(Arc::new(item));
    }
    Ok(shared)
}

/// First definition whose display name matches exactly.
pub fn find_by_name<'a, T: Definition>(items: &'a [Arc<T>], name: &str) -> Option<&'a Arc<T>> {
    items.iter().find(|item| item.display_name() == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[[deposits]]
deposit_name = "Coal Seam"
resource = { table = "resources", row = "coal" }
total_reserves = 500

[[deposits.deposit_levels]]
level = 1
max_storage = 50

[[deposits.deposit_levels]]
level = 2
extraction_rate = 2.5
max_storage = 120

[[hubs]]
hub_name = "Depot"
supported_transport_types = ["road", "rail"]
"#;

    #[test]
    fn parses_definitions_with_defaults() {
        let set = DefinitionSet::from_toml(SAMPLE).unwrap();
        assert_eq!(set.total(), 2);

        let coal = &set.deposits[0];
        assert_eq!(coal.total_reserves, 500);
        assert_eq!(coal.max_level, 5);
        assert!(coal.requires_hub);
        assert_eq!(coal.level(2).map(|lvl| lvl.max_storage), Some(120));
        assert_eq!(coal.level(1).map(|lvl| lvl.energy_consumption), Some(5.0));
        assert!(coal.level(0).is_none());
        assert!(coal.level(3).is_none());

        assert_eq!(set.hubs[0].supported_transport_types.len(), 2);
        assert_eq!(set.hubs[0].base_storage_capacity, 200);
    }

    #[test]
    fn rejects_duplicate_display_names() {
        let text = "[[roads]]\nroad_name = \"Gravel\"\n[[roads]]\nroad_name = \"Gravel\"\n";
        let err = DefinitionSet::from_toml(text).unwrap_err();
        assert!(matches!(
            err,
            CatalogError::DuplicateDefinition { kind: "road", .. }
        ));
    }

    #[test]
    fn finds_definitions_by_display_name() {
        let set = DefinitionSet::from_toml(SAMPLE).unwrap();
        assert!(find_by_name(&set.hubs, "Depot").is_some());
        assert!(find_by_name(&set.hubs, "depot").is_none());
    }
}
