//! Row types for the resource, recipe, route and upgrade tables.
use bevy::color::Color;
use serde::Deserialize;

use super::handle::RowHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    None,
    #[default]
    RawMaterial,
    Intermediate,
    FinalProduct,
    Energy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportType {
    None,
    #[default]
    Road,
    Rail,
    Water,
    Air,
    Pipeline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpgradeCategory {
    None,
    #[default]
    Technology,
    Equipment,
    Process,
    Automation,
    Efficiency,
    Quality,
    Safety,
    Environmental,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpgradeType {
    None,
    #[default]
    ProductionSpeed,
    EnergyEfficiency,
    QualityImprovement,
    NewRecipe,
    StorageIncrease,
    AutomationLevel,
    SafetyProtocol,
    WasteReduction,
}

/// A raw material, intermediate or product that moves through the network.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ResourceRow {
    pub resource_name: String,
    pub description: String,
    pub resource_type: ResourceType,
    /// Linear RGBA.
    pub resource_color: [f32; 4],
    pub icon: Option<String>,
    pub max_stack: u32,
    pub base_value: f32,
    pub weight: f32,
    pub is_renewable: bool,
}

impl ResourceRow {
    pub fn color(&self) -> Color {
        let [r, g, b, a] = self.resource_color;
        Color::linear_rgba(r, g, b, a)
    }
}

impl Default for ResourceRow {
    fn default() -> Self {
        Self {
            resource_name: "Default Resource".to_string(),
            description: String::new(),
            resource_type: ResourceType::RawMaterial,
            resource_color: [1.0, 1.0, 1.0, 1.0],
            icon: None,
            max_stack: 100,
            base_value: 1.0,
            weight: 1.0,
            is_renewable: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ResourceRequirement {
    pub resource: RowHandle,
    pub quantity: u32,
}

impl Default for ResourceRequirement {
    fn default() -> Self {
        Self {
            resource: RowHandle::default(),
            quantity: 1,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProductionRecipe {
    pub recipe_name: String,
    pub description: String,
    pub input_resources: Vec<ResourceRequirement>,
    pub output_resource: RowHandle,
    pub output_quantity: u32,
    pub production_time: f32,
    pub energy_required: f32,
    pub factory_level: u32,
    pub required_upgrades: Vec<RowHandle>,
}

impl Default for ProductionRecipe {
    fn default() -> Self {
        Self {
            recipe_name: "Default Recipe".to_string(),
            description: String::new(),
            input_resources: Vec::new(),
            output_resource: RowHandle::default(),
            output_quantity: 1,
            production_time: 10.0,
            energy_required: 0.0,
            factory_level: 1,
            required_upgrades: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CargoItem {
    pub resource: RowHandle,
    pub quantity: u32,
}

/// A link between two hubs. Hubs, vehicles and roads are named by their
/// definition's display name.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TransportRoute {
    pub start_hub: String,
    pub end_hub: String,
    pub transport_type: TransportType,
    pub distance: f32,
    pub max_throughput: u32,
    pub current_load: u32,
    pub vehicle: Option<String>,
    pub road: Option<String>,
    pub is_active: bool,
    pub cargo_items: Vec<CargoItem>,
}

impl Default for TransportRoute {
    fn default() -> Self {
        Self {
            start_hub: String::new(),
            end_hub: String::new(),
            transport_type: TransportType::Road,
            distance: 0.0,
            max_throughput: 100,
            current_load: 0,
            vehicle: None,
            road: None,
            is_active: true,
            cargo_items: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpgradeRequirement {
    pub required_upgrade: RowHandle,
    pub is_optional: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UpgradeEffect {
    pub effect_name: String,
    pub effect_value: f32,
    pub is_percentage: bool,
    pub is_additive: bool,
    pub effect_description: String,
}

impl Default for UpgradeEffect {
    fn default() -> Self {
        Self {
            effect_name: "Default Effect".to_string(),
            effect_value: 0.0,
            is_percentage: false,
            is_additive: true,
            effect_description: String::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UpgradeRow {
    pub upgrade_name: String,
    pub description: String,
    pub upgrade_category: UpgradeCategory,
    pub upgrade_type: UpgradeType,
    pub icon: Option<String>,
    pub research_cost: f32,
    pub research_time: f32,
    pub tech_level: u32,
    pub prerequisites: Vec<UpgradeRequirement>,
    pub effects: Vec<UpgradeEffect>,
    pub is_repeatable: bool,
    pub max_repeat_count: u32,
    pub unlock_level: u32,
    pub unlocks_buildings: Vec<String>,
    pub unlocks_recipes: Vec<RowHandle>,
}

impl Default for UpgradeRow {
    fn default() -> Self {
        Self {
            upgrade_name: "Default Upgrade".to_string(),
            description: String::new(),
            upgrade_category: UpgradeCategory::Technology,
            upgrade_type: UpgradeType::ProductionSpeed,
            icon: None,
            research_cost: 1000.0,
            research_time: 60.0,
            tech_level: 1,
            prerequisites: Vec::new(),
            effects: Vec::new(),
            is_repeatable: false,
            max_repeat_count: 1,
            unlock_level: 1,
            unlocks_buildings: Vec::new(),
            unlocks_recipes: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_row_defaults() {
        let row: ResourceRow = serde_json::from_str(r#"{"resource_name": "Iron Ore"}"#).unwrap();
        assert_eq!(row.resource_name, "Iron Ore");
        assert_eq!(row.max_stack, 100);
        assert_eq!(row.resource_type, ResourceType::RawMaterial);
        assert!(!row.is_renewable);

        let recipe: ProductionRecipe = serde_json::from_str("{}").unwrap();
        assert_eq!(recipe.output_quantity, 1);
        assert_eq!(recipe.production_time, 10.0);

        let route: TransportRoute = serde_json::from_str(r#"{"start_hub": "North"}"#).unwrap();
        assert!(route.is_active);
        assert_eq!(route.max_throughput, 100);
    }

    #[test]
    fn nested_lists_fill_defaults() {
        let upgrade: UpgradeRow = serde_json::from_str(
            r#"{
                "upgrade_category": "automation",
                "prerequisites": [{"required_upgrade": {"table": "upgrades", "row": "basics"}}],
                "effects": [{"effect_value": 0.25, "is_percentage": true}]
            }"#,
        )
        .unwrap();

        assert_eq!(upgrade.upgrade_category, UpgradeCategory::Automation);
        assert!(!upgrade.prerequisites[0].is_optional);
        assert_eq!(upgrade.effects[0].effect_name, "Default Effect");
        assert!(upgrade.effects[0].is_additive);
        assert_eq!(upgrade.research_cost, 1000.0);
    }
}
