//! The `DataCatalog` resource: every table and definition plus the lookups
//! gameplay code runs against them.
use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use bevy::prelude::*;

use super::{
    definitions::{
        find_by_name, DefinitionSet, DemandDefinition, DepositDefinition, FactoryDefinition,
        HubDefinition, RoadDefinition, VehicleDefinition,
    },
    errors::CatalogError,
    handle::{RowHandle, TableId},
    rows::{
        ProductionRecipe, ResourceRow, ResourceType, TransportRoute, UpgradeCategory, UpgradeRow,
        UpgradeType,
    },
    table::DataTable,
};

pub const DEFAULT_CATALOG_DIR: &str = "config/catalog";

const RESOURCES_FILE: &str = "resources.json";
const RECIPES_FILE: &str = "recipes.json";
const ROUTES_FILE: &str = "routes.json";
const UPGRADES_FILE: &str = "upgrades.json";
const DEFINITIONS_FILE: &str = "definitions.toml";

const UNKNOWN_RESOURCE: &str = "Unknown Resource";
const UNKNOWN_RECIPE: &str = "Unknown Recipe";
const UNKNOWN_UPGRADE: &str = "Unknown Upgrade";

/// Raw text of every catalog source, before parsing.
#[derive(Debug, Clone, Copy, Default)]
pub struct CatalogSources<'a> {
    pub resources: &'a str,
    pub recipes: &'a str,
    pub routes: &'a str,
    pub upgrades: &'a str,
    pub definitions: &'a str,
}

#[derive(Resource, Debug, Clone)]
pub struct DataCatalog {
    source_dir: Option<PathBuf>,
    loaded: bool,
    resources: DataTable<ResourceRow>,
    recipes: DataTable<ProductionRecipe>,
    routes: DataTable<TransportRoute>,
    upgrades: DataTable<UpgradeRow>,
    definitions: DefinitionSet,
}

impl Default for DataCatalog {
    fn default() -> Self {
        Self {
            source_dir: None,
            loaded: false,
            resources: DataTable::empty(TableId::Resources),
            recipes: DataTable::empty(TableId::Recipes),
            routes: DataTable::empty(TableId::Routes),
            upgrades: DataTable::empty(TableId::Upgrades),
            definitions: DefinitionSet::default(),
        }
    }
}

impl DataCatalog {
    pub fn from_sources(sources: CatalogSources<'_>) -> Result<Self, CatalogError> {
        Ok(Self {
            source_dir: None,
            loaded: true,
            resources: DataTable::from_json(TableId::Resources, sources.resources)?,
            recipes: DataTable::from_json(TableId::Recipes, sources.recipes)?,
            routes: DataTable::from_json(TableId::Routes, sources.routes)?,
            upgrades: DataTable::from_json(TableId::Upgrades, sources.upgrades)?,
            definitions: DefinitionSet::from_toml(sources.definitions)?,
        })
    }

    pub fn load_from_dir(dir: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let dir = dir.as_ref();
        let resources = read_source(dir, RESOURCES_FILE)?;
        let recipes = read_source(dir, RECIPES_FILE)?;
        let routes = read_source(dir, ROUTES_FILE)?;
        let upgrades = read_source(dir, UPGRADES_FILE)?;
        let definitions = read_source(dir, DEFINITIONS_FILE)?;

        let mut catalog = Self::from_sources(CatalogSources {
            resources: &resources,
            recipes: &recipes,
            routes: &routes,
            upgrades: &upgrades,
            definitions: &definitions,
        })?;
        catalog.source_dir = Some(dir.to_path_buf());
        Ok(catalog)
    }

    /// Loads `dir`, or returns an unloaded catalog that still remembers `dir`
    /// so a later refresh can pick up fixed files.
    pub fn load_or_empty(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        match Self::load_from_dir(dir) {
            Ok(catalog) => catalog,
            Err(err) => {
                warn!(
                    "Failed to load catalog from {} ({}). Continuing without game data.",
                    dir.display(),
                    err
                );
                Self {
                    source_dir: Some(dir.to_path_buf()),
                    ..Self::default()
                }
            }
        }
    }

    /// Reloads from the source directory. The current contents stay in place on failure.
    pub fn refresh(&mut self) -> Result<(), CatalogError> {
        let dir = self
            .source_dir
            .clone()
            .ok_or(CatalogError::NoSourceDirectory)?;
        *self = Self::load_from_dir(dir)?;
        Ok(())
    }

    pub fn are_loaded(&self) -> bool {
        self.loaded
    }

    pub fn source_dir(&self) -> Option<&Path> {
        self.source_dir.as_deref()
    }

    // ---- resources ----

    pub fn resource(&self, handle: &RowHandle) -> Option<&ResourceRow> {
        lookup(&self.resources, handle)
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn all_resources(&self) -> impl Iterator<Item = (&str, &ResourceRow)> {
        self.resources.rows()
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn resources_by_type(&self, resource_type: ResourceType) -> Vec<&ResourceRow> {
        self.resources
            .rows()
            .map(|(_, row)| row)
            .filter(|row| row.resource_type == resource_type)
            .collect()
    }

    pub fn is_valid_resource_reference(&self, handle: &RowHandle) -> bool {
        self.resource(handle).is_some()
    }

    pub fn resource_name<'a>(&'a self, handle: &RowHandle) -> &'a str {
        self.resource(handle)
            .map(|row| row.resource_name.as_str())
            .unwrap_or(UNKNOWN_RESOURCE)
    }

    // ---- production ----

    pub fn recipe(&self, handle: &RowHandle) -> Option<&ProductionRecipe> {
        lookup(&self.recipes, handle)
    }

    pub fn all_recipes(&self) -> impl Iterator<Item = (&str, &ProductionRecipe)> {
        self.recipes.rows()
    }

    /// Recipes a factory lists as supported. Unresolved handles are skipped.
    #[cfg_attr(not(test), allow(dead_code))]
    pub fn recipes_for_factory(&self, factory: &FactoryDefinition) -> Vec<&ProductionRecipe> {
        factory
            .supported_recipes
            .iter()
            .filter_map(|handle| self.recipe(handle))
            .collect()
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn recipes_by_output(&self, output: &RowHandle) -> Vec<&ProductionRecipe> {
        self.recipes
            .rows()
            .map(|(_, recipe)| recipe)
            .filter(|recipe| recipe.output_resource == *output)
            .collect()
    }

    pub fn recipe_name<'a>(&'a self, handle: &RowHandle) -> &'a str {
        self.recipe(handle)
            .map(|row| row.recipe_name.as_str())
            .unwrap_or(UNKNOWN_RECIPE)
    }

    // ---- transport ----

    pub fn route(&self, handle: &RowHandle) -> Option<&TransportRoute> {
        lookup(&self.routes, handle)
    }

    pub fn all_routes(&self) -> impl Iterator<Item = (&str, &TransportRoute)> {
        self.routes.rows()
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn routes_from_hub(&self, hub: &HubDefinition) -> Vec<&TransportRoute> {
        self.routes
            .rows()
            .map(|(_, route)| route)
            .filter(|route| route.start_hub == hub.hub_name)
            .collect()
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn routes_to_hub(&self, hub: &HubDefinition) -> Vec<&TransportRoute> {
        self.routes
            .rows()
            .map(|(_, route)| route)
            .filter(|route| route.end_hub == hub.hub_name)
            .collect()
    }

    // ---- upgrades ----

    pub fn upgrade(&self, handle: &RowHandle) -> Option<&UpgradeRow> {
        lookup(&self.upgrades, handle)
    }

    pub fn all_upgrades(&self) -> impl Iterator<Item = (&str, &UpgradeRow)> {
        self.upgrades.rows()
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn upgrades_by_category(&self, category: UpgradeCategory) -> Vec<&UpgradeRow> {
        self.filter_upgrades(|row| row.upgrade_category == category)
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn upgrades_by_type(&self, upgrade_type: UpgradeType) -> Vec<&UpgradeRow> {
        self.filter_upgrades(|row| row.upgrade_type == upgrade_type)
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn upgrades_by_tech_level(&self, tech_level: u32) -> Vec<&UpgradeRow> {
        self.filter_upgrades(|row| row.tech_level == tech_level)
    }

    #[cfg_attr(not(test), allow(dead_code))]
    fn filter_upgrades(&self, keep: impl Fn(&UpgradeRow) -> bool) -> Vec<&UpgradeRow> {
        self.upgrades
            .rows()
            .map(|(_, row)| row)
            .filter(|row| keep(row))
            .collect()
    }

    pub fn is_valid_upgrade_reference(&self, handle: &RowHandle) -> bool {
        self.upgrade(handle).is_some()
    }

    pub fn upgrade_name<'a>(&'a self, handle: &RowHandle) -> &'a str {
        self.upgrade(handle)
            .map(|row| row.upgrade_name.as_str())
            .unwrap_or(UNKNOWN_UPGRADE)
    }

    /// Every non-optional prerequisite of `upgrade` must appear in `completed`.
    #[cfg_attr(not(test), allow(dead_code))]
    pub fn are_upgrade_prerequisites_met(
        &self,
        upgrade: &RowHandle,
        completed: &[RowHandle],
    ) -> bool {
        let Some(row) = self.upgrade(upgrade) else {
            return false;
        };

        row.prerequisites.iter().all(|requirement| {
            requirement.is_optional || completed.contains(&requirement.required_upgrade)
        })
    }

    // ---- definitions ----

    pub fn definitions(&self) -> &DefinitionSet {
        &self.definitions
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn factory_definitions(&self) -> &[Arc<FactoryDefinition>] {
        &self.definitions.factories
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn hub_definitions(&self) -> &[Arc<HubDefinition>] {
        &self.definitions.hubs
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn vehicle_definitions(&self) -> &[Arc<VehicleDefinition>] {
        &self.definitions.vehicles
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn road_definitions(&self) -> &[Arc<RoadDefinition>] {
        &self.definitions.roads
    }

    pub fn deposit_definitions(&self) -> &[Arc<DepositDefinition>] {
        &self.definitions.deposits
    }

    pub fn demand_definitions(&self) -> &[Arc<DemandDefinition>] {
        &self.definitions.demands
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn factory_definition(&self, name: &str) -> Option<&Arc<FactoryDefinition>> {
        find_by_name(&self.definitions.factories, name)
    }

    pub fn hub_definition(&self, name: &str) -> Option<&Arc<HubDefinition>> {
        find_by_name(&self.definitions.hubs, name)
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn vehicle_definition(&self, name: &str) -> Option<&Arc<VehicleDefinition>> {
        find_by_name(&self.definitions.vehicles, name)
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn road_definition(&self, name: &str) -> Option<&Arc<RoadDefinition>> {
        find_by_name(&self.definitions.roads, name)
    }

    pub fn deposit_definition(&self, name: &str) -> Option<&Arc<DepositDefinition>> {
        find_by_name(&self.definitions.deposits, name)
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn demand_definition(&self, name: &str) -> Option<&Arc<DemandDefinition>> {
        find_by_name(&self.definitions.demands, name)
    }

    // ---- reverse lookups by display name ----

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn find_resource_reference_by_name(&self, display_name: &str) -> Option<RowHandle> {
        self.resources
            .rows()
            .find(|(_, row)| row.resource_name == display_name)
            .map(|(name, _)| RowHandle::resource(name))
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn find_recipe_reference_by_name(&self, display_name: &str) -> Option<RowHandle> {
        self.recipes
            .rows()
            .find(|(_, row)| row.recipe_name == display_name)
            .map(|(name, _)| RowHandle::recipe(name))
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn find_upgrade_reference_by_name(&self, display_name: &str) -> Option<RowHandle> {
        self.upgrades
            .rows()
            .find(|(_, row)| row.upgrade_name == display_name)
            .map(|(name, _)| RowHandle::upgrade(name))
    }

    // ---- debug output ----

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn log_all_resources(&self) {
        info!("=== Resources ({}) ===", self.resources.len());
        for (name, row) in self.resources.rows() {
            info!(
                "  {} ({}): {:?}, value {:.1}, stack {}",
                row.resource_name, name, row.resource_type, row.base_value, row.max_stack
            );
        }
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn log_all_recipes(&self) {
        info!("=== Recipes ({}) ===", self.recipes.len());
        for (name, recipe) in self.recipes.rows() {
            info!(
                "  {} ({}): {} x{} in {:.1}s from {} inputs",
                recipe.recipe_name,
                name,
                self.resource_name(&recipe.output_resource),
                recipe.output_quantity,
                recipe.production_time,
                recipe.input_resources.len()
            );
        }
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn log_all_upgrades(&self) {
        info!("=== Upgrades ({}) ===", self.upgrades.len());
        for (name, upgrade) in self.upgrades.rows() {
            info!(
                "  {} ({}): {:?}/{:?}, tier {}, cost {:.0}",
                upgrade.upgrade_name,
                name,
                upgrade.upgrade_category,
                upgrade.upgrade_type,
                upgrade.tech_level,
                upgrade.research_cost
            );
        }
    }

    pub fn log_statistics(&self) {
        info!(
            "Catalog: {} resources, {} recipes, {} routes, {} upgrades, {} definitions",
            self.resources.len(),
            self.recipes.len(),
            self.routes.len(),
            self.upgrades.len(),
            self.definitions.total()
        );
        info!(
            "  factories {}, hubs {}, vehicles {}, roads {}, deposits {}, demands {}",
            self.definitions.factories.len(),
            self.definitions.hubs.len(),
            self.definitions.vehicles.len(),
            self.definitions.roads.len(),
            self.definitions.deposits.len(),
            self.definitions.demands.len()
        );
    }
}

fn lookup<'a, R>(table: &'a DataTable<R>, handle: &RowHandle) -> Option<&'a R> {
    if !handle.points_to(table.id()) {
        return None;
    }
    table.get(&handle.row)
}

fn read_source(dir: &Path, file: &str) -> Result<String, CatalogError> {
    let path = dir.join(file);
    fs::read_to_string(&path).map_err(|err| CatalogError::Read {
        path,
        message: err.to_string(),
    })
}

#[cfg(test)]
pub(crate) mod test_data {
    use super::*;

    pub const RESOURCES: &str = r#"[
        {"name": "iron_ore", "resource_name": "Iron Ore", "base_value": 2},
        {"name": "coal", "resource_name": "Coal"},
        {"name": "steel", "resource_name": "Steel", "resource_type": "intermediate"},
        {"name": "wheat", "resource_name": "Wheat", "is_renewable": true}
    ]"#;

    pub const RECIPES: &str = r#"[
        {
            "name": "smelt_steel",
            "recipe_name": "Smelt Steel",
            "input_resources": [
                {"resource": {"table": "resources", "row": "iron_ore"}, "quantity": 2},
                {"resource": {"table": "resources", "row": "coal"}}
            ],
            "output_resource": {"table": "resources", "row": "steel"},
            "required_upgrades": [{"table": "upgrades", "row": "smelting"}]
        }
    ]"#;

    pub const ROUTES: &str = r#"[
        {"name": "north_south", "start_hub": "North Depot", "end_hub": "South Depot", "distance": 1200}
    ]"#;

    pub const UPGRADES: &str = r#"[
        {"name": "smelting", "upgrade_name": "Smelting"},
        {
            "name": "alloys",
            "upgrade_name": "Alloys",
            "upgrade_category": "process",
            "tech_level": 2,
            "prerequisites": [
                {"required_upgrade": {"table": "upgrades", "row": "smelting"}},
                {"required_upgrade": {"table": "upgrades", "row": "automation"}, "is_optional": true}
            ]
        }
    ]"#;

    pub const DEFINITIONS: &str = r#"
[[factories]]
factory_name = "Steel Mill"
supported_recipes = [
    { table = "recipes", row = "smelt_steel" },
    { table = "recipes", row = "missing" },
]

[[hubs]]
hub_name = "North Depot"

[[hubs]]
hub_name = "South Depot"

[[deposits]]
deposit_name = "Iron Ore Deposit"
resource = { table = "resources", row = "iron_ore" }
total_reserves = 1000

[[deposits.deposit_levels]]
level = 1
extraction_rate = 2.0
max_storage = 100

[[deposits.deposit_levels]]
level = 2
extraction_rate = 4.0
max_storage = 200
level_mesh = "meshes/iron_mine_2.glb"

[[deposits]]
deposit_name = "Wheat Farm"
resource = { table = "resources", row = "wheat" }
is_renewable = true
regeneration_rate = 1.0

[[deposits.deposit_levels]]
level = 1
extraction_rate = 3.0
max_storage = 50
"#;

    pub fn sample_catalog() -> DataCatalog {
        DataCatalog::from_sources(CatalogSources {
            resources: RESOURCES,
            recipes: RECIPES,
            routes: ROUTES,
            upgrades: UPGRADES,
            definitions: DEFINITIONS,
        })
        .expect("sample catalog parses")
    }
}

#[cfg(test)]
mod tests {
    use super::test_data::sample_catalog;
    use super::*;

    #[test]
    fn default_catalog_is_not_loaded() {
        let catalog = DataCatalog::default();
        assert!(!catalog.are_loaded());
        assert_eq!(
            catalog.resource_name(&RowHandle::resource("iron_ore")),
            UNKNOWN_RESOURCE
        );
    }

    #[test]
    fn resolves_handles_only_in_their_own_table() {
        let catalog = sample_catalog();
        assert!(catalog.are_loaded());
        assert_eq!(
            catalog.resource_name(&RowHandle::resource("iron_ore")),
            "Iron Ore"
        );
        assert!(catalog.resource(&RowHandle::recipe("iron_ore")).is_none());
        assert!(!catalog.is_valid_resource_reference(&RowHandle::default()));
        assert_eq!(catalog.recipe_name(&RowHandle::recipe("nope")), UNKNOWN_RECIPE);
        assert_eq!(catalog.upgrade_name(&RowHandle::upgrade("alloys")), "Alloys");
    }

    #[test]
    fn filters_by_type_and_output() {
        let catalog = sample_catalog();
        assert_eq!(catalog.resources_by_type(ResourceType::RawMaterial).len(), 3);
        assert_eq!(catalog.resources_by_type(ResourceType::Intermediate).len(), 1);
        assert_eq!(
            catalog
                .recipes_by_output(&RowHandle::resource("steel"))
                .len(),
            1
        );
        assert!(catalog
            .recipes_by_output(&RowHandle::resource("coal"))
            .is_empty());
        assert_eq!(catalog.upgrades_by_category(UpgradeCategory::Process).len(), 1);
        assert_eq!(catalog.upgrades_by_tech_level(1).len(), 1);
        assert_eq!(catalog.upgrades_by_type(UpgradeType::ProductionSpeed).len(), 2);
    }

    #[test]
    fn factory_recipes_skip_unresolved_handles() {
        let catalog = sample_catalog();
        let mill = catalog.factory_definition("Steel Mill").unwrap();
        let recipes = catalog.recipes_for_factory(mill);
        assert_eq!(recipes.len(), 1);
        assert_eq!(recipes[0].recipe_name, "Smelt Steel");
    }

    #[test]
    fn routes_match_hub_names() {
        let catalog = sample_catalog();
        let north = catalog.hub_definition("North Depot").unwrap();
        let south = catalog.hub_definition("South Depot").unwrap();
        assert_eq!(catalog.routes_from_hub(north).len(), 1);
        assert!(catalog.routes_to_hub(north).is_empty());
        assert_eq!(catalog.routes_to_hub(south).len(), 1);
        assert_eq!(catalog.all_routes().count(), 1);
    }

    #[test]
    fn prerequisites_respect_optional_entries() {
        let catalog = sample_catalog();
        let alloys = RowHandle::upgrade("alloys");
        assert!(!catalog.are_upgrade_prerequisites_met(&alloys, &[]));
        assert!(catalog.are_upgrade_prerequisites_met(&alloys, &[RowHandle::upgrade("smelting")]));
        assert!(catalog.are_upgrade_prerequisites_met(&RowHandle::upgrade("smelting"), &[]));
        assert!(!catalog.are_upgrade_prerequisites_met(&RowHandle::upgrade("unknown"), &[]));
    }

    #[test]
    fn reverse_lookups_return_handles() {
        let catalog = sample_catalog();
        assert_eq!(
            catalog.find_resource_reference_by_name("Coal"),
            Some(RowHandle::resource("coal"))
        );
        assert_eq!(
            catalog.find_recipe_reference_by_name("Smelt Steel"),
            Some(RowHandle::recipe("smelt_steel"))
        );
        assert_eq!(
            catalog.find_upgrade_reference_by_name("Smelting"),
            Some(RowHandle::upgrade("smelting"))
        );
        assert!(catalog.find_resource_reference_by_name("Gold").is_none());
    }

    #[test]
    fn refresh_without_source_directory_fails() {
        let mut catalog = sample_catalog();
        assert!(matches!(
            catalog.refresh(),
            Err(CatalogError::NoSourceDirectory)
        ));
        assert!(catalog.are_loaded());
    }

    #[test]
    fn missing_directory_yields_unloaded_catalog() {
        let catalog = DataCatalog::load_or_empty("does/not/exist");
        assert!(!catalog.are_loaded());
        assert_eq!(catalog.source_dir(), Some(Path::new("does/not/exist")));
    }

    #[test]
    fn shipped_catalog_loads_cleanly() {
        let catalog = DataCatalog::load_from_dir(DEFAULT_CATALOG_DIR).unwrap();
        assert_eq!(catalog.deposit_definitions().len(), 6);
        let report = catalog.validate_integrity();
        assert!(report.is_valid(), "unexpected errors: {:?}", report.errors);
        assert!(report.warnings.is_empty(), "unexpected warnings: {:?}", report.warnings);
    }
}
