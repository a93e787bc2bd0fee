//! Cross-reference checks between tables and definitions.
use bevy::prelude::*;

use super::{definitions::Definition, handle::RowHandle, manager::DataCatalog};

/// Problems found by [`DataCatalog::validate_integrity`].
#[derive(Debug, Clone, Default)]
pub struct IntegrityReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl IntegrityReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, message: String) {
        self.errors.push(message);
    }

    fn warning(&mut self, message: String) {
        self.warnings.push(message);
    }

    pub fn log(&self) {
        for warning in &self.warnings {
            warn!("Catalog: {}", warning);
        }
        for error in &self.errors {
            error!("Catalog: {}", error);
        }
        if self.is_valid() {
            info!(
                "Catalog integrity check passed ({} warnings)",
                self.warnings.len()
            );
        } else {
            error!(
                "Catalog integrity check failed: {} errors, {} warnings",
                self.errors.len(),
                self.warnings.len()
            );
        }
    }
}

impl DataCatalog {
    /// Checks every cross-table reference and the recipe sanity rules.
    pub fn validate_integrity(&self) -> IntegrityReport {
        let mut report = IntegrityReport::default();
        self.validate_recipes(&mut report);
        self.validate_upgrades(&mut report);
        self.validate_definitions(&mut report);
        report
    }

    fn validate_recipes(&self, report: &mut IntegrityReport) {
        for (name, recipe) in self.all_recipes() {
            if !self.is_valid_resource_reference(&recipe.output_resource) {
                report.error(format!(
                    "recipe '{}' outputs unknown resource {}",
                    name, recipe.output_resource
                ));
            }
            for input in &recipe.input_resources {
                if !self.is_valid_resource_reference(&input.resource) {
                    report.error(format!(
                        "recipe '{}' consumes unknown resource {}",
                        name, input.resource
                    ));
                }
            }
            if recipe.production_time <= 0.0 {
                report.error(format!(
                    "recipe '{}' has non-positive production time {:.2}",
                    name, recipe.production_time
                ));
            }
            if recipe.output_quantity == 0 {
                report.error(format!("recipe '{}' produces nothing", name));
            }
            if recipe.input_resources.is_empty() {
                report.warning(format!("recipe '{}' has no inputs", name));
            }
            self.check_upgrades(
                report,
                &format!("recipe '{}'", name),
                &recipe.required_upgrades,
            );
        }
    }

    fn validate_upgrades(&self, report: &mut IntegrityReport) {
        for (name, upgrade) in self.all_upgrades() {
            for requirement in &upgrade.prerequisites {
                if !self.is_valid_upgrade_reference(&requirement.required_upgrade) {
                    report.error(format!(
                        "upgrade '{}' requires unknown upgrade {}",
                        name, requirement.required_upgrade
                    ));
                }
            }
            for recipe in &upgrade.unlocks_recipes {
                if self.recipe(recipe).is_none() {
                    report.warning(format!(
                        "upgrade '{}' unlocks unknown recipe {}",
                        name, recipe
                    ));
                }
            }
        }
    }

    fn validate_definitions(&self, report: &mut IntegrityReport) {
        for deposit in self.deposit_definitions() {
            if !self.is_valid_resource_reference(&deposit.resource) {
                report.error(format!(
                    "deposit '{}' yields unknown resource {}",
                    deposit.deposit_name, deposit.resource
                ));
            }
            if deposit.deposit_levels.is_empty() {
                report.warning(format!("deposit '{}' has no levels", deposit.deposit_name));
            }
        }

        for demand in self.demand_definitions() {
            for entry in &demand.resource_demands {
                if !self.is_valid_resource_reference(&entry.resource) {
                    report.error(format!(
                        "demand '{}' wants unknown resource {}",
                        demand.demand_point_name, entry.resource
                    ));
                }
            }
        }

        for (name, route) in self.all_routes() {
            for hub in [&route.start_hub, &route.end_hub] {
                if self.hub_definition(hub).is_none() {
                    report.warning(format!("route '{}' references unknown hub '{}'", name, hub));
                }
            }
        }

        let set = self.definitions();
        self.check_definitions(report, &set.factories);
        self.check_definitions(report, &set.hubs);
        self.check_definitions(report, &set.vehicles);
        self.check_definitions(report, &set.roads);
        self.check_definitions(report, &set.deposits);
        self.check_definitions(report, &set.demands);
    }

    fn check_definitions<T: Definition>(
        &self,
        report: &mut IntegrityReport,
        items: &[std::sync::Arc<T>],
    ) {
        for item in items {
            self.check_upgrades(
                report,
                &format!("{} '{}'", T::KIND, item.display_name()),
                item.required_technologies(),
            );
        }
    }

    fn check_upgrades(&self, report: &mut IntegrityReport, owner: &str, upgrades: &[RowHandle]) {
        for handle in upgrades {
            if !self.is_valid_upgrade_reference(handle) {
                report.error(format!("{} requires unknown upgrade {}", owner, handle));
            }
        }
    }
}
