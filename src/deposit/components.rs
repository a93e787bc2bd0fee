//! Resource deposit component: reserves, levels, extraction and regeneration.
use std::sync::Arc;

use bevy::prelude::*;

use crate::catalog::{DepositDefinition, DepositLevel, RowHandle, FALLBACK_DEPOSIT_LEVEL};
use crate::storage::ResourceStorage;

use super::errors::DepositError;

const DEFAULT_TICK_RATE: f32 = 1.0;
const UNKNOWN_DEPOSIT: &str = "Unknown Deposit";

/// Asset path of the mesh a deposit should currently show.
#[derive(Component, Debug, Clone, Default, PartialEq, Eq)]
pub struct DepositAppearance {
    pub mesh: Option<String>,
}

/// Things that happened to a deposit since its last publish.
#[derive(Debug, Clone, PartialEq)]
pub enum DepositNotice {
    Extracted { resource: RowHandle, amount: u32 },
    Depleted,
    LevelChanged { level: u32 },
}

/// A placed natural resource. Extracted goods land in the sibling
/// [`ResourceStorage`], which every operation takes explicitly.
#[derive(Component, Debug, Clone)]
#[require(ResourceStorage, DepositAppearance, Transform)]
pub struct ResourceDeposit {
    definition: Option<Arc<DepositDefinition>>,
    current_level: u32,
    current_reserves: u32,
    last_extraction_time: f32,
    pub auto_extract_to_storage: bool,
    /// Seconds between automatic extractions.
    pub extraction_tick_rate: f32,
    pub show_debug_info: bool,
    connected_hub: Option<Entity>,
    extraction_elapsed: f32,
    regeneration_carry: f32,
    pending: Vec<DepositNotice>,
}

impl Default for ResourceDeposit {
    fn default() -> Self {
        Self {
            definition: None,
            current_level: 1,
            current_reserves: 0,
            last_extraction_time: 0.0,
            auto_extract_to_storage: true,
            extraction_tick_rate: DEFAULT_TICK_RATE,
            show_debug_info: false,
            connected_hub: None,
            extraction_elapsed: 0.0,
            regeneration_carry: 0.0,
            pending: Vec::new(),
        }
    }
}

impl ResourceDeposit {
    /// Builds a deposit already initialized from `definition`.
    pub fn from_definition(
        definition: Arc<DepositDefinition>,
        level: u32,
        storage: &mut ResourceStorage,
    ) -> Self {
        let mut deposit = Self::default();
        deposit.initialize_from_spawn(definition, level, storage);
        deposit
    }

    /// Resets reserves and level and sizes the storage for level one.
    pub fn initialize_with_definition(
        &mut self,
        definition: Arc<DepositDefinition>,
        storage: &mut ResourceStorage,
    ) {
        self.current_reserves = definition.total_reserves;
        self.current_level = 1;
        self.extraction_elapsed = 0.0;
        self.regeneration_carry = 0.0;
        storage.set_resource_type(definition.resource.clone());
        self.definition = Some(definition);
        storage.set_max_capacity(self.max_storage());
    }

    /// Like [`Self::initialize_with_definition`], then applies `level` if the
    /// definition allows it.
    pub fn initialize_from_spawn(
        &mut self,
        definition: Arc<DepositDefinition>,
        level: u32,
        storage: &mut ResourceStorage,
    ) {
        let max_level = definition.max_level;
        self.initialize_with_definition(definition, storage);
        if level > 1 && level <= max_level {
            self.current_level = level;
            storage.set_max_capacity(self.max_storage());
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.definition.is_some()
    }

    pub fn definition(&self) -> Option<&Arc<DepositDefinition>> {
        self.definition.as_ref()
    }

    /// Takes up to `requested` units and returns how many were taken.
    ///
    /// Non-renewable deposits draw on their reserves. Renewable deposits draw
    /// on whatever has accumulated in `storage`.
    pub fn extract_resource(
        &mut self,
        requested: u32,
        storage: &mut ResourceStorage,
        now: f32,
    ) -> u32 {
        if requested == 0 || !self.is_initialized() || self.is_depleted() {
            return 0;
        }

        let resource = self.resource_type();
        let wanted = requested.min(self.available_resource(storage));
        let taken = if self.is_renewable() {
            storage.remove_resource(&resource, wanted)
        } else {
            self.current_reserves -= wanted;
            wanted
        };
        if taken == 0 {
            return 0;
        }

        self.last_extraction_time = now;
        self.pending.push(DepositNotice::Extracted {
            resource,
            amount: taken,
        });
        self.check_depletion();
        taken
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn can_extract_resource(&self, requested: u32, storage: &ResourceStorage) -> bool {
        self.is_initialized()
            && !self.is_depleted()
            && requested > 0
            && self.available_resource(storage) >= requested
    }

    /// Units per second at the current level.
    pub fn current_extraction_rate(&self) -> f32 {
        if !self.is_initialized() {
            return 0.0;
        }
        self.level_data().extraction_rate
    }

    pub fn available_resource(&self, storage: &ResourceStorage) -> u32 {
        if self.is_renewable() {
            storage.current_amount(&self.resource_type())
        } else {
            self.current_reserves
        }
    }

    pub fn max_storage(&self) -> u32 {
        if !self.is_initialized() {
            return 0;
        }
        self.level_data().max_storage
    }

    pub fn current_level(&self) -> u32 {
        self.current_level
    }

    pub fn max_level(&self) -> u32 {
        self.definition.as_ref().map_or(1, |def| def.max_level)
    }

    pub fn can_upgrade_to_level(&self, target: u32) -> bool {
        let Some(definition) = &self.definition else {
            return false;
        };
        target > self.current_level
            && target <= definition.max_level
            && definition.level(target).is_some()
    }

    pub fn upgrade_to_level(
        &mut self,
        target: u32,
        storage: &mut ResourceStorage,
    ) -> Result<(), DepositError> {
        if !self.is_initialized() {
            return Err(DepositError::NotInitialized);
        }
        if !self.can_upgrade_to_level(target) {
            return Err(DepositError::InvalidLevel {
                requested: target,
                current: self.current_level,
                max: self.max_level(),
            });
        }

        self.current_level = target;
        storage.set_max_capacity(self.max_storage());
        self.pending
            .push(DepositNotice::LevelChanged { level: target });
        Ok(())
    }

    /// Cost of moving to `target`, or `None` when that upgrade is not allowed.
    pub fn upgrade_cost(&self, target: u32) -> Option<f32> {
        if !self.can_upgrade_to_level(target) {
            return None;
        }
        self.definition
            .as_ref()?
            .level(target)
            .map(|level| level.upgrade_cost)
    }

    /// Current level's data, or the fallback level when the definition has no
    /// entry for it.
    pub fn level_data(&self) -> &DepositLevel {
        self.definition
            .as_ref()
            .and_then(|def| def.level(self.current_level))
            .unwrap_or(&FALLBACK_DEPOSIT_LEVEL)
    }

    pub fn requires_hub(&self) -> bool {
        self.definition.as_ref().is_some_and(|def| def.requires_hub)
    }

    pub fn connect_to_hub(&mut self, hub: Entity) {
        self.connected_hub = Some(hub);
    }

    pub fn disconnect_from_hub(&mut self) {
        self.connected_hub = None;
    }

    pub fn connected_hub(&self) -> Option<Entity> {
        self.connected_hub
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn is_connected_to_hub(&self) -> bool {
        self.connected_hub.is_some()
    }

    pub fn resource_type(&self) -> RowHandle {
        self.definition
            .as_ref()
            .map(|def| def.resource.clone())
            .unwrap_or_default()
    }

    pub fn deposit_name(&self) -> &str {
        self.definition
            .as_ref()
            .map_or(UNKNOWN_DEPOSIT, |def| def.deposit_name.as_str())
    }

    pub fn is_renewable(&self) -> bool {
        self.definition.as_ref().is_some_and(|def| def.is_renewable)
    }

    pub fn is_depleted(&self) -> bool {
        self.is_initialized() && !self.is_renewable() && self.current_reserves == 0
    }

    pub fn current_reserves(&self) -> u32 {
        self.current_reserves
    }

    /// Fraction of the original reserves already taken, in `[0, 1]`.
    #[cfg_attr(not(test), allow(dead_code))]
    pub fn depletion_percentage(&self) -> f32 {
        let Some(definition) = &self.definition else {
            return 0.0;
        };
        if definition.is_renewable || definition.total_reserves == 0 {
            return 0.0;
        }
        1.0 - self.current_reserves as f32 / definition.total_reserves as f32
    }

    pub fn last_extraction_time(&self) -> f32 {
        self.last_extraction_time
    }

    /// Mesh for the current level, falling back to the definition's base mesh.
    pub fn level_mesh(&self) -> Option<String> {
        let definition = self.definition.as_ref()?;
        self.level_data()
            .level_mesh
            .clone()
            .or_else(|| definition.base_mesh.clone())
    }

    /// Advances automatic extraction and regeneration by `delta` seconds.
    /// At most one extraction happens per call, however long the frame.
    pub fn tick(&mut self, delta: f32, storage: &mut ResourceStorage, now: f32) {
        if delta <= 0.0
            || !self.auto_extract_to_storage
            || !self.is_initialized()
            || self.is_depleted()
        {
            return;
        }

        self.extraction_elapsed += delta;
        if self.extraction_elapsed >= self.extraction_tick_rate {
            self.auto_extract(storage, now);
            self.extraction_elapsed = 0.0;
        }

        if self.is_renewable() {
            self.regenerate(delta, storage);
        }
    }

    pub fn has_pending_notices(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn take_notices(&mut self) -> Vec<DepositNotice> {
        std::mem::take(&mut self.pending)
    }

    fn auto_extract(&mut self, storage: &mut ResourceStorage, now: f32) {
        let amount = (self.current_extraction_rate() * self.extraction_tick_rate)
            .round()
            .max(0.0) as u32;
        if amount == 0 {
            return;
        }

        let resource = self.resource_type();
        let moved = if self.is_renewable() {
            storage.add_resource(&resource, amount)
        } else {
            let take = amount
                .min(self.current_reserves)
                .min(storage.available_space(&resource));
            let stored = storage.add_resource(&resource, take);
            self.current_reserves -= stored;
            stored
        };
        if moved == 0 {
            return;
        }

        self.last_extraction_time = now;
        self.pending.push(DepositNotice::Extracted {
            resource,
            amount: moved,
        });
        self.check_depletion();
    }

    fn regenerate(&mut self, delta: f32, storage: &mut ResourceStorage) {
        let rate = self
            .definition
            .as_ref()
            .map_or(0.0, |def| def.regeneration_rate);
        if rate <= 0.0 {
            return;
        }

        self.regeneration_carry += rate * delta;
        let whole = self.regeneration_carry.floor();
        if whole < 1.0 {
            return;
        }
        self.regeneration_carry -= whole;

        let resource = self.resource_type();
        let room = self
            .level_data()
            .max_storage
            .saturating_sub(storage.current_amount(&resource));
        let amount = (whole as u32).min(room);
        if amount > 0 {
            storage.add_resource(&resource, amount);
        }
    }

    fn check_depletion(&mut self) {
        if self.is_depleted() {
            info!("{} is depleted", self.deposit_name());
            self.pending.push(DepositNotice::Depleted);
        }
    }
}
