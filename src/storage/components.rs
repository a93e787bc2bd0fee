//! `ResourceStorage`: capacity-limited stock of one or many resources.
use bevy::prelude::*;

use crate::catalog::RowHandle;

const DEFAULT_MAX_CAPACITY: u32 = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredResource {
    pub resource: RowHandle,
    pub quantity: u32,
}

impl StoredResource {
    fn empty(resource: RowHandle) -> Self {
        Self {
            resource,
            quantity: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageDelta {
    Added(u32),
    Removed(u32),
}

/// A change waiting to be published as storage messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageChange {
    pub resource: RowHandle,
    pub delta: StorageDelta,
    pub new_amount: u32,
    pub max_capacity: u32,
}

/// Stock held by a deposit, hub or building.
///
/// In single-resource mode only `stored_resource_type` is accepted (anything
/// while it is unset; the first accepted resource then becomes the type).
/// Slots match by row name. Every mutation queues a [`StorageChange`] that
/// `publish_storage_events` turns into messages.
#[derive(Component, Debug, Clone)]
pub struct ResourceStorage {
    max_capacity: u32,
    single_resource_mode: bool,
    allow_overflow: bool,
    stored_resource_type: RowHandle,
    stored: Vec<StoredResource>,
    pending: Vec<StorageChange>,
}

impl Default for ResourceStorage {
    fn default() -> Self {
        Self {
            max_capacity: DEFAULT_MAX_CAPACITY,
            single_resource_mode: true,
            allow_overflow: false,
            stored_resource_type: RowHandle::default(),
            stored: Vec::new(),
            pending: Vec::new(),
        }
    }
}

impl ResourceStorage {
    /// Single-resource storage pre-seeded with an empty slot for `resource`.
    pub fn single(resource: RowHandle, max_capacity: u32) -> Self {
        let mut storage = Self {
            max_capacity,
            ..Self::default()
        };
        storage.set_resource_type(resource);
        storage
    }

    /// Storage that accepts any mix of resources.
    pub fn multi(max_capacity: u32) -> Self {
        Self {
            max_capacity,
            single_resource_mode: false,
            ..Self::default()
        }
    }

    /// Stores up to `amount` and returns how much was actually stored.
    pub fn add_resource(&mut self, resource: &RowHandle, amount: u32) -> u32 {
        if amount == 0 || !resource.is_set() {
            return 0;
        }
        if !self.can_accept_resource_type(resource) {
            warn!(
                "Storage refused {}: only {} is accepted",
                resource, self.stored_resource_type
            );
            return 0;
        }

        let actual = if self.allow_overflow {
            amount
        } else {
            amount.min(self.max_capacity.saturating_sub(self.total_stored()))
        };
        if actual == 0 {
            return 0;
        }

        if self.single_resource_mode && !self.stored_resource_type.is_set() {
            self.stored_resource_type = resource.clone();
        }

        let new_amount = match self.slot_mut(resource) {
            Some(slot) => {
                slot.quantity = slot.quantity.saturating_add(actual);
                slot.quantity
            }
            None => {
                self.stored.push(StoredResource {
                    resource: resource.clone(),
                    quantity: actual,
                });
                actual
            }
        };

        self.queue(resource, StorageDelta::Added(actual), new_amount);
        actual
    }

    /// Removes up to `amount` and returns how much was actually removed.
    pub fn remove_resource(&mut self, resource: &RowHandle, amount: u32) -> u32 {
        if amount == 0 || !resource.is_set() {
            return 0;
        }
        let Some(index) = self.slot_index(resource) else {
            return 0;
        };

        let slot = &mut self.stored[index];
        let actual = amount.min(slot.quantity);
        if actual == 0 {
            return 0;
        }
        slot.quantity -= actual;
        let new_amount = slot.quantity;

        if new_amount == 0 && !self.single_resource_mode {
            self.stored.remove(index);
        }

        self.queue(resource, StorageDelta::Removed(actual), new_amount);
        actual
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn can_store_resource(&self, resource: &RowHandle, amount: u32) -> bool {
        if amount == 0 || !resource.is_set() || !self.can_accept_resource_type(resource) {
            return false;
        }
        self.allow_overflow || self.total_stored().saturating_add(amount) <= self.max_capacity
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn has_resource(&self, resource: &RowHandle, amount: u32) -> bool {
        self.current_amount(resource) >= amount
    }

    pub fn current_amount(&self, resource: &RowHandle) -> u32 {
        self.slot(resource).map_or(0, |slot| slot.quantity)
    }

    /// Room left for `resource`; zero for a refused type, unbounded with overflow.
    pub fn available_space(&self, resource: &RowHandle) -> u32 {
        if !self.can_accept_resource_type(resource) {
            return 0;
        }
        if self.allow_overflow {
            return u32::MAX;
        }
        self.max_capacity.saturating_sub(self.total_stored())
    }

    pub fn total_stored(&self) -> u32 {
        self.stored
            .iter()
            .fold(0u32, |total, slot| total.saturating_add(slot.quantity))
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn stored_resources(&self) -> &[StoredResource] {
        &self.stored
    }

    pub fn is_empty(&self) -> bool {
        self.total_stored() == 0
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn is_full(&self) -> bool {
        !self.allow_overflow && self.total_stored() >= self.max_capacity
    }

    pub fn max_capacity(&self) -> u32 {
        self.max_capacity
    }

    /// Lowering the capacity never discards stock already held.
    pub fn set_max_capacity(&mut self, max_capacity: u32) {
        self.max_capacity = max_capacity;
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn allows_overflow(&self) -> bool {
        self.allow_overflow
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn set_allow_overflow(&mut self, allow: bool) {
        self.allow_overflow = allow;
    }

    pub fn stored_resource_type(&self) -> &RowHandle {
        &self.stored_resource_type
    }

    /// Re-targets a single-resource storage, discarding whatever it held.
    pub fn set_resource_type(&mut self, resource: RowHandle) {
        if !self.single_resource_mode {
            warn!(
                "Ignoring resource type {} on a multi-resource storage",
                resource
            );
            return;
        }

        self.stored.clear();
        if resource.is_set() {
            self.stored.push(StoredResource::empty(resource.clone()));
        }
        self.stored_resource_type = resource;
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn is_single_resource_mode(&self) -> bool {
        self.single_resource_mode
    }

    /// Switching to single mode keeps only the first slot and adopts its type.
    #[cfg_attr(not(test), allow(dead_code))]
    pub fn set_single_resource_mode(&mut self, single: bool) {
        if single && !self.single_resource_mode {
            self.stored.truncate(1);
            if let Some(first) = self.stored.first() {
                self.stored_resource_type = first.resource.clone();
            }
        }
        self.single_resource_mode = single;
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn clear_all_resources(&mut self) {
        let cleared: Vec<(RowHandle, u32)> = self
            .stored
            .iter()
            .filter(|slot| slot.quantity > 0)
            .map(|slot| (slot.resource.clone(), slot.quantity))
            .collect();

        if self.single_resource_mode {
            for slot in &mut self.stored {
                slot.quantity = 0;
            }
        } else {
            self.stored.clear();
        }

        for (resource, quantity) in cleared {
            self.queue(&resource, StorageDelta::Removed(quantity), 0);
        }
    }

    /// Moves up to `amount` into `target`, limited by what this storage holds
    /// and what the target can take. Returns the amount moved.
    pub fn transfer_to(
        &mut self,
        target: &mut ResourceStorage,
        resource: &RowHandle,
        amount: u32,
    ) -> u32 {
        let wanted = amount
            .min(self.current_amount(resource))
            .min(target.available_space(resource));
        if wanted == 0 {
            return 0;
        }

        let removed = self.remove_resource(resource, wanted);
        let added = target.add_resource(resource, removed);
        if added < removed {
            // Put back whatever the target refused.
            self.add_resource(resource, removed - added);
        }
        added
    }

    /// Seeds a quantity directly, without queuing changes or checking
    /// capacity. In single-resource mode this replaces whatever was stored
    /// and switches the storage to `resource`.
    #[cfg_attr(not(test), allow(dead_code))]
    pub fn set_initial_resource(&mut self, resource: &RowHandle, amount: u32) {
        if !resource.is_set() {
            return;
        }

        if self.single_resource_mode {
            self.stored_resource_type = resource.clone();
            self.stored.clear();
            self.stored.push(StoredResource {
                resource: resource.clone(),
                quantity: amount,
            });
            return;
        }

        match self.slot_mut(resource) {
            Some(slot) => slot.quantity = amount,
            None => self.stored.push(StoredResource {
                resource: resource.clone(),
                quantity: amount,
            }),
        }
    }

    pub fn has_pending_changes(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn take_changes(&mut self) -> Vec<StorageChange> {
        std::mem::take(&mut self.pending)
    }

    fn can_accept_resource_type(&self, resource: &RowHandle) -> bool {
        if !self.single_resource_mode || !self.stored_resource_type.is_set() {
            return true;
        }
        self.stored_resource_type.same_row(resource)
    }

    fn slot_index(&self, resource: &RowHandle) -> Option<usize> {
        self.stored
            .iter()
            .position(|slot| slot.resource.same_row(resource))
    }

    fn slot(&self, resource: &RowHandle) -> Option<&StoredResource> {
        self.stored
            .iter()
            .find(|slot| slot.resource.same_row(resource))
    }

    fn slot_mut(&mut self, resource: &RowHandle) -> Option<&mut StoredResource> {
        self.stored
            .iter_mut()
            .find(|slot| slot.resource.same_row(resource))
    }

    fn queue(&mut self, resource: &RowHandle, delta: StorageDelta, new_amount: u32) {
        self.pending.push(StorageChange {
            resource: resource.clone(),
            delta,
            new_amount,
            max_capacity: self.max_capacity,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iron() -> RowHandle {
        RowHandle::resource("iron_ore")
    }

    fn coal() -> RowHandle {
        RowHandle::resource("coal")
    }

    #[test]
    fn add_clamps_to_free_space() {
        let mut storage = ResourceStorage::single(iron(), 50);
        assert_eq!(storage.add_resource(&iron(), 30), 30);
        assert_eq!(storage.add_resource(&iron(), 30), 20);
        assert!(storage.is_full());
        assert_eq!(storage.add_resource(&iron(), 1), 0);
        assert_eq!(storage.current_amount(&iron()), 50);
        assert_eq!(storage.available_space(&iron()), 0);
    }

    #[test]
    fn add_rejects_zero_unset_and_foreign_types() {
        let mut storage = ResourceStorage::single(iron(), 50);
        assert_eq!(storage.add_resource(&iron(), 0), 0);
        assert_eq!(storage.add_resource(&RowHandle::default(), 5), 0);
        assert_eq!(storage.add_resource(&coal(), 5), 0);
        assert!(!storage.can_store_resource(&coal(), 1));
        assert_eq!(storage.available_space(&coal()), 0);
        assert!(!storage.has_pending_changes());
    }

    #[test]
    fn full_multi_storage_does_not_create_slots() {
        let mut storage = ResourceStorage::multi(10);
        storage.add_resource(&iron(), 10);
        assert_eq!(storage.add_resource(&coal(), 3), 0);
        assert_eq!(storage.stored_resources().len(), 1);
    }

    #[test]
    fn untyped_single_storage_adopts_first_resource() {
        let mut storage = ResourceStorage::default();
        assert_eq!(storage.add_resource(&coal(), 5), 5);
        assert_eq!(storage.stored_resource_type(), &coal());
        assert_eq!(storage.add_resource(&iron(), 5), 0);
    }

    #[test]
    fn remove_returns_amount_removed_and_drops_empty_multi_slots() {
        let mut storage = ResourceStorage::multi(100);
        storage.add_resource(&iron(), 10);
        storage.add_resource(&coal(), 4);

        assert_eq!(storage.remove_resource(&coal(), 10), 4);
        assert_eq!(storage.stored_resources().len(), 1);
        assert_eq!(storage.remove_resource(&coal(), 1), 0);
        assert_eq!(storage.total_stored(), 10);

        let mut single = ResourceStorage::single(iron(), 100);
        single.add_resource(&iron(), 3);
        assert_eq!(single.remove_resource(&iron(), 3), 3);
        assert_eq!(single.stored_resources().len(), 1);
        assert!(single.is_empty());
    }

    #[test]
    fn overflow_lifts_capacity_limits() {
        let mut storage = ResourceStorage::single(iron(), 10);
        storage.set_allow_overflow(true);
        assert_eq!(storage.add_resource(&iron(), 25), 25);
        assert!(!storage.is_full());
        assert_eq!(storage.available_space(&iron()), u32::MAX);
        assert!(storage.can_store_resource(&iron(), 1_000));
    }

    #[test]
    fn slots_match_by_row_name() {
        let mut storage = ResourceStorage::single(iron(), 10);
        let untyped = RowHandle {
            table: Some(crate::catalog::TableId::Resources),
            row: "iron_ore".to_string(),
        };
        storage.add_resource(&untyped, 4);
        assert!(storage.has_resource(&iron(), 4));
        assert!(!storage.has_resource(&iron(), 5));
    }

    #[test]
    fn set_resource_type_resets_single_storage_only() {
        let mut storage = ResourceStorage::single(iron(), 10);
        storage.add_resource(&iron(), 5);
        storage.set_resource_type(coal());
        assert_eq!(storage.current_amount(&iron()), 0);
        assert_eq!(storage.stored_resources(), &[StoredResource::empty(coal())]);

        let mut multi = ResourceStorage::multi(10);
        multi.set_resource_type(coal());
        assert!(!multi.stored_resource_type().is_set());
    }

    #[test]
    fn switching_to_single_mode_keeps_first_slot() {
        let mut storage = ResourceStorage::multi(100);
        storage.add_resource(&coal(), 2);
        storage.add_resource(&iron(), 3);
        storage.set_single_resource_mode(true);

        assert_eq!(storage.stored_resources().len(), 1);
        assert_eq!(storage.stored_resource_type(), &coal());
        assert_eq!(storage.add_resource(&iron(), 1), 0);
    }

    #[test]
    fn clear_reports_each_non_empty_slot() {
        let mut storage = ResourceStorage::multi(100);
        storage.add_resource(&iron(), 6);
        storage.add_resource(&coal(), 1);
        storage.take_changes();

        storage.clear_all_resources();
        let changes = storage.take_changes();
        assert_eq!(changes.len(), 2);
        assert!(changes
            .iter()
            .all(|change| change.new_amount == 0 && matches!(change.delta, StorageDelta::Removed(_))));
        assert!(storage.is_empty());
    }

    #[test]
    fn transfer_is_limited_by_source_and_target() {
        let mut source = ResourceStorage::single(iron(), 100);
        source.add_resource(&iron(), 40);
        let mut target = ResourceStorage::single(iron(), 25);
        target.add_resource(&iron(), 10);

        assert_eq!(source.transfer_to(&mut target, &iron(), 30), 15);
        assert_eq!(source.current_amount(&iron()), 25);
        assert!(target.is_full());

        let mut refusing = ResourceStorage::single(coal(), 100);
        assert_eq!(source.transfer_to(&mut refusing, &iron(), 5), 0);
        assert_eq!(source.current_amount(&iron()), 25);
    }

    #[test]
    fn initial_resource_is_silent_and_unclamped() {
        let mut storage = ResourceStorage::single(iron(), 20);
        storage.set_initial_resource(&iron(), 50);
        assert_eq!(storage.current_amount(&iron()), 50);
        assert!(!storage.has_pending_changes());
    }

    #[test]
    fn initial_resource_switches_single_mode_type() {
        let mut storage = ResourceStorage::single(iron(), 20);
        storage.add_resource(&iron(), 5);
        storage.take_changes();

        storage.set_initial_resource(&coal(), 8);
        assert_eq!(storage.stored_resource_type(), &coal());
        assert_eq!(storage.current_amount(&iron()), 0);
        assert_eq!(storage.current_amount(&coal()), 8);
        assert!(!storage.has_pending_changes());

        let mut mixed = ResourceStorage::multi(10);
        mixed.set_initial_resource(&iron(), 4);
        mixed.set_initial_resource(&coal(), 9);
        mixed.set_initial_resource(&iron(), 2);
        assert_eq!(mixed.current_amount(&iron()), 2);
        assert_eq!(mixed.current_amount(&coal()), 9);
    }

    #[test]
    fn changes_carry_new_amount_and_capacity() {
        let mut storage = ResourceStorage::single(iron(), 40);
        storage.add_resource(&iron(), 12);
        storage.remove_resource(&iron(), 2);

        let changes = storage.take_changes();
        assert_eq!(
            changes,
            vec![
                StorageChange {
                    resource: iron(),
                    delta: StorageDelta::Added(12),
                    new_amount: 12,
                    max_capacity: 40,
                },
                StorageChange {
                    resource: iron(),
                    delta: StorageDelta::Removed(2),
                    new_amount: 10,
                    max_capacity: 40,
                },
            ]
        );
        assert!(!storage.has_pending_changes());
    }
}
