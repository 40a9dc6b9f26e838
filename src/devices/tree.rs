// MIT License - Copyright (c) 2026 Peter Wright
// In-memory model of everything discovered under the account

use crate::constants::CONTROLLER_ADDRESS;

use super::location::Location;
use super::panel::Panel;
use super::zone::Zone;

/// An addressable entity, as seen by command dispatch.
#[derive(Debug, Clone, Copy)]
pub enum Entity<'a> {
    Controller,
    Panel(&'a Panel),
    Zone(&'a Zone),
}

/// Location -> Panel -> Zone hierarchy built by discovery.
///
/// Entities are only ever added. Reconciling the same upstream listing
/// twice leaves the tree unchanged.
#[derive(Debug, Clone, Default)]
pub struct DeviceTree {
    locations: Vec<Location>,
}

impl DeviceTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    /// Return the location with the given id, creating it if needed.
    pub fn location_or_insert(&mut self, id: i64, name: &str) -> &mut Location {
        match self.locations.iter().position(|l| l.id == id) {
            Some(idx) => &mut self.locations[idx],
            None => {
                self.locations.push(Location::new(id, name));
                let idx = self.locations.len() - 1;
                &mut self.locations[idx]
            }
        }
    }

    pub fn panels(&self) -> impl Iterator<Item = &Panel> {
        self.locations.iter().flat_map(|l| l.panels.iter())
    }

    pub fn panels_mut(&mut self) -> impl Iterator<Item = &mut Panel> {
        self.locations.iter_mut().flat_map(|l| l.panels.iter_mut())
    }

    pub fn zones(&self) -> impl Iterator<Item = &Zone> {
        self.panels().flat_map(|p| p.zones.iter())
    }

    pub fn zones_mut(&mut self) -> impl Iterator<Item = &mut Zone> {
        self.panels_mut().flat_map(|p| p.zones.iter_mut())
    }

    pub fn panel(&self, address: &str) -> Option<&Panel> {
        self.panels().find(|p| p.address == address)
    }

    pub fn panel_mut(&mut self, address: &str) -> Option<&mut Panel> {
        self.panels_mut().find(|p| p.address == address)
    }

    pub fn zone(&self, address: &str) -> Option<&Zone> {
        self.zones().find(|z| z.address == address)
    }

    pub fn zone_mut(&mut self, address: &str) -> Option<&mut Zone> {
        self.zones_mut().find(|z| z.address == address)
    }

    /// Resolve an address to the entity it names.
    pub fn entity(&self, address: &str) -> Option<Entity<'_>> {
        if address == CONTROLLER_ADDRESS {
            return Some(Entity::Controller);
        }
        self.panel(address)
            .map(Entity::Panel)
            .or_else(|| self.zone(address).map(Entity::Zone))
    }

    pub fn contains(&self, address: &str) -> bool {
        self.entity(address).is_some()
    }

    pub fn panel_count(&self) -> usize {
        self.panels().count()
    }

    pub fn zone_count(&self) -> usize {
        self.zones().count()
    }

    /// Addresses of all panels and zones, panels first within each panel.
    pub fn addresses(&self) -> Vec<String> {
        self.panels()
            .flat_map(|p| {
                std::iter::once(p.address.clone()).chain(p.zones.iter().map(|z| z.address.clone()))
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.panel_count() == 0
    }
}
