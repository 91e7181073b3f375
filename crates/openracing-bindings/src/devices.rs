//! Curated device list
//!
//! Bindings store the controller index a device had when it was discovered.
//! The simulator wants the position in the written `[CONTROLLERS]` list, which
//! is sorted by name. [`DeviceList::output_index`] bridges the two.

use openracing_input_source::{DeviceDescriptor, normalize_guid};
use serde::{Deserialize, Serialize};

/// A device the user chose to export, with its discovery-time index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CuratedDevice {
    #[serde(flatten)]
    pub descriptor: DeviceDescriptor,
    /// Index the device had in the enumeration that produced it.
    pub original_index: Option<usize>,
}

impl CuratedDevice {
    /// Surrounding whitespace is dropped from the name; the controls file
    /// cannot carry it.
    pub fn new(mut descriptor: DeviceDescriptor, original_index: usize) -> Self {
        descriptor.name = descriptor.name.trim().to_string();
        Self {
            descriptor,
            original_index: Some(original_index),
        }
    }

    pub fn name(&self) -> &str {
        &self.descriptor.name
    }
}

/// Devices in output order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceList {
    devices: Vec<CuratedDevice>,
}

impl DeviceList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the list with `discovered`, where each device's position in
    /// the input is its original index. The result is sorted by name,
    /// case-insensitively; devices with equal names keep their input order.
    pub fn set_devices(&mut self, discovered: impl IntoIterator<Item = DeviceDescriptor>) {
        self.set_indexed(discovered.into_iter().enumerate());
    }

    /// Like [`DeviceList::set_devices`] with explicit original indices.
    pub fn set_indexed(&mut self, discovered: impl IntoIterator<Item = (usize, DeviceDescriptor)>) {
        let mut devices: Vec<CuratedDevice> = discovered
            .into_iter()
            .map(|(index, descriptor)| CuratedDevice::new(descriptor, index))
            .collect();
        devices.sort_by_cached_key(|device| device.descriptor.name.to_lowercase());
        self.devices = devices;
    }

    /// Replace the list without reordering. Used when the list is read back
    /// from a controls file, where the order is already the output order.
    pub fn restore(&mut self, devices: Vec<CuratedDevice>) {
        self.devices = devices;
    }

    /// Output position for a controller index captured at discovery time.
    /// Unknown indices are returned unchanged.
    pub fn output_index(&self, controller: usize) -> usize {
        self.position_of_original(controller).unwrap_or(controller)
    }

    pub fn position_of_original(&self, original_index: usize) -> Option<usize> {
        self.devices
            .iter()
            .position(|device| device.original_index == Some(original_index))
    }

    /// Device a binding's controller index refers to.
    pub fn by_original(&self, original_index: usize) -> Option<&CuratedDevice> {
        self.devices
            .iter()
            .find(|device| device.original_index == Some(original_index))
    }

    /// Position of the device whose instance or product GUID matches.
    pub fn find_by_guid(&self, guid: &str) -> Option<usize> {
        if normalize_guid(guid).is_empty() {
            return None;
        }
        self.devices
            .iter()
            .position(|device| device.descriptor.matches_guid(guid))
    }

    pub fn get(&self, position: usize) -> Option<&CuratedDevice> {
        self.devices.get(position)
    }

    pub(crate) fn remove_at(&mut self, position: usize) -> Option<CuratedDevice> {
        (position < self.devices.len()).then(|| self.devices.remove(position))
    }

    pub(crate) fn clear(&mut self) -> usize {
        let count = self.devices.len();
        self.devices.clear();
        count
    }

    pub fn iter(&self) -> impl Iterator<Item = &CuratedDevice> {
        self.devices.iter()
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

impl<'a> IntoIterator for &'a DeviceList {
    type Item = &'a CuratedDevice;
    type IntoIter = std::slice::Iter<'a, CuratedDevice>;

    fn into_iter(self) -> Self::IntoIter {
        self.devices.iter()
    }
}
