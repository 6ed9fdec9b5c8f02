use std::ops::RangeInclusive;

use crate::literal::{LiteralError, parse_integer};
use crate::specification::{Entry, ObjectDictionary, SubEntry};

const RPDO_COMMUNICATION: RangeInclusive<u16> = 0x1400..=0x15FF;
const RPDO_MAPPING: RangeInclusive<u16> = 0x1600..=0x17FF;
const TPDO_COMMUNICATION: RangeInclusive<u16> = 0x1800..=0x19FF;
const TPDO_MAPPING: RangeInclusive<u16> = 0x1A00..=0x1BFF;

/// The three object lists of an object dictionary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectCategory {
    Mandatory,
    Optional,
    Manufacturer,
}

/// Direction of a PDO, seen from the device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PdoDirection {
    Receive,
    Transmit,
}

impl ObjectDictionary {
    /// get an object by index
    #[must_use]
    pub fn get_object(&self, index: u16) -> Option<&Entry> {
        self.objects.get(&index)
    }

    /// get a mutable reference to an object by index
    pub fn get_object_mut(&mut self, index: u16) -> Option<&mut Entry> {
        self.objects.get_mut(&index)
    }

    /// get a sub-object by index and sub-index
    #[must_use]
    pub fn get_sub_object(&self, index: u16, sub_index: u8) -> Option<&SubEntry> {
        self.objects.get(&index)?.sub_objects.get(&sub_index)
    }

    /// get a mutable reference to a sub-object by index and sub-index
    pub fn get_sub_object_mut(&mut self, index: u16, sub_index: u8) -> Option<&mut SubEntry> {
        self.objects.get_mut(&index)?.sub_objects.get_mut(&sub_index)
    }

    /// Set the configured value of an object, or of one of its sub-objects if `sub_index` is given
    ///
    /// Returns false if the object or sub-object does not exist; nothing is created.
    pub fn set_parameter_value(
        &mut self,
        index: u16,
        sub_index: Option<u8>,
        value: impl Into<String>,
    ) -> bool {
        let slot = match sub_index {
            Some(sub_index) => self
                .get_sub_object_mut(index, sub_index)
                .map(|sub_entry| &mut sub_entry.parameter_value),
            None => self
                .get_object_mut(index)
                .map(|entry| &mut entry.parameter_value),
        };
        match slot {
            Some(slot) => {
                *slot = Some(value.into());
                true
            }
            None => false,
        }
    }

    /// Get the value of an object or sub-object: the configured value if there is one, otherwise the default value
    #[must_use]
    pub fn parameter_value(&self, index: u16, sub_index: Option<u8>) -> Option<&str> {
        match sub_index {
            Some(sub_index) => {
                let sub_entry = self.get_sub_object(index, sub_index)?;
                sub_entry
                    .parameter_value
                    .as_deref()
                    .or(sub_entry.default_value.as_deref())
            }
            None => {
                let entry = self.get_object(index)?;
                entry
                    .parameter_value
                    .as_deref()
                    .or(entry.default_value.as_deref())
            }
        }
    }

    /// Evaluate the value of an object or sub-object as an integer
    ///
    /// `$NODEID` formulas are evaluated with `node_id`. Returns `Ok(None)` if the
    /// object does not exist or has neither a configured nor a default value.
    ///
    /// # Errors
    ///
    /// A [`LiteralError`] if the value is not an integer literal.
    pub fn evaluate_value(
        &self,
        index: u16,
        sub_index: Option<u8>,
        node_id: Option<u8>,
    ) -> Result<Option<u32>, LiteralError> {
        self.parameter_value(index, sub_index)
            .map(|text| parse_integer(text, node_id))
            .transpose()
    }

    /// Returns an iterator over the objects listed in one of the object lists
    ///
    /// Indices without an object definition are skipped.
    pub fn objects_by_category(&self, category: ObjectCategory) -> impl Iterator<Item = &Entry> {
        let list = match category {
            ObjectCategory::Mandatory => &self.mandatory_objects,
            ObjectCategory::Optional => &self.optional_objects,
            ObjectCategory::Manufacturer => &self.manufacturer_objects,
        };
        list.iter().filter_map(|index| self.objects.get(index))
    }

    /// Returns an iterator over the PDO communication parameter objects, in index order
    pub fn pdo_communication_parameters(
        &self,
        direction: PdoDirection,
    ) -> impl Iterator<Item = &Entry> {
        let range = match direction {
            PdoDirection::Receive => RPDO_COMMUNICATION,
            PdoDirection::Transmit => TPDO_COMMUNICATION,
        };
        self.objects.range(range).map(|(_, entry)| entry)
    }

    /// Returns an iterator over the PDO mapping parameter objects, in index order
    pub fn pdo_mapping_parameters(&self, direction: PdoDirection) -> impl Iterator<Item = &Entry> {
        let range = match direction {
            PdoDirection::Receive => RPDO_MAPPING,
            PdoDirection::Transmit => TPDO_MAPPING,
        };
        self.objects.range(range).map(|(_, entry)| entry)
    }
}
