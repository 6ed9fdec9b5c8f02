use chrono::{Local, NaiveDateTime};

use crate::literal::LiteralError;
use crate::specification::{DeviceCommissioning, DeviceConfiguration, ElectronicDataSheet, FileInfo};

const CREATED_BY: &str = "edsfile";
const DEFAULT_NETWORK_NAME: &str = "CANopen Network";

impl ElectronicDataSheet {
    /**
    Create a device configuration for one device on a network

    The returned configuration owns a complete copy of the data sheet; changing it never
    affects `self`. The file revision is incremented and the creation time is taken from the
    local clock.

    ```rust
    # use edsfile::ElectronicDataSheet;
    let eds = ElectronicDataSheet::default();
    let dcf = eds.to_configuration(2, 500, Some("Drive"));
    assert_eq!(dcf.device_commissioning.node_id, 2);
    assert_eq!(dcf.device_commissioning.node_name, "Drive");
    ```
     */
    #[must_use]
    pub fn to_configuration(
        &self,
        node_id: u8,
        baudrate: u16,
        node_name: Option<&str>,
    ) -> DeviceConfiguration {
        self.to_configuration_at(node_id, baudrate, node_name, Local::now().naive_local())
    }

    /// Create a device configuration with an explicit creation timestamp
    ///
    /// This is the same as [`ElectronicDataSheet::to_configuration`], except that the creation
    /// date and time are taken from `timestamp`.
    #[must_use]
    pub fn to_configuration_at(
        &self,
        node_id: u8,
        baudrate: u16,
        node_name: Option<&str>,
        timestamp: NaiveDateTime,
    ) -> DeviceConfiguration {
        let source = &self.file_info;
        let file_info = FileInfo {
            file_name: dcf_file_name(&source.file_name),
            file_version: source.file_version,
            file_revision: source.file_revision.wrapping_add(1),
            eds_version: source.eds_version.clone(),
            description: format!("DCF generated from {}", source.file_name),
            creation_time: timestamp.format("%I:%M%p").to_string(),
            creation_date: timestamp.format("%m-%d-%Y").to_string(),
            created_by: CREATED_BY.to_string(),
            modification_time: String::new(),
            modification_date: String::new(),
            modified_by: String::new(),
            last_eds: Some(source.file_name.clone()).filter(|name| !name.is_empty()),
        };

        let device_commissioning = DeviceCommissioning {
            node_id,
            node_name: node_name.map_or_else(
                || format!("{}_Node{node_id}", self.device_info.product_name),
                str::to_string,
            ),
            baudrate,
            net_number: 1,
            network_name: DEFAULT_NETWORK_NAME.to_string(),
            canopen_manager: false,
            ..DeviceCommissioning::default()
        };

        log::debug!(
            "deriving configuration for node {node_id} from \"{}\"",
            source.file_name
        );

        DeviceConfiguration {
            file_info,
            device_info: self.device_info.clone(),
            device_commissioning,
            object_dictionary: self.object_dictionary.clone(),
            comments: self.comments.clone(),
            supported_modules: self.supported_modules.clone(),
            connected_modules: Vec::new(),
            dynamic_channels: self.dynamic_channels.clone(),
            tools: self.tools.clone(),
            additional_sections: self.additional_sections.clone(),
        }
    }
}

impl DeviceConfiguration {
    /// Evaluate the value of an object or sub-object as an integer, using the node id of this device
    ///
    /// The configured value is used if there is one, otherwise the default value.
    ///
    /// # Errors
    ///
    /// A [`LiteralError`] if the value is not an integer literal.
    pub fn resolved_value(&self, index: u16, sub_index: Option<u8>) -> Result<Option<u32>, LiteralError> {
        self.object_dictionary
            .evaluate_value(index, sub_index, Some(self.device_commissioning.node_id))
    }
}

// dcf_file_name()
// replace a trailing .eds extension (any case) with .dcf
fn dcf_file_name(eds_name: &str) -> String {
    let len = eds_name.len();
    match eds_name.get(len.saturating_sub(4)..) {
        Some(extension) if extension.eq_ignore_ascii_case(".eds") => {
            format!("{}.dcf", &eds_name[..len - 4])
        }
        _ => eds_name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sectionmap::Section;
    use crate::specification::{Entry, ModuleInfo, SubEntry};
    use chrono::NaiveDate;

    fn timestamp() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 7)
            .unwrap()
            .and_hms_opt(14, 5, 0)
            .unwrap()
    }

    fn test_eds() -> ElectronicDataSheet {
        let mut eds = ElectronicDataSheet::default();
        eds.file_info.file_name = "Device.EDS".to_string();
        eds.file_info.file_revision = 3;
        eds.device_info.product_name = "Widget".to_string();
        let mut entry = Entry {
            index: 0x1018,
            ..Entry::default()
        };
        entry.sub_objects.insert(
            1,
            SubEntry {
                sub_index: 1,
                default_value: Some("0x1234".to_string()),
                ..SubEntry::default()
            },
        );
        eds.object_dictionary.objects.insert(0x1018, entry);
        let mut module = ModuleInfo::new(1);
        module
            .fixed_object_definitions
            .insert(0x6000, Entry::default());
        eds.supported_modules.push(module);
        let mut vendor = Section::new("Vendor");
        vendor.insert("key", "value");
        eds.additional_sections.push(vendor);
        eds
    }

    #[test]
    fn derived_file_info() {
        let eds = test_eds();
        let dcf = eds.to_configuration_at(5, 500, None, timestamp());
        assert_eq!(dcf.file_info.file_name, "Device.dcf");
        assert_eq!(dcf.file_info.file_revision, 4);
        assert_eq!(dcf.file_info.description, "DCF generated from Device.EDS");
        assert_eq!(dcf.file_info.creation_date, "03-07-2024");
        assert_eq!(dcf.file_info.creation_time, "02:05PM");
        assert_eq!(dcf.file_info.last_eds.as_deref(), Some("Device.EDS"));
        assert_eq!(dcf.device_commissioning.node_id, 5);
        assert_eq!(dcf.device_commissioning.baudrate, 500);
        assert_eq!(dcf.device_commissioning.node_name, "Widget_Node5");
        assert_eq!(dcf.device_commissioning.net_number, 1);
        assert_eq!(dcf.device_commissioning.network_name, "CANopen Network");
        assert_eq!(dcf.object_dictionary, eds.object_dictionary);
    }

    #[test]
    fn revision_wraps() {
        let mut eds = test_eds();
        eds.file_info.file_revision = u8::MAX;
        let dcf = eds.to_configuration_at(1, 250, None, timestamp());
        assert_eq!(dcf.file_info.file_revision, 0);
    }

    #[test]
    fn derivation_isolation() {
        let eds = test_eds();
        let original = eds.clone();
        let mut dcf = eds.to_configuration_at(5, 250, Some("node"), timestamp());

        dcf.object_dictionary
            .get_sub_object_mut(0x1018, 1)
            .unwrap()
            .default_value = Some("changed".to_string());
        dcf.object_dictionary.objects.remove(&0x1018);
        dcf.supported_modules[0]
            .fixed_object_definitions
            .get_mut(&0x6000)
            .unwrap()
            .parameter_name = "changed".to_string();
        dcf.additional_sections
            .get_mut("vendor")
            .unwrap()
            .insert("key", "changed");
        dcf.device_info.product_name = "changed".to_string();

        assert_eq!(eds, original);
    }

    #[test]
    fn file_names() {
        assert_eq!(dcf_file_name("a.eds"), "a.dcf");
        assert_eq!(dcf_file_name("a.EdS"), "a.dcf");
        assert_eq!(dcf_file_name("a.eds.txt"), "a.eds.txt");
        assert_eq!(dcf_file_name("eds"), "eds");
        assert_eq!(dcf_file_name(""), "");
    }

    #[test]
    fn resolved_values() {
        let mut eds = test_eds();
        eds.object_dictionary.objects.insert(
            0x1014,
            Entry {
                index: 0x1014,
                default_value: Some("$NODEID+0x80".to_string()),
                ..Entry::default()
            },
        );
        let dcf = eds.to_configuration_at(3, 250, None, timestamp());
        assert_eq!(dcf.resolved_value(0x1014, None), Ok(Some(0x83)));
        assert_eq!(dcf.resolved_value(0x1018, Some(1)), Ok(Some(0x1234)));
        assert_eq!(dcf.resolved_value(0x1018, None), Ok(None));
    }
}
