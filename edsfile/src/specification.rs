use std::collections::BTreeMap;

use crate::literal::AccessType;
use crate::sectionmap::SectionMap;

/// The object code of an object dictionary entry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ObjectCode {
    Null,
    Domain,
    DefType,
    DefStruct,
    #[default]
    Var,
    Array,
    Record,
    /// a code that is not defined by CiA 301; kept so that it can be written back unchanged
    Other(u8),
}

impl ObjectCode {
    #[must_use]
    pub fn from_code(code: u8) -> Self {
        match code {
            0 => ObjectCode::Null,
            2 => ObjectCode::Domain,
            5 => ObjectCode::DefType,
            6 => ObjectCode::DefStruct,
            7 => ObjectCode::Var,
            8 => ObjectCode::Array,
            9 => ObjectCode::Record,
            other => ObjectCode::Other(other),
        }
    }

    #[must_use]
    pub fn code(self) -> u8 {
        match self {
            ObjectCode::Null => 0,
            ObjectCode::Domain => 2,
            ObjectCode::DefType => 5,
            ObjectCode::DefStruct => 6,
            ObjectCode::Var => 7,
            ObjectCode::Array => 8,
            ObjectCode::Record => 9,
            ObjectCode::Other(other) => other,
        }
    }
}

/// `[FileInfo]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    pub file_name: String,
    pub file_version: u8,
    pub file_revision: u8,
    pub eds_version: String,
    pub description: String,
    pub creation_time: String,
    pub creation_date: String,
    pub created_by: String,
    pub modification_time: String,
    pub modification_date: String,
    pub modified_by: String,
    /// name of the EDS file a DCF was derived from; only used in DCF files
    pub last_eds: Option<String>,
}

impl Default for FileInfo {
    fn default() -> Self {
        Self {
            file_name: String::new(),
            file_version: 1,
            file_revision: 0,
            eds_version: "4.0".to_string(),
            description: String::new(),
            creation_time: String::new(),
            creation_date: String::new(),
            created_by: String::new(),
            modification_time: String::new(),
            modification_date: String::new(),
            modified_by: String::new(),
            last_eds: None,
        }
    }
}

/// the `BaudRate_*` flags of `[DeviceInfo]`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BaudRates {
    pub baud_10: bool,
    pub baud_20: bool,
    pub baud_50: bool,
    pub baud_125: bool,
    pub baud_250: bool,
    pub baud_500: bool,
    pub baud_800: bool,
    pub baud_1000: bool,
}

impl BaudRates {
    /// check if a bit rate (in kbit/s) is supported
    #[must_use]
    pub fn supports(&self, kbaud: u16) -> bool {
        match kbaud {
            10 => self.baud_10,
            20 => self.baud_20,
            50 => self.baud_50,
            125 => self.baud_125,
            250 => self.baud_250,
            500 => self.baud_500,
            800 => self.baud_800,
            1000 => self.baud_1000,
            _ => false,
        }
    }
}

/// `[DeviceInfo]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub vendor_name: String,
    pub vendor_number: u32,
    pub product_name: String,
    pub product_number: u32,
    pub revision_number: u32,
    pub order_code: String,
    pub baud_rates: BaudRates,
    pub simple_boot_up_master: bool,
    pub simple_boot_up_slave: bool,
    pub granularity: u8,
    pub dynamic_channels_supported: u8,
    pub group_messaging: bool,
    pub nr_of_rx_pdo: u16,
    pub nr_of_tx_pdo: u16,
    pub lss_supported: bool,
    pub compact_pdo: u8,
    pub canopen_safety_supported: bool,
}

impl Default for DeviceInfo {
    fn default() -> Self {
        Self {
            vendor_name: String::new(),
            vendor_number: 0,
            product_name: String::new(),
            product_number: 0,
            revision_number: 0,
            order_code: String::new(),
            baud_rates: BaudRates::default(),
            simple_boot_up_master: false,
            simple_boot_up_slave: false,
            granularity: 8,
            dynamic_channels_supported: 0,
            group_messaging: false,
            nr_of_rx_pdo: 0,
            nr_of_tx_pdo: 0,
            lss_supported: false,
            compact_pdo: 0,
            canopen_safety_supported: false,
        }
    }
}

/// `[DeviceCommissioning]` of a DCF file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceCommissioning {
    pub node_id: u8,
    pub node_name: String,
    /// bit rate in kbit/s
    pub baudrate: u16,
    pub net_number: u32,
    pub network_name: String,
    pub canopen_manager: bool,
    pub lss_serial_number: Option<u32>,
    pub node_refd: Option<String>,
    pub net_refd: Option<String>,
}

impl Default for DeviceCommissioning {
    fn default() -> Self {
        Self {
            node_id: 1,
            node_name: String::new(),
            baudrate: 250,
            net_number: 0,
            network_name: String::new(),
            canopen_manager: false,
            lss_serial_number: None,
            node_refd: None,
            net_refd: None,
        }
    }
}

/// An object in the object dictionary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entry {
    pub index: u16,
    pub parameter_name: String,
    pub object_type: ObjectCode,
    pub data_type: Option<u16>,
    pub access_type: AccessType,
    /// the default value is kept as text; its legal forms depend on the data type
    pub default_value: Option<String>,
    pub low_limit: Option<String>,
    pub high_limit: Option<String>,
    pub pdo_mapping: bool,
    pub srdo_mapping: bool,
    pub inverted_srad: Option<String>,
    pub obj_flags: u32,
    pub sub_number: Option<u8>,
    pub compact_sub_obj: Option<u8>,
    /// indices listed in the `<index>ObjectLinks` section
    pub object_links: Vec<u16>,
    pub sub_objects: BTreeMap<u8, SubEntry>,
    // the following fields are only used in DCF files
    pub parameter_value: Option<String>,
    pub denotation: Option<String>,
    pub upload_file: Option<String>,
    pub download_file: Option<String>,
    pub param_refd: Option<String>,
}

/// A sub-object of an [`Entry`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubEntry {
    pub sub_index: u8,
    pub parameter_name: String,
    pub object_type: ObjectCode,
    pub data_type: Option<u16>,
    pub access_type: AccessType,
    pub default_value: Option<String>,
    pub low_limit: Option<String>,
    pub high_limit: Option<String>,
    pub pdo_mapping: bool,
    pub srdo_mapping: bool,
    pub inverted_srad: Option<String>,
    // DCF only
    pub parameter_value: Option<String>,
    pub denotation: Option<String>,
    pub param_refd: Option<String>,
}

/// The object dictionary of a device
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectDictionary {
    pub mandatory_objects: Vec<u16>,
    pub optional_objects: Vec<u16>,
    pub manufacturer_objects: Vec<u16>,
    pub objects: BTreeMap<u16, Entry>,
    /// which data type indices may be used as dummy entries in PDO mappings
    pub dummy_usage: BTreeMap<u16, bool>,
}

/// `[Comments]` or `[M<n>Comments]`
///
/// The declared line count is kept separately, because the numbered lines may have gaps.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Comments {
    pub line_count: u16,
    pub lines: BTreeMap<u16, String>,
}

impl Comments {
    /// build a comment block from a list of lines
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let lines: BTreeMap<u16, String> = (1..=u16::MAX)
            .zip(lines.into_iter().map(Into::into))
            .collect();
        Self {
            line_count: u16::try_from(lines.len()).unwrap_or(u16::MAX),
            lines,
        }
    }
}

/// `[M<n>SubExt<index>]`: describes the sub-indices added to an object per module instance
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleSubExtension {
    pub index: u16,
    pub parameter_name: String,
    pub data_type: Option<u16>,
    pub access_type: AccessType,
    pub default_value: Option<String>,
    pub pdo_mapping: bool,
    /// the number of extension sub-indices per module; may be a formula
    pub count: String,
    pub obj_extend: Option<u8>,
}

/// a module that can be attached to a modular device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleInfo {
    /// the `<n>` of the `M<n>...` section names
    pub module_number: u16,
    pub product_name: String,
    pub product_version: u8,
    pub product_revision: u8,
    pub order_code: String,
    /// indices of objects that are created once per module
    pub fixed_objects: Vec<u16>,
    pub fixed_object_definitions: BTreeMap<u16, Entry>,
    /// indices of objects that gain additional sub-indices per module
    pub sub_extends: Vec<u16>,
    pub sub_extensions: BTreeMap<u16, ModuleSubExtension>,
    pub comments: Option<Comments>,
}

impl ModuleInfo {
    pub fn new(module_number: u16) -> Self {
        Self {
            module_number,
            product_name: String::new(),
            product_version: 1,
            product_revision: 0,
            order_code: String::new(),
            fixed_objects: Vec::new(),
            fixed_object_definitions: BTreeMap::new(),
            sub_extends: Vec::new(),
            sub_extensions: BTreeMap::new(),
            comments: None,
        }
    }
}

/// one segment of `[DynamicChannels]`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DynamicChannelSegment {
    pub data_type: u16,
    pub direction: AccessType,
    pub range: String,
    pub pp_offset: u32,
}

/// `[DynamicChannels]`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DynamicChannels {
    pub segments: Vec<DynamicChannelSegment>,
}

/// `[Tool<n>]`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolInfo {
    pub name: String,
    pub command: String,
}

/**
An electronic data sheet (EDS)

The EDS describes the capabilities of a device type. It contains the default
values of all objects, but no device specific configuration.
 */
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElectronicDataSheet {
    pub file_info: FileInfo,
    pub device_info: DeviceInfo,
    pub object_dictionary: ObjectDictionary,
    pub comments: Option<Comments>,
    pub supported_modules: Vec<ModuleInfo>,
    pub dynamic_channels: Option<DynamicChannels>,
    pub tools: Vec<ToolInfo>,
    /// all sections that are not otherwise represented, in the order in which they appeared in the file
    pub additional_sections: SectionMap,
}

/**
A device configuration file (DCF)

A DCF describes one concrete device on a network: in addition to the content of an EDS
it has a node id, a bit rate and configured values for the objects.
 */
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceConfiguration {
    pub file_info: FileInfo,
    pub device_info: DeviceInfo,
    pub device_commissioning: DeviceCommissioning,
    pub object_dictionary: ObjectDictionary,
    pub comments: Option<Comments>,
    pub supported_modules: Vec<ModuleInfo>,
    /// module numbers of the modules that are actually attached, in slot order
    pub connected_modules: Vec<u16>,
    pub dynamic_channels: Option<DynamicChannels>,
    pub tools: Vec<ToolInfo>,
    pub additional_sections: SectionMap,
}
