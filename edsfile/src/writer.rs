use fnv::FnvHashSet;
use std::fmt::{Display, UpperHex};

use crate::classify::{SectionClass, classify_section};
use crate::literal::{format_bool, format_hex};
use crate::sectionmap::{Section, SectionMap};
use crate::specification::{
    Comments, DeviceCommissioning, DeviceConfiguration, DeviceInfo, DynamicChannels,
    ElectronicDataSheet, Entry, FileInfo, ModuleInfo, ModuleSubExtension, ObjectDictionary,
    SubEntry, ToolInfo,
};
use crate::variant::FileVariant;

#[derive(Debug)]
pub(crate) struct Writer {
    outstring: String,
    // lowercased names of all sections that have been written
    written: FnvHashSet<String>,
}

// borrowed view of everything EDS and DCF have in common
struct Document<'a> {
    variant: FileVariant,
    file_info: &'a FileInfo,
    device_info: &'a DeviceInfo,
    device_commissioning: Option<&'a DeviceCommissioning>,
    object_dictionary: &'a ObjectDictionary,
    comments: Option<&'a Comments>,
    supported_modules: &'a [ModuleInfo],
    connected_modules: &'a [u16],
    dynamic_channels: Option<&'a DynamicChannels>,
    tools: &'a [ToolInfo],
    additional_sections: &'a SectionMap,
}

impl Writer {
    pub(crate) fn new() -> Self {
        Self {
            outstring: String::with_capacity(4096),
            written: FnvHashSet::default(),
        }
    }

    // add a comment line; used for the banner at the top of the file
    pub(crate) fn add_comment(&mut self, text: &str) {
        for line in text.lines() {
            self.outstring.push_str("; ");
            self.outstring.push_str(line);
            self.outstring.push('\n');
        }
    }

    pub(crate) fn begin_section(&mut self, name: &str) {
        self.written.insert(name.to_ascii_lowercase());
        self.outstring.push('[');
        self.outstring.push_str(name);
        self.outstring.push_str("]\n");
    }

    pub(crate) fn end_section(&mut self) {
        self.outstring.push('\n');
    }

    pub(crate) fn has_written(&self, name: &str) -> bool {
        self.written.contains(&name.to_ascii_lowercase())
    }

    pub(crate) fn add_str(&mut self, key: &str, value: &str) {
        self.outstring.push_str(key);
        self.outstring.push('=');
        self.outstring.push_str(value);
        self.outstring.push('\n');
    }

    // optional strings are only written if they are present and not empty
    pub(crate) fn add_optional_str(&mut self, key: &str, value: Option<&str>) {
        if let Some(text) = value.filter(|text| !text.is_empty()) {
            self.add_str(key, text);
        }
    }

    pub(crate) fn add_integer<T: Display + UpperHex>(&mut self, key: &str, value: T, is_hex: bool) {
        let text = if is_hex {
            format_hex(value)
        } else {
            value.to_string()
        };
        self.add_str(key, &text);
    }

    pub(crate) fn add_bool(&mut self, key: &str, value: bool) {
        self.add_str(key, format_bool(value));
    }

    // feature flags are only written when they are set
    pub(crate) fn add_flag(&mut self, key: &str, value: bool) {
        if value {
            self.add_bool(key, value);
        }
    }

    // copy a section without interpreting it
    pub(crate) fn add_section(&mut self, section: &Section) {
        self.begin_section(section.name());
        for (key, value) in section.iter() {
            self.add_str(key, value);
        }
        self.end_section();
    }

    pub(crate) fn finish(self) -> String {
        self.outstring
    }
}

pub(crate) fn write_eds(eds: &ElectronicDataSheet, banner: Option<&str>) -> String {
    write_document(
        &Document {
            variant: FileVariant::Eds,
            file_info: &eds.file_info,
            device_info: &eds.device_info,
            device_commissioning: None,
            object_dictionary: &eds.object_dictionary,
            comments: eds.comments.as_ref(),
            supported_modules: &eds.supported_modules,
            connected_modules: &[],
            dynamic_channels: eds.dynamic_channels.as_ref(),
            tools: &eds.tools,
            additional_sections: &eds.additional_sections,
        },
        banner,
    )
}

pub(crate) fn write_dcf(dcf: &DeviceConfiguration, banner: Option<&str>) -> String {
    write_document(
        &Document {
            variant: FileVariant::Dcf,
            file_info: &dcf.file_info,
            device_info: &dcf.device_info,
            device_commissioning: Some(&dcf.device_commissioning),
            object_dictionary: &dcf.object_dictionary,
            comments: dcf.comments.as_ref(),
            supported_modules: &dcf.supported_modules,
            connected_modules: &dcf.connected_modules,
            dynamic_channels: dcf.dynamic_channels.as_ref(),
            tools: &dcf.tools,
            additional_sections: &dcf.additional_sections,
        },
        banner,
    )
}

fn write_document(doc: &Document, banner: Option<&str>) -> String {
    let variant = doc.variant;
    let mut writer = Writer::new();
    if let Some(banner_text) = banner {
        writer.add_comment(banner_text);
        writer.end_section();
    }

    write_file_info(&mut writer, doc.file_info, variant);
    write_device_info(&mut writer, doc.device_info);
    if let Some(commissioning) = doc.device_commissioning {
        write_device_commissioning(&mut writer, commissioning);
    }
    write_object_dictionary(&mut writer, doc.object_dictionary, variant);
    if let Some(comments) = doc.comments {
        write_comments(&mut writer, "Comments", comments);
    }
    write_supported_modules(&mut writer, doc.supported_modules, variant);
    if variant.has_connected_modules() && !doc.connected_modules.is_empty() {
        write_numbered_list(
            &mut writer,
            "ConnectedModules",
            "NrOfEntries",
            doc.connected_modules,
            false,
        );
    }
    if let Some(channels) = doc.dynamic_channels {
        write_dynamic_channels(&mut writer, channels);
    }
    write_tools(&mut writer, doc.tools);
    write_additional_sections(
        &mut writer,
        doc.additional_sections,
        doc.object_dictionary,
        variant,
    );

    log::debug!(
        "wrote {} with {} objects",
        variant.name(),
        doc.object_dictionary.objects.len()
    );

    writer.finish()
}

fn write_file_info(writer: &mut Writer, file_info: &FileInfo, variant: FileVariant) {
    writer.begin_section("FileInfo");
    writer.add_str("FileName", &file_info.file_name);
    writer.add_integer("FileVersion", file_info.file_version, false);
    writer.add_integer("FileRevision", file_info.file_revision, false);
    writer.add_str("EDSVersion", &file_info.eds_version);
    writer.add_str("Description", &file_info.description);
    writer.add_str("CreationTime", &file_info.creation_time);
    writer.add_str("CreationDate", &file_info.creation_date);
    writer.add_str("CreatedBy", &file_info.created_by);
    writer.add_str("ModificationTime", &file_info.modification_time);
    writer.add_str("ModificationDate", &file_info.modification_date);
    writer.add_str("ModifiedBy", &file_info.modified_by);
    if variant.has_commissioning() {
        writer.add_optional_str("LastEDS", file_info.last_eds.as_deref());
    }
    writer.end_section();
}

fn write_device_info(writer: &mut Writer, device_info: &DeviceInfo) {
    writer.begin_section("DeviceInfo");
    writer.add_str("VendorName", &device_info.vendor_name);
    writer.add_integer("VendorNumber", device_info.vendor_number, true);
    writer.add_str("ProductName", &device_info.product_name);
    writer.add_integer("ProductNumber", device_info.product_number, true);
    writer.add_integer("RevisionNumber", device_info.revision_number, true);
    writer.add_str("OrderCode", &device_info.order_code);
    let rates = &device_info.baud_rates;
    for (key, value) in [
        ("BaudRate_10", rates.baud_10),
        ("BaudRate_20", rates.baud_20),
        ("BaudRate_50", rates.baud_50),
        ("BaudRate_125", rates.baud_125),
        ("BaudRate_250", rates.baud_250),
        ("BaudRate_500", rates.baud_500),
        ("BaudRate_800", rates.baud_800),
        ("BaudRate_1000", rates.baud_1000),
    ] {
        writer.add_bool(key, value);
    }
    writer.add_bool("SimpleBootUpMaster", device_info.simple_boot_up_master);
    writer.add_bool("SimpleBootUpSlave", device_info.simple_boot_up_slave);
    writer.add_integer("Granularity", device_info.granularity, false);
    writer.add_integer(
        "DynamicChannelsSupported",
        device_info.dynamic_channels_supported,
        false,
    );
    writer.add_bool("GroupMessaging", device_info.group_messaging);
    writer.add_integer("NrOfRXPDO", device_info.nr_of_rx_pdo, false);
    writer.add_integer("NrOfTXPDO", device_info.nr_of_tx_pdo, false);
    writer.add_bool("LSS_Supported", device_info.lss_supported);
    if device_info.compact_pdo > 0 {
        writer.add_integer("CompactPDO", device_info.compact_pdo, true);
    }
    writer.add_flag(
        "CANopenSafetySupported",
        device_info.canopen_safety_supported,
    );
    writer.end_section();
}

fn write_device_commissioning(writer: &mut Writer, commissioning: &DeviceCommissioning) {
    writer.begin_section("DeviceCommissioning");
    writer.add_integer("NodeID", commissioning.node_id, false);
    writer.add_str("NodeName", &commissioning.node_name);
    writer.add_integer("Baudrate", commissioning.baudrate, false);
    writer.add_integer("NetNumber", commissioning.net_number, false);
    writer.add_str("NetworkName", &commissioning.network_name);
    writer.add_bool("CANopenManager", commissioning.canopen_manager);
    if let Some(serial_number) = commissioning.lss_serial_number {
        writer.add_integer("LSS_SerialNumber", serial_number, true);
    }
    writer.add_optional_str("NodeRefd", commissioning.node_refd.as_deref());
    writer.add_optional_str("NetRefd", commissioning.net_refd.as_deref());
    writer.end_section();
}

fn write_object_dictionary(
    writer: &mut Writer,
    object_dictionary: &ObjectDictionary,
    variant: FileVariant,
) {
    if !object_dictionary.dummy_usage.is_empty() {
        writer.begin_section("DummyUsage");
        for (data_type, used) in &object_dictionary.dummy_usage {
            writer.add_bool(&format!("Dummy{data_type:04X}"), *used);
        }
        writer.end_section();
    }

    for (name, list) in [
        ("MandatoryObjects", &object_dictionary.mandatory_objects),
        ("OptionalObjects", &object_dictionary.optional_objects),
        ("ManufacturerObjects", &object_dictionary.manufacturer_objects),
    ] {
        if !list.is_empty() {
            write_numbered_list(writer, name, "SupportedObjects", list, true);
        }
    }

    for (index, entry) in &object_dictionary.objects {
        write_entry(writer, &format!("{index:X}"), entry, variant);
        if !entry.object_links.is_empty() {
            write_numbered_list(
                writer,
                &format!("{index:X}ObjectLinks"),
                "ObjectLinks",
                &entry.object_links,
                true,
            );
        }
    }
}

// write_entry()
// writes the object section followed by the sections of its sub-objects
fn write_entry(writer: &mut Writer, section_name: &str, entry: &Entry, variant: FileVariant) {
    writer.begin_section(section_name);
    if let Some(sub_number) = entry.sub_number {
        writer.add_integer("SubNumber", sub_number, false);
    }
    writer.add_str("ParameterName", &entry.parameter_name);
    writer.add_integer("ObjectType", entry.object_type.code(), true);
    if let Some(data_type) = entry.data_type {
        writer.add_str("DataType", &format!("0x{data_type:04X}"));
    }
    writer.add_str("AccessType", entry.access_type.token());
    writer.add_optional_str("DefaultValue", entry.default_value.as_deref());
    writer.add_optional_str("LowLimit", entry.low_limit.as_deref());
    writer.add_optional_str("HighLimit", entry.high_limit.as_deref());
    writer.add_bool("PDOMapping", entry.pdo_mapping);
    writer.add_flag("SRDOMapping", entry.srdo_mapping);
    writer.add_optional_str("InvertedSRAD", entry.inverted_srad.as_deref());
    if entry.obj_flags > 0 {
        writer.add_integer("ObjFlags", entry.obj_flags, true);
    }
    if let Some(compact_sub_obj) = entry.compact_sub_obj {
        writer.add_integer("CompactSubObj", compact_sub_obj, false);
    }
    if variant.has_configured_values() {
        writer.add_optional_str("ParameterValue", entry.parameter_value.as_deref());
        writer.add_optional_str("Denotation", entry.denotation.as_deref());
        writer.add_optional_str("UploadFile", entry.upload_file.as_deref());
        writer.add_optional_str("DownloadFile", entry.download_file.as_deref());
        writer.add_optional_str("ParamRefd", entry.param_refd.as_deref());
    }
    writer.end_section();

    for (sub_index, sub_entry) in &entry.sub_objects {
        write_sub_entry(
            writer,
            &format!("{section_name}sub{sub_index:X}"),
            sub_entry,
            variant,
        );
    }
}

fn write_sub_entry(writer: &mut Writer, section_name: &str, sub_entry: &SubEntry, variant: FileVariant) {
    writer.begin_section(section_name);
    writer.add_str("ParameterName", &sub_entry.parameter_name);
    writer.add_integer("ObjectType", sub_entry.object_type.code(), true);
    if let Some(data_type) = sub_entry.data_type {
        writer.add_str("DataType", &format!("0x{data_type:04X}"));
    }
    writer.add_str("AccessType", sub_entry.access_type.token());
    writer.add_optional_str("DefaultValue", sub_entry.default_value.as_deref());
    writer.add_optional_str("LowLimit", sub_entry.low_limit.as_deref());
    writer.add_optional_str("HighLimit", sub_entry.high_limit.as_deref());
    writer.add_bool("PDOMapping", sub_entry.pdo_mapping);
    writer.add_flag("SRDOMapping", sub_entry.srdo_mapping);
    writer.add_optional_str("InvertedSRAD", sub_entry.inverted_srad.as_deref());
    if variant.has_configured_values() {
        writer.add_optional_str("ParameterValue", sub_entry.parameter_value.as_deref());
        writer.add_optional_str("Denotation", sub_entry.denotation.as_deref());
        writer.add_optional_str("ParamRefd", sub_entry.param_refd.as_deref());
    }
    writer.end_section();
}

fn write_numbered_list<T: Display + UpperHex + Copy>(
    writer: &mut Writer,
    section_name: &str,
    count_key: &str,
    list: &[T],
    is_hex: bool,
) {
    writer.begin_section(section_name);
    writer.add_integer(count_key, list.len(), false);
    for (num, value) in list.iter().enumerate() {
        writer.add_integer(&(num + 1).to_string(), *value, is_hex);
    }
    writer.end_section();
}

fn write_comments(writer: &mut Writer, section_name: &str, comments: &Comments) {
    let last_line = comments.lines.keys().next_back().copied().unwrap_or(0);
    writer.begin_section(section_name);
    writer.add_integer("Lines", comments.line_count.max(last_line), false);
    for (num, line) in &comments.lines {
        writer.add_str(&format!("Line{num}"), line);
    }
    writer.end_section();
}

fn write_supported_modules(writer: &mut Writer, modules: &[ModuleInfo], variant: FileVariant) {
    if modules.is_empty() {
        return;
    }
    // modules are looked up by number, so the count has to cover the highest module number
    let highest = modules
        .iter()
        .map(|module| usize::from(module.module_number))
        .max()
        .unwrap_or(0);
    writer.begin_section("SupportedModules");
    writer.add_integer("NrOfEntries", highest.max(modules.len()), false);
    writer.end_section();

    for module in modules {
        write_module(writer, module, variant);
    }
}

fn write_module(writer: &mut Writer, module: &ModuleInfo, variant: FileVariant) {
    let prefix = format!("M{}", module.module_number);

    writer.begin_section(&format!("{prefix}ModuleInfo"));
    writer.add_str("ProductName", &module.product_name);
    writer.add_integer("ProductVersion", module.product_version, false);
    writer.add_integer("ProductRevision", module.product_revision, false);
    writer.add_str("OrderCode", &module.order_code);
    writer.end_section();

    if !module.fixed_objects.is_empty() {
        write_numbered_list(
            writer,
            &format!("{prefix}FixedObjects"),
            "NrOfEntries",
            &module.fixed_objects,
            true,
        );
    }
    for (index, entry) in &module.fixed_object_definitions {
        write_entry(writer, &format!("{prefix}Fixed{index:X}"), entry, variant);
    }

    if !module.sub_extends.is_empty() {
        write_numbered_list(
            writer,
            &format!("{prefix}SubExtends"),
            "NrOfEntries",
            &module.sub_extends,
            true,
        );
    }
    for (index, extension) in &module.sub_extensions {
        write_sub_extension(writer, &format!("{prefix}SubExt{index:X}"), extension);
    }

    if let Some(comments) = &module.comments {
        write_comments(writer, &format!("{prefix}Comments"), comments);
    }
}

fn write_sub_extension(writer: &mut Writer, section_name: &str, extension: &ModuleSubExtension) {
    writer.begin_section(section_name);
    writer.add_str("ParameterName", &extension.parameter_name);
    if let Some(data_type) = extension.data_type {
        writer.add_str("DataType", &format!("0x{data_type:04X}"));
    }
    writer.add_str("AccessType", extension.access_type.token());
    writer.add_optional_str("DefaultValue", extension.default_value.as_deref());
    writer.add_bool("PDOMapping", extension.pdo_mapping);
    writer.add_str("Count", &extension.count);
    if let Some(obj_extend) = extension.obj_extend {
        writer.add_integer("ObjExtend", obj_extend, false);
    }
    writer.end_section();
}

fn write_dynamic_channels(writer: &mut Writer, channels: &DynamicChannels) {
    writer.begin_section("DynamicChannels");
    writer.add_integer("NrOfSeg", channels.segments.len(), false);
    for (num, segment) in (1..).zip(&channels.segments) {
        writer.add_str(&format!("Type{num}"), &format!("0x{:04X}", segment.data_type));
        writer.add_str(&format!("Dir{num}"), segment.direction.token());
        writer.add_str(&format!("Range{num}"), &segment.range);
        writer.add_integer(&format!("PPOffset{num}"), segment.pp_offset, false);
    }
    writer.end_section();
}

fn write_tools(writer: &mut Writer, tools: &[ToolInfo]) {
    if tools.is_empty() {
        return;
    }
    writer.begin_section("Tools");
    writer.add_integer("Items", tools.len(), false);
    writer.end_section();
    for (num, tool) in (1..).zip(tools) {
        writer.begin_section(&format!("Tool{num}"));
        writer.add_str("Name", &tool.name);
        writer.add_str("Command", &tool.command);
        writer.end_section();
    }
}

// write_additional_sections()
// Sections that were not interpreted are copied in their original order. An ObjectLinks section of an object
// whose links were written above is skipped, as is any section whose name has already been written.
fn write_additional_sections(
    writer: &mut Writer,
    additional_sections: &SectionMap,
    object_dictionary: &ObjectDictionary,
    variant: FileVariant,
) {
    for section in additional_sections {
        let links_written = match classify_section(section.name(), variant) {
            SectionClass::ObjectLinks(index) => object_dictionary
                .objects
                .get(&index)
                .is_some_and(|entry| !entry.object_links.is_empty()),
            _ => false,
        };
        if links_written {
            log::debug!(
                "[{}] is written from the links of its object",
                section.name()
            );
            continue;
        }
        if writer.has_written(section.name()) {
            log::warn!(
                "additional section [{}] is skipped: a section with this name has already been written",
                section.name()
            );
            continue;
        }
        writer.add_section(section);
    }
}
