use fnv::FnvHashMap;
use std::collections::BTreeSet;
use thiserror::Error;

use crate::classify::{ModuleSection, SectionClass, SectionKind, classify_section, parse_index};
use crate::literal::{
    AccessType, IntegerLiteral, LiteralError, parse_access_type, parse_bool, parse_integer,
};
use crate::sectionmap::{Section, SectionMap};
use crate::specification::{
    BaudRates, Comments, DeviceCommissioning, DeviceConfiguration, DeviceInfo, DynamicChannelSegment,
    DynamicChannels, ElectronicDataSheet, Entry, FileInfo, ModuleInfo, ModuleSubExtension,
    ObjectCode, ObjectDictionary, SubEntry, ToolInfo,
};
use crate::variant::FileVariant;

// compact storage can only address sub-indices 1..=254
const MAX_COMPACT_SUB_INDEX: u16 = 254;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ParserError {
    #[error("{filename}: The mandatory section [{section}] is missing")]
    MissingSection {
        filename: String,
        section: &'static str,
    },

    #[error("{filename}: [{section}] {key}: {error}")]
    InvalidValue {
        filename: String,
        section: String,
        key: String,
        error: LiteralError,
    },
}

// objects and sub-objects are read the same way inside a module definition
#[derive(Debug, Clone, Copy)]
enum EntryScope {
    Device,
    Module(u16),
}

impl EntryScope {
    fn sub_object_kind(self, index: u16, sub_index: u8) -> SectionKind {
        match self {
            EntryScope::Device => SectionKind::SubObject(index, sub_index),
            EntryScope::Module(module_number) => {
                SectionKind::Module(module_number, ModuleSection::FixedSubObject(index, sub_index))
            }
        }
    }
}

// index of the classified sections
#[derive(Debug, Default)]
struct SectionCatalog {
    // position of the first section for each known kind
    known: FnvHashMap<SectionKind, usize>,
    // all indices that have an object section
    objects: BTreeSet<u16>,
    // position of the first <index>ObjectLinks section
    object_links: FnvHashMap<u16, usize>,
    // the class of every section, by position
    classes: Vec<SectionClass>,
}

// everything that is shared by EDS and DCF
#[derive(Debug)]
pub(crate) struct ParsedFile {
    pub(crate) file_info: FileInfo,
    pub(crate) device_info: DeviceInfo,
    pub(crate) device_commissioning: Option<DeviceCommissioning>,
    pub(crate) object_dictionary: ObjectDictionary,
    pub(crate) comments: Option<Comments>,
    pub(crate) supported_modules: Vec<ModuleInfo>,
    pub(crate) connected_modules: Vec<u16>,
    pub(crate) dynamic_channels: Option<DynamicChannels>,
    pub(crate) tools: Vec<ToolInfo>,
    pub(crate) additional_sections: SectionMap,
}

pub(crate) struct ParserState<'a> {
    filename: &'a str,
    sections: &'a SectionMap,
    variant: FileVariant,
    node_id: Option<u8>,
    catalog: SectionCatalog,
    claimed: Vec<bool>,
}

/// build an `ElectronicDataSheet` from the sections of an EDS file
pub(crate) fn parse_eds(
    filename: &str,
    sections: &SectionMap,
) -> Result<ElectronicDataSheet, ParserError> {
    let parsed = ParserState::new(filename, sections, FileVariant::Eds).parse_file()?;
    Ok(ElectronicDataSheet {
        file_info: parsed.file_info,
        device_info: parsed.device_info,
        object_dictionary: parsed.object_dictionary,
        comments: parsed.comments,
        supported_modules: parsed.supported_modules,
        dynamic_channels: parsed.dynamic_channels,
        tools: parsed.tools,
        additional_sections: parsed.additional_sections,
    })
}

/// build a `DeviceConfiguration` from the sections of a DCF file
pub(crate) fn parse_dcf(
    filename: &str,
    sections: &SectionMap,
) -> Result<DeviceConfiguration, ParserError> {
    let parsed = ParserState::new(filename, sections, FileVariant::Dcf).parse_file()?;
    Ok(DeviceConfiguration {
        file_info: parsed.file_info,
        device_info: parsed.device_info,
        device_commissioning: parsed.device_commissioning.unwrap_or_default(),
        object_dictionary: parsed.object_dictionary,
        comments: parsed.comments,
        supported_modules: parsed.supported_modules,
        connected_modules: parsed.connected_modules,
        dynamic_channels: parsed.dynamic_channels,
        tools: parsed.tools,
        additional_sections: parsed.additional_sections,
    })
}

impl<'a> ParserState<'a> {
    pub(crate) fn new(filename: &'a str, sections: &'a SectionMap, variant: FileVariant) -> Self {
        let mut catalog = SectionCatalog::default();
        for (pos, section) in sections.iter().enumerate() {
            let class = classify_section(section.name(), variant);
            match class {
                SectionClass::Known(kind) => {
                    if let SectionKind::Object(index) = kind {
                        catalog.objects.insert(index);
                    }
                    // e.g. [100] and [0100]: only the first one is used
                    catalog.known.entry(kind).or_insert(pos);
                }
                SectionClass::ObjectLinks(index) => {
                    catalog.object_links.entry(index).or_insert(pos);
                }
                SectionClass::Unknown => {}
            }
            catalog.classes.push(class);
        }

        Self {
            filename,
            sections,
            variant,
            node_id: None,
            catalog,
            claimed: vec![false; sections.len()],
        }
    }

    pub(crate) fn parse_file(&mut self) -> Result<ParsedFile, ParserError> {
        let device_commissioning = if self.variant.has_commissioning() {
            self.take(SectionKind::DeviceCommissioning)
                .map(|section| self.parse_device_commissioning(section))
                .transpose()?
        } else {
            None
        };
        self.node_id = self
            .variant
            .node_id_context(device_commissioning.as_ref().map(|dc| dc.node_id));

        let file_info = self
            .take(SectionKind::FileInfo)
            .map(|section| self.parse_file_info(section))
            .transpose()?
            .unwrap_or_default();

        let Some(device_info_section) = self.take(SectionKind::DeviceInfo) else {
            return Err(ParserError::MissingSection {
                filename: self.filename.to_string(),
                section: "DeviceInfo",
            });
        };
        let device_info = self.parse_device_info(device_info_section)?;

        let object_dictionary = self.parse_object_dictionary()?;
        let comments = self
            .take(SectionKind::Comments)
            .map(|section| self.parse_comments(section))
            .transpose()?;
        let supported_modules = self.parse_supported_modules()?;
        let connected_modules = if self.variant.has_connected_modules() {
            match self.take(SectionKind::ConnectedModules) {
                Some(section) => self.parse_numbered_list(section, "NrOfEntries")?,
                None => Vec::new(),
            }
        } else {
            Vec::new()
        };
        let dynamic_channels = self
            .take(SectionKind::DynamicChannels)
            .map(|section| self.parse_dynamic_channels(section))
            .transpose()?;
        let tools = self.parse_tools()?;
        let additional_sections = self.collect_unclaimed();

        log::debug!(
            "{}: parsed {} with {} objects, {} modules and {} additional sections",
            self.filename,
            self.variant.name(),
            object_dictionary.objects.len(),
            supported_modules.len(),
            additional_sections.len()
        );

        Ok(ParsedFile {
            file_info,
            device_info,
            device_commissioning,
            object_dictionary,
            comments,
            supported_modules,
            connected_modules,
            dynamic_channels,
            tools,
            additional_sections,
        })
    }

    // take()
    // get the section of the given kind and mark it as consumed
    fn take(&mut self, kind: SectionKind) -> Option<&'a Section> {
        let pos = *self.catalog.known.get(&kind)?;
        self.claimed[pos] = true;
        Some(&self.sections[pos])
    }

    // collect_unclaimed()
    // every section that was not consumed is kept unmodified, in the original order
    fn collect_unclaimed(&self) -> SectionMap {
        let mut additional = SectionMap::new();
        for (pos, section) in self.sections.iter().enumerate() {
            if self.claimed[pos] {
                continue;
            }
            if let SectionClass::Known(kind) = self.catalog.classes[pos] {
                log::warn!(
                    "{}: section [{}] ({kind:?}) could not be attached to the {} and is kept as an additional section",
                    self.filename,
                    section.name(),
                    self.variant.name()
                );
            }
            additional.push(section.clone());
        }
        additional
    }

    fn parse_file_info(&self, section: &Section) -> Result<FileInfo, ParserError> {
        let defaults = FileInfo::default();
        Ok(FileInfo {
            file_name: get_string(section, "FileName"),
            file_version: self.get_integer(section, "FileVersion", defaults.file_version)?,
            file_revision: self.get_integer(section, "FileRevision", defaults.file_revision)?,
            eds_version: section
                .get("EDSVersion")
                .map_or(defaults.eds_version, str::to_string),
            description: get_string(section, "Description"),
            creation_time: get_string(section, "CreationTime"),
            creation_date: get_string(section, "CreationDate"),
            created_by: get_string(section, "CreatedBy"),
            modification_time: get_string(section, "ModificationTime"),
            modification_date: get_string(section, "ModificationDate"),
            modified_by: get_string(section, "ModifiedBy"),
            last_eds: if self.variant.has_commissioning() {
                get_optional_string(section, "LastEDS")
            } else {
                None
            },
        })
    }

    fn parse_device_info(&self, section: &Section) -> Result<DeviceInfo, ParserError> {
        let defaults = DeviceInfo::default();
        Ok(DeviceInfo {
            vendor_name: get_string(section, "VendorName"),
            vendor_number: self.get_integer(section, "VendorNumber", 0)?,
            product_name: get_string(section, "ProductName"),
            product_number: self.get_integer(section, "ProductNumber", 0)?,
            revision_number: self.get_integer(section, "RevisionNumber", 0)?,
            order_code: get_string(section, "OrderCode"),
            baud_rates: BaudRates {
                baud_10: get_bool(section, "BaudRate_10"),
                baud_20: get_bool(section, "BaudRate_20"),
                baud_50: get_bool(section, "BaudRate_50"),
                baud_125: get_bool(section, "BaudRate_125"),
                baud_250: get_bool(section, "BaudRate_250"),
                baud_500: get_bool(section, "BaudRate_500"),
                baud_800: get_bool(section, "BaudRate_800"),
                baud_1000: get_bool(section, "BaudRate_1000"),
            },
            simple_boot_up_master: get_bool(section, "SimpleBootUpMaster"),
            simple_boot_up_slave: get_bool(section, "SimpleBootUpSlave"),
            granularity: self.get_integer(section, "Granularity", defaults.granularity)?,
            dynamic_channels_supported: self.get_integer(section, "DynamicChannelsSupported", 0)?,
            group_messaging: get_bool(section, "GroupMessaging"),
            nr_of_rx_pdo: self.get_integer(section, "NrOfRXPDO", 0)?,
            nr_of_tx_pdo: self.get_integer(section, "NrOfTXPDO", 0)?,
            lss_supported: get_bool(section, "LSS_Supported"),
            compact_pdo: self.get_integer(section, "CompactPDO", 0)?,
            canopen_safety_supported: get_bool(section, "CANopenSafetySupported"),
        })
    }

    fn parse_device_commissioning(
        &self,
        section: &Section,
    ) -> Result<DeviceCommissioning, ParserError> {
        let defaults = DeviceCommissioning::default();
        Ok(DeviceCommissioning {
            node_id: self.get_integer(section, "NodeID", defaults.node_id)?,
            node_name: get_string(section, "NodeName"),
            baudrate: self.get_integer(section, "Baudrate", defaults.baudrate)?,
            net_number: self.get_integer(section, "NetNumber", 0)?,
            network_name: get_string(section, "NetworkName"),
            canopen_manager: get_bool(section, "CANopenManager"),
            lss_serial_number: self.get_optional_integer(section, "LSS_SerialNumber")?,
            node_refd: get_optional_string(section, "NodeRefd"),
            net_refd: get_optional_string(section, "NetRefd"),
        })
    }

    fn parse_object_dictionary(&mut self) -> Result<ObjectDictionary, ParserError> {
        let mut object_dictionary = ObjectDictionary::default();

        for (kind, list) in [
            (
                SectionKind::MandatoryObjects,
                &mut object_dictionary.mandatory_objects,
            ),
            (
                SectionKind::OptionalObjects,
                &mut object_dictionary.optional_objects,
            ),
            (
                SectionKind::ManufacturerObjects,
                &mut object_dictionary.manufacturer_objects,
            ),
        ] {
            if let Some(section) = self.take(kind) {
                *list = self.parse_numbered_list(section, "SupportedObjects")?;
            }
        }

        // every object section is read, even if the index is missing from the object lists
        let indices: Vec<u16> = self.catalog.objects.iter().copied().collect();
        for index in indices {
            if let Some(section) = self.take(SectionKind::Object(index)) {
                let mut entry = self.parse_entry(index, section, EntryScope::Device)?;
                self.parse_object_links(&mut entry)?;
                if self.variant.has_compact_storage() {
                    self.apply_compact_storage(&mut entry)?;
                }
                object_dictionary.objects.insert(index, entry);
            }
        }

        if let Some(section) = self.take(SectionKind::DummyUsage) {
            for (key, value) in section.iter() {
                let data_type = key
                    .get(..5)
                    .filter(|prefix| prefix.eq_ignore_ascii_case("Dummy"))
                    .and_then(|_| parse_index(&key[5..]));
                match data_type {
                    Some(data_type) => {
                        object_dictionary
                            .dummy_usage
                            .insert(data_type, parse_bool(value));
                    }
                    None => log::warn!(
                        "{}: ignoring unexpected key \"{key}\" in [DummyUsage]",
                        self.filename
                    ),
                }
            }
        }

        Ok(object_dictionary)
    }

    fn parse_entry(
        &mut self,
        index: u16,
        section: &Section,
        scope: EntryScope,
    ) -> Result<Entry, ParserError> {
        let mut entry = Entry {
            index,
            parameter_name: get_string(section, "ParameterName"),
            object_type: ObjectCode::from_code(self.get_integer(section, "ObjectType", 7)?),
            data_type: self.get_optional_integer(section, "DataType")?,
            access_type: self.get_access_type(section),
            default_value: get_optional_string(section, "DefaultValue"),
            low_limit: get_optional_string(section, "LowLimit"),
            high_limit: get_optional_string(section, "HighLimit"),
            pdo_mapping: get_bool(section, "PDOMapping"),
            srdo_mapping: get_bool(section, "SRDOMapping"),
            inverted_srad: get_optional_string(section, "InvertedSRAD"),
            obj_flags: self.get_integer(section, "ObjFlags", 0)?,
            sub_number: self
                .get_optional_integer(section, "SubNumber")?
                .filter(|count| *count > 0),
            compact_sub_obj: self
                .get_optional_integer(section, "CompactSubObj")?
                .filter(|count| *count > 0),
            ..Entry::default()
        };

        if self.variant.has_configured_values() {
            entry.parameter_value = get_optional_string(section, "ParameterValue");
            entry.denotation = get_optional_string(section, "Denotation");
            entry.upload_file = get_optional_string(section, "UploadFile");
            entry.download_file = get_optional_string(section, "DownloadFile");
            entry.param_refd = get_optional_string(section, "ParamRefd");
        }

        if self
            .variant
            .triggers_sub_objects(entry.object_type, entry.sub_number)
        {
            let max_sub_index = entry
                .sub_number
                .unwrap_or(0)
                .max(entry.compact_sub_obj.unwrap_or(0));
            // only sub-objects that have their own section are created
            for sub_index in 0..=max_sub_index {
                if let Some(sub_section) = self.take(scope.sub_object_kind(index, sub_index)) {
                    let sub_entry = self.parse_sub_entry(sub_index, sub_section)?;
                    entry.sub_objects.insert(sub_index, sub_entry);
                }
            }
        }

        Ok(entry)
    }

    fn parse_sub_entry(&self, sub_index: u8, section: &Section) -> Result<SubEntry, ParserError> {
        let mut sub_entry = SubEntry {
            sub_index,
            parameter_name: get_string(section, "ParameterName"),
            object_type: ObjectCode::from_code(self.get_integer(section, "ObjectType", 7)?),
            data_type: self.get_optional_integer(section, "DataType")?,
            access_type: self.get_access_type(section),
            default_value: get_optional_string(section, "DefaultValue"),
            low_limit: get_optional_string(section, "LowLimit"),
            high_limit: get_optional_string(section, "HighLimit"),
            pdo_mapping: get_bool(section, "PDOMapping"),
            srdo_mapping: get_bool(section, "SRDOMapping"),
            inverted_srad: get_optional_string(section, "InvertedSRAD"),
            ..SubEntry::default()
        };

        if self.variant.has_configured_values() {
            sub_entry.parameter_value = get_optional_string(section, "ParameterValue");
            sub_entry.denotation = get_optional_string(section, "Denotation");
            sub_entry.param_refd = get_optional_string(section, "ParamRefd");
        }

        Ok(sub_entry)
    }

    // parse_object_links()
    // The links section is read but not claimed, so it also stays in the additional sections
    fn parse_object_links(&self, entry: &mut Entry) -> Result<(), ParserError> {
        let Some(pos) = self.catalog.object_links.get(&entry.index) else {
            return Ok(());
        };
        let section = &self.sections[*pos];
        entry.object_links = self.parse_numbered_list(section, "ObjectLinks")?;
        Ok(())
    }

    // apply_compact_storage()
    // [<index>Value] and [<index>Denotation] only update sub-objects that already exist
    fn apply_compact_storage(&mut self, entry: &mut Entry) -> Result<(), ParserError> {
        if let Some(section) = self.take(SectionKind::CompactValue(entry.index)) {
            for (sub_index, value) in self.compact_rows(section)? {
                match entry.sub_objects.get_mut(&sub_index) {
                    Some(sub_entry) => sub_entry.parameter_value = Some(value),
                    None => log::warn!(
                        "{}: [{}] addresses the missing sub-object {sub_index}; the value is dropped",
                        self.filename,
                        section.name()
                    ),
                }
            }
        }
        if let Some(section) = self.take(SectionKind::CompactDenotation(entry.index)) {
            for (sub_index, denotation) in self.compact_rows(section)? {
                match entry.sub_objects.get_mut(&sub_index) {
                    Some(sub_entry) => sub_entry.denotation = Some(denotation),
                    None => log::warn!(
                        "{}: [{}] addresses the missing sub-object {sub_index}; the denotation is dropped",
                        self.filename,
                        section.name()
                    ),
                }
            }
        }
        Ok(())
    }

    fn compact_rows(&self, section: &Section) -> Result<Vec<(u8, String)>, ParserError> {
        let count: u16 = self.get_integer(section, "NrOfEntries", 0)?;
        let mut rows = Vec::new();
        for row in 1..=count.min(MAX_COMPACT_SUB_INDEX) {
            if let Some(value) = get_optional_string(section, &row.to_string()) {
                let sub_index = u8::try_from(row).unwrap_or(u8::MAX);
                rows.push((sub_index, value));
            }
        }
        Ok(rows)
    }

    fn parse_comments(&self, section: &Section) -> Result<Comments, ParserError> {
        let line_count: u16 = self.get_integer(section, "Lines", 0)?;
        let lines = (1..=line_count)
            .filter_map(|num| {
                get_optional_string(section, &format!("Line{num}")).map(|line| (num, line))
            })
            .collect();
        Ok(Comments { line_count, lines })
    }

    fn parse_supported_modules(&mut self) -> Result<Vec<ModuleInfo>, ParserError> {
        let Some(section) = self.take(SectionKind::SupportedModules) else {
            return Ok(Vec::new());
        };
        let count: u16 = self.get_integer(section, "NrOfEntries", 0)?;
        let mut modules = Vec::new();
        for module_number in 1..=count {
            if let Some(info_section) =
                self.take(SectionKind::Module(module_number, ModuleSection::Info))
            {
                modules.push(self.parse_module(module_number, info_section)?);
            }
        }
        Ok(modules)
    }

    fn parse_module(
        &mut self,
        module_number: u16,
        section: &Section,
    ) -> Result<ModuleInfo, ParserError> {
        let defaults = ModuleInfo::new(module_number);
        let mut module = ModuleInfo {
            product_name: get_string(section, "ProductName"),
            product_version: self.get_integer(section, "ProductVersion", defaults.product_version)?,
            product_revision: self.get_integer(section, "ProductRevision", 0)?,
            order_code: get_string(section, "OrderCode"),
            ..defaults
        };

        if let Some(list_section) =
            self.take(SectionKind::Module(module_number, ModuleSection::FixedObjects))
        {
            module.fixed_objects = self.parse_numbered_list(list_section, "NrOfEntries")?;
        }
        for index in module.fixed_objects.clone() {
            let kind = SectionKind::Module(module_number, ModuleSection::FixedObject(index));
            if let Some(entry_section) = self.take(kind) {
                let entry =
                    self.parse_entry(index, entry_section, EntryScope::Module(module_number))?;
                module.fixed_object_definitions.insert(index, entry);
            }
        }

        if let Some(list_section) =
            self.take(SectionKind::Module(module_number, ModuleSection::SubExtends))
        {
            module.sub_extends = self.parse_numbered_list(list_section, "NrOfEntries")?;
        }
        for index in module.sub_extends.clone() {
            let kind = SectionKind::Module(module_number, ModuleSection::SubExtension(index));
            if let Some(ext_section) = self.take(kind) {
                let extension = self.parse_sub_extension(index, ext_section)?;
                module.sub_extensions.insert(index, extension);
            }
        }

        module.comments = self
            .take(SectionKind::Module(module_number, ModuleSection::Comments))
            .map(|comment_section| self.parse_comments(comment_section))
            .transpose()?;

        Ok(module)
    }

    fn parse_sub_extension(
        &self,
        index: u16,
        section: &Section,
    ) -> Result<ModuleSubExtension, ParserError> {
        Ok(ModuleSubExtension {
            index,
            parameter_name: get_string(section, "ParameterName"),
            data_type: self.get_optional_integer(section, "DataType")?,
            access_type: self.get_access_type(section),
            default_value: get_optional_string(section, "DefaultValue"),
            pdo_mapping: get_bool(section, "PDOMapping"),
            count: get_string(section, "Count"),
            obj_extend: self.get_optional_integer(section, "ObjExtend")?,
        })
    }

    fn parse_dynamic_channels(&self, section: &Section) -> Result<DynamicChannels, ParserError> {
        let count: u16 = self.get_integer(section, "NrOfSeg", 0)?;
        let mut segments = Vec::with_capacity(usize::from(count));
        for seg in 1..=count {
            segments.push(DynamicChannelSegment {
                data_type: self.get_integer(section, &format!("Type{seg}"), 0)?,
                direction: parse_access_type(&get_string(
                    section,
                    &format!("Dir{seg}"),
                )),
                range: get_string(section, &format!("Range{seg}")),
                pp_offset: self.get_integer(section, &format!("PPOffset{seg}"), 0)?,
            });
        }
        Ok(DynamicChannels { segments })
    }

    fn parse_tools(&mut self) -> Result<Vec<ToolInfo>, ParserError> {
        let Some(section) = self.take(SectionKind::Tools) else {
            return Ok(Vec::new());
        };
        let count: u16 = self.get_integer(section, "Items", 0)?;
        let mut tools = Vec::new();
        for tool_number in 1..=count {
            if let Some(tool_section) = self.take(SectionKind::Tool(tool_number)) {
                tools.push(ToolInfo {
                    name: get_string(tool_section, "Name"),
                    command: get_string(tool_section, "Command"),
                });
            }
        }
        Ok(tools)
    }

    // parse_numbered_list()
    // a count key followed by the keys 1..=count; missing and empty keys are skipped
    fn parse_numbered_list(&self, section: &Section, count_key: &str) -> Result<Vec<u16>, ParserError> {
        let count: u16 = self.get_integer(section, count_key, 0)?;
        let mut list = Vec::new();
        for num in 1..=count {
            let key = num.to_string();
            if let Some(value) = self.get_optional_integer(section, &key)? {
                list.push(value);
            }
        }
        Ok(list)
    }

    // get_integer()
    // a missing key results in the default value, an empty value is 0
    fn get_integer<T: IntegerLiteral>(
        &self,
        section: &Section,
        key: &str,
        default: T,
    ) -> Result<T, ParserError> {
        match section.get(key) {
            Some(text) => parse_integer(text, self.node_id).map_err(|error| {
                ParserError::invalid_value(self.filename, section, key, error)
            }),
            None => Ok(default),
        }
    }

    // get_optional_integer()
    // missing and empty values are both None
    fn get_optional_integer<T: IntegerLiteral>(
        &self,
        section: &Section,
        key: &str,
    ) -> Result<Option<T>, ParserError> {
        match section.get(key).filter(|text| !text.is_empty()) {
            Some(text) => parse_integer(text, self.node_id)
                .map(Some)
                .map_err(|error| ParserError::invalid_value(self.filename, section, key, error)),
            None => Ok(None),
        }
    }

    fn get_access_type(&self, section: &Section) -> AccessType {
        let text = get_string(section, "AccessType");
        match AccessType::from_token(&text) {
            Some(access_type) => access_type,
            None => {
                if !text.is_empty() {
                    log::warn!(
                        "{}: [{}] unknown AccessType \"{text}\", using \"ro\"",
                        self.filename,
                        section.name()
                    );
                }
                AccessType::ReadOnly
            }
        }
    }
}

impl ParserError {
    pub(crate) fn invalid_value(
        filename: &str,
        section: &Section,
        key: &str,
        error: LiteralError,
    ) -> Self {
        Self::InvalidValue {
            filename: filename.to_string(),
            section: section.name().to_string(),
            key: key.to_string(),
            error,
        }
    }
}

fn get_string(section: &Section, key: &str) -> String {
    section.get(key).unwrap_or_default().to_string()
}

fn get_optional_string(section: &Section, key: &str) -> Option<String> {
    section
        .get(key)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

fn get_bool(section: &Section, key: &str) -> bool {
    section.get(key).is_some_and(parse_bool)
}
