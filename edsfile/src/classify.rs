use crate::variant::FileVariant;

/// A section with a fixed meaning in the object dictionary formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKind {
    FileInfo,
    DeviceInfo,
    DeviceCommissioning,
    DummyUsage,
    MandatoryObjects,
    OptionalObjects,
    ManufacturerObjects,
    Comments,
    SupportedModules,
    ConnectedModules,
    DynamicChannels,
    Tools,
    Tool(u16),
    /// `[<index>]`
    Object(u16),
    /// `[<index>sub<subindex>]`
    SubObject(u16, u8),
    /// `[<index>Value]`
    CompactValue(u16),
    /// `[<index>Denotation]`
    CompactDenotation(u16),
    /// `[M<n>...]`
    Module(u16, ModuleSection),
}

/// The part of a module description that is stored in a `[M<n>...]` section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModuleSection {
    Info,
    FixedObjects,
    FixedObject(u16),
    FixedSubObject(u16, u8),
    SubExtends,
    SubExtension(u16),
    Comments,
    /// any other `[M<n>SubExt...]` section; it is kept in the additional sections
    Other,
}

/// The result of classifying a section name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionClass {
    Known(SectionKind),
    /// `[<index>ObjectLinks]`: read into the entry, but also kept with the unknown sections
    ObjectLinks(u16),
    Unknown,
}

type Matcher = fn(&str, FileVariant) -> Option<SectionClass>;

// the order of the matchers is significant: the first match wins
const MATCHERS: [Matcher; 6] = [
    match_top_level,
    match_object,
    match_sub_object,
    match_compact_storage,
    match_module,
    match_object_links,
];

/// Classify a section by its name
///
/// Names are compared case-insensitively. A name that no matcher recognizes is [`SectionClass::Unknown`].
#[must_use]
pub fn classify_section(name: &str, variant: FileVariant) -> SectionClass {
    let lowercase = name.trim().to_ascii_lowercase();
    let class = MATCHERS
        .iter()
        .find_map(|matcher| matcher(&lowercase, variant))
        .unwrap_or(SectionClass::Unknown);
    log::trace!("section [{name}] is {class:?}");
    class
}

fn match_top_level(name: &str, variant: FileVariant) -> Option<SectionClass> {
    let kind = match name {
        "fileinfo" => SectionKind::FileInfo,
        "deviceinfo" => SectionKind::DeviceInfo,
        "dummyusage" => SectionKind::DummyUsage,
        "mandatoryobjects" => SectionKind::MandatoryObjects,
        "optionalobjects" => SectionKind::OptionalObjects,
        "manufacturerobjects" => SectionKind::ManufacturerObjects,
        "comments" => SectionKind::Comments,
        "supportedmodules" => SectionKind::SupportedModules,
        "dynamicchannels" => SectionKind::DynamicChannels,
        "tools" => SectionKind::Tools,
        "devicecommissioning" | "devicecomissioning" if variant.has_commissioning() => {
            SectionKind::DeviceCommissioning
        }
        "connectedmodules" if variant.has_connected_modules() => SectionKind::ConnectedModules,
        _ => {
            let number = name.strip_prefix("tool")?;
            SectionKind::Tool(parse_decimal(number)?)
        }
    };
    Some(SectionClass::Known(kind))
}

fn match_object(name: &str, _variant: FileVariant) -> Option<SectionClass> {
    let index = parse_index(name)?;
    Some(SectionClass::Known(SectionKind::Object(index)))
}

fn match_sub_object(name: &str, _variant: FileVariant) -> Option<SectionClass> {
    let (index, sub_index) = parse_index_sub(name)?;
    Some(SectionClass::Known(SectionKind::SubObject(index, sub_index)))
}

fn match_compact_storage(name: &str, variant: FileVariant) -> Option<SectionClass> {
    if !variant.has_compact_storage() {
        return None;
    }
    if let Some(index) = name.strip_suffix("value").and_then(parse_index) {
        Some(SectionClass::Known(SectionKind::CompactValue(index)))
    } else {
        let index = parse_index(name.strip_suffix("denotation")?)?;
        Some(SectionClass::Known(SectionKind::CompactDenotation(index)))
    }
}

fn match_module(name: &str, _variant: FileVariant) -> Option<SectionClass> {
    let rest = name.strip_prefix('m')?;
    let digit_count = rest.bytes().take_while(u8::is_ascii_digit).count();
    let module_number = parse_decimal(&rest[..digit_count])?;
    let suffix = &rest[digit_count..];

    let module_section = if suffix == "moduleinfo" {
        ModuleSection::Info
    } else if suffix == "fixedobjects" {
        ModuleSection::FixedObjects
    } else if let Some(fixed) = suffix.strip_prefix("fixed") {
        if let Some(index) = parse_index(fixed) {
            ModuleSection::FixedObject(index)
        } else {
            let (index, sub_index) = parse_index_sub(fixed)?;
            ModuleSection::FixedSubObject(index, sub_index)
        }
    } else if suffix.starts_with("subextend") {
        ModuleSection::SubExtends
    } else if let Some(ext) = suffix.strip_prefix("subext") {
        parse_index(ext).map_or(ModuleSection::Other, ModuleSection::SubExtension)
    } else if suffix == "comments" {
        ModuleSection::Comments
    } else {
        return None;
    };
    Some(SectionClass::Known(SectionKind::Module(
        module_number,
        module_section,
    )))
}

fn match_object_links(name: &str, _variant: FileVariant) -> Option<SectionClass> {
    let index = parse_index(name.strip_suffix("objectlinks")?)?;
    Some(SectionClass::ObjectLinks(index))
}

// parse_index()
// an object index has 1 to 4 hex digits
pub(crate) fn parse_index(text: &str) -> Option<u16> {
    if text.is_empty() || text.len() > 4 || !text.bytes().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    u16::from_str_radix(text, 16).ok()
}

// parse_index_sub()
// "<index>sub<subindex>" with 1 to 2 hex digits for the sub-index
fn parse_index_sub(text: &str) -> Option<(u16, u8)> {
    let pos = text.find("sub")?;
    let index = parse_index(&text[..pos])?;
    let sub_text = &text[pos + 3..];
    if sub_text.is_empty() || sub_text.len() > 2 || !sub_text.bytes().all(|c| c.is_ascii_hexdigit())
    {
        return None;
    }
    let sub_index = u8::from_str_radix(sub_text, 16).ok()?;
    Some((index, sub_index))
}

fn parse_decimal(text: &str) -> Option<u16> {
    if text.is_empty() || !text.bytes().all(|c| c.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}
