use crate::specification::ObjectCode;

/// The two dialects that share the object dictionary parser and writer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileVariant {
    /// electronic data sheet: describes a device type
    Eds,
    /// device configuration file: describes a configured device with a node id
    Dcf,
}

impl FileVariant {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            FileVariant::Eds => "EDS",
            FileVariant::Dcf => "DCF",
        }
    }

    /// Should the sub-objects of an entry be read?
    ///
    /// An explicit SubNumber always triggers the search. Otherwise both variants
    /// search the sub-objects of ARRAY and RECORD objects, while DEFSTRUCT only
    /// triggers it in an EDS.
    #[must_use]
    pub fn triggers_sub_objects(self, object_type: ObjectCode, sub_number: Option<u8>) -> bool {
        if sub_number.unwrap_or(0) > 0 {
            return true;
        }
        match self {
            FileVariant::Eds => matches!(
                object_type,
                ObjectCode::DefStruct | ObjectCode::Array | ObjectCode::Record
            ),
            FileVariant::Dcf => matches!(object_type, ObjectCode::Array | ObjectCode::Record),
        }
    }

    /// `[DeviceCommissioning]` and `LastEDS`
    #[must_use]
    pub fn has_commissioning(self) -> bool {
        self == FileVariant::Dcf
    }

    /// ParameterValue, Denotation, UploadFile, DownloadFile and ParamRefd of objects
    #[must_use]
    pub fn has_configured_values(self) -> bool {
        self == FileVariant::Dcf
    }

    /// the `<index>Value` and `<index>Denotation` sections
    #[must_use]
    pub fn has_compact_storage(self) -> bool {
        self == FileVariant::Dcf
    }

    /// `[ConnectedModules]`
    #[must_use]
    pub fn has_connected_modules(self) -> bool {
        self == FileVariant::Dcf
    }

    /// the node id used to evaluate $NODEID formulas while reading
    ///
    /// Only a DCF has a node id; in an EDS a formula has to stay unevaluated.
    pub(crate) fn node_id_context(self, commissioned_node_id: Option<u8>) -> Option<u8> {
        match self {
            FileVariant::Eds => None,
            FileVariant::Dcf => commissioned_node_id,
        }
    }
}
