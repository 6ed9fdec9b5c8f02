//! edsfile is a library that allows you to read, modify and write CANopen electronic data sheets (EDS)
//! and device configuration files (DCF), as described in CiA 306.
//!
//! Sections that are not understood are preserved, so that a file can be loaded and written again
//! without losing any data.
//!
//! # Features
//!
//! - `nodelist`: read and write nodelist project files (CPJ), which describe the topology of a network

mod classify;
mod configure;
mod dictionary;
mod literal;
mod loader;
#[cfg(feature = "nodelist")]
mod nodelist;
mod parser;
mod sectionmap;
mod specification;
mod tokenizer;
mod variant;
mod writer;

use std::path::Path;
use std::path::PathBuf;
use thiserror::Error;

pub use classify::{ModuleSection, SectionClass, SectionKind, classify_section};
pub use dictionary::{ObjectCategory, PdoDirection};
pub use literal::{
    AccessType, IntegerLiteral, LiteralError, is_node_id_formula, parse_access_type, parse_bool,
    parse_integer,
};
#[cfg(feature = "nodelist")]
pub use nodelist::{NetworkNode, NetworkTopology, NodelistProject};
pub use parser::ParserError;
pub use sectionmap::{Section, SectionMap};
pub use specification::*;
pub use tokenizer::TokenizerError;
pub use variant::FileVariant;

/// The default limit for the size of an input file: 10 MiB
pub const DEFAULT_MAX_INPUT_SIZE: usize = 10 * 1024 * 1024;

// name used in error messages when the data does not come from a file
const STRING_INPUT: &str = "(string)";

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EdsError {
    /// `FileOpenError`: An `IoError` that occurred while loading a file
    #[error("Failed to load {filename}: {ioerror}")]
    FileOpenError {
        filename: PathBuf,
        ioerror: std::io::Error,
    },

    /// `FileReadError`: An `IoError` that occurred while reading from a file
    #[error("Could not read from {filename}: {ioerror}")]
    FileReadError {
        filename: PathBuf,
        ioerror: std::io::Error,
    },

    /// `FileTooLarge`: The file exceeds the size limit of the `LoadOptions`
    #[error("File {filename} has {size} bytes, which exceeds the limit of {limit} bytes")]
    FileTooLarge {
        filename: PathBuf,
        size: usize,
        limit: usize,
    },

    /// `TokenizerError`: Failed to tokenize the input
    #[error("Tokenizer error: {tokenizer_error}")]
    TokenizerError { tokenizer_error: TokenizerError },

    /// `ParserError`: Invalid data, the file could not be parsed
    #[error("Parser error: {parser_error}")]
    ParserError { parser_error: ParserError },

    /// `FileWriteError`: An `IoError` that occurred while writing to a file
    #[error("Could not write to {filename}: {ioerror}")]
    FileWriteError {
        filename: PathBuf,
        ioerror: std::io::Error,
    },
}

/// Options that control loading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    /// Input that is larger than this number of bytes is rejected before it is tokenized
    pub max_input_size: usize,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            max_input_size: DEFAULT_MAX_INPUT_SIZE,
        }
    }
}

impl LoadOptions {
    #[must_use]
    pub fn with_max_input_size(mut self, max_input_size: usize) -> Self {
        self.max_input_size = max_input_size;
        self
    }
}

/**
Load an electronic data sheet (EDS) from a file

The file may be encoded as UTF-8, UTF-16, UTF-32 or ISO8859-1.

# Example
```
# use edsfile::{EdsError, LoadOptions};
match edsfile::load_eds("example.eds", &LoadOptions::default()) {
    Ok(eds) => {/* do something with it*/},
    Err(error_message) => println!("{error_message}")
}
```

# Errors

An `EdsError` provides details if loading the file fails.
 */
pub fn load_eds<P: AsRef<Path>>(
    path: P,
    options: &LoadOptions,
) -> Result<ElectronicDataSheet, EdsError> {
    let pathref = path.as_ref();
    let filedata = loader::load(pathref, options.max_input_size)?;
    let sections = tokenize(&pathref.to_string_lossy(), &filedata, options)?;
    parser::parse_eds(&pathref.to_string_lossy(), &sections)
        .map_err(|parser_error| EdsError::ParserError { parser_error })
}

/**
Load an electronic data sheet (EDS) stored in a string

# Example

```rust
# use edsfile::{EdsError, LoadOptions};
# fn main() -> Result<(), EdsError> {
let text = r#"
[DeviceInfo]
VendorName=ACME
ProductName=Widget

[1000]
ParameterName=Device Type
DataType=0x0007
AccessType=ro
DefaultValue=0x00000191
"#;
let eds = edsfile::load_eds_from_string(text, &LoadOptions::default())?;
assert_eq!(eds.object_dictionary.objects[&0x1000].parameter_name, "Device Type");
# Ok(())
# }
```

# Errors

An `EdsError` provides details if the data cannot be parsed.
 */
pub fn load_eds_from_string(
    text: &str,
    options: &LoadOptions,
) -> Result<ElectronicDataSheet, EdsError> {
    let sections = tokenize(STRING_INPUT, text, options)?;
    parser::parse_eds(STRING_INPUT, &sections)
        .map_err(|parser_error| EdsError::ParserError { parser_error })
}

/// Load a device configuration file (DCF) from a file
///
/// Node id formulas in the file are evaluated with the node id from `[DeviceCommissioning]`.
///
/// # Errors
///
/// An `EdsError` provides details if loading the file fails.
pub fn load_dcf<P: AsRef<Path>>(
    path: P,
    options: &LoadOptions,
) -> Result<DeviceConfiguration, EdsError> {
    let pathref = path.as_ref();
    let filedata = loader::load(pathref, options.max_input_size)?;
    let sections = tokenize(&pathref.to_string_lossy(), &filedata, options)?;
    parser::parse_dcf(&pathref.to_string_lossy(), &sections)
        .map_err(|parser_error| EdsError::ParserError { parser_error })
}

/// Load a device configuration file (DCF) stored in a string
///
/// # Errors
///
/// An `EdsError` provides details if the data cannot be parsed.
pub fn load_dcf_from_string(
    text: &str,
    options: &LoadOptions,
) -> Result<DeviceConfiguration, EdsError> {
    let sections = tokenize(STRING_INPUT, text, options)?;
    parser::parse_dcf(STRING_INPUT, &sections)
        .map_err(|parser_error| EdsError::ParserError { parser_error })
}

/// Split a string into sections of key/value pairs, without interpreting them
///
/// # Errors
///
/// [`EdsError::TokenizerError`] if the text is not in the section format, or if it exceeds the size limit.
pub fn load_sections_from_string(text: &str, options: &LoadOptions) -> Result<SectionMap, EdsError> {
    tokenize(STRING_INPUT, text, options)
}

/// Load a nodelist project (CPJ) from a file
///
/// # Errors
///
/// An `EdsError` provides details if loading the file fails.
#[cfg(feature = "nodelist")]
pub fn load_nodelist<P: AsRef<Path>>(
    path: P,
    options: &LoadOptions,
) -> Result<NodelistProject, EdsError> {
    let pathref = path.as_ref();
    let filedata = loader::load(pathref, options.max_input_size)?;
    let sections = tokenize(&pathref.to_string_lossy(), &filedata, options)?;
    Ok(nodelist::parse_nodelist(&sections))
}

/// Load a nodelist project (CPJ) stored in a string
///
/// # Errors
///
/// [`EdsError::TokenizerError`] if the text is not in the section format, or if it exceeds the size limit.
#[cfg(feature = "nodelist")]
pub fn load_nodelist_from_string(
    text: &str,
    options: &LoadOptions,
) -> Result<NodelistProject, EdsError> {
    let sections = tokenize(STRING_INPUT, text, options)?;
    Ok(nodelist::parse_nodelist(&sections))
}

fn tokenize(filename: &str, text: &str, options: &LoadOptions) -> Result<SectionMap, EdsError> {
    tokenizer::tokenize(filename, text, options.max_input_size)
        .map_err(|tokenizer_error| EdsError::TokenizerError { tokenizer_error })
}

fn write_file<P: AsRef<Path>>(path: P, text: String) -> Result<(), EdsError> {
    std::fs::write(&path, text).map_err(|ioerror| EdsError::FileWriteError {
        filename: path.as_ref().to_path_buf(),
        ioerror,
    })
}

impl ElectronicDataSheet {
    /// construct a string containing the whole EDS
    #[must_use]
    pub fn write_to_string(&self) -> String {
        writer::write_eds(self, None)
    }

    /// write this `ElectronicDataSheet` to the given file
    ///
    /// the banner will be placed in comment lines at the beginning of the file
    ///
    /// # Errors
    ///
    /// [`EdsError::FileWriteError`] if writing the file fails.
    pub fn write<P: AsRef<Path>>(&self, path: P, banner: Option<&str>) -> Result<(), EdsError> {
        write_file(path, writer::write_eds(self, banner))
    }
}

impl DeviceConfiguration {
    /// construct a string containing the whole DCF
    #[must_use]
    pub fn write_to_string(&self) -> String {
        writer::write_dcf(self, None)
    }

    /// write this `DeviceConfiguration` to the given file
    ///
    /// the banner will be placed in comment lines at the beginning of the file
    ///
    /// # Errors
    ///
    /// [`EdsError::FileWriteError`] if writing the file fails.
    pub fn write<P: AsRef<Path>>(&self, path: P, banner: Option<&str>) -> Result<(), EdsError> {
        write_file(path, writer::write_dcf(self, banner))
    }
}

#[cfg(feature = "nodelist")]
impl NodelistProject {
    /// construct a string containing the whole nodelist project
    #[must_use]
    pub fn write_to_string(&self) -> String {
        nodelist::write_nodelist(self, None)
    }

    /// write this `NodelistProject` to the given file
    ///
    /// # Errors
    ///
    /// [`EdsError::FileWriteError`] if writing the file fails.
    pub fn write<P: AsRef<Path>>(&self, path: P, banner: Option<&str>) -> Result<(), EdsError> {
        write_file(path, nodelist::write_nodelist(self, banner))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    static EDS_TEXT: &str = r#"
[FileInfo]
FileName=test.eds
FileRevision=2

[DeviceInfo]
VendorName=ACME
VendorNumber=0x1234
ProductName=Widget

[MandatoryObjects]
SupportedObjects=1
1=0x1000

[1000]
ParameterName=Device Type
DataType=0x0007
AccessType=ro
DefaultValue=0x00000191
"#;

    #[test]
    fn load_empty_input() {
        let result = load_eds_from_string("", &LoadOptions::default());
        assert!(matches!(
            result,
            Err(EdsError::ParserError {
                parser_error: ParserError::MissingSection { .. }
            })
        ));
    }

    #[test]
    fn input_size_limit() {
        let options = LoadOptions::default().with_max_input_size(16);
        let result = load_eds_from_string(EDS_TEXT, &options);
        assert!(matches!(
            result,
            Err(EdsError::TokenizerError {
                tokenizer_error: TokenizerError::InputTooLarge { limit: 16, .. }
            })
        ));
        assert_eq!(LoadOptions::default().max_input_size, 10 * 1024 * 1024);
    }

    #[test]
    fn test_load_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.eds");
        std::fs::write(&path, EDS_TEXT).unwrap();

        let eds = load_eds(&path, &LoadOptions::default()).unwrap();
        assert_eq!(eds.file_info.file_revision, 2);
        assert_eq!(eds.object_dictionary.mandatory_objects, vec![0x1000]);

        let result = load_eds(dir.path().join("nonexistent.eds"), &LoadOptions::default());
        assert!(matches!(result, Err(EdsError::FileOpenError { .. })));

        let options = LoadOptions::default().with_max_input_size(10);
        let result = load_eds(&path, &options);
        assert!(matches!(result, Err(EdsError::FileTooLarge { limit: 10, .. })));
    }

    #[test]
    fn write_nonexistent_file() {
        let eds = load_eds_from_string(EDS_TEXT, &LoadOptions::default()).unwrap();
        let result = eds.write("__NONEXISTENT__/__FILE__/__PATH__/test.eds", None);
        assert!(matches!(result, Err(EdsError::FileWriteError { .. })));
        let message = result.unwrap_err().to_string();
        assert!(message.contains("__NONEXISTENT__"));
    }

    #[test]
    fn write_with_banner() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.eds");

        let eds = load_eds_from_string(EDS_TEXT, &LoadOptions::default()).unwrap();
        eds.write(&path, Some("test case write_with_banner()")).unwrap();
        let file_text = std::fs::read_to_string(&path).unwrap();
        assert!(file_text.starts_with("; test case write_with_banner()\n"));

        let reloaded = load_eds(&path, &LoadOptions::default()).unwrap();
        assert_eq!(reloaded, eds);
    }

    #[test]
    fn load_dcf_data() {
        let text = format!("{EDS_TEXT}\n[DeviceCommissioning]\nNodeID=0x05\nBaudrate=500\n");
        let dcf = load_dcf_from_string(&text, &LoadOptions::default()).unwrap();
        assert_eq!(dcf.device_commissioning.node_id, 5);
        assert_eq!(dcf.device_commissioning.baudrate, 500);

        let dir = tempdir().unwrap();
        let path = dir.path().join("test.dcf");
        dcf.write(&path, None).unwrap();
        let reloaded = load_dcf(&path, &LoadOptions::default()).unwrap();
        assert_eq!(reloaded, dcf);
    }

    #[test]
    fn sections_only() {
        let sections = load_sections_from_string(EDS_TEXT, &LoadOptions::default()).unwrap();
        assert_eq!(sections.len(), 4);
        assert_eq!(sections.get("deviceinfo").unwrap().get("vendorname"), Some("ACME"));
    }

    #[cfg(feature = "nodelist")]
    #[test]
    fn nodelist_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("net.cpj");
        std::fs::write(&path, "[Topology]\nNetName=net\nNode3Present=0x01\n").unwrap();

        let project = load_nodelist(&path, &LoadOptions::default()).unwrap();
        assert_eq!(project.networks[0].nodes.len(), 1);

        let out_path = dir.path().join("out.cpj");
        project.write(&out_path, None).unwrap();
        let reloaded = load_nodelist(&out_path, &LoadOptions::default()).unwrap();
        assert_eq!(reloaded, project);
    }
}
