use thiserror::Error;

use crate::sectionmap::SectionMap;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TokenizerError {
    #[error("{filename}: Input of {size} bytes exceeds the limit of {limit} bytes")]
    InputTooLarge {
        filename: String,
        size: usize,
        limit: usize,
    },

    #[error("{filename}:{line}: Key/value pair \"{text}\" appears before the first section header")]
    KeyOutsideSection {
        filename: String,
        line: u32,
        text: String,
    },

    #[error("{filename}:{line}: Line \"{text}\" is neither a section header nor a key/value pair")]
    MissingSeparator {
        filename: String,
        line: u32,
        text: String,
    },
}

// tokenize()
// Split the text of an EDS, DCF or CPJ file into sections of key/value pairs.
// The size limit is checked before any work is done.
pub(crate) fn tokenize(
    filename: &str,
    filetext: &str,
    max_input_size: usize,
) -> Result<SectionMap, TokenizerError> {
    if filetext.len() > max_input_size {
        return Err(TokenizerError::InputTooLarge {
            filename: filename.to_string(),
            size: filetext.len(),
            limit: max_input_size,
        });
    }

    let mut sections = SectionMap::new();
    // position of the currently open section
    let mut current: Option<usize> = None;

    for (line_idx, raw_line) in filetext.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with(';') {
            continue;
        }
        let line_num = u32::try_from(line_idx + 1).unwrap_or(u32::MAX);

        if let Some(name) = section_header(line) {
            sections.get_or_insert(name);
            current = sections.position(name);
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            return Err(TokenizerError::MissingSeparator {
                filename: filename.to_string(),
                line: line_num,
                text: line.to_string(),
            });
        };

        let Some(pos) = current else {
            return Err(TokenizerError::KeyOutsideSection {
                filename: filename.to_string(),
                line: line_num,
                text: line.to_string(),
            });
        };
        sections[pos].insert(key.trim(), value.trim());
    }

    log::trace!("{filename}: tokenized {} sections", sections.len());

    Ok(sections)
}

// section_header()
// A header has the form [name]; surrounding whitespace inside the brackets is not part of the name
fn section_header(line: &str) -> Option<&str> {
    let inner = line.strip_prefix('[')?.strip_suffix(']')?;
    Some(inner.trim())
}
