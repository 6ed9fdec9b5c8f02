use crate::EdsError;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// read a file and convert its content to a String
///
/// The size of the file is checked before any data is read.
pub(crate) fn load(path: &Path, max_input_size: usize) -> Result<String, EdsError> {
    let mut file = File::open(path).map_err(|ioerror| EdsError::FileOpenError {
        filename: path.to_path_buf(),
        ioerror,
    })?;

    let filedata = read_data(&mut file, path, max_input_size)?;
    let text = decode_raw_bytes(&filedata);

    // a BOM is not part of the content
    Ok(match text.strip_prefix('\u{feff}') {
        Some(stripped) => stripped.to_string(),
        None => text,
    })
}

fn read_data(file: &mut File, path: &Path, max_input_size: usize) -> Result<Vec<u8>, EdsError> {
    let filesize = file
        .metadata()
        .map_err(|ioerror| EdsError::FileReadError {
            filename: path.to_path_buf(),
            ioerror,
        })?
        .len();
    let size = usize::try_from(filesize).unwrap_or(usize::MAX);
    if size > max_input_size {
        return Err(EdsError::FileTooLarge {
            filename: path.to_path_buf(),
            size,
            limit: max_input_size,
        });
    }

    let mut buffer = Vec::with_capacity(size);
    // the file could grow between the size check and the read
    let limit = u64::try_from(max_input_size).unwrap_or(u64::MAX).saturating_add(1);
    file.take(limit)
        .read_to_end(&mut buffer)
        .map_err(|ioerror| EdsError::FileReadError {
            filename: path.to_path_buf(),
            ioerror,
        })?;
    if buffer.len() > max_input_size {
        return Err(EdsError::FileTooLarge {
            filename: path.to_path_buf(),
            size: buffer.len(),
            limit: max_input_size,
        });
    }
    Ok(buffer)
}

fn decode_raw_bytes(filedata: &[u8]) -> String {
    /* The first character of an EDS file is a BOM, '[', ';' or whitespace. All of these are in the
    basic ASCII range, so nul bytes at the start of the file indicate UTF-16 or UTF-32. */
    if let Some(text) = decode_utf32(filedata) {
        return text;
    }
    if let Some(text) = decode_utf16(filedata) {
        return text;
    }
    if let Ok(text) = std::str::from_utf8(filedata) {
        return text.to_string();
    }

    // every byte sequence is valid ISO8859-1
    filedata.iter().map(|&byte| char::from(byte)).collect()
}

fn decode_utf32(filedata: &[u8]) -> Option<String> {
    if filedata.len() < 4 || filedata.len() % 4 != 0 {
        return None;
    }
    let conversion: fn([u8; 4]) -> u32 =
        if filedata[0] == 0 && filedata[1] == 0 && filedata[3] != 0 {
            u32::from_be_bytes
        } else if filedata[0] != 0 && filedata[2] == 0 && filedata[3] == 0 {
            u32::from_le_bytes
        } else {
            return None;
        };
    filedata
        .chunks_exact(4)
        .map(|chunk| char::from_u32(conversion([chunk[0], chunk[1], chunk[2], chunk[3]])))
        .collect()
}

fn decode_utf16(filedata: &[u8]) -> Option<String> {
    if filedata.len() < 2 || filedata.len() % 2 != 0 {
        return None;
    }
    let conversion: fn([u8; 2]) -> u16 = match (filedata[0], filedata[1]) {
        (0xfe, 0xff) => u16::from_be_bytes,
        (0xff, 0xfe) => u16::from_le_bytes,
        (0, second) if second != 0 => u16::from_be_bytes,
        (first, 0) if first != 0 => u16::from_le_bytes,
        _ => return None,
    };
    let units: Vec<u16> = filedata
        .chunks_exact(2)
        .map(|chunk| conversion([chunk[0], chunk[1]]))
        .collect();
    String::from_utf16(&units).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn load_nonexistent_file() {
        let result = load(Path::new("file/does/not/exist"), 1024);
        assert!(matches!(result, Err(EdsError::FileOpenError { .. })));
    }

    #[test]
    fn size_limit() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("large.eds");
        std::fs::write(&path, vec![b';'; 100]).unwrap();

        let result = load(&path, 99);
        assert!(matches!(
            result,
            Err(EdsError::FileTooLarge {
                size: 100,
                limit: 99,
                ..
            })
        ));
        assert!(load(&path, 100).is_ok());
    }

    #[test]
    fn strip_bom() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bom.eds");
        std::fs::write(&path, b"\xef\xbb\xbf[FileInfo]\n").unwrap();
        assert_eq!(load(&path, 1024).unwrap(), "[FileInfo]\n");
    }

    #[test]
    fn decode_utf32_data() {
        // big endian
        let data: Vec<u8> = vec![0, 0, 0, b'[', 0, 0, 0, b']'];
        assert_eq!(decode_raw_bytes(&data), "[]");
        // big endian, with BOM
        let data: Vec<u8> = vec![0, 0, 0xfe, 0xff, 0, 0, 0, b'['];
        assert_eq!(decode_raw_bytes(&data), "\u{feff}[");
        // little endian
        let data: Vec<u8> = vec![b'[', 0, 0, 0, b']', 0, 0, 0];
        assert_eq!(decode_raw_bytes(&data), "[]");
        // little endian, with BOM
        let data: Vec<u8> = vec![0xff, 0xfe, 0, 0, b'[', 0, 0, 0];
        assert_eq!(decode_raw_bytes(&data), "\u{feff}[");
        // mixed endian
        let data: Vec<u8> = vec![0, 0, 0, b'[', b']', 0, 0, 0];
        assert_ne!(decode_raw_bytes(&data), "[]");
    }

    #[test]
    fn decode_utf16_data() {
        // little endian
        let data: Vec<u8> = vec![b'[', 0, b'A', 0, b']', 0, b'\n', 0];
        assert_eq!(decode_raw_bytes(&data), "[A]\n");
        // little endian, with BOM
        let data: Vec<u8> = vec![0xff, 0xfe, b'[', 0, b']', 0];
        assert_eq!(decode_raw_bytes(&data), "\u{feff}[]");
        // big endian
        let data: Vec<u8> = vec![0, b'[', 0, b'A', 0, b']', 0, b'\n'];
        assert_eq!(decode_raw_bytes(&data), "[A]\n");
        // big endian, with BOM
        let data: Vec<u8> = vec![0xfe, 0xff, 0, b'[', 0, b']'];
        assert_eq!(decode_raw_bytes(&data), "\u{feff}[]");
    }

    #[test]
    fn decode_utf8_and_latin1() {
        let data: Vec<u8> = vec![b'[', b'A', b']'];
        assert_eq!(decode_raw_bytes(&data), "[A]");
        let data: Vec<u8> = vec![239, 187, 191, b'[', b']'];
        assert_eq!(decode_raw_bytes(&data), "\u{feff}[]");
        // "°C" in ISO8859-1
        let data: Vec<u8> = vec![b'U', b'=', 0xb0, b'C'];
        assert_eq!(decode_raw_bytes(&data), "U=\u{00b0}C");
    }
}
