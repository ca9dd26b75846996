use std::path::Path;
use std::path::PathBuf;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedAttachment {
    pub data: String,
    pub mime_type: String,
}

#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Reads a file and produces the base64 payload plus guessed MIME type for
/// inline upload. The payload is bare base64, no data-URI prefix.
pub fn encode_file(path: &Path) -> Result<EncodedAttachment, EncodeError> {
    let bytes = std::fs::read(path).map_err(|source| EncodeError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mime_type = mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string();
    Ok(EncodedAttachment {
        data: STANDARD.encode(&bytes),
        mime_type,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn encodes_file_contents_as_base64() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("note.txt");
        std::fs::write(&path, b"hello attachment").unwrap();

        let encoded = encode_file(&path).unwrap();
        assert_eq!(STANDARD.decode(&encoded.data).unwrap(), b"hello attachment");
        assert_eq!(encoded.mime_type, "text/plain");
    }

    #[test]
    fn guesses_pdf_mime_type_from_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deed.pdf");
        std::fs::write(&path, b"%PDF-1.4").unwrap();

        let encoded = encode_file(&path).unwrap();
        assert_eq!(encoded.mime_type, "application/pdf");
    }

    #[test]
    fn unknown_extension_falls_back_to_octet_stream() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.zzz");
        std::fs::write(&path, b"data").unwrap();

        let encoded = encode_file(&path).unwrap();
        assert_eq!(encoded.mime_type, "application/octet-stream");
    }

    #[test]
    fn missing_file_reports_the_path() {
        let err = encode_file(Path::new("/no/such/file.pdf")).unwrap_err();
        assert!(err.to_string().contains("/no/such/file.pdf"));
    }
}
