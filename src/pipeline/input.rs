//! Input resolution: read a layout dump from disk and parse it.
//!
//! Layout dumps are produced by an external parser and are frequently
//! confused with the documents they describe. We sniff the first
//! non-whitespace byte (`{`) before handing the bytes to serde so callers get
//! a meaningful error for a stray PDF rather than a JSON syntax error at
//! line 1, column 1.

use crate::error::Layout2MdError;
use crate::layout::LayoutDocument;
use std::io::ErrorKind;
use std::path::Path;
use tracing::debug;

/// Read the raw bytes of a layout dump, mapping I/O failures to input errors.
pub async fn read_input(path: &Path) -> Result<Vec<u8>, Layout2MdError> {
    match tokio::fs::read(path).await {
        Ok(bytes) => {
            debug!("Read {} bytes from {}", bytes.len(), path.display());
            Ok(bytes)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Err(Layout2MdError::FileNotFound {
            path: path.to_path_buf(),
        }),
        Err(e) if e.kind() == ErrorKind::PermissionDenied => {
            Err(Layout2MdError::PermissionDenied {
                path: path.to_path_buf(),
            })
        }
        Err(e) => Err(Layout2MdError::InputReadFailed {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Parse layout-dump bytes. `path` is only used in error messages.
pub fn parse_layout(bytes: &[u8], path: &Path) -> Result<LayoutDocument, Layout2MdError> {
    sniff(bytes, path)?;
    serde_json::from_slice(bytes).map_err(|e| Layout2MdError::InvalidLayout {
        path: path.to_path_buf(),
        line: e.line(),
        column: e.column(),
        detail: e.to_string(),
    })
}

/// Read and parse a layout dump.
pub async fn load_layout(path: &Path) -> Result<LayoutDocument, Layout2MdError> {
    let bytes = read_input(path).await?;
    let doc = parse_layout(&bytes, path)?;
    debug!("Parsed layout dump with {} pages", doc.pages.len());
    Ok(doc)
}

fn sniff(bytes: &[u8], path: &Path) -> Result<(), Layout2MdError> {
    let start = bytes.iter().position(|b| !b.is_ascii_whitespace());
    match start.map(|i| &bytes[i..]) {
        Some([b'{', ..]) => Ok(()),
        rest => Err(Layout2MdError::NotALayoutDump {
            path: path.to_path_buf(),
            first: rest.and_then(|r| String::from_utf8_lossy(&r[..r.len().min(4)]).chars().next()),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn path() -> PathBuf {
        PathBuf::from("doc.json")
    }

    #[test]
    fn parses_minimal_dump() {
        let json = br#"  {"pages": [{"width": 595, "height": 842}]}"#;
        let doc = parse_layout(json, &path()).unwrap();
        assert_eq!(doc.pages.len(), 1);
        assert!(doc.pages[0].blocks.is_empty());
        assert!(doc.pages[0].layout_boxes.is_empty());
    }

    #[test]
    fn rejects_pdf_bytes() {
        let err = parse_layout(b"%PDF-1.7\n...", &path()).unwrap_err();
        match err {
            Layout2MdError::NotALayoutDump { first, .. } => assert_eq!(first, Some('%')),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn rejects_empty_and_blank_input() {
        for bytes in [&b""[..], &b" \n\t "[..]] {
            match parse_layout(bytes, &path()).unwrap_err() {
                Layout2MdError::NotALayoutDump { first, .. } => assert_eq!(first, None),
                other => panic!("unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn json_array_is_not_a_dump() {
        assert!(matches!(
            parse_layout(b"[1, 2]", &path()),
            Err(Layout2MdError::NotALayoutDump { first: Some('['), .. })
        ));
    }

    #[test]
    fn schema_errors_carry_position() {
        let json = b"{\n  \"pages\": [\n    {\"width\": \"wide\", \"height\": 842}\n  ]\n}";
        match parse_layout(json, &path()).unwrap_err() {
            Layout2MdError::InvalidLayout { line, column, .. } => {
                assert_eq!(line, 3);
                assert!(column > 0);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_file_is_file_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.json");
        assert!(matches!(
            load_layout(&missing).await,
            Err(Layout2MdError::FileNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn loads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("doc.json");
        std::fs::write(&file, r#"{"pages": []}"#).unwrap();
        let doc = load_layout(&file).await.unwrap();
        assert!(doc.pages.is_empty());
    }
}
