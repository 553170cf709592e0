//! Codec for the `.texhtml` bundle: an ordinary zip container holding a
//! `manifest.json`, one PDF entry, and one HTML entry. The custom extension
//! is cosmetic.

use std::path::Path;

use texhtml_model::{LayoutState, Manifest, MANIFEST_VERSION};

pub mod zip;

use zip::{ZipArchive, ZipWriter};

pub const MANIFEST_ENTRY: &str = "manifest.json";
pub const BUNDLE_EXTENSION: &str = "texhtml";

#[derive(Debug, thiserror::Error)]
pub enum BundleError {
    #[error("not a valid bundle archive: {0}")]
    MalformedArchive(String),
    #[error("archive has no {MANIFEST_ENTRY} entry")]
    MissingManifest,
    #[error("manifest is invalid: {0}")]
    InvalidManifest(String),
    #[error("manifest names entry {0:?} but the archive does not contain it")]
    MissingEntry(String),
    #[error("could not capture content bytes")]
    ContentCaptureFailure,
    #[error("a PDF and an HTML document must both be loaded before saving")]
    PreconditionFailure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Paper,
    App,
}

/// A loaded document: session-scoped, owned bytes plus the entry name the
/// payload travels under inside an archive.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentPayload {
    pub name: String,
    pub kind: DocumentKind,
    pub bytes: Vec<u8>,
}

impl DocumentPayload {
    pub fn new(name: impl Into<String>, kind: DocumentKind, bytes: Vec<u8>) -> Self {
        Self { name: name.into(), kind, bytes }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bundle {
    pub manifest: Manifest,
    pub paper: DocumentPayload,
    pub app: DocumentPayload,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EncodedBundle {
    pub bytes: Vec<u8>,
    pub suggested_filename: String,
}

/// Decodes a `.texhtml` byte buffer into its manifest and the two document
/// payloads. Nothing is mutated on failure; callers apply the manifest's
/// layout fields only after a successful decode.
pub fn decode(bytes: &[u8]) -> Result<Bundle, BundleError> {
    let archive =
        ZipArchive::parse(bytes).map_err(|e| BundleError::MalformedArchive(e.to_string()))?;

    if !archive.contains(MANIFEST_ENTRY) {
        return Err(BundleError::MissingManifest);
    }

    let manifest_bytes = archive
        .read(MANIFEST_ENTRY)
        .map_err(|e| BundleError::MalformedArchive(e.to_string()))?;
    let manifest: Manifest = serde_json::from_slice(&manifest_bytes)
        .map_err(|e| BundleError::InvalidManifest(e.to_string()))?;

    let paper_bytes = read_named_entry(&archive, &manifest.paper)?;
    let app_bytes = read_named_entry(&archive, &manifest.app)?;

    log::debug!(
        "decoded bundle: paper {:?} ({} bytes), app {:?} ({} bytes)",
        manifest.paper,
        paper_bytes.len(),
        manifest.app,
        app_bytes.len()
    );

    Ok(Bundle {
        paper: DocumentPayload::new(manifest.paper.clone(), DocumentKind::Paper, paper_bytes),
        app: DocumentPayload::new(manifest.app.clone(), DocumentKind::App, app_bytes),
        manifest,
    })
}

fn read_named_entry(archive: &ZipArchive<'_>, name: &str) -> Result<Vec<u8>, BundleError> {
    if !archive.contains(name) {
        return Err(BundleError::MissingEntry(name.to_owned()));
    }

    archive.read(name).map_err(|e| BundleError::MalformedArchive(e.to_string()))
}

/// Encodes the current documents and layout into bundle bytes plus a
/// suggested filename. The output is built entirely in memory, so a failure
/// can never leave a partial archive behind.
pub fn encode(
    title: Option<&str>,
    layout: &LayoutState,
    paper: &DocumentPayload,
    app: &DocumentPayload,
) -> Result<EncodedBundle, BundleError> {
    let title = match title {
        Some(title) if !title.trim().is_empty() => title.trim().to_owned(),
        _ => title_from_filename(&paper.name),
    };

    let manifest = Manifest {
        version: MANIFEST_VERSION,
        title: Some(title.clone()),
        paper: paper.name.clone(),
        app: app.name.clone(),
        layout: Some(layout.view_mode),
        split: Some(layout.split_percent as i64),
        orientation: Some(layout.orientation),
    };

    let manifest_bytes =
        serde_json::to_vec_pretty(&manifest).map_err(|e| BundleError::InvalidManifest(e.to_string()))?;

    let mut writer = ZipWriter::new();
    writer.add_entry(MANIFEST_ENTRY, &manifest_bytes);
    writer.add_entry(&manifest.paper, &paper.bytes);
    writer.add_entry(&manifest.app, &app.bytes);

    Ok(EncodedBundle {
        bytes: writer.finish(),
        suggested_filename: format!("{title}.{BUNDLE_EXTENSION}"),
    })
}

fn title_from_filename(name: &str) -> String {
    Path::new(name)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| "bundle".to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use texhtml_model::{apply_manifest_layout, Orientation, ViewMode};

    fn sample_paper() -> DocumentPayload {
        DocumentPayload::new("paper.pdf", DocumentKind::Paper, b"%PDF-1.7 fake".to_vec())
    }

    fn sample_app() -> DocumentPayload {
        DocumentPayload::new("app.html", DocumentKind::App, b"<html><body>hi</body></html>".to_vec())
    }

    #[test]
    fn encode_decode_round_trips_layout_and_payloads() {
        let mut layout = LayoutState::default();
        layout.view_mode = ViewMode::Split;
        layout.split_percent = 60;
        layout.orientation = Orientation::Vertical;

        let paper = sample_paper();
        let app = sample_app();

        let encoded = encode(None, &layout, &paper, &app).expect("encode should succeed");
        assert_eq!(encoded.suggested_filename, "paper.texhtml");

        let bundle = decode(&encoded.bytes).expect("decode should succeed");
        assert_eq!(bundle.manifest.layout, Some(ViewMode::Split));
        assert_eq!(bundle.manifest.split, Some(60));
        assert_eq!(bundle.manifest.orientation, Some(Orientation::Vertical));
        assert_eq!(bundle.manifest.title.as_deref(), Some("paper"));
        assert_eq!(bundle.paper.bytes, paper.bytes);
        assert_eq!(bundle.app.bytes, app.bytes);

        let mut restored = LayoutState::default();
        apply_manifest_layout(&mut restored, &bundle.manifest);
        assert_eq!(restored.view_mode, ViewMode::Split);
        assert_eq!(restored.split_percent, 60);
        assert_eq!(restored.orientation, Orientation::Vertical);
    }

    #[test]
    fn explicit_title_overrides_filename_derivation() {
        let layout = LayoutState::default();
        let encoded = encode(Some("My Paper"), &layout, &sample_paper(), &sample_app())
            .expect("encode should succeed");

        assert_eq!(encoded.suggested_filename, "My Paper.texhtml");

        let bundle = decode(&encoded.bytes).expect("decode should succeed");
        assert_eq!(bundle.manifest.title.as_deref(), Some("My Paper"));
    }

    #[test]
    fn garbage_input_is_a_malformed_archive() {
        let result = decode(b"definitely not a zip archive");
        assert!(matches!(result, Err(BundleError::MalformedArchive(_))));
    }

    #[test]
    fn archive_without_manifest_is_rejected() {
        let mut writer = ZipWriter::new();
        writer.add_entry("paper.pdf", b"%PDF");
        writer.add_entry("app.html", b"<html/>");
        let bytes = writer.finish();

        assert!(matches!(decode(&bytes), Err(BundleError::MissingManifest)));
    }

    #[test]
    fn manifest_missing_required_fields_is_invalid() {
        let mut writer = ZipWriter::new();
        writer.add_entry(MANIFEST_ENTRY, br#"{"version": 1, "title": "no documents"}"#);
        let bytes = writer.finish();

        assert!(matches!(decode(&bytes), Err(BundleError::InvalidManifest(_))));
    }

    #[test]
    fn manifest_with_mistyped_field_is_invalid() {
        let mut writer = ZipWriter::new();
        writer.add_entry(MANIFEST_ENTRY, br#"{"version": 1, "paper": 7, "app": "a.html"}"#);
        let bytes = writer.finish();

        assert!(matches!(decode(&bytes), Err(BundleError::InvalidManifest(_))));
    }

    #[test]
    fn manifest_naming_an_absent_entry_is_reported() {
        let mut writer = ZipWriter::new();
        writer.add_entry(MANIFEST_ENTRY, br#"{"version": 1, "paper": "paper.pdf", "app": "app.html"}"#);
        writer.add_entry("paper.pdf", b"%PDF");
        let bytes = writer.finish();

        match decode(&bytes) {
            Err(BundleError::MissingEntry(name)) => assert_eq!(name, "app.html"),
            other => panic!("expected MissingEntry, got {other:?}"),
        }
    }

    #[test]
    fn manifest_without_layout_fields_decodes() {
        let mut writer = ZipWriter::new();
        writer.add_entry(MANIFEST_ENTRY, br#"{"paper": "paper.pdf", "app": "app.html"}"#);
        writer.add_entry("paper.pdf", b"%PDF");
        writer.add_entry("app.html", b"<html/>");
        let bytes = writer.finish();

        let bundle = decode(&bytes).expect("decode should succeed");
        assert_eq!(bundle.manifest.layout, None);
        assert_eq!(bundle.manifest.split, None);
        assert_eq!(bundle.manifest.orientation, None);
    }

    #[test]
    fn title_falls_back_when_paper_name_has_no_stem() {
        assert_eq!(title_from_filename("paper.pdf"), "paper");
        assert_eq!(title_from_filename("archive.tar.pdf"), "archive.tar");
        assert_eq!(title_from_filename(""), "bundle");
    }
}
