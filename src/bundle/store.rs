//! Bundle store - reads and writes locale variant files.
//!
//! Pure file I/O plus decoding in the configured character set. No
//! reconciliation logic lives here.

use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, Utc};
use encoding_rs::Encoding;
use tracing::{debug, warn};

use super::locale::{parse_file_name, Locale, PROPERTIES_SUFFIX};
use super::properties;
use crate::database::Entry;
use crate::error::{SyncError, SyncResult};

/// Timestamp layout of the per-entry comment line.
const MODIFIED_FORMAT: &str = "%Y/%m/%d %I:%M:%S";

/// One file of a bundle family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleFile {
    pub path: PathBuf,
    pub file_name: String,
    pub locale: Locale,
}

/// File access for bundle families in one character set.
#[derive(Debug, Clone)]
pub struct BundleStore {
    encoding: &'static Encoding,
}

impl BundleStore {
    /// Create a store for the given character set label (e.g. `UTF-8`).
    ///
    /// # Errors
    /// Returns `SyncError::Charset` if the label is unknown.
    pub fn new(charset: &str) -> SyncResult<Self> {
        let encoding = Encoding::for_label(charset.trim().as_bytes())
            .ok_or_else(|| SyncError::Charset(charset.to_string()))?;
        // The replacement encoding decodes every input as an error.
        if encoding == encoding_rs::REPLACEMENT {
            return Err(SyncError::Charset(charset.to_string()));
        }
        debug!("Bundle character set '{}' resolved to {}", charset, encoding.name());
        Ok(Self { encoding })
    }

    /// Name of the resolved encoding.
    pub fn charset(&self) -> &'static str {
        self.encoding.name()
    }

    /// Load the key set of a base bundle.
    ///
    /// A missing file is `NotFound`, which callers treat as a skip.
    pub async fn load_base(&self, path: &Path) -> SyncResult<BTreeSet<String>> {
        let text = self.read_text(path).await?;
        Ok(properties::parse(&text).into_keys().collect())
    }

    /// Load the key/value pairs of a variant file, ordered by key.
    pub async fn load_variant(&self, path: &Path) -> SyncResult<BTreeMap<String, String>> {
        let text = self.read_text(path).await?;
        Ok(properties::parse(&text))
    }

    /// Rewrite a variant file from scratch with the given entries.
    ///
    /// The content goes to a sibling temp file which is then renamed over the
    /// target, so readers never observe a half-written bundle.
    pub async fn write_variant(&self, path: &Path, entries: &[Entry]) -> SyncResult<()> {
        let text = self.render(entries);
        let bytes = self.encode(&text);

        let tmp = temp_path_for(path);
        let write_err = |source| SyncError::Write {
            path: path.to_path_buf(),
            source,
        };

        // Left over when an earlier write was abandoned mid-way.
        if tokio::fs::remove_file(&tmp).await.is_ok() {
            warn!("Removed stale temp file {}", tmp.display());
        }

        if let Err(e) = tokio::fs::write(&tmp, &bytes).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(write_err(e));
        }
        if let Err(e) = tokio::fs::rename(&tmp, path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(write_err(e));
        }

        debug!("Wrote {} entries to {}", entries.len(), path.display());
        Ok(())
    }

    /// List every file of the family `base_name` in `directory`, sorted by
    /// file name (the base file sorts first).
    pub async fn list_family(&self, directory: &Path, base_name: &str) -> SyncResult<Vec<BundleFile>> {
        let read_err = |source| SyncError::Read {
            path: directory.to_path_buf(),
            source,
        };

        let mut dir = tokio::fs::read_dir(directory).await.map_err(read_err)?;
        let mut files = Vec::new();

        while let Some(item) = dir.next_entry().await.map_err(read_err)? {
            let Some(file_name) = item.file_name().to_str().map(str::to_owned) else {
                warn!("Skipping non UTF-8 file name in {}", directory.display());
                continue;
            };
            if !file_name.starts_with(base_name) || !file_name.ends_with(PROPERTIES_SUFFIX) {
                continue;
            }
            let Some(parsed) = parse_file_name(&file_name) else {
                continue;
            };
            if parsed.basename != base_name {
                continue;
            }
            if item.file_type().await.map(|t| t.is_dir()).unwrap_or(false) {
                continue;
            }

            files.push(BundleFile {
                path: item.path(),
                file_name,
                locale: parsed.locale,
            });
        }

        files.sort_by(|a, b| a.file_name.cmp(&b.file_name));
        Ok(files)
    }

    async fn read_text(&self, path: &Path) -> SyncResult<String> {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(SyncError::NotFound(path.to_path_buf()));
            }
            Err(source) => {
                return Err(SyncError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        self.encoding
            .decode_without_bom_handling_and_without_replacement(&bytes)
            .map(|text| text.into_owned())
            .ok_or_else(|| SyncError::Read {
                path: path.to_path_buf(),
                source: io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("content is not valid {}", self.encoding.name()),
                ),
            })
    }

    fn render(&self, entries: &[Entry]) -> String {
        let representable = |c: char| self.can_encode(c);
        let mut out = String::new();

        for entry in entries {
            out.push_str("# Modified: ");
            out.push_str(&format_modified(entry.modified));
            if let Some(author) = &entry.author {
                out.push_str(" Author: ");
                out.push_str(author);
            }
            out.push('\n');
            out.push_str(&properties::escape_key(&entry.key, representable));
            out.push('=');
            out.push_str(&properties::escape_value(&entry.value, representable));
            out.push('\n');
        }

        out
    }

    /// Encode `text` in the configured charset.
    ///
    /// encoding_rs only decodes UTF-16 (its encoder emits UTF-8), so the
    /// UTF-16 byte orders are produced here.
    fn encode(&self, text: &str) -> Vec<u8> {
        if self.encoding == encoding_rs::UTF_16LE {
            text.encode_utf16().flat_map(u16::to_le_bytes).collect()
        } else if self.encoding == encoding_rs::UTF_16BE {
            text.encode_utf16().flat_map(u16::to_be_bytes).collect()
        } else {
            self.encoding.encode(text).0.into_owned()
        }
    }

    fn can_encode(&self, c: char) -> bool {
        // UTF-8 and both UTF-16 byte orders cover every char.
        if c.is_ascii() || self.encoding == encoding_rs::UTF_8 || self.encoding.output_encoding() != self.encoding {
            return true;
        }
        let mut buf = [0u8; 4];
        let (_, _, had_errors) = self.encoding.encode(c.encode_utf8(&mut buf));
        !had_errors
    }
}

fn format_modified(modified: DateTime<Utc>) -> String {
    modified.with_timezone(&Local).format(MODIFIED_FORMAT).to_string()
}

fn temp_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.tmp", name))
}
