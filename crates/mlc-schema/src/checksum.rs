//! # Checksum Baselines
//!
//! Accepted structural hashes persisted one file per schema:
//!
//! ```text
//! <checksum_dir>/<schema file name>.sha256
//! ```
//!
//! Each record holds a single line, `<64 hex>  <schema file name>`, with
//! two separating spaces and a trailing newline. Readers also accept a
//! file holding just the digest. Records are never edited in place;
//! re-baselining overwrites the whole file.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use mlc_core::{ContentDigest, DigestError};

use crate::error::SchemaError;

/// File extension of checksum record files.
pub const RECORD_EXTENSION: &str = "sha256";

/// One parsed checksum record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecksumRecord {
    /// The accepted structural hash.
    pub digest: ContentDigest,
    /// The schema file the record names, when the record carries one.
    pub file_name: Option<String>,
}

impl ChecksumRecord {
    /// Record `digest` for `file_name`.
    pub fn new(digest: ContentDigest, file_name: impl Into<String>) -> Self {
        Self {
            digest,
            file_name: Some(file_name.into()),
        }
    }

    /// Parse the text of a record file.
    ///
    /// The first whitespace-separated token is the digest; the remainder
    /// of the line, if any, is the file name.
    pub fn parse(text: &str) -> Result<Self, DigestError> {
        let line = text.trim();
        let (token, rest) = match line.split_once(char::is_whitespace) {
            Some((token, rest)) => (token, rest.trim()),
            None => (line, ""),
        };
        Ok(Self {
            digest: ContentDigest::from_hex(token)?,
            file_name: (!rest.is_empty()).then(|| rest.to_string()),
        })
    }
}

impl fmt::Display for ChecksumRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.file_name {
            Some(name) => writeln!(f, "{}  {}", self.digest, name),
            None => writeln!(f, "{}", self.digest),
        }
    }
}

/// What the baseline holds for one schema file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BaselineEntry<'a> {
    /// No record exists; the schema has never been baselined.
    Missing,
    /// The accepted digest.
    Recorded(&'a ContentDigest),
    /// A record exists but could not be read.
    Unreadable(&'a str),
}

/// Every checksum record in a directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChecksumBaseline {
    /// Accepted digests keyed by schema file name.
    pub digests: BTreeMap<String, ContentDigest>,
    /// Records that exist but could not be parsed, keyed by schema file
    /// name, with the reason.
    pub unreadable: BTreeMap<String, String>,
}

impl ChecksumBaseline {
    /// Look up the baseline for `file_name`.
    pub fn entry(&self, file_name: &str) -> BaselineEntry<'_> {
        if let Some(digest) = self.digests.get(file_name) {
            BaselineEntry::Recorded(digest)
        } else if let Some(reason) = self.unreadable.get(file_name) {
            BaselineEntry::Unreadable(reason)
        } else {
            BaselineEntry::Missing
        }
    }

    /// Number of readable records.
    pub fn len(&self) -> usize {
        self.digests.len()
    }

    /// True when there are no readable records.
    pub fn is_empty(&self) -> bool {
        self.digests.is_empty()
    }
}

/// Directory of checksum record files.
#[derive(Debug, Clone)]
pub struct ChecksumStore {
    dir: PathBuf,
}

impl ChecksumStore {
    /// A store rooted at `dir`. The directory need not exist yet.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the record file for `file_name`.
    pub fn record_path(&self, file_name: &str) -> PathBuf {
        self.dir.join(format!("{file_name}.{RECORD_EXTENSION}"))
    }

    /// Read the record for a single schema file. A missing record is `None`.
    pub fn read(&self, file_name: &str) -> Result<Option<ContentDigest>, SchemaError> {
        let path = self.record_path(file_name);
        if !path.exists() {
            return Ok(None);
        }
        read_record(&path).map(|r| Some(r.digest))
    }

    /// Load every record in the directory.
    ///
    /// A missing directory is an empty baseline. Records that cannot be
    /// read or parsed are collected in [`ChecksumBaseline::unreadable`]
    /// rather than aborting the load.
    pub fn load(&self) -> Result<ChecksumBaseline, SchemaError> {
        let mut baseline = ChecksumBaseline::default();
        if !self.dir.is_dir() {
            return Ok(baseline);
        }

        for entry in std::fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(RECORD_EXTENSION) {
                continue;
            }
            let Some(file_name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let file_name = file_name.to_string();
            match read_record(&path) {
                Ok(record) => {
                    baseline.digests.insert(file_name, record.digest);
                }
                Err(SchemaError::ChecksumRecord { reason, .. }) => {
                    baseline.unreadable.insert(file_name, reason);
                }
                Err(other) => return Err(other),
            }
        }
        Ok(baseline)
    }

    /// Write (or overwrite) the record for `file_name`, creating the
    /// directory if needed. Returns the record path.
    pub fn write(&self, file_name: &str, digest: &ContentDigest) -> Result<PathBuf, SchemaError> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.record_path(file_name);
        let record = ChecksumRecord::new(*digest, file_name);
        std::fs::write(&path, record.to_string())?;
        Ok(path)
    }
}

fn read_record(path: &Path) -> Result<ChecksumRecord, SchemaError> {
    let text = std::fs::read_to_string(path).map_err(|e| SchemaError::ChecksumRecord {
        path: path.to_path_buf(),
        reason: format!("cannot read: {e}"),
    })?;
    ChecksumRecord::parse(&text).map_err(|e| SchemaError::ChecksumRecord {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}
