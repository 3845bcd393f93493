// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Evidence attachment for payment slips.
//!
//! An upload is validated before any storage call is made, stored under a
//! generated key with no-overwrite semantics, and returned as a publicly
//! resolvable reference. Storage itself is delegated to an
//! [`EvidenceStore`] backend.

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tablebook_domain::EvidenceReference;
use time::OffsetDateTime;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

/// Default maximum slip size (5 MiB).
pub const DEFAULT_MAX_EVIDENCE_BYTES: usize = 5 * 1024 * 1024;

/// Default bound on a single upload call.
pub const DEFAULT_UPLOAD_TIMEOUT: Duration = Duration::from_secs(10);

/// Extension used when the file name does not carry a usable one.
const FALLBACK_EXTENSION: &str = "jpg";

const MAX_EXTENSION_CHARS: usize = 8;

const SUFFIX_CHARS: usize = 7;

const BASE36_DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Errors raised while validating or storing evidence.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvidenceError {
    /// The declared content type is not an image.
    #[error("The payment slip must be an image (got '{content_type}')")]
    NotAnImage {
        /// The declared content type.
        content_type: String,
    },
    /// The upload exceeds the size limit.
    #[error("The payment slip must not exceed {} MB", .max_bytes / (1024 * 1024))]
    TooLarge {
        /// The upload size in bytes.
        size: usize,
        /// The configured limit in bytes.
        max_bytes: usize,
    },
    /// An object already exists under the key.
    #[error("An object named '{0}' already exists")]
    AlreadyExists(String),
    /// The storage backend failed or rejected the object.
    #[error("Storage backend error: {0}")]
    Storage(String),
    /// The storage backend did not answer in time.
    #[error("Upload did not complete within {} seconds", .0.as_secs())]
    TimedOut(Duration),
}

/// An uploaded payment slip, as received from the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvidenceUpload {
    /// The original file name.
    pub file_name: String,
    /// The declared MIME type.
    pub content_type: String,
    /// The file contents.
    pub bytes: Bytes,
}

impl EvidenceUpload {
    /// Creates an upload.
    #[must_use]
    pub fn new(file_name: impl Into<String>, content_type: impl Into<String>, bytes: Bytes) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }
}

/// Object storage for payment slips.
///
/// `upload` must never overwrite an existing object.
#[async_trait]
pub trait EvidenceStore: Send + Sync {
    /// Stores `bytes` under `key` and returns the public URL.
    ///
    /// # Errors
    ///
    /// Returns `EvidenceError::AlreadyExists` if the key is taken, or
    /// `EvidenceError::Storage` if the backend fails.
    async fn upload(
        &self,
        key: &str,
        bytes: Bytes,
        content_type: &str,
    ) -> Result<String, EvidenceError>;

    /// Returns the public URL an object stored under `key` resolves to.
    fn public_url(&self, key: &str) -> String;
}

/// Validates uploads and stores them through an [`EvidenceStore`].
#[derive(Clone)]
pub struct EvidenceAttachment {
    store: Arc<dyn EvidenceStore>,
    max_bytes: usize,
    timeout: Duration,
}

impl std::fmt::Debug for EvidenceAttachment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvidenceAttachment")
            .field("max_bytes", &self.max_bytes)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl EvidenceAttachment {
    /// Creates an attachment service with the default limits.
    #[must_use]
    pub fn new(store: Arc<dyn EvidenceStore>) -> Self {
        Self {
            store,
            max_bytes: DEFAULT_MAX_EVIDENCE_BYTES,
            timeout: DEFAULT_UPLOAD_TIMEOUT,
        }
    }

    /// Sets the maximum accepted upload size.
    #[must_use]
    pub const fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    /// Sets the bound on a single upload call.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the maximum accepted upload size.
    #[must_use]
    pub const fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Validates an upload without touching storage.
    ///
    /// An empty upload means no slip was attached and yields `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the upload is not an image or is too large.
    pub fn validate(
        &self,
        upload: Option<EvidenceUpload>,
    ) -> Result<Option<EvidenceUpload>, EvidenceError> {
        let Some(upload) = upload.filter(|u| !u.bytes.is_empty()) else {
            return Ok(None);
        };

        if !upload.content_type.starts_with("image/") {
            return Err(EvidenceError::NotAnImage {
                content_type: upload.content_type,
            });
        }

        if upload.bytes.len() > self.max_bytes {
            return Err(EvidenceError::TooLarge {
                size: upload.bytes.len(),
                max_bytes: self.max_bytes,
            });
        }

        Ok(Some(upload))
    }

    /// Stores a validated upload and returns its reference.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails or does not answer within the
    /// configured timeout.
    pub async fn store(&self, upload: &EvidenceUpload) -> Result<EvidenceReference, EvidenceError> {
        let key: String = storage_key(&upload.file_name, OffsetDateTime::now_utc());

        debug!(key = %key, size = upload.bytes.len(), "Uploading payment slip");

        let url: String = tokio::time::timeout(
            self.timeout,
            self.store
                .upload(&key, upload.bytes.clone(), &upload.content_type),
        )
        .await
        .map_err(|_| EvidenceError::TimedOut(self.timeout))??;

        info!(key = %key, "Stored payment slip");
        Ok(EvidenceReference::new(url))
    }
}

/// Generates a collision-resistant storage key for an uploaded file.
///
/// The key is `{unix millis}_{7 random base36 chars}.{extension}`. Only
/// ASCII alphanumerics of the original extension survive, so the caller's
/// file name can never inject a path.
#[must_use]
pub fn storage_key(file_name: &str, now: OffsetDateTime) -> String {
    let millis: i128 = now.unix_timestamp_nanos() / 1_000_000;

    let mut value: u64 = rand::random::<u64>();
    let mut suffix: String = String::with_capacity(SUFFIX_CHARS);
    for _ in 0..SUFFIX_CHARS {
        let digit: usize = usize::try_from(value % 36).unwrap_or(0);
        suffix.push(char::from(BASE36_DIGITS[digit]));
        value /= 36;
    }

    format!("{millis}_{suffix}.{}", sanitized_extension(file_name))
}

fn sanitized_extension(file_name: &str) -> String {
    let extension: String = file_name
        .rsplit_once('.')
        .map(|(_, ext)| {
            ext.chars()
                .filter(char::is_ascii_alphanumeric)
                .take(MAX_EXTENSION_CHARS)
                .collect::<String>()
                .to_ascii_lowercase()
        })
        .unwrap_or_default();

    if extension.is_empty() {
        String::from(FALLBACK_EXTENSION)
    } else {
        extension
    }
}

// ============================================================================
// Backends
// ============================================================================

/// In-memory store, used by tests and ephemeral deployments.
#[derive(Debug, Default)]
pub struct MemoryEvidenceStore {
    objects: DashMap<String, (Bytes, String)>,
    failing: AtomicBool,
}

impl MemoryEvidenceStore {
    const BASE_URL: &'static str = "memory://slips";

    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent upload fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Returns the bytes stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Bytes> {
        self.objects.get(key).map(|entry| entry.value().0.clone())
    }

    /// Returns the number of stored objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Returns true if nothing has been stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

#[async_trait]
impl EvidenceStore for MemoryEvidenceStore {
    async fn upload(
        &self,
        key: &str,
        bytes: Bytes,
        content_type: &str,
    ) -> Result<String, EvidenceError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(EvidenceError::Storage(String::from(
                "memory store is unavailable",
            )));
        }

        match self.objects.entry(key.to_string()) {
            Entry::Occupied(_) => Err(EvidenceError::AlreadyExists(key.to_string())),
            Entry::Vacant(slot) => {
                slot.insert((bytes, content_type.to_string()));
                Ok(self.public_url(key))
            }
        }
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{key}", Self::BASE_URL)
    }
}

/// Stores slips as files in a local directory.
///
/// The server exposes the directory under `/evidence/{key}`.
#[derive(Debug, Clone)]
pub struct LocalEvidenceStore {
    root: PathBuf,
    public_base_url: String,
}

impl LocalEvidenceStore {
    /// Creates a store rooted at `root`, publishing URLs under
    /// `{public_base_url}/evidence/`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, public_base_url: &str) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Returns the directory objects are written to.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl EvidenceStore for LocalEvidenceStore {
    async fn upload(
        &self,
        key: &str,
        bytes: Bytes,
        _content_type: &str,
    ) -> Result<String, EvidenceError> {
        if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
            return Err(EvidenceError::Storage(format!("invalid object key '{key}'")));
        }

        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| EvidenceError::Storage(e.to_string()))?;

        let mut file: tokio::fs::File = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(self.root.join(key))
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::AlreadyExists => EvidenceError::AlreadyExists(key.to_string()),
                _ => EvidenceError::Storage(e.to_string()),
            })?;

        file.write_all(&bytes)
            .await
            .map_err(|e| EvidenceError::Storage(e.to_string()))?;
        file.flush()
            .await
            .map_err(|e| EvidenceError::Storage(e.to_string()))?;

        Ok(self.public_url(key))
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/evidence/{key}", self.public_base_url)
    }
}

/// Stores slips in a Supabase Storage bucket.
#[derive(Debug, Clone)]
pub struct SupabaseEvidenceStore {
    client: reqwest::Client,
    base_url: String,
    service_key: String,
    bucket: String,
}

impl SupabaseEvidenceStore {
    /// Creates a store for `bucket` on the project at `base_url`.
    #[must_use]
    pub fn new(base_url: &str, service_key: String, bucket: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            service_key,
            bucket,
        }
    }
}

#[async_trait]
impl EvidenceStore for SupabaseEvidenceStore {
    async fn upload(
        &self,
        key: &str,
        bytes: Bytes,
        content_type: &str,
    ) -> Result<String, EvidenceError> {
        let url: String = format!(
            "{}/storage/v1/object/{}/{key}",
            self.base_url, self.bucket
        );

        let response: reqwest::Response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.service_key))
            .header("apikey", &self.service_key)
            .header("Content-Type", content_type)
            .header("x-upsert", "false")
            .body(bytes)
            .send()
            .await
            .map_err(|e| EvidenceError::Storage(e.to_string()))?;

        let status: reqwest::StatusCode = response.status();
        if status.is_success() {
            return Ok(self.public_url(key));
        }

        if status == reqwest::StatusCode::CONFLICT {
            return Err(EvidenceError::AlreadyExists(key.to_string()));
        }

        let body: String = response.text().await.unwrap_or_default();
        Err(EvidenceError::Storage(format!("{status}: {body}")))
    }

    fn public_url(&self, key: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{key}",
            self.base_url, self.bucket
        )
    }
}
