//! Ordered product image gallery with primary-image tracking.
//!
//! A gallery mixes images that already live in blob storage with files the
//! seller picked but that have not been uploaded yet. Ordering is insertion
//! order; the primary image defaults to the first entry.

use serde::Serialize;
use thiserror::Error;

use crate::product::ProductImages;
use crate::validation::MAX_IMAGES;

/// Default raw upload cap per file (5 MiB).
pub const DEFAULT_MAX_FILE_BYTES: usize = 5 * 1024 * 1024;

/// A user-selected image file.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for ImageFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageFile")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl ImageFile {
    #[must_use]
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    #[must_use]
    pub fn is_image(&self) -> bool {
        self.content_type
            .trim()
            .to_ascii_lowercase()
            .starts_with("image/")
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// Lowercased file extension, derived from the name or else the MIME subtype.
    #[must_use]
    pub fn extension(&self) -> String {
        if let Some((stem, ext)) = self.file_name.rsplit_once('.') {
            if !stem.is_empty() && !ext.is_empty() {
                return ext.to_ascii_lowercase();
            }
        }
        match self.content_type.split_once('/') {
            Some((_, "jpeg")) => "jpg".to_string(),
            Some((_, subtype)) if !subtype.is_empty() => subtype.to_ascii_lowercase(),
            _ => "bin".to_string(),
        }
    }
}

/// A gallery entry: either already stored (by public URL) or waiting for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GalleryImage {
    Stored(String),
    Pending(ImageFile),
}

impl GalleryImage {
    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self, GalleryImage::Pending(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GalleryLimits {
    pub max_images: usize,
    pub max_file_bytes: usize,
}

impl Default for GalleryLimits {
    fn default() -> Self {
        Self {
            max_images: MAX_IMAGES,
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum RejectionReason {
    #[error("'{content_type}' is not an image")]
    NotAnImage { content_type: String },

    #[error("file is {size} bytes, the limit is {max}")]
    TooLarge { size: usize, max: usize },

    #[error("a product can have at most {max} images")]
    LimitReached { max: usize },
}

/// A file that was refused when added to the gallery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("{file_name}: {reason}")]
pub struct ImageRejection {
    pub file_name: String,
    #[serde(flatten)]
    pub reason: RejectionReason,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Gallery {
    entries: Vec<GalleryImage>,
    primary: Option<usize>,
    removed_stored: Vec<String>,
}

impl Gallery {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a gallery from a persisted product.
    ///
    /// A primary URL missing from `images` is dropped; the first image becomes
    /// primary instead.
    #[must_use]
    pub fn from_stored(images: &ProductImages) -> Self {
        let entries: Vec<GalleryImage> = images
            .images
            .iter()
            .cloned()
            .map(GalleryImage::Stored)
            .collect();
        let primary = if entries.is_empty() {
            None
        } else {
            Some(
                images
                    .images
                    .iter()
                    .position(|url| *url == images.primary)
                    .unwrap_or(0),
            )
        };
        Self {
            entries,
            primary,
            removed_stored: Vec::new(),
        }
    }

    #[must_use]
    pub fn entries(&self) -> &[GalleryImage] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn primary_index(&self) -> Option<usize> {
        self.primary
    }

    /// Stored URLs the seller removed during this edit, in removal order.
    #[must_use]
    pub fn removed_stored(&self) -> &[String] {
        &self.removed_stored
    }

    /// Appends each acceptable file in order and returns a rejection for every
    /// file that was refused. Existing entries are never touched.
    pub fn add_files(
        &mut self,
        files: Vec<ImageFile>,
        limits: &GalleryLimits,
    ) -> Vec<ImageRejection> {
        let mut rejections = Vec::new();

        for file in files {
            let reason = if !file.is_image() {
                Some(RejectionReason::NotAnImage {
                    content_type: file.content_type.clone(),
                })
            } else if file.size() > limits.max_file_bytes {
                Some(RejectionReason::TooLarge {
                    size: file.size(),
                    max: limits.max_file_bytes,
                })
            } else if self.entries.len() >= limits.max_images {
                Some(RejectionReason::LimitReached {
                    max: limits.max_images,
                })
            } else {
                None
            };

            match reason {
                Some(reason) => rejections.push(ImageRejection {
                    file_name: file.file_name,
                    reason,
                }),
                None => self.entries.push(GalleryImage::Pending(file)),
            }
        }

        if self.primary.is_none() && !self.entries.is_empty() {
            self.primary = Some(0);
        }

        rejections
    }

    /// Removes the entry at `index`. Later entries shift down by one.
    ///
    /// Removing the primary promotes the new first entry. Out-of-range
    /// indices are ignored.
    pub fn remove(&mut self, index: usize) -> Option<GalleryImage> {
        if index >= self.entries.len() {
            return None;
        }
        let removed = self.entries.remove(index);
        if let GalleryImage::Stored(url) = &removed {
            self.removed_stored.push(url.clone());
        }

        self.primary = match self.primary {
            _ if self.entries.is_empty() => None,
            Some(p) if p == index => Some(0),
            Some(p) if p > index => Some(p - 1),
            other => other,
        };

        Some(removed)
    }

    /// Marks the entry at `index` as primary. Out-of-range indices are ignored.
    pub fn set_primary(&mut self, index: usize) {
        if index < self.entries.len() {
            self.primary = Some(index);
        }
    }

    /// Files still waiting for upload, in gallery order.
    #[must_use]
    pub fn pending_files(&self) -> Vec<&ImageFile> {
        self.entries
            .iter()
            .filter_map(|entry| match entry {
                GalleryImage::Pending(file) => Some(file),
                GalleryImage::Stored(_) => None,
            })
            .collect()
    }

    /// Produces the persisted image set, substituting `uploaded` URLs for the
    /// pending files in order.
    ///
    /// Returns `None` when the number of uploaded URLs does not match the
    /// number of pending files.
    #[must_use]
    pub fn resolve(&self, uploaded: &[String]) -> Option<ProductImages> {
        if uploaded.len() != self.pending_files().len() {
            return None;
        }
        let mut uploaded = uploaded.iter();
        let urls: Vec<String> = self
            .entries
            .iter()
            .map(|entry| match entry {
                GalleryImage::Stored(url) => url.clone(),
                GalleryImage::Pending(_) => uploaded.next().cloned().unwrap_or_default(),
            })
            .collect();
        Some(ProductImages::new(urls, self.primary.unwrap_or(0)))
    }
}
