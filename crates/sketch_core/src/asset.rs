//! Named image/sound assets owned by the registry.
//!
//! Registration stores the raw bytes and a data URI immediately; the
//! underlying resource (decoded pixels, sound metadata) resolves later via
//! [`AssetRegistry::resolve_loads`], the single-threaded stand-in for an async
//! load completion callback. Accessors re-resolve by name on every call, so a
//! running sketch observes additions and removals immediately, and may receive
//! a handle that is not load-complete yet — drawing an unready image is a
//! no-op, not an error.
//!
//! Duplicate names are rejected (`DuplicateName`); remove first to replace.

use crate::error::{SketchError, SketchResult};
use crate::surface::Bitmap;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::rc::Rc;

/// Asset category tag, as persisted in project records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Image,
    Sound,
}

impl AssetKind {
    pub fn label(self) -> &'static str {
        match self {
            AssetKind::Image => "Image",
            AssetKind::Sound => "Sound",
        }
    }
}

/// Sound metadata. Playback is a collaborator concern; the registry only
/// tracks that the resource finished "loading" and how big it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SoundInfo {
    pub byte_len: usize,
}

/// Load state of an asset's underlying resource.
#[derive(Debug, Clone)]
pub enum AssetHandle {
    /// Registered, load not yet resolved.
    Pending,
    Image(Rc<Bitmap>),
    Sound(SoundInfo),
    /// Load resolved but failed (bad bytes, unfetchable external URL).
    Failed(String),
}

impl AssetHandle {
    pub fn is_ready(&self) -> bool {
        matches!(self, AssetHandle::Image(_) | AssetHandle::Sound(_))
    }
}

/// One registered asset.
#[derive(Debug, Clone)]
pub struct AssetEntry {
    pub name: String,
    pub kind: AssetKind,
    /// Data URI (or verbatim external URL from a loaded project).
    pub url: String,
    pub handle: AssetHandle,
    bytes: Option<Vec<u8>>,
}

impl AssetEntry {
    /// Decoded pixels, if this is a load-complete image.
    pub fn bitmap(&self) -> Option<Rc<Bitmap>> {
        match &self.handle {
            AssetHandle::Image(bitmap) => Some(Rc::clone(bitmap)),
            _ => None,
        }
    }

    /// Sound metadata, if this is a load-complete sound.
    pub fn sound_info(&self) -> Option<SoundInfo> {
        match self.handle {
            AssetHandle::Sound(info) => Some(info),
            _ => None,
        }
    }
}

/// Mapping from user-chosen names to loaded resources.
///
/// Sole owner of every [`AssetEntry`]; sketch code only ever sees accessor
/// results, never the map itself.
#[derive(Debug, Default)]
pub struct AssetRegistry {
    entries: BTreeMap<String, AssetEntry>,
}

impl AssetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers raw imported bytes under `name`. The stored URL is a data URI
    /// synthesized from the bytes, so the entry round-trips through project
    /// records unchanged.
    pub fn register(&mut self, name: &str, kind: AssetKind, bytes: Vec<u8>) -> SketchResult<()> {
        if self.entries.contains_key(name) {
            return Err(SketchError::duplicate_name(format!(
                "asset '{}' is already registered",
                name
            )));
        }
        let url = encode_data_uri(kind, &bytes);
        self.entries.insert(
            name.to_string(),
            AssetEntry {
                name: name.to_string(),
                kind,
                url,
                handle: AssetHandle::Pending,
                bytes: Some(bytes),
            },
        );
        Ok(())
    }

    /// Registers an asset from a persisted descriptor URL. Data URIs are
    /// decoded back to bytes; external URLs are kept verbatim but can never
    /// finish loading in the sandbox.
    pub fn register_url(&mut self, name: &str, kind: AssetKind, url: &str) -> SketchResult<()> {
        if self.entries.contains_key(name) {
            return Err(SketchError::duplicate_name(format!(
                "asset '{}' is already registered",
                name
            )));
        }
        let bytes = decode_data_uri(url);
        self.entries.insert(
            name.to_string(),
            AssetEntry {
                name: name.to_string(),
                kind,
                url: url.to_string(),
                handle: AssetHandle::Pending,
                bytes,
            },
        );
        Ok(())
    }

    /// Resolves every pending load: decodes image bytes to RGBA, probes sound
    /// bytes for metadata. Entries without bytes (external URLs) fail.
    pub fn resolve_loads(&mut self) {
        for entry in self.entries.values_mut() {
            if !matches!(entry.handle, AssetHandle::Pending) {
                continue;
            }
            entry.handle = match (&entry.bytes, entry.kind) {
                (Some(bytes), AssetKind::Image) => match image::load_from_memory(bytes) {
                    Ok(img) => {
                        let rgba = img.to_rgba8();
                        let (w, h) = (rgba.width(), rgba.height());
                        AssetHandle::Image(Rc::new(Bitmap::new(w, h, rgba.into_raw())))
                    }
                    Err(e) => {
                        warn!("asset '{}': image decode failed: {}", entry.name, e);
                        AssetHandle::Failed(e.to_string())
                    }
                },
                (Some(bytes), AssetKind::Sound) => AssetHandle::Sound(SoundInfo {
                    byte_len: bytes.len(),
                }),
                (None, _) => {
                    warn!(
                        "asset '{}': external url cannot be fetched in the sandbox",
                        entry.name
                    );
                    AssetHandle::Failed("external url".to_string())
                }
            };
        }
    }

    /// Image accessor. Fails with `AssetNotFound` when `name` is absent or
    /// names a sound; the returned entry may still be load-pending.
    pub fn image(&self, name: &str) -> SketchResult<&AssetEntry> {
        match self.entries.get(name) {
            Some(entry) if entry.kind == AssetKind::Image => Ok(entry),
            _ => Err(SketchError::asset_not_found(format!(
                "Image not found: {}",
                name
            ))),
        }
    }

    /// Sound accessor, same contract as [`image`](Self::image).
    pub fn sound(&self, name: &str) -> SketchResult<&AssetEntry> {
        match self.entries.get(name) {
            Some(entry) if entry.kind == AssetKind::Sound => Ok(entry),
            _ => Err(SketchError::asset_not_found(format!(
                "Sound not found: {}",
                name
            ))),
        }
    }

    /// Deletes an entry. Programs holding accessor closures simply start
    /// getting `AssetNotFound` on their next call.
    pub fn remove(&mut self, name: &str) -> bool {
        self.entries.remove(name).is_some()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in name order.
    pub fn iter(&self) -> impl Iterator<Item = &AssetEntry> {
        self.entries.values()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

fn sniff_mime(kind: AssetKind, bytes: &[u8]) -> &'static str {
    match kind {
        AssetKind::Image => {
            if bytes.starts_with(&[0x89, b'P', b'N', b'G']) {
                "image/png"
            } else if bytes.starts_with(&[0xFF, 0xD8]) {
                "image/jpeg"
            } else if bytes.starts_with(b"GIF8") {
                "image/gif"
            } else {
                "image/png"
            }
        }
        AssetKind::Sound => {
            if bytes.starts_with(b"OggS") {
                "audio/ogg"
            } else if bytes.starts_with(b"RIFF") {
                "audio/wav"
            } else {
                "audio/mpeg"
            }
        }
    }
}

/// Builds a `data:<mime>;base64,<payload>` URI from raw bytes.
pub fn encode_data_uri(kind: AssetKind, bytes: &[u8]) -> String {
    format!(
        "data:{};base64,{}",
        sniff_mime(kind, bytes),
        STANDARD.encode(bytes)
    )
}

/// Recovers raw bytes from a base64 data URI; `None` for anything else.
pub fn decode_data_uri(url: &str) -> Option<Vec<u8>> {
    let rest = url.strip_prefix("data:")?;
    let (_, payload) = rest.split_once(";base64,")?;
    STANDARD.decode(payload).ok()
}
