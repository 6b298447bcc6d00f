use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::UNIX_EPOCH;

use xxhash_rust::xxh3::Xxh3;

use crate::assets::ImageLoader;
use crate::assets::decode::{DecodedImage, load_image};

const XXH3_SEED: u64 = 0x5f3c_71a2_9e04_d6b8;

/// Identity of a file version: path, modification time and length.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SourceFingerprint {
    hi: u64,
    lo: u64,
}

/// Fingerprint `path` as it currently exists on disk, or `None` if it cannot be stat'ed.
pub fn fingerprint_source(path: &Path) -> Option<SourceFingerprint> {
    let meta = std::fs::metadata(path).ok()?;
    let mtime_ns = meta
        .modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_nanos())
        .unwrap_or(0);

    let mut h = Xxh3::with_seed(XXH3_SEED);
    h.update(path.as_os_str().as_encoded_bytes());
    h.update(&[0]);
    h.update(&mtime_ns.to_le_bytes());
    h.update(&meta.len().to_le_bytes());
    let v = h.digest128();
    Some(SourceFingerprint {
        hi: (v >> 64) as u64,
        lo: v as u64,
    })
}

/// Decodes kept by a [`CachedLoader`] unless another capacity is requested.
pub const DEFAULT_CACHE_CAPACITY: usize = 64;

/// Decode cache keyed by [`SourceFingerprint`].
///
/// Editing a file on disk changes its fingerprint, so stale entries are never served.
/// At most `capacity` decodes are held; the oldest insertion is evicted first.
#[derive(Debug)]
pub struct CachedLoader {
    capacity: usize,
    entries: Mutex<Entries>,
}

#[derive(Debug, Default)]
struct Entries {
    map: HashMap<SourceFingerprint, Arc<DecodedImage>>,
    order: VecDeque<SourceFingerprint>,
}

impl Entries {
    fn insert(&mut self, key: SourceFingerprint, value: Arc<DecodedImage>, capacity: usize) {
        if self.map.insert(key, value).is_none() {
            self.order.push_back(key);
        }
        while self.map.len() > capacity {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            self.map.remove(&oldest);
        }
    }
}

impl Default for CachedLoader {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }
}

impl CachedLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache holding at most `capacity` decodes (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: Mutex::new(Entries::default()),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.map.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut e) = self.entries.lock() {
            e.map.clear();
            e.order.clear();
        }
    }
}

impl ImageLoader for CachedLoader {
    fn load(&self, path: &Path) -> Option<Arc<DecodedImage>> {
        let Some(key) = fingerprint_source(path) else {
            tracing::warn!(path = %path.display(), "image path does not resolve to a file");
            return None;
        };

        if let Some(hit) = self.entries.lock().ok().and_then(|e| e.map.get(&key).cloned()) {
            return Some(hit);
        }

        let decoded = Arc::new(load_image(path)?);
        if let Ok(mut e) = self.entries.lock() {
            e.insert(key, decoded.clone(), self.capacity);
        }
        Some(decoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;

    #[test]
    fn repeated_loads_share_one_decode() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.png");
        RgbaImage::new(8, 4).save(&path).unwrap();

        let loader = CachedLoader::new();
        let a = loader.load(&path).unwrap();
        let b = loader.load(&path).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(loader.len(), 1);

        loader.clear();
        assert!(loader.is_empty());
    }

    #[test]
    fn changed_file_gets_new_fingerprint() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.png");
        RgbaImage::new(8, 4).save(&path).unwrap();
        let before = fingerprint_source(&path).unwrap();

        RgbaImage::new(16, 16).save(&path).unwrap();
        let after = fingerprint_source(&path).unwrap();
        assert_ne!(before, after);
    }

    #[test]
    fn missing_file_is_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        let loader = CachedLoader::new();
        assert!(loader.load(&dir.path().join("gone.png")).is_none());
        assert!(loader.is_empty());
    }

    #[test]
    fn oldest_decode_is_evicted_at_capacity() {
        let dir = tempfile::tempdir().unwrap();
        let paths: Vec<_> = (0..3)
            .map(|i| {
                let p = dir.path().join(format!("{i}.png"));
                RgbaImage::new(2, 2).save(&p).unwrap();
                p
            })
            .collect();

        let loader = CachedLoader::with_capacity(2);
        let first = loader.load(&paths[0]).unwrap();
        loader.load(&paths[1]).unwrap();
        loader.load(&paths[2]).unwrap();
        assert_eq!(loader.len(), 2);

        let again = loader.load(&paths[0]).unwrap();
        assert!(!Arc::ptr_eq(&first, &again));
        assert_eq!(loader.len(), 2);
        assert_eq!(CachedLoader::with_capacity(0).capacity(), 1);
    }

    #[test]
    fn load_many_keeps_order() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.png");
        let b = dir.path().join("b.png");
        RgbaImage::new(3, 1).save(&a).unwrap();
        RgbaImage::new(1, 5).save(&b).unwrap();

        let loader = CachedLoader::new();
        let out = loader.load_many(&[Some(b.as_path()), None, Some(a.as_path())]);
        assert_eq!(out[0].as_ref().unwrap().full.dimensions(), (1, 5));
        assert!(out[1].is_none());
        assert_eq!(out[2].as_ref().unwrap().full.dimensions(), (3, 1));
    }
}
