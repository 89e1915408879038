//! Avatar renderer: swaps the displayed mouth image

use image::RgbaImage;
use mouthsync_core::{MouthMapping, MouthShape};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Resolves mouth shapes to image files under one directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetCatalog {
    root: PathBuf,
}

impl AssetCatalog {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the image for `shape`
    pub fn path(&self, shape: MouthShape) -> PathBuf {
        self.root.join(shape.file_name())
    }
}

/// Decoded mouth images, ready to display without load latency
#[derive(Debug, Default)]
pub struct PreloadCache {
    images: HashMap<MouthShape, Arc<RgbaImage>>,
}

impl PreloadCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes and caches one shape. Already cached shapes are left alone.
    pub fn load(&mut self, catalog: &AssetCatalog, shape: MouthShape) -> crate::Result<()> {
        if self.images.contains_key(&shape) {
            return Ok(());
        }
        let image = image::open(catalog.path(shape))?.to_rgba8();
        self.images.insert(shape, Arc::new(image));
        Ok(())
    }

    pub fn get(&self, shape: MouthShape) -> Option<Arc<RgbaImage>> {
        self.images.get(&shape).cloned()
    }

    pub fn contains(&self, shape: MouthShape) -> bool {
        self.images.contains_key(&shape)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

/// What the avatar currently shows
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayedImage {
    /// A decoded image from the preload cache
    Preloaded {
        shape: MouthShape,
        image: Arc<RgbaImage>,
    },
    /// Not cached; the host loads the file itself
    Path { shape: MouthShape, path: PathBuf },
}

impl DisplayedImage {
    pub fn shape(&self) -> MouthShape {
        match self {
            DisplayedImage::Preloaded { shape, .. } | DisplayedImage::Path { shape, .. } => *shape,
        }
    }

    pub fn is_preloaded(&self) -> bool {
        matches!(self, DisplayedImage::Preloaded { .. })
    }
}

/// Owns the single displayed-image reference of the avatar
#[derive(Debug)]
pub struct AvatarRenderer {
    catalog: AssetCatalog,
    cache: PreloadCache,
    displayed: DisplayedImage,
    swaps: u64,
}

impl AvatarRenderer {
    /// Creates a renderer showing the neutral mouth
    pub fn new(catalog: AssetCatalog) -> Self {
        let displayed = DisplayedImage::Path {
            shape: MouthShape::Neutral,
            path: catalog.path(MouthShape::Neutral),
        };
        Self {
            catalog,
            cache: PreloadCache::new(),
            displayed,
            swaps: 0,
        }
    }

    pub fn catalog(&self) -> &AssetCatalog {
        &self.catalog
    }

    pub fn cache(&self) -> &PreloadCache {
        &self.cache
    }

    /// Preloads the neutral image; done once at startup
    pub fn preload_default(&mut self) {
        self.preload(MouthShape::Neutral);
        if self.displayed.shape() == MouthShape::Neutral {
            self.displayed = self.lookup(MouthShape::Neutral);
        }
    }

    /// Preloads every mouth image, returning how many are cached afterwards
    pub fn preload_all(&mut self) -> usize {
        for shape in MouthShape::ALL {
            self.preload(shape);
        }
        self.cache.len()
    }

    fn preload(&mut self, shape: MouthShape) {
        if let Err(e) = self.cache.load(&self.catalog, shape) {
            tracing::warn!(
                shape = %shape,
                path = %self.catalog.path(shape).display(),
                error = %e,
                "failed to preload mouth image"
            );
        }
    }

    /// Shows the image mapped to `viseme_id`, the neutral mouth when unmapped
    pub fn render(&mut self, viseme_id: u32, mapping: &MouthMapping) {
        let shape = mapping.shape_for_id(viseme_id);
        tracing::debug!(viseme = viseme_id, shape = %shape, "mouth swap");
        self.show(shape);
    }

    /// Shows the neutral mouth
    pub fn show_default(&mut self) {
        self.show(MouthShape::Neutral);
    }

    fn show(&mut self, shape: MouthShape) {
        self.displayed = self.lookup(shape);
        self.swaps += 1;
    }

    fn lookup(&self, shape: MouthShape) -> DisplayedImage {
        match self.cache.get(shape) {
            Some(image) => DisplayedImage::Preloaded { shape, image },
            None => DisplayedImage::Path {
                shape,
                path: self.catalog.path(shape),
            },
        }
    }

    pub fn displayed(&self) -> &DisplayedImage {
        &self.displayed
    }

    pub fn displayed_shape(&self) -> MouthShape {
        self.displayed.shape()
    }

    /// Number of times the displayed image has been replaced
    pub fn swap_count(&self) -> u64 {
        self.swaps
    }
}
