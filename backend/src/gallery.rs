use image::ImageFormat;
use image::imageops::FilterType;
use shared::{GalleryCategory, GalleryImage, GalleryResponse, THUMBNAIL_SIZE};
use std::io::Cursor;
use std::path::{Path, PathBuf};

const IMAGE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

#[derive(Debug, thiserror::Error)]
pub enum GalleryError {
    #[error("Invalid gallery file name: {0}")]
    InvalidName(String),
    #[error("Gallery image not found: {0}")]
    NotFound(String),
    #[error("Failed to decode gallery image: {0}")]
    Decode(#[from] image::ImageError),
}

/// Example images kept on disk, one directory per category.
#[derive(Debug, Clone)]
pub struct Gallery {
    root: PathBuf,
}

impl Gallery {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn category_dir(&self, category: GalleryCategory) -> PathBuf {
        self.root.join(category.to_string())
    }

    /// Sorted image file names. A missing directory is an empty gallery.
    pub fn list(&self, category: GalleryCategory) -> Vec<String> {
        let dir = self.category_dir(category);
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) => {
                log::debug!("Gallery directory {} unavailable: {}", dir.display(), e);
                return Vec::new();
            }
        };

        let mut names: Vec<String> = entries
            .filter_map(Result::ok)
            .filter(|entry| entry.path().is_file())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| is_image_file(name))
            .collect();
        names.sort();
        names
    }

    pub fn listing(&self) -> GalleryResponse {
        GalleryResponse {
            normal: self.images(GalleryCategory::Normal),
            cataract: self.images(GalleryCategory::Katarak),
        }
    }

    fn images(&self, category: GalleryCategory) -> Vec<GalleryImage> {
        self.list(category)
            .into_iter()
            .map(|file_name| GalleryImage {
                url: format!("/api/gallery/{}/{}", category, urlencoding::encode(&file_name)),
                file_name,
            })
            .collect()
    }

    /// The image resized to the fixed display size, encoded as PNG.
    pub fn thumbnail(&self, category: GalleryCategory, file_name: &str) -> Result<Vec<u8>, GalleryError> {
        if !is_safe_name(file_name) || !is_image_file(file_name) {
            return Err(GalleryError::InvalidName(file_name.to_string()));
        }

        let path = self.category_dir(category).join(file_name);
        if !path.is_file() {
            return Err(GalleryError::NotFound(format!("{}/{}", category, file_name)));
        }

        let image = image::open(&path)?;
        let thumbnail = image.resize_exact(THUMBNAIL_SIZE, THUMBNAIL_SIZE, FilterType::CatmullRom);

        let mut bytes = Vec::new();
        thumbnail.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(bytes)
    }
}

fn is_image_file(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

fn is_safe_name(name: &str) -> bool {
    !name.is_empty() && !name.starts_with('.') && !name.contains(['/', '\\']) && !name.contains("..")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::testing::png_bytes;

    fn gallery_with(files: &[(&str, &str)]) -> (tempfile::TempDir, Gallery) {
        let dir = tempfile::tempdir().unwrap();
        for (category, name) in files {
            let category_dir = dir.path().join(category);
            std::fs::create_dir_all(&category_dir).unwrap();
            let contents = if is_image_file(name) {
                png_bytes(40, 30, [200, 10, 10])
            } else {
                b"notes".to_vec()
            };
            std::fs::write(category_dir.join(name), contents).unwrap();
        }
        let gallery = Gallery::new(dir.path());
        (dir, gallery)
    }

    #[test]
    fn missing_directory_is_empty() {
        let (_dir, gallery) = gallery_with(&[]);
        assert!(gallery.list(GalleryCategory::Normal).is_empty());
        assert_eq!(gallery.listing(), GalleryResponse::default());
    }

    #[test]
    fn lists_only_images_sorted() {
        let (_dir, gallery) = gallery_with(&[
            ("normal", "b.JPG"),
            ("normal", "a.png"),
            ("normal", "readme.txt"),
            ("normal", "c.jpeg"),
            ("katarak", "k1.png"),
        ]);

        assert_eq!(gallery.list(GalleryCategory::Normal), vec!["a.png", "b.JPG", "c.jpeg"]);
        assert_eq!(gallery.list(GalleryCategory::Katarak), vec!["k1.png"]);
    }

    #[test]
    fn listing_builds_encoded_urls() {
        let (_dir, gallery) = gallery_with(&[("katarak", "eye 1.png")]);
        let listing = gallery.listing();

        assert!(listing.normal.is_empty());
        assert_eq!(listing.cataract.len(), 1);
        assert_eq!(listing.cataract[0].file_name, "eye 1.png");
        assert_eq!(listing.cataract[0].url, "/api/gallery/katarak/eye%201.png");
    }

    #[test]
    fn thumbnail_has_fixed_size() {
        let (_dir, gallery) = gallery_with(&[("normal", "a.png")]);
        let bytes = gallery.thumbnail(GalleryCategory::Normal, "a.png").unwrap();

        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (THUMBNAIL_SIZE, THUMBNAIL_SIZE));
    }

    #[test]
    fn thumbnail_rejects_traversal_and_unknown_files() {
        let (_dir, gallery) = gallery_with(&[("normal", "a.png")]);

        for name in ["../a.png", "..", "sub/a.png", ".hidden.png", "a.txt"] {
            assert!(matches!(
                gallery.thumbnail(GalleryCategory::Normal, name),
                Err(GalleryError::InvalidName(_))
            ));
        }
        assert!(matches!(
            gallery.thumbnail(GalleryCategory::Katarak, "a.png"),
            Err(GalleryError::NotFound(_))
        ));
    }
}
