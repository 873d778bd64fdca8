//! Public content: the village announcement, the banner image and the
//! static health-education catalog.

use std::io::{Cursor, ErrorKind};

use image::{ImageFormat, ImageOutputFormat};
use serde::Serialize;

use crate::config::{ANNOUNCEMENT_FILE, BANNER_FILE};
use crate::store::{atomic, CsvStore, StoreError};

/// Largest banner upload accepted, in bytes.
pub const MAX_BANNER_BYTES: usize = 5 * 1024 * 1024;

/// Largest banner side, in pixels.
pub const MAX_BANNER_SIDE: u32 = 8192;

/// Largest banner area, in pixels. Bounds the decoded RGB buffer.
pub const MAX_BANNER_PIXELS: u64 = 24_000_000;

const BANNER_JPEG_QUALITY: u8 = 90;

#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("Banner is {size} bytes, limit is {limit}")]
    BannerTooLarge { size: usize, limit: usize },
    #[error("Banner is {width}x{height} pixels, too large to process")]
    BannerDimensions { width: u32, height: u32 },
    #[error("Banner must be a JPEG or PNG image")]
    UnsupportedImage,
    #[error("Image processing error: {0}")]
    Image(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

// ═══════════════════════════════════════════════════════════
// Announcement
// ═══════════════════════════════════════════════════════════

/// Current announcement. Empty when none has been written.
pub fn read_announcement(store: &CsvStore) -> Result<String, ContentError> {
    match std::fs::read_to_string(store.path(ANNOUNCEMENT_FILE)) {
        Ok(text) => Ok(text),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(String::new()),
        Err(e) => Err(StoreError::from(e).into()),
    }
}

/// Replace the announcement with the trimmed text. Returns what was stored.
pub fn write_announcement(store: &CsvStore, text: &str) -> Result<String, ContentError> {
    let trimmed = text.trim().to_string();
    atomic::replace_bytes(&store.path(ANNOUNCEMENT_FILE), trimmed.as_bytes())?;
    tracing::info!(chars = trimmed.chars().count(), "Announcement updated");
    Ok(trimmed)
}

// ═══════════════════════════════════════════════════════════
// Banner
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BannerInfo {
    pub width: u32,
    pub height: u32,
    pub bytes: usize,
}

/// Decode an uploaded JPEG/PNG, re-encode it as JPEG and replace the
/// stored banner. Anything that does not decode is rejected before the
/// previous banner is touched.
///
/// Decoding is CPU-bound; async callers run this on the blocking pool.
pub fn save_banner(store: &CsvStore, upload: &[u8]) -> Result<BannerInfo, ContentError> {
    if upload.len() > MAX_BANNER_BYTES {
        return Err(ContentError::BannerTooLarge {
            size: upload.len(),
            limit: MAX_BANNER_BYTES,
        });
    }
    match image::guess_format(upload) {
        Ok(ImageFormat::Jpeg) | Ok(ImageFormat::Png) => {}
        _ => return Err(ContentError::UnsupportedImage),
    }

    // Header only: reject huge canvases before allocating pixel buffers.
    let (width, height) = image::io::Reader::new(Cursor::new(upload))
        .with_guessed_format()
        .map_err(|e| ContentError::Image(e.to_string()))?
        .into_dimensions()
        .map_err(|e| ContentError::Image(e.to_string()))?;
    if width > MAX_BANNER_SIDE
        || height > MAX_BANNER_SIDE
        || u64::from(width) * u64::from(height) > MAX_BANNER_PIXELS
    {
        return Err(ContentError::BannerDimensions { width, height });
    }

    let decoded = image::load_from_memory(upload)
        .map_err(|e| ContentError::Image(e.to_string()))?;
    let buffer = decoded.to_rgb8();
    let (width, height) = buffer.dimensions();
    let rgb = image::DynamicImage::ImageRgb8(buffer);

    let mut jpeg = Vec::new();
    rgb.write_to(&mut jpeg, ImageOutputFormat::Jpeg(BANNER_JPEG_QUALITY))
        .map_err(|e| ContentError::Image(e.to_string()))?;

    atomic::replace_bytes(&store.path(BANNER_FILE), &jpeg)?;
    tracing::info!(width, height, bytes = jpeg.len(), "Banner replaced");
    Ok(BannerInfo {
        width,
        height,
        bytes: jpeg.len(),
    })
}

/// Stored banner JPEG, if one was uploaded.
pub fn read_banner(store: &CsvStore) -> Result<Option<Vec<u8>>, ContentError> {
    match std::fs::read(store.path(BANNER_FILE)) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(StoreError::from(e).into()),
    }
}

// ═══════════════════════════════════════════════════════════
// Education catalog
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Booklet {
    pub title: &'static str,
    pub description: &'static str,
    pub url: &'static str,
}

/// One card of the "KORAN SIPETUALANG" news section.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct NewsArticle {
    pub headline: &'static str,
    pub summary: &'static str,
    pub url: Option<&'static str>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct EducationCatalog {
    pub booklets: &'static [Booklet],
    pub news_title: &'static str,
    pub news: &'static [NewsArticle],
    pub game_title: &'static str,
    pub game_url: &'static str,
}

const BOOKLETS: &[Booklet] = &[
    Booklet {
        title: "Profil Kesehatan Masyarakat Lingkar Tambang",
        description: "Profil Kesehatan Masyarakat Lingkar Tambang Kabupaten Lahat 2025.",
        url: "https://heyzine.com/flip-book/f8c084b932.html",
    },
    Booklet {
        title: "Masyarakat Sehat Lingkar Tambang",
        description: "Panduan ringkas untuk masyarakat sekitar tambang.",
        url: "https://heyzine.com/flip-book/e01487ccf7.html",
    },
    Booklet {
        title: "Suara Kecilku Di Bumi Batu Bara",
        description: "Buku ajar untuk anak-anak di lingkar tambang.",
        url: "https://heyzine.com/flip-book/e2b1493dcd.html",
    },
];

// No article page exists yet, so the card has no link.
const NEWS: &[NewsArticle] = &[NewsArticle {
    headline: "PT ABC Salurkan Bantuan untuk Masyarakat Lingkar Tambang",
    summary: "Lahat, Sebagai perusahaan tambang yang beroperasi di wilayah lingkar tambang, \
        PT ABC kembali menunjukkan komitmennya dalam meningkatkan kesejahteraan masyarakat \
        sekitar. Melalui program tanggung jawab sosial perusahaan (CSR), PT ABC menyalurkan \
        berbagai bentuk bantuan yang menyasar kebutuhan kesehatan, pendidikan, dan lingkungan.",
    url: None,
}];

pub fn education_catalog() -> EducationCatalog {
    EducationCatalog {
        booklets: BOOKLETS,
        news_title: "KORAN SIPETUALANG",
        news: NEWS,
        game_title: "Sanitary Camp",
        game_url: "https://sanitary-camp.berandadigital.net",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbImage::from_pixel(width, height, image::Rgb([30u8, 120, 200]));
        let mut buf = Vec::new();
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut buf, ImageOutputFormat::Png)
            .unwrap();
        buf
    }

    fn test_store() -> (CsvStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        (CsvStore::new(dir.path()), dir)
    }

    fn crc32(bytes: &[u8]) -> u32 {
        let mut crc = 0xFFFF_FFFFu32;
        for &b in bytes {
            crc ^= u32::from(b);
            for _ in 0..8 {
                crc = if crc & 1 != 0 { (crc >> 1) ^ 0xEDB8_8320 } else { crc >> 1 };
            }
        }
        !crc
    }

    /// A small valid PNG whose IHDR claims `width` x `height`.
    fn png_claiming(width: u32, height: u32) -> Vec<u8> {
        let mut bytes = png_bytes(1, 1);
        bytes[16..20].copy_from_slice(&width.to_be_bytes());
        bytes[20..24].copy_from_slice(&height.to_be_bytes());
        let crc = crc32(&bytes[12..29]);
        bytes[29..33].copy_from_slice(&crc.to_be_bytes());
        bytes
    }

    #[test]
    fn announcement_defaults_to_empty_and_is_trimmed() {
        let (store, _dir) = test_store();
        assert_eq!(read_announcement(&store).unwrap(), "");

        let stored = write_announcement(&store, "  Posyandu minggu depan di Balai Desa!\n").unwrap();
        assert_eq!(stored, "Posyandu minggu depan di Balai Desa!");
        assert_eq!(read_announcement(&store).unwrap(), stored);
    }

    #[test]
    fn png_banner_is_stored_as_jpeg() {
        let (store, _dir) = test_store();
        assert!(read_banner(&store).unwrap().is_none());

        let info = save_banner(&store, &png_bytes(40, 20)).unwrap();
        assert_eq!((info.width, info.height), (40, 20));

        let stored = read_banner(&store).unwrap().unwrap();
        assert_eq!(stored.len(), info.bytes);
        assert_eq!(image::guess_format(&stored).unwrap(), ImageFormat::Jpeg);
    }

    #[test]
    fn garbage_upload_keeps_previous_banner() {
        let (store, _dir) = test_store();
        save_banner(&store, &png_bytes(8, 8)).unwrap();
        let before = read_banner(&store).unwrap();

        let err = save_banner(&store, b"definitely not an image").unwrap_err();
        assert!(matches!(err, ContentError::UnsupportedImage));
        assert_eq!(read_banner(&store).unwrap(), before);
    }

    #[test]
    fn truncated_png_is_an_image_error() {
        let (store, _dir) = test_store();
        let mut bytes = png_bytes(16, 16);
        bytes.truncate(40);
        assert!(matches!(
            save_banner(&store, &bytes),
            Err(ContentError::Image(_))
        ));
    }

    #[test]
    fn oversize_upload_rejected_before_decoding() {
        let (store, _dir) = test_store();
        let big = vec![0u8; MAX_BANNER_BYTES + 1];
        assert!(matches!(
            save_banner(&store, &big),
            Err(ContentError::BannerTooLarge { .. })
        ));
    }

    #[test]
    fn huge_declared_dimensions_rejected_from_header() {
        let (store, _dir) = test_store();
        let bytes = png_claiming(60_000, 60_000);
        assert!(bytes.len() < 1024);
        // the PNG decoder may refuse the canvas itself while reading the header
        assert!(matches!(
            save_banner(&store, &bytes),
            Err(ContentError::BannerDimensions { .. }) | Err(ContentError::Image(_))
        ));

        let too_wide = png_claiming(MAX_BANNER_SIDE + 1, 10);
        assert!(matches!(
            save_banner(&store, &too_wide),
            Err(ContentError::BannerDimensions { .. })
        ));
        assert!(read_banner(&store).unwrap().is_none());
    }

    #[test]
    fn catalog_lists_three_booklets_news_and_game() {
        let catalog = education_catalog();
        assert_eq!(catalog.booklets.len(), 3);
        assert_eq!(catalog.news_title, "KORAN SIPETUALANG");
        assert_eq!(catalog.news.len(), 1);
        assert!(catalog.news[0].headline.contains("PT ABC"));
        assert!(catalog.booklets.iter().all(|b| b.url.starts_with("https://")));
        assert_eq!(catalog.game_url, "https://sanitary-camp.berandadigital.net");
    }
}
