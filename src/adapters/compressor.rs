use crate::domain::model::Upload;
use crate::domain::ports::{CompressionLimits, ImageCompressor};
use crate::utils::error::{Result, SiteError};
use ::image::codecs::jpeg::JpegEncoder;
use ::image::imageops::FilterType;
use ::image::{DynamicImage, GenericImageView, ImageError, RgbImage};

const START_QUALITY: u8 = 90;
const MIN_QUALITY: u8 = 40;
const QUALITY_STEP: usize = 10;
/// 降到這個邊長仍超過大小上限就放棄
const MIN_SIDE: u32 = 64;

/// 解碼上傳的圖片，把最長邊縮到 `max_dimension` 以內，
/// 再以逐步降低的 JPEG 品質重新編碼，直到檔案不超過 `max_size_bytes`。
/// 已經符合兩個限制的圖片原樣保留。
#[derive(Debug, Clone, Default)]
pub struct JpegCompressor;

impl ImageCompressor for JpegCompressor {
    fn compress(&self, upload: Upload, limits: &CompressionLimits) -> Result<Upload> {
        if !upload.content_type.starts_with("image/") {
            return Err(SiteError::UploadError {
                message: format!("Csak képfájl tölthető fel ({})", upload.content_type),
            });
        }

        let image = ::image::load_from_memory(&upload.bytes).map_err(unreadable)?;
        let (width, height) = image.dimensions();
        let longest = width.max(height);

        if upload.bytes.len() <= limits.max_size_bytes && longest <= limits.max_dimension {
            tracing::debug!(
                "🖼️ {} already within limits ({} bytes, {}x{})",
                upload.file_name,
                upload.bytes.len(),
                width,
                height
            );
            return Ok(upload);
        }

        let mut side = longest.min(limits.max_dimension).max(1);
        loop {
            let resized = fit_longest_side(&image, side).to_rgb8();

            for quality in (MIN_QUALITY..=START_QUALITY).rev().step_by(QUALITY_STEP) {
                let encoded = encode_jpeg(&resized, quality)?;
                if encoded.len() <= limits.max_size_bytes {
                    tracing::info!(
                        "🖼️ {} compressed: {} → {} bytes, {}x{} → {}x{} (q{})",
                        upload.file_name,
                        upload.bytes.len(),
                        encoded.len(),
                        width,
                        height,
                        resized.width(),
                        resized.height(),
                        quality
                    );
                    return Ok(Upload {
                        file_name: jpeg_file_name(&upload.file_name),
                        content_type: "image/jpeg".to_string(),
                        bytes: bytes::Bytes::from(encoded),
                    });
                }
            }

            if side <= MIN_SIDE {
                return Err(SiteError::UploadError {
                    message: format!(
                        "A kép nem tömöríthető {} KB alá.",
                        limits.max_size_bytes / 1024
                    ),
                });
            }
            side = (side * 3 / 4).max(MIN_SIDE);
        }
    }
}

fn fit_longest_side(image: &DynamicImage, side: u32) -> DynamicImage {
    let (width, height) = image.dimensions();
    if width.max(height) <= side {
        return image.clone();
    }
    // resize 會保持長寬比
    image.resize(side, side, FilterType::Triangle)
}

fn encode_jpeg(image: &RgbImage, quality: u8) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, quality)
        .encode_image(image)
        .map_err(unreadable)?;
    Ok(out)
}

fn jpeg_file_name(name: &str) -> String {
    match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => format!("{}.jpg", stem),
        _ => format!("{}.jpg", name),
    }
}

fn unreadable(e: ImageError) -> SiteError {
    tracing::debug!("Image processing failed: {}", e);
    SiteError::UploadError {
        message: "A fájl nem olvasható képként.".to_string(),
    }
}
