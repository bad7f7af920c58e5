// image_processing.rs
use crate::app::ConvertError;
use crate::utils::Logger;
use image::codecs::jpeg::JpegEncoder;
use image::{ColorType, DynamicImage, ImageFormat, RgbImage};
use std::fs;
use std::path::Path;

/// Decode `input`, flatten it to RGB and write it to `output` as a JPEG.
///
/// On error no new file is left at `output`.
pub fn convert_to_jpeg(
    input: &Path,
    output: &Path,
    quality: u8,
    logger: &Logger,
) -> Result<(), ConvertError> {
    let label = format!("Loading image {}", input.display());
    let img = logger.timed(&label, || load_image(input))?;

    let rgb = flatten_to_rgb(img);

    let jpeg_data = logger.timed("Encoding to JPEG", || encode_to_jpeg(&rgb, quality))?;
    logger.timed("Saving JPEG file", || save_jpeg(&jpeg_data, output))
}

pub fn load_image(path: &Path) -> Result<DynamicImage, ConvertError> {
    let data = fs::read(path)?;
    decode_image(&data)
}

/// Sniff the format from the bytes; WebP is decoded by libwebp.
pub fn decode_image(data: &[u8]) -> Result<DynamicImage, ConvertError> {
    match image::guess_format(data) {
        Ok(ImageFormat::WebP) => decode_webp(data),
        Ok(_) => Ok(image::load_from_memory(data)?),
        Err(e) => Err(ConvertError::Decode(format!("cannot identify image data: {}", e))),
    }
}

fn decode_webp(data: &[u8]) -> Result<DynamicImage, ConvertError> {
    if let Some(webp_image) = webp::Decoder::new(data).decode() {
        return Ok(webp_image.to_image());
    }
    // the simple decoder refuses animations, anything else it refuses is corrupt
    let animated = webp::BitstreamFeatures::new(data)
        .map(|features| features.has_animation())
        .unwrap_or(false);
    if !animated {
        return Err(ConvertError::Decode("corrupt or truncated WebP data".to_string()));
    }

    let animation = webp::AnimDecoder::new(data)
        .decode()
        .map_err(|e| ConvertError::Decode(format!("cannot decode animated WebP: {}", e)))?;
    match animation.get_frame(0) {
        Some(frame) => Ok((&frame).into()),
        None => Err(ConvertError::Decode("animated WebP has no frames".to_string())),
    }
}

/// Drops any alpha channel.
pub fn flatten_to_rgb(img: DynamicImage) -> RgbImage {
    img.to_rgb8()
}

pub fn encode_to_jpeg(img: &RgbImage, quality: u8) -> Result<Vec<u8>, ConvertError> {
    let mut buffer = Vec::new();
    {
        let mut encoder = JpegEncoder::new_with_quality(&mut buffer, quality);
        encoder.encode(img.as_raw(), img.width(), img.height(), ColorType::Rgb8)?;
    }
    Ok(buffer)
}

/// A file this call created is removed again if the write fails; one that
/// was already there is left alone.
fn save_jpeg(jpeg_data: &[u8], output_path: &Path) -> Result<(), ConvertError> {
    let existed = output_path.exists();
    if let Err(e) = fs::write(output_path, jpeg_data) {
        if !existed {
            let _ = fs::remove_file(output_path);
        }
        return Err(e.into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn webp_bytes(width: u32, height: u32) -> Vec<u8> {
        let pixels: Vec<u8> = (0..width * height)
            .flat_map(|i| [(i % 255) as u8, 40, 200])
            .collect();
        webp::Encoder::from_rgb(&pixels, width, height).encode(90.0).to_vec()
    }

    #[test]
    fn decodes_lossy_webp() {
        let img = decode_image(&webp_bytes(8, 6)).unwrap();
        assert_eq!((img.width(), img.height()), (8, 6));
    }

    #[test]
    fn rejects_garbage() {
        let err = decode_image(b"definitely not an image").unwrap_err();
        assert!(matches!(err, ConvertError::Decode(_)));
    }

    #[test]
    fn rejects_truncated_webp() {
        let bytes = webp_bytes(64, 64);
        for percent in [33, 50, 80, 90, 99] {
            let cut = bytes.len() * percent / 100;
            let result = decode_image(&bytes[..cut]);
            assert!(
                matches!(result, Err(ConvertError::Decode(_))),
                "prefix of {} of {} bytes decoded",
                cut,
                bytes.len()
            );
        }
        let last_byte_missing = &bytes[..bytes.len() - 1];
        assert!(decode_image(last_byte_missing).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn failed_write_keeps_a_file_that_was_already_there() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::TempDir::new().unwrap();
        let existing = tmp.path().join("pic.jpg");
        fs::write(&existing, b"from the source folder").unwrap();
        fs::set_permissions(&existing, fs::Permissions::from_mode(0o444)).unwrap();

        match save_jpeg(b"new jpeg bytes", &existing) {
            Err(_) => assert_eq!(fs::read(&existing).unwrap(), b"from the source folder"),
            // root ignores the read-only bit
            Ok(()) => assert_eq!(fs::read(&existing).unwrap(), b"new jpeg bytes"),
        }
    }

    #[test]
    fn animated_webp_converts_its_first_frame() {
        let config = webp::WebPConfig::new().unwrap();
        let red = vec![255u8, 0, 0].repeat(4 * 4);
        let blue = vec![0u8, 0, 255].repeat(4 * 4);
        let mut encoder = webp::AnimEncoder::new(4, 4, &config);
        encoder.add_frame(webp::AnimFrame::from_rgb(&red, 4, 4, 0));
        encoder.add_frame(webp::AnimFrame::from_rgb(&blue, 4, 4, 100));
        let bytes = encoder.encode().to_vec();

        let img = decode_image(&bytes).unwrap();
        assert_eq!((img.width(), img.height()), (4, 4));
        let [r, _, b] = img.to_rgb8().get_pixel(1, 1).0;
        assert!(r > 200 && b < 60);

        let truncated = &bytes[..bytes.len() * 9 / 10];
        assert!(decode_image(truncated).is_err());
    }

    #[test]
    fn failed_write_leaves_nothing_new_behind() {
        let tmp = tempfile::TempDir::new().unwrap();
        let output = tmp.path().join("missing_dir").join("pic.jpg");
        assert!(save_jpeg(b"jpeg", &output).is_err());
        assert!(!output.exists());
    }

    #[test]
    fn flattening_drops_alpha() {
        let mut rgba = image::RgbaImage::new(2, 2);
        for pixel in rgba.pixels_mut() {
            *pixel = Rgba([10, 20, 30, 0]);
        }
        let rgb = flatten_to_rgb(DynamicImage::ImageRgba8(rgba));
        assert_eq!(rgb.as_raw().len(), 2 * 2 * 3);
        assert_eq!(rgb.get_pixel(1, 1).0, [10, 20, 30]);
    }

    #[test]
    fn encodes_a_jpeg_stream() {
        let rgb = RgbImage::from_pixel(4, 4, image::Rgb([120, 60, 30]));
        let jpeg = encode_to_jpeg(&rgb, 95).unwrap();
        assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
        assert_eq!(image::guess_format(&jpeg).unwrap(), ImageFormat::Jpeg);
    }
}
