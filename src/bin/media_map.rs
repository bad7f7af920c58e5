// media_map.rs
use std::process;
use webp_to_jpg_coder::app::folders::base_directory;
use webp_to_jpg_coder::app::media_map::write_media_map;
use webp_to_jpg_coder::app::ConvertError;
use webp_to_jpg_coder::utils::Logger;

fn generate(logger: &Logger) -> Result<(), ConvertError> {
    let images_dir = base_directory()?;
    // the map sits one level above the images directory
    let output = images_dir
        .parent()
        .unwrap_or(images_dir.as_path())
        .join("mediaMap.json");

    let map = write_media_map(&images_dir, &output)?;
    logger.log(format!("Indexed {} folder(s) into {}", map.len(), output.display()));
    logger.log("Media map generated.".to_string());
    Ok(())
}

fn main() {
    let logger = Logger::default();
    if let Err(e) = generate(&logger) {
        logger.log(format!("Failed to generate media map: {}", e));
        process::exit(1);
    }
}
