// media_map.rs
use crate::app::ConvertError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "webp", "png"];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "webm"];
const FOLDER_PREFIX: &str = "folder_";

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaFiles {
    pub images: Vec<String>,
    pub videos: Vec<String>,
}

pub type MediaMap = BTreeMap<String, MediaFiles>;

/// `folder_0` -> `0`, `folder_0 copy` -> `0 copy`, `folder_2_old` -> `2`.
pub fn folder_key(folder_name: &str) -> Option<&str> {
    folder_name.strip_prefix(FOLDER_PREFIX)?;
    folder_name.split('_').nth(1)
}

fn classify(file_name: &str, files: &mut MediaFiles) {
    let ext = match Path::new(file_name).extension().and_then(|e| e.to_str()) {
        Some(ext) => ext.to_lowercase(),
        None => return,
    };
    if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        files.images.push(file_name.to_string());
    } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
        files.videos.push(file_name.to_string());
    }
}

/// Group the media inside every `folder_*` directory under `images_dir`.
pub fn build_media_map(images_dir: &Path) -> Result<MediaMap, ConvertError> {
    let mut map = MediaMap::new();

    for entry in fs::read_dir(images_dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let folder_name = match entry.file_name().into_string() {
            Ok(name) => name,
            Err(_) => continue,
        };
        let key = match folder_key(&folder_name) {
            Some(key) => key.to_string(),
            None => continue,
        };

        let mut names: Vec<String> = fs::read_dir(entry.path())?
            .filter_map(|e| e.ok())
            .filter_map(|e| e.file_name().into_string().ok())
            .collect();
        names.sort();

        let mut files = MediaFiles::default();
        for name in &names {
            classify(name, &mut files);
        }
        map.insert(key, files);
    }

    Ok(map)
}

pub fn write_media_map(images_dir: &Path, output: &Path) -> Result<MediaMap, ConvertError> {
    let map = build_media_map(images_dir)?;
    let json = serde_json::to_string_pretty(&map)?;
    fs::write(output, json)?;
    Ok(map)
}
