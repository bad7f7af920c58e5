// app.rs
pub mod converter;
pub mod folders;
pub mod image_processing;
pub mod media_map;

use std::error::Error;
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::io;
use std::path::PathBuf;

pub use converter::{run, run_in};

/// How the output file name is derived from a matched input name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NameRewrite {
    /// Replace the first occurrence of the source extension anywhere in the name.
    FirstOccurrence,
    /// Replace only the trailing source extension.
    TrailingSuffix,
}

#[derive(Clone, Debug)]
pub struct ConverterConfig {
    pub folder_count: usize,
    pub folder_prefix: String,
    pub copy_suffix: String,
    pub source_ext: String,
    pub target_ext: String,
    pub quality: u8,
    pub name_rewrite: NameRewrite,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            folder_count: 6,
            folder_prefix: String::from("folder_"),
            copy_suffix: String::from(" copy"),
            source_ext: String::from(".webp"),
            target_ext: String::from(".jpg"),
            quality: 95,
            name_rewrite: NameRewrite::FirstOccurrence,
        }
    }
}

impl ConverterConfig {
    pub fn validate(&self) -> Result<(), ConvertError> {
        if self.quality == 0 || self.quality > 100 {
            return Err(ConvertError::Config(format!(
                "quality must be within 1..=100, got {}",
                self.quality
            )));
        }
        if self.source_ext.is_empty() || self.target_ext.is_empty() {
            return Err(ConvertError::Config("extensions must not be empty".to_string()));
        }
        if self.source_ext == self.target_ext {
            return Err(ConvertError::Config(format!(
                "source and target extension are both {}",
                self.source_ext
            )));
        }
        Ok(())
    }

    pub fn source_folder_name(&self, index: usize) -> String {
        format!("{}{}", self.folder_prefix, index)
    }

    pub fn target_folder_name(&self, index: usize) -> String {
        format!("{}{}{}", self.folder_prefix, index, self.copy_suffix)
    }

    /// Case-sensitive suffix match on the source extension, byte for byte.
    pub fn is_source_file<S: AsRef<OsStr>>(&self, file_name: S) -> bool {
        file_name
            .as_ref()
            .as_encoded_bytes()
            .ends_with(self.source_ext.as_bytes())
    }

    pub fn output_name<S: AsRef<OsStr>>(&self, file_name: S) -> OsString {
        rewrite_os_name(file_name.as_ref(), |bytes| self.rewrite_bytes(bytes))
    }

    fn rewrite_bytes(&self, name: &[u8]) -> Vec<u8> {
        let from = self.source_ext.as_bytes();
        if from.is_empty() {
            return name.to_vec();
        }
        let at = match self.name_rewrite {
            NameRewrite::FirstOccurrence => name.windows(from.len()).position(|w| w == from),
            NameRewrite::TrailingSuffix => name.ends_with(from).then(|| name.len() - from.len()),
        };
        match at {
            Some(i) => [&name[..i], self.target_ext.as_bytes(), &name[i + from.len()..]].concat(),
            None => name.to_vec(),
        }
    }
}

#[cfg(unix)]
fn rewrite_os_name(name: &OsStr, rewrite: impl Fn(&[u8]) -> Vec<u8>) -> OsString {
    use std::os::unix::ffi::{OsStrExt, OsStringExt};
    OsString::from_vec(rewrite(name.as_bytes()))
}

// only unpaired surrogates are lost here
#[cfg(not(unix))]
fn rewrite_os_name(name: &OsStr, rewrite: impl Fn(&[u8]) -> Vec<u8>) -> OsString {
    let text = name.to_string_lossy();
    OsString::from(String::from_utf8_lossy(&rewrite(text.as_bytes())).into_owned())
}

#[derive(Debug)]
pub enum ConvertError {
    Io(io::Error),
    Image(image::ImageError),
    Walk(walkdir::Error),
    Json(serde_json::Error),
    /// The bytes could not be decoded by any available decoder.
    Decode(String),
    Config(String),
}

impl fmt::Display for ConvertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConvertError::Io(err) => write!(f, "IO error: {}", err),
            ConvertError::Image(err) => write!(f, "Image error: {}", err),
            ConvertError::Walk(err) => write!(f, "Copy error: {}", err),
            ConvertError::Json(err) => write!(f, "JSON error: {}", err),
            ConvertError::Decode(msg) => write!(f, "Decode error: {}", msg),
            ConvertError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl Error for ConvertError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ConvertError::Io(err) => Some(err),
            ConvertError::Image(err) => Some(err),
            ConvertError::Walk(err) => Some(err),
            ConvertError::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for ConvertError {
    fn from(err: io::Error) -> Self {
        ConvertError::Io(err)
    }
}

impl From<image::ImageError> for ConvertError {
    fn from(err: image::ImageError) -> Self {
        ConvertError::Image(err)
    }
}

impl From<walkdir::Error> for ConvertError {
    fn from(err: walkdir::Error) -> Self {
        ConvertError::Walk(err)
    }
}

impl From<serde_json::Error> for ConvertError {
    fn from(err: serde_json::Error) -> Self {
        ConvertError::Json(err)
    }
}

/// Outcome of one attempted file conversion. Names are lossy for display.
#[derive(Debug)]
pub struct FileConversion {
    pub file_name: String,
    pub output_name: String,
    pub result: Result<(), ConvertError>,
}

impl FileConversion {
    pub fn succeeded(&self) -> bool {
        self.result.is_ok()
    }
}

#[derive(Debug)]
pub enum FolderOutcome {
    /// The source folder did not exist.
    Skipped,
    Copied { conversions: Vec<FileConversion> },
}

#[derive(Debug)]
pub struct FolderReport {
    pub index: usize,
    pub source: PathBuf,
    pub target: PathBuf,
    pub outcome: FolderOutcome,
}

impl FolderReport {
    pub fn conversions(&self) -> &[FileConversion] {
        match &self.outcome {
            FolderOutcome::Skipped => &[],
            FolderOutcome::Copied { conversions } => conversions,
        }
    }
}

#[derive(Debug, Default)]
pub struct RunReport {
    pub folders: Vec<FolderReport>,
}

impl RunReport {
    pub fn skipped(&self) -> usize {
        self.folders
            .iter()
            .filter(|f| matches!(f.outcome, FolderOutcome::Skipped))
            .count()
    }

    pub fn converted(&self) -> usize {
        self.folders
            .iter()
            .flat_map(|f| f.conversions())
            .filter(|c| c.succeeded())
            .count()
    }

    pub fn failed(&self) -> usize {
        self.folders
            .iter()
            .flat_map(|f| f.conversions())
            .filter(|c| !c.succeeded())
            .count()
    }

    pub fn folder(&self, index: usize) -> Option<&FolderReport> {
        self.folders.iter().find(|f| f.index == index)
    }
}
