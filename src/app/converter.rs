// converter.rs
use crate::app::folders::{base_directory, list_entry_names, rebuild_copy};
use crate::app::image_processing::convert_to_jpeg;
use crate::app::{
    ConvertError, ConverterConfig, FileConversion, FolderOutcome, FolderReport, RunReport,
};
use crate::utils::Logger;
use std::ffi::OsStr;
use std::fs;
use std::path::Path;
use std::time::Instant;

/// Convert every configured folder next to the running executable.
pub fn run(logger: &Logger) -> Result<RunReport, ConvertError> {
    let base_dir = base_directory()?;
    run_in(&base_dir, &ConverterConfig::default(), logger)
}

/// Processes folders in order and stops at the first folder-level failure.
pub fn run_in(
    base_dir: &Path,
    config: &ConverterConfig,
    logger: &Logger,
) -> Result<RunReport, ConvertError> {
    config.validate()?;

    logger.log("Starting folder copy and conversion process...".to_string());
    logger.log_memory("at start");

    let start = Instant::now();
    let mut report = RunReport::default();
    for index in 0..config.folder_count {
        let folder = process_folder(base_dir, index, config, logger)?;
        report.folders.push(folder);
    }

    logger.log(format!(
        "Converted {} file(s), {} failed, {} folder(s) skipped in {:?}",
        report.converted(),
        report.failed(),
        report.skipped(),
        start.elapsed()
    ));
    logger.log_memory("at end");
    logger.log("Process complete!".to_string());
    Ok(report)
}

fn process_folder(
    base_dir: &Path,
    index: usize,
    config: &ConverterConfig,
    logger: &Logger,
) -> Result<FolderReport, ConvertError> {
    let source_name = config.source_folder_name(index);
    let source = base_dir.join(&source_name);
    let target = base_dir.join(config.target_folder_name(index));

    if !source.exists() {
        logger.log(format!("Skipping {} - not found", source_name));
        return Ok(FolderReport {
            index,
            source,
            target,
            outcome: FolderOutcome::Skipped,
        });
    }

    rebuild_copy(&source, &target)?;

    let mut conversions = Vec::new();
    for file_name in list_entry_names(&target)? {
        if !config.is_source_file(&file_name) {
            continue;
        }
        conversions.push(convert_entry(&target, &file_name, config, logger));
    }

    Ok(FolderReport {
        index,
        source,
        target,
        outcome: FolderOutcome::Copied { conversions },
    })
}

/// One attempt, failures stay with the file.
fn convert_entry(
    folder: &Path,
    file_name: &OsStr,
    config: &ConverterConfig,
    logger: &Logger,
) -> FileConversion {
    let output_os_name = config.output_name(file_name);
    let input_path = folder.join(file_name);
    let output_path = folder.join(&output_os_name);
    let file_name = file_name.to_string_lossy().into_owned();
    let output_name = output_os_name.to_string_lossy().into_owned();

    let result = convert_to_jpeg(&input_path, &output_path, config.quality, logger)
        .and_then(|()| fs::remove_file(&input_path).map_err(ConvertError::from));

    match &result {
        Ok(()) => logger.log(format!("Converted: {} -> {}", file_name, output_name)),
        Err(e) => logger.log(format!("Error converting {}: {}", file_name, e)),
    }

    FileConversion {
        file_name,
        output_name,
        result,
    }
}
