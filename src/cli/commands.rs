use crate::cancel::CancelToken;
use crate::config::Settings;
use crate::error::{SortError, SortResult};
use crate::excel::{ExcelInputReader, InputTemplate};
use crate::files::{
    ExifDateReader, FileClassifier, MetadataDateExtractor, OrganizeSummary, Organizer, SafeMover,
};
use crate::reporter::Reporter;
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// One requested run; each variant is handled by exactly one function below
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// Move phone pictures and videos into date folders
    OrganizePhoneCamera {
        folder: PathBuf,
        recursive: bool,
        hour_offset: f64,
    },
    /// Rename roaming camera files in place to date-based names
    RenameRoamingCamera {
        folder: PathBuf,
        recursive: bool,
        hour_offset: f64,
    },
    /// Move fixed-camera files into the cycle layout
    MoveFixedCamera { folder: PathBuf, recursive: bool },
    /// Read the drift workbook, then move cycle files with drift merged
    AddDriftLevel { workbook: PathBuf },
    /// Write a blank input workbook
    WriteTemplate {
        output: PathBuf,
        folder: PathBuf,
        recursive: bool,
    },
}

/// What a finished run produced
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Organized(OrganizeSummary),
    Written(PathBuf),
}

/// Collaborators shared by every operation
pub struct Services {
    pub reporter: Arc<dyn Reporter>,
    pub classifier: FileClassifier,
    pub organizer: Organizer,
}

impl Services {
    pub fn new(settings: &Settings, reporter: Arc<dyn Reporter>) -> Self {
        let extractor = Arc::new(MetadataDateExtractor::new(
            Arc::clone(&reporter),
            Arc::new(ExifDateReader::new()),
        ));
        let classifier = FileClassifier::new(Arc::clone(&reporter), extractor, settings.workers);
        let organizer = Organizer::new(
            Arc::new(SafeMover::new()),
            Arc::clone(&reporter),
            settings.workers,
            settings.dry_run,
        );

        Self {
            reporter,
            classifier,
            organizer,
        }
    }
}

/// Route an operation to its handler
pub async fn run(
    operation: Operation,
    services: &Services,
    cancel: &CancelToken,
) -> SortResult<RunOutcome> {
    info!(?operation, "starting");
    match operation {
        Operation::OrganizePhoneCamera {
            folder,
            recursive,
            hour_offset,
        } => organize_phone_camera(services, &folder, recursive, hour_offset, cancel)
            .await
            .map(RunOutcome::Organized),

        Operation::RenameRoamingCamera {
            folder,
            recursive,
            hour_offset,
        } => rename_roaming_camera(services, &folder, recursive, hour_offset, cancel)
            .await
            .map(RunOutcome::Organized),

        Operation::MoveFixedCamera { folder, recursive } => {
            move_fixed_camera(services, &folder, recursive, cancel)
                .await
                .map(RunOutcome::Organized)
        }

        Operation::AddDriftLevel { workbook } => add_drift_level(services, &workbook, cancel)
            .await
            .map(RunOutcome::Organized),

        Operation::WriteTemplate {
            output,
            folder,
            recursive,
        } => write_template(&output, &folder, recursive).map(RunOutcome::Written),
    }
}

/// Execute the phone command
pub async fn organize_phone_camera(
    services: &Services,
    folder: &Path,
    recursive: bool,
    hour_offset: f64,
    cancel: &CancelToken,
) -> SortResult<OrganizeSummary> {
    println!("{}", "📂 Cyclesort - Organizing phone camera files".bold().green());
    println!("   Folder: {}", folder.display());
    if hour_offset != 0.0 {
        println!("   Hour offset: {}", hour_offset.to_string().bright_yellow());
    }
    println!();

    let files = services
        .classifier
        .search_in_folder(folder, hour_offset, recursive, cancel)
        .await?;
    services.reporter.info(&format!("Found {} media files", files.len()));

    let summary = services
        .organizer
        .move_to_date_folder(files, folder, cancel)
        .await?;
    print_summary(&summary);
    Ok(summary)
}

/// Execute the roaming command
pub async fn rename_roaming_camera(
    services: &Services,
    folder: &Path,
    recursive: bool,
    hour_offset: f64,
    cancel: &CancelToken,
) -> SortResult<OrganizeSummary> {
    println!("{}", "📂 Cyclesort - Renaming roaming camera files".bold().green());
    println!("   Folder: {}", folder.display());
    println!();

    let files = services
        .classifier
        .search_in_folder(folder, hour_offset, recursive, cancel)
        .await?;
    services.reporter.info(&format!("Found {} media files", files.len()));

    let summary = services
        .organizer
        .rename_to_date_name(files, folder, cancel)
        .await?;
    print_summary(&summary);
    Ok(summary)
}

/// Execute the fixed command
pub async fn move_fixed_camera(
    services: &Services,
    folder: &Path,
    recursive: bool,
    cancel: &CancelToken,
) -> SortResult<OrganizeSummary> {
    println!("{}", "📂 Cyclesort - Moving fixed camera files".bold().green());
    println!("   Folder: {}", folder.display());
    println!();

    let files = services
        .classifier
        .search_for_fixed_camera_files(folder, recursive, cancel)
        .await?;
    services.reporter.info(&format!("Found {} cycle files", files.len()));

    let summary = services
        .organizer
        .move_cycle_files(files, folder, None, cancel)
        .await?;
    print_summary(&summary);
    Ok(summary)
}

/// Execute the drift command
pub async fn add_drift_level(
    services: &Services,
    workbook: &Path,
    cancel: &CancelToken,
) -> SortResult<OrganizeSummary> {
    println!("{}", "📂 Cyclesort - Adding drift levels".bold().green());
    println!("   Workbook: {}", workbook.display());

    if !workbook.is_file() {
        return Err(SortError::FileNotFound(workbook.to_path_buf()));
    }

    let inputs = ExcelInputReader::new(workbook).read(cancel).await?;
    println!("   Folder: {}", inputs.folder_address.display());
    println!("   Recursive: {}", inputs.recursive);
    println!("   Drift rows: {}", inputs.data.len());
    println!();

    let files = services
        .classifier
        .search_for_cycle_number_files(&inputs.folder_address, inputs.recursive, cancel)
        .await?;
    services.reporter.info(&format!("Found {} cycle files", files.len()));

    let summary = services
        .organizer
        .move_cycle_files(files, &inputs.folder_address, Some(&inputs.data), cancel)
        .await?;
    print_summary(&summary);
    Ok(summary)
}

/// Execute the template command
pub fn write_template(output: &Path, folder: &Path, recursive: bool) -> SortResult<PathBuf> {
    println!("{}", "📝 Cyclesort - Writing input template".bold().green());
    println!("   Output: {}", output.display());

    InputTemplate::new(folder, recursive).write(output)?;

    println!("{}", "✅ Template written".bold().green());
    println!(
        "   Fill in '{}' and the Data rows, then run: cyclesort drift {}",
        "Folder Address".cyan(),
        output.display()
    );
    Ok(output.to_path_buf())
}

fn print_summary(summary: &OrganizeSummary) {
    println!();
    println!("{}", "✅ Done".bold().green());
    println!("   Processed: {}", summary.processed.to_string().bold());
    if summary.skipped > 0 {
        println!("   Skipped:   {}", summary.skipped.to_string().yellow());
    }
}
