use std::fs::{self, File};
use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{error, info};
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

use crate::error::{AdapterError, Result};
use crate::models::SubmissionData;

/// Repackages a downloaded ZIP into the partner archive layout.
///
/// The package is extracted under a run-scoped working directory, a
/// `__SubmissionData.txt` metadata file is injected, and the directory is
/// re-compressed to `<working_name>.zip` under the package root. On failure
/// the run aborts and partially-written files remain on disk; there is no
/// rollback.
#[derive(Clone)]
pub struct ArchiveTransformer {
    package_root: PathBuf,
}

impl ArchiveTransformer {
    pub fn new(package_root: PathBuf) -> Self {
        Self { package_root }
    }

    /// Extract, rename, inject metadata, and re-zip. Blocking; callers on the
    /// async runtime wrap this in `spawn_blocking`.
    pub fn materialize(
        &self,
        raw: &[u8],
        content_type: &str,
        source_url: &str,
        credentials: Option<&Value>,
    ) -> Result<PathBuf> {
        if !content_type.to_lowercase().contains("zip") {
            return Err(AdapterError::Archive(format!(
                "content type is not zip: {content_type}"
            )));
        }

        let mut archive = ZipArchive::new(Cursor::new(raw))?;

        let uli = find_uli(&mut archive)?;
        let working_name = match &uli {
            Some(uli) => format!("{uli}_{}", chrono::Utc::now().format("%Y%m%d%H%M%S")),
            None => url_file_name(source_url)?,
        };

        let work_dir = self.package_root.join(&working_name);
        archive.extract(&work_dir)?;
        info!(path = %work_dir.display(), "package extracted");

        let metadata_name = match &uli {
            Some(uli) => format!("{uli}__SubmissionData.txt"),
            None => format!("{working_name}__SubmissionData.txt"),
        };
        let submission = SubmissionData {
            credentials: credentials.cloned(),
        };
        fs::write(
            work_dir.join(&metadata_name),
            serde_json::to_string(&submission)?,
        )?;

        let archive_path = self.package_root.join(format!("{working_name}.zip"));
        compress_directory(&work_dir, &archive_path)?;
        fs::remove_dir_all(&work_dir)?;

        info!(path = %archive_path.display(), "package repackaged");
        Ok(archive_path)
    }
}

/// ULI (unique loan identifier): the prefix before the first `_` of the
/// first entry whose file name contains one.
fn find_uli<R: Read + std::io::Seek>(archive: &mut ZipArchive<R>) -> Result<Option<String>> {
    for index in 0..archive.len() {
        let entry = archive.by_index(index)?;
        let Some(file_name) = Path::new(entry.name()).file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if let Some(position) = file_name.find('_') {
            return Ok(Some(file_name[..position].to_string()));
        }
    }
    Ok(None)
}

/// Final path segment of the source URL, used as the archive's working name
/// when no entry carries a ULI.
fn url_file_name(source_url: &str) -> Result<String> {
    let parsed = reqwest::Url::parse(source_url)
        .map_err(|e| AdapterError::Archive(format!("bad source url {source_url}: {e}")))?;
    parsed
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .ok_or_else(|| AdapterError::Archive(format!("source url has no file name: {source_url}")))
}

fn compress_directory(dir: &Path, destination: &Path) -> Result<()> {
    let file = File::create(destination)?;
    let mut writer = ZipWriter::new(file);
    let options = SimpleFileOptions::default();

    add_directory(&mut writer, dir, dir, options)?;
    writer.finish()?;
    Ok(())
}

fn add_directory(
    writer: &mut ZipWriter<File>,
    root: &Path,
    dir: &Path,
    options: SimpleFileOptions,
) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let relative = path
            .strip_prefix(root)
            .map_err(|e| AdapterError::Archive(e.to_string()))?
            .to_string_lossy()
            .replace('\\', "/");

        if path.is_dir() {
            writer.add_directory(format!("{relative}/"), options)?;
            add_directory(writer, root, &path, options)?;
        } else {
            writer.start_file(relative, options)?;
            let mut source = File::open(&path)?;
            let mut contents = Vec::new();
            source.read_to_end(&mut contents)?;
            writer.write_all(&contents)?;
        }
    }
    Ok(())
}
