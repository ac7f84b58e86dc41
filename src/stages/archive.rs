//! Project archive
//!
//! Packs `build/<name>/` into `build/<name>-<version>.zip`, with every entry
//! under a top-level `<name>/` folder.

use std::fs::{self, File};
use std::io;
use std::path::Path;

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::pipeline::{Archiver, StageError};
use crate::storage::files::{self, FsError};
use crate::storage::ProjectConfig;

pub struct ArchiveStage<'a> {
    config: &'a ProjectConfig,
}

impl<'a> ArchiveStage<'a> {
    pub fn new(config: &'a ProjectConfig) -> Self {
        Self { config }
    }
}

impl Archiver for ArchiveStage<'_> {
    fn zip_project(&mut self) -> Result<(), StageError> {
        let source = &self.config.build_path;
        if !source.is_dir() {
            return Err(StageError::MissingOutput(source.clone()));
        }

        let archive = self.config.archive_path();
        files::ensure_within(&self.config.output_root(), &archive)?;
        files::remove_file(&archive)?;

        // Written beside the archive and renamed once complete
        let partial = archive.with_extension("zip.part");
        if let Err(e) = write_archive(&partial, source, &self.config.name, &archive) {
            let _ = fs::remove_file(&partial);
            return Err(e);
        }

        fs::rename(&partial, &archive).map_err(|source| FsError::FileWrite {
            path: archive.clone(),
            source,
        })?;
        Ok(())
    }
}

fn write_archive(
    partial: &Path,
    source: &Path,
    name: &str,
    archive: &Path,
) -> Result<(), StageError> {
    let file = File::create(partial).map_err(|source| FsError::FileWrite {
        path: archive.to_path_buf(),
        source,
    })?;

    let mut writer = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    add_folder(&mut writer, source, name, options, archive)?;
    writer.finish().map_err(|e| StageError::Archive {
        path: archive.to_path_buf(),
        message: e.to_string(),
    })?;
    Ok(())
}

fn add_folder(
    writer: &mut ZipWriter<File>,
    dir: &Path,
    prefix: &str,
    options: SimpleFileOptions,
    archive: &Path,
) -> Result<(), StageError> {
    let archive_failed = |message: String| StageError::Archive {
        path: archive.to_path_buf(),
        message,
    };

    writer
        .add_directory(format!("{}/", prefix), options)
        .map_err(|e| archive_failed(e.to_string()))?;

    for path in files::read_dir_sorted(dir, archive)? {
        let Some(name) = path.file_name() else {
            continue;
        };
        let entry = format!("{}/{}", prefix, name.to_string_lossy());

        if path.is_dir() {
            add_folder(writer, &path, &entry, options, archive)?;
        } else {
            writer
                .start_file(entry, options)
                .map_err(|e| archive_failed(e.to_string()))?;

            let mut input = File::open(&path).map_err(|source| FsError::FileRead {
                path: path.clone(),
                source,
            })?;
            io::copy(&mut input, writer).map_err(|e| archive_failed(e.to_string()))?;
        }
    }

    Ok(())
}
