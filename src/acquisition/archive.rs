use crate::error::{AcquisitionError, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Unpack an order archive into `dest_path`, flattening its folder layout
///
/// Orders arrive as one ZIP holding a sub-folder per granule. Every file is
/// written directly into `dest_path` under its own name; a later entry with
/// the same name replaces an earlier one.
pub fn unpack_order_archive(archive_path: &Path, dest_path: &Path) -> Result<Vec<PathBuf>> {
    debug!(?archive_path, ?dest_path, "unpacking order archive");

    let failed = |reason: String| AcquisitionError::download(reason);

    std::fs::create_dir_all(dest_path)
        .map_err(|e| failed(format!("failed to create {}: {}", dest_path.display(), e)))?;

    let file = std::fs::File::open(archive_path)
        .map_err(|e| failed(format!("failed to open order archive: {}", e)))?;

    let mut archive = zip::ZipArchive::new(file).map_err(|e| {
        failed(format!(
            "failed to read order archive {}: {}",
            archive_path.display(),
            e
        ))
    })?;

    let mut unpacked = Vec::new();

    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| failed(format!("failed to read archive entry: {}", e)))?;

        if entry.is_dir() {
            continue;
        }

        let Some(file_name) = entry
            .enclosed_name()
            .and_then(|p| p.file_name())
            .map(|n| n.to_os_string())
        else {
            warn!("skipping entry with unsafe path");
            continue;
        };

        let target = dest_path.join(file_name);
        let mut outfile = std::fs::File::create(&target)
            .map_err(|e| failed(format!("failed to create {}: {}", target.display(), e)))?;

        std::io::copy(&mut entry, &mut outfile)
            .map_err(|e| failed(format!("failed to unpack {}: {}", target.display(), e)))?;

        unpacked.push(target);
    }

    info!(
        ?archive_path,
        unpacked_count = unpacked.len(),
        "order archive unpacked"
    );

    Ok(unpacked)
}
