use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::{info, warn};

use crate::error::ZoneError;
use crate::output;
use crate::parser::{parse_zone, Zone};

/// Read and parse the zone file at `path`.
pub fn load(path: &Path) -> Result<Zone, ZoneError> {
    let raw = fs::read_to_string(path).map_err(|e| ZoneError::io("read", path, e))?;
    let file = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    parse_zone(&raw, &file)
}

/// Sibling temp path `<original>.tmp`, same directory so the final rename
/// stays on one filesystem.
fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

/// Backup path `<original>.<YYYY-MM-DD_HH-MM-SS>`, one-second resolution.
fn backup_path(path: &Path) -> PathBuf {
    let stamp = Local::now().format("%Y-%m-%d_%H-%M-%S");
    let mut name = path.as_os_str().to_owned();
    name.push(format!(".{stamp}"));
    PathBuf::from(name)
}

/// Persist the zone back to `path`: bump the serial iff the zone was
/// modified, render, write a sibling temp file, back up the original,
/// then atomically rename the temp file over the original.
///
/// An unmodified zone is still re-rendered and replaced (without a serial
/// bump), so the backup and replace protocol is exercised on every save.
/// On any failure before the final rename the original file is untouched;
/// the temp file and backup are left behind for recovery.
pub fn save(zone: &mut Zone, path: &Path) -> Result<(), ZoneError> {
    if zone.modified {
        zone.soa.increment_serial();
        info!(
            "{}: content changed, serial bumped to {}",
            zone.file, zone.soa.serial
        );
    }
    let text = output::render(zone);

    let tmp = temp_path(path);
    if tmp.exists() {
        warn!("{}: stale temp file from a previous run, overwriting", tmp.display());
    }
    fs::write(&tmp, &text).map_err(|e| ZoneError::io("write", &tmp, e))?;

    if path.exists() {
        let backup = backup_path(path);
        fs::copy(path, &backup).map_err(|e| ZoneError::io("copy", &backup, e))?;
        info!("{}: backed up to {}", zone.file, backup.display());

        // The rename below replaces the file's metadata too, so carry the
        // original permission bits over onto the temp file first.
        let perms = fs::metadata(path)
            .map_err(|e| ZoneError::io("stat", path, e))?
            .permissions();
        fs::set_permissions(&tmp, perms).map_err(|e| ZoneError::io("chmod", &tmp, e))?;
    }

    fs::rename(&tmp, path).map_err(|e| ZoneError::io("rename", &tmp, e))?;
    info!("{}: saved", zone.file);
    Ok(())
}
