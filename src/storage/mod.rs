//! Crash-safe snapshot persistence with a rotating backup chain.
//!
//! [`SnapshotStore::save`] writes the new snapshot to `<path>.tmp`, fsyncs it,
//! rotates the backup chain, renames the temp file over the primary and syncs
//! the directory. A process killed at any point leaves either the old or the
//! new primary intact.
//!
//! Backup slots, newest first: `<path>.bak`, `<path>.bak1`, `<path>.bak2`,
//! `<path>.bak3`. [`SnapshotStore::load`] walks primary then backups until one
//! parses.

pub mod health;
pub mod schema;

use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::error::{MemoryError, MemoryResult};
use schema::Snapshot;

/// Most backup slots a store will keep.
pub const MAX_BACKUPS: usize = 4;

/// Where a loaded snapshot came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotSlot {
    Primary,
    /// Backup slot, 0 being the newest (`.bak`).
    Backup(usize),
}

impl std::fmt::Display for SnapshotSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Primary => f.write_str("primary"),
            Self::Backup(0) => f.write_str(".bak"),
            Self::Backup(n) => write!(f, ".bak{n}"),
        }
    }
}

/// A snapshot plus the slot it was read from.
#[derive(Debug, Clone)]
pub struct LoadedSnapshot {
    pub snapshot: Snapshot,
    pub slot: SnapshotSlot,
}

/// Owns the primary snapshot path and its backup chain.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
    backup_count: usize,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>, backup_count: usize) -> MemoryResult<Self> {
        if backup_count > MAX_BACKUPS {
            return Err(MemoryError::InvalidConfig(format!(
                "backup_count must be at most {MAX_BACKUPS}, got {backup_count}"
            )));
        }
        Ok(Self {
            path: path.into(),
            backup_count,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn backup_count(&self) -> usize {
        self.backup_count
    }

    /// Path of a slot. Backup slot 0 is `<path>.bak`, slot n is `<path>.bak{n}`.
    pub fn slot_path(&self, slot: SnapshotSlot) -> PathBuf {
        match slot {
            SnapshotSlot::Primary => self.path.clone(),
            SnapshotSlot::Backup(0) => with_suffix(&self.path, ".bak"),
            SnapshotSlot::Backup(n) => with_suffix(&self.path, &format!(".bak{n}")),
        }
    }

    /// Path the next snapshot is staged at before the atomic rename.
    pub fn temp_path(&self) -> PathBuf {
        with_suffix(&self.path, ".tmp")
    }

    /// Primary first, then backups newest to oldest.
    pub fn slots(&self) -> impl Iterator<Item = SnapshotSlot> {
        std::iter::once(SnapshotSlot::Primary).chain((0..self.backup_count).map(SnapshotSlot::Backup))
    }

    /// True if the primary or any backup exists on disk.
    pub fn has_snapshot(&self) -> bool {
        self.slots().any(|slot| self.slot_path(slot).exists())
    }

    /// Write `snapshot` as the new primary, rotating the previous primary into
    /// the backup chain.
    pub fn save(&self, snapshot: &Snapshot) -> MemoryResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| MemoryError::persistence(parent, e))?;
        }

        let bytes = serde_json::to_vec_pretty(snapshot)
            .map_err(|e| MemoryError::persistence(&self.path, e))?;

        // 1. Stage the full document next to the primary.
        let tmp_path = self.temp_path();
        write_synced(&tmp_path, &bytes).map_err(|e| MemoryError::persistence(&tmp_path, e))?;

        // 2. Rotate only once the new snapshot is safely on disk.
        self.rotate_backups()?;

        // 3. Atomic replace.
        fs::rename(&tmp_path, &self.path).map_err(|e| MemoryError::persistence(&self.path, e))?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            sync_dir(parent).map_err(|e| MemoryError::persistence(parent, e))?;
        }

        tracing::debug!(
            path = %self.path.display(),
            banks = snapshot.banks.len(),
            samples = snapshot.sample_count(),
            bytes = bytes.len(),
            "snapshot saved"
        );
        Ok(())
    }

    /// Shift each backup one slot older (dropping the oldest) and copy the
    /// current primary into slot 0. No-op when there is no primary yet, and when
    /// the primary is unreadable: a corrupt file must not push a good backup
    /// down the chain.
    fn rotate_backups(&self) -> MemoryResult<()> {
        if self.backup_count == 0 {
            return Ok(());
        }
        match read_snapshot(&self.path) {
            Ok(Some(_)) => {}
            Ok(None) => return Ok(()),
            Err(reason) => {
                tracing::warn!(
                    path = %self.path.display(),
                    %reason,
                    "primary snapshot unreadable, replacing it without rotation"
                );
                return Ok(());
            }
        }

        for slot in (1..self.backup_count).rev() {
            let older = self.slot_path(SnapshotSlot::Backup(slot));
            let newer = self.slot_path(SnapshotSlot::Backup(slot - 1));
            if !newer.exists() {
                continue;
            }
            remove_if_exists(&older).map_err(|e| MemoryError::persistence(&older, e))?;
            fs::rename(&newer, &older).map_err(|e| MemoryError::persistence(&older, e))?;
        }

        let newest = self.slot_path(SnapshotSlot::Backup(0));
        // Copy, not rename: the primary must stay in place until the final rename.
        fs::copy(&self.path, &newest).map_err(|e| MemoryError::persistence(&newest, e))?;
        tracing::debug!(backup = %newest.display(), "rotated backups");
        Ok(())
    }

    /// Read the newest readable snapshot: primary, then `.bak`, then older slots.
    pub fn load(&self) -> MemoryResult<LoadedSnapshot> {
        let (snapshot, slot) = self.load_with(|snapshot| Ok(snapshot))?;
        Ok(LoadedSnapshot { snapshot, slot })
    }

    /// Like [`load`](Self::load), but a slot only counts as loaded once `accept`
    /// turns its snapshot into a `T`. A rejected slot is skipped like a corrupt one.
    pub fn load_with<T>(
        &self,
        mut accept: impl FnMut(Snapshot) -> Result<T, String>,
    ) -> MemoryResult<(T, SnapshotSlot)> {
        for slot in self.slots() {
            let path = self.slot_path(slot);
            let accepted = match read_snapshot(&path) {
                Ok(Some(snapshot)) => accept(snapshot),
                Ok(None) => {
                    tracing::debug!(path = %path.display(), "snapshot slot missing");
                    continue;
                }
                Err(reason) => Err(reason),
            };

            match accepted {
                Ok(value) => {
                    if slot == SnapshotSlot::Primary {
                        tracing::info!(path = %path.display(), "snapshot loaded");
                    } else {
                        tracing::warn!(
                            path = %path.display(),
                            slot = %slot,
                            "primary snapshot unusable, recovered from backup"
                        );
                    }
                    return Ok((value, slot));
                }
                Err(reason) => {
                    tracing::warn!(path = %path.display(), %reason, "snapshot slot unreadable");
                }
            }
        }

        Err(MemoryError::NoRecoverableState {
            path: self.path.clone(),
            backups: self.backup_count,
        })
    }
}

/// `Ok(None)` if the file does not exist, `Err(reason)` if it cannot be read or parsed.
pub(crate) fn read_snapshot(path: &Path) -> Result<Option<Snapshot>, String> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(format!("read error: {e}")),
    };
    Snapshot::from_json(&contents).map(Some)
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut os = path.as_os_str().to_owned();
    os.push(suffix);
    PathBuf::from(os)
}

fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.flush()?;
    file.sync_all()
}

/// Persist a rename by syncing the directory entry. Directories cannot be
/// opened for syncing on Windows; there the rename is left to the filesystem.
#[cfg(unix)]
fn sync_dir(dir: &Path) -> std::io::Result<()> {
    File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> std::io::Result<()> {
    Ok(())
}

fn remove_if_exists(path: &Path) -> std::io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() != ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}
