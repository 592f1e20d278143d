use crate::error::{Diagnostics, SymFsError, Warning};
use crate::grouping::FIELD_SEPARATOR;
use crate::mapping::Mapping;
use ahash::AHashSet;
use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// What a materialization did (or, in dry-run mode, would have done).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaterializeReport {
    pub created_dirs: usize,
    pub created_links: usize,
    /// Links that already pointed at their item and were left alone.
    pub unchanged_links: usize,
    /// Targets occupied by something other than the expected link.
    pub conflicts: usize,
}

impl MaterializeReport {
    /// Number of filesystem entries created.
    pub fn mutations(&self) -> usize {
        self.created_dirs + self.created_links
    }
}

/// Writes a [`Mapping`] out as `<root>/<group>/<key>/<item name>` symlinks.
///
/// Existing entries are never overwritten or traversed through, which makes
/// repeated runs over the same mapping safe. In dry-run mode nothing is
/// touched on disk, but the report and the log output are the same as for
/// a real run.
#[derive(Debug, Clone)]
pub struct TreeMaterializer {
    root: PathBuf,
    dry_run: bool,
}

impl TreeMaterializer {
    pub fn new(root: impl Into<PathBuf>, dry_run: bool) -> Self {
        Self {
            root: root.into(),
            dry_run,
        }
    }

    pub fn materialize(
        &self,
        mapping: &Mapping,
        diagnostics: &mut Diagnostics,
    ) -> Result<MaterializeReport, SymFsError> {
        let mut pass = Pass {
            dry_run: self.dry_run,
            report: MaterializeReport::default(),
            planned_dirs: AHashSet::new(),
            planned_links: AHashSet::new(),
            diagnostics,
        };

        if !self.root.exists() {
            pass.create_dir(&self.root, true)?;
            log::info!("Created path {}.", self.root.display());
        }

        for (group_name, group) in mapping {
            let group_dir = match pass.ensure_dirs(&self.root, path_parts(group_name))? {
                Ok(group_dir) => group_dir,
                Err(blocked) => {
                    for items in group.values() {
                        pass.conflict_all(&blocked, items);
                    }
                    continue;
                }
            };

            for (group_key, items) in group {
                match pass.ensure_dirs(&group_dir, path_parts(group_key))? {
                    Ok(key_dir) => {
                        for item in items {
                            pass.link_item(&key_dir, item)?;
                        }
                    }
                    Err(blocked) => pass.conflict_all(&blocked, items),
                }
            }
        }

        Ok(pass.report)
    }
}

/// State of one materialization. Entries created during the pass are
/// remembered so a dry run sees the tree it would have built.
struct Pass<'a> {
    dry_run: bool,
    report: MaterializeReport,
    planned_dirs: AHashSet<PathBuf>,
    planned_links: AHashSet<PathBuf>,
    diagnostics: &'a mut Diagnostics,
}

impl Pass<'_> {
    /// Walks `parts` down from `root`, creating missing directories one
    /// level at a time. Returns the innermost directory, or `Err` with the
    /// first entry on the way that is not a real directory.
    fn ensure_dirs<'p>(
        &mut self,
        root: &Path,
        parts: impl Iterator<Item = &'p str>,
    ) -> Result<Result<PathBuf, PathBuf>, SymFsError> {
        let mut dir = root.to_path_buf();
        for part in parts {
            dir.push(part);
            if self.planned_dirs.contains(&dir) {
                continue;
            }
            if self.planned_links.contains(&dir) {
                return Ok(Err(dir));
            }
            match fs::symlink_metadata(&dir) {
                // Not followed: a symlink here is never a directory.
                Ok(metadata) if metadata.is_dir() => {}
                Ok(_) => return Ok(Err(dir)),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    self.create_dir(&dir, false)?;
                    log::debug!("Created directory {}", dir.display());
                }
                Err(e) => return Err(SymFsError::io(&dir, e)),
            }
        }
        Ok(Ok(dir))
    }

    fn link_item(&mut self, key_dir: &Path, item: &Path) -> Result<(), SymFsError> {
        let Some(name) = item.file_name() else {
            self.conflict(key_dir.to_path_buf(), item);
            return Ok(());
        };
        let target = key_dir.join(name);
        let source = resolve(item).map_err(|e| SymFsError::io(item, e))?;

        if self.planned_links.contains(&target) || self.planned_dirs.contains(&target) {
            self.conflict(target, item);
            return Ok(());
        }
        if fs::symlink_metadata(&target).is_ok() {
            if fs::read_link(&target).is_ok_and(|existing| existing == source) {
                log::debug!("{} -> {} is up to date", target.display(), source.display());
                self.report.unchanged_links += 1;
            } else {
                self.conflict(target, item);
            }
            return Ok(());
        }

        if !self.dry_run {
            symlink(&source, &target).map_err(|e| SymFsError::io(&target, e))?;
        }
        log::info!("{} -> {}", target.display(), source.display());
        self.planned_links.insert(target);
        self.report.created_links += 1;
        Ok(())
    }

    fn conflict(&mut self, target: PathBuf, item: &Path) {
        self.diagnostics.warn(Warning::LinkConflict {
            target,
            item: item.to_path_buf(),
        });
        self.report.conflicts += 1;
    }

    fn conflict_all(&mut self, blocked: &Path, items: &BTreeSet<PathBuf>) {
        for item in items {
            self.conflict(blocked.to_path_buf(), item);
        }
    }

    fn create_dir(&mut self, dir: &Path, recursive: bool) -> Result<(), SymFsError> {
        if !self.dry_run {
            let created = if recursive {
                fs::create_dir_all(dir)
            } else {
                fs::create_dir(dir)
            };
            created.map_err(|e| SymFsError::io(dir, e))?;
        }
        self.planned_dirs.insert(dir.to_path_buf());
        self.report.created_dirs += 1;
        Ok(())
    }
}

/// The `/`-separated parts of a group name or key. Empty, `.` and `..`
/// parts are dropped so nothing lands outside the output root.
fn path_parts(name: &str) -> impl Iterator<Item = &str> {
    name.split(FIELD_SEPARATOR)
        .filter(|part| !matches!(*part, "" | "." | ".."))
}

/// The absolute path a link to `item` should point at.
fn resolve(item: &Path) -> io::Result<PathBuf> {
    fs::canonicalize(item).or_else(|_| std::path::absolute(item))
}

#[cfg(unix)]
fn symlink(source: &Path, target: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(source, target)
}

#[cfg(windows)]
fn symlink(source: &Path, target: &Path) -> io::Result<()> {
    if source.is_dir() {
        std::os::windows::fs::symlink_dir(source, target)
    } else {
        std::os::windows::fs::symlink_file(source, target)
    }
}
