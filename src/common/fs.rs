//! Filesystem helpers shared by the deployment stage

use std::fs;
use std::io;
use std::os::unix::fs::symlink;
use std::path::Path;

#[derive(Default, Clone)]
pub struct CopyOptions {
    pub exclude: Vec<String>,
}

impl CopyOptions {
    pub fn exclude_git() -> Self {
        Self {
            exclude: vec![".git".to_string()],
        }
    }

    fn is_excluded(&self, name: &std::ffi::OsStr) -> bool {
        self.exclude
            .iter()
            .any(|excluded| name.to_str() == Some(excluded.as_str()))
    }
}

/// Merge the contents of `src` into `dst`.
///
/// Existing files in `dst` are overwritten, files only present in `dst` are
/// left alone. Symlinks are recreated rather than followed. Returns the
/// number of files and links written.
pub fn merge_dir<P1, P2>(src: P1, dst: P2, options: &CopyOptions) -> io::Result<usize>
where
    P1: AsRef<Path>,
    P2: AsRef<Path>,
{
    let src_ref = src.as_ref();
    let dst_ref = dst.as_ref();

    if !dst_ref.exists() {
        fs::create_dir_all(dst_ref)?;
    }

    let mut copied = 0;
    for entry in fs::read_dir(src_ref)? {
        let entry = entry?;
        let file_name = entry.file_name();
        if options.is_excluded(&file_name) {
            continue;
        }

        let entry_path = entry.path();
        let dst_path = dst_ref.join(&file_name);
        let file_type = entry.file_type()?;

        if file_type.is_symlink() {
            let target = fs::read_link(&entry_path)?;
            if dst_path.symlink_metadata().is_ok() {
                fs::remove_file(&dst_path)?;
            }
            symlink(target, &dst_path)?;
            copied += 1;
        } else if file_type.is_dir() {
            copied += merge_dir(&entry_path, &dst_path, options)?;
        } else {
            fs::copy(&entry_path, &dst_path)?;
            copied += 1;
        }
    }

    Ok(copied)
}
