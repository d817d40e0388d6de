use std::path::{Component, Path, PathBuf};

/// Config file looked up when the project path is a directory.
pub const TSCONFIG_FILE_NAME: &str = "tsconfig.json";

/// Find the config file for `project`.
///
/// If `project` is a directory, walk up from it looking for `tsconfig.json`.
/// Otherwise walk up from its parent looking for a file with the same name,
/// so `app/tsconfig.build.json` finds itself.
#[must_use]
pub fn find_tsconfig(project: &Path) -> Option<PathBuf> {
    let project = normalize(project);
    let (mut current, file_name) = if project.is_dir() {
        (project, std::ffi::OsString::from(TSCONFIG_FILE_NAME))
    } else {
        let file_name = project.file_name()?.to_os_string();
        let parent = project.parent()?.to_path_buf();
        (parent, file_name)
    };

    loop {
        let candidate = current.join(&file_name);
        if candidate.is_file() {
            return Some(candidate);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Lexically normalize a path: drop `.` segments and fold `..` into the parent.
///
/// Does not touch the filesystem, so symlinks are not resolved.
#[must_use]
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Join `rel` onto `base` and normalize. Absolute `rel` replaces `base`.
#[must_use]
pub fn join_normalized(base: &Path, rel: &str) -> PathBuf {
    normalize(&base.join(rel))
}

/// Compute where the declaration file for `module_path` is written.
///
/// The module's path relative to `base_path` is mirrored under `out_dir`:
/// `/app/src/a.module.css` with base `/app` and out dir `/app/generated`
/// becomes `/app/generated/src/a.module.css.d.ts`, or
/// `/app/generated/src/a.module.d.css.ts` with `arbitrary_extensions`.
#[must_use]
pub fn dts_output_path(
    module_path: &Path,
    base_path: &Path,
    out_dir: &Path,
    arbitrary_extensions: bool,
) -> PathBuf {
    let relative = module_path.strip_prefix(base_path).unwrap_or_else(|_| {
        // Outside the base: mirror everything below the root
        module_path
            .strip_prefix(Path::new("/"))
            .unwrap_or(module_path)
    });
    let output = out_dir.join(relative);

    let file_name = output
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    if arbitrary_extensions {
        let (stem, ext) = match file_name.rfind('.') {
            Some(idx) => (&file_name[..idx], &file_name[idx..]),
            None => (file_name.as_str(), ""),
        };
        output.with_file_name(format!("{stem}.d{ext}.ts"))
    } else {
        output.with_file_name(format!("{file_name}.d.ts"))
    }
}

/// Render `path` relative to `cwd` when it is inside `cwd`.
#[must_use]
pub fn display_relative(path: &Path, cwd: &Path) -> String {
    path.strip_prefix(cwd)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_find_tsconfig_walks_up() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("src").join("components");
        fs::create_dir_all(&nested).unwrap();
        fs::write(dir.path().join("tsconfig.json"), "{}").unwrap();

        let found = find_tsconfig(&nested).unwrap();
        assert_eq!(found, normalize(&dir.path().join("tsconfig.json")));
    }

    #[test]
    fn test_find_tsconfig_accepts_file_path() {
        let dir = tempdir().unwrap();
        let custom = dir.path().join("tsconfig.app.json");
        fs::write(&custom, "{}").unwrap();

        assert_eq!(find_tsconfig(&custom), Some(normalize(&custom)));
    }

    #[test]
    fn test_find_tsconfig_unknown_file_is_none() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("tsconfig.json"), "{}").unwrap();

        assert_eq!(find_tsconfig(&dir.path().join("unknown")), None);
    }

    #[test]
    fn test_normalize() {
        assert_eq!(
            normalize(Path::new("/app/src/./a/../b.module.css")),
            PathBuf::from("/app/src/b.module.css")
        );
        assert_eq!(normalize(Path::new("/app/src/")), PathBuf::from("/app/src"));
    }

    #[test]
    fn test_dts_output_path() {
        let base = Path::new("/app");
        let out = Path::new("/app/generated");
        let module = Path::new("/app/src/a.module.css");

        assert_eq!(
            dts_output_path(module, base, out, false),
            PathBuf::from("/app/generated/src/a.module.css.d.ts")
        );
        assert_eq!(
            dts_output_path(module, base, out, true),
            PathBuf::from("/app/generated/src/a.module.d.css.ts")
        );
    }

    #[test]
    fn test_display_relative() {
        assert_eq!(
            display_relative(Path::new("/app/src/a.module.css"), Path::new("/app")),
            "src/a.module.css"
        );
        assert_eq!(
            display_relative(Path::new("/other/a.module.css"), Path::new("/app")),
            "/other/a.module.css"
        );
    }
}
