use std::borrow::Cow;
use std::path::{Component, Path, PathBuf};

use path_slash::PathExt;

/// `./x`, `../x`, `.` and `..`; everything else is a package or absolute id.
pub(crate) fn is_relative_specifier(specifier: &str) -> bool {
    specifier == "."
        || specifier == ".."
        || specifier.starts_with("./")
        || specifier.starts_with("../")
}

/// Turns a barrel-relative `source` into a specifier that resolves to the same
/// file when written into a module living in `importer_dir`.
///
/// Bare specifiers and maps without a known entry file pass through. When no
/// relative path exists between the two directories the absolute target path
/// is used.
pub(crate) fn rebase_source<'a>(
    source: &'a str,
    entry_path: Option<&Path>,
    importer_dir: Option<&Path>,
) -> Cow<'a, str> {
    if !is_relative_specifier(source) {
        return Cow::Borrowed(source);
    }
    let Some(entry_dir) = entry_path.and_then(Path::parent) else {
        return Cow::Borrowed(source);
    };
    let target = normalize_lexically(&entry_dir.join(source));
    let relative = importer_dir
        .filter(|dir| dir.is_absolute() == target.is_absolute())
        .and_then(|dir| pathdiff::diff_paths(&target, dir));
    let Some(relative) = relative else {
        return Cow::Owned(target.to_slash_lossy().into_owned());
    };
    let relative = relative.to_slash_lossy();
    if relative.is_empty() {
        Cow::Borrowed(".")
    } else if relative.starts_with("../") || relative == ".." {
        Cow::Owned(relative.into_owned())
    } else {
        Cow::Owned(format!("./{relative}"))
    }
}

fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !matches!(out.components().next_back(), Some(Component::Normal(_))) {
                    out.push(component.as_os_str());
                } else {
                    out.pop();
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
