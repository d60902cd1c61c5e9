use std::fs;

use code_insight::canonicalize_or_current;
use code_insight::commands::resolve_layout;
use insight_core::db::DB_FILE_NAME;
use tempfile::tempdir;

// One test owns the process-wide working directory; splitting these up
// would let the harness run the chdirs concurrently.
#[test]
fn canonicalize_or_current_resolves_dot_and_relative_paths() {
    let original = std::env::current_dir().expect("cwd");
    let tmp = tempdir().expect("tempdir");
    let subdir = tmp.path().join("nested");
    fs::create_dir_all(&subdir).expect("create nested");
    std::env::set_current_dir(tmp.path()).expect("chdir tmp");

    let dot = canonicalize_or_current(".").expect("canonicalize").canonicalize().expect("canon");
    assert_eq!(dot, tmp.path().canonicalize().expect("canon tmp"));

    let relative = canonicalize_or_current("nested").expect("canonicalize nested");
    assert_eq!(relative, subdir.canonicalize().expect("canonicalize subdir"));

    // A path that does not exist yet still becomes absolute.
    let missing = canonicalize_or_current("not-there-yet").expect("canonicalize missing");
    assert!(missing.is_absolute());
    assert!(missing.ends_with("not-there-yet"));

    std::env::set_current_dir(original).expect("restore cwd");
}

#[test]
fn resolve_layout_honors_an_explicit_working_dir() {
    let work = tempdir().expect("working dir");
    let project = tempdir().expect("project dir");
    let root = project.path().to_string_lossy().to_string();

    let layout = resolve_layout(Some(work.path()), &root).expect("resolve layout");
    assert!(layout.db_path.starts_with(work.path()));
    assert!(layout.db_path.ends_with(DB_FILE_NAME));
}

#[test]
fn resolve_layout_is_stable_across_spellings_of_one_root() {
    let work = tempdir().expect("working dir");
    let project = tempdir().expect("project dir");
    let subdir = project.path().join("app");
    fs::create_dir_all(&subdir).expect("create app");

    let plain = subdir.to_string_lossy().to_string();
    let dotted = format!("{}/./app", project.path().to_string_lossy());

    let a = resolve_layout(Some(work.path()), &plain).expect("resolve plain");
    let b = resolve_layout(Some(work.path()), &dotted).expect("resolve dotted");
    assert_eq!(a.db_path, b.db_path);
}
