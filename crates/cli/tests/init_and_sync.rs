use std::fs;
use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use serde_json::Value;
use tempfile::tempdir;

use insight_core::db::{ClassKind, DatabaseLayout, KnowledgeBaseDb, Scope, PROJECT_CONFIG_FILE};
use insight_core::sync::{
    DumpClass, DumpConstant, DumpFile, DumpFunction, DumpMethod, ReflectionDump,
};

fn sample_dump() -> ReflectionDump {
    ReflectionDump::new()
        .with_file(
            DumpFile::new("core/kBase.php", 300).with_class(
                DumpClass::new("kBase", ClassKind::Class)
                    .with_method(DumpMethod::new("Application", Scope::Public)),
            ),
        )
        .with_file(
            DumpFile::new("units/helpers.php", 120)
                .with_function(DumpFunction::new("getcurdate"))
                .with_constant(DumpConstant::new("KG_DEBUG", "1")),
        )
}

fn write_dump(path: &Path, dump: &ReflectionDump) {
    fs::write(path, serde_json::to_string_pretty(dump).expect("serialize dump"))
        .expect("write dump");
}

#[test]
fn init_writes_a_starter_config_and_refuses_to_overwrite() {
    let work = tempdir().expect("working dir");
    let project = tempdir().expect("project dir");

    cargo_bin_cmd!("code-insight")
        .arg("init")
        .arg(project.path())
        .arg("--working-dir")
        .arg(work.path())
        .assert()
        .success();

    let config_path = project.path().join(PROJECT_CONFIG_FILE);
    let config: Value = serde_json::from_str(&fs::read_to_string(&config_path).expect("read"))
        .expect("parse config");
    assert_eq!(config["config_version"], "1.0");
    assert_eq!(config["reflection_dump"], "reflection.json");
    assert_eq!(
        config["bc_checkers"],
        serde_json::json!(["class", "function", "constant"])
    );

    // A second init must not clobber a config the user may have edited.
    cargo_bin_cmd!("code-insight")
        .arg("init")
        .arg(project.path())
        .arg("--working-dir")
        .arg(work.path())
        .assert()
        .failure();
}

#[test]
fn sync_loads_the_reflection_dump_into_the_knowledge_base() {
    let work = tempdir().expect("working dir");
    let project = tempdir().expect("project dir");

    cargo_bin_cmd!("code-insight")
        .arg("init")
        .arg(project.path())
        .arg("--working-dir")
        .arg(work.path())
        .assert()
        .success();
    write_dump(&project.path().join("reflection.json"), &sample_dump());

    let output = cargo_bin_cmd!("code-insight")
        .arg("sync")
        .arg(project.path())
        .arg("--working-dir")
        .arg(work.path())
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let stdout = String::from_utf8(output).expect("utf8 stdout");
    assert!(stdout.contains("Synchronized"), "unexpected output: {stdout}");
    assert!(stdout.contains("Files seen:     2"), "unexpected output: {stdout}");

    // Open the knowledge base directly and verify what sync stored.
    let root = project.path().canonicalize().expect("canonicalize root");
    let layout = DatabaseLayout::new(work.path(), &root);
    let db = KnowledgeBaseDb::open(&layout.db_path).expect("open knowledge base");
    let classes = db.list_classes().expect("list classes");
    assert_eq!(classes.len(), 1);
    assert_eq!(classes[0].name, "kBase");
    assert_eq!(db.list_functions().expect("list functions").len(), 1);
    assert_eq!(db.constant_names().expect("constant names"), ["KG_DEBUG"]);
}

#[test]
fn sync_accepts_an_explicit_dump_path() {
    let work = tempdir().expect("working dir");
    let project = tempdir().expect("project dir");
    let elsewhere = tempdir().expect("dump dir");

    cargo_bin_cmd!("code-insight")
        .arg("init")
        .arg(project.path())
        .arg("--working-dir")
        .arg(work.path())
        .assert()
        .success();

    let dump_path = elsewhere.path().join("exported.json");
    write_dump(&dump_path, &sample_dump());

    cargo_bin_cmd!("code-insight")
        .arg("sync")
        .arg(project.path())
        .arg("--working-dir")
        .arg(work.path())
        .arg("--dump")
        .arg(&dump_path)
        .assert()
        .success();
}

#[test]
fn sync_without_a_project_config_fails() {
    let work = tempdir().expect("working dir");
    let project = tempdir().expect("project dir");

    cargo_bin_cmd!("code-insight")
        .arg("sync")
        .arg(project.path())
        .arg("--working-dir")
        .arg(work.path())
        .assert()
        .failure();
}

#[test]
fn forked_syncs_diverge_from_the_main_base() {
    let work = tempdir().expect("working dir");
    let project = tempdir().expect("project dir");

    cargo_bin_cmd!("code-insight")
        .arg("init")
        .arg(project.path())
        .arg("--working-dir")
        .arg(work.path())
        .assert()
        .success();
    write_dump(&project.path().join("reflection.json"), &sample_dump());
    cargo_bin_cmd!("code-insight")
        .arg("sync")
        .arg(project.path())
        .arg("--working-dir")
        .arg(work.path())
        .assert()
        .success();

    // Re-sync into a fork with one extra file.
    let extended = sample_dump().with_file(
        DumpFile::new("extra.php", 50).with_class(DumpClass::new("Extra", ClassKind::Class)),
    );
    write_dump(&project.path().join("reflection.json"), &extended);
    cargo_bin_cmd!("code-insight")
        .arg("sync")
        .arg(project.path())
        .arg("--working-dir")
        .arg(work.path())
        .arg("--fork")
        .arg("dev")
        .assert()
        .success();

    let root = project.path().canonicalize().expect("canonicalize root");
    let layout = DatabaseLayout::new(work.path(), &root);
    let main = KnowledgeBaseDb::open(&layout.db_path).expect("open main");
    let fork = KnowledgeBaseDb::open(&layout.fork_db_path("dev")).expect("open fork");
    assert_eq!(main.list_classes().expect("main classes").len(), 1);
    assert_eq!(fork.list_classes().expect("fork classes").len(), 2);

    let output = cargo_bin_cmd!("code-insight")
        .arg("forks")
        .arg(project.path())
        .arg("--working-dir")
        .arg(work.path())
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let stdout = String::from_utf8(output).expect("utf8 stdout");
    assert!(stdout.contains("Forks (1):"), "unexpected output: {stdout}");
    assert!(stdout.contains("  - dev"), "unexpected output: {stdout}");
}

#[test]
fn forks_reports_none_for_a_fresh_project() {
    let work = tempdir().expect("working dir");
    let project = tempdir().expect("project dir");

    let output = cargo_bin_cmd!("code-insight")
        .arg("forks")
        .arg(project.path())
        .arg("--working-dir")
        .arg(work.path())
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let stdout = String::from_utf8(output).expect("utf8 stdout");
    assert!(stdout.contains("Forks (0):"), "unexpected output: {stdout}");
    assert!(stdout.contains("(none)"), "unexpected output: {stdout}");
}
