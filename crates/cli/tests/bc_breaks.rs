use std::fs;
use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use serde_json::{json, Value};
use tempfile::tempdir;

use code_insight::commands::{init_command, sync_command};
use insight_core::db::{ClassKind, Scope, PROJECT_CONFIG_FILE};
use insight_core::sync::{
    DumpClass, DumpConstant, DumpFile, DumpFunction, DumpMethod, ReflectionDump,
};

fn source_dump() -> ReflectionDump {
    ReflectionDump::new().with_file(
        DumpFile::new("app.php", 500)
            .with_class(
                DumpClass::new("Order", ClassKind::Class)
                    .with_method(DumpMethod::new("cancel", Scope::Public))
                    .with_method(DumpMethod::new("total", Scope::Public)),
            )
            .with_class(DumpClass::new("Legacy", ClassKind::Class))
            .with_function(DumpFunction::new("getcurdate"))
            .with_constant(DumpConstant::new("KG_DEBUG", "1")),
    )
}

fn target_dump() -> ReflectionDump {
    ReflectionDump::new().with_file(
        DumpFile::new("app.php", 400).with_class(
            DumpClass::new("Order", ClassKind::Class)
                .with_method(DumpMethod::new("total", Scope::Protected)),
        ),
    )
}

/// Init a project at `root` and sync `dump` into its knowledge base.
fn prepare(work: &Path, root: &Path, dump: &ReflectionDump) {
    let root_str = root.to_string_lossy().to_string();
    init_command(Some(work), &root_str).expect("init project");
    fs::write(
        root.join("reflection.json"),
        serde_json::to_string_pretty(dump).expect("serialize dump"),
    )
    .expect("write dump");
    sync_command(Some(work), &root_str, None, None).expect("sync project");
}

fn bc_stdout(work: &Path, source: &Path, target: &Path, extra: &[&str]) -> String {
    let mut cmd = cargo_bin_cmd!("code-insight");
    cmd.arg("bc")
        .arg(source)
        .arg(target)
        .arg("--working-dir")
        .arg(work);
    for arg in extra {
        cmd.arg(arg);
    }
    let output = cmd.assert().success().get_output().stdout.clone();
    String::from_utf8(output).expect("utf8 stdout")
}

#[test]
fn text_report_lists_detected_breaks_and_exits_zero() {
    let work = tempdir().expect("working dir");
    let source = tempdir().expect("source dir");
    let target = tempdir().expect("target dir");
    prepare(work.path(), source.path(), &source_dump());
    prepare(work.path(), target.path(), &target_dump());

    let stdout = bc_stdout(work.path(), source.path(), target.path(), &[]);
    assert!(stdout.contains("Backward compatibility breaks:"), "unexpected output: {stdout}");
    assert!(stdout.contains(" * Order::cancel"), "unexpected output: {stdout}");
    assert!(stdout.contains("   OLD: public"), "unexpected output: {stdout}");
    assert!(stdout.contains("   NEW: protected"), "unexpected output: {stdout}");
    assert!(stdout.contains("=== Class Deleted (1) ==="), "unexpected output: {stdout}");
}

#[test]
fn json_report_is_machine_readable() {
    let work = tempdir().expect("working dir");
    let source = tempdir().expect("source dir");
    let target = tempdir().expect("target dir");
    prepare(work.path(), source.path(), &source_dump());
    prepare(work.path(), target.path(), &target_dump());

    let stdout =
        bc_stdout(work.path(), source.path(), target.path(), &["--format", "json"]);
    let incidents: Vec<Value> = serde_json::from_str(&stdout).expect("parse json report");
    let types: Vec<&str> =
        incidents.iter().map(|incident| incident["type"].as_str().expect("type")).collect();
    assert_eq!(
        types,
        [
            "method.deleted",
            "method.scope_reduced",
            "class.deleted",
            "function.deleted",
            "constant.deleted",
        ]
    );
    assert_eq!(incidents[1]["element"], "Order::total");
    assert_eq!(incidents[1]["old"], "public");
    assert_eq!(incidents[1]["new"], "protected");
    // Removals carry no old/new at all.
    assert!(incidents[0].get("old").is_none());
}

#[test]
fn html_report_renders_a_page() {
    let work = tempdir().expect("working dir");
    let source = tempdir().expect("source dir");
    let target = tempdir().expect("target dir");
    prepare(work.path(), source.path(), &source_dump());
    prepare(work.path(), target.path(), &target_dump());

    let stdout =
        bc_stdout(work.path(), source.path(), target.path(), &["--format", "html"]);
    assert!(stdout.starts_with("<html>"), "unexpected output: {stdout}");
    assert!(stdout.contains("<h2>Method Deleted (1)</h2>"), "unexpected output: {stdout}");
    assert!(stdout.contains("</html>"), "unexpected output: {stdout}");
}

#[test]
fn ignore_rules_from_config_and_file_compose() {
    let work = tempdir().expect("working dir");
    let source = tempdir().expect("source dir");
    let target = tempdir().expect("target dir");
    prepare(work.path(), source.path(), &source_dump());
    prepare(work.path(), target.path(), &target_dump());

    // The target project's config waives the known Legacy removal.
    let config_path = target.path().join(PROJECT_CONFIG_FILE);
    let mut config: Value =
        serde_json::from_str(&fs::read_to_string(&config_path).expect("read config"))
            .expect("parse config");
    config["bc_ignore"] = json!([{ "type": "class.deleted", "element": "Legacy" }]);
    fs::write(&config_path, serde_json::to_string_pretty(&config).expect("serialize"))
        .expect("write config");

    // An extra rules file waives method removals for this one run.
    let rules_path = target.path().join("ignore.yaml");
    fs::write(&rules_path, "- type: method.deleted\n").expect("write rules");

    let stdout = bc_stdout(
        work.path(),
        source.path(),
        target.path(),
        &["--format", "json", "--ignore-file", rules_path.to_str().expect("utf8 path")],
    );
    let incidents: Vec<Value> = serde_json::from_str(&stdout).expect("parse json report");
    let types: Vec<&str> =
        incidents.iter().map(|incident| incident["type"].as_str().expect("type")).collect();
    assert_eq!(types, ["method.scope_reduced", "function.deleted", "constant.deleted"]);
}

#[test]
fn identical_projects_report_no_breaks() {
    let work = tempdir().expect("working dir");
    let source = tempdir().expect("source dir");
    let target = tempdir().expect("target dir");
    prepare(work.path(), source.path(), &source_dump());
    prepare(work.path(), target.path(), &source_dump());

    let stdout = bc_stdout(work.path(), source.path(), target.path(), &[]);
    assert!(
        stdout.contains("No backwards compatibility breaks detected."),
        "unexpected output: {stdout}"
    );
}

#[test]
fn forked_snapshots_can_be_compared() {
    let work = tempdir().expect("working dir");
    let project = tempdir().expect("project dir");
    prepare(work.path(), project.path(), &source_dump());

    // Fork the synced base, then move the main base forward to the target
    // state; the fork still holds the old snapshot.
    let root_str = project.path().to_string_lossy().to_string();
    sync_command(Some(work.path()), &root_str, Some("5.2.x"), None).expect("sync fork");
    fs::write(
        project.path().join("reflection.json"),
        serde_json::to_string_pretty(&target_dump()).expect("serialize dump"),
    )
    .expect("write dump");
    sync_command(Some(work.path()), &root_str, None, None).expect("sync main");

    let stdout = bc_stdout(
        work.path(),
        project.path(),
        project.path(),
        &["--source-fork", "5.2.x", "--format", "json"],
    );
    let incidents: Vec<Value> = serde_json::from_str(&stdout).expect("parse json report");
    assert!(!incidents.is_empty());
    assert_eq!(incidents[0]["type"], "method.deleted");
}
