//! End-to-end tests of the `pyhex` binary.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const MODELS_TEMPLATE: &str = r#"# {{ domain }} models
{% for e in entities %}
class {{ e.name }}(SQLModel, table=True):
{% for f in e.fields %}
    {{ f.name }}: {{ f.python_type }}
{% endfor %}
{% endfor %}
"#;

const ENTITIES_YAML: &str = "entities:\n  - name: Order\n    fields:\n      - name: total\n        type: float\n";

fn write(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    write(
        &tmp.path().join("templates/core/{{domain}}/models.py.j2"),
        MODELS_TEMPLATE,
    );
    write(
        &tmp.path().join("templates/repository/{{domain}}/repository.py.j2"),
        "class {{ domain }}Repository: ...\n",
    );
    write(
        &tmp.path().join("templates/interface/{{domain}}/routes.py.j2"),
        "{% for ep in endpoints %}\n{{ ep.method }} {{ ep.path }}\n{% endfor %}\n",
    );
    // Keeps the user's own config files out of the test.
    write(&tmp.path().join("pyhex.toml"), "[output]\nformat = \"plain\"\n");
    tmp
}

fn pyhex(tmp: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("pyhex").unwrap();
    cmd.current_dir(tmp.path())
        .env_remove("RUST_LOG")
        .arg("--config")
        .arg(tmp.path().join("pyhex.toml"))
        .arg("--project-root")
        .arg(tmp.path());
    cmd
}

fn add_sales(tmp: &TempDir) {
    pyhex(tmp)
        .args(["domain", "add", "Sales", "--layer", "core"])
        .assert()
        .success();
    let dir = tmp.path().join("src/core/Sales");
    write(&dir.join("domain.yaml"), "name: Sales\n");
    write(&dir.join("entities.yaml"), ENTITIES_YAML);
}

#[test]
fn help_and_version() {
    Command::cargo_bin("pyhex")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("generate-all"));

    Command::cargo_bin("pyhex")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn unknown_layer_is_a_usage_error() {
    Command::cargo_bin("pyhex")
        .unwrap()
        .args(["generate", "domain", "Sales"])
        .assert()
        .code(2);
}

#[test]
fn add_then_generate_writes_models() {
    let tmp = project();
    add_sales(&tmp);
    assert!(tmp.path().join("src/core/Sales/models.py.j2").is_file());

    pyhex(&tmp)
        .args(["generate", "core", "Sales"])
        .assert()
        .success()
        .stdout(predicate::str::contains("models.py"))
        .stdout(predicate::str::contains("1 generated"));

    let models = fs::read_to_string(tmp.path().join("src/core/Sales/models.py")).unwrap();
    assert!(models.contains("class Order(SQLModel, table=True):"));
    assert!(models.contains("    total: float\n"));

    pyhex(&tmp)
        .args(["domain", "list", "--layer", "core"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Sales"))
        .stdout(predicate::str::contains("generated"));
}

#[test]
fn missing_domain_exits_not_found() {
    let tmp = project();
    pyhex(&tmp)
        .args(["generate", "core", "Ghost"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("pyhex domain add Ghost"));
}

#[test]
fn invalid_domain_name_is_a_user_error() {
    let tmp = project();
    pyhex(&tmp)
        .args(["domain", "add", "sales-team"])
        .assert()
        .code(2);
}

#[test]
fn generation_errors_exit_one_but_keep_good_files() {
    let tmp = project();
    add_sales(&tmp);
    write(
        &tmp.path().join("src/core/Sales/broken.py.j2"),
        "{% for x in %}",
    );

    pyhex(&tmp)
        .args(["generate", "core", "Sales"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Generation finished with 1 error(s)"));
    assert!(tmp.path().join("src/core/Sales/models.py").is_file());
}

#[test]
fn generate_all_from_config_file() {
    let tmp = project();
    let file = tmp.path().join("sales.yaml");
    write(&file, &format!("domain:\n  name: Sales\n{ENTITIES_YAML}"));

    pyhex(&tmp)
        .args(["generate-all", "Sales", "--config-file"])
        .arg(&file)
        .assert()
        .success();
    assert!(tmp.path().join("src/core/Sales/models.py").is_file());
    assert!(tmp.path().join("src/repository/Sales/repository.py").is_file());
    assert!(tmp.path().join("src/interface/Sales/routes.py").is_file());

    pyhex(&tmp)
        .args(["generate-all", "Billing", "--config-file"])
        .arg(&file)
        .assert()
        .code(2);
}

#[test]
fn json_output_is_machine_readable() {
    let tmp = project();
    add_sales(&tmp);

    let out = pyhex(&tmp)
        .args(["--output-format", "json", "domain", "list", "--layer", "core"])
        .output()
        .unwrap();
    assert!(out.status.success());
    let listing: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(listing["core"][0]["name"], "Sales");
    assert_eq!(listing["core"][0]["status"], "blank");
}

#[test]
fn lint_fails_on_broken_markers() {
    let tmp = project();
    pyhex(&tmp).arg("lint").assert().success();

    write(
        &tmp.path().join("templates/core/{{domain}}/routes.py.j2"),
        "# @pyhex:begin:imports\n",
    );
    pyhex(&tmp)
        .arg("lint")
        .assert()
        .code(2)
        .stdout(predicate::str::contains("routes.py.j2"));
}

#[test]
fn sync_requires_confirmation_without_a_terminal() {
    let tmp = project();
    add_sales(&tmp);

    pyhex(&tmp).args(["sync", "core"]).assert().code(2);
    pyhex(&tmp)
        .args(["sync", "core", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Sales"));
}

#[test]
fn regenerate_runs_configured_domains() {
    let tmp = project();
    add_sales(&tmp);

    pyhex(&tmp).args(["regenerate", "core"]).assert().success();
    assert!(tmp.path().join("src/core/Sales/models.py").is_file());
}

#[test]
fn config_get_reads_layered_values() {
    let tmp = project();
    pyhex(&tmp)
        .args(["config", "get", "templates.root"])
        .assert()
        .success()
        .stdout(predicate::str::diff("templates\n"));

    pyhex(&tmp)
        .env("PYHEX__PROJECT__LAYERS_DIR", "app")
        .args(["config", "get", "project.layers_dir"])
        .assert()
        .success()
        .stdout(predicate::str::diff("app\n"));
}

#[test]
fn missing_config_file_is_a_configuration_error() {
    let tmp = TempDir::new().unwrap();
    Command::cargo_bin("pyhex")
        .unwrap()
        .current_dir(tmp.path())
        .arg("--config")
        .arg(tmp.path().join("absent.toml"))
        .args(["config", "list"])
        .assert()
        .code(4);
}

#[test]
fn init_writes_local_config_once() {
    let tmp = TempDir::new().unwrap();
    let run = || {
        Command::cargo_bin("pyhex")
            .unwrap()
            .current_dir(tmp.path())
            .arg("--project-root")
            .arg(tmp.path())
            .arg("init")
            .assert()
            .success()
    };
    run();
    let path = tmp.path().join(".pyhex.toml");
    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains("[templates]"));

    fs::write(&path, "# edited\n").unwrap();
    run();
    assert_eq!(fs::read_to_string(&path).unwrap(), "# edited\n");
}

#[test]
fn completions_use_binary_name() {
    Command::cargo_bin("pyhex")
        .unwrap()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("pyhex"));
}
