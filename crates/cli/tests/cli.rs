use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn manager(site: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("annalist-manager").unwrap();
    cmd.env_remove("ANNALIST_CONFIG")
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1")
        .current_dir(site.path())
        .arg("--base-dir")
        .arg(site.path().join("site"))
        .arg("--base-url")
        .arg("http://test.example.com/annalist/");
    cmd
}

#[test]
fn test_initialize_and_create_collection() {
    let tmp = TempDir::new().unwrap();
    manager(&tmp).arg("initialize-site").assert().success();
    assert!(tmp.path().join("site/c/_annalist_site").is_dir());

    manager(&tmp)
        .args(["create-collection", "testcoll", "--label", "Test collection"])
        .assert()
        .success()
        .stdout(predicate::str::contains("testcoll"));
    assert!(
        tmp.path()
            .join("site/c/testcoll/_annalist_collection/coll_context.jsonld")
            .is_file()
    );

    manager(&tmp)
        .arg("list-collections")
        .assert()
        .success()
        .stdout(predicate::str::diff("testcoll\n"));
}

#[test]
fn test_exit_codes() {
    let tmp = TempDir::new().unwrap();
    manager(&tmp).arg("initialize-site").assert().success();
    manager(&tmp).args(["create-collection", "testcoll"]).assert().success();

    manager(&tmp)
        .args(["create-collection", "testcoll"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("already exists"));
    manager(&tmp).args(["delete-collection", "nocoll"]).assert().code(3);
    manager(&tmp).args(["regenerate-context", "nocoll"]).assert().code(3);
    manager(&tmp).arg("frobnicate").assert().code(2);
    manager(&tmp)
        .args(["create-user", "testcoll", "alice", "mailto:alice@example.org", "FLY"])
        .assert()
        .code(2);
}

#[test]
fn test_create_user() {
    let tmp = TempDir::new().unwrap();
    manager(&tmp).arg("initialize-site").assert().success();
    manager(&tmp).args(["create-collection", "testcoll"]).assert().success();

    let create = ["create-user", "testcoll", "alice", "mailto:alice@example.org", "VIEW", "CREATE"];
    manager(&tmp).args(create).assert().success();
    manager(&tmp).args(create).assert().code(4);
    manager(&tmp).args(create).arg("--force").assert().success();

    let body = std::fs::read_to_string(
        tmp.path()
            .join("site/c/testcoll/_annalist_collection/users/alice/user_meta.jsonld"),
    )
    .unwrap();
    assert!(body.contains("mailto:alice@example.org"));
    assert!(body.contains("CREATE"));
}

#[test]
fn test_config_file_in_working_directory() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(
        tmp.path().join("annalist.toml"),
        "base_dir = \"configured\"\nbase_url = \"http://example.org/annalist/\"\n",
    )
    .unwrap();
    let mut cmd = Command::cargo_bin("annalist-manager").unwrap();
    cmd.env_remove("ANNALIST_CONFIG")
        .env_remove("ANNALIST_BASE_DIR")
        .current_dir(tmp.path())
        .arg("initialize-site")
        .assert()
        .success();
    assert!(tmp.path().join("configured/c/_annalist_site").is_dir());
}
