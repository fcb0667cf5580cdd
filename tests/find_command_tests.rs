mod setup;

use predicates::prelude::*;
use std::fs;

#[test]
fn test_find_command_help() {
    let mut cmd = setup::get_bin();
    cmd.arg("find")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--accept-licenses"))
        .stdout(predicate::str::contains("--exclude"))
        .stdout(predicate::str::contains("--catalog"));
}

#[test]
fn test_find_requires_mime_type() {
    let mut cmd = setup::get_bin();
    cmd.arg("find")
        .assert()
        .failure()
        .stderr(predicate::str::contains("required"));
}

#[test]
fn test_find_with_missing_catalog() {
    let temp_dir = setup::setup_test_dir();
    let mut cmd = setup::get_bin_in(&temp_dir);

    cmd.arg("find")
        .arg(setup::FOO_MIME_TYPE)
        .arg("--catalog")
        .arg("catalog.json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read plugin catalog"));
}

#[test]
fn test_find_installs_plugin_from_catalog() {
    let temp_dir = setup::setup_test_dir();
    let hash = setup::create_package(
        &temp_dir,
        "foo.zip",
        &[("foo.so", "binary"), ("docs/README", "Foo Player")],
    );
    setup::create_catalog(&temp_dir, &setup::foo_catalog(&hash));
    let mut cmd = setup::get_bin_in(&temp_dir);

    cmd.arg("find")
        .arg(setup::FOO_MIME_TYPE)
        .arg("--catalog")
        .arg("catalog.json")
        .assert()
        .success()
        .stdout(predicate::str::contains("Found plugins:"))
        .stdout(predicate::str::contains("Foo Player 2.1 (foo)"))
        .stdout(predicate::str::contains(
            "The following plugins were processed:",
        ))
        .stdout(predicate::str::contains("installed"))
        .stdout(predicate::str::contains("Restart the application"))
        .stdout(predicate::str::contains("Reload the page"));

    let plugin_dir = temp_dir.path().join("plugins").join("foo");
    assert_eq!(
        fs::read_to_string(plugin_dir.join("foo.so")).unwrap(),
        "binary"
    );
    assert_eq!(
        fs::read_to_string(plugin_dir.join("docs/README")).unwrap(),
        "Foo Player"
    );
}

#[test]
fn test_find_reports_unknown_mime_type() {
    let temp_dir = setup::setup_test_dir();
    let hash = setup::create_package(&temp_dir, "foo.zip", &[("foo.so", "binary")]);
    setup::create_catalog(&temp_dir, &setup::foo_catalog(&hash));
    let mut cmd = setup::get_bin_in(&temp_dir);

    cmd.arg("find")
        .arg(setup::UNKNOWN_MIME_TYPE)
        .arg("--catalog")
        .arg("catalog.json")
        .arg("--plugins-page")
        .arg("https://example.com/plugins")
        .assert()
        .success()
        .stdout(predicate::str::contains("No suitable plugins were found."))
        .stdout(predicate::str::contains("application/x-unknown: unknown plugin"))
        .stdout(predicate::str::contains(
            "Install manually from https://example.com/plugins",
        ))
        .stdout(predicate::str::contains(
            "http://127.0.0.1:9/plugins/?action=missingplugins&mimetype=application%2Fx-unknown",
        ))
        .stdout(predicate::str::contains("Reload the page").not());

    assert!(!temp_dir.path().join("plugins").exists());
}

#[test]
fn test_find_declines_licenses_by_default() {
    let temp_dir = setup::setup_test_dir();
    let hash = setup::create_package(&temp_dir, "foo.zip", &[("foo.so", "binary")]);
    setup::create_catalog(&temp_dir, &setup::licensed_catalog(&hash));
    let mut cmd = setup::get_bin_in(&temp_dir);

    cmd.arg("find")
        .arg(setup::FOO_MIME_TYPE)
        .arg(setup::BAR_MIME_TYPE)
        .arg("--catalog")
        .arg("catalog.json")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "License for Bar Viewer: https://example.com/bar/license",
        ))
        .stdout(predicate::str::contains("declined"))
        .stdout(predicate::str::contains(
            "Bar Viewer [application/x-bar]: license not accepted",
        ))
        .stdout(predicate::str::contains(
            "Foo Player [application/x-foo]: installed",
        ));

    assert!(temp_dir.path().join("plugins/foo").exists());
    assert!(!temp_dir.path().join("plugins/42").exists());
}

#[test]
fn test_find_accepts_licenses() {
    let temp_dir = setup::setup_test_dir();
    let hash = setup::create_package(&temp_dir, "foo.zip", &[("foo.so", "binary")]);
    setup::create_catalog(&temp_dir, &setup::licensed_catalog(&hash));
    let mut cmd = setup::get_bin_in(&temp_dir);

    cmd.arg("find")
        .arg(setup::BAR_MIME_TYPE)
        .arg("--catalog")
        .arg("catalog.json")
        .arg("--accept-licenses")
        .assert()
        .success()
        .stdout(predicate::str::contains("accepted"))
        .stdout(predicate::str::contains(
            "Bar Viewer [application/x-bar]: installed",
        ));

    assert!(temp_dir.path().join("plugins/42/foo.so").exists());
}

#[test]
fn test_find_excludes_plugins() {
    let temp_dir = setup::setup_test_dir();
    let hash = setup::create_package(&temp_dir, "foo.zip", &[("foo.so", "binary")]);
    setup::create_catalog(&temp_dir, &setup::foo_catalog(&hash));
    let mut cmd = setup::get_bin_in(&temp_dir);

    cmd.arg("find")
        .arg(setup::FOO_MIME_TYPE)
        .arg("--catalog")
        .arg("catalog.json")
        .arg("--exclude")
        .arg("foo")
        .assert()
        .success()
        .stdout(predicate::str::contains("No plugins selected."))
        .stdout(predicate::str::contains("skipped"))
        .stdout(predicate::str::contains("No plugins were installed."));

    assert!(!temp_dir.path().join("plugins").exists());
}

#[test]
fn test_find_reports_hash_mismatch() {
    let temp_dir = setup::setup_test_dir();
    setup::create_package(&temp_dir, "foo.zip", &[("foo.so", "binary")]);
    setup::create_catalog(
        &temp_dir,
        &setup::foo_catalog(
            "sha256:0000000000000000000000000000000000000000000000000000000000000000",
        ),
    );
    let mut cmd = setup::get_bin_in(&temp_dir);

    cmd.arg("find")
        .arg(setup::FOO_MIME_TYPE)
        .arg("--catalog")
        .arg("catalog.json")
        .assert()
        .success()
        .stdout(predicate::str::contains("failed (Package hash mismatch"))
        .stdout(predicate::str::contains(
            "Install manually from https://example.com/foo/manual",
        ))
        .stdout(predicate::str::contains("No plugins were installed."))
        .stdout(predicate::str::contains("action=missingplugins"));

    assert!(!temp_dir.path().join("plugins/foo").exists());
}
