//! Integration tests for `cdn-import --json` output.
//!
//! These tests verify:
//! - JSON output is always valid JSON with an `ok` boolean
//! - Failures carry a SCREAMING_SNAKE_CASE error code and exit non-zero
//! - HTML and source transforms follow the host command

use serde_json::Value;
use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::tempdir;

const INDEX_HTML: &str = "<!DOCTYPE html>\n<html>\n<head>\n  <title>app</title>\n</head>\n<body>\n  <div id=\"app\"></div>\n</body>\n</html>\n";

fn cdn_import(cwd: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_cdn-import"))
        .arg("--json")
        .arg("--cwd")
        .arg(cwd)
        .args(args)
        .env_remove("NODE_ENV")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to run cdn-import")
}

fn stdout_json(output: &Output) -> Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(&stdout).expect("Output should be valid JSON")
}

fn write_config(dir: &Path, config: &str) {
    fs::write(dir.join("cdn-import.config.json"), config).unwrap();
}

const PINNED: &str = r#"{
    "modules": [
        {"name": "react", "var": "React", "path": "umd/react.production.min.js", "version": "18.2.0", "alias": ["React"]},
        {"name": "antd", "var": "antd", "path": "dist/antd.min.js", "css": "dist/antd.min.css", "version": "4.24.0"}
    ]
}"#;

#[test]
fn test_resolve_pinned_versions() {
    let dir = tempdir().unwrap();
    write_config(dir.path(), PINNED);

    let output = cdn_import(dir.path(), &["resolve"]);
    assert!(output.status.success());

    let json = stdout_json(&output);
    assert_eq!(json["ok"], true);
    assert_eq!(json["modules"][0]["version"], "18.2.0");
    assert_eq!(
        json["modules"][0]["pathList"][0],
        "https://cdn.jsdelivr.net/npm/react@18.2.0/umd/react.production.min.js"
    );
    assert_eq!(
        json["modules"][1]["cssList"][0],
        "https://cdn.jsdelivr.net/npm/antd@4.24.0/dist/antd.min.css"
    );
}

#[test]
fn test_resolve_installed_version() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("package.json"),
        r#"{"name": "app", "dependencies": {"vue": "^3.4.0"}}"#,
    )
    .unwrap();
    fs::create_dir_all(dir.path().join("node_modules/vue")).unwrap();
    fs::write(
        dir.path().join("node_modules/vue/package.json"),
        r#"{"name": "vue", "version": "3.4.21"}"#,
    )
    .unwrap();
    write_config(dir.path(), r#"{"modules": ["vue"]}"#);

    let output = cdn_import(dir.path(), &["resolve"]);
    assert!(output.status.success());

    let json = stdout_json(&output);
    assert_eq!(json["modules"][0]["version"], "3.4.21");
}

#[test]
fn test_missing_version_error_code() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("package.json"), r#"{"name": "app"}"#).unwrap();
    write_config(
        dir.path(),
        r#"{"modules": [{"name": "lodash", "var": "_", "path": "lodash.min.js"}]}"#,
    );

    let output = cdn_import(dir.path(), &["resolve"]);
    assert!(!output.status.success());

    let json = stdout_json(&output);
    assert_eq!(json["ok"], false);
    assert_eq!(json["error"]["code"], "CDN_MODULE_VERSION_MISSING");
    assert_eq!(
        json["error"]["message"],
        "modules: lodash package.json file does not exist"
    );
}

#[test]
fn test_missing_config_error_code() {
    let dir = tempdir().unwrap();

    let output = cdn_import(dir.path(), &["externals"]);
    assert!(!output.status.success());

    let json = stdout_json(&output);
    let code = json["error"]["code"].as_str().unwrap();
    assert_eq!(code, "CDN_CONFIG_NOT_FOUND");
    assert!(code.chars().all(|c| c.is_ascii_uppercase() || c == '_'));
}

#[test]
fn test_externals_include_aliases() {
    let dir = tempdir().unwrap();
    write_config(dir.path(), PINNED);

    let json = stdout_json(&cdn_import(dir.path(), &["externals"]));
    assert_eq!(json["externals"]["react"], "React");
    assert_eq!(json["externals"]["React"], "React");
    assert_eq!(json["externals"]["antd"], "antd");
}

#[test]
fn test_html_build_injects_tags() {
    let dir = tempdir().unwrap();
    write_config(dir.path(), PINNED);
    fs::write(dir.path().join("index.html"), INDEX_HTML).unwrap();

    let output = cdn_import(dir.path(), &["html", "--command", "build", "-o", "dist/index.html"]);
    assert!(output.status.success());

    let json = stdout_json(&output);
    assert_eq!(json["ok"], true);
    assert!(json["html"].is_null());

    let html = fs::read_to_string(dir.path().join("dist/index.html")).unwrap();
    let script = html.find("react@18.2.0/umd/react.production.min.js").unwrap();
    let link = html.find("antd@4.24.0/dist/antd.min.css").unwrap();
    assert!(script < link);
    assert!(link < html.find("<title>").unwrap());
    assert!(html.contains(r#"rel="stylesheet""#));
}

#[test]
fn test_html_serve_without_dev_mode_is_unchanged() {
    let dir = tempdir().unwrap();
    write_config(dir.path(), PINNED);
    fs::write(dir.path().join("index.html"), INDEX_HTML).unwrap();

    let json = stdout_json(&cdn_import(dir.path(), &["html", "--command", "serve"]));
    assert_eq!(json["ok"], true);
    assert_eq!(json["html"], INDEX_HTML);
}

#[test]
fn test_transform_build_rewrites_imports() {
    let dir = tempdir().unwrap();
    write_config(dir.path(), PINNED);
    fs::write(
        dir.path().join("main.tsx"),
        "import React from 'react';\nimport { Button } from 'antd';\nimport './app.css';\n",
    )
    .unwrap();

    let json = stdout_json(&cdn_import(dir.path(), &["transform", "main.tsx"]));
    assert_eq!(json["ok"], true);
    assert_eq!(json["changed"], true);
    assert_eq!(
        json["code"],
        "const React = window[\"React\"];\nconst { Button } = window[\"antd\"];\nimport './app.css';\n"
    );
}

#[test]
fn test_transform_serve_without_dev_mode_is_unchanged() {
    let dir = tempdir().unwrap();
    write_config(dir.path(), PINNED);
    fs::write(dir.path().join("main.js"), "import React from 'react';\n").unwrap();

    let json = stdout_json(&cdn_import(
        dir.path(),
        &["--node-env", "development", "transform", "main.js", "--command", "serve"],
    ));
    assert_eq!(json["changed"], false);
}

#[test]
fn test_transform_serve_in_dev_mode_rewrites_imports() {
    let dir = tempdir().unwrap();
    write_config(
        dir.path(),
        r#"{"enableInDevMode": true, "modules": [{"name": "react", "var": "React", "path": "umd/react.development.js", "version": "18.2.0"}]}"#,
    );
    fs::write(dir.path().join("main.js"), "import { useState } from 'react';\n").unwrap();

    let json = stdout_json(&cdn_import(
        dir.path(),
        &["--node-env", "development", "transform", "main.js", "--command", "serve"],
    ));
    assert_eq!(json["ok"], true);
    assert_eq!(json["changed"], true);
    assert_eq!(json["code"], "const { useState } = window[\"React\"];\n");
}

#[test]
fn test_transform_star_reexport_fails() {
    let dir = tempdir().unwrap();
    write_config(dir.path(), PINNED);
    fs::write(
        dir.path().join("index.ts"),
        "export { useState } from 'react';\nexport * from 'react';\n",
    )
    .unwrap();

    let output = cdn_import(dir.path(), &["transform", "index.ts"]);
    assert!(!output.status.success());

    let json = stdout_json(&output);
    assert_eq!(json["ok"], false);
    assert_eq!(json["error"]["code"], "CDN_PLUGIN_FAILED");
    assert!(json["error"]["message"]
        .as_str()
        .unwrap()
        .contains("export * from \"react\""));
}

#[test]
fn test_shortcuts_list() {
    let dir = tempdir().unwrap();

    let json = stdout_json(&cdn_import(dir.path(), &["shortcuts"]));
    let names: Vec<&str> = json["shortcuts"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(Value::as_str)
        .collect();
    assert!(names.contains(&"react"));
    assert!(names.contains(&"vue"));
}
