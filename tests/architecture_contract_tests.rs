//! Architecture contract tests.

mod support;

use support::architecture::{
    find_lines_containing, find_lines_containing_anywhere, find_non_export_lines_in_mod_files,
    path_exists, read_relative,
};

#[test]
fn domain_has_no_framework_or_outer_layer_imports() {
    let hits = find_lines_containing(
        "src/domain",
        &[
            "crate::adapter",
            "crate::infrastructure",
            "crate::application",
            "crate::port",
            "tokio::",
            "diesel::",
            "tokio_tungstenite::",
        ],
    );

    assert!(
        hits.is_empty(),
        "found forbidden imports in domain layer: {hits:#?}"
    );
}

#[test]
fn ports_depend_only_on_domain() {
    let hits = find_lines_containing(
        "src/port",
        &[
            "crate::adapter",
            "crate::application",
            "crate::infrastructure",
            "diesel::",
            "tokio::process",
        ],
    );

    assert!(
        hits.is_empty(),
        "found outer layer imports in ports: {hits:#?}"
    );
}

#[test]
fn application_layer_has_no_direct_adapter_imports() {
    let hits = find_lines_containing_anywhere("src/application", &["crate::adapter::"]);

    assert!(
        hits.is_empty(),
        "found direct adapter imports in application layer: {hits:#?}"
    );
}

#[test]
fn application_layer_does_not_spawn_processes_itself() {
    let hits = find_lines_containing(
        "src/application",
        &["tokio::process", "std::process::Command"],
    );

    assert!(
        hits.is_empty(),
        "process spawning belongs behind the ProcessLauncher port: {hits:#?}"
    );
}

#[test]
fn diesel_stays_in_the_sqlite_adapter() {
    let hits = find_lines_containing("src", &["use diesel", "diesel::"])
        .into_iter()
        .filter(|(path, _, _)| !path.starts_with("src/adapter/outbound/sqlite/"))
        .collect::<Vec<_>>();

    assert!(
        hits.is_empty(),
        "found diesel usage outside the sqlite adapter: {hits:#?}"
    );
}

#[test]
fn mod_rs_is_export_only() {
    let violations = find_non_export_lines_in_mod_files("src");
    assert!(
        violations.is_empty(),
        "found non-export content in mod.rs files: {violations:#?}"
    );
}

#[test]
fn migrations_live_next_to_the_manifest() {
    assert!(
        path_exists("migrations/2026-01-01-000000_create_stores/up.sql"),
        "stores migration should exist"
    );
    let up = read_relative("migrations/2026-01-01-000000_create_stores/up.sql");
    assert!(
        up.contains("CREATE UNIQUE INDEX"),
        "store names should be unique at the database level"
    );
}

#[test]
fn binary_entrypoint_only_dispatches() {
    let source = read_relative("src/main.rs");
    assert!(
        source.contains("run::run(cli)"),
        "main should hand the parsed command line to cli::run"
    );
    assert!(
        !source.contains("App::build"),
        "main should not wire the application itself"
    );
}
