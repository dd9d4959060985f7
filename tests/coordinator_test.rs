//! Integration tests for the single package build coordinator
//!
//! - Dependencies are built first, in slim mode, one after another
//! - A failing dependency stops the dependent before its style phase
//! - Slim builds skip dependencies, i18n, types and watching
//! - Invalid and excepted dependencies are skipped
//! - Watch rebuilds refresh the final stylesheets

mod common;

use common::{FakeTools, TestProject};

use arpadroid_build::core::coordinator::{BuildCoordinator, BuildPhase, BuildPayload, TYPES_OUTPUT};
use arpadroid_build::core::options::BuildOptions;
use arpadroid_build::error::BuildError;

fn coordinator(project: &TestProject, tools: &FakeTools) -> BuildCoordinator {
    BuildCoordinator::new(project.workspace(), tools.toolchain())
}

#[test]
fn test_dependency_failure_stops_before_styles() {
    let project = TestProject::new();
    project.package("d").theme("default").create();
    project.package("r").peer("d").theme("default").create();
    let tools = FakeTools::new();
    tools.fail_compile("d");

    let mut coordinator = coordinator(&project, &tools);
    let target = coordinator.workspace().project("r");
    let err = coordinator
        .build(&target, &BuildOptions::default())
        .unwrap_err();

    match &err {
        BuildError::DependencyBuildFailure {
            package,
            dependency,
            ..
        } => {
            assert_eq!(package, "r");
            assert_eq!(dependency, "d");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.to_string().contains("'d'"));
    assert_eq!(err.failing_package(), Some("d"));

    assert!(tools.called("compile:d:slim"));
    assert!(!tools.called("styles:r"));
    assert!(!tools.calls().iter().any(|c| c.starts_with("compile:r")));
}

#[test]
fn test_fat_build_runs_dependencies_first() {
    let project = TestProject::new();
    project.package("ui").theme("default").create();
    project
        .package("lists")
        .peer("ui")
        .theme("default")
        .create();
    let tools = FakeTools::new();

    let mut coordinator = coordinator(&project, &tools);
    let target = coordinator.workspace().project("lists");
    let options = BuildOptions {
        watch: true,
        ..BuildOptions::default()
    };
    let result = coordinator.build(&target, &options).unwrap();

    assert!(result.success);
    assert_eq!(
        tools.calls(),
        vec![
            "styles:ui",
            "compile:ui:slim",
            "styles:lists",
            "compile:lists:fat",
            "watch:lists"
        ]
    );
    assert_eq!(result.dependencies(), vec!["ui"]);
    assert_eq!(coordinator.watch_sessions().len(), 1);
    assert_eq!(coordinator.watch_sessions()[0].project(), "lists");

    let final_css = project.read_file(&format!(
        "{}/dist/themes/default/default.final.css",
        TestProject::package_dir("lists")
    ));
    assert_eq!(final_css, "/*ui:default*//*lists:default*/");
}

#[test]
fn test_watch_rebuild_regenerates_final_stylesheets() {
    let project = TestProject::new();
    project.package("ui").theme("default").create();
    project.package("lists").peer("ui").theme("default").create();
    let tools = FakeTools::new();

    let mut coordinator = coordinator(&project, &tools);
    let target = coordinator.workspace().project("lists");
    let options = BuildOptions {
        watch: true,
        ..BuildOptions::default()
    };
    coordinator.build(&target, &options).unwrap();

    let lists = TestProject::package_dir("lists");
    let default_final = format!("{lists}/dist/themes/default/default.final.css");
    std::fs::remove_file(project.path().join(&default_final)).unwrap();
    project.create_file(&format!("{lists}/src/themes/dark/dark.css"), ".dark {}\n");

    tools.rebuild("lists").unwrap();

    assert_eq!(
        tools.calls().iter().filter(|c| *c == "styles:lists").count(),
        2
    );
    assert_eq!(
        project.read_file(&default_final),
        "/*ui:default*//*lists:default*/"
    );
    assert_eq!(
        project.read_file(&format!("{lists}/dist/themes/dark/dark.final.css")),
        "/*lists:dark*/"
    );
}

#[test]
fn test_slim_build_skips_optional_phases() {
    let project = TestProject::new();
    let ui = project.package("ui").peer("tools").theme("default").create();
    project.package("tools").create();
    project.create_file(
        &format!("{}/scripts/build-i18n.mjs", TestProject::package_dir("ui")),
        "",
    );
    project.create_file(
        &format!("{}/src/types.d.ts", TestProject::package_dir("ui")),
        "export {};",
    );
    let tools = FakeTools::new();

    let mut coordinator = coordinator(&project, &tools);
    let target = coordinator.workspace().project("ui");
    let options = BuildOptions {
        slim: true,
        watch: true,
        ..BuildOptions::default()
    };
    let result = coordinator.build(&target, &options).unwrap();

    assert_eq!(
        result.phases,
        vec![
            BuildPhase::Init,
            BuildPhase::CleaningOutput,
            BuildPhase::BundlingStyles,
            BuildPhase::Compiling,
            BuildPhase::Done
        ]
    );
    assert_eq!(tools.calls(), vec!["styles:ui", "compile:ui:slim"]);
    assert!(coordinator.watch_sessions().is_empty());
    assert!(!ui.join("dist").join(TYPES_OUTPUT).exists());
}

#[test]
fn test_fat_build_runs_i18n_and_types() {
    let project = TestProject::new();
    let ui = project.package("ui").create();
    project.create_file(
        &format!("{}/scripts/build-i18n.mjs", TestProject::package_dir("ui")),
        "",
    );
    project.create_file(
        &format!("{}/src/types.d.ts", TestProject::package_dir("ui")),
        "export {};",
    );
    project.create_file(
        &format!("{}/src/components/button/button.d.ts", TestProject::package_dir("ui")),
        "export {};",
    );
    let tools = FakeTools::new();

    let mut coordinator = coordinator(&project, &tools);
    let target = coordinator.workspace().project("ui");
    let result = coordinator.build(&target, &BuildOptions::default()).unwrap();

    assert_eq!(tools.calls(), vec!["i18n:ui", "compile:ui:fat", "types:ui"]);
    assert!(result
        .payloads
        .iter()
        .any(|p| matches!(p, BuildPayload::I18n(files) if files.len() == 1)));
    assert!(result
        .payloads
        .contains(&BuildPayload::Types(ui.join("dist").join(TYPES_OUTPUT))));
    assert!(ui.join("dist").join(TYPES_OUTPUT).is_file());
    assert!(!ui.join(".tmp/types").exists());
}

#[test]
fn test_invalid_and_excepted_dependencies_are_skipped() {
    let project = TestProject::new();
    project.package("ui").create();
    project
        .package("form")
        .peer("ui")
        .peer("messages")
        .peer("missing")
        .create();
    project.package("messages").create();
    let tools = FakeTools::new();

    let mut coordinator = coordinator(&project, &tools);
    let target = coordinator.workspace().project("form");
    let options = BuildOptions {
        exceptions: "messages".parse().unwrap(),
        ..BuildOptions::default()
    };
    let result = coordinator.build(&target, &options).unwrap();

    assert_eq!(result.dependencies(), vec!["ui"]);
    assert_eq!(tools.calls(), vec!["compile:ui:slim", "compile:form:fat"]);
}

#[test]
fn test_output_directory_is_cleaned() {
    let project = TestProject::new();
    let ui = project.package("ui").create();
    project.create_file(
        &format!("{}/dist/stale.js", TestProject::package_dir("ui")),
        "old",
    );
    let tools = FakeTools::new();

    let mut coordinator = coordinator(&project, &tools);
    let target = coordinator.workspace().project("ui");
    coordinator.build(&target, &BuildOptions::default()).unwrap();

    assert!(!ui.join("dist/stale.js").exists());
    assert!(ui.join("dist/arpadroid-ui.js").is_file());
}

#[test]
fn test_missing_project_is_rejected() {
    let project = TestProject::new();
    let tools = FakeTools::new();

    let mut coordinator = coordinator(&project, &tools);
    let target = coordinator.workspace().project("ghost");
    let err = coordinator
        .build(&target, &BuildOptions::default())
        .unwrap_err();

    assert!(matches!(err, BuildError::Project(_)));
    assert!(tools.calls().is_empty());
    assert_eq!(coordinator.last_phases(), [BuildPhase::Init, BuildPhase::Failed]);
}
