//! Integration tests for scene files

use anchor_layout::{run, run_with_config, Frame, LayoutError, RunConfig, Scene, SceneError};
use pretty_assertions::assert_eq;

fn rect(x: f64, y: f64, w: f64, h: f64) -> Frame {
    Frame::new(x, y, w, h)
}

const PROFILE: &str = r#"
[layout]
max_depth = 8

[[views]]
name = "screen"
frame = [0, 0, 320, 480]

[[views]]
name = "avatar"
parent = "screen"
frame = [0, 0, 64, 64]

[[views]]
name = "name"
parent = "screen"
frame = [0, 0, 200, 24]

[[views]]
name = "badge"
parent = "screen"
frame = [0, 0, 16, 16]

[[engines]]
container = "screen"

[[engines.fix]]
view = "avatar"
anchor = "center_x|top"
to = "super.center_x, super.top + 32"

[[engines.fix]]
view = "name"
anchor = "top"
to = "avatar.bottom + 12"

[[engines.fix]]
view = "name"
anchor = "center_x"
to = "avatar.center_x"

[[engines.fix]]
view = "badge"
anchor = "center"
to = "avatar.right - 4, avatar.top + 4"
"#;

#[test]
fn test_profile_layout() {
    let out = run(PROFILE).unwrap();
    insta::assert_snapshot!(out, @r"
screen: x=0.0 y=0.0 w=320.0 h=480.0
avatar: x=128.0 y=32.0 w=64.0 h=64.0
name: x=60.0 y=108.0 w=200.0 h=24.0
badge: x=180.0 y=28.0 w=16.0 h=16.0
");
}

#[test]
fn test_augmenting_engine_after_column() {
    let source = r#"
[[views]]
name = "list"
frame = [0, 0, 100, 300]
native = { kind = "column", gap = 10 }

[[views]]
name = "first"
parent = "list"
frame = [0, 0, 80, 20]

[[views]]
name = "second"
parent = "list"
frame = [0, 0, 60, 20]

[[engines]]
container = "list"
mode = "augmenting"

[[engines.fix]]
view = "second"
anchor = "right"
to = "super.right"
"#;
    let mut scene = Scene::parse(source).unwrap();
    let report = scene.layout().unwrap();

    assert!(report.pass_for(scene.view("list").unwrap()).unwrap().native);
    assert_eq!(scene.frame("first"), Some(rect(0.0, 0.0, 80.0, 20.0)));
    assert_eq!(scene.frame("second"), Some(rect(40.0, 30.0, 60.0, 20.0)));
}

#[test]
fn test_exclusive_engine_suppresses_fill() {
    let source = r#"
[[views]]
name = "root"
frame = [0, 0, 100, 100]
native = { kind = "fill" }

[[views]]
name = "child"
parent = "root"
frame = [0, 0, 10, 10]

[[engines]]
container = "root"

[[engines.fix]]
view = "child"
anchor = "bottom_right"
be = [100, 100]
"#;
    let out = run(source).unwrap();
    assert_eq!(
        out,
        "root: x=0.0 y=0.0 w=100.0 h=100.0\nchild: x=90.0 y=90.0 w=10.0 h=10.0"
    );
}

#[test]
fn test_removed_view_is_skipped_with_diagnostic() {
    let mut scene = Scene::parse(PROFILE).unwrap();
    let avatar = scene.view("avatar").unwrap();
    assert!(scene.remove("avatar"));

    let report = scene.layout().unwrap();
    let skipped: Vec<_> = report.diagnostics().map(|d| d.index).collect();
    assert_eq!(skipped, vec![0, 1, 2, 3]);
    assert!(report
        .diagnostics()
        .all(|d| d.error == LayoutError::dangling(avatar)));

    let names: Vec<&str> = scene.frames().into_iter().map(|(n, _)| n).collect();
    assert_eq!(names, vec!["screen", "name", "badge"]);
}

#[test]
fn test_abort_policy_from_scene() {
    let source = r#"
[[views]]
name = "root"
frame = [0, 0, 100, 100]

[[views]]
name = "a"
parent = "root"
frame = [0, 0, 10, 10]

[[views]]
name = "b"
parent = "root"
frame = [0, 0, 10, 10]

[[engines]]
container = "root"
on_dangling = "abort"

[[engines.fix]]
view = "b"
anchor = "top"
to = "a.bottom"
"#;
    let mut scene = Scene::parse(source).unwrap();
    let a = scene.view("a").unwrap();
    scene.remove("a");
    assert_eq!(scene.layout(), Err(LayoutError::dangling(a)));
}

#[test]
fn test_passes_settle_out_of_order_fixes() {
    let source = r#"
[[views]]
name = "root"
frame = [0, 0, 100, 100]

[[views]]
name = "below"
parent = "root"
frame = [0, 0, 10, 10]

[[views]]
name = "above"
parent = "root"
frame = [0, 0, 10, 10]

[[engines]]
container = "root"

[[engines.fix]]
view = "below"
anchor = "top"
to = "above.bottom"

[[engines.fix]]
view = "above"
anchor = "top"
be = 20
"#;
    let once = run(source).unwrap();
    assert!(once.contains("below: x=0.0 y=10.0"));

    let twice = run_with_config(source, RunConfig::new().with_passes(2)).unwrap();
    assert!(twice.contains("below: x=0.0 y=30.0"));
}

#[test]
fn test_unknown_anchor_report() {
    let source = r#"
[[views]]
name = "root"
frame = [0, 0, 100, 100]

[[engines]]
container = "root"

[[engines.fix]]
view = "root"
anchor = "bottom_rigth"
be = [0, 0]
"#;
    let err = Scene::parse(source).err().unwrap();
    match &err {
        SceneError::UnknownAnchor { suggestions, .. } => {
            assert_eq!(suggestions, &vec!["bottom_right".to_string()]);
        }
        other => panic!("expected unknown anchor, got {:?}", other),
    }

    let report = err.format(source, "scene.toml");
    assert!(report.contains("unknown anchor 'bottom_rigth'"));
    assert!(report.contains("did you mean 'bottom_right'?"));
}

#[test]
fn test_reentrant_native_layout_from_scene() {
    let mut scene = Scene::parse(
        r#"
[[views]]
name = "root"
frame = [0, 0, 100, 100]
"#,
    )
    .unwrap();
    let root = scene.view("root").unwrap();
    scene
        .tree_mut()
        .set_native_layout(root, |tree, view| tree.layout(view).map(|_| ()))
        .unwrap();

    assert_eq!(scene.layout(), Err(LayoutError::reentrant(root)));
}
