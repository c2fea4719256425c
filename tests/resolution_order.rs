//! Integration tests for assertion ordering and frame writes

use std::collections::HashMap;

use anchor_layout::layout::Reference;
use anchor_layout::{
    Basepoint, Baseline, Frame, LayoutEngine, LayoutError, Source, ViewFrames, ViewId, ViewTree,
};
use kurbo::{Point, Size};
use pretty_assertions::assert_eq;

fn rect(x: f64, y: f64, w: f64, h: f64) -> Frame {
    Frame::new(x, y, w, h)
}

/// Frame store that records every write
#[derive(Default)]
struct Recorder {
    frames: HashMap<ViewId, Frame>,
    writes: Vec<(ViewId, Frame)>,
}

impl Recorder {
    fn with(views: &[(usize, Frame)]) -> Self {
        Self {
            frames: views
                .iter()
                .map(|(id, r)| (ViewId::from_raw(*id), *r))
                .collect(),
            writes: Vec::new(),
        }
    }
}

impl ViewFrames for Recorder {
    fn frame(&self, view: ViewId) -> Option<Frame> {
        self.frames.get(&view).copied()
    }

    fn set_frame(&mut self, view: ViewId, frame: Frame) -> Result<(), LayoutError> {
        if !self.frames.contains_key(&view) {
            return Err(LayoutError::dangling(view));
        }
        self.writes.push((view, frame));
        self.frames.insert(view, frame);
        Ok(())
    }
}

fn stack() -> (ViewTree, ViewId, ViewId, ViewId) {
    let mut tree = ViewTree::new();
    let root = tree.add_root(rect(0.0, 0.0, 320.0, 480.0));
    let a = tree.add_subview(root, rect(0.0, 0.0, 100.0, 40.0)).unwrap();
    let b = tree.add_subview(root, rect(0.0, 0.0, 100.0, 60.0)).unwrap();
    (tree, root, a, b)
}

#[test]
fn test_later_assertions_see_earlier_writes() {
    let (mut tree, root, a, b) = stack();
    let mut engine = LayoutEngine::new();
    engine
        .fix_top(a, 10.0)
        .fix_top(b, Source::view(a, |r| r.bottom() + 5.0));
    let engine = engine.shared();
    tree.attach_exclusive(root, &engine).unwrap();

    tree.layout(root).unwrap();
    assert_eq!(tree.frame(a), Some(rect(0.0, 10.0, 100.0, 40.0)));
    assert_eq!(tree.frame(b), Some(rect(0.0, 55.0, 100.0, 60.0)));
}

#[test]
fn test_reversed_order_reads_stale_geometry() {
    let (mut tree, root, a, b) = stack();
    let mut engine = LayoutEngine::new();
    engine
        .fix_top(b, Source::view(a, |r| r.bottom() + 5.0))
        .fix_top(a, 10.0);
    let engine = engine.shared();
    tree.attach_exclusive(root, &engine).unwrap();

    tree.layout(root).unwrap();
    // b read a's frame from before the pass
    assert_eq!(tree.frame(b).unwrap().y, 45.0);

    tree.layout(root).unwrap();
    assert_eq!(tree.frame(b).unwrap().y, 55.0);
}

#[test]
fn test_repeated_passes_are_idempotent() {
    let (mut tree, root, a, b) = stack();
    let mut engine = LayoutEngine::new();
    engine
        .fix_center(a, Source::container(|r| r.center()))
        .fix_top_left(b, Source::view(a, |r| Point::new(r.x, r.bottom())));
    let engine = engine.shared();
    tree.attach_exclusive(root, &engine).unwrap();

    tree.layout(root).unwrap();
    let first = (tree.frame(a), tree.frame(b));
    tree.layout(root).unwrap();
    assert_eq!((tree.frame(a), tree.frame(b)), first);
    assert_eq!(tree.frame(a), Some(rect(110.0, 220.0, 100.0, 40.0)));
    assert_eq!(tree.frame(b), Some(rect(110.0, 260.0, 100.0, 60.0)));
}

#[test]
fn test_basepoint_is_written_in_one_call() {
    let container = ViewId::from_raw(0);
    let target = ViewId::from_raw(1);
    let mut views = Recorder::with(&[
        (0, rect(0.0, 0.0, 200.0, 200.0)),
        (1, rect(3.0, 4.0, 20.0, 10.0)),
    ]);

    let mut engine = LayoutEngine::new();
    engine
        .fix_bottom_right(target, Source::container(|r| Point::new(r.right(), r.bottom())))
        .fix_left(target, 1.0);

    let report = engine.resolve(container, &mut views).unwrap();
    assert_eq!(report.applied, 2);
    assert_eq!(
        views.writes,
        vec![
            (target, rect(180.0, 190.0, 20.0, 10.0)),
            (target, rect(1.0, 190.0, 20.0, 10.0)),
        ]
    );
}

#[test]
fn test_literal_baselines_read_back_exactly() {
    let frame = rect(7.0, 9.0, 30.0, 12.0);
    for baseline in Baseline::ALL {
        let container = ViewId::from_raw(0);
        let target = ViewId::from_raw(1);
        let mut views = Recorder::with(&[(0, rect(0.0, 0.0, 100.0, 100.0)), (1, frame)]);

        let mut engine = LayoutEngine::new();
        engine.fix_baseline(target, baseline, 42.0);
        engine.resolve(container, &mut views).unwrap();

        let written = views.frame(target).unwrap();
        assert_eq!(written.baseline(baseline), 42.0, "{}", baseline);
        assert_eq!(written.size(), frame.size(), "{}", baseline);
    }
}

#[test]
fn test_fractional_literals_keep_size() {
    let frame = rect(0.0, 0.0, 0.3, 0.2);
    for baseline in Baseline::ALL {
        let container = ViewId::from_raw(0);
        let target = ViewId::from_raw(1);
        let mut views = Recorder::with(&[(0, rect(0.0, 0.0, 1.0, 1.0)), (1, frame)]);

        let mut engine = LayoutEngine::new();
        engine.fix_baseline(target, baseline, 0.1);
        engine.resolve(container, &mut views).unwrap();

        let written = views.frame(target).unwrap();
        assert_eq!(written.baseline(baseline), 0.1, "{}", baseline);
        assert_eq!(written.size(), Size::new(0.3, 0.2), "{}", baseline);
    }
}

#[test]
fn test_fractional_literal_lists_are_idempotent() {
    let mut tree = ViewTree::new();
    let root = tree.add_root(rect(0.0, 0.0, 1.0, 1.0));
    let a = tree.add_subview(root, rect(0.1, 0.1, 0.3, 0.2)).unwrap();
    let b = tree.add_subview(root, rect(0.0, 0.0, 0.7, 0.1)).unwrap();

    let mut engine = LayoutEngine::new();
    engine
        .fix_right(a, 0.9)
        .fix_center_y(a, 0.3)
        .fix_center(b, (0.1, 0.7))
        .fix_bottom(b, 0.3);
    let engine = engine.shared();
    tree.attach_exclusive(root, &engine).unwrap();

    tree.layout(root).unwrap();
    let first = (tree.frame(a), tree.frame(b));
    for _ in 0..10 {
        tree.layout(root).unwrap();
        assert_eq!((tree.frame(a), tree.frame(b)), first);
    }
    assert_eq!(tree.frame(a).unwrap().size(), Size::new(0.3, 0.2));
    assert_eq!(tree.frame(b).unwrap().size(), Size::new(0.7, 0.1));
}

#[test]
fn test_every_orthogonal_pair_is_accepted() {
    let target = ViewId::from_raw(1);
    let horizontal = [Baseline::Left, Baseline::Right, Baseline::CenterX];
    let vertical = [Baseline::Top, Baseline::Bottom, Baseline::CenterY];

    let mut engine = LayoutEngine::new();
    for h in horizontal {
        for v in vertical {
            engine.fix_pair(target, v, h, (0.0, 0.0)).unwrap();
        }
    }
    assert_eq!(engine.len(), 9);
}

#[test]
fn test_same_axis_pair_leaves_list_unchanged() {
    let target = ViewId::from_raw(1);
    let mut engine = LayoutEngine::new();
    engine.fix_top(target, 0.0);

    let err = engine
        .fix_pair(target, Baseline::Left, Baseline::CenterX, (0.0, 0.0))
        .unwrap_err();
    assert!(matches!(err, LayoutError::InvalidAnchorCombination { .. }));
    assert_eq!(engine.len(), 1);

    assert!(Basepoint::from_bits(Baseline::Top | Baseline::Bottom).is_err());
}

#[test]
fn test_target_reference_reads_own_frame() {
    let (mut tree, root, a, _) = stack();
    let mut engine = LayoutEngine::new();
    engine.fix_left(a, Source::target(|r| r.x + 10.0));
    let engine = engine.shared();
    tree.attach_exclusive(root, &engine).unwrap();

    tree.layout(root).unwrap();
    tree.layout(root).unwrap();
    assert_eq!(tree.frame(a).unwrap().x, 20.0);
}

#[test]
fn test_engine_edits_apply_on_next_pass() {
    let (mut tree, root, a, _) = stack();
    let engine = LayoutEngine::new().shared();
    tree.attach_exclusive(root, &engine).unwrap();

    tree.layout(root).unwrap();
    assert_eq!(tree.frame(a).unwrap().x, 0.0);

    engine.borrow_mut().fix_right(a, 320.0);
    tree.layout(root).unwrap();
    assert_eq!(tree.frame(a), Some(rect(220.0, 0.0, 100.0, 40.0)));
}

#[test]
fn test_view_reference_to_missing_view_is_dangling() {
    let tree = ViewTree::new();
    let gone = ViewId::from_raw(5);
    let source = Source::view(gone, |r| r.x);
    assert_eq!(
        source.resolve(gone, gone, &tree),
        Err(LayoutError::dangling(gone))
    );
    assert_eq!(
        Reference::View(gone).geometry(gone, gone, &tree),
        Err(LayoutError::dangling(gone))
    );
}

#[test]
fn test_bottom_then_dependent_top() {
    let (mut tree, root, v1, v2) = stack();
    let mut engine = LayoutEngine::new();
    engine
        .fix_bottom(v1, 10.0)
        .fix_top(v2, Source::view(v1, |r| r.bottom()));
    let engine = engine.shared();
    tree.attach_exclusive(root, &engine).unwrap();

    tree.layout(root).unwrap();
    assert_eq!(tree.frame(v2).unwrap().y, 10.0);
}

#[test]
fn test_dependent_top_before_bottom_sees_pre_pass_frame() {
    let (mut tree, root, v1, v2) = stack();
    let pre_pass_bottom = tree.frame(v1).unwrap().bottom();

    let mut engine = LayoutEngine::new();
    engine
        .fix_top(v2, Source::view(v1, |r| r.bottom()))
        .fix_bottom(v1, 10.0);
    let engine = engine.shared();
    tree.attach_exclusive(root, &engine).unwrap();

    tree.layout(root).unwrap();
    assert_eq!(tree.frame(v2).unwrap().y, pre_pass_bottom);
    assert_eq!(tree.frame(v1).unwrap().bottom(), 10.0);
}

#[test]
fn test_literal_lists_are_idempotent() {
    let (mut tree, root, a, b) = stack();
    let mut engine = LayoutEngine::new();
    engine
        .fix_top_left(a, (4.0, 4.0))
        .fix_center_y(b, 100.0)
        .fix_right(b, 300.0);
    let engine = engine.shared();
    tree.attach_exclusive(root, &engine).unwrap();

    tree.layout(root).unwrap();
    let first = (tree.frame(a), tree.frame(b));
    for _ in 0..3 {
        tree.layout(root).unwrap();
        assert_eq!((tree.frame(a), tree.frame(b)), first);
    }
    assert_eq!(tree.frame(b), Some(rect(200.0, 70.0, 100.0, 60.0)));
}
