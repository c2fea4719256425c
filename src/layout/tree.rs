//! In-memory host view tree
//!
//! `ViewTree` plays the part of the host toolkit: it owns views and their
//! frames, runs each container's native layout behavior, and gives layout
//! participants (anchor engines) a registration point in a container's layout
//! lifecycle. Participants only ever see the tree through [`ViewFrames`].

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use super::config::LayoutConfig;
use super::engine::PassReport;
use super::error::LayoutError;
use super::geometry::Frame;

/// Non-owning handle to a view. Ids are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewId(usize);

impl ViewId {
    pub fn from_raw(raw: usize) -> Self {
        Self(raw)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Frame access the engine needs from the host
pub trait ViewFrames {
    /// Current frame, or `None` when the view is not part of the tree
    fn frame(&self, view: ViewId) -> Option<Frame>;

    /// Replace a view's frame
    fn set_frame(&mut self, view: ViewId, frame: Frame) -> Result<(), LayoutError>;
}

/// Something that lays out a container's subviews when its layout fires
pub trait LayoutParticipant {
    fn layout_subviews(
        &mut self,
        container: ViewId,
        views: &mut dyn ViewFrames,
    ) -> Result<PassReport, LayoutError>;

    /// Told when it becomes (or stops being) a container's participant
    fn attached(&mut self, _container: Option<ViewId>) {}
}

/// Shared handle to a participant, as stored by a container
pub type Participant = Rc<RefCell<dyn LayoutParticipant>>;

/// A container's own layout behavior
pub type NativeLayout = Rc<dyn Fn(&mut ViewTree, ViewId) -> Result<(), LayoutError>>;

/// How a participant relates to the container's native layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachMode {
    /// Replaces the native layout
    #[default]
    Exclusive,
    /// Runs after the native layout
    Augmenting,
}

#[derive(Clone)]
struct Attachment {
    mode: AttachMode,
    participant: Participant,
}

struct ViewNode {
    frame: Frame,
    parent: Option<ViewId>,
    children: Vec<ViewId>,
    native: Option<NativeLayout>,
    attachment: Option<Attachment>,
}

impl ViewNode {
    fn new(frame: Frame, parent: Option<ViewId>) -> Self {
        Self {
            frame,
            parent,
            children: Vec::new(),
            native: None,
            attachment: None,
        }
    }
}

/// Everything that happened during one `ViewTree::layout` call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutReport {
    pub passes: Vec<PassReport>,
}

impl LayoutReport {
    /// Assertions applied across all passes
    pub fn applied(&self) -> usize {
        self.passes.iter().map(|p| p.applied).sum()
    }

    /// Conditions recorded for skipped assertions
    pub fn diagnostics(&self) -> impl Iterator<Item = &super::engine::Diagnostic> {
        self.passes.iter().flat_map(|p| p.skipped.iter())
    }

    pub fn pass_for(&self, container: ViewId) -> Option<&PassReport> {
        self.passes.iter().find(|p| p.container == container)
    }
}

/// Arena of views with their layout hooks
#[derive(Default)]
pub struct ViewTree {
    nodes: Vec<Option<ViewNode>>,
    in_flight: Vec<ViewId>,
    config: LayoutConfig,
}

impl ViewTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: LayoutConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Add a view with no parent
    pub fn add_root(&mut self, frame: Frame) -> ViewId {
        self.insert(ViewNode::new(frame, None))
    }

    /// Add a view as the last subview of `parent`
    pub fn add_subview(&mut self, parent: ViewId, frame: Frame) -> Result<ViewId, LayoutError> {
        if !self.contains(parent) {
            return Err(LayoutError::not_found(parent));
        }
        let id = self.insert(ViewNode::new(frame, Some(parent)));
        if let Some(node) = self.node_mut(parent) {
            node.children.push(id);
        }
        Ok(id)
    }

    fn insert(&mut self, node: ViewNode) -> ViewId {
        let id = ViewId(self.nodes.len());
        self.nodes.push(Some(node));
        id
    }

    fn node(&self, view: ViewId) -> Option<&ViewNode> {
        self.nodes.get(view.0).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, view: ViewId) -> Option<&mut ViewNode> {
        self.nodes.get_mut(view.0).and_then(Option::as_mut)
    }

    pub fn contains(&self, view: ViewId) -> bool {
        self.node(view).is_some()
    }

    pub fn frame(&self, view: ViewId) -> Option<Frame> {
        self.node(view).map(|n| n.frame)
    }

    pub fn parent(&self, view: ViewId) -> Option<ViewId> {
        self.node(view).and_then(|n| n.parent)
    }

    pub fn children(&self, view: ViewId) -> &[ViewId] {
        self.node(view).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Live views without a parent, in insertion order
    pub fn roots(&self) -> Vec<ViewId> {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(i, n)| match n {
                Some(node) if node.parent.is_none() => Some(ViewId(i)),
                _ => None,
            })
            .collect()
    }

    /// Remove a view and its whole subtree
    ///
    /// Participants attached to removed containers are notified and stop
    /// resolving. Frames they already wrote elsewhere are left as they are.
    pub fn remove(&mut self, view: ViewId) -> Result<(), LayoutError> {
        let parent = self
            .node(view)
            .ok_or(LayoutError::not_found(view))?
            .parent;
        if let Some(parent) = parent.and_then(|p| self.node_mut(p)) {
            parent.children.retain(|c| *c != view);
        }

        let mut pending = vec![view];
        while let Some(id) = pending.pop() {
            if let Some(node) = self.nodes.get_mut(id.0).and_then(Option::take) {
                pending.extend(node.children);
                if let Some(attachment) = node.attachment {
                    notify(&attachment.participant, None);
                }
            }
        }
        tracing::debug!(%view, "removed view subtree");
        Ok(())
    }

    /// Install the container's own layout behavior
    pub fn set_native_layout(
        &mut self,
        view: ViewId,
        layout: impl Fn(&mut ViewTree, ViewId) -> Result<(), LayoutError> + 'static,
    ) -> Result<(), LayoutError> {
        let node = self.node_mut(view).ok_or(LayoutError::not_found(view))?;
        node.native = Some(Rc::new(layout));
        Ok(())
    }

    /// Make `participant` the container's only layout behavior
    pub fn attach_exclusive<P>(
        &mut self,
        container: ViewId,
        participant: &Rc<RefCell<P>>,
    ) -> Result<(), LayoutError>
    where
        P: LayoutParticipant + 'static,
    {
        self.attach(container, participant.clone(), AttachMode::Exclusive)
    }

    /// Run `participant` after the container's native layout
    pub fn attach_augmenting<P>(
        &mut self,
        container: ViewId,
        participant: &Rc<RefCell<P>>,
    ) -> Result<(), LayoutError>
    where
        P: LayoutParticipant + 'static,
    {
        self.attach(container, participant.clone(), AttachMode::Augmenting)
    }

    fn attach(
        &mut self,
        container: ViewId,
        participant: Participant,
        mode: AttachMode,
    ) -> Result<(), LayoutError> {
        if !self.contains(container) {
            return Err(LayoutError::not_found(container));
        }

        // At most one container per participant
        self.release(&participant, Some(container));

        let node = self.node_mut(container).ok_or(LayoutError::not_found(container))?;
        let previous = node.attachment.replace(Attachment {
            mode,
            participant: participant.clone(),
        });
        if let Some(previous) = previous {
            if !same_participant(&previous.participant, &participant) {
                notify(&previous.participant, None);
            }
        }
        notify(&participant, Some(container));
        tracing::debug!(%container, ?mode, "attached layout participant");
        Ok(())
    }

    /// Detach a participant from whatever container holds it
    ///
    /// Returns whether it was attached.
    pub fn detach<P>(&mut self, participant: &Rc<RefCell<P>>) -> bool
    where
        P: LayoutParticipant + 'static,
    {
        let participant: Participant = participant.clone();
        let released = self.release(&participant, None);
        if released {
            notify(&participant, None);
        }
        released
    }

    /// Clear `participant` from every container except `keep`
    fn release(&mut self, participant: &Participant, keep: Option<ViewId>) -> bool {
        let mut released = false;
        for (i, slot) in self.nodes.iter_mut().enumerate() {
            let Some(node) = slot else { continue };
            if Some(ViewId(i)) == keep {
                continue;
            }
            let holds = node
                .attachment
                .as_ref()
                .is_some_and(|a| same_participant(&a.participant, participant));
            if holds {
                node.attachment = None;
                released = true;
            }
        }
        released
    }

    pub fn attach_mode(&self, container: ViewId) -> Option<AttachMode> {
        self.node(container)
            .and_then(|n| n.attachment.as_ref())
            .map(|a| a.mode)
    }

    /// Whether a container's layout pass is currently running
    pub fn is_in_flight(&self, container: ViewId) -> bool {
        self.in_flight.contains(&container)
    }

    /// Fire the layout lifecycle of `view`
    ///
    /// Runs the view's native layout and/or attached participant according to
    /// the attachment mode, then, when configured, the passes of its subviews.
    pub fn layout(&mut self, view: ViewId) -> Result<LayoutReport, LayoutError> {
        let mut report = LayoutReport::default();
        self.layout_at_depth(view, 0, &mut report)?;
        Ok(report)
    }

    /// Lay out every root view
    pub fn layout_all(&mut self) -> Result<LayoutReport, LayoutError> {
        let mut report = LayoutReport::default();
        for root in self.roots() {
            self.layout_at_depth(root, 0, &mut report)?;
        }
        Ok(report)
    }

    fn layout_at_depth(
        &mut self,
        view: ViewId,
        depth: usize,
        report: &mut LayoutReport,
    ) -> Result<(), LayoutError> {
        if depth > self.config.max_depth {
            return Err(LayoutError::DepthExceeded {
                view,
                limit: self.config.max_depth,
            });
        }
        if self.is_in_flight(view) {
            tracing::error!(container = %view, "layout pass re-entered");
            return Err(LayoutError::reentrant(view));
        }
        let node = self.node(view).ok_or(LayoutError::not_found(view))?;
        let native = node.native.clone();
        let attachment = node.attachment.clone();

        self.in_flight.push(view);
        let pass = self.run_pass(view, native, attachment);
        self.in_flight.pop();
        if let Some(pass) = pass? {
            report.passes.push(pass);
        }

        if self.config.recursive {
            for child in self.children(view).to_vec() {
                if self.contains(child) {
                    self.layout_at_depth(child, depth + 1, report)?;
                }
            }
        }
        Ok(())
    }

    fn run_pass(
        &mut self,
        view: ViewId,
        native: Option<NativeLayout>,
        attachment: Option<Attachment>,
    ) -> Result<Option<PassReport>, LayoutError> {
        let run_native = match &attachment {
            Some(a) => a.mode == AttachMode::Augmenting,
            None => true,
        };

        let mut ran_native = false;
        if run_native {
            if let Some(native) = native {
                native(self, view)?;
                ran_native = true;
            }
        }

        match attachment {
            Some(attachment) => {
                let mut participant = attachment
                    .participant
                    .try_borrow_mut()
                    .map_err(|_| LayoutError::busy(view))?;
                let mut pass = participant.layout_subviews(view, self)?;
                pass.native = ran_native;
                Ok(Some(pass))
            }
            None if ran_native => Ok(Some(PassReport {
                native: true,
                ..PassReport::new(view)
            })),
            None => Ok(None),
        }
    }
}

impl ViewFrames for ViewTree {
    fn frame(&self, view: ViewId) -> Option<Frame> {
        ViewTree::frame(self, view)
    }

    /// Resizing a container whose pass is running would re-trigger that pass,
    /// so such writes are refused.
    fn set_frame(&mut self, view: ViewId, frame: Frame) -> Result<(), LayoutError> {
        let in_flight = self.is_in_flight(view);
        let node = self.node_mut(view).ok_or(LayoutError::dangling(view))?;
        if in_flight && node.frame.size() != frame.size() {
            tracing::error!(container = %view, "resize of a container during its own pass");
            return Err(LayoutError::reentrant(view));
        }
        node.frame = frame;
        Ok(())
    }
}

fn same_participant(a: &Participant, b: &Participant) -> bool {
    std::ptr::eq(Rc::as_ptr(a) as *const (), Rc::as_ptr(b) as *const ())
}

fn notify(participant: &Participant, container: Option<ViewId>) {
    // Busy participants are mid-pass; they learn about it on their next attach
    if let Ok(mut p) = participant.try_borrow_mut() {
        p.attached(container);
    }
}

#[cfg(test)]
mod tests {
    use kurbo::Size;

    use super::*;
    use crate::layout::engine::LayoutEngine;

    fn rect(x: f64, y: f64, w: f64, h: f64) -> Frame {
        Frame::new(x, y, w, h)
    }

    #[test]
    fn test_add_and_remove_views() {
        let mut tree = ViewTree::new();
        let root = tree.add_root(rect(0.0, 0.0, 100.0, 100.0));
        let a = tree.add_subview(root, rect(0.0, 0.0, 10.0, 10.0)).unwrap();
        let b = tree.add_subview(a, rect(0.0, 0.0, 5.0, 5.0)).unwrap();

        assert_eq!(tree.children(root), &[a]);
        assert_eq!(tree.parent(b), Some(a));

        tree.remove(a).unwrap();
        assert!(!tree.contains(a));
        assert!(!tree.contains(b));
        assert!(tree.children(root).is_empty());
        assert_eq!(tree.remove(a), Err(LayoutError::not_found(a)));
    }

    #[test]
    fn test_ids_are_not_reused() {
        let mut tree = ViewTree::new();
        let a = tree.add_root(rect(0.0, 0.0, 1.0, 1.0));
        tree.remove(a).unwrap();
        let b = tree.add_root(rect(0.0, 0.0, 1.0, 1.0));
        assert_ne!(a, b);
        assert_eq!(tree.frame(a), None);
    }

    #[test]
    fn test_add_subview_to_missing_parent() {
        let mut tree = ViewTree::new();
        let ghost = ViewId::from_raw(3);
        assert_eq!(
            tree.add_subview(ghost, rect(0.0, 0.0, 1.0, 1.0)),
            Err(LayoutError::not_found(ghost))
        );
    }

    #[test]
    fn test_native_layout_runs_recursively() {
        let mut tree = ViewTree::new();
        let root = tree.add_root(rect(0.0, 0.0, 100.0, 100.0));
        let inner = tree.add_subview(root, rect(0.0, 0.0, 50.0, 50.0)).unwrap();
        let leaf = tree.add_subview(inner, rect(0.0, 0.0, 10.0, 10.0)).unwrap();

        tree.set_native_layout(inner, move |tree, _| {
            tree.set_frame(leaf, rect(5.0, 5.0, 10.0, 10.0))
        })
        .unwrap();

        let report = tree.layout(root).unwrap();
        assert_eq!(tree.frame(leaf), Some(rect(5.0, 5.0, 10.0, 10.0)));
        assert_eq!(report.passes.len(), 1);
        assert!(report.passes[0].native);
        assert_eq!(report.passes[0].container, inner);
    }

    #[test]
    fn test_non_recursive_layout_stops_at_view() {
        let mut tree = ViewTree::with_config(LayoutConfig::default().with_recursive(false));
        let root = tree.add_root(rect(0.0, 0.0, 100.0, 100.0));
        let inner = tree.add_subview(root, rect(0.0, 0.0, 50.0, 50.0)).unwrap();
        tree.set_native_layout(inner, |tree, view| {
            tree.set_frame(view, rect(1.0, 1.0, 50.0, 50.0))
        })
        .unwrap();

        let report = tree.layout(root).unwrap();
        assert!(report.passes.is_empty());
        assert_eq!(tree.frame(inner), Some(rect(0.0, 0.0, 50.0, 50.0)));
    }

    #[test]
    fn test_depth_limit() {
        let mut tree = ViewTree::with_config(LayoutConfig::default().with_max_depth(1));
        let root = tree.add_root(rect(0.0, 0.0, 100.0, 100.0));
        let a = tree.add_subview(root, rect(0.0, 0.0, 10.0, 10.0)).unwrap();
        let b = tree.add_subview(a, rect(0.0, 0.0, 10.0, 10.0)).unwrap();

        assert_eq!(
            tree.layout(root),
            Err(LayoutError::DepthExceeded { view: b, limit: 1 })
        );
    }

    #[test]
    fn test_native_resizing_own_container_is_reentrant() {
        let mut tree = ViewTree::new();
        let root = tree.add_root(rect(0.0, 0.0, 100.0, 100.0));
        tree.set_native_layout(root, |tree, view| {
            tree.set_frame(view, rect(0.0, 0.0, 200.0, 200.0))
        })
        .unwrap();

        assert_eq!(tree.layout(root), Err(LayoutError::reentrant(root)));
        assert_eq!(tree.frame(root), Some(rect(0.0, 0.0, 100.0, 100.0)));
        assert!(!tree.is_in_flight(root));
    }

    #[test]
    fn test_nested_layout_call_is_reentrant() {
        let mut tree = ViewTree::new();
        let root = tree.add_root(rect(0.0, 0.0, 100.0, 100.0));
        tree.set_native_layout(root, |tree, view| tree.layout(view).map(|_| ()))
            .unwrap();

        assert_eq!(tree.layout(root), Err(LayoutError::reentrant(root)));
    }

    #[test]
    fn test_moving_in_flight_container_is_allowed() {
        let mut tree = ViewTree::new();
        let root = tree.add_root(rect(0.0, 0.0, 100.0, 100.0));
        tree.set_native_layout(root, |tree, view| {
            tree.set_frame(view, rect(10.0, 10.0, 100.0, 100.0))
        })
        .unwrap();

        tree.layout(root).unwrap();
        assert_eq!(tree.frame(root), Some(rect(10.0, 10.0, 100.0, 100.0)));
    }

    #[test]
    fn test_fractional_move_of_attached_container() {
        let mut tree = ViewTree::new();
        let root = tree.add_root(rect(0.0, 0.0, 0.3, 0.2));
        let child = tree.add_subview(root, rect(0.0, 0.0, 0.1, 0.1)).unwrap();

        let mut engine = LayoutEngine::new();
        engine
            .fix_top(root, 0.1)
            .fix_right(root, 0.7)
            .fix_left(child, 0.2);
        let engine = engine.shared();
        tree.attach_exclusive(root, &engine).unwrap();

        let report = tree.layout(root).unwrap();
        assert_eq!(report.applied(), 3);
        let frame = tree.frame(root).unwrap();
        assert_eq!(frame.size(), Size::new(0.3, 0.2));
        assert_eq!(frame.y, 0.1);
        assert_eq!(tree.frame(child).unwrap().x, 0.2);
    }

    #[test]
    fn test_borrowed_participant_fails_the_pass() {
        let mut tree = ViewTree::new();
        let root = tree.add_root(rect(0.0, 0.0, 100.0, 100.0));
        let engine = LayoutEngine::new().shared();
        tree.attach_exclusive(root, &engine).unwrap();

        let held = engine.borrow();
        assert_eq!(tree.layout(root), Err(LayoutError::busy(root)));
        assert!(!tree.is_in_flight(root));
        drop(held);

        assert!(tree.layout(root).is_ok());
    }
}
