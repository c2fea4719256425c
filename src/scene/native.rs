//! Built-in container layouts for scene files

use kurbo::Point;
use serde::Deserialize;

use crate::layout::{LayoutError, ViewFrames, ViewId, ViewTree};

/// A container's own layout behavior, as declared in a scene
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum NativeKind {
    /// Stack subviews top to bottom from y = 0
    Column {
        #[serde(default)]
        gap: f64,
    },
    /// Stack subviews left to right from x = 0
    Row {
        #[serde(default)]
        gap: f64,
    },
    /// Size every subview to the container bounds
    Fill,
}

impl NativeKind {
    pub fn install(self, tree: &mut ViewTree, view: ViewId) -> Result<(), LayoutError> {
        tree.set_native_layout(view, move |tree, container| self.run(tree, container))
    }

    pub fn run(&self, tree: &mut ViewTree, container: ViewId) -> Result<(), LayoutError> {
        let bounds = tree
            .frame(container)
            .ok_or(LayoutError::dangling(container))?
            .bounds();
        let children = tree.children(container).to_vec();

        let mut cursor = 0.0;
        for child in children {
            let frame = tree.frame(child).ok_or(LayoutError::dangling(child))?;
            let next = match *self {
                NativeKind::Column { gap } => {
                    let placed = frame.with_origin(Point::new(0.0, cursor));
                    cursor += frame.height + gap;
                    placed
                }
                NativeKind::Row { gap } => {
                    let placed = frame.with_origin(Point::new(cursor, 0.0));
                    cursor += frame.width + gap;
                    placed
                }
                NativeKind::Fill => bounds,
            };
            tree.set_frame(child, next)?;
        }
        tracing::trace!(%container, kind = ?self, "native layout");
        Ok(())
    }
}
