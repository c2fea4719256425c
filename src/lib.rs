//! Anchor Layout - declarative anchor constraints for view trees
//!
//! This library positions subviews by asserting that one of their anchors (an
//! edge, a center axis, or a corner) sits at a literal coordinate or at a value
//! computed from another view. An engine holding an ordered list of such
//! assertions attaches to a container and resolves them whenever that
//! container lays out.
//!
//! # Example
//!
//! ```rust
//! use anchor_layout::run;
//!
//! let out = run(r#"
//!     [[views]]
//!     name = "root"
//!     frame = [0, 0, 200, 100]
//!
//!     [[views]]
//!     name = "badge"
//!     parent = "root"
//!     frame = [0, 0, 20, 20]
//!
//!     [[engines]]
//!     container = "root"
//!
//!     [[engines.fix]]
//!     view = "badge"
//!     anchor = "top_right"
//!     to = "super.right - 4, super.top + 4"
//! "#).unwrap();
//!
//! assert!(out.contains("badge: x=176.0 y=4.0 w=20.0 h=20.0"));
//! ```

pub mod error;
pub mod layout;
pub mod scene;

pub use error::SceneError;
pub use layout::{
    Anchor, Assertion, AttachMode, Basepoint, Baseline, DanglingPolicy, Frame, LayoutConfig,
    LayoutEngine, LayoutError, LayoutParticipant, LayoutReport, PassReport, Source, ViewFrames,
    ViewId, ViewTree,
};
pub use scene::Scene;

/// Configuration for running a scene
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Number of layout passes over every root view
    pub passes: usize,
    /// Debug mode: print each pass and its skipped assertions to stderr
    pub debug: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            passes: 1,
            debug: false,
        }
    }
}

impl RunConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of layout passes
    pub fn with_passes(mut self, passes: usize) -> Self {
        self.passes = passes;
        self
    }

    /// Enable or disable debug mode
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

/// Lay out a scene with default configuration and return its frames
pub fn run(source: &str) -> Result<String, SceneError> {
    run_with_config(source, RunConfig::default())
}

/// Lay out a scene with custom configuration
///
/// # Example
///
/// ```rust
/// use anchor_layout::{run_with_config, RunConfig};
///
/// let out = run_with_config(
///     "[[views]]\nname = \"a\"\nframe = [1, 2, 3, 4]\n",
///     RunConfig::new().with_passes(0),
/// ).unwrap();
/// assert_eq!(out, "a: x=1.0 y=2.0 w=3.0 h=4.0");
/// ```
pub fn run_with_config(source: &str, config: RunConfig) -> Result<String, SceneError> {
    let mut scene = Scene::parse(source)?;

    for pass in 0..config.passes {
        let report = scene.layout()?;
        tracing::debug!(
            pass,
            applied = report.applied(),
            skipped = report.diagnostics().count(),
            "layout pass complete"
        );

        if config.debug {
            eprintln!("=== Layout Pass {} ===", pass + 1);
            eprint!("{}", format_report(&scene, &report));
            eprintln!("======================");
        }
    }

    Ok(format_frames(&scene))
}

/// One line per live view, in declaration order
pub fn format_frames(scene: &Scene) -> String {
    scene
        .frames()
        .into_iter()
        .map(|(name, frame)| {
            format!(
                "{}: x={:.1} y={:.1} w={:.1} h={:.1}",
                name, frame.x, frame.y, frame.width, frame.height
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Describe each container pass and the assertions it skipped
pub fn format_report(scene: &Scene, report: &LayoutReport) -> String {
    let name = |view: ViewId| {
        scene
            .name_of(view)
            .map(str::to_string)
            .unwrap_or_else(|| view.to_string())
    };

    let mut out = String::new();
    for pass in &report.passes {
        out.push_str(&format!(
            "[{}] native={} applied={} skipped={}\n",
            name(pass.container),
            pass.native,
            pass.applied,
            pass.skipped.len()
        ));
        for diagnostic in &pass.skipped {
            out.push_str(&format!(
                "  #{} {}: {}\n",
                diagnostic.index,
                name(diagnostic.target),
                diagnostic.error
            ));
        }
    }
    out
}
