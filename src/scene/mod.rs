//! Scene files
//!
//! A scene is a TOML document that declares a view tree, the native layout of
//! its containers, and the anchor engines attached to them. Dynamic sources are
//! written as small arithmetic expressions over one view's geometry:
//!
//! ```toml
//! [[views]]
//! name = "root"
//! frame = [0, 0, 320, 480]
//!
//! [[views]]
//! name = "header"
//! parent = "root"
//! frame = [0, 0, 320, 44]
//!
//! [[engines]]
//! container = "root"
//!
//! [[engines.fix]]
//! view = "header"
//! anchor = "top"
//! to = "super.top + 20"
//! ```

pub mod expr;
pub mod lexer;
pub mod native;

use std::path::Path;

use indexmap::IndexMap;
use kurbo::Point;
use serde::Deserialize;
use toml::Spanned;

use crate::error::{SceneError, Span};
use crate::layout::{
    find_similar, Anchor, AnchorParseError, Assertion, AttachMode, DanglingPolicy, Dynamic, Frame,
    LayoutConfig, LayoutEngine, LayoutError, LayoutReport, Reference, SharedEngine, Source,
    ViewId, ViewTree, ANCHOR_NAMES,
};

pub use expr::{parse_expr, parse_point, Expr, ExprError, Property, Subject};
pub use native::NativeKind;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SceneFile {
    #[serde(default)]
    layout: LayoutConfig,
    #[serde(default)]
    views: Vec<ViewDecl>,
    #[serde(default)]
    engines: Vec<EngineDecl>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ViewDecl {
    name: Spanned<String>,
    #[serde(default)]
    parent: Option<Spanned<String>>,
    /// x, y, width, height
    frame: [f64; 4],
    #[serde(default)]
    native: Option<NativeKind>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct EngineDecl {
    container: Spanned<String>,
    #[serde(default)]
    mode: AttachMode,
    #[serde(default)]
    on_dangling: DanglingPolicy,
    #[serde(default)]
    fix: Vec<FixDecl>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FixDecl {
    view: Spanned<String>,
    anchor: Spanned<String>,
    #[serde(default)]
    be: Option<Spanned<LiteralDecl>>,
    #[serde(default)]
    to: Option<Spanned<String>>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(untagged)]
enum LiteralDecl {
    Scalar(f64),
    Point([f64; 2]),
}

/// A loaded scene: the view tree plus the engines attached to it
pub struct Scene {
    tree: ViewTree,
    views: IndexMap<String, ViewId>,
    engines: Vec<SharedEngine>,
}

impl Scene {
    /// Load a scene from TOML source
    pub fn parse(source: &str) -> Result<Self, SceneError> {
        let file: SceneFile = toml::from_str(source).map_err(|e| SceneError::Toml {
            message: e.message().to_string(),
            span: e.span(),
        })?;

        let mut scene = Scene {
            tree: ViewTree::with_config(file.layout),
            views: IndexMap::new(),
            engines: Vec::new(),
        };
        for decl in &file.views {
            scene.add_view(decl)?;
        }
        for decl in &file.engines {
            scene.add_engine(decl, source)?;
        }

        tracing::debug!(
            views = scene.views.len(),
            engines = scene.engines.len(),
            "loaded scene"
        );
        Ok(scene)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SceneError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| SceneError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&source)
    }

    pub fn tree(&self) -> &ViewTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut ViewTree {
        &mut self.tree
    }

    pub fn view(&self, name: &str) -> Option<ViewId> {
        self.views.get(name).copied()
    }

    /// Declared name of a view
    pub fn name_of(&self, view: ViewId) -> Option<&str> {
        self.views
            .iter()
            .find(|(_, id)| **id == view)
            .map(|(name, _)| name.as_str())
    }

    pub fn frame(&self, name: &str) -> Option<Frame> {
        self.view(name).and_then(|id| self.tree.frame(id))
    }

    /// Engines in declaration order, including superseded ones
    pub fn engines(&self) -> &[SharedEngine] {
        &self.engines
    }

    /// Run one layout pass over every root view
    pub fn layout(&mut self) -> Result<LayoutReport, LayoutError> {
        self.tree.layout_all()
    }

    /// Remove a view and its subtree. Returns whether it was present.
    pub fn remove(&mut self, name: &str) -> bool {
        match self.view(name) {
            Some(id) => self.tree.remove(id).is_ok(),
            None => false,
        }
    }

    /// Frames of live views in declaration order
    pub fn frames(&self) -> Vec<(&str, Frame)> {
        self.views
            .iter()
            .filter_map(|(name, id)| self.tree.frame(*id).map(|f| (name.as_str(), f)))
            .collect()
    }

    fn add_view(&mut self, decl: &ViewDecl) -> Result<(), SceneError> {
        let name = decl.name.get_ref();
        if self.views.contains_key(name) {
            return Err(SceneError::DuplicateView {
                name: name.clone(),
                span: decl.name.span(),
            });
        }

        let [x, y, width, height] = decl.frame;
        let frame = Frame::new(x, y, width, height);
        let id = match &decl.parent {
            Some(parent) => {
                let parent = self.lookup(parent.get_ref(), parent.span())?;
                self.tree.add_subview(parent, frame)?
            }
            None => self.tree.add_root(frame),
        };
        if let Some(native) = decl.native {
            native.install(&mut self.tree, id)?;
        }

        self.views.insert(name.clone(), id);
        Ok(())
    }

    fn add_engine(&mut self, decl: &EngineDecl, source: &str) -> Result<(), SceneError> {
        let container = self.lookup(decl.container.get_ref(), decl.container.span())?;

        let mut engine = LayoutEngine::new();
        engine.on_dangling(decl.on_dangling);
        for fix in &decl.fix {
            engine.push(self.compile_fix(fix, source)?);
        }

        let engine = engine.shared();
        match decl.mode {
            AttachMode::Exclusive => self.tree.attach_exclusive(container, &engine)?,
            AttachMode::Augmenting => self.tree.attach_augmenting(container, &engine)?,
        }
        self.engines.push(engine);
        Ok(())
    }

    fn lookup(&self, name: &str, span: Span) -> Result<ViewId, SceneError> {
        self.view(name).ok_or_else(|| SceneError::UnknownView {
            name: name.to_string(),
            span,
            suggestions: find_similar(self.views.keys().map(String::as_str), name, 2),
        })
    }

    fn compile_fix(&self, fix: &FixDecl, source: &str) -> Result<Assertion, SceneError> {
        let target = self.lookup(fix.view.get_ref(), fix.view.span())?;
        let anchor_span = fix.anchor.span();
        let anchor: Anchor = fix.anchor.get_ref().parse().map_err(|e| match e {
            AnchorParseError::Unknown(name) => SceneError::UnknownAnchor {
                suggestions: find_similar(ANCHOR_NAMES, &name, 2),
                name,
                span: anchor_span.clone(),
            },
            AnchorParseError::Invalid(error) => SceneError::InvalidAnchor {
                span: anchor_span.clone(),
                error,
            },
        })?;

        match (&fix.be, &fix.to) {
            (Some(literal), None) => match (anchor, *literal.get_ref()) {
                (Anchor::Baseline(baseline), LiteralDecl::Scalar(value)) => {
                    Ok(Assertion::baseline(target, baseline, value))
                }
                (Anchor::Basepoint(basepoint), LiteralDecl::Point([x, y])) => {
                    Ok(Assertion::basepoint(target, basepoint, (x, y)))
                }
                (Anchor::Baseline(_), _) => Err(SceneError::InvalidFix {
                    span: literal.span(),
                    reason: format!("baseline '{}' takes a single number", anchor),
                }),
                (Anchor::Basepoint(_), _) => Err(SceneError::InvalidFix {
                    span: literal.span(),
                    reason: format!("basepoint '{}' takes an [x, y] pair", anchor),
                }),
            },
            (None, Some(to)) => self.compile_expression(target, anchor, to, source),
            (Some(_), Some(_)) => Err(SceneError::InvalidFix {
                span: anchor_span,
                reason: "set either `be` or `to`, not both".to_string(),
            }),
            (None, None) => Err(SceneError::InvalidFix {
                span: anchor_span,
                reason: "needs a `be` literal or a `to` expression".to_string(),
            }),
        }
    }

    fn compile_expression(
        &self,
        target: ViewId,
        anchor: Anchor,
        to: &Spanned<String>,
        source: &str,
    ) -> Result<Assertion, SceneError> {
        let spans = SpanMap::new(source, to);
        let text = to.get_ref();

        match anchor {
            Anchor::Baseline(baseline) => {
                let expr = parse_expr(text).map_err(|errs| expression_error(errs, &spans))?;
                let value = match expr.constant() {
                    Some(value) => Source::Literal(value),
                    None => {
                        let reference = self.reference(&[&expr], &spans)?;
                        Source::Dynamic(Dynamic::new(reference, move |geometry| {
                            expr.eval(geometry)
                        }))
                    }
                };
                Ok(Assertion::baseline(target, baseline, value))
            }
            Anchor::Basepoint(basepoint) => {
                let (x, y) = parse_point(text).map_err(|errs| expression_error(errs, &spans))?;
                let value = match (x.constant(), y.constant()) {
                    (Some(x), Some(y)) => Source::Literal(Point::new(x, y)),
                    _ => {
                        let reference = self.reference(&[&x, &y], &spans)?;
                        Source::Dynamic(Dynamic::new(reference, move |geometry| {
                            Point::new(x.eval(geometry), y.eval(geometry))
                        }))
                    }
                };
                Ok(Assertion::basepoint(target, basepoint, value))
            }
        }
    }

    /// The single reference shared by every property read
    fn reference(&self, exprs: &[&Expr], spans: &SpanMap) -> Result<Reference, SceneError> {
        let refs: Vec<(&Subject, &Span)> = exprs.iter().flat_map(|e| e.references()).collect();
        // Constant expressions are folded before this
        let Some((first, first_span)) = refs.first().copied() else {
            return Ok(Reference::Target);
        };

        if let Some((other, span)) = refs.iter().find(|(s, _)| *s != first) {
            return Err(SceneError::MixedReferences {
                span: spans.locate(span),
                first: subject_name(first),
                second: subject_name(other),
            });
        }

        Ok(match first {
            Subject::Container => Reference::Container,
            Subject::Target => Reference::Target,
            Subject::View(name) => Reference::View(self.lookup(name, spans.locate(first_span))?),
        })
    }
}

/// Where an expression's spans land in the scene source
#[derive(Debug, Clone, PartialEq)]
enum SpanMap {
    /// The expression text sits verbatim in the source from this byte on
    Verbatim(usize),
    /// Escapes or multi-line quoting; every span maps to the whole value
    Whole(Span),
}

impl SpanMap {
    fn new(source: &str, value: &Spanned<String>) -> Self {
        let span = value.span();
        let inner = source
            .get(span.clone())
            .and_then(|raw| raw.strip_prefix(['"', '\'']))
            .and_then(|raw| raw.strip_suffix(['"', '\'']));
        match inner {
            Some(inner) if inner == value.get_ref() => SpanMap::Verbatim(span.start + 1),
            _ => SpanMap::Whole(span),
        }
    }

    fn locate(&self, span: &Span) -> Span {
        match self {
            SpanMap::Verbatim(offset) => span.start + offset..span.end + offset,
            SpanMap::Whole(whole) => whole.clone(),
        }
    }
}

fn subject_name(subject: &Subject) -> String {
    match subject {
        Subject::Container => "super".to_string(),
        Subject::Target => "self".to_string(),
        Subject::View(name) => name.clone(),
    }
}

fn expression_error(errs: Vec<ExprError>, spans: &SpanMap) -> SceneError {
    match errs.into_iter().next() {
        Some(err) => SceneError::Expression {
            span: spans.locate(&err.span),
            message: err.message,
            expected: err.expected,
        },
        None => SceneError::Expression {
            span: spans.locate(&(0..0)),
            message: "invalid expression".to_string(),
            expected: Vec::new(),
        },
    }
}
