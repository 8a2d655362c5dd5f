//! The builder chain: nodes, parent links, stack access and selection.

use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

use chisel_kernel_mesh::MeshKernel;
use chisel_math::{Plane, Vector};
use chisel_select::IntoSelector;
use chisel_topo::{Kernel, Shape, ShapeKind};
use slotmap::{new_key_type, SlotMap};
use tracing::trace;

use crate::config::Config;
use crate::context::BuildContext;
use crate::error::{ChiselError, ChiselResult};
use crate::item::{IntoStackItems, StackItem};

new_key_type! {
    /// Key of a node in its chain's arena.
    pub struct NodeKey;
}

#[derive(Debug)]
pub(crate) struct Node {
    pub(crate) objects: Vec<StackItem>,
    pub(crate) parent: Option<NodeKey>,
    pub(crate) plane: Plane,
}

/// Arena of nodes plus the one context they share.
pub(crate) struct Chain {
    nodes: RefCell<SlotMap<NodeKey, Node>>,
    ctx: RefCell<BuildContext>,
    kernel: Rc<dyn Kernel>,
    config: Config,
}

/// A node of a builder chain.
///
/// Every fluent call returns a new node whose parent is the node it was
/// called on; the caller's stack is left alone. All nodes derived from one
/// root share a [`BuildContext`] and a geometry kernel. Handles are cheap to
/// clone; a clone refers to the same node.
///
/// ```
/// use chisel::{All, Workplane};
///
/// let part = Workplane::new("XY")?.box_(1.0, 1.0, 1.0)?;
/// assert_eq!(part.faces(">Z")?.size(), 1);
/// assert_eq!(part.faces(All)?.size(), 6);
/// # Ok::<(), chisel::ChiselError>(())
/// ```
#[derive(Clone)]
pub struct Workplane {
    pub(crate) chain: Rc<Chain>,
    pub(crate) key: NodeKey,
}

impl fmt::Debug for Workplane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let nodes = self.chain.nodes.borrow();
        let node = &nodes[self.key];
        f.debug_struct("Workplane")
            .field("key", &self.key)
            .field("objects", &node.objects.len())
            .field("parent", &node.parent)
            .field("origin", &node.plane.origin())
            .finish()
    }
}

// =============================================================================
// Construction
// =============================================================================

impl Workplane {
    /// Root node on a named plane (`"XY"`, `"XZ"`, `"front"`, ...) using the
    /// mesh kernel and default settings.
    pub fn new(plane_name: &str) -> ChiselResult<Self> {
        Ok(Self::on(Plane::named(plane_name)?))
    }

    /// Root node on `plane` with default settings.
    pub fn on(plane: Plane) -> Self {
        Self::with_config(plane, Config::default())
    }

    /// Root node on `plane`; the mesh kernel is built from `config.mesh`.
    pub fn with_config(plane: Plane, config: Config) -> Self {
        let kernel = Rc::new(MeshKernel::with_config(config.mesh));
        Self::with_kernel(plane, kernel, config)
    }

    /// Root node on `plane` driving an arbitrary kernel.
    pub fn with_kernel(plane: Plane, kernel: Rc<dyn Kernel>, config: Config) -> Self {
        let mut nodes = SlotMap::with_key();
        let key = nodes.insert(Node {
            objects: Vec::new(),
            parent: None,
            plane,
        });
        let chain = Chain {
            nodes: RefCell::new(nodes),
            ctx: RefCell::new(BuildContext::new(config.tolerance)),
            kernel,
            config,
        };
        Self {
            chain: Rc::new(chain),
            key,
        }
    }
}

// =============================================================================
// Node access
// =============================================================================

impl Workplane {
    pub(crate) fn with_node<R>(&self, f: impl FnOnce(&Node) -> R) -> R {
        let nodes = self.chain.nodes.borrow();
        f(&nodes[self.key])
    }

    /// The kernel every node of this chain uses.
    pub fn kernel(&self) -> &dyn Kernel {
        self.chain.kernel.as_ref()
    }

    /// Settings of this chain.
    pub fn config(&self) -> &Config {
        &self.chain.config
    }

    /// A snapshot of the shared build context.
    ///
    /// Later sketch calls on any node of the chain do not show up in the
    /// returned copy.
    pub fn context(&self) -> BuildContext {
        self.chain.ctx.borrow().clone()
    }

    pub(crate) fn read_context<R>(&self, f: impl FnOnce(&BuildContext) -> R) -> R {
        f(&self.chain.ctx.borrow())
    }

    pub(crate) fn update_context<R>(&self, f: impl FnOnce(&mut BuildContext) -> R) -> R {
        f(&mut self.chain.ctx.borrow_mut())
    }

    /// This node's coordinate plane.
    pub fn plane(&self) -> Plane {
        self.with_node(|n| n.plane)
    }

    /// The node this one was derived from.
    pub fn parent(&self) -> Option<Workplane> {
        self.with_node(|n| n.parent).map(|key| self.at(key))
    }

    /// Whether both handles refer to the same node.
    pub fn same_node(&self, other: &Workplane) -> bool {
        Rc::ptr_eq(&self.chain, &other.chain) && self.key == other.key
    }

    fn at(&self, key: NodeKey) -> Workplane {
        Workplane {
            chain: Rc::clone(&self.chain),
            key,
        }
    }

    /// Child node with `objects` on the stack and this node's plane.
    pub fn new_object(&self, objects: Vec<StackItem>) -> Workplane {
        self.derive(objects, self.plane())
    }

    pub(crate) fn derive(&self, objects: Vec<StackItem>, plane: Plane) -> Workplane {
        let key = self.chain.nodes.borrow_mut().insert(Node {
            objects,
            parent: Some(self.key),
            plane,
        });
        trace!(?key, parent = ?self.key, "derived node");
        self.at(key)
    }
}

// =============================================================================
// Stack
// =============================================================================

impl Workplane {
    /// Append to this node's stack in place and return this node.
    ///
    /// Accepts a shape, a point, a list of either, or another node (whose
    /// stack is appended). This is the only call that changes an existing
    /// node's stack.
    pub fn add(&self, items: impl IntoStackItems) -> Workplane {
        let items = items.into_stack_items();
        self.chain.nodes.borrow_mut()[self.key].objects.extend(items);
        self.clone()
    }

    /// First stack entry.
    pub fn val(&self) -> ChiselResult<StackItem> {
        self.with_node(|n| n.objects.first().cloned())
            .ok_or(ChiselError::EmptySelection)
    }

    /// The whole stack.
    pub fn vals(&self) -> Vec<StackItem> {
        self.with_node(|n| n.objects.clone())
    }

    /// Number of stack entries.
    pub fn size(&self) -> usize {
        self.with_node(|n| n.objects.len())
    }

    /// Child holding only the first entry.
    pub fn first(&self) -> ChiselResult<Workplane> {
        self.item(0)
    }

    /// Child holding only the last entry.
    pub fn last(&self) -> ChiselResult<Workplane> {
        let len = self.size();
        if len == 0 {
            return Err(ChiselError::EmptySelection);
        }
        self.item(len - 1)
    }

    /// Child holding only entry `index`.
    pub fn item(&self, index: usize) -> ChiselResult<Workplane> {
        let (item, len) = self.with_node(|n| (n.objects.get(index).cloned(), n.objects.len()));
        match item {
            Some(item) => Ok(self.new_object(vec![item])),
            None if len == 0 => Err(ChiselError::EmptySelection),
            None => Err(ChiselError::IndexOutOfRange { index, len }),
        }
    }

    /// One child per stack entry.
    pub fn all(&self) -> ChiselResult<Vec<Workplane>> {
        let items = self.vals();
        if items.is_empty() {
            return Err(ChiselError::EmptySelection);
        }
        Ok(items.into_iter().map(|i| self.new_object(vec![i])).collect())
    }

    /// Walk `n` parent links back.
    pub fn end(&self, n: usize) -> ChiselResult<Workplane> {
        let nodes = self.chain.nodes.borrow();
        let mut key = self.key;
        for _ in 0..n {
            key = nodes[key].parent.ok_or(ChiselError::NoParent)?;
        }
        Ok(self.at(key))
    }

    /// The node this chain started from.
    pub fn root(&self) -> Workplane {
        let nodes = self.chain.nodes.borrow();
        let mut key = self.key;
        while let Some(parent) = nodes[key].parent {
            key = parent;
        }
        self.at(key)
    }

    /// The solid this node works on: searched on the stack first, then on
    /// ancestors.
    pub fn find_solid(&self) -> Option<Shape> {
        self.find_solid_with(true, true)
    }

    /// [`Workplane::find_solid`] with explicit search scope. A solid or a
    /// compound containing solids qualifies. Ancestors are always searched
    /// stack-first.
    pub fn find_solid_with(&self, search_stack: bool, search_parents: bool) -> Option<Shape> {
        let nodes = self.chain.nodes.borrow();
        let mut key = Some(self.key);
        let mut search_stack = search_stack;
        while let Some(k) = key {
            let node = &nodes[k];
            if search_stack {
                let found = node.objects.iter().find_map(|item| match item {
                    StackItem::Shape(s) if s.has_solids() => Some(s.clone()),
                    _ => None,
                });
                if found.is_some() {
                    return found;
                }
            }
            if !search_parents {
                return None;
            }
            search_stack = true;
            key = node.parent;
        }
        None
    }

    /// Diagonal of the context solid's bounding box.
    pub fn largest_dimension(&self) -> ChiselResult<f64> {
        let solid = self.find_solid().ok_or(ChiselError::NoSolidFound)?;
        Ok(solid.bounding_box().diagonal_length())
    }

    /// Queue the edges and wires on the stack as pending sketch geometry.
    pub fn to_pending(&self) -> Workplane {
        let items = self.vals();
        self.update_context(|ctx| {
            for item in &items {
                match item {
                    StackItem::Shape(Shape::Edge(e)) => ctx.add_pending_edge(e.clone()),
                    StackItem::Shape(Shape::Wire(w)) => ctx.add_pending_wire(w.clone()),
                    _ => {}
                }
            }
        });
        self.clone()
    }
}

// =============================================================================
// Selection
// =============================================================================

impl Workplane {
    /// Child holding every distinct entity of `kind` reachable from the
    /// stack that `selector` accepts.
    ///
    /// When collecting solids, a compound made only of solids contributes
    /// itself rather than its members.
    pub fn select_objects(&self, kind: ShapeKind, selector: impl IntoSelector) -> ChiselResult<Workplane> {
        let selector = selector.into_selector_with_tolerance(self.config().selector_tolerance)?;
        let mut seen = HashSet::new();
        let mut candidates = Vec::new();
        for item in self.vals() {
            let StackItem::Shape(shape) = item else { continue };
            let found = match &shape {
                Shape::Compound(c) if kind == ShapeKind::Solid && c.is_only_solids() => shape.compounds(),
                _ => shape.collect(kind),
            };
            candidates.extend(found.into_iter().filter(|s| seen.insert(s.id())));
        }
        let selected = selector.filter(&candidates);
        trace!(%kind, candidates = candidates.len(), selected = selected.len(), "selected objects");
        Ok(self.new_object(selected.into_iter().map(StackItem::Shape).collect()))
    }

    /// Vertices of the stack, filtered.
    pub fn vertices(&self, selector: impl IntoSelector) -> ChiselResult<Workplane> {
        self.select_objects(ShapeKind::Vertex, selector)
    }

    /// Edges of the stack, filtered.
    pub fn edges(&self, selector: impl IntoSelector) -> ChiselResult<Workplane> {
        self.select_objects(ShapeKind::Edge, selector)
    }

    /// Wires of the stack, filtered.
    pub fn wires(&self, selector: impl IntoSelector) -> ChiselResult<Workplane> {
        self.select_objects(ShapeKind::Wire, selector)
    }

    /// Faces of the stack, filtered.
    pub fn faces(&self, selector: impl IntoSelector) -> ChiselResult<Workplane> {
        self.select_objects(ShapeKind::Face, selector)
    }

    /// Shells of the stack, filtered.
    pub fn shells(&self, selector: impl IntoSelector) -> ChiselResult<Workplane> {
        self.select_objects(ShapeKind::Shell, selector)
    }

    /// Solids of the stack, filtered.
    pub fn solids(&self, selector: impl IntoSelector) -> ChiselResult<Workplane> {
        self.select_objects(ShapeKind::Solid, selector)
    }

    /// Compounds of the stack, filtered.
    pub fn compounds(&self, selector: impl IntoSelector) -> ChiselResult<Workplane> {
        self.select_objects(ShapeKind::Compound, selector)
    }

    /// The stack entries themselves, filtered. Points are kept unfiltered.
    pub fn filter(&self, selector: impl IntoSelector) -> ChiselResult<Workplane> {
        let selector = selector.into_selector_with_tolerance(self.config().selector_tolerance)?;
        let (shapes, points): (Vec<StackItem>, Vec<StackItem>) =
            self.vals().into_iter().partition(|i| i.as_shape().is_some());
        let shapes: Vec<Shape> = shapes.into_iter().filter_map(|i| i.as_shape().cloned()).collect();
        let mut out: Vec<StackItem> = selector.filter(&shapes).into_iter().map(StackItem::Shape).collect();
        out.extend(points);
        Ok(self.new_object(out))
    }

    /// Centers of the stack entries, as points.
    pub fn centers(&self) -> Workplane {
        let points = self.vals().iter().map(|i| StackItem::Vector(i.center())).collect();
        self.new_object(points)
    }

    /// Current point of a sketch: the end of the last edge, the last point,
    /// or the plane origin on an empty stack.
    pub(crate) fn find_from_point(&self, use_local: bool) -> ChiselResult<Vector> {
        let (last, plane) = self.with_node(|n| (n.objects.last().cloned(), n.plane));
        let p = match last {
            None => plane.origin(),
            Some(StackItem::Vector(v)) => v,
            Some(StackItem::Shape(Shape::Edge(e))) => e.end_point(),
            Some(StackItem::Shape(other)) => return Err(ChiselError::NoCurrentPoint(other.kind().to_string())),
        };
        Ok(if use_local { plane.to_local_coords(p) } else { p })
    }
}
