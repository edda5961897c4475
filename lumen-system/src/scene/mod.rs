//! The scene-graph arena.
//!
//! Actors live in an arena and refer to each other by [`ActorId`]; parent
//! and child links are indices, never owning pointers, so reparenting an
//! actor between logical groups is a cheap index move and a "weak" reference
//! (such as remembering the loading image's original parent) is a plain
//! `Option<ActorId>`.
//!
//! Actors are created when the compositor registers a mapped window and
//! destroyed when it is withdrawn; the render manager only reparents,
//! restacks and shows/hides them. A destroyed actor's id stops resolving,
//! so holders of stale ids observe `None` rather than touching a recycled
//! slot's previous occupant.
//!
//! Child lists are kept bottom-to-top, matching the window manager's stack
//! direction.

use lumen_core::types::{Point, Rect};

/// Identifies an actor in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActorId {
    index: u32,
    generation: u32,
}

/// A node in the scene graph.
#[derive(Debug)]
pub struct Actor {
    name: String,
    generation: u32,
    parent: Option<ActorId>,
    children: Vec<ActorId>,
    /// Screen-coordinate geometry.
    pub geometry: Rect,
    visible: bool,
    /// 0 (transparent) to 255 (opaque).
    pub opacity: u8,
    pub scale: (f32, f32),
    /// Anchor point subtracted from the position when drawing; moving it
    /// makes scaling appear centred.
    pub anchor: Point<f32>,
    /// Whether the actor accepts pointer events.
    pub reactive: bool,
    /// Refcount pinning the actor alive past destruction (hibernation).
    pins: u32,
    /// Destruction was requested while pinned.
    doomed: bool,
}

impl Actor {
    fn new(name: String, generation: u32) -> Self {
        Actor {
            name,
            generation,
            parent: None,
            children: Vec::new(),
            geometry: Rect::default(),
            visible: true,
            opacity: 255,
            scale: (1.0, 1.0),
            anchor: Point::new(0.0, 0.0),
            reactive: false,
            pins: 0,
            doomed: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn parent(&self) -> Option<ActorId> {
        self.parent
    }
}

/// The actor arena plus the distinguished stage root.
pub struct SceneGraph {
    slots: Vec<Option<Actor>>,
    free: Vec<u32>,
    next_generation: u32,
    stage: ActorId,
}

impl SceneGraph {
    /// Create an arena containing only the stage root.
    pub fn new() -> Self {
        let mut graph = SceneGraph {
            slots: Vec::new(),
            free: Vec::new(),
            next_generation: 0,
            stage: ActorId {
                index: 0,
                generation: 0,
            },
        };
        graph.stage = graph.create_actor("stage");
        graph
    }

    /// The stage root. Always valid.
    pub fn stage(&self) -> ActorId {
        self.stage
    }

    /// Allocate a new, unparented, visible actor.
    pub fn create_actor(&mut self, name: impl Into<String>) -> ActorId {
        let generation = self.next_generation;
        self.next_generation += 1;
        let actor = Actor::new(name.into(), generation);
        let index = match self.free.pop() {
            Some(index) => {
                self.slots[index as usize] = Some(actor);
                index
            }
            None => {
                self.slots.push(Some(actor));
                (self.slots.len() - 1) as u32
            }
        };
        ActorId { index, generation }
    }

    /// Destroy an actor, detaching it from its parent and orphaning its
    /// children. A pinned actor is hidden and orphaned but stays in the
    /// arena until the last pin is released.
    pub fn destroy_actor(&mut self, id: ActorId) {
        if self.get(id).is_none() {
            return;
        }
        self.detach(id);
        let children = self.get(id).map(|a| a.children.clone()).unwrap_or_default();
        for child in children {
            if let Some(actor) = self.get_mut(child) {
                actor.parent = None;
            }
        }
        if let Some(actor) = self.get_mut(id) {
            actor.children.clear();
            if actor.pins > 0 {
                actor.doomed = true;
                actor.visible = false;
                return;
            }
        }
        self.release_slot(id);
    }

    /// Pin the actor so a destroy request keeps it in the arena.
    pub fn pin(&mut self, id: ActorId) {
        if let Some(actor) = self.get_mut(id) {
            actor.pins += 1;
        }
    }

    /// Release one pin; frees the slot if destruction was pending.
    pub fn unpin(&mut self, id: ActorId) {
        let Some(actor) = self.get_mut(id) else {
            return;
        };
        actor.pins = actor.pins.saturating_sub(1);
        if actor.pins == 0 && actor.doomed {
            self.release_slot(id);
        }
    }

    fn release_slot(&mut self, id: ActorId) {
        self.slots[id.index as usize] = None;
        self.free.push(id.index);
    }

    pub fn get(&self, id: ActorId) -> Option<&Actor> {
        self.slots
            .get(id.index as usize)?
            .as_ref()
            .filter(|a| a.generation == id.generation)
    }

    pub fn get_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        self.slots
            .get_mut(id.index as usize)?
            .as_mut()
            .filter(|a| a.generation == id.generation)
    }

    pub fn contains(&self, id: ActorId) -> bool {
        self.get(id).is_some()
    }

    pub fn parent(&self, id: ActorId) -> Option<ActorId> {
        self.get(id)?.parent
    }

    /// Children of `id`, bottom-to-top. Missing actors yield an empty list.
    pub fn children(&self, id: ActorId) -> &[ActorId] {
        self.get(id).map(|a| a.children.as_slice()).unwrap_or(&[])
    }

    /// Detach `id` from its parent without destroying it.
    pub fn unparent(&mut self, id: ActorId) {
        self.detach(id);
    }

    fn detach(&mut self, id: ActorId) {
        if let Some(parent) = self.parent(id) {
            if let Some(actor) = self.get_mut(parent) {
                actor.children.retain(|c| *c != id);
            }
        }
        if let Some(actor) = self.get_mut(id) {
            actor.parent = None;
        }
    }

    /// Move `id` under `new_parent`, on top of its existing children.
    ///
    /// A no-op if the actor is already a child of `new_parent`, or if either
    /// end no longer exists, or if the move would create a cycle.
    pub fn reparent(&mut self, id: ActorId, new_parent: ActorId) {
        if !self.contains(id) || !self.contains(new_parent) || id == new_parent {
            return;
        }
        if self.parent(id) == Some(new_parent) {
            return;
        }
        // Walk up from the prospective parent; adopting an ancestor of
        // yourself would detach the subtree from the stage.
        let mut cursor = Some(new_parent);
        while let Some(c) = cursor {
            if c == id {
                tracing::warn!(
                    actor = self.get(id).map(|a| a.name.clone()).unwrap_or_default(),
                    "refusing reparent that would create a cycle"
                );
                return;
            }
            cursor = self.parent(c);
        }
        self.detach(id);
        if let Some(actor) = self.get_mut(new_parent) {
            actor.children.push(id);
        }
        if let Some(actor) = self.get_mut(id) {
            actor.parent = Some(new_parent);
        }
    }

    /// Move `id` to the top of its siblings.
    pub fn raise_top(&mut self, id: ActorId) {
        let Some(parent) = self.parent(id) else {
            return;
        };
        if let Some(actor) = self.get_mut(parent) {
            actor.children.retain(|c| *c != id);
            actor.children.push(id);
        }
    }

    /// Move `id` to the bottom of its siblings.
    pub fn lower_bottom(&mut self, id: ActorId) {
        let Some(parent) = self.parent(id) else {
            return;
        };
        if let Some(actor) = self.get_mut(parent) {
            actor.children.retain(|c| *c != id);
            actor.children.insert(0, id);
        }
    }

    /// Place `id` directly below `sibling` within their shared parent.
    pub fn lower_below(&mut self, id: ActorId, sibling: ActorId) {
        let Some(parent) = self.parent(id) else {
            return;
        };
        if self.parent(sibling) != Some(parent) {
            return;
        }
        if let Some(actor) = self.get_mut(parent) {
            actor.children.retain(|c| *c != id);
            let at = actor
                .children
                .iter()
                .position(|c| *c == sibling)
                .unwrap_or(0);
            actor.children.insert(at, id);
        }
    }

    pub fn show(&mut self, id: ActorId) {
        if let Some(actor) = self.get_mut(id) {
            actor.visible = true;
        }
    }

    pub fn hide(&mut self, id: ActorId) {
        if let Some(actor) = self.get_mut(id) {
            actor.visible = false;
        }
    }

    pub fn is_visible(&self, id: ActorId) -> bool {
        self.get(id).map(|a| a.visible).unwrap_or(false)
    }

    /// Whether `id` and every ancestor below `ignore` are visible.
    ///
    /// `ignore` (normally the stage, which is hidden while the display is
    /// off or rotating) terminates the walk without being consulted. An
    /// actor whose chain never reaches `ignore` is detached and counts as
    /// invisible.
    pub fn tree_visible(&self, id: ActorId, ignore: ActorId) -> bool {
        let mut cursor = id;
        let mut hops = 0;
        while cursor != ignore {
            let Some(actor) = self.get(cursor) else {
                return false;
            };
            if !actor.visible {
                return false;
            }
            match actor.parent {
                Some(parent) => cursor = parent,
                None => return false,
            }
            hops += 1;
            if hops > self.slots.len() {
                // Cycles cannot be constructed through reparent(); a broken
                // id chain still must not hang the shell.
                return false;
            }
        }
        true
    }

    pub fn set_geometry(&mut self, id: ActorId, geometry: Rect) {
        if let Some(actor) = self.get_mut(id) {
            actor.geometry = geometry;
        }
    }

    pub fn geometry(&self, id: ActorId) -> Rect {
        self.get(id).map(|a| a.geometry).unwrap_or_default()
    }

    pub fn set_position(&mut self, id: ActorId, x: i32, y: i32) {
        if let Some(actor) = self.get_mut(id) {
            actor.geometry.x = x;
            actor.geometry.y = y;
        }
    }

    pub fn set_size(&mut self, id: ActorId, width: i32, height: i32) {
        if let Some(actor) = self.get_mut(id) {
            actor.geometry.width = width;
            actor.geometry.height = height;
        }
    }

    pub fn set_opacity(&mut self, id: ActorId, opacity: u8) {
        if let Some(actor) = self.get_mut(id) {
            actor.opacity = opacity;
        }
    }

    pub fn set_scale(&mut self, id: ActorId, sx: f32, sy: f32) {
        if let Some(actor) = self.get_mut(id) {
            actor.scale = (sx, sy);
        }
    }

    pub fn set_anchor(&mut self, id: ActorId, anchor: Point<f32>) {
        if let Some(actor) = self.get_mut(id) {
            actor.anchor = anchor;
        }
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn graph_with_two() -> (SceneGraph, ActorId, ActorId) {
        let mut g = SceneGraph::new();
        let a = g.create_actor("a");
        let b = g.create_actor("b");
        let stage = g.stage();
        g.reparent(a, stage);
        g.reparent(b, stage);
        (g, a, b)
    }

    #[test]
    fn reparent_appends_on_top() {
        let (g, a, b) = graph_with_two();
        assert_eq!(g.children(g.stage()), &[a, b]);
        assert_eq!(g.parent(a), Some(g.stage()));
    }

    #[test]
    fn raise_and_lower_reorder_siblings() {
        let (mut g, a, b) = graph_with_two();
        g.raise_top(a);
        assert_eq!(g.children(g.stage()), &[b, a]);
        g.lower_bottom(a);
        assert_eq!(g.children(g.stage()), &[a, b]);
    }

    #[test]
    fn lower_below_places_directly_under_sibling() {
        let (mut g, a, b) = graph_with_two();
        let c = g.create_actor("c");
        g.reparent(c, g.stage());
        g.lower_below(c, b);
        assert_eq!(g.children(g.stage()), &[a, c, b]);
    }

    #[test]
    fn destroyed_id_stops_resolving_even_after_slot_reuse() {
        let mut g = SceneGraph::new();
        let a = g.create_actor("a");
        g.destroy_actor(a);
        let b = g.create_actor("b");
        // Slot is recycled but the stale id must not alias the new actor.
        assert!(g.get(a).is_none());
        assert_eq!(g.get(b).unwrap().name(), "b");
    }

    #[test]
    fn destroy_detaches_and_orphans_children() {
        let (mut g, a, _b) = graph_with_two();
        let child = g.create_actor("child");
        g.reparent(child, a);
        g.destroy_actor(a);
        assert!(g.children(g.stage()).iter().all(|c| *c != a));
        assert_eq!(g.parent(child), None);
        assert!(!g.tree_visible(child, g.stage()));
    }

    #[test]
    fn pinned_actor_survives_destroy_until_unpin() {
        let mut g = SceneGraph::new();
        let a = g.create_actor("hibernating");
        g.pin(a);
        g.destroy_actor(a);
        assert!(g.contains(a));
        assert!(!g.is_visible(a));
        g.unpin(a);
        assert!(!g.contains(a));
    }

    #[test]
    fn tree_visibility_requires_every_ancestor() {
        let mut g = SceneGraph::new();
        let group = g.create_actor("group");
        let leaf = g.create_actor("leaf");
        g.reparent(group, g.stage());
        g.reparent(leaf, group);
        assert!(g.tree_visible(leaf, g.stage()));
        g.hide(group);
        assert!(!g.tree_visible(leaf, g.stage()));
        // The ignored root's own visibility is not consulted.
        g.show(group);
        g.hide(g.stage());
        assert!(g.tree_visible(leaf, g.stage()));
    }

    #[test]
    fn reparent_refuses_cycles() {
        let mut g = SceneGraph::new();
        let a = g.create_actor("a");
        let b = g.create_actor("b");
        g.reparent(a, g.stage());
        g.reparent(b, a);
        g.reparent(a, b);
        assert_eq!(g.parent(a), Some(g.stage()));
    }
}
