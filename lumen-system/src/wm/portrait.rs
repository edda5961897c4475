//! Per-client portrait capability flags.
//!
//! Two window properties drive rotation: *portrait-supported* (the client
//! renders usably at 90 degrees) and *portrait-requested* (0 = no request,
//! 1 = soft request honored when no visible client dissents, 2 or more =
//! demand). A client without its own property inherits the value from the
//! client it is transient for; inherited values are cached and the cache is
//! invalidated wholesale by bumping a generation counter whenever any
//! portrait property or the stack changes.

use super::{ClientId, ClientStack};

/// The raw and cached portrait flags of one client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortraitFlags {
    /// Last known supported value (own or inherited).
    pub supported: bool,
    /// `supported` comes from the transient parent, not the client.
    pub supported_inherited: bool,
    /// Last known requested value (own or inherited).
    pub requested: u32,
    /// `requested` comes from the transient parent, not the client.
    pub requested_inherited: bool,
    /// Generation at which the inherited values were last computed.
    pub stamp: u64,
}

/// A soft request; honored unless a visible client dissents.
pub const REQUEST_SOFT: u32 = 1;
/// A demand; the client promises to cover the screen, so dissenters do not
/// matter.
pub const REQUEST_DEMAND: u32 = 2;

impl ClientStack {
    pub(crate) fn bump_portrait_generation(&mut self) {
        self.portrait_generation += 1;
    }

    /// Record the *portrait-supported* property. `None` means the property
    /// is absent or malformed, in which case the value is inherited.
    pub fn set_portrait_supported(&mut self, id: ClientId, value: Option<i32>) {
        if let Some(client) = self.get_mut(id) {
            match value {
                Some(v) => {
                    client.portrait.supported = v > 0;
                    client.portrait.supported_inherited = false;
                }
                None => client.portrait.supported_inherited = true,
            }
        }
        self.bump_portrait_generation();
    }

    /// Record the *portrait-requested* property. `None` inherits.
    pub fn set_portrait_requested(&mut self, id: ClientId, value: Option<i32>) {
        if let Some(client) = self.get_mut(id) {
            match value {
                Some(v) => {
                    client.portrait.requested = if v > 0 { v as u32 } else { 0 };
                    client.portrait.requested_inherited = false;
                }
                None => client.portrait.requested_inherited = true,
            }
        }
        self.bump_portrait_generation();
    }

    /// The effective `(supported, requested)` pair of `id`, resolving
    /// inherited flags through the `transient_for` chain.
    ///
    /// The resolution walks at most the length of the transient chain and
    /// caches per client under the current generation, so repeated queries
    /// within one scan are cheap.
    pub fn effective_portrait_flags(&mut self, id: ClientId) -> (bool, u32) {
        let generation = self.portrait_generation;
        self.resolve_portrait(id, generation, 0);
        self.get(id)
            .map(|c| (c.portrait.supported, c.portrait.requested))
            .unwrap_or((false, 0))
    }

    fn resolve_portrait(&mut self, id: ClientId, generation: u64, depth: usize) {
        // Transient chains are short; a runaway loop in the mirrored data
        // must not hang the shell.
        if depth > 32 {
            return;
        }
        let Some(client) = self.get(id) else {
            return;
        };
        let flags = client.portrait.clone();
        if (!flags.supported_inherited && !flags.requested_inherited) || flags.stamp == generation {
            return;
        }

        if !flags.requested_inherited && flags.requested > 0 && flags.supported_inherited {
            // A client that requests portrait without stating support is
            // taken to support it.
            if let Some(c) = self.get_mut(id) {
                c.portrait.supported = true;
                c.portrait.stamp = generation;
            }
            return;
        }

        let parent = self.get(id).and_then(|c| c.transient_for);
        if let Some(parent) = parent {
            self.resolve_portrait(parent, generation, depth + 1);
            let parent_flags = self.get(parent).map(|c| c.portrait.clone());
            if let (Some(pf), Some(c)) = (parent_flags, self.get_mut(id)) {
                if c.portrait.supported_inherited {
                    c.portrait.supported = pf.supported;
                }
                if c.portrait.requested_inherited {
                    c.portrait.requested = pf.requested;
                }
            }
        }
        if let Some(c) = self.get_mut(id) {
            c.portrait.stamp = generation;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wm::{Client, ClientKind, WindowId};

    fn stack_with_dialog_over_app() -> (ClientStack, ClientId, ClientId) {
        let mut stack = ClientStack::new();
        let app = stack.insert(Client::new(WindowId(1), ClientKind::App));
        let mut dialog = Client::new(WindowId(2), ClientKind::Dialog);
        dialog.transient_for = Some(app);
        dialog.portrait.supported_inherited = true;
        dialog.portrait.requested_inherited = true;
        let dialog = stack.insert(dialog);
        (stack, app, dialog)
    }

    #[test]
    fn dialog_inherits_from_transient_parent() {
        let (mut stack, app, dialog) = stack_with_dialog_over_app();
        stack.set_portrait_supported(app, Some(1));
        stack.set_portrait_requested(app, Some(1));
        assert_eq!(stack.effective_portrait_flags(dialog), (true, 1));
    }

    #[test]
    fn own_property_wins_over_inheritance() {
        let (mut stack, app, dialog) = stack_with_dialog_over_app();
        stack.set_portrait_supported(app, Some(1));
        stack.set_portrait_supported(dialog, Some(0));
        assert_eq!(stack.effective_portrait_flags(dialog), (false, 0));
    }

    #[test]
    fn parent_change_invalidates_the_cached_value() {
        let (mut stack, app, dialog) = stack_with_dialog_over_app();
        stack.set_portrait_supported(app, Some(1));
        assert_eq!(stack.effective_portrait_flags(dialog).0, true);
        // Mutating any portrait property bumps the generation, so the
        // dialog's cached inherited value is recomputed.
        stack.set_portrait_supported(app, Some(0));
        assert_eq!(stack.effective_portrait_flags(dialog).0, false);
    }

    #[test]
    fn requesting_implies_supporting() {
        let mut stack = ClientStack::new();
        let mut app = Client::new(WindowId(1), ClientKind::App);
        app.portrait.supported_inherited = true;
        let app = stack.insert(app);
        stack.set_portrait_requested(app, Some(REQUEST_DEMAND as i32));
        assert_eq!(stack.effective_portrait_flags(app), (true, 2));
    }

    #[test]
    fn malformed_property_falls_back_to_inheriting() {
        let (mut stack, app, dialog) = stack_with_dialog_over_app();
        stack.set_portrait_supported(app, Some(1));
        stack.set_portrait_supported(dialog, Some(1));
        // The property vanished (or had the wrong type): back to inherited.
        stack.set_portrait_supported(dialog, None);
        stack.set_portrait_supported(app, Some(0));
        assert_eq!(stack.effective_portrait_flags(dialog).0, false);
    }
}
