// Copyright 2025 the Plinth Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame-batched render scheduling.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;

use hashbrown::HashSet;

use crate::id::ComponentId;

/// When queued work gets flushed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RenderPolicy {
    /// The tree flushes at the end of the call that registered the work.
    Immediate,
    /// The host is asked for an animation frame and flushes from its callback.
    #[default]
    AnimationFrame,
    /// The host is asked for a zero-delay timer and flushes from it.
    Timeout,
}

/// Host hook asked to schedule a flush.
///
/// Called once per batch, on the first registration after a flush. The host
/// is expected to call [`ComponentTree::flush`](crate::ComponentTree::flush)
/// from its frame (or timer) callback.
pub trait FrameRequester: fmt::Debug {
    /// Requests a flush according to `policy`.
    fn request_frame(&mut self, policy: RenderPolicy);
}

/// Insertion-ordered, deduplicated set of component ids.
#[derive(Clone, Debug, Default)]
pub(crate) struct PendingSet {
    order: Vec<ComponentId>,
    members: HashSet<ComponentId>,
}

impl PendingSet {
    fn insert(&mut self, id: ComponentId) -> bool {
        if self.members.insert(id) {
            self.order.push(id);
            true
        } else {
            false
        }
    }

    fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    fn len(&self) -> usize {
        self.order.len()
    }

    fn take(&mut self) -> Vec<ComponentId> {
        self.members.clear();
        core::mem::take(&mut self.order)
    }
}

/// Work swapped out of the queues at the start of a flush.
#[derive(Debug)]
pub(crate) struct FlushBatch {
    pub(crate) layout: Vec<ComponentId>,
    pub(crate) render: Vec<ComponentId>,
}

#[derive(Debug, Default)]
struct ControllerState {
    policy: RenderPolicy,
    needs_layout: PendingSet,
    needs_render: PendingSet,
    frame_requested: bool,
    flushing: bool,
    flushes: u64,
    requester: Option<Box<dyn FrameRequester>>,
}

/// Shared handle onto the render queues.
///
/// Cloning is cheap and every clone sees the same queues, so scales and
/// widgets can hold one and register work without access to the tree.
#[derive(Clone, Default)]
pub struct RenderController {
    state: Rc<RefCell<ControllerState>>,
}

impl fmt::Debug for RenderController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("RenderController")
            .field("policy", &state.policy)
            .field("needs_layout", &state.needs_layout.len())
            .field("needs_render", &state.needs_render.len())
            .field("frame_requested", &state.frame_requested)
            .field("flushing", &state.flushing)
            .finish_non_exhaustive()
    }
}

impl RenderController {
    /// Creates a controller with `policy` and no frame requester.
    #[must_use]
    pub fn new(policy: RenderPolicy) -> Self {
        let controller = Self::default();
        controller.set_policy(policy);
        controller
    }

    /// Installs the host hook asked to schedule flushes.
    #[must_use]
    pub fn with_frame_requester(self, requester: impl FrameRequester + 'static) -> Self {
        self.set_frame_requester(requester);
        self
    }

    /// Installs the host hook asked to schedule flushes.
    pub fn set_frame_requester(&self, requester: impl FrameRequester + 'static) {
        self.state.borrow_mut().requester = Some(Box::new(requester));
    }

    /// The current policy.
    #[must_use]
    pub fn policy(&self) -> RenderPolicy {
        self.state.borrow().policy
    }

    /// Changes the policy for subsequent registrations.
    pub fn set_policy(&self, policy: RenderPolicy) {
        self.state.borrow_mut().policy = policy;
    }

    /// Queues `id` to be drawn.
    pub fn register_to_render(&self, id: ComponentId) {
        let added = self.state.borrow_mut().needs_render.insert(id);
        if added {
            log::trace!("{id:?} registered to render");
        }
        self.request_frame();
    }

    /// Queues `id` to be laid out (through its root) and drawn.
    pub fn register_to_compute_layout_and_render(&self, id: ComponentId) {
        {
            let mut state = self.state.borrow_mut();
            state.needs_layout.insert(id);
            state.needs_render.insert(id);
        }
        log::trace!("{id:?} registered to compute layout and render");
        self.request_frame();
    }

    fn request_frame(&self) {
        let (policy, requester) = {
            let mut state = self.state.borrow_mut();
            if state.frame_requested {
                return;
            }
            state.frame_requested = true;
            if state.policy == RenderPolicy::Immediate {
                return;
            }
            (state.policy, state.requester.take())
        };
        // The requester runs without a borrow held so it may call back in.
        if let Some(mut requester) = requester {
            requester.request_frame(policy);
            let mut state = self.state.borrow_mut();
            if state.requester.is_none() {
                state.requester = Some(requester);
            }
        }
    }

    /// Returns `true` if anything is queued.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        let state = self.state.borrow();
        !state.needs_layout.is_empty() || !state.needs_render.is_empty()
    }

    /// Returns `true` while a frame has been requested and not yet flushed.
    #[must_use]
    pub fn is_frame_requested(&self) -> bool {
        self.state.borrow().frame_requested
    }

    /// Returns `true` while a flush is running.
    #[must_use]
    pub fn is_flushing(&self) -> bool {
        self.state.borrow().flushing
    }

    /// Number of flushes that had work to do.
    #[must_use]
    pub fn flush_count(&self) -> u64 {
        self.state.borrow().flushes
    }

    /// Swaps the queues out. `None` when there is nothing to do.
    pub(crate) fn begin_flush(&self) -> Option<FlushBatch> {
        let mut state = self.state.borrow_mut();
        if state.flushing {
            return None;
        }
        state.frame_requested = false;
        if state.needs_layout.is_empty() && state.needs_render.is_empty() {
            return None;
        }
        state.flushing = true;
        state.flushes += 1;
        Some(FlushBatch {
            layout: state.needs_layout.take(),
            render: state.needs_render.take(),
        })
    }

    pub(crate) fn end_flush(&self) {
        self.state.borrow_mut().flushing = false;
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;

    use super::*;

    #[derive(Debug)]
    struct CountingRequester(Rc<RefCell<Vec<RenderPolicy>>>);

    impl FrameRequester for CountingRequester {
        fn request_frame(&mut self, policy: RenderPolicy) {
            self.0.borrow_mut().push(policy);
        }
    }

    fn id(idx: u32) -> ComponentId {
        ComponentId::new(idx, 0)
    }

    #[test]
    fn requests_one_frame_per_batch() {
        let requests = Rc::new(RefCell::new(vec![]));
        let controller = RenderController::new(RenderPolicy::Timeout)
            .with_frame_requester(CountingRequester(Rc::clone(&requests)));

        controller.register_to_render(id(0));
        controller.register_to_compute_layout_and_render(id(1));
        controller.register_to_render(id(0));
        assert_eq!(*requests.borrow(), vec![RenderPolicy::Timeout]);

        let batch = controller.begin_flush().unwrap();
        assert_eq!(batch.layout, vec![id(1)]);
        assert_eq!(batch.render, vec![id(0), id(1)]);
        controller.end_flush();

        controller.register_to_render(id(2));
        assert_eq!(requests.borrow().len(), 2);
    }

    #[test]
    fn registrations_during_flush_wait_for_the_next_batch() {
        let controller = RenderController::new(RenderPolicy::AnimationFrame);
        controller.register_to_render(id(0));

        let batch = controller.begin_flush().unwrap();
        assert!(controller.is_flushing());
        controller.register_to_render(id(0));
        assert!(controller.begin_flush().is_none(), "no nested flush");
        controller.end_flush();

        assert_eq!(batch.render, vec![id(0)]);
        assert!(controller.has_pending());
        assert_eq!(controller.begin_flush().map(|b| b.render), Some(vec![id(0)]));
    }

    #[test]
    fn empty_flush_is_a_no_op() {
        let controller = RenderController::default();
        assert!(controller.begin_flush().is_none());
        assert_eq!(controller.flush_count(), 0);
    }

    #[test]
    fn immediate_policy_does_not_call_the_host() {
        let requests = Rc::new(RefCell::new(vec![]));
        let controller = RenderController::new(RenderPolicy::Immediate)
            .with_frame_requester(CountingRequester(Rc::clone(&requests)));
        controller.register_to_render(id(0));
        assert!(requests.borrow().is_empty());
        assert!(controller.has_pending());
    }
}
