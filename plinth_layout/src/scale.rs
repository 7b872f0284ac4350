// Copyright 2025 the Plinth Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A quantitative scale that notifies subscribers when its domain changes.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::Cell;

use crate::callbacks::{CallbackKey, CallbackSet};
use crate::id::ComponentId;
use crate::tree::ComponentTree;

/// A closed numeric interval.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Domain {
    /// Lower bound.
    pub min: f64,
    /// Upper bound.
    pub max: f64,
}

impl Domain {
    /// Creates a domain.
    #[must_use]
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// `max - min`.
    #[must_use]
    pub fn span(self) -> f64 {
        self.max - self.min
    }

    fn is_finite(self) -> bool {
        self.min.is_finite() && self.max.is_finite()
    }
}

impl Default for Domain {
    fn default() -> Self {
        Self::new(0.0, 1.0)
    }
}

/// What a subscribed component does when a scale updates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ScaleResponse {
    /// Redraw only (the component's size does not depend on the scale).
    #[default]
    Render,
    /// Relayout and redraw (e.g. an axis whose tick labels may widen).
    Relayout,
}

/// A linear mapping from a numeric domain to a numeric range.
///
/// Changing the domain fires the update callbacks; components subscribe
/// through [`ComponentTree::invalidate_on_update`].
#[derive(Debug)]
pub struct QuantitativeScale {
    domain: Domain,
    range: (f64, f64),
    padding_proportion: f64,
    padding_exceptions: Vec<f64>,
    updates: CallbackSet<Domain>,
}

impl Default for QuantitativeScale {
    fn default() -> Self {
        Self {
            domain: Domain::default(),
            range: (0.0, 1.0),
            padding_proportion: 0.05,
            padding_exceptions: Vec::new(),
            updates: CallbackSet::new(),
        }
    }
}

impl QuantitativeScale {
    /// A scale over `[0, 1]` with 5% padding.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the output range.
    #[must_use]
    pub fn with_range(mut self, range: (f64, f64)) -> Self {
        self.range = range;
        self
    }

    /// Fraction of the data extent added around auto domains, split evenly
    /// between both ends.
    #[must_use]
    pub fn with_padding_proportion(mut self, proportion: f64) -> Self {
        self.padding_proportion = if proportion.is_finite() { proportion.max(0.0) } else { 0.0 };
        self
    }

    /// The current domain.
    #[must_use]
    pub fn domain(&self) -> Domain {
        self.domain
    }

    /// The output range.
    #[must_use]
    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    /// Sets the output range without notifying subscribers.
    pub fn set_range(&mut self, range: (f64, f64)) {
        self.range = range;
    }

    /// Sets the domain and notifies subscribers.
    pub fn set_domain(&mut self, domain: Domain) {
        self.domain = domain;
        self.updates.call_callbacks(&domain);
    }

    /// Adds a value that auto domains never pad past (typically 0 for bars).
    pub fn add_padding_exception(&mut self, value: f64) {
        if !self.padding_exceptions.contains(&value) {
            self.padding_exceptions.push(value);
        }
    }

    /// Removes a padding exception.
    pub fn remove_padding_exception(&mut self, value: f64) {
        self.padding_exceptions.retain(|v| *v != value);
    }

    /// Sets the domain to the union of `extents`, padded.
    ///
    /// Non-finite extents are ignored. With no usable extent the domain is
    /// left unchanged. A single-value domain is widened by one on each side.
    pub fn auto_domain(&mut self, extents: &[Domain]) {
        let mut union: Option<Domain> = None;
        for extent in extents {
            if !extent.is_finite() {
                log::warn!("ignoring non-finite extent {extent:?}");
                continue;
            }
            let (lo, hi) = (extent.min.min(extent.max), extent.min.max(extent.max));
            union = Some(match union {
                Some(u) => Domain::new(u.min.min(lo), u.max.max(hi)),
                None => Domain::new(lo, hi),
            });
        }
        if let Some(domain) = union {
            let padded = self.pad_domain(domain);
            self.set_domain(padded);
        }
    }

    fn pad_domain(&self, domain: Domain) -> Domain {
        if domain.min == domain.max {
            return Domain::new(domain.min - 1.0, domain.max + 1.0);
        }
        let pad = domain.span() * self.padding_proportion / 2.0;
        let min = if self.padding_exceptions.contains(&domain.min) {
            domain.min
        } else {
            domain.min - pad
        };
        let max = if self.padding_exceptions.contains(&domain.max) {
            domain.max
        } else {
            domain.max + pad
        };
        Domain::new(min, max)
    }

    /// Maps a value from domain space into range space.
    #[must_use]
    pub fn scale(&self, value: f64) -> f64 {
        let (r0, r1) = self.range;
        let span = self.domain.span();
        if span == 0.0 {
            return r0;
        }
        r0 + (value - self.domain.min) / span * (r1 - r0)
    }

    /// Maps a value from range space back into domain space.
    #[must_use]
    pub fn invert(&self, value: f64) -> f64 {
        let (r0, r1) = self.range;
        if r1 == r0 {
            return self.domain.min;
        }
        self.domain.min + (value - r0) / (r1 - r0) * self.domain.span()
    }

    /// Subscribes to domain changes.
    pub fn on_update(&mut self, callback: impl FnMut(&Domain) + 'static) -> CallbackKey {
        self.updates.add(callback)
    }

    /// Subscribes to domain changes until `callback` returns `false`.
    pub fn on_update_while(
        &mut self,
        callback: impl FnMut(&Domain) -> bool + 'static,
    ) -> CallbackKey {
        self.updates.add_while(callback)
    }

    /// Number of registered update callbacks.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.updates.len()
    }

    /// Unsubscribes from domain changes.
    pub fn off_update(&mut self, key: CallbackKey) -> bool {
        self.updates.remove(key)
    }
}

impl ComponentTree {
    /// Subscribes `id` to `scale` so that every domain change queues it with
    /// the controller.
    ///
    /// Nothing is flushed from the callback; under
    /// [`RenderPolicy::Immediate`](crate::RenderPolicy::Immediate) the work
    /// runs on the next tree call or explicit flush.
    ///
    /// Once `id` is destroyed the subscription removes itself on the next
    /// update without queueing anything.
    pub fn invalidate_on_update(
        &self,
        id: ComponentId,
        scale: &mut QuantitativeScale,
        response: ScaleResponse,
    ) -> CallbackKey {
        let controller = self.controller.clone();
        let alive = self
            .node_at(id)
            .map_or_else(|| Rc::new(Cell::new(false)), |node| Rc::clone(&node.alive));
        scale.on_update_while(move |_| {
            if !alive.get() {
                return false;
            }
            match response {
                ScaleResponse::Render => controller.register_to_render(id),
                ScaleResponse::Relayout => controller.register_to_compute_layout_and_render(id),
            }
            true
        })
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::rc::Rc;
    use core::cell::RefCell;

    use super::*;

    #[test]
    fn auto_domain_pads_except_at_exceptions() {
        let mut scale = QuantitativeScale::new().with_padding_proportion(0.1);
        scale.add_padding_exception(0.0);

        scale.auto_domain(&[Domain::new(0.0, 50.0), Domain::new(20.0, 100.0)]);

        assert_eq!(scale.domain(), Domain::new(0.0, 105.0));
    }

    #[test]
    fn non_finite_extents_are_ignored() {
        let mut scale = QuantitativeScale::new().with_padding_proportion(0.0);
        scale.auto_domain(&[Domain::new(f64::NAN, 3.0), Domain::new(2.0, 4.0)]);
        assert_eq!(scale.domain(), Domain::new(2.0, 4.0));

        scale.auto_domain(&[Domain::new(f64::INFINITY, 1.0)]);
        assert_eq!(scale.domain(), Domain::new(2.0, 4.0), "unchanged");
    }

    #[test]
    fn single_value_domains_widen() {
        let mut scale = QuantitativeScale::new();
        scale.auto_domain(&[Domain::new(5.0, 5.0)]);
        assert_eq!(scale.domain(), Domain::new(4.0, 6.0));
    }

    #[test]
    fn updates_notify_until_unsubscribed() {
        let seen = Rc::new(RefCell::new(0));
        let mut scale = QuantitativeScale::new();
        let counter = Rc::clone(&seen);
        let key = scale.on_update(move |_| *counter.borrow_mut() += 1);

        scale.set_domain(Domain::new(0.0, 10.0));
        assert!(scale.off_update(key));
        scale.set_domain(Domain::new(0.0, 20.0));

        assert_eq!(*seen.borrow(), 1);
    }

    #[test]
    fn maps_between_domain_and_range() {
        let mut scale = QuantitativeScale::new().with_range((0.0, 200.0));
        scale.set_domain(Domain::new(10.0, 20.0));
        assert_eq!(scale.scale(15.0), 100.0);
        assert_eq!(scale.invert(50.0), 12.5);
    }
}
