// Copyright 2025 the Plinth Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Selections of drawable elements and timed attribute transitions.

use alloc::collections::BTreeMap;
use alloc::rc::Rc;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;

use crate::animator::EasingMode;

/// Computes an attribute value for the element at an index.
pub type Projector = Rc<dyn Fn(usize) -> f64>;

/// Target attribute values, by attribute name.
#[derive(Clone, Default)]
pub struct AttrToProjector {
    projectors: BTreeMap<String, Projector>,
}

impl AttrToProjector {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) the projector for `attr`.
    #[must_use]
    pub fn with(mut self, attr: &str, projector: impl Fn(usize) -> f64 + 'static) -> Self {
        self.insert(attr, projector);
        self
    }

    /// Adds (or replaces) the projector for `attr`.
    pub fn insert(&mut self, attr: &str, projector: impl Fn(usize) -> f64 + 'static) {
        self.projectors.insert(attr.to_string(), Rc::new(projector));
    }

    /// The projector for `attr`.
    #[must_use]
    pub fn get(&self, attr: &str) -> Option<&Projector> {
        self.projectors.get(attr)
    }

    /// Attribute names and projectors, ordered by name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Projector)> {
        self.projectors.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.projectors.len()
    }

    /// Returns `true` if no attributes are mapped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.projectors.is_empty()
    }
}

impl fmt::Debug for AttrToProjector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.projectors.keys()).finish()
    }
}

/// One drawable element: a bag of numeric attributes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Element {
    attrs: BTreeMap<String, f64>,
}

impl Element {
    /// Value of `attr`, if set.
    #[must_use]
    pub fn get(&self, attr: &str) -> Option<f64> {
        self.attrs.get(attr).copied()
    }

    /// Sets `attr`.
    pub fn set(&mut self, attr: &str, value: f64) {
        if let Some(slot) = self.attrs.get_mut(attr) {
            *slot = value;
        } else {
            self.attrs.insert(attr.to_string(), value);
        }
    }

    /// Attributes ordered by name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.attrs.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

/// An ordered list of elements, one per datum.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Selection {
    elements: Vec<Element>,
}

impl Selection {
    /// A selection of `len` elements with no attributes.
    #[must_use]
    pub fn with_len(len: usize) -> Self {
        Self {
            elements: alloc::vec![Element::default(); len],
        }
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Returns `true` if there are no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// The element at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Element> {
        self.elements.get(index)
    }

    /// The element at `index`, mutably.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Element> {
        self.elements.get_mut(index)
    }

    /// Value of `attr` on the element at `index`.
    #[must_use]
    pub fn attr(&self, index: usize, attr: &str) -> Option<f64> {
        self.get(index)?.get(attr)
    }

    /// All elements in order.
    #[must_use]
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }
}

/// One attribute of one element moving from `from` to `to`.
#[derive(Clone, Debug, PartialEq)]
pub struct Tween {
    /// Index of the element in the selection.
    pub element: usize,
    /// Attribute name.
    pub attr: String,
    /// Value before the tween starts.
    pub from: f64,
    /// Value once the tween ends.
    pub to: f64,
    /// Milliseconds before the tween starts.
    pub delay: f64,
    /// Milliseconds the tween runs for.
    pub duration: f64,
    /// Curve applied to progress.
    pub easing: EasingMode,
}

impl Tween {
    /// Time at which the tween reaches `to`.
    #[must_use]
    pub fn end_time(&self) -> f64 {
        self.delay + self.duration
    }

    /// Value at `t` milliseconds after the transition started.
    #[must_use]
    pub fn value_at(&self, t: f64) -> f64 {
        if t >= self.end_time() {
            return self.to;
        }
        if t < self.delay {
            return self.from;
        }
        let progress = (t - self.delay) / self.duration;
        self.from + (self.to - self.from) * self.easing.apply(progress)
    }
}

/// A set of tweens started together.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Transition {
    tweens: Vec<Tween>,
}

impl Transition {
    /// Creates a transition from its tweens.
    #[must_use]
    pub fn new(tweens: Vec<Tween>) -> Self {
        Self { tweens }
    }

    /// The tweens, in element then attribute order.
    #[must_use]
    pub fn tweens(&self) -> &[Tween] {
        &self.tweens
    }

    /// Time at which the last tween ends (0 for an empty transition).
    #[must_use]
    pub fn end_time(&self) -> f64 {
        self.tweens.iter().map(Tween::end_time).fold(0.0, f64::max)
    }

    /// Writes every tweened attribute's value at `t` into `selection`.
    pub fn sample(&self, selection: &mut Selection, t: f64) {
        for tween in &self.tweens {
            if let Some(element) = selection.get_mut(tween.element) {
                element.set(&tween.attr, tween.value_at(t));
            }
        }
    }

    /// Jumps every tween to its end value.
    pub fn finish(&self, selection: &mut Selection) {
        self.sample(selection, f64::INFINITY);
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;

    use super::*;

    fn tween(from: f64, to: f64, delay: f64, duration: f64) -> Tween {
        Tween {
            element: 0,
            attr: "x".to_string(),
            from,
            to,
            delay,
            duration,
            easing: EasingMode::Linear,
        }
    }

    #[test]
    fn tween_holds_before_delay_and_lands_after_end() {
        let t = tween(0.0, 10.0, 100.0, 200.0);
        assert_eq!(t.value_at(0.0), 0.0);
        assert_eq!(t.value_at(200.0), 5.0);
        assert_eq!(t.value_at(300.0), 10.0);
        assert_eq!(t.value_at(f64::INFINITY), 10.0);
    }

    #[test]
    fn zero_duration_jumps() {
        let t = tween(3.0, 7.0, 0.0, 0.0);
        assert_eq!(t.value_at(0.0), 7.0);
    }

    #[test]
    fn sampling_writes_into_the_selection() {
        let transition = Transition::new(vec![tween(0.0, 10.0, 0.0, 100.0)]);
        let mut selection = Selection::with_len(1);

        transition.sample(&mut selection, 50.0);
        assert_eq!(selection.attr(0, "x"), Some(5.0));

        transition.finish(&mut selection);
        assert_eq!(selection.attr(0, "x"), Some(10.0));
        assert_eq!(transition.end_time(), 100.0);
    }
}
