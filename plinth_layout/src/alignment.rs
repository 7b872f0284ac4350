// Copyright 2025 the Plinth Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Horizontal and vertical alignment of a component inside its offer.

use alloc::string::ToString;
use core::str::FromStr;

use crate::error::LayoutError;

/// Horizontal placement of a component that is narrower than its offer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum XAlignment {
    /// Flush with the left edge.
    #[default]
    Left,
    /// Centered.
    Center,
    /// Flush with the right edge.
    Right,
}

impl XAlignment {
    /// Fraction of the leftover width placed before the component.
    #[must_use]
    pub fn proportion(self) -> f64 {
        match self {
            Self::Left => 0.0,
            Self::Center => 0.5,
            Self::Right => 1.0,
        }
    }
}

impl FromStr for XAlignment {
    type Err = LayoutError;

    /// Accepts `left`/`start`, `center`, `right`/`end`, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "left" | "start" => Ok(Self::Left),
            "center" => Ok(Self::Center),
            "right" | "end" => Ok(Self::Right),
            _ => Err(LayoutError::UnsupportedAlignment(s.to_string())),
        }
    }
}

/// Vertical placement of a component that is shorter than its offer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum YAlignment {
    /// Flush with the top edge.
    #[default]
    Top,
    /// Centered.
    Center,
    /// Flush with the bottom edge.
    Bottom,
}

impl YAlignment {
    /// Fraction of the leftover height placed above the component.
    #[must_use]
    pub fn proportion(self) -> f64 {
        match self {
            Self::Top => 0.0,
            Self::Center => 0.5,
            Self::Bottom => 1.0,
        }
    }
}

impl FromStr for YAlignment {
    type Err = LayoutError;

    /// Accepts `top`/`start`, `center`, `bottom`/`end`, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "top" | "start" => Ok(Self::Top),
            "center" => Ok(Self::Center),
            "bottom" | "end" => Ok(Self::Bottom),
            _ => Err(LayoutError::UnsupportedAlignment(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("left", XAlignment::Left)]
    #[case("START", XAlignment::Left)]
    #[case("Center", XAlignment::Center)]
    #[case("right", XAlignment::Right)]
    #[case("end", XAlignment::Right)]
    fn parses_x_alignment(#[case] input: &str, #[case] expected: XAlignment) {
        assert_eq!(input.parse::<XAlignment>(), Ok(expected));
    }

    #[rstest]
    #[case("top", YAlignment::Top)]
    #[case("center", YAlignment::Center)]
    #[case("Bottom", YAlignment::Bottom)]
    #[case("end", YAlignment::Bottom)]
    fn parses_y_alignment(#[case] input: &str, #[case] expected: YAlignment) {
        assert_eq!(input.parse::<YAlignment>(), Ok(expected));
    }

    #[test]
    fn rejects_unknown_alignment() {
        assert_eq!(
            "middle".parse::<XAlignment>(),
            Err(LayoutError::UnsupportedAlignment("middle".to_string()))
        );
        assert!("left".parse::<YAlignment>().is_err(), "left is not vertical");
    }
}
