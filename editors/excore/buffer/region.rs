//
// Copyright (c) 2024 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! Character spans within a buffer.

/// A half-open span `[begin, end)` of byte offsets.
///
/// `a` is the anchor and `b` the caret; either may be the larger one, so a
/// region also describes a selection and its direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Region {
    pub a: usize,
    pub b: usize,
}

impl Region {
    /// Create a region from anchor and caret.
    pub fn new(a: usize, b: usize) -> Self {
        Self { a, b }
    }

    /// Create an empty region at `offset`.
    pub fn point(offset: usize) -> Self {
        Self::new(offset, offset)
    }

    /// Smaller of the two ends.
    pub fn begin(&self) -> usize {
        self.a.min(self.b)
    }

    /// Larger of the two ends.
    pub fn end(&self) -> usize {
        self.a.max(self.b)
    }

    /// Number of bytes covered.
    pub fn len(&self) -> usize {
        self.end() - self.begin()
    }

    /// Check if the region covers nothing.
    pub fn is_empty(&self) -> bool {
        self.a == self.b
    }

    /// Check if `offset` lies within the region, both ends included.
    pub fn contains(&self, offset: usize) -> bool {
        self.begin() <= offset && offset <= self.end()
    }
}
