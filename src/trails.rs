//! Per-body position history with a resizable visible window
//!
//! Samples live in one allocation of `n_bodies * max_length` slots, laid out
//! body-major so the window of a single body is at most two contiguous runs.
//! `tail` is the slot most recently written and `head` the oldest visible
//! slot; `head` is derived from `tail` and the visible count.

use crate::physics::math::Vector;
use bevy::prelude::*;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrailError {
    /// Requested window is longer than the allocated capacity
    OutOfRange { requested: usize, max_length: usize },
    /// Pushed sample does not carry one position per body
    BodyCountMismatch { expected: usize, actual: usize },
}

impl fmt::Display for TrailError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrailError::OutOfRange {
                requested,
                max_length,
            } => write!(
                f,
                "trail length {requested} exceeds maximum length {max_length}"
            ),
            TrailError::BodyCountMismatch { expected, actual } => write!(
                f,
                "trail sample has {actual} positions but the buffer tracks {expected} bodies"
            ),
        }
    }
}

impl std::error::Error for TrailError {}

#[derive(Resource, Debug, Clone, PartialEq)]
pub struct TrailBuffer {
    samples: Vec<Vector>,
    n_bodies: usize,
    max_length: usize,
    length: usize,
    tail: usize,
    visible: usize,
    filled: usize,
}

impl TrailBuffer {
    pub fn new(n_bodies: usize, length: usize, max_length: usize) -> Result<Self, TrailError> {
        if length > max_length || max_length == 0 {
            return Err(TrailError::OutOfRange {
                requested: length,
                max_length,
            });
        }

        Ok(Self {
            samples: vec![Vector::ZERO; n_bodies * max_length],
            n_bodies,
            max_length,
            length,
            tail: max_length - 1,
            visible: 0,
            filled: 0,
        })
    }

    /// Append one position per body
    pub fn push(&mut self, sample: &[Vector]) -> Result<(), TrailError> {
        if sample.len() != self.n_bodies {
            return Err(TrailError::BodyCountMismatch {
                expected: self.n_bodies,
                actual: sample.len(),
            });
        }

        self.tail = (self.tail + 1) % self.max_length;
        for (body, position) in sample.iter().enumerate() {
            self.samples[body * self.max_length + self.tail] = *position;
        }

        self.filled = (self.filled + 1).min(self.max_length);
        self.visible = (self.visible + 1).min(self.length);
        Ok(())
    }

    /// Change the visible window without touching stored samples
    ///
    /// The newest sample stays in place. Growing exposes older history up to
    /// what has been written; shrinking hides the oldest visible samples.
    pub fn resize(&mut self, new_length: usize) -> Result<(), TrailError> {
        if new_length > self.max_length {
            return Err(TrailError::OutOfRange {
                requested: new_length,
                max_length: self.max_length,
            });
        }

        self.length = new_length;
        self.visible = new_length.min(self.filled);
        Ok(())
    }

    /// Visible samples per body, oldest first
    pub fn get_tail(&self) -> Vec<Vec<Vector>> {
        (0..self.n_bodies)
            .map(|body| {
                let (older, newer) = self.window_slices(body);
                let mut window = Vec::with_capacity(self.visible);
                window.extend_from_slice(older);
                window.extend_from_slice(newer);
                window
            })
            .collect()
    }

    /// Visible window of one body as two borrowed runs, oldest first
    ///
    /// The second run is empty unless the window wraps around the end of
    /// the storage.
    ///
    /// # Panics
    ///
    /// Panics if `body` is out of range.
    pub fn window_slices(&self, body: usize) -> (&[Vector], &[Vector]) {
        assert!(body < self.n_bodies, "body index {body} out of range");

        let row = &self.samples[body * self.max_length..(body + 1) * self.max_length];
        if self.visible == 0 {
            return (&[], &[]);
        }

        let head = self.head();
        if head <= self.tail {
            (&row[head..=self.tail], &[])
        } else {
            (&row[head..], &row[..=self.tail])
        }
    }

    /// Forget all history, keeping capacity and window length
    pub fn clear(&mut self) {
        self.samples.fill(Vector::ZERO);
        self.tail = self.max_length - 1;
        self.visible = 0;
        self.filled = 0;
    }

    /// Slot of the oldest visible sample
    #[inline]
    pub fn head(&self) -> usize {
        (self.tail + 1 + self.max_length - self.visible) % self.max_length
    }

    /// Slot of the newest sample
    #[inline]
    pub fn tail(&self) -> usize {
        self.tail
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.visible
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.visible == 0
    }

    /// Requested window length; `len()` is smaller until enough samples exist
    #[inline]
    pub fn length(&self) -> usize {
        self.length
    }

    #[inline]
    pub fn max_length(&self) -> usize {
        self.max_length
    }

    #[inline]
    pub fn n_bodies(&self) -> usize {
        self.n_bodies
    }

    /// Samples written so far, saturating at `max_length`
    #[inline]
    pub fn filled(&self) -> usize {
        self.filled
    }

    /// Whether every slot has been written at least once
    #[inline]
    pub fn is_full(&self) -> bool {
        self.filled == self.max_length
    }
}
