//! Mock backend for testing
//!
//! Provides a [`MockBackend`] that implements [`RenderBackend`] and records
//! every call for test assertions, without requiring a GPU.

use std::cell::Cell;

use crate::backend::RenderBackend;
use crate::error::EngineError;
use crate::uniforms::ShaderUniforms;

/// Stand-in for a GPU render target.
///
/// `generation` counts how many times the target has been drawn into, which
/// stands in for its pixel contents.
#[derive(Debug)]
pub struct MockTarget {
    pub id: usize,
    pub width: u32,
    pub height: u32,
    generation: Cell<u64>,
}

impl MockTarget {
    pub fn generation(&self) -> u64 {
        self.generation.get()
    }
}

/// Record of a backend call for test inspection
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    /// A target was allocated
    Allocate { id: usize, width: u32, height: u32 },
    /// The visible surface was resized
    ResizeSurface { width: u32, height: u32 },
    /// The shader stage ran
    Feedback {
        uniforms: ShaderUniforms,
        source: usize,
        dest: usize,
    },
    /// The composite stage ran
    Composite { source: usize, generation: u64 },
}

/// A mock backend that records all calls for testing
#[derive(Debug, Default)]
pub struct MockBackend {
    /// All calls made to this backend
    pub calls: Vec<BackendCall>,
    /// Current surface size
    pub surface: (u32, u32),
    /// When set, the next composite fails with `SurfaceOutOfMemory`
    pub fail_next_composite: bool,
    next_id: usize,
}

impl MockBackend {
    /// Create a new mock backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all recorded calls
    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Get the number of recorded calls
    pub fn call_count(&self) -> usize {
        self.calls.len()
    }

    /// All recorded shader-stage calls, oldest first
    pub fn feedback_calls(&self) -> Vec<&BackendCall> {
        self.calls
            .iter()
            .filter(|c| matches!(c, BackendCall::Feedback { .. }))
            .collect()
    }

    /// Number of composites shown
    pub fn composite_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, BackendCall::Composite { .. }))
            .count()
    }

    /// The most recent call, if any
    pub fn last_call(&self) -> Option<&BackendCall> {
        self.calls.last()
    }
}

impl RenderBackend for MockBackend {
    type Target = MockTarget;

    fn allocate_target(&mut self, _label: &str, width: u32, height: u32) -> MockTarget {
        let id = self.next_id;
        self.next_id += 1;
        self.calls.push(BackendCall::Allocate { id, width, height });
        MockTarget {
            id,
            width,
            height,
            generation: Cell::new(0),
        }
    }

    fn resize_surface(&mut self, width: u32, height: u32) {
        self.surface = (width, height);
        self.calls.push(BackendCall::ResizeSurface { width, height });
    }

    fn draw_feedback(&mut self, uniforms: &ShaderUniforms, source: &MockTarget, dest: &MockTarget) {
        dest.generation.set(dest.generation.get() + 1);
        self.calls.push(BackendCall::Feedback {
            uniforms: *uniforms,
            source: source.id,
            dest: dest.id,
        });
    }

    fn draw_composite(&mut self, source: &MockTarget) -> Result<(), EngineError> {
        if std::mem::take(&mut self.fail_next_composite) {
            return Err(EngineError::SurfaceOutOfMemory);
        }
        self.calls.push(BackendCall::Composite {
            source: source.id,
            generation: source.generation(),
        });
        Ok(())
    }
}
