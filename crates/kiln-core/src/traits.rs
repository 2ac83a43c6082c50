//! Core abstraction traits shared across the workspace.

/// A GPU-side resource that must be destroyed at a safe point.
///
/// Implemented by platform resource handles (buffers, textures, render
/// targets). The disposal queue defers `dispose` until a frame boundary
/// where the GPU can no longer reference the resource.
///
/// The disposal queue calls `dispose` exactly once per enqueued entry.
pub trait Disposable: Send {
    /// Destroy the underlying resource.
    fn dispose(&mut self);
}

// Blanket impl so closures can be enqueued directly in tests and thin
// platform glue.
impl<F: FnMut() + Send> Disposable for F {
    fn dispose(&mut self) {
        self()
    }
}
