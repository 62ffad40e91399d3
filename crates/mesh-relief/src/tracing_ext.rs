//! Tracing extensions for relief operations.
//!
//! Structured logging and timing for the pipeline stages, on top of the
//! `tracing` ecosystem.
//!
//! # Usage
//!
//! Enable tracing by initializing a subscriber in your application:
//!
//! ```rust,ignore
//! use tracing_subscriber::{fmt, prelude::*, EnvFilter};
//!
//! tracing_subscriber::registry()
//!     .with(fmt::layer())
//!     .with(EnvFilter::from_default_env())
//!     .init();
//!
//! // RUST_LOG=mesh_relief=debug for stage details
//! // RUST_LOG=mesh_relief::timing=info for stage timing only
//! ```

use std::time::Instant;
use tracing::{Span, debug, info};

use crate::relief::ReliefMesh;

/// A performance timer that logs duration on drop.
///
/// ```rust,ignore
/// use mesh_relief::tracing_ext::OperationTimer;
///
/// fn expensive_operation() {
///     let _timer = OperationTimer::new("expensive_operation");
///     // ... do work ...
/// } // Timer logs duration when dropped
/// ```
pub struct OperationTimer {
    name: &'static str,
    start: Instant,
    span: Span,
}

impl OperationTimer {
    /// Create a new operation timer.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!("relief_operation", operation = name);
        debug!(target: "mesh_relief::timing", operation = name, "Starting operation");
        Self {
            name,
            start: Instant::now(),
            span,
        }
    }

    /// Create a timer that records the grid size it works on.
    pub fn with_grid(name: &'static str, width: usize, height: usize) -> Self {
        let span = tracing::info_span!(
            "relief_operation",
            operation = name,
            width = width,
            height = height
        );
        debug!(
            target: "mesh_relief::timing",
            operation = name,
            width,
            height,
            "Starting operation"
        );
        Self {
            name,
            start: Instant::now(),
            span,
        }
    }

    /// Get the elapsed time.
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }

    /// Get the span for this timer.
    pub fn span(&self) -> &Span {
        &self.span
    }
}

impl Drop for OperationTimer {
    fn drop(&mut self) {
        let elapsed_ms = self.elapsed_ms();
        info!(
            target: "mesh_relief::timing",
            operation = self.name,
            elapsed_ms = format!("{:.2}", elapsed_ms),
            "Operation completed"
        );
    }
}

/// Log relief mesh statistics at debug level.
pub fn log_relief_stats(mesh: &ReliefMesh, context: &str) {
    let dims = mesh
        .bounds()
        .map(|b| b.dimensions())
        .unwrap_or_default();

    debug!(
        target: "mesh_relief::mesh_state",
        context = context,
        grid = format!("{}x{}", mesh.width(), mesh.height()),
        vertices = mesh.vertex_count(),
        faces = mesh.face_count(),
        dimensions = format!("{:.2} x {:.2} x {:.2}", dims.x, dims.y, dims.z),
        "Relief state"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer_measures_time() {
        let timer = OperationTimer::new("test");
        std::thread::sleep(std::time::Duration::from_millis(2));
        assert!(timer.elapsed_ms() >= 1.0);
    }

    #[test]
    fn test_timer_with_grid() {
        let timer = OperationTimer::with_grid("grid", 3, 4);
        assert!(timer.elapsed_ms() >= 0.0);
        let _span = timer.span();
    }
}
