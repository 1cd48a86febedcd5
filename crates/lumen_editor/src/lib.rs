//! Lumen Editor - transform gizmo overlay
//!
//! The gizmo is an ordinary compound body in the [`Scene`](lumen_scene::Scene)
//! whose shapes are flagged `no_draw` and `no_contact`. Ray casts see its
//! handles, the main batches and the solver do not.
//!
//! ```text
//!  pointer ray ─► Scene::raycast ─► resolve_axis ─┬─► begin_drag / drag / end_drag
//!                                                 │          │ TransformDelta
//!                                                 │          ▼
//!                                                 │        apply ─► target + gizmo body
//!                                                 └─► filter_gizmo_shapes ─► selection
//! ```

pub mod error;
pub mod gizmo;
pub mod parts;
pub mod snap;

pub mod prelude {
    //! Common imports for the editor overlay
    pub use crate::error::{EditorError, Result};
    pub use crate::gizmo::{Gizmo, Pick, TransformDelta};
    pub use crate::parts::{GizmoAxis, GizmoMode};
    pub use crate::snap::{ray_plane_intersection, snap_value, SnapSettings};
}

pub use prelude::*;
