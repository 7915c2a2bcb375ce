//! Page layout: drawing surfaces, the flow controller and table drawing.
//!
//! ```text
//! composer ─▶ LayoutContext (cursor, ensure_space) ─▶ dyn Surface
//!                   │                                   ├─ PdfSurface
//!                   └─ table::draw_table                └─ RecordingSurface
//! ```

pub mod flow;
pub mod pdf;
pub mod surface;
pub mod table;

pub use flow::{HeadingLevel, LayoutContext, PageCursor};
pub use surface::{Align, Color, DisplayList, DrawOp, RecordingSurface, Surface, TextStyle};
pub use table::{draw_table, TableSpec, TableStyle};
