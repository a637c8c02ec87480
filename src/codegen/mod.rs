//! Structured Text output: the `VAR` block and the program text.

mod declarations;
mod emitter;

pub use declarations::{Declaration, collect_declarations, is_identifier};
pub use emitter::{emit_declarations, emit_network, emit_program};
