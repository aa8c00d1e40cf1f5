//! Background services: the periodic loops driving reconciliation, trigger
//! evaluation and state autosave. Every loop selects on a shared watch
//! channel so shutdown reaches each one.

pub mod autosave;
pub mod reconciler;
pub mod trigger;
