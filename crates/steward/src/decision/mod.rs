//! Human adjudication of entities.

mod engine;
mod model;
mod selection;

pub use engine::{DecisionEngine, DecisionInput, DecisionPolicy};
pub use model::{
    Decision, DecisionType, ItemDetail, ItemSelection, Section, SectionDetails, SectionIndices,
};
pub use selection::{merge_requested, resolve_item, resolve_selection, section_len};
