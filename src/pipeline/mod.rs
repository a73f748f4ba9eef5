//! Pipeline Components
//!
//! The components that build the engine's data pipeline from tree nesting:
//! a representation contributes an actor/mapper pair to the nearest view,
//! and the sources, algorithms and readers nested beneath it feed the
//! mapper through the downstream channel. [`field`] writes named arrays
//! into the nearest source's dataset, and [`share`] breaks the nesting
//! requirement by publishing datasets under process-wide ids.

pub mod algorithm;
pub mod field;
pub mod reader;
pub mod representation;
pub mod share;
pub mod source;

pub use algorithm::{AlgorithmComponent, AlgorithmProps};
pub use field::{FieldArrayComponent, FieldArrayProps};
pub use reader::{ReaderComponent, ReaderProps};
pub use representation::{RepresentationComponent, RepresentationProps};
pub use share::{ShareDataSetComponent, ShareDataSetProps};
pub use source::{DataSourceComponent, DataSourceProps};
