//! Unit definitions: the structured power schema and the catalog seam.

pub mod definition;
pub mod registry;

pub use definition::{
    Activation, CountSpec, PowerAction, PowerAmount, PowerCondition, PowerTarget, PowerTiming,
    StructuredPower, UnitDefinition, UnitTypeId,
};
pub use registry::{UnitCatalog, UnitRegistry};
