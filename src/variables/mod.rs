//! Camera variables: typed values shared between rigs and blended alongside the pose.

pub mod table;
pub mod types;

pub use table::VariableTable;
pub use types::{
    VariableDefinition, VariableId, VariableMask, VariableTableAllocationInfo,
    VariableTableFilter, VariableType, VariableValue,
};
