//! Search parameters: values, declarations, registry, and controls.

mod control;
mod registry;
mod value;

pub use control::{
    Control, ControlBuilder, FieldControl, MenuControl, ParamOption, field_control, menu_control,
};
pub use registry::{ParamConfig, ParamKind, ParamRegistry};
pub use value::{ParamValue, SearchParams};
