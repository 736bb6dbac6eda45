mod device;
mod due_event;
mod item;
mod status;

pub mod dtos {
    pub use crate::device::dtos::*;
    pub use crate::due_event::dtos::*;
    pub use crate::item::dtos::*;
    pub use crate::status::dtos::*;
}

pub use crate::device::api::*;
pub use crate::item::api::*;
pub use crate::status::api::*;
