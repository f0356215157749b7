mod reminder;
mod status;
mod team;

pub mod dtos {
    pub use crate::reminder::dtos::*;
}

pub use crate::reminder::api::*;
pub use crate::status::api::*;
pub use crate::team::api::*;
