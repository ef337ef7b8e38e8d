//! Record types shared by the lifecycle engine, the store and the HTTP layer.

pub mod booking;
pub mod macros;
pub mod setting;
pub mod startup;

pub use booking::*;
pub use setting::Setting;
pub use startup::*;
