pub mod sync;
pub mod finance;
pub mod parties;
pub mod organization;
pub mod logistics;
