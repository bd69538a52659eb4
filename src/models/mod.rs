pub mod policy;
pub mod season;
pub mod task;

pub use policy::*;
pub use season::*;
pub use task::*;
