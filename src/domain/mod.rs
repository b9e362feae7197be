// Domain layer: records, ports (interfaces to the backend service) and the pure page helpers.

pub mod badges;
pub mod filename;
pub mod model;
pub mod ports;
pub mod query;
pub mod rating;
pub mod slug;
