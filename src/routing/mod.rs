//! Routing module
//!
//! Priority-ordered regular-expression routes mapping URL prefixes to
//! filesystem locations.

mod table;

pub use table::{Route, RouteTable};
