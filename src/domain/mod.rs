pub mod change;
pub mod coins;
pub mod machine;
pub mod maintenance;
pub mod ports;
pub mod pricing;
pub mod product;
