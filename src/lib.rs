//! Cutting-stock optimizer for rectangular boards: allocates required cuts
//! onto an inventory of stock boards, minimizing waste or cost, with 90-degree
//! rotation and multi-board spillover. Cuts that fit nowhere are reported, not
//! errors.

pub mod inventory;
pub mod packer;
pub mod render;
pub mod solver;
pub mod types;
