//! Flappy Bird core: entity data and the pure rules that advance it.
//!
//! The terminal front-end lives in the binary; everything here is free of
//! I/O apart from the `log` facade.

pub mod compute;
pub mod entities;
