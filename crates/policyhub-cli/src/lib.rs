//! Terminal front end for the Policy Hub catalog.

pub mod browse;
pub mod logging;
pub mod pages;
pub mod panels;
pub mod render;
