//! EV recharge planning server.
//!
//! Segments a highway trip into legs between service stations, costs each
//! leg in energy and time, and asks a plan generator for a recharging plan
//! that it then verifies against its own model.

pub mod amap;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod domain;
pub mod generator;
pub mod geo;
pub mod planner;
pub mod web;
