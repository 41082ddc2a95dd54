//! # Base types for threatboard
//!
//! This is an auxiliary crate for `threatboard`, which contains plain value types: coordinates,
//! colors, piece kinds, square sets and board geometry. None of them know anything about the
//! rules of the game.
//!
//! Normally you don't want to use this crate directly. Use `threatboard` instead.

pub mod bitboard;
pub mod geometry;
pub mod types;
