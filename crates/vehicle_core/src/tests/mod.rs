//! Whole-vehicle scenarios driven through ticks against the in-memory world

mod scenarios;
