// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests Module
//!
//! - `subnet_carving`: carved subnets stay inside the network and never overlap
//! - `dependency_order`: materialization order respects every declared edge

mod dependency_order;
mod subnet_carving;
