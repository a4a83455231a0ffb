// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fuzz target for Slim deserialization
//!
//! Feeds arbitrary bytes to the engine, with and without the registry
//! crosscheck block. None of these operations should panic on any input.

#![no_main]

use libfuzzer_sys::fuzz_target;
use slim::{Slim, SlimConfig, TypeMode};
use std::sync::OnceLock;

static CHECKED: OnceLock<Slim> = OnceLock::new();
static UNCHECKED: OnceLock<Slim> = OnceLock::new();

fuzz_target!(|data: &[u8]| {
    // ----------------------------------------------------------------
    // 1. Raw input, crosscheck on - must not panic
    // ----------------------------------------------------------------
    let checked = CHECKED.get_or_init(Slim::new);
    let _ = checked.from_bytes(data);

    // ----------------------------------------------------------------
    // 2. Valid header prepended, crosscheck off, so mutations reach the
    //    value decoder without matching a checksum first
    // ----------------------------------------------------------------
    let unchecked =
        UNCHECKED.get_or_init(|| Slim::with_config(SlimConfig::new().with_crosscheck(false)));
    let mut framed = Vec::with_capacity(data.len() + 4);
    framed.extend_from_slice(&[0x00, 0x00, 0x53, 0x4D]);
    framed.extend_from_slice(data);
    let _ = unchecked.from_bytes(&framed);

    // ----------------------------------------------------------------
    // 3. Batch mode: a failed call must leave the engine reusable
    // ----------------------------------------------------------------
    let batch = Slim::with_config(
        SlimConfig::new()
            .with_crosscheck(false)
            .with_type_mode(TypeMode::Batch),
    );
    let _ = batch.from_bytes(&framed);
    let _ = batch.from_bytes(&framed);
});
