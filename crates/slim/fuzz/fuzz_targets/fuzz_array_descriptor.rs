// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fuzz target for array descriptor strings
//!
//! Anything the parser accepts must render back to an equal descriptor.

#![no_main]

use libfuzzer_sys::fuzz_target;
use slim::array_codec::ArrayDescriptor;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(descriptor) = ArrayDescriptor::parse(text) {
        let rendered = descriptor.render();
        assert_eq!(ArrayDescriptor::parse(&rendered).ok(), Some(descriptor));
    }
});
