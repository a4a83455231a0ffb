// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Serialize call: header, crosscheck, root, pool drain.

use crate::config::{SlimConfig, HEADER_MAGIC};
use crate::error::Result;
use crate::pool::ReferencePool;
use crate::registry::TypeRegistry;
use crate::schema::Encoder;
use crate::value::Value;
use crate::wire::SlimWriter;

/// Encode `root` into `writer`. Nothing reaches the caller's stream unless
/// this returns `Ok`.
pub(super) fn encode_call(
    config: &SlimConfig,
    writer: &mut SlimWriter,
    registry: &mut TypeRegistry,
    pool: &mut ReferencePool,
    root: &Value,
) -> Result<()> {
    writer.write_u16(0);
    writer.write_u16(HEADER_MAGIC);
    if config.crosscheck {
        writer.write_u32(registry.len());
        writer.write_u64(registry.checksum());
    }

    let mut encoder = Encoder::new(writer, registry, pool, config.max_depth);
    encoder
        .encode_root(root)
        .map_err(|e| e.in_serialization("root value"))?;
    encoder.drain()?;

    log::trace!(
        "[slim::engine] encoded {} bytes, {} pool slots, {} types",
        writer.len(),
        pool.len() - 1,
        registry.len()
    );
    Ok(())
}
