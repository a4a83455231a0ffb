// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Deserialize call: header, crosscheck, root, pool drain, fixups.

use crate::config::{SlimConfig, HEADER_LEN, HEADER_MAGIC};
use crate::error::{Error, Result};
use crate::pool::ReferencePool;
use crate::registry::TypeRegistry;
use crate::schema::Decoder;
use crate::value::Value;
use crate::wire::SlimReader;

fn expected_header() -> [u8; HEADER_LEN] {
    let magic = HEADER_MAGIC.to_le_bytes();
    [0, 0, magic[0], magic[1]]
}

fn check_preamble(
    config: &SlimConfig,
    reader: &mut SlimReader<'_>,
    registry: &TypeRegistry,
) -> Result<()> {
    let found = reader.read_array::<HEADER_LEN>()?;
    if found != expected_header() {
        return Err(Error::BadHeader { found });
    }
    if config.crosscheck {
        let found_count = reader.read_u32()?;
        let found_checksum = reader.read_u64()?;
        if found_count != registry.len() || found_checksum != registry.checksum() {
            return Err(Error::RegistryMismatch {
                expected_count: registry.len(),
                found_count,
                expected_checksum: registry.checksum(),
                found_checksum,
            });
        }
    }
    Ok(())
}

pub(super) fn decode_call(
    config: &SlimConfig,
    reader: &mut SlimReader<'_>,
    registry: &mut TypeRegistry,
    pool: &mut ReferencePool,
) -> Result<Value> {
    check_preamble(config, reader, registry).map_err(|e| e.in_deserialization("preamble"))?;

    let mut decoder = Decoder::new(reader, registry, pool, config.max_depth);
    let root = decoder
        .decode_root()
        .map_err(|e| e.in_deserialization("root value"))?;
    decoder.drain()?;
    decoder
        .finish()
        .map_err(|e| e.in_deserialization("fixups"))?;

    log::trace!(
        "[slim::engine] decoded {} bytes, {} pool slots, {} types",
        reader.offset(),
        pool.len() - 1,
        registry.len()
    );
    Ok(root)
}
