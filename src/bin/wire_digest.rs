// Copyright 2023, Collabora, Ltd.
// SPDX-License-Identifier: BSL-1.0
// Author: Ryan A. Pavlik <ryan.pavlik@collabora.com>

// Prints the MD5 digest of each argument, the way credentials are hashed
// before they are packed into a login packet.
// Set RUST_LOG=debug to see the digest buffer's hex dump.

extern crate oicq_wire;

use oicq_wire::{md5::Md5, ByteBuffer, Result};
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .init();

    for arg in std::env::args().skip(1) {
        let mut engine = Md5::from(arg.as_str());
        let mut out = ByteBuffer::new();
        engine.digest(&mut out)?;
        debug!(input = %arg, bytes = %out.hex(), "digest buffer");
        println!("{}  {}", engine.compute(), arg);
    }
    Ok(())
}
