#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), forbid(clippy::expect_used))]
//! Print the OpenAPI document as JSON.
//!
//! # Examples
//! ```sh
//! cargo run --quiet --manifest-path backend/Cargo.toml --bin openapi-dump > openapi.json
//! ```

use std::io::{self, BufWriter, Write};

use backend::ApiDoc;
use serde_json::to_writer_pretty;
use utoipa::OpenApi;

/// Write the OpenAPI document to stdout, two-space indented.
fn main() -> io::Result<()> {
    let doc = ApiDoc::openapi();
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    to_writer_pretty(&mut out, &doc)
        .map_err(|e| io::Error::other(format!("serialising OpenAPI document: {e}")))?;
    writeln!(out)?;
    Ok(())
}
