//! Regenerates `include/chunkstack.h` from the `extern "C"` surface.

use std::env;
use std::fs;
use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-changed=src");
    println!("cargo:rerun-if-changed=cbindgen.toml");

    let manifest_dir =
        PathBuf::from(env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR is set by cargo"));
    let config = cbindgen::Config::from_file(manifest_dir.join("cbindgen.toml"))
        .expect("cbindgen.toml is readable");

    let include_dir = manifest_dir.join("include");
    fs::create_dir_all(&include_dir).expect("include/ directory can be created");

    let bindings = cbindgen::Builder::new()
        .with_crate(&manifest_dir)
        .with_config(config)
        .generate()
        .expect("header generation succeeds");
    bindings.write_to_file(include_dir.join("chunkstack.h"));
}
