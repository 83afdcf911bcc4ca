// Build script that stages static assets (page, styles, effects.toml) into `dist/`.
use std::{fs, path::Path};

use fs_extra::dir::{copy, CopyOptions};

fn main() {
    println!("cargo:rerun-if-changed=static");

    let static_dir = Path::new("static");
    if !static_dir.exists() {
        return;
    }

    let out_dir = Path::new("dist");
    if out_dir.exists() {
        fs::remove_dir_all(out_dir).ok();
    }
    fs::create_dir_all(out_dir).ok();

    let options = CopyOptions {
        content_only: true,
        overwrite: true,
        ..CopyOptions::new()
    };
    if let Err(e) = copy(static_dir, out_dir, &options) {
        println!("cargo:warning=failed to stage static/ into dist/: {e}");
    }
}
