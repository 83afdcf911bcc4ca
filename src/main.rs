//! Host-side helper: `cargo run` compiles the effects to WASM with wasm-pack
//! into `static/pkg` and serves `static/` locally for previewing.

use std::env;
use std::process::{Command, ExitCode};

const PORT: &str = "8000";

fn main() -> ExitCode {
    // Only meaningful on non-wasm targets.
    if env::var("TARGET").unwrap_or_default() == "wasm32-unknown-unknown" {
        return ExitCode::SUCCESS;
    }

    println!("Building WASM pkg …");
    match Command::new("wasm-pack")
        .args(["build", "--release", "--target", "web", "--out-dir", "static/pkg"])
        .status()
    {
        Ok(st) if st.success() => {}
        Ok(_) => {
            eprintln!("wasm-pack finished with errors. Ensure wasm-pack is installed (https://rustwasm.github.io/wasm-pack/).");
            return ExitCode::FAILURE;
        }
        Err(_) => {
            eprintln!("wasm-pack not found in PATH. Skipping wasm build; the page may load a stale pkg.");
        }
    }

    println!("Serving static/ at http://127.0.0.1:{PORT} (Ctrl-C to stop) …");
    match Command::new("python3")
        .args(["-m", "http.server", PORT, "--directory", "static"])
        .status()
    {
        Ok(st) if st.success() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("failed to start http server: {e}");
            ExitCode::FAILURE
        }
    }
}
