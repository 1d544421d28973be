// RustPixel
// copyright zipxing@hotmail.com 2022～2025

// cfg aliases shared by the renderer modules and the shape-view tool

fn main() {
    use cfg_aliases::cfg_aliases;

    cfg_aliases! {
        // Platform aliases
        wasm: { target_arch = "wasm32" },

        // file logging through log4rs
        file_log: { all(feature = "log4rs", not(wasm)) },

        // png still capture on present
        capture_support: { all(feature = "image", not(wasm)) },
    }
}
