//! cubexr Web - browser host for the cube scene
//!
//! Wires DOM input, animation frames, the video element and WebXR into the
//! scene component from `cubexr-scene`.

mod app;
mod canvas;
mod events;
mod frames;
mod media;
mod xr;

use wasm_bindgen::prelude::*;

/// Entry point for WASM module
#[wasm_bindgen(start)]
pub fn main() {
    // Set panic hook for better error messages
    console_error_panic_hook::set_once();

    tracing_wasm::set_as_global_default_with_config(
        tracing_wasm::WASMLayerConfigBuilder::new()
            .set_max_level(tracing::Level::WARN)
            .build(),
    );

    if let Err(e) = app::run() {
        tracing::error!(error = ?e, "Failed to mount scene");
    }
    if let Err(e) = app::unmount_on_pagehide() {
        tracing::warn!(error = ?e, "Failed to watch for page hide");
    }
}

/// Mount the scene again after an explicit `unmount()`
#[wasm_bindgen]
pub fn mount() -> Result<(), JsValue> {
    app::run()
}

/// Detach all listeners and release the scene
#[wasm_bindgen]
pub fn unmount() {
    app::unmount();
}
