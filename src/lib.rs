//! xwing-flow
//!
//! A starfighter scene running natively and in the browser: a glTF X-Wing
//! with animated wings, keyboard steering, an orbit camera and a particle
//! starfield rushing past, plus debug controls for lights and model.
//!
//! High-level modules
//! - `session`: all scene state and the per-frame tick, free of GPU types
//! - `particles`, `wings`, `input`, `tween`, `mixer`, `controls`: the pieces the session drives
//! - `clock`, `viewport`, `config`, `debug`: frame timing, sizing, settings and debug controls
//! - `context`: window and GPU context that owns device, queue and pipelines
//! - `flow`: the event loop and the flow abstraction
//! - `demo`: the X-Wing flow tying the session to the GPU
//! - `data_structures`, `pipelines`, `render`, `camera`, `resources`: GPU side and loaders
//!

pub mod camera;
pub mod clock;
pub mod config;
pub mod context;
pub mod controls;
pub mod data_structures;
pub mod debug;
pub mod demo;
pub mod flow;
pub mod input;
pub mod mixer;
pub mod particles;
pub mod pipelines;
pub mod render;
pub mod resources;
pub mod session;
pub mod tween;
pub mod viewport;
pub mod wings;

/// Runs the demo until the window closes.
pub fn run() -> anyhow::Result<()> {
    #[cfg(target_arch = "wasm32")]
    {
        flow::run_with_sender(vec![demo::constructor()], demo::web::install)
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        flow::run(vec![demo::constructor()])
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn run_web() -> Result<(), wasm_bindgen::JsValue> {
    run().map_err(|err| wasm_bindgen::JsValue::from_str(&format!("{err:#}")))
}
