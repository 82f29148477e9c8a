//! One spinning triangle with runtime-switchable clipping.
//!
//! Keys:
//!   1  wireframe
//!   2  back-face culling
//!   3  clipping (shows the red plane overlay)
//!   4  color fragments by local position
//!   arrows  orbit the camera
//!
//! Run with `RUST_LOG=info cargo run --example triangle`.

use clipshade::prelude::*;

fn main() {
    env_logger::init();

    let result = App::new("clipshade — triangle")
        .config(RenderConfig::default())
        .clear_color(ClearColor([0.067, 0.067, 0.067, 1.0]))
        .run();

    if let Err(e) = result {
        log::error!("{e}");
        std::process::exit(1);
    }
}
