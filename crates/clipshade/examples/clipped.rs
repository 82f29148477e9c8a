//! The cut scene: filled, single-sided, clipped at x = 0.3, solid color,
//! with the translucent plane overlay visible from the first frame.

use clipshade::prelude::*;

fn main() {
    env_logger::init();

    let config = RenderConfig {
        wireframe: false,
        back_face_culling: true,
        clipping: true,
        fragments: false,
    };

    if let Err(e) = App::new("clipshade — clipped").config(config).run() {
        log::error!("{e}");
        std::process::exit(1);
    }
}
