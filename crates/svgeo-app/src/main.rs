//! Command-line front end: load a document, fit it into a nominal viewport
//! and print the formatted data report.

use kurbo::Size;
use svgeo_app::{GeoViewer, ViewerOptions};

fn main() -> std::process::ExitCode {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let Some(path) = args.next() else {
        eprintln!("usage: svgeo <document.svg> [locale]");
        return std::process::ExitCode::FAILURE;
    };
    let locale = args.next().unwrap_or_else(|| "fr".to_string());

    let mut viewer = GeoViewer::new(ViewerOptions {
        locale,
        ..ViewerOptions::default()
    });
    viewer.set_viewport_size(Size::new(1920.0, 1080.0));

    if let Err(e) = viewer.load_path(&path) {
        eprintln!("failed to load {path}: {e}");
        return std::process::ExitCode::FAILURE;
    }

    let state = viewer.viewport_state();
    log::info!(
        "loaded {path}: zoom {:.3}, pan ({:.1}, {:.1})",
        state.zoom,
        state.pan_x,
        state.pan_y
    );

    match viewer.all_report() {
        Some(report) => print!("{}", report.to_text()),
        None => println!("no tagged elements in {path}"),
    }
    std::process::ExitCode::SUCCESS
}
