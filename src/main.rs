use std::error::Error;

use brats_overlay::{
    CpuSliceRenderer, OverlayOptions, OverlaySession, TumorCategory, Volume, enums::Orientation,
};
use ndarray::Array3;

const DIM: usize = 64;

// Radial falloff around the volume center: bright near the middle, dark outside `radius`.
fn sphere(radius: f32, peak: f32) -> Array3<f32> {
    let center = DIM as f32 / 2.0;
    Array3::from_shape_fn((DIM, DIM, DIM), |(z, y, x)| {
        let d = ((z as f32 - center).powi(2) + (y as f32 - center).powi(2) + (x as f32 - center).powi(2))
            .sqrt();
        (peak * (1.0 - d / radius)).max(0.0)
    })
}

fn main() -> Result<(), Box<dyn Error>> {
    let _ = env_logger::Builder::from_default_env()
        .format_timestamp_secs()
        .try_init();

    let anatomy = Volume::new(sphere(DIM as f32 * 0.6, 1000.0))?;
    let lesion = Volume::new(sphere(DIM as f32 * 0.2, 1.0))?;

    let mut renderer = CpuSliceRenderer::new(anatomy);
    let id = renderer.add_overlay(lesion)?;

    let mut session = OverlaySession::load(&mut renderer, id, OverlayOptions::default())?;
    let table = session.toggle(TumorCategory::WholeTumor)?;
    drop(session);

    table.to_image(16).save("lut.png")?;
    renderer
        .render_slice(DIM / 2, Orientation::Axial)?
        .save("overlay_axial.png")?;
    Ok(())
}
