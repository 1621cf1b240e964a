use std::env;
use std::path::Path;

/// Paints the 64x64 window icon: a dark spiral of corridor cells around a
/// single lit doorway pixel block. Generated here so the binary carries no
/// image assets.
fn paint_icon() -> image::RgbaImage {
    let mut img = image::RgbaImage::new(64, 64);
    for (x, y, px) in img.enumerate_pixels_mut() {
        let fx = x as f32 / 63.0 - 0.5;
        let fy = y as f32 / 63.0 - 0.5;
        let ring = ((fx * fx + fy * fy).sqrt() * 14.0) as u32;
        let ang = fy.atan2(fx);
        let spiral = ((ang * 2.0 + ring as f32 * 0.9).sin() > 0.15) && ring > 1 && ring < 9;
        let (r, g, b) = if spiral {
            (138, 126, 92)
        } else if ring <= 1 {
            (222, 196, 120)
        } else {
            (24, 20, 28)
        };
        *px = image::Rgba([r, g, b, 255]);
    }
    img
}

fn main() {
    let out_dir = env::var("OUT_DIR").expect("OUT_DIR not set by cargo");
    let icon_png = Path::new(&out_dir).join("oubliette-icon.png");

    paint_icon()
        .save_with_format(&icon_png, image::ImageFormat::Png)
        .expect("Failed to write generated icon");

    // Windows: embed the icon in the executable resources.
    #[cfg(target_os = "windows")]
    {
        let ico_path = Path::new(&out_dir).join("oubliette-icon.ico");
        let icon = image::open(&icon_png).expect("Failed to reopen generated icon");
        icon.save_with_format(&ico_path, image::ImageFormat::Ico)
            .expect("Failed to write ICO icon");

        let mut res = winres::WindowsResource::new();
        res.set_icon(&ico_path.to_string_lossy());
        res.compile().expect("Failed to compile Windows resources");
    }
}
