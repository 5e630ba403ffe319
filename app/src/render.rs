use line_2d::Coord;
use rgb_int::Rgb24;
use sdl2::{pixels::Color, rect::Rect, render::Canvas, video::Window};
use xyscope_core::{Rgb, TrailPoint};

/// Half-width of a stroke of thickness 1, in normalized device units (where the window spans
/// [-1, 1] on each axis).
const STROKE_HALF_WIDTH: f32 = 0.03;

/// Map a point in normalized device coordinates to a pixel. +y is up.
pub fn to_screen(x: f32, y: f32, width_px: u32, height_px: u32) -> Coord {
    Coord {
        x: ((x + 1.0) * 0.5 * width_px as f32) as i32,
        y: ((1.0 - y) * 0.5 * height_px as f32) as i32,
    }
}

/// Width in pixels of a stroke with the given thickness. Never less than a pixel.
pub fn stroke_width_px(thickness: f32, height_px: u32) -> u32 {
    ((STROKE_HALF_WIDTH * thickness * height_px as f32).round() as u32).max(1)
}

pub fn to_rgb24(rgb: Rgb) -> Rgb24 {
    let (r, g, b) = rgb.to_u8();
    Rgb24::new(r, g, b)
}

fn alpha_u8(fade: f32) -> u8 {
    (fade.clamp(0.0, 1.0) * 255.0) as u8
}

/// Draw the trail as a connected polyline. Each segment takes the color and fade of its newer
/// end point.
pub fn draw_trail(
    canvas: &mut Canvas<Window>,
    points: &[TrailPoint],
    width_px: u32,
    height_px: u32,
) {
    canvas.set_draw_color(Color::BLACK);
    canvas.clear();
    let Some(first) = points.first() else {
        return;
    };
    let line_width = stroke_width_px(first.thickness, height_px);
    let offset = line_width as i32 / 2;
    let mut prev = to_screen(first.x, first.y, width_px, height_px);
    for point in &points[1..] {
        let coord = to_screen(point.x, point.y, width_px, height_px);
        let [r, g, b, fade] = point.rgba;
        let rgb = to_rgb24(Rgb::new(r, g, b));
        let alpha = alpha_u8(fade);
        if alpha > 0 {
            canvas.set_draw_color(Color::RGBA(rgb.r, rgb.g, rgb.b, alpha));
            for Coord { x, y } in line_2d::coords_between(prev, coord) {
                let rect =
                    Rect::new(x - offset, y - offset, line_width, line_width);
                let _ = canvas.fill_rect(rect);
            }
        }
        prev = coord;
    }
}
