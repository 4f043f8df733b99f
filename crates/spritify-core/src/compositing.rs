use image::RgbaImage;

/// Copy the whole of `src` into `canvas` with its top-left corner at (dx, dy).
/// Pixels falling outside the canvas are dropped.
pub fn blit_rgba(src: &RgbaImage, canvas: &mut RgbaImage, dx: u32, dy: u32) {
    let (cw, ch) = canvas.dimensions();
    let (sw, sh) = src.dimensions();
    for yy in 0..sh {
        let ty = dy.saturating_add(yy);
        if ty >= ch {
            break;
        }
        for xx in 0..sw {
            let tx = dx.saturating_add(xx);
            if tx >= cw {
                break;
            }
            canvas.put_pixel(tx, ty, *src.get_pixel(xx, yy));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn blit_clips_at_canvas_edge() {
        let src = RgbaImage::from_pixel(3, 3, Rgba([1, 2, 3, 255]));
        let mut canvas = RgbaImage::new(4, 4);
        blit_rgba(&src, &mut canvas, 2, 2);
        assert_eq!(canvas.get_pixel(2, 2), &Rgba([1, 2, 3, 255]));
        assert_eq!(canvas.get_pixel(3, 3), &Rgba([1, 2, 3, 255]));
        assert_eq!(canvas.get_pixel(1, 1), &Rgba([0, 0, 0, 0]));
    }
}
