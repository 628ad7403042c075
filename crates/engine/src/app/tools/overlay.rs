const GLYPH_WIDTH: i32 = 3;
const GLYPH_HEIGHT: i32 = 5;
const TEXT_SCALE: i32 = 1;
const GLYPH_ADVANCE: i32 = (GLYPH_WIDTH + 1) * TEXT_SCALE;
const LINE_ADVANCE: i32 = (GLYPH_HEIGHT + 2) * TEXT_SCALE;
const OVERLAY_PADDING: i32 = 4;
const OVERLAY_PANEL_INSET: i32 = 2;
const OVERLAY_TEXT_COLOR: [u8; 4] = [244, 248, 252, 255];
const OVERLAY_PANEL_BG_COLOR: [u8; 4] = [10, 12, 16, 210];

/// Draws `lines` top-left over whatever is already in `frame`, on a dark
/// panel blended at the panel's alpha.
pub(crate) fn draw_overlay<S: AsRef<str>>(frame: &mut [u8], width: u32, height: u32, lines: &[S]) {
    if width == 0 || height == 0 || lines.is_empty() {
        return;
    }

    let longest_line_chars = lines
        .iter()
        .map(|line| line.as_ref().chars().count() as i32)
        .max()
        .unwrap_or(0);
    let panel_left = OVERLAY_PADDING - OVERLAY_PANEL_INSET;
    let panel_top = OVERLAY_PADDING - OVERLAY_PANEL_INSET;
    let panel_width = longest_line_chars * GLYPH_ADVANCE + OVERLAY_PANEL_INSET * 2 - TEXT_SCALE;
    let panel_height = lines.len() as i32 * LINE_ADVANCE + OVERLAY_PANEL_INSET * 2 - 2 * TEXT_SCALE;
    blend_filled_rect(
        frame,
        width,
        height,
        (panel_left, panel_top),
        (panel_width, panel_height),
        OVERLAY_PANEL_BG_COLOR,
    );

    let mut y = OVERLAY_PADDING;
    for line in lines {
        draw_text_clipped(frame, width, height, OVERLAY_PADDING, y, line.as_ref(), OVERLAY_TEXT_COLOR);
        y += LINE_ADVANCE;
    }
}

fn draw_text_clipped(
    frame: &mut [u8],
    width: u32,
    height: u32,
    mut x: i32,
    y: i32,
    text: &str,
    color: [u8; 4],
) {
    for ch in text.chars() {
        if let Some(glyph) = glyph_for(ch) {
            draw_glyph_clipped(frame, width, height, x, y, glyph, color);
        }
        x += GLYPH_ADVANCE;
    }
}

fn draw_glyph_clipped(
    frame: &mut [u8],
    width: u32,
    height: u32,
    x: i32,
    y: i32,
    glyph: u16,
    color: [u8; 4],
) {
    for row in 0..GLYPH_HEIGHT {
        for col in 0..GLYPH_WIDTH {
            let bit = (GLYPH_HEIGHT - 1 - row) * GLYPH_WIDTH + (GLYPH_WIDTH - 1 - col);
            if glyph & (1 << bit) == 0 {
                continue;
            }
            for sy in 0..TEXT_SCALE {
                for sx in 0..TEXT_SCALE {
                    let pixel_x = x + col * TEXT_SCALE + sx;
                    let pixel_y = y + row * TEXT_SCALE + sy;
                    if let Some(range) = pixel_range(width, height, pixel_x, pixel_y, frame.len()) {
                        frame[range].copy_from_slice(&color);
                    }
                }
            }
        }
    }
}

fn blend_filled_rect(
    frame: &mut [u8],
    width: u32,
    height: u32,
    (x, y): (i32, i32),
    (rect_width, rect_height): (i32, i32),
    color: [u8; 4],
) {
    let alpha = u16::from(color[3]);
    for py in y.max(0)..(y + rect_height).min(height as i32) {
        for px in x.max(0)..(x + rect_width).min(width as i32) {
            let Some(range) = pixel_range(width, height, px, py, frame.len()) else {
                continue;
            };
            let pixel = &mut frame[range];
            for channel in 0..3 {
                let under = u16::from(pixel[channel]);
                let over = u16::from(color[channel]);
                pixel[channel] = ((over * alpha + under * (255 - alpha)) / 255) as u8;
            }
            pixel[3] = 255;
        }
    }
}

fn pixel_range(
    width: u32,
    height: u32,
    x: i32,
    y: i32,
    frame_len: usize,
) -> Option<std::ops::Range<usize>> {
    if x < 0 || y < 0 || x >= width as i32 || y >= height as i32 {
        return None;
    }
    let start = (y as usize)
        .checked_mul(width as usize)?
        .checked_add(x as usize)?
        .checked_mul(4)?;
    let end = start.checked_add(4)?;
    (end <= frame_len).then_some(start..end)
}

/// 3x5 glyphs packed row-major, top row in the high bits. Only the
/// characters the stats panel prints are covered; anything else is blank.
fn glyph_for(ch: char) -> Option<u16> {
    let rows: [u8; 5] = match ch.to_ascii_uppercase() {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b010, 0b010, 0b010],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'A' => [0b010, 0b101, 0b111, 0b101, 0b101],
        'F' => [0b111, 0b100, 0b110, 0b100, 0b100],
        'G' => [0b011, 0b100, 0b101, 0b101, 0b011],
        'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'M' => [0b101, 0b111, 0b111, 0b101, 0b101],
        'N' => [0b110, 0b101, 0b101, 0b101, 0b101],
        'P' => [0b110, 0b101, 0b110, 0b100, 0b100],
        'S' => [0b011, 0b100, 0b010, 0b001, 0b110],
        'V' => [0b101, 0b101, 0b101, 0b101, 0b010],
        'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        _ => return None,
    };
    Some(
        rows.iter()
            .fold(0u16, |packed, row| (packed << GLYPH_WIDTH) | u16::from(*row)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const WIDTH: u32 = 32;
    const HEIGHT: u32 = 16;

    fn pixel(frame: &[u8], x: u32, y: u32) -> [u8; 4] {
        let start = ((y * WIDTH + x) * 4) as usize;
        [frame[start], frame[start + 1], frame[start + 2], frame[start + 3]]
    }

    #[test]
    fn glyph_top_row_is_high_bits() {
        let one = glyph_for('1').expect("digit glyph");
        assert_eq!(one >> 12, 0b010);
        assert_eq!(one & 0b111, 0b111);
        assert!(glyph_for('~').is_none());
        assert_eq!(glyph_for('f'), glyph_for('F'));
    }

    #[test]
    fn overlay_draws_text_over_panel() {
        let mut frame = vec![0u8; (WIDTH * HEIGHT * 4) as usize];
        draw_overlay(&mut frame, WIDTH, HEIGHT, &["1"]);

        // middle column of the '1' stem at the glyph origin
        assert_eq!(
            pixel(&frame, OVERLAY_PADDING as u32 + 1, OVERLAY_PADDING as u32),
            OVERLAY_TEXT_COLOR
        );
        // panel corner is blended, not text
        let corner = pixel(&frame, 2, 2);
        assert_eq!(corner[3], 255);
        assert_ne!(corner, OVERLAY_TEXT_COLOR);
        // outside the panel is untouched
        assert_eq!(pixel(&frame, WIDTH - 1, HEIGHT - 1), [0, 0, 0, 0]);
    }

    #[test]
    fn overlay_clips_to_frame_bounds() {
        let mut frame = vec![0u8; (4 * 4 * 4) as usize];
        draw_overlay(&mut frame, 4, 4, &["8888888888"]);
        assert_eq!(frame.len(), 64);
    }

    #[test]
    fn empty_lines_leave_frame_untouched() {
        let mut frame = vec![7u8; (WIDTH * HEIGHT * 4) as usize];
        let lines: [&str; 0] = [];
        draw_overlay(&mut frame, WIDTH, HEIGHT, &lines);
        assert!(frame.iter().all(|byte| *byte == 7));
    }
}
