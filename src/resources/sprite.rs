//! ASCII sprites and sheet scaling.
//!
//! A sprite is one animation frame drawn with characters; a sheet is the
//! ordered frames of one animation. Scaling samples the source grid with
//! nearest-neighbour lookup on both axes so any art can fill any cell box.

use crate::core::geometry::Size;
use crate::resources::rescale::CancelToken;

/// Blank cells in sprite art are transparent when stamped.
pub const TRANSPARENT: char = ' ';

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Sprite {
    rows: Vec<Vec<char>>,
    width: usize,
}

pub type SpriteSheet = Vec<Sprite>;

impl Sprite {
    /// Build a sprite from multi-line art. Short lines are padded with
    /// transparent cells.
    pub fn from_art(art: &str) -> Self {
        let rows: Vec<Vec<char>> = art.lines().map(|l| l.chars().collect()).collect();
        let width = rows.iter().map(|r| r.len()).max().unwrap_or(0);
        let rows = rows
            .into_iter()
            .map(|mut r| {
                r.resize(width, TRANSPARENT);
                r
            })
            .collect();
        Self { rows, width }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn size(&self) -> Size {
        Size::new(self.width as u16, self.rows.len() as u16)
    }

    pub fn rows(&self) -> &[Vec<char>] {
        &self.rows
    }

    pub fn cell(&self, x: usize, y: usize) -> Option<char> {
        self.rows.get(y).and_then(|r| r.get(x)).copied()
    }

    /// Resample to exactly `target` cells.
    pub fn scaled(&self, target: Size) -> Sprite {
        let (tw, th) = (target.width as usize, target.height as usize);
        if tw == 0 || th == 0 || self.rows.is_empty() || self.width == 0 {
            return Sprite {
                rows: vec![vec![TRANSPARENT; tw]; th],
                width: tw,
            };
        }
        if tw == self.width && th == self.rows.len() {
            return self.clone();
        }

        let source_height = self.rows.len();
        let rows = (0..th)
            .map(|i| {
                // Sample from source using nearest neighbour
                let source_row = &self.rows[((i * source_height) / th).min(source_height - 1)];
                (0..tw)
                    .map(|j| source_row[((j * self.width) / tw).min(self.width - 1)])
                    .collect()
            })
            .collect();
        Sprite { rows, width: tw }
    }

    /// Shear so the top leans toward `right` (or left) by one column every
    /// two rows. The sprite grows by [`lean_extra`](Self::lean_extra) columns.
    pub fn leaned(&self, right: bool) -> Sprite {
        let height = self.rows.len();
        let extra = self.lean_extra();
        let rows = self
            .rows
            .iter()
            .enumerate()
            .map(|(r, row)| {
                let offset = if right { (height - 1 - r) / 2 } else { r / 2 };
                let mut out = vec![TRANSPARENT; offset];
                out.extend_from_slice(row);
                out.resize(self.width + extra, TRANSPARENT);
                out
            })
            .collect();
        Sprite {
            rows,
            width: self.width + extra,
        }
    }

    pub fn lean_extra(&self) -> usize {
        self.rows.len().saturating_sub(1) / 2
    }
}

/// Lookup of an entity's current picture in a set of scaled sheets `S`.
///
/// Implemented by every animated entity so renderers and the animation
/// step ask the same question the same way.
pub trait Drawable<S> {
    fn sheet<'a>(&self, sheets: &'a S) -> &'a [Sprite];

    fn frame(&self) -> usize;

    fn frame_count(&self, sheets: &S) -> usize {
        self.sheet(sheets).len()
    }

    fn draw_sprite<'a>(&self, sheets: &'a S) -> Option<&'a Sprite> {
        self.sheet(sheets).get(self.frame())
    }
}

/// Build a sheet from one art string per frame.
pub fn sheet(frames: &[&str]) -> SpriteSheet {
    frames.iter().map(|f| Sprite::from_art(f)).collect()
}

/// Scale every frame of `sheet`. Returns `None` if `cancel` fires midway.
pub fn scale_sheet(sheet: &[Sprite], target: Size, cancel: &CancelToken) -> Option<SpriteSheet> {
    let mut out = Vec::with_capacity(sheet.len());
    for frame in sheet {
        if cancel.is_cancelled() {
            return None;
        }
        out.push(frame.scaled(target));
    }
    Some(out)
}
