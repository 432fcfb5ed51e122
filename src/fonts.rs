use crate::error::EngineError;

pub const DEFAULT_FONT_SIZE: i32 = 14;
pub const DEFAULT_OUTLINE_WIDTH: i32 = 2;
pub const DEFAULT_OUTLINE_WEIGHT: f32 = 15.0;
pub const DEFAULT_TEXT_COLOR: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

/// Horizontal/vertical alignment and styling flags for a single draw call.
/// Nearest-filtering starts enabled and is toggled, not set, by its flag.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct DrawOptions(u32);

impl DrawOptions {
    pub const CENTER: DrawOptions = DrawOptions(1 << 0);
    pub const RIGHT: DrawOptions = DrawOptions(1 << 1);
    pub const ASCENDER: DrawOptions = DrawOptions(1 << 2);
    pub const TOP: DrawOptions = DrawOptions(1 << 3);
    pub const VCENTER: DrawOptions = DrawOptions(1 << 4);
    pub const BASELINE: DrawOptions = DrawOptions(1 << 5);
    pub const BOTTOM: DrawOptions = DrawOptions(1 << 6);
    pub const DESCENDER: DrawOptions = DrawOptions(1 << 7);
    pub const SHADOW: DrawOptions = DrawOptions(1 << 8);
    pub const OUTLINE: DrawOptions = DrawOptions(1 << 9);
    pub const NEAREST: DrawOptions = DrawOptions(1 << 10);

    /// One flag per character; unknown characters are ignored.
    pub fn parse(spec: Option<&str>) -> Self {
        let mut options = DrawOptions::NEAREST;
        let Some(spec) = spec else {
            return options;
        };
        for c in spec.chars() {
            match c {
                'c' => options = options.with(DrawOptions::CENTER),
                'r' => options = options.with(DrawOptions::RIGHT),

                'a' => options = options.with(DrawOptions::ASCENDER),
                't' => options = options.with(DrawOptions::TOP),
                'v' => options = options.with(DrawOptions::VCENTER),
                'x' => options = options.with(DrawOptions::BASELINE),
                'b' => options = options.with(DrawOptions::BOTTOM),
                'd' => options = options.with(DrawOptions::DESCENDER),

                's' => options = options.with(DrawOptions::SHADOW),
                'o' | 'O' => options = options.with(DrawOptions::OUTLINE),

                'n' => options = options.toggled(DrawOptions::NEAREST),
                _ => {}
            }
        }
        options
    }

    pub fn contains(self, flag: DrawOptions) -> bool {
        self.0 & flag.0 == flag.0
    }

    fn with(self, flag: DrawOptions) -> Self {
        DrawOptions(self.0 | flag.0)
    }

    fn toggled(self, flag: DrawOptions) -> Self {
        DrawOptions(self.0 ^ flag.0)
    }
}

impl Default for DrawOptions {
    fn default() -> Self {
        DrawOptions::NEAREST
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TextExtents {
    pub height: f32,
    pub descender: f32,
    pub lines: u32,
}

/// A loaded font face inside the engine's renderer. Shaping, wrapping,
/// metrics and the glyph atlas all live behind this seam.
pub trait FontFace {
    fn size(&self) -> f32;
    fn file_path(&self) -> &str;
    fn line_height(&self) -> f32;
    fn descender(&self) -> f32;
    fn outline_width(&self) -> f32;
    fn outline_weight(&self) -> f32;
    fn family(&self) -> &str;
    fn style(&self) -> &str;
    fn texture_width(&self) -> u32;
    fn texture_height(&self) -> u32;

    fn print(&mut self, x: f32, y: f32, size: f32, options: DrawOptions, text: &str);
    fn begin(&mut self);
    fn end(&mut self);
    fn bind_texture(&mut self);

    /// Rewrites `text` with line breaks inserted and returns the line count.
    fn wrap_in_place(&self, text: &mut String, size: f32, max_width: f32, max_height: f32) -> u32;
    fn text_width(&self, text: &str) -> f32;
    fn text_extents(&self, text: &str) -> TextExtents;

    fn set_text_color(&mut self, color: [f32; 4]);
    fn set_outline_color(&mut self, color: [f32; 4]);
    fn set_auto_outline_color(&mut self, enabled: bool);
}

pub trait FontLoader {
    fn load(
        &self,
        path: &str,
        size: i32,
        outline_width: i32,
        outline_weight: f32,
    ) -> Result<Box<dyn FontFace>, EngineError>;
}

/// Handle into a [`FontArena`] slot. Stale after the slot is released; the
/// generation guarantees a reused slot never resolves through an old id.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct FontId {
    index: usize,
    generation: u64,
}

struct FontSlot {
    generation: u64,
    face: Option<Box<dyn FontFace>>,
}

/// Owns loaded faces on behalf of the scripting VM's collector. Release
/// tombstones the slot rather than shifting anything, so ids stay cheap to
/// validate.
#[derive(Default)]
pub struct FontArena {
    slots: Vec<FontSlot>,
    free: Vec<usize>,
}

impl FontArena {
    pub fn insert(&mut self, face: Box<dyn FontFace>) -> FontId {
        match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index];
                slot.face = Some(face);
                FontId {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                self.slots.push(FontSlot {
                    generation: 0,
                    face: Some(face),
                });
                FontId {
                    index: self.slots.len() - 1,
                    generation: 0,
                }
            }
        }
    }

    pub fn get(&self, id: FontId) -> Result<&dyn FontFace, EngineError> {
        self.slots
            .get(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.face.as_deref())
            .ok_or(EngineError::DeletedFont)
    }

    pub fn get_mut(&mut self, id: FontId) -> Result<&mut (dyn FontFace + 'static), EngineError> {
        self.slots
            .get_mut(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.face.as_deref_mut())
            .ok_or(EngineError::DeletedFont)
    }

    /// Drops the face and tombstones the slot. Idempotent: a second release
    /// of the same id is a no-op and reports `false`.
    pub fn release(&mut self, id: FontId) -> bool {
        let Some(slot) = self.slots.get_mut(id.index) else {
            return false;
        };
        if slot.generation != id.generation || slot.face.is_none() {
            return false;
        }
        slot.face = None;
        slot.generation += 1;
        self.free.push(id.index);
        true
    }

    pub fn live_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.face.is_some()).count()
    }
}
