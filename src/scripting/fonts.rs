use std::cell::{Cell, RefCell};
use std::rc::Rc;

use mlua::{Lua, MetaMethod, MultiValue, UserData, UserDataMethods, UserDataRef, Value};
use tracing::warn;

use crate::error::EngineError;
use crate::fonts::{
    DrawOptions, FontArena, FontFace, FontId, FontLoader, DEFAULT_FONT_SIZE,
    DEFAULT_OUTLINE_WEIGHT, DEFAULT_OUTLINE_WIDTH, DEFAULT_TEXT_COLOR,
};

/// Registers `LoadFont`/`DeleteFont` and the font handle userdata type.
pub(crate) fn install(
    lua: &Lua,
    fonts: Rc<RefCell<FontArena>>,
    loader: Rc<dyn FontLoader>,
    drawing: Rc<Cell<bool>>,
) -> mlua::Result<()> {
    let load_fonts = fonts.clone();
    let load_drawing = drawing.clone();
    let load_font = lua.create_function(
        move |_lua,
              (path, size, outline_width, outline_weight): (
            String,
            Option<i32>,
            Option<i32>,
            Option<f32>,
        )| {
            let size = size.unwrap_or(DEFAULT_FONT_SIZE);
            let outline_width = outline_width.unwrap_or(DEFAULT_OUTLINE_WIDTH);
            let outline_weight = outline_weight.unwrap_or(DEFAULT_OUTLINE_WEIGHT);
            match loader.load(&path, size, outline_width, outline_weight) {
                Ok(face) => {
                    let id = load_fonts.borrow_mut().insert(face);
                    Ok(Some(FontHandle {
                        id,
                        fonts: load_fonts.clone(),
                        drawing: load_drawing.clone(),
                    }))
                }
                Err(err) => {
                    warn!("[Rampart fonts] {err}");
                    Ok(None)
                }
            }
        },
    )?;
    lua.globals().set("LoadFont", load_font)?;

    let delete_font = lua.create_function(|_lua, handle: Option<UserDataRef<FontHandle>>| {
        if let Some(handle) = handle {
            handle.release();
        }
        Ok(())
    })?;
    lua.globals().set("DeleteFont", delete_font)?;

    Ok(())
}

struct FontHandle {
    id: FontId,
    fonts: Rc<RefCell<FontArena>>,
    drawing: Rc<Cell<bool>>,
}

impl FontHandle {
    fn with_face<R>(&self, f: impl FnOnce(&mut dyn FontFace) -> R) -> mlua::Result<R> {
        let mut fonts = self.fonts.borrow_mut();
        let face = fonts.get_mut(self.id).map_err(mlua::Error::from)?;
        Ok(f(face))
    }

    fn check_drawing(&self, caller: &'static str) -> mlua::Result<()> {
        if self.drawing.get() {
            Ok(())
        } else {
            Err(EngineError::NoDrawContext { caller }.into())
        }
    }

    fn release(&self) {
        self.fonts.borrow_mut().release(self.id);
    }
}

impl Drop for FontHandle {
    fn drop(&mut self) {
        // The VM may collect a handle while another binding call holds the
        // arena; never panic inside a finalizer.
        if let Ok(mut fonts) = self.fonts.try_borrow_mut() {
            fonts.release(self.id);
        }
    }
}

/// Property lookup outcome; method lookup happens before this in the VM's
/// own userdata dispatch.
enum FontProperty {
    Number(f64),
    Text(String),
}

fn property(face: &dyn FontFace, key: &str) -> Option<FontProperty> {
    let value = match key {
        "size" => FontProperty::Number(f64::from(face.size())),
        "path" => FontProperty::Text(face.file_path().to_string()),
        "height" | "lineheight" => FontProperty::Number(f64::from(face.line_height())),
        "descender" => FontProperty::Number(f64::from(face.descender())),
        "outlinewidth" => FontProperty::Number(f64::from(face.outline_width())),
        "outlineweight" => FontProperty::Number(f64::from(face.outline_weight())),
        "family" => FontProperty::Text(face.family().to_string()),
        "style" => FontProperty::Text(face.style().to_string()),
        "texturewidth" => FontProperty::Number(f64::from(face.texture_width())),
        "textureheight" => FontProperty::Number(f64::from(face.texture_height())),
        _ => return None,
    };
    Some(value)
}

impl UserData for FontHandle {
    fn add_methods<M: UserDataMethods<Self>>(methods: &mut M) {
        methods.add_method(
            "Print",
            |_lua,
             this,
             (text, x, y, size, options): (String, f32, f32, Option<f32>, Option<String>)| {
                this.check_drawing("Print")?;
                let options = DrawOptions::parse(options.as_deref());
                this.with_face(|face| {
                    let size = size.unwrap_or_else(|| face.size());
                    face.print(x, y, size, options, &text);
                })
            },
        );

        methods.add_method("Begin", |_lua, this, ()| {
            this.check_drawing("Begin")?;
            this.with_face(|face| face.begin())
        });

        methods.add_method("End", |_lua, this, ()| {
            this.check_drawing("End")?;
            this.with_face(|face| face.end())
        });

        methods.add_method(
            "WrapText",
            |_lua,
             this,
             (text, max_width, max_height, size): (String, f32, Option<f32>, Option<f32>)| {
                this.with_face(|face| {
                    let mut text = text;
                    let size = size.unwrap_or_else(|| face.size());
                    let lines =
                        face.wrap_in_place(&mut text, size, max_width, max_height.unwrap_or(1e9));
                    (text, lines)
                })
            },
        );

        methods.add_method("GetTextWidth", |_lua, this, text: String| {
            this.with_face(|face| face.text_width(&text))
        });

        methods.add_method("GetTextHeight", |_lua, this, text: String| {
            this.with_face(|face| {
                let extents = face.text_extents(&text);
                (extents.height, extents.descender, extents.lines)
            })
        });

        methods.add_method("SetTextColor", |_lua, this, args: MultiValue| {
            let color = parse_color("SetTextColor", args)?;
            this.with_face(|face| face.set_text_color(color))
        });

        methods.add_method("SetOutlineColor", |_lua, this, args: MultiValue| {
            let color = parse_color("SetOutlineColor", args)?;
            this.with_face(|face| face.set_outline_color(color))
        });

        methods.add_method("SetAutoOutlineColor", |_lua, this, enabled: bool| {
            this.with_face(|face| face.set_auto_outline_color(enabled))
        });

        methods.add_method("BindTexture", |_lua, this, ()| {
            this.check_drawing("BindTexture")?;
            this.with_face(|face| face.bind_texture())
        });

        // Registered methods resolve first; this only sees property reads
        // and unknown names, which come back as nil rather than an error.
        methods.add_meta_method(MetaMethod::Index, |lua, this, key: Value| {
            let Value::String(key) = key else {
                return Ok(Value::Nil);
            };
            let key = key.to_string_lossy();
            let looked_up = {
                let fonts = this.fonts.borrow();
                let face = fonts.get(this.id).map_err(mlua::Error::from)?;
                property(face, key.as_ref())
            };
            match looked_up {
                Some(FontProperty::Number(n)) => Ok(Value::Number(n)),
                Some(FontProperty::Text(s)) => Ok(Value::String(lua.create_string(&s)?)),
                None => Ok(Value::Nil),
            }
        });
    }
}

fn argument_error(caller: &'static str) -> mlua::Error {
    mlua::Error::RuntimeError(format!("Incorrect arguments to font:{caller}(color)"))
}

/// Accepts a 3-or-4 element numeric table, 3-4 discrete numbers, or nil to
/// reset; a missing alpha defaults to 1.0.
fn parse_color(caller: &'static str, args: MultiValue) -> mlua::Result<[f32; 4]> {
    let mut args = args.into_iter();
    let Some(first) = args.next() else {
        return Err(argument_error(caller));
    };

    match first {
        Value::Nil => Ok(DEFAULT_TEXT_COLOR),
        Value::Table(table) => {
            let mut color = [0.0f32; 4];
            let mut count = 0usize;
            for item in table.sequence_values::<f32>() {
                if count >= 4 {
                    break;
                }
                color[count] = item.map_err(|_| argument_error(caller))?;
                count += 1;
            }
            if count < 3 {
                return Err(argument_error(caller));
            }
            if count == 3 {
                color[3] = 1.0;
            }
            Ok(color)
        }
        first => {
            let rest: Vec<Value> = args.collect();
            if rest.len() < 2 {
                return Err(argument_error(caller));
            }
            let mut color = [0.0f32, 0.0, 0.0, 1.0];
            color[0] = number(&first).ok_or_else(|| argument_error(caller))?;
            color[1] = number(&rest[0]).ok_or_else(|| argument_error(caller))?;
            color[2] = number(&rest[1]).ok_or_else(|| argument_error(caller))?;
            match rest.get(2) {
                None | Some(Value::Nil) => {}
                Some(alpha) => {
                    color[3] = number(alpha).ok_or_else(|| argument_error(caller))?;
                }
            }
            Ok(color)
        }
    }
}

fn number(value: &Value) -> Option<f32> {
    match value {
        Value::Integer(i) => Some(*i as f32),
        Value::Number(n) => Some(*n as f32),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn multi(values: Vec<Value>) -> MultiValue {
        MultiValue::from_iter(values)
    }

    #[test]
    fn three_discrete_numbers_default_alpha_to_one() {
        let color = parse_color(
            "SetTextColor",
            multi(vec![
                Value::Number(0.25),
                Value::Number(0.5),
                Value::Integer(1),
            ]),
        )
        .expect("valid color");
        assert_eq!(color, [0.25, 0.5, 1.0, 1.0]);
    }

    #[test]
    fn four_discrete_numbers_pass_through_exactly() {
        let color = parse_color(
            "SetOutlineColor",
            multi(vec![
                Value::Number(0.1),
                Value::Number(0.2),
                Value::Number(0.3),
                Value::Number(0.4),
            ]),
        )
        .expect("valid color");
        assert_eq!(color, [0.1, 0.2, 0.3, 0.4]);
    }

    #[test]
    fn too_few_components_is_an_argument_error() {
        assert!(parse_color(
            "SetTextColor",
            multi(vec![Value::Number(0.1), Value::Number(0.2)])
        )
        .is_err());
        assert!(parse_color("SetTextColor", multi(vec![Value::Boolean(true)])).is_err());
        assert!(parse_color("SetTextColor", multi(Vec::new())).is_err());
    }

    #[test]
    fn nil_resets_to_the_default_color() {
        let color = parse_color("SetTextColor", multi(vec![Value::Nil])).expect("reset");
        assert_eq!(color, DEFAULT_TEXT_COLOR);
    }
}
