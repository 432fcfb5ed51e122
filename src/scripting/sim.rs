use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec3;
use mlua::{Lua, UserData, UserDataMethods, UserDataRef, Variadic};

use crate::command::Command;
use crate::sim::{self, SimContext};
use crate::units::UnitRef;

/// Registers the simulation accessors as globals. Each function unwraps its
/// argument tuple and forwards into the context object; nothing else.
pub(crate) fn install(lua: &Lua, sim: Rc<RefCell<SimContext>>) -> mlua::Result<()> {
    let end_sim = sim.clone();
    let end_game = lua.create_function(move |_lua, ()| {
        sim::end_game(&mut end_sim.borrow_mut());
        Ok(())
    })?;
    lua.globals().set("EndGame", end_game)?;

    let load_sim = sim.clone();
    let load_unit = lua.create_function(
        move |_lua, (def_name, x, y, z, team, build): (String, f32, f32, f32, i32, Option<bool>)| {
            let loaded = sim::load_unit(
                &mut load_sim.borrow_mut(),
                &def_name,
                Vec3::new(x, y, z),
                team,
                build.unwrap_or(false),
            );
            Ok(loaded.map(LuaUnit))
        },
    )?;
    lua.globals().set("LoadUnit", load_unit)?;

    let count_sim = sim.clone();
    let get_num_units_at =
        lua.create_function(move |_lua, (x, y, z, radius): (f32, f32, f32, Option<f32>)| {
            Ok(sim::count_units_at(
                &count_sim.borrow(),
                Vec3::new(x, y, z),
                radius.unwrap_or(0.0),
            ))
        })?;
    lua.globals().set("GetNumUnitsAt", get_num_units_at)?;

    let create_command = lua.create_function(|_lua, (id, params): (i32, Variadic<f32>)| {
        let mut cmd = Command::new(id);
        for param in params.iter() {
            cmd.push_param(*param);
        }
        Ok(LuaCommand(cmd))
    })?;
    lua.globals().set("CreateCommand", create_command)?;

    Ok(())
}

struct LuaUnit(UnitRef);

impl UserData for LuaUnit {
    fn add_methods<M: UserDataMethods<Self>>(methods: &mut M) {
        // Stale refs are tolerated silently; the unit may have died between
        // the frame that produced this handle and now.
        methods.add_method("GiveCommand", |_lua, this, cmd: UserDataRef<LuaCommand>| {
            sim::unit_give_command(&this.0, &cmd.0);
            Ok(())
        });
    }
}

struct LuaCommand(Command);

impl UserData for LuaCommand {
    fn add_methods<M: UserDataMethods<Self>>(methods: &mut M) {
        methods.add_method_mut("AddParam", |_lua, this, param: f32| {
            sim::command_add_param(&mut this.0, param);
            Ok(())
        });
    }
}
