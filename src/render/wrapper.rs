//! `<base>_model.rs`: the editable wrapper around the generated model

use std::fmt::Write as _;

use super::{GENERATOR, RenderContext, Rendered, generated_file_name, render, wrapper_file_name};
use crate::error::Result;
use crate::model::TableModel;

pub fn render_wrapper(ctx: &RenderContext, model: &TableModel) -> Result<Rendered> {
    let ty = &model.type_name;
    let generated_module = generated_file_name(model);
    let generated_module = generated_module.trim_end_matches(".rs");

    render(wrapper_file_name(model), |out| {
        writeln!(out, "//! Custom queries for `{}.{}`.", model.schema, model.table)?;
        writeln!(out, "//!")?;
        writeln!(
            out,
            "//! Part of the `{}` package. Created once by {GENERATOR} and never overwritten;",
            ctx.package
        )?;
        writeln!(
            out,
            "//! generated operations come from `{generated_module}` through `Deref`."
        )?;
        writeln!(out)?;
        writeln!(out, "use std::ops::Deref;")?;
        writeln!(out)?;
        writeln!(out, "use super::{generated_module}::Default{ty}Model;")?;
        writeln!(out)?;
        writeln!(out, "/// Access to `{}.{}`.", model.schema, model.table)?;
        writeln!(out, "#[derive(Debug, Clone, Copy, Default)]")?;
        writeln!(out, "pub struct {ty}Model {{")?;
        writeln!(out, "    base: Default{ty}Model,")?;
        writeln!(out, "}}")?;
        writeln!(out)?;
        writeln!(out, "impl {ty}Model {{")?;
        writeln!(out, "    pub const fn new() -> Self {{")?;
        writeln!(out, "        Self {{")?;
        writeln!(out, "            base: Default{ty}Model::new(),")?;
        writeln!(out, "        }}")?;
        writeln!(out, "    }}")?;
        writeln!(out, "}}")?;
        writeln!(out)?;
        writeln!(out, "impl Deref for {ty}Model {{")?;
        writeln!(out, "    type Target = Default{ty}Model;")?;
        writeln!(out)?;
        writeln!(out, "    fn deref(&self) -> &Self::Target {{")?;
        writeln!(out, "        &self.base")?;
        writeln!(out, "    }}")?;
        writeln!(out, "}}")
    })
}
