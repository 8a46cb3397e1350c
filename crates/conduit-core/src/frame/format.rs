//! Function name rendering for stack frames.
//!
//! The rendered name is built by running a fixed list of steps. Each step is
//! gated by one flag and appends its piece to the output, so the shape is always
//! `[module!]name(args)[ Line N]` whatever combination of flags is requested.

use super::FrameInfoFlags;
use crate::backend::StackFrame;

/// Appends one piece of the rendered name.
pub type Renderer<F> = fn(&F, FrameInfoFlags, &mut String);

/// Name of the implicit receiver parameter of methods.
const THIS: &str = "this";

/// The rendering steps in output order.
///
/// A step runs when the requested fields contain its flag. The name step is
/// gated by the empty set, so it always runs.
pub fn steps<F>() -> [(FrameInfoFlags, Renderer<F>); 4]
where
    F: StackFrame + ?Sized,
{
    [
        (FrameInfoFlags::FUNCNAME_MODULE, render_module::<F>),
        (FrameInfoFlags::empty(), render_name::<F>),
        (FrameInfoFlags::FUNCNAME_ARGS, render_arguments::<F>),
        (FrameInfoFlags::FUNCNAME_LINES, render_line::<F>),
    ]
}

/// Render the display name of `frame` according to `fields`.
///
/// ```rust,ignore
/// let fields = FrameInfoFlags::FUNCNAME | FrameInfoFlags::FUNCNAME_MODULE | FrameInfoFlags::FUNCNAME_LINES;
/// assert_eq!(format_function_name(&frame, fields), "game!Player::tick Line 42");
/// ```
pub fn format_function_name<F>(frame: &F, fields: FrameInfoFlags) -> String
where
    F: StackFrame + ?Sized,
{
    let mut name = String::new();
    for (flag, render) in steps::<F>() {
        if fields.contains(flag) {
            render(frame, fields, &mut name);
        }
    }
    name
}

/// Remove every leading `::` from `name`.
#[must_use]
pub fn strip_global_scope(mut name: &str) -> &str
{
    while let Some(rest) = name.strip_prefix("::") {
        name = rest;
    }
    name
}

fn render_module<F>(frame: &F, _fields: FrameInfoFlags, out: &mut String)
where
    F: StackFrame + ?Sized,
{
    if let Some(module) = frame.module_file_name() {
        out.push_str(&module);
        out.push('!');
    }
}

fn render_name<F>(frame: &F, _fields: FrameInfoFlags, out: &mut String)
where
    F: StackFrame + ?Sized,
{
    if let Some(name) = frame.function_name() {
        out.push_str(strip_global_scope(&name));
    }
}

fn render_arguments<F>(frame: &F, fields: FrameInfoFlags, out: &mut String)
where
    F: StackFrame + ?Sized,
{
    out.push('(');
    out.push_str(&format_arguments(frame, fields));
    out.push(')');
}

fn render_line<F>(frame: &F, _fields: FrameInfoFlags, out: &mut String)
where
    F: StackFrame + ?Sized,
{
    if let Some(entry) = frame.line_entry() {
        if entry.line != 0 {
            out.push_str(" Line ");
            out.push_str(&entry.line.to_string());
        }
    }
}

/// Render the argument list (without parentheses).
///
/// Iterates the declared parameter types. Names and values are taken from the
/// same position, shifted by one when the first parameter is `this`. Value slots
/// past the end of the live value list are left out.
pub fn format_arguments<F>(frame: &F, fields: FrameInfoFlags) -> String
where
    F: StackFrame + ?Sized,
{
    let Some(function) = frame.function() else {
        return String::new();
    };
    if function.argument_types.is_empty() {
        return String::new();
    }

    let show_types = fields.contains(FrameInfoFlags::FUNCNAME_ARGS_TYPES);
    let show_names = fields.contains(FrameInfoFlags::FUNCNAME_ARGS_NAMES);
    let values = if fields.contains(FrameInfoFlags::FUNCNAME_ARGS_VALUES) {
        Some(frame.argument_values())
    } else {
        None
    };

    let base = usize::from(function.argument_names.first().is_some_and(|name| name == THIS));

    let mut arguments = Vec::with_capacity(function.argument_types.len());
    for (position, type_name) in function.argument_types.iter().enumerate() {
        let index = base + position;
        let mut argument = String::new();
        if show_types {
            argument.push_str(type_name);
        }
        if show_names {
            if show_types {
                argument.push(' ');
            }
            if let Some(name) = function.argument_names.get(index) {
                argument.push_str(name);
            }
        }
        if let Some(value) = values.as_ref().and_then(|values| values.get(index)) {
            if show_types || show_names {
                argument.push_str(" = ");
            }
            argument.push_str(value);
        }
        arguments.push(argument);
    }
    arguments.join(", ")
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_strip_global_scope()
    {
        assert_eq!(strip_global_scope("::::Foo"), "Foo");
        assert_eq!(strip_global_scope("::ns::Foo"), "ns::Foo");
        assert_eq!(strip_global_scope("Foo::bar"), "Foo::bar");
        assert_eq!(strip_global_scope(":Foo"), ":Foo");
        assert_eq!(strip_global_scope("::"), "");
    }
}
