use crate::schema::{GenericArg, TypeRef, Variance};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Print `*` for every generic argument instead of the argument itself.
    pub erase_generics: bool,
}

/// Renders a type reference in the output grammar:
/// `name`, then `<args>` if any, then `?` if nullable.
pub fn render_type(ty: &TypeRef, opts: RenderOptions) -> String {
    let mut out = String::new();
    render_into(&mut out, ty, opts);
    out
}

fn render_into(out: &mut String, ty: &TypeRef, opts: RenderOptions) {
    out.push_str(&ty.qualified_name);

    if !ty.generic_args.is_empty() {
        out.push('<');
        for (i, arg) in ty.generic_args.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            if opts.erase_generics {
                out.push('*');
            } else {
                render_arg(out, arg, opts);
            }
        }
        out.push('>');
    }

    if ty.nullable {
        out.push('?');
    }
}

fn render_arg(out: &mut String, arg: &GenericArg, opts: RenderOptions) {
    let ty = match (arg.variance, &arg.ty) {
        (Variance::Star, _) | (_, None) => {
            out.push('*');
            return;
        }
        (_, Some(ty)) => ty,
    };
    if let Some(label) = arg.variance.label() {
        out.push_str(label);
        out.push(' ');
    }
    render_into(out, ty, opts);
}
