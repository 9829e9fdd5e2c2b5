//! Declaration synthesis: override declarations and definition skeletons
//! rendered from [`MethodFact`]s.

use crate::cxx::facts::{MethodFact, ParamFact, TypeFact, TypeName};
use std::fmt;

/// How the function name is spelled in a rendered signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameStyle {
    /// `Parent::name`
    Qualified,
    /// `Parent<T>::name`, for out-of-line members of class templates
    OutOfLine,
    /// `name`
    Bare,
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeName::Plain(name) => f.write_str(name),
            TypeName::Specialization { template, args } => {
                write!(f, "{template}<")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_str(">")
            }
        }
    }
}

impl fmt::Display for TypeFact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.prefix, self.name, self.suffix)
    }
}

/// Renders without the default argument; see [`render_param`] to keep it.
impl fmt::Display for ParamFact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{} {}", self.ty, name),
            None => write!(f, "{}", self.ty),
        }
    }
}

pub fn render_param(param: &ParamFact, with_default: bool) -> String {
    match (&param.default_value, with_default) {
        (Some(value), true) => format!("{param} = {value}"),
        _ => param.to_string(),
    }
}

fn function_name(method: &MethodFact, style: NameStyle) -> String {
    if method.parent_qualified_name.is_empty() || style == NameStyle::Bare {
        return method.name.clone();
    }
    match (style, &method.parent_template_args) {
        (NameStyle::OutOfLine, Some(args)) => {
            format!("{}{}::{}", method.parent_qualified_name, args, method.name)
        }
        _ => method.qualified_name(),
    }
}

fn head(method: &MethodFact, style: NameStyle, with_defaults: bool) -> Vec<String> {
    let params = method
        .params
        .iter()
        .map(|p| render_param(p, with_defaults))
        .collect::<Vec<_>>()
        .join(", ");

    let mut parts = Vec::new();
    if let Some(ret) = &method.return_type {
        parts.push(ret.to_string());
    }
    parts.push(format!("{}({})", function_name(method, style), params));
    parts.extend(method.qualifiers.iter().cloned());
    parts
}

/// `[attributes] [Ret] Name(Params) [qualifiers]`, with fully qualified types.
pub fn signature(method: &MethodFact, style: NameStyle, with_defaults: bool) -> String {
    method
        .attributes
        .iter()
        .cloned()
        .chain(head(method, style, with_defaults))
        .collect::<Vec<_>>()
        .join(" ")
}

/// One `... override;` line. Never carries a body or default arguments.
///
/// The name is qualified with the declaring class; callers shorten it for
/// the place the line ends up in.
pub fn override_declaration(method: &MethodFact) -> String {
    format!("{} override;", signature(method, NameStyle::Qualified, false))
}

/// Empty out-of-line definition for a declaration:
///
/// ```text
/// [template <...>]
/// Ret Parent::name(Params) [qualifiers]
/// {
/// }
/// ```
pub fn definition_skeleton(method: &MethodFact) -> String {
    let mut out = String::new();
    if let Some(header) = &method.template_header {
        out.push_str(header);
        out.push('\n');
    }
    out.push_str(&head(method, NameStyle::OutOfLine, false).join(" "));
    out.push_str("\n{\n}\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cxx::facts::AccessSpecifier;

    fn method(name: &str, parent: &str, ret: Option<TypeFact>) -> MethodFact {
        MethodFact {
            name: name.to_string(),
            parent_qualified_name: parent.to_string(),
            return_type: ret,
            params: Vec::new(),
            qualifiers: Vec::new(),
            attributes: Vec::new(),
            template_header: None,
            parent_template_args: None,
            is_pure: true,
            is_virtual: true,
            is_defaulted: false,
            is_deleted: false,
            is_member: true,
            access: AccessSpecifier::Public,
            line: 0,
            signature_text: String::new(),
        }
    }

    fn param(ty: TypeFact, name: &str) -> ParamFact {
        ParamFact {
            ty,
            name: Some(name.to_string()),
            default_value: None,
        }
    }

    #[test]
    fn override_has_no_defaults() {
        let mut m = method("stop", "Runnable", Some(TypeFact::plain("int")));
        m.params.push(ParamFact {
            default_value: Some("100".to_string()),
            ..param(TypeFact::plain("unsigned int"), "timeout_ms")
        });
        assert_eq!(
            override_declaration(&m),
            "int Runnable::stop(unsigned int timeout_ms) override;"
        );
        assert_eq!(
            signature(&m, NameStyle::Bare, true),
            "int stop(unsigned int timeout_ms = 100)"
        );
    }

    #[test]
    fn override_keeps_attributes_and_qualifiers() {
        let mut m = method(
            "flush",
            "io::Sink",
            Some(TypeFact::plain("io::Buffer").with_prefix("const ").with_suffix("&")),
        );
        m.attributes.push("[[nodiscard]]".to_string());
        m.qualifiers = vec!["const".to_string(), "&".to_string(), "noexcept".to_string()];
        assert_eq!(
            override_declaration(&m),
            "[[nodiscard]] const io::Buffer& io::Sink::flush() const & noexcept override;"
        );
    }

    #[test]
    fn conversion_operator_has_no_return_type() {
        let mut m = method("operator bool", "Flag", None);
        m.qualifiers.push("const".to_string());
        assert_eq!(override_declaration(&m), "Flag::operator bool() const override;");
    }

    #[test]
    fn specialization_renders_arguments_in_order() {
        let ty = TypeFact {
            prefix: String::new(),
            name: TypeName::Specialization {
                template: "std::map".to_string(),
                args: vec![
                    TypeFact::plain("std::string"),
                    TypeFact {
                        prefix: String::new(),
                        name: TypeName::Specialization {
                            template: "std::vector".to_string(),
                            args: vec![TypeFact::plain("db::Row").with_suffix("*")],
                        },
                        suffix: String::new(),
                    },
                ],
            },
            suffix: "&".to_string(),
        };
        assert_eq!(ty.to_string(), "std::map<std::string, std::vector<db::Row*>>&");
    }

    #[test]
    fn skeleton_for_constructor_and_const_method() {
        let ctor = method("Boo", "Boo", None);
        assert_eq!(definition_skeleton(&ctor), "Boo::Boo()\n{\n}\n");

        let mut m = method("do_stuff", "Boo", Some(TypeFact::plain("detail::Baz")));
        m.qualifiers.push("const".to_string());
        assert_eq!(definition_skeleton(&m), "detail::Baz Boo::do_stuff() const\n{\n}\n");
    }

    #[test]
    fn skeleton_for_class_template_member() {
        let mut m = method("get", "Box", Some(TypeFact::plain("T").with_suffix("&")));
        m.template_header = Some("template <typename T>".to_string());
        m.parent_template_args = Some("<T>".to_string());
        m.params.push(param(TypeFact::plain("std::size_t"), "i"));
        assert_eq!(
            definition_skeleton(&m),
            "template <typename T>\nT& Box<T>::get(std::size_t i)\n{\n}\n"
        );
    }

    #[test]
    fn free_function_skeleton() {
        let mut m = method("log", "", Some(TypeFact::plain("void")));
        m.is_member = false;
        m.params.push(param(TypeFact::plain("char").with_prefix("const ").with_suffix("*"), "msg"));
        assert_eq!(definition_skeleton(&m), "void log(const char* msg)\n{\n}\n");
    }
}
