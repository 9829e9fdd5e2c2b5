use crate::cxx::facts::ClassFact;
use crate::cxx::oracle::TranslationUnit;
use crate::scope::{remove_all_scopes, remove_scope};
use crate::synth::override_declaration;

/// Override declarations for every pure-virtual method `interface` leaves to
/// its implementors.
///
/// Inherited methods come first, base by base in [`TranslationUnit::transitive_bases`]
/// order, then the interface's own, in declaration order. Each declaration
/// has its declaring class's qualifier removed, then every scope of
/// `implementor` that would be redundant where the text lands. Identical
/// signatures reached through different bases are all kept, but a base shared
/// along several paths (a diamond) contributes its methods once.
///
/// Unlike every other pure virtual, a pure virtual destructor is not emitted;
/// the implementor's implicit destructor already overrides it.
pub fn collect_override_declarations(
    unit: &TranslationUnit,
    interface: &ClassFact,
    implementor: &str,
) -> Vec<String> {
    unit.transitive_bases(interface)
        .into_iter()
        .chain(std::iter::once(interface))
        .flat_map(|class| {
            class
                .pure_virtuals
                .iter()
                .filter(|method| !method.is_destructor())
                .map(move |method| {
                    let declaration = override_declaration(method);
                    let own = remove_scope(&declaration, &class.qualified_name);
                    remove_all_scopes(&own, implementor)
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cxx::{DeclarationOracle, TreeSitterOracle};
    use std::path::Path;

    fn unit(source: &str) -> TranslationUnit {
        TreeSitterOracle::new()
            .parse(source, Path::new("main.cpp"))
            .unwrap()
    }

    #[test]
    fn bases_first_then_own() {
        let u = unit(
            "struct Closeable { virtual void close() = 0; };\n\
             struct Stream : Closeable {\n    virtual int read(char* buf, int n) = 0;\n    void helper();\n};\n",
        );
        let stream = u.find_class_by_name("Stream").unwrap();
        assert_eq!(
            collect_override_declarations(&u, stream, "Impl"),
            vec![
                "void close() override;".to_string(),
                "int read(char* buf, int n) override;".to_string(),
            ]
        );
    }

    #[test]
    fn implementor_scopes_are_shortened() {
        let u = unit(
            "namespace net {\nstruct Packet {};\nstruct Handler {\n    virtual void on(const Packet& p) = 0;\n};\n}\n",
        );
        let handler = u.find_class_by_name("Handler").unwrap();

        assert_eq!(
            collect_override_declarations(&u, handler, "net::Server"),
            vec!["void on(const Packet& p) override;".to_string()]
        );
        assert_eq!(
            collect_override_declarations(&u, handler, "Server"),
            vec!["void on(const net::Packet& p) override;".to_string()]
        );
    }

    #[test]
    fn pure_virtual_destructor_is_skipped() {
        let u = unit("struct Shape {\n    virtual ~Shape() = 0;\n    virtual double area() const = 0;\n};\n");
        let shape = u.find_class_by_name("Shape").unwrap();
        assert!(u.is_abstract(shape));
        assert_eq!(
            collect_override_declarations(&u, shape, "Circle"),
            vec!["double area() const override;".to_string()]
        );
    }

    #[test]
    fn diamond_shared_base_is_collected_once() {
        let u = unit(
            "struct Root { virtual void tick() = 0; };\n\
             struct Left : Root { virtual void left() = 0; };\n\
             struct Right : Root { virtual void right() = 0; };\n\
             struct Diamond : Left, Right { virtual void own() = 0; };\n",
        );
        let diamond = u.find_class_by_name("Diamond").unwrap();
        assert_eq!(
            collect_override_declarations(&u, diamond, "Impl"),
            vec![
                "void tick() override;",
                "void left() override;",
                "void right() override;",
                "void own() override;",
            ]
        );
    }

    #[test]
    fn duplicates_across_bases_are_kept() {
        let u = unit(
            "struct A { virtual void tick() = 0; };\n\
             struct B { virtual void tick() = 0; };\n\
             struct Both : A, B {};\n",
        );
        let both = u.find_class_by_name("Both").unwrap();
        let decls = collect_override_declarations(&u, both, "Impl");
        assert_eq!(decls, vec!["void tick() override;", "void tick() override;"]);
    }
}
