//! Ash C++ Emitter
//!
//! Lowers a checked [`TypedProgram`] to a single C++ translation unit.
//! The generated code relies on an external conservative mark-and-sweep
//! allocator exposed as `ash_gc_init` / `ash_gc_alloc` / `ash_gc_collect`.
//!
//! Every user type gets two layouts: a linear one with by-value fields,
//! and a `__gc` one in which user-typed fields are handles. The checker's
//! managed-boundary rule guarantees a construction never mixes the two.
//! Field access through a managed handle lowers to `->`, linear access
//! to `.`; managed constructions lower to placement-new into
//! `ash_gc_alloc`.

mod error;

pub use error::CodegenError;

use std::collections::{HashMap, HashSet};

use ash_ast::PassMode;
use ash_types::{
    AllocKind, ResolvedType, TypedExpr, TypedExprKind, TypedFunction, TypedProgram, TypedResource,
    TypedStmt,
};

/// C++ code generator for a typed Ash program.
pub struct CppGenerator {
    output: String,
    indent: usize,
    /// Declared field order per user type, for aggregate initializers
    field_orders: HashMap<String, Vec<(String, ResolvedType)>>,
}

impl Default for CppGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl CppGenerator {
    pub fn new() -> Self {
        Self {
            output: String::new(),
            indent: 0,
            field_orders: HashMap::new(),
        }
    }

    /// Generate the full translation unit.
    pub fn generate(&mut self, program: &TypedProgram) -> Result<String, CodegenError> {
        for s in &program.structs {
            self.field_orders.insert(s.name.clone(), s.fields.clone());
        }
        for r in &program.resources {
            self.field_orders.insert(r.name.clone(), r.fields.clone());
        }

        self.emit_prelude();
        self.emit_layouts(program)?;
        self.emit_functions(program)?;
        self.emit_entry_point();

        Ok(std::mem::take(&mut self.output))
    }

    // --- Output helpers ---

    fn line(&mut self, text: &str) {
        for _ in 0..self.indent {
            self.output.push_str("    ");
        }
        self.output.push_str(text);
        self.output.push('\n');
    }

    fn blank(&mut self) {
        self.output.push('\n');
    }

    // --- Prelude ---

    fn emit_prelude(&mut self) {
        self.line("// Generated by ashc. Do not edit.");
        self.line("#include <cstddef>");
        self.line("#include <cstdio>");
        self.line("#include <new>");
        self.blank();
        self.line("extern \"C\" {");
        self.line("void ash_gc_init();");
        self.line("void* ash_gc_alloc(std::size_t size);");
        self.line("void ash_gc_collect();");
        self.line("}");
        self.blank();
        self.line("struct ash_unit {};");
        self.blank();
    }

    // --- Type mapping ---

    fn cpp_type(&self, ty: &ResolvedType) -> String {
        match ty {
            ResolvedType::Int => "long".to_string(),
            ResolvedType::Bool => "bool".to_string(),
            ResolvedType::Unit => "ash_unit".to_string(),
            ResolvedType::Named(name) => name.clone(),
            ResolvedType::Managed(inner) => format!("{}*", self.gc_base(inner)),
        }
    }

    /// Layout type used for a field inside a `__gc` struct: user-typed
    /// fields become handles to managed layouts.
    fn cpp_gc_field_type(&self, ty: &ResolvedType) -> String {
        match ty {
            ResolvedType::Named(name) => format!("{}__gc*", name),
            other => self.cpp_type(other),
        }
    }

    fn gc_base(&self, ty: &ResolvedType) -> String {
        match ty {
            ResolvedType::Named(name) => format!("{}__gc", name),
            other => self.cpp_type(other),
        }
    }

    /// Const-qualify the top level of a type. Managed handles are
    /// pointers, so their const goes after the `*`; `const T*` would
    /// instead freeze the pointee and break handle copies.
    fn const_qualified(&self, ty: &ResolvedType) -> String {
        let cpp = self.cpp_type(ty);
        if matches!(ty, ResolvedType::Managed(_)) {
            format!("{} const", cpp)
        } else {
            format!("const {}", cpp)
        }
    }

    // --- Struct and resource layouts ---

    fn emit_layouts(&mut self, program: &TypedProgram) -> Result<(), CodegenError> {
        // Managed layouts reference each other through pointers only, so
        // forward declarations suffice.
        for s in &program.structs {
            self.line(&format!("struct {}__gc;", s.name));
        }
        for r in &program.resources {
            self.line(&format!("struct {}__gc;", r.name));
        }
        if !program.structs.is_empty() || !program.resources.is_empty() {
            self.blank();
        }

        // Linear layouts hold user-typed fields by value and must be
        // emitted in dependency order.
        let order = self.value_layout_order(program)?;
        let resources: HashMap<&str, &TypedResource> = program
            .resources
            .iter()
            .map(|r| (r.name.as_str(), r))
            .collect();

        for name in order {
            let fields = self.field_orders[&name].clone();
            self.line(&format!("struct {} {{", name));
            self.indent += 1;
            for (field, ty) in &fields {
                let cpp = self.cpp_type(ty);
                self.line(&format!("{} {};", cpp, field));
            }
            if let Some(resource) = resources.get(name.as_str()) {
                if let Some(cleanup) = resource.cleanup.clone() {
                    self.line(&format!("~{}() {{", name));
                    self.indent += 1;
                    for stmt in &cleanup {
                        self.emit_stmt(stmt);
                    }
                    self.indent -= 1;
                    self.line("}");
                }
            }
            self.indent -= 1;
            self.line("};");
            self.blank();

            self.line(&format!("struct {}__gc {{", name));
            self.indent += 1;
            for (field, ty) in &fields {
                let cpp = self.cpp_gc_field_type(ty);
                self.line(&format!("{} {};", cpp, field));
            }
            self.indent -= 1;
            self.line("};");
            self.blank();
        }

        Ok(())
    }

    /// Topological order of linear layouts over by-value field edges.
    fn value_layout_order(&self, program: &TypedProgram) -> Result<Vec<String>, CodegenError> {
        let declared: Vec<String> = program
            .structs
            .iter()
            .map(|s| s.name.clone())
            .chain(program.resources.iter().map(|r| r.name.clone()))
            .collect();

        let mut order = Vec::new();
        let mut done: HashSet<String> = HashSet::new();
        let mut visiting: HashSet<String> = HashSet::new();

        for name in &declared {
            self.visit_layout(name, &mut order, &mut done, &mut visiting)?;
        }
        Ok(order)
    }

    fn visit_layout(
        &self,
        name: &str,
        order: &mut Vec<String>,
        done: &mut HashSet<String>,
        visiting: &mut HashSet<String>,
    ) -> Result<(), CodegenError> {
        if done.contains(name) {
            return Ok(());
        }
        if !visiting.insert(name.to_string()) {
            return Err(CodegenError::RecursiveLayout(name.to_string()));
        }

        let fields = self
            .field_orders
            .get(name)
            .ok_or_else(|| CodegenError::UnknownType(name.to_string()))?;
        for (_, ty) in fields {
            if let ResolvedType::Named(dep) = ty {
                self.visit_layout(dep, order, done, visiting)?;
            }
        }

        visiting.remove(name);
        done.insert(name.to_string());
        order.push(name.to_string());
        Ok(())
    }

    // --- Functions ---

    fn emit_functions(&mut self, program: &TypedProgram) -> Result<(), CodegenError> {
        for f in &program.functions {
            let proto = self.function_signature(f);
            self.line(&format!("{};", proto));
        }
        if !program.functions.is_empty() {
            self.blank();
        }

        for f in &program.functions {
            let proto = self.function_signature(f);
            self.line(&format!("{} {{", proto));
            self.indent += 1;
            for stmt in &f.body {
                self.emit_stmt(stmt);
            }
            self.indent -= 1;
            self.line("}");
            self.blank();
        }
        Ok(())
    }

    fn function_signature(&self, f: &TypedFunction) -> String {
        let ret = if f.ret == ResolvedType::Unit {
            "void".to_string()
        } else {
            self.cpp_type(&f.ret)
        };
        let params: Vec<String> = f
            .params
            .iter()
            .map(|p| {
                match p.mode {
                    PassMode::Move { .. } => format!("{} {}", self.cpp_type(&p.ty), p.name),
                    PassMode::Ref => format!("{}& {}", self.const_qualified(&p.ty), p.name),
                    PassMode::Inout => format!("{}& {}", self.cpp_type(&p.ty), p.name),
                }
            })
            .collect();
        format!("{} ash_{}({})", ret, f.name, params.join(", "))
    }

    fn emit_entry_point(&mut self) {
        self.line("int main() {");
        self.indent += 1;
        self.line("ash_gc_init();");
        self.line("ash_main();");
        self.line("return 0;");
        self.indent -= 1;
        self.line("}");
    }

    // --- Statements ---

    fn emit_stmt(&mut self, stmt: &TypedStmt) {
        match stmt {
            TypedStmt::Let {
                name,
                ty,
                value,
                is_mut,
            } => {
                let init = self.emit_value(value);
                let decl = if *is_mut || *ty == ResolvedType::Unit {
                    self.cpp_type(ty)
                } else {
                    self.const_qualified(ty)
                };
                self.line(&format!("{} {} = {};", decl, name, init));
            }
            TypedStmt::Assign { target, value } => {
                let place = self.emit_expr(target);
                let rhs = self.emit_value(value);
                self.line(&format!("{} = {};", place, rhs));
            }
            TypedStmt::Expr(expr) => {
                let code = self.emit_expr(expr);
                self.line(&format!("(void)({});", code));
            }
            TypedStmt::Return(None) => {
                self.line("return;");
            }
            TypedStmt::Return(Some(expr)) => {
                if expr.ty == ResolvedType::Unit {
                    let code = self.emit_expr(expr);
                    self.line(&format!("(void)({});", code));
                    self.line("return;");
                } else {
                    let code = self.emit_value(expr);
                    self.line(&format!("return {};", code));
                }
            }
            TypedStmt::Block(stmts) => {
                self.line("{");
                self.indent += 1;
                for s in stmts {
                    self.emit_stmt(s);
                }
                self.indent -= 1;
                self.line("}");
            }
        }
    }

    // --- Expressions ---

    /// Emit an expression in value position. Unit-typed expressions are
    /// wrapped so they yield an `ash_unit` value regardless of the C++
    /// type of the underlying expression.
    fn emit_value(&self, expr: &TypedExpr) -> String {
        if expr.ty == ResolvedType::Unit {
            format!("({}, ash_unit{{}})", self.emit_expr(expr))
        } else {
            self.emit_expr(expr)
        }
    }

    fn emit_expr(&self, expr: &TypedExpr) -> String {
        match &expr.kind {
            TypedExprKind::Int(n) => n.to_string(),
            TypedExprKind::Bool(b) => b.to_string(),
            TypedExprKind::Var(name) => name.clone(),
            TypedExprKind::Binary { op, left, right } => {
                format!("({} {} {})", self.emit_expr(left), op, self.emit_expr(right))
            }
            TypedExprKind::Field {
                object,
                field,
                via_managed,
                ..
            } => {
                let access = if *via_managed { "->" } else { "." };
                format!("{}{}{}", self.emit_expr(object), access, field)
            }
            TypedExprKind::Call { callee, args } => {
                let rendered: Vec<String> = args.iter().map(|a| self.emit_value(a)).collect();
                format!("ash_{}({})", callee, rendered.join(", "))
            }
            TypedExprKind::StructLit {
                name,
                fields,
                alloc,
            } => self.emit_struct_lit(name, fields, *alloc),
            TypedExprKind::Println {
                newline,
                format,
                args,
            } => self.emit_println(*newline, format, args),
        }
    }

    /// Aggregate-initialize in declared field order; managed allocations
    /// placement-new into the external allocator.
    fn emit_struct_lit(
        &self,
        name: &str,
        fields: &[(String, TypedExpr)],
        alloc: AllocKind,
    ) -> String {
        let declared = &self.field_orders[name];
        let by_name: HashMap<&str, &TypedExpr> = fields
            .iter()
            .map(|(f, e)| (f.as_str(), e))
            .collect();
        let args: Vec<String> = declared
            .iter()
            .map(|(f, _)| self.emit_value(by_name[f.as_str()]))
            .collect();

        match alloc {
            AllocKind::Linear => format!("{}{{{}}}", name, args.join(", ")),
            AllocKind::Managed => format!(
                "new (ash_gc_alloc(sizeof({0}__gc))) {0}__gc{{{1}}}",
                name,
                args.join(", ")
            ),
        }
    }

    /// Lower a `println` to `std::printf`. `{}` holes are mapped per
    /// argument type; values printf cannot represent are evaluated for
    /// effect and rendered as fixed text.
    fn emit_println(&self, newline: bool, format: &str, args: &[TypedExpr]) -> String {
        let mut fmt = String::new();
        let mut pf_args = Vec::new();
        let mut effects = Vec::new();
        let mut next_arg = 0usize;

        let mut chars = format.chars().peekable();
        while let Some(ch) = chars.next() {
            if ch == '{' && chars.peek() == Some(&'}') {
                chars.next();
                match args.get(next_arg) {
                    Some(arg) => {
                        next_arg += 1;
                        match &arg.ty {
                            ResolvedType::Int => {
                                fmt.push_str("%ld");
                                pf_args.push(self.emit_expr(arg));
                            }
                            ResolvedType::Bool => {
                                fmt.push_str("%d");
                                pf_args.push(format!("(int)({})", self.emit_expr(arg)));
                            }
                            ResolvedType::Managed(_) => {
                                fmt.push_str("%p");
                                pf_args.push(format!("(void*)({})", self.emit_expr(arg)));
                            }
                            ResolvedType::Unit => {
                                fmt.push_str("()");
                                effects.push(self.emit_expr(arg));
                            }
                            ResolvedType::Named(name) => {
                                fmt.push_str(name);
                                effects.push(self.emit_expr(arg));
                            }
                        }
                    }
                    None => fmt.push_str("{}"),
                }
            } else if ch == '%' {
                fmt.push_str("%%");
            } else {
                fmt.push(ch);
            }
        }

        // Arguments without a matching hole are still observable reads
        for arg in args.iter().skip(next_arg) {
            effects.push(self.emit_expr(arg));
        }

        if newline {
            fmt.push_str("\\n");
        }

        let mut call = format!("std::printf(\"{}\"", fmt);
        for arg in &pf_args {
            call.push_str(", ");
            call.push_str(arg);
        }
        call.push(')');

        if effects.is_empty() {
            call
        } else {
            format!("({}, (void){})", effects.join(", "), call)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ash_parser::parse;
    use ash_types::Checker;

    fn generate(source: &str) -> String {
        let program = parse(source).expect("source parses");
        let typed = Checker::new()
            .check_program(&program)
            .expect("source checks");
        CppGenerator::new().generate(&typed).expect("generates")
    }

    #[test]
    fn prelude_declares_allocator() {
        let out = generate("fn main() -> unit {}");
        assert!(out.contains("void* ash_gc_alloc(std::size_t size);"));
        assert!(out.contains("void ash_gc_init();"));
    }

    #[test]
    fn entry_point_wraps_user_main() {
        let out = generate("fn main() -> unit { let a = 1; }");
        assert!(out.contains("void ash_main()"));
        assert!(out.contains("int main() {"));
        assert!(out.contains("ash_gc_init();"));
        assert!(out.contains("ash_main();"));
    }

    #[test]
    fn struct_gets_both_layouts() {
        let out = generate("struct Point { x: int, y: int } fn main() -> unit {}");
        assert!(out.contains("struct Point {"));
        assert!(out.contains("struct Point__gc {"));
        assert!(out.contains("long x;"));
    }

    #[test]
    fn nested_struct_layouts_ordered_by_dependency() {
        let source = r#"
            struct Outer { inner: Inner }
            struct Inner { v: int }
            fn main() -> unit {}
        "#;
        let out = generate(source);
        let inner_pos = out.find("struct Inner {").unwrap();
        let outer_pos = out.find("struct Outer {").unwrap();
        assert!(inner_pos < outer_pos);
        // Managed layout stores a handle instead of a value
        assert!(out.contains("Inner__gc* inner;"));
        assert!(out.contains("Inner inner;"));
    }

    #[test]
    fn recursive_layout_is_rejected() {
        let source = r#"
            struct A { b: B }
            struct B { a: A }
            fn main() -> unit {}
        "#;
        let program = parse(source).unwrap();
        let typed = Checker::new().check_program(&program).unwrap();
        let err = CppGenerator::new().generate(&typed).unwrap_err();
        assert!(matches!(err, CodegenError::RecursiveLayout(_)));
    }

    #[test]
    fn managed_literal_uses_placement_new() {
        let source = r#"
            struct Bar { val: int }
            fn main() -> unit {
                let b = managed Bar { val: 42 };
            }
        "#;
        let out = generate(source);
        assert!(out.contains("new (ash_gc_alloc(sizeof(Bar__gc))) Bar__gc{42}"));
        assert!(out.contains("Bar__gc* const b ="));
    }

    #[test]
    fn managed_field_access_uses_arrow() {
        let source = r#"
            struct Bar { val: int }
            fn main() -> unit {
                let b = managed Bar { val: 7 };
                let v = b.val;
            }
        "#;
        let out = generate(source);
        assert!(out.contains("b->val"));
    }

    #[test]
    fn linear_field_access_uses_dot() {
        let source = r#"
            struct Bar { val: int }
            fn main() -> unit {
                let mut b = Bar { val: 7 };
                b.val = 8;
            }
        "#;
        let out = generate(source);
        assert!(out.contains("b.val = 8;"));
    }

    #[test]
    fn literal_fields_reordered_to_declaration() {
        let source = r#"
            struct P { x: int, y: int }
            fn main() -> unit {
                let p = P { y: 2, x: 1 };
            }
        "#;
        let out = generate(source);
        assert!(out.contains("P{1, 2}"));
    }

    #[test]
    fn param_modes_map_to_cpp_references() {
        let source = r#"
            struct P { v: int }
            fn observe(p: ref P) -> unit {}
            fn bump(p: inout P) -> unit {}
            fn consume(p: P) -> unit {}
            fn main() -> unit {}
        "#;
        let out = generate(source);
        assert!(out.contains("void ash_observe(const P& p)"));
        assert!(out.contains("void ash_bump(P& p)"));
        assert!(out.contains("void ash_consume(P p)"));
    }

    #[test]
    fn resource_cleanup_becomes_destructor() {
        let source = r#"
            resource File {
                fd: int,
                cleanup {
                    println("closing {}", fd);
                }
            }
            fn main() -> unit {}
        "#;
        let out = generate(source);
        assert!(out.contains("~File() {"));
        assert!(out.contains("std::printf(\"closing %ld\\n\", fd)"));
    }

    #[test]
    fn println_formats_by_type() {
        let source = r#"
            fn main() -> unit {
                println("{} {}", 1, true);
            }
        "#;
        let out = generate(source);
        assert!(out.contains("std::printf(\"%ld %d\\n\", 1, (int)(true))"));
    }

    #[test]
    fn println_escapes_percent() {
        let source = r#"fn main() -> unit { println("100%"); }"#;
        let out = generate(source);
        assert!(out.contains("std::printf(\"100%%\\n\")"));
    }

    #[test]
    fn print_omits_newline() {
        let source = r#"fn main() -> unit { print("x"); }"#;
        let out = generate(source);
        assert!(out.contains("std::printf(\"x\")"));
    }

    #[test]
    fn managed_handle_prints_as_pointer() {
        let source = r#"
            struct Bar { val: int }
            fn main() -> unit {
                let b = managed Bar { val: 1 };
                println("{}", b);
            }
        "#;
        let out = generate(source);
        assert!(out.contains("%p"));
        assert!(out.contains("(void*)(b)"));
    }

    #[test]
    fn return_value_is_emitted() {
        let source = "fn one() -> int { return 1; } fn main() -> unit {}";
        let out = generate(source);
        assert!(out.contains("long ash_one()"));
        assert!(out.contains("return 1;"));
    }

    #[test]
    fn immutable_let_is_const() {
        let source = "fn main() -> unit { let a = 1; let mut b = 2; }";
        let out = generate(source);
        assert!(out.contains("const long a = 1;"));
        assert!(out.contains("long b = 2;"));
    }

    #[test]
    fn generation_is_deterministic() {
        let source = r#"
            struct Bar { val: int }
            struct Foo { bar: Bar }
            fn main() -> unit {
                let foo = managed Foo { bar: Bar { val: 42 } };
                let b: managed Bar = foo.bar;
            }
        "#;
        assert_eq!(generate(source), generate(source));
    }
}
