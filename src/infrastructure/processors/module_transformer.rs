use crate::core::{interfaces::ModuleTransformer, models::TransformOutput};
use crate::utils::{ErrorContext, KumiError, Result, Timer};
use oxc_allocator::Allocator;
use oxc_ast::ast::{
    BindingIdentifier, Declaration, ExportAllDeclaration, ExportDefaultDeclaration,
    ExportDefaultDeclarationKind, ExportNamedDeclaration, Expression, ImportDeclaration,
    ImportDeclarationSpecifier, ModuleExportName, Statement, TSModuleDeclarationName,
};
use oxc_ast::AstKind;
use oxc_diagnostics::OxcDiagnostic;
use oxc_parser::Parser;
use oxc_semantic::{Semantic, SemanticBuilder};
use oxc_span::{GetSpan, SourceType, Span};
use std::collections::{HashMap, HashSet};
use std::path::Path;

const STAR_HELPER: &str = "function __kumi_exportStar(source, target) {\n  Object.keys(source).forEach(function (key) {\n    if (key === \"default\" || key === \"__esModule\" || Object.prototype.hasOwnProperty.call(target, key)) return;\n    Object.defineProperty(target, key, { enumerable: true, get: function () { return source[key]; } });\n  });\n}\n";

/// ES module to `require`/`exports` rewriting on top of the oxc parser.
///
/// Module statements are removed by span and everything else in the file is
/// copied through. The module header holds the export getters followed by
/// every `require` in source order, so imports are evaluated before the body
/// the way ES module linking does it. Imported names are not copied into
/// locals: each reference is rewritten to a property read on the required
/// module object, which keeps bindings live across cycles.
#[derive(Debug, Clone, Default)]
pub struct OxcModuleTransformer;

impl OxcModuleTransformer {
    pub fn new() -> Self {
        Self
    }
}

impl ModuleTransformer for OxcModuleTransformer {
    fn transform(&self, source: &str, path: &Path) -> Result<TransformOutput> {
        let _timer = Timer::start(&format!(
            "Transforming {}",
            path.file_name().and_then(|s| s.to_str()).unwrap_or("unknown")
        ));

        let allocator = Allocator::default();
        let source_type = SourceType::from_path(path)
            .unwrap_or_else(|_| SourceType::mjs())
            .with_module(true);

        let parsed = Parser::new(&allocator, source, source_type).parse();

        if parsed.panicked || !parsed.errors.is_empty() {
            return Err(syntax_error(source, path, &parsed.errors));
        }

        let program = parsed.program;
        let semantic = SemanticBuilder::new().build(&program).semantic;
        let mut rewriter = Rewriter::new(source, &semantic);

        if let Some(hashbang) = &program.hashbang {
            rewriter.replace(hashbang.span, String::new());
        }

        for statement in &program.body {
            match statement {
                Statement::ImportDeclaration(decl) => rewriter.import(decl, &semantic)?,
                Statement::ExportNamedDeclaration(decl) => rewriter.export_named(decl)?,
                Statement::ExportDefaultDeclaration(decl) => rewriter.export_default(decl),
                Statement::ExportAllDeclaration(decl) => rewriter.export_all(decl)?,
                _ => {}
            }
        }

        rewriter.finish()
    }
}

/// Turns the parser's first diagnostic into a `Parse` error pointing at the
/// offending line.
fn syntax_error(source: &str, path: &Path, errors: &[OxcDiagnostic]) -> KumiError {
    let first = errors.first();
    let message = first
        .map(|e| e.to_string())
        .unwrap_or_else(|| "parser aborted".to_string());

    let mut context = ErrorContext::new().with_file(path.to_path_buf());
    let offset = first
        .and_then(|e| e.labels.as_ref())
        .and_then(|labels| labels.first())
        .map(|label| label.offset());
    if let Some(offset) = offset {
        let (line, column, text) = locate(source, offset);
        context = context
            .with_location(line, column)
            .with_snippet(text.to_string());
    }

    KumiError::parse_with_context(
        format!("{} ({} issue(s))", message, errors.len().max(1)),
        context,
    )
}

/// 1-based line and column of a byte offset, plus the text of that line.
fn locate(source: &str, offset: usize) -> (usize, usize, &str) {
    let mut offset = offset.min(source.len());
    while !source.is_char_boundary(offset) {
        offset -= 1;
    }

    let before = &source[..offset];
    let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
    let line_end = source[line_start..]
        .find('\n')
        .map(|i| line_start + i)
        .unwrap_or(source.len());

    let line = before.matches('\n').count() + 1;
    let column = before[line_start..].chars().count() + 1;
    (line, column, source[line_start..line_end].trim_end_matches('\r'))
}

/// Positions where a plain identifier cannot simply be swapped for a
/// member expression.
struct ReferenceSites {
    /// `{ name }` object literal values
    shorthand: HashSet<u32>,
    /// `name()` and ``name`...` `` callees, which must not receive the
    /// module object as `this`
    callees: HashSet<u32>,
}

impl ReferenceSites {
    fn collect(semantic: &Semantic<'_>) -> Self {
        let mut sites = Self {
            shorthand: HashSet::new(),
            callees: HashSet::new(),
        };

        for node in semantic.nodes().iter() {
            match node.kind() {
                AstKind::ObjectProperty(property) if property.shorthand => {
                    sites.shorthand.insert(property.value.span().start);
                }
                AstKind::CallExpression(call) => {
                    if let Expression::Identifier(ident) = &call.callee {
                        sites.callees.insert(ident.span.start);
                    }
                }
                AstKind::TaggedTemplateExpression(tagged) => {
                    if let Expression::Identifier(ident) = &tagged.tag {
                        sites.callees.insert(ident.span.start);
                    }
                }
                _ => {}
            }
        }

        sites
    }
}

struct Rewriter<'s> {
    source: &'s str,
    edits: Vec<(Span, String)>,
    /// (exported name, getter expression)
    exports: Vec<(String, String)>,
    /// `require` statements, in source order
    requires: Vec<String>,
    /// imported local name -> live expression it reads through
    bindings: HashMap<String, String>,
    sites: ReferenceSites,
    imports: Vec<String>,
    is_module: bool,
    uses_star_helper: bool,
    temp_count: usize,
}

impl<'s> Rewriter<'s> {
    fn new(source: &'s str, semantic: &Semantic<'_>) -> Self {
        Self {
            source,
            edits: Vec::new(),
            exports: Vec::new(),
            requires: Vec::new(),
            bindings: HashMap::new(),
            sites: ReferenceSites::collect(semantic),
            imports: Vec::new(),
            is_module: false,
            uses_star_helper: false,
            temp_count: 0,
        }
    }

    fn replace(&mut self, span: Span, replacement: String) {
        self.edits.push((span, replacement));
    }

    fn remove(&mut self, span: Span) {
        self.replace(span, String::new());
    }

    fn text(&self, span: Span) -> &'s str {
        span.source_text(self.source)
    }

    fn temp(&mut self, prefix: &str) -> String {
        let name = format!("__kumi_{}{}", prefix, self.temp_count);
        self.temp_count += 1;
        name
    }

    fn require(&mut self, specifier: &str) -> Result<String> {
        self.imports.push(specifier.to_string());
        Ok(format!("require({})", js_string(specifier)?))
    }

    fn import(&mut self, decl: &ImportDeclaration<'_>, semantic: &Semantic<'_>) -> Result<()> {
        self.remove(decl.span);
        if decl.import_kind.is_type() {
            return Ok(());
        }

        let require = self.require(decl.source.value.as_str())?;
        let specifiers: Vec<_> = decl
            .specifiers
            .iter()
            .flatten()
            .filter(|specifier| match specifier {
                ImportDeclarationSpecifier::ImportSpecifier(s) => !s.import_kind.is_type(),
                _ => true,
            })
            .collect();

        match specifiers.as_slice() {
            [] => {
                self.requires.push(format!("{};", require));
                return Ok(());
            }
            // the namespace object is already live
            [ImportDeclarationSpecifier::ImportNamespaceSpecifier(s)] => {
                self.requires.push(format!("var {} = {};", s.local.name, require));
                return Ok(());
            }
            _ => {}
        }

        let temp = self.temp("import");
        self.requires.push(format!("var {} = {};", temp, require));

        for specifier in specifiers {
            match specifier {
                ImportDeclarationSpecifier::ImportDefaultSpecifier(s) => {
                    self.bind(&s.local, format!("{}.default", temp), semantic);
                }
                ImportDeclarationSpecifier::ImportNamespaceSpecifier(s) => {
                    self.requires.push(format!("var {} = {};", s.local.name, temp));
                }
                ImportDeclarationSpecifier::ImportSpecifier(s) => {
                    let target = member(&temp, &s.imported)?;
                    self.bind(&s.local, target, semantic);
                }
            }
        }
        Ok(())
    }

    /// Rewrites every value reference to an imported binding.
    fn bind(&mut self, local: &BindingIdentifier<'_>, target: String, semantic: &Semantic<'_>) {
        if let Some(symbol_id) = local.symbol_id.get() {
            for reference in semantic.scoping().get_resolved_references(symbol_id) {
                if reference.is_type() || reference.flags().is_value_as_type() {
                    continue;
                }
                let AstKind::IdentifierReference(ident) =
                    semantic.nodes().get_node(reference.node_id()).kind()
                else {
                    continue;
                };

                let replacement = if self.sites.shorthand.contains(&ident.span.start) {
                    format!("{}: {}", ident.name, target)
                } else if self.sites.callees.contains(&ident.span.start) {
                    format!("(0, {})", target)
                } else {
                    target.clone()
                };
                self.replace(ident.span, replacement);
            }
        }

        self.bindings.insert(local.name.to_string(), target);
    }

    fn export_named(&mut self, decl: &ExportNamedDeclaration<'_>) -> Result<()> {
        if decl.export_kind.is_type() {
            self.remove(decl.span);
            return Ok(());
        }
        self.is_module = true;

        if let Some(source) = &decl.source {
            let require = self.require(source.value.as_str())?;
            let temp = self.temp("reexport");
            for specifier in &decl.specifiers {
                if specifier.export_kind.is_type() {
                    continue;
                }
                let getter = format!("{}[{}]", temp, js_string(&export_name(&specifier.local))?);
                self.exports.push((export_name(&specifier.exported), getter));
            }
            self.requires.push(format!("var {} = {};", temp, require));
            self.remove(decl.span);
            return Ok(());
        }

        if let Some(declaration) = &decl.declaration {
            let exported: Vec<String> = match declaration {
                Declaration::VariableDeclaration(var_decl) if !var_decl.declare => var_decl
                    .declarations
                    .iter()
                    .flat_map(|declarator| declarator.id.get_binding_identifiers())
                    .map(|ident| ident.name.to_string())
                    .collect(),
                Declaration::FunctionDeclaration(func) if !func.declare => {
                    func.id.iter().map(|ident| ident.name.to_string()).collect()
                }
                Declaration::ClassDeclaration(class) if !class.declare => {
                    class.id.iter().map(|ident| ident.name.to_string()).collect()
                }
                Declaration::TSEnumDeclaration(ts_enum) if !ts_enum.declare => {
                    vec![ts_enum.id.name.to_string()]
                }
                Declaration::TSModuleDeclaration(module) if !module.declare => match &module.id {
                    TSModuleDeclarationName::Identifier(ident) => vec![ident.name.to_string()],
                    TSModuleDeclarationName::StringLiteral(_) => Vec::new(),
                },
                Declaration::TSImportEqualsDeclaration(alias) if !alias.import_kind.is_type() => {
                    vec![alias.id.name.to_string()]
                }
                // type aliases, interfaces and `declare` forms have no runtime value
                _ => {
                    self.remove(decl.span);
                    return Ok(());
                }
            };

            for name in exported {
                self.exports.push((name.clone(), name));
            }
            self.remove(Span::new(decl.span.start, declaration.span().start));
            return Ok(());
        }

        for specifier in &decl.specifiers {
            if specifier.export_kind.is_type() {
                continue;
            }
            self.exports
                .push((export_name(&specifier.exported), export_name(&specifier.local)));
        }
        self.remove(decl.span);
        Ok(())
    }

    fn export_default(&mut self, decl: &ExportDefaultDeclaration<'_>) {
        self.is_module = true;
        let keyword = Span::new(decl.span.start, decl.declaration.span().start);

        let named_declaration = match &decl.declaration {
            ExportDefaultDeclarationKind::FunctionDeclaration(func) => {
                func.id.as_ref().map(|id| id.name.to_string())
            }
            ExportDefaultDeclarationKind::ClassDeclaration(class) => {
                class.id.as_ref().map(|id| id.name.to_string())
            }
            ExportDefaultDeclarationKind::TSInterfaceDeclaration(_) => {
                self.remove(decl.span);
                return;
            }
            _ => None,
        };

        match named_declaration {
            Some(name) => {
                self.exports.push(("default".to_string(), name));
                self.remove(keyword);
            }
            None => {
                self.replace(keyword, "exports.default = ".to_string());
                if !self.text(decl.span).trim_end().ends_with(';') {
                    self.replace(Span::new(decl.span.end, decl.span.end), ";".to_string());
                }
            }
        }
    }

    fn export_all(&mut self, decl: &ExportAllDeclaration<'_>) -> Result<()> {
        self.remove(decl.span);
        if decl.export_kind.is_type() {
            return Ok(());
        }
        self.is_module = true;

        let require = self.require(decl.source.value.as_str())?;
        let statement = match &decl.exported {
            Some(exported) => {
                let temp = self.temp("reexport");
                self.exports.push((export_name(exported), temp.clone()));
                format!("var {} = {};", temp, require)
            }
            None => {
                self.uses_star_helper = true;
                format!("__kumi_exportStar({}, exports);", require)
            }
        };
        self.requires.push(statement);
        Ok(())
    }

    fn finish(mut self) -> Result<TransformOutput> {
        let mut code = String::with_capacity(self.source.len() + 256);
        code.push_str("\"use strict\";\n");

        if self.is_module {
            code.push_str("Object.defineProperty(exports, \"__esModule\", { value: true });\n");
        }
        for (name, getter) in &self.exports {
            // `export { x }` of an imported `x` reads through the module object
            let getter = self.bindings.get(getter).unwrap_or(getter);
            code.push_str(&format!(
                "Object.defineProperty(exports, {}, {{ enumerable: true, get: function () {{ return {}; }} }});\n",
                js_string(name)?,
                getter
            ));
        }
        if self.uses_star_helper {
            code.push_str(STAR_HELPER);
        }
        for statement in &self.requires {
            code.push_str(statement);
            code.push('\n');
        }

        // Outer edits come first; references inside a removed statement are dropped.
        self.edits
            .sort_by(|(a, _), (b, _)| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));

        let mut cursor = 0usize;
        for (span, replacement) in &self.edits {
            let start = span.start as usize;
            let end = span.end as usize;
            if start < cursor {
                continue;
            }
            code.push_str(&self.source[cursor..start]);
            code.push_str(replacement);
            cursor = end;
        }
        code.push_str(&self.source[cursor..]);

        Ok(TransformOutput {
            code,
            imports: self.imports,
        })
    }
}

fn export_name(name: &ModuleExportName<'_>) -> String {
    match name {
        ModuleExportName::IdentifierName(ident) => ident.name.to_string(),
        ModuleExportName::IdentifierReference(ident) => ident.name.to_string(),
        ModuleExportName::StringLiteral(literal) => literal.value.to_string(),
    }
}

/// Property read of an imported name on a required module object.
fn member(object: &str, imported: &ModuleExportName<'_>) -> Result<String> {
    match imported {
        ModuleExportName::StringLiteral(literal) => {
            Ok(format!("{}[{}]", object, js_string(literal.value.as_str())?))
        }
        other => Ok(format!("{}.{}", object, export_name(other))),
    }
}

fn js_string(value: &str) -> Result<String> {
    serde_json::to_string(value)
        .map_err(|e| KumiError::parse(format!("cannot quote '{}': {}", value, e)))
}
