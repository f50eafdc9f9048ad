use std::fmt;
use std::sync::Arc;

use rhai::{Engine, AST};
use uuid::Uuid;

use super::catalog::ScriptSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

impl Severity {
    pub fn label(self) -> &'static str {
        match self {
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

/// One compile or load failure message, human-readable.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>) -> Self {
        Self { severity: Severity::Error, message: message.into() }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity.label(), self.message)
    }
}

/// One script compiled into an invocable unit. The unit name is unique per
/// compile attempt so repeated recompiles of the same path can never collide.
pub struct CompiledModule {
    pub(crate) unit: String,
    pub(crate) ast: AST,
    pub(crate) engine: Arc<Engine>,
}

impl CompiledModule {
    pub fn unit(&self) -> &str {
        &self.unit
    }
}

/// Turns script sources into modules against a fixed capability surface: the
/// host facade functions registered once at construction plus rhai's built-in
/// packages, with `import` and `eval` disabled. Every compile sees exactly the
/// same surface and shares no mutable state with any other compile.
pub struct ScriptCompiler {
    engine: Arc<Engine>,
}

impl ScriptCompiler {
    pub fn new() -> Self {
        let mut engine = Engine::new();
        engine.set_fast_operators(true);
        engine.disable_symbol("import");
        engine.disable_symbol("eval");
        super::register_api(&mut engine);
        Self { engine: Arc::new(engine) }
    }

    /// Pure source-to-module step. Malformed input surfaces as diagnostics,
    /// never as a fault in the caller.
    pub fn compile(&self, source: &ScriptSource) -> Result<CompiledModule, Vec<Diagnostic>> {
        let stem = source.path.file_stem().and_then(|stem| stem.to_str()).unwrap_or("script");
        let unit = format!("{stem}_{}", Uuid::new_v4().simple());
        match self.engine.compile(&source.text) {
            Ok(mut ast) => {
                ast.set_source(unit.as_str());
                Ok(CompiledModule { unit, ast, engine: self.engine.clone() })
            }
            Err(err) => Err(vec![Diagnostic::error(err.to_string())]),
        }
    }
}

impl Default for ScriptCompiler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn source(text: &str) -> ScriptSource {
        ScriptSource { path: PathBuf::from("probe.rhai"), text: text.to_string() }
    }

    #[test]
    fn compile_units_are_never_reused() {
        let compiler = ScriptCompiler::new();
        let src = source("fn init() {}\nfn update(host) {}\n");
        let first = compiler.compile(&src).expect("should compile");
        let second = compiler.compile(&src).expect("should compile");
        assert!(first.unit().starts_with("probe_"));
        assert_ne!(first.unit(), second.unit());
    }

    #[test]
    fn malformed_source_becomes_diagnostics() {
        let compiler = ScriptCompiler::new();
        let diagnostics = compiler.compile(&source("fn init( {")).err().expect("should fail");
        assert!(!diagnostics.is_empty());
        assert!(diagnostics.iter().all(|d| d.severity == Severity::Error));
    }

    #[test]
    fn module_imports_are_outside_the_surface() {
        let compiler = ScriptCompiler::new();
        assert!(compiler.compile(&source("import \"other\";")).is_err());
        assert!(compiler.compile(&source("eval(\"1 + 1\")")).is_err());
    }
}
