use std::fmt;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use rhai::{CallFnOptions, Dynamic, Engine, Map, Scope, AST};

use super::catalog::ScriptSource;
use super::compile::{CompiledModule, Diagnostic, ScriptCompiler};
use super::ScriptApi;
use crate::world::GameWorld;

/// Script function run exactly once right after activation.
pub const INIT_FN: &str = "init";
/// Script function run once per tick with the host facade.
pub const UPDATE_FN: &str = "update";

/// Why a source failed to become a registered instance.
#[derive(Debug)]
pub enum LoadError {
    /// The source did not produce a module.
    Compile(Vec<Diagnostic>),
    /// The module compiled but defines no script capability.
    NoScriptFound,
    /// Setup faulted; the instance was discarded before registration.
    Init(String),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Compile(diagnostics) => {
                write!(f, "compile failed with {} diagnostic(s)", diagnostics.len())
            }
            LoadError::NoScriptFound => {
                write!(f, "no script found (expected 'fn {INIT_FN}()' and 'fn {UPDATE_FN}(host)')")
            }
            LoadError::Init(message) => write!(f, "{INIT_FN} failed: {message}"),
        }
    }
}

impl std::error::Error for LoadError {}

/// A live behavior object bound to one script path. Owns its AST, scope and
/// `this`-bound state map; retiring the instance drops all of it.
pub struct ScriptInstance {
    unit: String,
    engine: Arc<Engine>,
    ast: AST,
    scope: Scope<'static>,
    state: Dynamic,
}

impl ScriptInstance {
    pub fn unit(&self) -> &str {
        &self.unit
    }

    /// Runs the per-tick entry point against the host facade. A fault comes
    /// back as an error and leaves the instance usable for the next tick.
    pub fn execute(&mut self, world: &mut GameWorld) -> Result<()> {
        let api = ScriptApi::new(world);
        let options = CallFnOptions::new().eval_ast(false).bind_this_ptr(&mut self.state);
        self.engine
            .call_fn_with_options::<Dynamic>(options, &mut self.scope, &self.ast, UPDATE_FN, (api,))
            .map(|_| ())
            .map_err(|err| anyhow!("{err}"))
    }
}

fn defines_fn(ast: &AST, name: &str, arity: usize) -> bool {
    ast.iter_functions().any(|func| func.name == name && func.params.len() == arity)
}

/// Builds the single instance a module may produce and runs its one-time
/// setup. rhai admits one function per name and arity, so there is never more
/// than one candidate to choose from; a module missing either entry point is
/// rejected outright. Any fault during setup discards the instance.
pub fn activate(module: CompiledModule) -> Result<ScriptInstance, LoadError> {
    let CompiledModule { unit, ast, engine } = module;
    if !defines_fn(&ast, UPDATE_FN, 1) || !defines_fn(&ast, INIT_FN, 0) {
        return Err(LoadError::NoScriptFound);
    }
    let mut scope = Scope::new();
    let mut state = Dynamic::from_map(Map::new());
    // Evaluates the module body, then the one-shot setup entry point.
    let options = CallFnOptions::new().bind_this_ptr(&mut state);
    engine
        .call_fn_with_options::<Dynamic>(options, &mut scope, &ast, INIT_FN, ())
        .map_err(|err| LoadError::Init(err.to_string()))?;
    Ok(ScriptInstance { unit, engine, ast, scope, state })
}

/// Full source-to-instance pipeline, shared by the initial scan and the
/// change watcher.
pub fn load_script(
    compiler: &ScriptCompiler,
    source: &ScriptSource,
) -> Result<ScriptInstance, LoadError> {
    let module = compiler.compile(source).map_err(LoadError::Compile)?;
    activate(module)
}
