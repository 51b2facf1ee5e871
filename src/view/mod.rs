//! Resource viewers and their composition.
//!
//! Every resource kind is shown by a [`Browser`], optionally wrapped in one or
//! more [`Extender`]s that contribute key bindings and context. Viewers never
//! hold a reference to the application; they read its state through the
//! [`ViewEnv`] handed to each hook and answer with a [`ViewCommand`].

mod actions;
mod benchmark;
mod browser;
mod colorer;
mod details;
mod extender;
mod extensions;
mod policy;
mod port_forward;
mod rbac;
mod registry;
mod screen_dump;

pub use actions::{ActionCtx, ActionFn, KeyAction, KeyActions};
pub use browser::Browser;
pub use details::Details;
pub use extender::{Extender, Extension};
pub use policy::{SERVICE_ACCOUNT, policy_view};
pub use port_forward::port_forward_view;
pub use rbac::rbac_view;
pub use registry::{Scope, viewer_for};

use crate::config::{Config, Paths};
use crate::model::{Gvr, Motion, RowData, TableData};
use ratatui::style::Color;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ViewError {
    #[error("{program} exited with {status}")]
    ExternalProcess { program: String, status: String },

    #[error("I/O error {operation} {path}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Borrowed application state handed to viewer hooks.
#[derive(Clone, Copy)]
pub struct ViewEnv<'a> {
    pub config: &'a Config,
    pub paths: &'a Paths,
}

impl ViewEnv<'_> {
    pub fn read_only(&self) -> bool {
        self.config.is_read_only()
    }
}

/// Everything a fetch needs to know, built by the viewer's context chain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchContext {
    pub gvr: Gvr,
    /// `None` lists across all namespaces.
    pub namespace: Option<String>,
    pub path: Option<String>,
    pub labels: Option<String>,
    pub fields: Option<String>,
    pub dir: Option<PathBuf>,
    pub subject_kind: Option<String>,
    pub subject_name: Option<String>,
    /// Kind of the row `path` names, for views listing what that row holds.
    pub parent: Option<Gvr>,
}

pub type ContextFn = Arc<dyn Fn(&ViewEnv<'_>, FetchContext) -> FetchContext>;
pub type BindKeysFn = Arc<dyn Fn(&ViewEnv<'_>, &mut KeyActions)>;
pub type EnterFn = Arc<dyn Fn(&ViewEnv<'_>, &TableData, &Gvr, &str) -> ViewCommand>;
pub type ColorerFn = fn(&[String], &RowData) -> Color;

/// A resource addressed by kind and `namespace/name` path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub gvr: Gvr,
    pub path: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    Scale,
    Image,
    PortForward,
}

impl PromptKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Scale => "scale",
            Self::Image => "image",
            Self::PortForward => "pf",
        }
    }

    pub fn placeholder(self) -> &'static str {
        match self {
            Self::Scale => "<replicas>",
            Self::Image => "<container>=<image>",
            Self::PortForward => "<local>:<remote>",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmKind {
    Restart,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailSource {
    Yaml(Target),
    Describe(Target),
    Logs { target: Target, previous: bool },
    File(PathBuf),
}

/// A view the application can push on its page stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewSpec {
    Resource { gvr: Gvr, scope: Scope },
    Policy { subject: String, name: String },
    /// Rules of the role, or of the role bound by the binding, at `path`.
    Rbac { gvr: Gvr, path: String },
    Details {
        title: String,
        subject: String,
        source: DetailSource,
    },
}

/// What a key action or row activation asks the application to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewCommand {
    None,
    Enter,
    Back,
    Push(ViewSpec),
    Sort { column: &'static str, ascending: bool },
    Prompt(PromptKind, Target),
    Confirm(ConfirmKind, Target),
    Edit(PathBuf),
    SaveTable,
    ToggleMark,
    ClearMarks,
    StartFilter,
    StartCommand,
    ToggleHelp,
    Move(Motion),
    SwitchNamespace(String),
    Quit,
    FlashErr(String),
}

/// A live table bound to one resource kind.
pub trait ResourceViewer {
    fn name(&self) -> &str;
    fn gvr(&self) -> &Gvr;
    fn table(&self) -> &TableData;
    fn table_mut(&mut self) -> &mut TableData;
    fn colorer(&self) -> ColorerFn;
    fn set_colorer_fn(&mut self, f: ColorerFn);

    /// Replaces the context function of this layer.
    fn set_context_fn(&mut self, f: ContextFn);
    /// Appends a key binding hook, run in registration order by `init`.
    fn add_bind_keys_fn(&mut self, f: BindKeysFn);
    fn set_enter_fn(&mut self, f: EnterFn);

    fn init(&mut self, env: &ViewEnv<'_>);
    fn build_context(&self, env: &ViewEnv<'_>) -> FetchContext;
    fn enter(&self, env: &ViewEnv<'_>, path: &str) -> ViewCommand;
    fn actions(&self) -> &KeyActions;

    fn hints(&self) -> Vec<(String, String)> {
        self.actions().hints()
    }
}

pub fn action(f: impl Fn(&ActionCtx<'_>) -> ViewCommand + 'static) -> ActionFn {
    Arc::new(f)
}

pub fn context_fn(f: impl Fn(&ViewEnv<'_>, FetchContext) -> FetchContext + 'static) -> ContextFn {
    Arc::new(f)
}

pub fn bind_keys_fn(f: impl Fn(&ViewEnv<'_>, &mut KeyActions) + 'static) -> BindKeysFn {
    Arc::new(f)
}

pub fn enter_fn(
    f: impl Fn(&ViewEnv<'_>, &TableData, &Gvr, &str) -> ViewCommand + 'static,
) -> EnterFn {
    Arc::new(f)
}

/// Sort action shared by the kind specific views.
pub fn sort_action(column: &'static str, ascending: bool) -> ActionFn {
    action(move |_| ViewCommand::Sort { column, ascending })
}
