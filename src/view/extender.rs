use super::{
    BindKeysFn, ColorerFn, ContextFn, EnterFn, FetchContext, KeyActions, ResourceViewer,
    ViewCommand, ViewEnv, bind_keys_fn,
};
use crate::model::{Gvr, TableData};
use std::sync::Arc;

/// A capability layered on top of a viewer.
pub trait Extension {
    fn bind_keys(&self, env: &ViewEnv<'_>, actions: &mut KeyActions);

    fn context(&self, _env: &ViewEnv<'_>, ctx: FetchContext) -> FetchContext {
        ctx
    }
}

/// Decorates a viewer with an [`Extension`], forwarding the rest of the contract.
///
/// The extension's key hook is registered on the wrapped viewer at
/// construction, so an outer layer binds after the layers it wraps and wins
/// on conflicting keys.
pub struct Extender<E: Extension> {
    inner: Box<dyn ResourceViewer>,
    extension: Arc<E>,
    context_fn: Option<ContextFn>,
}

impl<E: Extension + 'static> Extender<E> {
    pub fn new(mut inner: Box<dyn ResourceViewer>, extension: E) -> Self {
        let extension = Arc::new(extension);
        let hook = Arc::clone(&extension);
        inner.add_bind_keys_fn(bind_keys_fn(move |env, actions| {
            hook.bind_keys(env, actions)
        }));
        Self {
            inner,
            extension,
            context_fn: None,
        }
    }

    pub fn boxed(inner: Box<dyn ResourceViewer>, extension: E) -> Box<dyn ResourceViewer> {
        Box::new(Self::new(inner, extension))
    }
}

impl<E: Extension + 'static> ResourceViewer for Extender<E> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn gvr(&self) -> &Gvr {
        self.inner.gvr()
    }

    fn table(&self) -> &TableData {
        self.inner.table()
    }

    fn table_mut(&mut self) -> &mut TableData {
        self.inner.table_mut()
    }

    fn colorer(&self) -> ColorerFn {
        self.inner.colorer()
    }

    fn set_colorer_fn(&mut self, f: ColorerFn) {
        self.inner.set_colorer_fn(f);
    }

    fn set_context_fn(&mut self, f: ContextFn) {
        self.context_fn = Some(f);
    }

    fn add_bind_keys_fn(&mut self, f: BindKeysFn) {
        self.inner.add_bind_keys_fn(f);
    }

    fn set_enter_fn(&mut self, f: EnterFn) {
        self.inner.set_enter_fn(f);
    }

    fn init(&mut self, env: &ViewEnv<'_>) {
        self.inner.init(env);
    }

    fn build_context(&self, env: &ViewEnv<'_>) -> FetchContext {
        let ctx = self.inner.build_context(env);
        let ctx = self.extension.context(env, ctx);
        match &self.context_fn {
            Some(f) => f(env, ctx),
            None => ctx,
        }
    }

    fn enter(&self, env: &ViewEnv<'_>, path: &str) -> ViewCommand {
        self.inner.enter(env, path)
    }

    fn actions(&self) -> &KeyActions {
        self.inner.actions()
    }
}
