use super::{Browser, ResourceViewer, ViewCommand, ViewEnv, colorer, context_fn, enter_fn};
use crate::config::ensure_dir;
use crate::model::ResourceKind;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Saved table dumps of the current cluster. Enter opens the file in `$EDITOR`.
pub fn screen_dump_view() -> Box<dyn ResourceViewer> {
    let mut browser = Browser::new(ResourceKind::ScreenDumps.gvr()).with_sort("AGE", true);
    browser.set_colorer_fn(colorer::file);
    browser.set_context_fn(context_fn(|env, mut ctx| {
        let dir = dump_dir(env);
        debug!(dir = %dir.display(), "screen dump directory");
        if let Err(error) = ensure_dir(&dir) {
            warn!(error = %error, "unable to create screen dump directory");
        }
        ctx.dir = Some(dir);
        ctx
    }));
    browser.set_enter_fn(enter_fn(|env, _, _, path| {
        debug!(path, "screen dump selected");
        ViewCommand::Edit(dump_dir(env).join(path))
    }));
    Box::new(browser)
}

fn dump_dir(env: &ViewEnv<'_>) -> PathBuf {
    env.paths.cluster_dump_dir(env.config.current_cluster())
}

#[cfg(test)]
mod tests {
    use super::screen_dump_view;
    use crate::view::ViewCommand;
    use crate::view::testing::EnvFixture;

    #[test]
    fn context_creates_cluster_directory() {
        let fixture = EnvFixture::new();
        let view = screen_dump_view();
        let ctx = view.build_context(&fixture.env());

        let dir = ctx.dir.unwrap();
        assert_eq!(dir, fixture.paths.dump_dir.join("c1"));
        assert!(dir.is_dir());
        assert_eq!(ctx.namespace, None);
    }

    #[test]
    fn enter_edits_the_file() {
        let fixture = EnvFixture::new();
        let mut view = screen_dump_view();
        view.init(&fixture.env());
        assert_eq!(view.name(), "ScreenDumps");
        assert_eq!(
            view.enter(&fixture.env(), "pods-1.csv"),
            ViewCommand::Edit(fixture.paths.dump_dir.join("c1").join("pods-1.csv"))
        );
    }
}
