use super::{
    Browser, DetailSource, ResourceViewer, ViewCommand, ViewSpec, colorer, context_fn, enter_fn,
};
use crate::model::ResourceKind;

/// Benchmark result files of the current cluster.
pub fn benchmark_view() -> Box<dyn ResourceViewer> {
    let mut browser = Browser::new(ResourceKind::Benchmarks.gvr()).with_sort("AGE", true);
    browser.set_colorer_fn(colorer::file);
    browser.set_context_fn(context_fn(|env, mut ctx| {
        ctx.dir = Some(env.paths.cluster_bench_dir(env.config.current_cluster()));
        ctx
    }));
    browser.set_enter_fn(enter_fn(|env, _, _, path| {
        let dir = env.paths.cluster_bench_dir(env.config.current_cluster());
        ViewCommand::Push(ViewSpec::Details {
            title: "Results".to_string(),
            subject: file_to_subject(path),
            source: DetailSource::File(dir.join(path)),
        })
    }));
    Box::new(browser)
}

/// `svc_default_1577308050814961000.txt` names the benchmark of `svc/default`.
pub fn file_to_subject(path: &str) -> String {
    let file = path.rsplit('/').next().unwrap_or(path);
    let mut tokens = file.split('_');
    match (tokens.next(), tokens.next()) {
        (Some(kind), Some(name)) => format!("{kind}/{name}"),
        _ => file.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::{benchmark_view, file_to_subject};
    use crate::view::testing::EnvFixture;
    use crate::view::{DetailSource, ViewCommand, ViewSpec};

    #[test]
    fn subject_from_file_name() {
        assert_eq!(
            file_to_subject("/tmp/bench/c1/svc_default_1577308050814961000.txt"),
            "svc/default"
        );
        assert_eq!(file_to_subject("po_fred_blee_1.txt"), "po/fred");
        assert_eq!(file_to_subject("results.txt"), "results.txt");
    }

    #[test]
    fn context_points_at_cluster_bench_dir() {
        let fixture = EnvFixture::new();
        let view = benchmark_view();
        let ctx = view.build_context(&fixture.env());
        assert_eq!(ctx.dir, Some(fixture.paths.bench_dir.join("c1")));
    }

    #[test]
    fn enter_shows_results() {
        let fixture = EnvFixture::new();
        let view = benchmark_view();
        match view.enter(&fixture.env(), "svc_default_1.txt") {
            ViewCommand::Push(ViewSpec::Details {
                title,
                subject,
                source,
            }) => {
                assert_eq!(title, "Results");
                assert_eq!(subject, "svc/default");
                assert_eq!(
                    source,
                    DetailSource::File(fixture.paths.bench_dir.join("c1").join("svc_default_1.txt"))
                );
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
