mod app;
mod cli;
mod config;
mod dump;
mod input;
mod k8s;
mod model;
mod ui;
mod view;

use anyhow::{Context, Result};
use app::{App, AppCommand, PortForwardSession};
use clap::Parser;
use cli::{CliArgs, CliCommand};
use config::{ClusterState, Config, ConfigError, Paths};
use crossterm::event::{
    Event, EventStream, KeyEventKind, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags,
    PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
    supports_keyboard_enhancement,
};
use futures::StreamExt;
use k8s::{Gateway, Listing, compact_error};
use kube::config::Kubeconfig;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io::{self, Stdout};
use std::path::Path;
use std::process::Stdio;
use std::sync::Mutex;
use std::time::Instant;
use tokio::process::{Child, Command as TokioCommand};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{Duration, MissedTickBehavior, interval, timeout};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;
use view::{Target, ViewError};

type TuiTerminal = Terminal<CrosstermBackend<Stdout>>;
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);
const NAMESPACE_TIMEOUT: Duration = Duration::from_secs(5);
const FLASH_TICK: Duration = Duration::from_millis(500);
const DEFAULT_EDITOR: &str = "vi";

/// Results of background work, tagged with the page they were started for.
#[derive(Debug)]
enum FetchEvent {
    Listing {
        page_id: u64,
        result: std::result::Result<Listing, String>,
    },
    Detail {
        page_id: u64,
        result: std::result::Result<String, String>,
    },
    Mutation(std::result::Result<String, String>),
}

#[derive(Debug)]
struct PortForwardExitEvent {
    pid: u32,
    target: Target,
    result: std::result::Result<std::process::ExitStatus, String>,
}

struct Tasks {
    fetch_tx: mpsc::UnboundedSender<FetchEvent>,
    pf_tx: mpsc::UnboundedSender<PortForwardExitEvent>,
    by_page: HashMap<u64, JoinHandle<()>>,
    forwards: HashMap<u32, oneshot::Sender<()>>,
}

impl Tasks {
    fn new(
        fetch_tx: mpsc::UnboundedSender<FetchEvent>,
        pf_tx: mpsc::UnboundedSender<PortForwardExitEvent>,
    ) -> Self {
        Self {
            fetch_tx,
            pf_tx,
            by_page: HashMap::new(),
            forwards: HashMap::new(),
        }
    }

    /// Aborts the tasks of pages that left the stack.
    fn abort_discarded(&mut self, app: &mut App) {
        self.abort_pages(app.take_discarded());
    }

    fn abort_pages(&mut self, page_ids: impl IntoIterator<Item = u64>) {
        for page_id in page_ids {
            if let Some(handle) = self.by_page.remove(&page_id) {
                debug!(page_id, "aborting fetch of discarded page");
                handle.abort();
            }
        }
    }

    /// Spawns `work` for `page_id` unless the page's previous fetch is still running.
    /// Only a discarded page cancels its fetch.
    fn spawn_fetch<Fut>(&mut self, page_id: u64, work: Fut) -> bool
    where
        Fut: Future<Output = FetchEvent> + Send + 'static,
    {
        if self
            .by_page
            .get(&page_id)
            .is_some_and(|handle| !handle.is_finished())
        {
            debug!(page_id, "fetch still in flight, skipping");
            return false;
        }
        let tx = self.fetch_tx.clone();
        let handle = tokio::spawn(async move {
            let _ = tx.send(work.await);
        });
        self.by_page.insert(page_id, handle);
        true
    }

    /// Waits on a port-forward process until it exits or is stopped.
    fn watch_port_forward(&mut self, pid: u32, target: Target, mut child: Child) {
        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let tx = self.pf_tx.clone();
        tokio::spawn(async move {
            let result = tokio::select! {
                result = child.wait() => result,
                _ = stop_rx => {
                    let _ = child.start_kill();
                    child.wait().await
                }
            };
            let _ = tx.send(PortForwardExitEvent {
                pid,
                target,
                result: result.map_err(|error| format!("wait failed: {error}")),
            });
        });
        self.forwards.insert(pid, stop_tx);
    }

    fn stop_port_forward(&mut self, pid: u32) {
        if let Some(stop) = self.forwards.remove(&pid) {
            debug!(pid, "stopping port-forward");
            let _ = stop.send(());
        }
    }

    fn abort_all(&mut self) {
        for (_, handle) in self.by_page.drain() {
            handle.abort();
        }
        for (_, stop) in self.forwards.drain() {
            let _ = stop.send(());
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();
    let paths = Paths::discover();
    if matches!(args.command, Some(CliCommand::Info)) {
        print_info(&paths);
        return Ok(());
    }
    init_tracing(&args.log_level, &paths.log_file)?;
    info!(version = env!("CARGO_PKG_VERSION"), "osc starting");

    let (mut config, config_warning) = load_config(&paths.config_file)?;
    args.apply_overrides(config.settings_mut());

    let kubeconfig = match &args.kubeconfig {
        Some(path) => Kubeconfig::read_from(path)
            .with_context(|| format!("failed to read kubeconfig {}", path.display()))?,
        None => Kubeconfig::read().context("failed to read kubeconfig")?,
    };
    config
        .refine(&args.flags(), &kubeconfig)
        .context("failed to resolve Kubernetes context")?;
    let state = ClusterState::from_kubeconfig(&kubeconfig, Some(config.current_context()));

    let gateway = Gateway::from_kube_selection(
        kubeconfig,
        config.current_context(),
        args.cluster.as_deref(),
        config.settings().logger(),
    )
    .await?;
    let live = match timeout(NAMESPACE_TIMEOUT, gateway.namespace_names()).await {
        Ok(Ok(namespaces)) => state.with_namespaces(namespaces),
        Ok(Err(error)) => {
            warn!(error = %compact_error(&error), "unable to list namespaces");
            state
        }
        Err(_) => {
            warn!("timed out listing namespaces");
            state
        }
    };
    config.validate(&live);

    let config_file = paths.config_file.clone();
    let mut app = App::new(config, paths);
    if let Some(warning) = config_warning {
        app.flash_warn(warning);
    }
    let result = run(&mut app, &gateway).await;

    if let Err(error) = app.config_mut().save(&live, &config_file) {
        error!(error = %error, "failed to save osc config");
    }
    info!("osc exiting");
    result
}

/// A malformed file is reported and the defaults stay in use. Other errors are fatal.
fn load_config(path: &Path) -> Result<(Config, Option<String>)> {
    let mut config = Config::default();
    match config.load(path) {
        Ok(()) => Ok((config, None)),
        Err(error @ ConfigError::Parse { .. }) => {
            warn!(error = %error, "ignoring malformed osc config");
            Ok((config, Some(format!("{error}, using defaults"))))
        }
        Err(error) => Err(error).context("failed to load osc configuration"),
    }
}

fn print_info(paths: &Paths) {
    println!("{:<12}{}", "Config:", paths.config_file.display());
    println!("{:<12}{}", "Logs:", paths.log_file.display());
    println!("{:<12}{}", "Screens:", paths.dump_dir.display());
    println!("{:<12}{}", "Benchmarks:", paths.bench_dir.display());
}

fn init_tracing(level_filter: &str, log_file: &Path) -> Result<()> {
    let filter = EnvFilter::try_new(level_filter)
        .or_else(|_| EnvFilter::try_new("info"))
        .context("failed to initialize tracing filter")?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .with_context(|| format!("failed to open log file {}", log_file.display()))?;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .compact()
        .with_writer(Mutex::new(file))
        .try_init();

    Ok(())
}

async fn run(app: &mut App, gateway: &Gateway) -> Result<()> {
    let (mut terminal, keyboard_enhanced) = init_terminal()?;
    let run_result = run_loop(&mut terminal, app, gateway).await;
    let restore_result = restore_terminal(&mut terminal, keyboard_enhanced);

    match (run_result, restore_result) {
        (Err(run_error), Err(restore_error)) => Err(anyhow::anyhow!(
            "{run_error:#}\nterminal restore error: {restore_error:#}"
        )),
        (Err(error), _) => Err(error),
        (_, Err(error)) => Err(error),
        (Ok(()), Ok(())) => Ok(()),
    }
}

fn init_terminal() -> Result<(TuiTerminal, bool)> {
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    let keyboard_enhanced = matches!(supports_keyboard_enhancement(), Ok(true));
    if keyboard_enhanced {
        execute!(
            stdout,
            EnterAlternateScreen,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES)
        )
        .context("failed to enter alternate screen with keyboard enhancement")?;
    } else {
        execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("failed to create terminal backend")?;
    terminal.clear().context("failed to clear terminal")?;
    Ok((terminal, keyboard_enhanced))
}

fn restore_terminal(terminal: &mut TuiTerminal, keyboard_enhanced: bool) -> Result<()> {
    if keyboard_enhanced {
        execute!(terminal.backend_mut(), PopKeyboardEnhancementFlags)
            .context("failed to pop keyboard enhancement flags")?;
    }
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor().context("failed to show cursor")?;
    Ok(())
}

async fn run_loop(terminal: &mut TuiTerminal, app: &mut App, gateway: &Gateway) -> Result<()> {
    let (fetch_tx, mut fetch_rx) = mpsc::unbounded_channel::<FetchEvent>();
    let (pf_tx, mut pf_rx) = mpsc::unbounded_channel::<PortForwardExitEvent>();
    let mut tasks = Tasks::new(fetch_tx, pf_tx);

    let mut reader = EventStream::new();
    let refresh_rate = u64::try_from(app.config().settings().refresh_rate()).unwrap_or(1);
    let mut refresh = interval(Duration::from_secs(refresh_rate.max(1)));
    refresh.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut flash_tick = interval(FLASH_TICK);
    flash_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let command = app.start();
    execute_app_command(terminal, app, gateway, command, &mut tasks).await;

    loop {
        terminal
            .draw(|frame| ui::render(frame, app))
            .context("failed to render terminal frame")?;

        if !app.running() {
            break;
        }

        tokio::select! {
            maybe_event = reader.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        let command = app.handle_key(key);
                        debug!(?command, "key handled");
                        execute_app_command(terminal, app, gateway, command, &mut tasks).await;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(error)) => {
                        app.flash_err(format!("terminal event error: {error}"));
                    }
                    None => {
                        warn!("terminal event stream closed");
                        break;
                    }
                }
            }
            _ = refresh.tick() => {
                let command = app.refresh();
                execute_app_command(terminal, app, gateway, command, &mut tasks).await;
            }
            _ = flash_tick.tick() => {
                app.expire_flash(std::time::Instant::now());
            }
            maybe_event = fetch_rx.recv() => {
                match maybe_event {
                    Some(FetchEvent::Listing { page_id, result }) => {
                        tasks.by_page.remove(&page_id);
                        app.on_fetch(page_id, result);
                    }
                    Some(FetchEvent::Detail { page_id, result }) => {
                        tasks.by_page.remove(&page_id);
                        app.on_detail(page_id, result);
                    }
                    Some(FetchEvent::Mutation(Ok(message))) => {
                        app.flash_info(message);
                        let command = app.refresh();
                        execute_app_command(terminal, app, gateway, command, &mut tasks).await;
                    }
                    Some(FetchEvent::Mutation(Err(message))) => app.flash_err(message),
                    None => {}
                }
            }
            maybe_event = pf_rx.recv() => {
                if let Some(event) = maybe_event {
                    tasks.forwards.remove(&event.pid);
                    report_port_forward_exit(app, event);
                }
            }
        }
    }

    tasks.abort_all();
    Ok(())
}

fn report_port_forward_exit(app: &mut App, event: PortForwardExitEvent) {
    let Some(session) = app.remove_port_forward(event.pid) else {
        debug!(pid = event.pid, path = %event.target.path, "stopped port-forward exited");
        return;
    };
    let target = format!(
        "{} {}:{}",
        session.target.path, session.local_port, session.remote_port
    );
    match event.result {
        Ok(status) if status.success() => {
            app.flash_info(format!("Port-forward closed: {target}"));
        }
        Ok(status) => {
            app.flash_warn(format!("Port-forward exited ({status}) for {target}"));
        }
        Err(error) => {
            app.flash_err(format!("Port-forward failed for {target}: {error}"));
        }
    }
}

async fn execute_app_command(
    terminal: &mut TuiTerminal,
    app: &mut App,
    gateway: &Gateway,
    command: AppCommand,
    tasks: &mut Tasks,
) {
    tasks.abort_discarded(app);

    match command {
        AppCommand::None | AppCommand::Quit => {}
        AppCommand::Fetch { page_id, ctx } => {
            let gateway = gateway.clone();
            tasks.spawn_fetch(page_id, async move {
                let result = match timeout(FETCH_TIMEOUT, gateway.fetch(&ctx)).await {
                    Ok(Ok(listing)) => Ok(listing),
                    Ok(Err(error)) => Err(compact_error(&error)),
                    Err(_) => Err(format!("timed out listing {}", ctx.gvr)),
                };
                FetchEvent::Listing { page_id, result }
            });
        }
        AppCommand::FetchDetail { page_id, source } => {
            let gateway = gateway.clone();
            tasks.spawn_fetch(page_id, async move {
                let result = match timeout(FETCH_TIMEOUT, gateway.fetch_detail(&source)).await {
                    Ok(Ok(content)) => Ok(content),
                    Ok(Err(error)) => Err(compact_error(&error)),
                    Err(_) => Err("timed out loading details".to_string()),
                };
                FetchEvent::Detail { page_id, result }
            });
        }
        AppCommand::Scale { target, replicas } => {
            spawn_mutation(tasks, gateway, move |gateway: Gateway| async move {
                gateway.scale(&target, replicas).await?;
                anyhow::Ok(format!("Scaled {} to {replicas}", target.path))
            });
        }
        AppCommand::Restart(target) => {
            spawn_mutation(tasks, gateway, move |gateway: Gateway| async move {
                gateway.restart(&target).await?;
                anyhow::Ok(format!("Restarted {}", target.path))
            });
        }
        AppCommand::SetImage {
            target,
            container,
            image,
        } => {
            spawn_mutation(tasks, gateway, move |gateway: Gateway| async move {
                gateway.set_image(&target, &container, &image).await?;
                anyhow::Ok(format!("Set {container} image to {image} on {}", target.path))
            });
        }
        AppCommand::Delete { target, dir } => {
            spawn_mutation(tasks, gateway, move |gateway: Gateway| async move {
                gateway.delete(&target, dir.as_deref()).await?;
                anyhow::Ok(format!("Deleted {}", target.path))
            });
        }
        AppCommand::PortForward {
            target,
            local_port,
            remote_port,
        } => match gateway.port_forward(&target, local_port, remote_port) {
            Ok((pid, child)) => {
                info!(pid, path = %target.path, local_port, remote_port, "port-forward started");
                app.register_port_forward(PortForwardSession {
                    target: target.clone(),
                    local_port,
                    remote_port,
                    pid,
                    started_at: Instant::now(),
                });
                tasks.watch_port_forward(pid, target, child);
            }
            Err(error) => app.flash_err(compact_error(&error)),
        },
        AppCommand::StopPortForward { pid } => tasks.stop_port_forward(pid),
        AppCommand::Edit(path) => {
            if let Err(error) = run_editor(terminal, &path).await {
                warn!(error = %error, path = %path.display(), "editor failed");
                app.flash_err(format!("Failed to launch editor: {}", compact_error(&error)));
            }
        }
    }
}

fn spawn_mutation<F, Fut>(tasks: &Tasks, gateway: &Gateway, work: F)
where
    F: FnOnce(Gateway) -> Fut + Send + 'static,
    Fut: Future<Output = Result<String>> + Send + 'static,
{
    let gateway = gateway.clone();
    let tx = tasks.fetch_tx.clone();
    tokio::spawn(async move {
        let result = work(gateway).await.map_err(|error| compact_error(&error));
        let _ = tx.send(FetchEvent::Mutation(result));
    });
}

/// Opens `path` in `$EDITOR`. The terminal is resumed whatever the outcome.
async fn run_editor(terminal: &mut TuiTerminal, path: &Path) -> Result<()> {
    let editor = std::env::var("EDITOR")
        .ok()
        .filter(|editor| !editor.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_EDITOR.to_string());
    let status = while_suspended(terminal, async {
        TokioCommand::new(&editor)
            .arg(path)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .with_context(|| format!("failed to run {editor}"))
    })
    .await?;

    if status.success() {
        Ok(())
    } else {
        Err(ViewError::ExternalProcess {
            program: editor,
            status: status.to_string(),
        }
        .into())
    }
}

/// A screen that can be handed to a child process and taken back.
trait Suspend {
    fn suspend(&mut self) -> Result<()>;
    fn resume(&mut self) -> Result<()>;
}

impl Suspend for TuiTerminal {
    fn suspend(&mut self) -> Result<()> {
        disable_raw_mode().context("failed to disable raw mode for subprocess")?;
        execute!(self.backend_mut(), LeaveAlternateScreen)
            .context("failed to leave alternate screen for subprocess")?;
        self.show_cursor()
            .context("failed to show cursor for subprocess")?;
        Ok(())
    }

    fn resume(&mut self) -> Result<()> {
        enable_raw_mode().context("failed to re-enable raw mode after subprocess")?;
        execute!(self.backend_mut(), EnterAlternateScreen)
            .context("failed to re-enter alternate screen after subprocess")?;
        self.clear()
            .context("failed to clear terminal after subprocess")?;
        Ok(())
    }
}

/// Runs `work` with the screen suspended. The screen is resumed on every path,
/// including a failed suspend.
async fn while_suspended<S, T>(
    screen: &mut S,
    work: impl Future<Output = Result<T>>,
) -> Result<T>
where
    S: Suspend,
{
    let run_result = match screen.suspend() {
        Ok(()) => work.await,
        Err(error) => Err(error),
    };
    let resume_result = screen.resume();

    match (run_result, resume_result) {
        (Err(run_error), Err(resume_error)) => Err(anyhow::anyhow!(
            "{run_error:#}\nterminal resume error: {resume_error:#}"
        )),
        (Err(error), _) | (_, Err(error)) => Err(error),
        (Ok(value), Ok(())) => Ok(value),
    }
}

#[cfg(test)]
mod tests {
    use super::{FetchEvent, PortForwardExitEvent, Suspend, Tasks, load_config, while_suspended};
    use crate::config::Settings;
    use crate::k8s::Listing;
    use crate::model::ResourceKind;
    use crate::view::Target;
    use anyhow::{Result, bail};
    use std::fs;
    use tempfile::TempDir;
    use tokio::process::Command as TokioCommand;
    use tokio::sync::mpsc;
    use tokio::time::{Duration, sleep, timeout};

    fn tasks() -> (
        Tasks,
        mpsc::UnboundedReceiver<FetchEvent>,
        mpsc::UnboundedReceiver<PortForwardExitEvent>,
    ) {
        let (fetch_tx, fetch_rx) = mpsc::unbounded_channel();
        let (pf_tx, pf_rx) = mpsc::unbounded_channel();
        (Tasks::new(fetch_tx, pf_tx), fetch_rx, pf_rx)
    }

    async fn slow_listing(page_id: u64, delay: Duration) -> FetchEvent {
        sleep(delay).await;
        FetchEvent::Listing {
            page_id,
            result: Ok(Listing::default()),
        }
    }

    #[tokio::test]
    async fn refresh_skips_a_page_already_fetching() {
        let (mut tasks, mut fetch_rx, _pf_rx) = tasks();

        assert!(tasks.spawn_fetch(1, std::future::pending()));
        assert!(!tasks.spawn_fetch(1, slow_listing(1, Duration::ZERO)));
        assert!(tasks.spawn_fetch(2, slow_listing(2, Duration::ZERO)));

        let event = timeout(Duration::from_secs(1), fetch_rx.recv()).await.unwrap();
        assert!(matches!(event, Some(FetchEvent::Listing { page_id: 2, .. })));

        tasks.abort_pages([1]);
        assert!(tasks.spawn_fetch(1, slow_listing(1, Duration::ZERO)));
        let event = timeout(Duration::from_secs(1), fetch_rx.recv()).await.unwrap();
        assert!(matches!(event, Some(FetchEvent::Listing { page_id: 1, .. })));
    }

    #[tokio::test]
    async fn slow_listings_complete_across_refresh_ticks() {
        let (mut tasks, mut fetch_rx, _pf_rx) = tasks();

        let mut started = 0;
        for _ in 0..5 {
            if tasks.spawn_fetch(1, slow_listing(1, Duration::from_millis(300))) {
                started += 1;
            }
            sleep(Duration::from_millis(200)).await;
        }

        let mut delivered = 0;
        while let Ok(Some(event)) = timeout(Duration::from_millis(600), fetch_rx.recv()).await {
            assert!(matches!(
                event,
                FetchEvent::Listing {
                    page_id: 1,
                    result: Ok(_)
                }
            ));
            delivered += 1;
        }
        assert!(delivered >= 1);
        assert_eq!(delivered, started);
    }

    #[tokio::test]
    async fn discarded_pages_never_deliver() {
        let (mut tasks, mut fetch_rx, _pf_rx) = tasks();

        tasks.spawn_fetch(2, slow_listing(2, Duration::from_millis(100)));
        tasks.abort_pages([2]);

        assert!(
            timeout(Duration::from_millis(400), fetch_rx.recv())
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn stopped_port_forward_is_killed_and_reported() {
        let (mut tasks, _fetch_rx, mut pf_rx) = tasks();
        let child = TokioCommand::new("sleep")
            .arg("30")
            .kill_on_drop(true)
            .spawn()
            .unwrap();
        let pid = child.id().unwrap();
        let target = Target {
            gvr: ResourceKind::Pods.gvr(),
            path: "fred/nginx".to_string(),
        };

        tasks.watch_port_forward(pid, target, child);
        tasks.stop_port_forward(pid);
        assert!(tasks.forwards.is_empty());

        let event = timeout(Duration::from_secs(5), pf_rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(event.pid, pid);
        assert_eq!(event.target.path, "fred/nginx");
        assert!(!event.result.unwrap().success());
    }

    #[test]
    fn malformed_config_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "osc: [not, a, map").unwrap();

        let (config, warning) = load_config(&path).unwrap();
        assert_eq!(config.settings(), &Settings::new());
        assert!(warning.unwrap().contains("using defaults"));
    }

    #[test]
    fn unreadable_config_is_fatal() {
        let dir = TempDir::new().unwrap();
        assert!(load_config(dir.path()).is_err());

        let missing = dir.path().join("missing.yaml");
        let (_, warning) = load_config(&missing).unwrap();
        assert!(warning.is_none());
    }

    #[derive(Default)]
    struct FakeScreen {
        fail_suspend: bool,
        calls: Vec<&'static str>,
    }

    impl Suspend for FakeScreen {
        fn suspend(&mut self) -> Result<()> {
            self.calls.push("suspend");
            if self.fail_suspend {
                bail!("no tty");
            }
            Ok(())
        }

        fn resume(&mut self) -> Result<()> {
            self.calls.push("resume");
            Ok(())
        }
    }

    #[tokio::test]
    async fn screen_is_resumed_when_suspend_fails() {
        let mut screen = FakeScreen {
            fail_suspend: true,
            ..FakeScreen::default()
        };
        let mut ran = false;
        let result = while_suspended(&mut screen, async {
            ran = true;
            Ok(())
        })
        .await;

        assert_eq!(result.unwrap_err().to_string(), "no tty");
        assert!(!ran);
        assert_eq!(screen.calls, ["suspend", "resume"]);
    }

    #[tokio::test]
    async fn screen_is_resumed_after_work() {
        let mut screen = FakeScreen::default();
        let result = while_suspended(&mut screen, async { Ok(7) }).await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(screen.calls, ["suspend", "resume"]);
    }
}
