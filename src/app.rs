use crate::config::{Config, Paths};
use crate::dump;
use crate::input::{InputAction, Key, map_input_key};
use crate::k8s::{Listing, format_elapsed_seconds, local_dir};
use crate::model::{Motion, ResourceKind, RowData, split_path};
use crate::view::{
    ActionCtx, ConfirmKind, DetailSource, Details, FetchContext, KeyAction, KeyActions,
    PromptKind, ResourceViewer, Scope, Target, ViewCommand, ViewEnv, ViewSpec, action,
    policy_view, rbac_view, viewer_for,
};
use chrono::Local;
use crossterm::event::KeyEvent;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

const FLASH_TIMEOUT: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Command,
    Filter,
    Prompt(PromptKind, Target),
    Confirm(ConfirmKind, Target),
}

/// Work the UI loop performs on the app's behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    None,
    Fetch {
        page_id: u64,
        ctx: FetchContext,
    },
    FetchDetail {
        page_id: u64,
        source: DetailSource,
    },
    Scale {
        target: Target,
        replicas: i32,
    },
    Restart(Target),
    SetImage {
        target: Target,
        container: String,
        image: String,
    },
    Delete {
        target: Target,
        dir: Option<PathBuf>,
    },
    PortForward {
        target: Target,
        local_port: u16,
        remote_port: u16,
    },
    StopPortForward {
        pid: u32,
    },
    Edit(PathBuf),
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashLevel {
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone)]
pub struct Flash {
    pub message: String,
    pub level: FlashLevel,
    at: Instant,
}

pub enum PageKind {
    Resource(Box<dyn ResourceViewer>),
    Details(Details),
}

pub struct Page {
    pub id: u64,
    pub kind: PageKind,
}

impl Page {
    pub fn title(&self) -> String {
        match &self.kind {
            PageKind::Resource(viewer) => viewer.name().to_string(),
            PageKind::Details(details) => details.title.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortForwardSession {
    pub target: Target,
    pub local_port: u16,
    pub remote_port: u16,
    pub pid: u32,
    pub started_at: Instant,
}

impl PortForwardSession {
    /// `namespace/name|local:remote`, the row path in the port-forwards view.
    pub fn path(&self) -> String {
        format!("{}|{}:{}", self.target.path, self.local_port, self.remote_port)
    }
}

fn port_forward_listing(sessions: &[PortForwardSession], now: Instant) -> Listing {
    let rows = sessions
        .iter()
        .map(|session| {
            let (namespace, name) = split_path(&session.target.path);
            let kind = ResourceKind::from_gvr(&session.target.gvr)
                .map(|kind| kind.kind())
                .unwrap_or_else(|| session.target.gvr.resource());
            let ports = format!("{}:{}", session.local_port, session.remote_port);
            let age = i64::try_from(now.duration_since(session.started_at).as_secs())
                .unwrap_or(i64::MAX);
            RowData {
                name: format!("{name}|{ports}"),
                namespace: namespace.map(str::to_string),
                columns: vec![
                    namespace.unwrap_or("-").to_string(),
                    name.to_string(),
                    kind.to_string(),
                    ports,
                    session.pid.to_string(),
                    format_elapsed_seconds(age),
                ],
                age_seconds: Some(age),
                selector: None,
            }
        })
        .collect();
    Listing {
        headers: ["NAMESPACE", "NAME", "KIND", "PORTS", "PID", "AGE"]
            .into_iter()
            .map(str::to_string)
            .collect(),
        rows,
    }
}

/// Owns the settings and the page stack, and turns keys into commands.
pub struct App {
    config: Config,
    paths: Paths,
    running: bool,
    mode: InputMode,
    input: String,
    pages: Vec<Page>,
    next_page_id: u64,
    discarded: Vec<u64>,
    flash: Option<Flash>,
    show_help: bool,
    actions: KeyActions,
    port_forwards: Vec<PortForwardSession>,
}

impl App {
    pub fn new(config: Config, paths: Paths) -> Self {
        Self {
            config,
            paths,
            running: true,
            mode: InputMode::Normal,
            input: String::new(),
            pages: Vec::new(),
            next_page_id: 1,
            discarded: Vec::new(),
            flash: None,
            show_help: false,
            actions: app_actions(),
            port_forwards: Vec::new(),
        }
    }

    pub fn running(&self) -> bool {
        self.running
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    pub fn mode(&self) -> &InputMode {
        &self.mode
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn flash(&self) -> Option<&Flash> {
        self.flash.as_ref()
    }

    pub fn show_help(&self) -> bool {
        self.show_help
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn top(&self) -> Option<&Page> {
        self.pages.last()
    }

    pub fn port_forwards(&self) -> &[PortForwardSession] {
        &self.port_forwards
    }

    /// Key hints of the top page followed by the app's own.
    pub fn hints(&self) -> Vec<(String, String)> {
        let mut hints = match self.top().map(|page| &page.kind) {
            Some(PageKind::Resource(viewer)) => viewer.hints(),
            Some(PageKind::Details(details)) => details.actions().hints(),
            None => Vec::new(),
        };
        hints.extend(self.actions.hints());
        hints.dedup_by(|left, right| left.0 == right.0);
        hints
    }

    /// Page ids whose fetch tasks can be aborted.
    pub fn take_discarded(&mut self) -> Vec<u64> {
        std::mem::take(&mut self.discarded)
    }

    /// Opens the last command of the active cluster.
    pub fn start(&mut self) -> AppCommand {
        let command = self.config.active_view();
        self.run_command(&command)
    }

    pub fn set_flash(&mut self, level: FlashLevel, message: impl Into<String>) {
        let message = message.into();
        match level {
            FlashLevel::Error => warn!(message = %message, "flash"),
            _ => debug!(message = %message, "flash"),
        }
        self.flash = Some(Flash {
            message,
            level,
            at: Instant::now(),
        });
    }

    pub fn flash_info(&mut self, message: impl Into<String>) {
        self.set_flash(FlashLevel::Info, message);
    }

    pub fn flash_warn(&mut self, message: impl Into<String>) {
        self.set_flash(FlashLevel::Warn, message);
    }

    pub fn flash_err(&mut self, message: impl Into<String>) {
        self.set_flash(FlashLevel::Error, message);
    }

    pub fn expire_flash(&mut self, now: Instant) {
        if let Some(flash) = &self.flash
            && now.duration_since(flash.at) >= FLASH_TIMEOUT
        {
            self.flash = None;
        }
    }

    /// Refetches the top page when it is a resource table.
    pub fn refresh(&mut self) -> AppCommand {
        let top = match self.top() {
            Some(Page {
                id,
                kind: PageKind::Resource(viewer),
            }) => Some((*id, viewer.build_context(&self.env()))),
            _ => None,
        };
        match top {
            Some((page_id, ctx)) => self.fetch(page_id, ctx),
            None => AppCommand::None,
        }
    }

    /// Port-forwards live in the app, every other kind is fetched by the UI loop.
    fn fetch(&mut self, page_id: u64, ctx: FetchContext) -> AppCommand {
        if ctx.gvr != ResourceKind::PortForwards.gvr() {
            return AppCommand::Fetch { page_id, ctx };
        }
        let listing = port_forward_listing(&self.port_forwards, Instant::now());
        self.on_fetch(page_id, Ok(listing));
        AppCommand::None
    }

    fn refill_port_forwards(&mut self) {
        let page_id = match self.top() {
            Some(Page {
                id,
                kind: PageKind::Resource(viewer),
            }) if viewer.gvr() == &ResourceKind::PortForwards.gvr() => *id,
            _ => return,
        };
        let listing = port_forward_listing(&self.port_forwards, Instant::now());
        self.on_fetch(page_id, Ok(listing));
    }

    pub fn on_fetch(&mut self, page_id: u64, result: Result<Listing, String>) {
        let Some(Page {
            id,
            kind: PageKind::Resource(viewer),
        }) = self.pages.last_mut()
        else {
            return;
        };
        if *id != page_id {
            debug!(page_id, "dropping stale fetch result");
            return;
        }
        match result {
            Ok(listing) => viewer
                .table_mut()
                .set_rows(listing.headers, listing.rows, Local::now()),
            Err(error) => viewer.table_mut().set_error(error, Local::now()),
        }
    }

    pub fn on_detail(&mut self, page_id: u64, result: Result<String, String>) {
        let Some(Page {
            id,
            kind: PageKind::Details(details),
        }) = self.pages.last_mut()
        else {
            return;
        };
        if *id != page_id {
            debug!(page_id, "dropping stale detail result");
            return;
        }
        details.set_content(result);
    }

    pub fn register_port_forward(&mut self, session: PortForwardSession) {
        self.flash_info(format!(
            "Port-forward {} {}:{} started",
            session.target.path, session.local_port, session.remote_port
        ));
        self.port_forwards.push(session);
        self.refill_port_forwards();
    }

    /// Forgets the session of an exited process. `None` when it was stopped from the UI.
    pub fn remove_port_forward(&mut self, pid: u32) -> Option<PortForwardSession> {
        let index = self.port_forwards.iter().position(|session| session.pid == pid)?;
        let session = self.port_forwards.remove(index);
        self.refill_port_forwards();
        Some(session)
    }

    fn stop_port_forward(&mut self, path: &str) -> AppCommand {
        let Some(index) = self
            .port_forwards
            .iter()
            .position(|session| session.path() == path)
        else {
            self.flash_err(format!("No port-forward {path}"));
            return AppCommand::None;
        };
        let session = self.port_forwards.remove(index);
        info!(pid = session.pid, path, "stopping port-forward");
        self.flash_info(format!("Stopped port-forward {path}"));
        self.refill_port_forwards();
        AppCommand::StopPortForward { pid: session.pid }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> AppCommand {
        match self.mode.clone() {
            InputMode::Normal => self.dispatch(Key::from_event(key)),
            InputMode::Confirm(kind, target) => {
                self.mode = InputMode::Normal;
                if Key::from_event(key) == Key::char('y') {
                    self.confirm(kind, target)
                } else {
                    self.flash_info("Cancelled");
                    AppCommand::None
                }
            }
            mode => match map_input_key(key) {
                Some(InputAction::Char(c)) => {
                    self.input.push(c);
                    AppCommand::None
                }
                Some(InputAction::Backspace) => {
                    self.input.pop();
                    AppCommand::None
                }
                Some(InputAction::Complete) => {
                    if mode == InputMode::Command {
                        self.complete_command();
                    }
                    AppCommand::None
                }
                Some(InputAction::Cancel) => {
                    self.mode = InputMode::Normal;
                    self.input.clear();
                    AppCommand::None
                }
                Some(InputAction::Submit) => {
                    self.mode = InputMode::Normal;
                    let input = std::mem::take(&mut self.input);
                    self.submit(mode, input.trim())
                }
                None => AppCommand::None,
            },
        }
    }

    /// The top page's bindings first, then the app's.
    fn dispatch(&mut self, key: Key) -> AppCommand {
        let (gvr, path, page_action) = match self.top().map(|page| &page.kind) {
            Some(PageKind::Resource(viewer)) => (
                viewer.gvr().clone(),
                viewer.table().selected_path(),
                viewer.actions().get(&key).map(|action| action.action.clone()),
            ),
            Some(PageKind::Details(details)) => (
                Default::default(),
                None,
                details.actions().get(&key).map(|action| action.action.clone()),
            ),
            None => (Default::default(), None, None),
        };
        let Some(handler) = page_action.or_else(|| {
            self.actions.get(&key).map(|action| action.action.clone())
        }) else {
            return AppCommand::None;
        };

        let command = handler(&ActionCtx {
            gvr: &gvr,
            path: path.as_deref(),
        });
        self.apply(command)
    }

    pub fn apply(&mut self, command: ViewCommand) -> AppCommand {
        match command {
            ViewCommand::None => AppCommand::None,
            ViewCommand::Enter => {
                let env = ViewEnv {
                    config: &self.config,
                    paths: &self.paths,
                };
                let command = match self.pages.last().map(|page| &page.kind) {
                    Some(PageKind::Resource(viewer)) => match viewer.table().selected_path() {
                        Some(path) => viewer.enter(&env, &path),
                        None => ViewCommand::None,
                    },
                    _ => ViewCommand::None,
                };
                self.apply(command)
            }
            ViewCommand::Back => self.pop(),
            ViewCommand::Push(spec) => self.push_view(spec),
            ViewCommand::Sort { column, ascending } => {
                if let Some(viewer) = self.top_viewer_mut() {
                    viewer.table_mut().sort_by(column, ascending);
                }
                AppCommand::None
            }
            ViewCommand::Prompt(kind, target) => {
                self.mode = InputMode::Prompt(kind, target);
                self.input.clear();
                AppCommand::None
            }
            ViewCommand::Confirm(kind, target) => {
                self.mode = InputMode::Confirm(kind, target);
                AppCommand::None
            }
            ViewCommand::Edit(path) => AppCommand::Edit(path),
            ViewCommand::SaveTable => {
                self.save_top();
                AppCommand::None
            }
            ViewCommand::ToggleMark => {
                if let Some(viewer) = self.top_viewer_mut() {
                    viewer.table_mut().toggle_mark();
                }
                AppCommand::None
            }
            ViewCommand::ClearMarks => {
                if let Some(viewer) = self.top_viewer_mut() {
                    viewer.table_mut().clear_marks();
                }
                AppCommand::None
            }
            ViewCommand::StartFilter => {
                self.input = self
                    .top_viewer()
                    .map(|viewer| viewer.table().filter.clone())
                    .unwrap_or_default();
                self.mode = InputMode::Filter;
                AppCommand::None
            }
            ViewCommand::StartCommand => {
                self.input.clear();
                self.mode = InputMode::Command;
                AppCommand::None
            }
            ViewCommand::ToggleHelp => {
                self.show_help = !self.show_help;
                AppCommand::None
            }
            ViewCommand::Move(motion) => {
                match self.pages.last_mut().map(|page| &mut page.kind) {
                    Some(PageKind::Resource(viewer)) => viewer.table_mut().move_selection(motion),
                    Some(PageKind::Details(details)) => details.scroll_by(motion),
                    None => {}
                }
                AppCommand::None
            }
            ViewCommand::SwitchNamespace(namespace) => self.switch_namespace(&namespace),
            ViewCommand::Quit => {
                self.running = false;
                AppCommand::Quit
            }
            ViewCommand::FlashErr(message) => {
                self.flash_err(message);
                AppCommand::None
            }
        }
    }

    /// Runs a `:` command line.
    pub fn run_command(&mut self, line: &str) -> AppCommand {
        let mut tokens = line.split_whitespace();
        let Some(head) = tokens.next() else {
            return AppCommand::None;
        };
        let args = tokens.collect::<Vec<_>>();

        match (head.to_ascii_lowercase().as_str(), args.as_slice()) {
            ("q" | "q!" | "quit", _) => self.apply(ViewCommand::Quit),
            ("ns" | "namespace" | "namespaces", [namespace]) => self.switch_namespace(namespace),
            ("pol" | "policy", [subject, name]) => {
                self.push_view(ViewSpec::Policy {
                    subject: subject.to_string(),
                    name: name.to_string(),
                })
            }
            ("pol" | "policy", _) => {
                self.flash_err("Usage: pol <s|u|g> <name>");
                AppCommand::None
            }
            (token, _) => match ResourceKind::from_token(token) {
                Some(kind) => {
                    self.config.set_active_view(kind.short_token());
                    self.reset_to(ViewSpec::Resource {
                        gvr: kind.gvr(),
                        scope: Scope::default(),
                    })
                }
                None => {
                    self.flash_err(format!("Command not found: {line}"));
                    AppCommand::None
                }
            },
        }
    }

    fn switch_namespace(&mut self, namespace: &str) -> AppCommand {
        if let Err(error) = self.config.set_active_namespace(namespace) {
            self.flash_err(error.to_string());
            return AppCommand::None;
        }
        info!(namespace, "switched namespace");
        self.flash_info(format!("Viewing namespace {namespace}"));
        let kind = self
            .top_viewer()
            .and_then(|viewer| ResourceKind::from_gvr(viewer.gvr()))
            .filter(|kind| kind.namespaced())
            .unwrap_or(ResourceKind::Pods);
        self.reset_to(ViewSpec::Resource {
            gvr: kind.gvr(),
            scope: Scope::default(),
        })
    }

    fn submit(&mut self, mode: InputMode, input: &str) -> AppCommand {
        match mode {
            InputMode::Command => self.run_command(input),
            InputMode::Filter => {
                if let Some(viewer) = self.top_viewer_mut() {
                    viewer.table_mut().set_filter(input);
                }
                AppCommand::None
            }
            InputMode::Prompt(kind, target) => self.submit_prompt(kind, target, input),
            InputMode::Normal | InputMode::Confirm(..) => AppCommand::None,
        }
    }

    fn submit_prompt(&mut self, kind: PromptKind, target: Target, input: &str) -> AppCommand {
        match kind {
            PromptKind::Scale => match input.parse::<i32>() {
                Ok(replicas) if replicas >= 0 => AppCommand::Scale { target, replicas },
                _ => {
                    self.flash_err(format!("Invalid replica count: {input}"));
                    AppCommand::None
                }
            },
            PromptKind::Image => match input.split_once('=') {
                Some((container, image)) if !container.is_empty() && !image.is_empty() => {
                    AppCommand::SetImage {
                        target,
                        container: container.trim().to_string(),
                        image: image.trim().to_string(),
                    }
                }
                _ => {
                    self.flash_err(format!("Expected {}", kind.placeholder()));
                    AppCommand::None
                }
            },
            PromptKind::PortForward => match parse_port_mapping(input) {
                Some((local_port, remote_port)) => AppCommand::PortForward {
                    target,
                    local_port,
                    remote_port,
                },
                None => {
                    self.flash_err(format!("Expected {}", kind.placeholder()));
                    AppCommand::None
                }
            },
        }
    }

    fn confirm(&mut self, kind: ConfirmKind, target: Target) -> AppCommand {
        match kind {
            ConfirmKind::Restart => AppCommand::Restart(target),
            ConfirmKind::Delete if target.gvr == ResourceKind::PortForwards.gvr() => {
                self.stop_port_forward(&target.path)
            }
            ConfirmKind::Delete => {
                let dir = self.top_viewer().and_then(|viewer| {
                    let ctx = viewer.build_context(&self.env());
                    local_dir(&ctx.gvr, ctx.dir.as_deref())
                });
                AppCommand::Delete { target, dir }
            }
        }
    }

    fn complete_command(&mut self) {
        let prefix = self.input.trim().to_ascii_lowercase();
        if prefix.is_empty() {
            return;
        }
        let completion = ResourceKind::ALL
            .into_iter()
            .map(|kind| (kind, kind.title().to_ascii_lowercase()))
            .filter(|(_, command)| ResourceKind::from_token(command).is_some())
            .find(|(kind, command)| {
                command.starts_with(&prefix) || kind.short_token().starts_with(&prefix)
            });
        if let Some((_, command)) = completion {
            self.input = command;
        }
    }

    pub fn push_view(&mut self, spec: ViewSpec) -> AppCommand {
        match spec {
            ViewSpec::Resource { gvr, scope } => self.push_viewer(viewer_for(&gvr, scope)),
            ViewSpec::Policy { subject, name } => self.push_viewer(policy_view(&subject, &name)),
            ViewSpec::Rbac { gvr, path } => self.push_viewer(rbac_view(&gvr, &path)),
            ViewSpec::Details {
                title,
                subject,
                source,
            } => {
                let page_id = self.next_id();
                self.pages.push(Page {
                    id: page_id,
                    kind: PageKind::Details(Details::new(title, subject, source.clone())),
                });
                AppCommand::FetchDetail { page_id, source }
            }
        }
    }

    fn push_viewer(&mut self, mut viewer: Box<dyn ResourceViewer>) -> AppCommand {
        let env = ViewEnv {
            config: &self.config,
            paths: &self.paths,
        };
        viewer.init(&env);
        let ctx = viewer.build_context(&env);
        debug!(view = viewer.name(), actions = viewer.actions().len(), "pushing view");

        let page_id = self.next_id();
        self.pages.push(Page {
            id: page_id,
            kind: PageKind::Resource(viewer),
        });
        self.fetch(page_id, ctx)
    }

    /// Pops the top page and refetches the one below. The root page stays.
    pub fn pop(&mut self) -> AppCommand {
        if self.pages.len() <= 1 {
            return AppCommand::None;
        }
        if let Some(page) = self.pages.pop() {
            self.discarded.push(page.id);
        }
        match self.pages.last().map(|page| &page.kind) {
            Some(PageKind::Details(details)) => AppCommand::FetchDetail {
                page_id: self.pages.last().map(|page| page.id).unwrap_or_default(),
                source: details.source.clone(),
            },
            _ => self.refresh(),
        }
    }

    fn reset_to(&mut self, spec: ViewSpec) -> AppCommand {
        self.discarded
            .extend(self.pages.drain(..).map(|page| page.id));
        self.push_view(spec)
    }

    fn save_top(&mut self) {
        let dir = self.paths.cluster_dump_dir(self.config.current_cluster());
        let result = match self.top().map(|page| &page.kind) {
            Some(PageKind::Resource(viewer)) => {
                dump::save_table(&dir, viewer.name(), viewer.table())
            }
            Some(PageKind::Details(details)) => {
                dump::save_text(&dir, &details.heading(), &details.content)
            }
            None => return,
        };
        match result {
            Ok(path) => self.flash_info(format!("Saved {}", path.display())),
            Err(error) => self.flash_err(error.to_string()),
        }
    }

    fn env(&self) -> ViewEnv<'_> {
        ViewEnv {
            config: &self.config,
            paths: &self.paths,
        }
    }

    fn top_viewer(&self) -> Option<&dyn ResourceViewer> {
        match self.pages.last().map(|page| &page.kind) {
            Some(PageKind::Resource(viewer)) => Some(viewer.as_ref()),
            _ => None,
        }
    }

    fn top_viewer_mut(&mut self) -> Option<&mut Box<dyn ResourceViewer>> {
        match self.pages.last_mut().map(|page| &mut page.kind) {
            Some(PageKind::Resource(viewer)) => Some(viewer),
            _ => None,
        }
    }

    fn next_id(&mut self) -> u64 {
        let id = self.next_page_id;
        self.next_page_id += 1;
        id
    }
}

/// Bindings that apply whatever page is on top.
fn app_actions() -> KeyActions {
    let mut actions = KeyActions::default();
    let motion = |motion: Motion| action(move |_| ViewCommand::Move(motion));
    actions.add([
        (Key::char('q'), KeyAction::new("Quit", action(|_| ViewCommand::Quit))),
        (Key::ctrl('c'), KeyAction::hidden("Quit", action(|_| ViewCommand::Quit))),
        (
            Key::char(':'),
            KeyAction::hidden("Command", action(|_| ViewCommand::StartCommand)),
        ),
        (
            Key::char('?'),
            KeyAction::hidden("Help", action(|_| ViewCommand::ToggleHelp)),
        ),
        (Key::ESC, KeyAction::hidden("Back", action(|_| ViewCommand::Back))),
        (Key::UP, KeyAction::hidden("Up", motion(Motion::Up))),
        (Key::char('k'), KeyAction::hidden("Up", motion(Motion::Up))),
        (Key::DOWN, KeyAction::hidden("Down", motion(Motion::Down))),
        (Key::char('j'), KeyAction::hidden("Down", motion(Motion::Down))),
        (Key::PAGE_UP, KeyAction::hidden("Page Up", motion(Motion::PageUp))),
        (Key::PAGE_DOWN, KeyAction::hidden("Page Down", motion(Motion::PageDown))),
        (Key::HOME, KeyAction::hidden("Top", motion(Motion::Top))),
        (Key::END, KeyAction::hidden("Bottom", motion(Motion::Bottom))),
    ]);
    actions
}

fn parse_port_mapping(mapping: &str) -> Option<(u16, u16)> {
    let mut parts = mapping.split(':');
    let local = parts.next()?.trim().parse::<u16>().ok()?;
    let remote = parts.next()?.trim().parse::<u16>().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((local, remote))
}
