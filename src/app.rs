use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::action::{Action, Scroll};
use crate::command::{CommandResult, CommandTable, Invocation, Lookup, Request};
use crate::config::{Config, KeybindsConfig, parse_key};
use crate::error::{DispatchError, InputError, describe_exit};
use crate::format::output_lines;
use crate::input::Param;
use crate::listing::{
    InstalledPackage, VersionListing, merge_updates, package_labels, parse_installed,
    parse_outdated, parse_versions,
};
use crate::menu::{Key, MenuAction, MenuSignal, SelectionState, handle_key, move_cursor};
use crate::ui::theme::Theme;

#[derive(Debug, Clone)]
pub struct ResolvedKeybinds {
    pub quit: KeyCode,
    pub help: KeyCode,
    pub cycle_theme: KeyCode,
}

impl ResolvedKeybinds {
    pub fn from_config(kb: &KeybindsConfig) -> Self {
        Self {
            quit: parse_key(&kb.quit).unwrap_or(KeyCode::Char('q')),
            help: parse_key(&kb.help).unwrap_or(KeyCode::Char('?')),
            cycle_theme: parse_key(&kb.cycle_theme).unwrap_or(KeyCode::Char('t')),
        }
    }

    /// Returns (key_label, description) pairs for the help overlay.
    pub fn help_entries(&self) -> Vec<(String, &'static str)> {
        vec![
            ("↑↓".to_string(), "Move cursor"),
            ("Home/End".to_string(), "First / last item"),
            ("Enter".to_string(), "Run selected action"),
            (key_label(self.quit), "Quit"),
            ("Esc".to_string(), "Quit / cancel prompt"),
            (key_label(self.help), "Toggle help"),
            (key_label(self.cycle_theme), "Cycle theme"),
            ("PgUp/PgDn".to_string(), "Scroll output"),
            ("Ctrl+C".to_string(), "Quit (always)"),
        ]
    }
}

pub fn key_label(code: KeyCode) -> String {
    match code {
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::Backspace => "Bksp".to_string(),
        KeyCode::Delete => "Del".to_string(),
        KeyCode::F(n) => format!("F{n}"),
        _ => "?".to_string(),
    }
}

/// Text prompt collecting the parameters of one action, one field at a time.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptState {
    pub action: MenuAction,
    pub collected: Vec<(Param, String)>,
    pub input: String,
    pub error: Option<InputError>,
}

impl PromptState {
    fn new(action: MenuAction) -> Self {
        Self {
            action,
            collected: Vec::new(),
            input: String::new(),
            error: None,
        }
    }

    /// Continues a prompt whose first fields were answered elsewhere.
    fn resume(action: MenuAction, collected: Vec<(Param, String)>) -> Self {
        Self {
            collected,
            ..Self::new(action)
        }
    }

    pub fn current_param(&self) -> Param {
        self.action.params()[self.collected.len()]
    }

    /// One-based index of the current field and the field count.
    pub fn step(&self) -> (usize, usize) {
        (self.collected.len() + 1, self.action.params().len())
    }

    fn is_complete(&self) -> bool {
        self.collected.len() == self.action.params().len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pick {
    Package { action: MenuAction },
    Version { package: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickerEntry {
    pub label: String,
    /// `None` switches to typing the value instead.
    pub value: Option<String>,
}

/// Selectable list of packages or versions. The last entry is always the
/// typed-input fallback, so `entries` is never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickerState {
    pub pick: Pick,
    pub title: String,
    pub entries: Vec<PickerEntry>,
    pub cursor: usize,
}

impl PickerState {
    fn packages(action: MenuAction, packages: &[InstalledPackage]) -> Self {
        let mut entries: Vec<PickerEntry> = package_labels(packages)
            .into_iter()
            .zip(packages)
            .map(|(label, pack)| PickerEntry {
                label,
                value: Some(pack.name.clone()),
            })
            .collect();
        entries.push(PickerEntry {
            label: "Type a package name…".to_string(),
            value: None,
        });
        let outdated = packages.iter().filter(|p| p.has_update()).count();
        Self {
            pick: Pick::Package { action },
            title: format!(
                " Select package to {} ({} installed, {outdated} outdated) ",
                action.title().to_lowercase(),
                packages.len()
            ),
            entries,
            cursor: 0,
        }
    }

    fn versions(package: String, listing: VersionListing) -> Self {
        let installed = listing.installed.as_deref();
        let mut entries: Vec<PickerEntry> = listing
            .versions
            .iter()
            .map(|version| PickerEntry {
                label: if Some(version.as_str()) == installed {
                    format!("{version}  (installed)")
                } else {
                    version.clone()
                },
                value: Some(version.clone()),
            })
            .collect();
        entries.push(PickerEntry {
            label: "Type a version…".to_string(),
            value: None,
        });
        let title = match installed {
            Some(current) => format!(" Select version for {package} (current: {current}) "),
            None => format!(" Select version for {package} "),
        };
        Self {
            pick: Pick::Version { package },
            title,
            entries,
            cursor: 0,
        }
    }

    pub fn current(&self) -> &PickerEntry {
        &self.entries[self.cursor]
    }

    pub fn labels(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.label.as_str()).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Stdout,
    Stderr,
    Note,
}

/// Captured output of a finished command, ready for scrolling.
#[derive(Debug, Clone)]
pub struct ResultView {
    pub request: Request,
    pub invocation: Invocation,
    pub result: CommandResult,
    pub lines: Vec<(Stream, String)>,
    pub scroll: usize,
    /// Rows available for output, updated on every draw.
    pub viewport: usize,
}

impl ResultView {
    pub fn new(request: Request, invocation: Invocation, result: CommandResult) -> Self {
        let mut lines: Vec<(Stream, String)> = output_lines(&result.stdout)
            .into_iter()
            .map(|line| (Stream::Stdout, line))
            .collect();
        if !result.stderr.trim().is_empty() {
            lines.push((Stream::Note, "── stderr ──".to_string()));
            lines.extend(
                output_lines(&result.stderr)
                    .into_iter()
                    .map(|line| (Stream::Stderr, line)),
            );
        }
        if lines.is_empty() {
            lines.push((Stream::Note, "(no output)".to_string()));
        }
        Self {
            request,
            invocation,
            result,
            lines,
            scroll: 0,
            viewport: 1,
        }
    }

    pub fn max_scroll(&self) -> usize {
        self.lines.len().saturating_sub(self.viewport.max(1))
    }

    pub fn scroll(&mut self, scroll: Scroll) {
        let page = self.viewport.max(1);
        let max = self.max_scroll();
        self.scroll = match scroll {
            Scroll::LineUp => self.scroll.saturating_sub(1),
            Scroll::LineDown => (self.scroll + 1).min(max),
            Scroll::PageUp => self.scroll.saturating_sub(page),
            Scroll::PageDown => (self.scroll + page).min(max),
            Scroll::Top => 0,
            Scroll::Bottom => max,
        };
    }

    pub fn set_viewport(&mut self, rows: usize) {
        self.viewport = rows.max(1);
        self.scroll = self.scroll.min(self.max_scroll());
    }
}

#[derive(Debug, Clone)]
pub enum Screen {
    Menu,
    Prompt(PromptState),
    Picker(PickerState),
    Executing(Invocation),
    Result(ResultView),
}

/// What a queued job is for.
#[derive(Debug, Clone, PartialEq)]
pub enum Task {
    Run(Request),
    /// Installed packages for the picker of `action`.
    Installed { action: MenuAction },
    /// Update check merged into `packages` before the picker opens.
    Outdated {
        action: MenuAction,
        packages: Vec<InstalledPackage>,
    },
    /// Versions of `package` offered by the downgrade picker.
    Versions { package: String },
}

impl Task {
    fn name(&self) -> &'static str {
        match self {
            Task::Run(_) => "run",
            Task::Installed { .. } => "installed",
            Task::Outdated { .. } => "outdated",
            Task::Versions { .. } => "versions",
        }
    }
}

/// A command waiting for the main loop to run it.
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    pub task: Task,
    pub invocation: Invocation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Ok,
    Error,
    Info,
}

#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub kind: StatusKind,
    pub created: Instant,
}

pub struct App {
    pub running: bool,
    pub selection: SelectionState,
    pub screen: Screen,
    pub show_help: bool,
    pub theme: Theme,
    pub status_message: Option<StatusMessage>,
    pub manager_banner: String,
    pub keybinds: ResolvedKeybinds,
    commands: CommandTable,
    pending: Option<Job>,
    status_ttl: Duration,
}

impl App {
    pub fn new(config: &Config, commands: CommandTable, manager_banner: String) -> Self {
        App {
            running: true,
            selection: SelectionState::default(),
            screen: Screen::Menu,
            show_help: false,
            theme: Theme::from_config(&config.colors.theme),
            status_message: None,
            manager_banner,
            keybinds: ResolvedKeybinds::from_config(&config.keybinds),
            commands,
            pending: None,
            status_ttl: Duration::from_secs(config.general.status_message_secs),
        }
    }

    pub fn map_key(&self, key: KeyEvent) -> Action {
        // Ctrl+C always quits (hardwired safety)
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Action::Quit;
        }

        if self.show_help {
            // Only the help key and Esc dismiss the overlay
            if key.code == self.keybinds.help || key.code == KeyCode::Esc {
                return Action::ToggleHelp;
            }
            return Action::None;
        }

        match &self.screen {
            Screen::Menu => self.map_key_menu(key),
            Screen::Prompt(prompt) => map_key_prompt(prompt, key),
            Screen::Picker(_) => self.map_key_picker(key),
            Screen::Executing(_) => Action::None,
            Screen::Result(_) => map_key_result(key),
        }
    }

    fn map_key_menu(&self, key: KeyEvent) -> Action {
        let code = key.code;
        let kb = &self.keybinds;

        // Navigation keys are hardwired (not configurable)
        match code {
            KeyCode::Up => return Action::Menu(Key::Up),
            KeyCode::Down => return Action::Menu(Key::Down),
            KeyCode::Home => return Action::Menu(Key::Home),
            KeyCode::End => return Action::Menu(Key::End),
            KeyCode::Enter => return Action::Menu(Key::Enter),
            KeyCode::Esc => return Action::Menu(Key::Escape),
            _ => {}
        }

        if code == kb.quit {
            return Action::Menu(Key::Quit);
        }
        if code == kb.help {
            return Action::ToggleHelp;
        }
        if code == kb.cycle_theme {
            return Action::CycleTheme;
        }
        Action::None
    }

    fn map_key_picker(&self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Up => Action::Pick(Key::Up),
            KeyCode::Down => Action::Pick(Key::Down),
            KeyCode::Home => Action::Pick(Key::Home),
            KeyCode::End => Action::Pick(Key::End),
            KeyCode::Enter => Action::Pick(Key::Enter),
            KeyCode::Esc => Action::CancelPrompt,
            code if code == self.keybinds.quit => Action::CancelPrompt,
            _ => Action::None,
        }
    }

    pub fn dispatch(&mut self, action: Action) {
        match action {
            Action::Quit => self.running = false,
            Action::Menu(key) => self.on_menu_key(key),
            Action::UpdateInput(text) => {
                if let Screen::Prompt(prompt) = &mut self.screen {
                    prompt.input = text;
                }
            }
            Action::SubmitInput => self.submit_input(),
            Action::Pick(key) => self.on_picker_key(key),
            Action::CancelPrompt => {
                if matches!(self.screen, Screen::Prompt(_) | Screen::Picker(_)) {
                    self.screen = Screen::Menu;
                    self.set_status("Cancelled", StatusKind::Info);
                }
            }
            Action::Scroll(scroll) => {
                if let Screen::Result(view) = &mut self.screen {
                    view.scroll(scroll);
                }
            }
            Action::DismissResult => {
                if matches!(self.screen, Screen::Result(_)) {
                    self.screen = Screen::Menu;
                }
            }
            Action::ToggleHelp => self.show_help = !self.show_help,
            Action::CycleTheme => self.theme = self.theme.next(),
            Action::None => {}
        }
    }

    fn on_menu_key(&mut self, key: Key) {
        if !matches!(self.screen, Screen::Menu) {
            return;
        }
        let (selection, signal) = handle_key(self.selection.clone(), key);
        self.selection = selection;
        match signal {
            MenuSignal::None => {}
            MenuSignal::Quit => self.running = false,
            MenuSignal::Selected(action) => self.begin(action),
        }
    }

    fn begin(&mut self, action: MenuAction) {
        match action.params().first() {
            None => match Request::from_params(action, &[]) {
                Some(request) => self.queue(Task::Run(request)),
                None => self.incomplete_request(action),
            },
            Some(Param::Package) => self.queue(Task::Installed { action }),
            Some(_) => self.screen = Screen::Prompt(PromptState::new(action)),
        }
    }

    fn submit_input(&mut self) {
        let Screen::Prompt(prompt) = &self.screen else {
            return;
        };
        let prompt = prompt.clone();
        let raw = prompt.input.clone();
        self.advance(prompt, &raw);
    }

    fn on_picker_key(&mut self, key: Key) {
        let Screen::Picker(picker) = &mut self.screen else {
            return;
        };
        if key != Key::Enter {
            picker.cursor = move_cursor(picker.cursor, picker.entries.len(), key);
            return;
        }
        let value = picker.current().value.clone();
        let prompt = match &picker.pick {
            Pick::Package { action } => PromptState::new(*action),
            Pick::Version { package } => PromptState::resume(
                MenuAction::Downgrade,
                vec![(Param::Package, package.clone())],
            ),
        };
        match value {
            Some(value) => self.advance(prompt, &value),
            None => self.screen = Screen::Prompt(prompt),
        }
    }

    /// Validates `raw` as the prompt's current field, then asks for the next
    /// field, looks up versions, or queues the finished request.
    fn advance(&mut self, mut prompt: PromptState, raw: &str) {
        let param = prompt.current_param();
        let value = match param.validate(raw) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(field = %param, error = %err, "rejected input");
                prompt.error = Some(err);
                self.screen = Screen::Prompt(prompt);
                return;
            }
        };
        prompt.collected.push((param, value.clone()));
        prompt.input.clear();
        prompt.error = None;

        if prompt.is_complete() {
            match Request::from_params(prompt.action, &prompt.collected) {
                Some(request) => self.queue(Task::Run(request)),
                None => self.incomplete_request(prompt.action),
            }
        } else if param == Param::Package && prompt.current_param() == Param::Version {
            self.queue(Task::Versions { package: value });
        } else {
            self.screen = Screen::Prompt(prompt);
        }
    }

    fn incomplete_request(&mut self, action: MenuAction) {
        tracing::error!(?action, "collected values do not form a request");
        self.set_status(
            format!("Cannot run {}: missing values", action.title().to_lowercase()),
            StatusKind::Error,
        );
        self.screen = Screen::Menu;
    }

    fn queue(&mut self, task: Task) {
        let invocation = match &task {
            Task::Run(request) => self.commands.invocation(request),
            Task::Installed { .. } => self.commands.lookup_invocation(&Lookup::Installed),
            Task::Outdated { .. } => self.commands.lookup_invocation(&Lookup::Outdated),
            Task::Versions { package } => self.commands.lookup_invocation(&Lookup::Versions {
                package: package.clone(),
            }),
        };
        tracing::info!(
            command = %invocation,
            task = task.name(),
            mutating = matches!(&task, Task::Run(request) if request.is_mutating()),
            "queued"
        );
        self.screen = Screen::Executing(invocation.clone());
        self.pending = Some(Job { task, invocation });
    }

    /// Hands the queued job to the caller, at most once.
    pub fn take_job(&mut self) -> Option<Job> {
        self.pending.take()
    }

    /// Records the outcome of a job taken with [`App::take_job`]. Lookups may
    /// queue a follow-up job.
    pub fn complete(&mut self, job: Job, outcome: Result<CommandResult, DispatchError>) {
        let Job { task, invocation } = job;
        match task {
            Task::Run(request) => self.finish_run(request, invocation, outcome),
            Task::Installed { action } => self.finish_installed(action, &invocation, outcome),
            Task::Outdated { action, packages } => {
                self.finish_outdated(action, packages, &invocation, outcome)
            }
            Task::Versions { package } => self.finish_versions(package, &invocation, outcome),
        }
    }

    fn finish_run(
        &mut self,
        request: Request,
        invocation: Invocation,
        outcome: Result<CommandResult, DispatchError>,
    ) {
        match outcome {
            Ok(result) => {
                let message = request.success_message();
                tracing::info!(command = %invocation, "{message}");
                self.set_status(message, StatusKind::Ok);
                self.screen = Screen::Result(ResultView::new(request, invocation, result));
            }
            Err(DispatchError::NonZeroExit { result }) => {
                let message = format!(
                    "{} ({})",
                    request.failure_message(),
                    describe_exit(result.exit_code)
                );
                tracing::error!(
                    command = %invocation,
                    stderr = %result.stderr.trim(),
                    "{message}"
                );
                self.set_status(message, StatusKind::Error);
                self.screen = Screen::Result(ResultView::new(request, invocation, result));
            }
            Err(err) => {
                tracing::error!(command = %invocation, error = %err, "{}", request.failure_message());
                self.set_status(err.to_string(), StatusKind::Error);
                self.screen = Screen::Menu;
            }
        }
    }

    fn finish_installed(
        &mut self,
        action: MenuAction,
        invocation: &Invocation,
        outcome: Result<CommandResult, DispatchError>,
    ) {
        let packages = match outcome {
            Ok(result) => parse_installed(&result.stdout),
            Err(err) => {
                tracing::warn!(command = %invocation, error = %err, "package listing failed");
                self.set_status(
                    format!("Could not list packages ({err}), type a name instead"),
                    StatusKind::Error,
                );
                self.screen = Screen::Prompt(PromptState::new(action));
                return;
            }
        };
        if packages.is_empty() {
            tracing::warn!(command = %invocation, "no packages in listing output");
            self.set_status(
                "No installed packages found, type a name instead",
                StatusKind::Info,
            );
            self.screen = Screen::Prompt(PromptState::new(action));
        } else {
            self.queue(Task::Outdated { action, packages });
        }
    }

    fn finish_outdated(
        &mut self,
        action: MenuAction,
        mut packages: Vec<InstalledPackage>,
        invocation: &Invocation,
        outcome: Result<CommandResult, DispatchError>,
    ) {
        match outcome {
            Ok(result) => merge_updates(&mut packages, &parse_outdated(&result.stdout)),
            Err(err) => {
                tracing::warn!(command = %invocation, error = %err, "update check failed")
            }
        }
        self.screen = Screen::Picker(PickerState::packages(action, &packages));
    }

    fn finish_versions(
        &mut self,
        package: String,
        invocation: &Invocation,
        outcome: Result<CommandResult, DispatchError>,
    ) {
        let failure = match outcome {
            Ok(result) => match parse_versions(&result.stdout) {
                Some(listing) => {
                    self.screen = Screen::Picker(PickerState::versions(package, listing));
                    return;
                }
                None => None,
            },
            Err(err) => Some(err),
        };
        match failure {
            Some(err) => {
                tracing::warn!(command = %invocation, error = %err, "version lookup failed");
                self.set_status(
                    format!("No version list for {package} ({err}), type a version"),
                    StatusKind::Error,
                );
            }
            None => {
                tracing::warn!(command = %invocation, "no versions in lookup output");
                self.set_status(
                    format!("No version list for {package}, type a version"),
                    StatusKind::Info,
                );
            }
        }
        self.screen = Screen::Prompt(PromptState::resume(
            MenuAction::Downgrade,
            vec![(Param::Package, package)],
        ));
    }

    pub fn set_status(&mut self, text: impl Into<String>, kind: StatusKind) {
        self.status_message = Some(StatusMessage {
            text: text.into(),
            kind,
            created: Instant::now(),
        });
    }

    /// Clears expired status messages.
    pub fn on_tick(&mut self) {
        if let Some(status) = &self.status_message
            && status.created.elapsed() >= self.status_ttl
        {
            self.status_message = None;
        }
    }

    pub fn help_entries(&self) -> Vec<(String, &'static str)> {
        self.keybinds.help_entries()
    }
}

fn map_key_prompt(prompt: &PromptState, key: KeyEvent) -> Action {
    match key.code {
        KeyCode::Esc => Action::CancelPrompt,
        KeyCode::Enter => Action::SubmitInput,
        KeyCode::Backspace => {
            let mut text = prompt.input.clone();
            text.pop();
            Action::UpdateInput(text)
        }
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            let mut text = prompt.input.clone();
            text.push(c);
            Action::UpdateInput(text)
        }
        _ => Action::None,
    }
}

fn map_key_result(key: KeyEvent) -> Action {
    match key.code {
        KeyCode::Up => Action::Scroll(Scroll::LineUp),
        KeyCode::Down => Action::Scroll(Scroll::LineDown),
        KeyCode::PageUp => Action::Scroll(Scroll::PageUp),
        KeyCode::PageDown => Action::Scroll(Scroll::PageDown),
        KeyCode::Home => Action::Scroll(Scroll::Top),
        KeyCode::End => Action::Scroll(Scroll::Bottom),
        _ => Action::DismissResult,
    }
}
