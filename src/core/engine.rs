/// The execution engine: walks a parsed program in response to host events.
///
/// Dispatches inline commands to the host, suspends on `wait`, presents
/// menus and resolves choices into jumps.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;

use crate::core::branch::{resolve, BranchError};
use crate::core::command::{Command, CommandError, CommandTable};
use crate::core::config::{ConfigError, EngineConfig};
use crate::core::host::{Host, MenuChoice, MenuPrompt, TimerToken};
use crate::core::parser::{parse_script_with, ParseError};
use crate::schema::block::Block;
use crate::schema::branch::{BranchSpec, JumpTarget, MenuOption};
use crate::schema::line::Line;
use crate::schema::program::{Program, ProgramError};

static NEXT_SESSION: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("block {block}, line {line}: unrecognized command {name:?}")]
    UnknownCommand {
        block: usize,
        line: usize,
        name: String,
    },
    #[error("block {block}, line {line}: {source}")]
    InvalidArgument {
        block: usize,
        line: usize,
        source: CommandError,
    },
    #[error("block {block}: {source}")]
    Branch { block: usize, source: BranchError },
    #[error("block {block} jumps to block {target}, but the script only has {blocks} blocks")]
    InvalidTarget {
        block: usize,
        target: usize,
        blocks: usize,
    },
    #[error("no choice in slot {slot} (menu has {options} options)")]
    NoSuchChoice { slot: usize, options: usize },
    #[error("session halted by an earlier script error")]
    Halted,
}

impl EngineError {
    /// Fatal errors halt the session; the rest leave the cursor in place.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Branch { .. } | Self::InvalidTarget { .. } | Self::Halted
        )
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("script parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("program error: {0}")]
    Program(#[from] ProgramError),
    #[error("command table error: {0}")]
    Command(#[from] CommandError),
    #[error("no script was provided")]
    NoScript,
}

/// Where the engine is in its event loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineState {
    /// Ready to show the next line on the next advance.
    Presenting,
    /// A `wait` is outstanding; advances are ignored.
    AwaitingTimer,
    /// A menu is displayed; only a choice moves on.
    AwaitingChoice,
    /// The block ended with no choices. Nothing further to show.
    Idle,
    /// The session reached the exit sentinel.
    Exiting,
    /// A fatal script error stopped the session.
    Halted,
}

/// An external event delivered by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    Advance,
    Skip,
    Choose(usize),
    TimerElapsed(TimerToken),
}

/// Position of the live cursor: a block index and the next line within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Cursor {
    pub block: usize,
    pub line: usize,
}

/// One dialogue session over a shared, immutable program.
///
/// The engine is a reactive state machine. It never blocks: a `wait` is
/// handed to the host's timer service and resumed by
/// `Event::TimerElapsed`. Events must be delivered one at a time.
#[derive(Debug)]
pub struct Engine {
    program: Arc<Program>,
    config: EngineConfig,
    commands: CommandTable,
    cursor: Cursor,
    state: EngineState,
    menu: Vec<MenuOption>,
    session: u64,
    timer_sequence: u64,
    pending_timer: Option<TimerToken>,
    live: bool,
}

impl Engine {
    pub fn builder() -> EngineBuilder {
        EngineBuilder {
            script_path: None,
            script_text: None,
            program_path: None,
            program: None,
            config_path: None,
            config: None,
        }
    }

    /// A session over `program` with the default configuration.
    pub fn new(program: impl Into<Arc<Program>>) -> Engine {
        Self::from_parts(program.into(), EngineConfig::default(), CommandTable::standard())
    }

    fn from_parts(program: Arc<Program>, config: EngineConfig, commands: CommandTable) -> Engine {
        let state = if program.is_empty() {
            EngineState::Idle
        } else {
            EngineState::Presenting
        };
        Engine {
            program,
            config,
            commands,
            cursor: Cursor::default(),
            state,
            menu: Vec::new(),
            session: NEXT_SESSION.fetch_add(1, Ordering::Relaxed),
            timer_sequence: 0,
            pending_timer: None,
            live: true,
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn current_block(&self) -> usize {
        self.cursor.block
    }

    /// True while a `wait` is outstanding.
    pub fn is_paused(&self) -> bool {
        self.state == EngineState::AwaitingTimer
    }

    /// False once the session has been ended.
    pub fn is_live(&self) -> bool {
        self.live
    }

    pub fn program(&self) -> &Arc<Program> {
        &self.program
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Options of the menu currently on screen, if any.
    pub fn menu(&self) -> &[MenuOption] {
        &self.menu
    }

    pub fn pending_timer(&self) -> Option<TimerToken> {
        self.pending_timer
    }

    /// Handle one external event and report the resulting state.
    pub fn handle<H: Host>(
        &mut self,
        event: Event,
        host: &mut H,
    ) -> Result<EngineState, EngineError> {
        match event {
            Event::Advance => self.advance(host),
            Event::Skip => self.skip(host),
            Event::Choose(slot) => self.choose(slot, host),
            Event::TimerElapsed(token) => self.timer_elapsed(token, host),
        }
    }

    /// Show the next line, running any commands in front of it.
    pub fn advance<H: Host>(&mut self, host: &mut H) -> Result<EngineState, EngineError> {
        if !self.live {
            return Ok(self.state);
        }
        match self.state {
            EngineState::Presenting => self.run(host)?,
            EngineState::Halted => return Err(EngineError::Halted),
            state => tracing::debug!(?state, "advance ignored"),
        }
        Ok(self.state)
    }

    /// Finish revealing the current line if the host allows it; otherwise
    /// behave exactly like [`Engine::advance`].
    pub fn skip<H: Host>(&mut self, host: &mut H) -> Result<EngineState, EngineError> {
        if self.live && host.is_revealing() && host.is_skippable() {
            host.skip_reveal();
            return Ok(self.state);
        }
        self.advance(host)
    }

    /// Pick the menu option in `slot` and step into its target block.
    pub fn choose<H: Host>(
        &mut self,
        slot: usize,
        host: &mut H,
    ) -> Result<EngineState, EngineError> {
        if !self.live {
            return Ok(self.state);
        }
        match self.state {
            EngineState::AwaitingChoice => {}
            EngineState::Halted => return Err(EngineError::Halted),
            state => {
                tracing::debug!(?state, slot, "choice ignored outside a menu");
                return Ok(self.state);
            }
        }

        let option = self
            .menu
            .get(slot)
            .cloned()
            .ok_or(EngineError::NoSuchChoice {
                slot,
                options: self.menu.len(),
            })?;
        tracing::debug!(slot, label = %option.label, target = ?option.target, "choice selected");

        host.hide_menu();
        self.menu.clear();
        self.jump(option.target, host)?;
        if self.state == EngineState::Presenting {
            self.run(host)?;
        }
        Ok(self.state)
    }

    /// Resume after a `wait`. Tokens that are not the outstanding one are
    /// ignored, as is everything after the session ended.
    pub fn timer_elapsed<H: Host>(
        &mut self,
        token: TimerToken,
        host: &mut H,
    ) -> Result<EngineState, EngineError> {
        if !self.live || self.pending_timer != Some(token) {
            tracing::debug!(?token, "stale timer ignored");
            return Ok(self.state);
        }
        self.pending_timer = None;
        self.state = EngineState::Presenting;
        self.run(host)?;
        Ok(self.state)
    }

    /// Tear the session down. Cancels an outstanding timer; later events
    /// are no-ops.
    pub fn end_session<H: Host>(&mut self, host: &mut H) {
        if !self.live {
            return;
        }
        self.cancel_timer(host);
        self.menu.clear();
        self.live = false;
        tracing::debug!(session = self.session, "session ended");
    }

    /// Step through lines until one is shown, a wait starts, or the block
    /// runs out.
    fn run<H: Host>(&mut self, host: &mut H) -> Result<(), EngineError> {
        let program = Arc::clone(&self.program);
        loop {
            let block = match program.block(self.cursor.block) {
                Some(block) => block,
                None => {
                    return Err(self.halt(EngineError::InvalidTarget {
                        block: self.cursor.block,
                        target: self.cursor.block,
                        blocks: program.len(),
                    }))
                }
            };

            let Some(line) = block.lines.get(self.cursor.line) else {
                return self.finish_block(block, host);
            };

            match line {
                Line::Spoken { speaker, content } => {
                    let narrator = self.config.is_narrator(speaker);
                    host.show_line(speaker, content, narrator);
                    self.cursor.line += 1;
                    if self.cursor.line >= block.len() {
                        return self.finish_block(block, host);
                    }
                    return Ok(());
                }
                Line::Command { name, argument } => {
                    let command = self.resolve_command(name, argument)?;
                    self.cursor.line += 1;
                    self.dispatch(&command, host);
                    if command.kind().is_suspending() {
                        return Ok(());
                    }
                }
            }
        }
    }

    fn resolve_command(&self, name: &str, argument: &str) -> Result<Command, EngineError> {
        let Cursor { block, line } = self.cursor;
        self.commands
            .resolve(name, argument)
            .map_err(|source| {
                tracing::warn!(block, line, error = %source, "command not executed");
                match source {
                    CommandError::Unknown(name) => EngineError::UnknownCommand { block, line, name },
                    source => EngineError::InvalidArgument {
                        block,
                        line,
                        source,
                    },
                }
            })
    }

    fn dispatch<H: Host>(&mut self, command: &Command, host: &mut H) {
        tracing::debug!(?command, block = self.cursor.block, "dispatching command");
        match command {
            Command::ChangeBackground(name) => host.set_background(name),
            Command::PlaySound(name) => host.play_effect(name),
            Command::PlayMusic(name) => host.play_music(name.as_deref()),
            Command::SetImages(spec) => host.set_images(spec),
            Command::FadeIn => host.fade_in(),
            Command::FadeOut => host.fade_out(),
            Command::Blackout => host.blackout(),
            Command::ClearOut => host.clear_out(),
            Command::HideHud => host.set_hud_visible(false),
            Command::ShowHud => host.set_hud_visible(true),
            Command::Wait(units) => self.suspend(*units, host),
        }
    }

    fn suspend<H: Host>(&mut self, units: u64, host: &mut H) {
        self.timer_sequence += 1;
        let token = TimerToken {
            session: self.session,
            sequence: self.timer_sequence,
        };
        tracing::debug!(units, ?token, "waiting on timer");
        self.pending_timer = Some(token);
        self.state = EngineState::AwaitingTimer;
        host.schedule(units, token);
    }

    fn cancel_timer<H: Host>(&mut self, host: &mut H) {
        if let Some(token) = self.pending_timer.take() {
            host.cancel(token);
        }
    }

    /// Resolve the branch of an exhausted block.
    fn finish_block<H: Host>(&mut self, block: &Block, host: &mut H) -> Result<(), EngineError> {
        let index = self.cursor.block;
        let spec = resolve(&block.branch_spec).map_err(|source| {
            self.halt(EngineError::Branch {
                block: index,
                source,
            })
        })?;

        match spec {
            BranchSpec::Empty => {
                tracing::debug!(block = index, "dialogue idle");
                self.state = EngineState::Idle;
            }
            BranchSpec::DirectJump(target) => {
                tracing::debug!(block = index, ?target, "direct jump");
                self.jump(target, host)?;
            }
            BranchSpec::Menu(options) => {
                for option in &options {
                    if let JumpTarget::Block(target) = option.target {
                        self.check_target(target)?;
                    }
                }
                let narrator_context = block
                    .last_speaker()
                    .map_or(false, |speaker| self.config.is_narrator(speaker));
                let prompt = MenuPrompt {
                    choices: options
                        .iter()
                        .enumerate()
                        .map(|(slot, option)| MenuChoice {
                            label: option.label.clone(),
                            slot,
                        })
                        .collect(),
                    narrator_context,
                };
                tracing::debug!(block = index, options = options.len(), "presenting menu");
                host.show_menu(&prompt);
                self.menu = options;
                self.state = EngineState::AwaitingChoice;
            }
        }
        Ok(())
    }

    fn jump<H: Host>(&mut self, target: JumpTarget, host: &mut H) -> Result<(), EngineError> {
        match target {
            JumpTarget::ExitToMenu => {
                tracing::debug!(block = self.cursor.block, "exiting to menu");
                self.cancel_timer(host);
                self.state = EngineState::Exiting;
                host.exit_to_menu();
            }
            JumpTarget::Block(index) => {
                self.check_target(index)?;
                self.cursor = Cursor {
                    block: index,
                    line: 0,
                };
                self.state = EngineState::Presenting;
            }
        }
        Ok(())
    }

    fn check_target(&mut self, target: usize) -> Result<(), EngineError> {
        if target < self.program.len() {
            return Ok(());
        }
        Err(self.halt(EngineError::InvalidTarget {
            block: self.cursor.block,
            target,
            blocks: self.program.len(),
        }))
    }

    fn halt(&mut self, error: EngineError) -> EngineError {
        tracing::error!(%error, block = self.cursor.block, "fatal script error");
        self.state = EngineState::Halted;
        self.menu.clear();
        error
    }
}

/// Builder for constructing an [`Engine`] from files or in-memory data.
pub struct EngineBuilder {
    script_path: Option<String>,
    script_text: Option<String>,
    program_path: Option<String>,
    program: Option<Arc<Program>>,
    config_path: Option<String>,
    config: Option<EngineConfig>,
}

impl EngineBuilder {
    /// Read and parse the script at `path`.
    pub fn script_file(mut self, path: &str) -> Self {
        self.script_path = Some(path.to_string());
        self
    }

    /// Parse `text` as the script.
    pub fn script_text(mut self, text: &str) -> Self {
        self.script_text = Some(text.to_string());
        self
    }

    /// Load a program compiled to RON by `script_compiler`.
    pub fn program_file(mut self, path: &str) -> Self {
        self.program_path = Some(path.to_string());
        self
    }

    /// Use an already parsed program (shared with other sessions).
    pub fn with_program(mut self, program: Arc<Program>) -> Self {
        self.program = Some(program);
        self
    }

    pub fn config_file(mut self, path: &str) -> Self {
        self.config_path = Some(path.to_string());
        self
    }

    /// Provide the config directly (for testing without files).
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Build the engine. The first program source set wins, in the order:
    /// in-memory program, script text, script file, compiled program file.
    pub fn build(self) -> Result<Engine, LoadError> {
        let config = match (self.config, self.config_path) {
            (Some(config), _) => config,
            (None, Some(path)) => EngineConfig::load_from_ron(Path::new(&path))?,
            (None, None) => EngineConfig::default(),
        };

        let program = if let Some(program) = self.program {
            program
        } else if let Some(text) = self.script_text {
            Arc::new(parse_script_with(&text, config.parse_options())?)
        } else if let Some(path) = self.script_path {
            let text = std::fs::read_to_string(&path)?;
            Arc::new(parse_script_with(&text, config.parse_options())?)
        } else if let Some(path) = self.program_path {
            Arc::new(Program::load_from_ron(Path::new(&path))?)
        } else {
            return Err(LoadError::NoScript);
        };

        let commands = CommandTable::with_aliases(&config.command_aliases)?;
        tracing::debug!(blocks = program.len(), "engine built");
        Ok(Engine::from_parts(program, config, commands))
    }
}
