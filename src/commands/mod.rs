use crate::common::errors::CommandError;
use crate::common::types::{ChannelId, GuildId, UserId};
use crate::session::actor::PauseToggle;
use crate::session::registry::SessionRegistry;
use crate::session::state::{QueueSnapshot, SessionOrigin};
use crate::sources::importer::PlaylistImporter;
use crate::track::LoopMode;

/// A parsed text command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotCommand {
    Play(String),
    Pause,
    Resume,
    Join,
    Leave,
    Skip,
    SkipTo(usize),
    Stop,
    Queue,
    Loop,
    LoopQueue,
    NoLoop,
}

impl BotCommand {
    /// Parse a prefixed message. Returns `None` for anything that is not a
    /// well-formed command of ours.
    pub fn parse(prefix: &str, content: &str) -> Option<Self> {
        let rest = content.strip_prefix(prefix)?.trim_start();
        let (name, args) = match rest.split_once(char::is_whitespace) {
            Some((name, args)) => (name, args.trim()),
            None => (rest, ""),
        };

        match name.to_lowercase().as_str() {
            "play" | "p" if !args.is_empty() => Some(Self::Play(args.to_string())),
            "pause" => Some(Self::Pause),
            "resume" => Some(Self::Resume),
            "join" | "j" => Some(Self::Join),
            "leave" | "lv" => Some(Self::Leave),
            "skip" | "s" => Some(Self::Skip),
            "skipto" | "st" => args.split_whitespace().next()?.parse().ok().map(Self::SkipTo),
            "stop" => Some(Self::Stop),
            "queue" | "q" => Some(Self::Queue),
            "loop" | "l" => Some(Self::Loop),
            "loopqueue" | "lq" => Some(Self::LoopQueue),
            "noloop" => Some(Self::NoLoop),
            _ => None,
        }
    }
}

/// Panel button, identified by its stable custom id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlAction {
    PauseResume,
    Skip,
    Loop,
    Stop,
    Queue,
}

impl ControlAction {
    pub const fn custom_id(self) -> &'static str {
        match self {
            Self::PauseResume => "music:pause_resume",
            Self::Skip => "music:skip",
            Self::Loop => "music:loop",
            Self::Stop => "music:stop",
            Self::Queue => "music:queue",
        }
    }

    pub fn from_custom_id(id: &str) -> Option<Self> {
        match id {
            "music:pause_resume" => Some(Self::PauseResume),
            "music:skip" => Some(Self::Skip),
            "music:loop" => Some(Self::Loop),
            "music:stop" => Some(Self::Stop),
            "music:queue" => Some(Self::Queue),
            _ => None,
        }
    }
}

/// Who invoked a command, and where.
#[derive(Debug, Clone, Copy)]
pub struct CommandContext {
    pub guild_id: GuildId,
    pub channel: ChannelId,
    pub user: UserId,
}

impl CommandContext {
    fn origin(&self) -> SessionOrigin {
        SessionOrigin {
            channel: self.channel,
            requester: self.user,
        }
    }
}

/// What the embedder should report back to the invoker.
#[derive(Debug)]
pub enum CommandOutcome {
    Added(usize),
    Skipped,
    Jumped(usize),
    Stopped,
    Toggled(PauseToggle),
    Loop(LoopMode),
    Queue(QueueSnapshot),
    /// `join`: the embedder connects the voice transport itself.
    ConnectRequested,
}

/// Route one text command to its session transition. Voice-channel
/// co-presence was already checked by the embedder.
pub async fn dispatch(
    registry: &SessionRegistry,
    importer: &PlaylistImporter,
    ctx: &CommandContext,
    command: BotCommand,
) -> Result<CommandOutcome, CommandError> {
    let session = registry.get_or_create(ctx.guild_id);
    let origin = ctx.origin();

    match command {
        BotCommand::Play(query) => {
            let tracks = importer.import(&query, ctx.user).await?;
            let added = session.enqueue(tracks, origin).await?;
            Ok(CommandOutcome::Added(added))
        }
        BotCommand::Pause | BotCommand::Resume => {
            Ok(CommandOutcome::Toggled(session.pause_resume(origin).await?))
        }
        BotCommand::Join => Ok(CommandOutcome::ConnectRequested),
        BotCommand::Leave | BotCommand::Stop => {
            session.stop(origin).await?;
            Ok(CommandOutcome::Stopped)
        }
        BotCommand::Skip => {
            session.skip(origin).await?;
            Ok(CommandOutcome::Skipped)
        }
        BotCommand::SkipTo(position) => {
            session.skip_to(position, origin).await?;
            Ok(CommandOutcome::Jumped(position))
        }
        BotCommand::Queue => {
            let snapshot = session.queue(origin).await?;
            if snapshot.tracks.is_empty() {
                Err(CommandError::EmptyQueue)
            } else {
                Ok(CommandOutcome::Queue(snapshot))
            }
        }
        BotCommand::Loop => Ok(CommandOutcome::Loop(
            session.set_loop(LoopMode::Single, origin).await?,
        )),
        BotCommand::LoopQueue => Ok(CommandOutcome::Loop(
            session.set_loop(LoopMode::Queue, origin).await?,
        )),
        BotCommand::NoLoop => Ok(CommandOutcome::Loop(
            session.set_loop(LoopMode::None, origin).await?,
        )),
    }
}

/// Route one panel-button press. Buttons only exist on a live panel, so a
/// missing session means the panel is stale.
pub async fn dispatch_control(
    registry: &SessionRegistry,
    ctx: &CommandContext,
    action: ControlAction,
) -> Result<CommandOutcome, CommandError> {
    let Some(session) = registry.get(&ctx.guild_id) else {
        return Err(CommandError::SessionClosed);
    };
    let origin = ctx.origin();

    match action {
        ControlAction::PauseResume => {
            Ok(CommandOutcome::Toggled(session.pause_resume(origin).await?))
        }
        ControlAction::Skip => {
            session.skip(origin).await?;
            Ok(CommandOutcome::Skipped)
        }
        ControlAction::Loop => Ok(CommandOutcome::Loop(session.cycle_loop(origin).await?)),
        ControlAction::Stop => {
            session.stop(origin).await?;
            Ok(CommandOutcome::Stopped)
        }
        ControlAction::Queue => {
            let snapshot = session.queue(origin).await?;
            if snapshot.tracks.is_empty() {
                Err(CommandError::EmptyQueue)
            } else {
                Ok(CommandOutcome::Queue(snapshot))
            }
        }
    }
}
