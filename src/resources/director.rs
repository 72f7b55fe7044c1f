//! The authoritative tick loop.
//!
//! A [`GameDirector`] owns one [`Battlefield`] and the tick [`Schedule`]
//! that runs over its world, the inbound command and node-add queues, the
//! outgoing [`DirectorEvent`] channel and an optional render callback. Run it
//! in place with [`GameDirector::start`] (blocks until stopped), step it by
//! hand with [`GameDirector::tick`], or move it onto a dedicated thread with
//! [`GameDirector::spawn`]:
//!
//! ```no_run
//! use botforge::resources::battlefield::Battlefield;
//! use botforge::resources::director::GameDirector;
//! use botforge::resources::gameconfig::GameConfig;
//!
//! let config = GameConfig::new();
//! let director = GameDirector::new(Battlefield::from_config("arena", &config), &config);
//! let handle = director.spawn().unwrap();
//! handle.stop();
//! let director = handle.join().unwrap();
//! assert!(!director.is_running());
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use bevy_ecs::schedule::Schedule;
use crossbeam_channel::{Receiver, Sender, bounded, unbounded};
use log::{info, warn};

use crate::components::action::FrameContext;
use crate::components::node::{NodeId, NodeRef};
use crate::error::{EngineError, Result};
use crate::events::command::Command;
use crate::events::director::DirectorEvent;
use crate::resources::battlefield::Battlefield;
use crate::resources::gameconfig::GameConfig;
use crate::resources::queues::{
    CommandInbox, CommandQueue, EventOutbox, NodeInbox, NodeQueue, PendingNode, StopHandle,
};
use crate::systems::tick::tick_schedule;

pub use crate::systems::tick::TickSummary;

/// Events beyond this backlog are dropped until someone drains the channel.
pub const EVENT_BACKLOG: usize = 4096;

type RenderFn = Box<dyn FnMut(&NodeSnapshot<'_>, Duration) + Send>;

/// Read-only view of the live nodes, valid for one render call.
#[derive(Clone, Copy)]
pub struct NodeSnapshot<'a> {
    field: &'a Battlefield,
}

impl<'a> NodeSnapshot<'a> {
    pub fn new(field: &'a Battlefield) -> Self {
        Self { field }
    }

    /// Live nodes in update order.
    pub fn iter(self) -> impl Iterator<Item = NodeRef<'a>> {
        self.field.nodes()
    }

    pub fn get(&self, id: NodeId) -> Option<NodeRef<'a>> {
        self.field.get(id)
    }

    pub fn roots(self) -> impl Iterator<Item = NodeRef<'a>> {
        self.field.roots()
    }

    pub fn children_of(self, id: NodeId) -> impl Iterator<Item = NodeRef<'a>> {
        self.field.children_of(id)
    }

    pub fn len(&self) -> usize {
        self.field.len()
    }

    pub fn is_empty(&self) -> bool {
        self.field.is_empty()
    }

    pub fn field(&self) -> &'a Battlefield {
        self.field
    }
}

pub struct GameDirector {
    field: Battlefield,
    schedule: Schedule,
    cmd_tx: Sender<Command>,
    node_tx: Sender<PendingNode>,
    event_rx: Receiver<DirectorEvent>,
    outbox: EventOutbox,
    stop: StopHandle,
    running: Arc<AtomicBool>,
    render: Option<RenderFn>,
    tick_interval: Duration,
    last_tick: Option<Instant>,
    frame: u64,
}

impl GameDirector {
    pub fn new(mut field: Battlefield, config: &GameConfig) -> Self {
        let (cmd_tx, cmd_rx) = unbounded();
        let (node_tx, node_rx) = unbounded();
        let (event_tx, event_rx) = bounded(EVENT_BACKLOG);
        let outbox = EventOutbox { tx: event_tx };

        let world = field.world_mut();
        world.insert_resource(CommandInbox { rx: cmd_rx });
        world.insert_resource(NodeInbox {
            rx: node_rx,
            queue: NodeQueue::new(node_tx.clone()),
        });
        world.insert_resource(outbox.clone());

        Self {
            field,
            schedule: tick_schedule(),
            cmd_tx,
            node_tx,
            event_rx,
            outbox,
            stop: StopHandle::default(),
            running: Arc::new(AtomicBool::new(false)),
            render: None,
            tick_interval: config.tick_interval(),
            last_tick: None,
            frame: 0,
        }
    }

    pub fn command_queue(&self) -> CommandQueue {
        CommandQueue::new(self.cmd_tx.clone())
    }

    pub fn node_queue(&self) -> NodeQueue {
        NodeQueue::new(self.node_tx.clone())
    }

    /// Enqueue a command for the next tick.
    pub fn command(&self, cmd: Command) -> bool {
        self.command_queue().command(cmd)
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Request the loop to stop at the next tick boundary.
    pub fn stop(&self) {
        self.stop.stop();
    }

    /// Receiver for director notifications. Clones share the same stream.
    pub fn events(&self) -> Receiver<DirectorEvent> {
        self.event_rx.clone()
    }

    pub fn nodes(&self) -> NodeSnapshot<'_> {
        NodeSnapshot::new(&self.field)
    }

    pub fn field(&self) -> &Battlefield {
        &self.field
    }

    /// Number of ticks run so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Install the per-tick render callback, replacing any previous one.
    pub fn set_render<F>(&mut self, render: F)
    where
        F: FnMut(&NodeSnapshot<'_>, Duration) + Send + 'static,
    {
        self.render = Some(Box::new(render));
    }

    pub fn clear_render(&mut self) {
        self.render = None;
    }

    /// Run exactly one tick: commands, node insertion, updates, despawns,
    /// transforms, then render.
    pub fn tick(&mut self) -> TickSummary {
        let now = Instant::now();
        let lag = self.last_tick.map_or(Duration::ZERO, |last| now - last);
        self.last_tick = Some(now);
        self.frame += 1;

        let world = self.field.world_mut();
        world.insert_resource(FrameContext::new(self.frame, lag));
        world.insert_resource(TickSummary {
            frame: self.frame,
            ..TickSummary::default()
        });
        self.schedule.run(world);
        let summary = world
            .get_resource::<TickSummary>()
            .copied()
            .unwrap_or_default();

        if let Some(render) = self.render.as_mut() {
            render(&NodeSnapshot::new(&self.field), lag);
        }
        summary
    }

    /// Tick at the configured rate until a stop is requested.
    ///
    /// Returns immediately if the loop is already running. A stop requested
    /// before the call ends the loop before its first tick.
    pub fn start(&mut self) {
        if self.running.swap(true, Ordering::AcqRel) {
            warn!("director for '{}' is already running", self.field.name);
            return;
        }
        info!(
            "director started on '{}' ({:?} per tick)",
            self.field.name, self.tick_interval
        );
        self.outbox.send(DirectorEvent::Started);

        let first_frame = self.frame;
        while !self.stop.is_stopped() {
            let started = Instant::now();
            self.tick();
            if let Some(rest) = self.tick_interval.checked_sub(started.elapsed()) {
                thread::sleep(rest);
            }
        }

        let frames = self.frame - first_frame;
        self.stop.reset();
        self.running.store(false, Ordering::Release);
        self.outbox.send(DirectorEvent::Stopped { frames });
        info!("director stopped on '{}' after {} frame(s)", self.field.name, frames);
    }

    /// Move the director onto its own thread and start it there.
    pub fn spawn(self) -> Result<DirectorHandle> {
        let commands = self.command_queue();
        let nodes = self.node_queue();
        let stop = self.stop_handle();
        let events = self.events();
        let running = Arc::clone(&self.running);

        let mut director = self;
        let thread = thread::Builder::new()
            .name(format!("director-{}", director.field.name))
            .spawn(move || {
                director.start();
                director
            })?;

        Ok(DirectorHandle {
            commands,
            nodes,
            stop,
            events,
            running,
            thread,
        })
    }
}

/// Handle to a director running on its own thread.
pub struct DirectorHandle {
    commands: CommandQueue,
    nodes: NodeQueue,
    stop: StopHandle,
    events: Receiver<DirectorEvent>,
    running: Arc<AtomicBool>,
    thread: JoinHandle<GameDirector>,
}

impl DirectorHandle {
    pub fn command_queue(&self) -> CommandQueue {
        self.commands.clone()
    }

    pub fn node_queue(&self) -> NodeQueue {
        self.nodes.clone()
    }

    pub fn command(&self, cmd: Command) -> bool {
        self.commands.command(cmd)
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn stop(&self) {
        self.stop.stop();
    }

    pub fn events(&self) -> &Receiver<DirectorEvent> {
        &self.events
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// True once the director thread has returned, stopped or panicked.
    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Wait for the loop to exit and take the director back.
    pub fn join(self) -> Result<GameDirector> {
        self.thread.join().map_err(|_| EngineError::DirectorPanicked)
    }
}
