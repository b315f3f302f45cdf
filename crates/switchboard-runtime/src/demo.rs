// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A small frame loop wired through a switchboard.

use std::cell::Cell;

use switchboard_core::prelude::*;

/// One simulation step.
#[derive(Debug, Clone, Message)]
#[message(first(Input), last(Audit))]
pub struct Tick {
    pub frame: u64,
    pub dt_ms: u32,
}

/// Two bodies touched during a physics step.
#[derive(Debug, Clone, Message)]
#[message(first(Audio), last(Audit))]
pub struct Collision {
    pub frame: u64,
    pub bodies: (u32, u32),
}

/// A frame reached the screen.
#[derive(Debug, Clone, Message)]
#[message(last(Audit))]
pub struct Rendered {
    pub frame: u64,
    pub draw_calls: u32,
}

/// Asks the loop to stop.
#[derive(Debug, Clone, Message)]
pub struct Shutdown {
    pub reason: &'static str,
}

#[derive(Debug, Default, Module)]
#[module(handles(Tick))]
pub struct Input {
    polled: Cell<u64>,
}

impl Handler<Tick> for Input {
    fn process(&self, tick: &mut Tick) {
        self.polled.set(self.polled.get() + 1);
        log::debug!("Input polled for frame {}", tick.frame);
    }
}

#[derive(Debug, Default, Module)]
#[module(handles(Tick))]
pub struct Physics {
    #[emitter]
    out: Emitter,
    steps: Cell<u64>,
}

impl Handler<Tick> for Physics {
    fn process(&self, tick: &mut Tick) {
        self.steps.set(self.steps.get() + 1);
        log::trace!("Physics step of {} ms on frame {}", tick.dt_ms, tick.frame);
        if tick.frame % 3 == 2 {
            let collision = Collision {
                frame: tick.frame,
                bodies: (1, (tick.frame % 7) as u32 + 2),
            };
            if let Err(err) = self.out.emit(collision) {
                log::warn!("Physics could not report a collision: {err}");
            }
        }
    }
}

#[derive(Debug, Default, Module)]
#[module(handles(Tick))]
pub struct Renderer {
    #[emitter]
    out: CallbackEmitter<(Rendered,)>,
    frames: Cell<u64>,
}

impl Handler<Tick> for Renderer {
    fn process(&self, tick: &mut Tick) {
        self.frames.set(self.frames.get() + 1);
        let rendered = Rendered {
            frame: tick.frame,
            draw_calls: 12 + (tick.frame % 4) as u32,
        };
        if let Err(err) = self.out.emit(rendered) {
            log::warn!("Renderer could not publish frame {}: {err}", tick.frame);
        }
    }
}

#[derive(Debug, Default, Module)]
#[module(handles(Collision))]
pub struct Audio {
    played: Cell<u32>,
}

impl Handler<Collision> for Audio {
    fn process(&self, collision: &mut Collision) {
        self.played.set(self.played.get() + 1);
        log::info!(
            "Audio: impact between bodies {:?} on frame {}",
            collision.bodies,
            collision.frame
        );
    }
}

/// Stops the loop once enough frames were rendered.
///
/// Built through a deferred builder so it can keep the manager handle from
/// its constructor.
#[derive(Debug, Module)]
#[module(handles(Rendered))]
pub struct Director {
    manager: ManagerHandle,
    target: u64,
    stopped: Cell<bool>,
}

impl Director {
    pub fn new(manager: &ManagerHandle, target: u64) -> Self {
        Self {
            manager: manager.clone(),
            target,
            stopped: Cell::new(false),
        }
    }

    pub fn stopped(&self) -> bool {
        self.stopped.get()
    }
}

impl Handler<Rendered> for Director {
    fn process(&self, rendered: &mut Rendered) {
        log::debug!(
            "Frame {} rendered with {} draw call(s)",
            rendered.frame,
            rendered.draw_calls
        );
        if self.stopped.get() || rendered.frame + 1 < self.target {
            return;
        }
        self.stopped.set(true);
        if let Err(err) = self.manager.process(Shutdown {
            reason: "frame budget reached",
        }) {
            log::error!("Director could not request shutdown: {err}");
        }
    }
}

/// Observes every message.
#[derive(Debug, Default, Module)]
#[module(any)]
pub struct Audit {
    seen: Cell<u64>,
}

impl AnyHandler for Audit {
    fn process_any(&self, envelope: &mut Envelope<'_>) {
        self.seen.set(self.seen.get() + 1);
        if let Some(shutdown) = envelope.downcast_ref::<Shutdown>() {
            log::info!("Audit: shutdown requested ({})", shutdown.reason);
        } else {
            log::trace!("Audit: {}", envelope.kind().name());
        }
    }
}

impl Audit {
    pub fn seen(&self) -> u64 {
        self.seen.get()
    }
}

pub type Game = Manager<(Audit, Renderer, Physics, Audio, Input, Director)>;

/// Composes the demo switchboard.
pub fn compose(config: ManagerConfig, frames: u64) -> Game {
    Manager::build_with_config(
        (
            ModuleBuilder::ready(Audit::default()),
            ModuleBuilder::ready(Renderer::default()),
            ModuleBuilder::ready(Physics::default()),
            ModuleBuilder::ready(Audio::default()),
            ModuleBuilder::ready(Input::default()),
            ModuleBuilder::deferred(move |handle| Director::new(handle, frames)),
        ),
        config,
    )
}

/// Runs frames until the director stops the loop or `frames` ticks were sent.
pub fn run(game: &Game, frames: u64) -> u64 {
    let (audit, .., director) = game.modules();
    let mut frame = 0;
    while frame < frames && !director.stopped() {
        game.process(Tick { frame, dt_ms: 16 });
        frame += 1;
    }
    log::info!(
        "Ran {frame} frame(s); audit saw {} message(s)",
        audit.seen()
    );
    frame
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_order_puts_input_first_and_audit_last() {
        let game = compose(ManagerConfig::default(), 4);
        // Input is slot 4, Audit slot 0.
        assert_eq!(game.dispatch_order::<Tick>(), vec![4, 1, 2, 0]);
        assert_eq!(game.dispatch_order::<Collision>(), vec![3, 0]);
    }

    #[test]
    fn test_director_stops_the_loop() {
        let game = compose(ManagerConfig::default(), 5);

        let frames = run(&game, 100);

        assert_eq!(frames, 5);
        let (audit, renderer, physics, audio, input, director) = game.modules();
        assert!(director.stopped());
        assert_eq!(renderer.frames.get(), 5);
        assert_eq!(input.polled.get(), 5);
        assert_eq!(physics.steps.get(), 5);
        // Only frame 2 collides.
        assert_eq!(audio.played.get(), 1);
        // 5 ticks, 5 rendered, 1 collision, 1 shutdown.
        assert_eq!(audit.seen(), 12);
    }
}
