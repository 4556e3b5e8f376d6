//! Run-state machine and fixed-timestep frame loop.
//!
//! Two states, Stopped and Running, one legal transition each way. While
//! Running, the per-frame callback drains the clock's accumulator into update
//! steps, draws exactly once, and clears edge-triggered input. Every user call
//! is independently guarded: a failing update aborts that one call and nothing
//! else — not the remaining catch-up iterations, not the draw, not the loop.

use crate::clock::RunnerClock;
use crate::console::Console;
use crate::error::SketchResult;
use crate::input::InputState;
use crate::program::{Program, ProgramBuilder, Sources};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Frames between FPS status refreshes.
const STATUS_REFRESH_FRAMES: u32 = 10;

pub struct Runner {
    clock: RunnerClock,
    program: Option<Box<dyn Program>>,
    running: bool,
    console: Rc<RefCell<Console>>,
    frames_since_status: u32,
    fps: Option<f64>,
}

impl Runner {
    /// `frame_interval` is fixed for the runner's lifetime; the clock resets
    /// to zero on stop but the interval never changes while Running.
    pub fn new(frame_interval: Duration, console: Rc<RefCell<Console>>) -> Self {
        Self {
            clock: RunnerClock::new(frame_interval),
            program: None,
            running: false,
            console,
            frames_since_status: 0,
            fps: None,
        }
    }

    /// Runner with the default 50 Hz interval.
    pub fn with_default_interval(console: Rc<RefCell<Console>>) -> Self {
        Self::new(RunnerClock::DEFAULT_INTERVAL, console)
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn frame_interval(&self) -> Duration {
        self.clock.frame_interval()
    }

    /// Transient FPS estimate; `None` while Stopped.
    pub fn fps(&self) -> Option<f64> {
        self.fps
    }

    pub fn console(&self) -> Rc<RefCell<Console>> {
        Rc::clone(&self.console)
    }

    /// Builds the sources and transitions to Running.
    ///
    /// No-op when already Running. On a build failure the compile error is
    /// reported and the runner stays Stopped. When both update and draw
    /// sources are empty the build still happens once (start code may print),
    /// then the runner drops straight back to Stopped — nothing to run is not
    /// an error.
    pub fn start(
        &mut self,
        builder: &dyn ProgramBuilder,
        sources: &Sources,
        now: Instant,
    ) -> SketchResult<()> {
        if self.running {
            return Ok(());
        }
        self.console.borrow_mut().clear();

        let program = match builder.build(sources) {
            Ok(program) => program,
            Err(err) => {
                self.console.borrow_mut().report(err.clone());
                return Err(err);
            }
        };
        self.program = Some(program);

        if !sources.is_runnable() {
            self.stop(true);
            return Ok(());
        }

        self.running = true;
        self.clock.begin(now);
        Ok(())
    }

    /// Per-frame callback. Returns `true` while the runner remains Running,
    /// i.e. whether the caller should schedule the next frame.
    pub fn frame(
        &mut self,
        now: Instant,
        width: u32,
        height: u32,
        input: &mut InputState,
    ) -> bool {
        if !self.running {
            return false;
        }

        let tick = self.clock.tick(now);
        let delta_time = self.clock.delta_seconds();

        if let Some(program) = self.program.as_mut() {
            for _ in 0..tick.steps {
                if let Err(err) = program.update(delta_time, width, height, input) {
                    self.console.borrow_mut().report(err);
                }
            }
            if let Err(err) = program.draw(width, height) {
                self.console.borrow_mut().report(err);
            }
        }

        input.end_frame();
        self.refresh_status(tick.elapsed);
        self.running
    }

    /// Stops the runner: discards the compiled program, zeroes the clock and
    /// drops transient status. The console's error status is deliberately
    /// left alone — it resets only on explicit clear or the next start.
    pub fn stop(&mut self, force: bool) {
        if !self.running && !force {
            return;
        }
        self.running = false;
        self.program = None;
        self.clock.reset();
        self.frames_since_status = 0;
        self.fps = None;
    }

    fn refresh_status(&mut self, elapsed: Duration) {
        self.frames_since_status += 1;
        if self.frames_since_status >= STATUS_REFRESH_FRAMES {
            self.frames_since_status = 0;
            let secs = elapsed.as_secs_f64();
            if secs > 0.0 {
                self.fps = Some(1.0 / secs);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, SketchError};
    use std::time::Duration;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    /// Counts calls; optionally fails update on chosen ticks.
    #[derive(Default)]
    struct Counters {
        updates: usize,
        draws: usize,
    }

    struct StubProgram {
        counters: Rc<RefCell<Counters>>,
        fail_updates_on: Vec<usize>,
    }

    impl Program for StubProgram {
        fn update(&mut self, _dt: f64, _w: u32, _h: u32, _input: &InputState) -> SketchResult<()> {
            let mut c = self.counters.borrow_mut();
            c.updates += 1;
            if self.fail_updates_on.contains(&c.updates) {
                return Err(SketchError::runtime(format!("tick {} failed", c.updates)));
            }
            Ok(())
        }

        fn draw(&mut self, _w: u32, _h: u32) -> SketchResult<()> {
            self.counters.borrow_mut().draws += 1;
            Ok(())
        }
    }

    struct StubBuilder {
        counters: Rc<RefCell<Counters>>,
        builds: Rc<RefCell<usize>>,
        fail_updates_on: Vec<usize>,
    }

    impl StubBuilder {
        fn new() -> Self {
            Self {
                counters: Rc::new(RefCell::new(Counters::default())),
                builds: Rc::new(RefCell::new(0)),
                fail_updates_on: Vec::new(),
            }
        }
    }

    impl ProgramBuilder for StubBuilder {
        fn build(&self, _sources: &Sources) -> SketchResult<Box<dyn Program>> {
            *self.builds.borrow_mut() += 1;
            Ok(Box::new(StubProgram {
                counters: Rc::clone(&self.counters),
                fail_updates_on: self.fail_updates_on.clone(),
            }))
        }
    }

    struct FailingBuilder;

    impl ProgramBuilder for FailingBuilder {
        fn build(&self, _sources: &Sources) -> SketchResult<Box<dyn Program>> {
            Err(SketchError::compile("unexpected symbol"))
        }
    }

    fn runnable_sources() -> Sources {
        Sources::new("", "x = 1", "y = 2")
    }

    fn runner() -> Runner {
        Runner::new(ms(20), Rc::new(RefCell::new(Console::new())))
    }

    #[test]
    fn test_catch_up_two_updates_one_draw() {
        let builder = StubBuilder::new();
        let mut runner = runner();
        let mut input = InputState::new();
        let t0 = Instant::now();

        runner.start(&builder, &runnable_sources(), t0).unwrap();
        assert!(runner.frame(t0 + ms(55), 64, 64, &mut input));

        let counters = builder.counters.borrow();
        assert_eq!(counters.updates, 2);
        assert_eq!(counters.draws, 1);
    }

    #[test]
    fn test_update_error_does_not_stop_loop() {
        let mut builder = StubBuilder::new();
        builder.fail_updates_on = vec![1];
        let mut runner = runner();
        let mut input = InputState::new();
        let t0 = Instant::now();

        runner.start(&builder, &runnable_sources(), t0).unwrap();
        // 55 ms owes two updates; the first fails, the second still runs,
        // and so does the draw.
        assert!(runner.frame(t0 + ms(55), 64, 64, &mut input));
        {
            let counters = builder.counters.borrow();
            assert_eq!(counters.updates, 2);
            assert_eq!(counters.draws, 1);
        }
        // Next frame keeps updating as if nothing happened.
        assert!(runner.frame(t0 + ms(75), 64, 64, &mut input));
        assert_eq!(builder.counters.borrow().updates, 3);

        let console = runner.console();
        let console = console.borrow();
        assert_eq!(console.status().unwrap().kind, ErrorKind::Runtime);
    }

    #[test]
    fn test_build_failure_stays_stopped() {
        let mut runner = runner();
        let err = runner
            .start(&FailingBuilder, &runnable_sources(), Instant::now())
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Compile);
        assert!(!runner.is_running());
        assert_eq!(
            runner.console().borrow().status().unwrap().kind,
            ErrorKind::Compile
        );
    }

    #[test]
    fn test_empty_sources_auto_stop() {
        let builder = StubBuilder::new();
        let mut runner = runner();
        let mut input = InputState::new();

        runner
            .start(&builder, &Sources::new("x = 1", "", ""), Instant::now())
            .unwrap();
        // One build attempt happened, but the runner went straight back to
        // Stopped and schedules no frames.
        assert_eq!(*builder.builds.borrow(), 1);
        assert!(!runner.is_running());
        assert!(!runner.frame(Instant::now(), 64, 64, &mut input));
        assert_eq!(builder.counters.borrow().draws, 0);
    }

    #[test]
    fn test_start_while_running_is_noop() {
        let builder = StubBuilder::new();
        let mut runner = runner();
        let t0 = Instant::now();

        runner.start(&builder, &runnable_sources(), t0).unwrap();
        runner.start(&builder, &runnable_sources(), t0).unwrap();
        assert_eq!(*builder.builds.borrow(), 1);
    }

    #[test]
    fn test_stop_discards_program_and_clock() {
        let builder = StubBuilder::new();
        let mut runner = runner();
        let mut input = InputState::new();
        let t0 = Instant::now();

        runner.start(&builder, &runnable_sources(), t0).unwrap();
        runner.frame(t0 + ms(15), 64, 64, &mut input); // 15 ms banked
        runner.stop(false);
        assert!(!runner.is_running());
        assert!(runner.fps().is_none());

        // Restart: the banked 15 ms must be gone, so a 10 ms frame owes
        // nothing even though 15 + 10 > 20.
        runner.start(&builder, &runnable_sources(), t0 + ms(100)).unwrap();
        runner.frame(t0 + ms(110), 64, 64, &mut input);
        assert_eq!(builder.counters.borrow().updates, 0);
    }

    #[test]
    fn test_stop_when_stopped_is_noop_unless_forced() {
        let mut runner = runner();
        runner.stop(false);
        runner.stop(true);
        assert!(!runner.is_running());
    }

    #[test]
    fn test_frame_clears_edge_input() {
        let builder = StubBuilder::new();
        let mut runner = runner();
        let mut input = InputState::new();
        let t0 = Instant::now();

        runner.start(&builder, &runnable_sources(), t0).unwrap();
        input.key_down(32);
        input.key_up(32);
        input.pointer_up();
        runner.frame(t0 + ms(20), 64, 64, &mut input);
        assert!(!input.released(32));
        assert!(!input.pointer.released);
    }

    #[test]
    fn test_start_clears_previous_console_status() {
        let mut builder = StubBuilder::new();
        builder.fail_updates_on = vec![1];
        let mut runner = runner();
        let mut input = InputState::new();
        let t0 = Instant::now();

        runner.start(&builder, &runnable_sources(), t0).unwrap();
        runner.frame(t0 + ms(20), 64, 64, &mut input);
        runner.stop(false);
        // Error status survives the stop...
        assert!(runner.console().borrow().status().is_some());

        // ...and resets on the next start.
        runner.start(&builder, &runnable_sources(), t0 + ms(50)).unwrap();
        assert!(runner.console().borrow().status().is_none());
    }
}
