//! Scripted scenarios: ordered steps run against a fresh compositor.
//!
//! A [`Scenario`] is a named list of [`Step`]s.  Action steps drive the
//! compositor; [`Step::Expect`] steps check its state.  The runner stops at
//! the first failing step and records its index together with what was
//! expected and what was actually observed.
//!
//! Seats, devices, windows and clients are referred to by name, so a
//! scenario reads like the sequence of things an operator would do.

pub mod library;

use std::fmt;

use mpx_core::{ClientId, DeviceId, ErrorKind, GrabMode, Position, Rect, WindowId};
use serde::Serialize;
use tracing::{debug, info};

use crate::compositor::VirtualCompositor;
use crate::error::SimError;
use crate::virtual_device::VirtualDevice;

#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    CreateSeat { name: String },
    DestroySeat { name: String },
    ConnectDevice { device: VirtualDevice, seat: String },
    DisconnectDevice { device: String },
    AssignDevice { device: String, seat: String },
    CreateWindow { id: String, title: String, rect: Rect },
    DestroyWindow { id: String },
    MovePointer { device: String, dx: f64, dy: f64 },
    MovePointerTo { device: String, x: f64, y: f64 },
    Button { device: String, button: u32, pressed: bool },
    Key { device: String, key: u32, pressed: bool },
    Grab { client: String, seat: String, mode: GrabMode },
    Confine { client: String, seat: String, region: Rect },
    Release { seat: String },
    DisconnectClient { client: String },
    Expect(Expectation),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expectation {
    Cursor { seat: String, x: f64, y: f64 },
    Grabbed { seat: String, grabbed: bool },
    PointerFocus { seat: String, window: Option<String> },
    KeyboardFocus { seat: String, window: Option<String> },
    DeviceSeat { device: String, seat: Option<String> },
    DeviceConnected { device: String, connected: bool },
    SeatCount(usize),
    /// The wrapped action must fail with a registry error of this kind.
    Fails { step: Box<Step>, kind: ErrorKind },
}

// Shorthand constructors used by the scenario library and tests.
impl Step {
    pub fn create_seat(name: &str) -> Self {
        Step::CreateSeat { name: name.into() }
    }

    pub fn connect(device: VirtualDevice, seat: &str) -> Self {
        Step::ConnectDevice {
            device,
            seat: seat.into(),
        }
    }

    pub fn window(id: &str, title: &str, x: i32, y: i32, width: u32, height: u32) -> Self {
        Step::CreateWindow {
            id: id.into(),
            title: title.into(),
            rect: Rect::new(x, y, width, height),
        }
    }

    pub fn move_by(device: &str, dx: f64, dy: f64) -> Self {
        Step::MovePointer {
            device: device.into(),
            dx,
            dy,
        }
    }

    pub fn move_to(device: &str, x: f64, y: f64) -> Self {
        Step::MovePointerTo {
            device: device.into(),
            x,
            y,
        }
    }

    pub fn click(device: &str) -> Self {
        Step::Button {
            device: device.into(),
            button: 1,
            pressed: true,
        }
    }

    pub fn grab(client: &str, seat: &str, mode: GrabMode) -> Self {
        Step::Grab {
            client: client.into(),
            seat: seat.into(),
            mode,
        }
    }

    pub fn expect_cursor(seat: &str, x: f64, y: f64) -> Self {
        Step::Expect(Expectation::Cursor {
            seat: seat.into(),
            x,
            y,
        })
    }

    pub fn expect_grabbed(seat: &str, grabbed: bool) -> Self {
        Step::Expect(Expectation::Grabbed {
            seat: seat.into(),
            grabbed,
        })
    }

    pub fn expect_fails(step: Step, kind: ErrorKind) -> Self {
        Step::Expect(Expectation::Fails {
            step: Box::new(step),
            kind,
        })
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::CreateSeat { name } => write!(f, "create seat {name}"),
            Step::DestroySeat { name } => write!(f, "destroy seat {name}"),
            Step::ConnectDevice { device, seat } => write!(f, "connect {} to {seat}", device.id()),
            Step::DisconnectDevice { device } => write!(f, "disconnect {device}"),
            Step::AssignDevice { device, seat } => write!(f, "assign {device} to {seat}"),
            Step::CreateWindow { id, .. } => write!(f, "create window {id}"),
            Step::DestroyWindow { id } => write!(f, "destroy window {id}"),
            Step::MovePointer { device, dx, dy } => write!(f, "move {device} by ({dx}, {dy})"),
            Step::MovePointerTo { device, x, y } => write!(f, "move {device} to ({x}, {y})"),
            Step::Button {
                device,
                button,
                pressed,
            } => write!(f, "{} button {button} on {device}", press_word(*pressed)),
            Step::Key {
                device,
                key,
                pressed,
            } => write!(f, "{} key {key} on {device}", press_word(*pressed)),
            Step::Grab { client, seat, mode } => write!(f, "{client} grabs {seat} ({mode})"),
            Step::Confine { client, seat, .. } => write!(f, "{client} confines {seat}"),
            Step::Release { seat } => write!(f, "release grab on {seat}"),
            Step::DisconnectClient { client } => write!(f, "disconnect client {client}"),
            Step::Expect(expectation) => write!(f, "expect {expectation}"),
        }
    }
}

impl fmt::Display for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expectation::Cursor { seat, .. } => write!(f, "{seat} cursor"),
            Expectation::Grabbed { seat, .. } => write!(f, "{seat} grab state"),
            Expectation::PointerFocus { seat, .. } => write!(f, "{seat} pointer focus"),
            Expectation::KeyboardFocus { seat, .. } => write!(f, "{seat} keyboard focus"),
            Expectation::DeviceSeat { device, .. } => write!(f, "{device} assignment"),
            Expectation::DeviceConnected { device, .. } => write!(f, "{device} connection"),
            Expectation::SeatCount(_) => write!(f, "seat count"),
            Expectation::Fails { step, kind } => write!(f, "'{step}' to fail with {kind}"),
        }
    }
}

fn press_word(pressed: bool) -> &'static str {
    if pressed {
        "press"
    } else {
        "release"
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    pub name: String,
    pub description: String,
    pub steps: Vec<Step>,
}

impl Scenario {
    pub fn new(name: impl Into<String>, description: impl Into<String>, steps: Vec<Step>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            steps,
        }
    }
}

/// The first step that did not go as scripted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepFailure {
    /// 1-based position of the step in the scenario.
    pub index: usize,
    pub step: String,
    pub expected: String,
    pub actual: String,
}

impl fmt::Display for StepFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "step {} ({}): expected {}, got {}",
            self.index, self.step, self.expected, self.actual
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioOutcome {
    pub name: String,
    pub description: String,
    pub steps_total: usize,
    pub steps_passed: usize,
    pub failure: Option<StepFailure>,
}

impl ScenarioOutcome {
    pub fn passed(&self) -> bool {
        self.failure.is_none()
    }
}

/// Runs scenarios against fresh compositors and keeps their outcomes.
#[derive(Debug, Clone)]
pub struct ScenarioRunner {
    width: u32,
    height: u32,
    outcomes: Vec<ScenarioOutcome>,
}

impl Default for ScenarioRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl ScenarioRunner {
    /// A runner using a 1920×1080 display.
    pub fn new() -> Self {
        Self::with_display(1920, 1080)
    }

    pub fn with_display(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            outcomes: Vec::new(),
        }
    }

    pub fn outcomes(&self) -> &[ScenarioOutcome] {
        &self.outcomes
    }

    /// Runs one scenario and records its outcome.
    pub fn run(&mut self, scenario: &Scenario) -> ScenarioOutcome {
        self.run_keeping_state(scenario).0
    }

    /// Like [`run`](Self::run), also handing back the final compositor.
    pub fn run_keeping_state(
        &mut self,
        scenario: &Scenario,
    ) -> (ScenarioOutcome, VirtualCompositor) {
        let (outcome, compositor) = self.execute(scenario);
        self.outcomes.push(outcome.clone());
        (outcome, compositor)
    }

    /// Runs every scenario; returns `true` if all passed.
    pub fn run_all(&mut self, scenarios: &[Scenario]) -> bool {
        scenarios
            .iter()
            .map(|scenario| self.run(scenario).passed())
            .fold(true, |all, passed| all && passed)
    }

    /// Runs one scenario without recording it, handing back the compositor
    /// in the state the scenario left it.
    pub fn execute(&self, scenario: &Scenario) -> (ScenarioOutcome, VirtualCompositor) {
        info!(scenario = %scenario.name, steps = scenario.steps.len(), "running scenario");
        let mut compositor = VirtualCompositor::new(self.width, self.height);
        let mut outcome = ScenarioOutcome {
            name: scenario.name.clone(),
            description: scenario.description.clone(),
            steps_total: scenario.steps.len(),
            steps_passed: 0,
            failure: None,
        };

        for (i, step) in scenario.steps.iter().enumerate() {
            debug!(scenario = %scenario.name, index = i + 1, step = %step, "step");
            match check_step(&mut compositor, step) {
                Ok(()) => outcome.steps_passed += 1,
                Err((expected, actual)) => {
                    outcome.failure = Some(StepFailure {
                        index: i + 1,
                        step: step.to_string(),
                        expected,
                        actual,
                    });
                    break;
                }
            }
        }

        info!(scenario = %scenario.name, passed = outcome.passed(), "scenario finished");
        (outcome, compositor)
    }

    /// Plain-text summary of every recorded outcome.
    pub fn report(&self) -> String {
        let passed = self.outcomes.iter().filter(|o| o.passed()).count();
        let mut lines = vec![
            "=== Scenario Report ===".to_string(),
            String::new(),
            format!("Total: {passed}/{} passed", self.outcomes.len()),
            String::new(),
        ];

        for outcome in &self.outcomes {
            let status = if outcome.passed() { "PASS" } else { "FAIL" };
            lines.push(format!("[{status}] {}", outcome.name));
            if !outcome.description.is_empty() {
                lines.push(format!("       {}", outcome.description));
            }
            lines.push(format!(
                "       Steps: {}/{}",
                outcome.steps_passed, outcome.steps_total
            ));
            if let Some(failure) = &outcome.failure {
                lines.push(format!("       Error: {failure}"));
            }
            lines.push(String::new());
        }

        lines.join("\n")
    }
}

/// `Err((expected, actual))` when the step does not behave as scripted.
fn check_step(comp: &mut VirtualCompositor, step: &Step) -> Result<(), (String, String)> {
    match step {
        Step::Expect(expectation) => check_expectation(comp, expectation),
        action => apply(comp, action).map_err(|err| ("success".to_string(), err.to_string())),
    }
}

fn apply(comp: &mut VirtualCompositor, step: &Step) -> Result<(), SimError> {
    match step {
        Step::CreateSeat { name } => {
            comp.create_seat(name)?;
        }
        Step::DestroySeat { name } => {
            let seat = comp.seat_id(name)?;
            comp.destroy_seat(seat)?;
        }
        Step::ConnectDevice { device, seat } => {
            comp.connect_device(device.clone(), seat)?;
        }
        Step::DisconnectDevice { device } => {
            comp.disconnect_device(&DeviceId::new(device.as_str()))?;
        }
        Step::AssignDevice { device, seat } => {
            let seat = comp.seat_id(seat)?;
            comp.assign_device(&DeviceId::new(device.as_str()), seat)?;
        }
        Step::CreateWindow { id, title, rect } => {
            comp.create_window(
                id.as_str(),
                title.as_str(),
                rect.x,
                rect.y,
                rect.width,
                rect.height,
            )?;
        }
        Step::DestroyWindow { id } => {
            comp.destroy_window(&WindowId::new(id.as_str()))?;
        }
        Step::MovePointer { device, dx, dy } => {
            comp.dispatch_pointer_motion(&DeviceId::new(device.as_str()), *dx, *dy)?;
        }
        Step::MovePointerTo { device, x, y } => {
            comp.move_pointer_to(&DeviceId::new(device.as_str()), *x, *y)?;
        }
        Step::Button {
            device,
            button,
            pressed,
        } => {
            comp.dispatch_pointer_button(&DeviceId::new(device.as_str()), *button, *pressed)?;
        }
        Step::Key {
            device,
            key,
            pressed,
        } => {
            comp.dispatch_key(&DeviceId::new(device.as_str()), *key, *pressed)?;
        }
        Step::Grab { client, seat, mode } => {
            let seat = comp.seat_id(seat)?;
            comp.request_grab(client.as_str(), seat, *mode)?;
        }
        Step::Confine {
            client,
            seat,
            region,
        } => {
            let seat = comp.seat_id(seat)?;
            comp.request_confine(client.as_str(), seat, *region)?;
        }
        Step::Release { seat } => {
            let seat = comp.seat_id(seat)?;
            comp.release_grab(seat)?;
        }
        Step::DisconnectClient { client } => {
            comp.disconnect_client(&ClientId::new(client.as_str()));
        }
        Step::Expect(_) => {}
    }
    Ok(())
}

fn check_expectation(
    comp: &mut VirtualCompositor,
    expectation: &Expectation,
) -> Result<(), (String, String)> {
    let lookup_failed = |err: SimError| ("a readable state".to_string(), err.to_string());

    let (expected, actual) = match expectation {
        Expectation::Cursor { seat, x, y } => {
            let seat = comp
                .manager()
                .get_seat_by_name(seat)
                .map_err(|e| lookup_failed(e.into()))?;
            (format_position(Position::new(*x, *y)), format_position(seat.cursor()))
        }
        Expectation::Grabbed { seat, grabbed } => {
            let seat = comp
                .manager()
                .get_seat_by_name(seat)
                .map_err(|e| lookup_failed(e.into()))?;
            (
                format!("grabbed={grabbed}"),
                format!("grabbed={}", seat.is_pointer_grabbed()),
            )
        }
        Expectation::PointerFocus { seat, window } => {
            let seat = comp
                .manager()
                .get_seat_by_name(seat)
                .map_err(|e| lookup_failed(e.into()))?;
            (
                format_option(window.as_deref()),
                format_option(seat.pointer_focus().map(WindowId::as_str)),
            )
        }
        Expectation::KeyboardFocus { seat, window } => {
            let seat = comp
                .manager()
                .get_seat_by_name(seat)
                .map_err(|e| lookup_failed(e.into()))?;
            (
                format_option(window.as_deref()),
                format_option(seat.keyboard_focus().map(WindowId::as_str)),
            )
        }
        Expectation::DeviceSeat { device, seat } => {
            let actual = comp
                .manager()
                .seat_for_device(&DeviceId::new(device.as_str()))
                .map(|s| s.name().to_string());
            (format_option(seat.as_deref()), format_option(actual.as_deref()))
        }
        Expectation::DeviceConnected { device, connected } => {
            let actual = comp
                .device(&DeviceId::new(device.as_str()))
                .map(|d| d.is_connected())
                .unwrap_or(false);
            (format!("connected={connected}"), format!("connected={actual}"))
        }
        Expectation::SeatCount(count) => {
            (count.to_string(), comp.manager().seat_count().to_string())
        }
        Expectation::Fails { step, kind } => {
            let actual = match apply(comp, step) {
                Ok(()) => "success".to_string(),
                Err(err) => match err.seat_kind() {
                    Some(found) => found.to_string(),
                    None => err.to_string(),
                },
            };
            (kind.to_string(), actual)
        }
    };

    if expected == actual {
        Ok(())
    } else {
        Err((expected, actual))
    }
}

fn format_position(pos: Position) -> String {
    format!("({}, {})", pos.x, pos.y)
}

fn format_option(value: Option<&str>) -> String {
    value.unwrap_or("none").to_string()
}
