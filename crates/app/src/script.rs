//! Plain-text input scripts replayed by the `run` command.
//!
//! One step per line, `#` starts a comment:
//!
//! ```text
//! press
//! release
//! wait 1500
//! swipe-left
//! mode word
//! level farm
//! settle
//! ```

use std::time::Duration;

use big_red_button_core::{ButtonError, InputEvent, Result, SoundMode, SwipeDirection};

#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Input(InputEvent),
    /// Let session time pass.
    Wait(Duration),
    /// Let every pending timer fire.
    Settle,
    /// Release a sound that never finished.
    ClearSound,
}

pub const DEFAULT_SCRIPT: &str = "\
# press through the first level, tapping along the way
settle
press
release
tap
wait 500
press
release
wait 3000
tap
swipe-right
settle
level farm
settle
press
release
settle
";

pub fn parse(source: &str) -> Result<Vec<Step>> {
    source
        .lines()
        .enumerate()
        .filter_map(|(number, line)| {
            let line = line.split('#').next().unwrap_or_default().trim();
            (!line.is_empty()).then(|| parse_line(line).map_err(|err| at_line(number + 1, err)))
        })
        .collect()
}

fn parse_line(line: &str) -> Result<Step> {
    let mut words = line.split_whitespace();
    let command = words.next().unwrap_or_default();
    let argument = words.next();

    let step = match (command, argument) {
        ("press", None) => Step::Input(InputEvent::PressStart),
        ("release", None) => Step::Input(InputEvent::PressEnd),
        ("tap", None) => Step::Input(InputEvent::Tap),
        ("swipe-left", None) => Step::Input(InputEvent::Swipe(SwipeDirection::Left)),
        ("swipe-right", None) => Step::Input(InputEvent::Swipe(SwipeDirection::Right)),
        ("mute", None) => Step::Input(InputEvent::SetForceMuted(true)),
        ("unmute", None) => Step::Input(InputEvent::SetForceMuted(false)),
        ("toggle-sound", None) => Step::Input(InputEvent::ToggleSound),
        ("mode", Some("animal")) => Step::Input(InputEvent::SetSoundMode(SoundMode::Animal)),
        ("mode", Some("word")) => Step::Input(InputEvent::SetSoundMode(SoundMode::SpokenWord)),
        ("level", Some(name)) => Step::Input(InputEvent::SelectLevel(name.to_string())),
        ("wait", Some(millis)) => {
            let millis: u64 = millis.parse().map_err(|_| {
                ButtonError::msg(format!("`{millis}` is not a number of milliseconds"))
            })?;
            Step::Wait(Duration::from_millis(millis))
        }
        ("settle", None) => Step::Settle,
        ("clear-sound", None) => Step::ClearSound,
        _ => return Err(ButtonError::msg(format!("unrecognised step `{line}`"))),
    };

    if words.next().is_some() {
        return Err(ButtonError::msg(format!("too many arguments in `{line}`")));
    }
    Ok(step)
}

fn at_line(number: usize, err: ButtonError) -> ButtonError {
    ButtonError::msg(format!("script line {number}: {err}"))
}
