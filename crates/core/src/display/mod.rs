use crate::WordLayout;

/// Rendering collaborator. The engine only tells it what to show; how the
/// background fades or how letters fall is up to the implementation.
pub trait Display {
    /// Name of a required element the display could not find, if any.
    fn missing_element(&self) -> Option<&'static str> {
        None
    }

    fn show_background(&mut self, image_ref: &str);

    /// Starts the falling-word effect. Returns false when there is nothing
    /// to render, in which case no completion is awaited.
    fn show_word(&mut self, layout: &WordLayout) -> bool;

    /// Short attention cue on the big button.
    fn bounce(&mut self);

    /// Momentary pressed look of the big button.
    fn set_pressed(&mut self, pressed: bool);

    fn set_control_enabled(&mut self, enabled: bool);

    /// User-visible failure message.
    fn alert(&mut self, message: &str);
}

/// Instruction recorded by [`RecordingDisplay`].
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayCommand {
    Background(String),
    Word { text: String, font_size_rem: f32 },
    Bounce,
    Pressed(bool),
    ControlEnabled(bool),
    Alert(String),
}

/// Display that keeps track of every instruction it receives. Used by the
/// command line driver and by tests.
#[derive(Debug, Default)]
pub struct RecordingDisplay {
    commands: Vec<DisplayCommand>,
    missing: Option<&'static str>,
}

impl RecordingDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// A display that reports `element` as absent.
    pub fn missing(element: &'static str) -> Self {
        Self {
            commands: Vec::new(),
            missing: Some(element),
        }
    }

    pub fn commands(&self) -> &[DisplayCommand] {
        &self.commands
    }

    pub fn take_commands(&mut self) -> Vec<DisplayCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn last_background(&self) -> Option<&str> {
        self.commands.iter().rev().find_map(|command| match command {
            DisplayCommand::Background(image) => Some(image.as_str()),
            _ => None,
        })
    }

    pub fn last_word(&self) -> Option<&str> {
        self.commands.iter().rev().find_map(|command| match command {
            DisplayCommand::Word { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn count(&self, wanted: &DisplayCommand) -> usize {
        self.commands.iter().filter(|command| *command == wanted).count()
    }
}

impl Display for RecordingDisplay {
    fn missing_element(&self) -> Option<&'static str> {
        self.missing
    }

    fn show_background(&mut self, image_ref: &str) {
        self.commands
            .push(DisplayCommand::Background(image_ref.to_string()));
    }

    fn show_word(&mut self, layout: &WordLayout) -> bool {
        self.commands.push(DisplayCommand::Word {
            text: layout.text.clone(),
            font_size_rem: layout.font_size_rem,
        });
        layout.is_displayable()
    }

    fn bounce(&mut self) {
        self.commands.push(DisplayCommand::Bounce);
    }

    fn set_pressed(&mut self, pressed: bool) {
        self.commands.push(DisplayCommand::Pressed(pressed));
    }

    fn set_control_enabled(&mut self, enabled: bool) {
        self.commands.push(DisplayCommand::ControlEnabled(enabled));
    }

    fn alert(&mut self, message: &str) {
        self.commands.push(DisplayCommand::Alert(message.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CascadeTiming, FontConfig};

    #[test]
    fn records_latest_word_and_background() {
        let mut display = RecordingDisplay::new();
        let layout = WordLayout::compose("Lion", &CascadeTiming::default(), &FontConfig::default());

        display.show_background("/images/bg3.jpg");
        assert!(display.show_word(&layout));

        assert_eq!(display.last_background(), Some("/images/bg3.jpg"));
        assert_eq!(display.last_word(), Some("Lion"));
        assert_eq!(display.take_commands().len(), 2);
        assert!(display.commands().is_empty());
    }

    #[test]
    fn reports_missing_element() {
        let display = RecordingDisplay::missing("inner-button");
        assert_eq!(display.missing_element(), Some("inner-button"));
        assert_eq!(RecordingDisplay::new().missing_element(), None);
    }
}
