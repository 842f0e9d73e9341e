//! Rendering lights for humans and for scripts.

use std::{
    env,
    io::{self, IsTerminal},
};

use crate::light::Light;

/// Where the formatter learns whether colors are welcome.
pub trait Terminal {
    fn is_interactive(&self) -> bool;

    fn color_suppressed(&self) -> bool;

    #[inline]
    fn use_color(&self) -> bool {
        self.is_interactive() && !self.color_suppressed()
    }
}

/// Standard output of this process, honoring `NO_COLOR`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Stdout;

impl Terminal for Stdout {
    fn is_interactive(&self) -> bool {
        io::stdout().is_terminal()
    }

    fn color_suppressed(&self) -> bool {
        env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Color {
    Bold,
    Green,
    Blue,
    Yellow,
}

impl Color {
    fn ansi_code(&self) -> &'static str {
        match self {
            Color::Bold => "\x1b[1m",
            Color::Green => "\x1b[1;32m",
            Color::Blue => "\x1b[1;34m",
            Color::Yellow => "\x1b[1;33m",
        }
    }
}

const RESET: &str = "\x1b[0m";

#[derive(Clone, Copy, Debug)]
pub struct Formatter {
    machine: bool,
    color: bool,
}

impl Formatter {
    /// Machine readable output is never colored.
    pub fn new<T: Terminal>(machine: bool, terminal: &T) -> Formatter {
        Self {
            machine,
            color: !machine && terminal.use_color(),
        }
    }

    /// One light, newline terminated.
    pub fn render(&self, light: &Light) -> String {
        if self.machine {
            format!(
                "{},{},{:.2}%,{},{}\n",
                light.name(),
                light.subsystem(),
                light.percentage(),
                light.brightness(),
                light.max_brightness(),
            )
        } else {
            format!(
                "Device \"{}\" ({}):\n    Current brightness: {} ({})\n    Max brightness: {}\n",
                self.paint(Color::Bold, light.name()),
                self.paint(Color::Blue, light.subsystem().as_str()),
                self.paint(Color::Green, &light.brightness().to_string()),
                self.paint(Color::Green, &format!("{:.2}%", light.percentage())),
                self.paint(Color::Yellow, &light.max_brightness().to_string()),
            )
        }
    }

    /// Several lights; human blocks get a blank line between them.
    pub fn render_all(&self, lights: &[Light]) -> String {
        let separator = if self.machine { "" } else { "\n" };
        lights
            .iter()
            .map(|light| self.render(light))
            .collect::<Vec<_>>()
            .join(separator)
    }

    fn paint(&self, color: Color, text: &str) -> String {
        if self.color {
            format!("{}{}{}", color.ansi_code(), text, RESET)
        } else {
            text.to_string()
        }
    }
}
