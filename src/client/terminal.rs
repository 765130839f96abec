//! Terminal front end for the advisory controller

use std::io::{BufRead, Write};
use std::thread;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::view::{Renderer, View};
use super::{Command, LocationError, LocationProvider, PermissionProvider, PermissionState, PositionOptions};
use crate::models::Coordinates;

/// Position provider that always reports the same coordinates
#[derive(Debug, Clone, Copy)]
pub struct FixedLocation {
    coordinates: Coordinates,
}

impl FixedLocation {
    pub fn new(coordinates: Coordinates) -> Self {
        Self { coordinates }
    }
}

impl LocationProvider for FixedLocation {
    async fn current_position(&self, _options: &PositionOptions) -> Result<Coordinates, LocationError> {
        Ok(self.coordinates)
    }
}

/// Permission provider with a fixed answer
#[derive(Debug, Clone, Copy)]
pub struct StaticPermission(pub PermissionState);

impl PermissionProvider for StaticPermission {
    async fn query(&self) -> anyhow::Result<PermissionState> {
        Ok(self.0)
    }
}

/// Draws the advisory screen as plain text, one block per render
pub struct TerminalRenderer<W> {
    out: W,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_view(&mut self, view: &View) -> std::io::Result<()> {
        let out = &mut self.out;

        if view.tips_panel_visible {
            writeln!(out, "Sun safety tips")?;
            for tip in &view.tips {
                writeln!(out, "  * {tip}")?;
            }
            writeln!(out)?;
            return out.flush();
        }

        if !view.uv_panel_visible {
            return out.flush();
        }

        if let Some(title) = view.title {
            writeln!(out, "{}", paint(title, view.background))?;
        }

        if view.loader_visible {
            writeln!(out, "Loading UV index...")?;
        } else if view.uv_text_visible && !view.uv_text.is_empty() {
            writeln!(out, "UV index: {}", view.uv_text)?;
        }

        if let Some(burn_time) = view.burn_time {
            writeln!(out, "{burn_time}")?;
        }
        if let Some(message) = view.message {
            writeln!(out, "{message}")?;
        }
        if let Some(at) = view.updated_at {
            writeln!(out, "Updated {}", at.format("%H:%M:%S UTC"))?;
        }

        writeln!(out)?;
        out.flush()
    }
}

impl<W: Write> Renderer for TerminalRenderer<W> {
    fn render(&mut self, view: &View) {
        if let Err(e) = self.write_view(view) {
            warn!("Failed to draw advisory screen: {}", e);
        }
    }
}

/// Wrap `text` in a 24-bit ANSI background for a `#rrggbb` color.
/// Anything that is not a hex color leaves the text plain.
fn paint(text: &str, color: Option<&str>) -> String {
    match color.and_then(parse_hex_color) {
        Some((r, g, b)) => format!("\x1b[1;97;48;2;{r};{g};{b}m {text} \x1b[0m"),
        None => text.to_string(),
    }
}

fn parse_hex_color(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

fn parse_command(line: &str) -> Option<Result<Command, ()>> {
    match line.trim().to_ascii_lowercase().as_str() {
        "" => None,
        "t" | "tips" => Some(Ok(Command::ToggleTips)),
        "r" | "refresh" => Some(Ok(Command::Refresh)),
        "q" | "quit" => Some(Err(())),
        _ => None,
    }
}

/// Read commands from stdin on a dedicated thread until EOF, `q`, or shutdown.
///
/// `t` toggles the tips panel, `r` starts over from the permission query and
/// `q` cancels `shutdown`. The thread is detached so a pending read never
/// holds the process open.
pub fn spawn_command_reader(
    commands: mpsc::Sender<Command>,
    shutdown: CancellationToken,
) -> std::io::Result<thread::JoinHandle<()>> {
    thread::Builder::new()
        .name("stdin-commands".to_string())
        .spawn(move || read_commands(std::io::stdin().lock(), &commands, &shutdown))
}

fn read_commands<B: BufRead>(input: B, commands: &mpsc::Sender<Command>, shutdown: &CancellationToken) {
    for line in input.lines() {
        if shutdown.is_cancelled() {
            break;
        }

        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!("Failed to read command: {}", e);
                break;
            }
        };

        match parse_command(&line) {
            Some(Ok(command)) => {
                if commands.blocking_send(command).is_err() {
                    break;
                }
            }
            Some(Err(())) => {
                shutdown.cancel();
                break;
            }
            None => debug!("Ignoring input {:?}", line),
        }
    }
    debug!("Command reader stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advisory::{SUN_SAFETY_TIPS, band_for};
    use crate::client::ClientError;
    use chrono::Utc;
    use rstest::rstest;

    fn rendered(view: &View) -> String {
        let mut renderer = TerminalRenderer::new(Vec::new());
        renderer.render(view);
        String::from_utf8(renderer.into_inner()).unwrap()
    }

    #[rstest]
    #[case("#32a852", Some((0x32, 0xa8, 0x52)))]
    #[case("#bb23cf", Some((0xbb, 0x23, 0xcf)))]
    #[case("32a852", None)]
    #[case("#fff", None)]
    #[case("#zzzzzz", None)]
    fn test_parse_hex_color(#[case] input: &str, #[case] expected: Option<(u8, u8, u8)>) {
        assert_eq!(parse_hex_color(input), expected);
    }

    #[rstest]
    #[case("t", Some(Ok(Command::ToggleTips)))]
    #[case(" Tips ", Some(Ok(Command::ToggleTips)))]
    #[case("r", Some(Ok(Command::Refresh)))]
    #[case("q", Some(Err(())))]
    #[case("", None)]
    #[case("hello", None)]
    fn test_parse_command(#[case] input: &str, #[case] expected: Option<Result<Command, ()>>) {
        assert_eq!(parse_command(input), expected);
    }

    #[test]
    fn test_render_loading() {
        let mut view = View::default();
        view.show_loading();
        assert!(rendered(&view).contains("Loading UV index..."));
    }

    #[test]
    fn test_render_reading() {
        let mut view = View::default();
        view.show_reading(6.2, band_for(6.2), Utc::now());

        let text = rendered(&view);
        assert!(text.contains("High Risk"));
        assert!(text.contains("UV index: 6.2"));
        assert!(text.contains("48;2;222;134;51"));
        assert!(text.contains(band_for(6.2).burn_time));
    }

    #[test]
    fn test_render_error() {
        let mut view = View::default();
        view.show_error(ClientError::Unavailable);

        let text = rendered(&view);
        assert!(text.contains("UV index: UV index not available."));
        assert!(!text.contains("\x1b["));
    }

    #[test]
    fn test_render_tips_panel() {
        let mut view = View::default();
        view.toggle_tips(&SUN_SAFETY_TIPS);

        let text = rendered(&view);
        for tip in SUN_SAFETY_TIPS {
            assert_eq!(text.matches(tip).count(), 1);
        }
        assert!(!text.contains("UV index"));
    }

    #[test]
    fn test_read_commands_until_quit() {
        let (tx, mut rx) = mpsc::channel(8);
        let shutdown = CancellationToken::new();
        let input = std::io::Cursor::new("t\nnoise\nr\nq\nt\n");

        read_commands(input, &tx, &shutdown);

        assert!(shutdown.is_cancelled());
        assert_eq!(rx.try_recv(), Ok(Command::ToggleTips));
        assert_eq!(rx.try_recv(), Ok(Command::Refresh));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_read_commands_eof_keeps_running() {
        let (tx, mut rx) = mpsc::channel(8);
        let shutdown = CancellationToken::new();

        read_commands(std::io::Cursor::new("tips\n"), &tx, &shutdown);

        assert!(!shutdown.is_cancelled());
        assert_eq!(rx.try_recv(), Ok(Command::ToggleTips));
    }

    #[tokio::test]
    async fn test_static_providers() {
        let coordinates = Coordinates::new(52.52, 13.4).unwrap();
        let location = FixedLocation::new(coordinates);
        let position = location
            .current_position(&PositionOptions::default())
            .await
            .unwrap();
        assert_eq!(position, coordinates);

        let permission = StaticPermission(PermissionState::Denied);
        assert_eq!(permission.query().await.unwrap(), PermissionState::Denied);
    }
}
