//! DashboardView: maps the monitor's state into a terminal framebuffer.
//!
//! This module is pure (no I/O). It can be unit-tested.
//!
//! ```text
//! ┌ Server ────────────────────┐┌ Players ─────────────────────────────┐
//! │ Time     Day 7, 21:45      ││ ID    Name        Score Lvl ...      │
//! │ ...                        ││ ...                                  │
//! └────────────────────────────┘└──────────────────────────────────────┘
//! ┌ Log ─────────────────────────────────────────────────────────────────┐
//! └──────────────────────────────────────────────────────────────────────┘
//! ┌ Console ─────────────────────────────────────────────────────────────┐
//! │ > kick 171 "Kicked by Console"_                                      │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::VecDeque;

use crate::fb::{CellStyle, FrameBuffer, Rgb};
use crate::types::{Focus, LogEvent, ServerSnapshot, SessionState, Severity};

/// Terminal viewport dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

/// Color class of a log pane line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Normal,
    Chat,
    Warning,
    Error,
    /// An operator command echoed as `> cmd`.
    Echo,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub text: String,
    pub tone: Tone,
}

impl LogLine {
    pub fn new(text: impl Into<String>, tone: Tone) -> Self {
        Self {
            text: text.into(),
            tone,
        }
    }

    pub fn from_event(ev: &LogEvent) -> Self {
        let tone = match ev.severity {
            Some(Severity::Error) | Some(Severity::Exception) => Tone::Error,
            Some(Severity::Warning) => Tone::Warning,
            _ if ev.is_chat() => Tone::Chat,
            _ => Tone::Normal,
        };
        Self::new(ev.line.clone(), tone)
    }

    pub fn echo(command: &str) -> Self {
        Self::new(format!("> {command}"), Tone::Echo)
    }

    pub fn failure(error: &str) -> Self {
        Self::new(format!("Error: {error}"), Tone::Error)
    }
}

/// Everything one frame shows, borrowed from the application state.
#[derive(Debug, Clone, Copy)]
pub struct DashboardFrame<'a> {
    pub snapshot: &'a ServerSnapshot,
    pub session: SessionState,
    pub log: &'a VecDeque<LogLine>,
    pub focus: Focus,
    pub selected: Option<usize>,
    pub console: &'a str,
    pub status: &'a str,
}

struct Column {
    title: &'static str,
    width: u16,
}

const PLAYER_COLUMNS: [Column; 9] = [
    Column { title: "ID", width: 6 },
    Column { title: "Name", width: 18 },
    Column { title: "Score", width: 6 },
    Column { title: "Lvl", width: 4 },
    Column { title: "Z-Kills", width: 8 },
    Column { title: "P-Kills", width: 8 },
    Column { title: "Deaths", width: 7 },
    Column { title: "Ping", width: 5 },
    Column { title: "IP", width: 15 },
];

const BG: Rgb = Rgb::new(12, 12, 16);
const TEXT: CellStyle = CellStyle::fg(Rgb::new(210, 210, 210));
const LABEL: CellStyle = CellStyle::fg(Rgb::new(140, 170, 200));
const BORDER: CellStyle = CellStyle::fg(Rgb::new(90, 90, 100));
const BORDER_FOCUSED: CellStyle = CellStyle::fg(Rgb::new(240, 200, 80));
const HEADER: CellStyle = CellStyle::fg(Rgb::new(235, 235, 235)).on(Rgb::new(40, 60, 90));
const SELECTED: CellStyle = CellStyle::fg(Rgb::new(15, 15, 20)).on(Rgb::new(200, 200, 210));

fn tone_style(tone: Tone) -> CellStyle {
    match tone {
        Tone::Normal => TEXT,
        Tone::Chat => CellStyle::fg(Rgb::new(120, 210, 130)),
        Tone::Warning => CellStyle::fg(Rgb::new(240, 200, 80)),
        Tone::Error => CellStyle::fg(Rgb::new(230, 90, 90)),
        Tone::Echo => CellStyle::fg(Rgb::new(120, 180, 240)).bold(),
    }
}

fn or_dash(s: &str) -> &str {
    if s.is_empty() {
        "-"
    } else {
        s
    }
}

/// Renders the four dashboard panes.
pub struct DashboardView {
    /// Width of the stats pane; the player table takes the rest.
    stats_w: u16,
    /// Height of the stats and player panes, borders included.
    top_h: u16,
}

impl Default for DashboardView {
    fn default() -> Self {
        Self {
            stats_w: 34,
            top_h: 12,
        }
    }
}

impl DashboardView {
    /// Render into an existing framebuffer, resizing it to the viewport.
    pub fn render_into(&self, frame: &DashboardFrame<'_>, viewport: Viewport, fb: &mut FrameBuffer) {
        fb.resize(viewport.width, viewport.height);
        fb.clear(TEXT.into_cell(' '));

        let w = viewport.width;
        let h = viewport.height;
        if w == 0 || h == 0 {
            return;
        }

        self.draw_header(fb, frame, w);

        const HEADER_H: u16 = 1;
        const CONSOLE_H: u16 = 3;
        let top_h = self.top_h.min(h.saturating_sub(HEADER_H + CONSOLE_H + 3));
        let console_y = h.saturating_sub(CONSOLE_H);
        let log_y = HEADER_H + top_h;
        let log_h = console_y.saturating_sub(log_y);

        if top_h >= 3 {
            let stats_w = self.stats_w.min(w);
            self.draw_stats(fb, frame, 0, HEADER_H, stats_w, top_h);
            if w > stats_w {
                self.draw_players(fb, frame, stats_w, HEADER_H, w - stats_w, top_h);
            }
        }
        if log_h >= 3 {
            self.draw_log(fb, frame, log_y, w, log_h);
        }
        self.draw_console(fb, frame, console_y, w, CONSOLE_H.min(h));
    }

    /// Convenience helper that allocates a new framebuffer.
    pub fn render(&self, frame: &DashboardFrame<'_>, viewport: Viewport) -> FrameBuffer {
        let mut fb = FrameBuffer::new(viewport.width, viewport.height);
        self.render_into(frame, viewport, &mut fb);
        fb
    }

    fn draw_header(&self, fb: &mut FrameBuffer, frame: &DashboardFrame<'_>, w: u16) {
        fb.fill_rect(0, 0, w, 1, ' ', HEADER);
        let mut x = 1 + fb.put_str(1, 0, "7DTD Monitor", HEADER.bold()) + 3;
        let target = format!("{}:{}", frame.snapshot.host, frame.snapshot.port);
        x += fb.put_str(x, 0, &target, HEADER) + 3;
        let state = match frame.session {
            SessionState::Ready => HEADER,
            _ => HEADER.bold(),
        };
        x += fb.put_str(x, 0, &format!("[{}]", frame.session), state) + 3;

        if !frame.status.is_empty() {
            let len = frame.status.chars().count() as u16;
            let sx = w.saturating_sub(len + 1).max(x);
            fb.put_str_clipped(sx, 0, frame.status, w.saturating_sub(sx), HEADER);
        }
    }

    fn draw_stats(&self, fb: &mut FrameBuffer, frame: &DashboardFrame<'_>, x: u16, y: u16, w: u16, h: u16) {
        fb.draw_box(x, y, w, h, "Server", BORDER);
        let snap = frame.snapshot;
        let heap = if snap.heap_used.is_empty() && snap.heap_max.is_empty() {
            "-".to_string()
        } else {
            format!("{} / {}", or_dash(&snap.heap_used), or_dash(&snap.heap_max))
        };
        let rows: [(&str, String); 9] = [
            ("Host", snap.host.clone()),
            ("Port", snap.port.to_string()),
            ("Time", or_dash(&snap.game_time).to_string()),
            ("FPS", or_dash(&snap.fps).to_string()),
            ("Heap", heap),
            ("Players", snap.player_count.to_string()),
            ("Ping", format!("{} ms avg", snap.average_ping)),
            ("Zombies", snap.entities.zombies.to_string()),
            ("Animals", snap.entities.animals.to_string()),
        ];

        let inner_w = w.saturating_sub(4);
        for (i, (label, value)) in rows.iter().enumerate() {
            let row_y = y + 1 + i as u16;
            if row_y + 1 >= y + h {
                break;
            }
            let lw = fb.put_str_clipped(x + 2, row_y, label, inner_w.min(9), LABEL);
            let vx = x + 2 + lw.max(9);
            fb.put_str_clipped(vx, row_y, value, (x + 2 + inner_w).saturating_sub(vx), TEXT);
        }
    }

    fn draw_players(&self, fb: &mut FrameBuffer, frame: &DashboardFrame<'_>, x: u16, y: u16, w: u16, h: u16) {
        let border = if frame.focus == Focus::Players {
            BORDER_FOCUSED
        } else {
            BORDER
        };
        let players = &frame.snapshot.players;
        fb.draw_box(x, y, w, h, &format!("Players ({})", players.len()), border);
        if w < 4 || h < 3 {
            return;
        }

        let inner_x = x + 1;
        let inner_w = w - 2;
        let mut cx = inner_x + 1;
        for col in &PLAYER_COLUMNS {
            let room = (inner_x + inner_w).saturating_sub(cx);
            if room == 0 {
                break;
            }
            fb.put_str_clipped(cx, y + 1, col.title, room.min(col.width), LABEL.bold());
            cx += col.width;
        }

        let visible = h.saturating_sub(3) as usize;
        if visible == 0 {
            return;
        }
        let offset = frame
            .selected
            .map(|s| s.saturating_sub(visible - 1))
            .unwrap_or(0);

        for (row, (idx, p)) in players.iter().enumerate().skip(offset).take(visible).enumerate() {
            let row_y = y + 2 + row as u16;
            let style = if frame.selected == Some(idx) {
                let style = if frame.focus == Focus::Players {
                    SELECTED
                } else {
                    SELECTED.dim()
                };
                fb.fill_rect(inner_x, row_y, inner_w, 1, ' ', style);
                style
            } else {
                TEXT
            };

            let cells = [
                p.id.clone(),
                p.name.clone(),
                p.score.to_string(),
                p.level.to_string(),
                p.zombie_kills.to_string(),
                p.player_kills.to_string(),
                p.deaths.to_string(),
                p.ping.to_string(),
                p.ip.clone(),
            ];
            let mut cx = inner_x + 1;
            for (col, text) in PLAYER_COLUMNS.iter().zip(cells.iter()) {
                let room = (inner_x + inner_w).saturating_sub(cx);
                if room == 0 {
                    break;
                }
                // Leave one column of gap before the next field.
                fb.put_str_clipped(cx, row_y, text, room.min(col.width.saturating_sub(1)), style);
                cx += col.width;
            }
        }
    }

    fn draw_log(&self, fb: &mut FrameBuffer, frame: &DashboardFrame<'_>, y: u16, w: u16, h: u16) {
        fb.draw_box(0, y, w, h, "Log", BORDER);
        let rows = h.saturating_sub(2) as usize;
        let inner_w = w.saturating_sub(4);
        let skip = frame.log.len().saturating_sub(rows);
        for (i, line) in frame.log.iter().skip(skip).enumerate() {
            fb.put_str_clipped(2, y + 1 + i as u16, &line.text, inner_w, tone_style(line.tone));
        }
    }

    fn draw_console(&self, fb: &mut FrameBuffer, frame: &DashboardFrame<'_>, y: u16, w: u16, h: u16) {
        let focused = frame.focus == Focus::Console;
        let border = if focused { BORDER_FOCUSED } else { BORDER };
        fb.draw_box(0, y, w, h, "Console", border);
        if h < 3 || w < 6 {
            return;
        }

        let row_y = y + 1;
        let prompt_w = fb.put_str(2, row_y, "> ", LABEL.bold());
        let room = w.saturating_sub(4 + prompt_w + 1) as usize;

        // Keep the end of a long line in view.
        let chars: Vec<char> = frame.console.chars().collect();
        let start = chars.len().saturating_sub(room);
        let shown: String = chars[start..].iter().collect();
        let x = 2 + prompt_w;
        let written = fb.put_str(x, row_y, &shown, TEXT);
        if focused {
            fb.put_char(x + written, row_y, '_', TEXT.bold().on(BG));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EntityCounts, Player};

    fn snapshot() -> ServerSnapshot {
        let players = vec![
            Player {
                id: "171".into(),
                name: "Survivor".into(),
                level: 13,
                score: 15,
                zombie_kills: 7,
                ping: 24,
                ip: "127.0.0.1".into(),
                ..Player::default()
            },
            Player {
                id: "172".into(),
                name: "Slayer".into(),
                ping: 40,
                ..Player::default()
            },
        ];
        ServerSnapshot {
            host: "localhost".into(),
            port: 8081,
            game_time: "Day 7, 21:45".into(),
            fps: "60".into(),
            heap_used: "1024.0 MB".into(),
            heap_max: "2048.0 MB".into(),
            player_count: players.len(),
            entities: EntityCounts {
                zombies: 12,
                animals: 3,
                other: 0,
            },
            average_ping: 32,
            players,
        }
    }

    fn screen(fb: &FrameBuffer) -> String {
        (0..fb.height())
            .map(|y| fb.row_text(y))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn frame<'a>(snap: &'a ServerSnapshot, log: &'a VecDeque<LogLine>) -> DashboardFrame<'a> {
        DashboardFrame {
            snapshot: snap,
            session: SessionState::Ready,
            log,
            focus: Focus::Console,
            selected: None,
            console: "",
            status: "",
        }
    }

    #[test]
    fn stats_and_players_are_shown() {
        let snap = snapshot();
        let log = VecDeque::new();
        let fb = DashboardView::default().render(&frame(&snap, &log), Viewport::new(120, 30));
        let text = screen(&fb);

        assert!(text.contains("localhost:8081"));
        assert!(text.contains("[ready]"));
        assert!(text.contains("Day 7, 21:45"));
        assert!(text.contains("1024.0 MB / 2048.0 MB"));
        assert!(text.contains("32 ms avg"));
        assert!(text.contains("Players (2)"));
        assert!(text.contains("Z-Kills"));
        assert!(text.contains("Survivor"));
        assert!(text.contains("Slayer"));
    }

    #[test]
    fn empty_snapshot_shows_dashes() {
        let snap = ServerSnapshot {
            host: "h".into(),
            port: 1,
            ..ServerSnapshot::default()
        };
        let log = VecDeque::new();
        let fb = DashboardView::default().render(&frame(&snap, &log), Viewport::new(100, 24));
        let row = (0..fb.height())
            .map(|y| fb.row_text(y))
            .find(|r| r.contains("Time"))
            .unwrap();
        assert!(row.contains('-'));
    }

    #[test]
    fn log_pane_keeps_the_newest_lines() {
        let snap = snapshot();
        let log: VecDeque<LogLine> = (0..100)
            .map(|i| LogLine::new(format!("line {i:03}"), Tone::Normal))
            .collect();
        let fb = DashboardView::default().render(&frame(&snap, &log), Viewport::new(100, 30));
        let text = screen(&fb);
        assert!(text.contains("line 099"));
        assert!(!text.contains("line 000"));
    }

    #[test]
    fn console_line_and_cursor() {
        let snap = snapshot();
        let log = VecDeque::new();
        let mut f = frame(&snap, &log);
        f.console = "kick 171 \"Kicked by Console\"";
        let fb = DashboardView::default().render(&f, Viewport::new(100, 24));
        let text = screen(&fb);
        assert!(text.contains("> kick 171 \"Kicked by Console\"_"));
    }

    #[test]
    fn selected_row_is_highlighted() {
        let snap = snapshot();
        let log = VecDeque::new();
        let mut f = frame(&snap, &log);
        f.focus = Focus::Players;
        f.selected = Some(1);
        let fb = DashboardView::default().render(&f, Viewport::new(120, 30));
        let y = (0..fb.height())
            .find(|&y| fb.row_text(y).contains("Slayer"))
            .unwrap();
        // Stats pane, border, padding, then the ID column.
        let name_x = 34 + 1 + 1 + 6;
        let cell = fb.get(name_x, y).unwrap();
        assert_eq!(cell.ch, 'S');
        assert_eq!(cell.style, SELECTED);

        let other = (0..fb.height())
            .find(|&y| fb.row_text(y).contains("Survivor"))
            .unwrap();
        assert_eq!(fb.get(name_x, other).unwrap().style, TEXT);
    }

    #[test]
    fn tiny_viewports_do_not_panic() {
        let snap = snapshot();
        let log: VecDeque<LogLine> = vec![LogLine::echo("lp")].into();
        for (w, h) in [(0, 0), (1, 1), (5, 3), (20, 6), (40, 10)] {
            let fb = DashboardView::default().render(&frame(&snap, &log), Viewport::new(w, h));
            assert_eq!((fb.width(), fb.height()), (w, h));
        }
    }

    #[test]
    fn log_line_tones() {
        let err = LogEvent::new("2024-01-01T00:00:00 1.0 ERR boom", Some(Severity::Error));
        assert_eq!(LogLine::from_event(&err).tone, Tone::Error);
        let chat = LogEvent::new("2024-01-01T00:00:00 1.0 INF Chat: 'A': hi", Some(Severity::Info));
        assert_eq!(LogLine::from_event(&chat).tone, Tone::Chat);
        assert_eq!(LogLine::echo("lp").text, "> lp");
        assert_eq!(LogLine::failure("closed").text, "Error: closed");
    }
}
