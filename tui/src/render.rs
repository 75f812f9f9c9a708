//! Drawing trials and informational screens.

use std::io;

use ratatui::{
    Frame, Terminal,
    backend::Backend,
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Paragraph, Widget, Wrap},
};

use rotask_core::{Presentation, Renderer, Screen};
use rotask_types::ResponseKey;

use crate::raster::{Bitmap, compose_pair};
use crate::stimuli::StimulusLibrary;
use crate::theme::Palette;

/// Terminal columns per bitmap cell. Cells are roughly twice as tall as
/// they are wide, so two columns keep stimuli square.
const CELL_COLUMNS: u16 = 2;
const FILLED_CELL: &str = "█";
const DIVIDER: &str = "│";

pub struct TerminalRenderer<B: Backend> {
    terminal: Terminal<B>,
    library: StimulusLibrary,
    palette: Palette,
}

impl<B: Backend> TerminalRenderer<B> {
    #[must_use]
    pub fn new(terminal: Terminal<B>, library: StimulusLibrary, palette: Palette) -> Self {
        Self {
            terminal,
            library,
            palette,
        }
    }

    #[must_use]
    pub fn backend(&self) -> &B {
        self.terminal.backend()
    }
}

impl<B> Renderer for TerminalRenderer<B>
where
    B: Backend<Error = io::Error>,
{
    fn present(&mut self, presentation: &Presentation) -> io::Result<()> {
        let bitmap = self.library.bitmap(&presentation.stimulus).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no bitmap for stimulus {}", presentation.stimulus),
            )
        })?;
        let (left, right) = compose_pair(bitmap, presentation);
        let palette = self.palette;
        self.terminal
            .draw(|frame| draw_trial(frame, &left, &right, &palette))?;
        Ok(())
    }

    fn show(&mut self, screen: &Screen) -> io::Result<()> {
        let lines = screen_lines(screen, &self.palette);
        let palette = self.palette;
        self.terminal
            .draw(|frame| draw_screen(frame, lines, &palette))?;
        Ok(())
    }
}

fn draw_trial(frame: &mut Frame, left: &Bitmap, right: &Bitmap, palette: &Palette) {
    let area = frame.area();
    frame.render_widget(Block::default().style(palette.base()), area);
    frame.render_widget(
        StimulusPair {
            left,
            right,
            palette,
        },
        area,
    );
}

fn draw_screen(frame: &mut Frame, lines: Vec<Line<'static>>, palette: &Palette) {
    let area = frame.area();
    frame.render_widget(Block::default().style(palette.base()), area);

    let height = u16::try_from(lines.len()).unwrap_or(u16::MAX).min(area.height);
    let rect = Rect {
        x: area.x,
        y: area.y + area.height.saturating_sub(height) / 2,
        width: area.width,
        height,
    };
    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        rect,
    );
}

/// Two bitmaps centred in the left and right halves with a divider between.
struct StimulusPair<'a> {
    left: &'a Bitmap,
    right: &'a Bitmap,
    palette: &'a Palette,
}

impl Widget for StimulusPair<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let divider_x = area.x + area.width / 2;
        let divider_style = Style::default().fg(self.palette.divider);
        for y in area.top()..area.bottom() {
            if let Some(cell) = buf.cell_mut((divider_x, y)) {
                cell.set_symbol(DIVIDER).set_style(divider_style);
            }
        }

        let left_half = Rect {
            width: divider_x - area.x,
            ..area
        };
        let right_half = Rect {
            x: divider_x + 1,
            width: area.right().saturating_sub(divider_x + 1),
            ..area
        };
        let style = Style::default().fg(self.palette.stimulus);
        paint_bitmap(self.left, left_half, style, buf);
        paint_bitmap(self.right, right_half, style, buf);
    }
}

/// Centre `bitmap` in `area`, clipping whatever does not fit.
fn paint_bitmap(bitmap: &Bitmap, area: Rect, style: Style, buf: &mut Buffer) {
    let cols = u16::try_from(bitmap.width())
        .unwrap_or(u16::MAX)
        .saturating_mul(CELL_COLUMNS);
    let rows = u16::try_from(bitmap.height()).unwrap_or(u16::MAX);
    let origin_x = area.x + area.width.saturating_sub(cols) / 2;
    let origin_y = area.y + area.height.saturating_sub(rows) / 2;

    for (by, y) in (origin_y..area.bottom()).enumerate().take(bitmap.height()) {
        for bx in 0..bitmap.width() {
            if !bitmap.get(bx, by) {
                continue;
            }
            let Ok(offset) = u16::try_from(bx) else {
                break;
            };
            for dx in 0..CELL_COLUMNS {
                let x = origin_x
                    .saturating_add(offset.saturating_mul(CELL_COLUMNS))
                    .saturating_add(dx);
                if x >= area.right() {
                    break;
                }
                if let Some(cell) = buf.cell_mut((x, y)) {
                    cell.set_symbol(FILLED_CELL).set_style(style);
                }
            }
        }
    }
}

fn key_label(key: &ResponseKey) -> String {
    key.as_str().to_uppercase()
}

/// Text of an informational screen.
#[must_use]
pub fn screen_lines(screen: &Screen, palette: &Palette) -> Vec<Line<'static>> {
    let text = |s: String| Line::from(Span::raw(s));
    let title = |s: &str| Line::from(Span::styled(s.to_owned(), palette.title_style()));
    let hint = |s: &str| Line::from(Span::styled(s.to_owned(), palette.hint_style()));
    let key = |s: String| Span::styled(s, palette.key_style());

    match screen {
        Screen::Start => vec![
            title("Mental rotation"),
            Line::default(),
            hint("Press any key to start"),
        ],
        Screen::Consent => vec![
            title("INFORMED CONSENT"),
            Line::default(),
            text("This experiment records anonymised data:".into()),
            text("your responses and reaction times,".into()),
            text("your sex assigned at birth and your handedness.".into()),
            Line::default(),
            text("Taking part is voluntary. Press Esc at any time to stop.".into()),
            text("By continuing you agree to this data being collected.".into()),
            Line::default(),
            hint("Press any key to continue"),
        ],
        Screen::Welcome => vec![
            title("Welcome to the mental rotation task!"),
            Line::default(),
            hint("Press any key for the instructions"),
        ],
        Screen::TaskInstructions {
            mirrored,
            not_mirrored,
        } => vec![
            title("Instructions"),
            Line::default(),
            text("Each trial shows two objects. Some are tools, some are not.".into()),
            text("The right object is turned by some angle and may also be mirrored.".into()),
            text("Decide whether the two objects are mirror images of each other.".into()),
            Line::default(),
            Line::from(vec![
                Span::raw("Press "),
                key(key_label(mirrored)),
                Span::raw(" if they are mirrored, "),
                key(key_label(not_mirrored)),
                Span::raw(" if they are not."),
            ]),
            Line::default(),
            hint("Press any key to continue"),
        ],
        Screen::TrainingIntro {
            min_correct,
            set_size,
        } => vec![
            title("Practice"),
            Line::default(),
            text("A short practice round helps you get used to the task.".into()),
            text(format!(
                "Answer at least {min_correct} of {set_size} correctly to continue."
            )),
            Line::default(),
            hint("Press any key to start practising"),
        ],
        Screen::TrainingFeedback {
            passed: true,
            score,
            ..
        } => vec![
            Line::from(Span::styled(
                format!("Practice passed with {score} correct answers."),
                Style::default().fg(palette.success),
            )),
            Line::default(),
            hint("Press any key to continue"),
        ],
        Screen::TrainingFeedback {
            passed: false,
            score,
            required,
        } => vec![
            Line::from(Span::styled(
                format!("Practice failed: {score} correct, {required} needed."),
                Style::default().fg(palette.failure),
            )),
            Line::default(),
            hint("Press any key to try again"),
        ],
        Screen::ExperimentStart => vec![
            title("The experiment starts now."),
            Line::default(),
            hint("Press any key to begin"),
        ],
        Screen::Pause => vec![
            title("Pause"),
            Line::default(),
            text("Take a short break.".into()),
            Line::default(),
            hint("Press any key to continue with the experiment"),
        ],
        Screen::Completed => vec![
            title("You have completed the experiment."),
            Line::default(),
            hint("Press any key to continue to the questions"),
        ],
        Screen::IntakeSex => vec![
            text("What is your sex assigned at birth?".into()),
            Line::default(),
            Line::from(vec![key("F".into()), Span::raw(" / "), key("M".into())]),
        ],
        Screen::IntakeHandedness => vec![
            text("Are you left-handed or right-handed?".into()),
            Line::default(),
            Line::from(vec![key("L".into()), Span::raw(" / "), key("R".into())]),
        ],
        Screen::Thanks => vec![
            title("Thank you for participating."),
            Line::default(),
            hint("Press any key to exit"),
        ],
    }
}
